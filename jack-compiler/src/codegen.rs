//! VM code generation: a single walk over the class AST.
//!
//! Evaluation order mirrors the source exactly; expressions are lowered
//! strictly left-to-right with no folding or reassociation, so `a+b*c`
//! computes `(a+b)*c`.

use crate::ast::*;
use crate::error::{CompileError, Result};
use crate::symbol_table::{SymbolTable, VarKind};
use crate::vm_writer::VmWriter;

pub struct CodeGen {
    symbols: SymbolTable,
    vm: VmWriter,
    class_name: String,
    field_count: u16,
    /// Per-subroutine counters for IF_* and WHILE_* labels.
    if_counter: u32,
    while_counter: u32,
}

impl CodeGen {
    fn new() -> Self {
        Self {
            symbols: SymbolTable::new(),
            vm: VmWriter::new(),
            class_name: String::new(),
            field_count: 0,
            if_counter: 0,
            while_counter: 0,
        }
    }

    /// Compile one class to VM code.
    pub fn compile(class: &Class) -> Result<String> {
        let mut codegen = CodeGen::new();
        codegen.compile_class(class)?;
        Ok(codegen.vm.into_output())
    }

    // ====================================================================
    // Declarations
    // ====================================================================

    fn compile_class(&mut self, class: &Class) -> Result<()> {
        self.class_name = class.name.clone();
        self.symbols.start_class();

        for dec in &class.var_decs {
            let kind = match dec.kind {
                ClassVarKind::Static => VarKind::Static,
                ClassVarKind::Field => VarKind::Field,
            };
            for name in &dec.names {
                self.symbols.define(name, dec.ty.clone(), kind, dec.span)?;
            }
        }
        self.field_count = self.symbols.field_count();

        for subroutine in &class.subroutines {
            self.compile_subroutine(subroutine)?;
        }
        Ok(())
    }

    fn compile_subroutine(&mut self, sub: &SubroutineDec) -> Result<()> {
        self.symbols.start_subroutine();
        self.if_counter = 0;
        self.while_counter = 0;

        // The receiver occupies argument slot 0 of a method, shifting
        // every declared argument's index by one.
        if sub.kind == SubroutineKind::Method {
            self.symbols.define(
                "this",
                JackType::Class(self.class_name.clone()),
                VarKind::Arg,
                sub.span,
            )?;
        }
        for param in &sub.params {
            self.symbols
                .define(&param.name, param.ty.clone(), VarKind::Arg, sub.span)?;
        }
        for dec in &sub.body.var_decs {
            for name in &dec.names {
                self.symbols
                    .define(name, dec.ty.clone(), VarKind::Var, dec.span)?;
            }
        }

        let name = format!("{}.{}", self.class_name, sub.name);
        self.vm.write_function(&name, sub.body.local_count());

        match sub.kind {
            SubroutineKind::Constructor => {
                // Allocate the object and bind THIS to its base.
                self.vm.write_push("constant", self.field_count);
                self.vm.write_call("Memory.alloc", 1);
                self.vm.write_pop("pointer", 0);
            }
            SubroutineKind::Method => {
                // Bind THIS to the receiver.
                self.vm.write_push("argument", 0);
                self.vm.write_pop("pointer", 0);
            }
            SubroutineKind::Function => {}
        }

        self.compile_statements(&sub.body.statements)
    }

    // ====================================================================
    // Statements
    // ====================================================================

    fn compile_statements(&mut self, statements: &[Statement]) -> Result<()> {
        for stmt in statements {
            match stmt {
                Statement::Let(s) => self.compile_let(s)?,
                Statement::If(s) => self.compile_if(s)?,
                Statement::While(s) => self.compile_while(s)?,
                Statement::Do(s) => self.compile_do(s)?,
                Statement::Return(s) => self.compile_return(s)?,
            }
        }
        Ok(())
    }

    fn compile_let(&mut self, stmt: &LetStatement) -> Result<()> {
        let symbol = self
            .symbols
            .lookup(&stmt.var_name)
            .cloned()
            .ok_or_else(|| CompileError::undefined_variable(&stmt.var_name, stmt.span))?;

        match &stmt.index {
            Some(index) => {
                // &a[i] on the stack, then the value; temp 0 holds the
                // value while pointer 1 is retargeted, because the value
                // expression may itself have used THAT.
                self.compile_expression(index)?;
                self.vm.write_push(symbol.segment(), symbol.index);
                self.vm.write_arithmetic("add");
                self.compile_expression(&stmt.value)?;
                self.vm.write_pop("temp", 0);
                self.vm.write_pop("pointer", 1);
                self.vm.write_push("temp", 0);
                self.vm.write_pop("that", 0);
            }
            None => {
                self.compile_expression(&stmt.value)?;
                self.vm.write_pop(symbol.segment(), symbol.index);
            }
        }
        Ok(())
    }

    fn compile_if(&mut self, stmt: &IfStatement) -> Result<()> {
        let n = self.if_counter;
        self.if_counter += 1;

        self.compile_expression(&stmt.condition)?;
        self.vm.write_if_goto(&format!("IF_TRUE{n}"));
        self.vm.write_goto(&format!("IF_FALSE{n}"));
        self.vm.write_label(&format!("IF_TRUE{n}"));
        self.compile_statements(&stmt.then_branch)?;

        match &stmt.else_branch {
            Some(else_branch) => {
                self.vm.write_goto(&format!("IF_END{n}"));
                self.vm.write_label(&format!("IF_FALSE{n}"));
                self.compile_statements(else_branch)?;
                self.vm.write_label(&format!("IF_END{n}"));
            }
            None => {
                // Without an else branch IF_FALSE is the fallthrough.
                self.vm.write_label(&format!("IF_FALSE{n}"));
            }
        }
        Ok(())
    }

    fn compile_while(&mut self, stmt: &WhileStatement) -> Result<()> {
        let n = self.while_counter;
        self.while_counter += 1;

        self.vm.write_label(&format!("WHILE_EXP{n}"));
        self.compile_expression(&stmt.condition)?;
        self.vm.write_arithmetic("not");
        self.vm.write_if_goto(&format!("WHILE_END{n}"));
        self.compile_statements(&stmt.body)?;
        self.vm.write_goto(&format!("WHILE_EXP{n}"));
        self.vm.write_label(&format!("WHILE_END{n}"));
        Ok(())
    }

    fn compile_do(&mut self, stmt: &DoStatement) -> Result<()> {
        self.compile_call(&stmt.call)?;
        // Discard the returned value.
        self.vm.write_pop("temp", 0);
        Ok(())
    }

    fn compile_return(&mut self, stmt: &ReturnStatement) -> Result<()> {
        match &stmt.value {
            Some(expr) => self.compile_expression(expr)?,
            None => self.vm.write_push("constant", 0),
        }
        self.vm.write_return();
        Ok(())
    }

    // ====================================================================
    // Expressions
    // ====================================================================

    fn compile_expression(&mut self, expr: &Expression) -> Result<()> {
        self.compile_term(&expr.head)?;
        for (op, term) in &expr.tail {
            self.compile_term(term)?;
            self.compile_binary_op(*op);
        }
        Ok(())
    }

    fn compile_binary_op(&mut self, op: BinaryOp) {
        match op {
            BinaryOp::Add => self.vm.write_arithmetic("add"),
            BinaryOp::Sub => self.vm.write_arithmetic("sub"),
            BinaryOp::And => self.vm.write_arithmetic("and"),
            BinaryOp::Or => self.vm.write_arithmetic("or"),
            BinaryOp::Lt => self.vm.write_arithmetic("lt"),
            BinaryOp::Gt => self.vm.write_arithmetic("gt"),
            BinaryOp::Eq => self.vm.write_arithmetic("eq"),
            BinaryOp::Mul => self.vm.write_call("Math.multiply", 2),
            BinaryOp::Div => self.vm.write_call("Math.divide", 2),
        }
    }

    fn compile_term(&mut self, term: &Term) -> Result<()> {
        match term {
            Term::IntConst(n) => self.vm.write_push("constant", *n),

            Term::StrConst(s) => self.compile_string(s),

            Term::KeywordConst(kc) => match kc {
                KeywordConst::True => {
                    self.vm.write_push("constant", 0);
                    self.vm.write_arithmetic("not");
                }
                KeywordConst::False | KeywordConst::Null => {
                    self.vm.write_push("constant", 0);
                }
                KeywordConst::This => self.vm.write_push("pointer", 0),
            },

            Term::Var(name, span) => {
                let symbol = self
                    .symbols
                    .lookup(name)
                    .ok_or_else(|| CompileError::undefined_variable(name, *span))?;
                let (segment, index) = (symbol.segment(), symbol.index);
                self.vm.write_push(segment, index);
            }

            Term::Index(name, index, span) => {
                let symbol = self
                    .symbols
                    .lookup(name)
                    .cloned()
                    .ok_or_else(|| CompileError::undefined_variable(name, *span))?;
                self.compile_expression(index)?;
                self.vm.write_push(symbol.segment(), symbol.index);
                self.vm.write_arithmetic("add");
                self.vm.write_pop("pointer", 1);
                self.vm.write_push("that", 0);
            }

            Term::Paren(expr) => self.compile_expression(expr)?,

            Term::Unary(op, inner) => {
                self.compile_term(inner)?;
                match op {
                    UnaryOp::Neg => self.vm.write_arithmetic("neg"),
                    UnaryOp::Not => self.vm.write_arithmetic("not"),
                }
            }

            Term::Call(call) => self.compile_call(call)?,
        }
        Ok(())
    }

    fn compile_string(&mut self, s: &str) {
        self.vm.write_push("constant", s.len() as u16);
        self.vm.write_call("String.new", 1);
        for c in s.chars() {
            self.vm.write_push("constant", c as u16);
            self.vm.write_call("String.appendChar", 2);
        }
    }

    /// Dispatch a subroutine call.
    ///
    /// - `f(...)` is a method on the current object.
    /// - `x.f(...)` with `x` in scope is a method on `x`; the receiver
    ///   is pushed from x's own segment, statics included.
    /// - `X.f(...)` with `X` unresolved names an external class; no
    ///   receiver is pushed.
    fn compile_call(&mut self, call: &SubroutineCall) -> Result<()> {
        let n_args = call.args.len() as u16;

        let (target, n_args) = match &call.qualifier {
            None => {
                self.vm.write_push("pointer", 0);
                (
                    format!("{}.{}", self.class_name, call.name),
                    n_args + 1,
                )
            }
            Some(qualifier) => match self.symbols.lookup(qualifier).cloned() {
                Some(symbol) => {
                    self.vm.write_push(symbol.segment(), symbol.index);
                    let class = symbol
                        .ty
                        .class_name()
                        .unwrap_or(qualifier.as_str());
                    (format!("{}.{}", class, call.name), n_args + 1)
                }
                None => (format!("{}.{}", qualifier, call.name), n_args),
            },
        };

        for arg in &call.args {
            self.compile_expression(arg)?;
        }
        self.vm.write_call(&target, n_args);
        Ok(())
    }
}
