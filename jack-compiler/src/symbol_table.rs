//! Two-scope symbol table: class scope (static/field) and subroutine
//! scope (argument/local). Lookup tries the subroutine scope first, so
//! locals shadow class variables. Each kind keeps a dense 0-based index
//! counter.

use std::collections::HashMap;

use crate::ast::JackType;
use crate::error::{CompileError, Result};
use crate::token::Span;

/// Variable kind; determines the VM segment and index space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Static,
    Field,
    Arg,
    Var,
}

impl VarKind {
    #[inline]
    pub fn segment(self) -> &'static str {
        match self {
            VarKind::Static => "static",
            VarKind::Field => "this",
            VarKind::Arg => "argument",
            VarKind::Var => "local",
        }
    }

    #[inline]
    fn is_class_level(self) -> bool {
        matches!(self, VarKind::Static | VarKind::Field)
    }
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub ty: JackType,
    pub kind: VarKind,
    pub index: u16,
}

impl Symbol {
    #[inline]
    pub fn segment(&self) -> &'static str {
        self.kind.segment()
    }
}

#[derive(Debug, Default)]
pub struct SymbolTable {
    class_scope: HashMap<String, Symbol>,
    subroutine_scope: HashMap<String, Symbol>,
    static_count: u16,
    field_count: u16,
    arg_count: u16,
    var_count: u16,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset everything at a class boundary.
    pub fn start_class(&mut self) {
        self.class_scope.clear();
        self.subroutine_scope.clear();
        self.static_count = 0;
        self.field_count = 0;
        self.arg_count = 0;
        self.var_count = 0;
    }

    /// Reset the subroutine scope; class symbols stay visible.
    pub fn start_subroutine(&mut self) {
        self.subroutine_scope.clear();
        self.arg_count = 0;
        self.var_count = 0;
    }

    /// Define a symbol in the scope its kind belongs to. Redefinition
    /// within one scope is a fatal error.
    pub fn define(&mut self, name: &str, ty: JackType, kind: VarKind, span: Span) -> Result<()> {
        let scope = if kind.is_class_level() {
            &mut self.class_scope
        } else {
            &mut self.subroutine_scope
        };

        if scope.contains_key(name) {
            return Err(CompileError::duplicate_definition(name, span));
        }

        let counter = match kind {
            VarKind::Static => &mut self.static_count,
            VarKind::Field => &mut self.field_count,
            VarKind::Arg => &mut self.arg_count,
            VarKind::Var => &mut self.var_count,
        };
        let index = *counter;
        *counter += 1;

        scope.insert(
            name.to_string(),
            Symbol {
                name: name.to_string(),
                ty,
                kind,
                index,
            },
        );
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.subroutine_scope
            .get(name)
            .or_else(|| self.class_scope.get(name))
    }

    pub fn count(&self, kind: VarKind) -> u16 {
        match kind {
            VarKind::Static => self.static_count,
            VarKind::Field => self.field_count,
            VarKind::Arg => self.arg_count,
            VarKind::Var => self.var_count,
        }
    }

    /// Words a constructor must allocate.
    #[inline]
    pub fn field_count(&self) -> u16 {
        self.field_count
    }
}
