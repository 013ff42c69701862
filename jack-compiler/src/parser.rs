//! Recursive descent parser for the Jack grammar.
//!
//! The token cursor gives single-token lookahead, which the grammar
//! never needs to exceed. There is no error recovery: the first syntax
//! error propagates out and aborts the unit.

use crate::ast::*;
use crate::error::{CompileError, Result};
use crate::token::{Keyword, Span, SpannedToken, Token};

/// Bail-out bound for expression nesting, so pathological input like
/// `((((...))))` cannot overflow the stack.
const MAX_DEPTH: usize = 64;

pub struct Parser<'a> {
    tokens: &'a [SpannedToken],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [SpannedToken]) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    pub fn parse(mut self) -> Result<Class> {
        self.parse_class()
    }

    // ====================================================================
    // Cursor
    // ====================================================================

    fn current(&self) -> Option<&SpannedToken> {
        self.tokens.get(self.pos)
    }

    /// Position for diagnostics; past the end, the last token's position.
    fn current_span(&self) -> Span {
        self.current()
            .or_else(|| self.tokens.last())
            .map(|t| t.span)
            .unwrap_or(Span::new(1, 1))
    }

    fn peek_token(&self) -> Option<&Token> {
        self.current().map(|t| &t.token)
    }

    fn peek_keyword(&self) -> Option<Keyword> {
        match self.peek_token() {
            Some(Token::Keyword(k)) => Some(*k),
            _ => None,
        }
    }

    fn peek_symbol(&self) -> Option<char> {
        match self.peek_token() {
            Some(Token::Symbol(c)) => Some(*c),
            _ => None,
        }
    }

    fn advance(&mut self) -> Option<&SpannedToken> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    fn describe_current(&self) -> String {
        self.peek_token()
            .map(|t| t.to_string())
            .unwrap_or_else(|| "end of file".to_string())
    }

    fn expected(&self, what: &str) -> CompileError {
        CompileError::syntax(
            self.current_span(),
            format!("expected {}, got {}", what, self.describe_current()),
        )
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<()> {
        if self.peek_keyword() == Some(keyword) {
            self.advance();
            Ok(())
        } else {
            Err(self.expected(&format!("'{}'", keyword.as_str())))
        }
    }

    fn expect_symbol(&mut self, symbol: char) -> Result<()> {
        if self.peek_symbol() == Some(symbol) {
            self.advance();
            Ok(())
        } else {
            Err(self.expected(&format!("'{symbol}'")))
        }
    }

    fn expect_identifier(&mut self) -> Result<(String, Span)> {
        match self.peek_token() {
            Some(Token::Identifier(name)) => {
                let name = name.clone();
                let span = self.advance().map(|t| t.span).unwrap_or(Span::new(1, 1));
                Ok((name, span))
            }
            _ => Err(self.expected("identifier")),
        }
    }

    // ====================================================================
    // Grammar
    // ====================================================================

    /// class := 'class' ID '{' classVarDec* subroutineDec* '}'
    fn parse_class(&mut self) -> Result<Class> {
        self.expect_keyword(Keyword::Class)?;
        let (name, _) = self.expect_identifier()?;
        self.expect_symbol('{')?;

        let mut var_decs = Vec::new();
        while matches!(self.peek_keyword(), Some(Keyword::Static | Keyword::Field)) {
            var_decs.push(self.parse_class_var_dec()?);
        }

        let mut subroutines = Vec::new();
        while matches!(
            self.peek_keyword(),
            Some(Keyword::Constructor | Keyword::Function | Keyword::Method)
        ) {
            subroutines.push(self.parse_subroutine_dec()?);
        }

        self.expect_symbol('}')?;

        Ok(Class {
            name,
            var_decs,
            subroutines,
        })
    }

    /// classVarDec := ('static'|'field') type ID (',' ID)* ';'
    fn parse_class_var_dec(&mut self) -> Result<ClassVarDec> {
        let span = self.current_span();
        let kind = match self.peek_keyword() {
            Some(Keyword::Static) => ClassVarKind::Static,
            Some(Keyword::Field) => ClassVarKind::Field,
            _ => return Err(self.expected("'static' or 'field'")),
        };
        self.advance();

        let ty = self.parse_type()?;
        let names = self.parse_name_list()?;
        self.expect_symbol(';')?;

        Ok(ClassVarDec {
            kind,
            ty,
            names,
            span,
        })
    }

    /// type := 'int' | 'char' | 'boolean' | ID
    fn parse_type(&mut self) -> Result<JackType> {
        let ty = match self.peek_token() {
            Some(Token::Keyword(Keyword::Int)) => JackType::Int,
            Some(Token::Keyword(Keyword::Char)) => JackType::Char,
            Some(Token::Keyword(Keyword::Boolean)) => JackType::Boolean,
            Some(Token::Identifier(name)) => JackType::Class(name.clone()),
            _ => return Err(self.expected("type (int, char, boolean, or class name)")),
        };
        self.advance();
        Ok(ty)
    }

    /// ID (',' ID)*
    fn parse_name_list(&mut self) -> Result<Vec<String>> {
        let mut names = vec![self.expect_identifier()?.0];
        while self.peek_symbol() == Some(',') {
            self.advance();
            names.push(self.expect_identifier()?.0);
        }
        Ok(names)
    }

    /// subroutineDec := ('constructor'|'function'|'method') (type|'void')
    ///                  ID '(' paramList ')' subroutineBody
    fn parse_subroutine_dec(&mut self) -> Result<SubroutineDec> {
        let span = self.current_span();
        let kind = match self.peek_keyword() {
            Some(Keyword::Constructor) => SubroutineKind::Constructor,
            Some(Keyword::Function) => SubroutineKind::Function,
            Some(Keyword::Method) => SubroutineKind::Method,
            _ => return Err(self.expected("'constructor', 'function', or 'method'")),
        };
        self.advance();

        let return_type = if self.peek_keyword() == Some(Keyword::Void) {
            self.advance();
            ReturnType::Void
        } else {
            ReturnType::Type(self.parse_type()?)
        };

        let (name, _) = self.expect_identifier()?;
        self.expect_symbol('(')?;
        let params = self.parse_param_list()?;
        self.expect_symbol(')')?;
        let body = self.parse_subroutine_body()?;

        Ok(SubroutineDec {
            kind,
            return_type,
            name,
            params,
            body,
            span,
        })
    }

    /// paramList := ((type ID) (',' type ID)*)?
    fn parse_param_list(&mut self) -> Result<Vec<Param>> {
        let mut params = Vec::new();
        if self.peek_symbol() == Some(')') {
            return Ok(params);
        }

        loop {
            let ty = self.parse_type()?;
            let (name, _) = self.expect_identifier()?;
            params.push(Param { ty, name });

            if self.peek_symbol() == Some(',') {
                self.advance();
            } else {
                break;
            }
        }
        Ok(params)
    }

    /// subroutineBody := '{' varDec* statements '}'
    fn parse_subroutine_body(&mut self) -> Result<SubroutineBody> {
        self.expect_symbol('{')?;

        let mut var_decs = Vec::new();
        while self.peek_keyword() == Some(Keyword::Var) {
            var_decs.push(self.parse_var_dec()?);
        }

        let statements = self.parse_statements()?;
        self.expect_symbol('}')?;

        Ok(SubroutineBody {
            var_decs,
            statements,
        })
    }

    /// varDec := 'var' type ID (',' ID)* ';'
    fn parse_var_dec(&mut self) -> Result<VarDec> {
        let span = self.current_span();
        self.expect_keyword(Keyword::Var)?;
        let ty = self.parse_type()?;
        let names = self.parse_name_list()?;
        self.expect_symbol(';')?;
        Ok(VarDec { ty, names, span })
    }

    /// statements := statement*
    fn parse_statements(&mut self) -> Result<Vec<Statement>> {
        let mut statements = Vec::new();
        loop {
            let stmt = match self.peek_keyword() {
                Some(Keyword::Let) => Statement::Let(self.parse_let()?),
                Some(Keyword::If) => Statement::If(self.parse_if()?),
                Some(Keyword::While) => Statement::While(self.parse_while()?),
                Some(Keyword::Do) => Statement::Do(self.parse_do()?),
                Some(Keyword::Return) => Statement::Return(self.parse_return()?),
                _ => break,
            };
            statements.push(stmt);
        }
        Ok(statements)
    }

    /// letStmt := 'let' ID ('[' expr ']')? '=' expr ';'
    fn parse_let(&mut self) -> Result<LetStatement> {
        self.expect_keyword(Keyword::Let)?;
        let (var_name, span) = self.expect_identifier()?;

        let index = if self.peek_symbol() == Some('[') {
            self.advance();
            let expr = self.parse_expression()?;
            self.expect_symbol(']')?;
            Some(expr)
        } else {
            None
        };

        self.expect_symbol('=')?;
        let value = self.parse_expression()?;
        self.expect_symbol(';')?;

        Ok(LetStatement {
            var_name,
            index,
            value,
            span,
        })
    }

    /// ifStmt := 'if' '(' expr ')' '{' statements '}'
    ///           ('else' '{' statements '}')?
    fn parse_if(&mut self) -> Result<IfStatement> {
        self.expect_keyword(Keyword::If)?;
        self.expect_symbol('(')?;
        let condition = self.parse_expression()?;
        self.expect_symbol(')')?;
        self.expect_symbol('{')?;
        let then_branch = self.parse_statements()?;
        self.expect_symbol('}')?;

        let else_branch = if self.peek_keyword() == Some(Keyword::Else) {
            self.advance();
            self.expect_symbol('{')?;
            let statements = self.parse_statements()?;
            self.expect_symbol('}')?;
            Some(statements)
        } else {
            None
        };

        Ok(IfStatement {
            condition,
            then_branch,
            else_branch,
        })
    }

    /// whileStmt := 'while' '(' expr ')' '{' statements '}'
    fn parse_while(&mut self) -> Result<WhileStatement> {
        self.expect_keyword(Keyword::While)?;
        self.expect_symbol('(')?;
        let condition = self.parse_expression()?;
        self.expect_symbol(')')?;
        self.expect_symbol('{')?;
        let body = self.parse_statements()?;
        self.expect_symbol('}')?;

        Ok(WhileStatement { condition, body })
    }

    /// doStmt := 'do' subroutineCall ';'
    fn parse_do(&mut self) -> Result<DoStatement> {
        self.expect_keyword(Keyword::Do)?;
        let (first, span) = self.expect_identifier()?;
        let call = self.parse_call_after_identifier(first, span)?;
        self.expect_symbol(';')?;
        Ok(DoStatement { call })
    }

    /// returnStmt := 'return' expr? ';'
    fn parse_return(&mut self) -> Result<ReturnStatement> {
        self.expect_keyword(Keyword::Return)?;
        let value = if self.peek_symbol() == Some(';') {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_symbol(';')?;
        Ok(ReturnStatement { value })
    }

    /// expr := term (op term)*
    fn parse_expression(&mut self) -> Result<Expression> {
        self.enter()?;
        let result = self.parse_expression_inner();
        self.depth -= 1;
        result
    }

    fn parse_expression_inner(&mut self) -> Result<Expression> {
        let head = self.parse_term()?;
        let mut tail = Vec::new();

        while let Some(op) = self.peek_symbol().and_then(BinaryOp::from_char) {
            self.advance();
            tail.push((op, self.parse_term()?));
        }

        Ok(Expression { head, tail })
    }

    /// term := INT | STR | keywordConst | ID | ID '[' expr ']'
    ///       | '(' expr ')' | unaryOp term | subroutineCall
    fn parse_term(&mut self) -> Result<Term> {
        self.enter()?;
        let result = self.parse_term_inner();
        self.depth -= 1;
        result
    }

    fn parse_term_inner(&mut self) -> Result<Term> {
        let span = self.current_span();

        match self.peek_token().cloned() {
            Some(Token::IntConst(n)) => {
                self.advance();
                Ok(Term::IntConst(n))
            }
            Some(Token::StrConst(s)) => {
                self.advance();
                Ok(Term::StrConst(s))
            }
            Some(Token::Keyword(k)) => {
                let constant = match k {
                    Keyword::True => KeywordConst::True,
                    Keyword::False => KeywordConst::False,
                    Keyword::Null => KeywordConst::Null,
                    Keyword::This => KeywordConst::This,
                    _ => return Err(self.expected("term")),
                };
                self.advance();
                Ok(Term::KeywordConst(constant))
            }
            Some(Token::Symbol('(')) => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect_symbol(')')?;
                Ok(Term::Paren(Box::new(expr)))
            }
            Some(Token::Symbol('-')) => {
                self.advance();
                Ok(Term::Unary(UnaryOp::Neg, Box::new(self.parse_term()?)))
            }
            Some(Token::Symbol('~')) => {
                self.advance();
                Ok(Term::Unary(UnaryOp::Not, Box::new(self.parse_term()?)))
            }
            Some(Token::Identifier(name)) => {
                self.advance();
                match self.peek_symbol() {
                    Some('[') => {
                        self.advance();
                        let index = self.parse_expression()?;
                        self.expect_symbol(']')?;
                        Ok(Term::Index(name, Box::new(index), span))
                    }
                    Some('(') | Some('.') => {
                        Ok(Term::Call(self.parse_call_after_identifier(name, span)?))
                    }
                    _ => Ok(Term::Var(name, span)),
                }
            }
            _ => Err(self.expected("term")),
        }
    }

    /// Remainder of a subroutine call once the leading identifier is
    /// consumed: either `(exprList)` or `.ID(exprList)`.
    fn parse_call_after_identifier(&mut self, first: String, span: Span) -> Result<SubroutineCall> {
        let (qualifier, name) = if self.peek_symbol() == Some('.') {
            self.advance();
            let (method, _) = self.expect_identifier()?;
            (Some(first), method)
        } else {
            (None, first)
        };

        self.expect_symbol('(')?;
        let args = self.parse_expression_list()?;
        self.expect_symbol(')')?;

        Ok(SubroutineCall {
            qualifier,
            name,
            args,
            span,
        })
    }

    /// exprList := (expr (',' expr)*)?
    fn parse_expression_list(&mut self) -> Result<Vec<Expression>> {
        let mut args = Vec::new();
        if self.peek_symbol() == Some(')') {
            return Ok(args);
        }

        args.push(self.parse_expression()?);
        while self.peek_symbol() == Some(',') {
            self.advance();
            args.push(self.parse_expression()?);
        }
        Ok(args)
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(CompileError::syntax(
                self.current_span(),
                "expression nesting too deep",
            ));
        }
        Ok(())
    }
}
