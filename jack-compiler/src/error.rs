//! Compilation errors. The first error aborts the unit being compiled.

use std::path::PathBuf;
use thiserror::Error;

use crate::token::Span;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("lexical error at {span}: {message}")]
    Lexical { span: Span, message: String },

    #[error("syntax error at {span}: {message}")]
    Syntax { span: Span, message: String },

    #[error("undefined variable '{name}' at {span}")]
    UndefinedVariable { name: String, span: Span },

    #[error("duplicate definition of '{name}' at {span}")]
    DuplicateDefinition { name: String, span: Span },

    #[error("IO error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CompileError {
    pub fn lexical(span: Span, message: impl Into<String>) -> Self {
        Self::Lexical {
            span,
            message: message.into(),
        }
    }

    pub fn syntax(span: Span, message: impl Into<String>) -> Self {
        Self::Syntax {
            span,
            message: message.into(),
        }
    }

    pub fn undefined_variable(name: impl Into<String>, span: Span) -> Self {
        Self::UndefinedVariable {
            name: name.into(),
            span,
        }
    }

    pub fn duplicate_definition(name: impl Into<String>, span: Span) -> Self {
        Self::DuplicateDefinition {
            name: name.into(),
            span,
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, CompileError>;
