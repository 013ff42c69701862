//! Error types for VM translation. Every parse error carries the source
//! file and 1-based line for the diagnostic.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VmError {
    #[error("{file}:{line}: unknown command: {command}")]
    UnknownCommand {
        file: String,
        line: usize,
        command: String,
    },

    #[error("{file}:{line}: unknown segment: {segment}")]
    UnknownSegment {
        file: String,
        line: usize,
        segment: String,
    },

    #[error("{file}:{line}: {command} expects {expected} argument(s)")]
    MissingArgument {
        file: String,
        line: usize,
        command: String,
        expected: usize,
    },

    #[error("{file}:{line}: invalid index: {value}")]
    InvalidIndex {
        file: String,
        line: usize,
        value: String,
    },

    #[error("{file}:{line}: cannot pop to the constant segment")]
    PopConstant { file: String, line: usize },

    #[error("{file}:{line}: pointer index must be 0 or 1, got {index}")]
    PointerIndex {
        file: String,
        line: usize,
        index: u16,
    },

    #[error("{file}:{line}: temp index must be 0..=7, got {index}")]
    TempIndex {
        file: String,
        line: usize,
        index: u16,
    },

    #[error("failed to read {path}: {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    FileWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no .vm files found in {path}")]
    NoVmFiles { path: String },

    #[error("not a .vm file or directory: {path}")]
    InvalidPath { path: String },
}

pub type Result<T> = std::result::Result<T, VmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostics_carry_location() {
        let err = VmError::UnknownCommand {
            file: "Main.vm".to_string(),
            line: 12,
            command: "frobnicate".to_string(),
        };
        assert_eq!(err.to_string(), "Main.vm:12: unknown command: frobnicate");
    }

    #[test]
    fn test_pop_constant_message() {
        let err = VmError::PopConstant {
            file: "Test.vm".to_string(),
            line: 3,
        };
        assert!(err.to_string().contains("constant"));
    }
}
