use thiserror::Error;

#[derive(Error, Debug)]
pub enum AsmError {
    #[error("line {line}: A-instruction operand out of range (0..=32767): {operand}")]
    AddressOutOfRange { line: usize, operand: String },

    #[error("line {line}: empty A-instruction operand")]
    EmptyAddress { line: usize },

    #[error("line {line}: label '{label}' declared more than once")]
    DuplicateLabel { line: usize, label: String },

    #[error("line {line}: malformed label declaration: {text}")]
    MalformedLabel { line: usize, text: String },

    #[error("line {line}: unknown dest mnemonic: {dest}")]
    UnknownDest { line: usize, dest: String },

    #[error("line {line}: unknown comp mnemonic: {comp}")]
    UnknownComp { line: usize, comp: String },

    #[error("line {line}: unknown jump mnemonic: {jump}")]
    UnknownJump { line: usize, jump: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AsmError>;
