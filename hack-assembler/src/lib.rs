//! Two-pass assembler for the Hack instruction set.
//!
//! Pass 1 binds `(LABEL)` declarations to instruction addresses; pass 2
//! encodes instructions, allocating RAM slots from 16 upward for symbols
//! that were never declared as labels.

pub mod codegen;
pub mod error;
pub mod parser;
pub mod symbols;

use std::fmt::Write as _;

use codegen::{a_word, c_word};
use error::{AsmError, Result};
use parser::{Operand, SourceLine, parse_line};
use symbols::SymbolTable;

/// Assemble Hack assembly source into `.hack` binary text,
/// one 16-character line per instruction.
pub fn assemble(source: &str) -> Result<String> {
    let mut symbols = SymbolTable::new();
    let mut program = Vec::new();
    let mut next_addr = 0u16;

    // Pass 1: classify lines and bind labels to instruction addresses.
    for (idx, raw) in source.lines().enumerate() {
        let line_num = idx + 1;
        let line = parse_line(raw, line_num)?;
        match &line {
            SourceLine::Label(label) => {
                symbols
                    .bind_label(label.clone(), next_addr)
                    .map_err(|label| AsmError::DuplicateLabel {
                        line: line_num,
                        label,
                    })?;
            }
            SourceLine::AInstr(_) | SourceLine::CInstr { .. } => next_addr += 1,
            SourceLine::Blank => {}
        }
        program.push(line);
    }

    // Pass 2: resolve symbols and emit instruction words.
    let mut output = String::with_capacity(program.len() * 17);
    for line in &program {
        let word = match line {
            SourceLine::AInstr(Operand::Address(value)) => a_word(*value),
            SourceLine::AInstr(Operand::Symbol(symbol)) => a_word(symbols.resolve(symbol)),
            SourceLine::CInstr { dest, comp, jump } => c_word(*dest, *comp, *jump),
            SourceLine::Blank | SourceLine::Label(_) => continue,
        };
        let _ = writeln!(output, "{word:016b}");
    }

    Ok(output)
}
