//! Line classification for Hack assembly source.

use phf::phf_map;

use crate::error::{AsmError, Result};

/// A-instruction operand before symbol resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Address(u16),
    Symbol(String),
}

/// One source line after comment/whitespace stripping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLine {
    Blank,
    Label(String),
    AInstr(Operand),
    CInstr { dest: u8, comp: u8, jump: u8 },
}

/// Comp field encodings, 7 bits: the `a` bit selects the A/M operand,
/// the low 6 bits are shared across each A/M pair. Commutative spellings
/// map to the same word.
static COMP: phf::Map<&'static str, u8> = phf_map! {
    "0" => 0b0101010,
    "1" => 0b0111111,
    "-1" => 0b0111010,
    "D" => 0b0001100,
    "A" => 0b0110000,
    "M" => 0b1110000,
    "!D" => 0b0001101,
    "!A" => 0b0110001,
    "!M" => 0b1110001,
    "-D" => 0b0001111,
    "-A" => 0b0110011,
    "-M" => 0b1110011,
    "D+1" => 0b0011111, "1+D" => 0b0011111,
    "A+1" => 0b0110111, "1+A" => 0b0110111,
    "M+1" => 0b1110111, "1+M" => 0b1110111,
    "D-1" => 0b0001110,
    "A-1" => 0b0110010,
    "M-1" => 0b1110010,
    "D+A" => 0b0000010, "A+D" => 0b0000010,
    "D+M" => 0b1000010, "M+D" => 0b1000010,
    "D-A" => 0b0010011,
    "D-M" => 0b1010011,
    "A-D" => 0b0000111,
    "M-D" => 0b1000111,
    "D&A" => 0b0000000, "A&D" => 0b0000000,
    "D&M" => 0b1000000, "M&D" => 0b1000000,
    "D|A" => 0b0010101, "A|D" => 0b0010101,
    "D|M" => 0b1010101, "M|D" => 0b1010101,
};

/// Drop a trailing `//` comment and surrounding whitespace.
fn strip_line(line: &str) -> &str {
    line.split("//").next().unwrap_or("").trim()
}

fn parse_a_operand(operand: &str, line_num: usize) -> Result<Operand> {
    if operand.is_empty() {
        return Err(AsmError::EmptyAddress { line: line_num });
    }

    // A digit-leading operand must be a decimal constant in 15-bit range;
    // anything else is a symbol (VM output uses '.', '$' and ':' freely).
    if operand.starts_with(|c: char| c.is_ascii_digit()) {
        return match operand.parse::<u16>() {
            Ok(value) if value <= 32767 => Ok(Operand::Address(value)),
            _ => Err(AsmError::AddressOutOfRange {
                line: line_num,
                operand: operand.to_string(),
            }),
        };
    }

    Ok(Operand::Symbol(operand.to_string()))
}

/// Dest field, 3 bits `ADM`: one bit per register named in the text.
fn parse_dest(s: &str) -> Option<u8> {
    let mut bits = 0u8;
    for c in s.chars() {
        let bit = match c {
            'A' => 0b100,
            'D' => 0b010,
            'M' => 0b001,
            _ => return None,
        };
        if bits & bit != 0 {
            return None;
        }
        bits |= bit;
    }
    Some(bits)
}

fn parse_jump(s: &str) -> Option<u8> {
    match s {
        "" => Some(0b000),
        "JGT" => Some(0b001),
        "JEQ" => Some(0b010),
        "JGE" => Some(0b011),
        "JLT" => Some(0b100),
        "JNE" => Some(0b101),
        "JLE" => Some(0b110),
        "JMP" => Some(0b111),
        _ => None,
    }
}

fn parse_c_instruction(text: &str, line_num: usize) -> Result<SourceLine> {
    let (dest_str, rest) = match text.split_once('=') {
        Some((dest, rest)) => (dest, rest),
        None => ("", text),
    };
    let (comp_str, jump_str) = match rest.split_once(';') {
        Some((comp, jump)) => (comp, jump),
        None => (rest, ""),
    };

    let dest = parse_dest(dest_str).ok_or_else(|| AsmError::UnknownDest {
        line: line_num,
        dest: dest_str.to_string(),
    })?;
    let comp = COMP
        .get(comp_str)
        .copied()
        .ok_or_else(|| AsmError::UnknownComp {
            line: line_num,
            comp: comp_str.to_string(),
        })?;
    let jump = parse_jump(jump_str).ok_or_else(|| AsmError::UnknownJump {
        line: line_num,
        jump: jump_str.to_string(),
    })?;

    Ok(SourceLine::CInstr { dest, comp, jump })
}

/// Classify one raw source line. `line_num` is 1-based, for diagnostics.
pub fn parse_line(line: &str, line_num: usize) -> Result<SourceLine> {
    let text = strip_line(line);

    if text.is_empty() {
        return Ok(SourceLine::Blank);
    }

    if let Some(rest) = text.strip_prefix('(') {
        let label = rest
            .strip_suffix(')')
            .ok_or_else(|| AsmError::MalformedLabel {
                line: line_num,
                text: text.to_string(),
            })?;
        if label.is_empty() {
            return Err(AsmError::MalformedLabel {
                line: line_num,
                text: text.to_string(),
            });
        }
        return Ok(SourceLine::Label(label.to_string()));
    }

    if let Some(operand) = text.strip_prefix('@') {
        return Ok(SourceLine::AInstr(parse_a_operand(operand, line_num)?));
    }

    parse_c_instruction(text, line_num)
}
