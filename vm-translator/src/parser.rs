//! Line-oriented parser for the 20 VM commands.

use crate::error::{Result, VmError};

/// The nine arithmetic/logical stack operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

impl ArithmeticOp {
    fn from_str(s: &str) -> Option<Self> {
        match s {
            "add" => Some(Self::Add),
            "sub" => Some(Self::Sub),
            "neg" => Some(Self::Neg),
            "eq" => Some(Self::Eq),
            "gt" => Some(Self::Gt),
            "lt" => Some(Self::Lt),
            "and" => Some(Self::And),
            "or" => Some(Self::Or),
            "not" => Some(Self::Not),
            _ => None,
        }
    }
}

/// The eight memory segments addressable by push/pop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Constant,
    Local,
    Argument,
    This,
    That,
    Temp,
    Pointer,
    Static,
}

/// A parsed VM command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VmCommand {
    Arithmetic(ArithmeticOp),
    Push { segment: Segment, index: u16 },
    Pop { segment: Segment, index: u16 },
    Label(String),
    Goto(String),
    IfGoto(String),
    Function { name: String, num_locals: u16 },
    Call { name: String, num_args: u16 },
    Return,
}

struct LineContext<'a> {
    file: &'a str,
    line: usize,
}

impl LineContext<'_> {
    fn missing(&self, command: &str, expected: usize) -> VmError {
        VmError::MissingArgument {
            file: self.file.to_string(),
            line: self.line,
            command: command.to_string(),
            expected,
        }
    }

    fn segment(&self, s: &str) -> Result<Segment> {
        match s {
            "constant" => Ok(Segment::Constant),
            "local" => Ok(Segment::Local),
            "argument" => Ok(Segment::Argument),
            "this" => Ok(Segment::This),
            "that" => Ok(Segment::That),
            "temp" => Ok(Segment::Temp),
            "pointer" => Ok(Segment::Pointer),
            "static" => Ok(Segment::Static),
            _ => Err(VmError::UnknownSegment {
                file: self.file.to_string(),
                line: self.line,
                segment: s.to_string(),
            }),
        }
    }

    fn index(&self, s: &str) -> Result<u16> {
        s.parse::<u16>().map_err(|_| VmError::InvalidIndex {
            file: self.file.to_string(),
            line: self.line,
            value: s.to_string(),
        })
    }

    fn check_range(&self, segment: Segment, index: u16) -> Result<()> {
        match segment {
            Segment::Pointer if index > 1 => Err(VmError::PointerIndex {
                file: self.file.to_string(),
                line: self.line,
                index,
            }),
            Segment::Temp if index > 7 => Err(VmError::TempIndex {
                file: self.file.to_string(),
                line: self.line,
                index,
            }),
            _ => Ok(()),
        }
    }
}

/// Parse one source line. Blank lines and comments yield `None`.
pub fn parse_line(raw: &str, line_num: usize, file: &str) -> Result<Option<VmCommand>> {
    let text = raw.split("//").next().unwrap_or("").trim();
    if text.is_empty() {
        return Ok(None);
    }

    let ctx = LineContext {
        file,
        line: line_num,
    };
    let mut words = text.split_whitespace();
    let command = words.next().unwrap_or("");
    let arg1 = words.next();
    let arg2 = words.next();

    if let Some(op) = ArithmeticOp::from_str(command) {
        return Ok(Some(VmCommand::Arithmetic(op)));
    }

    let cmd = match command {
        "push" => {
            let segment = ctx.segment(arg1.ok_or_else(|| ctx.missing("push", 2))?)?;
            let index = ctx.index(arg2.ok_or_else(|| ctx.missing("push", 2))?)?;
            ctx.check_range(segment, index)?;
            VmCommand::Push { segment, index }
        }
        "pop" => {
            let segment = ctx.segment(arg1.ok_or_else(|| ctx.missing("pop", 2))?)?;
            if segment == Segment::Constant {
                return Err(VmError::PopConstant {
                    file: file.to_string(),
                    line: line_num,
                });
            }
            let index = ctx.index(arg2.ok_or_else(|| ctx.missing("pop", 2))?)?;
            ctx.check_range(segment, index)?;
            VmCommand::Pop { segment, index }
        }
        "label" => VmCommand::Label(
            arg1.ok_or_else(|| ctx.missing("label", 1))?.to_string(),
        ),
        "goto" => VmCommand::Goto(arg1.ok_or_else(|| ctx.missing("goto", 1))?.to_string()),
        "if-goto" => {
            VmCommand::IfGoto(arg1.ok_or_else(|| ctx.missing("if-goto", 1))?.to_string())
        }
        "function" => VmCommand::Function {
            name: arg1.ok_or_else(|| ctx.missing("function", 2))?.to_string(),
            num_locals: ctx.index(arg2.ok_or_else(|| ctx.missing("function", 2))?)?,
        },
        "call" => VmCommand::Call {
            name: arg1.ok_or_else(|| ctx.missing("call", 2))?.to_string(),
            num_args: ctx.index(arg2.ok_or_else(|| ctx.missing("call", 2))?)?,
        },
        "return" => VmCommand::Return,
        _ => {
            return Err(VmError::UnknownCommand {
                file: file.to_string(),
                line: line_num,
                command: command.to_string(),
            });
        }
    };

    Ok(Some(cmd))
}
