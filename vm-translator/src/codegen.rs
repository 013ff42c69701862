//! Lowering of VM commands to Hack assembly.

use std::fmt::Write as _;

use crate::memory::{base_symbol, pointer_symbol, temp_address};
use crate::parser::{ArithmeticOp, Segment, VmCommand};

/// Emit one assembly instruction per line. Writing to a `String` cannot
/// fail, so the `fmt::Result` is dropped.
macro_rules! asm {
    ($out:expr, $($line:literal),+ $(,)?) => {{
        $( let _ = writeln!($out, $line); )+
    }};
}

/// Translator state threaded across commands and files.
pub struct CodeGen {
    /// Stem of the file currently being translated; prefixes static
    /// symbols and labels outside any function.
    file_stem: String,
    /// Enclosing `function` name; prefixes labels and return addresses.
    function: String,
    /// Unique-label counter for eq/gt/lt sites, translator lifetime.
    cmp_counter: usize,
    /// Return-address counter, reset at every `function` boundary.
    ret_counter: usize,
}

impl CodeGen {
    pub fn new() -> Self {
        Self {
            file_stem: String::new(),
            function: String::new(),
            cmp_counter: 0,
            ret_counter: 0,
        }
    }

    /// Must be called before translating each input file so that
    /// `static i` lowers to `@<stem>.i`.
    pub fn set_file_stem(&mut self, stem: &str) {
        self.file_stem = stem.to_string();
    }

    pub fn translate(&mut self, cmd: &VmCommand, out: &mut String) {
        match cmd {
            VmCommand::Arithmetic(op) => self.arithmetic(*op, out),
            VmCommand::Push { segment, index } => self.push(*segment, *index, out),
            VmCommand::Pop { segment, index } => self.pop(*segment, *index, out),
            VmCommand::Label(name) => {
                let label = self.scoped(name);
                asm!(out, "({label})");
            }
            VmCommand::Goto(name) => {
                let label = self.scoped(name);
                asm!(out, "@{label}", "0;JMP");
            }
            VmCommand::IfGoto(name) => {
                let label = self.scoped(name);
                asm!(out, "@SP", "AM=M-1", "D=M", "@{label}", "D;JNE");
            }
            VmCommand::Function { name, num_locals } => {
                self.emit_function(name, *num_locals, out)
            }
            VmCommand::Call { name, num_args } => self.emit_call(name, *num_args, out),
            VmCommand::Return => self.emit_return(out),
        }
    }

    /// Labels inside a function are emitted as `F$X`; before the first
    /// `function` command the file stem scopes them instead.
    fn scoped(&self, label: &str) -> String {
        let prefix = if self.function.is_empty() {
            &self.file_stem
        } else {
            &self.function
        };
        format!("{prefix}${label}")
    }

    // ------------------------------------------------------------------
    // Arithmetic
    // ------------------------------------------------------------------

    fn arithmetic(&mut self, op: ArithmeticOp, out: &mut String) {
        match op {
            ArithmeticOp::Add => self.binary("M=D+M", out),
            ArithmeticOp::Sub => self.binary("M=M-D", out),
            ArithmeticOp::And => self.binary("M=D&M", out),
            ArithmeticOp::Or => self.binary("M=D|M", out),
            ArithmeticOp::Neg => asm!(out, "@SP", "A=M-1", "M=-M"),
            ArithmeticOp::Not => asm!(out, "@SP", "A=M-1", "M=!M"),
            ArithmeticOp::Eq => self.compare("JEQ", out),
            ArithmeticOp::Gt => self.compare("JGT", out),
            ArithmeticOp::Lt => self.compare("JLT", out),
        }
    }

    /// Pop y into D, then combine with x in place at the new stack top.
    fn binary(&self, store: &str, out: &mut String) {
        asm!(out, "@SP", "AM=M-1", "D=M", "A=A-1");
        let _ = writeln!(out, "{store}");
    }

    /// Compute x - y and branch on the sign: true stores -1, false 0.
    fn compare(&mut self, jump: &str, out: &mut String) {
        let n = self.cmp_counter;
        self.cmp_counter += 1;

        asm!(out, "@SP", "AM=M-1", "D=M", "A=A-1", "D=M-D");
        asm!(
            out,
            "@CMP_TRUE_{n}",
            "D;{jump}",
            "@SP",
            "A=M-1",
            "M=0",
            "@CMP_END_{n}",
            "0;JMP",
            "(CMP_TRUE_{n})",
            "@SP",
            "A=M-1",
            "M=-1",
            "(CMP_END_{n})",
        );
    }

    // ------------------------------------------------------------------
    // Memory access
    // ------------------------------------------------------------------

    fn push(&self, segment: Segment, index: u16, out: &mut String) {
        // Stage the value in D, then write it through SP.
        match segment {
            Segment::Constant => {
                asm!(out, "@{index}", "D=A");
            }
            Segment::Local | Segment::Argument | Segment::This | Segment::That => {
                let base = base_symbol(segment).expect("indirect segment has a base");
                asm!(out, "@{index}", "D=A", "@{base}", "A=D+M", "D=M");
            }
            Segment::Temp => {
                let addr = temp_address(index);
                asm!(out, "@{addr}", "D=M");
            }
            Segment::Pointer => {
                let sym = pointer_symbol(index);
                asm!(out, "@{sym}", "D=M");
            }
            Segment::Static => {
                let stem = &self.file_stem;
                asm!(out, "@{stem}.{index}", "D=M");
            }
        }
        asm!(out, "@SP", "A=M", "M=D", "@SP", "M=M+1");
    }

    fn pop(&self, segment: Segment, index: u16, out: &mut String) {
        match segment {
            // Parser rejects `pop constant`.
            Segment::Constant => debug_assert!(false, "pop constant reached codegen"),
            Segment::Local | Segment::Argument | Segment::This | Segment::That => {
                let base = base_symbol(segment).expect("indirect segment has a base");
                // Stage the target address in R13, then pop into it.
                asm!(
                    out,
                    "@{index}",
                    "D=A",
                    "@{base}",
                    "D=D+M",
                    "@R13",
                    "M=D",
                    "@SP",
                    "AM=M-1",
                    "D=M",
                    "@R13",
                    "A=M",
                    "M=D",
                );
            }
            Segment::Temp => {
                let addr = temp_address(index);
                asm!(out, "@SP", "AM=M-1", "D=M", "@{addr}", "M=D");
            }
            Segment::Pointer => {
                let sym = pointer_symbol(index);
                asm!(out, "@SP", "AM=M-1", "D=M", "@{sym}", "M=D");
            }
            Segment::Static => {
                let stem = &self.file_stem;
                asm!(out, "@SP", "AM=M-1", "D=M", "@{stem}.{index}", "M=D");
            }
        }
    }

    // ------------------------------------------------------------------
    // Functions
    // ------------------------------------------------------------------

    fn emit_function(&mut self, name: &str, num_locals: u16, out: &mut String) {
        self.function = name.to_string();
        self.ret_counter = 0;

        asm!(out, "({name})");
        for _ in 0..num_locals {
            asm!(out, "@SP", "A=M", "M=0", "@SP", "M=M+1");
        }
    }

    fn emit_call(&mut self, name: &str, num_args: u16, out: &mut String) {
        let ret = format!("{}$ret.{}", self.ret_prefix(), self.ret_counter);
        self.ret_counter += 1;

        // Push the return address and the caller's frame pointers.
        asm!(out, "@{ret}", "D=A", "@SP", "A=M", "M=D", "@SP", "M=M+1");
        for saved in ["LCL", "ARG", "THIS", "THAT"] {
            asm!(out, "@{saved}", "D=M", "@SP", "A=M", "M=D", "@SP", "M=M+1");
        }

        // ARG = SP - 5 - num_args; LCL = SP; jump.
        let offset = num_args + 5;
        asm!(out, "@SP", "D=M", "@{offset}", "D=D-A", "@ARG", "M=D");
        asm!(out, "@SP", "D=M", "@LCL", "M=D");
        asm!(out, "@{name}", "0;JMP", "({ret})");
    }

    fn ret_prefix(&self) -> &str {
        if self.function.is_empty() {
            &self.file_stem
        } else {
            &self.function
        }
    }

    fn emit_return(&self, out: &mut String) {
        // frame = LCL (R13); retAddr = *(frame - 5) (R14).
        asm!(out, "@LCL", "D=M", "@R13", "M=D");
        asm!(out, "@5", "A=D-A", "D=M", "@R14", "M=D");

        // *ARG = pop(); SP = ARG + 1.
        asm!(out, "@SP", "AM=M-1", "D=M", "@ARG", "A=M", "M=D");
        asm!(out, "@ARG", "D=M+1", "@SP", "M=D");

        // Restore the caller's pointers, walking the frame downward.
        for restored in ["THAT", "THIS", "ARG", "LCL"] {
            asm!(out, "@R13", "AM=M-1", "D=M", "@{restored}", "M=D");
        }

        asm!(out, "@R14", "A=M", "0;JMP");
    }
}

impl Default for CodeGen {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lower(cmds: &[VmCommand]) -> String {
        let mut cg = CodeGen::new();
        cg.set_file_stem("Test");
        let mut out = String::new();
        for cmd in cmds {
            cg.translate(cmd, &mut out);
        }
        out
    }

    #[test]
    fn test_push_constant() {
        let asm = lower(&[VmCommand::Push {
            segment: Segment::Constant,
            index: 7,
        }]);
        assert_eq!(asm, "@7\nD=A\n@SP\nA=M\nM=D\n@SP\nM=M+1\n");
    }

    #[test]
    fn test_push_local_indirect() {
        let asm = lower(&[VmCommand::Push {
            segment: Segment::Local,
            index: 2,
        }]);
        assert!(asm.starts_with("@2\nD=A\n@LCL\nA=D+M\nD=M\n"));
    }

    #[test]
    fn test_pop_argument_stages_address() {
        let asm = lower(&[VmCommand::Pop {
            segment: Segment::Argument,
            index: 3,
        }]);
        assert!(asm.contains("@3\nD=A\n@ARG\nD=D+M\n@R13\nM=D\n"));
        assert!(asm.ends_with("@R13\nA=M\nM=D\n"));
    }

    #[test]
    fn test_temp_and_pointer_addressing() {
        let asm = lower(&[
            VmCommand::Push {
                segment: Segment::Temp,
                index: 3,
            },
            VmCommand::Pop {
                segment: Segment::Pointer,
                index: 1,
            },
        ]);
        assert!(asm.contains("@8\nD=M"));
        assert!(asm.contains("@THAT\nM=D"));
    }

    #[test]
    fn test_static_uses_file_stem() {
        let asm = lower(&[
            VmCommand::Push {
                segment: Segment::Static,
                index: 4,
            },
            VmCommand::Pop {
                segment: Segment::Static,
                index: 4,
            },
        ]);
        assert_eq!(asm.matches("@Test.4").count(), 2);
    }

    #[test]
    fn test_binary_and_unary_ops() {
        let asm = lower(&[
            VmCommand::Arithmetic(ArithmeticOp::Add),
            VmCommand::Arithmetic(ArithmeticOp::Sub),
            VmCommand::Arithmetic(ArithmeticOp::Neg),
        ]);
        assert!(asm.contains("M=D+M"));
        assert!(asm.contains("M=M-D"));
        assert!(asm.contains("A=M-1\nM=-M"));
    }

    #[test]
    fn test_comparison_labels_unique() {
        let asm = lower(&[
            VmCommand::Arithmetic(ArithmeticOp::Eq),
            VmCommand::Arithmetic(ArithmeticOp::Lt),
        ]);
        assert!(asm.contains("D;JEQ"));
        assert!(asm.contains("D;JLT"));
        assert!(asm.contains("(CMP_TRUE_0)"));
        assert!(asm.contains("(CMP_TRUE_1)"));
        assert!(asm.contains("(CMP_END_0)"));
        assert!(asm.contains("(CMP_END_1)"));
    }

    #[test]
    fn test_labels_scoped_by_function() {
        let asm = lower(&[
            VmCommand::Function {
                name: "Foo.bar".to_string(),
                num_locals: 0,
            },
            VmCommand::Label("LOOP".to_string()),
            VmCommand::Goto("LOOP".to_string()),
            VmCommand::IfGoto("LOOP".to_string()),
        ]);
        assert!(asm.contains("(Foo.bar$LOOP)"));
        assert!(asm.contains("@Foo.bar$LOOP\n0;JMP"));
        assert!(asm.contains("@Foo.bar$LOOP\nD;JNE"));
    }

    #[test]
    fn test_labels_scoped_by_file_outside_function() {
        let asm = lower(&[VmCommand::Label("TOP".to_string())]);
        assert_eq!(asm, "(Test$TOP)\n");
    }

    #[test]
    fn test_function_initializes_locals() {
        let asm = lower(&[VmCommand::Function {
            name: "Foo.bar".to_string(),
            num_locals: 3,
        }]);
        assert!(asm.starts_with("(Foo.bar)\n"));
        assert_eq!(asm.matches("M=0").count(), 3);
    }

    #[test]
    fn test_call_frame_layout() {
        let asm = lower(&[
            VmCommand::Function {
                name: "Main.main".to_string(),
                num_locals: 0,
            },
            VmCommand::Call {
                name: "Foo.bar".to_string(),
                num_args: 2,
            },
        ]);
        assert!(asm.contains("@Main.main$ret.0\nD=A"));
        // ARG = SP - (2 + 5)
        assert!(asm.contains("@7\nD=D-A\n@ARG\nM=D"));
        assert!(asm.contains("@Foo.bar\n0;JMP\n(Main.main$ret.0)"));
    }

    #[test]
    fn test_return_counter_resets_per_function() {
        let asm = lower(&[
            VmCommand::Function {
                name: "A.f".to_string(),
                num_locals: 0,
            },
            VmCommand::Call {
                name: "B.g".to_string(),
                num_args: 0,
            },
            VmCommand::Function {
                name: "B.g".to_string(),
                num_locals: 0,
            },
            VmCommand::Call {
                name: "A.f".to_string(),
                num_args: 0,
            },
        ]);
        assert!(asm.contains("(A.f$ret.0)"));
        assert!(asm.contains("(B.g$ret.0)"));
    }

    #[test]
    fn test_return_sequence() {
        let asm = lower(&[VmCommand::Return]);
        assert!(asm.starts_with("@LCL\nD=M\n@R13\nM=D\n@5\nA=D-A\nD=M\n@R14\nM=D\n"));
        assert!(asm.contains("@ARG\nD=M+1\n@SP\nM=D"));
        // THAT, THIS, ARG, LCL restored in frame order.
        let that = asm.find("@THAT\nM=D").unwrap();
        let this = asm.find("@THIS\nM=D").unwrap();
        let lcl = asm.rfind("@LCL\nM=D").unwrap();
        assert!(that < this && this < lcl);
        assert!(asm.ends_with("@R14\nA=M\n0;JMP\n"));
    }
}
