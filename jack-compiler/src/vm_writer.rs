//! Text emitter for VM commands.

use std::fmt::Write as _;

#[derive(Debug, Default)]
pub struct VmWriter {
    output: String,
}

impl VmWriter {
    pub fn new() -> Self {
        Self {
            output: String::with_capacity(8 * 1024),
        }
    }

    pub fn write_push(&mut self, segment: &str, index: u16) {
        let _ = writeln!(self.output, "push {segment} {index}");
    }

    pub fn write_pop(&mut self, segment: &str, index: u16) {
        let _ = writeln!(self.output, "pop {segment} {index}");
    }

    pub fn write_arithmetic(&mut self, command: &str) {
        let _ = writeln!(self.output, "{command}");
    }

    pub fn write_label(&mut self, label: &str) {
        let _ = writeln!(self.output, "label {label}");
    }

    pub fn write_goto(&mut self, label: &str) {
        let _ = writeln!(self.output, "goto {label}");
    }

    pub fn write_if_goto(&mut self, label: &str) {
        let _ = writeln!(self.output, "if-goto {label}");
    }

    pub fn write_function(&mut self, name: &str, num_locals: u16) {
        let _ = writeln!(self.output, "function {name} {num_locals}");
    }

    pub fn write_call(&mut self, name: &str, num_args: u16) {
        let _ = writeln!(self.output, "call {name} {num_args}");
    }

    pub fn write_return(&mut self) {
        self.output.push_str("return\n");
    }

    pub fn as_str(&self) -> &str {
        &self.output
    }

    pub fn into_output(self) -> String {
        self.output
    }
}
