//! Jack-to-VM compiler.
//!
//! Pipeline per class: tokenize -> recursive-descent parse -> symbol
//! resolution and tree-walking VM emission. Each `.jack` file holds one
//! class and compiles independently to a sibling `.vm` file; classes
//! link by name convention at VM load time.

pub mod ast;
pub mod codegen;
pub mod error;
pub mod parser;
pub mod symbol_table;
pub mod token;
pub mod tokenizer;
pub mod vm_writer;

use rayon::prelude::*;
use std::fs;
use std::path::Path;

pub use codegen::CodeGen;
pub use error::{CompileError, Result};
pub use symbol_table::{Symbol, SymbolTable, VarKind};
pub use vm_writer::VmWriter;

/// One compiled unit of a directory run.
#[derive(Debug)]
pub struct CompileResult {
    /// File stem; the output file is `<stem>.vm`.
    pub filename: String,
    pub outcome: Result<String>,
}

impl CompileResult {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Compile Jack source text to VM code.
pub fn compile_source(source: &str) -> Result<String> {
    let tokens = tokenizer::Tokenizer::new(source).tokenize()?;
    let class = parser::Parser::new(&tokens).parse()?;
    CodeGen::compile(&class)
}

/// Compile one `.jack` file.
pub fn compile_file(path: &Path) -> CompileResult {
    let filename = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string();

    let outcome = fs::read_to_string(path)
        .map_err(|e| CompileError::io(path, e))
        .and_then(|source| compile_source(&source));

    CompileResult { filename, outcome }
}

/// Compile every `.jack` file in a directory. Units are independent, so
/// they compile in parallel; each result is reported per file.
pub fn compile_directory(dir: &Path) -> Vec<CompileResult> {
    let mut jack_files: Vec<_> = match fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "jack"))
            .collect(),
        Err(e) => {
            return vec![CompileResult {
                filename: dir.to_string_lossy().to_string(),
                outcome: Err(CompileError::io(dir, e)),
            }];
        }
    };
    jack_files.sort();

    jack_files.par_iter().map(|path| compile_file(path)).collect()
}

/// Write a successful result to `<output_dir>/<stem>.vm`.
pub fn write_output(result: &CompileResult, output_dir: &Path) -> Result<()> {
    let vm_code = match &result.outcome {
        Ok(code) => code,
        Err(_) => return Ok(()),
    };
    let path = output_dir.join(format!("{}.vm", result.filename));
    fs::write(&path, vm_code).map_err(|e| CompileError::io(&path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_source_minimal() {
        let vm = compile_source("class Main { function void main() { return; } }").unwrap();
        assert!(vm.starts_with("function Main.main 0\n"));
        assert!(vm.ends_with("return\n"));
    }

    #[test]
    fn test_lexical_error_propagates() {
        let err = compile_source("class Main { function void main() { let x = 99999; } }")
            .unwrap_err();
        assert!(matches!(err, CompileError::Lexical { .. }));
    }

    #[test]
    fn test_syntax_error_propagates() {
        let err = compile_source("class Main { function void main() { let ; } }").unwrap_err();
        assert!(matches!(err, CompileError::Syntax { .. }));
    }

    #[test]
    fn test_semantic_error_propagates() {
        let err = compile_source("class Main { function void main() { let x = 1; return; } }")
            .unwrap_err();
        assert!(matches!(err, CompileError::UndefinedVariable { .. }));
    }

    #[test]
    fn test_missing_file_reports_io() {
        let result = compile_file(Path::new("/nonexistent/Nope.jack"));
        assert_eq!(result.filename, "Nope");
        assert!(matches!(result.outcome, Err(CompileError::Io { .. })));
    }
}
