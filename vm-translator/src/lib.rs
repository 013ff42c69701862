//! VM-to-Hack translator.
//!
//! Lowers stack VM commands (`.vm`) to Hack assembly (`.asm`):
//! arithmetic against a RAM[0] stack pointer, segment-mapped memory
//! access, scoped program flow, and the five-word call/return frame.
//!
//! Single-file mode translates one `.vm` file with no preamble.
//! Directory mode concatenates every `.vm` file (lexicographic order)
//! behind a bootstrap that sets `SP = 256` and calls `Sys.init`.

pub mod bootstrap;
pub mod codegen;
pub mod error;
pub mod memory;
pub mod parser;

use std::fs;
use std::path::{Path, PathBuf};

use crate::bootstrap::write_bootstrap;
use crate::codegen::CodeGen;
pub use crate::error::{Result, VmError};
use crate::parser::parse_line;

/// Translate a single VM source string. `stem` names the file for
/// static-variable symbols and diagnostics.
pub fn translate(source: &str, stem: &str) -> Result<String> {
    let mut codegen = CodeGen::new();
    let mut output = String::with_capacity(source.len() * 8);
    translate_into(source, stem, &mut codegen, &mut output)?;
    Ok(output)
}

fn translate_into(
    source: &str,
    stem: &str,
    codegen: &mut CodeGen,
    output: &mut String,
) -> Result<()> {
    codegen.set_file_stem(stem);
    for (idx, line) in source.lines().enumerate() {
        if let Some(cmd) = parse_line(line, idx + 1, stem)? {
            codegen.translate(&cmd, output);
        }
    }
    Ok(())
}

fn file_stem(path: &Path) -> &str {
    path.file_stem().and_then(|s| s.to_str()).unwrap_or("Unknown")
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| VmError::FileRead {
        path: path.display().to_string(),
        source: e,
    })
}

/// Translate one `.vm` file (no bootstrap).
pub fn translate_file(path: &Path) -> Result<String> {
    let source = read_source(path)?;
    translate(&source, file_stem(path))
}

/// Translate every `.vm` file in a directory into one assembly program,
/// bootstrap first, files in lexicographic order.
pub fn translate_directory(dir: &Path) -> Result<String> {
    let mut vm_files: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| VmError::FileRead {
            path: dir.display().to_string(),
            source: e,
        })?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "vm"))
        .collect();

    if vm_files.is_empty() {
        return Err(VmError::NoVmFiles {
            path: dir.display().to_string(),
        });
    }
    vm_files.sort();

    let mut codegen = CodeGen::new();
    let mut output = String::with_capacity(4096);
    write_bootstrap(&mut codegen, &mut output);

    for path in &vm_files {
        let source = read_source(path)?;
        translate_into(&source, file_stem(path), &mut codegen, &mut output)?;
    }

    Ok(output)
}

/// Output path convention: `foo.vm -> foo.asm`, `DIR/ -> DIR/DIR.asm`.
pub fn output_path(input: &Path) -> PathBuf {
    if input.is_dir() {
        let dir_name = input
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("output");
        input.join(format!("{dir_name}.asm"))
    } else {
        input.with_extension("asm")
    }
}
