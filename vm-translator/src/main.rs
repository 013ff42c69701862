//! VM translator CLI: `vm-translator <file.vm | directory>`.

use std::env;
use std::fs;
use std::path::Path;
use std::process;

use vm_translator::{VmError, output_path, translate_directory, translate_file};

fn run(input: &Path) -> Result<(), VmError> {
    let asm = if input.is_dir() {
        translate_directory(input)?
    } else if input.extension().is_some_and(|ext| ext == "vm") {
        translate_file(input)?
    } else {
        return Err(VmError::InvalidPath {
            path: input.display().to_string(),
        });
    };

    let output = output_path(input);
    fs::write(&output, &asm).map_err(|e| VmError::FileWrite {
        path: output.display().to_string(),
        source: e,
    })?;

    println!("{}", output.display());
    Ok(())
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        eprintln!("VM Translator v{}", env!("CARGO_PKG_VERSION"));
        eprintln!();
        eprintln!("Usage: vm-translator <file.vm | directory>");
        process::exit(1);
    }

    if let Err(e) = run(Path::new(&args[1])) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
