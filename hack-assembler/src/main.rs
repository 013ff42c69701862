//! Hack assembler CLI: `hack-assembler <file.asm>` writes `<file.hack>`.

use std::env;
use std::fs;
use std::path::Path;
use std::process;

use hack_assembler::assemble;

fn run(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let source = fs::read_to_string(input)?;
    let binary = assemble(&source)?;

    let output = input.with_extension("hack");
    fs::write(&output, binary)?;
    println!("{} -> {}", input.display(), output.display());

    Ok(())
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        eprintln!("Hack Assembler v{}", env!("CARGO_PKG_VERSION"));
        eprintln!();
        eprintln!("Usage: hack-assembler <file.asm>");
        process::exit(1);
    }

    let input = Path::new(&args[1]);
    if let Err(e) = run(input) {
        eprintln!("Error: {}: {}", input.display(), e);
        process::exit(1);
    }
}
