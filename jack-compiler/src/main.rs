//! Jack compiler CLI: `jack-compiler <file.jack | directory>` emits one
//! sibling `.vm` file per class.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use jack_compiler::{compile_directory, compile_file, write_output};

#[derive(Parser, Debug)]
#[command(name = "jack-compiler")]
#[command(version)]
#[command(about = "Compiles Jack source to VM code")]
struct Args {
    /// A .jack file or a directory of them
    #[arg(value_name = "INPUT")]
    input: PathBuf,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let (results, output_dir) = if args.input.is_file() {
        let output_dir = args
            .input
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        (vec![compile_file(&args.input)], output_dir)
    } else if args.input.is_dir() {
        (compile_directory(&args.input), args.input.clone())
    } else {
        eprintln!("Error: input not found: {}", args.input.display());
        return ExitCode::from(2);
    };

    if results.is_empty() {
        eprintln!("Error: no .jack files in {}", args.input.display());
        return ExitCode::from(2);
    }

    let mut failed = false;
    for result in &results {
        match &result.outcome {
            Ok(_) => match write_output(result, &output_dir) {
                Ok(()) => println!("{}.jack -> {}.vm", result.filename, result.filename),
                Err(e) => {
                    eprintln!("{}: {}", result.filename, e);
                    failed = true;
                }
            },
            Err(e) => {
                eprintln!("{}: {}", result.filename, e);
                failed = true;
            }
        }
    }

    if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}
