//! Bootstrap preamble for directory translation.

use crate::codegen::CodeGen;
use crate::parser::VmCommand;

/// Emit the program preamble: `SP = 256` followed by `call Sys.init 0`.
///
/// `Sys.init` never returns; a halt loop follows its return label so a
/// runaway return spins in place instead of falling into program code.
pub fn write_bootstrap(codegen: &mut CodeGen, out: &mut String) {
    out.push_str("@256\nD=A\n@SP\nM=D\n");

    codegen.set_file_stem("Bootstrap");
    codegen.translate(
        &VmCommand::Call {
            name: "Sys.init".to_string(),
            num_args: 0,
        },
        out,
    );

    out.push_str("(HALT)\n@HALT\n0;JMP\n");
}
