//! End-to-end assembler checks against known-good binaries.

use hack_assembler::assemble;

#[test]
fn test_label_and_variable_program() {
    let source = "\
@5
D=A
@R1
M=D
(END)
@END
0;JMP
";
    let output = assemble(source).unwrap();
    let lines: Vec<&str> = output.lines().collect();

    assert_eq!(
        lines,
        vec![
            "0000000000000101", // @5
            "1110110000010000", // D=A
            "0000000000000001", // @R1
            "1110001100001000", // M=D
            "0000000000000100", // @END (bound to 4)
            "1110101010000111", // 0;JMP
        ]
    );
}

#[test]
fn test_assembly_is_deterministic() {
    let source = "\
@first
M=1
@second
M=1
(TOP)
@first
D=M
@TOP
D;JNE
";
    let once = assemble(source).unwrap();
    let twice = assemble(source).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_distinct_variables_allocated_from_16_in_order() {
    let source = "@alpha\n@beta\n@alpha\n@gamma\n";
    let output = assemble(source).unwrap();
    let lines: Vec<&str> = output.lines().collect();

    assert_eq!(lines[0], format!("{:016b}", 16));
    assert_eq!(lines[1], format!("{:016b}", 17));
    assert_eq!(lines[2], format!("{:016b}", 16));
    assert_eq!(lines[3], format!("{:016b}", 18));
}

#[test]
fn test_pointer_aliases_share_addresses() {
    let output = assemble("@SP\n@R0\n@THAT\n@R4\n").unwrap();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines[0], lines[1]);
    assert_eq!(lines[2], lines[3]);
}

#[test]
fn test_max_program_shape() {
    // Max.asm from the reference suite, trimmed of comments.
    let source = "\
@R0
D=M
@R1
D=D-M
@OUTPUT_FIRST
D;JGT
@R1
D=M
@OUTPUT_D
0;JMP
(OUTPUT_FIRST)
@R0
D=M
(OUTPUT_D)
@R2
M=D
(INFINITE_LOOP)
@INFINITE_LOOP
0;JMP
";
    let output = assemble(source).unwrap();
    let lines: Vec<&str> = output.lines().collect();

    assert_eq!(lines.len(), 16);
    // @OUTPUT_FIRST resolves to instruction 10, @OUTPUT_D to 12,
    // @INFINITE_LOOP to 14.
    assert_eq!(lines[4], format!("{:016b}", 10));
    assert_eq!(lines[8], format!("{:016b}", 12));
    assert_eq!(lines[14], format!("{:016b}", 14));
}
