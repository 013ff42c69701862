//! Property-based tests for the VM translator.

use proptest::prelude::*;
use vm_translator::translate;

fn arb_arithmetic() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("add"),
        Just("sub"),
        Just("neg"),
        Just("eq"),
        Just("lt"),
        Just("gt"),
        Just("and"),
        Just("or"),
        Just("not"),
    ]
    .prop_map(str::to_string)
}

fn arb_push() -> impl Strategy<Value = String> {
    prop_oneof![
        (0u16..32768).prop_map(|n| format!("push constant {n}")),
        (0u16..8).prop_map(|n| format!("push temp {n}")),
        (0u16..2).prop_map(|n| format!("push pointer {n}")),
        (0u16..100).prop_map(|n| format!("push local {n}")),
        (0u16..100).prop_map(|n| format!("push argument {n}")),
        (0u16..100).prop_map(|n| format!("push this {n}")),
        (0u16..100).prop_map(|n| format!("push that {n}")),
        (0u16..240).prop_map(|n| format!("push static {n}")),
    ]
}

fn arb_pop() -> impl Strategy<Value = String> {
    prop_oneof![
        (0u16..8).prop_map(|n| format!("pop temp {n}")),
        (0u16..2).prop_map(|n| format!("pop pointer {n}")),
        (0u16..100).prop_map(|n| format!("pop local {n}")),
        (0u16..100).prop_map(|n| format!("pop argument {n}")),
        (0u16..240).prop_map(|n| format!("pop static {n}")),
    ]
}

fn arb_function_name() -> impl Strategy<Value = String> {
    ("[A-Z][a-zA-Z0-9]{0,6}", "[a-z][a-zA-Z0-9]{0,6}")
        .prop_map(|(class, method)| format!("{class}.{method}"))
}

fn arb_line() -> impl Strategy<Value = String> {
    prop_oneof![
        5 => arb_arithmetic(),
        5 => arb_push(),
        3 => arb_pop(),
        2 => "[A-Z][A-Z0-9_]{0,8}".prop_map(|l| format!("label {l}")),
        1 => (arb_function_name(), 0u16..6).prop_map(|(f, n)| format!("function {f} {n}")),
        1 => (arb_function_name(), 0u16..6).prop_map(|(f, n)| format!("call {f} {n}")),
        1 => Just("return".to_string()),
        1 => Just("// comment".to_string()),
        1 => Just(String::new()),
        1 => "[a-z]{2,12}",
    ]
}

fn arb_program() -> impl Strategy<Value = String> {
    prop::collection::vec(arb_line(), 0..60).prop_map(|lines| lines.join("\n"))
}

proptest! {
    /// Any input either translates or errors; it never panics.
    #[test]
    fn test_no_panic_on_arbitrary_input(input in arb_program()) {
        let _ = translate(&input, "Fuzz");
    }

    /// Identical input yields identical assembly.
    #[test]
    fn test_determinism(input in arb_program()) {
        match (translate(&input, "Fuzz"), translate(&input, "Fuzz")) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
            (Err(_), Err(_)) => {}
            _ => prop_assert!(false, "runs disagreed"),
        }
    }

    /// Every push bumps SP exactly once.
    #[test]
    fn test_push_increments_sp(cmd in arb_push()) {
        let asm = translate(&cmd, "Test").unwrap();
        prop_assert_eq!(asm.matches("@SP\nM=M+1").count(), 1);
        prop_assert_eq!(asm.matches("AM=M-1").count(), 0);
    }

    /// Every pop drops SP exactly once.
    #[test]
    fn test_pop_decrements_sp(cmd in arb_pop()) {
        let asm = translate(&cmd, "Test").unwrap();
        prop_assert_eq!(asm.matches("@SP\nAM=M-1").count(), 1);
        prop_assert_eq!(asm.matches("M=M+1").count(), 0);
    }

    /// Out-of-range temp/pointer indices are rejected at parse time.
    #[test]
    fn test_bad_indices_rejected(temp in 8u16..200, pointer in 2u16..200) {
        let temp_result = translate(&format!("push temp {}", temp), "T");
        prop_assert!(temp_result.is_err());
        let pointer_result = translate(&format!("push pointer {}", pointer), "T");
        prop_assert!(pointer_result.is_err());
    }

    /// Comparison sites each get two fresh labels.
    #[test]
    fn test_comparison_label_freshness(count in 1usize..8) {
        let source = vec!["push constant 1\npush constant 2\neq"; count].join("\n");
        let asm = translate(&source, "T").unwrap();
        for n in 0..count {
            let has_true_label = asm.contains(&format!("(CMP_TRUE_{})", n));
            prop_assert!(has_true_label);
            let has_end_label = asm.contains(&format!("(CMP_END_{})", n));
            prop_assert!(has_end_label);
        }
    }

    /// `call F N` computes ARG at SP - N - 5.
    #[test]
    fn test_call_arg_offset(n in 0u16..10) {
        let source = format!("function T.f 0\ncall X.g {n}");
        let asm = translate(&source, "T").unwrap();
        let offset = n + 5;
        let has_offset = asm.contains(&format!("@{}\nD=D-A\n@ARG\nM=D", offset));
        prop_assert!(has_offset);
    }

    /// `function F K` zero-initializes exactly K locals.
    #[test]
    fn test_function_local_init(k in 0u16..10) {
        let asm = translate(&format!("function T.f {k}"), "T").unwrap();
        prop_assert_eq!(asm.matches("M=0\n@SP\nM=M+1").count(), k as usize);
    }

    /// Static references always carry the file stem.
    #[test]
    fn test_static_prefix(index in 0u16..240) {
        let asm = translate(&format!("push static {index}"), "MyFile").unwrap();
        let has_static = asm.contains(&format!("@MyFile.{}", index));
        prop_assert!(has_static);
    }

    /// Labels inside a function are scoped as F$X.
    #[test]
    fn test_label_scoping(label in "[A-Z][A-Z0-9_]{0,8}") {
        let source = format!("function T.f 0\nlabel {label}\ngoto {label}");
        let asm = translate(&source, "T").unwrap();
        let has_label_def = asm.contains(&format!("(T.f${})", label));
        prop_assert!(has_label_def);
        let has_label_jump = asm.contains(&format!("@T.f${}\n0;JMP", label));
        prop_assert!(has_label_jump);
    }
}
