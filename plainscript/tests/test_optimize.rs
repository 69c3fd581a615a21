use plainscript::{
    analyze, compile, compile::consteval::MAX_FOLDED_STRING, compile_str, CompileError,
    CompileOptions, Output,
};
use pretty_assertions::assert_eq;

const FOLD: &str = include_str!("fold.ps");
const FOLD_JS: &str = include_str!("fold.js");
const CONTROL: &str = include_str!("control.ps");
const CONTROL_JS: &str = include_str!("control.js");
const CONTROL_UNOPTIMIZED_JS: &str = include_str!("control_unoptimized.js");

fn optimized(source: &str) -> String {
    let options = CompileOptions {
        optimize: true,
        ..Default::default()
    };
    compile_str(source, &options).unwrap().into_string()
}

fn unoptimized(source: &str) -> String {
    compile_str(source, &CompileOptions::default())
        .unwrap()
        .into_string()
}

#[test]
fn test_constant_expression() {
    assert_eq!(optimized("print(2 + 3 * 4);"), "console.log(14);\n");
    assert_eq!(unoptimized("print(2 + 3 * 4);"), "console.log(2 + 3 * 4);\n");
}

#[test]
fn test_variable_initializer() {
    assert_eq!(unoptimized("let x = 1 + 2;"), "let x = 1 + 2;\n");
    assert_eq!(optimized("let x = 1 + 2;"), "let x = 3;\n");
}

#[test]
fn test_dead_branch() {
    assert_eq!(
        optimized("if true { print(1); } else { print(2); }"),
        "console.log(1);\n"
    );
    assert_eq!(
        unoptimized("if true { print(1); } else { print(2); }"),
        "if (true) {\n  console.log(1);\n} else {\n  console.log(2);\n}\n"
    );
}

#[test]
fn test_strings_and_comparisons() {
    assert_eq!(
        optimized("print(\"a\" + \"b\", \"B\" < \"a\", 1 / 0, 0 / 0 == 0 / 0);"),
        "console.log(\"ab\", true, Infinity, false);\n"
    );
}

#[test]
fn test_fold_fixture() {
    assert_eq!(optimized(FOLD), FOLD_JS);
}

#[test]
fn test_optimize_idempotent() {
    let (prog, analysis) = analyze(FOLD).unwrap();
    let once = compile::optimize(&prog, &analysis);
    let twice = compile::optimize(&once, &analysis);
    assert_eq!(once, twice);
    assert_eq!(compile::generate(&twice, &analysis), FOLD_JS);
}

#[test]
fn test_optimizer_keeps_analysis_valid() {
    let source = "const N = 3; fn f(a: [num]) -> num { return len(a) * N; } print(f([1, 2]) + 0 * N);";
    let output = compile_str(
        source,
        &CompileOptions {
            optimize: true,
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(
        output,
        Output::Code(
            "const N = 3;\nfunction f(a) {\n  return a.length * 3;\n}\nconsole.log(f([1, 2]) + 0);\n"
                .to_owned()
        )
    );
}

#[test]
fn test_control_fixture() {
    assert_eq!(unoptimized(CONTROL), CONTROL_UNOPTIMIZED_JS);
    assert_eq!(optimized(CONTROL), CONTROL_JS);
}

#[test]
fn test_unreachable_after_jumps() {
    assert_eq!(
        optimized("let i = 0; while i < 3 { i = i + 1; continue; print(i); } while true { break; i = 0; }"),
        "let i = 0;\nwhile (i < 3) {\n  i = i + 1;\n  continue;\n}\nwhile (true) {\n  break;\n}\n"
    );
}

#[test]
fn test_call_before_captured_constant() {
    let source = "print(f()); const c = 5; fn f() -> num { return c; }";

    for optimize in [false, true] {
        let options = CompileOptions {
            optimize,
            ..Default::default()
        };
        match compile_str(source, &options) {
            Err(CompileError::Semantic(diagnostics)) => {
                assert_eq!(diagnostics.len(), 1);
                assert_eq!(
                    diagnostics[0].message,
                    "function 'f' is called before 'c' is declared"
                );
                assert_eq!((diagnostics[0].line, diagnostics[0].column), (1, 7));
            }
            other => panic!("expected a semantic error, found {:?}", other),
        }
    }

    // Same program with the call after the constant behaves the same both ways.
    let source = "const c = 5; print(f()); fn f() -> num { return c; }";
    assert_eq!(
        unoptimized(source),
        "const c = 5;\nconsole.log(f());\nfunction f() {\n  return c;\n}\n"
    );
    assert_eq!(
        optimized(source),
        "const c = 5;\nconsole.log(f());\nfunction f() {\n  return 5;\n}\n"
    );
}

#[test]
fn test_string_doubling_stays_bounded() {
    let mut source = String::from("const s0 = \"ab\";\n");
    for n in 1..=40 {
        source.push_str(&format!("const s{} = s{} + s{};\n", n, n - 1, n - 1));
    }
    source.push_str("print(len(s40));\n");

    let dump = compile_str(
        &source,
        &CompileOptions {
            analyze_only: true,
            ..Default::default()
        },
    )
    .unwrap();
    assert!(dump.as_str().len() < 16 * MAX_FOLDED_STRING);

    assert!(unoptimized(&source).len() < 16 * MAX_FOLDED_STRING);

    let code = optimized(&source);
    assert!(code.len() < 16 * MAX_FOLDED_STRING);
    assert!(code.contains("const s40 = s39 + s39;"));
}
