use plainscript::{compile_str, CompileOptions, Output};
use pretty_assertions::assert_eq;
use std::thread;

const FIZZBUZZ: &str = include_str!("fizzbuzz.ps");
const FIZZBUZZ_JS: &str = include_str!("fizzbuzz.js");
const NAMES: &str = include_str!("names.ps");
const NAMES_JS: &str = include_str!("names.js");

fn generate(source: &str) -> String {
    compile_str(source, &CompileOptions::default())
        .unwrap()
        .into_string()
}

#[test]
fn test_fizzbuzz() {
    assert_eq!(generate(FIZZBUZZ), FIZZBUZZ_JS);
}

#[test]
fn test_fizzbuzz_optimized() {
    let output = compile_str(
        FIZZBUZZ,
        &CompileOptions {
            optimize: true,
            ..Default::default()
        },
    )
    .unwrap();

    let expected = FIZZBUZZ_JS.replace("fizzbuzz(LIMIT);", "fizzbuzz(15);");
    assert_eq!(output, Output::Code(expected));
}

#[test]
fn test_renamed_identifiers() {
    assert_eq!(generate(NAMES), NAMES_JS);
}

#[test]
fn test_shadowed_parameters_keep_their_names() {
    assert_eq!(
        generate("let n = 1; fn f(n: num) -> num { return n; } print(f(n));"),
        "let n = 1;\nfunction f(n) {\n  return n;\n}\nconsole.log(f(n));\n"
    );
}

#[test]
fn test_layout_independent() {
    let compact = "let a=[1,2,3];let i=0;while i<len(a){a[i]=a[i]*2;i=i+1;}print(a);";
    let spread = "
        let a = [1, 2, 3];
        let i = 0;

        // Double every element.
        while i < len(a) {
            a[i] = a[i] * 2;
            i = i + 1;
        }

        print(a);
    ";

    let expected = "\
let a = [1, 2, 3];
let i = 0;
while (i < a.length) {
  a[i] = a[i] * 2;
  i = i + 1;
}
console.log(a);
";
    assert_eq!(generate(compact), expected);
    assert_eq!(generate(spread), expected);
}

#[test]
fn test_nested_blocks() {
    assert_eq!(
        generate("fn f() { { print(\"inner\"); } return; } f();"),
        "function f() {\n  {\n    console.log(\"inner\");\n  }\n  return;\n}\nf();\n"
    );
}

#[test]
fn test_string_escapes() {
    assert_eq!(
        generate(r#"print("tab\there", "quote \" and \\");"#),
        "console.log(\"tab\\there\", \"quote \\\" and \\\\\");\n"
    );
}

#[test]
fn test_concurrent_compilation() {
    let handles: Vec<_> = (0..8)
        .map(|n| {
            thread::spawn(move || {
                let source = if n % 2 == 0 { FIZZBUZZ } else { NAMES };
                generate(source)
            })
        })
        .collect();

    for (n, handle) in handles.into_iter().enumerate() {
        let expected = if n % 2 == 0 { FIZZBUZZ_JS } else { NAMES_JS };
        assert_eq!(handle.join().unwrap(), expected);
    }
}
