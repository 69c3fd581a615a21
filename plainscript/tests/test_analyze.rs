use plainscript::{
    analyze,
    compile::{SymbolKind, Type},
    compile_str,
    parsing::Stmt,
    Category, CompileError, CompileOptions, Diagnostic, Output,
};
use pretty_assertions::assert_eq;

const FIZZBUZZ: &str = include_str!("fizzbuzz.ps");

fn semantic_errors(source: &str) -> Vec<Diagnostic> {
    match compile_str(source, &CompileOptions::default()) {
        Err(CompileError::Semantic(diagnostics)) => diagnostics,
        other => panic!("expected semantic errors, found {:?}", other),
    }
}

fn messages(source: &str) -> Vec<String> {
    semantic_errors(source)
        .into_iter()
        .map(|diagnostic| diagnostic.message)
        .collect()
}

#[test]
fn test_analyze_fizzbuzz() {
    let (prog, analysis) = analyze(FIZZBUZZ).unwrap();

    let limit = analysis
        .symbols
        .iter()
        .find(|symbol| symbol.name == "LIMIT")
        .expect("LIMIT symbol");
    assert_eq!(limit.kind, SymbolKind::Constant);
    assert!(!limit.mutable);

    // Every declaration is bound to its own symbol.
    for stmt in &prog.stmts {
        let decl = match stmt {
            Stmt::Var(def) => def.id,
            Stmt::Func(func) => func.id,
            _ => continue,
        };
        let symbol = analysis.symbol_of(decl).expect("declaration binding");
        assert_eq!(symbol.decl, Some(decl));
    }

    let divides = analysis
        .symbols
        .iter()
        .find(|symbol| symbol.name == "divides")
        .unwrap();
    assert_eq!(divides.ty.to_string(), "fn(num, num) -> bool");
}

#[test]
fn test_undeclared_reference() {
    let diagnostics = semantic_errors("print(y);");
    assert_eq!(diagnostics.len(), 1);

    let diagnostic = &diagnostics[0];
    assert_eq!(diagnostic.category, Category::Semantic);
    assert!(diagnostic.message.contains("'y'"), "{}", diagnostic.message);
    assert_eq!((diagnostic.line, diagnostic.column), (1, 7));
}

#[test]
fn test_undeclared_reference_produces_no_output() {
    let result = compile_str(
        "let x = 1; print(y);",
        &CompileOptions {
            optimize: true,
            ..Default::default()
        },
    );
    assert!(matches!(result, Err(CompileError::Semantic(_))));
}

#[test]
fn test_all_errors_reported() {
    let source = "\
let a: num = \"text\";
fn f(x: num) -> num {
    return x > 1;
}
print(f(1, 2), a);
while 1 {
    continue;
}
return;
";
    assert_eq!(
        messages(source),
        vec![
            "expected type 'num', found 'str'",
            "function returns 'num', found return value of type 'bool'",
            "function 'f' expects 1 argument(s), found 2",
            "condition must be of type 'bool', found 'num'",
            "'return' outside of a function",
        ]
    );

    let lines: Vec<usize> = semantic_errors(source).iter().map(|d| d.line).collect();
    assert_eq!(lines, vec![1, 3, 5, 6, 9]);
}

#[test]
fn test_scoping() {
    assert_eq!(
        messages("{ let inner = 1; } print(inner);"),
        vec!["undeclared identifier 'inner'"]
    );
    assert_eq!(
        messages("let a = 1; let a = 2;"),
        vec!["'a' is already declared in this scope"]
    );
    // Variables are not hoisted.
    assert_eq!(
        messages("print(later); let later = 1;"),
        vec!["undeclared identifier 'later'"]
    );
    assert_eq!(
        messages("let self = self + 1;"),
        vec!["undeclared identifier 'self'"]
    );
    // Shadowing in a nested block is allowed.
    assert!(analyze("let a = 1; { let a = \"a\"; print(a); }").is_ok());
}

#[test]
fn test_type_errors() {
    assert_eq!(
        messages("let a = [1, \"two\"];"),
        vec!["array elements must share a type, expected 'num', found 'str'"]
    );
    assert_eq!(
        messages("let a = true; print(a[0]);"),
        vec!["type 'bool' cannot be indexed"]
    );
    assert_eq!(
        messages("let a = [1]; print(a[\"0\"]);"),
        vec!["index must be a number, found 'str'"]
    );
    assert_eq!(
        messages("print(-\"a\", !1);"),
        vec![
            "operator '-' cannot be applied to type 'str'",
            "operator '!' cannot be applied to type 'num'",
        ]
    );
    assert_eq!(
        messages("let a: widget = 1;"),
        vec!["unknown type 'widget'"]
    );
    assert_eq!(
        messages("fn f(a: num) {} f(\"a\");"),
        vec!["argument 1 of 'f' expects type 'num', found 'str'"]
    );
}

#[test]
fn test_errors_do_not_cascade() {
    // The undeclared name becomes `any`, so the operators using
    // it don't report errors of their own.
    assert_eq!(
        messages("let a = missing * 2 + 1; print(-a);"),
        vec!["undeclared identifier 'missing'"]
    );
}

#[test]
fn test_call_rules() {
    assert_eq!(messages("let a = 1; a();"), vec!["'a' is not a function"]);
    assert_eq!(
        messages("fn f() {} let g = f;"),
        vec!["function 'f' cannot be used as a value"]
    );
    assert_eq!(
        messages("print(sqrt(\"4\"));"),
        vec!["argument 1 of 'sqrt' expects type 'num', found 'str'"]
    );
}

#[test]
fn test_decorated_dump() {
    let output = compile_str(
        "let x = 1 + 2; print(x);",
        &CompileOptions {
            analyze_only: true,
            // Dump shows the tree before optimization.
            optimize: true,
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(
        output,
        Output::Decorated(
            [
                "Program",
                "  Let x #3 variable : num",
                "    Binary + : num = 3",
                "      Literal 1 : num = 1",
                "      Literal 2 : num = 2",
                "  Print",
                "    Access x -> #3 : num",
                "",
            ]
            .join("\n")
        )
    );
}

#[test]
fn test_any_type() {
    let (_, analysis) = analyze("fn id(value) { return value; } let a = id(1) + 1;").unwrap();
    let a = analysis.symbols.iter().find(|s| s.name == "a").unwrap();
    assert_eq!(a.ty, Type::Num);
}
