use super::{js_name, Analysis, Builtin, Symbol, SymbolKind};
use crate::parsing::{
    BinaryOp, Block, CallExpr, DeclKind, Else, Expr, FuncDef, IfStmt, LitValue, NodeId, Prog, Stmt,
    UnaryOp,
};
use itertools::Itertools;
use log::debug;

/// Generate JavaScript source for an analyzed program.
pub fn generate(prog: &Prog, analysis: &Analysis) -> String {
    let mut codegen = CodeGen::new(analysis);
    codegen.prog(prog);
    let code = codegen.finish();
    debug!("generated {} bytes of code", code.len());
    code
}

/// Operator precedence levels of the target language. Higher binds tighter.
mod prec {
    pub const OR: u8 = 3;
    pub const AND: u8 = 4;
    pub const EQUALITY: u8 = 8;
    pub const RELATIONAL: u8 = 9;
    pub const ADDITIVE: u8 = 11;
    pub const MULTIPLICATIVE: u8 = 12;
    pub const UNARY: u8 = 14;
    /// Member access, calls and element access.
    pub const POSTFIX: u8 = 17;
    pub const PRIMARY: u8 = 20;
}

/// Code generator.
///
/// Walks a decorated tree and emits one line per statement. Every
/// name is looked up through its binding, so renamed symbols are
/// written the same way at declaration and use.
pub struct CodeGen<'a> {
    analysis: &'a Analysis,
    /// Resulting generated code.
    code: String,
    indent: usize,
}

impl<'a> CodeGen<'a> {
    /// Indentation added per nesting level.
    pub const INDENT: &'static str = "  ";

    pub fn new(analysis: &'a Analysis) -> Self {
        Self {
            analysis,
            code: String::new(),
            indent: 0,
        }
    }

    pub fn prog(&mut self, prog: &Prog) {
        for stmt in &prog.stmts {
            self.stmt(stmt);
        }
    }

    /// Take the generated code.
    pub fn finish(self) -> String {
        self.code
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.code.push_str(Self::INDENT);
        }
        self.code.push_str(text);
        self.code.push('\n');
    }

    /// Symbol bound to a node.
    ///
    /// # Panics
    ///
    /// When the node has no binding, which means the tree
    /// didn't pass analysis.
    fn symbol(&self, node: NodeId) -> &'a Symbol {
        self.analysis
            .symbol_of(node)
            .unwrap_or_else(|| panic!("internal invariant violated: node {} has no binding", node))
    }

    fn name(&self, node: NodeId) -> String {
        js_name(self.symbol(node)).into_owned()
    }
}

// Statements
impl<'a> CodeGen<'a> {
    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Var(def) => {
                let keyword = match def.kind {
                    DeclKind::Let => "let",
                    DeclKind::Const => "const",
                };
                let line = format!("{} {} = {};", keyword, self.name(def.id), self.expr(&def.rhs));
                self.line(&line);
            }
            Stmt::Func(func) => self.func(func),
            Stmt::Assign(assign) => {
                let line = format!("{} = {};", self.expr(&assign.target), self.expr(&assign.rhs));
                self.line(&line);
            }
            Stmt::If(stmt) => self.if_stmt(stmt),
            Stmt::While(stmt) => {
                let line = format!("while ({}) {{", self.expr(&stmt.cond));
                self.line(&line);
                self.body(&stmt.body);
                self.line("}");
            }
            Stmt::Return(stmt) => match &stmt.value {
                Some(value) => {
                    let line = format!("return {};", self.expr(value));
                    self.line(&line);
                }
                None => self.line("return;"),
            },
            Stmt::Break(_) => self.line("break;"),
            Stmt::Continue(_) => self.line("continue;"),
            Stmt::Print(print) => {
                let args = print.args.iter().map(|arg| self.expr(arg)).join(", ");
                self.line(&format!("console.log({});", args));
            }
            Stmt::Block(block) => {
                self.line("{");
                self.body(block);
                self.line("}");
            }
            Stmt::Expr(expr) => {
                let line = format!("{};", self.expr(expr));
                self.line(&line);
            }
        }
    }

    /// Statements of a block, one level deeper.
    fn body(&mut self, block: &Block) {
        self.indent += 1;
        for stmt in &block.stmts {
            self.stmt(stmt);
        }
        self.indent -= 1;
    }

    fn func(&mut self, func: &FuncDef) {
        let params = func.params.iter().map(|param| self.name(param.id)).join(", ");
        let line = format!("function {}({}) {{", self.name(func.id), params);
        self.line(&line);
        self.body(&func.body);
        self.line("}");
    }

    fn if_stmt(&mut self, stmt: &IfStmt) {
        let line = format!("if ({}) {{", self.expr(&stmt.cond));
        self.line(&line);
        self.body(&stmt.then_block);

        let mut else_branch = &stmt.else_branch;
        loop {
            match else_branch {
                Some(Else::If(nested)) => {
                    let line = format!("}} else if ({}) {{", self.expr(&nested.cond));
                    self.line(&line);
                    self.body(&nested.then_block);
                    else_branch = &nested.else_branch;
                }
                Some(Else::Block(block)) => {
                    self.line("} else {");
                    self.body(block);
                    break;
                }
                None => break,
            }
        }

        self.line("}");
    }
}

// Expressions
impl<'a> CodeGen<'a> {
    fn expr(&self, expr: &Expr) -> String {
        self.expr_prec(expr).0
    }

    /// Generate an expression along with the precedence
    /// level of its outermost operator.
    fn expr_prec(&self, expr: &Expr) -> (String, u8) {
        match expr {
            Expr::Literal(literal) => {
                let text = literal.value.to_string();
                // Negative numbers are written with a unary minus.
                let level = if text.starts_with('-') {
                    prec::UNARY
                } else {
                    prec::PRIMARY
                };
                (text, level)
            }
            Expr::Access(access) => (self.name(access.id), prec::PRIMARY),
            Expr::Unary(unary) => {
                let (operand, level) = self.expr_prec(&unary.rhs);
                let (op, operand) = match unary.op {
                    // `--` would lex as a decrement.
                    UnaryOp::Neg if operand.starts_with('-') => ("-", paren(operand)),
                    UnaryOp::Neg => ("-", wrap(operand, level < prec::UNARY)),
                    UnaryOp::Not => ("!", wrap(operand, level < prec::UNARY)),
                };
                (format!("{}{}", op, operand), prec::UNARY)
            }
            Expr::Binary(binary) => {
                let (op, level) = js_operator(binary.op);
                let (lhs, lhs_level) = self.expr_prec(&binary.lhs);
                let (rhs, rhs_level) = self.expr_prec(&binary.rhs);

                // Operators are left associative, so an operand on the right
                // at the same level needs parentheses to keep its grouping.
                let text = format!(
                    "{} {} {}",
                    wrap(lhs, lhs_level < level),
                    op,
                    wrap(rhs, rhs_level <= level)
                );
                (text, level)
            }
            Expr::Call(call) => (self.call(call), prec::POSTFIX),
            Expr::Array(array) => {
                let items = array.items.iter().map(|item| self.expr(item)).join(", ");
                (format!("[{}]", items), prec::PRIMARY)
            }
            Expr::Index(index) => {
                let target = self.receiver(&index.target);
                let text = format!("{}[{}]", target, self.expr(&index.index));
                (text, prec::POSTFIX)
            }
        }
    }

    fn call(&self, call: &CallExpr) -> String {
        let symbol = self.symbol(call.id);

        match symbol.kind {
            SymbolKind::Builtin(Builtin::Len) => {
                format!("{}.length", self.receiver(&call.args[0]))
            }
            SymbolKind::Builtin(Builtin::Sqrt) => format!("Math.sqrt({})", self.args(call)),
            SymbolKind::Builtin(Builtin::Abs) => format!("Math.abs({})", self.args(call)),
            _ => format!("{}({})", js_name(symbol), self.args(call)),
        }
    }

    fn args(&self, call: &CallExpr) -> String {
        call.args.iter().map(|arg| self.expr(arg)).join(", ")
    }

    /// Expression that's the target of a member or element access.
    fn receiver(&self, expr: &Expr) -> String {
        let (text, level) = self.expr_prec(expr);
        // The dot in `1.length` would be read as a decimal point.
        let number = matches!(
            expr,
            Expr::Literal(literal) if matches!(literal.value, LitValue::Num(_))
        );
        wrap(text, level < prec::POSTFIX || number)
    }
}

/// Target operator and its precedence level.
fn js_operator(op: BinaryOp) -> (&'static str, u8) {
    use BinaryOp as B;

    match op {
        B::Or => ("||", prec::OR),
        B::And => ("&&", prec::AND),
        B::Eq => ("===", prec::EQUALITY),
        B::NotEq => ("!==", prec::EQUALITY),
        B::Less => ("<", prec::RELATIONAL),
        B::LessEq => ("<=", prec::RELATIONAL),
        B::Greater => (">", prec::RELATIONAL),
        B::GreaterEq => (">=", prec::RELATIONAL),
        B::Add => ("+", prec::ADDITIVE),
        B::Sub => ("-", prec::ADDITIVE),
        B::Mul => ("*", prec::MULTIPLICATIVE),
        B::Div => ("/", prec::MULTIPLICATIVE),
        B::Rem => ("%", prec::MULTIPLICATIVE),
    }
}

#[inline]
fn paren(text: String) -> String {
    format!("({})", text)
}

#[inline]
fn wrap(text: String, parens: bool) -> String {
    if parens {
        paren(text)
    } else {
        text
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::compile::{analyze, optimize};

    fn generate_str(source: &str) -> String {
        let prog = Prog::parse_str(source).expect("parse");
        let analysis = analyze(&prog).expect("analysis");
        generate(&prog, &analysis)
    }

    #[test]
    fn test_precedence() {
        assert_eq!(
            generate_str("let a = 1; let b = (a - 2) - (a - 3) * (a + 4);"),
            "let a = 1;\nlet b = a - 2 - (a - 3) * (a + 4);\n"
        );
        assert_eq!(
            generate_str("let a = true; let b = !(a && a) || a == (a != a);"),
            "let a = true;\nlet b = !(a && a) || a === (a !== a);\n"
        );
    }

    #[test]
    fn test_double_negation() {
        assert_eq!(
            generate_str("let a = 1; let b = -(-a); let c = - -a;"),
            "let a = 1;\nlet b = -(-a);\nlet c = -(-a);\n"
        );
    }

    #[test]
    fn test_negative_literal_operand() {
        let prog = Prog::parse_str("let a = 1; let b = a - -2;").unwrap();
        let analysis = analyze(&prog).unwrap();
        let optimized = optimize(&prog, &analysis);
        assert_eq!(generate(&optimized, &analysis), "let a = 1;\nlet b = a - -2;\n");

        let prog = Prog::parse_str("let b = -(-2);").unwrap();
        let analysis = analyze(&prog).unwrap();
        assert_eq!(generate(&prog, &analysis), "let b = -(-2);\n");
    }

    #[test]
    fn test_builtins() {
        assert_eq!(
            generate_str("let a = [1, 2]; print(len(a), len(\"x\" + \"y\"), sqrt(4), abs(a[0]));"),
            "let a = [1, 2];\nconsole.log(a.length, (\"x\" + \"y\").length, Math.sqrt(4), Math.abs(a[0]));\n"
        );
    }

    #[test]
    fn test_else_if_chain() {
        assert_eq!(
            generate_str("let a = 1; if a < 0 { print(-1); } else if a == 0 { print(0); } else { print(1); }"),
            "let a = 1;\nif (a < 0) {\n  console.log(-1);\n} else if (a === 0) {\n  console.log(0);\n} else {\n  console.log(1);\n}\n"
        );
    }
}
