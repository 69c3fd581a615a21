//! Human readable dump of syntax trees.
//!
//! One node per line, indented by depth. Source positions are left out,
//! so programs that only differ in layout dump the same.
use crate::{
    compile::Analysis,
    parsing::{Block, DeclKind, Else, Expr, FuncDef, IfStmt, NodeId, Prog, Stmt},
};

/// Dump a tree as parsed.
pub fn dump_ast(prog: &Prog) -> String {
    let mut dumper = Dumper::new(None);
    dumper.prog(prog);
    dumper.out
}

/// Dump a tree with the decorations produced by analysis.
///
/// Expressions show ` -> #id` for the symbol they resolve to, ` : type`
/// for their type and ` = value` when their value is constant. Declarations
/// show their symbol id, kind and type.
pub fn dump_decorated(prog: &Prog, analysis: &Analysis) -> String {
    let mut dumper = Dumper::new(Some(analysis));
    dumper.prog(prog);
    dumper.out
}

struct Dumper<'a> {
    analysis: Option<&'a Analysis>,
    out: String,
    depth: usize,
}

impl<'a> Dumper<'a> {
    fn new(analysis: Option<&'a Analysis>) -> Self {
        Self {
            analysis,
            out: String::new(),
            depth: 0,
        }
    }

    fn node(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    /// Write a node, followed by its children one level deeper.
    fn nested(&mut self, text: &str, children: impl FnOnce(&mut Self)) {
        self.node(text);
        self.depth += 1;
        children(self);
        self.depth -= 1;
    }

    fn decl(&self, node: NodeId) -> String {
        match self.analysis.and_then(|analysis| analysis.symbol_of(node)) {
            Some(symbol) => format!(" {} {} : {}", symbol.id, symbol.kind, symbol.ty),
            None => String::new(),
        }
    }

    fn decorations(&self, node: NodeId) -> String {
        let analysis = match self.analysis {
            Some(analysis) => analysis,
            None => return String::new(),
        };

        let mut text = String::new();
        if let Some(symbol) = analysis.decorations.binding(node) {
            text.push_str(&format!(" -> {}", symbol));
        }
        if let Some(ty) = analysis.decorations.type_of(node) {
            text.push_str(&format!(" : {}", ty));
        }
        if let Some(value) = analysis.decorations.constant(node) {
            text.push_str(&format!(" = {}", value));
        }
        text
    }
}

// Statements
impl<'a> Dumper<'a> {
    fn prog(&mut self, prog: &Prog) {
        self.nested("Program", |dumper| dumper.stmts(&prog.stmts));
    }

    fn stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.stmt(stmt);
        }
    }

    fn block(&mut self, label: &str, block: &Block) {
        self.nested(label, |dumper| dumper.stmts(&block.stmts));
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Var(def) => {
                let keyword = match def.kind {
                    DeclKind::Let => "Let",
                    DeclKind::Const => "Const",
                };
                let annotation = def.ty.as_ref().map(|ty| format!(": {}", ty)).unwrap_or_default();
                let text = format!("{} {}{}{}", keyword, def.name.name, annotation, self.decl(def.id));
                self.nested(&text, |dumper| dumper.expr(&def.rhs));
            }
            Stmt::Func(func) => self.func(func),
            Stmt::Assign(assign) => self.nested("Assign", |dumper| {
                dumper.expr(&assign.target);
                dumper.expr(&assign.rhs);
            }),
            Stmt::If(stmt) => self.if_stmt(stmt),
            Stmt::While(stmt) => self.nested("While", |dumper| {
                dumper.expr(&stmt.cond);
                dumper.block("Block", &stmt.body);
            }),
            Stmt::Return(stmt) => self.nested("Return", |dumper| {
                if let Some(value) = &stmt.value {
                    dumper.expr(value);
                }
            }),
            Stmt::Break(_) => self.node("Break"),
            Stmt::Continue(_) => self.node("Continue"),
            Stmt::Print(print) => self.nested("Print", |dumper| {
                for arg in &print.args {
                    dumper.expr(arg);
                }
            }),
            Stmt::Block(block) => self.block("Block", block),
            Stmt::Expr(expr) => self.nested("ExprStmt", |dumper| dumper.expr(expr)),
        }
    }

    fn func(&mut self, func: &FuncDef) {
        let ret = func.ret.as_ref().map(|ty| format!(" -> {}", ty)).unwrap_or_default();
        let text = format!("Fn {}{}{}", func.name.name, ret, self.decl(func.id));

        self.nested(&text, |dumper| {
            for param in &func.params {
                let annotation = param.ty.as_ref().map(|ty| format!(": {}", ty)).unwrap_or_default();
                let text = format!("Param {}{}{}", param.name.name, annotation, dumper.decl(param.id));
                dumper.node(&text);
            }
            dumper.block("Block", &func.body);
        });
    }

    fn if_stmt(&mut self, stmt: &IfStmt) {
        self.nested("If", |dumper| {
            dumper.expr(&stmt.cond);
            dumper.block("Block", &stmt.then_block);
            match &stmt.else_branch {
                Some(Else::Block(block)) => dumper.block("Else", block),
                Some(Else::If(nested)) => dumper.nested("Else", |dumper| dumper.if_stmt(nested)),
                None => {}
            }
        });
    }
}

// Expressions
impl<'a> Dumper<'a> {
    fn expr(&mut self, expr: &Expr) {
        let decorations = self.decorations(expr.id());

        match expr {
            Expr::Literal(literal) => {
                self.node(&format!("Literal {}{}", literal.value, decorations));
            }
            Expr::Access(access) => {
                self.node(&format!("Access {}{}", access.ident.name, decorations));
            }
            Expr::Unary(unary) => {
                let text = format!("Unary {}{}", unary.op, decorations);
                self.nested(&text, |dumper| dumper.expr(&unary.rhs));
            }
            Expr::Binary(binary) => {
                let text = format!("Binary {}{}", binary.op, decorations);
                self.nested(&text, |dumper| {
                    dumper.expr(&binary.lhs);
                    dumper.expr(&binary.rhs);
                });
            }
            Expr::Call(call) => {
                let text = format!("Call {}{}", call.callee.name, decorations);
                self.nested(&text, |dumper| {
                    for arg in &call.args {
                        dumper.expr(arg);
                    }
                });
            }
            Expr::Array(array) => {
                let text = format!("Array{}", decorations);
                self.nested(&text, |dumper| {
                    for item in &array.items {
                        dumper.expr(item);
                    }
                });
            }
            Expr::Index(index) => {
                let text = format!("Index{}", decorations);
                self.nested(&text, |dumper| {
                    dumper.expr(&index.target);
                    dumper.expr(&index.index);
                });
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::compile::analyze;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_dump_ast() {
        let prog = Prog::parse_str("let x: num = 1 + 2; print(x);").unwrap();
        assert_eq!(
            dump_ast(&prog),
            "Program\n  Let x: num\n    Binary +\n      Literal 1\n      Literal 2\n  Print\n    Access x\n"
        );
    }

    #[test]
    fn test_dump_decorated() {
        let prog = Prog::parse_str("const x = 1 + 2; fn f(a: num) -> num { return a * x; }").unwrap();
        let analysis = analyze(&prog).unwrap();
        assert_eq!(
            dump_decorated(&prog, &analysis),
            [
                "Program",
                "  Const x #4 constant : num",
                "    Binary + : num = 3",
                "      Literal 1 : num = 1",
                "      Literal 2 : num = 2",
                "  Fn f -> num #3 function : fn(num) -> num",
                "    Param a: num #5 parameter : num",
                "    Block",
                "      Return",
                "        Binary * : num",
                "          Access a -> #5 : num",
                "          Access x -> #4 : num = 3",
                "",
            ]
            .join("\n")
        );
    }
}
