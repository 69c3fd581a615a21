//! Simplification of a decorated syntax tree.
use super::{
    consteval::{fold_binary, fold_unary, short_circuit},
    Analysis, Type,
};
use crate::{
    parsing::{
        ArrayExpr, Assign, BinaryExpr, BinaryOp, Block, CallExpr, Else, Expr, FuncDef, IfStmt,
        IndexExpr, LitValue, Literal, NodeId, PrintStmt, Prog, ReturnStmt, Stmt, UnaryExpr,
        UnaryOp, VarDef, WhileStmt,
    },
    tokens::Span,
};
use log::debug;

/// Rewrite a program into a simpler equivalent program.
///
/// The input must have passed analysis. The result is a new tree;
/// nodes that replace an expression keep the id of the node they
/// replace, so the analysis stays valid for the optimized tree.
pub fn optimize(prog: &Prog, analysis: &Analysis) -> Prog {
    let mut optimizer = Optimizer::new(analysis);
    let optimized = optimizer.prog(prog);
    debug!("optimizer applied {} rewrites", optimizer.rewrites());
    optimized
}

/// Single bottom-up rewriting pass.
///
/// Children are rewritten before their parents, so a parent sees the
/// simplified form of its operands. Because of this one pass reaches
/// a fixed point, and optimizing an optimized tree changes nothing.
pub struct Optimizer<'a> {
    analysis: &'a Analysis,
    rewrites: usize,
}

impl<'a> Optimizer<'a> {
    pub fn new(analysis: &'a Analysis) -> Self {
        Self {
            analysis,
            rewrites: 0,
        }
    }

    /// Number of rewrites applied so far.
    pub fn rewrites(&self) -> usize {
        self.rewrites
    }

    pub fn prog(&mut self, prog: &Prog) -> Prog {
        Prog {
            stmts: self.stmts(&prog.stmts),
            node_count: prog.node_count,
        }
    }
}

// Statements
impl<'a> Optimizer<'a> {
    fn stmts(&mut self, stmts: &[Stmt]) -> Vec<Stmt> {
        let mut result: Vec<Stmt> = stmts.iter().flat_map(|stmt| self.stmt(stmt)).collect();

        // Code after a jump is unreachable.
        if let Some(index) = result.iter().position(Stmt::is_terminator) {
            let tail = result.split_off(index + 1);
            let count = tail.len();

            // Function declarations are hoisted, so they can still be
            // called from reachable code.
            if tail.iter().any(|stmt| matches!(stmt, Stmt::Func(_))) {
                result.extend(tail.into_iter().filter(Stmt::is_declaration));
            }

            if result.len() != index + 1 + count {
                self.rewrites += 1;
            }
        }

        result
    }

    fn stmt(&mut self, stmt: &Stmt) -> Vec<Stmt> {
        let stmt = match stmt {
            Stmt::Var(def) => Stmt::Var(VarDef {
                id: def.id,
                span: def.span,
                kind: def.kind,
                name: def.name.clone(),
                ty: def.ty.clone(),
                rhs: self.expr(&def.rhs),
            }),
            Stmt::Func(func) => Stmt::Func(FuncDef {
                id: func.id,
                span: func.span,
                name: func.name.clone(),
                params: func.params.clone(),
                ret: func.ret.clone(),
                body: self.block(&func.body),
            }),
            Stmt::Assign(assign) => Stmt::Assign(Assign {
                span: assign.span,
                target: self.expr(&assign.target),
                rhs: self.expr(&assign.rhs),
            }),
            Stmt::If(stmt) => return self.if_stmt(stmt),
            Stmt::While(stmt) => {
                let cond = self.expr(&stmt.cond);
                if let Some(false) = bool_literal(&cond) {
                    self.rewrites += 1;
                    return vec![];
                }
                Stmt::While(WhileStmt {
                    span: stmt.span,
                    cond,
                    body: self.block(&stmt.body),
                })
            }
            Stmt::Return(stmt) => Stmt::Return(ReturnStmt {
                span: stmt.span,
                value: stmt.value.as_ref().map(|value| self.expr(value)),
            }),
            Stmt::Break(span) => Stmt::Break(*span),
            Stmt::Continue(span) => Stmt::Continue(*span),
            Stmt::Print(print) => Stmt::Print(PrintStmt {
                span: print.span,
                args: print.args.iter().map(|arg| self.expr(arg)).collect(),
            }),
            Stmt::Block(block) => Stmt::Block(self.block(block)),
            Stmt::Expr(expr) => Stmt::Expr(self.expr(expr)),
        };

        vec![stmt]
    }

    fn block(&mut self, block: &Block) -> Block {
        Block {
            span: block.span,
            stmts: self.stmts(&block.stmts),
        }
    }

    /// Optimize a conditional, dropping it in favour of the
    /// taken branch when the condition is constant.
    fn if_stmt(&mut self, stmt: &IfStmt) -> Vec<Stmt> {
        let cond = self.expr(&stmt.cond);
        let then_block = self.block(&stmt.then_block);
        let else_branch = match &stmt.else_branch {
            Some(Else::Block(block)) => Some(Else::Block(self.block(block))),
            Some(Else::If(nested)) => self.else_if(nested),
            None => None,
        };

        match bool_literal(&cond) {
            Some(true) => {
                self.rewrites += 1;
                splice(then_block)
            }
            Some(false) => {
                self.rewrites += 1;
                match else_branch {
                    Some(Else::Block(block)) => splice(block),
                    Some(Else::If(nested)) => vec![Stmt::If(*nested)],
                    None => vec![],
                }
            }
            None => vec![Stmt::If(IfStmt {
                span: stmt.span,
                cond,
                then_block,
                else_branch,
            })],
        }
    }

    /// Optimize an `else if`, which may itself collapse into
    /// a plain block or disappear.
    fn else_if(&mut self, nested: &IfStmt) -> Option<Else> {
        let mut stmts = self.if_stmt(nested);

        match stmts.len() {
            0 => None,
            1 => match stmts.pop() {
                Some(Stmt::If(stmt)) => Some(Else::If(Box::new(stmt))),
                Some(Stmt::Block(block)) => Some(Else::Block(block)),
                Some(stmt) => Some(Else::Block(Block {
                    span: nested.span,
                    stmts: vec![stmt],
                })),
                None => None,
            },
            _ => Some(Else::Block(Block {
                span: nested.span,
                stmts,
            })),
        }
    }
}

// Expressions
impl<'a> Optimizer<'a> {
    fn expr(&mut self, expr: &Expr) -> Expr {
        // Constant expressions are free of side effects, so the
        // whole subtree can be replaced by its value.
        if let Some(value) = self.analysis.decorations.constant(expr.id()) {
            if !matches!(expr, Expr::Literal(_)) {
                self.rewrites += 1;
            }
            return literal(expr.id(), expr.span(), value.clone());
        }

        match expr {
            Expr::Literal(_) | Expr::Access(_) => expr.clone(),
            Expr::Unary(unary) => self.unary(unary),
            Expr::Binary(binary) => self.binary(binary),
            Expr::Call(call) => Expr::Call(CallExpr {
                id: call.id,
                span: call.span,
                callee: call.callee.clone(),
                args: call.args.iter().map(|arg| self.expr(arg)).collect(),
            }),
            Expr::Array(array) => Expr::Array(ArrayExpr {
                id: array.id,
                span: array.span,
                items: array.items.iter().map(|item| self.expr(item)).collect(),
            }),
            Expr::Index(index) => Expr::Index(IndexExpr {
                id: index.id,
                span: index.span,
                target: Box::new(self.expr(&index.target)),
                index: Box::new(self.expr(&index.index)),
            }),
        }
    }

    fn unary(&mut self, unary: &UnaryExpr) -> Expr {
        let rhs = self.expr(&unary.rhs);

        if let Expr::Literal(operand) = &rhs {
            if let Some(value) = fold_unary(unary.op, &operand.value) {
                self.rewrites += 1;
                return literal(unary.id, unary.span, value);
            }
        }

        // Double negation, `-(-x)` and `!!b`
        if let Expr::Unary(inner) = &rhs {
            let ty = match unary.op {
                UnaryOp::Neg => Type::Num,
                UnaryOp::Not => Type::Bool,
            };
            if inner.op == unary.op && self.has_type(&inner.rhs, &ty) {
                self.rewrites += 1;
                return inner.rhs.as_ref().clone();
            }
        }

        Expr::Unary(UnaryExpr {
            id: unary.id,
            span: unary.span,
            op: unary.op,
            rhs: Box::new(rhs),
        })
    }

    fn binary(&mut self, binary: &BinaryExpr) -> Expr {
        use BinaryOp as B;

        let lhs = self.expr(&binary.lhs);
        let rhs = self.expr(&binary.rhs);

        // Folding
        if let Expr::Literal(left) = &lhs {
            let value = short_circuit(binary.op, &left.value).or_else(|| match &rhs {
                Expr::Literal(right) => fold_binary(binary.op, &left.value, &right.value),
                _ => None,
            });
            if let Some(value) = value {
                self.rewrites += 1;
                return literal(binary.id, binary.span, value);
            }
        }

        // Identities, only where exact for every value of the operand.
        let keep_lhs = match binary.op {
            B::Sub => is_positive_zero(&rhs) && self.has_type(&lhs, &Type::Num),
            B::Div => num_literal(&rhs) == Some(1.0) && self.has_type(&lhs, &Type::Num),
            B::Mul => num_literal(&rhs) == Some(1.0) && self.has_type(&lhs, &Type::Num),
            B::Add => str_literal(&rhs) == Some("") && self.has_type(&lhs, &Type::Str),
            B::And => bool_literal(&rhs) == Some(true) && self.has_type(&lhs, &Type::Bool),
            B::Or => bool_literal(&rhs) == Some(false) && self.has_type(&lhs, &Type::Bool),
            _ => false,
        };
        if keep_lhs {
            self.rewrites += 1;
            return lhs;
        }

        let keep_rhs = match binary.op {
            B::Mul => num_literal(&lhs) == Some(1.0) && self.has_type(&rhs, &Type::Num),
            B::Add => str_literal(&lhs) == Some("") && self.has_type(&rhs, &Type::Str),
            B::And => bool_literal(&lhs) == Some(true) && self.has_type(&rhs, &Type::Bool),
            B::Or => bool_literal(&lhs) == Some(false) && self.has_type(&rhs, &Type::Bool),
            _ => false,
        };
        if keep_rhs {
            self.rewrites += 1;
            return rhs;
        }

        Expr::Binary(BinaryExpr {
            id: binary.id,
            span: binary.span,
            op: binary.op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    fn has_type(&self, expr: &Expr, ty: &Type) -> bool {
        self.analysis.decorations.type_of(expr.id()) == Some(ty)
    }
}

/// Replace a conditional by one of its branches.
///
/// The branch's statements move into the enclosing block, unless
/// they declare names that must stay in their own scope.
fn splice(block: Block) -> Vec<Stmt> {
    if block.has_declarations() {
        vec![Stmt::Block(block)]
    } else {
        block.stmts
    }
}

#[inline]
fn literal(id: NodeId, span: Span, value: LitValue) -> Expr {
    Expr::Literal(Literal { id, span, value })
}

fn num_literal(expr: &Expr) -> Option<f64> {
    match expr {
        Expr::Literal(Literal {
            value: LitValue::Num(value),
            ..
        }) => Some(*value),
        _ => None,
    }
}

fn str_literal(expr: &Expr) -> Option<&str> {
    match expr {
        Expr::Literal(Literal {
            value: LitValue::Str(value),
            ..
        }) => Some(value.as_str()),
        _ => None,
    }
}

fn bool_literal(expr: &Expr) -> Option<bool> {
    match expr {
        Expr::Literal(Literal { value, .. }) => value.as_bool(),
        _ => None,
    }
}

/// `x - 0` is exact, but `x - -0` turns `-0` into `0`.
fn is_positive_zero(expr: &Expr) -> bool {
    matches!(num_literal(expr), Some(value) if value == 0.0 && value.is_sign_positive())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::compile::analyze;

    fn optimize_str(source: &str) -> Prog {
        let prog = Prog::parse_str(source).expect("parse");
        let analysis = analyze(&prog).expect("analysis");
        optimize(&prog, &analysis)
    }

    fn var_rhs(prog: &Prog, index: usize) -> &Expr {
        match &prog.stmts[index] {
            Stmt::Var(def) => &def.rhs,
            stmt => panic!("expected a variable definition, found {:?}", stmt),
        }
    }

    #[test]
    fn test_fold_arithmetic() {
        let prog = optimize_str("let x = 2 + 3 * 4;");
        assert_eq!(num_literal(var_rhs(&prog, 0)), Some(14.0));
    }

    #[test]
    fn test_keeps_node_identity() {
        let source = "let x = 2 + 3 * 4;";
        let prog = Prog::parse_str(source).unwrap();
        let analysis = analyze(&prog).unwrap();
        let optimized = optimize(&prog, &analysis);

        assert_eq!(var_rhs(&prog, 0).id(), var_rhs(&optimized, 0).id());
    }

    #[test]
    fn test_identities() {
        let prog = optimize_str(
            "fn f(x: num, s: str, b: bool, a) { print(x * 1, 1 * x, x / 1, x - 0, -(-x), s + \"\", !!b, b && true, false || b, a * 1, x + 0); }",
        );
        let args = match &prog.stmts[0] {
            Stmt::Func(func) => match &func.body.stmts[0] {
                Stmt::Print(print) => &print.args,
                stmt => panic!("unexpected statement {:?}", stmt),
            },
            stmt => panic!("unexpected statement {:?}", stmt),
        };

        let names: Vec<Option<&str>> = args
            .iter()
            .map(|arg| match arg {
                Expr::Access(access) => Some(access.ident.name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(
            names,
            vec![
                Some("x"),
                Some("x"),
                Some("x"),
                Some("x"),
                Some("x"),
                Some("s"),
                Some("b"),
                Some("b"),
                Some("b"),
                // Dynamic operands may coerce.
                None,
                // `-0 + 0` is `0`
                None,
            ]
        );
    }

    #[test]
    fn test_dead_branches() {
        let prog = optimize_str("if true { print(1); } else { print(2); }");
        assert_eq!(prog.stmts.len(), 1);
        assert!(matches!(prog.stmts[0], Stmt::Print(_)));

        let prog = optimize_str("if false { print(1); }");
        assert!(prog.stmts.is_empty());

        let prog = optimize_str("if 1 > 2 { print(1); } else { let a = 1; print(a); }");
        assert!(matches!(&prog.stmts[..], [Stmt::Block(_)]));

        let prog = optimize_str("let c = true; if c { } else if false { print(1); } else { print(2); }");
        match &prog.stmts[1] {
            Stmt::If(stmt) => assert!(matches!(&stmt.else_branch, Some(Else::Block(block)) if block.stmts.len() == 1)),
            stmt => panic!("unexpected statement {:?}", stmt),
        }

        let prog = optimize_str("while false { print(1); }");
        assert!(prog.stmts.is_empty());
    }

    #[test]
    fn test_unreachable() {
        let prog = optimize_str("fn f() { return 1; print(2); }");
        match &prog.stmts[0] {
            Stmt::Func(func) => assert_eq!(func.body.stmts.len(), 1),
            stmt => panic!("unexpected statement {:?}", stmt),
        }

        let prog = optimize_str("fn f() { return g(); let a = 1; print(a); fn g() { return 2; } }");
        match &prog.stmts[0] {
            Stmt::Func(func) => {
                assert_eq!(func.body.stmts.len(), 3);
                assert!(matches!(func.body.stmts[1], Stmt::Var(_)));
                assert!(matches!(func.body.stmts[2], Stmt::Func(_)));
            }
            stmt => panic!("unexpected statement {:?}", stmt),
        }
    }

    #[test]
    fn test_keeps_side_effects() {
        let prog = optimize_str("fn f() -> bool { print(1); return true; } let a = f() && true; let b = false && f();");
        assert!(matches!(var_rhs(&prog, 1), Expr::Call(_)));
        assert_eq!(bool_literal(var_rhs(&prog, 2)), Some(false));
    }
}
