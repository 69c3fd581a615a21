//! Semantic analysis.
use super::{
    consteval::{fold_binary, fold_unary, short_circuit},
    Analysis, Builtin, Decorations, Scope, SemanticError, SemanticErrorKind as E, Symbol, SymbolId,
    SymbolKind, SymbolTable, Type,
};
use crate::{
    parsing::{
        Access, ArrayExpr, Assign, BinaryExpr, BinaryOp, Block, CallExpr, DeclKind, Else, Expr,
        FuncDef, Ident, IfStmt, IndexExpr, LitValue, NodeId, Prog, ReturnStmt, Stmt, TypeExpr,
        TypeExprKind, UnaryExpr, UnaryOp, VarDef, WhileStmt,
    },
    tokens::Span,
};
use log::{debug, trace};
use std::{
    collections::{BTreeSet, HashMap},
    mem,
};

/// Analyze a parsed program.
///
/// Returns every semantic error found in the program, in the
/// order they were detected.
pub fn analyze(prog: &Prog) -> Result<Analysis, Vec<SemanticError>> {
    Analyzer::new().analyze(prog)
}

/// Builds up a symbol table and maps syntax tree nodes to symbols,
/// types and constant values.
///
/// The analyzer doesn't stop at the first error. Expressions that fail
/// a check get the dynamic `any` type so the error doesn't cascade into
/// the enclosing expressions, and are left undecorated.
pub struct Analyzer {
    symbols: SymbolTable,
    decorations: Decorations,
    /// Current scope that's being analyzed.
    current: Scope,
    /// Enclosing scopes of the current scope, outermost first.
    ///
    /// When a block starts, the current scope is pushed onto the stack.
    /// When the block ends, the top is popped and set as current.
    /// The bottom scope holds the builtins.
    stack: Vec<Scope>,
    /// Hoisted function signatures.
    signatures: HashMap<NodeId, Type>,
    /// Return type of the function being analyzed. `None` outside of functions.
    ret: Option<Type>,
    /// Number of loops around the current statement, inside the current function.
    loops: u32,
    /// Function body being analyzed. `0` is the top level of the program.
    context: usize,
    /// Number of function bodies entered so far.
    contexts: usize,
    /// Body that declares each variable, constant and parameter.
    owners: HashMap<SymbolId, usize>,
    /// Body of each declared function.
    bodies: HashMap<SymbolId, usize>,
    /// Variables of enclosing bodies that each body reads or writes.
    captures: HashMap<usize, BTreeSet<SymbolId>>,
    /// Calls of declared functions, checked once every body is known.
    calls: Vec<CallSite>,
    errors: Vec<SemanticError>,
}

/// Call of a declared function.
#[derive(Debug, Clone)]
struct CallSite {
    /// Body that contains the call.
    context: usize,
    callee: SymbolId,
    /// Number of symbols declared when the call was reached.
    declared: usize,
    span: Span,
}

impl Analyzer {
    pub fn new() -> Self {
        let mut analyzer = Analyzer {
            symbols: SymbolTable::new(),
            decorations: Decorations::default(),
            current: Scope::default(),
            stack: vec![],
            signatures: HashMap::new(),
            ret: None,
            loops: 0,
            context: 0,
            contexts: 0,
            owners: HashMap::new(),
            bodies: HashMap::new(),
            captures: HashMap::new(),
            calls: vec![],
            errors: vec![],
        };

        for builtin in Builtin::ALL {
            let id = analyzer.symbols.add_symbol(Symbol {
                id: SymbolId(0),
                name: builtin.name().into(),
                kind: SymbolKind::Builtin(builtin),
                ty: builtin.signature(),
                mutable: false,
                decl: None,
                span: Span::default(),
                value: None,
                shadows: false,
            });
            analyzer.current.add_symbol(builtin.name().into(), id);
        }

        analyzer
    }

    pub fn analyze(mut self, prog: &Prog) -> Result<Analysis, Vec<SemanticError>> {
        self.push_scope();
        self.stmts(&prog.stmts);
        self.pop_scope();
        self.check_calls();

        debug!(
            "analysis declared {} symbols, found {} errors",
            self.symbols.len(),
            self.errors.len()
        );

        if self.errors.is_empty() {
            Ok(Analysis {
                symbols: self.symbols,
                decorations: self.decorations,
            })
        } else {
            Err(self.errors)
        }
    }
}

impl Default for Analyzer {
    #[inline]
    fn default() -> Self {
        Analyzer::new()
    }
}

// Scopes
impl Analyzer {
    fn push_scope(&mut self) {
        let outer = mem::take(&mut self.current);
        self.stack.push(outer);
    }

    fn pop_scope(&mut self) {
        self.current = self.stack.pop().unwrap_or_default();
    }

    /// Lookup the given symbol name according to the scope rules.
    ///
    /// First search the current scope for the symbol. If not
    /// found, walk the stack from the top to the bottom.
    ///
    /// This should result in the effect of blocks having access
    /// to their parent scopes, but not their siblings.
    fn lookup(&self, name: &str) -> Option<&Symbol> {
        std::iter::once(&self.current)
            .chain(self.stack.iter().rev())
            .find_map(|scope| scope.get_symbol(name))
            .and_then(|id| self.symbols.get(id))
    }

    /// Register a new symbol in the current scope.
    ///
    /// Returns `None` when the name is already declared in the scope.
    fn declare(
        &mut self,
        name: &Ident,
        kind: SymbolKind,
        ty: Type,
        decl: NodeId,
        value: Option<LitValue>,
    ) -> Option<SymbolId> {
        if self.current.contains_symbol(name.name.as_str()) {
            self.error(E::DuplicateDeclaration(name.name.clone()), name.span);
            return None;
        }

        // The builtin scope doesn't count, builtins never appear
        // by name in generated code.
        let shadows = self
            .stack
            .iter()
            .skip(1)
            .any(|scope| scope.contains_symbol(name.name.as_str()));

        let id = self.symbols.add_symbol(Symbol {
            id: SymbolId(0),
            name: name.name.clone(),
            kind,
            ty,
            mutable: matches!(kind, SymbolKind::Variable | SymbolKind::Parameter),
            decl: Some(decl),
            span: name.span,
            value,
            shadows,
        });
        self.current.add_symbol(name.name.clone(), id);
        self.decorations.set_binding(decl, id);
        if let SymbolKind::Variable | SymbolKind::Constant | SymbolKind::Parameter = kind {
            self.owners.insert(id, self.context);
        }

        Some(id)
    }

    /// Record a variable used by the current body that an
    /// enclosing body declares.
    fn capture(&mut self, id: SymbolId) {
        let outer = matches!(self.owners.get(&id), Some(owner) if *owner != self.context);
        if outer {
            self.captures.entry(self.context).or_default().insert(id);
        }
    }

    #[inline]
    fn error(&mut self, kind: E, span: Span) {
        trace!("semantic error at {:?}: {}", span, kind);
        self.errors.push(SemanticError::new(kind, span));
    }
}

// Types
impl Analyzer {
    /// Resolve a type annotation of a variable or parameter.
    fn resolve_type(&mut self, ty: &TypeExpr) -> Type {
        match &ty.kind {
            TypeExprKind::Named(name) => match Type::from_name(name.as_str()) {
                Some(Type::Void) => {
                    self.error(E::VoidType, ty.span);
                    Type::Any
                }
                Some(resolved) => resolved,
                None => {
                    self.error(E::UnknownType(name.clone()), ty.span);
                    Type::Any
                }
            },
            TypeExprKind::Array(element) => Type::Array(Box::new(self.resolve_type(element))),
        }
    }

    /// Resolve the return type annotation of a function, the only
    /// place where `void` is allowed.
    fn resolve_return_type(&mut self, ty: &TypeExpr) -> Type {
        match &ty.kind {
            TypeExprKind::Named(name) if name == "void" => Type::Void,
            _ => self.resolve_type(ty),
        }
    }
}

// Statements
impl Analyzer {
    fn stmts(&mut self, stmts: &[Stmt]) {
        // Function signatures are hoisted, so functions can
        // call each other regardless of declaration order.
        for stmt in stmts {
            if let Stmt::Func(func) = stmt {
                self.declare_func(func);
            }
        }

        for stmt in stmts {
            self.stmt(stmt);
        }
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Var(def) => self.var_def(def),
            Stmt::Func(func) => self.func_body(func),
            Stmt::Assign(assign) => self.assign(assign),
            Stmt::If(stmt) => self.if_stmt(stmt),
            Stmt::While(stmt) => self.while_stmt(stmt),
            Stmt::Return(stmt) => self.return_stmt(stmt),
            Stmt::Break(span) => {
                if self.loops == 0 {
                    self.error(E::BreakOutsideLoop, *span);
                }
            }
            Stmt::Continue(span) => {
                if self.loops == 0 {
                    self.error(E::ContinueOutsideLoop, *span);
                }
            }
            Stmt::Print(print) => {
                for arg in &print.args {
                    self.value(arg);
                }
            }
            Stmt::Block(block) => self.block(block),
            Stmt::Expr(expr) => {
                // Expression statements may discard a void result.
                self.expr(expr);
            }
        }
    }

    fn block(&mut self, block: &Block) {
        self.push_scope();
        self.stmts(&block.stmts);
        self.pop_scope();
    }

    fn var_def(&mut self, def: &VarDef) {
        // The right-hand-side is checked before the name is declared, so
        // an initializer can't refer to the variable being defined.
        let value_ty = self.value(&def.rhs);

        let ty = match &def.ty {
            Some(annotation) => {
                let expected = self.resolve_type(annotation);
                if !expected.accepts(&value_ty) {
                    self.error(
                        E::TypeMismatch {
                            expected: expected.clone(),
                            found: value_ty,
                        },
                        def.rhs.span(),
                    );
                }
                expected
            }
            None => value_ty,
        };

        let (kind, value) = match def.kind {
            DeclKind::Let => (SymbolKind::Variable, None),
            DeclKind::Const => (
                SymbolKind::Constant,
                self.decorations.constant(def.rhs.id()).cloned(),
            ),
        };

        self.declare(&def.name, kind, ty, def.id, value);
    }

    fn declare_func(&mut self, func: &FuncDef) {
        let params = func
            .params
            .iter()
            .map(|param| match &param.ty {
                Some(ty) => self.resolve_type(ty),
                None => Type::Any,
            })
            .collect();
        let ret = match &func.ret {
            Some(ty) => self.resolve_return_type(ty),
            None => Type::Any,
        };
        let ty = Type::Func {
            params,
            ret: Box::new(ret),
        };

        self.signatures.insert(func.id, ty.clone());
        self.declare(&func.name, SymbolKind::Function, ty, func.id, None);
    }

    fn func_body(&mut self, func: &FuncDef) {
        trace!("analyzing function '{}'", func.name.name);

        let (params, ret) = match self.signatures.get(&func.id) {
            Some(Type::Func { params, ret }) => (params.clone(), ret.as_ref().clone()),
            _ => (vec![Type::Any; func.params.len()], Type::Any),
        };

        // Loops don't extend into nested functions.
        let outer_ret = self.ret.replace(ret.clone());
        let outer_loops = mem::replace(&mut self.loops, 0);

        self.contexts += 1;
        let outer_context = mem::replace(&mut self.context, self.contexts);
        if let Some(id) = self.decorations.binding(func.id) {
            self.bodies.insert(id, self.context);
        }

        // Parameters share a scope with the top level of the body.
        self.push_scope();
        for (param, ty) in func.params.iter().zip(params) {
            self.declare(&param.name, SymbolKind::Parameter, ty, param.id, None);
        }
        self.stmts(&func.body.stmts);
        self.pop_scope();

        self.ret = outer_ret;
        self.loops = outer_loops;
        self.context = outer_context;

        let must_return = func.ret.is_some() && !matches!(ret, Type::Void | Type::Any);
        if must_return && !returns(&func.body.stmts, &self.decorations) {
            self.error(E::MissingReturn(func.name.name.clone()), func.name.span);
        }
    }

    fn assign(&mut self, assign: &Assign) {
        let target_ty = match &assign.target {
            Expr::Access(access) => self.assign_target(access),
            Expr::Index(index) => {
                let target_ty = self.index(index);
                if let Some(Type::Str) = self.decorations.type_of(index.target.id()) {
                    self.error(E::StringElementAssign, index.span);
                    Type::Any
                } else {
                    target_ty
                }
            }
            // Parser only produces variables and elements as targets.
            other => self.value(other),
        };

        let value_ty = self.value(&assign.rhs);

        if !target_ty.accepts(&value_ty) {
            self.error(
                E::TypeMismatch {
                    expected: target_ty,
                    found: value_ty,
                },
                assign.rhs.span(),
            );
        }
    }

    /// Resolve a variable that's being assigned to.
    fn assign_target(&mut self, access: &Access) -> Type {
        let name = &access.ident.name;

        let (id, kind, ty) = match self.lookup(name.as_str()) {
            Some(symbol) => (symbol.id, symbol.kind, symbol.ty.clone()),
            None => {
                self.error(E::UndeclaredIdentifier(name.clone()), access.ident.span);
                return Type::Any;
            }
        };

        match kind {
            SymbolKind::Constant => {
                self.error(E::AssignToConst(name.clone()), access.ident.span);
                Type::Any
            }
            SymbolKind::Function | SymbolKind::Builtin(_) => {
                self.error(E::AssignToFunction(name.clone()), access.ident.span);
                Type::Any
            }
            SymbolKind::Variable | SymbolKind::Parameter => {
                self.capture(id);
                self.decorations.set_binding(access.id, id);
                self.decorations.set_type(access.id, ty.clone());
                ty
            }
        }
    }

    fn if_stmt(&mut self, stmt: &IfStmt) {
        self.condition(&stmt.cond);
        self.block(&stmt.then_block);

        match &stmt.else_branch {
            Some(Else::Block(block)) => self.block(block),
            Some(Else::If(stmt)) => self.if_stmt(stmt),
            None => {}
        }
    }

    fn while_stmt(&mut self, stmt: &WhileStmt) {
        self.condition(&stmt.cond);

        self.loops += 1;
        self.block(&stmt.body);
        self.loops -= 1;
    }

    fn condition(&mut self, cond: &Expr) {
        let ty = self.value(cond);
        if !ty.is_boolean() {
            self.error(E::ConditionNotBool(ty), cond.span());
        }
    }

    fn return_stmt(&mut self, stmt: &ReturnStmt) {
        let ret = match self.ret.clone() {
            Some(ret) => ret,
            None => {
                self.error(E::ReturnOutsideFunction, stmt.span);
                if let Some(value) = &stmt.value {
                    self.value(value);
                }
                return;
            }
        };

        match &stmt.value {
            Some(value) => {
                let ty = self.value(value);
                if ret == Type::Void {
                    self.error(E::UnexpectedReturnValue, value.span());
                } else if !ret.accepts(&ty) {
                    self.error(
                        E::ReturnTypeMismatch {
                            expected: ret,
                            found: ty,
                        },
                        value.span(),
                    );
                }
            }
            None => {
                if !matches!(ret, Type::Void | Type::Any) {
                    self.error(E::MissingReturnValue(ret), stmt.span);
                }
            }
        }
    }
}

// Expressions
impl Analyzer {
    /// Analyze an expression whose result is used as a value.
    fn value(&mut self, expr: &Expr) -> Type {
        match self.expr(expr) {
            Type::Void => {
                self.error(E::VoidValue, expr.span());
                Type::Any
            }
            ty => ty,
        }
    }

    fn expr(&mut self, expr: &Expr) -> Type {
        match expr {
            Expr::Literal(literal) => {
                let ty = match literal.value {
                    LitValue::Num(_) => Type::Num,
                    LitValue::Str(_) => Type::Str,
                    LitValue::Bool(_) => Type::Bool,
                };
                self.decorations.set_type(literal.id, ty.clone());
                self.decorations
                    .set_constant(literal.id, literal.value.clone());
                ty
            }
            Expr::Access(access) => self.access(access),
            Expr::Unary(unary) => self.unary(unary),
            Expr::Binary(binary) => self.binary(binary),
            Expr::Call(call) => self.call(call),
            Expr::Array(array) => self.array(array),
            Expr::Index(index) => self.index(index),
        }
    }

    /// When an expression accesses a symbol, we ensure
    /// that it has been declared.
    fn access(&mut self, access: &Access) -> Type {
        let name = &access.ident.name;

        let (id, kind, ty, value) = match self.lookup(name.as_str()) {
            Some(symbol) => (symbol.id, symbol.kind, symbol.ty.clone(), symbol.value.clone()),
            None => {
                self.error(E::UndeclaredIdentifier(name.clone()), access.ident.span);
                return Type::Any;
            }
        };

        if let SymbolKind::Function | SymbolKind::Builtin(_) = kind {
            self.error(E::FunctionAsValue(name.clone()), access.ident.span);
            return Type::Any;
        }

        self.capture(id);
        self.decorations.set_binding(access.id, id);
        self.decorations.set_type(access.id, ty.clone());
        if let Some(value) = value {
            self.decorations.set_constant(access.id, value);
        }

        ty
    }

    fn unary(&mut self, unary: &UnaryExpr) -> Type {
        let operand = self.value(&unary.rhs);

        let ty = match unary.op {
            UnaryOp::Neg if operand.is_numeric() => Type::Num,
            UnaryOp::Not if operand.is_boolean() => Type::Bool,
            op => {
                self.error(E::InvalidOperand { op, ty: operand }, unary.span);
                return Type::Any;
            }
        };

        self.decorations.set_type(unary.id, ty.clone());

        let value = self
            .decorations
            .constant(unary.rhs.id())
            .and_then(|rhs| fold_unary(unary.op, rhs));
        if let Some(value) = value {
            self.decorations.set_constant(unary.id, value);
        }

        ty
    }

    fn binary(&mut self, binary: &BinaryExpr) -> Type {
        let lhs = self.value(&binary.lhs);
        let rhs = self.value(&binary.rhs);

        let ty = match binary_type(binary.op, &lhs, &rhs) {
            Some(ty) => ty,
            None => {
                self.error(
                    E::InvalidOperands {
                        op: binary.op,
                        lhs,
                        rhs,
                    },
                    binary.span,
                );
                return Type::Any;
            }
        };

        self.decorations.set_type(binary.id, ty.clone());

        let lhs_value = self.decorations.constant(binary.lhs.id());
        let rhs_value = self.decorations.constant(binary.rhs.id());
        let value = match (lhs_value, rhs_value) {
            (Some(lhs), rhs) => short_circuit(binary.op, lhs)
                .or_else(|| rhs.and_then(|rhs| fold_binary(binary.op, lhs, rhs))),
            (None, _) => None,
        };
        if let Some(value) = value {
            self.decorations.set_constant(binary.id, value);
        }

        ty
    }

    fn call(&mut self, call: &CallExpr) -> Type {
        let name = &call.callee.name;

        let callee = self
            .lookup(name.as_str())
            .map(|symbol| (symbol.id, symbol.kind, symbol.ty.clone()));
        let args: Vec<Type> = call.args.iter().map(|arg| self.value(arg)).collect();

        let (id, kind, params, ret) = match callee {
            Some((id, kind, Type::Func { params, ret }))
                if matches!(kind, SymbolKind::Function | SymbolKind::Builtin(_)) =>
            {
                (id, kind, params, *ret)
            }
            Some(_) => {
                self.error(E::NotCallable(name.clone()), call.callee.span);
                return Type::Any;
            }
            None => {
                self.error(E::UndeclaredIdentifier(name.clone()), call.callee.span);
                return Type::Any;
            }
        };

        if params.len() != args.len() {
            self.error(
                E::ArityMismatch {
                    name: name.clone(),
                    expected: params.len(),
                    found: args.len(),
                },
                call.span,
            );
            return Type::Any;
        }

        let mut valid = true;
        for (index, (param, arg)) in params.iter().zip(args).enumerate() {
            let span = call.args[index].span();

            if let SymbolKind::Builtin(Builtin::Len) = kind {
                if !matches!(arg, Type::Array(_) | Type::Str | Type::Any) {
                    self.error(E::LengthOf(arg), span);
                    valid = false;
                }
            } else if !param.accepts(&arg) {
                self.error(
                    E::ArgumentType {
                        name: name.clone(),
                        index,
                        expected: param.clone(),
                        found: arg,
                    },
                    span,
                );
                valid = false;
            }
        }

        if !valid {
            return Type::Any;
        }

        if let SymbolKind::Function = kind {
            self.calls.push(CallSite {
                context: self.context,
                callee: id,
                declared: self.symbols.len(),
                span: call.span,
            });
        }

        self.decorations.set_binding(call.id, id);
        self.decorations.set_type(call.id, ret.clone());

        ret
    }

    fn array(&mut self, array: &ArrayExpr) -> Type {
        let mut element: Option<Type> = None;
        let mut valid = true;

        for item in &array.items {
            let ty = self.value(item);

            element = match element {
                None => Some(ty),
                Some(expected) => match expected.unify(&ty) {
                    Some(unified) => Some(unified),
                    None => {
                        // Report the first mismatch only.
                        if valid {
                            self.error(
                                E::MixedArray {
                                    expected: expected.clone(),
                                    found: ty,
                                },
                                item.span(),
                            );
                        }
                        valid = false;
                        Some(expected)
                    }
                },
            };
        }

        if !valid {
            return Type::Any;
        }

        let ty = Type::Array(Box::new(element.unwrap_or(Type::Any)));
        self.decorations.set_type(array.id, ty.clone());
        ty
    }

    fn index(&mut self, index: &IndexExpr) -> Type {
        let target = self.value(&index.target);
        let position = self.value(&index.index);

        let element = match target.element() {
            Some(element) => element,
            None => {
                self.error(E::NotIndexable(target), index.target.span());
                return Type::Any;
            }
        };

        if !position.is_numeric() {
            self.error(E::NonNumericIndex(position), index.index.span());
            return Type::Any;
        }

        self.decorations.set_type(index.id, element.clone());
        element
    }
}

// Calls
impl Analyzer {
    /// A call runs the callee's body on the spot, so every variable the
    /// body reaches outside of itself must be declared before the call.
    ///
    /// Function declarations are hoisted, which makes it possible to call
    /// a function before the variables it uses exist.
    fn check_calls(&mut self) {
        let captures = self.transitive_captures();
        let mut errors = vec![];

        for call in &self.calls {
            let used = match self.bodies.get(&call.callee).and_then(|body| captures.get(body)) {
                Some(used) => used,
                None => continue,
            };

            let early = used.iter().find(|var| {
                self.owners.get(*var) == Some(&call.context) && var.0 as usize >= call.declared
            });

            if let (Some(var), Some(callee)) = (early, self.symbols.get(call.callee)) {
                let name = self
                    .symbols
                    .get(*var)
                    .map(|symbol| symbol.name.clone())
                    .unwrap_or_default();
                errors.push((
                    E::CalledBeforeDeclaration {
                        function: callee.name.clone(),
                        name,
                    },
                    call.span,
                ));
            }
        }

        for (kind, span) in errors {
            self.error(kind, span);
        }
    }

    /// Variables each body uses from enclosing bodies, including
    /// the ones used by the functions it calls.
    fn transitive_captures(&self) -> HashMap<usize, BTreeSet<SymbolId>> {
        let mut captures = self.captures.clone();

        loop {
            let mut changed = false;

            for call in &self.calls {
                let inherited: Vec<SymbolId> = self
                    .bodies
                    .get(&call.callee)
                    .and_then(|body| captures.get(body))
                    .into_iter()
                    .flatten()
                    .filter(|var| self.owners.get(*var) != Some(&call.context))
                    .copied()
                    .collect();

                let own = captures.entry(call.context).or_default();
                for var in inherited {
                    changed |= own.insert(var);
                }
            }

            if !changed {
                return captures;
            }
        }
    }
}

/// Result type of a binary operation, or `None` when the
/// operand types don't support the operator.
fn binary_type(op: BinaryOp, lhs: &Type, rhs: &Type) -> Option<Type> {
    use BinaryOp as B;

    match op {
        B::Add => match (lhs, rhs) {
            (Type::Any, Type::Any) => Some(Type::Any),
            (Type::Num, Type::Num) | (Type::Num, Type::Any) | (Type::Any, Type::Num) => {
                Some(Type::Num)
            }
            (Type::Str, Type::Str) | (Type::Str, Type::Any) | (Type::Any, Type::Str) => {
                Some(Type::Str)
            }
            _ => None,
        },
        B::Sub | B::Mul | B::Div | B::Rem => {
            (lhs.is_numeric() && rhs.is_numeric()).then(|| Type::Num)
        }
        B::Eq | B::NotEq => lhs.accepts(rhs).then(|| Type::Bool),
        B::Less | B::LessEq | B::Greater | B::GreaterEq => {
            let numbers = lhs.is_numeric() && rhs.is_numeric();
            let strings = lhs.is_string() && rhs.is_string();
            (numbers || strings).then(|| Type::Bool)
        }
        B::And | B::Or => (lhs.is_boolean() && rhs.is_boolean()).then(|| Type::Bool),
    }
}

/// Statements definitely end in a return.
fn returns(stmts: &[Stmt], decorations: &Decorations) -> bool {
    stmts.iter().any(|stmt| match stmt {
        Stmt::Return(_) => true,
        Stmt::Block(block) => returns(&block.stmts, decorations),
        Stmt::If(stmt) => if_returns(stmt, decorations),
        // A loop that never exits can't fall through.
        Stmt::While(stmt) => {
            let forever = matches!(
                decorations.constant(stmt.cond.id()),
                Some(LitValue::Bool(true))
            );
            forever && !breaks(&stmt.body.stmts)
        }
        _ => false,
    })
}

fn if_returns(stmt: &IfStmt, decorations: &Decorations) -> bool {
    let else_returns = match &stmt.else_branch {
        Some(Else::Block(block)) => returns(&block.stmts, decorations),
        Some(Else::If(stmt)) => if_returns(stmt, decorations),
        None => false,
    };
    else_returns && returns(&stmt.then_block.stmts, decorations)
}

/// Statements contain a `break` out of the enclosing loop.
fn breaks(stmts: &[Stmt]) -> bool {
    stmts.iter().any(|stmt| match stmt {
        Stmt::Break(_) => true,
        Stmt::Block(block) => breaks(&block.stmts),
        Stmt::If(stmt) => if_breaks(stmt),
        _ => false,
    })
}

fn if_breaks(stmt: &IfStmt) -> bool {
    breaks(&stmt.then_block.stmts)
        || match &stmt.else_branch {
            Some(Else::Block(block)) => breaks(&block.stmts),
            Some(Else::If(stmt)) => if_breaks(stmt),
            None => false,
        }
}

#[cfg(test)]
mod test {
    use super::*;

    fn analyze_str(source: &str) -> Result<Analysis, Vec<SemanticError>> {
        let prog = Prog::parse_str(source).expect("parse");
        analyze(&prog)
    }

    fn error_kinds(source: &str) -> Vec<E> {
        analyze_str(source)
            .expect_err("analysis should fail")
            .into_iter()
            .map(|err| err.kind)
            .collect()
    }

    #[test]
    fn test_binding() {
        let prog = Prog::parse_str("let x = 1; print(x);").unwrap();
        let analysis = analyze(&prog).unwrap();

        let access = match &prog.stmts[1] {
            Stmt::Print(print) => print.args[0].id(),
            stmt => panic!("unexpected statement {:?}", stmt),
        };
        let symbol = analysis.symbol_of(access).expect("binding");
        assert_eq!(symbol.name, "x");
        assert_eq!(symbol.kind, SymbolKind::Variable);
        assert_eq!(analysis.decorations.type_of(access), Some(&Type::Num));
    }

    #[test]
    fn test_undeclared() {
        assert_eq!(
            error_kinds("print(y);"),
            vec![E::UndeclaredIdentifier("y".into())]
        );
    }

    #[test]
    fn test_collects_all_errors() {
        let kinds = error_kinds("let a = 1 + true; print(b); break;");
        assert_eq!(kinds.len(), 3);
        assert!(matches!(kinds[0], E::InvalidOperands { op: BinaryOp::Add, .. }));
        assert_eq!(kinds[1], E::UndeclaredIdentifier("b".into()));
        assert_eq!(kinds[2], E::BreakOutsideLoop);
    }

    #[test]
    fn test_hoisted_functions() {
        assert!(analyze_str(
            r#"
            fn even(n: num) -> bool { if n == 0 { return true; } return odd(n - 1); }
            fn odd(n: num) -> bool { if n == 0 { return false; } return even(n - 1); }
            print(even(10));
            "#
        )
        .is_ok());
    }

    #[test]
    fn test_called_before_declaration() {
        let early = |function: &str, name: &str| E::CalledBeforeDeclaration {
            function: function.into(),
            name: name.into(),
        };

        assert_eq!(
            error_kinds("print(f()); const c = 5; fn f() -> num { return c; }"),
            vec![early("f", "c")]
        );
        assert_eq!(
            error_kinds("const c = f(); fn f() -> num { return c; }"),
            vec![early("f", "c")]
        );
        // Writes count as well.
        assert_eq!(
            error_kinds("reset(); let n = 1; fn reset() { n = 0; }"),
            vec![early("reset", "n")]
        );
        // Through another function.
        assert_eq!(
            error_kinds(
                "fn g() -> num { return f(); } print(g()); let c = 1; fn f() -> num { return c; }"
            ),
            vec![early("g", "c")]
        );
        // Locals of an enclosing function.
        assert_eq!(
            error_kinds(
                "fn outer() -> num { let r = inner(); let c = 1; fn inner() -> num { return c; } return r; }"
            ),
            vec![early("inner", "c")]
        );

        assert!(analyze_str("const c = 5; print(f()); fn f() -> num { return c; }").is_ok());
        // The call inside `g` only runs once `g` is called.
        assert!(analyze_str(
            "fn g() -> num { return f(); } let c = 1; print(g()); fn f() -> num { return c; }"
        )
        .is_ok());
        assert!(analyze_str("fn f(n: num) -> num { if n > 0 { return f(n - 1); } return n; } print(f(3));").is_ok());
    }

    #[test]
    fn test_param_body_scope() {
        assert_eq!(
            error_kinds("fn f(a) { let a = 2; }"),
            vec![E::DuplicateDeclaration("a".into())]
        );
    }

    #[test]
    fn test_loop_context() {
        assert_eq!(
            error_kinds("while true { fn f() { break; } }"),
            vec![E::BreakOutsideLoop]
        );
        assert!(analyze_str("while true { if false { continue; } break; }").is_ok());
    }

    #[test]
    fn test_missing_return() {
        assert_eq!(
            error_kinds("fn f(a: num) -> num { if a > 0 { return a; } }"),
            vec![E::MissingReturn("f".into())]
        );
        assert!(analyze_str("fn f(a: num) -> num { if a > 0 { return a; } else { return 0; } }").is_ok());
        assert!(analyze_str("fn f() -> num { while true { } }").is_ok());
    }

    #[test]
    fn test_assign_rules() {
        assert_eq!(
            error_kinds("const c = 1; c = 2;"),
            vec![E::AssignToConst("c".into())]
        );
        assert_eq!(
            error_kinds("fn f() {} f = 2;"),
            vec![E::AssignToFunction("f".into())]
        );
        assert_eq!(
            error_kinds("let s = \"abc\"; s[0] = \"x\";"),
            vec![E::StringElementAssign]
        );
    }

    #[test]
    fn test_constants() {
        let prog = Prog::parse_str("const a = 2; const b = a * 3 + 1; let c = false && b > 1;").unwrap();
        let analysis = analyze(&prog).unwrap();

        let constant = |index: usize| match &prog.stmts[index] {
            Stmt::Var(def) => analysis.decorations.constant(def.rhs.id()).cloned(),
            _ => None,
        };
        assert_eq!(constant(1), Some(LitValue::Num(7.0)));
        assert_eq!(constant(2), Some(LitValue::Bool(false)));

        let b = analysis.symbols.iter().find(|s| s.name == "b").unwrap();
        assert_eq!(b.value, Some(LitValue::Num(7.0)));
    }

    #[test]
    fn test_shadowing() {
        let analysis = analyze_str("let x = 1; { let x = \"a\"; print(x); } fn f(x) { return x; }").unwrap();
        let xs: Vec<_> = analysis
            .symbols
            .iter()
            .filter(|s| s.name == "x")
            .map(|s| (s.kind, s.shadows))
            .collect();
        assert_eq!(
            xs,
            vec![
                (SymbolKind::Variable, false),
                (SymbolKind::Variable, true),
                (SymbolKind::Parameter, true),
            ]
        );
    }

    #[test]
    fn test_builtins() {
        assert!(analyze_str("print(len([1, 2]), len(\"ab\"), sqrt(4), abs(-1));").is_ok());
        assert_eq!(
            error_kinds("print(len(1));"),
            vec![E::LengthOf(Type::Num)]
        );
        assert_eq!(
            error_kinds("let f = sqrt;"),
            vec![E::FunctionAsValue("sqrt".into())]
        );
        // User declarations shadow builtins.
        assert!(analyze_str("fn len(a, b) { return a; } print(len(1, 2));").is_ok());
    }

    #[test]
    fn test_void_value() {
        assert_eq!(
            error_kinds("fn f() -> void { } let a = f();"),
            vec![E::VoidValue]
        );
        assert!(analyze_str("fn f() -> void { return; } f();").is_ok());
    }
}
