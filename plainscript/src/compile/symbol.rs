use super::Type;
use crate::{
    parsing::{LitValue, NodeId},
    tokens::Span,
};
use smol_str::SmolStr;
use std::{
    collections::{BTreeMap, HashMap},
    fmt,
};

/// Index of a symbol in the [`SymbolTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolId(pub u32);

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub id: SymbolId,
    pub name: SmolStr,
    pub kind: SymbolKind,
    pub ty: Type,
    /// Symbol can be the target of an assignment.
    pub mutable: bool,
    /// Declaring node. Builtins have no declaration.
    pub decl: Option<NodeId>,
    pub span: Span,
    /// Compile time value of a constant with a constant initializer.
    pub value: Option<LitValue>,
    /// Declared while a symbol with the same name was visible
    /// from an enclosing scope.
    pub shadows: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// Variables can change value during runtime.
    Variable,
    /// Constants can't be reassigned.
    Constant,
    Parameter,
    Function,
    Builtin(Builtin),
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SymbolKind::Variable => write!(f, "variable"),
            SymbolKind::Constant => write!(f, "constant"),
            SymbolKind::Parameter => write!(f, "parameter"),
            SymbolKind::Function => write!(f, "function"),
            SymbolKind::Builtin(_) => write!(f, "builtin"),
        }
    }
}

/// Functions provided by the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    /// Length of an array or a string.
    Len,
    Sqrt,
    Abs,
}

impl Builtin {
    pub const ALL: [Builtin; 3] = [Builtin::Len, Builtin::Sqrt, Builtin::Abs];

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Len => "len",
            Builtin::Sqrt => "sqrt",
            Builtin::Abs => "abs",
        }
    }

    /// Function type of the builtin.
    ///
    /// The parameter of `len` is checked separately, since
    /// it accepts both arrays and strings.
    pub fn signature(self) -> Type {
        let param = match self {
            Builtin::Len => Type::Any,
            Builtin::Sqrt | Builtin::Abs => Type::Num,
        };
        Type::Func {
            params: vec![param],
            ret: Box::new(Type::Num),
        }
    }
}

/// Every symbol declared in a program, indexed by [`SymbolId`].
#[derive(Debug, Default, Clone)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a symbol to the table, assigning it a new identity.
    pub fn add_symbol(&mut self, mut symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        symbol.id = id;
        self.symbols.push(symbol);
        id
    }

    #[inline]
    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.0 as usize)
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Lexical scope mapping names to symbols.
///
/// Only exists while the analyzer walks the tree.
#[derive(Debug, Default)]
pub struct Scope {
    names: BTreeMap<SmolStr, SymbolId>,
}

impl Scope {
    #[inline]
    pub fn add_symbol(&mut self, name: SmolStr, id: SymbolId) {
        self.names.insert(name, id);
    }

    #[inline]
    pub fn get_symbol(&self, name: &str) -> Option<SymbolId> {
        self.names.get(name).copied()
    }

    #[inline]
    pub fn contains_symbol(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }
}

/// Semantic side table, keyed by syntax tree node identity.
#[derive(Debug, Default, Clone)]
pub struct Decorations {
    types: HashMap<NodeId, Type>,
    bindings: HashMap<NodeId, SymbolId>,
    constants: HashMap<NodeId, LitValue>,
}

impl Decorations {
    /// Tag a node with its type.
    ///
    /// # Panics
    ///
    /// When the node was already tagged with a different type.
    pub fn set_type(&mut self, node: NodeId, ty: Type) {
        let existing = self.types.entry(node).or_insert_with(|| ty.clone());
        assert_eq!(*existing, ty, "contradicting type decoration on node {}", node);
    }

    pub fn set_binding(&mut self, node: NodeId, symbol: SymbolId) {
        let existing = *self.bindings.entry(node).or_insert(symbol);
        assert_eq!(existing, symbol, "contradicting binding on node {}", node);
    }

    pub fn set_constant(&mut self, node: NodeId, value: LitValue) {
        self.constants.insert(node, value);
    }

    #[inline]
    pub fn type_of(&self, node: NodeId) -> Option<&Type> {
        self.types.get(&node)
    }

    #[inline]
    pub fn binding(&self, node: NodeId) -> Option<SymbolId> {
        self.bindings.get(&node).copied()
    }

    #[inline]
    pub fn constant(&self, node: NodeId) -> Option<&LitValue> {
        self.constants.get(&node)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn variable(name: &str) -> Symbol {
        Symbol {
            id: SymbolId(0),
            name: name.into(),
            kind: SymbolKind::Variable,
            ty: Type::Num,
            mutable: true,
            decl: None,
            span: Span::default(),
            value: None,
            shadows: false,
        }
    }

    #[test]
    fn test_symbol_ids() {
        let mut table = SymbolTable::new();
        let a = table.add_symbol(variable("a"));
        let b = table.add_symbol(variable("b"));

        assert_eq!(a, SymbolId(0));
        assert_eq!(b, SymbolId(1));
        assert_eq!(table.get(b).map(|s| s.name.as_str()), Some("b"));
        assert_eq!(table.get(b).map(|s| s.id), Some(b));
    }

    #[test]
    #[should_panic]
    fn test_contradicting_type() {
        let mut decorations = Decorations::default();
        decorations.set_type(NodeId(3), Type::Num);
        decorations.set_type(NodeId(3), Type::Num);
        decorations.set_type(NodeId(3), Type::Str);
    }
}
