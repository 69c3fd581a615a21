//! Static types of the language.
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Num,
    Str,
    Bool,
    Array(Box<Type>),
    Func { params: Vec<Type>, ret: Box<Type> },
    /// Result of functions that don't return a value.
    Void,
    /// Dynamic type, compatible with every other type.
    Any,
}

impl Type {
    /// Resolve a type name used in an annotation.
    pub fn from_name(name: &str) -> Option<Type> {
        match name {
            "num" => Some(Type::Num),
            "str" => Some(Type::Str),
            "bool" => Some(Type::Bool),
            "any" => Some(Type::Any),
            "void" => Some(Type::Void),
            _ => None,
        }
    }

    /// Indicates whether a value of type `other` may be used where
    /// a value of this type is expected.
    ///
    /// The relation is symmetric: `any` is compatible in both directions.
    pub fn accepts(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Any, _) | (_, Type::Any) => true,
            (Type::Array(a), Type::Array(b)) => a.accepts(b),
            (
                Type::Func { params, ret },
                Type::Func {
                    params: other_params,
                    ret: other_ret,
                },
            ) => {
                params.len() == other_params.len()
                    && params.iter().zip(other_params).all(|(a, b)| a.accepts(b))
                    && ret.accepts(other_ret)
            }
            (a, b) => a == b,
        }
    }

    /// Type is a number, or could be one at runtime.
    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Num | Type::Any)
    }

    #[inline]
    pub fn is_boolean(&self) -> bool {
        matches!(self, Type::Bool | Type::Any)
    }

    #[inline]
    pub fn is_string(&self) -> bool {
        matches!(self, Type::Str | Type::Any)
    }

    /// Type of the elements produced by indexing a value of this type.
    pub fn element(&self) -> Option<Type> {
        match self {
            Type::Array(element) => Some(element.as_ref().clone()),
            Type::Str => Some(Type::Str),
            Type::Any => Some(Type::Any),
            _ => None,
        }
    }

    /// When both types are compatible, the more specific of the two.
    pub fn unify(&self, other: &Type) -> Option<Type> {
        match (self, other) {
            (Type::Any, ty) | (ty, Type::Any) => Some(ty.clone()),
            (Type::Array(a), Type::Array(b)) => a.unify(b).map(|ty| Type::Array(Box::new(ty))),
            (a, b) if a.accepts(b) => Some(a.clone()),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Type::Num => write!(f, "num"),
            Type::Str => write!(f, "str"),
            Type::Bool => write!(f, "bool"),
            Type::Array(element) => write!(f, "[{}]", element),
            Type::Func { params, ret } => {
                write!(f, "fn(")?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", param)?;
                }
                write!(f, ") -> {}", ret)
            }
            Type::Void => write!(f, "void"),
            Type::Any => write!(f, "any"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_accepts() {
        let nums = Type::Array(Box::new(Type::Num));
        let anys = Type::Array(Box::new(Type::Any));
        let strs = Type::Array(Box::new(Type::Str));

        assert!(Type::Num.accepts(&Type::Num));
        assert!(Type::Num.accepts(&Type::Any));
        assert!(Type::Any.accepts(&Type::Bool));
        assert!(!Type::Num.accepts(&Type::Str));
        assert!(nums.accepts(&anys));
        assert!(!nums.accepts(&strs));
        assert!(!Type::Void.accepts(&Type::Num));
    }

    #[test]
    fn test_unify() {
        let anys = Type::Array(Box::new(Type::Any));
        let nums = Type::Array(Box::new(Type::Num));

        assert_eq!(anys.unify(&nums), Some(nums.clone()));
        assert_eq!(Type::Any.unify(&Type::Str), Some(Type::Str));
        assert_eq!(Type::Num.unify(&Type::Bool), None);
    }

    #[test]
    fn test_display() {
        let ty = Type::Func {
            params: vec![Type::Array(Box::new(Type::Num)), Type::Str],
            ret: Box::new(Type::Void),
        };
        assert_eq!(ty.to_string(), "fn([num], str) -> void");
    }
}
