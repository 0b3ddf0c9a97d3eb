//! Written type annotations as they appear in source.

use crate::infrastructure::Spanned;

/// A type as spelled in the source, prior to resolution.
///
/// The analyzer resolves these against the type registry; unknown names
/// surface as `UndeclaredType` diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeName {
    /// A bare name: a primitive (`i32`, `string`, ...) or a nominal type.
    Plain(String),
    /// `&T` / `&mut T`
    Reference {
        inner: Box<Spanned<TypeName>>,
        mutable: bool,
    },
    /// `T[n]` (fixed size) or `T[]` (dynamic)
    Array {
        element: Box<Spanned<TypeName>>,
        size: Option<u64>,
    },
}

impl std::fmt::Display for TypeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeName::Plain(name) => write!(f, "{}", name),
            TypeName::Reference { inner, mutable } => {
                if *mutable {
                    write!(f, "&mut {}", inner.node)
                } else {
                    write!(f, "&{}", inner.node)
                }
            }
            TypeName::Array { element, size } => match size {
                Some(n) => write!(f, "{}[{}]", element.node, n),
                None => write!(f, "{}[]", element.node),
            },
        }
    }
}
