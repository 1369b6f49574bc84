//! Member selector expressions and their resolution to member names.
//!
//! The [`member!`](crate::member) macro builds a [`MemberSelector`] from a
//! field access that the compiler checks against the model type. The selector
//! carries its model as a type parameter, so a configuration only accepts
//! selectors over its own model. Hand-built [`EnumMemberExpr`] trees are
//! accepted too, but only a direct member access on the selector's model,
//! optionally wrapped in conversions, resolves to a name.

use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;

use crate::spec::ConfError;

/// Selector expression over a model value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumMemberExpr {
    /// Direct member access `m.field`.
    Member {
        /// Accessed member name.
        name: String,
        /// Owning type name.
        declaring_type: Option<String>,
    },
    /// Widening conversion around another expression.
    Convert(Box<EnumMemberExpr>),
    /// Method call `m.method()`.
    Call {
        /// Called method name.
        method: String,
    },
    /// Any other computed expression, kept as source text.
    Computed(String),
}

impl EnumMemberExpr {
    /// Direct access to `name` on model type `M`.
    pub fn member<M: ?Sized>(name: &str) -> Self {
        Self::Member {
            name: name.to_string(),
            declaring_type: Some(type_name::<M>().to_string()),
        }
    }

    /// Wrap `self` in a conversion.
    pub fn convert(self) -> Self {
        Self::Convert(Box::new(self))
    }
}

impl fmt::Display for EnumMemberExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Member { name, .. } => write!(f, "m.{name}"),
            Self::Convert(inner) => write!(f, "convert({inner})"),
            Self::Call { method } => write!(f, "m.{method}()"),
            Self::Computed(src) => write!(f, "{src}"),
        }
    }
}

/// Resolve a selector to its member name.
///
/// Conversions are stripped first. Anything other than a member access is an
/// [`ConfError::InvalidSelector`]; a member access without an owning type is a
/// [`ConfError::MissingDeclaringType`].
pub fn derive_member_name(expr: &EnumMemberExpr) -> Result<&str, ConfError> {
    match strip_conversions(expr) {
        EnumMemberExpr::Member {
            name,
            declaring_type: Some(_),
        } => Ok(name),
        EnumMemberExpr::Member {
            name,
            declaring_type: None,
        } => Err(ConfError::MissingDeclaringType {
            member: name.clone(),
        }),
        other => Err(ConfError::InvalidSelector {
            expr: other.to_string(),
        }),
    }
}

fn strip_conversions(expr: &EnumMemberExpr) -> &EnumMemberExpr {
    let mut expr_current = expr;
    while let EnumMemberExpr::Convert(inner) = expr_current {
        expr_current = inner;
    }
    expr_current
}

/// Selector expression over model type `M`.
pub struct MemberSelector<M: ?Sized> {
    expr: EnumMemberExpr,
    _model: PhantomData<fn(&M)>,
}

impl<M: ?Sized> MemberSelector<M> {
    /// Direct access to `name` on `M`.
    pub fn member(name: &str) -> Self {
        Self::from_expr(EnumMemberExpr::member::<M>(name))
    }

    /// Wrap a hand-built expression tree.
    pub fn from_expr(expr: EnumMemberExpr) -> Self {
        Self {
            expr,
            _model: PhantomData,
        }
    }

    /// Wrap the expression in a conversion.
    pub fn convert(self) -> Self {
        Self::from_expr(self.expr.convert())
    }

    /// Underlying expression tree.
    pub fn expr(&self) -> &EnumMemberExpr {
        &self.expr
    }

    /// Resolve to a member name of `M`.
    ///
    /// Fails like [`derive_member_name`], and with
    /// [`ConfError::ForeignMember`] when the access is declared on another type.
    pub fn member_name(&self) -> Result<&str, ConfError> {
        let c_member = derive_member_name(&self.expr)?;
        if let EnumMemberExpr::Member {
            declaring_type: Some(c_declaring_type),
            ..
        } = strip_conversions(&self.expr)
            && c_declaring_type != type_name::<M>()
        {
            return Err(ConfError::ForeignMember {
                member: c_member.to_string(),
                declaring_type: c_declaring_type.clone(),
                model: type_name::<M>().to_string(),
            });
        }
        Ok(c_member)
    }
}

impl<M: ?Sized> Clone for MemberSelector<M> {
    fn clone(&self) -> Self {
        Self::from_expr(self.expr.clone())
    }
}

impl<M: ?Sized> fmt::Debug for MemberSelector<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberSelector")
            .field("model", &type_name::<M>())
            .field("expr", &self.expr)
            .finish()
    }
}

/// Build a selector for `$field` on `$model`, rejected at compile time when
/// the field does not exist.
///
/// ```
/// use fluentsheet_conf::member;
///
/// struct Person {
///     email: String,
/// }
///
/// let selector = member!(Person, email);
/// assert_eq!(selector.member_name().unwrap(), "email");
/// ```
#[macro_export]
macro_rules! member {
    ($model:ty, $field:ident) => {{
        let _ = |m: &$model| {
            let _ = &m.$field;
        };
        $crate::selector::MemberSelector::<$model>::member(stringify!($field))
    }};
}
