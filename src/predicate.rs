//! Composable predicates over attribute and name values.
//!
//! Every constructor returns a reusable [`Pred`]; predicates combine with
//! `!`, `&`, and `|` (or the named `not`/`and`/`or` methods) and stay
//! predicates until the engine applies them to a concrete value.
//!
//! Application comes in two flavors. [`Pred::matches`] evaluates pointwise
//! against one value (name position). [`Pred::matches_any`] evaluates
//! against a node's whole attribute list: a leaf predicate is satisfied by
//! any attribute, and each side of a conjunction may be satisfied by a
//! different attribute, so `startswith("a") & eq(80)` matches a node whose
//! attributes are `["abc", 80]`.
//!
//! A predicate applied to a value of the wrong type evaluates to `false` for
//! that value only; one incompatible attribute never blocks a match on a
//! compatible sibling.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{BitAnd, BitOr, Not};
use std::sync::Arc;

use crate::value::Value;

enum PredKind {
    Leaf(Box<dyn Fn(&Value) -> bool + Send + Sync>),
    Not(Pred),
    And(Pred, Pred),
    Or(Pred, Pred),
}

/// A boolean-valued matcher over values, preserving its combinator
/// structure so attribute-position application can distribute over a
/// node's attributes.
#[derive(Clone)]
pub struct Pred(Arc<PredKind>);

impl Pred {
    /// Build a predicate from an arbitrary one-argument boolean function.
    pub fn from_fn(f: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Pred {
        Pred(Arc::new(PredKind::Leaf(Box::new(f))))
    }

    /// Build a predicate from a two-argument boolean function and a bound
    /// parameter, yielding a unary predicate closed over that parameter.
    pub fn binary<P>(f: impl Fn(&Value, &P) -> bool + Send + Sync + 'static, param: P) -> Pred
    where
        P: Send + Sync + 'static,
    {
        Pred::from_fn(move |v| f(v, &param))
    }

    /// Pointwise evaluation against a single value.
    pub fn matches(&self, value: &Value) -> bool {
        match &*self.0 {
            PredKind::Leaf(f) => f(value),
            PredKind::Not(p) => !p.matches(value),
            PredKind::And(a, b) => a.matches(value) && b.matches(value),
            PredKind::Or(a, b) => a.matches(value) || b.matches(value),
        }
    }

    /// Node-level evaluation against an attribute list. Leaves are
    /// existential over the attributes; `And` requires each side to hold
    /// somewhere in the list (possibly at different attributes); `Not`
    /// complements the node-level result.
    pub fn matches_any(&self, values: &[Value]) -> bool {
        match &*self.0 {
            PredKind::Leaf(f) => values.iter().any(|v| f(v)),
            PredKind::Not(p) => !p.matches_any(values),
            PredKind::And(a, b) => a.matches_any(values) && b.matches_any(values),
            PredKind::Or(a, b) => a.matches_any(values) || b.matches_any(values),
        }
    }

    pub fn not(self) -> Pred {
        Pred(Arc::new(PredKind::Not(self)))
    }

    pub fn and(self, other: Pred) -> Pred {
        Pred(Arc::new(PredKind::And(self, other)))
    }

    pub fn or(self, other: Pred) -> Pred {
        Pred(Arc::new(PredKind::Or(self, other)))
    }
}

impl fmt::Debug for Pred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0 {
            PredKind::Leaf(_) => write!(f, "Pred(..)"),
            PredKind::Not(p) => write!(f, "!{:?}", p),
            PredKind::And(a, b) => write!(f, "({:?} & {:?})", a, b),
            PredKind::Or(a, b) => write!(f, "({:?} | {:?})", a, b),
        }
    }
}

impl Not for Pred {
    type Output = Pred;

    fn not(self) -> Pred {
        Pred::not(self)
    }
}

impl BitAnd for Pred {
    type Output = Pred;

    fn bitand(self, rhs: Pred) -> Pred {
        self.and(rhs)
    }
}

impl BitOr for Pred {
    type Output = Pred;

    fn bitor(self, rhs: Pred) -> Pred {
        self.or(rhs)
    }
}

/// String values starting with `prefix`. False for non-string values.
pub fn startswith(prefix: impl Into<String>) -> Pred {
    let prefix = prefix.into();
    Pred::from_fn(move |v| matches!(v, Value::Str(s) if s.starts_with(&prefix)))
}

/// String values ending with `suffix`. False for non-string values.
pub fn endswith(suffix: impl Into<String>) -> Pred {
    let suffix = suffix.into();
    Pred::from_fn(move |v| matches!(v, Value::Str(s) if s.ends_with(&suffix)))
}

/// String values containing `needle`. False for non-string values.
pub fn contains(needle: impl Into<String>) -> Pred {
    let needle = needle.into();
    Pred::from_fn(move |v| matches!(v, Value::Str(s) if s.contains(&needle)))
}

fn ordering(param: impl Into<Value>, accept: &'static [Ordering]) -> Pred {
    let param = param.into();
    Pred::from_fn(move |v| {
        v.loose_cmp(&param)
            .map(|ord| accept.contains(&ord))
            .unwrap_or(false)
    })
}

pub fn lt(param: impl Into<Value>) -> Pred {
    ordering(param, &[Ordering::Less])
}

pub fn le(param: impl Into<Value>) -> Pred {
    ordering(param, &[Ordering::Less, Ordering::Equal])
}

pub fn gt(param: impl Into<Value>) -> Pred {
    ordering(param, &[Ordering::Greater])
}

pub fn ge(param: impl Into<Value>) -> Pred {
    ordering(param, &[Ordering::Greater, Ordering::Equal])
}

/// Loose equality: `eq(80)` matches both `80` and `80.0`.
pub fn eq(param: impl Into<Value>) -> Pred {
    let param = param.into();
    Pred::from_fn(move |v| v.loose_eq(&param))
}
