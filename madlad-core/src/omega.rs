//! The configuration value every program transforms.
//!
//! Ω is a plain recursive value: equality, ordering and hashing are all
//! structural, and nothing in the engine ever mutates one in place.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Deepest value any program may build. Every traversal of Ω recurses, so
/// values are checked against this bound wherever they are constructed.
pub const MAX_DEPTH: usize = 128;

/// A configuration value
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Omega {
    #[default]
    Empty,
    Wrap(Box<Omega>),
    Seq(Vec<Omega>),
    Scalar(Scalar),
}

/// Tagged scalar leaves
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scalar {
    Int(i64),
    Bool(bool),
    Sym(String),
}

impl Omega {
    pub fn empty() -> Self {
        Omega::Empty
    }

    pub fn int(value: i64) -> Self {
        Omega::Scalar(Scalar::Int(value))
    }

    pub fn bool(value: bool) -> Self {
        Omega::Scalar(Scalar::Bool(value))
    }

    pub fn sym(name: impl Into<String>) -> Self {
        Omega::Scalar(Scalar::Sym(name.into()))
    }

    pub fn seq(items: impl IntoIterator<Item = Omega>) -> Self {
        Omega::Seq(items.into_iter().collect())
    }

    /// Wrap `self` one level deeper
    pub fn wrap(self) -> Self {
        Omega::Wrap(Box::new(self))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Omega::Empty)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Omega::Scalar(Scalar::Int(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Omega::Scalar(Scalar::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn as_sym(&self) -> Option<&str> {
        match self {
            Omega::Scalar(Scalar::Sym(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Omega]> {
        match self {
            Omega::Seq(items) => Some(items),
            _ => None,
        }
    }

    /// Short shape name used in operand errors
    pub fn kind(&self) -> &'static str {
        match self {
            Omega::Empty => "empty",
            Omega::Wrap(_) => "wrap",
            Omega::Seq(_) => "seq",
            Omega::Scalar(Scalar::Int(_)) => "int",
            Omega::Scalar(Scalar::Bool(_)) => "bool",
            Omega::Scalar(Scalar::Sym(_)) => "sym",
        }
    }

    /// Number of non-empty nodes. `Empty` is the only zero-cost value.
    pub fn cost(&self) -> u64 {
        match self {
            Omega::Empty => 0,
            Omega::Wrap(inner) => 1 + inner.cost(),
            Omega::Seq(items) => 1 + items.iter().map(Omega::cost).sum::<u64>(),
            Omega::Scalar(_) => 1,
        }
    }

    pub fn depth(&self) -> u64 {
        match self {
            Omega::Empty => 0,
            Omega::Wrap(inner) => 1 + inner.depth(),
            Omega::Seq(items) => 1 + items.iter().map(Omega::depth).max().unwrap_or(0),
            Omega::Scalar(_) => 1,
        }
    }

    /// Reject values nested deeper than [`MAX_DEPTH`]
    pub fn check_depth(&self) -> Result<()> {
        if self.depth() > MAX_DEPTH as u64 {
            return Err(Error::LimitExceeded {
                what: "value depth",
                limit: MAX_DEPTH,
            });
        }
        Ok(())
    }

    /// Saturating sum of every integer leaf
    pub fn weight(&self) -> i64 {
        match self {
            Omega::Empty | Omega::Scalar(Scalar::Bool(_)) | Omega::Scalar(Scalar::Sym(_)) => 0,
            Omega::Scalar(Scalar::Int(n)) => *n,
            Omega::Wrap(inner) => inner.weight(),
            Omega::Seq(items) => items
                .iter()
                .fold(0i64, |acc, item| acc.saturating_add(item.weight())),
        }
    }

    pub fn size(&self) -> u64 {
        match self {
            Omega::Empty => 0,
            Omega::Seq(items) => items.len() as u64,
            _ => 1,
        }
    }

    /// Rebuild the value bottom-up, applying `f` to every integer leaf
    pub fn try_map_ints<E>(&self, f: &mut impl FnMut(i64) -> Result<i64, E>) -> Result<Omega, E> {
        Ok(match self {
            Omega::Scalar(Scalar::Int(n)) => Omega::int(f(*n)?),
            Omega::Wrap(inner) => inner.try_map_ints(f)?.wrap(),
            Omega::Seq(items) => Omega::Seq(
                items
                    .iter()
                    .map(|item| item.try_map_ints(f))
                    .collect::<Result<_, _>>()?,
            ),
            other => other.clone(),
        })
    }
}

impl From<i64> for Omega {
    fn from(value: i64) -> Self {
        Omega::int(value)
    }
}

impl From<bool> for Omega {
    fn from(value: bool) -> Self {
        Omega::bool(value)
    }
}

impl From<Vec<Omega>> for Omega {
    fn from(items: Vec<Omega>) -> Self {
        Omega::Seq(items)
    }
}

impl fmt::Display for Omega {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Omega::Empty => f.write_str("empty"),
            Omega::Wrap(inner) => write!(f, "wrap({inner})"),
            Omega::Seq(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Omega::Scalar(scalar) => write!(f, "{scalar}"),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(n) => write!(f, "{n}"),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Sym(s) => write!(f, ":{s}"),
        }
    }
}
