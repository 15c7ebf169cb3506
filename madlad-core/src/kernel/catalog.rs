//! The closed operator catalog.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Version of the catalog semantics. Certificates record it and replay
/// refuses certificates produced by another version.
pub const CATALOG_VERSION: u32 = 1;

/// Structural class of an operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    Construction,
    Reduction,
    Scoring,
    Iteration,
    Duality,
}

impl Family {
    pub fn as_str(&self) -> &'static str {
        match self {
            Family::Construction => "construction",
            Family::Reduction => "reduction",
            Family::Scoring => "scoring",
            Family::Iteration => "iteration",
            Family::Duality => "duality",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! catalog {
    ($( $id:literal => $variant:ident, $name:literal, $family:ident, $arity:literal; )*) => {
        /// One of the forty catalog operators
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        #[repr(u8)]
        pub enum Operator {
            $( $variant = $id, )*
        }

        impl Operator {
            /// Every operator, ordered by id
            pub const ALL: [Operator; 40] = [$( Operator::$variant, )*];

            pub fn id(self) -> u8 {
                self as u8
            }

            pub fn name(self) -> &'static str {
                match self {
                    $( Operator::$variant => $name, )*
                }
            }

            pub fn family(self) -> Family {
                match self {
                    $( Operator::$variant => Family::$family, )*
                }
            }

            /// Number of arguments after the subject configuration
            pub fn arity(self) -> usize {
                match self {
                    $( Operator::$variant => $arity, )*
                }
            }

            pub fn from_id(id: u32) -> Option<Operator> {
                match id {
                    $( $id => Some(Operator::$variant), )*
                    _ => None,
                }
            }

            pub fn from_name(name: &str) -> Option<Operator> {
                match name {
                    $( $name => Some(Operator::$variant), )*
                    _ => None,
                }
            }
        }
    };
}

catalog! {
    1 => ConstructEmpty, "construct_empty", Construction, 0;
    2 => Wrap, "wrap", Construction, 0;
    3 => Unwrap, "unwrap", Construction, 0;
    4 => Singleton, "singleton", Construction, 0;
    5 => Pair, "pair", Construction, 1;
    6 => Append, "append", Construction, 1;
    7 => Concat, "concat", Construction, 1;
    8 => Nest, "nest", Construction, 1;

    9 => Reduce, "reduce", Reduction, 0;
    10 => Dedup, "dedup", Reduction, 0;
    11 => Sort, "sort", Reduction, 0;
    12 => Flatten, "flatten", Reduction, 0;
    13 => Collapse, "collapse", Reduction, 0;
    14 => Prune, "prune", Reduction, 0;
    15 => Magnitude, "magnitude", Reduction, 0;
    16 => Signum, "signum", Reduction, 0;

    17 => Cost, "cost", Scoring, 0;
    18 => Depth, "depth", Scoring, 0;
    19 => Weight, "weight", Scoring, 0;
    20 => Size, "size", Scoring, 0;
    21 => SelectMin, "select_min", Scoring, 0;
    22 => SelectMax, "select_max", Scoring, 0;
    23 => SelectShallowest, "select_shallowest", Scoring, 0;
    24 => SelectHeaviest, "select_heaviest", Scoring, 0;

    25 => Peel, "peel", Iteration, 0;
    26 => Decrement, "decrement", Iteration, 0;
    27 => Halve, "halve", Iteration, 0;
    28 => DropLast, "drop_last", Iteration, 0;
    29 => Collatz, "collatz", Iteration, 0;
    30 => Smooth, "smooth", Iteration, 0;
    31 => Rotate, "rotate", Iteration, 0;
    32 => Bubble, "bubble", Iteration, 0;

    33 => Dual, "dual", Duality, 0;
    34 => Negate, "negate", Duality, 0;
    35 => Complement, "complement", Duality, 0;
    36 => Mirror, "mirror", Duality, 0;
    37 => Transpose, "transpose", Duality, 0;
    38 => SwapPair, "swap_pair", Duality, 0;
    39 => ReverseSymbol, "reverse_symbol", Duality, 0;
    40 => SwapHalves, "swap_halves", Duality, 0;
}

impl Operator {
    /// Selection operators pick one candidate out of a sequence
    pub fn is_selector(self) -> bool {
        matches!(
            self,
            Operator::SelectMin
                | Operator::SelectMax
                | Operator::SelectShallowest
                | Operator::SelectHeaviest
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
