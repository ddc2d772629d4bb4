//! Distance estimates used to guide A*.
//!
//! Every heuristic is a function of the absolute axis deltas `(dx, dy)` between a node and the
//! goal. [`euclidean`] and [`chebyshev`] never overestimate Euclidean edge costs. [`octile`] is
//! exact on 8-connected grids with diagonal cost `sqrt(2)`.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub type Heuristic = fn(f32, f32) -> f32;

pub fn manhattan(x: f32, y: f32) -> f32 {
    x + y
}

pub fn euclidean(x: f32, y: f32) -> f32 {
    (x * x + y * y).sqrt()
}

/// Squared Euclidean distance. Cheap, but overestimates beyond unit distances.
pub fn sqrt_euclidean(x: f32, y: f32) -> f32 {
    x * x + y * y
}

pub fn octile(x: f32, y: f32) -> f32 {
    let f = core::f32::consts::SQRT_2 - 1.0;
    if x < y {
        f * x + y
    } else {
        f * y + x
    }
}

pub fn chebyshev(x: f32, y: f32) -> f32 {
    x.max(y)
}

/// Named heuristic, for configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum HeuristicKind {
    Manhattan,
    #[default]
    Euclidean,
    SqrtEuclidean,
    Octile,
    Chebyshev,
}

impl HeuristicKind {
    pub fn function(self) -> Heuristic {
        match self {
            HeuristicKind::Manhattan => manhattan,
            HeuristicKind::Euclidean => euclidean,
            HeuristicKind::SqrtEuclidean => sqrt_euclidean,
            HeuristicKind::Octile => octile,
            HeuristicKind::Chebyshev => chebyshev,
        }
    }
}
