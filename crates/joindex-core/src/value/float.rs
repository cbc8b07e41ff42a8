use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::{
    cmp::Ordering,
    hash::{Hash, Hasher},
};

///
/// Float64
///
/// Finite f64 only; -0.0 canonically stored as 0.0
///

#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Serialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Float64(f64);

impl Float64 {
    /// Fallible constructor that rejects non-finite values and normalizes -0.0.
    #[must_use]
    pub fn try_new(v: f64) -> Option<Self> {
        if !v.is_finite() {
            return None;
        }

        // canonicalize -0.0 to 0.0 so Eq/Hash/Ord are consistent
        Some(Self(if v == 0.0 { 0.0 } else { v }))
    }

    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl Eq for Float64 {}

impl PartialEq for Float64 {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl From<i32> for Float64 {
    fn from(n: i32) -> Self {
        Self(f64::from(n))
    }
}

impl TryFrom<f64> for Float64 {
    type Error = &'static str;

    fn try_from(v: f64) -> Result<Self, Self::Error> {
        Self::try_new(v).ok_or("non-finite float64")
    }
}

impl From<Float64> for f64 {
    fn from(x: Float64) -> Self {
        x.0
    }
}

impl Hash for Float64 {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.0.to_bits());
    }
}

impl Ord for Float64 {
    fn cmp(&self, other: &Self) -> Ordering {
        // no NaN, -0 normalized
        self.0.total_cmp(&other.0)
    }
}

impl PartialOrd for Float64 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
