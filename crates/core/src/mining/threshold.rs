use serde::Serialize;

use crate::errors::MiningError;

/// Inclusive lower bound on a ratio, validated to lie in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Threshold(f64);

impl Threshold {
    /// Keeps everything.
    pub const ZERO: Self = Self(0.0);

    pub fn new(name: &'static str, value: f64) -> Result<Self, MiningError> {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(MiningError::InvalidThreshold { name, value })
        }
    }

    /// For the crate's default constants, which already lie in `[0, 1]`.
    pub(crate) const fn constant(value: f64) -> Self {
        Self(value)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn admits(self, ratio: f64) -> bool {
        ratio >= self.0
    }
}
