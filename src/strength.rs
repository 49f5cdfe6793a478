use crate::catalog::Catalog;
use crate::engine::{EngineError, ErrorCode};
use itertools::{Itertools, MinMaxResult};

/// Linear rescaling of raw predicted strengths into [0,100], relative to the
/// raw minimum and maximum observed across the whole catalog. The bounds are
/// recomputed for every invocation and never cached.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrengthScale {
    min: f64,
    max: f64,
}

impl StrengthScale {
    /// Returns `None` for an empty catalog (nothing to rescale). A non-empty
    /// catalog whose raw strengths are all equal has no defined scale and
    /// fails instead of dividing by zero.
    pub fn from_catalog(catalog: &Catalog) -> Result<Option<Self>, EngineError> {
        match catalog
            .records()
            .iter()
            .map(|r| r.predicted_strength)
            .minmax()
        {
            MinMaxResult::NoElements => Ok(None),
            MinMaxResult::OneElement(value) => Err(Self::degenerate(value)),
            MinMaxResult::MinMax(min, max) if min == max => Err(Self::degenerate(min)),
            MinMaxResult::MinMax(min, max) => Ok(Some(Self { min, max })),
        }
    }

    #[inline(always)]
    pub fn min(&self) -> f64 {
        self.min
    }

    #[inline(always)]
    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn normalize(&self, raw: f64) -> f64 {
        round2((raw - self.min) / (self.max - self.min) * 100.0)
    }

    fn degenerate(value: f64) -> EngineError {
        EngineError {
            code: ErrorCode::DegenerateScale,
            message: format!(
                "All predicted strengths in the catalog equal {value}; strength scale is undefined"
            ),
        }
    }
}

#[inline(always)]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
