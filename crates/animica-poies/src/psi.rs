//! # ψ Mappings
//!
//! A ψ mapping turns a proof's raw work metric into its score contribution.
//! Mappings are policy **data**, not code: a sorted table of
//! (units, ψ) knots evaluated by linear interpolation, constant beyond the
//! last knot. Governance ships new tables; the registry root pins them.
//!
//! Monotonicity is the load-bearing property — more work never scores less —
//! and is validated when a table is constructed.

use crate::error::{PoiesError, PoiesResult};
use serde::{Deserialize, Serialize};
use shared_types::{Fixed, ProofKind, ProofMetrics};

/// One breakpoint of a piecewise-linear ψ table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PsiKnot {
    /// Raw metric value in the kind's native units.
    pub units: u64,
    /// ψ at exactly `units`, in Q64.64.
    pub psi: Fixed,
}

/// A monotone piecewise-linear map from raw units to ψ.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PsiMapping {
    knots: Vec<PsiKnot>,
}

impl PsiMapping {
    /// Build a mapping from knots sorted by `units`.
    ///
    /// Requires at least one knot, strictly increasing units and
    /// non-decreasing ψ; the first knot is the zero-point (ψ below it
    /// evaluates to the first knot's ψ scaled down linearly from zero units).
    pub fn new(kind: ProofKind, knots: Vec<PsiKnot>) -> PoiesResult<Self> {
        if knots.is_empty() {
            return Err(PoiesError::NonMonotonePsiMapping(kind));
        }
        for pair in knots.windows(2) {
            if pair[1].units <= pair[0].units || pair[1].psi < pair[0].psi {
                return Err(PoiesError::NonMonotonePsiMapping(kind));
            }
        }
        if knots[0].psi.is_negative() {
            return Err(PoiesError::NonMonotonePsiMapping(kind));
        }
        Ok(Self { knots })
    }

    /// Evaluate ψ_raw for a claimed metric.
    ///
    /// Below the first knot the segment from (0, 0) is used; between knots
    /// linear interpolation; past the last knot the table saturates.
    /// `quality_millis` scales the result (1000 = nominal), preserving
    /// monotonicity in `units` for any fixed quality.
    pub fn eval(&self, metrics: ProofMetrics) -> Fixed {
        let units = metrics.units;
        let base = self.eval_units(units);
        if metrics.quality_millis == 1_000 {
            return base;
        }
        let quality = Fixed::from_ratio(metrics.quality_millis as i64, 1_000);
        base.mul(quality)
    }

    fn eval_units(&self, units: u64) -> Fixed {
        let first = self.knots[0];
        if units <= first.units {
            if first.units == 0 {
                return first.psi;
            }
            // Segment from the implicit origin.
            return interpolate(0, Fixed::ZERO, first.units, first.psi, units);
        }
        for pair in self.knots.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            if units <= hi.units {
                return interpolate(lo.units, lo.psi, hi.units, hi.psi, units);
            }
        }
        // Saturation.
        self.knots[self.knots.len() - 1].psi
    }

    /// The saturation value of this table.
    pub fn saturation(&self) -> Fixed {
        self.knots[self.knots.len() - 1].psi
    }

    /// Knots, for registry-root hashing.
    pub fn knots(&self) -> &[PsiKnot] {
        &self.knots
    }
}

/// Linear interpolation in Q64.64 between two knots.
fn interpolate(x0: u64, y0: Fixed, x1: u64, y1: Fixed, x: u64) -> Fixed {
    debug_assert!(x0 <= x && x <= x1 && x0 < x1);
    let span = Fixed::from_int((x1 - x0) as i64);
    let offset = Fixed::from_int((x - x0) as i64);
    let rise = y1.sub(y0);
    y0.add(rise.mul(offset.div(span)))
}
