//! # PoIES Scoring
//!
//! A block's score is `S = −ln(u) + ψ_total`: an exponential lottery variate
//! plus the bounded sum of useful-work contributions. Bounds are layered —
//! per-kind caps, then the diversity escort, then the global Γ — so no proof
//! mix can dominate the lottery term.
//!
//! The block is accepted when `S ≥ Θ`; ties accept. `ψ_total = 0` degrades
//! to a pure hash lottery.

use crate::registry::{ProofRegistry, RawContribution};
use serde::{Deserialize, Serialize};
use shared_types::{Fixed, ProofKind};
use std::collections::BTreeMap;

/// Block-level scoring parameters, pinned by the policy roots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    /// Global cap Γ on ψ_total.
    pub gamma: Fixed,
    /// Distinct contributing kinds required for the escort (K).
    pub escort_threshold: usize,
    /// Escort bonus q, small relative to Γ.
    pub escort_bonus: Fixed,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            gamma: Fixed::from_ratio(3, 2),
            escort_threshold: 2,
            escort_bonus: Fixed::from_ratio(1, 10),
        }
    }
}

/// The full accounting of one block's score.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoreBreakdown {
    /// Capped ψ per contributing kind, in kind order.
    pub psi_by_kind: BTreeMap<ProofKind, Fixed>,
    /// Escort applied (zero or the policy bonus).
    pub escort: Fixed,
    /// min(Σ capped + escort, Γ).
    pub psi_total: Fixed,
    /// The lottery variate −ln(u).
    pub draw: Fixed,
    /// −ln(u) + ψ_total.
    pub s_value: Fixed,
    /// Θ the score was compared against.
    pub theta: Fixed,
    /// `s_value ≥ theta`.
    pub accepted: bool,
}

impl ScoreBreakdown {
    /// Fork-choice weight of the block: `s_value − Θ`, non-negative for any
    /// accepted block.
    pub fn weight(&self) -> Fixed {
        self.s_value.sub(self.theta)
    }
}

/// Score a verified bag against Θ.
///
/// `draw` is the already-derived lottery variate; callers obtain it from
/// [`crate::lottery::draw`] so the digest→u mapping stays in one place.
pub fn score_block(
    registry: &ProofRegistry,
    policy: &ScoringPolicy,
    contributions: &[RawContribution],
    draw: Fixed,
    theta: Fixed,
) -> ScoreBreakdown {
    // Group raw ψ by kind. BTreeMap keeps the fold in kind order, so the
    // sum is independent of envelope order.
    let mut raw_by_kind: BTreeMap<ProofKind, Fixed> = BTreeMap::new();
    for contribution in contributions {
        let entry = raw_by_kind
            .entry(contribution.kind)
            .or_insert(Fixed::ZERO);
        *entry = entry.add(contribution.psi_raw);
    }

    // Per-kind caps.
    let mut psi_by_kind: BTreeMap<ProofKind, Fixed> = BTreeMap::new();
    let mut capped_sum = Fixed::ZERO;
    for (kind, raw) in raw_by_kind {
        let cap = registry
            .descriptor(kind)
            .map(|d| d.cap)
            .unwrap_or(Fixed::ZERO);
        let capped = raw.min(cap);
        capped_sum = capped_sum.add(capped);
        psi_by_kind.insert(kind, capped);
    }

    // Diversity escort.
    let contributing_kinds = psi_by_kind.values().filter(|psi| !psi.is_zero()).count();
    let escort = if contributing_kinds >= policy.escort_threshold {
        policy.escort_bonus
    } else {
        Fixed::ZERO
    };

    // Global Γ.
    let psi_total = capped_sum.add(escort).min(policy.gamma);

    let s_value = draw.add(psi_total);
    ScoreBreakdown {
        psi_by_kind,
        escort,
        psi_total,
        draw,
        s_value,
        theta,
        accepted: s_value >= theta,
    }
}
