//! # Θ Retarget Controller
//!
//! Difficulty follows block cadence through an EMA of observed inter-block
//! gaps, re-anchored every retarget window under clamp bands. The rule is a
//! pure fold over the ancestor chain: given the same prefix, every node
//! derives bit-identical Θ at every height, and the validator rejects any
//! header whose recorded Θ disagrees.
//!
//! All arithmetic is Q64.64 with the same rounding as the scorer.

use crate::domain::config::RetargetParams;
use serde::{Deserialize, Serialize};
use shared_types::Fixed;

/// The retarget fold state carried per accepted header.
///
/// `theta` is the target active for the *next* block; a retarget at a
/// boundary height changes the target of blocks after the boundary, never
/// the boundary block itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThetaState {
    /// Active difficulty target.
    pub theta: Fixed,
    /// Smoothed inter-block gap in seconds.
    pub ema_gap: Fixed,
    /// Height of the last retarget boundary applied.
    pub last_retarget_height: u64,
}

impl ThetaState {
    /// State at genesis: target and EMA seeded from policy.
    pub fn genesis(params: &RetargetParams) -> Self {
        Self {
            theta: params.theta_genesis,
            ema_gap: Fixed::from_int(params.target_gap_secs as i64),
            last_retarget_height: 0,
        }
    }

    /// Fold one accepted block at `height` with observed gap `gap_secs`.
    ///
    /// Clamps the gap, updates the EMA, and applies the retarget rule when
    /// `height` lands on a window boundary.
    pub fn advance(&self, params: &RetargetParams, height: u64, gap_secs: u64) -> ThetaState {
        let gap = gap_secs.clamp(1, params.max_gap_secs);
        let gap_fixed = Fixed::from_int(gap as i64);
        let one_minus_alpha = Fixed::ONE.sub(params.alpha);
        let ema_gap = params
            .alpha
            .mul(gap_fixed)
            .add(one_minus_alpha.mul(self.ema_gap));

        let mut next = ThetaState {
            theta: self.theta,
            ema_gap,
            last_retarget_height: self.last_retarget_height,
        };
        if height > 0 && height % params.window == 0 {
            next.theta = retargeted_theta(params, self.theta, ema_gap);
            next.last_retarget_height = height;
        }
        next
    }
}

/// The retarget step: Θ scaled by the clamped cadence ratio, bounded to the
/// policy band.
fn retargeted_theta(params: &RetargetParams, theta: Fixed, ema_gap: Fixed) -> Fixed {
    let target = Fixed::from_int(params.target_gap_secs as i64);
    let ratio = ema_gap
        .div(target)
        .clamp(Fixed::ONE.div(params.clamp_factor), params.clamp_factor);
    theta
        .mul(ratio)
        .clamp(params.theta_min, params.theta_max)
}
