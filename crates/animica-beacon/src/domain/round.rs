//! # Beacon Round State Machine
//!
//! A round walks `Commit → Reveal → VdfPending → Finalized`, with every
//! boundary expressed in block heights so all nodes agree on the phase a
//! given submission lands in. The fallback path covers two liveness holes:
//! too few reveals at the reveal deadline, and no valid VDF solution by the
//! VDF deadline. Both finalize deterministically from the valid reveals and
//! the previous round's output.

use crate::error::{BeaconError, BeaconResult};
use serde::{Deserialize, Serialize};
use shared_crypto::{tagged_hash, Sha3Hasher};
use shared_types::{Address, Hash};
use std::collections::BTreeMap;

/// Domain tag for commitments.
pub const DOMAIN_COMMIT: &[u8] = b"animica/beacon/commit/v1";

/// Domain tag for the reveal mix.
pub const DOMAIN_MIX: &[u8] = b"animica/beacon/mix/v1";

/// Domain tag for round outputs.
pub const DOMAIN_OUTPUT: &[u8] = b"animica/beacon/output/v1";

/// Height-denominated round timing plus liveness and VDF parameters.
///
/// Pinned at genesis; every node derives identical phase boundaries from it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSchedule {
    /// Heights the commit window stays open.
    pub commit_span: u64,
    /// Heights the reveal window stays open after commits close.
    pub reveal_span: u64,
    /// Heights allowed for a VDF solution after reveals close.
    pub vdf_span: u64,
    /// Sequential iterations the round's delay function must run.
    pub vdf_iterations: u64,
    /// Reveals required to take the VDF path instead of the fallback.
    pub min_reveals: usize,
    /// Heights after finalization during which headers may consume the
    /// round's output.
    pub validity_span: u64,
}

impl Default for RoundSchedule {
    fn default() -> Self {
        Self {
            commit_span: 16,
            reveal_span: 16,
            vdf_span: 32,
            vdf_iterations: 1 << 16,
            min_reveals: 2,
            validity_span: 128,
        }
    }
}

/// Where a round is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Accepting commitments.
    Commit,
    /// Accepting preimages matching prior commitments.
    Reveal,
    /// Mix fixed; awaiting a verified delay-function solution.
    VdfPending,
    /// No valid solution arrived in time; fallback about to finalize.
    Failed,
    /// Terminal: output published. `fallback` records how it was reached.
    Finalized { fallback: bool },
}

impl RoundPhase {
    /// Short label for errors, logs and metrics.
    pub const fn label(self) -> &'static str {
        match self {
            RoundPhase::Commit => "commit",
            RoundPhase::Reveal => "reveal",
            RoundPhase::VdfPending => "vdf_pending",
            RoundPhase::Failed => "failed",
            RoundPhase::Finalized { fallback: false } => "finalized",
            RoundPhase::Finalized { fallback: true } => "finalized_fallback",
        }
    }
}

/// One beacon round.
///
/// Participants are keyed in a `BTreeMap` so the reveal mix folds in a
/// canonical bytewise order regardless of arrival order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BeaconRound {
    pub round_id: u64,
    /// Height the commit window opened.
    pub open_height: u64,
    pub schedule: RoundSchedule,
    /// Output of the previous round; seeds the fallback rule.
    pub prev_output: Hash,
    pub phase: RoundPhase,
    commits: BTreeMap<Address, Hash>,
    reveals: BTreeMap<Address, Vec<u8>>,
    /// Fixed when reveals close.
    mix: Option<Hash>,
    /// Published output; present iff finalized.
    output: Option<Hash>,
    /// Height at which the round finalized.
    finalized_at: Option<u64>,
}

impl BeaconRound {
    /// Open a round at `open_height`.
    pub fn open(round_id: u64, open_height: u64, schedule: RoundSchedule, prev_output: Hash) -> Self {
        Self {
            round_id,
            open_height,
            schedule,
            prev_output,
            phase: RoundPhase::Commit,
            commits: BTreeMap::new(),
            reveals: BTreeMap::new(),
            mix: None,
            output: None,
            finalized_at: None,
        }
    }

    /// The bootstrap round: already finalized at height 0 with a
    /// chain-seeded output, so the earliest headers have a round to consume
    /// while round 1 is still collecting commits.
    pub fn genesis(schedule: RoundSchedule, output: Hash) -> Self {
        Self {
            round_id: 0,
            open_height: 0,
            schedule,
            prev_output: output,
            phase: RoundPhase::Finalized { fallback: false },
            commits: BTreeMap::new(),
            reveals: BTreeMap::new(),
            mix: Some(output),
            output: Some(output),
            finalized_at: Some(0),
        }
    }

    /// Height after which commits are rejected.
    pub fn commit_close(&self) -> u64 {
        self.open_height + self.schedule.commit_span
    }

    /// Height after which reveals are rejected.
    pub fn reveal_close(&self) -> u64 {
        self.commit_close() + self.schedule.reveal_span
    }

    /// Height after which a pending VDF falls back.
    pub fn vdf_deadline(&self) -> u64 {
        self.reveal_close() + self.schedule.vdf_span
    }

    /// Last height whose headers may consume this round's output.
    pub fn validity_end(&self) -> Option<u64> {
        self.finalized_at
            .map(|h| h + self.schedule.validity_span)
    }

    /// The published output, if finalized.
    pub fn output(&self) -> Option<Hash> {
        self.output
    }

    /// Height at which the round finalized, if it has.
    pub fn finalized_at(&self) -> Option<u64> {
        self.finalized_at
    }

    pub fn commit_count(&self) -> usize {
        self.commits.len()
    }

    pub fn reveal_count(&self) -> usize {
        self.reveals.len()
    }

    /// Accept a commitment submitted at `height`.
    pub fn apply_commit(
        &mut self,
        height: u64,
        participant: Address,
        commitment: Hash,
    ) -> BeaconResult<()> {
        self.expect_phase(RoundPhase::Commit, "commit")?;
        if height > self.commit_close() {
            return Err(BeaconError::CommitWindowClosed {
                round: self.round_id,
                close: self.commit_close(),
                height,
            });
        }
        if self.commits.contains_key(&participant) {
            return Err(BeaconError::DuplicateCommit(participant));
        }
        self.commits.insert(participant, commitment);
        Ok(())
    }

    /// Accept a reveal submitted at `height`; the preimage must hash to the
    /// participant's commitment.
    pub fn apply_reveal(
        &mut self,
        height: u64,
        participant: Address,
        preimage: Vec<u8>,
    ) -> BeaconResult<()> {
        self.expect_phase(RoundPhase::Reveal, "reveal")?;
        if height > self.reveal_close() {
            return Err(BeaconError::RevealWindowClosed {
                round: self.round_id,
                close: self.reveal_close(),
                height,
            });
        }
        let commitment = self
            .commits
            .get(&participant)
            .ok_or(BeaconError::UnknownCommit(participant))?;
        let expected = commitment_digest(self.round_id, &participant, &preimage);
        if expected != *commitment {
            return Err(BeaconError::CommitMismatch(participant));
        }
        self.reveals.insert(participant, preimage);
        Ok(())
    }

    /// Move `Commit → Reveal` once the commit window closed.
    pub fn close_commits(&mut self) -> BeaconResult<()> {
        self.expect_phase(RoundPhase::Commit, "commit")?;
        self.phase = RoundPhase::Reveal;
        Ok(())
    }

    /// Close reveals: fix the mix and pick the VDF or fallback path.
    ///
    /// Returns `true` when the round went `VdfPending`, `false` when it
    /// finalized by fallback right away.
    pub fn close_reveals(&mut self, height: u64) -> BeaconResult<bool> {
        self.expect_phase(RoundPhase::Reveal, "reveal")?;
        self.mix = Some(self.compute_mix());
        if self.reveals.len() >= self.schedule.min_reveals {
            self.phase = RoundPhase::VdfPending;
            Ok(true)
        } else {
            self.finalize_fallback(height);
            Ok(false)
        }
    }

    /// The canonical reveal mix: participants in bytewise order.
    fn compute_mix(&self) -> Hash {
        let mut hasher = Sha3Hasher::tagged(DOMAIN_MIX);
        hasher.update(&self.round_id.to_be_bytes());
        for (participant, preimage) in &self.reveals {
            hasher.update(participant);
            hasher.update(&(preimage.len() as u32).to_be_bytes());
            hasher.update(preimage);
        }
        hasher.finalize()
    }

    /// The seed the round's delay function runs from.
    pub fn vdf_seed(&self) -> Option<Hash> {
        self.mix
    }

    /// Accept a verified delay output and finalize.
    ///
    /// The caller has already checked the chain recomputes; this only fixes
    /// the output. Split this way so the CPU-bound verification can run
    /// under a wall-clock budget outside the state machine.
    pub fn finalize_with_vdf(&mut self, height: u64, vdf_output: Hash) -> BeaconResult<Hash> {
        self.expect_phase(RoundPhase::VdfPending, "vdf_pending")?;
        let mix = self.mix.expect("mix fixed when reveals closed");
        let output = output_digest(self.round_id, false, &mix, &vdf_output);
        self.output = Some(output);
        self.finalized_at = Some(height);
        self.phase = RoundPhase::Finalized { fallback: false };
        Ok(output)
    }

    /// Mark a pending round failed at its VDF deadline, then finalize by
    /// fallback. Returns the fallback output.
    pub fn fail_and_fall_back(&mut self, height: u64) -> BeaconResult<Hash> {
        self.expect_phase(RoundPhase::VdfPending, "vdf_pending")?;
        self.phase = RoundPhase::Failed;
        self.finalize_fallback(height);
        Ok(self.output.expect("fallback published an output"))
    }

    /// Fallback rule: output from the fixed mix and the previous round's
    /// output, no delay function.
    fn finalize_fallback(&mut self, height: u64) {
        let mix = self.mix.unwrap_or_else(|| self.compute_mix());
        self.mix = Some(mix);
        let output = output_digest(self.round_id, true, &mix, &self.prev_output);
        self.output = Some(output);
        self.finalized_at = Some(height);
        self.phase = RoundPhase::Finalized { fallback: true };
    }

    fn expect_phase(&self, expected: RoundPhase, label: &'static str) -> BeaconResult<()> {
        if self.phase != expected {
            return Err(BeaconError::WrongPhase {
                round: self.round_id,
                phase: self.phase.label(),
                expected: label,
            });
        }
        Ok(())
    }
}

/// The commitment a participant publishes for a preimage.
pub fn commitment_digest(round_id: u64, participant: &Address, preimage: &[u8]) -> Hash {
    let mut hasher = Sha3Hasher::tagged(DOMAIN_COMMIT);
    hasher.update(&round_id.to_be_bytes());
    hasher.update(participant);
    hasher.update(preimage);
    hasher.finalize()
}

/// The published round output, domain-separated from every other digest and
/// carrying a fallback marker so the two finalization paths can never
/// collide.
pub fn output_digest(round_id: u64, fallback: bool, mix: &Hash, tail: &Hash) -> Hash {
    let mut hasher = Sha3Hasher::tagged(DOMAIN_OUTPUT);
    hasher.update(&round_id.to_be_bytes());
    hasher.update(&[u8::from(fallback)]);
    hasher.update(mix);
    hasher.update(tail);
    hasher.finalize()
}

/// Genesis seed standing in for the "previous output" of round zero.
pub fn genesis_output(chain_seed: &Hash) -> Hash {
    tagged_hash(DOMAIN_OUTPUT, chain_seed)
}
