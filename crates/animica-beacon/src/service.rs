//! # Beacon Service
//!
//! Drives rounds forward as block heights advance. All mutation happens on
//! the consensus thread at block-apply time: commit/reveal transactions are
//! validated by the execution collaborator and delivered here, and
//! `on_height` is called once per applied block, so every node walks the
//! same phase transitions in the same order.

use crate::domain::{genesis_output, BeaconRound, RoundPhase, RoundSchedule};
use crate::error::{BeaconError, BeaconResult};
use crate::events::RoundFinalizedEvent;
use crate::metrics;
use parking_lot::RwLock;
use shared_crypto::vdf_verify;
use shared_types::{Address, Hash};
use std::collections::BTreeMap;
use std::time::Instant;

/// Beacon parameters pinned at genesis.
#[derive(Clone, Copy, Debug)]
pub struct BeaconConfig {
    pub schedule: RoundSchedule,
    /// Wall-clock budget for verifying one VDF solution.
    pub vdf_budget_ms: u64,
    /// Finalized rounds older than this many heights are pruned.
    pub retention_heights: u64,
}

impl Default for BeaconConfig {
    fn default() -> Self {
        Self {
            schedule: RoundSchedule::default(),
            vdf_budget_ms: 2_000,
            retention_heights: 4_096,
        }
    }
}

/// A finalized round's consumable view, handed to the block validator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FinalizedRound {
    pub round_id: u64,
    pub output: Hash,
    pub fallback: bool,
    pub finalized_at: u64,
    /// Last height whose headers may reference this round.
    pub validity_end: u64,
}

/// The per-node beacon cursor.
pub struct BeaconService {
    config: BeaconConfig,
    rounds: RwLock<BTreeMap<u64, BeaconRound>>,
    /// Next round id to open once the current one finalizes.
    next_round: RwLock<u64>,
}

impl BeaconService {
    /// Start the beacon at genesis: round 0 is born finalized with a
    /// chain-seeded output, and round 1 opens immediately, so headers always
    /// have a finalized round to reference.
    pub fn new(config: BeaconConfig, chain_seed: &Hash) -> Self {
        let output = genesis_output(chain_seed);
        let mut rounds = BTreeMap::new();
        rounds.insert(0, BeaconRound::genesis(config.schedule, output));
        rounds.insert(1, BeaconRound::open(1, 0, config.schedule, output));
        Self {
            config,
            rounds: RwLock::new(rounds),
            next_round: RwLock::new(2),
        }
    }

    /// Deliver a commit transaction applied at `height`.
    pub fn submit_commit(
        &self,
        height: u64,
        round_id: u64,
        participant: Address,
        commitment: Hash,
    ) -> BeaconResult<()> {
        let mut rounds = self.rounds.write();
        let round = rounds
            .get_mut(&round_id)
            .ok_or(BeaconError::UnknownRound(round_id))?;
        round.apply_commit(height, participant, commitment)?;
        metrics::record_commit();
        Ok(())
    }

    /// Deliver a reveal transaction applied at `height`.
    pub fn submit_reveal(
        &self,
        height: u64,
        round_id: u64,
        participant: Address,
        preimage: Vec<u8>,
    ) -> BeaconResult<()> {
        let mut rounds = self.rounds.write();
        let round = rounds
            .get_mut(&round_id)
            .ok_or(BeaconError::UnknownRound(round_id))?;
        round.apply_reveal(height, participant, preimage)?;
        metrics::record_reveal();
        Ok(())
    }

    /// Deliver a claimed VDF output for a pending round.
    ///
    /// Verification recomputes the chain; the wall-clock budget is checked
    /// after the bounded recompute so a hostile claim cannot stall the
    /// consensus thread past the iteration ceiling anyway.
    pub fn submit_vdf_solution(
        &self,
        height: u64,
        round_id: u64,
        claimed: Hash,
    ) -> BeaconResult<RoundFinalizedEvent> {
        let mut rounds = self.rounds.write();
        let round = rounds
            .get_mut(&round_id)
            .ok_or(BeaconError::UnknownRound(round_id))?;
        let seed = round.vdf_seed().ok_or(BeaconError::WrongPhase {
            round: round_id,
            phase: round.phase.label(),
            expected: "vdf_pending",
        })?;
        let started = Instant::now();
        let iterations = round.schedule.vdf_iterations;
        let valid = vdf_verify(&seed, iterations, &claimed, iterations);
        let elapsed_ms = started.elapsed().as_millis() as u64;
        metrics::observe_vdf_verify_seconds(elapsed_ms as f64 / 1_000.0);
        if elapsed_ms > self.config.vdf_budget_ms {
            tracing::warn!(round_id, elapsed_ms, "vdf verification exceeded budget");
            return Err(BeaconError::VdfTimeout {
                round: round_id,
                budget_ms: self.config.vdf_budget_ms,
            });
        }
        if !valid {
            return Err(BeaconError::BadVdfProof(round_id));
        }
        let output = round.finalize_with_vdf(height, claimed)?;
        metrics::record_round_finalized(false);
        tracing::info!(round_id, height, "beacon round finalized via vdf");
        Ok(RoundFinalizedEvent {
            round_id,
            output,
            fallback: false,
            height,
        })
    }

    /// Advance every open round to `height`; called once per applied block.
    ///
    /// Returns the finalization events this step produced (at most one per
    /// round). Opens the successor round whenever a round finalizes, seeded
    /// with the fresh output.
    pub fn on_height(&self, height: u64) -> Vec<RoundFinalizedEvent> {
        let mut events = Vec::new();
        let mut successors = Vec::new();
        {
            let mut rounds = self.rounds.write();
            for round in rounds.values_mut() {
                if round.phase == RoundPhase::Commit && height > round.commit_close() {
                    round.close_commits().expect("phase checked");
                }
                if round.phase == RoundPhase::Reveal && height > round.reveal_close() {
                    let pending = round.close_reveals(height).expect("phase checked");
                    if !pending {
                        metrics::record_round_finalized(true);
                        tracing::warn!(
                            round_id = round.round_id,
                            reveals = round.reveal_count(),
                            "beacon round fell back: insufficient reveals"
                        );
                        events.push(finalized_event(round, height));
                    }
                }
                if round.phase == RoundPhase::VdfPending && height > round.vdf_deadline() {
                    round.fail_and_fall_back(height).expect("phase checked");
                    metrics::record_round_failed();
                    metrics::record_round_finalized(true);
                    tracing::warn!(
                        round_id = round.round_id,
                        "beacon round fell back: vdf deadline passed"
                    );
                    events.push(finalized_event(round, height));
                }
            }
            for event in &events {
                successors.push((event.round_id, event.output));
            }
        }
        for (finalized_id, output) in successors {
            self.open_successor(finalized_id, height, output);
        }
        self.prune(height);
        events
    }

    /// Register an externally observed finalization (the VDF path) and open
    /// the next round. `submit_vdf_solution` callers invoke this with the
    /// event they received.
    pub fn open_successor(&self, finalized_id: u64, height: u64, output: Hash) {
        let mut rounds = self.rounds.write();
        let mut next = self.next_round.write();
        if finalized_id + 1 == *next {
            rounds.insert(
                *next,
                BeaconRound::open(*next, height, self.config.schedule, output),
            );
            *next += 1;
        }
    }

    /// The consumable view of a round, if it has finalized.
    pub fn finalized(&self, round_id: u64) -> Option<FinalizedRound> {
        let rounds = self.rounds.read();
        let round = rounds.get(&round_id)?;
        match round.phase {
            RoundPhase::Finalized { fallback } => Some(FinalizedRound {
                round_id,
                output: round.output().expect("finalized rounds have outputs"),
                fallback,
                finalized_at: round.finalized_at().expect("finalized rounds have heights"),
                validity_end: round.validity_end().expect("finalized rounds have windows"),
            }),
            _ => None,
        }
    }

    /// Phase of a round, if known.
    pub fn phase(&self, round_id: u64) -> Option<RoundPhase> {
        self.rounds.read().get(&round_id).map(|r| r.phase)
    }

    /// Drop finalized rounds whose validity windows ended long ago.
    fn prune(&self, height: u64) {
        let mut rounds = self.rounds.write();
        rounds.retain(|_, round| match round.validity_end() {
            Some(end) => end + self.config.retention_heights >= height,
            None => true,
        });
    }
}

fn finalized_event(round: &BeaconRound, height: u64) -> RoundFinalizedEvent {
    RoundFinalizedEvent {
        round_id: round.round_id,
        output: round.output().expect("finalized rounds have outputs"),
        fallback: true,
        height,
    }
}
