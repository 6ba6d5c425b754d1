//! End-to-end admission scenarios.
//!
//! Each test drives the public consensus API over the in-memory adapters:
//! the same path a block takes from P2P ingress to canonical acceptance.

#[cfg(test)]
mod tests {
    use crate::support::{ai_envelope, ai_nullifier, Harness};
    use animica_consensus::{ConsensusApi, ConsensusError};
    use animica_poies::{score_block, ProofRegistry, RawContribution, ScoringPolicy};
    use shared_types::{Fixed, ProofKind};

    fn contribution(kind: ProofKind, num: i64, den: i64, tag: u8) -> RawContribution {
        RawContribution {
            kind,
            psi_raw: Fixed::from_ratio(num, den),
            nullifier: [tag; 32],
        }
    }

    /// Scenario: pure hash block. Γ = 1.0, one HashShare with ψ = 0.8,
    /// draw = 0.5, Θ = 1.2. Expect S = 1.3, accepted.
    #[test]
    fn test_scenario_pure_hash_block() {
        let registry = ProofRegistry::mainnet_default();
        let policy = ScoringPolicy {
            gamma: Fixed::from_int(1),
            escort_threshold: 2,
            escort_bonus: Fixed::from_ratio(1, 10),
        };
        let breakdown = score_block(
            &registry,
            &policy,
            &[contribution(ProofKind::HashShare, 4, 5, 1)],
            Fixed::from_ratio(1, 2),
            Fixed::from_ratio(6, 5),
        );
        assert_eq!(breakdown.s_value, Fixed::from_ratio(13, 10));
        assert!(breakdown.accepted);
    }

    /// Scenario: diversity escort. HashShare 0.3 + AI 0.3 at K = 2,
    /// q = 0.1. Expect ψ_total = 0.7.
    #[test]
    fn test_scenario_diversity_escort() {
        let registry = ProofRegistry::mainnet_default();
        let policy = ScoringPolicy {
            gamma: Fixed::from_ratio(3, 2),
            escort_threshold: 2,
            escort_bonus: Fixed::from_ratio(1, 10),
        };
        let breakdown = score_block(
            &registry,
            &policy,
            &[
                contribution(ProofKind::HashShare, 3, 10, 1),
                contribution(ProofKind::Ai, 3, 10, 2),
            ],
            Fixed::ZERO,
            Fixed::from_int(1),
        );
        // Composed from the same Q64.64 terms the scorer adds; a directly
        // rounded 0.7 differs in the last bit.
        let expected = Fixed::from_ratio(3, 10)
            .add(Fixed::from_ratio(3, 10))
            .add(Fixed::from_ratio(1, 10));
        assert_eq!(breakdown.psi_total, expected);
    }

    /// Scenario: cap truncation. AI ψ_raw = 2.0 against cap 0.5.
    #[test]
    fn test_scenario_cap_truncation() {
        let registry = ProofRegistry::mainnet_default();
        let breakdown = score_block(
            &registry,
            &ScoringPolicy::default(),
            &[contribution(ProofKind::Ai, 2, 1, 1)],
            Fixed::ZERO,
            Fixed::from_int(1),
        );
        assert_eq!(
            breakdown.psi_by_kind[&ProofKind::Ai],
            Fixed::from_ratio(1, 2)
        );
    }

    /// Scenario: nullifier reuse. A proof accepted at height 100-analog is
    /// replayed one block later and the whole block is rejected.
    #[tokio::test]
    async fn test_scenario_nullifier_reuse_rejection() {
        let h = Harness::new();
        let b1 = h.build_block(&h.genesis, vec![ai_envelope(7)], 1);
        h.accept(b1.clone()).await;

        let b2 = h.build_block(&b1.header, vec![ai_envelope(7)], 2);
        match h.service.validate_block(b2).await {
            Err(ConsensusError::NullifierReuse(n)) => assert_eq!(n, ai_nullifier(7)),
            other => panic!("expected NullifierReuse, got {other:?}"),
        }
        // The replayed block left no trace.
        assert_eq!(h.store.nullifier_count(), 1);
        assert_eq!(h.service.chain_head().await.height, 1);
    }

    /// Scenario: retarget up. target 12s, EMA pinned at 24s, clamp 4,
    /// α = 1/8: the boundary scales Θ by exactly 2, bit-for-bit.
    #[test]
    fn test_scenario_retarget_doubles() {
        use animica_consensus::{RetargetParams, ThetaState};
        let params = RetargetParams::default();
        let state = ThetaState {
            theta: Fixed::from_int(1),
            ema_gap: Fixed::from_int(24),
            last_retarget_height: 0,
        };
        let next = state.advance(&params, params.window, 24);
        assert_eq!(next.theta.to_bits(), Fixed::from_int(2).to_bits());
    }

    /// Scenario: reorg within bound. A depth-2 switch must hand execution
    /// the exact rewind path and mirror nullifiers atomically.
    #[tokio::test]
    async fn test_scenario_reorg_replays_state() {
        let h = Harness::new();
        // Canonical: ψ 2000 per block. Competing branch: 1000+1000+3000.
        // Draw bounds (≤ 88.7 per block) make every comparison strict.
        let a1 = h.build_block(&h.genesis, vec![ai_envelope(0xA1), ai_envelope(0xA2)], 1);
        h.accept(a1.clone()).await;
        let a2 = h.build_block(&a1.header, vec![ai_envelope(0xA3), ai_envelope(0xA4)], 2);
        h.accept(a2.clone()).await;

        let b1 = h.build_block(&h.genesis, vec![ai_envelope(0xB1)], 10);
        h.accept(b1.clone()).await;
        let b2 = h.build_block(&b1.header, vec![ai_envelope(0xB2)], 11);
        h.accept(b2.clone()).await;
        let b3 = h.build_block(
            &b2.header,
            vec![ai_envelope(0xB3), ai_envelope(0xB4), ai_envelope(0xB5)],
            12,
        );
        let r3 = h.accept(b3.clone()).await;
        assert!(r3.head_changed);
        assert_eq!(r3.reorg_depth, 2);

        let canonical = h.execution.canonical();
        let (head, delta) = canonical.last().unwrap();
        assert_eq!(head.block_hash, b3.hash());
        assert_eq!(delta.removed, vec![a2.hash(), a1.hash()]);
        assert_eq!(delta.added, vec![b1.hash(), b2.hash(), b3.hash()]);

        for tag in [0xA1, 0xA2, 0xA3, 0xA4] {
            assert!(
                !h.store.nullifier_present_sync(&ai_nullifier(tag)),
                "rewound nullifier {tag:#x} must be gone"
            );
        }
        for tag in [0xB1, 0xB2, 0xB3, 0xB4, 0xB5] {
            assert!(
                h.store.nullifier_present_sync(&ai_nullifier(tag)),
                "applied nullifier {tag:#x} must be active"
            );
        }
    }

    /// A block referencing a round that has not finalized is rejected.
    #[tokio::test]
    async fn test_beacon_round_lifecycle_gates_admission() {
        let h = Harness::new();
        let mut block = h.build_block(&h.genesis, vec![], 1);
        block.header.beacon_round = 1; // round 1 is still collecting commits
        block.header.signature = *h
            .keypair
            .sign(&block.header.signing_bytes())
            .as_bytes();
        assert!(matches!(
            h.service.validate_block(block).await,
            Err(ConsensusError::BeaconNotFinalized(1))
        ));
    }

    /// Wire-level ingress: the exact bytes a peer gossips admit end to end.
    #[tokio::test]
    async fn test_wire_round_trip_admission() {
        let h = Harness::new();
        let block = h.build_block(&h.genesis, vec![ai_envelope(0x77)], 1);
        let bytes = shared_types::wire::encode_block(&block);

        // Early header admission first, as the gossip layer would do.
        let header_bytes = shared_types::wire::encode_header(&block.header);
        h.service.validate_header_bytes(&header_bytes).await.unwrap();

        match h.service.validate_block_bytes(&bytes).await.unwrap() {
            animica_consensus::BlockOutcome::Accepted(accepted) => {
                assert_eq!(accepted.hash, block.hash());
            }
            other => panic!("expected acceptance, got {other:?}"),
        }
    }
}
