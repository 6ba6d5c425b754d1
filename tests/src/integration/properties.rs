//! Cross-crate invariants: the properties every node must agree on.

#[cfg(test)]
mod tests {
    use animica_consensus::{NullifierStore, RetargetParams, ThetaState};
    use animica_poies::{
        score_block, verify_bag, ProofRegistry, RawContribution, ScoringPolicy, VerifyContext,
    };
    use shared_types::{wire, Fixed, ProofEnvelope, ProofKind, ProofMetrics};

    /// Encode(decode(header)) == header for well-formed headers, and the
    /// same for whole blocks.
    #[test]
    fn test_wire_round_trip_identity() {
        let envelope = ProofEnvelope {
            kind: ProofKind::Storage,
            payload: vec![0xAB; 32],
            producer: [3; 32],
            nullifier_input: vec![1, 2, 3],
            metrics: ProofMetrics {
                units: 4_096,
                quality_millis: 900,
            },
        };
        let block = shared_types::Block {
            header: sample_header(),
            envelopes: vec![envelope],
        };
        let header_bytes = wire::encode_header(&block.header);
        assert_eq!(wire::decode_header(&header_bytes).unwrap(), block.header);
        assert_eq!(
            wire::encode_header(&wire::decode_header(&header_bytes).unwrap()),
            header_bytes
        );
        let block_bytes = wire::encode_block(&block);
        assert_eq!(wire::decode_block(&block_bytes).unwrap(), block);
    }

    /// Applying then reverting a block on the nullifier store restores the
    /// original state exactly.
    #[test]
    fn test_nullifier_apply_revert_idempotence() {
        let mut store = NullifierStore::new();
        store.insert_block(&[[1; 32], [2; 32]], 10).unwrap();

        let before: Vec<bool> = (0u8..8).map(|t| store.contains(&[t; 32])).collect();
        store.insert_block(&[[3; 32], [4; 32], [5; 32]], 11).unwrap();
        store.remove_block(&[[3; 32], [4; 32], [5; 32]]);
        let after: Vec<bool> = (0u8..8).map(|t| store.contains(&[t; 32])).collect();

        assert_eq!(before, after);
        assert_eq!(store.len(), 2);
    }

    /// Bit-exact Θ determinism: two replays of one gap sequence, including
    /// retarget boundaries, agree on every intermediate target.
    #[test]
    fn test_theta_fold_is_bit_exact() {
        let params = RetargetParams::default();
        let gaps: Vec<u64> = (1..=300).map(|i| 3 + (i * 31) % 40).collect();
        let fold = || -> Vec<i128> {
            let mut state = ThetaState::genesis(&params);
            let mut history = Vec::new();
            for (i, gap) in gaps.iter().enumerate() {
                state = state.advance(&params, (i + 1) as u64, *gap);
                history.push(state.theta.to_bits());
            }
            history
        };
        assert_eq!(fold(), fold());
    }

    /// Raising any envelope's raw metric never lowers ψ_total or S.
    #[test]
    fn test_scoring_monotonicity_over_metrics() {
        let registry = ProofRegistry::mainnet_default();
        let policy = ScoringPolicy::default();
        let draw = Fixed::from_ratio(1, 2);

        let psi_for = |units: u64| {
            let descriptor = registry.descriptor(ProofKind::Ai).unwrap();
            descriptor.psi.eval(ProofMetrics {
                units,
                quality_millis: 1_000,
            })
        };

        let mut prev_s = Fixed::ZERO;
        for units in (0..30_000).step_by(499) {
            let breakdown = score_block(
                &registry,
                &policy,
                &[RawContribution {
                    kind: ProofKind::Ai,
                    psi_raw: psi_for(units),
                    nullifier: [9; 32],
                }],
                draw,
                Fixed::from_int(1),
            );
            assert!(
                breakdown.s_value >= prev_s,
                "S regressed at {units} units"
            );
            assert!(breakdown.psi_total <= policy.gamma);
            prev_s = breakdown.s_value;
        }
    }

    /// Cap respect on a mixed bag: per-kind ψ ≤ cap and Σ ≤ Γ.
    #[test]
    fn test_caps_hold_for_mixed_bags() {
        let registry = ProofRegistry::mainnet_default();
        let policy = ScoringPolicy::default();
        let contributions: Vec<RawContribution> = (0u8..12)
            .map(|i| RawContribution {
                kind: ProofKind::ALL[(i % 5) as usize],
                psi_raw: Fixed::from_ratio(9, 10),
                nullifier: [i; 32],
            })
            .collect();
        let breakdown = score_block(
            &registry,
            &policy,
            &contributions,
            Fixed::ZERO,
            Fixed::from_int(1),
        );
        for (kind, psi) in &breakdown.psi_by_kind {
            let cap = registry.descriptor(*kind).unwrap().cap;
            assert!(*psi <= cap, "{kind} exceeded its cap");
        }
        assert!(breakdown.psi_total <= policy.gamma);
    }

    /// Fork-choice determinism: identical forests pick identical heads, no
    /// matter the insertion order.
    #[test]
    fn test_fork_choice_agrees_across_insertion_orders() {
        use animica_consensus::{ForkChoiceStore, ThetaState};
        use shared_types::{BlockHeader, PolicyRoots};

        let genesis = header(0, [0; 32], 0);
        let state = ThetaState::genesis(&RetargetParams::default());

        let tips = |order: &[u64]| {
            let mut store = ForkChoiceStore::new(genesis.clone(), state);
            let mut indices = Vec::new();
            for nonce in order {
                let child = header(1, genesis.hash(), *nonce);
                indices.push(store.insert(child, Fixed::from_ratio(1, 2), state, vec![]).unwrap());
            }
            let mut best = indices[0];
            for &candidate in &indices[1..] {
                if store.better_tip(candidate, best) {
                    best = candidate;
                }
            }
            store.node(best).hash
        };

        assert_eq!(tips(&[1, 2, 3, 4]), tips(&[4, 3, 2, 1]));
        assert_eq!(tips(&[2, 4, 1, 3]), tips(&[1, 2, 3, 4]));

        fn header(height: u64, parent: [u8; 32], nonce: u64) -> BlockHeader {
            BlockHeader {
                version: 1,
                height,
                parent_hash: parent,
                timestamp: 1_000 + height * 12,
                miner: [1; 32],
                nonce,
                theta: Fixed::from_int(1),
                seed_u: [0; 32],
                proof_bag_root: [nonce as u8; 32],
                beacon_round: 0,
                state_root: [0; 32],
                receipts_root: [0; 32],
                da_root: [0; 32],
                policy_roots: PolicyRoots::default(),
                signature: [0; 64],
            }
        }
    }

    /// The registry dispatch rejects what it must and the sequential bag
    /// path equals element-wise verification.
    #[test]
    fn test_bag_verification_matches_elementwise() {
        let registry = ProofRegistry::mainnet_default();
        let ctx = VerifyContext {
            height: 10,
            beacon_round: 0,
        };
        let bag: Vec<ProofEnvelope> = (1u64..5)
            .map(|i| {
                let producer = [i as u8; 32];
                let digest = animica_poies::hash_share_digest(&producer, i);
                let mut payload = Vec::with_capacity(40);
                payload.extend_from_slice(&i.to_be_bytes());
                payload.extend_from_slice(&digest);
                ProofEnvelope {
                    kind: ProofKind::HashShare,
                    payload,
                    producer,
                    nullifier_input: digest.to_vec(),
                    metrics: ProofMetrics {
                        units: 0,
                        quality_millis: 1_000,
                    },
                }
            })
            .collect();

        let from_bag = verify_bag(&registry, &bag, &ctx).unwrap();
        let elementwise: Vec<_> = bag
            .iter()
            .map(|envelope| registry.verify(envelope, &ctx).unwrap())
            .collect();
        assert_eq!(from_bag, elementwise);
    }

    fn sample_header() -> shared_types::BlockHeader {
        shared_types::BlockHeader {
            version: 1,
            height: 42,
            parent_hash: [0x11; 32],
            timestamp: 1_700_000_123,
            miner: [0x22; 32],
            nonce: 9,
            theta: Fixed::from_ratio(7, 5),
            seed_u: [0x33; 32],
            proof_bag_root: [0x44; 32],
            beacon_round: 6,
            state_root: [0x55; 32],
            receipts_root: [0x66; 32],
            da_root: [0x77; 32],
            policy_roots: shared_types::PolicyRoots {
                alg_policy_root: [0x88; 32],
                zk_vk_set_root: [0x99; 32],
                retarget_params_root: [0xAA; 32],
                proof_registry_root: [0xBB; 32],
            },
            signature: [0xCC; 64],
        }
    }
}
