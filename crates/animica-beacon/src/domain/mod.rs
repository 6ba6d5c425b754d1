//! Beacon domain logic.

pub mod round;

pub use round::{
    commitment_digest, genesis_output, output_digest, BeaconRound, RoundPhase, RoundSchedule,
    DOMAIN_COMMIT, DOMAIN_MIX, DOMAIN_OUTPUT,
};
