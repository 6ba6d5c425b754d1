//! # Fork Choice
//!
//! ## Problem
//!
//! Longest-chain selection is meaningless under PoIES: a block's difficulty
//! surplus, not its existence, is the work it proves. Two branches of equal
//! length can embody very different score margins.
//!
//! ## Solution: Cumulative Weight Over an Arena
//!
//! Every accepted block carries weight `w = s − Θ` (non-negative by
//! admission). The canonical head is the tip with the greatest cumulative
//! weight from genesis; ties break on the bytewise-smaller proof-bag root,
//! then the smaller header hash, so every node lands on the same tip.
//!
//! Headers live in a flat arena with parent/child indices. No `Rc` cycles,
//! no unbounded recursion, and reorg paths fall out of index walks.

use crate::domain::error::{ConsensusError, ConsensusResult};
use crate::domain::theta::ThetaState;
use shared_types::{BlockHeader, Fixed, Hash, Nullifier};
use std::collections::HashMap;

/// One accepted header in the forest.
#[derive(Clone, Debug)]
pub struct ForkNode {
    pub hash: Hash,
    pub header: BlockHeader,
    /// Arena index of the parent; `None` only for genesis.
    pub parent: Option<usize>,
    /// Arena indices of children.
    pub children: Vec<usize>,
    /// This block's own weight, `s − Θ`.
    pub weight: Fixed,
    /// Weight accumulated from genesis through this block.
    pub cumulative_weight: Fixed,
    /// Retarget fold state after this block.
    pub theta_state: ThetaState,
    /// Nullifiers this block inserted, kept for reorg rewind.
    pub nullifiers: Vec<Nullifier>,
}

/// The rewind/apply plan for a head switch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReorgPath {
    /// Old-branch nodes to rewind, tip first, common ancestor excluded.
    pub rewind: Vec<usize>,
    /// New-branch nodes to apply, ancestor-side first, new tip last.
    pub apply: Vec<usize>,
}

impl ReorgPath {
    /// Depth of the rewind; zero for a plain extension.
    pub fn depth(&self) -> u64 {
        self.rewind.len() as u64
    }
}

/// The header forest and canonical-head cursor.
pub struct ForkChoiceStore {
    arena: Vec<ForkNode>,
    by_hash: HashMap<Hash, usize>,
    head: usize,
}

impl ForkChoiceStore {
    /// Start a forest at genesis. Genesis carries no weight; its fold state
    /// seeds every branch.
    pub fn new(genesis: BlockHeader, genesis_state: ThetaState) -> Self {
        let hash = genesis.hash();
        let node = ForkNode {
            hash,
            header: genesis,
            parent: None,
            children: Vec::new(),
            weight: Fixed::ZERO,
            cumulative_weight: Fixed::ZERO,
            theta_state: genesis_state,
            nullifiers: Vec::new(),
        };
        let mut by_hash = HashMap::new();
        by_hash.insert(hash, 0);
        Self {
            arena: vec![node],
            by_hash,
            head: 0,
        }
    }

    pub fn contains(&self, hash: &Hash) -> bool {
        self.by_hash.contains_key(hash)
    }

    /// Look a node up by header hash.
    pub fn get(&self, hash: &Hash) -> Option<&ForkNode> {
        self.by_hash.get(hash).map(|&i| &self.arena[i])
    }

    /// Node at an arena index.
    pub fn node(&self, index: usize) -> &ForkNode {
        &self.arena[index]
    }

    /// Arena index for a hash.
    pub fn index_of(&self, hash: &Hash) -> Option<usize> {
        self.by_hash.get(hash).copied()
    }

    /// The canonical head node.
    pub fn head(&self) -> &ForkNode {
        &self.arena[self.head]
    }

    /// Arena index of the canonical head.
    pub fn head_index(&self) -> usize {
        self.head
    }

    /// Number of known headers.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Insert an accepted block under its parent.
    ///
    /// Returns the new node's index; the caller decides whether the head
    /// moves (the store only records structure and weights).
    pub fn insert(
        &mut self,
        header: BlockHeader,
        weight: Fixed,
        theta_state: ThetaState,
        nullifiers: Vec<Nullifier>,
    ) -> ConsensusResult<usize> {
        let hash = header.hash();
        if self.by_hash.contains_key(&hash) {
            return Err(ConsensusError::BadHeader(format!(
                "header {} already in forest",
                hex_prefix(&hash)
            )));
        }
        let parent = *self
            .by_hash
            .get(&header.parent_hash)
            .ok_or_else(|| {
                ConsensusError::BadHeader(format!(
                    "unknown parent {}",
                    hex_prefix(&header.parent_hash)
                ))
            })?;
        let cumulative_weight = self.arena[parent].cumulative_weight.add(weight);
        let index = self.arena.len();
        self.arena.push(ForkNode {
            hash,
            header,
            parent: Some(parent),
            children: Vec::new(),
            weight,
            cumulative_weight,
            theta_state,
            nullifiers,
        });
        self.arena[parent].children.push(index);
        self.by_hash.insert(hash, index);
        Ok(index)
    }

    /// Whether tip `a` beats tip `b` under the canonical ordering:
    /// cumulative weight, then bytewise-smaller proof-bag root, then
    /// smaller header hash.
    pub fn better_tip(&self, a: usize, b: usize) -> bool {
        let (na, nb) = (&self.arena[a], &self.arena[b]);
        match na.cumulative_weight.cmp(&nb.cumulative_weight) {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Less => false,
            std::cmp::Ordering::Equal => {
                match na.header.proof_bag_root.cmp(&nb.header.proof_bag_root) {
                    std::cmp::Ordering::Less => true,
                    std::cmp::Ordering::Greater => false,
                    std::cmp::Ordering::Equal => na.hash < nb.hash,
                }
            }
        }
    }

    /// Compute the rewind/apply plan from the current head to `target`.
    pub fn reorg_path(&self, target: usize) -> ReorgPath {
        let mut rewind = Vec::new();
        let mut apply = Vec::new();
        let (mut a, mut b) = (self.head, target);

        // Level the two walks to equal height.
        while self.arena[a].header.height > self.arena[b].header.height {
            rewind.push(a);
            a = self.arena[a].parent.expect("non-genesis has a parent");
        }
        while self.arena[b].header.height > self.arena[a].header.height {
            apply.push(b);
            b = self.arena[b].parent.expect("non-genesis has a parent");
        }
        // Walk both sides up to the common ancestor.
        while a != b {
            rewind.push(a);
            apply.push(b);
            a = self.arena[a].parent.expect("forest is rooted at genesis");
            b = self.arena[b].parent.expect("forest is rooted at genesis");
        }
        apply.reverse();
        ReorgPath { rewind, apply }
    }

    /// Move the head cursor. The caller has already mirrored state effects.
    pub fn set_head(&mut self, index: usize) {
        self.head = index;
    }

    /// Header at `height` on the branch ending in `tip`.
    pub fn header_by_height(&self, tip: usize, height: u64) -> Option<&ForkNode> {
        let mut cursor = tip;
        loop {
            let node = &self.arena[cursor];
            match node.header.height.cmp(&height) {
                std::cmp::Ordering::Equal => return Some(node),
                std::cmp::Ordering::Less => return None,
                std::cmp::Ordering::Greater => cursor = node.parent?,
            }
        }
    }
}

fn hex_prefix(hash: &Hash) -> String {
    hash[..4].iter().map(|b| format!("{b:02x}")).collect()
}
