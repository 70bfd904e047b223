// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Binary Merkle tree over message leaves
//!
//! Nodes hash sorted pairs with a `0x01` domain prefix (see
//! [`hasher::internal_hash`]), so proofs are plain sibling lists with no
//! left/right flags. An odd trailing node is promoted to the next layer
//! unchanged, which means a proof may be shorter than the tree height.

use alloy_primitives::B256;
use thiserror::Error;

use super::hasher;

/// Maximum number of leaves in one tree
pub const MAX_LEAVES: usize = 1 << 16;

/// Errors that can occur while building trees or proofs
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MerkleError {
    #[error("Cannot operate on empty tree")]
    EmptyTree,

    #[error("Leaf index {index} out of bounds (tree has {tree_size} leaves)")]
    IndexOutOfBounds { index: usize, tree_size: usize },

    #[error("Tree exceeds maximum size of {MAX_LEAVES} leaves")]
    TooLarge,
}

/// A fully materialized Merkle tree
///
/// `layers[0]` holds the leaves; the last layer holds only the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTree {
    layers: Vec<Vec<B256>>,
}

impl MerkleTree {
    /// Builds the tree bottom-up from already-hashed leaves.
    ///
    /// # Errors
    ///
    /// Returns [`MerkleError::EmptyTree`] for no leaves and
    /// [`MerkleError::TooLarge`] above [`MAX_LEAVES`].
    pub fn from_leaves(leaves: Vec<B256>) -> Result<Self, MerkleError> {
        if leaves.is_empty() {
            return Err(MerkleError::EmptyTree);
        }
        if leaves.len() > MAX_LEAVES {
            return Err(MerkleError::TooLarge);
        }

        let mut layers = vec![leaves];
        while let Some(current) = layers.last().filter(|layer| layer.len() > 1) {
            let next: Vec<B256> = current
                .chunks(2)
                .map(|pair| match pair.get(1) {
                    Some(right) => hasher::internal_hash(&pair[0], right),
                    None => pair[0],
                })
                .collect();
            layers.push(next);
        }

        Ok(Self { layers })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.layers[0].len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.layers[0].is_empty()
    }

    #[inline]
    pub fn leaves(&self) -> &[B256] {
        &self.layers[0]
    }

    /// Root of the tree; a single leaf is its own root
    pub fn root(&self) -> B256 {
        self.layers
            .last()
            .and_then(|layer| layer.first())
            .copied()
            .unwrap_or(B256::ZERO)
    }

    /// Sibling path for the leaf at `index`
    ///
    /// # Errors
    ///
    /// Returns [`MerkleError::IndexOutOfBounds`] for an unknown leaf.
    pub fn proof(&self, index: usize) -> Result<Vec<B256>, MerkleError> {
        if index >= self.len() {
            return Err(MerkleError::IndexOutOfBounds {
                index,
                tree_size: self.len(),
            });
        }

        let mut proof = Vec::with_capacity(self.layers.len());
        let mut current = index;
        for layer in &self.layers[..self.layers.len() - 1] {
            // promoted nodes have no sibling on this layer
            if let Some(sibling) = layer.get(current ^ 1) {
                proof.push(*sibling);
            }
            current /= 2;
        }

        Ok(proof)
    }
}

/// Folds a leaf with its sibling path into a root
pub fn process_proof(leaf: B256, proof: &[B256]) -> B256 {
    proof
        .iter()
        .fold(leaf, |acc, sibling| hasher::internal_hash(&acc, sibling))
}

/// Checks a leaf and sibling path against an expected root
pub fn verify_proof(root: B256, leaf: B256, proof: &[B256]) -> bool {
    process_proof(leaf, proof) == root
}
