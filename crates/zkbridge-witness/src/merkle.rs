//! Native block Merkle tree arithmetic, internal byte order throughout.

use zkbridge_core::base::{HASH_SIZE, Hash256, sha256d};

/// Parent of two nodes: `SHA256d(left ‖ right)`.
#[must_use]
pub fn hash_nodes(left: &Hash256, right: &Hash256) -> Hash256 {
    let mut preimage = [0_u8; 64];
    let (l, r) = preimage.split_at_mut(HASH_SIZE);
    l.copy_from_slice(left.as_bytes());
    r.copy_from_slice(right.as_bytes());
    sha256d(&preimage)
}

/// Little-endian bits of `index`, one per level; `true` means the node is a right child.
#[must_use]
pub fn path_bits(index: u64, depth: usize) -> Vec<bool> {
    let mut position = index;
    (0..depth)
        .map(|_| {
            let bit = position & 1 == 1;
            position = position.checked_shr(1).unwrap_or(0);
            bit
        })
        .collect()
}

/// Fold `siblings` (leaf to root) onto `leaf` along the path of `index`.
#[must_use]
pub fn compute_root(leaf: &Hash256, siblings: &[Hash256], index: u64) -> Hash256 {
    siblings
        .iter()
        .zip(path_bits(index, siblings.len()))
        .fold(*leaf, |node, (sibling, is_right)| {
            if is_right {
                hash_nodes(sibling, &node)
            } else {
                hash_nodes(&node, sibling)
            }
        })
}
