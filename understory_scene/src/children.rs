// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ordered child storage for groups.
//!
//! Order is z-order: index 0 is drawn first (bottom) and hit tested last.

use alloc::vec::Vec;
use smallvec::SmallVec;

use crate::types::NodeId;

/// Children visited by one traversal pass.
///
/// Traversals iterate this copy so that nodes added or removed by callbacks during the pass
/// cannot shift the indices being walked.
pub(crate) type Snapshot = SmallVec<[NodeId; 8]>;

#[derive(Clone, Debug, Default)]
pub(crate) struct ChildList {
    items: Vec<NodeId>,
}

impl ChildList {
    pub(crate) fn as_slice(&self) -> &[NodeId] {
        &self.items
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn index_of(&self, id: NodeId) -> Option<usize> {
        self.items.iter().position(|&c| c == id)
    }

    pub(crate) fn push(&mut self, id: NodeId) {
        self.items.push(id);
    }

    /// Insert at `index`; callers validate `index <= len`.
    pub(crate) fn insert(&mut self, index: usize, id: NodeId) {
        self.items.insert(index, id);
    }

    /// Remove the first occurrence of `id`, preserving the order of the rest.
    pub(crate) fn remove(&mut self, id: NodeId) -> bool {
        match self.index_of(id) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    pub(crate) fn swap(&mut self, a: usize, b: usize) -> bool {
        let len = self.items.len();
        if a >= len || b >= len {
            return false;
        }
        self.items.swap(a, b);
        true
    }

    pub(crate) fn take_all(&mut self) -> Vec<NodeId> {
        core::mem::take(&mut self.items)
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        self.items.iter().copied().collect()
    }
}
