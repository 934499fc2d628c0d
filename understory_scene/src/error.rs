// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors reported by structural operations and coordinate conversion.

use crate::types::NodeId;

/// Failure of a [`Scene`](crate::Scene) operation.
///
/// Expected no-op outcomes, such as removing a node that is not a child, are reported as
/// `bool` results instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    /// The identifier does not refer to a live node.
    #[error("node {0:?} is stale")]
    StaleNode(NodeId),
    /// The operation needs a group, but the node is a leaf.
    #[error("node {0:?} is not a group")]
    NotAGroup(NodeId),
    /// A sibling argument is not a current child of the group.
    #[error("node {node:?} is not a child of group {group:?}")]
    NotAChild {
        /// The group that was searched.
        group: NodeId,
        /// The node that was not found among its children.
        node: NodeId,
    },
    /// The node's parent chain ends without reaching the queried ancestor.
    #[error("node {node:?} is not a descendant of {ancestor:?}")]
    NotADescendant {
        /// The ancestor the conversion started from.
        ancestor: NodeId,
        /// The node outside its subtree.
        node: NodeId,
    },
    /// An insertion index is past the end of the child list.
    #[error("index {index} is out of bounds for {len} children")]
    IndexOutOfBounds {
        /// The requested index.
        index: usize,
        /// The number of children at the time of insertion.
        len: usize,
    },
    /// Adding the node would make a group its own ancestor.
    #[error("adding {node:?} to {group:?} would create a cycle")]
    WouldCycle {
        /// The group being added to.
        group: NodeId,
        /// The node being added.
        node: NodeId,
    },
}
