// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node capabilities invoked by traversals.

use kurbo::{Point, Rect};

use crate::batch::Batch;
use crate::scene::Scene;
use crate::types::{NodeId, NodeProps};

/// Custom logic attached to a node with [`Scene::set_behavior`].
///
/// Every method has a default, so implementors only override what they need.
///
/// While [`act`](Behavior::act) or [`children_changed`](Behavior::children_changed) runs, the
/// behavior is taken out of its node, and the scene is fully available: a behavior may add,
/// remove, or destroy any node, including its own.
pub trait Behavior {
    /// Per-frame update.
    fn act(&mut self, _scene: &mut Scene, _id: NodeId, _delta: f64) {}

    /// Draw a leaf node. `props.position` is in the coordinate space of the batch's current
    /// transform. Not called for groups.
    fn draw(&mut self, _props: &NodeProps, _batch: &mut dyn Batch, _parent_alpha: f64) {}

    /// Whether `local` hits this node, in the node's own coordinate space.
    fn hit(&self, props: &NodeProps, local: Point) -> bool {
        props.contains_local(local)
    }

    /// Called on a group after its children were added, removed, cleared, or reordered.
    fn children_changed(&mut self, _scene: &mut Scene, _group: NodeId) {}
}

/// Draws the node's untransformed bounds as a filled rectangle.
#[derive(Clone, Copy, Debug, Default)]
pub struct SolidRect;

impl Behavior for SolidRect {
    fn draw(&mut self, props: &NodeProps, batch: &mut dyn Batch, parent_alpha: f64) {
        batch.draw_rect(
            Rect::from_origin_size(props.position, props.size),
            parent_alpha * props.alpha,
        );
    }
}
