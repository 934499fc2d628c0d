// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame traversals: update, draw, and hit testing.

use kurbo::{Point, Rect};

use crate::batch::Batch;
use crate::children::Snapshot;
use crate::coords::to_child_local;
use crate::scene::{Node, Scene};
use crate::transform::{compose, local_transform};
use crate::types::NodeId;
use crate::util::overlaps_inclusive;

impl Scene {
    /// Update a node and then its children, bottom to top.
    ///
    /// Behaviors may restructure the scene from inside [`Behavior::act`](crate::Behavior::act).
    /// Each group walks the children it had when its pass started: a child removed by an
    /// earlier sibling is skipped, and a child added during the pass is first updated on the
    /// next call.
    pub fn act(&mut self, id: NodeId, delta: f64) {
        let Some(node) = self.node_opt_mut(id) else {
            return;
        };
        if let Some(mut behavior) = node.behavior.take() {
            behavior.act(self, id, delta);
            self.restore_behavior(id, behavior);
        }
        let Some(children) = self.child_snapshot(id) else {
            return;
        };
        for child in children {
            if self.parent_of(child) == Some(id) {
                self.act(child, delta);
            }
        }
    }

    /// Draw a node and its visible descendants into `batch`.
    ///
    /// Children are drawn in ascending index order, each with `parent_alpha` multiplied by
    /// the group's own alpha. Drawing an invisible node does nothing.
    ///
    /// A group with transforms enabled installs its world transform on the batch (ending and
    /// restarting it) for the duration of its children and then restores the previous matrix.
    /// A group with transforms disabled instead offsets each child's position by its own
    /// position while that child draws; positions are restored exactly afterwards.
    pub fn draw(&mut self, id: NodeId, batch: &mut dyn Batch, parent_alpha: f64) {
        let Some(node) = self.node_opt_mut(id) else {
            return;
        };
        if !node.props.is_visible() {
            return;
        }
        let transform_enabled = match &node.group {
            Some(group) => group.transform_enabled,
            None => {
                let Node {
                    props, behavior, ..
                } = node;
                if let Some(behavior) = behavior {
                    behavior.draw(props, batch, parent_alpha);
                }
                return;
            }
        };
        if transform_enabled {
            self.apply_transform(id, batch);
        }
        self.draw_children(id, batch, parent_alpha);
        if transform_enabled {
            self.reset_transform(id, batch);
        }
    }

    /// Find the topmost node under `point`, given in `id`'s local space.
    ///
    /// Children are tested from the last drawn to the first, each with the point mapped into
    /// its local space; if none reports a hit, the node tests itself. Invisible subtrees are
    /// never hit.
    pub fn hit(&self, id: NodeId, point: Point) -> Option<NodeId> {
        let node = self.node_opt(id)?;
        if !node.props.is_visible() {
            return None;
        }
        if let Some(group) = &node.group {
            for &child in group.children.as_slice().iter().rev() {
                let Some(props) = self.props(child) else {
                    continue;
                };
                if let Some(hit) = self.hit(child, to_child_local(props, point)) {
                    return Some(hit);
                }
            }
        }
        let hit = match &node.behavior {
            Some(behavior) => behavior.hit(&node.props, point),
            None => node.props.contains_local(point),
        };
        hit.then_some(id)
    }

    fn child_snapshot(&self, id: NodeId) -> Option<Snapshot> {
        self.group_state(id).map(|g| g.children.snapshot())
    }

    /// Nearest ancestor that applies its transform to the batch.
    fn transforming_ancestor(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.parent_of(id);
        while let Some(parent) = current {
            if self.is_transform_enabled(parent) == Some(true) {
                return Some(parent);
            }
            current = self.parent_of(parent);
        }
        None
    }

    fn apply_transform(&mut self, id: NodeId, batch: &mut dyn Batch) {
        let ancestor_world = self
            .transforming_ancestor(id)
            .and_then(|a| self.world_transform(a));
        let local = local_transform(&self.node(id).props);
        let Some(group) = self.group_state_mut(id) else {
            return;
        };
        group.local_transform = local;
        group.world_transform = compose(ancestor_world, local);
        group.batch_transform = group.world_transform.into();

        batch.end();
        group.saved_batch_transform = batch.transform_matrix();
        batch.set_transform_matrix(group.batch_transform);
        batch.begin();
    }

    fn reset_transform(&mut self, id: NodeId, batch: &mut dyn Batch) {
        let Some(group) = self.group_state(id) else {
            return;
        };
        batch.end();
        batch.set_transform_matrix(group.saved_batch_transform);
        batch.begin();
    }

    fn draw_children(&mut self, id: NodeId, batch: &mut dyn Batch, parent_alpha: f64) {
        let node = self.node(id);
        let parent_alpha = parent_alpha * node.props.alpha;
        let position = node.props.position;
        let Some(group) = &node.group else {
            return;
        };
        let culling_area = group.culling_area;
        let transform_enabled = group.transform_enabled;
        let children = group.children.snapshot();

        if transform_enabled {
            for child in children {
                if self.drawable_child(id, child, culling_area).is_some() {
                    self.draw(child, batch, parent_alpha);
                }
            }
            batch.flush();
            return;
        }

        // No transform for this group: offset each child by the group's position instead.
        let offset = position.to_vec2();
        self.node_mut(id).props.position = Point::ZERO;
        for child in children {
            let Some(saved) = self.drawable_child(id, child, culling_area) else {
                continue;
            };
            self.node_mut(child).props.position = saved + offset;
            self.draw(child, batch, parent_alpha);
            self.node_mut(child).props.position = saved;
        }
        self.node_mut(id).props.position = position;
    }

    /// Position of `child` if it is a visible child of `group` inside the culling area.
    fn drawable_child(
        &self,
        group: NodeId,
        child: NodeId,
        culling_area: Option<Rect>,
    ) -> Option<Point> {
        let node = self.node_opt(child)?;
        if node.parent != Some(group) || !node.props.is_visible() {
            return None;
        }
        if let Some(area) = culling_area
            && !overlaps_inclusive(node.props.bounds(), area)
        {
            return None;
        }
        Some(node.props.position)
    }
}
