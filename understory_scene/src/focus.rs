// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stages: root containers that own input focus for the nodes attached beneath them.

use hashbrown::HashSet;
use kurbo::Point;
use smallvec::SmallVec;

use crate::scene::Scene;
use crate::types::{NodeId, NodeKind, NodeProps, StageId};

#[derive(Clone, Debug)]
pub(crate) struct Stage {
    root: NodeId,
    keyboard_focus: Option<NodeId>,
    scroll_focus: Option<NodeId>,
    touch_focus: HashSet<NodeId>,
}

impl Scene {
    /// Create a stage with a fresh root group.
    ///
    /// Nodes added anywhere under the root are attached to the stage, which is reported by
    /// [`Scene::stage_of`] and can hold input focus on them.
    pub fn create_stage(&mut self) -> StageId {
        let root = self.insert(NodeKind::Group, NodeProps::default());
        #[allow(
            clippy::cast_possible_truncation,
            reason = "StageId uses 32-bit indices by design."
        )]
        let stage = StageId(self.stages.len() as u32);
        self.stages.push(Stage {
            root,
            keyboard_focus: None,
            scroll_focus: None,
            touch_focus: HashSet::new(),
        });
        self.node_mut(root).stage = Some(stage);
        log::debug!("created {stage:?} with root {root:?}");
        stage
    }

    /// Returns the root group of a stage, or `None` if it was destroyed.
    pub fn stage_root(&self, stage: StageId) -> Option<NodeId> {
        let root = self.stages.get(stage.idx())?.root;
        self.is_alive(root).then_some(root)
    }

    /// Hit test a point given in stage coordinates, the parent space of the root group.
    pub fn hit_stage(&self, stage: StageId, point: Point) -> Option<NodeId> {
        let root = self.stage_root(stage)?;
        let local = self.to_child_local(root, point)?;
        self.hit(root, local)
    }

    /// Give keyboard focus to a node attached to `stage`, or clear it with `None`.
    ///
    /// Returns false, leaving focus unchanged, if the node is not attached to `stage`.
    pub fn set_keyboard_focus(&mut self, stage: StageId, node: Option<NodeId>) -> bool {
        if !self.accepts_focus(stage, node) {
            return false;
        }
        self.stages[stage.idx()].keyboard_focus = node;
        true
    }

    /// Returns the node holding keyboard focus on `stage`.
    pub fn keyboard_focus(&self, stage: StageId) -> Option<NodeId> {
        self.stages.get(stage.idx()).and_then(|s| s.keyboard_focus)
    }

    /// Give scroll focus to a node attached to `stage`, or clear it with `None`.
    pub fn set_scroll_focus(&mut self, stage: StageId, node: Option<NodeId>) -> bool {
        if !self.accepts_focus(stage, node) {
            return false;
        }
        self.stages[stage.idx()].scroll_focus = node;
        true
    }

    /// Returns the node holding scroll focus on `stage`.
    pub fn scroll_focus(&self, stage: StageId) -> Option<NodeId> {
        self.stages.get(stage.idx()).and_then(|s| s.scroll_focus)
    }

    /// Record that `node` receives the remainder of an ongoing touch or drag.
    pub fn add_touch_focus(&mut self, stage: StageId, node: NodeId) -> bool {
        if !self.accepts_focus(stage, Some(node)) {
            return false;
        }
        self.stages[stage.idx()].touch_focus.insert(node)
    }

    /// Drop a touch focus entry. Returns false if there was none.
    pub fn remove_touch_focus(&mut self, stage: StageId, node: NodeId) -> bool {
        self.stages
            .get_mut(stage.idx())
            .is_some_and(|s| s.touch_focus.remove(&node))
    }

    /// Returns true if `node` has touch focus on `stage`.
    pub fn has_touch_focus(&self, stage: StageId, node: NodeId) -> bool {
        self.stages
            .get(stage.idx())
            .is_some_and(|s| s.touch_focus.contains(&node))
    }

    /// Clear every focus `stage` holds on `node` or any of its descendants.
    pub fn unfocus(&mut self, stage: StageId, node: NodeId) {
        let Some(s) = self.stages.get(stage.idx()) else {
            return;
        };
        let within = |focus: Option<NodeId>| focus.is_some_and(|f| self.is_ancestor_or_self(node, f));
        let clear_keyboard = within(s.keyboard_focus);
        let clear_scroll = within(s.scroll_focus);
        let touches: SmallVec<[NodeId; 4]> = s
            .touch_focus
            .iter()
            .copied()
            .filter(|&f| self.is_ancestor_or_self(node, f))
            .collect();

        let s = &mut self.stages[stage.idx()];
        if clear_keyboard {
            s.keyboard_focus = None;
        }
        if clear_scroll {
            s.scroll_focus = None;
        }
        for touch in touches {
            s.touch_focus.remove(&touch);
        }
    }

    fn accepts_focus(&self, stage: StageId, node: Option<NodeId>) -> bool {
        stage.idx() < self.stages.len()
            && node.is_none_or(|n| self.stage_of(n) == Some(stage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Size;

    fn leaf(scene: &mut Scene, x: f64, y: f64) -> NodeId {
        scene.insert(
            NodeKind::Leaf,
            NodeProps::at(Point::new(x, y), Size::new(10.0, 10.0)),
        )
    }

    #[test]
    fn stage_propagates_to_subtrees() {
        let mut scene = Scene::new();
        let stage = scene.create_stage();
        let root = scene.stage_root(stage).unwrap();
        let g = scene.insert(NodeKind::Group, NodeProps::default());
        let a = leaf(&mut scene, 0.0, 0.0);
        scene.add_child(g, a).unwrap();
        assert_eq!(scene.stage_of(a), None);

        scene.add_child(root, g).unwrap();
        assert_eq!(scene.stage_of(g), Some(stage));
        assert_eq!(scene.stage_of(a), Some(stage), "descendants join the stage");

        scene.detach(g);
        assert_eq!(scene.stage_of(g), None);
        assert_eq!(scene.stage_of(a), None, "descendants leave the stage");
    }

    #[test]
    fn focus_requires_attachment() {
        let mut scene = Scene::new();
        let stage = scene.create_stage();
        let root = scene.stage_root(stage).unwrap();
        let a = leaf(&mut scene, 0.0, 0.0);
        assert!(!scene.set_keyboard_focus(stage, Some(a)));
        scene.add_child(root, a).unwrap();
        assert!(scene.set_keyboard_focus(stage, Some(a)));
        assert_eq!(scene.keyboard_focus(stage), Some(a));
        assert!(scene.set_keyboard_focus(stage, None));
        assert_eq!(scene.keyboard_focus(stage), None);
    }

    #[test]
    fn removing_a_subtree_clears_its_focus() {
        let mut scene = Scene::new();
        let stage = scene.create_stage();
        let root = scene.stage_root(stage).unwrap();
        let g = scene.insert(NodeKind::Group, NodeProps::default());
        let a = leaf(&mut scene, 0.0, 0.0);
        let b = leaf(&mut scene, 0.0, 0.0);
        scene.add_child(root, g).unwrap();
        scene.add_child(g, a).unwrap();
        scene.add_child(root, b).unwrap();

        assert!(scene.set_keyboard_focus(stage, Some(a)));
        assert!(scene.set_scroll_focus(stage, Some(b)));
        assert!(scene.add_touch_focus(stage, a));
        assert!(scene.add_touch_focus(stage, b));

        assert!(scene.remove_child(root, g));
        assert_eq!(scene.keyboard_focus(stage), None);
        assert!(!scene.has_touch_focus(stage, a));
        assert_eq!(scene.scroll_focus(stage), Some(b), "unrelated focus is kept");
        assert!(scene.has_touch_focus(stage, b));

        scene.clear_children(root);
        assert_eq!(scene.scroll_focus(stage), None);
        assert!(!scene.has_touch_focus(stage, b));
    }

    #[test]
    fn destroy_clears_focus() {
        let mut scene = Scene::new();
        let stage = scene.create_stage();
        let root = scene.stage_root(stage).unwrap();
        let a = leaf(&mut scene, 0.0, 0.0);
        scene.add_child(root, a).unwrap();
        assert!(scene.set_keyboard_focus(stage, Some(a)));
        scene.destroy(a);
        assert_eq!(scene.keyboard_focus(stage), None);
        assert!(!scene.remove_touch_focus(stage, a));
    }

    #[test]
    fn hit_stage_maps_into_root_space() {
        let mut scene = Scene::new();
        let stage = scene.create_stage();
        let root = scene.stage_root(stage).unwrap();
        scene.set_position(root, Point::new(100.0, 0.0));
        let a = leaf(&mut scene, 0.0, 0.0);
        scene.add_child(root, a).unwrap();
        assert_eq!(scene.hit_stage(stage, Point::new(105.0, 5.0)), Some(a));
        assert_eq!(scene.hit_stage(stage, Point::new(5.0, 5.0)), None);
    }
}
