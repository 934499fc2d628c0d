// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene storage and structure: node lifecycle, child lists, and coordinate conversion.

use alloc::{boxed::Box, string::String, vec, vec::Vec};
use core::fmt::Write as _;

use kurbo::{Affine, Point, Rect};
use smallvec::SmallVec;

use crate::batch::BatchMatrix;
use crate::behavior::Behavior;
use crate::children::ChildList;
use crate::coords::to_child_local;
use crate::error::SceneError;
use crate::focus::Stage;
use crate::types::{NodeFlags, NodeId, NodeKind, NodeProps, StageId};

/// Arena holding every node of one or more hierarchies.
///
/// Nodes are created detached with [`Scene::insert`] and attached to groups with
/// [`Scene::add_child`] and friends. A node belongs to at most one group; adding it elsewhere
/// first detaches it. Children are ordered: later children are drawn on top and hit first.
///
/// ## Example
///
/// ```rust
/// use kurbo::{Point, Size};
/// use understory_scene::{NodeKind, NodeProps, Scene};
///
/// let mut scene = Scene::new();
/// let group = scene.insert(NodeKind::Group, NodeProps::at(Point::new(10.0, 10.0), Size::ZERO));
/// let a = scene.insert(NodeKind::Leaf, NodeProps::at(Point::ZERO, Size::new(5.0, 5.0)));
/// let b = scene.insert(NodeKind::Leaf, NodeProps::at(Point::new(20.0, 0.0), Size::new(5.0, 5.0)));
/// scene.add_child(group, a).unwrap();
/// scene.add_child(group, b).unwrap();
///
/// assert_eq!(scene.children_of(group), &[a, b]);
/// assert_eq!(scene.hit(group, Point::new(21.0, 1.0)), Some(b));
///
/// // Points are converted one level at a time down to any descendant.
/// let local = scene.to_descendant_local(group, b, Point::new(22.0, 3.0)).unwrap();
/// assert_eq!(local, Point::new(2.0, 3.0));
/// ```
pub struct Scene {
    /// slots
    nodes: Vec<Option<Node>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    pub(crate) stages: Vec<Stage>,
}

impl core::fmt::Debug for Scene {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        f.debug_struct("Scene")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("stages", &self.stages.len())
            .finish_non_exhaustive()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-group state. Matrices are derived during draw and are not authoritative.
#[derive(Clone, Debug)]
pub(crate) struct GroupState {
    pub(crate) children: ChildList,
    pub(crate) transform_enabled: bool,
    pub(crate) culling_area: Option<Rect>,
    pub(crate) local_transform: Affine,
    pub(crate) world_transform: Affine,
    pub(crate) batch_transform: BatchMatrix,
    pub(crate) saved_batch_transform: BatchMatrix,
}

impl Default for GroupState {
    fn default() -> Self {
        Self {
            children: ChildList::default(),
            transform_enabled: true,
            culling_area: None,
            local_transform: Affine::IDENTITY,
            world_transform: Affine::IDENTITY,
            batch_transform: BatchMatrix::IDENTITY,
            saved_batch_transform: BatchMatrix::IDENTITY,
        }
    }
}

pub(crate) struct Node {
    generation: u32,
    pub(crate) parent: Option<NodeId>,
    pub(crate) stage: Option<StageId>,
    name: Option<String>,
    pub(crate) props: NodeProps,
    pub(crate) group: Option<GroupState>,
    pub(crate) behavior: Option<Box<dyn Behavior>>,
}

impl Node {
    fn new(generation: u32, kind: NodeKind, props: NodeProps) -> Self {
        Self {
            generation,
            parent: None,
            stage: None,
            name: None,
            props,
            group: match kind {
                NodeKind::Leaf => None,
                NodeKind::Group => Some(GroupState::default()),
            },
            behavior: None,
        }
    }
}

/// Where [`Scene::insert_child`] places a node.
#[derive(Clone, Copy, Debug)]
enum InsertAt {
    End,
    Index(usize),
    Before(NodeId),
    After(NodeId),
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            stages: Vec::new(),
        }
    }

    /// Create a detached node.
    pub fn insert(&mut self, kind: NodeKind, props: NodeProps) -> NodeId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, kind, props));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, kind, props)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        NodeId::new(idx, generation)
    }

    /// Detach a node and free it together with its whole subtree.
    ///
    /// Behaviors in the subtree are dropped. Identifiers of freed nodes become stale.
    pub fn destroy(&mut self, id: NodeId) {
        if !self.is_alive(id) {
            return;
        }
        if let Some(stage) = self.node(id).stage {
            self.unfocus(stage, id);
        }
        self.detach(id);
        if !self.is_alive(id) {
            // A children-changed hook destroyed it first.
            return;
        }
        let mut stack = vec![id];
        let mut freed = 0_usize;
        while let Some(id) = stack.pop() {
            if let Some(mut node) = self.nodes[id.idx()].take() {
                if let Some(group) = node.group.as_mut() {
                    stack.extend(group.children.take_all());
                }
                self.free_list.push(id.idx());
                freed += 1;
            }
        }
        log::debug!("destroyed {id:?} and {} descendants", freed - 1);
    }

    /// Returns true if `id` refers to a live node.
    ///
    /// A `NodeId` is live if its slot exists and its generation matches the generation stored
    /// in that slot.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.node_opt(id).is_some()
    }

    /// Returns the kind of a live node.
    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.node_opt(id).map(|n| {
            if n.group.is_some() {
                NodeKind::Group
            } else {
                NodeKind::Leaf
            }
        })
    }

    /// Returns true if `id` is a live group.
    pub fn is_group(&self, id: NodeId) -> bool {
        self.kind(id) == Some(NodeKind::Group)
    }

    /// Returns the props of a live node.
    pub fn props(&self, id: NodeId) -> Option<&NodeProps> {
        self.node_opt(id).map(|n| &n.props)
    }

    /// Returns mutable props of a live node.
    pub fn props_mut(&mut self, id: NodeId) -> Option<&mut NodeProps> {
        self.node_opt_mut(id).map(|n| &mut n.props)
    }

    /// Update position.
    pub fn set_position(&mut self, id: NodeId, position: Point) {
        if let Some(n) = self.node_opt_mut(id) {
            n.props.position = position;
        }
    }

    /// Show or hide a node.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        if let Some(n) = self.node_opt_mut(id) {
            n.props.flags.set(NodeFlags::VISIBLE, visible);
        }
    }

    /// Returns the name of a live node, if it has one.
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.node_opt(id).and_then(|n| n.name.as_deref())
    }

    /// Name a node for [`Scene::find_by_name`] and [`Scene::graph_to_string`].
    pub fn set_name(&mut self, id: NodeId, name: impl Into<String>) {
        if let Some(n) = self.node_opt_mut(id) {
            n.name = Some(name.into());
        }
    }

    /// Attach a behavior, replacing any previous one.
    pub fn set_behavior(&mut self, id: NodeId, behavior: impl Behavior + 'static) {
        if let Some(n) = self.node_opt_mut(id) {
            n.behavior = Some(Box::new(behavior));
        }
    }

    /// Remove and return a node's behavior.
    pub fn take_behavior(&mut self, id: NodeId) -> Option<Box<dyn Behavior>> {
        self.node_opt_mut(id).and_then(|n| n.behavior.take())
    }

    /// Returns the parent of a node if live, or `None` for detached nodes and stale ids.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node_opt(id).and_then(|n| n.parent)
    }

    /// Returns the stage a node is attached to, if any.
    pub fn stage_of(&self, id: NodeId) -> Option<StageId> {
        self.node_opt(id).and_then(|n| n.stage)
    }

    /// Get the children of a group in z-order, or an empty slice for leaves and stale ids.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        match self.group_state(id) {
            Some(group) => group.children.as_slice(),
            None => &[],
        }
    }

    // --- child list ---

    /// Append `node` to `group`, on top of its existing children.
    ///
    /// The node is first detached from its current parent, if any.
    pub fn add_child(&mut self, group: NodeId, node: NodeId) -> Result<(), SceneError> {
        self.insert_child(group, node, InsertAt::End)
    }

    /// Insert `node` into `group` at `index`.
    ///
    /// `index` may equal the number of children the group has once `node` is detached.
    pub fn add_child_at(
        &mut self,
        group: NodeId,
        index: usize,
        node: NodeId,
    ) -> Result<(), SceneError> {
        self.insert_child(group, node, InsertAt::Index(index))
    }

    /// Insert `node` into `group` directly below `sibling`.
    ///
    /// Fails with [`SceneError::NotAChild`] if `sibling` is not a child of `group` or is
    /// `node` itself; nothing is modified in that case.
    pub fn add_child_before(
        &mut self,
        group: NodeId,
        sibling: NodeId,
        node: NodeId,
    ) -> Result<(), SceneError> {
        self.insert_child(group, node, InsertAt::Before(sibling))
    }

    /// Insert `node` into `group` directly above `sibling`.
    ///
    /// Fails like [`Scene::add_child_before`].
    pub fn add_child_after(
        &mut self,
        group: NodeId,
        sibling: NodeId,
        node: NodeId,
    ) -> Result<(), SceneError> {
        self.insert_child(group, node, InsertAt::After(sibling))
    }

    /// Remove `node` from `group`.
    ///
    /// Clears any input focus the node's stage holds on it or its descendants. Returns false
    /// if `node` is not a child of `group`.
    pub fn remove_child(&mut self, group: NodeId, node: NodeId) -> bool {
        let Some(state) = self.group_state_mut(group) else {
            return false;
        };
        if !state.children.remove(node) {
            return false;
        }
        self.release(node);
        log::trace!("removed {node:?} from {group:?}");
        self.notify_children_changed(group);
        true
    }

    /// Remove a node from its current parent. Returns false if it had none.
    pub fn detach(&mut self, node: NodeId) -> bool {
        match self.parent_of(node) {
            Some(parent) => self.remove_child(parent, node),
            None => false,
        }
    }

    /// Detach every child of `group`.
    pub fn clear_children(&mut self, group: NodeId) {
        let Some(state) = self.group_state_mut(group) else {
            return;
        };
        let children = state.children.take_all();
        for &child in &children {
            self.release(child);
        }
        log::trace!("cleared {} children of {group:?}", children.len());
        self.notify_children_changed(group);
    }

    /// Swap two children by index. Returns false if either index is out of bounds.
    pub fn swap_children(&mut self, group: NodeId, a: usize, b: usize) -> bool {
        let Some(state) = self.group_state_mut(group) else {
            return false;
        };
        if !state.children.swap(a, b) {
            return false;
        }
        log::trace!("swapped children {a} and {b} of {group:?}");
        self.notify_children_changed(group);
        true
    }

    /// Swap two children by identity. Returns false if either is not a child of `group`.
    pub fn swap_nodes(&mut self, group: NodeId, a: NodeId, b: NodeId) -> bool {
        let Some(state) = self.group_state(group) else {
            return false;
        };
        match (state.children.index_of(a), state.children.index_of(b)) {
            (Some(ia), Some(ib)) => self.swap_children(group, ia, ib),
            _ => false,
        }
    }

    // --- group settings ---

    /// Choose how a group positions its children when drawn.
    ///
    /// When enabled (the default), the batch transform is replaced by the group's world
    /// transform, which costs a batch flush before and after the children. When disabled,
    /// children are drawn with their positions temporarily offset by the group's position, which
    /// is only correct if the group itself is neither rotated nor scaled.
    pub fn set_transform_enabled(&mut self, group: NodeId, enabled: bool) {
        if let Some(state) = self.group_state_mut(group) {
            state.transform_enabled = enabled;
        }
    }

    /// Returns whether a group applies its transform to the batch.
    pub fn is_transform_enabled(&self, group: NodeId) -> Option<bool> {
        self.group_state(group).map(|g| g.transform_enabled)
    }

    /// Skip drawing children whose bounds lie completely outside `area`.
    ///
    /// `area` is in the group's local space. Only valid for unrotated, unscaled children;
    /// bounds are compared without their transforms.
    pub fn set_culling_area(&mut self, group: NodeId, area: Option<Rect>) {
        if let Some(state) = self.group_state_mut(group) {
            state.culling_area = area;
        }
    }

    /// Returns the culling area of a group.
    pub fn culling_area(&self, group: NodeId) -> Option<Rect> {
        self.group_state(group).and_then(|g| g.culling_area)
    }

    /// Return the world transform of a group as of its last transformed draw.
    ///
    /// The returned [`Affine`] maps the group's local space into root space, skipping
    /// ancestors that have transforms disabled.
    pub fn world_transform(&self, group: NodeId) -> Option<Affine> {
        self.group_state(group).map(|g| g.world_transform)
    }

    // --- coordinates ---

    /// Map a point in `child`'s parent space into `child`'s local space.
    pub fn to_child_local(&self, child: NodeId, parent_point: Point) -> Option<Point> {
        self.props(child).map(|props| to_child_local(props, parent_point))
    }

    /// Map a point in `ancestor`'s local space into `descendant`'s local space.
    pub fn to_descendant_local(
        &self,
        ancestor: NodeId,
        descendant: NodeId,
        point: Point,
    ) -> Result<Point, SceneError> {
        if !self.is_alive(descendant) {
            return Err(SceneError::StaleNode(descendant));
        }
        let mut chain: SmallVec<[NodeId; 8]> = SmallVec::new();
        let mut current = descendant;
        loop {
            chain.push(current);
            match self.parent_of(current) {
                Some(parent) if parent == ancestor => break,
                Some(parent) => current = parent,
                None => {
                    return Err(SceneError::NotADescendant {
                        ancestor,
                        node: descendant,
                    });
                }
            }
        }
        Ok(chain
            .iter()
            .rev()
            .fold(point, |p, &id| to_child_local(&self.node(id).props, p)))
    }

    // --- search and diagnostics ---

    /// Find a node by name in `root`'s subtree, `root` included.
    ///
    /// Direct children are checked before descending into child groups.
    pub fn find_by_name(&self, root: NodeId, name: &str) -> Option<NodeId> {
        if self.name(root) == Some(name) {
            return Some(root);
        }
        let children = self.children_of(root);
        if let Some(&child) = children.iter().find(|&&c| self.name(c) == Some(name)) {
            return Some(child);
        }
        children
            .iter()
            .filter(|&&c| self.is_group(c))
            .find_map(|&c| self.find_by_name(c, name))
    }

    /// Render `root`'s subtree as text, one node per line, indented one space per level.
    pub fn graph_to_string(&self, root: NodeId) -> String {
        let mut out = String::with_capacity(128);
        self.write_graph(&mut out, root, 0);
        out
    }

    fn write_graph(&self, out: &mut String, id: NodeId, level: usize) {
        let Some(node) = self.node_opt(id) else {
            return;
        };
        for _ in 0..level {
            out.push(' ');
        }
        match (&node.name, node.group.is_some()) {
            (Some(name), _) => out.push_str(name),
            (None, true) => {
                let _ = write!(out, "Group#{}", id.0);
            }
            (None, false) => {
                let _ = write!(out, "Leaf#{}", id.0);
            }
        }
        out.push('\n');
        for &child in self.children_of(id) {
            self.write_graph(out, child, level + 1);
        }
    }
}

impl Scene {
    // --- internals ---

    /// Access a node; panics if `id` is stale.
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        self.node_opt(id).expect("dangling NodeId")
    }

    /// Access a node mutably; panics if `id` is stale.
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.node_opt_mut(id).expect("dangling NodeId")
    }

    pub(crate) fn node_opt(&self, id: NodeId) -> Option<&Node> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        (n.generation == id.generation()).then_some(n)
    }

    pub(crate) fn node_opt_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.generation() {
            return None;
        }
        Some(n)
    }

    pub(crate) fn group_state(&self, id: NodeId) -> Option<&GroupState> {
        self.node_opt(id).and_then(|n| n.group.as_ref())
    }

    pub(crate) fn group_state_mut(&mut self, id: NodeId) -> Option<&mut GroupState> {
        self.node_opt_mut(id).and_then(|n| n.group.as_mut())
    }

    /// Returns true if `ancestor` is `node` or one of its ancestors. Stale ids end the walk.
    pub(crate) fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent_of(id);
        }
        false
    }

    /// Put a behavior back after a callback, unless the node died or got a new one.
    pub(crate) fn restore_behavior(&mut self, id: NodeId, behavior: Box<dyn Behavior>) {
        if let Some(n) = self.node_opt_mut(id)
            && n.behavior.is_none()
        {
            n.behavior = Some(behavior);
        }
    }

    fn notify_children_changed(&mut self, group: NodeId) {
        let Some(mut behavior) = self.node_opt_mut(group).and_then(|n| n.behavior.take()) else {
            return;
        };
        behavior.children_changed(self, group);
        self.restore_behavior(group, behavior);
    }

    fn check_attach(&self, group: NodeId, node: NodeId) -> Result<(), SceneError> {
        if !self.is_alive(node) {
            return Err(SceneError::StaleNode(node));
        }
        if !self.is_alive(group) {
            return Err(SceneError::StaleNode(group));
        }
        if !self.is_group(group) {
            return Err(SceneError::NotAGroup(group));
        }
        if self.is_ancestor_or_self(node, group) {
            return Err(SceneError::WouldCycle { group, node });
        }
        Ok(())
    }

    /// Resolve an insertion index as it will be once `node` is no longer a child of `group`.
    fn resolve_index(&self, group: NodeId, node: NodeId, at: InsertAt) -> Result<usize, SceneError> {
        let Some(state) = self.group_state(group) else {
            return Err(SceneError::NotAGroup(group));
        };
        let children = &state.children;
        let current = children.index_of(node);
        let len = children.len() - usize::from(current.is_some());
        match at {
            InsertAt::End => Ok(len),
            InsertAt::Index(index) if index <= len => Ok(index),
            InsertAt::Index(index) => Err(SceneError::IndexOutOfBounds { index, len }),
            InsertAt::Before(sibling) | InsertAt::After(sibling) => {
                let not_a_child = SceneError::NotAChild {
                    group,
                    node: sibling,
                };
                if sibling == node {
                    return Err(not_a_child);
                }
                let mut index = children.index_of(sibling).ok_or(not_a_child)?;
                if current.is_some_and(|c| c < index) {
                    index -= 1;
                }
                Ok(match at {
                    InsertAt::After(_) => index + 1,
                    _ => index,
                })
            }
        }
    }

    fn insert_child(&mut self, group: NodeId, node: NodeId, at: InsertAt) -> Result<(), SceneError> {
        self.check_attach(group, node)?;
        self.resolve_index(group, node, at)?;
        self.detach(node);
        // Hooks run by the detach may have restructured the group; resolve against the result.
        self.check_attach(group, node)?;
        let index = self.resolve_index(group, node, at)?;

        let stage = self.node(group).stage;
        if let Some(state) = self.group_state_mut(group) {
            state.children.insert(index, node);
        }
        self.node_mut(node).parent = Some(group);
        self.set_stage_recursive(node, stage);
        log::trace!("added {node:?} to {group:?} at {index}");
        self.notify_children_changed(group);
        Ok(())
    }

    /// Clear the parent and stage links of a node that has left its group's child list.
    fn release(&mut self, node: NodeId) {
        if let Some(stage) = self.stage_of(node) {
            self.unfocus(stage, node);
        }
        if let Some(n) = self.node_opt_mut(node) {
            n.parent = None;
        }
        self.set_stage_recursive(node, None);
    }

    fn set_stage_recursive(&mut self, id: NodeId, stage: Option<StageId>) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let Some(node) = self.node_opt_mut(id) else {
                continue;
            };
            node.stage = stage;
            if let Some(group) = &node.group {
                stack.extend_from_slice(group.children.as_slice());
            }
        }
    }
}
