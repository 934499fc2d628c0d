// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the scene: node identifiers, flags, and per-node state.

use kurbo::{Point, Rect, Size, Vec2};

/// Identifier for a node in the scene (generational).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    pub(crate) const fn generation(self) -> u32 {
        self.1
    }
}

/// Identifier for a stage, the container that owns a root group and its input focus.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct StageId(pub(crate) u32);

impl StageId {
    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Node flags controlling drawing and hit testing.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// Node is visible. Invisible nodes are neither drawn nor hit.
        const VISIBLE   = 0b0000_0001;
        /// Node can be the target of a hit test.
        const TOUCHABLE = 0b0000_0010;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::TOUCHABLE
    }
}

/// Whether a node is a leaf or a group that owns children.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum NodeKind {
    /// A node without children. Drawing is delegated to its [`Behavior`](crate::Behavior).
    Leaf,
    /// A node that owns an ordered list of children and composes transforms for them.
    Group,
}

/// Positional state of a single node, expressed in its parent's coordinate space.
///
/// Transforms are applied in the order origin, rotation, scale, negated origin, position;
/// see [`local_transform`](crate::transform::local_transform).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeProps {
    /// Corner of the node's bounds with the smallest coordinates, in its parent's space.
    pub position: Point,
    /// Point in local space that rotation and scale are applied around.
    pub origin: Vec2,
    /// Rotation in degrees, turning the +x axis toward +y.
    pub rotation: f64,
    /// Non-uniform scale factors.
    pub scale: Vec2,
    /// Untransformed extent of the node.
    pub size: Size,
    /// Opacity, multiplied into the alpha handed to children when drawing.
    pub alpha: f64,
    /// Visibility and touchability flags.
    pub flags: NodeFlags,
}

impl Default for NodeProps {
    fn default() -> Self {
        Self {
            position: Point::ZERO,
            origin: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::new(1.0, 1.0),
            size: Size::ZERO,
            alpha: 1.0,
            flags: NodeFlags::default(),
        }
    }
}

impl NodeProps {
    /// Props for an untransformed node at `position` with the given `size`.
    pub fn at(position: Point, size: Size) -> Self {
        Self {
            position,
            size,
            ..Self::default()
        }
    }

    /// Returns true if the node has the [`NodeFlags::VISIBLE`] flag.
    pub fn is_visible(&self) -> bool {
        self.flags.contains(NodeFlags::VISIBLE)
    }

    /// Returns true if the node has the [`NodeFlags::TOUCHABLE`] flag.
    pub fn is_touchable(&self) -> bool {
        self.flags.contains(NodeFlags::TOUCHABLE)
    }

    /// Axis-aligned bounds in the parent's space, ignoring rotation and scale.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }

    /// Default hit test: a touchable node contains local points in `[0, width) x [0, height)`.
    pub fn contains_local(&self, local: Point) -> bool {
        self.is_touchable()
            && local.x >= 0.0
            && local.x < self.size.width
            && local.y >= 0.0
            && local.y < self.size.height
    }

    pub(crate) fn has_origin(&self) -> bool {
        self.origin.x != 0.0 || self.origin.y != 0.0
    }

    pub(crate) fn has_scale(&self) -> bool {
        self.scale.x != 1.0 || self.scale.y != 1.0
    }
}
