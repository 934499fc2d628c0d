// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Scene: a hierarchical 2D scene graph built from ordered groups.
//!
//! A [`Scene`] is an arena of nodes. Leaves carry a [`Behavior`] that draws and hit tests them;
//! groups own an ordered list of children and position them in their own coordinate space.
//!
//! - Child order is z-order: later children are drawn on top and receive hits first.
//! - Each node has a position, origin, rotation (degrees), non-uniform scale, size, and alpha.
//!   Groups compose these into affine transforms down the hierarchy.
//! - Traversals ([`Scene::act`], [`Scene::draw`], [`Scene::hit`]) tolerate behaviors that
//!   restructure the scene while a pass is running.
//!
//! ## Drawing
//!
//! Drawing goes through the [`Batch`] trait: a sprite-batch style collaborator with
//! `begin`/`end`/`flush` and a settable [`BatchMatrix`]. A group with transforms enabled installs
//! its world transform on the batch while its children draw. A group with transforms disabled
//! keeps the batch matrix and offsets its children's positions instead, which is cheaper but
//! ignores the group's rotation and scale. Groups may also set a culling area to skip children
//! that lie outside it.
//!
//! [`RecordingBatch`] records every call and is useful for tests and headless tools.
//!
//! ## Coordinates
//!
//! [`coords::to_child_local`] maps a point from a node's parent space into the node's own space,
//! inverting exactly one level of transform. [`Scene::to_descendant_local`] applies it down a
//! chain of groups.
//!
//! ## Stages
//!
//! [`Scene::create_stage`] creates a root group that owns input focus (keyboard, scroll, and
//! touch) for the nodes attached under it. Removing a node clears any focus held on it or its
//! descendants.
//!
//! ## Example
//!
//! ```rust
//! use kurbo::{Point, Size};
//! use understory_scene::{Batch, NodeKind, NodeProps, RecordingBatch, Scene, SolidRect};
//!
//! let mut scene = Scene::new();
//! let stage = scene.create_stage();
//! let root = scene.stage_root(stage).unwrap();
//!
//! let panel = scene.insert(NodeKind::Group, NodeProps::at(Point::new(10.0, 10.0), Size::new(100.0, 100.0)));
//! let button = scene.insert(NodeKind::Leaf, NodeProps::at(Point::new(5.0, 5.0), Size::new(20.0, 10.0)));
//! scene.set_behavior(button, SolidRect);
//! scene.add_child(root, panel).unwrap();
//! scene.add_child(panel, button).unwrap();
//!
//! let mut batch = RecordingBatch::new();
//! batch.begin();
//! scene.draw(root, &mut batch, 1.0);
//! batch.end();
//! let draws: Vec<_> = batch.draws().collect();
//! assert_eq!(draws.len(), 1);
//!
//! assert_eq!(scene.hit_stage(stage, Point::new(20.0, 20.0)), Some(button));
//! assert_eq!(scene.hit_stage(stage, Point::new(50.0, 50.0)), Some(panel));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod batch;
mod behavior;
mod children;
pub mod coords;
mod error;
mod focus;
mod scene;
pub mod transform;
mod traverse;
mod types;
mod util;

pub use batch::{Batch, BatchMatrix, BatchOp, RecordingBatch};
pub use behavior::{Behavior, SolidRect};
pub use error::SceneError;
pub use scene::Scene;
pub use types::{NodeFlags, NodeId, NodeKind, NodeProps, StageId};
