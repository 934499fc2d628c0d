// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene groups: z-order, transforms, culling, and hit testing.
//!
//! This example builds a small stage with a rotated group and a culled toolbar, draws it into a
//! recording batch, and routes a few pointer positions to the topmost node under them.
//!
//! Run:
//! - `cargo run -p understory_demos --example scene_group_basics`

use kurbo::{Point, Rect, Size, Vec2};
use understory_scene::{
    Batch, BatchOp, Behavior, NodeId, NodeKind, NodeProps, RecordingBatch, Scene, SolidRect,
};

/// Counts structural changes so the example can show when the hook fires.
#[derive(Debug, Default)]
struct ChangeCounter(u32);

impl Behavior for ChangeCounter {
    fn children_changed(&mut self, scene: &mut Scene, group: NodeId) {
        self.0 += 1;
        println!(
            "  children of {} changed ({} so far), now {}",
            scene.name(group).unwrap_or("?"),
            self.0,
            scene.children_of(group).len()
        );
    }
}

fn rect(scene: &mut Scene, name: &str, x: f64, y: f64, w: f64, h: f64) -> NodeId {
    let id = scene.insert(
        NodeKind::Leaf,
        NodeProps::at(Point::new(x, y), Size::new(w, h)),
    );
    scene.set_name(id, name);
    scene.set_behavior(id, SolidRect);
    id
}

fn main() {
    let mut scene = Scene::new();
    let stage = scene.create_stage();
    let root = scene.stage_root(stage).expect("fresh stage has a root");
    scene.set_name(root, "root");

    // A toolbar drawn without its own transform, with a culling area the width of the screen.
    let toolbar = scene.insert(
        NodeKind::Group,
        NodeProps::at(Point::new(0.0, 0.0), Size::new(200.0, 20.0)),
    );
    scene.set_name(toolbar, "toolbar");
    scene.set_behavior(toolbar, ChangeCounter::default());
    scene.set_transform_enabled(toolbar, false);
    scene.set_culling_area(toolbar, Some(Rect::new(0.0, 0.0, 200.0, 20.0)));
    scene.add_child(root, toolbar).unwrap();

    println!("Building toolbar:");
    let open = rect(&mut scene, "open", 0.0, 0.0, 40.0, 20.0);
    let save = rect(&mut scene, "save", 40.0, 0.0, 40.0, 20.0);
    let offscreen = rect(&mut scene, "offscreen", 400.0, 0.0, 40.0, 20.0);
    scene.add_child(toolbar, open).unwrap();
    scene.add_child(toolbar, offscreen).unwrap();
    scene.add_child_before(toolbar, offscreen, save).unwrap();

    // A panel rotated a quarter turn around its center.
    let panel = scene.insert(
        NodeKind::Group,
        NodeProps {
            position: Point::new(50.0, 50.0),
            origin: Vec2::new(50.0, 50.0),
            rotation: 90.0,
            size: Size::new(100.0, 100.0),
            ..NodeProps::default()
        },
    );
    scene.set_name(panel, "panel");
    scene.add_child(root, panel).unwrap();
    let back = rect(&mut scene, "back", 0.0, 0.0, 100.0, 100.0);
    let badge = rect(&mut scene, "badge", 0.0, 0.0, 30.0, 10.0);
    scene.add_child(panel, back).unwrap();
    scene.add_child(panel, badge).unwrap();

    println!("\nScene graph:\n{}", scene.graph_to_string(root));

    let mut batch = RecordingBatch::new();
    batch.begin();
    scene.draw(root, &mut batch, 1.0);
    batch.end();
    let transforms = batch
        .ops
        .iter()
        .filter(|op| matches!(op, BatchOp::SetTransform(_)))
        .count();
    println!("Draw pass: {transforms} transform switches");
    for (rect, alpha) in batch.draws() {
        println!("  draw {rect:?} alpha={alpha}");
    }

    println!("\nHit tests:");
    for p in [
        Point::new(10.0, 10.0),
        Point::new(145.0, 55.0),
        Point::new(100.0, 100.0),
        Point::new(420.0, 10.0),
    ] {
        let hit = scene.hit_stage(stage, p);
        let label = hit.and_then(|id| scene.name(id)).unwrap_or("none");
        println!("  {p:?} -> {label}");
    }

    println!("\nMoving the badge below the backdrop:");
    scene.swap_nodes(panel, back, badge);
    let hit = scene.hit_stage(stage, Point::new(145.0, 55.0));
    println!(
        "  (145, 55) -> {}",
        hit.and_then(|id| scene.name(id)).unwrap_or("none")
    );

    let local = scene
        .to_descendant_local(root, badge, Point::new(145.0, 55.0))
        .unwrap();
    println!("  (145, 55) in badge space is {local:?}");

    println!("\nRemoving save:");
    scene.remove_child(toolbar, save);
    let names: Vec<_> = scene
        .children_of(toolbar)
        .iter()
        .filter_map(|&id| scene.name(id))
        .collect();
    println!("  toolbar children: {names:?}");
}
