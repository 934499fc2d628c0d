// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Composition of node-local transforms into world transforms.
//!
//! Identity steps (zero origin, zero rotation, unit scale) are skipped rather than multiplied in,
//! so untransformed nodes produce matrices with exact coefficients at any depth.

use kurbo::{Affine, Vec2};

use crate::types::NodeProps;

/// Build the transform mapping a node's local space into its parent's space.
///
/// The result is `translate(position) * translate(origin) * rotate * scale * translate(-origin)`.
///
/// ```rust
/// use kurbo::{Affine, Point, Size, Vec2};
/// use understory_scene::NodeProps;
/// use understory_scene::transform::local_transform;
///
/// let props = NodeProps::at(Point::new(10.0, 20.0), Size::new(5.0, 5.0));
/// assert_eq!(local_transform(&props), Affine::translate(Vec2::new(10.0, 20.0)));
/// ```
pub fn local_transform(props: &NodeProps) -> Affine {
    let has_origin = props.has_origin();
    let mut local = if has_origin {
        Affine::translate(props.origin)
    } else {
        Affine::IDENTITY
    };
    if props.rotation != 0.0 {
        local *= Affine::rotate(props.rotation.to_radians());
    }
    if props.has_scale() {
        local *= Affine::scale_non_uniform(props.scale.x, props.scale.y);
    }
    if has_origin {
        local *= Affine::translate(-props.origin);
    }
    if props.position.x != 0.0 || props.position.y != 0.0 {
        local = local.then_translate(Vec2::new(props.position.x, props.position.y));
    }
    local
}

/// Compose a local transform with the world transform of the nearest transforming ancestor.
///
/// Without such an ancestor the local transform is already in world space.
pub fn compose(ancestor_world: Option<Affine>, local: Affine) -> Affine {
    match ancestor_world {
        Some(world) => world * local,
        None => local,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Point, Size};

    fn assert_near(a: Point, b: Point) {
        assert!(
            (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9,
            "{a:?} != {b:?}"
        );
    }

    #[test]
    fn untransformed_node_is_a_translation() {
        let props = NodeProps::at(Point::new(3.0, -4.0), Size::new(1.0, 1.0));
        assert_eq!(
            local_transform(&props),
            Affine::translate(Vec2::new(3.0, -4.0))
        );
        assert_eq!(local_transform(&NodeProps::default()), Affine::IDENTITY);
    }

    #[test]
    fn rotation_happens_around_origin() {
        let props = NodeProps {
            position: Point::new(100.0, 0.0),
            origin: Vec2::new(5.0, 5.0),
            rotation: 90.0,
            ..NodeProps::default()
        };
        let tf = local_transform(&props);
        // The origin itself is a fixed point of the rotation.
        assert_near(tf * Point::new(5.0, 5.0), Point::new(105.0, 5.0));
        // (10, 5) is 5 units along +x from the origin; a quarter turn moves it to +y.
        assert_near(tf * Point::new(10.0, 5.0), Point::new(105.0, 10.0));
    }

    #[test]
    fn scale_happens_around_origin() {
        let props = NodeProps {
            origin: Vec2::new(10.0, 10.0),
            scale: Vec2::new(2.0, 3.0),
            ..NodeProps::default()
        };
        let tf = local_transform(&props);
        assert_near(tf * Point::new(10.0, 10.0), Point::new(10.0, 10.0));
        assert_near(tf * Point::new(11.0, 11.0), Point::new(12.0, 13.0));
    }

    #[test]
    fn compose_without_ancestor_is_local() {
        let local = Affine::translate(Vec2::new(1.0, 2.0));
        assert_eq!(compose(None, local), local);
    }

    #[test]
    fn compose_applies_ancestor_last() {
        let ancestor = Affine::scale(2.0);
        let local = Affine::translate(Vec2::new(1.0, 0.0));
        let world = compose(Some(ancestor), local);
        assert_near(world * Point::ZERO, Point::new(2.0, 0.0));
    }
}
