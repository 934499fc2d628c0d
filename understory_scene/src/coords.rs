// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mapping points from a parent's space into a child's local space.

use kurbo::{Point, Vec2};

use crate::types::NodeProps;

/// Map `parent_point`, given in the child's parent space, into the child's local space.
///
/// This inverts exactly one level of [`local_transform`](crate::transform::local_transform):
/// the child's own position, origin, rotation, and scale. Ancestors are not involved; see
/// [`Scene::to_descendant_local`](crate::Scene::to_descendant_local) for walking a chain.
///
/// ```rust
/// use kurbo::{Point, Size};
/// use understory_scene::NodeProps;
/// use understory_scene::coords::to_child_local;
///
/// let child = NodeProps::at(Point::new(10.0, 10.0), Size::new(20.0, 20.0));
/// assert_eq!(to_child_local(&child, Point::new(15.0, 12.0)), Point::new(5.0, 2.0));
/// ```
pub fn to_child_local(child: &NodeProps, parent_point: Point) -> Point {
    let position = child.position;
    let origin = child.origin;
    let scale = child.scale;

    if child.rotation == 0.0 {
        if !child.has_scale() {
            return Point::new(parent_point.x - position.x, parent_point.y - position.y);
        }
        if !child.has_origin() {
            return Point::new(
                (parent_point.x - position.x) / scale.x,
                (parent_point.y - position.y) / scale.y,
            );
        }
        return Point::new(
            (parent_point.x - position.x - origin.x) / scale.x + origin.x,
            (parent_point.y - position.y - origin.y) / scale.y + origin.y,
        );
    }

    let Vec2 { x: cos, y: sin } = Vec2::from_angle(child.rotation.to_radians());

    // Where the child's local (0, 0) lands in parent space.
    let anchor = if child.has_origin() {
        let (fx, fy) = if child.has_scale() {
            (-origin.x * scale.x, -origin.y * scale.y)
        } else {
            (-origin.x, -origin.y)
        };
        Point::new(
            cos * fx - sin * fy + position.x + origin.x,
            sin * fx + cos * fy + position.y + origin.y,
        )
    } else {
        position
    };

    let tx = parent_point.x - anchor.x;
    let ty = parent_point.y - anchor.y;
    let local = Point::new(tx * cos + ty * sin, -tx * sin + ty * cos);
    if child.has_scale() {
        Point::new(local.x / scale.x, local.y / scale.y)
    } else {
        local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::local_transform;
    use kurbo::Size;

    const TOLERANCE: f64 = 1e-4;

    fn assert_near(a: Point, b: Point) {
        assert!(
            (a.x - b.x).abs() < TOLERANCE && (a.y - b.y).abs() < TOLERANCE,
            "{a:?} != {b:?}"
        );
    }

    fn assert_round_trip(props: NodeProps, parent_point: Point) {
        let local = to_child_local(&props, parent_point);
        assert_near(local_transform(&props) * local, parent_point);
    }

    #[test]
    fn identity_is_exact_subtraction() {
        let props = NodeProps::at(Point::new(0.1, 0.7), Size::new(1.0, 1.0));
        let p = Point::new(3.3, -9.1);
        assert_eq!(to_child_local(&props, p), Point::new(3.3 - 0.1, -9.1 - 0.7));
    }

    #[test]
    fn scale_without_origin() {
        let props = NodeProps {
            position: Point::new(10.0, 0.0),
            scale: Vec2::new(2.0, 4.0),
            ..NodeProps::default()
        };
        assert_eq!(
            to_child_local(&props, Point::new(14.0, 8.0)),
            Point::new(2.0, 2.0)
        );
    }

    #[test]
    fn scale_with_origin_keeps_origin_fixed() {
        let props = NodeProps {
            position: Point::new(10.0, 10.0),
            origin: Vec2::new(5.0, 5.0),
            scale: Vec2::new(2.0, 2.0),
            ..NodeProps::default()
        };
        assert_eq!(
            to_child_local(&props, Point::new(15.0, 15.0)),
            Point::new(5.0, 5.0)
        );
    }

    #[test]
    fn quarter_turn_without_origin() {
        let props = NodeProps {
            rotation: 90.0,
            ..NodeProps::default()
        };
        // A quarter turn maps local +x onto parent +y.
        assert_near(to_child_local(&props, Point::new(0.0, 1.0)), Point::new(1.0, 0.0));
    }

    #[test]
    fn round_trips_through_forward_transform() {
        assert_round_trip(
            NodeProps {
                position: Point::new(12.0, -3.0),
                rotation: 30.0,
                ..NodeProps::default()
            },
            Point::new(4.0, 7.5),
        );
        assert_round_trip(
            NodeProps {
                position: Point::new(12.0, -3.0),
                origin: Vec2::new(6.0, 2.0),
                rotation: -135.0,
                ..NodeProps::default()
            },
            Point::new(-20.0, 11.0),
        );
        assert_round_trip(
            NodeProps {
                position: Point::new(1.5, 2.5),
                rotation: 72.0,
                scale: Vec2::new(0.5, 3.0),
                ..NodeProps::default()
            },
            Point::new(9.0, 9.0),
        );
        assert_round_trip(
            NodeProps {
                position: Point::new(-40.0, 25.0),
                origin: Vec2::new(10.0, 30.0),
                rotation: 200.0,
                scale: Vec2::new(1.25, -2.0),
                ..NodeProps::default()
            },
            Point::new(3.0, -17.0),
        );
        assert_round_trip(
            NodeProps {
                position: Point::new(8.0, 8.0),
                origin: Vec2::new(2.0, 4.0),
                scale: Vec2::new(3.0, 0.25),
                ..NodeProps::default()
            },
            Point::new(0.0, 100.0),
        );
    }
}
