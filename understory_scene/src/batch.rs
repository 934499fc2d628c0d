// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The rendering collaborator: a batch with begin/end/flush and a settable transform.

use alloc::vec::Vec;
use kurbo::{Affine, Rect};

use crate::util::transform_rect_bbox;

/// A 4×4 column-major matrix holding a 2D affine transform in a batch's transform slot.
///
/// Only the x/y rows and columns carry the affine coefficients; z passes through unchanged.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BatchMatrix(pub [f64; 16]);

impl BatchMatrix {
    /// The identity matrix.
    pub const IDENTITY: Self = Self([
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ]);

    /// Embed a 2D affine transform.
    pub fn from_affine(affine: Affine) -> Self {
        let [a, b, c, d, e, f] = affine.as_coeffs();
        Self([
            a, b, 0.0, 0.0, //
            c, d, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            e, f, 0.0, 1.0,
        ])
    }

    /// Extract the 2D affine part, dropping any z terms.
    pub fn to_affine(self) -> Affine {
        let m = self.0;
        Affine::new([m[0], m[1], m[4], m[5], m[12], m[13]])
    }
}

impl Default for BatchMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<Affine> for BatchMatrix {
    fn from(affine: Affine) -> Self {
        Self::from_affine(affine)
    }
}

/// Draw target used by [`Scene::draw`](crate::Scene::draw).
///
/// Groups with transforms enabled end the batch, install their world transform, and begin
/// again before drawing children; afterwards they restore the previous matrix the same way.
pub trait Batch {
    /// Start accepting draw calls.
    fn begin(&mut self);
    /// Submit pending draws and stop accepting draw calls.
    fn end(&mut self);
    /// Submit pending draws without ending the batch.
    fn flush(&mut self);
    /// The transform currently applied to draw calls.
    fn transform_matrix(&self) -> BatchMatrix;
    /// Replace the transform applied to subsequent draw calls.
    fn set_transform_matrix(&mut self, matrix: BatchMatrix);
    /// Draw a rectangle in the current transform's local space.
    fn draw_rect(&mut self, rect: Rect, alpha: f64);
}

/// One call observed by a [`RecordingBatch`].
#[derive(Clone, Debug, PartialEq)]
pub enum BatchOp {
    /// [`Batch::begin`].
    Begin,
    /// [`Batch::end`].
    End,
    /// [`Batch::flush`].
    Flush,
    /// [`Batch::set_transform_matrix`].
    SetTransform(BatchMatrix),
    /// [`Batch::draw_rect`], with the rectangle mapped through the transform in effect.
    Draw {
        /// Bounding box of the drawn rectangle in batch space.
        rect: Rect,
        /// Alpha passed to the draw call.
        alpha: f64,
    },
}

/// A headless [`Batch`] that records every call, for tests and tooling.
#[derive(Clone, Debug, Default)]
pub struct RecordingBatch {
    /// Recorded calls in order.
    pub ops: Vec<BatchOp>,
    transform: BatchMatrix,
    drawing: bool,
}

impl RecordingBatch {
    /// Create an empty recording batch with an identity transform.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the batch is between `begin` and `end`.
    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    /// Recorded draw calls as `(rect, alpha)` pairs.
    pub fn draws(&self) -> impl Iterator<Item = (Rect, f64)> + '_ {
        self.ops.iter().filter_map(|op| match op {
            BatchOp::Draw { rect, alpha } => Some((*rect, *alpha)),
            _ => None,
        })
    }
}

impl Batch for RecordingBatch {
    fn begin(&mut self) {
        self.drawing = true;
        self.ops.push(BatchOp::Begin);
    }

    fn end(&mut self) {
        self.drawing = false;
        self.ops.push(BatchOp::End);
    }

    fn flush(&mut self) {
        self.ops.push(BatchOp::Flush);
    }

    fn transform_matrix(&self) -> BatchMatrix {
        self.transform
    }

    fn set_transform_matrix(&mut self, matrix: BatchMatrix) {
        self.transform = matrix;
        self.ops.push(BatchOp::SetTransform(matrix));
    }

    fn draw_rect(&mut self, rect: Rect, alpha: f64) {
        let rect = transform_rect_bbox(self.transform.to_affine(), rect);
        self.ops.push(BatchOp::Draw { rect, alpha });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Point, Vec2};

    #[test]
    fn matrix_round_trips_affine() {
        let affine = Affine::translate(Vec2::new(3.0, 4.0)) * Affine::scale_non_uniform(2.0, 5.0);
        assert_eq!(BatchMatrix::from(affine).to_affine(), affine);
        assert_eq!(BatchMatrix::IDENTITY.to_affine(), Affine::IDENTITY);
    }

    #[test]
    fn matrix_translation_lives_in_last_column() {
        let m = BatchMatrix::from_affine(Affine::translate(Vec2::new(7.0, 9.0)));
        assert_eq!(m.0[12], 7.0);
        assert_eq!(m.0[13], 9.0);
        assert_eq!(m.0[15], 1.0);
    }

    #[test]
    fn recording_batch_maps_draws_through_transform() {
        let mut batch = RecordingBatch::new();
        batch.begin();
        batch.set_transform_matrix(Affine::translate(Vec2::new(10.0, 0.0)).into());
        batch.draw_rect(Rect::from_origin_size(Point::ZERO, (2.0, 2.0)), 0.5);
        batch.end();
        assert!(!batch.is_drawing());
        let draws: Vec<_> = batch.draws().collect();
        assert_eq!(draws, [(Rect::new(10.0, 0.0, 12.0, 2.0), 0.5)]);
    }
}
