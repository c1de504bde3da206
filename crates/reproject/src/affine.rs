//! A 2D affine transform and a canvas-style push/pop stack of them (spec.md §5), used
//! by the Rasterizer to compose a triangle's solved affine map with each source
//! image's translate/scale without a real canvas library underneath.

use crate::coord::Coord;
use crate::linsolve::AffineCoeffs;

/// `u = a00*x + a01*y + a02`, `v = a10*x + a11*y + a12`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    pub a00: f64,
    pub a01: f64,
    pub a02: f64,
    pub a10: f64,
    pub a11: f64,
    pub a12: f64,
}

impl AffineTransform {
    pub fn identity() -> Self {
        AffineTransform { a00: 1.0, a01: 0.0, a02: 0.0, a10: 0.0, a11: 1.0, a12: 0.0 }
    }

    pub fn from_coeffs(c: AffineCoeffs) -> Self {
        AffineTransform { a00: c.a00, a01: c.a01, a02: c.a02, a10: c.a10, a11: c.a11, a12: c.a12 }
    }

    pub fn translation(dx: f64, dy: f64) -> Self {
        AffineTransform { a00: 1.0, a01: 0.0, a02: dx, a10: 0.0, a11: 1.0, a12: dy }
    }

    pub fn scaling(sx: f64, sy: f64) -> Self {
        AffineTransform { a00: sx, a01: 0.0, a02: 0.0, a10: 0.0, a11: sy, a12: 0.0 }
    }

    pub fn apply(&self, p: Coord) -> Coord {
        Coord::new(self.a00 * p.x + self.a01 * p.y + self.a02, self.a10 * p.x + self.a11 * p.y + self.a12)
    }

    /// `self ∘ inner`: applying the result to a point is equivalent to applying
    /// `inner` first, then `self` — the same order `ctx.translate`/`ctx.scale` compose
    /// onto a canvas's current transform.
    pub fn compose(&self, inner: &AffineTransform) -> AffineTransform {
        AffineTransform {
            a00: self.a00 * inner.a00 + self.a01 * inner.a10,
            a01: self.a00 * inner.a01 + self.a01 * inner.a11,
            a02: self.a00 * inner.a02 + self.a01 * inner.a12 + self.a02,
            a10: self.a10 * inner.a00 + self.a11 * inner.a10,
            a11: self.a10 * inner.a01 + self.a11 * inner.a11,
            a12: self.a10 * inner.a02 + self.a11 * inner.a12 + self.a12,
        }
    }

    pub fn invert(&self) -> Option<AffineTransform> {
        let det = self.a00 * self.a11 - self.a01 * self.a10;
        if det.abs() < 1e-12 {
            return None;
        }
        let inv00 = self.a11 / det;
        let inv01 = -self.a01 / det;
        let inv10 = -self.a10 / det;
        let inv11 = self.a00 / det;
        let inv02 = -(inv00 * self.a02 + inv01 * self.a12);
        let inv12 = -(inv10 * self.a02 + inv11 * self.a12);
        Some(AffineTransform { a00: inv00, a01: inv01, a02: inv02, a10: inv10, a11: inv11, a12: inv12 })
    }

    /// The length a unit vector maps to on average — `sqrt(|det|)` — used to convert a
    /// length in one coordinate space into an approximate length in the other without
    /// favoring either axis of an anisotropic (oblique) map.
    pub fn isotropic_scale(&self) -> f64 {
        (self.a00 * self.a11 - self.a01 * self.a10).abs().sqrt()
    }
}

/// A minimal save/restore stack of [`AffineTransform`]s mirroring canvas-context
/// semantics, so the Rasterizer's push/pop discipline (spec.md §5: one push/pop per
/// triangle, one nested push/pop per source image) reads the same way a canvas-based
/// implementation would, without depending on an actual canvas crate.
pub struct TransformStack {
    stack: Vec<AffineTransform>,
}

impl TransformStack {
    pub fn new() -> Self {
        TransformStack { stack: vec![AffineTransform::identity()] }
    }

    pub fn push(&mut self) {
        let top = *self.stack.last().expect("transform stack is never empty");
        self.stack.push(top);
    }

    pub fn pop(&mut self) {
        self.stack.pop();
        debug_assert!(!self.stack.is_empty(), "popped the base transform off the stack");
    }

    pub fn current(&self) -> AffineTransform {
        *self.stack.last().expect("transform stack is never empty")
    }

    pub fn set_transform(&mut self, t: AffineTransform) {
        *self.stack.last_mut().expect("transform stack is never empty") = t;
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        let current = self.current();
        self.set_transform(current.compose(&AffineTransform::translation(dx, dy)));
    }

    pub fn scale(&mut self, sx: f64, sy: f64) {
        let current = self.current();
        self.set_transform(current.compose(&AffineTransform::scaling(sx, sy)));
    }
}

impl Default for TransformStack {
    fn default() -> Self {
        TransformStack::new()
    }
}
