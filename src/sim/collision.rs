//! Axis-aligned collision detection
//!
//! Every entity in a session is a rectangle for collision purposes, the ball
//! included (it collides through its bounding square). Bounds are inclusive:
//! two rectangles that only share an edge still collide.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle anchored at its top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner
    pub min: Vec2,
    /// Width and height (both positive)
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        debug_assert!(w > 0.0 && h > 0.0, "rect size must be positive");
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    /// Bottom-right corner
    #[inline]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    /// Inclusive overlap on both axes
    pub fn overlaps(&self, other: &Rect) -> bool {
        let lo = self.min.max(other.min);
        let hi = self.max().min(other.max());
        lo.x <= hi.x && lo.y <= hi.y
    }
}

/// Anything that occupies a rectangle in the play area
pub trait Bounded {
    fn bounds(&self) -> Rect;

    /// Check collision against another bounded entity
    fn collides<B: Bounded + ?Sized>(&self, other: &B) -> bool {
        self.bounds().overlaps(&other.bounds())
    }
}

impl Bounded for Rect {
    fn bounds(&self) -> Rect {
        *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_overlap_interior() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert!(a.collides(&b));
    }

    #[test]
    fn test_shared_edge_counts() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let right = Rect::new(10.0, 0.0, 4.0, 4.0);
        let below = Rect::new(3.0, 10.0, 4.0, 4.0);
        let corner = Rect::new(10.0, 10.0, 4.0, 4.0);
        assert!(a.collides(&right));
        assert!(a.collides(&below));
        assert!(a.collides(&corner));
    }

    #[test]
    fn test_separated() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(!a.collides(&Rect::new(10.5, 0.0, 4.0, 4.0)));
        assert!(!a.collides(&Rect::new(0.0, 10.5, 4.0, 4.0)));
        // Overlapping on x only
        assert!(!a.collides(&Rect::new(2.0, 20.0, 4.0, 4.0)));
    }

    #[test]
    fn test_containment() {
        // Small rect fully inside a large one: no edges cross
        let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
        let inner = Rect::new(40.0, 40.0, 5.0, 5.0);
        assert!(outer.collides(&inner));
        assert!(inner.collides(&outer));
    }

    fn rect_strategy() -> impl Strategy<Value = Rect> {
        (
            -1000.0f32..1000.0,
            -1000.0f32..1000.0,
            0.5f32..200.0,
            0.5f32..200.0,
        )
            .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
    }

    proptest! {
        #[test]
        fn collision_is_symmetric(a in rect_strategy(), b in rect_strategy()) {
            prop_assert_eq!(a.collides(&b), b.collides(&a));
        }

        #[test]
        fn rect_collides_with_itself(a in rect_strategy()) {
            prop_assert!(a.collides(&a));
        }
    }
}
