//! Axis-aligned box collision
//!
//! Colliders are decoupled from visual models: a box is just a world-space
//! center and a size. Rotation is never applied to colliders.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// World-space center
    pub center: Vec3,
    /// Full extent along each axis (width, height, depth)
    pub size: Vec3,
}

impl Aabb {
    pub fn new(center: Vec3, size: Vec3) -> Self {
        Self { center, size }
    }

    /// Top face height
    #[inline]
    pub fn top(&self) -> f32 {
        self.center.y + self.size.y / 2.0
    }

    /// Near (largest z) face
    #[inline]
    pub fn back(&self) -> f32 {
        self.center.z + self.size.z / 2.0
    }

    /// Overlap test on all three axes at once.
    ///
    /// Boxes that merely touch do not intersect.
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        let gap = (self.center - other.center).abs() * 2.0;
        let reach = self.size + other.size;
        gap.x < reach.x && gap.y < reach.y && gap.z < reach.z
    }

    /// Same box moved by `offset`
    #[inline]
    pub fn translated(&self, offset: Vec3) -> Self {
        Self {
            center: self.center + offset,
            size: self.size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_overlap_requires_every_axis() {
        let a = Aabb::new(Vec3::ZERO, Vec3::ONE);
        assert!(a.intersects(&Aabb::new(Vec3::new(0.5, 0.5, 0.5), Vec3::ONE)));
        // Overlaps on x and y but not z
        assert!(!a.intersects(&Aabb::new(Vec3::new(0.5, 0.5, 3.0), Vec3::ONE)));
    }

    #[test]
    fn test_touching_faces_do_not_collide() {
        let a = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let b = Aabb::new(Vec3::new(1.0, 0.0, 0.0), Vec3::ONE);
        assert!(!a.intersects(&b));
        let c = Aabb::new(Vec3::new(0.999, 0.0, 0.0), Vec3::ONE);
        assert!(a.intersects(&c));
    }

    #[test]
    fn test_rest_on_ground() {
        let ground = Aabb::new(Vec3::new(0.0, -2.0, 0.0), Vec3::new(10.0, 0.5, 200.0));
        assert_eq!(ground.top(), -1.75);
        assert_eq!(ground.back(), 100.0);
        let player = Aabb::new(Vec3::new(0.0, ground.top() + 0.5, 0.0), Vec3::ONE);
        // Resting exactly on top is contact, not overlap
        assert!(!player.intersects(&ground));
        assert!(player.translated(Vec3::new(0.0, -0.01, 0.0)).intersects(&ground));
    }

    fn arb_box() -> impl Strategy<Value = Aabb> {
        (
            -50.0f32..50.0,
            -50.0f32..50.0,
            -50.0f32..50.0,
            0.01f32..20.0,
            0.01f32..20.0,
            0.01f32..20.0,
        )
            .prop_map(|(x, y, z, w, h, d)| Aabb::new(Vec3::new(x, y, z), Vec3::new(w, h, d)))
    }

    proptest! {
        #[test]
        fn prop_collision_is_symmetric(a in arb_box(), b in arb_box()) {
            prop_assert_eq!(a.intersects(&b), b.intersects(&a));
        }

        #[test]
        fn prop_box_hits_itself(a in arb_box()) {
            prop_assert!(a.intersects(&a));
        }
    }
}
