//! Axis-aligned box collision
//!
//! Every collision in the game is a box test. Positions are top-left anchored
//! and y grows downward.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Whether a point lies inside the box (edges inclusive)
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }
}

/// Padded AABB overlap test
///
/// Padding shrinks the overlap region on each side, so a positive value gives
/// a forgiving margin against fast hazards.
#[inline]
pub fn check_collision(a: &Rect, b: &Rect, padding: f32) -> bool {
    a.x < b.x + b.width - padding
        && a.x + a.width > b.x + padding
        && a.y < b.y + b.height - padding
        && a.y + a.height > b.y + padding
}

/// Whether `a` meets `b` on the vertical axis (landing or head-bonk) rather
/// than from the side
///
/// The axis with the smaller penetration depth is the one to resolve. Ties
/// resolve horizontally.
pub fn is_vertical_collision(a: &Rect, b: &Rect) -> bool {
    let ca = a.center();
    let cb = b.center();

    let overlap_x = (a.width + b.width) / 2.0 - (ca.x - cb.x).abs();
    let overlap_y = (a.height + b.height) / 2.0 - (ca.y - cb.y).abs();

    overlap_y < overlap_x
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_overlap() {
        let player = Rect::new(0.0, 0.0, 50.0, 50.0);
        let obstacle = Rect::new(20.0, 20.0, 50.0, 50.0);
        assert!(check_collision(&player, &obstacle, 0.0));
    }

    #[test]
    fn test_no_overlap() {
        let player = Rect::new(0.0, 0.0, 50.0, 50.0);
        let obstacle = Rect::new(100.0, 100.0, 50.0, 50.0);
        assert!(!check_collision(&player, &obstacle, 0.0));
    }

    #[test]
    fn test_padding_shrinks_overlap() {
        // 10px of horizontal overlap
        let player = Rect::new(0.0, 0.0, 50.0, 50.0);
        let obstacle = Rect::new(40.0, 0.0, 50.0, 50.0);
        assert!(check_collision(&player, &obstacle, 0.0));
        assert!(!check_collision(&player, &obstacle, 15.0));
    }

    #[test]
    fn test_touching_edges_do_not_collide() {
        let a = Rect::new(0.0, 0.0, 50.0, 50.0);
        let b = Rect::new(50.0, 0.0, 50.0, 50.0);
        assert!(!check_collision(&a, &b, 0.0));
    }

    #[test]
    fn test_vertical_when_landing_on_top() {
        let player = Rect::new(100.0, 0.0, 50.0, 50.0);
        let platform = Rect::new(100.0, 50.0, 50.0, 50.0);
        assert!(is_vertical_collision(&player, &platform));
    }

    #[test]
    fn test_horizontal_when_hitting_side() {
        let player = Rect::new(100.0, 0.0, 50.0, 50.0);
        let wall = Rect::new(140.0, 0.0, 50.0, 50.0);
        assert!(!is_vertical_collision(&player, &wall));
    }

    #[test]
    fn test_tie_resolves_horizontally() {
        // Equal penetration on both axes
        let a = Rect::new(0.0, 0.0, 50.0, 50.0);
        let b = Rect::new(40.0, 40.0, 50.0, 50.0);
        assert!(!is_vertical_collision(&a, &b));
    }

    #[test]
    fn test_contains() {
        let r = Rect::new(10.0, 10.0, 40.0, 40.0);
        assert!(r.contains(30.0, 30.0));
        assert!(r.contains(50.0, 50.0));
        assert!(!r.contains(51.0, 30.0));
    }

    // Whole-pixel boxes keep the float comparisons exact
    fn rect_strategy() -> impl Strategy<Value = Rect> {
        (-500i32..500, -500i32..500, 1i32..200, 1i32..200)
            .prop_map(|(x, y, w, h)| Rect::new(x as f32, y as f32, w as f32, h as f32))
    }

    proptest! {
        #[test]
        fn prop_collision_is_symmetric(a in rect_strategy(), b in rect_strategy(), pad in 0i32..20) {
            let pad = pad as f32;
            prop_assert_eq!(check_collision(&a, &b, pad), check_collision(&b, &a, pad));
        }

        #[test]
        fn prop_padding_never_adds_hits(a in rect_strategy(), b in rect_strategy(), pad in 0i32..20) {
            let pad = pad as f32;
            if check_collision(&a, &b, pad) {
                prop_assert!(check_collision(&a, &b, 0.0));
            }
        }
    }
}
