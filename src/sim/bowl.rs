//! Wok bowl geometry and contact tests
//!
//! The bowl is the lower half of a circle centered on the animated wok
//! position. Tilting the wok shears the floor by `tan(angle) * dx` so food
//! slides toward the low side.

use glam::Vec2;

use crate::consts::*;

/// Result of a bowl floor check
#[derive(Debug, Clone, Copy)]
pub struct BowlContact {
    /// Whether the body reached the floor
    pub hit: bool,
    /// Floor height under the body (y grows downward)
    pub ground_y: f32,
    /// Horizontal offset from the wok center, clamped inside the rim
    pub clamped_dx: f32,
    /// Clamp bound used for `clamped_dx`
    pub max_dx: f32,
}

impl BowlContact {
    pub fn miss() -> Self {
        Self {
            hit: false,
            ground_y: 0.0,
            clamped_dx: 0.0,
            max_dx: 1.0,
        }
    }
}

/// The wok bowl for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bowl {
    pub center: Vec2,
    pub radius: f32,
    /// Tilt in radians, positive tips the right side down
    pub angle: f32,
}

impl Default for Bowl {
    fn default() -> Self {
        Self::at_rest()
    }
}

impl Bowl {
    pub fn at_rest() -> Self {
        Self {
            center: Vec2::new(WOK_CENTER_X, WOK_CENTER_Y),
            radius: WOK_RADIUS,
            angle: 0.0,
        }
    }

    pub fn new(center: Vec2, angle: f32) -> Self {
        Self {
            center,
            radius: WOK_RADIUS,
            angle,
        }
    }

    /// Floor height under `x` for a body that sits `lift` above the surface.
    ///
    /// `inset` keeps the sample away from the vertical tangent at the rim.
    /// Returns `(ground_y, clamped_dx, max_dx)`.
    pub fn ground_y(&self, x: f32, inset: f32, lift: f32) -> (f32, f32, f32) {
        let max_dx = (self.radius - inset).max(1.0);
        let clamped_dx = (x - self.center.x).clamp(-max_dx, max_dx);
        let shear = self.angle.tan() * clamped_dx;
        let depth = (self.radius * self.radius - clamped_dx * clamped_dx).max(0.0).sqrt();
        (self.center.y + shear + depth - lift, clamped_dx, max_dx)
    }

    /// Check a body against the floor
    pub fn contact(&self, pos: Vec2, inset: f32, lift: f32) -> BowlContact {
        let (ground_y, clamped_dx, max_dx) = self.ground_y(pos.x, inset, lift);
        if pos.y < ground_y {
            return BowlContact::miss();
        }
        BowlContact {
            hit: true,
            ground_y,
            clamped_dx,
            max_dx,
        }
    }

    /// Past the rim by `margin` and below `center.y - above`
    pub fn is_outside_rim(&self, pos: Vec2, margin: f32, above: f32) -> bool {
        (pos.x - self.center.x).abs() > self.radius + margin && pos.y > self.center.y - above
    }

    /// Flat pool surface for a fluid of the given depth
    pub fn pool_surface_y(&self, lift: f32, depth: f32) -> f32 {
        self.center.y + self.radius - lift - depth
    }

    /// Keep a body inside the walls while it is below `center.y - height`.
    ///
    /// Returns true if the body was pushed back.
    pub fn contain(&self, pos: &mut Vec2, vel: &mut Vec2, inset: f32, height: f32) -> bool {
        if pos.y <= self.center.y - height {
            return false;
        }
        let left = self.center.x - self.radius + inset;
        let right = self.center.x + self.radius - inset;
        if pos.x < left {
            pos.x = left;
            vel.x *= -0.5;
            true
        } else if pos.x > right {
            pos.x = right;
            vel.x *= -0.5;
            true
        } else {
            false
        }
    }
}
