//! Decorative particles: smoke, bubbles, sauce splash, powder dust, sparkles

use glam::Vec2;
use rand::Rng;

use crate::catalog::IngredientId;
use crate::centered;
use crate::consts::*;

use super::bowl::Bowl;
use super::state::{CosmeticKind, CosmeticParticle};

/// 8-bit RGBA to linear floats
pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> [f32; 4] {
    [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a]
}

pub const SMOKE_COLOR: [f32; 4] = rgba(30, 30, 30, 0.8);
pub const OIL_SMOKE_COLOR: [f32; 4] = rgba(180, 180, 190, 0.6);
pub const BUBBLE_COLOR: [f32; 4] = rgba(255, 255, 255, 0.6);
pub const TRASHED_FOOD_COLOR: [f32; 4] = rgba(80, 60, 40, 0.7);
pub const TRASHED_OIL_COLOR: [f32; 4] = rgba(200, 160, 40, 0.6);

/// Drop color for a sauce
pub fn sauce_color(id: &IngredientId) -> [f32; 4] {
    match id.as_str() {
        "soy_sauce" => rgba(50, 25, 10, 0.8),
        "wine" => rgba(200, 120, 20, 0.7),
        "xo_sauce" => rgba(180, 60, 10, 0.9),
        _ => rgba(20, 10, 5, 0.9),
    }
}

/// Grain color for a powder
pub fn dust_color(id: &IngredientId) -> [f32; 4] {
    match id.as_str() {
        "sugar" => rgba(240, 240, 245, 0.8),
        "five_spice" => rgba(139, 69, 19, 0.8),
        "white_pepper" => rgba(220, 220, 210, 0.8),
        _ => rgba(255, 255, 255, 0.9),
    }
}

/// Rinse water tinted by how much grime it carries (0..=100)
pub fn water_color(dirtiness: f32) -> [f32; 4] {
    let d = (dirtiness / 100.0).clamp(0.0, 1.0);
    [
        (34.0 + d * 100.0).floor() / 255.0,
        (211.0 - d * 100.0).floor() / 255.0,
        (238.0 - d * 180.0).floor() / 255.0,
        0.8,
    ]
}

fn puff(kind: CosmeticKind, pos: Vec2, vel: Vec2, max_life: f32, size: f32, color: [f32; 4]) -> CosmeticParticle {
    CosmeticParticle {
        kind,
        pos,
        vel,
        life: 0.0,
        max_life,
        size,
        color,
    }
}

/// A shower of drops or grains falling into the pan from `origin_y`
#[allow(clippy::too_many_arguments)]
pub fn sprinkle<R: Rng + ?Sized>(
    out: &mut Vec<CosmeticParticle>,
    kind: CosmeticKind,
    count: u32,
    color: [f32; 4],
    center_x: f32,
    origin_y: f32,
    drop_speed: f32,
    rng: &mut R,
) {
    let (height, drift, jitter, life, size) = match kind {
        CosmeticKind::Dust => (40.0, 5.0, 3.0, (30.0, 20.0), (1.0, 2.0)),
        _ => (30.0, 4.0, 2.0, (20.0, 10.0), (3.0, 4.0)),
    };
    for _ in 0..count {
        let pos = Vec2::new(center_x + centered(rng, 110.0), origin_y - rng.random::<f32>() * height);
        let vel = Vec2::new(centered(rng, drift), drop_speed + centered(rng, jitter));
        let max_life = life.0 + rng.random::<f32>() * life.1;
        let size = size.0 + rng.random::<f32>() * size.1;
        out.push(puff(kind, pos, vel, max_life, size, color));
    }
}

/// Fling a point outward as a splash (trash and clean throws)
#[allow(clippy::too_many_arguments)]
pub fn fling<R: Rng + ?Sized>(
    out: &mut Vec<CosmeticParticle>,
    pos: Vec2,
    speed: (f32, f32),
    lift: (f32, f32),
    max_life: (f32, f32),
    size: f32,
    color: [f32; 4],
    rng: &mut R,
) {
    let vel = Vec2::new(
        speed.0 + rng.random::<f32>() * speed.1,
        -lift.0 - rng.random::<f32>() * lift.1,
    );
    let max_life = max_life.0 + rng.random::<f32>() * max_life.1;
    out.push(puff(CosmeticKind::Splash, pos, vel, max_life, size, color));
}

/// Per-frame ambient emission: cooking smoke, oil smoke and boiling bubbles
#[allow(clippy::too_many_arguments)]
pub fn emit_ambient<R: Rng + ?Sized>(
    out: &mut Vec<CosmeticParticle>,
    heat: f32,
    has_food: bool,
    has_oil: bool,
    has_water: bool,
    smoke_enabled: bool,
    bowl: &Bowl,
    rng: &mut R,
) {
    let c = bowl.center;
    let r = bowl.radius;

    if smoke_enabled && heat > 40.0 && has_food && rng.random::<f32>() < heat / 100.0 * 0.4 {
        let pos = Vec2::new(c.x + centered(rng, r), c.y + 20.0 + rng.random::<f32>() * 40.0);
        let vel = Vec2::new(centered(rng, 0.5), -1.0 - rng.random::<f32>() * 2.0);
        let max_life = 40.0 + rng.random::<f32>() * 30.0;
        let size = 6.0 + rng.random::<f32>() * 8.0;
        out.push(puff(CosmeticKind::Smoke, pos, vel, max_life, size, SMOKE_COLOR));
    }

    if smoke_enabled && heat > 40.0 && has_oil {
        let intensity = (heat - 40.0) / 60.0;
        let chance = 0.1 + intensity * 0.6;
        let count = if rng.random::<f32>() < chance { (intensity * 3.0).ceil() as u32 } else { 0 };
        for _ in 0..count {
            let pos = Vec2::new(c.x + centered(rng, r * 0.9), c.y + rng.random::<f32>() * 35.0);
            let vel = Vec2::new(
                centered(rng, 0.8 + intensity),
                -0.8 - rng.random::<f32>() * (1.5 + intensity * 3.0),
            );
            let max_life = 40.0 + rng.random::<f32>() * 30.0 + intensity * 20.0;
            let size = 6.0 + rng.random::<f32>() * 8.0 + intensity * 8.0;
            out.push(puff(CosmeticKind::OilSmoke, pos, vel, max_life, size, OIL_SMOKE_COLOR));
        }
    }

    if has_water && heat > 60.0 && rng.random::<f32>() < 0.3 {
        let pos = Vec2::new(c.x + centered(rng, 60.0), c.y + r - 20.0);
        let vel = Vec2::new(centered(rng, 1.0), -1.0 - rng.random::<f32>() * 2.0);
        let max_life = 20.0 + rng.random::<f32>() * 15.0;
        let size = 2.0 + rng.random::<f32>() * 3.0;
        out.push(puff(CosmeticKind::Bubble, pos, vel, max_life, size, BUBBLE_COLOR));
    }
}

/// Move every cosmetic one frame and drop the expired ones
pub fn step(particles: &mut Vec<CosmeticParticle>, frames: f32) {
    let smoke_damp = 0.98f32.powf(frames);
    particles.retain_mut(|p| {
        if !p.is_alive() {
            return false;
        }
        match p.kind {
            CosmeticKind::Smoke | CosmeticKind::OilSmoke => {
                p.vel.y -= 0.03 * frames;
                p.vel.x *= smoke_damp;
            }
            CosmeticKind::Splash | CosmeticKind::Dust => p.vel.y += 0.4 * frames,
            CosmeticKind::Sparkle => p.vel.y += 0.3 * frames,
            CosmeticKind::Bubble => {}
        }
        p.pos += p.vel * frames;
        p.life += frames;
        p.pos.y < CANVAS_HEIGHT + 200.0
    });
}
