//! Flat sprite instances for any 2D drawing surface
//!
//! The simulation never draws. [`build_frame`] flattens the particle world
//! into back-to-front [`SpriteInstance`]s that a host can upload as-is
//! (see [`as_bytes`]) or walk on the CPU.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use rand::Rng;

use crate::catalog::{IngredientFamily, IngredientId};
use crate::sim::SimulationSession;
use crate::sim::choreography::ServeAnimation;
use crate::sim::cosmetics::{rgba, water_color};
use crate::sim::state::{FireParticle, FlameLayer, FoodParticle, FoodShape};

/// One quad on screen
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SpriteInstance {
    pub position: [f32; 2],
    /// Width and height (radius twice for round shapes)
    pub size: [f32; 2],
    pub rotation: f32,
    /// One of the [`shape`] ids
    pub shape: u32,
    /// Shape-specific: strand wave phase, curl bend, wok tilt
    pub param: f32,
    pub color: [f32; 4],
}

impl SpriteInstance {
    pub fn new(position: Vec2, size: Vec2, shape: u32, color: [f32; 4]) -> Self {
        Self {
            position: position.to_array(),
            size: size.to_array(),
            rotation: 0.0,
            shape,
            param: 0.0,
            color,
        }
    }

    pub fn rotated(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_param(mut self, param: f32) -> Self {
        self.param = param;
        self
    }
}

/// Shape ids understood by hosts
pub mod shape {
    pub const CIRCLE: u32 = 0;
    pub const RECT: u32 = 1;
    pub const STRAND: u32 = 2;
    pub const CURL: u32 = 3;
    pub const FLAME: u32 = 4;
    pub const WOK: u32 = 5;
    pub const PLATE: u32 = 6;
}

/// Colors for fixed scene elements
pub mod colors {
    use crate::sim::cosmetics::rgba;

    pub const WOK: [f32; 4] = rgba(40, 40, 44, 1.0);
    pub const PLATE: [f32; 4] = rgba(245, 245, 240, 1.0);
    pub const OIL: [f32; 4] = rgba(230, 190, 60, 0.7);
    pub const FLAME_CORE: [f32; 4] = rgba(255, 240, 180, 0.95);
    pub const FLAME_MID: [f32; 4] = rgba(255, 150, 30, 0.8);
    pub const FLAME_TIP: [f32; 4] = rgba(200, 40, 10, 0.3);
}

/// Raw, cooked and burnt colors for a family
pub fn palette(family: IngredientFamily) -> [[f32; 4]; 3] {
    use IngredientFamily::*;
    let (raw, cooked, burnt) = match family {
        Grain => ((250, 248, 235), (200, 140, 50), (28, 25, 22)),
        Egg => ((255, 228, 80), (240, 160, 30), (45, 35, 25)),
        SlicedMeat => ((160, 50, 50), (100, 55, 45), (22, 18, 16)),
        Cube => ((190, 55, 55), (150, 38, 38), (28, 18, 18)),
        Strand => ((250, 245, 230), (220, 185, 130), (45, 40, 35)),
        Shellfish => ((255, 180, 160), (240, 100, 80), (55, 35, 25)),
        Stalk => ((130, 215, 110), (95, 175, 75), (22, 32, 18)),
        Cap => ((125, 85, 65), (95, 55, 35), (22, 16, 12)),
        Flake => ((225, 45, 45), (185, 35, 35), (32, 12, 10)),
        Shred => ((95, 225, 95), (118, 165, 78), (32, 32, 22)),
        Clove => ((252, 248, 235), (225, 185, 110), (52, 32, 22)),
        Sliver | Liquid | Dust => ((245, 225, 160), (205, 165, 90), (42, 28, 18)),
    };
    let c = |(r, g, b): (u8, u8, u8)| rgba(r, g, b, 1.0);
    [c(raw), c(cooked), c(burnt)]
}

fn lerp_color(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
    let t = t.clamp(0.0, 1.0);
    std::array::from_fn(|i| a[i] + (b[i] - a[i]) * t)
}

/// Blend raw toward cooked by `cook`, then toward burnt by `burn` (both 0..=100)
pub fn food_color(family: IngredientFamily, cook: f32, burn: f32) -> [f32; 4] {
    let [raw, cooked, burnt] = palette(family);
    let done = lerp_color(raw, cooked, cook / 100.0);
    lerp_color(done, burnt, burn / 100.0)
}

/// Darken food by the sauces in the wok
pub fn sauce_tint(mut color: [f32; 4], contents: &[IngredientId]) -> [f32; 4] {
    for id in contents {
        let tint = match id.as_str() {
            "soy_sauce" => [0.8, 0.7, 0.5],
            "oyster_sauce" => [0.7, 0.6, 0.4],
            "xo_sauce" => [0.9, 0.6, 0.4],
            _ => continue,
        };
        for (channel, t) in color.iter_mut().zip(tint) {
            *channel *= t;
        }
    }
    color
}

fn push_food(out: &mut Vec<SpriteInstance>, p: &FoodParticle, color: [f32; 4], offset: Vec2) {
    let pos = p.pos + offset;
    match &p.shape {
        FoodShape::Round => {
            out.push(SpriteInstance::new(pos, Vec2::new(p.size, p.size * 0.7), shape::CIRCLE, color).rotated(p.rotation));
        }
        FoodShape::Rect { w, h } => {
            out.push(SpriteInstance::new(pos, Vec2::new(*w, *h), shape::RECT, color).rotated(p.rotation));
        }
        FoodShape::Blobs(blobs) => {
            for (blob_offset, r) in blobs {
                out.push(SpriteInstance::new(pos + *blob_offset, Vec2::splat(r * 2.0), shape::CIRCLE, color));
            }
        }
        FoodShape::Strand { w, h, wave_phase, wave_amp } => {
            out.push(
                SpriteInstance::new(pos, Vec2::new(*w, *h), shape::STRAND, color)
                    .rotated(p.rotation + wave_phase.sin() * wave_amp),
            );
        }
        FoodShape::Curl { bend } => {
            out.push(
                SpriteInstance::new(pos, Vec2::splat(p.size), shape::CURL, color)
                    .rotated(p.rotation)
                    .with_param(*bend),
            );
        }
    }
}

fn flame_color(p: &FireParticle) -> [f32; 4] {
    let t = p.age / p.max_age.max(1.0);
    if t < 0.4 {
        lerp_color(colors::FLAME_CORE, colors::FLAME_MID, t / 0.4)
    } else {
        lerp_color(colors::FLAME_MID, colors::FLAME_TIP, (t - 0.4) / 0.6)
    }
}

fn push_flames(out: &mut Vec<SpriteInstance>, fire: &[FireParticle], layer: FlameLayer, offset: Vec2) {
    out.extend(
        fire.iter()
            .filter(|p| p.layer == layer)
            .map(|p| SpriteInstance::new(p.pos + offset, Vec2::splat(p.size * 2.0), shape::FLAME, flame_color(p))),
    );
}

fn push_plate(out: &mut Vec<SpriteInstance>, anim: &ServeAnimation, offset: Vec2) {
    let plate = anim.plate_position() + offset;
    out.push(SpriteInstance::new(plate, Vec2::new(140.0, 24.0), shape::PLATE, colors::PLATE));
    for item in anim.plated_oil() {
        out.push(SpriteInstance::new(item.pos + offset, Vec2::splat(item.size * 2.0), shape::CIRCLE, colors::OIL));
    }
    for item in anim.plated_food() {
        let color = food_color(item.particle.family, 100.0, 0.0);
        push_food(out, &item.particle, color, offset);
    }
}

/// Flatten the session into back-to-front sprites.
///
/// `shake` is the camera offset for this frame (zero under reduced motion).
pub fn build_frame(session: &SimulationSession, shake: Vec2) -> Vec<SpriteInstance> {
    let engine = session.engine();
    let snap = session.snapshot();
    let mut out = Vec::with_capacity(
        engine.food().len() + engine.oil().len() + engine.water().len() + engine.fire().len() + engine.cosmetics().len() + 8,
    );

    push_flames(&mut out, engine.fire(), FlameLayer::Back, shake);

    let bowl = engine.bowl();
    out.push(
        SpriteInstance::new(bowl.center + shake, Vec2::splat(bowl.radius * 2.0), shape::WOK, colors::WOK)
            .with_param(bowl.angle),
    );

    for drop in engine.oil().particles() {
        out.push(SpriteInstance::new(drop.pos + shake, Vec2::splat(drop.size * 2.0), shape::CIRCLE, colors::OIL));
    }

    for p in engine.food() {
        let color = sauce_tint(food_color(p.family, snap.cook, snap.burn), &snap.contents);
        push_food(&mut out, p, color, shake);
    }

    let rinse = water_color(snap.water_dirtiness);
    for drop in engine.water().particles() {
        out.push(SpriteInstance::new(drop.pos + shake, Vec2::splat(drop.size * 2.0), shape::CIRCLE, rinse));
    }

    push_flames(&mut out, engine.fire(), FlameLayer::Front, shake);

    for c in engine.cosmetics() {
        let mut color = c.color;
        color[3] *= c.fade();
        out.push(SpriteInstance::new(c.pos + shake, Vec2::splat(c.size * 2.0), shape::CIRCLE, color));
    }

    if let Some(anim) = engine.serve_animation() {
        push_plate(&mut out, anim, shake);
    }
    out
}

/// Camera offset for this frame, zero when shake is off or motion is reduced
pub fn camera_shake<R: Rng + ?Sized>(session: &SimulationSession, rng: &mut R) -> Vec2 {
    if session.settings().effective_screen_shake() {
        session.engine().motion().shake_offset(rng)
    } else {
        Vec2::ZERO
    }
}

/// Raw bytes for a GPU instance buffer
pub fn as_bytes(sprites: &[SpriteInstance]) -> &[u8] {
    bytemuck::cast_slice(sprites)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::RENDER_DT;

    #[test]
    fn test_color_blend_endpoints() {
        let [raw, cooked, burnt] = palette(IngredientFamily::Grain);
        assert_eq!(food_color(IngredientFamily::Grain, 0.0, 0.0), raw);
        assert_eq!(food_color(IngredientFamily::Grain, 100.0, 0.0), cooked);
        assert_eq!(food_color(IngredientFamily::Grain, 100.0, 100.0), burnt);
        assert_eq!(food_color(IngredientFamily::Grain, 250.0, -5.0), cooked);
    }

    #[test]
    fn test_sauces_darken() {
        let white = [1.0, 1.0, 1.0, 1.0];
        let tinted = sauce_tint(white, &["rice".into(), "soy_sauce".into()]);
        assert_eq!(tinted, [0.8, 0.7, 0.5, 1.0]);
        assert_eq!(sauce_tint(white, &["wine".into()]), white);
    }

    #[test]
    fn test_sprite_layout_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<SpriteInstance>(), 44);
        let sprites = [SpriteInstance::new(Vec2::ONE, Vec2::ONE, shape::RECT, [1.0; 4])];
        assert_eq!(as_bytes(&sprites).len(), 44);
    }

    #[test]
    fn test_reduced_motion_stills_the_camera() {
        let settings = crate::Settings {
            reduced_motion: true,
            ..crate::Settings::default()
        };
        let session = SimulationSession::new(crate::Catalog::standard(), settings);
        let mut rng = rand_pcg::Pcg32::new(1, 1);
        assert_eq!(camera_shake(&session, &mut rng), Vec2::ZERO);
    }

    #[test]
    fn test_frame_contains_every_food_body() {
        let mut session = SimulationSession::with_defaults();
        session.add_ingredient("egg").unwrap();
        session.add_ingredient("beef").unwrap();
        session.render(RENDER_DT);
        let sprites = build_frame(&session, Vec2::ZERO);
        let food = sprites
            .iter()
            .filter(|s| s.shape == shape::CIRCLE || s.shape == shape::RECT)
            .count();
        // Egg curds draw as three blobs each
        assert!(food >= 15 * 3 + 8);
        assert_eq!(sprites.iter().filter(|s| s.shape == shape::WOK).count(), 1);
    }
}
