//! Burner flames
//!
//! Emission scales with heat. Above the jet threshold the flame tightens into
//! a fast column with side jets. Flames are cosmetic and never feed back into
//! the cooking state.

use std::f32::consts::PI;

use glam::Vec2;
use rand::Rng;

use crate::centered;

use super::bowl::Bowl;
use super::state::{FireParticle, FlameLayer};

/// Heat at which the burner starts to jet
pub const JET_HEAT: f32 = 60.0;
/// No flames at or below this heat
pub const PILOT_HEAT: f32 = 5.0;

/// 0 below the jet threshold, 1 at full heat
pub fn jet_factor(heat: f32) -> f32 {
    if heat > JET_HEAT { ((heat - JET_HEAT) / 40.0).min(1.0) } else { 0.0 }
}

fn pick_layer<R: Rng + ?Sized>(rng: &mut R, back_chance: f64) -> FlameLayer {
    if rng.random_bool(back_chance) { FlameLayer::Back } else { FlameLayer::Front }
}

fn flame<R: Rng + ?Sized>(
    rng: &mut R,
    layer: FlameLayer,
    pos: Vec2,
    vel: Vec2,
    max_age: f32,
    size: f32,
    wobble_speed: f32,
) -> FireParticle {
    FireParticle {
        pos,
        vel,
        age: 0.0,
        max_age,
        size,
        layer,
        wobble_phase: rng.random::<f32>() * PI * 2.0,
        wobble_speed,
    }
}

/// Spawn this frame's flames, keeping the live count under `cap`
pub fn emit<R: Rng + ?Sized>(fire: &mut Vec<FireParticle>, heat: f32, cap: usize, bowl: &Bowl, rng: &mut R) {
    if heat <= PILOT_HEAT || fire.len() >= cap {
        return;
    }
    let budget = cap - fire.len();
    let intensity = ((heat - PILOT_HEAT) / 95.0).min(1.0);
    let is_jet = heat > JET_HEAT;
    let jf = jet_factor(heat);
    let c = bowl.center;
    let r = bowl.radius;

    // Ring around the rim
    let base_count = budget.min((intensity * 6.0).ceil() as usize + 1);
    for _ in 0..base_count {
        let angle = rng.random::<f32>() * PI;
        let offset = r + 2.0 + rng.random::<f32>() * 12.0;
        let layer = pick_layer(rng, 0.4);
        let vel = Vec2::new(centered(rng, 2.0), -2.5 - rng.random::<f32>() * 4.0 - jf * 6.0);
        let max_age = 8.0 + rng.random::<f32>() * 10.0 + jf * 6.0;
        let size = 4.0 + rng.random::<f32>() * 8.0 * intensity + jf * 5.0;
        let wobble = 0.15 + rng.random::<f32>() * 0.4;
        let pos = c + Vec2::new(angle.cos(), angle.sin()) * offset;
        fire.push(flame(rng, layer, pos, vel, max_age, size, wobble));
    }

    // Smaller tongues between the rim flames
    let inner_count = budget.saturating_sub(base_count).min((intensity * 4.0).ceil() as usize);
    for _ in 0..inner_count {
        let angle = rng.random::<f32>() * PI;
        let offset = r * (0.5 + rng.random::<f32>() * 0.5);
        let layer = pick_layer(rng, 0.6);
        let vel = Vec2::new(centered(rng, 1.2), -1.5 - rng.random::<f32>() * 2.5 - jf * 3.0);
        let max_age = 6.0 + rng.random::<f32>() * 8.0;
        let size = 3.0 + rng.random::<f32>() * 5.0 * intensity;
        let wobble = 0.2 + rng.random::<f32>() * 0.5;
        let pos = c + Vec2::new(angle.cos(), angle.sin()) * offset;
        fire.push(flame(rng, layer, pos, vel, max_age, size, wobble));
    }

    // Central column under the wok
    if heat > 30.0 {
        let jet_intensity = (heat - 30.0) / 70.0;
        let extra = if is_jet { (jf * 8.0).ceil() as usize } else { 0 };
        let jet_count = (budget >> 1).min((jet_intensity * 6.0).ceil() as usize + extra);
        for _ in 0..jet_count {
            let spread = if is_jet { 20.0 + (1.0 - jf) * 35.0 } else { 70.0 };
            let speed = 5.0 + jet_intensity * 6.0 + jf * 10.0;
            let layer = pick_layer(rng, 0.5);
            let pos = Vec2::new(c.x + centered(rng, spread), c.y + r + 3.0 + rng.random::<f32>() * 12.0);
            let vel = Vec2::new(
                centered(rng, if is_jet { 0.6 } else { 3.0 }),
                -speed - rng.random::<f32>() * 4.0,
            );
            let max_age = 8.0 + rng.random::<f32>() * 10.0 + jf * 8.0;
            let size = (3.0 + rng.random::<f32>() * 6.0) * (1.0 + jet_intensity * 0.8);
            let wobble = if is_jet {
                0.03 + rng.random::<f32>() * 0.08
            } else {
                0.15 + rng.random::<f32>() * 0.4
            };
            fire.push(flame(rng, layer, pos, vel, max_age, size, wobble));
        }
    }

    // Side jets along the walls
    if is_jet {
        let side_count = (budget >> 2).min((jf * 5.0).ceil() as usize);
        for _ in 0..side_count {
            let side = if rng.random_bool(0.5) { -1.0 } else { 1.0 };
            let pos = Vec2::new(
                c.x + side * r * (0.5 + rng.random::<f32>() * 0.5),
                c.y + r * 0.2 + rng.random::<f32>() * r * 0.6,
            );
            let vel = Vec2::new(
                -side * (1.5 + rng.random::<f32>() * 3.0) * jf,
                -6.0 - rng.random::<f32>() * 8.0 - jf * 8.0,
            );
            let max_age = 7.0 + rng.random::<f32>() * 8.0 + jf * 5.0;
            let size = 4.0 + rng.random::<f32>() * 5.0 + jf * 5.0;
            let wobble = 0.04 + rng.random::<f32>() * 0.06;
            fire.push(flame(rng, FlameLayer::Front, pos, vel, max_age, size, wobble));
        }
    }

    // Embers
    if heat > 50.0 {
        let ember_intensity = (heat - 50.0) / 50.0;
        let extra = if is_jet { (jf * 3.0).ceil() as usize } else { 0 };
        let ember_count = (budget >> 2).min((ember_intensity * 2.0).ceil() as usize + extra);
        for _ in 0..ember_count {
            let pos = Vec2::new(
                c.x + centered(rng, r * 1.2),
                c.y + r * 0.5 + rng.random::<f32>() * r * 0.5,
            );
            let vel = Vec2::new(centered(rng, 3.0), -10.0 - rng.random::<f32>() * 6.0 - jf * 10.0);
            let max_age = 10.0 + rng.random::<f32>() * 12.0;
            let size = 1.5 + rng.random::<f32>() * 2.0;
            let wobble = 0.3 + rng.random::<f32>() * 0.6;
            fire.push(flame(rng, FlameLayer::Front, pos, vel, max_age, size, wobble));
        }
    }
}

/// Move flames one frame and drop the expired ones
pub fn step(fire: &mut Vec<FireParticle>, heat: f32, bowl: &Bowl, frames: f32) {
    let jf = jet_factor(heat);
    let size_damp = 0.95f32.powf(frames);
    let vx_damp = (0.9 - jf * 0.15).powf(frames);
    let wobble_amp = (0.8 - jf * 0.5) * frames;
    let up_accel = (0.6 + jf * 0.8) * frames;
    let jet_accel = jf * 0.3 * frames;
    let r = bowl.radius;

    fire.retain_mut(|p| {
        if !p.is_alive() {
            return false;
        }
        p.vel.x += (p.age * p.wobble_speed + p.wobble_phase).sin() * wobble_amp;
        p.size *= size_damp;
        p.vel.y -= jet_accel;

        let dx = p.pos.x - bowl.center.x;
        if p.pos.y > bowl.center.y - 10.0 {
            // Below the rim: lick around the outside of the pan
            let r2 = r * r - dx * dx;
            if dx.abs() < r + 15.0 && r2 > 0.0 {
                let outer = bowl.center.y + r2.sqrt();
                p.vel.x += dx.signum() * 0.8 * frames;
                if p.pos.y < outer + 2.0 {
                    p.pos.y = outer + 2.0;
                    p.vel.y *= 0.8;
                }
            }
        } else {
            p.vel.y -= up_accel;
            p.vel.x *= vx_damp;
        }

        p.pos += p.vel * frames;
        p.age += frames;
        true
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_no_flames_at_pilot_heat() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut fire = Vec::new();
        emit(&mut fire, PILOT_HEAT, 200, &Bowl::at_rest(), &mut rng);
        assert!(fire.is_empty());
    }

    #[test]
    fn test_emission_grows_with_heat() {
        let bowl = Bowl::at_rest();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut low = Vec::new();
        emit(&mut low, 20.0, 200, &bowl, &mut rng);
        let mut high = Vec::new();
        emit(&mut high, 95.0, 200, &bowl, &mut rng);
        assert!(high.len() > low.len());
    }

    #[test]
    fn test_cap_is_respected() {
        let bowl = Bowl::at_rest();
        let mut rng = Pcg32::seed_from_u64(5);
        let mut fire = Vec::new();
        for _ in 0..500 {
            emit(&mut fire, 100.0, 80, &bowl, &mut rng);
            assert!(fire.len() <= 80);
            step(&mut fire, 100.0, &bowl, 1.0);
        }
    }

    #[test]
    fn test_flames_expire() {
        let bowl = Bowl::at_rest();
        let mut rng = Pcg32::seed_from_u64(5);
        let mut fire = Vec::new();
        emit(&mut fire, 90.0, 200, &bowl, &mut rng);
        assert!(!fire.is_empty());
        for _ in 0..60 {
            step(&mut fire, 90.0, &bowl, 1.0);
        }
        assert!(fire.is_empty());
    }

    #[test]
    fn test_jet_factor() {
        assert_eq!(jet_factor(50.0), 0.0);
        assert_eq!(jet_factor(80.0), 0.5);
        assert_eq!(jet_factor(100.0), 1.0);
    }
}
