//! Food bodies: cohort spawning, integration, bowl contact and soft-body
//! separation

use std::f32::consts::PI;

use glam::Vec2;
use rand::Rng;

use crate::catalog::{Ingredient, IngredientFamily};
use crate::centered;

use super::bowl::Bowl;
use super::cosmetics::{dust_color, sauce_color, sprinkle};
use super::fluid::MAX_COUPLED_VELOCITY;
use super::state::{CosmeticKind, CosmeticParticle, FoodParticle, FoodShape};

/// Horizontal spread of a fresh cohort
const SCATTER_X: f32 = 110.0;
const SCATTER_VX: f32 = 11.0;
/// Downward speed that sounds an impact when landing
pub const IMPACT_SPEED: f32 = 3.0;
/// Separation passes per frame
pub const SEPARATION_PASSES: usize = 2;

/// Drop one ingredient add into the pan.
///
/// Tracked families become food bodies sharing `instance_id`; sauces and
/// powders become short-lived splash or dust. Returns the number of food
/// bodies spawned.
pub fn spawn_cohort<R: Rng + ?Sized>(
    food: &mut Vec<FoodParticle>,
    cosmetics: &mut Vec<CosmeticParticle>,
    ingredient: &Ingredient,
    instance_id: u32,
    bowl: &Bowl,
    rng: &mut R,
) -> u32 {
    let profile = ingredient.family.profile();
    let spawn_y = bowl.center.y - 200.0 - rng.random::<f32>() * 50.0;
    let drop_speed = 8.0 + rng.random::<f32>() * 6.0;

    match ingredient.family {
        IngredientFamily::Liquid => {
            let color = sauce_color(&ingredient.id);
            sprinkle(cosmetics, CosmeticKind::Splash, profile.count, color, bowl.center.x, spawn_y, drop_speed, rng);
            return 0;
        }
        IngredientFamily::Dust => {
            let color = dust_color(&ingredient.id);
            sprinkle(cosmetics, CosmeticKind::Dust, profile.count, color, bowl.center.x, spawn_y, drop_speed, rng);
            return 0;
        }
        _ => {}
    }

    for _ in 0..profile.count {
        let shape = match ingredient.family {
            IngredientFamily::Egg => FoodShape::Blobs(std::array::from_fn(|_| {
                let offset = Vec2::new(centered(rng, 8.0), centered(rng, 8.0));
                (offset, 4.0 + rng.random::<f32>() * 4.0)
            })),
            IngredientFamily::Strand => {
                let (w, h) = cut(profile.width, profile.height, rng);
                FoodShape::Strand {
                    w,
                    h,
                    wave_phase: rng.random::<f32>() * PI * 2.0,
                    wave_amp: 0.3 + rng.random::<f32>() * 0.4,
                }
            }
            IngredientFamily::Shellfish => FoodShape::Curl { bend: 0.0 },
            _ if profile.width.is_some() => {
                let (w, h) = cut(profile.width, profile.height, rng);
                FoodShape::Rect { w, h }
            }
            _ => FoodShape::Round,
        };
        food.push(FoodParticle {
            ingredient: ingredient.id.clone(),
            family: ingredient.family,
            instance_id,
            cohort_size: profile.count,
            pos: Vec2::new(
                bowl.center.x + centered(rng, SCATTER_X),
                spawn_y - rng.random::<f32>() * 60.0,
            ),
            vel: Vec2::new(centered(rng, SCATTER_VX), drop_speed + centered(rng, 2.0)),
            rotation: rng.random::<f32>() * PI,
            rotation_speed: centered(rng, profile.spin),
            size: profile.size.0 + rng.random::<f32>() * profile.size.1,
            shape,
            spilled: false,
        });
    }
    profile.count
}

fn cut<R: Rng + ?Sized>(width: Option<(f32, f32)>, height: Option<(f32, f32)>, rng: &mut R) -> (f32, f32) {
    let (w0, w1) = width.unwrap_or((10.0, 0.0));
    let (h0, h1) = height.unwrap_or((10.0, 0.0));
    (w0 + rng.random::<f32>() * w1, h0 + rng.random::<f32>() * h1)
}

/// Gravity, shape animation and free flight for one frame
pub fn integrate(p: &mut FoodParticle, moving: bool, rest_line_y: f32, frames: f32) {
    p.vel.y += (0.8 + 0.08 * p.mass()) * frames;

    match &mut p.shape {
        FoodShape::Strand { wave_phase, .. } => {
            *wave_phase += frames * (2.0 + (p.vel.x + p.vel.y).abs() * 0.3);
        }
        FoodShape::Curl { bend } => {
            let target = ((p.vel.x - p.vel.y) * 0.04).clamp(-0.4, 0.4);
            *bend += (target - *bend) * 0.15 * frames;
        }
        _ => {}
    }

    if !moving {
        if p.vel.x.abs() < 0.15 {
            p.vel.x *= 0.9;
        }
        if p.vel.y.abs() < 0.15 && p.pos.y > rest_line_y {
            p.vel.y *= 0.9;
        }
    }

    p.pos += p.vel * frames;
    p.rotation += p.rotation_speed * frames;
}

/// Resolve contact with the bowl floor and walls.
///
/// Returns true on a hard landing worth an impact sound.
pub fn collide(p: &mut FoodParticle, bowl: &Bowl, wok_velocity: Vec2, moving: bool, frames: f32) -> bool {
    if p.spilled {
        p.vel.y += 0.8 * p.mass() * frames;
        return false;
    }

    let mass = p.mass();
    let contact = bowl.contact(p.pos, 5.0, p.size / 2.0);
    let mut impact = false;
    if contact.hit {
        impact = p.vel.y > IMPACT_SPEED;
        p.pos.y = contact.ground_y;
        if moving {
            p.vel.y *= -p.bounciness();
            p.vel.x *= 0.9;
            p.rotation_speed *= 0.8;
            p.vel.x -= contact.clamped_dx / contact.max_dx * (2.0 / mass);

            let coupled = wok_velocity.clamp(Vec2::splat(-MAX_COUPLED_VELOCITY), Vec2::splat(MAX_COUPLED_VELOCITY));
            p.vel.x += coupled.x * (0.15 / mass);
            p.vel.y += coupled.y * 0.3;
            p.vel.x += bowl.angle.sin() * (2.0 / mass);
        } else {
            p.vel.y = 0.0;
            p.vel.x *= 0.35;
            p.rotation_speed *= 0.9;
            if p.vel.x.abs() < 0.15 {
                p.vel.x = 0.0;
            }
        }
    }
    bowl.contain(&mut p.pos, &mut p.vel, 15.0, 150.0);
    impact
}

/// Push overlapping bodies apart.
///
/// At rest the push is biased vertically so piles stack; while the wok moves
/// bodies share velocity for an airy toss.
pub fn separate(food: &mut [FoodParticle], moving: bool) {
    for _ in 0..SEPARATION_PASSES {
        for i in 0..food.len() {
            let (head, tail) = food.split_at_mut(i + 1);
            let a = &mut head[i];
            for b in tail.iter_mut() {
                resolve_pair(a, b, moving);
            }
        }
    }
}

fn resolve_pair(a: &mut FoodParticle, b: &mut FoodParticle, moving: bool) {
    let delta = b.pos - a.pos;
    let dist_sq = delta.length_squared();
    let min_dist = (a.extent() + b.extent()) * 0.5 * if moving { 0.6 } else { 0.5 };
    if dist_sq >= min_dist * min_dist || dist_sq <= 0.01 {
        return;
    }

    let dist = dist_sq.sqrt();
    let stringy = a.is_strand() || b.is_strand();
    let soft = if stringy { 0.6 } else { 1.0 };
    let overlap = (min_dist - dist) * if moving { 0.4 } else { 0.08 } * soft;
    let mut n = delta / dist;
    if !moving && n.y.abs() < 0.7 {
        n.y = if n.y < 0.0 { -0.85 } else { 0.85 };
        n.x *= 0.25;
    }

    a.pos -= n * overlap;
    b.pos += n * overlap;

    if moving {
        let rel = b.vel - a.vel;
        let aeration = if stringy { 0.45 } else { 0.28 };
        a.vel += rel * aeration;
        b.vel -= rel * aeration;
    } else {
        let damp = if stringy { 0.6 } else { 0.5 };
        a.vel.x *= damp;
        b.vel.x *= damp;
        a.vel.y *= 0.85;
        b.vel.y *= 0.85;
    }
}
