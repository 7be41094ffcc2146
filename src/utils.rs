use fastrand::Rng;
use ultraviolet::Vec2;

use crate::body::Body;
use crate::config::SimConfig;

/// Scatters `n` bodies at rest, uniformly over the simulated region, with masses
/// drawn from `[mass_min, mass_max)`. Ids are assigned from `first_id` upward.
pub fn scatter(rng: &mut Rng, n: usize, config: &SimConfig, first_id: u64) -> Vec<Body> {
    (0..n as u64)
        .map(|i| {
            let pos = Vec2::new(rng.f32() * config.width, rng.f32() * config.height);
            let mass = config.mass_min + rng.f32() * (config.mass_max - config.mass_min);
            Body::new(first_id + i, pos, Vec2::zero(), mass)
        })
        .collect()
}

/// Generates `n` bodies in a uniform disc around the center of the region, each
/// moving perpendicular to its radius. Handy for benchmarks that should stay
/// clustered for many steps.
pub fn uniform_disc(rng: &mut Rng, n: usize, config: &SimConfig, speed: f32) -> Vec<Body> {
    let center = config.boundary().center();
    let outer_radius = 0.45 * config.width.min(config.height);
    let inner_radius = outer_radius * 0.1;
    let t = inner_radius / outer_radius;

    (0..n as u64)
        .map(|i| {
            let a = rng.f32() * std::f32::consts::TAU;
            let (sin, cos) = a.sin_cos();

            // Uniform area distribution between the inner and outer radius.
            let r = rng.f32() * (1.0 - t * t) + t * t;
            let pos = center + Vec2::new(cos, sin) * outer_radius * r.sqrt();
            let vel = Vec2::new(sin, -cos) * speed;

            let mass = config.mass_min + rng.f32() * (config.mass_max - config.mass_min);
            Body::new(i, pos, vel, mass)
        })
        .collect()
}
