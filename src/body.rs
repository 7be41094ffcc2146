use ultraviolet::Vec2;

use crate::geometry::{VecExt, constrain};

/// Interaction radius for a body of the given mass.
/// Used as the minimum-distance floor of the force law.
pub fn radius_for_mass(mass: f32) -> f32 {
    mass.sqrt() * 2.0
}

/// Newtonian attraction with both a near and a far distance clamp.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ForceModel {
    /// Gravitational constant.
    pub g: f32,
    /// Upper bound on the squared distance used in the denominator.
    pub max_distance_sq: f32,
}

impl ForceModel {
    pub fn new(g: f32, max_distance_sq: f32) -> Self {
        Self { g, max_distance_sq }
    }

    /// Force exerted on a mass at `target_pos` by a mass at `source_pos`.
    ///
    /// The squared separation is constrained into `[min_distance^2, max_distance_sq]`,
    /// with the floor winning when it exceeds the ceiling, and the magnitude is `g * m_target * m_source / distance_sq`, pointing from
    /// the target toward the source. Coincident positions yield the zero vector.
    pub fn force(
        &self,
        target_pos: Vec2,
        target_mass: f32,
        source_pos: Vec2,
        source_mass: f32,
        min_distance: f32,
    ) -> Vec2 {
        let dir = source_pos - target_pos;
        let distance_sq = constrain(
            dir.mag_sq(),
            min_distance * min_distance,
            self.max_distance_sq,
        );
        if distance_sq <= 0.0 {
            return Vec2::zero();
        }
        let strength = self.g * target_mass * source_mass / distance_sq;
        dir.set_mag(strength)
    }
}

/// A point mass in the simulation.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    /// Stable identity, only used to exclude a body from its own force sum.
    pub id: u64,
    /// Position vector.
    pub pos: Vec2,
    /// Velocity vector.
    pub vel: Vec2,
    /// Acceleration accumulator (reset after each update).
    pub acc: Vec2,
    /// Mass of the body.
    pub mass: f32,
    /// Interaction radius, `sqrt(mass) * 2`.
    pub radius: f32,
}

impl Body {
    /// Creates a new Body at rest acceleration; the radius is derived from `mass`.
    pub fn new(id: u64, pos: Vec2, vel: Vec2, mass: f32) -> Self {
        Self {
            id,
            pos,
            vel,
            acc: Vec2::zero(),
            mass,
            radius: radius_for_mass(mass),
        }
    }

    /// Accumulates `force / mass` into the acceleration. Does nothing while paused.
    pub fn apply_force(&mut self, force: Vec2, paused: bool) {
        if paused {
            return;
        }
        self.acc += force / self.mass;
    }

    /// Force this body exerts on `other`.
    pub fn attraction_on(&self, other: &Body, model: &ForceModel) -> Vec2 {
        model.force(
            other.pos,
            other.mass,
            self.pos,
            self.mass,
            self.radius + other.radius,
        )
    }

    /// Pulls `other` toward this body. Only `other` is affected; callers cover the
    /// reverse direction by iterating over ordered pairs.
    pub fn attract(&self, other: &mut Body, model: &ForceModel, paused: bool) {
        let force = self.attraction_on(other, model);
        other.apply_force(force, paused);
    }

    /// Explicit Euler step: velocity first, then position, then the velocity clamp.
    /// The acceleration accumulator is cleared afterwards.
    pub fn update(&mut self, max_velocity: f32) {
        self.vel += self.acc;
        self.pos += self.vel;
        self.vel = self.vel.limit(max_velocity);
        self.acc = Vec2::zero();
    }
}

/// Exact O(N) force on `target` from every other body in `bodies`.
pub fn exact_force(target: &Body, bodies: &[Body], model: &ForceModel) -> Vec2 {
    bodies
        .iter()
        .filter(|other| other.id != target.id)
        .fold(Vec2::zero(), |acc, other| acc + other.attraction_on(target, model))
}
