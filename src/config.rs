//! Runtime configuration for the simulation.
//!
//! [`SimConfig`] carries every tunable of the engine: the force law constants,
//! the Barnes-Hut opening criterion, the body generation bounds and the
//! runtime toggles. All fields have defaults, so a host can deserialize a
//! partial document (or none at all) with `serde`:
//!
//! ```
//! use quadtree_gravity::SimConfig;
//!
//! let config = SimConfig { theta: 0.5, body_count: 200, ..SimConfig::default() };
//! assert!(config.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use crate::body::ForceModel;
use crate::error::SimError;
use crate::geometry::Rectangle;

/// Which extent of a node is compared against `theta * distance`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeMetric {
    /// Full boundary width (`2 * w`).
    #[default]
    Width,
    /// Boundary area (`2w * 2h`). Needs a much larger theta for the same accuracy.
    Area,
}

impl SizeMetric {
    pub fn size(self, boundary: &Rectangle) -> f32 {
        match self {
            SizeMetric::Width => boundary.width(),
            SizeMetric::Area => boundary.area(),
        }
    }
}

/// Barnes-Hut acceptance test: a node is approximated when `size < theta * distance`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OpeningCriterion {
    pub theta: f32,
    pub size: SizeMetric,
}

impl OpeningCriterion {
    pub fn new(theta: f32, size: SizeMetric) -> Self {
        Self { theta, size }
    }

    /// Whether a node with `boundary` seen from `distance` can be treated as one mass.
    pub fn accepts(&self, boundary: &Rectangle, distance: f32) -> bool {
        self.size.size(boundary) < self.theta * distance
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Width of the simulated region.
    pub width: f32,
    /// Height of the simulated region.
    pub height: f32,
    /// Gravitational constant.
    pub g: f32,
    /// Velocity magnitude clamp applied after each integration step.
    pub max_velocity: f32,
    /// Opening angle for the Barnes-Hut approximation.
    pub theta: f32,
    pub size_metric: SizeMetric,
    /// Points per quadtree leaf.
    pub capacity: usize,
    /// Bodies scattered at startup.
    pub body_count: usize,
    pub mass_min: f32,
    pub mass_max: f32,
    pub sun_mass: f32,
    /// Mass of bodies injected without an explicit mass.
    pub injected_body_mass: f32,
    /// Place a sun at the center on startup.
    pub default_sun: bool,
    pub use_barnes_hut: bool,
    pub gravity_enabled: bool,
    pub paused: bool,
    pub show_quadtree: bool,
    pub show_forces: bool,
    pub use_rainbow: bool,
    /// Seed for body generation; random when unset.
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 600.0,
            g: 0.35,
            max_velocity: 55.0,
            theta: 1.0,
            size_metric: SizeMetric::Width,
            capacity: 1,
            body_count: 0,
            mass_min: 25.0,
            mass_max: 50.0,
            sun_mass: 600.0,
            injected_body_mass: 25.0,
            default_sun: false,
            use_barnes_hut: true,
            gravity_enabled: true,
            paused: false,
            show_quadtree: true,
            show_forces: true,
            use_rainbow: true,
            seed: None,
        }
    }
}

impl SimConfig {
    /// Checks every numeric field for values that would corrupt the simulation.
    pub fn validate(&self) -> Result<(), SimError> {
        if !(self.width > 0.0 && self.height > 0.0)
            || !self.width.is_finite()
            || !self.height.is_finite()
        {
            return Err(SimError::InvalidExtent {
                width: self.width,
                height: self.height,
            });
        }
        if !(self.g.is_finite() && self.g >= 0.0) {
            return Err(SimError::InvalidGravity(self.g));
        }
        if !(self.theta.is_finite() && self.theta >= 0.0) {
            return Err(SimError::InvalidTheta(self.theta));
        }
        if !(self.max_velocity > 0.0) {
            return Err(SimError::InvalidVelocityClamp(self.max_velocity));
        }
        if self.capacity != 1 {
            return Err(SimError::UnsupportedCapacity(self.capacity));
        }
        for mass in [
            self.mass_min,
            self.mass_max,
            self.sun_mass,
            self.injected_body_mass,
        ] {
            validate_mass(mass)?;
        }
        if self.mass_min > self.mass_max {
            return Err(SimError::InvalidMassBounds {
                min: self.mass_min,
                max: self.mass_max,
            });
        }
        Ok(())
    }

    /// Root boundary of the quadtree, covering `[0, width) x [0, height)`.
    pub fn boundary(&self) -> Rectangle {
        Rectangle::from_extent(self.width, self.height)
    }

    /// The far clamp is `max(width, height)` applied to the *squared* distance,
    /// which keeps forces between far-apart bodies from vanishing.
    pub fn force_model(&self) -> ForceModel {
        ForceModel::new(self.g, self.width.max(self.height))
    }

    pub fn opening_criterion(&self) -> OpeningCriterion {
        OpeningCriterion::new(self.theta, self.size_metric)
    }
}

pub(crate) fn validate_mass(mass: f32) -> Result<(), SimError> {
    if mass > 0.0 && mass.is_finite() {
        Ok(())
    } else {
        Err(SimError::InvalidMass(mass))
    }
}
