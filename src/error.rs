use thiserror::Error;

/// Errors reported when configuring or feeding the simulation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("simulation extent must be positive and finite, got {width}x{height}")]
    InvalidExtent { width: f32, height: f32 },
    #[error("gravitational constant must be finite and non-negative, got {0}")]
    InvalidGravity(f32),
    #[error("opening angle theta must be finite and non-negative, got {0}")]
    InvalidTheta(f32),
    #[error("velocity clamp must be positive, got {0}")]
    InvalidVelocityClamp(f32),
    #[error("invalid mass {0}: masses must be positive and finite")]
    InvalidMass(f32),
    #[error("mass bounds are inverted: min {min} > max {max}")]
    InvalidMassBounds { min: f32, max: f32 },
    #[error("leaf capacity {0} is unsupported, only 1 is allowed")]
    UnsupportedCapacity(usize),
    #[error("position ({x}, {y}) is not finite")]
    InvalidPosition { x: f32, y: f32 },
}
