pub mod body;
pub mod c_api;
pub mod config;
pub mod error;
pub mod geometry;
pub mod quadtree;
pub mod render;
pub mod simulation;
pub mod utils;

pub use body::{Body, ForceModel, exact_force, radius_for_mass};
pub use config::{OpeningCriterion, SimConfig, SizeMetric};
pub use error::SimError;
pub use geometry::{Point, Quadrant, Rectangle, VecExt};
pub use quadtree::{Node, PointMass, Quadtree};
pub use render::Renderer;
pub use simulation::{Injection, Simulation};
