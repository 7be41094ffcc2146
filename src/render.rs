//! Drawing collaborator interface.
//!
//! The physics never draws. A host implements [`Renderer`] and passes it to
//! [`Simulation::render`](crate::Simulation::render) once per frame; every
//! method has an empty default so headless hosts only override what they need.

use ultraviolet::Vec2;

use crate::body::Body;
use crate::geometry::Rectangle;

pub type Rgb = [u8; 3];

pub const RAINBOW: [Rgb; 7] = [
    [255, 0, 0],
    [255, 165, 0],
    [255, 255, 0],
    [0, 128, 0],
    [0, 0, 255],
    [75, 0, 130],
    [238, 130, 238],
];

pub const BODY_COLOR: Rgb = [255, 0, 0];
pub const SUN_COLOR: Rgb = [255, 255, 0];

pub trait Renderer {
    /// `size` is the stroke weight suggested by [`point_size`].
    fn draw_body(&mut self, _body: &Body, _color: Rgb, _size: f32) {}

    fn draw_sun(&mut self, _sun: &Body, _color: Rgb, _size: f32) {}

    /// One quadtree cell; `occupied` is true when the subtree holds any mass.
    fn draw_node(&mut self, _boundary: &Rectangle, _depth: u32, _occupied: bool, _color: Rgb) {}

    /// Net force acting on a body, drawn from `from` to `to`.
    fn draw_force(&mut self, _from: Vec2, _to: Vec2) {}
}

/// Wireframe color for a tree node; deeper nodes are brighter.
pub fn depth_color(depth: u32) -> Rgb {
    let base = 10.0_f32;
    let scale = 1.8_f32.powi(depth as i32);
    let channel = |v: f32| v.floor().min(255.0) as u8;
    [channel(base * scale), channel(base * 0.1 * scale), channel(base * scale)]
}

pub fn body_color(id: u64, rainbow: bool) -> Rgb {
    if rainbow {
        RAINBOW[(id % RAINBOW.len() as u64) as usize]
    } else {
        BODY_COLOR
    }
}

/// Stroke weight for a body of `mass`, capped at 80.
pub fn point_size(mass: f32, scale: f32) -> f32 {
    (scale * mass / 10.0).clamp(0.0, 80.0)
}
