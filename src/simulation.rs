use fastrand::Rng;
use log::{debug, info};
use ultraviolet::Vec2;

use crate::{
    body::{Body, exact_force},
    config::{SimConfig, validate_mass},
    error::SimError,
    geometry::Point,
    quadtree::Quadtree,
    render::{self, Renderer},
    utils,
};

/// An entity added through [`Simulation::add_body`] or [`Simulation::add_sun`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Injection {
    Body(u64),
    Sun(u64),
}

/// Owns the simulation state and advances it one frame at a time.
#[derive(Debug)]
pub struct Simulation {
    config: SimConfig,
    /// Current frame count.
    frame: usize,
    /// Bodies affected by gravity.
    bodies: Vec<Body>,
    /// Fixed attractors: never inserted into the tree, never integrated.
    suns: Vec<Body>,
    /// Rebuilt from `bodies` at the start of every step.
    quadtree: Quadtree,
    /// Net force on each body from the last step, parallel to `bodies`.
    forces: Vec<Vec2>,
    history: Vec<Injection>,
    next_id: u64,
    rng: Rng,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::with_bodies(SimConfig::default(), Vec::new())
    }
}

impl Simulation {
    /// Validates `config`, then scatters `config.body_count` bodies and the optional default sun.
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        let mut sim = Self::with_bodies(config, Vec::new());
        sim.populate();
        info!(
            "simulation ready: {} bodies, {} suns, theta {}, {} mode",
            sim.bodies.len(),
            sim.suns.len(),
            sim.config.theta,
            sim.mode_name()
        );
        Ok(sim)
    }

    /// Builds a simulation over the given bodies without validating `config`
    /// or generating anything. Ids of later injections continue after the largest given id.
    pub fn with_bodies(config: SimConfig, bodies: Vec<Body>) -> Self {
        let rng = config.seed.map_or_else(Rng::new, Rng::with_seed);
        let quadtree = Quadtree::with_capacity(config.boundary(), config.capacity.max(1));
        let next_id = bodies.iter().map(|b| b.id + 1).max().unwrap_or(0);

        Self {
            config,
            frame: 0,
            bodies,
            suns: Vec::new(),
            quadtree,
            forces: Vec::new(),
            history: Vec::new(),
            next_id,
            rng,
        }
    }

    /// Replaces every body and sun with a freshly generated set and forgets the undo history.
    pub fn reset(&mut self) {
        self.bodies.clear();
        self.suns.clear();
        self.forces.clear();
        self.history.clear();
        self.frame = 0;
        self.populate();
    }

    fn populate(&mut self) {
        if self.config.default_sun {
            let center = self.config.boundary().center();
            let id = self.alloc_id();
            self.suns
                .push(Body::new(id, center, Vec2::zero(), self.config.sun_mass));
        }

        let n = self.config.body_count;
        let bodies = utils::scatter(&mut self.rng, n, &self.config, self.next_id);
        self.next_id += n as u64;
        self.bodies.extend(bodies);
    }

    fn alloc_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Advances the simulation by one frame.
    ///
    /// 1. Rebuilds the quadtree from current body positions.
    /// 2. Computes every body's net force against those pre-step positions.
    /// 3. Applies the forces and, unless paused, integrates every body.
    pub fn step(&mut self) {
        self.rebuild_index();

        self.forces = if self.config.gravity_enabled {
            self.bodies.iter().map(|b| self.net_force(b)).collect()
        } else {
            vec![Vec2::zero(); self.bodies.len()]
        };

        let paused = self.config.paused;
        for (body, force) in self.bodies.iter_mut().zip(&self.forces) {
            body.apply_force(*force, paused);
        }

        if !paused {
            let max_velocity = self.config.max_velocity;
            for body in &mut self.bodies {
                body.update(max_velocity);
            }
        }

        self.frame += 1;
        debug!(
            "frame {}: {} bodies, {} tree nodes, root mass {:.2}",
            self.frame,
            self.bodies.len(),
            self.quadtree.len(),
            self.quadtree.total_mass()
        );
    }

    /// Clears the quadtree and inserts every body. Bodies outside the region are left out.
    pub fn rebuild_index(&mut self) {
        self.quadtree.clear();
        let mut outside = 0usize;
        for body in &self.bodies {
            if !self.quadtree.insert(body.pos, body.mass) {
                outside += 1;
            }
        }
        if outside > 0 {
            debug!("{outside} bodies not indexed this frame");
        }
    }

    /// Net force on `body` from the suns plus either the tree or the exact pairwise sum.
    pub fn net_force(&self, body: &Body) -> Vec2 {
        let model = self.config.force_model();

        let from_suns = self
            .suns
            .iter()
            .fold(Vec2::zero(), |acc, sun| acc + sun.attraction_on(body, &model));

        let from_bodies = if self.config.use_barnes_hut {
            self.quadtree
                .calculate_force(body, &model, &self.config.opening_criterion())
        } else {
            exact_force(body, &self.bodies, &model)
        };

        from_suns + from_bodies
    }

    /// Hands bodies, suns, the tree wireframe and force lines to `renderer`.
    pub fn render(&self, renderer: &mut dyn Renderer) {
        if self.config.show_quadtree && self.config.use_barnes_hut {
            for node in self.quadtree.nodes() {
                renderer.draw_node(
                    &node.boundary,
                    node.depth,
                    !node.is_empty(),
                    render::depth_color(node.depth),
                );
            }
        }

        if self.config.show_forces {
            for (body, force) in self.bodies.iter().zip(&self.forces) {
                renderer.draw_force(body.pos, body.pos + *force);
            }
        }

        for body in &self.bodies {
            let color = render::body_color(body.id, self.config.use_rainbow);
            renderer.draw_body(body, color, render::point_size(body.mass, 2.0));
        }
        for sun in &self.suns {
            renderer.draw_sun(sun, render::SUN_COLOR, render::point_size(sun.mass, 0.25));
        }
    }

    /// Adds a body at rest at `pos`. Without `mass` the configured injection mass is used.
    pub fn add_body(&mut self, pos: Point, mass: Option<f32>) -> Result<u64, SimError> {
        let mass = mass.unwrap_or(self.config.injected_body_mass);
        validate_position(pos)?;
        validate_mass(mass)?;

        let id = self.alloc_id();
        self.bodies.push(Body::new(id, pos, Vec2::zero(), mass));
        self.history.push(Injection::Body(id));
        debug!("added body {id} at ({}, {})", pos.x, pos.y);
        Ok(id)
    }

    /// Adds a fixed sun of the configured mass at `pos`.
    pub fn add_sun(&mut self, pos: Point) -> Result<u64, SimError> {
        validate_position(pos)?;

        let id = self.alloc_id();
        self.suns
            .push(Body::new(id, pos, Vec2::zero(), self.config.sun_mass));
        self.history.push(Injection::Sun(id));
        debug!("added sun {id} at ({}, {})", pos.x, pos.y);
        Ok(id)
    }

    /// Removes the most recently injected entity. Returns `None` when nothing is left to undo.
    pub fn undo(&mut self) -> Option<Injection> {
        let last = self.history.pop()?;
        match last {
            Injection::Body(id) => {
                if let Some(i) = self.bodies.iter().rposition(|b| b.id == id) {
                    self.bodies.remove(i);
                    if i < self.forces.len() {
                        self.forces.remove(i);
                    }
                }
            }
            Injection::Sun(id) => self.suns.retain(|s| s.id != id),
        }
        debug!("undid {last:?}");
        Some(last)
    }

    pub fn set_barnes_hut(&mut self, enabled: bool) {
        self.config.use_barnes_hut = enabled;
    }

    pub fn toggle_barnes_hut(&mut self) -> bool {
        self.config.use_barnes_hut = !self.config.use_barnes_hut;
        info!("force mode: {}", self.mode_name());
        self.config.use_barnes_hut
    }

    pub fn toggle_gravity(&mut self) -> bool {
        self.config.gravity_enabled = !self.config.gravity_enabled;
        self.config.gravity_enabled
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.config.paused = !self.config.paused;
        self.config.paused
    }

    pub fn set_theta(&mut self, theta: f32) -> Result<(), SimError> {
        if !(theta.is_finite() && theta >= 0.0) {
            return Err(SimError::InvalidTheta(theta));
        }
        self.config.theta = theta;
        Ok(())
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn suns(&self) -> &[Body] {
        &self.suns
    }

    pub fn quadtree(&self) -> &Quadtree {
        &self.quadtree
    }

    /// Net forces from the last step, in the same order as [`Simulation::bodies`].
    /// Computed even while paused.
    pub fn forces(&self) -> &[Vec2] {
        &self.forces
    }

    pub fn history(&self) -> &[Injection] {
        &self.history
    }

    /// Mass-weighted mean position of all bodies (suns excluded).
    pub fn center_of_mass(&self) -> Vec2 {
        let (mass, weighted) = self
            .bodies
            .iter()
            .fold((0.0, Vec2::zero()), |(m, w), b| (m + b.mass, w + b.pos * b.mass));
        if mass > 0.0 { weighted / mass } else { Vec2::zero() }
    }

    pub fn total_momentum(&self) -> Vec2 {
        self.bodies
            .iter()
            .fold(Vec2::zero(), |acc, b| acc + b.vel * b.mass)
    }

    fn mode_name(&self) -> &'static str {
        if self.config.use_barnes_hut {
            "barnes-hut"
        } else {
            "pairwise"
        }
    }
}

fn validate_position(pos: Point) -> Result<(), SimError> {
    if pos.x.is_finite() && pos.y.is_finite() {
        Ok(())
    } else {
        Err(SimError::InvalidPosition { x: pos.x, y: pos.y })
    }
}
