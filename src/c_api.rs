//! C ABI for rendering hosts. Every handle comes from [`Simulation_Create`] and
//! must be released with [`Simulation_Destroy`]. Pointers returned by the
//! getters stay valid until the next mutating call on the same handle.

use crate::{
    body::Body,
    config::SimConfig,
    quadtree::Node,
    simulation::{Injection, Simulation},
};
use ultraviolet::Vec2;

/// Creates a simulation with default configuration and `n` scattered bodies.
/// Returns null if the configuration is rejected.
#[unsafe(no_mangle)]
pub extern "C" fn Simulation_Create(n: usize, seed: u64) -> *mut Simulation {
    let config = SimConfig {
        body_count: n,
        seed: Some(seed),
        ..SimConfig::default()
    };
    match Simulation::new(config) {
        Ok(sim) => Box::into_raw(Box::new(sim)),
        Err(err) => {
            log::error!("Simulation_Create: {err}");
            std::ptr::null_mut()
        }
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_Destroy(handle: *mut Simulation) {
    if !handle.is_null() {
        unsafe { drop(Box::from_raw(handle)) };
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_Step(handle: *mut Simulation) {
    if let Some(sim) = unsafe { handle.as_mut() } {
        sim.step();
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_Reset(handle: *mut Simulation) {
    if let Some(sim) = unsafe { handle.as_mut() } {
        sim.reset();
    }
}

/// Adds a body; a non-positive `mass` selects the configured default.
/// Returns the new id, or -1 on invalid input.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_AddBody(
    handle: *mut Simulation,
    x: f32,
    y: f32,
    mass: f32,
) -> i64 {
    let Some(sim) = (unsafe { handle.as_mut() }) else {
        return -1;
    };
    let mass = (mass > 0.0).then_some(mass);
    sim.add_body(Vec2::new(x, y), mass)
        .map_or(-1, |id| id as i64)
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_AddSun(handle: *mut Simulation, x: f32, y: f32) -> i64 {
    let Some(sim) = (unsafe { handle.as_mut() }) else {
        return -1;
    };
    sim.add_sun(Vec2::new(x, y)).map_or(-1, |id| id as i64)
}

/// Undoes the last injection: returns 1 for a body, 2 for a sun, 0 if nothing was undone.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_Undo(handle: *mut Simulation) -> u8 {
    match unsafe { handle.as_mut() }.and_then(Simulation::undo) {
        Some(Injection::Body(_)) => 1,
        Some(Injection::Sun(_)) => 2,
        None => 0,
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_SetBarnesHut(handle: *mut Simulation, enabled: bool) {
    if let Some(sim) = unsafe { handle.as_mut() } {
        sim.set_barnes_hut(enabled);
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_ToggleGravity(handle: *mut Simulation) -> bool {
    unsafe { handle.as_mut() }.is_some_and(Simulation::toggle_gravity)
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_TogglePause(handle: *mut Simulation) -> bool {
    unsafe { handle.as_mut() }.is_some_and(Simulation::toggle_pause)
}

/// Returns false if `theta` is rejected.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_SetTheta(handle: *mut Simulation, theta: f32) -> bool {
    unsafe { handle.as_mut() }.is_some_and(|sim| sim.set_theta(theta).is_ok())
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_GetBodyCount(handle: *const Simulation) -> usize {
    unsafe { handle.as_ref() }.map_or(0, |sim| sim.bodies().len())
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_GetBodies(handle: *const Simulation) -> *const Body {
    unsafe { handle.as_ref() }.map_or(std::ptr::null(), |sim| sim.bodies().as_ptr())
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_GetSunCount(handle: *const Simulation) -> usize {
    unsafe { handle.as_ref() }.map_or(0, |sim| sim.suns().len())
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_GetSuns(handle: *const Simulation) -> *const Body {
    unsafe { handle.as_ref() }.map_or(std::ptr::null(), |sim| sim.suns().as_ptr())
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_GetNodeCount(handle: *const Simulation) -> usize {
    unsafe { handle.as_ref() }.map_or(0, |sim| sim.quadtree().len())
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_GetNodes(handle: *const Simulation) -> *const Node {
    unsafe { handle.as_ref() }.map_or(std::ptr::null(), |sim| sim.quadtree().nodes().as_ptr())
}
