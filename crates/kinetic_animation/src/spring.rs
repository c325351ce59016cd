//! Spring physics
//!
//! Damped spring followers that chase a target value one animation frame at a
//! time. Each frame advances position and velocity with
//!
//! ```text
//! acceleration = (stiffness * (target - position) - damping * velocity) / mass
//! velocity    += acceleration * dt
//! position    += velocity * dt
//! ```
//!
//! `dt` is clamped so a dropped frame cannot blow the system up, and split into
//! sub-steps small enough for the integrator to stay stable for any positive
//! parameters. A follower that comes to rest snaps to its target and stops
//! updating until the target moves again.

use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};

use kinetic_core::{ElementId, Property};

use crate::error::{AnimationError, Result};
use crate::subscription::Liveness;

/// Largest frame delta the integrator accepts (seconds)
pub const DEFAULT_MAX_DT: f32 = 1.0 / 30.0;

/// Position and velocity tolerance for settling
pub const DEFAULT_EPSILON: f32 = 1e-3;

/// Upper bound on integrator sub-steps per frame
const MAX_SUBSTEPS: u32 = 1024;

/// Configuration for a spring animation
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpringConfig {
    pub stiffness: f32,
    pub damping: f32,
    pub mass: f32,
}

impl SpringConfig {
    /// Create a new spring configuration
    pub fn new(stiffness: f32, damping: f32, mass: f32) -> Self {
        Self {
            stiffness,
            damping,
            mass,
        }
    }

    /// A gentle, slow spring (good for hover scale)
    pub fn gentle() -> Self {
        Self {
            stiffness: 120.0,
            damping: 14.0,
            mass: 1.0,
        }
    }

    /// A wobbly spring with overshoot (good for playful UI)
    pub fn wobbly() -> Self {
        Self {
            stiffness: 180.0,
            damping: 12.0,
            mass: 1.0,
        }
    }

    /// A stiff, snappy spring (good for tilt)
    pub fn stiff() -> Self {
        Self {
            stiffness: 400.0,
            damping: 30.0,
            mass: 1.0,
        }
    }

    /// A very stiff spring with minimal oscillation
    pub fn snappy() -> Self {
        Self {
            stiffness: 600.0,
            damping: 40.0,
            mass: 1.0,
        }
    }

    /// A slow spring with no overshoot (critically damped)
    pub fn molasses() -> Self {
        Self {
            stiffness: 100.0,
            damping: 20.0,
            mass: 1.0,
        }
    }

    /// Reject parameters that cannot produce a stable trajectory
    pub fn validate(&self) -> Result<()> {
        let ok = |v: f32| v.is_finite() && v > 0.0;
        if ok(self.stiffness) && ok(self.damping) && ok(self.mass) {
            Ok(())
        } else {
            Err(AnimationError::UnstableSpring {
                stiffness: self.stiffness,
                damping: self.damping,
                mass: self.mass,
            })
        }
    }

    /// Calculate critical damping for this spring's stiffness and mass
    pub fn critical_damping(&self) -> f32 {
        2.0 * (self.stiffness * self.mass).sqrt()
    }

    /// Check if the spring is underdamped (will oscillate)
    pub fn is_underdamped(&self) -> bool {
        self.damping < self.critical_damping()
    }

    /// Check if the spring is critically damped (no oscillation, fastest settling)
    pub fn is_critically_damped(&self) -> bool {
        (self.damping - self.critical_damping()).abs() < 0.01
    }

    /// Check if the spring is overdamped (slow settling, no oscillation)
    pub fn is_overdamped(&self) -> bool {
        self.damping > self.critical_damping()
    }

    /// Largest sub-step keeping semi-implicit Euler well inside its stable region
    fn max_substep(&self) -> f32 {
        let by_damping = self.mass / self.damping;
        let by_stiffness = (self.mass / self.stiffness).sqrt();
        by_damping.min(by_stiffness)
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::stiff()
    }
}

/// Mutable state of one spring
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringState {
    pub position: f32,
    pub velocity: f32,
    pub target_value: f32,
    pub config: SpringConfig,
}

/// A spring that follows a target value
#[derive(Clone, Copy, Debug)]
pub struct SpringFollower {
    state: SpringState,
    settled: bool,
    epsilon: f32,
    max_dt: f32,
}

impl SpringFollower {
    /// Create a follower at rest at `initial`
    pub fn new(config: SpringConfig, initial: f32) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            state: SpringState {
                position: initial,
                velocity: 0.0,
                target_value: initial,
                config,
            },
            settled: true,
            epsilon: DEFAULT_EPSILON,
            max_dt: DEFAULT_MAX_DT,
        })
    }

    /// Override the settling tolerance and frame-delta clamp
    pub fn with_limits(mut self, epsilon: f32, max_dt: f32) -> Self {
        self.epsilon = epsilon;
        self.max_dt = max_dt;
        self
    }

    pub fn value(&self) -> f32 {
        self.state.position
    }

    pub fn velocity(&self) -> f32 {
        self.state.velocity
    }

    pub fn target(&self) -> f32 {
        self.state.target_value
    }

    pub fn state(&self) -> &SpringState {
        &self.state
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// Retarget the spring; velocity carries over so motion stays continuous
    pub fn set_target(&mut self, target: f32) {
        if target != self.state.target_value {
            self.state.target_value = target;
            self.settled = false;
        }
    }

    /// Jump to a value and rest there
    pub fn snap_to(&mut self, value: f32) {
        self.state.position = value;
        self.state.target_value = value;
        self.state.velocity = 0.0;
        self.settled = true;
    }

    /// Advance by one frame of `dt` seconds
    ///
    /// Returns `true` if the position changed. A settled follower does nothing.
    pub fn step(&mut self, dt: f32) -> bool {
        if self.settled || !(dt > 0.0) {
            return false;
        }

        let dt = dt.min(self.max_dt);
        let substeps = (dt / self.state.config.max_substep())
            .ceil()
            .clamp(1.0, MAX_SUBSTEPS as f32) as u32;
        let h = dt / substeps as f32;

        let SpringConfig {
            stiffness,
            damping,
            mass,
        } = self.state.config;
        let before = self.state.position;

        for _ in 0..substeps {
            let s = &mut self.state;
            let acceleration = (stiffness * (s.target_value - s.position) - damping * s.velocity) / mass;
            s.velocity += acceleration * h;
            s.position += s.velocity * h;
        }

        if !self.state.position.is_finite() || !self.state.velocity.is_finite() {
            tracing::warn!(
                "spring diverged (stiffness={}, damping={}, mass={}); snapping to target",
                stiffness,
                damping,
                mass
            );
            self.snap_to(self.state.target_value);
            return true;
        }

        if (self.state.target_value - self.state.position).abs() < self.epsilon
            && self.state.velocity.abs() < self.epsilon
        {
            self.snap_to(self.state.target_value);
        }

        self.state.position != before
    }
}

new_key_type! {
    /// Handle to a spring registered in a [`SpringSet`]
    pub struct SpringId;
}

/// A spring plus where its value is written each frame
struct SpringEntry {
    follower: SpringFollower,
    output: Option<(ElementId, Property)>,
    live: Liveness,
    /// Written at least once since registration
    flushed: bool,
}

/// All springs of one animation scope
///
/// Springs are uncoupled: [`SpringSet::step_all`] advances every one of them
/// before anything reads a value, so all reads within a frame see the same
/// generation of spring states.
#[derive(Default)]
pub struct SpringSet {
    springs: SlotMap<SpringId, SpringEntry>,
}

impl SpringSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a follower, optionally bound to an element property
    pub fn insert(
        &mut self,
        follower: SpringFollower,
        output: Option<(ElementId, Property)>,
        live: Liveness,
    ) -> SpringId {
        self.springs.insert(SpringEntry {
            follower,
            output,
            live,
            flushed: false,
        })
    }

    pub fn get(&self, id: SpringId) -> Option<&SpringFollower> {
        self.springs.get(id).map(|e| &e.follower)
    }

    pub fn value(&self, id: SpringId) -> Option<f32> {
        self.get(id).map(|f| f.value())
    }

    pub fn is_settled(&self, id: SpringId) -> bool {
        self.get(id).map(|f| f.is_settled()).unwrap_or(true)
    }

    pub fn set_target(&mut self, id: SpringId, target: f32) {
        if let Some(entry) = self.springs.get_mut(id) {
            entry.follower.set_target(target);
        }
    }

    pub fn snap_to(&mut self, id: SpringId, value: f32) {
        if let Some(entry) = self.springs.get_mut(id) {
            entry.follower.snap_to(value);
            entry.flushed = false;
        }
    }

    /// Step every live spring; returns the ids whose value moved
    pub fn step_all(&mut self, dt: f32) -> Vec<SpringId> {
        let mut moved = Vec::new();
        for (id, entry) in self.springs.iter_mut() {
            if !entry.live.is_live() {
                continue;
            }
            if entry.follower.step(dt) || !entry.flushed {
                moved.push(id);
            }
        }
        moved
    }

    /// Bound outputs of the given springs, with their current values
    pub fn outputs<'a>(
        &'a mut self,
        ids: &'a [SpringId],
    ) -> impl Iterator<Item = (ElementId, Property, f32, Liveness)> + 'a {
        ids.iter().filter_map(move |id| {
            let entry = self.springs.get_mut(*id)?;
            entry.flushed = true;
            let (element, property) = entry.output.clone()?;
            Some((element, property, entry.follower.value(), entry.live.clone()))
        })
    }

    /// True while any live spring is still moving
    pub fn has_active(&self) -> bool {
        self.springs
            .values()
            .any(|e| e.live.is_live() && !e.follower.is_settled())
    }

    /// Drop springs whose subscription was cancelled
    pub fn sweep(&mut self) {
        self.springs.retain(|_, e| e.live.is_live());
    }

    pub fn len(&self) -> usize {
        self.springs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.springs.is_empty()
    }

    pub fn clear(&mut self) {
        self.springs.clear();
    }
}
