//! Configuration
//!
//! [`MotionConfig`] holds the per-context tuning knobs and can be loaded from
//! TOML:
//!
//! ```toml
//! frame_budget_ms = 8.0
//! max_spring_dt = 0.0333
//! reduced_motion_max_width = 768.0
//! scroll_axis = "vertical"
//! ```
//!
//! [`RegistrationOptions`] is the flat option bag the presentation layer
//! passes when registering an animation (`start`, `end`, `scrub`,
//! `toggleActions`, `staggerInterval`, `easing`, `duration`, `stiffness`,
//! `damping`, `mass`).

use serde::{Deserialize, Serialize};

use kinetic_core::ScrollAxis;

use crate::easing::Easing;
use crate::error::{AnimationError, Result};
use crate::spring::{SpringConfig, DEFAULT_EPSILON, DEFAULT_MAX_DT};
use crate::timeline::TimelineStep;
use crate::trigger::{Boundary, ToggleActions, TriggerSpec};

/// Per-context motion settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Time allowed for measurement and sampling in one frame, in milliseconds
    pub frame_budget_ms: f64,
    /// Largest frame delta fed to springs, in seconds
    pub max_spring_dt: f32,
    /// Settling tolerance for springs
    pub spring_epsilon: f32,
    /// Viewports narrower than this get constant pointer signals
    pub reduced_motion_max_width: f32,
    pub scroll_axis: ScrollAxis,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            frame_budget_ms: 1000.0 / 60.0,
            max_spring_dt: DEFAULT_MAX_DT,
            spring_epsilon: DEFAULT_EPSILON,
            reduced_motion_max_width: 768.0,
            scroll_axis: ScrollAxis::Vertical,
        }
    }
}

impl MotionConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: MotionConfig =
            toml::from_str(source).map_err(|e| AnimationError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| AnimationError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        let positive = |name: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(AnimationError::Config(format!("{name} must be positive, got {v}")))
            }
        };
        positive("frame_budget_ms", self.frame_budget_ms)?;
        positive("max_spring_dt", f64::from(self.max_spring_dt))?;
        positive("spring_epsilon", f64::from(self.spring_epsilon))?;
        if !(self.reduced_motion_max_width.is_finite() && self.reduced_motion_max_width >= 0.0) {
            return Err(AnimationError::Config(format!(
                "reduced_motion_max_width must be non-negative, got {}",
                self.reduced_motion_max_width
            )));
        }
        Ok(())
    }
}

/// Options accepted when registering an animation
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegistrationOptions {
    pub start: Option<Boundary>,
    pub end: Option<Boundary>,
    pub scrub: bool,
    pub toggle_actions: Option<ToggleActions>,
    /// Seconds between consecutive targets of a step
    pub stagger_interval: Option<f32>,
    pub easing: Option<Easing>,
    /// Step duration, in seconds
    pub duration: Option<f32>,
    pub stiffness: Option<f32>,
    pub damping: Option<f32>,
    pub mass: Option<f32>,
}

impl RegistrationOptions {
    /// Trigger described by these options; unset fields keep their defaults
    pub fn trigger_spec(&self) -> TriggerSpec {
        let defaults = TriggerSpec::default();
        TriggerSpec {
            start: self.start.unwrap_or(defaults.start),
            end: self.end.unwrap_or(defaults.end),
            scrub: self.scrub,
            toggle_actions: self.toggle_actions.unwrap_or(defaults.toggle_actions),
        }
    }

    /// Spring described by these options, on top of `base`
    pub fn spring_config(&self, base: SpringConfig) -> Result<SpringConfig> {
        let config = SpringConfig::new(
            self.stiffness.unwrap_or(base.stiffness),
            self.damping.unwrap_or(base.damping),
            self.mass.unwrap_or(base.mass),
        );
        config.validate()?;
        Ok(config)
    }

    /// Override a step's duration, easing and stagger with the ones set here
    ///
    /// Options left unset keep the step's own values.
    pub fn override_step(&self, mut step: TimelineStep) -> TimelineStep {
        if let Some(duration) = self.duration {
            step = step.duration(duration);
        }
        if let Some(easing) = self.easing {
            step = step.easing(easing);
        }
        if let Some(each) = self.stagger_interval {
            step = step.stagger(each);
        }
        step
    }
}
