//! Animation error types

use kinetic_core::ElementId;
use thiserror::Error;

/// Errors raised by the animation core
///
/// None of these interrupt rendering: registration failures degrade to an inert
/// subscription, frame failures drop or defer that frame's writes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    /// Registration references an element that is missing or detached
    #[error("target {0:?} is not attached to the document")]
    TargetNotFound(ElementId),

    /// Registration references an element with no layout area
    #[error("target {0:?} has zero layout size")]
    ZeroSizedTarget(ElementId),

    /// Trigger start resolves at or after its end
    #[error("trigger start ({start}) must resolve before its end ({end})")]
    InvalidTriggerBounds { start: f32, end: f32 },

    /// Spring parameters that cannot produce a stable trajectory
    #[error("unstable spring: stiffness={stiffness}, damping={damping}, mass={mass} (all must be > 0)")]
    UnstableSpring {
        stiffness: f32,
        damping: f32,
        mass: f32,
    },

    /// Measurement and sampling overran the frame budget
    #[error("frame work took {elapsed_ms:.2}ms, budget is {budget_ms:.2}ms")]
    FrameBudgetExceeded { elapsed_ms: f64, budget_ms: f64 },

    /// Unparseable trigger boundary such as `"top 85%"`
    #[error("invalid trigger boundary `{0}`")]
    InvalidBoundary(String),

    /// Unparseable toggle actions such as `"play none none reverse"`
    #[error("invalid toggle actions `{0}`")]
    InvalidToggleActions(String),

    /// Unknown easing name
    #[error("invalid easing `{0}`")]
    InvalidEasing(String),

    /// Unparseable timeline position such as `"+=0.2"`
    #[error("invalid timeline position `{0}`")]
    InvalidPosition(String),

    #[error(transparent)]
    InvalidColor(#[from] kinetic_core::ColorParseError),

    /// Configuration failed to parse or validate
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for animation operations
pub type Result<T> = std::result::Result<T, AnimationError>;
