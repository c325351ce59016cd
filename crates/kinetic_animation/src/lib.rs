//! Kinetic Animation
//!
//! Scroll-linked and pointer-linked animation orchestration.
//!
//! # Features
//!
//! - **Viewport Tracking**: `"top 85%"`-style trigger boundaries, clamped
//!   progress, and enter/leave/enter-back/leave-back transitions
//! - **Timelines**: Sequenced and staggered property tweens with relative
//!   positions (`"+=0.2"`, `"<"`)
//! - **Scroll-Linked Playback**: Scrubbed timelines or toggle-action tweens
//! - **Spring Followers**: Semi-implicit Euler springs that retarget without
//!   losing velocity
//! - **Pointer Signals**: Center-relative pointer offsets, tilt, and hover, with
//!   a reduced mode for touch devices and narrow viewports
//! - **AnimationContext**: Scoped registration with one frame loop, one commit
//!   per frame, and idempotent teardown
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use kinetic_animation::{presets, AnimationContext, MotionConfig};
//! use kinetic_core::{Bounds, ElementId, HeadlessHost, Property, Size};
//!
//! let host = Rc::new(HeadlessHost::new(Size::new(1280.0, 800.0)));
//! let card = ElementId::new(1);
//! host.insert_element(card, Bounds::new(2000.0, 0.0, 400.0, 300.0));
//!
//! let ctx = AnimationContext::scope(host.clone(), ElementId::new(0), MotionConfig::default());
//! let preset = presets::card_entrance(card);
//! let entrance = ctx.bind(preset.timeline, card, preset.trigger);
//! assert!(entrance.is_active());
//!
//! host.scroll_to(1500.0);
//! host.run_until_idle(600);
//! assert_eq!(host.applied_float(card, &Property::Opacity), Some(1.0));
//!
//! ctx.dispose();
//! assert!(!entrance.is_active());
//! ```

pub mod animator;
pub mod config;
pub mod context;
pub mod easing;
pub mod error;
pub mod hover;
pub mod presets;
pub mod signal;
pub mod spring;
pub mod subscription;
pub mod timeline;
pub mod trigger;
pub mod viewport;

#[cfg(test)]
mod scenario_tests;

pub use animator::{BindingId, PlayDirection, Playback, ScrollLinkedAnimator, TweenPlayer};
pub use config::{MotionConfig, RegistrationOptions};
pub use context::{
    AnimationContext, FrameStats, PointerCallback, Registration, SpringHandle, TriggerCallback,
};
pub use easing::{EaseMode, Easing};
pub use error::{AnimationError, Result};
pub use hover::{HoverMachine, HoverState, HoverTargets};
pub use presets::ScrollPreset;
pub use signal::{map_range, Direction, FrameSignals, PointerOffset, SignalSource, TiltConfig};
pub use spring::{SpringConfig, SpringFollower, SpringId, SpringSet, SpringState};
pub use subscription::{Liveness, Subscription};
pub use timeline::{
    PropertyChange, ResolvedTimeline, Stagger, StepPosition, Timeline, TimelineStep, Tween,
};
pub use trigger::{Anchor, Boundary, ToggleAction, ToggleActions, TriggerSpec};
pub use viewport::{
    ObservationId, ToggleState, TriggerEvent, TriggerRange, Transition, ViewportTracker,
};
