//! Kinetic Core
//!
//! Foundational primitives shared by the Kinetic animation crates:
//!
//! - **Geometry**: document-space bounds, points, viewport sizes
//! - **Properties**: animatable visual properties and their values
//! - **Targets**: per-element property maps with last-writer-wins write batches
//! - **Host traits**: the layout, frame, event, and property-sink collaborators
//!   the animation core reads from and writes into
//! - **Headless host**: a deterministic in-memory host for tests and offline runs
//!
//! # Example
//!
//! ```rust
//! use kinetic_core::{Bounds, ElementId, HeadlessHost, LayoutProvider, Size};
//!
//! let host = HeadlessHost::new(Size::new(1280.0, 800.0));
//! let card = ElementId::new(1);
//! host.insert_element(card, Bounds::new(1600.0, 0.0, 400.0, 300.0));
//!
//! assert_eq!(host.bounds(card).map(|b| b.height), Some(300.0));
//! ```

pub mod color;
pub mod geometry;
pub mod headless;
pub mod host;
pub mod property;
pub mod target;

pub use color::{Color, ColorParseError};
pub use geometry::{Bounds, Point, ScrollAxis, Size};
pub use headless::HeadlessHost;
pub use host::{
    EventKind, EventListener, EventSource, FrameCallback, FrameScheduler, FrameToken, Host,
    HostEvent, LayoutProvider, ListenerId, PointerCapabilities, PropertySink,
};
pub use property::{Interpolate, Property, PropertyValue};
pub use target::{AnimationTarget, ElementId, TargetStore, WriteBatch};
