//! Host collaborator traits
//!
//! The animation core never touches a document, a window, or a clock directly.
//! It consumes four narrow providers supplied by the host environment:
//!
//! - [`LayoutProvider`]: element bounds, scroll offset, viewport, pointer kind
//! - [`FrameScheduler`]: request/cancel a callback on the next animation frame
//! - [`EventSource`]: subscribe to scroll, resize, and pointer events
//! - [`PropertySink`]: receives committed property writes
//!
//! All methods take `&self`: hosts are shared behind `Rc` and called back
//! re-entrantly from their own event dispatch, so they keep interior state in
//! `Cell`/`RefCell`.

use std::rc::Rc;

use slotmap::new_key_type;

use crate::geometry::{Bounds, Point, ScrollAxis, Size};
use crate::property::{Property, PropertyValue};
use crate::target::ElementId;

new_key_type! {
    /// Handle to a registered host event listener
    pub struct ListenerId;
}

/// Token identifying a pending frame callback
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameToken(u64);

impl FrameToken {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn to_raw(self) -> u64 {
        self.0
    }
}

/// Callback run on the next animation frame with the frame timestamp (ms)
pub type FrameCallback = Box<dyn FnOnce(f64)>;

/// Listener invoked for each host event of the subscribed kind
pub type EventListener = Rc<dyn Fn(&HostEvent)>;

/// Kinds of continuous input the core listens to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Scroll,
    Resize,
    PointerMove,
    PointerLeave,
}

/// A raw host event
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HostEvent {
    /// The document scrolled to a new offset along the scroll axis
    Scroll { offset: f32 },
    /// The viewport changed size
    Resize { viewport: Size },
    /// The pointer moved; position is in viewport coordinates
    PointerMove { position: Point },
    /// The pointer left the document
    PointerLeave,
}

impl HostEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            HostEvent::Scroll { .. } => EventKind::Scroll,
            HostEvent::Resize { .. } => EventKind::Resize,
            HostEvent::PointerMove { .. } => EventKind::PointerMove,
            HostEvent::PointerLeave => EventKind::PointerLeave,
        }
    }
}

/// What kind of pointer the device primarily uses
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PointerCapabilities {
    /// A fine pointer that can hover (mouse, trackpad)
    pub fine: bool,
    /// Touch is the primary input
    pub touch_primary: bool,
}

impl PointerCapabilities {
    pub const MOUSE: PointerCapabilities = PointerCapabilities {
        fine: true,
        touch_primary: false,
    };
    pub const TOUCH: PointerCapabilities = PointerCapabilities {
        fine: false,
        touch_primary: true,
    };

    /// True when continuous pointer input is available
    pub fn supports_hover(&self) -> bool {
        self.fine && !self.touch_primary
    }
}

impl Default for PointerCapabilities {
    fn default() -> Self {
        Self::MOUSE
    }
}

/// Layout measurement provider
pub trait LayoutProvider {
    /// Document-space bounds of an element, or `None` if it is detached
    fn bounds(&self, element: ElementId) -> Option<Bounds>;

    /// Current scroll offset along an axis
    fn scroll_offset(&self, axis: ScrollAxis) -> f32;

    /// Current viewport size
    fn viewport(&self) -> Size;

    fn pointer_capabilities(&self) -> PointerCapabilities {
        PointerCapabilities::default()
    }
}

/// Animation-frame scheduling provider
pub trait FrameScheduler {
    /// Run `callback` on the next animation frame
    fn request_frame(&self, callback: FrameCallback) -> FrameToken;

    /// Cancel a pending frame callback; unknown or spent tokens are ignored
    fn cancel_frame(&self, token: FrameToken);

    /// Monotonic time in milliseconds
    fn now(&self) -> f64;
}

/// Host event subscription provider
pub trait EventSource {
    fn listen(&self, kind: EventKind, listener: EventListener) -> ListenerId;

    /// Remove a listener; unknown ids are ignored
    fn unlisten(&self, id: ListenerId);
}

/// Receives committed property writes (e.g. applies them as inline styles)
pub trait PropertySink {
    fn apply(&self, element: ElementId, property: &Property, value: &PropertyValue);
}

/// Everything the animation core needs from its environment
pub trait Host: LayoutProvider + FrameScheduler + EventSource + PropertySink {}

impl<T> Host for T where T: LayoutProvider + FrameScheduler + EventSource + PropertySink {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind() {
        assert_eq!(HostEvent::Scroll { offset: 1.0 }.kind(), EventKind::Scroll);
        assert_eq!(HostEvent::PointerLeave.kind(), EventKind::PointerLeave);
    }

    #[test]
    fn test_pointer_capabilities() {
        assert!(PointerCapabilities::MOUSE.supports_hover());
        assert!(!PointerCapabilities::TOUCH.supports_hover());
    }
}
