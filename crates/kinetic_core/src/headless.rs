//! Deterministic in-memory host
//!
//! `HeadlessHost` implements every host trait without a document or a real
//! clock. Frames only run when [`HeadlessHost::advance_frame`] is called, events
//! are dispatched synchronously by the `scroll_to`/`resize`/`move_pointer`
//! helpers, and every committed property write is recorded.
//!
//! ```rust
//! use kinetic_core::{FrameScheduler, HeadlessHost, Size};
//!
//! let host = HeadlessHost::new(Size::new(800.0, 600.0));
//! host.request_frame(Box::new(|ts| assert!(ts > 0.0)));
//! assert_eq!(host.advance_frame(16.0), 1);
//! ```

use std::cell::{Cell, RefCell};

use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::geometry::{Bounds, Point, ScrollAxis, Size};
use crate::host::{
    EventKind, EventListener, EventSource, FrameCallback, FrameScheduler, FrameToken, HostEvent,
    LayoutProvider, ListenerId, PointerCapabilities, PropertySink,
};
use crate::property::{Property, PropertyValue};
use crate::target::ElementId;

/// Duration of one frame at 60fps, in milliseconds
pub const FRAME_MS: f64 = 1000.0 / 60.0;

/// In-memory host with a manual clock
pub struct HeadlessHost {
    elements: RefCell<FxHashMap<ElementId, Bounds>>,
    scroll: Cell<Point>,
    viewport: Cell<Size>,
    capabilities: Cell<PointerCapabilities>,
    clock: Cell<f64>,
    /// Simulated cost of each `bounds()` measurement, in milliseconds
    measure_cost: Cell<f64>,
    next_token: Cell<u64>,
    frames: RefCell<Vec<(FrameToken, FrameCallback)>>,
    listeners: RefCell<SlotMap<ListenerId, (EventKind, EventListener)>>,
    applied: RefCell<FxHashMap<(ElementId, Property), PropertyValue>>,
    write_count: Cell<usize>,
}

impl HeadlessHost {
    pub fn new(viewport: Size) -> Self {
        Self {
            elements: RefCell::new(FxHashMap::default()),
            scroll: Cell::new(Point::ZERO),
            viewport: Cell::new(viewport),
            capabilities: Cell::new(PointerCapabilities::MOUSE),
            clock: Cell::new(0.0),
            measure_cost: Cell::new(0.0),
            next_token: Cell::new(1),
            frames: RefCell::new(Vec::new()),
            listeners: RefCell::new(SlotMap::with_key()),
            applied: RefCell::new(FxHashMap::default()),
            write_count: Cell::new(0),
        }
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Attach (or move) an element
    pub fn insert_element(&self, element: ElementId, bounds: Bounds) {
        self.elements.borrow_mut().insert(element, bounds);
    }

    /// Detach an element from the document
    pub fn remove_element(&self, element: ElementId) {
        self.elements.borrow_mut().remove(&element);
    }

    pub fn set_pointer_capabilities(&self, capabilities: PointerCapabilities) {
        self.capabilities.set(capabilities);
    }

    /// Make every `bounds()` call advance the clock, simulating slow layout
    pub fn set_measure_cost(&self, cost_ms: f64) {
        self.measure_cost.set(cost_ms);
    }

    // =========================================================================
    // Synthetic input
    // =========================================================================

    /// Scroll vertically and dispatch a scroll event
    pub fn scroll_to(&self, offset: f32) {
        let mut scroll = self.scroll.get();
        scroll.y = offset;
        self.scroll.set(scroll);
        self.dispatch(HostEvent::Scroll { offset });
    }

    /// Scroll horizontally and dispatch a scroll event
    pub fn scroll_to_x(&self, offset: f32) {
        let mut scroll = self.scroll.get();
        scroll.x = offset;
        self.scroll.set(scroll);
        self.dispatch(HostEvent::Scroll { offset });
    }

    pub fn resize(&self, viewport: Size) {
        self.viewport.set(viewport);
        self.dispatch(HostEvent::Resize { viewport });
    }

    /// Move the pointer to a viewport position
    pub fn move_pointer(&self, position: Point) {
        self.dispatch(HostEvent::PointerMove { position });
    }

    pub fn leave_pointer(&self) {
        self.dispatch(HostEvent::PointerLeave);
    }

    /// Deliver an event to every listener of its kind
    pub fn dispatch(&self, event: HostEvent) {
        // Collect first: listeners may add or remove listeners while running
        let targets: Vec<EventListener> = self
            .listeners
            .borrow()
            .values()
            .filter(|(kind, _)| *kind == event.kind())
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in targets {
            listener(&event);
        }
    }

    // =========================================================================
    // Frames
    // =========================================================================

    /// Advance the clock by `dt_ms` and run every frame callback queued so far
    ///
    /// Callbacks requested while this frame runs are queued for the next one.
    /// Returns the number of callbacks run.
    pub fn advance_frame(&self, dt_ms: f64) -> usize {
        self.clock.set(self.clock.get() + dt_ms);
        let frames = std::mem::take(&mut *self.frames.borrow_mut());
        let count = frames.len();
        tracing::trace!(time = self.clock.get(), callbacks = count, "headless frame");
        for (_, callback) in frames {
            callback(self.clock.get());
        }
        count
    }

    /// Run `count` frames at 60fps
    pub fn run_frames(&self, count: usize) {
        for _ in 0..count {
            self.advance_frame(FRAME_MS);
        }
    }

    /// Run 60fps frames until nothing is queued, up to `max` frames
    ///
    /// Returns the number of frames that ran.
    pub fn run_until_idle(&self, max: usize) -> usize {
        let mut ran = 0;
        while ran < max && self.pending_frames() > 0 {
            self.advance_frame(FRAME_MS);
            ran += 1;
        }
        if self.pending_frames() > 0 {
            tracing::debug!(max, "headless host still busy after frame limit");
        }
        ran
    }

    pub fn pending_frames(&self) -> usize {
        self.frames.borrow().len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    // =========================================================================
    // Write log
    // =========================================================================

    /// Last value applied to a property
    pub fn applied(&self, element: ElementId, property: &Property) -> Option<PropertyValue> {
        self.applied
            .borrow()
            .get(&(element, property.clone()))
            .copied()
    }

    /// Last scalar value applied to a property
    pub fn applied_float(&self, element: ElementId, property: &Property) -> Option<f32> {
        self.applied(element, property).and_then(|v| v.as_float())
    }

    /// Total number of property writes received
    pub fn write_count(&self) -> usize {
        self.write_count.get()
    }
}

impl LayoutProvider for HeadlessHost {
    fn bounds(&self, element: ElementId) -> Option<Bounds> {
        let cost = self.measure_cost.get();
        if cost > 0.0 {
            self.clock.set(self.clock.get() + cost);
        }
        self.elements.borrow().get(&element).copied()
    }

    fn scroll_offset(&self, axis: ScrollAxis) -> f32 {
        let scroll = self.scroll.get();
        match axis {
            ScrollAxis::Vertical => scroll.y,
            ScrollAxis::Horizontal => scroll.x,
        }
    }

    fn viewport(&self) -> Size {
        self.viewport.get()
    }

    fn pointer_capabilities(&self) -> PointerCapabilities {
        self.capabilities.get()
    }
}

impl FrameScheduler for HeadlessHost {
    fn request_frame(&self, callback: FrameCallback) -> FrameToken {
        let token = FrameToken::new(self.next_token.get());
        self.next_token.set(token.to_raw() + 1);
        self.frames.borrow_mut().push((token, callback));
        token
    }

    fn cancel_frame(&self, token: FrameToken) {
        self.frames.borrow_mut().retain(|(t, _)| *t != token);
    }

    fn now(&self) -> f64 {
        self.clock.get()
    }
}

impl EventSource for HeadlessHost {
    fn listen(&self, kind: EventKind, listener: EventListener) -> ListenerId {
        self.listeners.borrow_mut().insert((kind, listener))
    }

    fn unlisten(&self, id: ListenerId) {
        self.listeners.borrow_mut().remove(id);
    }
}

impl PropertySink for HeadlessHost {
    fn apply(&self, element: ElementId, property: &Property, value: &PropertyValue) {
        self.applied
            .borrow_mut()
            .insert((element, property.clone()), *value);
        self.write_count.set(self.write_count.get() + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_frames_run_once() {
        let host = HeadlessHost::new(Size::new(800.0, 600.0));
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        host.request_frame(Box::new(move |_| h.set(h.get() + 1)));

        assert_eq!(host.advance_frame(FRAME_MS), 1);
        assert_eq!(host.advance_frame(FRAME_MS), 0);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_cancel_frame() {
        let host = HeadlessHost::new(Size::new(800.0, 600.0));
        let token = host.request_frame(Box::new(|_| panic!("cancelled frame ran")));
        host.cancel_frame(token);
        host.cancel_frame(token);
        assert_eq!(host.advance_frame(FRAME_MS), 0);
    }

    #[test]
    fn test_frame_requested_during_frame_runs_next_time() {
        let host = Rc::new(HeadlessHost::new(Size::new(800.0, 600.0)));
        let inner = host.clone();
        host.request_frame(Box::new(move |_| {
            inner.request_frame(Box::new(|_| {}));
        }));

        assert_eq!(host.advance_frame(FRAME_MS), 1);
        assert_eq!(host.pending_frames(), 1);
        assert_eq!(host.run_until_idle(10), 1);
    }

    #[test]
    fn test_dispatch_by_kind() {
        let host = HeadlessHost::new(Size::new(800.0, 600.0));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        let id = host.listen(
            EventKind::Scroll,
            Rc::new(move |event: &HostEvent| s.borrow_mut().push(*event)),
        );

        host.scroll_to(120.0);
        host.move_pointer(Point::new(1.0, 1.0));
        host.unlisten(id);
        host.scroll_to(240.0);

        assert_eq!(seen.borrow().as_slice(), &[HostEvent::Scroll { offset: 120.0 }]);
        assert_eq!(host.scroll_offset(ScrollAxis::Vertical), 240.0);
        assert_eq!(host.listener_count(), 0);
    }

    #[test]
    fn test_measure_cost_advances_clock() {
        let host = HeadlessHost::new(Size::new(800.0, 600.0));
        host.set_measure_cost(5.0);
        let _ = host.bounds(ElementId::new(1));
        assert_eq!(host.now(), 5.0);
    }
}
