//! Animation context
//!
//! An [`AnimationContext`] is the lifecycle boundary for every animation
//! registered by one mounted UI subtree. It owns the tracker, animator,
//! springs and pointer bindings of that subtree, listens to the host's scroll,
//! resize and pointer events, and runs at most one frame callback at a time.
//!
//! # Frame pipeline
//!
//! Host events only record state and request a frame. Each frame then runs,
//! in order:
//!
//! 1. signal sampling (scroll offset, pointer, reduced mode after a resize)
//! 2. pointer bindings retarget their springs; every spring is stepped
//! 3. viewport tracking and scroll-linked timeline sampling
//! 4. one commit of the frame's write batch
//! 5. user callbacks, outside of any internal borrow
//!
//! Another frame is requested only while a spring is moving, a tween is
//! playing, or writes were deferred.
//!
//! # Teardown
//!
//! [`AnimationContext::dispose`] cancels every subscription, the pending frame
//! and all host listeners. It is idempotent and also runs on drop.
//! [`AnimationContext::revert`] first writes back the value each animated
//! property had before this context touched it.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use kinetic_core::{
    AnimationTarget, ElementId, EventKind, EventListener, FrameToken, Host, HostEvent, ListenerId,
    Point, Property, PropertyValue, TargetStore, WriteBatch,
};

use crate::animator::ScrollLinkedAnimator;
use crate::config::{MotionConfig, RegistrationOptions};
use crate::error::{AnimationError, Result};
use crate::hover::{HoverMachine, HoverTargets};
use crate::signal::{PointerOffset, SignalSource, TiltConfig};
use crate::spring::{SpringConfig, SpringFollower, SpringId, SpringSet};
use crate::subscription::{Liveness, Subscription};
use crate::timeline::Timeline;
use crate::trigger::TriggerSpec;
use crate::viewport::{ObservationId, TriggerEvent, ViewportTracker};

/// Frame delta used when the loop starts from idle, in seconds
const IDLE_FRAME_DT: f32 = 1.0 / 60.0;

/// Callback receiving an observed element's trigger events
pub type TriggerCallback = Rc<dyn Fn(&TriggerEvent)>;

/// Callback receiving an element's pointer offset
pub type PointerCallback = Rc<dyn Fn(PointerOffset)>;

/// Something to animate within a context
pub enum Registration {
    /// Observe an element and receive its trigger events
    Trigger {
        element: ElementId,
        spec: TriggerSpec,
        callback: TriggerCallback,
    },
    /// Drive a timeline from an element's scroll trigger
    Timeline {
        trigger: ElementId,
        spec: TriggerSpec,
        timeline: Timeline,
    },
    /// Spring an element property from its current value toward `target`
    Spring {
        element: ElementId,
        property: Property,
        target: f32,
        config: SpringConfig,
    },
}

/// Frame counters of one context
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frame callbacks that ran
    pub frames: u64,
    /// Host events received
    pub events: u64,
    /// Property writes committed
    pub writes: u64,
    /// Frames whose writes were pushed to the next frame
    pub deferred_frames: u64,
}

new_key_type! {
    struct PointerBindingId;
}

enum PointerDriver {
    Signal {
        callback: PointerCallback,
        last: Option<PointerOffset>,
    },
    Tilt {
        config: TiltConfig,
        rotate_x: SpringId,
        rotate_y: SpringId,
    },
    Hover {
        machine: HoverMachine,
        spring: SpringId,
    },
}

struct PointerBinding {
    element: ElementId,
    driver: PointerDriver,
    live: Liveness,
}

/// Callback invocation collected during a frame
enum Notification {
    Trigger(TriggerCallback, Liveness, TriggerEvent),
    Pointer(PointerCallback, Liveness, PointerOffset),
}

impl Notification {
    fn deliver(self) {
        match self {
            Notification::Trigger(callback, live, event) if live.is_live() => callback(&event),
            Notification::Pointer(callback, live, offset) if live.is_live() => callback(offset),
            _ => {}
        }
    }
}

struct ContextState {
    signals: SignalSource,
    tracker: ViewportTracker,
    animator: ScrollLinkedAnimator,
    springs: SpringSet,
    pointers: SlotMap<PointerBindingId, PointerBinding>,
    observers: FxHashMap<ObservationId, (TriggerCallback, Liveness)>,
    store: TargetStore,
    /// Writes held back by an over-budget frame
    deferred: WriteBatch<Liveness>,
    deferred_last: bool,
    last_frame: Option<f64>,
    stats: FrameStats,
}

impl ContextState {
    /// Drop everything whose subscription was cancelled
    fn sweep(&mut self) {
        self.tracker.sweep();
        self.animator.sweep();
        self.springs.sweep();
        self.pointers.retain(|_, p| p.live.is_live());
        self.observers.retain(|_, (_, live)| live.is_live());
    }

    fn clear(&mut self) {
        self.tracker.clear();
        self.animator.clear();
        self.springs.clear();
        self.pointers.clear();
        self.observers.clear();
        self.store.clear();
        self.deferred = WriteBatch::new();
        self.last_frame = None;
    }

    fn float_value(&self, element: ElementId, property: &Property) -> f32 {
        self.store
            .value(element, property)
            .as_float()
            .unwrap_or(0.0)
    }
}

fn follower(config: &MotionConfig, spring: SpringConfig, initial: f32) -> Result<SpringFollower> {
    Ok(SpringFollower::new(spring, initial)?.with_limits(config.spring_epsilon, config.max_spring_dt))
}

struct ContextInner {
    host: Rc<dyn Host>,
    root: ElementId,
    config: MotionConfig,
    state: RefCell<ContextState>,
    subscriptions: RefCell<Vec<Subscription>>,
    listeners: RefCell<SmallVec<[ListenerId; 4]>>,
    frame: Cell<Option<FrameToken>>,
    /// Latest pointer position from host events, viewport coordinates
    pointer: Cell<Option<Point>>,
    layout_dirty: Cell<bool>,
    events: Cell<u64>,
    disposed: Cell<bool>,
}

impl ContextInner {
    /// Run `f` against the state unless disposed or already inside a frame
    fn with_state<R>(&self, f: impl FnOnce(&mut ContextState) -> R) -> Option<R> {
        if self.disposed.get() {
            tracing::debug!("AnimationContext: scope {:?} is disposed; ignoring", self.root);
            return None;
        }
        match self.state.try_borrow_mut() {
            Ok(mut state) => Some(f(&mut state)),
            Err(_) => {
                tracing::warn!("AnimationContext: re-entrant call while a frame is running; ignoring");
                None
            }
        }
    }

    fn request_frame(this: &Rc<Self>) {
        if this.disposed.get() || this.frame.get().is_some() {
            return;
        }
        let weak = Rc::downgrade(this);
        let token = this.host.request_frame(Box::new(move |timestamp| {
            if let Some(inner) = weak.upgrade() {
                ContextInner::run_frame(&inner, timestamp);
            }
        }));
        this.frame.set(Some(token));
    }

    fn on_event(this: &Rc<Self>, event: &HostEvent) {
        if this.disposed.get() {
            return;
        }
        this.events.set(this.events.get() + 1);
        match *event {
            HostEvent::Scroll { .. } => {}
            HostEvent::Resize { .. } => this.layout_dirty.set(true),
            HostEvent::PointerMove { position } => this.pointer.set(Some(position)),
            HostEvent::PointerLeave => this.pointer.set(None),
        }
        Self::request_frame(this);
    }

    fn run_frame(this: &Rc<Self>, timestamp: f64) {
        this.frame.set(None);
        if this.disposed.get() {
            return;
        }
        this.subscriptions.borrow_mut().retain(|s| s.is_active());

        let host = &*this.host;
        let mut notifications: Vec<Notification> = Vec::new();

        let active = {
            let Ok(mut guard) = this.state.try_borrow_mut() else {
                return;
            };
            let state = &mut *guard;
            state.sweep();

            let dt = state
                .last_frame
                .map(|last| ((timestamp - last).max(0.0) / 1000.0) as f32)
                .unwrap_or(IDLE_FRAME_DT);
            state.last_frame = Some(timestamp);
            let started = host.now();

            // Signals
            if this.layout_dirty.replace(false) {
                state
                    .signals
                    .evaluate_reduced(host.pointer_capabilities(), host.viewport());
                state.tracker.refresh(host);
            }
            state.signals.set_pointer(this.pointer.get());
            let signals = state.signals.sample(host);

            // Pointer-driven spring targets
            for binding in state.pointers.values_mut() {
                if !binding.live.is_live() {
                    continue;
                }
                let (offset, inside) = match host.bounds(binding.element) {
                    Some(bounds) => (
                        state.signals.pointer_offset(bounds),
                        state.signals.pointer_inside(bounds),
                    ),
                    None => (PointerOffset::ZERO, false),
                };
                match &mut binding.driver {
                    PointerDriver::Signal { callback, last } => {
                        if *last != Some(offset) {
                            *last = Some(offset);
                            notifications.push(Notification::Pointer(
                                callback.clone(),
                                binding.live.clone(),
                                offset,
                            ));
                        }
                    }
                    PointerDriver::Tilt {
                        config,
                        rotate_x,
                        rotate_y,
                    } => {
                        let (rx, ry) = config.angles(offset);
                        state.springs.set_target(*rotate_x, rx);
                        state.springs.set_target(*rotate_y, ry);
                    }
                    PointerDriver::Hover { machine, spring } => {
                        if let Some(target) = machine.update(inside) {
                            state.springs.set_target(*spring, target);
                        }
                    }
                }
            }

            // Springs
            let moved = state.springs.step_all(dt);
            for binding in state.pointers.values_mut() {
                if let PointerDriver::Hover { machine, spring } = &mut binding.driver {
                    if state.springs.is_settled(*spring) {
                        machine.spring_settled();
                    }
                }
            }
            let mut batch = WriteBatch::new();
            for (element, property, value, live) in state.springs.outputs(&moved) {
                batch.push(element, property, PropertyValue::Float(value), live);
            }

            // Triggers and timelines
            for (id, event) in state.tracker.update(signals.scroll) {
                if let Some((callback, live)) = state.observers.get(&id) {
                    notifications.push(Notification::Trigger(callback.clone(), live.clone(), event));
                }
                state.animator.handle(id, &event);
            }
            state.animator.advance(dt);
            state.animator.write(&mut batch);

            this.commit(state, batch, host.now() - started);
            state.stats.frames += 1;

            let active =
                state.springs.has_active() || state.animator.is_active() || !state.deferred.is_empty();
            if !active {
                state.last_frame = None;
            }
            tracing::trace!(
                "AnimationContext: frame at {:.1}ms (scroll {}, dt {:.4}s, active {})",
                timestamp,
                signals.scroll,
                dt,
                active
            );
            active
        };

        for notification in notifications {
            if this.disposed.get() {
                break;
            }
            notification.deliver();
        }

        if active {
            Self::request_frame(this);
        }
    }

    /// Commit a frame's writes, or hold them for one frame if over budget
    fn commit(&self, state: &mut ContextState, mut batch: WriteBatch<Liveness>, elapsed_ms: f64) {
        let budget_ms = self.config.frame_budget_ms;
        if elapsed_ms > budget_ms && !state.deferred_last && !batch.is_empty() {
            let err = AnimationError::FrameBudgetExceeded {
                elapsed_ms,
                budget_ms,
            };
            tracing::debug!("AnimationContext: {}; deferring {} writes", err, batch.len());
            batch.merge_older(std::mem::take(&mut state.deferred));
            state.deferred = batch;
            state.deferred_last = true;
            state.stats.deferred_frames += 1;
            return;
        }

        state.deferred_last = false;
        batch.merge_older(std::mem::take(&mut state.deferred));
        let applied = batch.commit(&mut state.store, &*self.host, |live| live.is_live());
        state.stats.writes += applied as u64;
    }

    fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }
        if let Some(token) = self.frame.take() {
            self.host.cancel_frame(token);
        }
        for id in self.listeners.borrow_mut().drain(..) {
            self.host.unlisten(id);
        }
        let subscriptions = std::mem::take(&mut *self.subscriptions.borrow_mut());
        for subscription in &subscriptions {
            subscription.cancel();
        }
        if let Ok(mut state) = self.state.try_borrow_mut() {
            state.clear();
        }
        tracing::debug!(
            "AnimationContext: disposed scope {:?} ({} subscriptions)",
            self.root,
            subscriptions.len()
        );
    }
}

/// Owns every animation registered for one UI subtree
pub struct AnimationContext {
    inner: Rc<ContextInner>,
}

impl AnimationContext {
    /// Create a context for the subtree rooted at `root`
    ///
    /// Subscribes to the host's scroll, resize and pointer events and requests
    /// the first frame. An invalid `config` falls back to the defaults.
    pub fn scope(host: Rc<dyn Host>, root: ElementId, config: MotionConfig) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(err) => {
                tracing::warn!("AnimationContext: {}; using default motion config", err);
                MotionConfig::default()
            }
        };

        let mut signals = SignalSource::new(config.scroll_axis, config.reduced_motion_max_width);
        signals.evaluate_reduced(host.pointer_capabilities(), host.viewport());

        let state = ContextState {
            signals,
            tracker: ViewportTracker::new(config.scroll_axis),
            animator: ScrollLinkedAnimator::new(),
            springs: SpringSet::new(),
            pointers: SlotMap::with_key(),
            observers: FxHashMap::default(),
            store: TargetStore::new(),
            deferred: WriteBatch::new(),
            deferred_last: false,
            last_frame: None,
            stats: FrameStats::default(),
        };

        let inner = Rc::new(ContextInner {
            host: host.clone(),
            root,
            config,
            state: RefCell::new(state),
            subscriptions: RefCell::new(Vec::new()),
            listeners: RefCell::new(SmallVec::new()),
            frame: Cell::new(None),
            pointer: Cell::new(None),
            layout_dirty: Cell::new(false),
            events: Cell::new(0),
            disposed: Cell::new(false),
        });

        let weak = Rc::downgrade(&inner);
        let listener: EventListener = Rc::new(move |event: &HostEvent| {
            if let Some(inner) = weak.upgrade() {
                ContextInner::on_event(&inner, event);
            }
        });
        {
            let mut listeners = inner.listeners.borrow_mut();
            for kind in [
                EventKind::Scroll,
                EventKind::Resize,
                EventKind::PointerMove,
                EventKind::PointerLeave,
            ] {
                listeners.push(host.listen(kind, listener.clone()));
            }
        }

        tracing::debug!("AnimationContext: scope created for {:?}", root);
        ContextInner::request_frame(&inner);
        Self { inner }
    }

    pub fn root(&self) -> ElementId {
        self.inner.root
    }

    pub fn config(&self) -> &MotionConfig {
        &self.inner.config
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    /// True when pointer signals are pinned to `(0, 0)`
    pub fn is_reduced_motion(&self) -> bool {
        self.inner
            .state
            .try_borrow()
            .map(|s| s.signals.is_reduced())
            .unwrap_or(false)
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register an animation
    ///
    /// Only invalid spring parameters are reported as an error. Registrations
    /// whose element cannot be measured are logged and return an inactive
    /// subscription.
    pub fn register(&self, registration: Registration) -> Result<Subscription> {
        match registration {
            Registration::Trigger {
                element,
                spec,
                callback,
            } => Ok(self.observe_with(element, spec, callback)),
            Registration::Timeline {
                trigger,
                spec,
                timeline,
            } => Ok(self.bind(timeline, trigger, spec)),
            Registration::Spring {
                element,
                property,
                target,
                config,
            } => self.spring_to(element, property, target, config),
        }
    }

    /// Receive trigger events for an element
    pub fn observe<F>(&self, element: ElementId, spec: TriggerSpec, callback: F) -> Subscription
    where
        F: Fn(&TriggerEvent) + 'static,
    {
        self.observe_with(element, spec, Rc::new(callback))
    }

    fn observe_with(&self, element: ElementId, spec: TriggerSpec, callback: TriggerCallback) -> Subscription {
        let subscription = Subscription::new();
        let host = &*self.inner.host;
        let registered = self.inner.with_state(|state| -> Result<()> {
            let id = state
                .tracker
                .observe(host, element, spec, subscription.liveness())?;
            state
                .observers
                .insert(id, (callback, subscription.liveness()));
            Ok(())
        });
        self.finish(subscription, registered)
    }

    /// Drive `timeline` from the scroll trigger of element `trigger`
    ///
    /// Explicit `from` values are written immediately.
    pub fn bind(&self, timeline: Timeline, trigger: ElementId, spec: TriggerSpec) -> Subscription {
        let subscription = Subscription::new();
        let host = &*self.inner.host;
        let registered = self.inner.with_state(|state| -> Result<()> {
            let id = state
                .tracker
                .observe(host, trigger, spec, subscription.liveness())?;
            let resolved = timeline.resolve(!spec.scrub, |element, property| {
                state.store.value(element, property)
            });
            let binding = state
                .animator
                .bind(id, resolved, spec.scrub, subscription.liveness());

            let mut batch = WriteBatch::new();
            state.animator.render(binding, &mut batch);
            let applied = batch.commit(&mut state.store, host, |live| live.is_live());
            state.stats.writes += applied as u64;
            Ok(())
        });
        self.finish(subscription, registered)
    }

    /// [`bind`](Self::bind) with the trigger taken from options
    ///
    /// Step settings given in the options override those of every step.
    pub fn bind_with_options(
        &self,
        timeline: Timeline,
        trigger: ElementId,
        options: &RegistrationOptions,
    ) -> Subscription {
        let mut configured = Timeline::new();
        for step in timeline.steps() {
            configured.push(options.override_step(step.clone()));
        }
        self.bind(configured, trigger, options.trigger_spec())
    }

    /// Spring an element property from its current value toward `target`
    pub fn spring_to(
        &self,
        element: ElementId,
        property: Property,
        target: f32,
        config: SpringConfig,
    ) -> Result<Subscription> {
        config.validate()?;
        let subscription = Subscription::new();
        let host = &*self.inner.host;
        let motion = &self.inner.config;
        let registered = self.inner.with_state(|state| -> Result<()> {
            host.bounds(element)
                .ok_or(AnimationError::TargetNotFound(element))?;
            let initial = state.float_value(element, &property);
            let mut follower = follower(motion, config, initial)?;
            follower.set_target(target);
            state
                .springs
                .insert(follower, Some((element, property)), subscription.liveness());
            Ok(())
        });
        Ok(self.finish(subscription, registered))
    }

    /// [`spring_to`](Self::spring_to) with `stiffness`, `damping` and `mass`
    /// taken from options, falling back to `base` for unset fields
    pub fn spring_to_with_options(
        &self,
        element: ElementId,
        property: Property,
        target: f32,
        base: SpringConfig,
        options: &RegistrationOptions,
    ) -> Result<Subscription> {
        let config = options.spring_config(base)?;
        self.spring_to(element, property, target, config)
    }

    /// A free-standing spring whose target and value are driven through the handle
    pub fn follow(&self, initial: f32, config: SpringConfig) -> Result<SpringHandle> {
        config.validate()?;
        let subscription = Subscription::new();
        let motion = &self.inner.config;
        let registered = self.inner.with_state(|state| -> Result<SpringId> {
            let follower = follower(motion, config, initial)?;
            Ok(state.springs.insert(follower, None, subscription.liveness()))
        });
        let id = match &registered {
            Some(Ok(id)) => *id,
            _ => SpringId::default(),
        };
        let subscription = self.finish(subscription, registered.map(|r| r.map(|_| ())));
        Ok(SpringHandle {
            id,
            inner: Rc::downgrade(&self.inner),
            subscription,
        })
    }

    /// Receive the pointer offset from an element's center whenever it changes
    pub fn pointer_signal<F>(&self, element: ElementId, callback: F) -> Subscription
    where
        F: Fn(PointerOffset) + 'static,
    {
        let subscription = Subscription::new();
        let registered = self.pointer_binding(element, &subscription, |_| {
            Ok(PointerDriver::Signal {
                callback: Rc::new(callback),
                last: None,
            })
        });
        self.finish(subscription, registered)
    }

    /// Tilt an element toward the pointer through rotateX/rotateY springs
    pub fn tilt(&self, element: ElementId, config: TiltConfig) -> Result<Subscription> {
        config.spring.validate()?;
        let subscription = Subscription::new();
        let motion = &self.inner.config;
        let live = subscription.liveness();
        let registered = self.pointer_binding(element, &subscription, |state| {
            let x = follower(motion, config.spring, state.float_value(element, &Property::RotateX))?;
            let y = follower(motion, config.spring, state.float_value(element, &Property::RotateY))?;
            Ok(PointerDriver::Tilt {
                config,
                rotate_x: state
                    .springs
                    .insert(x, Some((element, Property::RotateX)), live.clone()),
                rotate_y: state
                    .springs
                    .insert(y, Some((element, Property::RotateY)), live.clone()),
            })
        });
        Ok(self.finish(subscription, registered))
    }

    /// Spring `property` between `targets.rest` and `targets.hovered` as the
    /// pointer enters and leaves the element
    pub fn hover(
        &self,
        element: ElementId,
        property: Property,
        targets: HoverTargets,
        config: SpringConfig,
    ) -> Result<Subscription> {
        config.validate()?;
        let subscription = Subscription::new();
        let motion = &self.inner.config;
        let live = subscription.liveness();
        let registered = self.pointer_binding(element, &subscription, |state| {
            let follower = follower(motion, config, targets.rest)?;
            Ok(PointerDriver::Hover {
                machine: HoverMachine::new(targets),
                spring: state
                    .springs
                    .insert(follower, Some((element, property)), live.clone()),
            })
        });
        Ok(self.finish(subscription, registered))
    }

    fn pointer_binding<F>(
        &self,
        element: ElementId,
        subscription: &Subscription,
        driver: F,
    ) -> Option<Result<()>>
    where
        F: FnOnce(&mut ContextState) -> Result<PointerDriver>,
    {
        let host = &*self.inner.host;
        self.inner.with_state(|state| -> Result<()> {
            let bounds = host
                .bounds(element)
                .ok_or(AnimationError::TargetNotFound(element))?;
            if bounds.is_empty() {
                return Err(AnimationError::ZeroSizedTarget(element));
            }
            state
                .signals
                .evaluate_reduced(host.pointer_capabilities(), host.viewport());
            let driver = driver(state)?;
            state.pointers.insert(PointerBinding {
                element,
                driver,
                live: subscription.liveness(),
            });
            Ok(())
        })
    }

    /// Track a successful registration, or degrade a failed one to inert
    fn finish(&self, subscription: Subscription, registered: Option<Result<()>>) -> Subscription {
        match registered {
            Some(Ok(())) => {
                self.inner
                    .subscriptions
                    .borrow_mut()
                    .push(subscription.clone());
                ContextInner::request_frame(&self.inner);
                subscription
            }
            Some(Err(err)) => {
                tracing::warn!("AnimationContext: registration skipped: {}", err);
                Subscription::inert()
            }
            None => Subscription::inert(),
        }
    }

    // =========================================================================
    // State
    // =========================================================================

    /// Declare a property's pre-animation value (e.g. from a stylesheet)
    pub fn seed(&self, element: ElementId, property: Property, value: impl Into<PropertyValue>) {
        let value = value.into();
        self.inner
            .with_state(|state| state.store.seed(element, property, value));
    }

    /// Current animated values of an element
    pub fn target(&self, element: ElementId) -> Option<AnimationTarget> {
        self.inner
            .state
            .try_borrow()
            .ok()
            .and_then(|s| s.store.target(element).cloned())
    }

    pub fn stats(&self) -> FrameStats {
        let mut stats = self
            .inner
            .state
            .try_borrow()
            .map(|s| s.stats)
            .unwrap_or_default();
        stats.events = self.inner.events.get();
        stats
    }

    // =========================================================================
    // Teardown
    // =========================================================================

    /// Cancel every registration, the pending frame and all host listeners
    ///
    /// Calling it again has no effect.
    pub fn dispose(&self) {
        self.inner.dispose();
    }

    /// Restore every animated property to its pre-animation value, then dispose
    pub fn revert(&self) {
        let Some(originals) = self.inner.with_state(|state| state.store.originals()) else {
            return;
        };
        for (element, property, value) in &originals {
            self.inner.host.apply(*element, property, value);
        }
        tracing::debug!(
            "AnimationContext: reverted {} properties in scope {:?}",
            originals.len(),
            self.inner.root
        );
        self.dispose();
    }
}

impl Drop for AnimationContext {
    fn drop(&mut self) {
        self.inner.dispose();
    }
}

impl fmt::Debug for AnimationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationContext")
            .field("root", &self.inner.root)
            .field("disposed", &self.inner.disposed.get())
            .finish()
    }
}

/// Handle to a spring created with [`AnimationContext::follow`]
pub struct SpringHandle {
    id: SpringId,
    inner: Weak<ContextInner>,
    subscription: Subscription,
}

impl SpringHandle {
    /// Move the spring's target; velocity carries over
    pub fn set_target(&self, target: f32) {
        self.update(|springs| springs.set_target(self.id, target));
    }

    /// Jump to a value and rest there
    pub fn snap_to(&self, value: f32) {
        self.update(|springs| springs.snap_to(self.id, value));
    }

    fn update(&self, f: impl FnOnce(&mut SpringSet)) {
        if !self.subscription.is_active() {
            return;
        }
        let Some(inner) = self.inner.upgrade() else {
            return;
        };
        if inner.with_state(|state| f(&mut state.springs)).is_some() {
            ContextInner::request_frame(&inner);
        }
    }

    /// Current value, `None` once the spring is gone
    pub fn value(&self) -> Option<f32> {
        let inner = self.inner.upgrade()?;
        let state = inner.state.try_borrow().ok()?;
        state.springs.value(self.id)
    }

    pub fn is_settled(&self) -> bool {
        let Some(inner) = self.inner.upgrade() else {
            return true;
        };
        let state = inner.state.try_borrow();
        state.map(|s| s.springs.is_settled(self.id)).unwrap_or(true)
    }

    pub fn subscription(&self) -> &Subscription {
        &self.subscription
    }

    pub fn cancel(&self) -> bool {
        self.subscription.cancel()
    }
}

impl fmt::Debug for SpringHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpringHandle")
            .field("id", &self.id)
            .field("subscription", &self.subscription)
            .finish()
    }
}
