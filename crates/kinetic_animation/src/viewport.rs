//! Viewport tracker
//!
//! Observes elements against a [`TriggerSpec`] and turns scroll offsets into
//! trigger events:
//!
//! - `Progress(p)`: `p = clamp((scroll - start) / (end - start), 0, 1)`, emitted
//!   whenever it changes
//! - `Toggle`: a transition between the `Before`, `Entered` and `After` states,
//!   with the toggle action configured for it
//!
//! The tracker is fed once per frame with the sampled scroll offset and only
//! compares against the state it saw last frame, so a round trip within one
//! frame produces no transitions and a jump across the whole region produces
//! both transitions of that direction, in order.

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use kinetic_core::{ElementId, LayoutProvider, ScrollAxis};

use crate::error::{AnimationError, Result};
use crate::signal::Direction;
use crate::subscription::Liveness;
use crate::trigger::{ToggleAction, TriggerSpec};

new_key_type! {
    /// Handle to an observed element
    pub struct ObservationId;
}

/// Where the scroll position lies relative to a trigger range
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToggleState {
    Before,
    Entered,
    After,
}

/// A discrete trigger transition
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// before → entered
    Enter,
    /// entered → after
    Leave,
    /// after → entered
    EnterBack,
    /// entered → before
    LeaveBack,
}

impl Transition {
    pub fn direction(&self) -> Direction {
        match self {
            Transition::Enter | Transition::Leave => Direction::Forward,
            Transition::EnterBack | Transition::LeaveBack => Direction::Backward,
        }
    }

    /// The action configured for this transition
    pub fn action(&self, spec: &TriggerSpec) -> ToggleAction {
        let actions = &spec.toggle_actions;
        match self {
            Transition::Enter => actions.on_enter,
            Transition::Leave => actions.on_leave,
            Transition::EnterBack => actions.on_enter_back,
            Transition::LeaveBack => actions.on_leave_back,
        }
    }

    /// Transitions leading from one state to another, in the order they occur
    pub fn between(from: ToggleState, to: ToggleState) -> SmallVec<[Transition; 2]> {
        use ToggleState::*;
        use Transition::*;

        match (from, to) {
            (Before, Entered) => SmallVec::from_slice(&[Enter]),
            (Before, After) => SmallVec::from_slice(&[Enter, Leave]),
            (Entered, After) => SmallVec::from_slice(&[Leave]),
            (After, Entered) => SmallVec::from_slice(&[EnterBack]),
            (After, Before) => SmallVec::from_slice(&[EnterBack, LeaveBack]),
            (Entered, Before) => SmallVec::from_slice(&[LeaveBack]),
            _ => SmallVec::new(),
        }
    }
}

/// Event emitted for an observation
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TriggerEvent {
    Progress(f32),
    Toggle {
        transition: Transition,
        action: ToggleAction,
    },
}

/// A trigger resolved to scroll offsets
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriggerRange {
    pub start: f32,
    pub end: f32,
}

impl TriggerRange {
    pub fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    /// A range whose start does not precede its end never activates
    pub fn is_inert(&self) -> bool {
        !(self.start < self.end)
    }

    pub fn progress(&self, scroll: f32) -> f32 {
        if self.is_inert() {
            return 0.0;
        }
        ((scroll - self.start) / (self.end - self.start)).clamp(0.0, 1.0)
    }

    pub fn classify(&self, scroll: f32) -> ToggleState {
        if self.is_inert() || scroll < self.start {
            ToggleState::Before
        } else if scroll > self.end {
            ToggleState::After
        } else {
            ToggleState::Entered
        }
    }
}

struct Observation {
    element: ElementId,
    spec: TriggerSpec,
    range: TriggerRange,
    state: ToggleState,
    /// State at observation time, consumed by the first update
    initial: Option<ToggleState>,
    progress: Option<f32>,
    live: Liveness,
}

/// Tracks observed elements and emits their trigger events
pub struct ViewportTracker {
    axis: ScrollAxis,
    observations: SlotMap<ObservationId, Observation>,
}

impl ViewportTracker {
    pub fn new(axis: ScrollAxis) -> Self {
        Self {
            axis,
            observations: SlotMap::with_key(),
        }
    }

    fn resolve<L: LayoutProvider + ?Sized>(
        &self,
        layout: &L,
        element: ElementId,
        spec: &TriggerSpec,
    ) -> Result<TriggerRange> {
        let bounds = layout
            .bounds(element)
            .ok_or(AnimationError::TargetNotFound(element))?;
        if bounds.is_empty() {
            return Err(AnimationError::ZeroSizedTarget(element));
        }
        let (start, end) = spec.resolve(bounds, layout.viewport(), self.axis);
        let range = TriggerRange::new(start, end);
        if range.is_inert() {
            tracing::warn!(
                "ViewportTracker: {} for {:?}; trigger will never activate",
                AnimationError::InvalidTriggerBounds { start, end },
                element
            );
        }
        Ok(range)
    }

    /// Start observing an element
    ///
    /// Fails with `TargetNotFound` or `ZeroSizedTarget` when the element cannot
    /// be measured. Start/end resolving in the wrong order is not an error: the
    /// observation is kept but never activates.
    pub fn observe<L: LayoutProvider + ?Sized>(
        &mut self,
        layout: &L,
        element: ElementId,
        spec: TriggerSpec,
        live: Liveness,
    ) -> Result<ObservationId> {
        let range = self.resolve(layout, element, &spec)?;
        let initial = range.classify(layout.scroll_offset(self.axis));
        tracing::debug!(
            "ViewportTracker: observing {:?} over [{}, {}] (initially {:?})",
            element,
            range.start,
            range.end,
            initial
        );
        Ok(self.observations.insert(Observation {
            element,
            spec,
            range,
            state: ToggleState::Before,
            initial: Some(initial),
            progress: None,
            live,
        }))
    }

    /// Re-resolve every boundary after a layout change
    pub fn refresh<L: LayoutProvider + ?Sized>(&mut self, layout: &L) {
        let ids: Vec<ObservationId> = self.observations.keys().collect();
        for id in ids {
            let Some((element, spec)) = self
                .observations
                .get(id)
                .filter(|o| o.live.is_live())
                .map(|o| (o.element, o.spec))
            else {
                continue;
            };
            match self.resolve(layout, element, &spec) {
                Ok(range) => {
                    if let Some(obs) = self.observations.get_mut(id) {
                        obs.range = range;
                    }
                }
                Err(err) => {
                    tracing::debug!("ViewportTracker: keeping previous bounds ({})", err);
                }
            }
        }
    }

    /// Process this frame's scroll offset
    pub fn update(&mut self, scroll: f32) -> Vec<(ObservationId, TriggerEvent)> {
        let mut events = Vec::new();

        for (id, obs) in self.observations.iter_mut() {
            if !obs.live.is_live() {
                continue;
            }

            let mut transitions: SmallVec<[Transition; 4]> = SmallVec::new();
            if let Some(initial) = obs.initial.take() {
                transitions.extend(Transition::between(obs.state, initial));
                obs.state = initial;
            }
            let state = obs.range.classify(scroll);
            transitions.extend(Transition::between(obs.state, state));
            obs.state = state;

            for transition in transitions {
                events.push((
                    id,
                    TriggerEvent::Toggle {
                        transition,
                        action: transition.action(&obs.spec),
                    },
                ));
            }

            let progress = obs.range.progress(scroll);
            if obs.progress != Some(progress) {
                obs.progress = Some(progress);
                events.push((id, TriggerEvent::Progress(progress)));
            }
        }

        if !events.is_empty() {
            tracing::trace!("ViewportTracker: {} events at scroll {}", events.len(), scroll);
        }
        events
    }

    pub fn state(&self, id: ObservationId) -> Option<ToggleState> {
        self.observations.get(id).map(|o| o.state)
    }

    pub fn progress(&self, id: ObservationId) -> Option<f32> {
        self.observations.get(id).and_then(|o| o.progress)
    }

    pub fn range(&self, id: ObservationId) -> Option<TriggerRange> {
        self.observations.get(id).map(|o| o.range)
    }

    pub fn unobserve(&mut self, id: ObservationId) {
        self.observations.remove(id);
    }

    /// Drop observations whose subscription was cancelled
    pub fn sweep(&mut self) {
        self.observations.retain(|_, o| o.live.is_live());
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn clear(&mut self) {
        self.observations.clear();
    }
}
