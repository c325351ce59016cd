//! Scroll-linked animator
//!
//! Binds resolved timelines to viewport observations. Each binding runs in one
//! of two modes:
//!
//! - **Scrub**: animation time is `progress * duration`; the timeline is a pure
//!   function of scroll position.
//! - **Toggle**: trigger transitions drive a [`TweenPlayer`] that advances on
//!   its own clock; the transition's [`ToggleAction`] decides what the player
//!   does.
//!
//! Bindings only mark themselves dirty when their time changes; the context
//! collects the dirty ones into the frame's write batch.

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};

use kinetic_core::WriteBatch;

use crate::subscription::Liveness;
use crate::timeline::ResolvedTimeline;
use crate::trigger::ToggleAction;
use crate::viewport::{ObservationId, TriggerEvent};

new_key_type! {
    /// Handle to a timeline bound to a trigger
    pub struct BindingId;
}

/// Direction a tween player runs in
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlayDirection {
    #[default]
    Forward,
    Backward,
}

/// Plays a timeline on its own clock
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TweenPlayer {
    time: f32,
    duration: f32,
    direction: PlayDirection,
    playing: bool,
}

impl TweenPlayer {
    pub fn new(duration: f32) -> Self {
        Self {
            time: 0.0,
            duration: duration.max(0.0),
            direction: PlayDirection::Forward,
            playing: false,
        }
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn direction(&self) -> PlayDirection {
        self.direction
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Run toward the end (`Forward`) or the start (`Backward`)
    fn run(&mut self, direction: PlayDirection) {
        self.direction = direction;
        self.playing = match direction {
            PlayDirection::Forward => self.time < self.duration,
            PlayDirection::Backward => self.time > 0.0,
        };
    }

    /// Apply a toggle action; returns `true` if the playhead jumped
    pub fn apply(&mut self, action: ToggleAction) -> bool {
        let before = self.time;
        match action {
            ToggleAction::Play => self.run(PlayDirection::Forward),
            ToggleAction::Reverse => self.run(PlayDirection::Backward),
            ToggleAction::Pause => self.playing = false,
            ToggleAction::Resume => self.run(self.direction),
            ToggleAction::Restart => {
                self.time = 0.0;
                self.run(PlayDirection::Forward);
            }
            ToggleAction::Reset => {
                self.time = 0.0;
                self.playing = false;
            }
            ToggleAction::Complete => {
                self.time = self.duration;
                self.playing = false;
            }
            ToggleAction::None => {}
        }
        self.time != before
    }

    /// Advance by `dt` seconds; returns `true` if time moved
    pub fn advance(&mut self, dt: f32) -> bool {
        if !self.playing || !(dt > 0.0) {
            return false;
        }
        let before = self.time;
        match self.direction {
            PlayDirection::Forward => {
                self.time = (self.time + dt).min(self.duration);
                if self.time >= self.duration {
                    self.playing = false;
                }
            }
            PlayDirection::Backward => {
                self.time = (self.time - dt).max(0.0);
                if self.time <= 0.0 {
                    self.playing = false;
                }
            }
        }
        self.time != before
    }
}

/// How a binding turns trigger events into animation time
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Playback {
    Scrub { time: f32 },
    Toggle(TweenPlayer),
}

impl Playback {
    fn time(&self) -> f32 {
        match self {
            Playback::Scrub { time } => *time,
            Playback::Toggle(player) => player.time(),
        }
    }
}

struct Binding {
    observation: ObservationId,
    timeline: ResolvedTimeline,
    playback: Playback,
    live: Liveness,
    dirty: bool,
}

impl Binding {
    fn flush(&mut self, batch: &mut WriteBatch<Liveness>) -> usize {
        self.dirty = false;
        let t = self.playback.time();
        let mut written = 0;
        for (element, property, value) in self.timeline.sample(t) {
            batch.push(element, property.clone(), value, self.live.clone());
            written += 1;
        }
        written
    }
}

/// Drives timelines from viewport trigger events
#[derive(Default)]
pub struct ScrollLinkedAnimator {
    bindings: SlotMap<BindingId, Binding>,
    by_observation: FxHashMap<ObservationId, BindingId>,
}

impl ScrollLinkedAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a resolved timeline to an observation
    ///
    /// The binding starts dirty so its time-zero values (explicit `from`s) are
    /// rendered by the next write.
    pub fn bind(
        &mut self,
        observation: ObservationId,
        timeline: ResolvedTimeline,
        scrub: bool,
        live: Liveness,
    ) -> BindingId {
        let playback = if scrub {
            Playback::Scrub { time: 0.0 }
        } else {
            Playback::Toggle(TweenPlayer::new(timeline.duration()))
        };
        let id = self.bindings.insert(Binding {
            observation,
            timeline,
            playback,
            live,
            dirty: true,
        });
        self.by_observation.insert(observation, id);
        id
    }

    /// Route a trigger event to the binding observing it
    pub fn handle(&mut self, observation: ObservationId, event: &TriggerEvent) {
        let Some(binding) = self
            .by_observation
            .get(&observation)
            .and_then(|id| self.bindings.get_mut(*id))
        else {
            return;
        };
        if !binding.live.is_live() {
            return;
        }

        match (&mut binding.playback, event) {
            (Playback::Scrub { time }, TriggerEvent::Progress(progress)) => {
                let t = progress * binding.timeline.duration();
                if *time != t {
                    *time = t;
                    binding.dirty = true;
                }
            }
            (Playback::Toggle(player), TriggerEvent::Toggle { transition, action }) => {
                tracing::trace!(
                    "ScrollLinkedAnimator: {:?} -> {:?} at t={}",
                    transition,
                    action,
                    player.time()
                );
                if player.apply(*action) {
                    binding.dirty = true;
                }
            }
            _ => {}
        }
    }

    /// Advance every playing tween by `dt` seconds
    pub fn advance(&mut self, dt: f32) {
        for binding in self.bindings.values_mut() {
            if let Playback::Toggle(player) = &mut binding.playback {
                if binding.live.is_live() && player.advance(dt) {
                    binding.dirty = true;
                }
            }
        }
    }

    /// Push the current values of every dirty binding into `batch`
    pub fn write(&mut self, batch: &mut WriteBatch<Liveness>) -> usize {
        self.bindings
            .values_mut()
            .filter(|b| b.dirty && b.live.is_live())
            .map(|b| b.flush(batch))
            .sum()
    }

    /// Push one binding's current values into `batch`, dirty or not
    pub fn render(&mut self, id: BindingId, batch: &mut WriteBatch<Liveness>) -> usize {
        self.bindings
            .get_mut(id)
            .filter(|b| b.live.is_live())
            .map(|b| b.flush(batch))
            .unwrap_or(0)
    }

    pub fn playback(&self, id: BindingId) -> Option<Playback> {
        self.bindings.get(id).map(|b| b.playback)
    }

    /// True while any live tween is playing
    pub fn is_active(&self) -> bool {
        self.bindings.values().any(|b| {
            b.live.is_live() && matches!(b.playback, Playback::Toggle(player) if player.is_playing())
        })
    }

    /// Drop bindings whose subscription was cancelled
    pub fn sweep(&mut self) {
        self.bindings.retain(|_, b| b.live.is_live());
        self.by_observation = self
            .bindings
            .iter()
            .map(|(id, b)| (b.observation, id))
            .collect();
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
        self.by_observation.clear();
    }
}
