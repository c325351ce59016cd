//! Timelines
//!
//! A [`Timeline`] is an ordered list of [`TimelineStep`]s. Each step animates
//! some properties of one or more targets over a duration, placed on the
//! timeline by its [`StepPosition`]:
//!
//! ```text
//! "+=0.2"   0.2s after the previous step ends
//! "-=0.1"   overlapping the previous step by 0.1s
//! "<"       together with the previous step
//! ">"       right after the previous step (the default)
//! "1.5"     at 1.5s
//! ```
//!
//! A step with a [`Stagger`] starts its i-th target `i * each` seconds after
//! the first. Before sampling, a timeline is resolved against the current
//! property values into per-property tracks ([`ResolvedTimeline`]).

use std::str::FromStr;

use indexmap::IndexMap;
use smallvec::SmallVec;

use kinetic_core::{ElementId, Interpolate, Property, PropertyValue};

use crate::easing::Easing;
use crate::error::{AnimationError, Result};

/// Step duration when none is given, in seconds
pub const DEFAULT_DURATION: f32 = 0.5;

/// One property animated by a step
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyChange {
    pub property: Property,
    /// Explicit start value; `None` starts from the current value
    pub from: Option<PropertyValue>,
    pub to: PropertyValue,
}

impl PropertyChange {
    pub fn to(property: impl Into<Property>, to: impl Into<PropertyValue>) -> Self {
        Self {
            property: property.into(),
            from: None,
            to: to.into(),
        }
    }

    pub fn from_to(
        property: impl Into<Property>,
        from: impl Into<PropertyValue>,
        to: impl Into<PropertyValue>,
    ) -> Self {
        Self {
            property: property.into(),
            from: Some(from.into()),
            to: to.into(),
        }
    }
}

/// Where a step is placed on its timeline
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum StepPosition {
    /// When the previous step ends
    #[default]
    Sequential,
    /// Offset from the end of the previous step (`"+=x"`, `"-=x"`)
    Relative(f32),
    /// When the previous step starts (`"<"`)
    WithPrevious,
    /// At an absolute time, in seconds
    Absolute(f32),
}

impl FromStr for StepPosition {
    type Err = AnimationError;

    fn from_str(s: &str) -> Result<Self> {
        let err = || AnimationError::InvalidPosition(s.to_string());
        let s = s.trim();
        let number = |v: &str| v.trim().parse::<f32>().ok().filter(|v| v.is_finite());

        match s {
            "" | ">" => Ok(StepPosition::Sequential),
            "<" => Ok(StepPosition::WithPrevious),
            _ => {
                if let Some(v) = s.strip_prefix("+=") {
                    number(v).map(StepPosition::Relative).ok_or_else(err)
                } else if let Some(v) = s.strip_prefix("-=") {
                    number(v).map(|v| StepPosition::Relative(-v)).ok_or_else(err)
                } else {
                    number(s)
                        .filter(|v| *v >= 0.0)
                        .map(StepPosition::Absolute)
                        .ok_or_else(err)
                }
            }
        }
    }
}

/// Fixed delay between consecutive targets of a step
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stagger {
    /// Seconds between target `i` and target `i + 1`
    pub each: f32,
}

impl Stagger {
    pub fn each(each: f32) -> Self {
        Self { each }
    }

    /// Start offset of the `index`-th target
    pub fn delay(&self, index: usize) -> f32 {
        self.each * index as f32
    }
}

/// A group of property changes applied to one or more targets
#[derive(Clone, Debug, PartialEq)]
pub struct TimelineStep {
    pub targets: SmallVec<[ElementId; 4]>,
    pub changes: SmallVec<[PropertyChange; 4]>,
    pub position: StepPosition,
    pub duration: f32,
    pub easing: Easing,
    pub stagger: Option<Stagger>,
}

impl TimelineStep {
    pub fn new(targets: impl IntoIterator<Item = ElementId>) -> Self {
        Self {
            targets: targets.into_iter().collect(),
            changes: SmallVec::new(),
            position: StepPosition::Sequential,
            duration: DEFAULT_DURATION,
            easing: Easing::default(),
            stagger: None,
        }
    }

    /// Animate `property` from its current value to `value`
    pub fn to(mut self, property: impl Into<Property>, value: impl Into<PropertyValue>) -> Self {
        self.changes.push(PropertyChange::to(property, value));
        self
    }

    /// Animate `property` between two explicit values
    pub fn from_to(
        mut self,
        property: impl Into<Property>,
        from: impl Into<PropertyValue>,
        to: impl Into<PropertyValue>,
    ) -> Self {
        self.changes.push(PropertyChange::from_to(property, from, to));
        self
    }

    pub fn duration(mut self, seconds: f32) -> Self {
        self.duration = seconds.max(0.0);
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn position(mut self, position: StepPosition) -> Self {
        self.position = position;
        self
    }

    pub fn stagger(mut self, each: f32) -> Self {
        self.stagger = Some(Stagger::each(each.max(0.0)));
        self
    }

    /// Time from the step's start until its last target finishes
    fn span(&self, staggered: bool) -> f32 {
        let delay = match self.stagger {
            Some(stagger) if staggered => stagger.delay(self.targets.len().saturating_sub(1)),
            _ => 0.0,
        };
        self.duration + delay
    }
}

/// One property of one target animated over a time window
#[derive(Clone, Debug, PartialEq)]
pub struct Tween {
    pub element: ElementId,
    pub property: Property,
    pub start: f32,
    pub duration: f32,
    pub easing: Easing,
    pub from: Option<PropertyValue>,
    pub to: PropertyValue,
}

/// Ordered sequence of steps
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Timeline {
    steps: Vec<TimelineStep>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step (builder form)
    pub fn step(mut self, step: TimelineStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn push(&mut self, step: TimelineStep) {
        self.steps.push(step);
    }

    pub fn steps(&self) -> &[TimelineStep] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Start time of every step
    ///
    /// With `staggered == false` stagger delays are ignored and every target
    /// of a step shares the step's window.
    pub fn step_starts(&self, staggered: bool) -> Vec<f32> {
        let mut starts = Vec::with_capacity(self.steps.len());
        let (mut prev_start, mut prev_end) = (0.0_f32, 0.0_f32);
        for step in &self.steps {
            let start = match step.position {
                StepPosition::Sequential => prev_end,
                StepPosition::Relative(offset) => (prev_end + offset).max(0.0),
                StepPosition::WithPrevious => prev_start,
                StepPosition::Absolute(at) => at,
            };
            starts.push(start);
            prev_start = start;
            prev_end = start + step.span(staggered);
        }
        starts
    }

    /// Flatten into per-target, per-property tweens in declaration order
    pub fn tweens(&self, staggered: bool) -> Vec<Tween> {
        let starts = self.step_starts(staggered);
        let mut tweens = Vec::new();
        for (step, start) in self.steps.iter().zip(starts) {
            for (i, element) in step.targets.iter().enumerate() {
                let delay = match step.stagger {
                    Some(stagger) if staggered => stagger.delay(i),
                    _ => 0.0,
                };
                for change in &step.changes {
                    tweens.push(Tween {
                        element: *element,
                        property: change.property.clone(),
                        start: start + delay,
                        duration: step.duration,
                        easing: step.easing,
                        from: change.from,
                        to: change.to,
                    });
                }
            }
        }
        tweens
    }

    /// Resolve against current values
    ///
    /// `current` supplies the value a property has at bind time; it is used
    /// as the start of a property's earliest tween unless that tween has an
    /// explicit `from`. Every other tween of the same property starts where
    /// the tween before it in time ended. Tweens starting together keep their
    /// declaration order.
    pub fn resolve<F>(&self, staggered: bool, current: F) -> ResolvedTimeline
    where
        F: Fn(ElementId, &Property) -> PropertyValue,
    {
        let mut grouped: IndexMap<(ElementId, Property), Vec<Tween>> = IndexMap::new();
        for tween in self.tweens(staggered) {
            grouped
                .entry((tween.element, tween.property.clone()))
                .or_default()
                .push(tween);
        }

        let mut tracks = IndexMap::with_capacity(grouped.len());
        let mut duration = 0.0_f32;
        for ((element, property), mut tweens) in grouped {
            tweens.sort_by(|a, b| a.start.total_cmp(&b.start));
            let mut segments: Vec<Segment> = Vec::with_capacity(tweens.len());
            for tween in tweens {
                let from = tween
                    .from
                    .or_else(|| segments.last().map(|s| s.to))
                    .unwrap_or_else(|| current(element, &property));
                duration = duration.max(tween.start + tween.duration);
                segments.push(Segment {
                    start: tween.start,
                    duration: tween.duration,
                    easing: tween.easing,
                    from,
                    to: tween.to,
                });
            }
            tracks.insert((element, property), segments);
        }

        ResolvedTimeline { tracks, duration }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Segment {
    start: f32,
    duration: f32,
    easing: Easing,
    from: PropertyValue,
    to: PropertyValue,
}

impl Segment {
    fn value_at(&self, t: f32) -> PropertyValue {
        let progress = if self.duration <= 0.0 {
            if t >= self.start {
                1.0
            } else {
                0.0
            }
        } else {
            ((t - self.start) / self.duration).clamp(0.0, 1.0)
        };
        self.from.lerp(&self.to, self.easing.apply(progress))
    }
}

/// A timeline with concrete start values, ready to sample
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResolvedTimeline {
    tracks: IndexMap<(ElementId, Property), Vec<Segment>>,
    duration: f32,
}

impl ResolvedTimeline {
    /// End time of the last tween, in seconds
    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Value of every animated property at time `t`
    ///
    /// Before a property's earliest tween starts it holds that tween's start
    /// value; afterwards the tween with the latest start at or before `t`
    /// decides.
    pub fn sample(&self, t: f32) -> impl Iterator<Item = (ElementId, &Property, PropertyValue)> + '_ {
        // Segments are sorted by start time
        self.tracks.iter().filter_map(move |((element, property), segments)| {
            let first = segments.first()?;
            let value = segments
                .iter()
                .take_while(|s| s.start <= t)
                .last()
                .map(|s| s.value_at(t))
                .unwrap_or(first.from);
            Some((*element, property, value))
        })
    }
}
