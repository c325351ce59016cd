//! Scroll trigger specifications
//!
//! A trigger's `start` and `end` are written as `"<element anchor> <viewport
//! anchor>"`: `"top 85%"` means "when the element's top reaches 85% down the
//! viewport". Anchors are keywords (`top`/`left`, `center`, `bottom`/`right`),
//! percentages of the relevant extent, or pixel offsets (`"120px"`, `"120"`).
//!
//! Toggle actions name what a non-scrubbed tween does on each of the four
//! transitions, in the order enter, leave, enter-back, leave-back:
//! `"play none none reverse"`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use kinetic_core::{Bounds, ScrollAxis, Size};

use crate::error::{AnimationError, Result};

/// A point along an element or the viewport
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Anchor {
    /// `top` / `left`
    Start,
    Center,
    /// `bottom` / `right`
    End,
    /// Percentage of the extent
    Percent(f32),
    /// Fixed offset from the start, in pixels
    Pixels(f32),
}

impl Anchor {
    /// Offset of this anchor from the leading edge of a span of `extent` pixels
    pub fn resolve(&self, extent: f32) -> f32 {
        match *self {
            Anchor::Start => 0.0,
            Anchor::Center => extent * 0.5,
            Anchor::End => extent,
            Anchor::Percent(p) => extent * p / 100.0,
            Anchor::Pixels(px) => px,
        }
    }

    fn parse_token(token: &str) -> Option<Anchor> {
        match token {
            "top" | "left" | "start" => return Some(Anchor::Start),
            "center" => return Some(Anchor::Center),
            "bottom" | "right" | "end" => return Some(Anchor::End),
            _ => {}
        }
        if let Some(p) = token.strip_suffix('%') {
            return p.parse::<f32>().ok().filter(|p| p.is_finite()).map(Anchor::Percent);
        }
        token
            .strip_suffix("px")
            .unwrap_or(token)
            .parse::<f32>()
            .ok()
            .filter(|px| px.is_finite())
            .map(Anchor::Pixels)
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anchor::Start => f.write_str("top"),
            Anchor::Center => f.write_str("center"),
            Anchor::End => f.write_str("bottom"),
            Anchor::Percent(p) => write!(f, "{p}%"),
            Anchor::Pixels(px) => write!(f, "{px}px"),
        }
    }
}

/// A trigger boundary: which point of the element meets which point of the viewport
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Boundary {
    pub element: Anchor,
    pub viewport: Anchor,
}

impl Boundary {
    pub const fn new(element: Anchor, viewport: Anchor) -> Self {
        Self { element, viewport }
    }

    /// Scroll offset at which the two anchors coincide
    pub fn scroll_position(&self, element_lead: f32, element_extent: f32, viewport_extent: f32) -> f32 {
        element_lead + self.element.resolve(element_extent) - self.viewport.resolve(viewport_extent)
    }
}

impl FromStr for Boundary {
    type Err = AnimationError;

    fn from_str(s: &str) -> Result<Self> {
        let err = || AnimationError::InvalidBoundary(s.to_string());
        let tokens: Vec<&str> = s.split_whitespace().collect();
        let (element, viewport) = match tokens[..] {
            [single] => (single, single),
            [element, viewport] => (element, viewport),
            _ => return Err(err()),
        };
        Ok(Boundary {
            element: Anchor::parse_token(element).ok_or_else(err)?,
            viewport: Anchor::parse_token(viewport).ok_or_else(err)?,
        })
    }
}

impl TryFrom<String> for Boundary {
    type Error = AnimationError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Boundary> for String {
    fn from(boundary: Boundary) -> Self {
        boundary.to_string()
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.element, self.viewport)
    }
}

/// What a non-scrubbed tween does on a trigger transition
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ToggleAction {
    /// Play forward from the current time
    Play,
    /// Stop where it is
    Pause,
    /// Continue in the direction it was last moving
    Resume,
    /// Play backward from the current time
    Reverse,
    /// Jump to the start and play forward
    Restart,
    /// Jump to the start and stop
    Reset,
    /// Jump to the end and stop
    Complete,
    #[default]
    None,
}

impl FromStr for ToggleAction {
    type Err = AnimationError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "play" => ToggleAction::Play,
            "pause" => ToggleAction::Pause,
            "resume" => ToggleAction::Resume,
            "reverse" => ToggleAction::Reverse,
            "restart" => ToggleAction::Restart,
            "reset" => ToggleAction::Reset,
            "complete" => ToggleAction::Complete,
            "none" => ToggleAction::None,
            _ => return Err(AnimationError::InvalidToggleActions(s.to_string())),
        })
    }
}

impl fmt::Display for ToggleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ToggleAction::Play => "play",
            ToggleAction::Pause => "pause",
            ToggleAction::Resume => "resume",
            ToggleAction::Reverse => "reverse",
            ToggleAction::Restart => "restart",
            ToggleAction::Reset => "reset",
            ToggleAction::Complete => "complete",
            ToggleAction::None => "none",
        })
    }
}

/// Actions for the four trigger transitions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ToggleActions {
    pub on_enter: ToggleAction,
    pub on_leave: ToggleAction,
    pub on_enter_back: ToggleAction,
    pub on_leave_back: ToggleAction,
}

impl ToggleActions {
    pub const fn new(
        on_enter: ToggleAction,
        on_leave: ToggleAction,
        on_enter_back: ToggleAction,
        on_leave_back: ToggleAction,
    ) -> Self {
        Self {
            on_enter,
            on_leave,
            on_enter_back,
            on_leave_back,
        }
    }
}

impl Default for ToggleActions {
    /// `"play none none none"`
    fn default() -> Self {
        Self::new(
            ToggleAction::Play,
            ToggleAction::None,
            ToggleAction::None,
            ToggleAction::None,
        )
    }
}

impl FromStr for ToggleActions {
    type Err = AnimationError;

    fn from_str(s: &str) -> Result<Self> {
        let err = || AnimationError::InvalidToggleActions(s.to_string());
        let actions = s
            .split_whitespace()
            .map(|token| token.parse::<ToggleAction>().map_err(|_| err()))
            .collect::<Result<Vec<_>>>()?;
        let [on_enter, on_leave, on_enter_back, on_leave_back] = actions[..] else {
            return Err(err());
        };
        Ok(Self::new(on_enter, on_leave, on_enter_back, on_leave_back))
    }
}

impl TryFrom<String> for ToggleActions {
    type Error = AnimationError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ToggleActions> for String {
    fn from(actions: ToggleActions) -> Self {
        actions.to_string()
    }
}

impl fmt::Display for ToggleActions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.on_enter, self.on_leave, self.on_enter_back, self.on_leave_back
        )
    }
}

/// Where a trigger starts and ends, and how it drives its animation
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TriggerSpec {
    pub start: Boundary,
    pub end: Boundary,
    /// Tie animation time directly to progress instead of playing a tween
    pub scrub: bool,
    pub toggle_actions: ToggleActions,
}

impl Default for TriggerSpec {
    /// `"top bottom"` to `"bottom top"`: the whole time the element is on screen
    fn default() -> Self {
        Self {
            start: Boundary::new(Anchor::Start, Anchor::End),
            end: Boundary::new(Anchor::End, Anchor::Start),
            scrub: false,
            toggle_actions: ToggleActions::default(),
        }
    }
}

impl TriggerSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `start` and `end` boundaries
    pub fn between(start: &str, end: &str) -> Result<Self> {
        Ok(Self {
            start: start.parse()?,
            end: end.parse()?,
            ..Self::default()
        })
    }

    pub fn with_start(mut self, start: Boundary) -> Self {
        self.start = start;
        self
    }

    pub fn with_end(mut self, end: Boundary) -> Self {
        self.end = end;
        self
    }

    pub fn scrub(mut self, scrub: bool) -> Self {
        self.scrub = scrub;
        self
    }

    pub fn toggle_actions(mut self, actions: ToggleActions) -> Self {
        self.toggle_actions = actions;
        self
    }

    /// Resolve both boundaries to scroll offsets `(start, end)`
    pub fn resolve(&self, bounds: Bounds, viewport: Size, axis: ScrollAxis) -> (f32, f32) {
        let (lead, extent) = bounds.span(axis);
        let viewport_extent = axis.extent(viewport);
        (
            self.start.scroll_position(lead, extent, viewport_extent),
            self.end.scroll_position(lead, extent, viewport_extent),
        )
    }
}
