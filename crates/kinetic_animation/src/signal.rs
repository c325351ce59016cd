//! Signal source
//!
//! Normalizes raw continuous input into the numeric signals the rest of the
//! core consumes each frame:
//!
//! - **Scroll**: the offset along the scroll axis and the net direction since
//!   the previous frame
//! - **Pointer**: the pointer position relative to the center of an element's
//!   bounding box, in pixels; `(0, 0)` when the pointer is outside the box
//!
//! On touch-primary devices and narrow viewports the source runs in *reduced*
//! mode, where every pointer signal is a constant `(0, 0)`. Reduced mode is
//! computed once at creation and re-evaluated on every resize.

use kinetic_core::{
    Bounds, LayoutProvider, Point, PointerCapabilities, ScrollAxis, Size,
};

use crate::spring::SpringConfig;

/// Scroll direction along the scroll axis
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Toward increasing document position
    Forward,
    Backward,
}

/// Pointer offset from an element's center, in pixels
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerOffset {
    pub x: f32,
    pub y: f32,
}

impl PointerOffset {
    pub const ZERO: PointerOffset = PointerOffset { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Linearly map `value` from `input` to `output`, clamping to the output range
pub fn map_range(value: f32, input: (f32, f32), output: (f32, f32)) -> f32 {
    let span = input.1 - input.0;
    if span == 0.0 {
        return output.0;
    }
    let t = ((value - input.0) / span).clamp(0.0, 1.0);
    output.0 + (output.1 - output.0) * t
}

/// Pointer-to-rotation mapping for tilt effects
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TiltConfig {
    /// Pointer offset range (pixels) mapped onto both rotation ranges
    pub input: (f32, f32),
    /// rotateX range, driven by the vertical offset
    pub rotate_x: (f32, f32),
    /// rotateY range, driven by the horizontal offset
    pub rotate_y: (f32, f32),
    pub spring: SpringConfig,
}

impl Default for TiltConfig {
    fn default() -> Self {
        Self {
            input: (-100.0, 100.0),
            rotate_x: (8.0, -8.0),
            rotate_y: (-8.0, 8.0),
            spring: SpringConfig::stiff(),
        }
    }
}

impl TiltConfig {
    /// Rotation targets `(rotate_x, rotate_y)` in degrees for a pointer offset
    pub fn angles(&self, offset: PointerOffset) -> (f32, f32) {
        (
            map_range(offset.y, self.input, self.rotate_x),
            map_range(offset.x, self.input, self.rotate_y),
        )
    }
}

/// Signals sampled at the start of a frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameSignals {
    pub scroll: f32,
    pub previous_scroll: f32,
    /// Net direction since the previous frame, `None` if the offset is unchanged
    pub direction: Option<Direction>,
    pub viewport: Size,
}

/// Normalizes scroll and pointer input
#[derive(Debug)]
pub struct SignalSource {
    axis: ScrollAxis,
    reduced_max_width: f32,
    reduced: bool,
    /// Last pointer position, viewport coordinates
    pointer: Option<Point>,
    scroll: Option<f32>,
}

impl SignalSource {
    pub fn new(axis: ScrollAxis, reduced_max_width: f32) -> Self {
        Self {
            axis,
            reduced_max_width,
            reduced: false,
            pointer: None,
            scroll: None,
        }
    }

    pub fn axis(&self) -> ScrollAxis {
        self.axis
    }

    /// Recompute reduced mode; returns the new value
    pub fn evaluate_reduced(&mut self, capabilities: PointerCapabilities, viewport: Size) -> bool {
        let reduced = !capabilities.supports_hover() || viewport.width < self.reduced_max_width;
        if reduced != self.reduced {
            tracing::debug!(
                "SignalSource: reduced pointer mode {} (viewport width {})",
                if reduced { "on" } else { "off" },
                viewport.width
            );
        }
        self.reduced = reduced;
        reduced
    }

    pub fn is_reduced(&self) -> bool {
        self.reduced
    }

    pub fn set_pointer(&mut self, pointer: Option<Point>) {
        self.pointer = pointer;
    }

    /// Read the scroll offset once for this frame
    pub fn sample<L: LayoutProvider + ?Sized>(&mut self, layout: &L) -> FrameSignals {
        let scroll = layout.scroll_offset(self.axis);
        let previous_scroll = self.scroll.replace(scroll).unwrap_or(scroll);
        let direction = if scroll > previous_scroll {
            Some(Direction::Forward)
        } else if scroll < previous_scroll {
            Some(Direction::Backward)
        } else {
            None
        };
        FrameSignals {
            scroll,
            previous_scroll,
            direction,
            viewport: layout.viewport(),
        }
    }

    /// Pointer position in document coordinates, if the pointer counts
    fn document_pointer(&self) -> Option<Point> {
        if self.reduced {
            return None;
        }
        let pointer = self.pointer?;
        let scroll = self.scroll.unwrap_or(0.0);
        Some(match self.axis {
            ScrollAxis::Vertical => Point::new(pointer.x, pointer.y + scroll),
            ScrollAxis::Horizontal => Point::new(pointer.x + scroll, pointer.y),
        })
    }

    /// Pointer offset from the center of `bounds`
    pub fn pointer_offset(&self, bounds: Bounds) -> PointerOffset {
        match self.document_pointer() {
            Some(p) if bounds.contains(p) => {
                let center = bounds.center();
                PointerOffset::new(p.x - center.x, p.y - center.y)
            }
            _ => PointerOffset::ZERO,
        }
    }

    /// True when a hover-capable pointer is over `bounds`
    pub fn pointer_inside(&self, bounds: Bounds) -> bool {
        self.document_pointer()
            .map(|p| bounds.contains(p))
            .unwrap_or(false)
    }
}
