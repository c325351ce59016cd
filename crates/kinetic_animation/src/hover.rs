//! Hover state machine
//!
//! Drives a spring target from pointer presence:
//!
//! ```text
//!            enter                leave
//!   Idle ───────────▶ Hovering ───────────▶ Settling
//!    ▲                   ▲                    │  │
//!    │                   └──────enter─────────┘  │
//!    └───────────────────settled─────────────────┘
//! ```
//!
//! Entering sets the target to the hovered value, leaving sets it back to the
//! rest value. The machine is pure: it returns the new target and the caller
//! forwards it to the spring.

/// Hover interaction state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HoverState {
    #[default]
    Idle,
    Hovering,
    /// Pointer left; spring is returning to rest
    Settling,
}

/// Rest and hovered values for a hover binding
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HoverTargets {
    pub rest: f32,
    pub hovered: f32,
}

/// Hover state machine for one element
#[derive(Clone, Copy, Debug)]
pub struct HoverMachine {
    state: HoverState,
    targets: HoverTargets,
}

impl HoverMachine {
    pub fn new(targets: HoverTargets) -> Self {
        Self {
            state: HoverState::Idle,
            targets,
        }
    }

    pub fn state(&self) -> HoverState {
        self.state
    }

    pub fn targets(&self) -> HoverTargets {
        self.targets
    }

    /// Pointer entered; returns the new spring target if it changed
    pub fn pointer_enter(&mut self) -> Option<f32> {
        match self.state {
            HoverState::Idle | HoverState::Settling => {
                self.state = HoverState::Hovering;
                Some(self.targets.hovered)
            }
            HoverState::Hovering => None,
        }
    }

    /// Pointer left; returns the new spring target if it changed
    pub fn pointer_leave(&mut self) -> Option<f32> {
        match self.state {
            HoverState::Hovering => {
                self.state = HoverState::Settling;
                Some(self.targets.rest)
            }
            HoverState::Idle | HoverState::Settling => None,
        }
    }

    /// Feed the current pointer presence; returns a new target on transitions
    pub fn update(&mut self, inside: bool) -> Option<f32> {
        if inside {
            self.pointer_enter()
        } else {
            self.pointer_leave()
        }
    }

    /// The spring came to rest
    pub fn spring_settled(&mut self) {
        if self.state == HoverState::Settling {
            self.state = HoverState::Idle;
        }
    }
}
