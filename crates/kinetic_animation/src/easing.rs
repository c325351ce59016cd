//! Easing functions
//!
//! Easings map linear progress in `0.0..=1.0` to eased progress. Names follow
//! the tweening vocabulary used in motion design (`power3.out`, `sine.inOut`,
//! `none`) plus CSS `cubic-bezier(...)`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AnimationError;

/// Which end of the curve is eased
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EaseMode {
    In,
    Out,
    InOut,
}

/// Easing curve
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Easing {
    Linear,
    /// Polynomial ease of degree `power + 1` (`power1` is quadratic)
    Power { power: u8, mode: EaseMode },
    Sine(EaseMode),
    CubicBezier { x1: f32, y1: f32, x2: f32, y2: f32 },
}

impl Default for Easing {
    fn default() -> Self {
        Easing::Power {
            power: 1,
            mode: EaseMode::Out,
        }
    }
}

impl Easing {
    pub const fn power_out(power: u8) -> Self {
        Easing::Power {
            power,
            mode: EaseMode::Out,
        }
    }

    /// Evaluate at linear progress `t` (clamped to `0.0..=1.0`)
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match *self {
            Easing::Linear => t,
            Easing::Power { power, mode } => {
                let exp = i32::from(power) + 1;
                eased(mode, t, |x| x.powi(exp))
            }
            Easing::Sine(mode) => eased(mode, t, |x| 1.0 - (x * std::f32::consts::FRAC_PI_2).cos()),
            Easing::CubicBezier { x1, y1, x2, y2 } => cubic_bezier(x1, y1, x2, y2, t),
        }
    }
}

/// Derive out/in-out variants from an ease-in curve
fn eased(mode: EaseMode, t: f32, ease_in: impl Fn(f32) -> f32) -> f32 {
    match mode {
        EaseMode::In => ease_in(t),
        EaseMode::Out => 1.0 - ease_in(1.0 - t),
        EaseMode::InOut => {
            if t < 0.5 {
                ease_in(t * 2.0) * 0.5
            } else {
                1.0 - ease_in((1.0 - t) * 2.0) * 0.5
            }
        }
    }
}

/// Evaluate a CSS cubic bezier at progress `t` (Newton-Raphson on x)
fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32, t: f32) -> f32 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }

    let mut s = t;
    for _ in 0..8 {
        let x = bezier(x1, x2, s) - t;
        if x.abs() < 1e-6 {
            break;
        }
        let dx = bezier_derivative(x1, x2, s);
        if dx.abs() < 1e-6 {
            break;
        }
        s = (s - x / dx).clamp(0.0, 1.0);
    }
    bezier(y1, y2, s)
}

#[inline]
fn bezier(p1: f32, p2: f32, s: f32) -> f32 {
    let ms = 1.0 - s;
    3.0 * ms * ms * s * p1 + 3.0 * ms * s * s * p2 + s * s * s
}

#[inline]
fn bezier_derivative(p1: f32, p2: f32, s: f32) -> f32 {
    let ms = 1.0 - s;
    3.0 * ms * ms * p1 + 6.0 * ms * s * (p2 - p1) + 3.0 * s * s * (1.0 - p2)
}

impl FromStr for Easing {
    type Err = AnimationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || AnimationError::InvalidEasing(s.to_string());
        let name = s.trim();

        match name {
            "none" | "linear" => return Ok(Easing::Linear),
            "ease-in" => return Ok(Easing::Power { power: 1, mode: EaseMode::In }),
            "ease-out" => return Ok(Easing::power_out(1)),
            "ease-in-out" => return Ok(Easing::Power { power: 1, mode: EaseMode::InOut }),
            _ => {}
        }

        if let Some(args) = name
            .strip_prefix("cubic-bezier(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let values: Vec<f32> = args
                .split(',')
                .map(|v| v.trim().parse::<f32>())
                .collect::<Result<_, _>>()
                .map_err(|_| err())?;
            let [x1, y1, x2, y2] = values[..] else {
                return Err(err());
            };
            if !(0.0..=1.0).contains(&x1) || !(0.0..=1.0).contains(&x2) {
                return Err(err());
            }
            return Ok(Easing::CubicBezier { x1, y1, x2, y2 });
        }

        let (family, mode) = match name.split_once('.') {
            Some((family, mode)) => (family, parse_mode(mode).ok_or_else(err)?),
            None => (name, EaseMode::Out),
        };

        if family == "sine" {
            return Ok(Easing::Sine(mode));
        }

        let power = match family {
            "quad" => 1,
            "cubic" => 2,
            "quart" => 3,
            "quint" => 4,
            other => other
                .strip_prefix("power")
                .and_then(|n| n.parse::<u8>().ok())
                .filter(|n| (1..=4).contains(n))
                .ok_or_else(err)?,
        };
        Ok(Easing::Power { power, mode })
    }
}

fn parse_mode(mode: &str) -> Option<EaseMode> {
    match mode {
        "in" => Some(EaseMode::In),
        "out" => Some(EaseMode::Out),
        "inOut" => Some(EaseMode::InOut),
        _ => None,
    }
}

impl TryFrom<String> for Easing {
    type Error = AnimationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Easing> for String {
    fn from(easing: Easing) -> Self {
        easing.to_string()
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = |m: EaseMode| match m {
            EaseMode::In => "in",
            EaseMode::Out => "out",
            EaseMode::InOut => "inOut",
        };
        match *self {
            Easing::Linear => f.write_str("none"),
            Easing::Power { power, mode: m } => write!(f, "power{}.{}", power, mode(m)),
            Easing::Sine(m) => write!(f, "sine.{}", mode(m)),
            Easing::CubicBezier { x1, y1, x2, y2 } => {
                write!(f, "cubic-bezier({x1}, {y1}, {x2}, {y2})")
            }
        }
    }
}
