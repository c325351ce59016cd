//! Animatable properties and values
//!
//! A [`Property`] names one visual channel of an element. Its value is either a
//! scalar or a [`Color`]; both implement [`Interpolate`] so timelines and
//! springs can blend between them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Trait for values that can be linearly interpolated
pub trait Interpolate: Clone {
    /// Linearly interpolate between self and other by factor t (0.0 to 1.0)
    fn lerp(&self, other: &Self, t: f32) -> Self;

    /// Check if two values are approximately equal (for settling detection)
    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool;
}

impl Interpolate for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self - other).abs() < epsilon
    }
}

impl Interpolate for Color {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Color::lerp(self, other, t)
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self.r - other.r).abs() < epsilon
            && (self.g - other.g).abs() < epsilon
            && (self.b - other.b).abs() < epsilon
            && (self.a - other.a).abs() < epsilon
    }
}

/// A visual property that can be animated
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Property {
    Opacity,
    TranslateX,
    TranslateY,
    Scale,
    RotateX,
    RotateY,
    /// Rotation around the Z axis, in degrees
    Rotation,
    Color,
    /// Any other host-defined numeric channel
    Custom(String),
}

impl Property {
    /// Value a property has before anything writes to it
    pub fn default_value(&self) -> PropertyValue {
        match self {
            Property::Opacity | Property::Scale => PropertyValue::Float(1.0),
            Property::Color => PropertyValue::Color(Color::BLACK),
            _ => PropertyValue::Float(0.0),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Property::Opacity => "opacity",
            Property::TranslateX => "x",
            Property::TranslateY => "y",
            Property::Scale => "scale",
            Property::RotateX => "rotateX",
            Property::RotateY => "rotateY",
            Property::Rotation => "rotation",
            Property::Color => "color",
            Property::Custom(name) => name,
        }
    }
}

impl From<&str> for Property {
    fn from(name: &str) -> Self {
        match name {
            "opacity" => Property::Opacity,
            "x" | "translateX" => Property::TranslateX,
            "y" | "translateY" => Property::TranslateY,
            "scale" => Property::Scale,
            "rotateX" => Property::RotateX,
            "rotateY" => Property::RotateY,
            "rotation" | "rotate" | "rotateZ" => Property::Rotation,
            "color" => Property::Color,
            other => Property::Custom(other.to_string()),
        }
    }
}

impl From<String> for Property {
    fn from(name: String) -> Self {
        Property::from(name.as_str())
    }
}

impl From<Property> for String {
    fn from(property: Property) -> Self {
        property.name().to_string()
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Current value of a property
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Float(f32),
    Color(Color),
}

impl PropertyValue {
    pub fn as_float(&self) -> Option<f32> {
        match self {
            PropertyValue::Float(v) => Some(*v),
            PropertyValue::Color(_) => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            PropertyValue::Color(c) => Some(*c),
            PropertyValue::Float(_) => None,
        }
    }
}

impl Interpolate for PropertyValue {
    /// Mismatched kinds cannot blend; they switch over at the end of the span.
    fn lerp(&self, other: &Self, t: f32) -> Self {
        match (self, other) {
            (PropertyValue::Float(a), PropertyValue::Float(b)) => PropertyValue::Float(a.lerp(b, t)),
            (PropertyValue::Color(a), PropertyValue::Color(b)) => PropertyValue::Color(a.lerp(b, t)),
            _ if t >= 1.0 => *other,
            _ => *self,
        }
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        match (self, other) {
            (PropertyValue::Float(a), PropertyValue::Float(b)) => a.approx_eq(b, epsilon),
            (PropertyValue::Color(a), PropertyValue::Color(b)) => a.approx_eq(b, epsilon),
            _ => false,
        }
    }
}

impl From<f32> for PropertyValue {
    fn from(value: f32) -> Self {
        PropertyValue::Float(value)
    }
}

impl From<Color> for PropertyValue {
    fn from(value: Color) -> Self {
        PropertyValue::Color(value)
    }
}
