//! Ready-made scroll and hover animations
//!
//! Each scroll preset pairs a [`Timeline`] with the [`TriggerSpec`] it was
//! designed for; bind it with [`AnimationContext::bind`], usually with the
//! preset's section or card element as the trigger.
//!
//! [`AnimationContext::bind`]: crate::AnimationContext::bind

use kinetic_core::{Color, ElementId, Property};

use crate::easing::Easing;
use crate::hover::HoverTargets;
use crate::spring::SpringConfig;
use crate::timeline::{StepPosition, Timeline, TimelineStep};
use crate::trigger::{Anchor, Boundary, ToggleAction, ToggleActions, TriggerSpec};

/// Seconds between consecutive characters of [`text_reveal`]
const TEXT_REVEAL_INTERVAL: f32 = 0.05;

/// A timeline together with the trigger that drives it
#[derive(Clone, Debug, PartialEq)]
pub struct ScrollPreset {
    pub timeline: Timeline,
    pub trigger: TriggerSpec,
}

/// Light up characters one after another while scrolling through a paragraph,
/// then fade them back
///
/// Scrubbed from `"top 85%"` to `"bottom 15%"`. Each character goes from `dim`
/// to `lit` over 0.3s and, 0.2s later, back to `dim`. Character `i` starts at
/// `i * 0.05`s, so the sweep runs through the scroll range itself.
pub fn text_reveal(chars: &[ElementId], lit: Color, dim: Color) -> ScrollPreset {
    let mut timeline = Timeline::new();
    for (i, ch) in chars.iter().enumerate() {
        timeline.push(
            TimelineStep::new([*ch])
                .from_to(Property::Color, dim, lit)
                .duration(0.3)
                .position(StepPosition::Absolute(i as f32 * TEXT_REVEAL_INTERVAL)),
        );
        timeline.push(
            TimelineStep::new([*ch])
                .to(Property::Color, dim)
                .duration(0.3)
                .position(StepPosition::Relative(0.2)),
        );
    }

    ScrollPreset {
        timeline,
        trigger: TriggerSpec::default()
            .with_start(Boundary::new(Anchor::Start, Anchor::Percent(85.0)))
            .with_end(Boundary::new(Anchor::End, Anchor::Percent(15.0)))
            .scrub(true),
    }
}

/// Slide a caption in from the left and fade it up each time it scrolls into view
///
/// Plays forward on enter and enter-back, reverses on leave and leave-back.
pub fn caption_fade_in(target: ElementId) -> ScrollPreset {
    let timeline = Timeline::new().step(
        TimelineStep::new([target])
            .from_to(Property::Opacity, 0.0_f32, 1.0_f32)
            .from_to(Property::TranslateX, -20.0_f32, 0.0_f32)
            .duration(1.0),
    );

    ScrollPreset {
        timeline,
        trigger: TriggerSpec::default()
            .with_start(Boundary::new(Anchor::Start, Anchor::Percent(80.0)))
            .toggle_actions(ToggleActions::new(
                ToggleAction::Play,
                ToggleAction::Reverse,
                ToggleAction::Play,
                ToggleAction::Reverse,
            )),
    }
}

/// Raise, fade and scale a project card into place
///
/// Plays once on enter and reverses when scrolled back above the start.
pub fn card_entrance(card: ElementId) -> ScrollPreset {
    let timeline = Timeline::new().step(
        TimelineStep::new([card])
            .from_to(Property::TranslateY, 100.0_f32, 0.0_f32)
            .from_to(Property::Opacity, 0.0_f32, 1.0_f32)
            .from_to(Property::Scale, 0.95_f32, 1.0_f32)
            .duration(1.2)
            .easing(Easing::power_out(3)),
    );

    ScrollPreset {
        timeline,
        trigger: TriggerSpec::default()
            .with_start(Boundary::new(Anchor::Start, Anchor::Percent(85.0)))
            .with_end(Boundary::new(Anchor::Start, Anchor::Percent(30.0)))
            .toggle_actions(ToggleActions::new(
                ToggleAction::Play,
                ToggleAction::None,
                ToggleAction::None,
                ToggleAction::Reverse,
            )),
    }
}

/// Drift an element vertically by `distance` pixels while it crosses the viewport
pub fn parallax(target: ElementId, distance: f32) -> ScrollPreset {
    let timeline = Timeline::new().step(
        TimelineStep::new([target])
            .to(Property::TranslateY, distance)
            .duration(1.0)
            .easing(Easing::Linear),
    );

    ScrollPreset {
        timeline,
        trigger: TriggerSpec::default().scrub(true),
    }
}

/// Background zoom for hovered cards: 1.0 at rest, 1.1 hovered, on a gentle spring
pub fn hover_scale() -> (HoverTargets, SpringConfig) {
    (
        HoverTargets {
            rest: 1.0,
            hovered: 1.1,
        },
        SpringConfig::gentle(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinetic_core::{Interpolate, PropertyValue};

    fn alpha(value: &PropertyValue) -> f32 {
        value.as_color().map(|c| c.a).unwrap()
    }

    #[test]
    fn test_text_reveal_shape() {
        let chars: Vec<ElementId> = (1..=5).map(ElementId::new).collect();
        let dim = Color::WHITE.with_alpha(0.1);
        let preset = text_reveal(&chars, Color::WHITE, dim);

        assert!(preset.trigger.scrub);
        assert_eq!(preset.trigger.start.to_string(), "top 85%");
        assert_eq!(preset.trigger.end.to_string(), "bottom 15%");

        // Character i lights at i * 0.05 and dims 0.2s after it is fully lit
        let starts = preset.timeline.step_starts(false);
        assert_eq!(starts.len(), 2 * chars.len());
        for (i, pair) in starts.chunks(2).enumerate() {
            assert!((pair[0] - 0.05 * i as f32).abs() < 1e-6, "{starts:?}");
            assert!((pair[1] - (0.05 * i as f32 + 0.5)).abs() < 1e-6, "{starts:?}");
        }

        // Resolved the way a scrubbed bind resolves it
        let resolved = preset.timeline.resolve(false, |_, p| p.default_value());
        assert_eq!(resolved.track_count(), chars.len());
        assert!((resolved.duration() - 1.0).abs() < 1e-5);
        for (_, _, value) in resolved.sample(0.0) {
            assert!(value.approx_eq(&PropertyValue::Color(dim), 1e-6));
        }
        for (_, _, value) in resolved.sample(1.0) {
            assert!(value.approx_eq(&PropertyValue::Color(dim), 1e-5));
        }
    }

    #[test]
    fn test_text_reveal_sweeps_in_order() {
        let chars: Vec<ElementId> = (1..=5).map(ElementId::new).collect();
        let dim = Color::WHITE.with_alpha(0.1);
        let preset = text_reveal(&chars, Color::WHITE, dim);
        let resolved = preset.timeline.resolve(false, |_, p| p.default_value());

        let alphas: Vec<f32> = resolved.sample(0.3).map(|(_, _, v)| alpha(&v)).collect();
        assert_eq!(alphas.len(), chars.len());
        assert!((alphas[0] - 1.0).abs() < 1e-5, "{alphas:?}");
        assert!(alphas.windows(2).all(|w| w[0] >= w[1]), "{alphas:?}");
        assert!(alphas[0] > alphas[4] + 0.2, "{alphas:?}");
    }

    #[test]
    fn test_caption_actions() {
        let preset = caption_fade_in(ElementId::new(1));
        assert_eq!(
            preset.trigger.toggle_actions.to_string(),
            "play reverse play reverse"
        );
        assert_eq!(preset.trigger.start.to_string(), "top 80%");
    }

    #[test]
    fn test_card_entrance_starts_hidden() {
        let card = ElementId::new(1);
        let preset = card_entrance(card);
        let resolved = preset.timeline.resolve(true, |_, p| p.default_value());
        let at_zero: Vec<_> = resolved.sample(0.0).map(|(_, p, v)| (p.clone(), v)).collect();
        assert_eq!(
            at_zero,
            vec![
                (Property::TranslateY, 100.0_f32.into()),
                (Property::Opacity, 0.0_f32.into()),
                (Property::Scale, 0.95_f32.into()),
            ]
        );
        assert!((resolved.duration() - 1.2).abs() < 1e-6);
    }

    #[test]
    fn test_parallax_is_scrubbed() {
        let preset = parallax(ElementId::new(1), -30.0);
        assert!(preset.trigger.scrub);
        let resolved = preset.timeline.resolve(false, |_, p| p.default_value());
        let (_, _, end) = resolved.sample(1.0).next().unwrap();
        assert!((end.as_float().unwrap() + 30.0).abs() < 1e-5);
    }
}
