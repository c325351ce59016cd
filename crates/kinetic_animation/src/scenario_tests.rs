//! End-to-end scenarios through a headless host

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use kinetic_core::{
    Bounds, Color, ElementId, HeadlessHost, Interpolate, Point, PointerCapabilities, Property,
    PropertyValue, Size,
};
use tracing_subscriber::EnvFilter;

use crate::context::{AnimationContext, Registration};
use crate::easing::Easing;
use crate::error::AnimationError;
use crate::presets;
use crate::signal::{PointerOffset, TiltConfig};
use crate::spring::SpringConfig;
use crate::subscription::Subscription;
use crate::timeline::{Timeline, TimelineStep};
use crate::trigger::TriggerSpec;
use crate::viewport::{Transition, TriggerEvent};
use crate::{MotionConfig, RegistrationOptions};

const ROOT: ElementId = ElementId::new(0);
const SECTION: ElementId = ElementId::new(1);
const CARD: ElementId = ElementId::new(2);
const MISSING: ElementId = ElementId::new(99);

const DESKTOP: Size = Size::new(1280.0, 800.0);

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Host with a 300px-tall section at y=2000 and a 200x200 card at (100, 100)
fn setup(viewport: Size) -> (Rc<HeadlessHost>, AnimationContext) {
    init_tracing();
    let host = Rc::new(HeadlessHost::new(viewport));
    host.insert_element(SECTION, Bounds::new(2000.0, 0.0, 400.0, 300.0));
    host.insert_element(CARD, Bounds::new(100.0, 100.0, 200.0, 200.0));
    let ctx = AnimationContext::scope(host.clone(), ROOT, MotionConfig::default());
    (host, ctx)
}

fn progress_log(ctx: &AnimationContext, element: ElementId, spec: TriggerSpec) -> (Subscription, Rc<RefCell<Vec<f32>>>) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    let sub = ctx.observe(element, spec, move |event| {
        if let TriggerEvent::Progress(p) = event {
            sink.borrow_mut().push(*p);
        }
    });
    (sub, log)
}

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

#[test]
fn test_scrub_progress_is_bounded_and_monotonic() {
    let (host, ctx) = setup(DESKTOP);
    let spec = TriggerSpec::between("top 85%", "bottom 15%").unwrap().scrub(true);
    let (_sub, log) = progress_log(&ctx, SECTION, spec);

    // start = 2000 - 680 = 1320, end = 2300 - 120 = 2180
    for offset in (0..=30).map(|i| i as f32 * 100.0) {
        host.scroll_to(offset);
        host.run_frames(1);
    }

    let log = log.borrow();
    assert_eq!(log.first().copied(), Some(0.0));
    assert_eq!(log.last().copied(), Some(1.0));
    assert!(log.iter().all(|p| (0.0..=1.0).contains(p)));
    assert!(log.windows(2).all(|w| w[0] < w[1]), "{log:?}");
    // No jump larger than one 100px scroll step
    assert!(log.windows(2).all(|w| w[1] - w[0] <= 100.0 / 860.0 + 1e-5));
}

#[test]
fn test_scrubbed_text_reveal() {
    let (host, ctx) = setup(DESKTOP);
    let chars: Vec<ElementId> = (10..15).map(ElementId::new).collect();
    let dim = Color::WHITE.with_alpha(0.1);
    let preset = presets::text_reveal(&chars, Color::WHITE, dim);
    let sub = ctx.bind(preset.timeline, SECTION, preset.trigger);
    assert!(sub.is_active());

    // Bound at t=0: every character starts dim
    for c in &chars {
        assert_eq!(host.applied(*c, &Property::Color), Some(PropertyValue::Color(dim)));
    }

    // Progress 0.3 of [1320, 2180] is t=0.3 of the 1.0s timeline: the first
    // character is fully lit and the rest trail behind it
    host.scroll_to(1320.0 + 0.3 * 860.0);
    host.run_frames(1);
    let alphas: Vec<f32> = chars
        .iter()
        .map(|c| host.applied(*c, &Property::Color).and_then(|v| v.as_color()).unwrap().a)
        .collect();
    assert!((alphas[0] - 1.0).abs() < 1e-3, "{alphas:?}");
    assert!(alphas.windows(2).all(|w| w[0] >= w[1]), "{alphas:?}");
    assert!(alphas[0] > alphas[chars.len() - 1] + 0.2, "{alphas:?}");

    // Past the end every character has dimmed again
    host.scroll_to(2400.0);
    host.run_frames(1);
    for c in &chars {
        let value = host.applied(*c, &Property::Color).unwrap();
        assert!(value.approx_eq(&PropertyValue::Color(dim), 1e-3), "{value:?}");
    }

    // Scrubbing back restores the start state
    host.scroll_to(0.0);
    host.run_frames(1);
    for c in &chars {
        let value = host.applied(*c, &Property::Color).unwrap();
        assert!(value.approx_eq(&PropertyValue::Color(dim), 1e-6));
    }
}

#[test]
fn test_toggle_round_trip_is_symmetric() {
    let (host, ctx) = setup(DESKTOP);
    let preset = presets::caption_fade_in(SECTION);

    let transitions = Rc::new(RefCell::new(Vec::new()));
    let sink = transitions.clone();
    let _observer = ctx.observe(SECTION, preset.trigger, move |event| {
        if let TriggerEvent::Toggle { transition, .. } = event {
            sink.borrow_mut().push(*transition);
        }
    });
    let _binding = ctx.bind(preset.timeline, SECTION, preset.trigger);
    assert_eq!(host.applied_float(SECTION, &Property::Opacity), Some(0.0));

    // start = 2000 - 640 = 1360, end = 2300
    let expected = [(1500.0, 1.0, 0.0), (2500.0, 0.0, -20.0), (1500.0, 1.0, 0.0), (0.0, 0.0, -20.0)];
    for (offset, opacity, x) in expected {
        host.scroll_to(offset);
        host.run_until_idle(600);
        assert_eq!(host.applied_float(SECTION, &Property::Opacity), Some(opacity), "at {offset}");
        assert_eq!(host.applied_float(SECTION, &Property::TranslateX), Some(x), "at {offset}");
    }

    assert_eq!(
        *transitions.borrow(),
        vec![
            Transition::Enter,
            Transition::Leave,
            Transition::EnterBack,
            Transition::LeaveBack
        ]
    );
}

#[test]
fn test_jump_across_trigger_fires_both_transitions() {
    let (host, ctx) = setup(DESKTOP);
    let transitions = Rc::new(RefCell::new(Vec::new()));
    let sink = transitions.clone();
    let _sub = ctx.observe(SECTION, TriggerSpec::default(), move |event| {
        if let TriggerEvent::Toggle { transition, .. } = event {
            sink.borrow_mut().push(*transition);
        }
    });
    host.run_frames(1);

    host.scroll_to(5000.0);
    host.run_frames(1);
    assert_eq!(*transitions.borrow(), vec![Transition::Enter, Transition::Leave]);

    // Out and back within one frame nets out
    host.scroll_to(1000.0);
    host.scroll_to(5000.0);
    host.run_frames(1);
    assert_eq!(transitions.borrow().len(), 2);
}

#[test]
fn test_stagger_plays_targets_in_declaration_order() {
    let (host, ctx) = setup(DESKTOP);
    // Section already on screen: entered on the first frame
    host.insert_element(SECTION, Bounds::new(100.0, 0.0, 400.0, 500.0));
    let items: Vec<ElementId> = (20..23).map(ElementId::new).collect();
    let timeline = Timeline::new().step(
        TimelineStep::new(items.clone())
            .from_to(Property::Opacity, 0.0_f32, 1.0_f32)
            .duration(0.3)
            .easing(Easing::Linear)
            .stagger(0.1),
    );
    let _sub = ctx.bind(timeline, SECTION, TriggerSpec::default());

    host.run_frames(10);
    let opacity: Vec<f32> = items
        .iter()
        .map(|e| host.applied_float(*e, &Property::Opacity).unwrap())
        .collect();
    assert!(opacity[0] > opacity[1], "{opacity:?}");
    assert!(opacity[1] > opacity[2], "{opacity:?}");
    assert_eq!(opacity[2], 0.0);

    host.run_until_idle(600);
    for e in &items {
        assert!(close(host.applied_float(*e, &Property::Opacity).unwrap(), 1.0));
    }
}

#[test]
fn test_scroll_events_coalesce_into_one_frame() {
    let (host, ctx) = setup(DESKTOP);
    let _sub = ctx.observe(SECTION, TriggerSpec::default(), |_| {});
    host.run_until_idle(10);
    let before = ctx.stats();

    for i in 0..10 {
        host.scroll_to(i as f32 * 40.0);
    }
    assert_eq!(host.pending_frames(), 1);
    host.run_frames(1);

    let after = ctx.stats();
    assert_eq!(after.frames, before.frames + 1);
    assert_eq!(after.events, before.events + 10);
    assert_eq!(host.pending_frames(), 0);
}

#[test]
fn test_dispose_is_idempotent_and_stops_writes() {
    let (host, ctx) = setup(DESKTOP);
    let sub = ctx
        .spring_to(CARD, Property::TranslateX, 100.0, SpringConfig::gentle())
        .unwrap();
    host.run_frames(5);
    assert!(host.write_count() > 0);
    assert_eq!(host.listener_count(), 4);

    ctx.dispose();
    ctx.dispose();
    assert!(ctx.is_disposed());
    assert!(!sub.is_active());
    assert_eq!(host.listener_count(), 0);
    assert_eq!(host.pending_frames(), 0);

    let writes = host.write_count();
    host.scroll_to(500.0);
    host.run_frames(5);
    assert_eq!(host.write_count(), writes);

    // Registrations after dispose are inert
    assert!(!ctx.observe(SECTION, TriggerSpec::default(), |_| {}).is_active());
}

#[test]
fn test_drop_releases_host_resources() {
    let (host, ctx) = setup(DESKTOP);
    let sub = ctx.observe(SECTION, TriggerSpec::default(), |_| {});
    drop(ctx);
    assert!(!sub.is_active());
    assert_eq!(host.listener_count(), 0);
    assert_eq!(host.pending_frames(), 0);
}

#[test]
fn test_callback_cancelling_itself_gets_no_more_events() {
    let (host, ctx) = setup(DESKTOP);
    let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
    let count = Rc::new(Cell::new(0));

    let (s, c) = (slot.clone(), count.clone());
    let sub = ctx.observe(SECTION, TriggerSpec::default(), move |_| {
        c.set(c.get() + 1);
        if let Some(sub) = s.borrow().as_ref() {
            sub.cancel();
        }
    });
    *slot.borrow_mut() = Some(sub.clone());

    host.scroll_to(1500.0);
    host.run_frames(1);
    assert_eq!(count.get(), 1);
    assert!(!sub.is_active());

    host.scroll_to(3000.0);
    host.run_frames(1);
    assert_eq!(count.get(), 1);
}

#[test]
fn test_callbacks_may_register_while_the_frame_runs() {
    init_tracing();
    let host = Rc::new(HeadlessHost::new(DESKTOP));
    host.insert_element(SECTION, Bounds::new(2000.0, 0.0, 400.0, 300.0));
    host.insert_element(CARD, Bounds::new(100.0, 100.0, 200.0, 200.0));
    let ctx = Rc::new(AnimationContext::scope(host.clone(), ROOT, MotionConfig::default()));

    let nested = Rc::new(RefCell::new(Vec::new()));
    let (weak, sink) = (Rc::downgrade(&ctx), nested.clone());
    let _sub = ctx.observe(SECTION, TriggerSpec::default(), move |_| {
        let Some(ctx) = weak.upgrade() else { return };
        if sink.borrow().is_empty() {
            let inner = ctx.observe(CARD, TriggerSpec::default(), |_| {});
            sink.borrow_mut().push(inner);
        }
    });

    host.run_frames(1);
    let nested = nested.borrow();
    assert_eq!(nested.len(), 1);
    assert!(nested[0].is_active());
}

#[test]
fn test_reduced_mode_pins_pointer_offset() {
    init_tracing();
    let host = Rc::new(HeadlessHost::new(Size::new(500.0, 800.0)));
    host.insert_element(CARD, Bounds::new(100.0, 100.0, 200.0, 200.0));
    let ctx = AnimationContext::scope(host.clone(), ROOT, MotionConfig::default());
    assert!(ctx.is_reduced_motion());

    let offsets = Rc::new(RefCell::new(Vec::new()));
    let sink = offsets.clone();
    let _sub = ctx.pointer_signal(CARD, move |offset| sink.borrow_mut().push(offset));

    host.move_pointer(Point::new(250.0, 180.0));
    host.run_frames(1);
    host.move_pointer(Point::new(150.0, 120.0));
    host.run_frames(1);
    assert_eq!(*offsets.borrow(), vec![PointerOffset::ZERO]);

    // Widening the viewport leaves reduced mode
    host.resize(DESKTOP);
    host.move_pointer(Point::new(250.0, 180.0));
    host.run_frames(1);
    assert!(!ctx.is_reduced_motion());
    assert_eq!(
        *offsets.borrow(),
        vec![PointerOffset::ZERO, PointerOffset::new(50.0, -20.0)]
    );
}

#[test]
fn test_touch_primary_is_reduced_at_any_width() {
    init_tracing();
    let host = Rc::new(HeadlessHost::new(DESKTOP));
    host.set_pointer_capabilities(PointerCapabilities::TOUCH);
    host.insert_element(CARD, Bounds::new(100.0, 100.0, 200.0, 200.0));
    let ctx = AnimationContext::scope(host.clone(), ROOT, MotionConfig::default());
    assert!(ctx.is_reduced_motion());

    let _tilt = ctx.tilt(CARD, TiltConfig::default()).unwrap();
    host.move_pointer(Point::new(250.0, 180.0));
    host.run_until_idle(600);
    assert_eq!(host.applied_float(CARD, &Property::RotateX), Some(0.0));
    assert_eq!(host.applied_float(CARD, &Property::RotateY), Some(0.0));
}

fn run_tilt(host: &HeadlessHost, ctx: &AnimationContext) -> Vec<(f32, f32)> {
    let _tilt = ctx.tilt(CARD, TiltConfig::default()).unwrap();
    host.move_pointer(Point::new(250.0, 180.0));
    let mut trace = Vec::new();
    for _ in 0..120 {
        host.run_frames(1);
        trace.push((
            host.applied_float(CARD, &Property::RotateX).unwrap_or(0.0),
            host.applied_float(CARD, &Property::RotateY).unwrap_or(0.0),
        ));
    }
    trace
}

#[test]
fn test_tilt_follows_pointer_deterministically() {
    let (host_a, ctx_a) = setup(DESKTOP);
    let (host_b, ctx_b) = setup(DESKTOP);
    let a = run_tilt(&host_a, &ctx_a);
    let b = run_tilt(&host_b, &ctx_b);
    assert_eq!(a, b);

    // offset (50, -20): rotateY 4deg, rotateX 1.6deg
    let (rx, ry) = *a.last().unwrap();
    assert!(close(rx, 1.6), "rotateX {rx}");
    assert_eq!(ry, 4.0);
}

#[test]
fn test_tilt_returns_to_rest_when_pointer_leaves() {
    let (host, ctx) = setup(DESKTOP);
    let _tilt = ctx.tilt(CARD, TiltConfig::default()).unwrap();
    host.move_pointer(Point::new(250.0, 180.0));
    host.run_until_idle(600);
    assert_eq!(host.applied_float(CARD, &Property::RotateY), Some(4.0));

    host.leave_pointer();
    host.run_until_idle(600);
    assert_eq!(host.applied_float(CARD, &Property::RotateX), Some(0.0));
    assert_eq!(host.applied_float(CARD, &Property::RotateY), Some(0.0));
}

#[test]
fn test_hover_round_trip() {
    let (host, ctx) = setup(DESKTOP);
    let (targets, spring) = presets::hover_scale();
    let _hover = ctx.hover(CARD, Property::Scale, targets, spring).unwrap();
    host.run_until_idle(600);
    assert_eq!(host.applied_float(CARD, &Property::Scale), Some(1.0));

    host.move_pointer(Point::new(200.0, 200.0));
    host.run_until_idle(600);
    assert_eq!(host.applied_float(CARD, &Property::Scale), Some(1.1));

    host.move_pointer(Point::new(900.0, 700.0));
    host.run_until_idle(600);
    assert_eq!(host.applied_float(CARD, &Property::Scale), Some(1.0));
}

#[test]
fn test_revert_restores_pre_animation_values() {
    let (host, ctx) = setup(DESKTOP);
    ctx.seed(CARD, Property::Opacity, 0.5_f32);
    let _fade = ctx
        .spring_to(CARD, Property::Opacity, 1.0, SpringConfig::stiff())
        .unwrap();
    let _slide = ctx
        .spring_to(CARD, Property::TranslateX, 30.0, SpringConfig::stiff())
        .unwrap();
    host.run_until_idle(600);
    assert_eq!(host.applied_float(CARD, &Property::Opacity), Some(1.0));
    assert_eq!(host.applied_float(CARD, &Property::TranslateX), Some(30.0));
    assert_eq!(ctx.target(CARD).and_then(|t| t.float(&Property::Opacity)), Some(1.0));

    ctx.revert();
    assert!(ctx.is_disposed());
    assert_eq!(host.applied_float(CARD, &Property::Opacity), Some(0.5));
    assert_eq!(host.applied_float(CARD, &Property::TranslateX), Some(0.0));
}

#[test]
fn test_over_budget_frame_defers_writes_once() {
    let (host, ctx) = setup(DESKTOP);
    let _tilt = ctx.tilt(CARD, TiltConfig::default()).unwrap();
    host.run_until_idle(600);
    let writes = host.write_count();

    // Every measurement now costs more than a whole frame
    host.set_measure_cost(20.0);
    host.move_pointer(Point::new(250.0, 180.0));
    host.run_frames(1);
    assert_eq!(host.write_count(), writes);
    assert_eq!(ctx.stats().deferred_frames, 1);

    host.run_frames(1);
    assert!(host.write_count() > writes);
    assert_eq!(ctx.stats().deferred_frames, 1);
}

#[test]
fn test_unmeasurable_targets_give_inert_subscriptions() {
    let (host, ctx) = setup(DESKTOP);
    host.insert_element(ElementId::new(3), Bounds::new(0.0, 0.0, 0.0, 100.0));

    assert!(!ctx.observe(MISSING, TriggerSpec::default(), |_| {}).is_active());
    assert!(!ctx
        .observe(ElementId::new(3), TriggerSpec::default(), |_| {})
        .is_active());
    assert!(!ctx
        .bind(presets::card_entrance(MISSING).timeline, MISSING, TriggerSpec::default())
        .is_active());
    assert!(!ctx.pointer_signal(MISSING, |_| {}).is_active());
    assert!(!ctx.tilt(MISSING, TiltConfig::default()).unwrap().is_active());
    assert!(!ctx
        .spring_to(MISSING, Property::Opacity, 1.0, SpringConfig::default())
        .unwrap()
        .is_active());
}

#[test]
fn test_unstable_springs_are_rejected() {
    let (_host, ctx) = setup(DESKTOP);
    assert!(matches!(
        ctx.spring_to(CARD, Property::Opacity, 1.0, SpringConfig::new(0.0, 10.0, 1.0)),
        Err(AnimationError::UnstableSpring { .. })
    ));
    assert!(matches!(
        ctx.follow(0.0, SpringConfig::new(100.0, 10.0, 0.0)),
        Err(AnimationError::UnstableSpring { .. })
    ));
    let tilt = TiltConfig {
        spring: SpringConfig::new(100.0, -1.0, 1.0),
        ..TiltConfig::default()
    };
    assert!(ctx.tilt(CARD, tilt).is_err());
    assert!(ctx
        .register(Registration::Spring {
            element: CARD,
            property: Property::Scale,
            target: 1.1,
            config: SpringConfig::new(f32::NAN, 10.0, 1.0),
        })
        .is_err());
}

#[test]
fn test_follow_handle_retargets() {
    let (host, ctx) = setup(DESKTOP);
    let handle = ctx.follow(0.0, SpringConfig::stiff()).unwrap();
    assert!(handle.is_settled());

    handle.set_target(10.0);
    assert!(!handle.is_settled());
    host.run_frames(3);
    let midway = handle.value().unwrap();
    assert!(midway > 0.0 && midway < 10.0, "{midway}");

    host.run_until_idle(600);
    assert_eq!(handle.value(), Some(10.0));
    assert!(handle.is_settled());

    handle.snap_to(-5.0);
    assert_eq!(handle.value(), Some(-5.0));
    assert!(handle.cancel());
    assert!(!handle.cancel());
}

#[test]
fn test_register_dispatches_by_kind() {
    let (host, ctx) = setup(DESKTOP);
    let hits = Rc::new(Cell::new(0));
    let sink = hits.clone();
    let trigger = ctx
        .register(Registration::Trigger {
            element: SECTION,
            spec: TriggerSpec::default(),
            callback: Rc::new(move |_: &TriggerEvent| sink.set(sink.get() + 1)),
        })
        .unwrap();
    let timeline = ctx
        .register(Registration::Timeline {
            trigger: SECTION,
            spec: TriggerSpec::default().scrub(true),
            timeline: presets::parallax(SECTION, -30.0).timeline,
        })
        .unwrap();
    assert!(trigger.is_active() && timeline.is_active());

    host.run_frames(1);
    assert!(hits.get() > 0);
}

#[test]
fn test_bind_with_options() {
    let (host, ctx) = setup(DESKTOP);
    let options: RegistrationOptions = serde_json::from_str(
        r#"{ "start": "top 80%", "end": "top 20%", "scrub": true, "easing": "linear", "duration": 1.0 }"#,
    )
    .unwrap();
    let timeline = Timeline::new().step(
        TimelineStep::new([SECTION]).from_to(Property::Opacity, 0.0_f32, 1.0_f32),
    );
    let _sub = ctx.bind_with_options(timeline, SECTION, &options);

    // start = 2000 - 640 = 1360, end = 2000 - 160 = 1840
    host.scroll_to(1600.0);
    host.run_frames(1);
    assert!(close(host.applied_float(SECTION, &Property::Opacity).unwrap(), 0.5));
}

#[test]
fn test_resize_reresolves_triggers() {
    let (host, ctx) = setup(DESKTOP);
    let spec = TriggerSpec::between("top 85%", "bottom 15%").unwrap();
    let (_sub, log) = progress_log(&ctx, SECTION, spec);

    host.scroll_to(1320.0);
    host.run_frames(1);
    assert_eq!(log.borrow().last().copied(), Some(0.0));

    // start = 2000 - 850 = 1150, end = 2300 - 150 = 2150
    host.resize(Size::new(1280.0, 1000.0));
    host.run_frames(1);
    let p = log.borrow().last().copied().unwrap();
    assert!(close(p, 0.17), "{p}");
}

#[test]
fn test_invalid_config_falls_back_to_defaults() {
    init_tracing();
    let host = Rc::new(HeadlessHost::new(DESKTOP));
    let config = MotionConfig {
        frame_budget_ms: -1.0,
        ..MotionConfig::default()
    };
    let ctx = AnimationContext::scope(host, ROOT, config);
    assert_eq!(*ctx.config(), MotionConfig::default());
}

#[test]
fn test_spring_to_with_options() {
    let (host, ctx) = setup(DESKTOP);

    let unstable: RegistrationOptions = serde_json::from_str(r#"{ "stiffness": 0 }"#).unwrap();
    assert!(matches!(
        ctx.spring_to_with_options(CARD, Property::Scale, 1.2, SpringConfig::gentle(), &unstable),
        Err(AnimationError::UnstableSpring { .. })
    ));

    let options: RegistrationOptions =
        serde_json::from_str(r#"{ "stiffness": 300, "damping": 30 }"#).unwrap();
    let sub = ctx
        .spring_to_with_options(CARD, Property::Scale, 1.2, SpringConfig::gentle(), &options)
        .unwrap();
    assert!(sub.is_active());

    host.run_until_idle(600);
    assert_eq!(host.applied_float(CARD, &Property::Scale), Some(1.2));
}
