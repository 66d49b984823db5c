//! Integration tests for the animation module.

use glide_core::animation::*;
use proptest::prelude::*;
use std::time::Duration;

const FRAME: Duration = Duration::from_millis(16);

#[test]
fn easing_functions_are_monotonic() {
    for easing in [linear, ease_in, ease_out, ease_in_out, ease_out_cubic] {
        let mut prev = 0.0f32;
        for i in 0..=100 {
            let t = i as f32 / 100.0;
            let v = easing(t);
            assert!(v >= prev - 0.001, "easing should be monotonic at t={t}");
            prev = v;
        }
    }
}

#[test]
fn staggered_content_trails_appearance() {
    // 400 ms entry: appearance tweens immediately, content waits 120 ms.
    let mut appearance = Tween::new(Duration::from_millis(400)).easing(ease_out_cubic);
    let mut content = delay(
        Duration::from_millis(120),
        Tween::new(Duration::from_millis(280)),
    );
    for _ in 0..7 {
        appearance.tick(FRAME);
        content.tick(FRAME);
        assert!(content.value() <= appearance.value());
    }
    for _ in 0..20 {
        appearance.tick(FRAME);
        content.tick(FRAME);
    }
    assert!(appearance.is_complete());
    assert!(content.is_complete());
}

#[test]
fn spring_with_momentum_still_settles() {
    let mut spring = Spring::new(SpringSpec::SPRING_BACK).with_initial_velocity(-4.0);
    for _ in 0..600 {
        spring.tick(FRAME);
    }
    assert!(spring.is_complete());
    assert_eq!(spring.value(), 1.0);
}

proptest! {
    #[test]
    fn easing_outputs_bounded(t in -10.0f32..10.0f32) {
        for easing in [linear, ease_in, ease_out, ease_in_out, ease_out_cubic] {
            let v = easing(t);
            prop_assert!(
                (0.0..=1.0).contains(&v),
                "easing output out of range: t={t} v={v}"
            );
        }
    }

    #[test]
    fn tween_completes_when_tick_ge_duration(duration_ms in 1u64..5000, extra_ms in 0u64..5000) {
        let mut tween = Tween::new(Duration::from_millis(duration_ms));
        tween.tick(Duration::from_millis(duration_ms + extra_ms));
        prop_assert!(tween.is_complete());
        prop_assert!(tween.value() <= 1.0 + f32::EPSILON);
    }

    #[test]
    fn tween_value_stays_in_unit_range(duration_ms in 1u64..2000, ticks in 1usize..200) {
        let mut tween = Tween::new(Duration::from_millis(duration_ms)).easing(ease_in_out);
        for _ in 0..ticks {
            tween.tick(FRAME);
            prop_assert!((0.0..=1.0).contains(&tween.value()));
        }
    }

    #[test]
    fn critical_spring_stays_finite(stiffness in 50.0f32..800.0, frames in 1usize..300) {
        let mut spring = Spring::new(SpringSpec::CRITICAL.stiffness(stiffness));
        for _ in 0..frames {
            spring.tick(FRAME);
        }
        prop_assert!(spring.value().is_finite());
        prop_assert!(spring.value() <= 1.0 + 1e-2);
    }
}
