use learn_ngin::{
    AppConfig,
    timing::{DEFAULT_FIXED_STEP, FIRST_FRAME_DELTA, FPS_WINDOW, FixedStep, FrameTimer},
};

const STEP: f64 = 1.0 / 60.0;

#[test]
fn exactly_one_step_fires_once() {
    let mut fixed = FixedStep::new(STEP, 5);
    fixed.accumulate(0.004);
    assert_eq!(fixed.accumulate(STEP), 1);
    assert!((fixed.residual() - 0.004).abs() < 1e-12);
}

#[test]
fn split_deltas_summing_to_one_step_fire_once() {
    let mut fixed = FixedStep::new(STEP, 5);
    let fired: u32 = (0..3).map(|_| fixed.accumulate(STEP / 3.0)).sum();
    assert_eq!(fired, 1);

    let mut fixed = FixedStep::new(STEP, 5);
    let fired: u32 = (0..10).map(|_| fixed.accumulate(STEP / 10.0)).sum();
    assert_eq!(fired, 1);
}

#[test]
fn unusable_steps_fall_back_to_the_default() {
    for step in [0.0, -STEP, f64::NAN, f64::INFINITY] {
        let mut fixed = FixedStep::new(step, 5);
        assert_eq!(fixed.step(), DEFAULT_FIXED_STEP);
        assert_eq!(fixed.accumulate(0.016), 0);
        assert_eq!(fixed.accumulate(0.016), 1);
        assert!(fixed.residual().is_finite());
    }
    assert_eq!(AppConfig::default().with_fixed_step(0.0).fixed_step, DEFAULT_FIXED_STEP);
    assert_eq!(AppConfig::default().with_fixed_step(0.01).fixed_step, 0.01);
}

#[test]
fn short_frames_accumulate_until_a_step_is_due() {
    let mut fixed = FixedStep::new(STEP, 5);
    assert_eq!(fixed.accumulate(STEP * 0.4), 0);
    assert_eq!(fixed.accumulate(STEP * 0.4), 0);
    assert_eq!(fixed.accumulate(STEP * 0.4), 1);
    assert!((fixed.residual() - STEP * 0.2).abs() < 1e-9);
}

#[test]
fn long_frames_catch_up_with_several_steps() {
    let mut fixed = FixedStep::new(STEP, 5);
    assert_eq!(fixed.accumulate(STEP * 3.5), 3);
    assert!((fixed.residual() - STEP * 0.5).abs() < 1e-9);
}

#[test]
fn catch_up_is_capped() {
    let mut fixed = FixedStep::new(STEP, 5);
    assert_eq!(fixed.accumulate(1.0), 5);
    // the backlog is dropped, only the fractional step remains
    assert!(fixed.residual() < STEP);
    assert_eq!(fixed.accumulate(STEP * 0.5), 0);
}

#[test]
fn invalid_deltas_are_ignored() {
    let mut fixed = FixedStep::default();
    assert_eq!(fixed.accumulate(-1.0), 0);
    assert_eq!(fixed.accumulate(f64::NAN), 0);
    assert_eq!(fixed.accumulate(f64::INFINITY), 0);
    assert_eq!(fixed.residual(), 0.0);
}

#[test]
fn first_frame_uses_a_synthetic_delta() {
    let mut timer = FrameTimer::new();
    let (delta, _) = timer.tick(10.0);
    assert!((delta - FIRST_FRAME_DELTA).abs() < 1e-12);
    let (delta, _) = timer.tick(10.25);
    assert!((delta - 0.25).abs() < 1e-12);
    assert_eq!(timer.frames(), 2);
}

#[test]
fn fps_is_recomputed_every_window() {
    let mut timer = FrameTimer::new();
    let mut now = 0.0;
    let mut reports = Vec::new();
    // 100 frames per second for two seconds
    for _ in 0..200 {
        now += 0.01;
        if let (_, Some(fps)) = timer.tick(now) {
            reports.push(fps);
            assert_eq!(timer.fps(), fps);
        }
    }
    let windows = (2.0 / FPS_WINDOW) as usize;
    assert!(reports.len() == windows || reports.len() == windows - 1, "{reports:?}");
    assert!(reports.iter().all(|fps| (94..=104).contains(fps)), "{reports:?}");
}
