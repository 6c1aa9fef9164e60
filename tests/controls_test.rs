mod common;

use cgmath::{InnerSpace, Vector3};
use common::test_utils::{approx, approx_vec};
use learn_ngin::{
    camera::Camera,
    config::ControlSettings,
    controls::{FrameCommands, look, movement},
    data_structures::light::Light,
    input::Input,
    winit::keyboard::KeyCode,
};

fn held(keys: &[KeyCode]) -> Input {
    let mut input = Input::new();
    for key in keys {
        input.set_key(*key, true);
    }
    input
}

#[test]
fn w_moves_along_forward_scaled_by_speed_and_dt() {
    let camera = Camera::default();
    let settings = ControlSettings::default();
    let moved = movement(&held(&[KeyCode::KeyW]), &camera, &settings, 0.5);
    assert!(approx_vec(moved, camera.forward() * settings.move_speed * 0.5));
}

#[test]
fn opposite_keys_cancel() {
    let camera = Camera::default();
    let moved = movement(
        &held(&[KeyCode::KeyW, KeyCode::KeyS, KeyCode::KeyA, KeyCode::KeyD]),
        &camera,
        &ControlSettings::default(),
        1.0,
    );
    assert!(approx(moved.magnitude(), 0.0));
}

#[test]
fn strafe_and_vertical_follow_the_camera_basis() {
    let camera = Camera::default();
    let settings = ControlSettings::default().with_move_speed(1.0);
    let left = movement(&held(&[KeyCode::KeyA]), &camera, &settings, 1.0);
    assert!(approx_vec(left, -camera.right()));
    let down = movement(&held(&[KeyCode::KeyC]), &camera, &settings, 1.0);
    assert!(approx_vec(down, -camera.up()));
    let up = movement(&held(&[KeyCode::Space]), &camera, &settings, 1.0);
    assert!(approx_vec(up, Vector3::new(0.0, 1.0, 0.0)));
}

#[test]
fn control_slows_and_wins_over_shift() {
    let camera = Camera::default();
    let settings = ControlSettings::default();
    let base = movement(&held(&[KeyCode::KeyW]), &camera, &settings, 1.0).magnitude();
    let fast = movement(&held(&[KeyCode::KeyW, KeyCode::ShiftLeft]), &camera, &settings, 1.0).magnitude();
    let slow = movement(
        &held(&[KeyCode::KeyW, KeyCode::ShiftLeft, KeyCode::ControlLeft]),
        &camera,
        &settings,
        1.0,
    )
    .magnitude();
    assert!(approx(fast, base * settings.fast_multiplier));
    assert!(approx(slow, base * settings.slow_multiplier));
}

#[test]
fn function_keys_pick_polygon_mode_and_end_quits() {
    let settings = ControlSettings::default();
    assert_eq!(
        FrameCommands::sample(&held(&[KeyCode::F2]), &settings).polygon_mode,
        Some(wgpu::PolygonMode::Line)
    );
    assert_eq!(
        FrameCommands::sample(&held(&[KeyCode::F1, KeyCode::F2]), &settings).polygon_mode,
        Some(wgpu::PolygonMode::Fill)
    );
    assert_eq!(FrameCommands::sample(&Input::new(), &settings), FrameCommands::default());
    assert!(FrameCommands::sample(&held(&[KeyCode::End]), &settings).close);
}

#[test]
fn spot_keys_stop_at_the_range_limits() {
    let settings = ControlSettings::default();
    let mut spot = Light::spot(
        Vector3::new(0.0, 0.0, 0.0),
        Vector3::new(0.0, 0.0, -1.0),
        Vector3::new(1.0, 1.0, 1.0),
        89.99,
        0.998,
    );

    let widen = FrameCommands::sample(&held(&[KeyCode::KeyT, KeyCode::KeyY]), &settings);
    widen.apply_to_spot(&mut spot);
    // 89.99 + 0.05 and 0.998 + 0.005 are out of range and skipped
    assert!(approx(spot.angle_raw(), 89.99));
    assert!(approx(spot.blur_raw(), 0.998));

    let narrow = FrameCommands::sample(&held(&[KeyCode::KeyG, KeyCode::KeyH]), &settings);
    narrow.apply_to_spot(&mut spot);
    assert!(approx(spot.angle_raw(), 89.94));
    assert!(approx(spot.blur_raw(), 0.993));
}

#[test]
fn blur_never_reaches_zero_from_the_keys() {
    let settings = ControlSettings::default();
    let mut spot = Light::spot(
        Vector3::new(0.0, 0.0, 0.0),
        Vector3::new(0.0, 0.0, -1.0),
        Vector3::new(1.0, 1.0, 1.0),
        10.0,
        0.004,
    );
    FrameCommands::sample(&held(&[KeyCode::KeyH]), &settings).apply_to_spot(&mut spot);
    assert!(approx(spot.blur_raw(), 0.004));
}

#[test]
fn grabbed_cursor_looks_with_raw_motion() {
    let settings = ControlSettings::default();
    let mut camera = Camera::default();
    let yaw = camera.yaw();
    let mut input = Input::new();
    input.add_mouse_motion(10.0, 0.0);
    input.set_cursor(500.0, 500.0);

    look(&input, &mut camera, &settings, true);
    assert!(approx(camera.yaw(), yaw + 10.0 * settings.mouse_sensitivity));
}

#[test]
fn free_cursor_looks_by_position_offsets() {
    let settings = ControlSettings::default();
    let mut camera = Camera::default();
    let yaw = camera.yaw();
    let mut input = Input::new();
    input.add_mouse_motion(50.0, 0.0);

    // no position yet and raw motion is ignored
    look(&input, &mut camera, &settings, false);
    assert!(approx(camera.yaw(), yaw));

    // the first position only anchors the offset
    input.set_cursor(100.0, 100.0);
    look(&input, &mut camera, &settings, false);
    assert!(approx(camera.yaw(), yaw));

    input.set_cursor(120.0, 100.0);
    look(&input, &mut camera, &settings, false);
    assert!(approx(camera.yaw(), yaw + 20.0 * settings.mouse_sensitivity));
}
