mod common;

use cgmath::{InnerSpace, Vector3};
use common::test_utils::{approx, approx_vec};
use learn_ngin::camera::{Camera, FOV_LIMITS, PITCH_LIMIT};

fn assert_orthonormal(camera: &Camera) {
    let (f, r, u) = (camera.forward(), camera.right(), camera.up());
    assert!(approx(f.magnitude(), 1.0), "forward {f:?}");
    assert!(approx(r.magnitude(), 1.0), "right {r:?}");
    assert!(approx(u.magnitude(), 1.0), "up {u:?}");
    assert!(approx(f.dot(r), 0.0));
    assert!(approx(f.dot(u), 0.0));
    assert!(approx(r.dot(u), 0.0));
}

#[test]
fn pitch_stays_clamped_for_any_mouse_sequence() {
    let mut camera = Camera::default();
    let moves = [
        (0.0, -5000.0),
        (12.0, 3.0),
        (0.0, 9000.0),
        (-700.0, -1.0),
        (0.0, -1780.0),
        (33.0, 1780.0),
    ];
    for (dx, dy) in moves {
        camera.apply_mouse_delta(dx, dy, 0.05);
        assert!(camera.pitch() >= -PITCH_LIMIT && camera.pitch() <= PITCH_LIMIT);
        assert_orthonormal(&camera);
    }
}

#[test]
fn moving_the_mouse_up_looks_up() {
    let mut camera = Camera::default();
    camera.apply_mouse_delta(0.0, -100.0, 0.05);
    assert!(approx(camera.pitch(), 5.0));
    assert!(camera.forward().y > 0.0);
}

#[test]
fn basis_stays_orthonormal_with_unbounded_yaw() {
    let mut camera = Camera::default();
    for _ in 0..500 {
        camera.apply_mouse_delta(173.0, 7.0, 0.3);
        assert_orthonormal(&camera);
    }
    // trigonometry wraps, so yaw can grow without harm
    assert!(camera.yaw().abs() > 360.0);
}

#[test]
fn looking_straight_up_keeps_right_horizontal() {
    let mut camera = Camera::default();
    camera.set_orientation(30.0, 500.0);
    assert!(approx(camera.pitch(), PITCH_LIMIT));
    assert!(approx(camera.right().y, 0.0));
    assert_orthonormal(&camera);
}

#[test]
fn fov_is_clamped_and_vertical_follows_aspect() {
    let mut camera = Camera::new(90.0);
    camera.resize(1600, 900);
    camera.modify_fov_h(-1000.0);
    assert!(approx(camera.fov_h(), FOV_LIMITS.0));
    camera.modify_fov_h(1000.0);
    assert!(approx(camera.fov_h(), FOV_LIMITS.1));

    camera.modify_fov_h(90.0 - camera.fov_h());
    camera.set_aspect_ratio(1.0);
    assert!(approx(camera.fov_v(), 90.0));
    camera.set_aspect_ratio(2.0);
    // 2 * atan(tan(45°) / 2)
    assert!(approx(camera.fov_v(), 53.130_1));
}

#[test]
fn zero_sized_resize_is_ignored() {
    let mut camera = Camera::default();
    camera.resize(800, 400);
    camera.resize(0, 400);
    camera.resize(800, 0);
    assert!(approx(camera.aspect_ratio(), 2.0));
}

#[test]
fn translate_moves_the_view() {
    let mut camera = Camera::default();
    camera.set_position(Vector3::new(0.0, 0.0, 6.0));
    camera.translate(camera.forward() * 2.0);
    assert!(approx_vec(camera.position(), Vector3::new(0.0, 0.0, 4.0)));

    // the origin is straight ahead, 4 units away
    let view = camera.view_matrix();
    let origin = view * cgmath::Vector4::new(0.0, 0.0, 0.0, 1.0);
    assert!(approx(origin.x, 0.0) && approx(origin.y, 0.0) && approx(origin.z, -4.0));
}

#[test]
fn projection_maps_near_plane_to_zero_depth() {
    let mut camera = Camera::default();
    camera.resize(1600, 900);
    let near = camera.projection_matrix() * cgmath::Vector4::new(0.0, 0.0, -0.1, 1.0);
    assert!(approx(near.z / near.w, 0.0));
    let far = camera.projection_matrix() * cgmath::Vector4::new(0.0, 0.0, -100.0, 1.0);
    assert!(approx(far.z / far.w, 1.0));
}
