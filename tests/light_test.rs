mod common;

use cgmath::Vector3;
use common::test_utils::{approx, approx_vec};
use learn_ngin::data_structures::light::{
    Light, LightKind, LightsUniform, MAX_POINT_LIGHTS, MAX_SPOT_LIGHTS,
};

fn spot() -> Light {
    Light::spot(
        Vector3::new(0.0, 1.0, 0.0),
        Vector3::new(0.0, -1.0, 0.0),
        Vector3::new(1.0, 1.0, 1.0),
        12.5,
        0.2,
    )
}

#[test]
fn spot_angle_is_clamped_to_a_quarter_turn() {
    let mut light = spot();
    light.set_angle(120.0);
    assert_eq!(light.angle_raw(), 90.0);
    light.set_angle(-3.0);
    assert_eq!(light.angle_raw(), 0.0);
    light.set_angle(f32::NAN);
    assert_eq!(light.angle_raw(), 0.0);
}

#[test]
fn spot_blur_is_clamped_to_unit_range() {
    let mut light = spot();
    light.set_blur(1.5);
    assert_eq!(light.blur_raw(), 1.0);
    light.set_blur(-0.5);
    assert_eq!(light.blur_raw(), 0.0);
    light.set_blur(f32::INFINITY);
    assert_eq!(light.blur_raw(), 0.0);
}

#[test]
fn constructor_clamps_too() {
    let light = Light::spot(
        Vector3::new(0.0, 0.0, 0.0),
        Vector3::new(0.0, 0.0, -1.0),
        Vector3::new(1.0, 1.0, 1.0),
        200.0,
        2.0,
    );
    assert_eq!(light.angle_raw(), 90.0);
    assert_eq!(light.blur_raw(), 1.0);
}

#[test]
fn cutoffs_are_cosines_of_the_cone() {
    let mut light = spot();
    light.set_angle(60.0);
    light.set_blur(0.5);
    assert!(approx(light.cutoff(), 0.5));
    // inner edge at 30 degrees
    assert!(approx(light.inner_cutoff(), 3f32.sqrt() / 2.0));
}

#[test]
fn direction_follows_the_transform() {
    let light = spot();
    assert!(approx_vec(light.direction(), Vector3::new(0.0, -1.0, 0.0)));
    let sun = Light::directional(Vector3::new(1.0, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0));
    assert_eq!(sun.kind(), LightKind::Directional);
    assert!(approx_vec(sun.direction(), Vector3::new(1.0, 0.0, 0.0)));
}

#[test]
fn uniform_drops_lights_beyond_capacity() {
    let white = Vector3::new(1.0, 1.0, 1.0);
    let mut lights = vec![
        Light::directional(Vector3::new(0.0, -1.0, 0.0), white),
        Light::directional(Vector3::new(1.0, 0.0, 0.0), white),
    ];
    lights.extend((0..MAX_POINT_LIGHTS + 2).map(|i| Light::point(Vector3::new(i as f32, 0.0, 0.0), white)));
    lights.extend((0..MAX_SPOT_LIGHTS + 1).map(|_| spot()));

    let (uniform, dropped) = LightsUniform::from_lights(&lights);
    assert_eq!(dropped, 1 + 2 + 1);
    assert_eq!(
        uniform.counts(),
        [1, MAX_POINT_LIGHTS as u32, MAX_SPOT_LIGHTS as u32]
    );
}

#[test]
fn uniform_size_matches_the_shader_struct() {
    // directional 32 + 4 points * 32 + 2 spots * 64 + counts 16
    assert_eq!(std::mem::size_of::<LightsUniform>(), 304);
}
