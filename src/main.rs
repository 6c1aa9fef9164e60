use cgmath::{Deg, Quaternion, Rotation, Rotation3, Vector3};
use learn_ngin::{
    AppConfig, AppContext, Project,
    data_structures::{
        light::Light,
        texture::TexKind,
        transform::Transform,
    },
    renderer::Renderer,
};

const POINT_LIGHTS: [[f32; 3]; 4] = [
    [0.7, 0.2, 2.0],
    [2.3, -3.3, -4.0],
    [-4.0, 2.0, -12.0],
    [0.0, 0.0, -3.0],
];

/// Degrees per second the first point light circles the scene.
const ORBIT_SPEED: f32 = 20.0;

#[derive(Default)]
struct Demo {
    orbiting: Option<usize>,
    flashlight: Option<usize>,
}

/// Loads `file`, falling back to a flat colour if it cannot be read.
fn texture_or(renderer: &mut Renderer, file: &str, kind: TexKind, fallback: [u8; 4]) -> anyhow::Result<usize> {
    match renderer.load_texture(file, kind) {
        Ok(idx) => Ok(idx),
        Err(e) => {
            log::warn!("{e:#}, using a flat colour instead");
            renderer.add_solid_texture(fallback, kind)
        }
    }
}

impl Project for Demo {
    fn startup(&mut self, ctx: &mut AppContext) -> anyhow::Result<()> {
        let renderer = &mut ctx.renderer;

        renderer.load_lit_shader("shaders/lit");
        renderer.load_marker_shader("shaders/light");

        let diffuse = texture_or(renderer, "textures/container2.png", TexKind::Diffuse, [180, 120, 60, 255])?;
        let specular = texture_or(
            renderer,
            "textures/container2_specular.png",
            TexKind::Specular,
            [128, 128, 128, 255],
        )?;
        renderer.set_material(diffuse, specular);

        renderer.add_light(Light::directional(
            Vector3::new(-0.2, -1.0, -0.3),
            Vector3::new(0.4, 0.4, 0.4),
        ));
        for (i, position) in POINT_LIGHTS.iter().enumerate() {
            let idx = renderer.add_light(Light::point(Vector3::from(*position), Vector3::new(0.8, 0.8, 0.8)));
            if i == 0 {
                self.orbiting = Some(idx);
            }
        }
        let (position, forward) = (renderer.camera.position(), renderer.camera.forward());
        self.flashlight = Some(renderer.add_light(Light::spot(
            position,
            forward,
            Vector3::new(1.0, 1.0, 1.0),
            12.5,
            0.2,
        )));
        Ok(())
    }

    fn update(&mut self, ctx: &mut AppContext, _dt: f64) {
        let renderer = &mut ctx.renderer;
        let (position, forward) = (renderer.camera.position(), renderer.camera.forward());
        if let Some(spot) = self.flashlight.and_then(|idx| renderer.light_mut(idx)) {
            spot.transform = Transform::looking(position, forward);
        }
    }

    fn fixed_update(&mut self, ctx: &mut AppContext, fixed_dt: f64) {
        let turn = Quaternion::from_angle_y(Deg(ORBIT_SPEED * fixed_dt as f32));
        if let Some(light) = self.orbiting.and_then(|idx| ctx.renderer.light_mut(idx)) {
            light.transform.position = turn.rotate_vector(light.transform.position);
        }
    }

    fn shutdown(&mut self) {
        log::info!("Shutting down");
    }
}

/// Logs why the demo stopped early. The process exits with status 0 either way.
fn finish(result: anyhow::Result<()>) {
    if let Err(e) = result {
        log::error!("{e:#}");
    }
}

fn main() {
    finish(learn_ngin::run(Demo::default(), AppConfig::new(1600, 900, "OpenGL", false)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_runs_still_finish_normally() {
        finish(Err(anyhow::anyhow!("no suitable adapter")));
        finish(Ok(()));
    }
}
