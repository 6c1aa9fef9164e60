//! Vertex + fragment shader programs.
//!
//! A [`Shader`] is loaded from two WGSL files that share a base path,
//! `<base>.vert.wgsl` and `<base>.frag.wgsl`. Loading runs in two steps:
//! each stage is compiled into a shader module, then both are linked into a
//! render pipeline against the bind group layouts of the [`ShaderTarget`].
//! A failure in either step is logged and leaves the shader unloaded; the
//! rest of the program keeps running and simply skips draws that use it.
//!
//! Every shader owns one uniform block, bound at the group right after the
//! shared layouts, which is filled by name through the `set_*` methods.

use std::path::{Path, PathBuf};

use wgpu::util::DeviceExt;

use crate::{
    context::ErrorLog,
    data_structures::uniform::{UniformBlock, UniformLayout, UniformValue},
    error::EngineError,
    pipelines::basic,
    resources,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Vertex,
    Fragment,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Vertex => "vertex",
            Stage::Fragment => "fragment",
        }
    }

    pub fn entry_point(&self) -> &'static str {
        match self {
            Stage::Vertex => "vs_main",
            Stage::Fragment => "fs_main",
        }
    }

    fn suffix(&self) -> &'static str {
        match self {
            Stage::Vertex => ".vert.wgsl",
            Stage::Fragment => ".frag.wgsl",
        }
    }

    /// The file holding this stage for the program at `base`.
    pub fn path(&self, base: &Path) -> PathBuf {
        let mut path = base.as_os_str().to_owned();
        path.push(self.suffix());
        PathBuf::from(path)
    }
}

/// Everything a shader needs to know about where it will be drawn.
pub struct ShaderTarget<'a> {
    pub device: &'a wgpu::Device,
    pub errors: &'a ErrorLog,
    pub color_format: wgpu::TextureFormat,
    pub depth_format: Option<wgpu::TextureFormat>,
    pub vertex_layouts: &'a [wgpu::VertexBufferLayout<'a>],
    /// Bind groups set by the caller, in group order.
    pub shared_layouts: &'a [&'a wgpu::BindGroupLayout],
    pub features: wgpu::Features,
}

#[derive(Debug)]
struct Program {
    fill: wgpu::RenderPipeline,
    line: Option<wgpu::RenderPipeline>,
    params: Option<(wgpu::Buffer, wgpu::BindGroup)>,
    params_group: u32,
}

#[derive(Debug)]
pub struct Shader {
    path: PathBuf,
    block: UniformBlock,
    program: Option<Program>,
}

impl Shader {
    /// Loads and links `<base>.vert.wgsl` and `<base>.frag.wgsl` from the
    /// asset directory. Check [`is_loaded`](Self::is_loaded) for the outcome.
    pub fn load_paths(target: &ShaderTarget, base: impl AsRef<Path>, uniforms: UniformLayout) -> Self {
        let base = base.as_ref();
        let sources = [Stage::Vertex, Stage::Fragment].map(|stage| {
            let path = stage.path(base);
            resources::load_string(&path).map_err(|e| EngineError::ShaderCompile {
                stage: stage.name(),
                path,
                message: format!("{e:#}"),
            })
        });
        let [vertex, fragment] = sources;
        let program = vertex.and_then(|vertex| {
            let fragment = fragment?;
            build(target, base, &vertex, &fragment, &uniforms)
        });
        Self::finish(base, uniforms, program)
    }

    /// Builds a shader from in-memory WGSL. `name` is only used in messages.
    pub fn from_sources(
        target: &ShaderTarget,
        name: impl AsRef<Path>,
        vertex: &str,
        fragment: &str,
        uniforms: UniformLayout,
    ) -> Self {
        let name = name.as_ref();
        let program = build(target, name, vertex, fragment, &uniforms);
        Self::finish(name, uniforms, program)
    }

    fn finish(path: &Path, uniforms: UniformLayout, program: Result<Program, EngineError>) -> Self {
        let program = match program {
            Ok(program) => {
                log::info!("Loaded shader {}", path.display());
                Some(program)
            }
            Err(e) => {
                log::error!("{e}");
                None
            }
        };
        Self {
            path: path.to_path_buf(),
            block: UniformBlock::new(uniforms),
            program,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.program.is_some()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn block(&self) -> &UniformBlock {
        &self.block
    }

    /// Whether a line-mode pipeline exists next to the fill one.
    pub fn supports_lines(&self) -> bool {
        self.program.as_ref().is_some_and(|p| p.line.is_some())
    }

    pub fn set_bool(&mut self, name: &str, value: bool) -> bool {
        self.block.set(name, UniformValue::Bool(value))
    }

    pub fn set_int(&mut self, name: &str, value: i32) -> bool {
        self.block.set(name, UniformValue::Int(value))
    }

    pub fn set_uint(&mut self, name: &str, value: u32) -> bool {
        self.block.set(name, UniformValue::UInt(value))
    }

    pub fn set_float(&mut self, name: &str, value: f32) -> bool {
        self.block.set(name, UniformValue::Float(value))
    }

    pub fn set_vec2(&mut self, name: &str, value: impl Into<[f32; 2]>) -> bool {
        self.block.set(name, UniformValue::Vec2(value.into()))
    }

    pub fn set_vec3(&mut self, name: &str, value: impl Into<[f32; 3]>) -> bool {
        self.block.set(name, UniformValue::Vec3(value.into()))
    }

    pub fn set_vec4(&mut self, name: &str, value: impl Into<[f32; 4]>) -> bool {
        self.block.set(name, UniformValue::Vec4(value.into()))
    }

    pub fn set_mat3(&mut self, name: &str, value: impl Into<[[f32; 3]; 3]>) -> bool {
        self.block.set(name, UniformValue::Mat3(value.into()))
    }

    pub fn set_mat4(&mut self, name: &str, value: impl Into<[[f32; 4]; 4]>) -> bool {
        self.block.set(name, UniformValue::Mat4(value.into()))
    }

    /// Uploads the uniform block if it changed since the last flush.
    pub fn flush(&mut self, queue: &wgpu::Queue) {
        let Some(Program {
            params: Some((buffer, _)),
            ..
        }) = &self.program
        else {
            return;
        };
        if self.block.is_dirty() {
            queue.write_buffer(buffer, 0, self.block.bytes());
            self.block.mark_clean();
        }
    }

    /// Binds the pipeline and the uniform block. Falls back to fill mode if
    /// no line pipeline exists. Returns false for an unloaded shader.
    pub fn use_program(&self, pass: &mut wgpu::RenderPass<'_>, mode: wgpu::PolygonMode) -> bool {
        let Some(program) = &self.program else {
            return false;
        };
        let pipeline = match (mode, &program.line) {
            (wgpu::PolygonMode::Line, Some(line)) => line,
            _ => &program.fill,
        };
        pass.set_pipeline(pipeline);
        if let Some((_, bind_group)) = &program.params {
            pass.set_bind_group(program.params_group, bind_group, &[]);
        }
        true
    }

    /// Releases the GPU objects. Returns false if there was nothing to release.
    pub fn destroy(&mut self) -> bool {
        self.program.take().is_some()
    }
}

/// Checks that `source` is non-empty and declares the stage's entry point.
pub fn check_source(stage: Stage, path: &Path, source: &str) -> Result<(), EngineError> {
    let fail = |message: String| EngineError::ShaderCompile {
        stage: stage.name(),
        path: path.to_path_buf(),
        message,
    };
    if source.trim().is_empty() {
        return Err(fail("source is empty".to_string()));
    }
    let mut words = source
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|word| !word.is_empty());
    let mut previous = "";
    let declared = words.any(|word| {
        let found = previous == "fn" && word == stage.entry_point();
        previous = word;
        found
    });
    if !declared {
        return Err(fail(format!("no `fn {}` entry point", stage.entry_point())));
    }
    Ok(())
}

fn compile(target: &ShaderTarget, stage: Stage, path: &Path, source: &str) -> Result<wgpu::ShaderModule, EngineError> {
    check_source(stage, path, source)?;
    let label = format!("{} {}", path.display(), stage.name());
    let (module, errors) = target.errors.capture(|| {
        target.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        })
    });
    if !errors.is_empty() {
        return Err(EngineError::ShaderCompile {
            stage: stage.name(),
            path: path.to_path_buf(),
            message: errors.join("\n"),
        });
    }
    Ok(module)
}

fn build(
    target: &ShaderTarget,
    path: &Path,
    vertex: &str,
    fragment: &str,
    uniforms: &UniformLayout,
) -> Result<Program, EngineError> {
    let vertex = compile(target, Stage::Vertex, path, vertex)?;
    let fragment = compile(target, Stage::Fragment, path, fragment)?;
    let device = target.device;
    let name = path.display().to_string();

    let params = (!uniforms.is_empty()).then(|| {
        let layout = basic::mk_uniform_layout(device, &format!("{name} params layout"));
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name} params")),
            contents: &vec![0u8; uniforms.size()],
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = basic::mk_uniform_bind_group(device, &layout, &buffer, &format!("{name} params"));
        (layout, buffer, bind_group)
    });

    let mut bind_group_layouts: Vec<&wgpu::BindGroupLayout> = target.shared_layouts.to_vec();
    if let Some((layout, _, _)) = &params {
        bind_group_layouts.push(layout);
    }
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(&format!("{name} layout")),
        bind_group_layouts: &bind_group_layouts,
        push_constant_ranges: &[],
    });

    let pipeline = |mode: wgpu::PolygonMode| {
        basic::mk_render_pipeline(
            device,
            &format!("{name} {mode:?}"),
            &layout,
            target.color_format,
            target.depth_format,
            target.vertex_layouts,
            &vertex,
            &fragment,
            mode,
        )
    };
    let ((fill, line), errors) = target.errors.capture(|| {
        let fill = pipeline(wgpu::PolygonMode::Fill);
        let line = target
            .features
            .contains(wgpu::Features::POLYGON_MODE_LINE)
            .then(|| pipeline(wgpu::PolygonMode::Line));
        (fill, line)
    });
    if !errors.is_empty() {
        return Err(EngineError::ShaderLink {
            path: path.to_path_buf(),
            message: errors.join("\n"),
        });
    }

    Ok(Program {
        fill,
        line,
        params_group: target.shared_layouts.len() as u32,
        params: params.map(|(_, buffer, bind_group)| (buffer, bind_group)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_paths_extend_the_base() {
        let base = Path::new("shaders/lit");
        assert_eq!(Stage::Vertex.path(base), PathBuf::from("shaders/lit.vert.wgsl"));
        assert_eq!(Stage::Fragment.path(base), PathBuf::from("shaders/lit.frag.wgsl"));
    }

    #[test]
    fn entry_point_must_be_a_function() {
        let path = Path::new("t");
        assert!(check_source(Stage::Vertex, path, "@vertex\nfn vs_main() {}").is_ok());
        assert!(check_source(Stage::Vertex, path, "// vs_main\nfn main() {}").is_err());
        assert!(check_source(Stage::Fragment, path, "  \n").is_err());
    }
}
