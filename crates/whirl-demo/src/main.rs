use std::path::Path;

use anyhow::Result;
use winit::dpi::LogicalSize;

use whirl_engine::core::{App, AppControl, FrameCtx};
use whirl_engine::device::GpuInit;
use whirl_engine::logging;
use whirl_engine::render::TriangleRenderer;
use whirl_engine::shader::{CompiledStage, LinkedProgram, StageKind, load_source};
use whirl_engine::window::{Runtime, RuntimeConfig};

const VERTEX_SHADER_PATH: &str = "shaders/vertex_shader.wgsl";
const FRAGMENT_SHADER_PATH: &str = "shaders/fragment_shader.wgsl";

/// Demo application: one spinning triangle on a black background.
struct TriangleApp {
    renderer: TriangleRenderer,
}

impl App for TriangleApp {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let rotation = ctx.time.rotation();
        log::debug!(
            "rotation angle: {:.4} rad / {:.2} deg",
            rotation.radians,
            rotation.degrees()
        );

        let renderer = &mut self.renderer;
        ctx.render(wgpu::Color::BLACK, |rctx, target| {
            renderer.render(rctx, target, rotation);
        })
    }
}

/// Startup sequence: load, compile, link, then hand off to the runtime.
///
/// Shader failures are reported but not fatal: the window still opens and
/// the renderer draws nothing until the sources are fixed. Only windowing
/// and GPU initialization failures propagate out of here.
fn run() -> Result<()> {
    let vertex_source = load_source(Path::new(VERTEX_SHADER_PATH));
    let fragment_source = load_source(Path::new(FRAGMENT_SHADER_PATH));

    let vertex = CompiledStage::compile(&vertex_source, StageKind::Vertex);
    if let Some(diag) = vertex.diagnostic() {
        log::error!("vertex shader compilation error: {diag}");
    }

    let fragment = CompiledStage::compile(&fragment_source, StageKind::Fragment);
    if let Some(diag) = fragment.diagnostic() {
        log::error!("fragment shader compilation error: {diag}");
    }

    let program = LinkedProgram::link(vertex, fragment);
    if let Some(diag) = program.diagnostic() {
        log::error!("shader program link error: {diag}");
    }

    let app = TriangleApp {
        renderer: TriangleRenderer::new(program),
    };

    let config = RuntimeConfig {
        title: "Rotating Triangle".to_string(),
        initial_size: LogicalSize::new(800.0, 600.0),
    };

    Runtime::run(config, GpuInit::default(), app)
}

fn main() {
    logging::init_logging(None);

    if let Err(err) = run() {
        log::error!("{err:#}");
        std::process::exit(-1);
    }
}
