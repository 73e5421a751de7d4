//! Edgeraster demo host
//!
//! Opens a window, draws one Gouraud-shaded triangle into a software
//! framebuffer and shows it for a few seconds.
//!
//! Usage: edgeraster [config.ron]

use std::sync::OnceLock;

use edgeraster::config::{load_config, RasterConfig, SceneConfig};
use edgeraster::rasterizer::{rasterize_reference, Color, ColorShader, Framebuffer, PixelFormat, Rasterizer, Vertex};
use edgeraster::snapshot::save_png;
use edgeraster::VERSION;
use log::{error, info, warn};
use macroquad::prelude::{clear_background, draw_texture, get_time, next_frame, Conf, FilterMode, Texture2D, BLACK, WHITE};

static CONFIG: OnceLock<(RasterConfig, Option<String>)> = OnceLock::new();

/// Config from the first CLI argument, or defaults. The load error (if any)
/// is kept until logging is up.
fn startup_config() -> &'static (RasterConfig, Option<String>) {
    CONFIG.get_or_init(|| match std::env::args().nth(1) {
        Some(path) => match load_config(&path) {
            Ok(config) => (config, None),
            Err(e) => (RasterConfig::default(), Some(format!("Failed to load {}: {}", path, e))),
        },
        None => (RasterConfig::default(), None),
    })
}

fn window_conf() -> Conf {
    let (config, _) = startup_config();
    Conf {
        window_title: format!("Edgeraster v{}", VERSION),
        window_width: config.scene.width as i32,
        window_height: config.scene.height as i32,
        window_resizable: false,
        ..Default::default()
    }
}

/// Scene vertices, with random colors if requested
fn scene_vertices(scene: &SceneConfig) -> [Vertex; 3] {
    let mut vertices = [scene.v0, scene.v1, scene.v2];
    if scene.random_colors {
        macroquad::rand::srand(macroquad::miniquad::date::now() as u64);
        for v in &mut vertices {
            v.r = macroquad::rand::gen_range(0.0, 1.0);
            v.g = macroquad::rand::gen_range(0.0, 1.0);
            v.b = macroquad::rand::gen_range(0.0, 1.0);
        }
    }
    vertices
}

/// Count pixels where the block rasterizer and the brute-force one disagree
fn verify(fb: &Framebuffer, vertices: &[Vertex; 3]) -> usize {
    let mut reference = Framebuffer::new(fb.width(), fb.height(), fb.format());
    reference.clear(Color::BLACK);
    let [v0, v1, v2] = vertices;
    rasterize_reference(&ColorShader, v0, v1, v2, &mut reference.surface());

    let mut mismatches = 0;
    for y in 0..fb.height() {
        for x in 0..fb.width() {
            let (Some(a), Some(b)) = (fb.get_rgb(x, y), reference.get_rgb(x, y)) else {
                continue;
            };
            let close = |p: u8, q: u8| (p as i32 - q as i32).abs() <= 1;
            if !(close(a.0, b.0) && close(a.1, b.1) && close(a.2, b.2)) {
                mismatches += 1;
            }
        }
    }
    mismatches
}

#[macroquad::main(window_conf)]
async fn main() {
    let (config, load_error) = startup_config();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_level.as_str())).init();
    if let Some(e) = load_error {
        warn!("{}, using defaults", e);
    }

    info!("=== Edgeraster v{} ===", VERSION);

    let scene = &config.scene;
    let (Ok(tex_width), Ok(tex_height)) = (u16::try_from(scene.width), u16::try_from(scene.height)) else {
        error!("Scene size {}x{} is too large to display", scene.width, scene.height);
        return;
    };

    let mut fb = Framebuffer::new(scene.width, scene.height, PixelFormat::RGBA8888);
    fb.clear(Color::BLACK);

    let [v0, v1, v2] = scene_vertices(scene);
    let rasterizer = Rasterizer::<ColorShader>::new(ColorShader).with_options(config.options());
    let stats = rasterizer.draw_triangle(&v0, &v1, &v2, &mut fb.surface());
    info!(
        "Drew {} pixels ({} full, {} partial, {} skipped blocks)",
        stats.pixels_shaded, stats.blocks_full, stats.blocks_partial, stats.blocks_outside
    );

    if scene.verify {
        match verify(&fb, &[v0, v1, v2]) {
            0 => info!("Verification passed"),
            n => error!("Verification failed: {} pixels differ from the reference", n),
        }
    }

    if let Some(path) = &scene.snapshot {
        if let Err(e) = save_png(&fb, path) {
            error!("Failed to save snapshot {}: {}", path.display(), e);
        }
    }

    let texture = Texture2D::from_rgba8(tex_width, tex_height, fb.pixels());
    texture.set_filter(FilterMode::Nearest);

    let deadline = get_time() + scene.display_ms as f64 / 1000.0;
    while get_time() < deadline {
        clear_background(BLACK);
        draw_texture(&texture, 0.0, 0.0, WHITE);
        next_frame().await;
    }
}
