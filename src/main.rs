//! AlmostGL viewer
//!
//! Renders a mesh with the software pipeline and shows the result in a
//! window. Usage: `almostgl [mesh-file] [params.ron]`
//!
//! Controls:
//! - WASD / Q E: move, arrows: turn
//! - 1-4: shading mode, F: draw mode
//! - C: front face winding, B: back-face culling
//! - N: normal transform, V: vertex colors, L: lock view on origin
//! - P: screenshot, Ctrl+S: save parameters

use std::path::PathBuf;
use macroquad::prelude::*;
use almostgl::mesh::{load_mesh, Mesh};
use almostgl::rasterizer::{NormalTransform, Renderer, ShadingMode, HEIGHT, WIDTH};
use almostgl::scene::{load_params, save_params, GlobalParameters};
use almostgl::VERSION;

/// Turn rate for arrow keys, radians per second
const TURN_SPEED: f32 = 1.5;
/// Camera steps per second while a move key is held
const MOVE_RATE: f32 = 60.0;
const DEFAULT_PARAMS_PATH: &str = "params.ron";

fn window_conf() -> Conf {
    Conf {
        window_title: format!("AlmostGL v{}", VERSION),
        window_width: WIDTH as i32,
        window_height: HEIGHT as i32,
        window_resizable: true,
        ..Default::default()
    }
}

/// Viewer actions that touch the filesystem
enum Command {
    Screenshot,
    SaveParams,
}

fn load_scene(mesh_path: Option<&str>, params_path: Option<&str>) -> (Mesh, GlobalParameters) {
    let mesh = match mesh_path {
        Some(path) => load_mesh(path).unwrap_or_else(|e| {
            log::error!("Failed to load mesh {}: {}, using cube", path, e);
            Mesh::cube()
        }),
        None => Mesh::cube(),
    };

    let mut params = match params_path {
        Some(path) => load_params(path).unwrap_or_else(|e| {
            log::error!("Failed to load parameters {}: {}, using defaults", path, e);
            GlobalParameters::default()
        }),
        None => GlobalParameters::default(),
    };
    if params_path.is_none() {
        params.model_to_world = mesh.centering_transform();
    }

    (mesh, params)
}

fn handle_input(params: &mut GlobalParameters, dt: f32) -> Option<Command> {
    let ctrl_down = is_key_down(KeyCode::LeftControl) || is_key_down(KeyCode::RightControl);
    let steps = MOVE_RATE * dt;
    let camera = &mut params.camera;

    // Camera movement
    if !ctrl_down {
        if is_key_down(KeyCode::W) {
            camera.advance(steps);
        }
        if is_key_down(KeyCode::S) {
            camera.advance(-steps);
        }
        if is_key_down(KeyCode::D) {
            camera.strafe(steps);
        }
        if is_key_down(KeyCode::A) {
            camera.strafe(-steps);
        }
        if is_key_down(KeyCode::E) {
            camera.rise(steps);
        }
        if is_key_down(KeyCode::Q) {
            camera.rise(-steps);
        }
    }

    let turn = TURN_SPEED * dt;
    let mut yaw = 0.0;
    let mut pitch = 0.0;
    if is_key_down(KeyCode::Right) {
        yaw += turn;
    }
    if is_key_down(KeyCode::Left) {
        yaw -= turn;
    }
    if is_key_down(KeyCode::Up) {
        pitch += turn;
    }
    if is_key_down(KeyCode::Down) {
        pitch -= turn;
    }
    if yaw != 0.0 || pitch != 0.0 {
        camera.rotate(yaw, pitch);
    }

    if is_key_pressed(KeyCode::L) {
        camera.lock_view = !camera.lock_view;
        camera.retarget();
        log::info!("View lock {}", if camera.lock_view { "on" } else { "off" });
    }

    // Render modes
    let shading_keys = [KeyCode::Key1, KeyCode::Key2, KeyCode::Key3, KeyCode::Key4];
    for (i, key) in shading_keys.into_iter().enumerate() {
        if is_key_pressed(key) {
            if let Some(mode) = ShadingMode::from_index(i) {
                params.shading = mode;
            }
        }
    }
    if is_key_pressed(KeyCode::F) {
        params.draw_mode = params.draw_mode.next();
    }
    if is_key_pressed(KeyCode::C) {
        params.front_face = params.front_face.toggled();
    }
    if is_key_pressed(KeyCode::B) {
        params.cull_back_faces = !params.cull_back_faces;
    }
    if is_key_pressed(KeyCode::V) {
        params.use_vertex_colors = !params.use_vertex_colors;
    }
    if is_key_pressed(KeyCode::N) {
        params.normal_transform = match params.normal_transform {
            NormalTransform::ModelMatrix => NormalTransform::InverseTranspose,
            NormalTransform::InverseTranspose => NormalTransform::ModelMatrix,
        };
    }

    if is_key_pressed(KeyCode::P) {
        return Some(Command::Screenshot);
    }
    if ctrl_down && is_key_pressed(KeyCode::S) {
        return Some(Command::SaveParams);
    }
    None
}

/// Window size in whole pixels, never zero
fn screen_size() -> (usize, usize) {
    (
        (screen_width() as usize).max(1),
        (screen_height() as usize).max(1),
    )
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let mesh_path = args.get(1).map(String::as_str);
    let params_path = args.get(2).map(String::as_str);
    let save_path = PathBuf::from(params_path.unwrap_or(DEFAULT_PARAMS_PATH));

    let (mesh, mut params) = load_scene(mesh_path, params_path);

    let (mut width, mut height) = screen_size();
    let mut renderer = Renderer::new(width, height);
    renderer.load_mesh(&mesh);

    let mut screenshot_index = 0;

    log::info!("AlmostGL v{}: {} triangles", VERSION, mesh.triangle_count());

    loop {
        let (w, h) = screen_size();
        if (w, h) != (width, height) {
            width = w;
            height = h;
            renderer.resize(width, height);
        }

        match handle_input(&mut params, get_frame_time()) {
            Some(Command::Screenshot) => {
                screenshot_index += 1;
                let path = format!("almostgl_{:04}.png", screenshot_index);
                if let Err(e) = renderer.framebuffer().save_png(&path) {
                    log::error!("Failed to save screenshot {}: {}", path, e);
                }
            }
            Some(Command::SaveParams) => match save_params(&params, &save_path) {
                Ok(()) => log::info!("Saved parameters to {}", save_path.display()),
                Err(e) => log::error!("Failed to save parameters: {}", e),
            },
            None => {}
        }

        let frame = renderer.render(&mesh, &params);
        let stats = frame.stats;

        let texture = Texture2D::from_rgba8(frame.width as u16, frame.height as u16, frame.pixels);
        texture.set_filter(FilterMode::Nearest);

        clear_background(BLACK);
        draw_texture_ex(
            &texture,
            0.0,
            0.0,
            WHITE,
            DrawTextureParams {
                dest_size: Some(Vec2::new(screen_width(), screen_height())),
                ..Default::default()
            },
        );

        draw_text(
            &format!(
                "{:.0} FPS | {:.2} ms | {} drawn, {} clipped, {} culled",
                stats.fps(),
                stats.elapsed.as_secs_f32() * 1000.0,
                stats.triangles_drawn,
                stats.triangles_clipped,
                stats.triangles_culled,
            ),
            10.0,
            20.0,
            16.0,
            WHITE,
        );
        draw_text(
            &format!(
                "{} | {:?} | {:?} | cull {} | {:?}",
                params.shading.label(),
                params.draw_mode,
                params.front_face,
                if params.cull_back_faces { "on" } else { "off" },
                params.normal_transform,
            ),
            10.0,
            38.0,
            16.0,
            WHITE,
        );

        next_frame().await;
    }
}
