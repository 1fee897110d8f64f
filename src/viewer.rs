//! Interactive macroquad viewer

use flatshade::app::{AppState, Control};
use flatshade::rasterizer::Framebuffer;
use log::{error, info, warn};
use macroquad::prelude::*;

const STATUS_HEIGHT: f32 = 24.0;
const SNAPSHOT_PATH: &str = "snapshot.png";

/// Keys that repeat while held
const HELD_KEYS: [(KeyCode, Control); 8] = [
    (KeyCode::Up, Control::RotateUp),
    (KeyCode::Down, Control::RotateDown),
    (KeyCode::Left, Control::RotateLeft),
    (KeyCode::Right, Control::RotateRight),
    (KeyCode::W, Control::PanUp),
    (KeyCode::S, Control::PanDown),
    (KeyCode::A, Control::PanLeft),
    (KeyCode::D, Control::PanRight),
];

/// Keys that fire once per press
const PRESSED_KEYS: [(KeyCode, Control); 6] = [
    (KeyCode::Equal, Control::ZoomIn),
    (KeyCode::Minus, Control::ZoomOut),
    (KeyCode::RightBracket, Control::AmbientUp),
    (KeyCode::LeftBracket, Control::AmbientDown),
    (KeyCode::R, Control::Reset),
    (KeyCode::C, Control::Recenter),
];

/// Timed message shown under the canvas
#[derive(Default)]
struct Status {
    message: Option<(String, f64)>,
}

impl Status {
    fn set(&mut self, message: &str, duration_secs: f64) {
        let expiry = get_time() + duration_secs;
        self.message = Some((message.to_string(), expiry));
    }

    fn get(&self) -> Option<&str> {
        match &self.message {
            Some((msg, expiry)) if get_time() < *expiry => Some(msg.as_str()),
            _ => None,
        }
    }
}

pub fn window_conf(width: usize, height: usize) -> Conf {
    Conf {
        window_title: format!("Flatshade v{}", env!("CARGO_PKG_VERSION")),
        window_width: width as i32,
        window_height: height as i32 + STATUS_HEIGHT as i32,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

pub async fn run(mut app: AppState) {
    let mut fb = Framebuffer::new(app.width, app.height);
    let mut status = Status::default();

    match &app.scene_path {
        Some(path) => status.set(&format!("Loaded {}", path.display()), 3.0),
        None => status.set("Press O to open a scene", 5.0),
    }

    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        for (key, control) in HELD_KEYS {
            if is_key_down(key) {
                app.apply(control);
            }
        }
        for (key, control) in PRESSED_KEYS {
            if is_key_pressed(key) {
                app.apply(control);
            }
        }
        if is_key_pressed(KeyCode::O) {
            open_scene(&mut app, &mut status);
        }
        if is_key_pressed(KeyCode::P) {
            match fb.save_png(SNAPSHOT_PATH) {
                Ok(()) => status.set(&format!("Saved {}", SNAPSHOT_PATH), 3.0),
                Err(e) => {
                    error!("Snapshot failed: {}", e);
                    status.set(&format!("Snapshot failed: {}", e), 5.0);
                }
            }
        }

        if let Err(e) = app.render_frame(&mut fb) {
            warn!("Frame not rendered: {}", e);
            status.set(&format!("Render failed: {}", e), 1.0);
        }

        clear_background(Color::from_rgba(30, 30, 35, 255));
        draw_framebuffer(&fb);
        draw_status(&app, &status);

        next_frame().await;
    }

    info!("Viewer closed");
}

/// Draw the framebuffer scaled to fit above the status line, keeping its aspect
fn draw_framebuffer(fb: &Framebuffer) {
    let avail_w = screen_width();
    let avail_h = (screen_height() - STATUS_HEIGHT).max(1.0);
    let scale = (avail_w / fb.width as f32).min(avail_h / fb.height as f32);
    let draw_w = fb.width as f32 * scale;
    let draw_h = fb.height as f32 * scale;

    let texture = Texture2D::from_rgba8(fb.width as u16, fb.height as u16, &fb.pixels);
    texture.set_filter(FilterMode::Nearest);

    draw_texture_ex(
        &texture,
        (avail_w - draw_w) / 2.0,
        (avail_h - draw_h) / 2.0,
        WHITE,
        DrawTextureParams {
            dest_size: Some(Vec2::new(draw_w, draw_h)),
            ..Default::default()
        },
    );
}

fn draw_status(app: &AppState, status: &Status) {
    let y = screen_height() - 7.0;
    let text = match status.get() {
        Some(msg) => msg.to_string(),
        None => {
            let ambient = app.settings.ambient;
            format!(
                "rot ({:.2}, {:.2})  scale {:.2}  ambient ({}, {}, {})",
                app.view.rotate_x, app.view.rotate_y, app.view.scale, ambient.r, ambient.g, ambient.b
            )
        }
    };
    draw_text(&text, 8.0, y, 18.0, Color::from_rgba(200, 200, 200, 255));
}

#[cfg(not(target_arch = "wasm32"))]
fn open_scene(app: &mut AppState, status: &mut Status) {
    use flatshade::scene::load_scene;
    use std::path::PathBuf;

    let default_dir = app
        .scene_path
        .as_ref()
        .and_then(|p| p.parent())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let dialog = rfd::FileDialog::new()
        .add_filter("Scene", &["txt", "ron"])
        .set_directory(&default_dir);

    if let Some(path) = dialog.pick_file() {
        match load_scene(&path) {
            Ok(scene) => {
                status.set(&format!("Loaded {}", path.display()), 3.0);
                app.set_scene(scene, Some(path));
            }
            Err(e) => {
                error!("Failed to load {}: {}", path.display(), e);
                status.set(&format!("Load failed: {}", e), 5.0);
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn open_scene(_app: &mut AppState, status: &mut Status) {
    status.set("Open not available in browser", 3.0);
}
