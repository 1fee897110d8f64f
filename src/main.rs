//! Flatshade: flat-shaded triangle software rasterizer
//!
//! Without `--export` this opens the interactive viewer. With it the scene
//! is rendered once to a PNG and the program exits.
//!
//! flatshade --scene=monkey.txt
//! flatshade --scene=monkey.txt --export=monkey.png --rotate-y=0.5

mod viewer;

use std::env;

use anyhow::{bail, Context, Result};
use env_logger::Env;
use flatshade::app::AppState;
use flatshade::config::{load_config, Config};
use flatshade::rasterizer::Framebuffer;
use flatshade::scene::load_scene;
use log::info;

const DEFAULT_LOGGING_LEVEL: &str = "info";

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or(DEFAULT_LOGGING_LEVEL)).init();

    let args: Vec<String> = env::args().collect();

    let config = match argument_value(&args, "config") {
        Some(path) => load_config(&path).with_context(|| format!("loading config {}", path))?,
        None => Config::default(),
    };

    let mut app = AppState::new(&config);
    if let Some(path) = argument_value(&args, "scene") {
        let scene = load_scene(&path).with_context(|| format!("loading scene {}", path))?;
        app.set_scene(scene, Some(path.into()));
    }

    if let Some(output) = argument_value(&args, "export") {
        return export(&mut app, &args, &output);
    }

    macroquad::Window::from_config(viewer::window_conf(config.width, config.height), viewer::run(app));
    Ok(())
}

/// Render once with the view given on the command line and write a PNG
fn export(app: &mut AppState, args: &[String], output: &str) -> Result<()> {
    if app.scene.is_none() {
        bail!("--export needs --scene=PATH");
    }

    if let Some(x) = float_argument(args, "rotate-x")? {
        app.view.rotate_x = x;
    }
    if let Some(y) = float_argument(args, "rotate-y")? {
        app.view.rotate_y = y;
    }
    if let Some(scale) = float_argument(args, "scale")? {
        app.view.scale = scale;
    }

    let mut fb = Framebuffer::new(app.width, app.height);
    let stats = app.render_frame(&mut fb).context("rendering scene")?;
    fb.save_png(output).with_context(|| format!("writing {}", output))?;

    info!(
        "Exported {} ({} drawn, {} culled, {} degenerate)",
        output, stats.drawn, stats.culled, stats.degenerate
    );
    Ok(())
}

fn float_argument(args: &[String], argument_name: &str) -> Result<Option<f32>> {
    argument_value(args, argument_name)
        .map(|value| {
            value
                .parse()
                .with_context(|| format!("--{} expects a number, got '{}'", argument_name, value))
        })
        .transpose()
}

fn argument_value(args: &[String], argument_name: &str) -> Option<String> {
    let prefix = format!("--{}=", argument_name);
    args.iter()
        .find_map(|s| s.strip_prefix(&prefix))
        .map(str::to_string)
}
