use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use pollster::block_on;
use winit::dpi::LogicalSize;
use winit::event_loop::EventLoop;
use winit::window::Window;

use rocket_scene::app::{print_final_state, App, WINDOW_TITLE};
use rocket_scene::{
    default_asset_root, ModelLibrary, ModelLoader, Renderer, Scene, ScriptedKey, Session,
    DEFAULT_SCENE_XML,
};

/// Simulated time between two headless frames.
const FRAME_INTERVAL: Duration = Duration::from_nanos(1_000_000_000 / 60);
const HEADLESS_SIZE: (u32, u32) = (1280, 720);

/// Rocket launch scene with a drag-able sun and a walking astronaut.
#[derive(Debug, Parser)]
#[command(name = "rocket-scene", version)]
struct CliOptions {
    /// Scene layout XML; the built-in layout is used when omitted.
    #[arg(long, value_name = "FILE")]
    scene: Option<PathBuf>,
    /// Directory model paths are resolved against.
    #[arg(long, value_name = "DIR")]
    assets: Option<PathBuf>,
    /// Run without a window and print the final state.
    #[arg(long)]
    summary_only: bool,
    /// Frames to simulate in headless mode.
    #[arg(long, default_value_t = 120)]
    frames: u32,
    /// Comma separated KEY@FRAME presses replayed in headless mode.
    #[arg(long, value_delimiter = ',', value_name = "KEY@FRAME")]
    keys: Vec<ScriptedKey>,
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}

fn run() -> Result<()> {
    let options = CliOptions::parse();
    let scene = load_scene(options.scene.as_deref())?;
    let assets = options.assets.clone().unwrap_or_else(default_asset_root);

    println!(
        "Loaded scene with {} objects ({} lights)",
        scene.objects.len(),
        scene.lights().count()
    );
    for object in &scene.objects {
        println!(" - {} ({})", object.name, object.kind);
    }

    if options.summary_only {
        return run_headless(&scene, &assets, options.frames, &options.keys);
    }
    match run_interactive(&scene, &assets) {
        Ok(()) => Ok(()),
        Err(err) if err.downcast_ref::<WindowInitError>().is_some() => {
            eprintln!(
                "{err}. Falling back to --summary-only mode (set DISPLAY or install X11 libs to enable rendering)."
            );
            run_headless(&scene, &assets, options.frames, &options.keys)
        }
        Err(err) => Err(err),
    }
}

fn load_scene(path: Option<&Path>) -> Result<Scene> {
    match path {
        Some(path) => {
            let xml = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read scene {}", path.display()))?;
            Scene::from_xml(&xml)
                .with_context(|| format!("failed to parse scene {}", path.display()))
        }
        None => Scene::from_xml(DEFAULT_SCENE_XML).context("failed to parse built-in scene"),
    }
}

fn spawn_model_loads(scene: &Scene, assets: &Path, session: &Session, library: ModelLibrary) -> ModelLoader {
    let mut loader = ModelLoader::new(assets, session.model().clone(), library);
    for object in Session::pending_models(scene) {
        loader.spawn(object);
    }
    loader
}

fn run_headless(scene: &Scene, assets: &Path, frames: u32, keys: &[ScriptedKey]) -> Result<()> {
    let mut session = Session::new(scene, HEADLESS_SIZE.0, HEADLESS_SIZE.1)?;
    let mut loader = spawn_model_loads(scene, assets, &session, ModelLibrary::new());
    loader.wait();
    info!("{} model(s) loaded", loader.library().len());

    for key in keys.iter().filter(|key| key.frame >= frames) {
        warn!("key {:?} at frame {} is past the last frame", key.key, key.frame);
    }
    for frame in 0..frames {
        for key in keys.iter().filter(|key| key.frame == frame) {
            session.handle_key(key.key);
        }
        session.advance_frame(FRAME_INTERVAL * (frame + 1));
    }

    print_final_state(&session);
    Ok(())
}

fn run_interactive(scene: &Scene, assets: &Path) -> Result<()> {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
    panic::set_hook(default_hook);
    let event_loop = event_loop
        .map_err(|panic| WindowInitError::from_panic("event loop", panic))?
        .map_err(|err| WindowInitError::from_error("event loop", err))?;

    #[allow(deprecated)]
    let window = Arc::new(
        event_loop
            .create_window(
                Window::default_attributes()
                    .with_title(WINDOW_TITLE)
                    .with_inner_size(LogicalSize::new(1280.0, 720.0)),
            )
            .map_err(|err| WindowInitError::from_error("window", err))?,
    );

    let library = ModelLibrary::new();
    let renderer = block_on(Renderer::new(Arc::clone(&window), library.clone()))?;
    let size = window.inner_size();
    let session = Session::new(scene, size.width, size.height)?;
    let _loader = spawn_model_loads(scene, assets, &session, library);

    let mut app = App::new(session, renderer);
    event_loop.run_app(&mut app).context("event loop failed")?;

    print_final_state(app.session());
    match app.take_error() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[derive(Debug)]
struct WindowInitError {
    message: String,
}

impl WindowInitError {
    fn from_panic(stage: &str, panic: Box<dyn Any + Send>) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {}", panic_message(panic)),
        }
    }

    fn from_error(stage: &str, err: impl fmt::Display) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {err}"),
        }
    }
}

impl fmt::Display for WindowInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for WindowInitError {}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(msg) => *msg,
        Err(panic) => match panic.downcast::<&'static str>() {
            Ok(msg) => (*msg).to_string(),
            Err(_) => "unknown panic".into(),
        },
    }
}
