// What you SEE:
// • The camera image, mirrored and in gray, fills the window.
// • Words rain down letter by letter and come to rest on anything dark
//   (your arms, your head, a held-up book), sliding off edges and taking colour.
// • D toggles the obstacle mask view (debug). Up/Down move the threshold. ESC quits.

use rand::{SeedableRng, rngs::StdRng};
use std::time::{Duration, Instant};
use text_rain::camera::{CameraCapture, enumerate_devices};
use text_rain::draw::{Drawer, draw_text_5x7, render_scene};
use text_rain::rain::WordList;
use text_rain::source::{DeviceInfo, StillImageSource, VideoSource};
use text_rain::{AppConfig, Error, FrameBuffer, RainApp, SimulationConfig};

const THRESHOLD_STEP: f32 = 0.02;

fn log_devices(devices: &[DeviceInfo]) {
    for d in devices {
        log::info!("device {}: {}", d.index, d.name);
    }
}

/// Camera first; the still image only if the camera cannot be opened.
fn open_source(cfg: &AppConfig) -> Result<Box<dyn VideoSource>, Error> {
    match CameraCapture::new(cfg.camera_index, cfg.width, cfg.height) {
        Ok(cam) => Ok(Box::new(cam)),
        Err(e) => {
            log::warn!("{e}");
            match &cfg.fallback_image {
                Some(path) => Ok(Box::new(StillImageSource::open(path)?)),
                None => Err(Error::NoVideoSource),
            }
        }
    }
}

fn load_words(cfg: &AppConfig) -> Result<WordList, Error> {
    match &cfg.text_file {
        None => Ok(WordList::default()),
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| Error::TextLoad(format!("{}: {e}", path.display())))?;
            WordList::from_text(&text)
                .ok_or_else(|| Error::InvalidArgument(format!("{} has no words", path.display())))
        }
    }
}

fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let app_cfg = AppConfig::from_args(std::env::args().skip(1))?;

    if app_cfg.list_devices {
        for d in enumerate_devices(&mut |devices: &[DeviceInfo]| log_devices(devices))? {
            println!("{}\t{}", d.index, d.name);
        }
        return Ok(());
    }

    // Enumeration is informational only; a failure here does not stop the show.
    if let Err(e) = enumerate_devices(&mut |devices: &[DeviceInfo]| log_devices(devices)) {
        log::warn!("{e}");
    }

    let mut source = open_source(&app_cfg)?;
    log::info!("video source: {}", source.label());

    let words = load_words(&app_cfg)?;
    let rng = match app_cfg.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut rain = RainApp::new(words, rng);
    let mut sim = SimulationConfig::default();

    let mut drawer = Drawer::new("Text Rain", app_cfg.width as usize, app_cfg.height as usize)?;
    let mut screen = FrameBuffer::new(app_cfg.width as usize, app_cfg.height as usize);

    /* --- HUD / FPS --- */
    let mut last_fps_time = Instant::now();
    let mut frames_this_second: u32 = 0;
    let mut hud_fps_text = String::from("FPS: 0.0");
    let mut last_frame_time = Instant::now();

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        let now = Instant::now();
        let dt = (now - last_frame_time).as_secs_f32();
        last_frame_time = now;

        /* 1) Controls */
        if drawer.d_pressed_once() { sim.debugging = !sim.debugging; }
        if drawer.up_pressed() { sim.nudge_threshold(THRESHOLD_STEP); }
        if drawer.down_pressed() { sim.nudge_threshold(-THRESHOLD_STEP); }

        /* 2) Simulate. No frame yet: keep the window alive and try again. */
        if rain.tick(&mut source, &sim, dt).is_none() {
            drawer.pump();
            continue;
        }

        /* 3) Draw background + letters + HUD */
        if let Some(image) = rain.display_image(&sim) {
            render_scene(&mut screen, image, rain.sprites());
        }
        let status = if sim.debugging { "MASK" } else { "LIVE" };
        let hud = format!(
            "{status} | THRESHOLD: {:.2} | DROPS: {} | {hud_fps_text}",
            sim.clamped_threshold(),
            rain.drops().len()
        );
        draw_text_5x7(&mut screen, 8, 8, &hud, 0x00_FF_FF_FF);

        /* 4) Present */
        drawer.present(&screen)?;

        /* 5) FPS counter (log + HUD once per second) */
        frames_this_second += 1;
        if now.duration_since(last_fps_time) >= Duration::from_secs(1) {
            let secs = now.duration_since(last_fps_time).as_secs_f32();
            let fps = frames_this_second as f32 / secs;
            log::info!("FPS: {fps:.1}");
            hud_fps_text = format!("FPS: {fps:.1}");
            frames_this_second = 0;
            last_fps_time = now;
        }
    }

    Ok(())
}
