//! Pollen sample camera: live preview with per-sample snapshots

use std::sync::Arc;
use std::time::Duration;

use color_eyre::{eyre::eyre, Result};
use tracing::info;

use pollencam::capture::V4l2Camera;
use pollencam::display::{PreviewApp, WINDOW_TITLE};
use pollencam::focus::{FocusDriver, V4l2FocusDriver};
use pollencam::pipeline::{spawn_capture, FrameQueue};
use pollencam::session::SessionController;
use pollencam::{utils, Config};

fn main() -> Result<()> {
    // Initialize error handling and logging
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter("pollencam=debug")
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .init();

    info!("Pollen camera launching...");

    let config = Config::default();

    // Auto-detect capture device if needed
    let device = if config.capture.device.path.is_empty() {
        utils::auto_detect_device()?
    } else {
        config.capture.device.clone()
    };
    info!(path = %device.path, format = ?device.format, "using capture device");

    let mut capture_config = config.capture.clone();
    capture_config.device = device.clone();
    let camera = V4l2Camera::new(capture_config)?;

    // Motorized-focus accessory, present on one hardware variant only; it
    // gets its initial target before any frame is pulled
    let focus: Option<Box<dyn FocusDriver>> = match V4l2FocusDriver::detect(&device.path)? {
        Some(mut driver) => {
            driver.init()?;
            driver.write(config.focus.default_target)?;
            info!(focus = config.focus.default_target, "focus motor ready");
            Some(Box::new(driver))
        }
        None => {
            info!("no focus motor detected");
            None
        }
    };

    let session = SessionController::create(&config.session.root)?;
    info!(dir = %session.dir().display(), "session directory ready");

    // Set up the frame hand-off and the capture thread
    let queue = Arc::new(FrameQueue::bounded(config.pipeline.queue_capacity));
    let capture = spawn_capture(
        Box::new(camera),
        Arc::clone(&queue),
        Duration::from_millis(config.pipeline.warmup_ms),
    )?;

    let app = PreviewApp::new(&config, Arc::clone(&queue), session, focus);
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size([config.display.width as f32, config.display.height as f32]),
        ..Default::default()
    };
    eframe::run_native(WINDOW_TITLE, options, Box::new(|_cc| Ok(Box::new(app))))
        .map_err(|e| eyre!("display loop failed: {e}"))?;

    capture.shutdown();
    info!(dropped = queue.dropped(), "shutting down");
    Ok(())
}
