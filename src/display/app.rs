//! Preview window: image area on top, capture controls along the bottom.

use std::process;
use std::sync::Arc;
use std::time::Duration;

use egui::load::SizedTexture;
use tracing::{debug, error};

use crate::capture::frame::swap_channel_order;
use crate::display::scale;
use crate::focus::{FocusDriver, FOCUS_MAX, FOCUS_MIN, FOCUS_STEP};
use crate::pipeline::FrameQueue;
use crate::session::SessionController;
use crate::Config;

pub const WINDOW_TITLE: &str = "Pollen";

pub struct PreviewApp {
    queue: Arc<FrameQueue>,
    session: SessionController,
    focus: Option<FocusPanel>,
    texture: Option<egui::TextureHandle>,
    tick: Duration,
}

struct FocusPanel {
    driver: Box<dyn FocusDriver>,
    target: u16,
}

impl PreviewApp {
    pub fn new(
        config: &Config,
        queue: Arc<FrameQueue>,
        session: SessionController,
        focus: Option<Box<dyn FocusDriver>>,
    ) -> Self {
        Self {
            queue,
            session,
            focus: focus.map(|driver| FocusPanel {
                driver,
                target: config.focus.default_target,
            }),
            texture: None,
            tick: Duration::from_millis(config.display.tick_ms),
        }
    }

    /// One renderer tick: drain the queue and run every buffered frame
    /// through retain, channel conversion, fit, and texture upload. Only the
    /// last frame survives on screen; earlier ones still pay the full cost.
    fn process_pending(&mut self, ctx: &egui::Context, label_w: u32, label_h: u32) {
        for frame in self.queue.drain() {
            let meta = Arc::clone(&frame.meta);
            self.session.observe_frame(frame.clone());

            let rgb = swap_channel_order(&frame.data);
            let (width, height, pixels) =
                match scale::scaled_size(meta.width, meta.height, label_w, label_h) {
                    Some((dst_w, dst_h)) => {
                        match scale::resize_rgb(rgb, meta.width, meta.height, dst_w, dst_h) {
                            Some(px) => (dst_w, dst_h, px),
                            None => {
                                debug!(sequence = meta.sequence, "skipping malformed frame");
                                continue;
                            }
                        }
                    }
                    None => (meta.width, meta.height, rgb),
                };

            let img = egui::ColorImage::from_rgb([width as usize, height as usize], &pixels);
            match &mut self.texture {
                Some(texture) => texture.set(img, egui::TextureOptions::LINEAR),
                None => {
                    self.texture = Some(ctx.load_texture("preview", img, egui::TextureOptions::LINEAR))
                }
            }
        }
    }

    fn controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("Snapshot").clicked() {
                match self.session.take_snapshot() {
                    Ok(Some(_)) => {}
                    Ok(None) => debug!("snapshot requested before any frame was displayed"),
                    Err(err) => {
                        error!(error = %err, "snapshot failed");
                        process::exit(1);
                    }
                }
            }

            if ui
                .add_enabled(self.session.next_enabled(), egui::Button::new("Next"))
                .clicked()
            {
                self.session.advance_sample();
            }

            ui.label(self.session.sample_id().to_string());

            if let Some(panel) = &mut self.focus {
                ui.separator();
                ui.add(
                    egui::DragValue::new(&mut panel.target)
                        .range(FOCUS_MIN..=FOCUS_MAX)
                        .speed(FOCUS_STEP as f64),
                );
                if ui.button("Focus").clicked() {
                    if let Err(err) = panel.driver.write(panel.target) {
                        error!(error = %err, "focus write failed");
                        process::exit(1);
                    }
                }
            }
        });
    }
}

impl eframe::App for PreviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::bottom("controls").show(ctx, |ui| {
            ui.add_space(6.0);
            self.controls(ui);
            ui.add_space(6.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let avail = ui.available_size();
            self.process_pending(ctx, avail.x.max(0.0) as u32, avail.y.max(0.0) as u32);

            if let Some(texture) = &self.texture {
                ui.centered_and_justified(|ui| {
                    ui.image(SizedTexture::from_handle(texture));
                });
            }
        });

        // cooperative fixed-period reschedule, frames or not
        ctx.request_repaint_after(self.tick);
    }
}
