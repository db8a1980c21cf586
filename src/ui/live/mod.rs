use std::sync::mpsc::{Receiver, Sender};

use egui::{RichText, Visuals};
use log::error;

use crate::capture::{CaptureEvent, StatusMessage, StatusTone};
use crate::config::AppConfig;

use super::status_color;

/// `LiveCaptureApp` shows the capture loop's status indicator.
///
/// It drains the capture event channel each frame and keeps only the most
/// recent status message (last write wins). When the feed was not started
/// automatically it shows a manual start control wired to the same
/// acquisition routine.
pub struct LiveCaptureApp {
    event_receiver: Receiver<CaptureEvent>,
    current_status: StatusMessage,
    start_sender: Option<Sender<()>>,
    app_config: AppConfig,
}

impl LiveCaptureApp {
    pub fn new(
        event_receiver: Receiver<CaptureEvent>,
        start_sender: Option<Sender<()>>,
        app_config: AppConfig,
        cc: &eframe::CreationContext<'_>,
    ) -> Self {
        cc.egui_ctx.set_visuals(Visuals::dark());

        let current_status = if start_sender.is_some() {
            StatusMessage {
                text: "Camera not started".to_string(),
                tone: StatusTone::Info,
            }
        } else {
            StatusMessage {
                text: "Requesting camera...".to_string(),
                tone: StatusTone::Info,
            }
        };

        Self {
            event_receiver,
            current_status,
            start_sender,
            app_config,
        }
    }
}

impl eframe::App for LiveCaptureApp {
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Err(e) = self.app_config.save() {
            error!("Error while saving config file: {}", e);
        }
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // keep only the freshest status; submission records are for the log
        while let Ok(event) = self.event_receiver.try_recv() {
            if let CaptureEvent::Status(status) = event {
                self.current_status = status;
            }
        }

        if let Some(outer_rect) = ctx.input(|is| is.viewport().outer_rect) {
            self.app_config.status_window_position = outer_rect.min.into();
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Facemark");
            ui.separator();
            ui.label(
                RichText::new(&self.current_status.text)
                    .size(16.)
                    .color(status_color(self.current_status.tone)),
            );

            let start_clicked = self
                .start_sender
                .as_ref()
                .map(|_| ui.button("Start camera").clicked())
                .unwrap_or(false);
            if start_clicked {
                if let Some(start_sender) = self.start_sender.take() {
                    if start_sender.send(()).is_err() {
                        error!("Capture thread is gone, cannot start camera");
                    }
                    self.current_status = StatusMessage {
                        text: "Requesting camera...".to_string(),
                        tone: StatusTone::Info,
                    };
                }
            }
        });

        ctx.request_repaint();
    }
}
