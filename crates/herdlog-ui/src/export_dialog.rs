//! Export dialog — encoder settings, output path, progress bar, and cancel.

use crate::theme::Theme;
use crate::widgets::{themed_slider, toggle_switch};
use egui::{self, Vec2};
use herdlog_media::{
    available_threads, ExportPhase, ExportProgress, ExportSettings, Resolution, VideoCodec,
    MAX_BITRATE_KBPS, MIN_BITRATE_KBPS,
};
use std::path::PathBuf;

// ── State ───────────────────────────────────────────────────────

/// Outcome of the last export, shown under the buttons.
#[derive(Debug)]
pub enum ExportStatus {
    Done(PathBuf),
    Failed(String),
}

/// Persistent state for the export dialog.
pub struct ExportDialogState {
    /// Whether the dialog window is visible.
    pub open: bool,
    /// Output file path string.
    pub output_path: String,
    pub codec: VideoCodec,
    pub resolution: Resolution,
    pub bitrate_kbps: u32,
    pub threads: usize,
    pub max_threads: usize,
    pub include_audio: bool,
    /// Encoder progress, `None` when idle.
    pub progress: Option<ExportProgress>,
    /// Whether an export is currently running.
    pub exporting: bool,
    pub status: Option<ExportStatus>,
}

impl Default for ExportDialogState {
    fn default() -> Self {
        let settings = ExportSettings::default();
        Self {
            open: false,
            output_path: String::new(),
            codec: settings.codec,
            resolution: settings.resolution,
            bitrate_kbps: settings.bitrate_kbps,
            threads: settings.threads,
            max_threads: available_threads().max(1),
            include_audio: settings.include_audio,
            progress: None,
            exporting: false,
            status: None,
        }
    }
}

impl ExportDialogState {
    fn settings(&self) -> ExportSettings {
        ExportSettings {
            output: PathBuf::from(&self.output_path),
            codec: self.codec,
            resolution: self.resolution,
            bitrate_kbps: self.bitrate_kbps,
            threads: self.threads,
            include_audio: self.include_audio,
        }
    }
}

// ── Actions ─────────────────────────────────────────────────────

/// Actions that the export dialog can produce.
#[derive(Debug)]
pub enum ExportDialogAction {
    /// User clicked "Browse" to pick an output file.
    Browse,
    /// User clicked "Export" with these settings.
    Start(ExportSettings),
    /// User clicked "Cancel" during an active export.
    CancelExport,
}

// ── Rendering ───────────────────────────────────────────────────

/// Show the export dialog as a floating egui window.
///
/// Returns any actions the caller should handle.
pub fn show_export_dialog(
    ctx: &egui::Context,
    state: &mut ExportDialogState,
) -> Vec<ExportDialogAction> {
    let mut actions = Vec::new();

    if !state.open {
        return actions;
    }

    let mut still_open = state.open;

    // The close box disappears while a job runs; Cancel is the only way out.
    let mut window = egui::Window::new("Export")
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, Vec2::ZERO)
        .frame(Theme::glass_frame());
    if !state.exporting {
        window = window.open(&mut still_open);
    }
    window.show(ctx, |ui| {
        ui.set_width(340.0);
        ui.spacing_mut().item_spacing = Vec2::new(0.0, Theme::SPACE_SM);

        ui.add_enabled_ui(!state.exporting, |ui| {
            // ── Output path ──────────────────────────────
            ui.label(
                egui::RichText::new("OUTPUT FILE")
                    .size(Theme::FONT_XS)
                    .color(Theme::t3())
                    .strong(),
            );
            ui.horizontal(|ui| {
                ui.add(
                    egui::TextEdit::singleline(&mut state.output_path)
                        .desired_width(ui.available_width() - 70.0)
                        .hint_text("Select output file..."),
                );
                if ui.button("Browse").clicked() {
                    actions.push(ExportDialogAction::Browse);
                }
            });

            ui.add_space(Theme::SPACE_XS);

            // ── Encoder ──────────────────────────────────
            ui.label(
                egui::RichText::new("CODEC")
                    .size(Theme::FONT_XS)
                    .color(Theme::t3())
                    .strong(),
            );
            egui::ComboBox::from_id_salt("export_codec_combo")
                .selected_text(state.codec.to_string())
                .width(ui.available_width())
                .show_ui(ui, |ui| {
                    for codec in VideoCodec::ALL {
                        ui.selectable_value(&mut state.codec, codec, codec.to_string());
                    }
                });

            ui.label(
                egui::RichText::new("RESOLUTION")
                    .size(Theme::FONT_XS)
                    .color(Theme::t3())
                    .strong(),
            );
            egui::ComboBox::from_id_salt("export_resolution_combo")
                .selected_text(state.resolution.to_string())
                .width(ui.available_width())
                .show_ui(ui, |ui| {
                    for preset in Resolution::PRESETS {
                        ui.selectable_value(&mut state.resolution, preset, preset.to_string());
                    }
                });

            ui.add_space(Theme::SPACE_XS);

            let mut bitrate = state.bitrate_kbps as f32;
            themed_slider(
                ui,
                "Bitrate",
                &mut bitrate,
                MIN_BITRATE_KBPS as f32..=MAX_BITRATE_KBPS as f32,
                0,
            );
            state.bitrate_kbps =
                (bitrate.round() as u32).clamp(MIN_BITRATE_KBPS, MAX_BITRATE_KBPS);

            // 0 threads leaves the count to the encoder.
            let mut threads = state.threads as f32;
            themed_slider(
                ui,
                "Threads",
                &mut threads,
                0.0..=state.max_threads as f32,
                0,
            );
            state.threads = (threads.round() as usize).min(state.max_threads);

            ui.horizontal(|ui| {
                if toggle_switch(ui, state.include_audio) {
                    state.include_audio = !state.include_audio;
                }
                ui.add_space(6.0);
                ui.label(
                    egui::RichText::new("Mux audio")
                        .size(Theme::FONT_SM)
                        .color(Theme::t2()),
                );
            });
        });

        ui.add_space(Theme::SPACE_SM);
        Theme::draw_separator(ui);
        ui.add_space(Theme::SPACE_SM);

        // ── Progress (visible when exporting) ────────
        if state.exporting {
            let (label, fraction) = match &state.progress {
                Some(progress) => {
                    let phase = match progress.phase {
                        ExportPhase::Audio => "Writing audio",
                        ExportPhase::Video => "Encoding video",
                    };
                    (
                        format!(
                            "{phase}... {} / {} frames",
                            progress.frame, progress.total_frames
                        ),
                        progress.fraction() as f32,
                    )
                }
                None => ("Starting...".to_string(), 0.0),
            };
            ui.label(
                egui::RichText::new(label)
                    .size(Theme::FONT_SM)
                    .color(Theme::t1()),
            );
            let bar = egui::ProgressBar::new(fraction).desired_width(ui.available_width());
            ui.add(bar);

            ui.add_space(Theme::SPACE_SM);
        }

        // ── Buttons ──────────────────────────────────
        ui.horizontal(|ui| {
            if state.exporting {
                if ui.button("Cancel").clicked() {
                    actions.push(ExportDialogAction::CancelExport);
                }
            } else {
                let can_export = !state.output_path.is_empty();
                if ui
                    .add_enabled(can_export, egui::Button::new("Export"))
                    .clicked()
                {
                    state.status = None;
                    actions.push(ExportDialogAction::Start(state.settings()));
                }
            }
        });

        if let Some(status) = &state.status {
            ui.add_space(Theme::SPACE_XS);
            let (text, color) = match status {
                ExportStatus::Done(path) => {
                    (format!("Wrote {}", path.display()), Theme::green())
                }
                ExportStatus::Failed(message) => (message.clone(), Theme::red()),
            };
            ui.label(
                egui::RichText::new(text)
                    .size(Theme::FONT_XS)
                    .color(color),
            );
        }
    });

    state.open = still_open;

    actions
}
