//! Media panel — staged camera files, grouped by folder.

use std::path::Path;

use crate::theme::Theme;
use egui::{self, RichText};
use herdlog_core::frames_to_time_string;
use herdlog_timeline::{relative_source, Timeline};

// ── Actions ────────────────────────────────────────────────────

#[derive(Debug)]
pub enum MediaAction {
    OpenFolder,
    ImportFiles,
    /// Rebind the current clip to this source.
    UseForCurrent(usize),
}

// ── Rendering ──────────────────────────────────────────────────

pub fn show_media_panel(
    ui: &mut egui::Ui,
    timeline: &Timeline,
    media_root: &Path,
) -> Vec<MediaAction> {
    let mut actions = Vec::new();

    ui.add_space(Theme::SPACE_XS);
    ui.horizontal(|ui| {
        if ui.button("Open Folder\u{2026}").clicked() {
            actions.push(MediaAction::OpenFolder);
        }
        if ui.button("Import Files\u{2026}").clicked() {
            actions.push(MediaAction::ImportFiles);
        }
    });
    ui.add_space(Theme::SPACE_SM);
    Theme::draw_separator(ui);
    ui.add_space(Theme::SPACE_SM);

    if timeline.sources().is_empty() {
        ui.add_space(Theme::SPACE_MD);
        ui.vertical_centered(|ui| {
            ui.label(
                RichText::new("Open a camera folder to begin")
                    .size(Theme::FONT_SM)
                    .color(Theme::t3()),
            );
        });
        return actions;
    }

    let current_source = timeline
        .current_clip()
        .and_then(|clip| timeline.index_of_source(&clip.source));

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            let mut last_folder: Option<String> = None;
            for (index, source) in timeline.sources().iter().enumerate() {
                let relative = relative_source(&source.path, media_root);

                // Folder header when the group changes. Root files have none.
                let folder = relative
                    .split_once('/')
                    .map(|(head, _)| head.to_string());
                if folder != last_folder {
                    if let Some(name) = &folder {
                        ui.add_space(Theme::SPACE_XS);
                        ui.label(
                            RichText::new(name)
                                .size(Theme::FONT_XS)
                                .color(Theme::accent())
                                .strong(),
                        );
                    }
                    last_folder = folder;
                }

                let name = source
                    .path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| relative.clone());

                ui.push_id(index, |ui| {
                    let response = ui.selectable_label(
                        current_source == Some(index),
                        RichText::new(&name).size(Theme::FONT_SM).color(Theme::t1()),
                    );
                    ui.label(
                        RichText::new(format!(
                            "{} frames  {}",
                            source.total_frames,
                            frames_to_time_string(source.total_frames, source.frame_rate)
                        ))
                        .size(Theme::FONT_XS)
                        .color(Theme::t4())
                        .family(egui::FontFamily::Monospace),
                    );
                    if response.double_clicked() {
                        actions.push(MediaAction::UseForCurrent(index));
                    }
                    response.on_hover_text("Double-click to rebind the current clip");
                });
                ui.add_space(Theme::SPACE_XS);
            }
        });

    actions
}
