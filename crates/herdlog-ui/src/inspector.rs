//! Inspector panel — clip fields and camera adjacency for the selected clip.
//!
//! Text fields hold local edit buffers so typing never fights the model;
//! buffers resync when the selection changes or the app requests it after
//! applying an edit. Rejected edits therefore snap back to the model value.

use std::collections::BTreeSet;
use std::path::Path;

use crate::theme::Theme;
use egui::{self, RichText};
use herdlog_core::{frames_to_time_string, time_string_to_frames};
use herdlog_timeline::{relative_source, AdjacencyMap, Direction, Timeline};

// ── State ──────────────────────────────────────────────────────

#[derive(Default)]
pub struct InspectorState {
    name_edit: String,
    rate_edit: String,
    in_edit: String,
    out_edit: String,
    synced_to: Option<usize>,
    needs_sync: bool,
}

impl InspectorState {
    /// Resync the edit buffers from the model on the next frame.
    pub fn request_sync(&mut self) {
        self.needs_sync = true;
    }

    fn sync(&mut self, timeline: &Timeline) {
        self.synced_to = timeline.selected_index();
        self.needs_sync = false;
        if let Some(clip) = timeline.selected_clip() {
            self.name_edit = clip.name.clone();
            self.rate_edit = format!("{}", clip.play_rate);
            self.in_edit = frames_to_time_string(clip.in_point(), clip.frame_rate);
            self.out_edit = frames_to_time_string(clip.out_point(), clip.frame_rate);
        } else {
            self.name_edit.clear();
            self.rate_edit.clear();
            self.in_edit.clear();
            self.out_edit.clear();
        }
    }
}

// ── Actions ────────────────────────────────────────────────────

#[derive(Debug)]
pub enum InspectorAction {
    Rename(String),
    SetPlayRate(f64),
    SetInPoint(i64),
    SetOutPoint(i64),
    ReplaceSource(usize),
    SetNeighbor(Direction, Option<String>),
    Error(String),
}

// ── Rendering ──────────────────────────────────────────────────

pub fn show_inspector(
    ui: &mut egui::Ui,
    state: &mut InspectorState,
    timeline: &Timeline,
    adjacency: &AdjacencyMap,
    media_root: &Path,
) -> Vec<InspectorAction> {
    let mut actions = Vec::new();

    if state.needs_sync || state.synced_to != timeline.selected_index() {
        state.sync(timeline);
    }

    let Some(index) = timeline.selected_index() else {
        ui.add_space(Theme::SPACE_MD);
        ui.vertical_centered(|ui| {
            ui.label(
                RichText::new("No clip selected")
                    .size(Theme::FONT_SM)
                    .color(Theme::t3()),
            );
        });
        return actions;
    };
    let Some(clip) = timeline.clip(index) else {
        return actions;
    };

    // Name
    field_label(ui, "NAME");
    let response = ui.add(
        egui::TextEdit::singleline(&mut state.name_edit).desired_width(ui.available_width()),
    );
    if response.lost_focus() {
        let name = state.name_edit.trim();
        if !name.is_empty() && name != clip.name {
            actions.push(InspectorAction::Rename(name.to_string()));
        }
    }
    ui.add_space(Theme::SPACE_SM);

    // Source
    field_label(ui, "SOURCE");
    let current_source = timeline.index_of_source(&clip.source);
    let current_label = relative_source(&clip.source, media_root);
    egui::ComboBox::from_id_salt("inspector_source")
        .width(ui.available_width())
        .selected_text(RichText::new(&current_label).size(Theme::FONT_SM))
        .show_ui(ui, |ui| {
            for (source_index, source) in timeline.sources().iter().enumerate() {
                let label = relative_source(&source.path, media_root);
                let is_current = current_source == Some(source_index);
                if ui.selectable_label(is_current, label).clicked() && !is_current {
                    actions.push(InspectorAction::ReplaceSource(source_index));
                }
            }
        });
    ui.add_space(Theme::SPACE_SM);

    // Play rate
    field_label(ui, "PLAY RATE");
    let response = ui.add(egui::TextEdit::singleline(&mut state.rate_edit).desired_width(60.0));
    if response.lost_focus() {
        match state.rate_edit.trim().parse::<f64>() {
            Ok(rate) if rate != clip.play_rate => {
                actions.push(InspectorAction::SetPlayRate(rate));
            }
            Ok(_) => {}
            Err(_) => {
                actions.push(InspectorAction::Error(format!(
                    "invalid play rate: {}",
                    state.rate_edit.trim()
                )));
                state.request_sync();
            }
        }
    }
    ui.add_space(Theme::SPACE_SM);

    // Trim points. The first clip keeps its in point and the last keeps
    // its out point so the ripple chain never opens a gap at the ends.
    let is_first = index == 0;
    let is_last = index + 1 == timeline.len();

    field_label(ui, "IN POINT");
    let response = ui.add_enabled(
        !is_first,
        egui::TextEdit::singleline(&mut state.in_edit).desired_width(110.0),
    );
    if response.lost_focus() {
        match time_string_to_frames(state.in_edit.trim(), clip.frame_rate) {
            Ok(frames) if frames != clip.in_point() => {
                actions.push(InspectorAction::SetInPoint(frames));
            }
            Ok(_) => {}
            Err(err) => {
                actions.push(InspectorAction::Error(err.to_string()));
                state.request_sync();
            }
        }
    }
    ui.add_space(Theme::SPACE_SM);

    field_label(ui, "OUT POINT");
    let response = ui.add_enabled(
        !is_last,
        egui::TextEdit::singleline(&mut state.out_edit).desired_width(110.0),
    );
    if response.lost_focus() {
        match time_string_to_frames(state.out_edit.trim(), clip.frame_rate) {
            Ok(frames) if frames != clip.out_point() => {
                actions.push(InspectorAction::SetOutPoint(frames));
            }
            Ok(_) => {}
            Err(err) => {
                actions.push(InspectorAction::Error(err.to_string()));
                state.request_sync();
            }
        }
    }
    ui.add_space(Theme::SPACE_SM);

    ui.label(
        RichText::new(format!(
            "{} frames of {} @ {:.3} fps",
            clip.len(),
            clip.total_frames,
            clip.frame_rate.to_fps_f64()
        ))
        .size(Theme::FONT_XS)
        .color(Theme::t4())
        .family(egui::FontFamily::Monospace),
    );
    if !clip.is_valid() {
        ui.label(
            RichText::new("Trim window falls outside the source footage")
                .size(Theme::FONT_XS)
                .color(Theme::red()),
        );
    }

    ui.add_space(Theme::SPACE_MD);
    Theme::draw_separator(ui);
    ui.add_space(Theme::SPACE_MD);

    // ── Neighbors ──────────────────────────────────────────────

    field_label(ui, "NEIGHBORS");
    ui.add_space(Theme::SPACE_XS);

    let key = adjacency.key_for(&current_label);
    ui.label(
        RichText::new(format!("Camera key: {key}"))
            .size(Theme::FONT_XS)
            .color(Theme::t3())
            .family(egui::FontFamily::Monospace),
    );
    ui.add_space(Theme::SPACE_SM);

    // Every other camera key is a candidate neighbor.
    let candidates: BTreeSet<String> = timeline
        .sources()
        .iter()
        .map(|source| adjacency.key_for(&relative_source(&source.path, media_root)))
        .filter(|candidate| *candidate != key)
        .collect();

    let neighbors = adjacency.neighbors(&key);
    egui::Grid::new("neighbor_grid")
        .num_columns(2)
        .spacing([Theme::SPACE_SM, 4.0])
        .show(ui, |ui| {
            for direction in Direction::ALL {
                ui.label(
                    RichText::new(direction.label())
                        .size(Theme::FONT_XS)
                        .color(Theme::t2()),
                );
                let current = neighbors.and_then(|n| n.get(direction));
                egui::ComboBox::from_id_salt(("neighbor", direction.as_str()))
                    .width(ui.available_width())
                    .selected_text(
                        RichText::new(current.unwrap_or("\u{2014}")).size(Theme::FONT_XS),
                    )
                    .show_ui(ui, |ui| {
                        if ui.selectable_label(current.is_none(), "\u{2014}").clicked()
                            && current.is_some()
                        {
                            actions.push(InspectorAction::SetNeighbor(direction, None));
                        }
                        for candidate in &candidates {
                            let is_current = current == Some(candidate.as_str());
                            if ui.selectable_label(is_current, candidate).clicked() && !is_current
                            {
                                actions.push(InspectorAction::SetNeighbor(
                                    direction,
                                    Some(candidate.clone()),
                                ));
                            }
                        }
                    });
                ui.end_row();
            }
        });

    actions
}

// ── Helpers ────────────────────────────────────────────────────

fn field_label(ui: &mut egui::Ui, text: &str) {
    ui.label(
        RichText::new(text)
            .size(Theme::FONT_XS)
            .color(Theme::t3())
            .strong(),
    );
}
