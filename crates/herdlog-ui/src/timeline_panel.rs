//! Timeline panel — toolbar, ruler, the clip lane and the playhead.

use crate::theme::Theme;
use crate::widgets::themed_slider;
use egui::{self, Color32, Pos2, Rect, Rounding, Stroke, Vec2};
use herdlog_core::{frames_to_time_string, FrameRate};
use herdlog_timeline::Timeline;

const TOOLBAR_HEIGHT: f32 = 28.0;
const RULER_HEIGHT: f32 = 20.0;
const LANE_HEIGHT: f32 = 46.0;
const MIN_CLIP_PX: f32 = 3.0;
const MIN_ZOOM: f32 = 0.005;
const MAX_ZOOM: f32 = 1.0;

// Stable per-camera tints for clip strips.
const CLIP_COLORS: [Color32; 6] = [
    Color32::from_rgb(226, 168, 68),
    Color32::from_rgb(120, 170, 220),
    Color32::from_rgb(140, 200, 140),
    Color32::from_rgb(210, 130, 150),
    Color32::from_rgb(170, 140, 220),
    Color32::from_rgb(110, 200, 200),
];

// ── State ──────────────────────────────────────────────────────

pub struct TimelinePanelState {
    /// Pixels per frame.
    pub zoom: f32,
}

impl Default for TimelinePanelState {
    fn default() -> Self {
        Self { zoom: 0.05 }
    }
}

// ── Actions ────────────────────────────────────────────────────

#[derive(Debug)]
pub enum TimelineAction {
    Seek(i64),
    Select(Option<usize>),
    SplitAtCursor,
    RemoveSelected,
}

// ── Rendering ──────────────────────────────────────────────────

pub fn show_timeline_panel(
    ui: &mut egui::Ui,
    state: &mut TimelinePanelState,
    timeline: &Timeline,
) -> Vec<TimelineAction> {
    let mut actions = Vec::new();
    let rate = display_rate(timeline);

    draw_toolbar(ui, state, timeline, rate, &mut actions);

    egui::ScrollArea::horizontal()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            let available = ui.available_size();
            let canvas_width = (timeline.total_frames() as f32 * state.zoom + 200.0)
                .max(available.x)
                .max(100.0);
            let canvas_height = (RULER_HEIGHT + LANE_HEIGHT).max(available.y);

            let (response, painter) = ui.allocate_painter(
                Vec2::new(canvas_width, canvas_height),
                egui::Sense::click_and_drag(),
            );
            let rect = response.rect;
            painter.rect_filled(rect, 0.0, Theme::bg());

            let ruler_rect = Rect::from_min_size(rect.min, Vec2::new(canvas_width, RULER_HEIGHT));
            draw_ruler(&painter, ruler_rect, state.zoom, rate);

            let lane_top = rect.top() + RULER_HEIGHT;

            // Empty state
            if timeline.is_empty() {
                painter.text(
                    Pos2::new(rect.left() + available.x * 0.5, lane_top + LANE_HEIGHT * 0.5),
                    egui::Align2::CENTER_CENTER,
                    "Open a camera folder to lay down footage",
                    egui::FontId::proportional(Theme::FONT_XS),
                    Theme::t3(),
                );
            }

            // Clip strips
            let hover_pos = response.hover_pos();
            for (index, clip) in timeline.clips().iter().enumerate() {
                let start = timeline.start_of(index).unwrap_or(0);
                let left = rect.left() + start as f32 * state.zoom;
                let width = (clip.len() as f32 * state.zoom).max(MIN_CLIP_PX);
                let clip_rect = Rect::from_min_size(
                    Pos2::new(left, lane_top + 3.0),
                    Vec2::new(width, LANE_HEIGHT - 6.0),
                );

                let color = if clip.is_valid() {
                    clip_color(timeline, clip)
                } else {
                    Theme::red()
                };
                let is_selected = timeline.selected_index() == Some(index);
                let is_current = timeline.current_index() == Some(index);
                let is_hovered = hover_pos.is_some_and(|p| clip_rect.contains(p));

                let (bg_alpha, border_alpha, border_width) = if is_selected {
                    (48, 128, 1.0)
                } else if is_hovered {
                    (30, 64, 1.0)
                } else {
                    (20, 30, Theme::STROKE_SUBTLE)
                };
                painter.rect_filled(
                    clip_rect,
                    Rounding::same(Theme::RADIUS),
                    Theme::with_alpha(color, bg_alpha),
                );
                painter.rect_stroke(
                    clip_rect,
                    Rounding::same(Theme::RADIUS),
                    Stroke::new(border_width, Theme::with_alpha(color, border_alpha)),
                );
                if is_current {
                    painter.line_segment(
                        [
                            Pos2::new(clip_rect.left(), clip_rect.bottom() + 2.0),
                            Pos2::new(clip_rect.right(), clip_rect.bottom() + 2.0),
                        ],
                        Stroke::new(2.0, Theme::with_alpha(color, 150)),
                    );
                }

                if width > 30.0 {
                    painter.text(
                        Pos2::new(clip_rect.left() + 6.0, clip_rect.center().y),
                        egui::Align2::LEFT_CENTER,
                        &clip.name,
                        egui::FontId::proportional(Theme::FONT_XS),
                        Theme::t1(),
                    );
                }
            }

            // Playhead
            let ph_x = rect.left() + timeline.position() as f32 * state.zoom;
            if ph_x <= rect.right() {
                let tri = egui::epaint::PathShape::convex_polygon(
                    vec![
                        Pos2::new(ph_x - 5.0, ruler_rect.bottom() - 6.0),
                        Pos2::new(ph_x + 5.0, ruler_rect.bottom() - 6.0),
                        Pos2::new(ph_x, ruler_rect.bottom()),
                    ],
                    Theme::red(),
                    Stroke::NONE,
                );
                painter.add(tri);
                painter.line_segment(
                    [
                        Pos2::new(ph_x, ruler_rect.bottom()),
                        Pos2::new(ph_x, rect.bottom()),
                    ],
                    Stroke::new(1.5, Theme::red()),
                );
            }

            // Click: ruler seeks, strips select, empty lane clears.
            if response.clicked() {
                if let Some(pos) = response.interact_pointer_pos() {
                    if pos.y < lane_top {
                        actions.push(TimelineAction::Seek(frame_at(pos.x, &rect, state.zoom)));
                    } else {
                        let frame = frame_at(pos.x, &rect, state.zoom);
                        let hit = timeline.clip_at(frame).map(|hit| hit.index);
                        actions.push(TimelineAction::Select(hit));
                    }
                }
            }

            // Ruler scrub
            if response.dragged() {
                if let Some(pos) = response.interact_pointer_pos() {
                    if pos.y < lane_top {
                        actions.push(TimelineAction::Seek(frame_at(pos.x, &rect, state.zoom)));
                    }
                }
            }
        });

    actions
}

// ── Helpers ────────────────────────────────────────────────────

fn frame_at(x: f32, rect: &Rect, zoom: f32) -> i64 {
    (((x - rect.left()) / zoom).round() as i64).max(0)
}

fn display_rate(timeline: &Timeline) -> FrameRate {
    timeline
        .current_clip()
        .or_else(|| timeline.clip(0))
        .map(|clip| clip.frame_rate)
        .unwrap_or_default()
}

fn clip_color(timeline: &Timeline, clip: &herdlog_timeline::Clip) -> Color32 {
    timeline
        .index_of_source(&clip.source)
        .map(|index| CLIP_COLORS[index % CLIP_COLORS.len()])
        .unwrap_or_else(Theme::accent)
}

// ── Sub-components ─────────────────────────────────────────────

fn draw_toolbar(
    ui: &mut egui::Ui,
    state: &mut TimelinePanelState,
    timeline: &Timeline,
    rate: FrameRate,
    actions: &mut Vec<TimelineAction>,
) {
    let toolbar_frame = egui::Frame::none()
        .fill(Theme::bg1())
        .stroke(Stroke::new(Theme::STROKE_SUBTLE, Theme::white_06()))
        .inner_margin(egui::Margin::symmetric(Theme::SPACE_SM, 0.0));

    toolbar_frame.show(ui, |ui| {
        ui.set_height(TOOLBAR_HEIGHT);
        ui.horizontal_centered(|ui| {
            ui.spacing_mut().item_spacing = Vec2::new(Theme::SPACE_SM, 0.0);

            let can_split = timeline.clip_at(timeline.position()).is_some();
            if ui
                .add_enabled(can_split, egui::Button::new("Split"))
                .clicked()
            {
                actions.push(TimelineAction::SplitAtCursor);
            }

            if ui
                .add_enabled(
                    timeline.selected_index().is_some(),
                    egui::Button::new("Remove"),
                )
                .clicked()
            {
                actions.push(TimelineAction::RemoveSelected);
            }

            ui.add_space(Theme::SPACE_MD);

            ui.label(
                egui::RichText::new(format!(
                    "{} / {}",
                    frames_to_time_string(timeline.position(), rate),
                    frames_to_time_string(timeline.total_frames(), rate)
                ))
                .size(Theme::FONT_XS)
                .color(Theme::t2())
                .family(egui::FontFamily::Monospace),
            );

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.allocate_ui(Vec2::new(200.0, TOOLBAR_HEIGHT), |ui| {
                    themed_slider(ui, "Zoom", &mut state.zoom, MIN_ZOOM..=MAX_ZOOM, 2);
                });
            });
        });
    });
}

fn draw_ruler(painter: &egui::Painter, rect: Rect, zoom: f32, rate: FrameRate) {
    painter.rect_filled(rect, 0.0, Theme::white_02());
    painter.line_segment(
        [
            Pos2::new(rect.left(), rect.bottom()),
            Pos2::new(rect.right(), rect.bottom()),
        ],
        Stroke::new(Theme::STROKE_SUBTLE, Theme::white_08()),
    );

    let frames_per_second = rate.to_fps_f64().max(1.0) as f32;

    // Pick a tick step that keeps labels readable at any zoom.
    let mut step_seconds = 3600.0;
    for candidate in [1.0, 5.0, 15.0, 60.0, 300.0, 900.0, 3600.0] {
        if frames_per_second * candidate * zoom >= 60.0 {
            step_seconds = candidate;
            break;
        }
    }
    let tick_spacing = frames_per_second * step_seconds * zoom;

    let mut i = 0;
    loop {
        let x = rect.left() + i as f32 * tick_spacing;
        if x > rect.right() {
            break;
        }
        painter.line_segment(
            [Pos2::new(x, rect.bottom() - 10.0), Pos2::new(x, rect.bottom())],
            Stroke::new(Theme::STROKE_SUBTLE, Theme::white_10()),
        );
        painter.text(
            Pos2::new(x + 3.0, rect.top() + 3.0),
            egui::Align2::LEFT_TOP,
            ruler_label(i as f32 * step_seconds),
            egui::FontId::monospace(Theme::FONT_XS),
            Theme::t3(),
        );
        i += 1;
    }
}

fn ruler_label(seconds: f32) -> String {
    let total = seconds.round() as i64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes:02}:{secs:02}")
    }
}
