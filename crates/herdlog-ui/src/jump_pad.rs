//! Jump pad — a 3x3 compass grid for hopping to adjacent cameras.

use crate::theme::Theme;
use egui::{self, RichText, Vec2};
use herdlog_timeline::{Direction, Neighbors};

#[derive(Debug)]
pub enum JumpAction {
    Jump(Direction),
}

/// Show the compass grid. A button is enabled only when the current
/// camera has a neighbor wired up in that direction.
pub fn show_jump_pad(ui: &mut egui::Ui, neighbors: Option<&Neighbors>) -> Vec<JumpAction> {
    let mut actions = Vec::new();

    const LAYOUT: [[Option<Direction>; 3]; 3] = [
        [
            Some(Direction::NorthWest),
            Some(Direction::North),
            Some(Direction::NorthEast),
        ],
        [Some(Direction::West), None, Some(Direction::East)],
        [
            Some(Direction::SouthWest),
            Some(Direction::South),
            Some(Direction::SouthEast),
        ],
    ];

    egui::Grid::new("jump_pad_grid")
        .spacing([4.0, 4.0])
        .show(ui, |ui| {
            for row in LAYOUT {
                for cell in row {
                    match cell {
                        Some(direction) => {
                            let enabled =
                                neighbors.is_some_and(|n| n.get(direction).is_some());
                            let button = egui::Button::new(
                                RichText::new(direction.as_str()).size(Theme::FONT_SM),
                            )
                            .min_size(Vec2::new(34.0, 26.0));
                            let response = ui.add_enabled(enabled, button);
                            if response.clicked() {
                                actions.push(JumpAction::Jump(direction));
                            }
                            if let Some(target) = neighbors.and_then(|n| n.get(direction)) {
                                response.on_hover_text(target);
                            }
                        }
                        None => {
                            ui.label(
                                RichText::new("\u{2022}")
                                    .size(Theme::FONT_SM)
                                    .color(Theme::t4()),
                            );
                        }
                    }
                }
                ui.end_row();
            }
        });

    actions
}
