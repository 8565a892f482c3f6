//! Error dialog — a single modal message with an OK button.

use crate::theme::Theme;
use egui::{self, Vec2};

/// Holds the message currently on screen, if any.
#[derive(Default)]
pub struct ErrorDialogState {
    message: Option<String>,
}

impl ErrorDialogState {
    /// Replace whatever is showing with a new message.
    pub fn show(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    pub fn is_open(&self) -> bool {
        self.message.is_some()
    }
}

/// Show the pending error, if any, as a floating egui window.
pub fn show_error_dialog(ctx: &egui::Context, state: &mut ErrorDialogState) {
    let Some(message) = state.message.clone() else {
        return;
    };

    let mut dismissed = false;
    egui::Window::new("Error")
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, Vec2::ZERO)
        .frame(Theme::glass_frame())
        .show(ctx, |ui| {
            ui.set_width(300.0);
            ui.spacing_mut().item_spacing = Vec2::new(0.0, Theme::SPACE_SM);

            ui.label(
                egui::RichText::new(&message)
                    .size(Theme::FONT_SM)
                    .color(Theme::t1()),
            );

            ui.add_space(Theme::SPACE_XS);
            if ui.button("OK").clicked() {
                dismissed = true;
            }
        });

    if dismissed {
        state.message = None;
    }
}
