//! Herdlog UI - egui panels for the footage logger
//!
//! Provides UI components:
//! - Timeline panel with ruler, clip lane, and playhead
//! - Clip inspector with camera adjacency
//! - Media panel for staged footage
//! - Jump pad, export dialog, error dialog
//!
//! Panel modules follow one pattern: a `*State` struct owned by the app,
//! a `show_*` function that renders it, and an action enum the caller
//! applies to the model.

pub mod error_dialog;
pub mod export_dialog;
pub mod inspector;
pub mod jump_pad;
pub mod media_panel;
pub mod theme;
pub mod timeline_panel;
pub mod widgets;

pub use error_dialog::{show_error_dialog, ErrorDialogState};
pub use export_dialog::{show_export_dialog, ExportDialogAction, ExportDialogState, ExportStatus};
pub use inspector::{show_inspector, InspectorAction, InspectorState};
pub use jump_pad::{show_jump_pad, JumpAction};
pub use media_panel::{show_media_panel, MediaAction};
pub use theme::Theme;
pub use timeline_panel::{show_timeline_panel, TimelineAction, TimelinePanelState};
pub use widgets::{themed_slider, toggle_switch};
