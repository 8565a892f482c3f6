//! Herdlog App - application state and the egui update loop.
//!
//! Panels render against the model and hand back action lists; the app
//! applies them here so every mutation flows through one place.

use std::path::{Path, PathBuf};
use std::time::Duration;

use eframe::egui;
use herdlog_core::{frames_to_time_string, Result};
use herdlog_media::{
    probe_file, ExportEvent, ExportHandle, ExportJob, ExportSettings, Segment, Staging,
    VIDEO_EXTENSIONS,
};
use herdlog_timeline::{
    copy_media, load_sidecars, relative_source, save_sidecars, AdjacencyMap, ClipRecord,
    Direction, Source, Timeline, ADJACENCY_FILE,
};
use herdlog_ui::{
    show_error_dialog, show_export_dialog, show_inspector, show_jump_pad, show_media_panel,
    show_timeline_panel, ErrorDialogState, ExportDialogAction, ExportDialogState, ExportStatus,
    InspectorAction, InspectorState, JumpAction, MediaAction, Theme, TimelineAction,
    TimelinePanelState,
};
use tracing::{info, warn};

pub struct HerdlogApp {
    timeline: Timeline,
    adjacency: AdjacencyMap,
    staging: Staging,
    project_dir: Option<PathBuf>,
    saved: bool,
    export: Option<ExportHandle>,

    timeline_panel: TimelinePanelState,
    inspector: InspectorState,
    export_dialog: ExportDialogState,
    error_dialog: ErrorDialogState,
}

impl HerdlogApp {
    pub fn new(cc: &eframe::CreationContext<'_>, folder: Option<PathBuf>) -> Result<Self> {
        Theme::apply(&cc.egui_ctx);

        let mut app = Self {
            timeline: Timeline::new(),
            adjacency: AdjacencyMap::default(),
            staging: Staging::new()?,
            project_dir: None,
            saved: true,
            export: None,
            timeline_panel: TimelinePanelState::default(),
            inspector: InspectorState::default(),
            export_dialog: ExportDialogState::default(),
            error_dialog: ErrorDialogState::default(),
        };

        if let Some(folder) = folder {
            if let Err(err) = app.open_folder(&folder) {
                warn!(folder = %folder.display(), %err, "could not open folder from command line");
            }
        }

        Ok(app)
    }

    // ── Media intake ───────────────────────────────────────────

    fn open_folder(&mut self, folder: &Path) -> Result<()> {
        let staged = self.staging.stage_folder(folder)?;
        let count = staged.len();
        self.add_staged(staged)?;
        info!(folder = %folder.display(), count, "opened camera folder");
        Ok(())
    }

    fn import_files(&mut self, files: &[PathBuf]) -> Result<()> {
        let staged = self.staging.stage_files(files)?;
        let count = staged.len();
        self.add_staged(staged)?;
        info!(count, "imported videos");
        Ok(())
    }

    /// Probe freshly staged files and register them as sources. The first
    /// footage to arrive on an empty timeline becomes the opening clip.
    fn add_staged(&mut self, staged: Vec<PathBuf>) -> Result<()> {
        let was_empty = self.timeline.is_empty();
        let mut first_new = None;
        for path in staged {
            let media = probe_file(&path)?;
            let index = self
                .timeline
                .add_source(Source::new(path, media.total_frames, media.frame_rate));
            first_new.get_or_insert(index);
        }
        if was_empty {
            if let Some(index) = first_new {
                self.timeline.load_source(index, None);
                self.timeline.set_position(0);
                self.inspector.request_sync();
            }
        }
        Ok(())
    }

    // ── Project persistence ────────────────────────────────────

    fn new_project(&mut self) {
        match Staging::new() {
            Ok(staging) => {
                self.timeline.clear();
                self.adjacency = AdjacencyMap::default();
                self.staging = staging;
                self.project_dir = None;
                self.saved = true;
                self.inspector.request_sync();
                info!("new project");
            }
            Err(err) => self.fail(err),
        }
    }

    fn save_project(&mut self, dir: &Path) -> Result<()> {
        let records: Vec<ClipRecord> = self
            .timeline
            .clips()
            .iter()
            .map(|clip| ClipRecord::from_clip(clip, self.staging.root()))
            .collect();
        save_sidecars(dir, &records, &self.adjacency)?;
        copy_media(self.staging.root(), dir)?;
        self.project_dir = Some(dir.to_path_buf());
        self.saved = true;
        info!(dir = %dir.display(), clips = records.len(), "saved project");
        Ok(())
    }

    fn load_project(&mut self, dir: &Path) -> Result<()> {
        // Sidecars are read first so a bad folder aborts before any
        // state is touched.
        let (records, adjacency) = load_sidecars(dir)?;
        let staging = Staging::new()?;
        let copied = copy_media(dir, staging.root())?;

        self.timeline.clear();
        self.staging = staging;
        self.adjacency = adjacency;

        for path in &copied {
            let media = probe_file(path)?;
            self.timeline
                .add_source(Source::new(path, media.total_frames, media.frame_rate));
        }

        let recorded = records.len();
        for record in records {
            let source_path = self.staging.root().join(&record.source);
            let Some(source_index) = self.timeline.index_of_source(&source_path) else {
                warn!(source = %record.source, "clip references missing media, skipped");
                continue;
            };
            let Some(index) = self.timeline.load_source(source_index, None) else {
                continue;
            };
            self.timeline.set_clip_name(index, record.name.clone());
            self.timeline.set_play_rate(index, record.play_rate);
            if !self.timeline.set_trim(index, record.in_point, record.out_point) {
                warn!(name = %record.name, "stored trim does not fit the source, kept full length");
            }
        }

        self.timeline.set_position(0);
        self.timeline.select(None);
        self.project_dir = Some(dir.to_path_buf());
        self.saved = true;
        self.inspector.request_sync();
        info!(dir = %dir.display(), clips = recorded, "opened project");
        Ok(())
    }

    // ── Edits ──────────────────────────────────────────────────

    fn split_at_cursor(&mut self) {
        let position = self.timeline.position();
        match self.timeline.split_at_position(position) {
            Ok(()) => {
                self.saved = false;
                self.inspector.request_sync();
            }
            Err(err) => self.fail(err),
        }
    }

    fn remove_selected(&mut self) {
        if let Some(index) = self.timeline.selected_index() {
            self.timeline.remove_clip(index);
            self.saved = false;
            self.inspector.request_sync();
        }
    }

    fn use_for_current(&mut self, source_index: usize) {
        if let Some(index) = self.timeline.current_index() {
            if self.timeline.replace_clip_source(index, source_index) {
                self.saved = false;
                self.inspector.request_sync();
            }
        } else {
            // Nothing under the cursor: append the source as a new clip.
            self.timeline.load_source(source_index, None);
            self.saved = false;
        }
    }

    fn jump_to(&mut self, direction: Direction) {
        let Some(index) = self.timeline.current_index() else {
            return;
        };
        let Some(clip) = self.timeline.clip(index) else {
            return;
        };
        let key = self
            .adjacency
            .key_for(&relative_source(&clip.source, self.staging.root()));

        let relatives: Vec<String> = self
            .timeline
            .sources()
            .iter()
            .map(|source| relative_source(&source.path, self.staging.root()))
            .collect();
        let Some(target) = self
            .adjacency
            .resolve(&key, direction, relatives.iter().map(String::as_str))
        else {
            let neighbor = self
                .adjacency
                .neighbor(&key, direction)
                .unwrap_or("?")
                .to_string();
            self.error_dialog
                .show(format!("No staged footage for neighbor \"{neighbor}\""));
            return;
        };
        let target = target.to_string();
        let Some(source_index) = relatives.iter().position(|relative| *relative == target) else {
            return;
        };
        if self.timeline.replace_clip_source(index, source_index) {
            info!(%key, direction = direction.as_str(), %target, "jumped to neighbor camera");
            self.saved = false;
            self.inspector.request_sync();
        }
    }

    // ── Export ─────────────────────────────────────────────────

    fn start_export(&mut self, settings: ExportSettings) {
        let segments: Vec<Segment> = self
            .timeline
            .clips()
            .iter()
            .map(|clip| {
                Segment::new(
                    clip.source.clone(),
                    clip.in_point(),
                    clip.out_point(),
                    clip.frame_rate,
                )
            })
            .collect();
        match ExportJob::new(settings, segments) {
            Ok(job) => {
                info!(
                    output = %job.settings.output.display(),
                    frames = job.total_frames(),
                    "export started"
                );
                self.export_dialog.exporting = true;
                self.export_dialog.progress = None;
                self.export_dialog.status = None;
                self.export = Some(ExportHandle::start(job));
            }
            Err(err) => self.fail(err),
        }
    }

    fn drain_export_events(&mut self, ctx: &egui::Context) {
        let Some(handle) = &self.export else {
            return;
        };
        let mut done = false;
        for event in handle.events().try_iter() {
            match event {
                ExportEvent::Progress(progress) => {
                    self.export_dialog.progress = Some(progress);
                }
                ExportEvent::Finished(path) => {
                    self.export_dialog.status = Some(ExportStatus::Done(path));
                    done = true;
                }
                ExportEvent::Failed(message) => {
                    self.export_dialog.status = Some(ExportStatus::Failed(message));
                    done = true;
                }
                ExportEvent::Cancelled => {
                    self.export_dialog.status =
                        Some(ExportStatus::Failed("Export cancelled".to_string()));
                    done = true;
                }
            }
        }
        if done {
            self.export = None;
            self.export_dialog.exporting = false;
            self.export_dialog.progress = None;
        } else {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }

    // ── Action application ─────────────────────────────────────

    fn apply_timeline_actions(&mut self, actions: Vec<TimelineAction>) {
        for action in actions {
            match action {
                TimelineAction::Seek(frame) => {
                    self.timeline.set_position(frame);
                }
                TimelineAction::Select(index) => {
                    self.timeline.select(index);
                }
                TimelineAction::SplitAtCursor => self.split_at_cursor(),
                TimelineAction::RemoveSelected => self.remove_selected(),
            }
        }
    }

    fn apply_media_actions(&mut self, actions: Vec<MediaAction>) {
        for action in actions {
            match action {
                MediaAction::OpenFolder => self.pick_and_open_folder(),
                MediaAction::ImportFiles => self.pick_and_import_files(),
                MediaAction::UseForCurrent(source_index) => self.use_for_current(source_index),
            }
        }
    }

    fn apply_inspector_actions(&mut self, actions: Vec<InspectorAction>) {
        let Some(index) = self.timeline.selected_index() else {
            for action in actions {
                if let InspectorAction::Error(message) = action {
                    self.error_dialog.show(message);
                }
            }
            return;
        };
        let mut touched = false;
        for action in actions {
            match action {
                InspectorAction::Rename(name) => {
                    touched |= self.timeline.set_clip_name(index, name);
                }
                InspectorAction::SetPlayRate(rate) => {
                    touched |= self.timeline.set_play_rate(index, rate);
                }
                InspectorAction::SetInPoint(frames) => {
                    if self.timeline.set_in_point(index, frames) {
                        touched = true;
                    } else {
                        self.error_dialog.show(
                            "In point must fall inside the clip and after the previous cut"
                                .to_string(),
                        );
                        self.inspector.request_sync();
                    }
                }
                InspectorAction::SetOutPoint(frames) => {
                    if self.timeline.set_out_point(index, frames) {
                        touched = true;
                    } else {
                        self.error_dialog.show(
                            "Out point must fall inside the clip and before the next cut"
                                .to_string(),
                        );
                        self.inspector.request_sync();
                    }
                }
                InspectorAction::ReplaceSource(source_index) => {
                    touched |= self.timeline.replace_clip_source(index, source_index);
                }
                InspectorAction::SetNeighbor(direction, neighbor) => {
                    let Some(clip) = self.timeline.clip(index) else {
                        continue;
                    };
                    let key = self
                        .adjacency
                        .key_for(&relative_source(&clip.source, self.staging.root()));
                    self.adjacency.set_neighbor(&key, direction, neighbor);
                    self.saved = false;
                }
                InspectorAction::Error(message) => {
                    self.error_dialog.show(message);
                }
            }
        }
        if touched {
            self.saved = false;
            self.inspector.request_sync();
        }
    }

    fn apply_export_actions(&mut self, actions: Vec<ExportDialogAction>) {
        for action in actions {
            match action {
                ExportDialogAction::Browse => {
                    if let Some(path) = rfd::FileDialog::new()
                        .add_filter("MP4 video", &["mp4"])
                        .set_file_name("export.mp4")
                        .save_file()
                    {
                        self.export_dialog.output_path = path.display().to_string();
                    }
                }
                ExportDialogAction::Start(settings) => self.start_export(settings),
                ExportDialogAction::CancelExport => {
                    if let Some(handle) = &self.export {
                        handle.cancel();
                    }
                }
            }
        }
    }

    fn apply_jump_actions(&mut self, actions: Vec<JumpAction>) {
        for action in actions {
            match action {
                JumpAction::Jump(direction) => self.jump_to(direction),
            }
        }
    }

    // ── File dialogs ───────────────────────────────────────────

    fn pick_and_open_folder(&mut self) {
        if let Some(folder) = rfd::FileDialog::new().pick_folder() {
            if let Err(err) = self.open_folder(&folder) {
                self.fail(err);
            }
        }
    }

    fn pick_and_import_files(&mut self) {
        if let Some(files) = rfd::FileDialog::new()
            .add_filter("Videos", &VIDEO_EXTENSIONS)
            .pick_files()
        {
            if let Err(err) = self.import_files(&files) {
                self.fail(err);
            }
        }
    }

    fn pick_and_load_project(&mut self) {
        if let Some(dir) = rfd::FileDialog::new().pick_folder() {
            if let Err(err) = self.load_project(&dir) {
                self.fail(err);
            }
        }
    }

    fn save_project_via_dialog(&mut self) {
        let dir = self
            .project_dir
            .clone()
            .or_else(|| rfd::FileDialog::new().pick_folder());
        if let Some(dir) = dir {
            if let Err(err) = self.save_project(&dir) {
                self.fail(err);
            }
        }
    }

    fn fail(&mut self, err: impl std::fmt::Display) {
        warn!(%err, "operation failed");
        self.error_dialog.show(err.to_string());
    }
}

impl eframe::App for HerdlogApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_export_events(ctx);

        // While a job renders, the export dialog is the only live surface.
        let exporting = self.export.is_some();

        // Menu bar
        egui::TopBottomPanel::top("menu_bar")
            .frame(Theme::top_bar_frame())
            .show(ctx, |ui| {
                if exporting {
                    ui.disable();
                }
                egui::menu::bar(ui, |ui| {
                    ui.menu_button("File", |ui| {
                        if ui.button("New Project").clicked() {
                            self.new_project();
                            ui.close_menu();
                        }
                        if ui.button("Open Folder...").clicked() {
                            ui.close_menu();
                            self.pick_and_open_folder();
                        }
                        if ui.button("Import Videos...").clicked() {
                            ui.close_menu();
                            self.pick_and_import_files();
                        }
                        ui.separator();
                        if ui.button("Open Project...").clicked() {
                            ui.close_menu();
                            self.pick_and_load_project();
                        }
                        if ui.button("Save Project").clicked() {
                            ui.close_menu();
                            self.save_project_via_dialog();
                        }
                        ui.separator();
                        if ui.button("Export...").clicked() {
                            self.export_dialog.open = true;
                            ui.close_menu();
                        }
                        ui.separator();
                        if ui.button("Quit").clicked() {
                            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                        }
                    });
                    ui.menu_button("Edit", |ui| {
                        if ui.button("Split at Playhead").clicked() {
                            self.split_at_cursor();
                            ui.close_menu();
                        }
                        if ui.button("Remove Clip").clicked() {
                            self.remove_selected();
                            ui.close_menu();
                        }
                    });
                    ui.menu_button("Help", |ui| {
                        if ui.button("About").clicked() {
                            info!("Herdlog v0.1.0");
                            ui.close_menu();
                        }
                    });
                });
            });

        // Timeline at bottom
        let mut timeline_actions = Vec::new();
        egui::TopBottomPanel::bottom("timeline_panel")
            .resizable(true)
            .min_height(100.0)
            .default_height(200.0)
            .show(ctx, |ui| {
                if exporting {
                    ui.disable();
                }
                timeline_actions =
                    show_timeline_panel(ui, &mut self.timeline_panel, &self.timeline);
            });
        self.apply_timeline_actions(timeline_actions);

        // Media on the left
        let mut media_actions = Vec::new();
        egui::SidePanel::left("media_panel")
            .resizable(true)
            .default_width(200.0)
            .frame(Theme::panel_frame())
            .show(ctx, |ui| {
                if exporting {
                    ui.disable();
                }
                ui.heading("Media");
                ui.separator();
                media_actions = show_media_panel(ui, &self.timeline, self.staging.root());
            });
        self.apply_media_actions(media_actions);

        // Inspector and jump pad on the right
        let mut inspector_actions = Vec::new();
        let mut jump_actions = Vec::new();
        egui::SidePanel::right("inspector_panel")
            .resizable(true)
            .default_width(260.0)
            .frame(Theme::panel_frame())
            .show(ctx, |ui| {
                if exporting {
                    ui.disable();
                }
                ui.heading("Inspector");
                ui.separator();
                inspector_actions = show_inspector(
                    ui,
                    &mut self.inspector,
                    &self.timeline,
                    &self.adjacency,
                    self.staging.root(),
                );

                ui.add_space(Theme::SPACE_MD);
                Theme::draw_separator(ui);
                ui.add_space(Theme::SPACE_SM);

                ui.label(
                    egui::RichText::new("JUMP TO CAMERA")
                        .size(Theme::FONT_XS)
                        .color(Theme::t3())
                        .strong(),
                );
                ui.add_space(Theme::SPACE_XS);
                let key = self.timeline.current_clip().map(|clip| {
                    self.adjacency
                        .key_for(&relative_source(&clip.source, self.staging.root()))
                });
                let neighbors = key.as_deref().and_then(|key| self.adjacency.neighbors(key));
                jump_actions = show_jump_pad(ui, neighbors);
            });
        self.apply_inspector_actions(inspector_actions);
        self.apply_jump_actions(jump_actions);

        // Central summary
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(Theme::SPACE_MD);
            let position = self.timeline.position();
            match self.timeline.current_clip() {
                Some(clip) => {
                    ui.vertical_centered(|ui| {
                        ui.add_space(40.0);
                        ui.label(
                            egui::RichText::new(&clip.name)
                                .size(Theme::FONT_MD)
                                .color(Theme::t1())
                                .strong(),
                        );
                        ui.add_space(Theme::SPACE_XS);
                        ui.label(
                            egui::RichText::new(relative_source(
                                &clip.source,
                                self.staging.root(),
                            ))
                            .size(Theme::FONT_SM)
                            .color(Theme::t2()),
                        );
                        ui.add_space(Theme::SPACE_SM);
                        let mut readout = format!(
                            "cursor {}",
                            frames_to_time_string(position, clip.frame_rate)
                        );
                        if let Some(hit) = self.timeline.clip_at(position) {
                            readout.push_str(&format!("   source frame {}", hit.source_frame));
                        }
                        ui.label(
                            egui::RichText::new(readout)
                                .size(Theme::FONT_XS)
                                .color(Theme::t3())
                                .family(egui::FontFamily::Monospace),
                        );
                    });
                }
                None => {
                    ui.vertical_centered(|ui| {
                        ui.add_space(40.0);
                        ui.label(
                            egui::RichText::new("No clip under the cursor")
                                .size(Theme::FONT_SM)
                                .color(Theme::t3()),
                        );
                        ui.add_space(Theme::SPACE_XS);
                        ui.label(
                            egui::RichText::new(
                                "Open a camera folder or project from the File menu",
                            )
                            .size(Theme::FONT_XS)
                            .color(Theme::t4()),
                        );
                    });
                }
            }

            ui.with_layout(egui::Layout::bottom_up(egui::Align::Min), |ui| {
                let status = match (&self.project_dir, self.saved) {
                    (Some(dir), true) => format!("Project: {}", dir.display()),
                    (Some(dir), false) => {
                        format!("Project: {} (unsaved changes)", dir.display())
                    }
                    (None, true) => "No project".to_string(),
                    (None, false) => "No project (unsaved changes)".to_string(),
                };
                ui.label(
                    egui::RichText::new(status)
                        .size(Theme::FONT_XS)
                        .color(Theme::t4()),
                );
            });
        });

        // Dialogs
        let export_actions = show_export_dialog(ctx, &mut self.export_dialog);
        self.apply_export_actions(export_actions);
        show_error_dialog(ctx, &mut self.error_dialog);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if !self.saved && !self.adjacency.is_empty() {
            let path = PathBuf::from(ADJACENCY_FILE);
            match self.adjacency.save_to_file(&path) {
                Ok(()) => info!(path = %path.display(), "flushed unsaved adjacency map"),
                Err(err) => warn!(%err, "could not flush adjacency map"),
            }
        }
    }
}
