//! Lantern dark theme — warm palette tuned for long review sessions.

use egui::{Color32, Rounding, Stroke, Vec2};

/// Central theme constants and helpers.
pub struct Theme;

impl Theme {
    // ── Typography ─────────────────────────────────────────────
    pub const FONT_XS: f32 = 11.0; // meta, timecodes, badges
    pub const FONT_SM: f32 = 13.0; // body, labels, buttons
    pub const FONT_MD: f32 = 15.0; // section headers

    // ── Spacing (4px base) ─────────────────────────────────────
    pub const SPACE_XS: f32 = 4.0;
    pub const SPACE_SM: f32 = 8.0;
    pub const SPACE_MD: f32 = 16.0;

    // ── Border radius ──────────────────────────────────────────
    pub const RADIUS: f32 = 5.0; // interactive elements
    pub const RADIUS_LG: f32 = 10.0; // floating windows

    // ── Stroke widths ──────────────────────────────────────────
    pub const STROKE_SUBTLE: f32 = 0.5;
    pub const STROKE_EMPHASIS: f32 = 1.0;
    pub const DIVIDER_WIDTH: f32 = 1.0;

    // ── Backgrounds ────────────────────────────────────────────
    pub const fn bg() -> Color32 {
        Color32::from_rgb(21, 18, 15)
    }
    pub const fn bg1() -> Color32 {
        Color32::from_rgb(30, 26, 22)
    }
    pub const fn bg2() -> Color32 {
        Color32::from_rgb(38, 33, 28)
    }
    pub const fn bg3() -> Color32 {
        Color32::from_rgb(48, 42, 35)
    }
    /// Text inputs, search fields.
    pub const fn input_bg() -> Color32 {
        Color32::from_rgb(17, 15, 12)
    }

    // ── Text (opacity-based warm white) ────────────────────────
    pub const fn t1() -> Color32 {
        Color32::from_rgba_premultiplied(236, 230, 220, 238)
    }
    pub const fn t2() -> Color32 {
        Color32::from_rgba_premultiplied(156, 150, 140, 158)
    }
    pub const fn t3() -> Color32 {
        Color32::from_rgba_premultiplied(92, 88, 80, 95)
    }
    pub const fn t4() -> Color32 {
        Color32::from_rgba_premultiplied(42, 40, 36, 45)
    }

    // ── Accent ─────────────────────────────────────────────────
    /// Hay gold, the primary accent.
    pub const fn accent() -> Color32 {
        Color32::from_rgb(226, 168, 68)
    }
    /// Accent @ 8% — subtle active fill.
    pub const fn accent_subtle() -> Color32 {
        Color32::from_rgba_premultiplied(18, 13, 5, 20)
    }
    /// Accent @ 15% — hovered widget stroke.
    pub const fn accent_hover() -> Color32 {
        Color32::from_rgba_premultiplied(34, 25, 10, 38)
    }

    // ── White-alpha overlay helpers ────────────────────────────
    pub const fn white_02() -> Color32 {
        Color32::from_rgba_premultiplied(5, 5, 5, 5)
    }
    pub const fn white_04() -> Color32 {
        Color32::from_rgba_premultiplied(10, 10, 10, 10)
    }
    pub const fn white_06() -> Color32 {
        Color32::from_rgba_premultiplied(15, 15, 15, 15)
    }
    pub const fn white_08() -> Color32 {
        Color32::from_rgba_premultiplied(20, 20, 20, 20)
    }
    pub const fn white_10() -> Color32 {
        Color32::from_rgba_premultiplied(26, 26, 26, 26)
    }

    /// Section separators — white @ 6%.
    pub const fn divider() -> Color32 {
        Color32::from_rgba_premultiplied(15, 15, 15, 15)
    }

    // ── Semantic colors ────────────────────────────────────────
    pub const fn red() -> Color32 {
        Color32::from_rgb(235, 94, 80)
    }
    pub const fn green() -> Color32 {
        Color32::from_rgb(104, 203, 132)
    }

    // ── Color helpers ──────────────────────────────────────────

    /// Return a color with replaced alpha.
    pub const fn with_alpha(c: Color32, a: u8) -> Color32 {
        Color32::from_rgba_premultiplied(
            (c.r() as u16 * a as u16 / 255) as u8,
            (c.g() as u16 * a as u16 / 255) as u8,
            (c.b() as u16 * a as u16 / 255) as u8,
            a,
        )
    }

    // ── Frame builders ─────────────────────────────────────────

    /// Standard side panel frame.
    pub fn panel_frame() -> egui::Frame {
        egui::Frame::none()
            .fill(Self::bg1())
            .inner_margin(egui::Margin::same(Self::SPACE_SM))
    }

    /// Frame for the menu bar strip.
    pub fn top_bar_frame() -> egui::Frame {
        egui::Frame::none()
            .fill(Self::bg1())
            .stroke(Stroke::new(Self::STROKE_SUBTLE, Self::white_06()))
            .inner_margin(egui::Margin::symmetric(10.0, 2.0))
    }

    /// Frame for floating dialogs.
    pub fn glass_frame() -> egui::Frame {
        egui::Frame::none()
            .fill(Color32::from_rgba_premultiplied(14, 11, 8, 150))
            .stroke(Stroke::new(Self::STROKE_SUBTLE, Self::white_08()))
            .rounding(Rounding::same(Self::RADIUS_LG))
            .inner_margin(egui::Margin::same(14.0))
            .shadow(egui::epaint::Shadow {
                offset: Vec2::new(0.0, 6.0),
                blur: 24.0,
                spread: 0.0,
                color: Color32::from_rgba_premultiplied(0, 0, 0, 110),
            })
    }

    /// Draw a reusable 1px horizontal divider.
    pub fn draw_separator(ui: &mut egui::Ui) {
        let width = ui.available_width();
        let (resp, painter) =
            ui.allocate_painter(Vec2::new(width, Self::DIVIDER_WIDTH), egui::Sense::hover());
        painter.rect_filled(resp.rect, 0.0, Self::divider());
    }

    // ── Theme application ──────────────────────────────────────

    /// Apply the Lantern theme to an egui context.
    pub fn apply(ctx: &egui::Context) {
        let mut style = (*ctx.style()).clone();
        let visuals = &mut style.visuals;
        *visuals = egui::Visuals::dark();

        visuals.panel_fill = Self::bg1();
        visuals.window_fill = Self::bg2();
        visuals.extreme_bg_color = Self::input_bg();
        visuals.faint_bg_color = Self::bg2();

        visuals.widgets.noninteractive.bg_fill = Self::bg2();
        visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, Self::t2());
        visuals.widgets.noninteractive.bg_stroke =
            Stroke::new(Self::STROKE_SUBTLE, Self::white_04());
        visuals.widgets.noninteractive.rounding = Rounding::same(Self::RADIUS);

        visuals.widgets.inactive.bg_fill = Self::bg3();
        visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, Self::t2());
        visuals.widgets.inactive.bg_stroke = Stroke::new(Self::STROKE_SUBTLE, Self::white_04());
        visuals.widgets.inactive.rounding = Rounding::same(Self::RADIUS);

        visuals.widgets.hovered.bg_fill = Self::bg3();
        visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, Self::t1());
        visuals.widgets.hovered.bg_stroke = Stroke::new(Self::STROKE_SUBTLE, Self::accent_hover());
        visuals.widgets.hovered.rounding = Rounding::same(Self::RADIUS);

        visuals.widgets.active.bg_fill = Self::accent_subtle();
        visuals.widgets.active.fg_stroke = Stroke::new(Self::STROKE_EMPHASIS, Self::accent());
        visuals.widgets.active.bg_stroke = Stroke::new(Self::STROKE_EMPHASIS, Self::accent());
        visuals.widgets.active.rounding = Rounding::same(Self::RADIUS);

        visuals.widgets.open.bg_fill = Self::bg3();
        visuals.widgets.open.fg_stroke = Stroke::new(1.0, Self::t1());
        visuals.widgets.open.rounding = Rounding::same(Self::RADIUS);

        visuals.selection.bg_fill = Self::accent_subtle();
        visuals.selection.stroke = Stroke::new(1.0, Self::accent());

        visuals.window_rounding = Rounding::same(Self::RADIUS_LG);
        visuals.window_stroke = Stroke::new(Self::STROKE_SUBTLE, Self::white_04());

        style.interaction.tooltip_delay = 0.4;

        ctx.set_style(style);
    }
}
