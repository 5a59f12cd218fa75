use egui::epaint::Shadow;
use egui::{vec2, Color32, Context, FontFamily, FontId, Rounding, Stroke, Style, TextStyle, Visuals};

#[derive(Clone, Debug)]
pub struct AppTheme {
    pub surfaces: SurfaceTokens,
    pub text: TextTokens,
    pub controls: ControlTokens,
    pub layout: LayoutTokens,
    pub lasso: LassoTokens,
    pub page: PageTokens,
}

#[derive(Clone, Debug)]
pub struct SurfaceTokens {
    pub app_bg: Color32,
    pub panel_bg: Color32,
    pub card_bg: Color32,
    pub canvas_bg: Color32,
    pub stroke_soft: Color32,
    pub stroke_strong: Color32,
    pub accent: Color32,
    pub accent_soft: Color32,
}

#[derive(Clone, Debug)]
pub struct TextTokens {
    pub primary: Color32,
    pub secondary: Color32,
    pub muted: Color32,
    pub accent: Color32,
    pub error: Color32,
}

#[derive(Clone, Debug)]
pub struct ControlTokens {
    pub card_rounding: f32,
    pub panel_rounding: f32,
    pub chip_rounding: f32,
    pub button_rounding: f32,
    pub chip_height: f32,
}

#[derive(Clone, Debug)]
pub struct LayoutTokens {
    pub space_1: f32,
    pub space_2: f32,
    pub space_3: f32,
    pub panel_padding_x: f32,
    pub panel_padding_y: f32,
    pub control_gap: f32,
    pub toolbar_height: f32,
}

/// Colors and stroke settings for the two lasso layers.
#[derive(Clone, Debug)]
pub struct LassoTokens {
    pub ink_stroke: Color32,
    pub ink_fill: Color32,
    pub ink_stroke_width: f32,
    pub live_stroke: Color32,
    pub live_stroke_width: f32,
    pub dash_length: f32,
    pub gap_length: f32,
}

#[derive(Clone, Debug)]
pub struct PageTokens {
    pub page_bg: Color32,
    pub page_stroke: Color32,
    pub body_text: Color32,
    pub heading_text: Color32,
}

pub fn overlay_theme() -> AppTheme {
    AppTheme {
        surfaces: SurfaceTokens {
            app_bg: Color32::from_rgb(0x17, 0x18, 0x1C),
            panel_bg: Color32::from_rgb(0x1C, 0x1D, 0x22),
            card_bg: Color32::from_rgb(0x20, 0x22, 0x2A),
            canvas_bg: Color32::from_rgb(0x12, 0x14, 0x1A),
            stroke_soft: Color32::from_rgba_unmultiplied(255, 255, 255, 26),
            stroke_strong: Color32::from_rgba_unmultiplied(255, 255, 255, 48),
            accent: Color32::from_rgb(0x4D, 0x8D, 0xFF),
            accent_soft: Color32::from_rgba_unmultiplied(77, 141, 255, 80),
        },
        text: TextTokens {
            primary: Color32::from_rgb(0xF5, 0xF8, 0xFF),
            secondary: Color32::from_rgb(0xB5, 0xC0, 0xD6),
            muted: Color32::from_rgb(0x86, 0x92, 0xAA),
            accent: Color32::from_rgb(0x8F, 0xBB, 0xFF),
            error: Color32::from_rgb(0xE5, 0x3E, 0x3E),
        },
        controls: ControlTokens {
            card_rounding: 12.0,
            panel_rounding: 10.0,
            chip_rounding: 8.0,
            button_rounding: 8.0,
            chip_height: 28.0,
        },
        layout: LayoutTokens {
            space_1: 4.0,
            space_2: 8.0,
            space_3: 12.0,
            panel_padding_x: 12.0,
            panel_padding_y: 8.0,
            control_gap: 8.0,
            toolbar_height: 44.0,
        },
        lasso: LassoTokens {
            ink_stroke: Color32::from_rgb(0x22, 0xC5, 0x5E),
            ink_fill: Color32::from_rgba_unmultiplied(34, 197, 94, 31),
            ink_stroke_width: 2.0,
            live_stroke: Color32::from_rgb(0x00, 0xB3, 0xFF),
            live_stroke_width: 2.0,
            dash_length: 6.0,
            gap_length: 6.0,
        },
        page: PageTokens {
            page_bg: Color32::from_rgb(0xFB, 0xFA, 0xF6),
            page_stroke: Color32::from_rgba_unmultiplied(255, 255, 255, 40),
            body_text: Color32::from_rgb(0x2A, 0x2F, 0x38),
            heading_text: Color32::from_rgb(0x12, 0x16, 0x1E),
        },
    }
}

pub fn apply_theme(ctx: &Context, theme: &AppTheme) {
    let mut style: Style = (*ctx.style()).clone();

    style.spacing.item_spacing = vec2(theme.layout.control_gap, theme.layout.space_2);
    style.spacing.button_padding = vec2(theme.layout.space_3, theme.layout.space_2);
    style.spacing.window_margin = egui::Margin::symmetric(theme.layout.space_3, theme.layout.space_3);

    style.visuals = Visuals::dark();
    style.visuals.override_text_color = Some(theme.text.primary);
    style.visuals.panel_fill = theme.surfaces.panel_bg;
    style.visuals.window_fill = theme.surfaces.panel_bg;
    style.visuals.faint_bg_color = theme.surfaces.panel_bg;
    style.visuals.extreme_bg_color = theme.surfaces.app_bg;
    style.visuals.window_rounding = Rounding::same(theme.controls.panel_rounding);

    style.visuals.widgets.noninteractive.bg_fill = theme.surfaces.panel_bg;
    style.visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, theme.text.secondary);
    style.visuals.widgets.noninteractive.bg_stroke = Stroke::new(1.0, theme.surfaces.stroke_soft);

    style.visuals.widgets.inactive.bg_fill = theme.surfaces.card_bg;
    style.visuals.widgets.inactive.weak_bg_fill = theme.surfaces.card_bg;
    style.visuals.widgets.inactive.bg_stroke = Stroke::new(1.0, theme.surfaces.stroke_soft);
    style.visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, theme.text.secondary);

    style.visuals.widgets.hovered.bg_fill = theme.surfaces.card_bg;
    style.visuals.widgets.hovered.weak_bg_fill = theme.surfaces.card_bg;
    style.visuals.widgets.hovered.bg_stroke = Stroke::new(1.0, theme.surfaces.stroke_strong);
    style.visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, theme.text.primary);

    style.visuals.widgets.active.bg_fill = theme.surfaces.accent_soft;
    style.visuals.widgets.active.bg_stroke = Stroke::new(1.0, theme.surfaces.accent);
    style.visuals.widgets.active.fg_stroke = Stroke::new(1.0, theme.text.primary);

    style.visuals.selection.bg_fill = theme.surfaces.accent_soft;
    style.visuals.selection.stroke = Stroke::new(1.0, theme.surfaces.accent);
    style.visuals.hyperlink_color = theme.text.accent;
    style.visuals.popup_shadow = Shadow {
        offset: vec2(0.0, 10.0),
        blur: 22.0,
        spread: 0.0,
        color: Color32::from_rgba_unmultiplied(0, 0, 0, 56),
    };

    for rounding in [
        &mut style.visuals.widgets.noninteractive.rounding,
        &mut style.visuals.widgets.inactive.rounding,
        &mut style.visuals.widgets.hovered.rounding,
        &mut style.visuals.widgets.active.rounding,
        &mut style.visuals.widgets.open.rounding,
    ] {
        *rounding = Rounding::same(theme.controls.button_rounding);
    }

    style
        .text_styles
        .insert(TextStyle::Body, FontId::new(15.0, FontFamily::Proportional));
    style
        .text_styles
        .insert(TextStyle::Button, FontId::new(14.0, FontFamily::Proportional));

    ctx.set_style(style);
}
