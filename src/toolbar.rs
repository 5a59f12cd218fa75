use egui::{vec2, Align, Layout, RichText, Rounding, Stroke, Ui};

use crate::gesture::GesturePhase;
use crate::overlay::Overlay;
use crate::theme::AppTheme;

/// Actions requested from the toolbar this frame.
#[derive(Default)]
pub struct ToolbarOutput {
    pub toggle_capture: bool,
    pub undo: bool,
    pub clear: bool,
}

pub fn show_toolbar(
    ui: &mut Ui,
    theme: &AppTheme,
    overlay: &Overlay,
    phase: GesturePhase,
    show_hint: bool,
) -> ToolbarOutput {
    let mut out = ToolbarOutput::default();

    ui.with_layout(Layout::left_to_right(Align::Center), |ui| {
        ui.spacing_mut().interact_size.y = theme.controls.chip_height;
        ui.spacing_mut().item_spacing = vec2(theme.layout.control_gap, 0.0);

        ui.label(RichText::new("LassoNote").strong().size(16.0));

        if show_hint {
            ui.add_space(theme.layout.space_2);
            ui.label(
                RichText::new("Hold ⌘/Ctrl and drag to lasso a region")
                    .color(theme.text.muted)
                    .size(12.0),
            );
        }

        match phase {
            GesturePhase::Armed => status_chip(ui, theme, "ready"),
            GesturePhase::Drawing => status_chip(ui, theme, "drawing"),
            _ => {}
        }

        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            let clear_button = egui::Button::new("Clear")
                .rounding(Rounding::same(theme.controls.button_rounding));
            if ui
                .add_enabled(!overlay.polygons().is_empty(), clear_button)
                .clicked()
            {
                out.clear = true;
            }

            let undo_button = egui::Button::new("Undo")
                .rounding(Rounding::same(theme.controls.button_rounding));
            if ui
                .add_enabled(!overlay.polygons().is_empty(), undo_button)
                .clicked()
            {
                out.undo = true;
            }

            ui.add_space(theme.layout.space_2);

            let label = if overlay.capture_enabled() {
                "Capture: on"
            } else {
                "Capture: off"
            };
            let mut toggle = egui::Button::new(RichText::new(label).size(13.0))
                .rounding(Rounding::same(theme.controls.chip_rounding));
            if overlay.capture_enabled() {
                toggle = toggle
                    .fill(theme.surfaces.accent_soft)
                    .stroke(Stroke::new(1.0, theme.surfaces.accent));
            } else {
                toggle = toggle.fill(theme.surfaces.card_bg);
            }
            if ui.add(toggle).clicked() {
                out.toggle_capture = true;
            }
        });
    });

    out
}

fn status_chip(ui: &mut Ui, theme: &AppTheme, label: &str) {
    ui.add_space(theme.layout.space_2);
    egui::Frame::none()
        .fill(theme.surfaces.accent_soft)
        .rounding(Rounding::same(theme.controls.chip_rounding))
        .stroke(Stroke::new(1.0, theme.surfaces.accent))
        .inner_margin(egui::Margin::symmetric(theme.layout.space_2, theme.layout.space_1))
        .show(ui, |ui| {
            ui.label(RichText::new(label).color(theme.text.accent).size(12.0));
        });
}
