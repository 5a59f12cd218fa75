use std::time::Duration;

use eframe::egui::{
    self, vec2, Align, Align2, Context as EguiContext, CursorIcon, FontId, Id, Key, Layout, Order,
    Pos2, Rect, Response, RichText, Rounding, ScrollArea, Sense, Stroke, TopBottomPanel, Ui, Vec2,
};
use eframe::{App, Frame};
use log::warn;

use crate::analysis::{AnalysisEvent, AnalysisRequest, AnalysisWorker, Analyzer, ANALYSIS_TIMEOUT};
use crate::annotation::{AnnotationContent, ESTIMATED_WIDTH};
use crate::extract::{self, ContentSource};
use crate::geometry::{bounding_box_of, Point, PolygonId};
use crate::gesture::{GestureEvent, GestureMachine, GestureOutcome, GesturePhase};
use crate::overlay::{Overlay, UserSettings};
use crate::page::PageModel;
use crate::surface::{PageTransform, RenderSurface};
use crate::theme::{self, AppTheme};
use crate::toolbar;

pub const ZOOM_STEPS: &[f32] = &[0.5, 0.67, 0.75, 1.0, 1.25, 1.5, 2.0];

const CANVAS_PADDING: f32 = 24.0;

pub struct LassoNoteApp {
    page: PageModel,
    overlay: Overlay,
    gesture: GestureMachine,
    surface: RenderSurface,
    worker: AnalysisWorker,
    settings: UserSettings,
    theme: AppTheme,
    zoom: f32,
    last_scroll: Vec2,
    last_viewport: Vec2,
}

impl LassoNoteApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        page: PageModel,
        analyzer: Box<dyn Analyzer>,
    ) -> Self {
        let theme = theme::overlay_theme();
        theme::apply_theme(&cc.egui_ctx, &theme);

        let settings = UserSettings::load().unwrap_or_default();
        let mut overlay = Overlay::new(settings.capture_enabled);
        overlay.mount();

        Self {
            page,
            overlay,
            gesture: GestureMachine::new(),
            surface: RenderSurface::new(),
            worker: AnalysisWorker::spawn(analyzer),
            settings,
            theme,
            zoom: 1.0,
            last_scroll: Vec2::ZERO,
            last_viewport: Vec2::ZERO,
        }
    }

    fn pump_analysis(&mut self, ctx: &EguiContext) {
        let mut changed = false;
        while let Some(event) = self.worker.try_recv() {
            match event {
                AnalysisEvent::Completed { polygon_id, result } => {
                    self.overlay.resolve(polygon_id, Ok(result));
                }
                AnalysisEvent::Failed { polygon_id, error } => {
                    warn!("analysis for polygon {polygon_id} failed: {error}");
                    self.overlay.resolve(polygon_id, Err(error));
                }
            }
            changed = true;
        }

        if self.overlay.fail_stale(ANALYSIS_TIMEOUT) > 0 {
            changed = true;
        }
        if changed {
            ctx.request_repaint();
        }
        // Keep draining while bubbles are waiting on the worker.
        if self.overlay.annotations().iter().any(|a| a.is_pending()) {
            ctx.request_repaint_after(Duration::from_millis(120));
        }
    }

    fn handle_shortcuts(&mut self, ctx: &EguiContext) {
        if ctx.input(|input| input.key_pressed(Key::Escape)) {
            let outcome = self.gesture.handle(GestureEvent::Cancel);
            self.apply_outcome(outcome, ctx);
        }

        let cmd = ctx.input(|input| input.modifiers.command || input.modifiers.ctrl);
        if !cmd {
            return;
        }

        if ctx.input(|input| input.key_pressed(Key::Z)) {
            self.overlay.undo();
        }

        if ctx.input(|input| input.key_pressed(Key::Plus) || input.key_pressed(Key::Equals)) {
            self.zoom_in();
        }
        if ctx.input(|input| input.key_pressed(Key::Minus)) {
            self.zoom_out();
        }
    }

    fn nearest_zoom_step(&self) -> usize {
        let mut best_idx = 0usize;
        let mut best_diff = f32::MAX;
        for (idx, step) in ZOOM_STEPS.iter().enumerate() {
            let diff = (self.zoom - step).abs();
            if diff < best_diff {
                best_diff = diff;
                best_idx = idx;
            }
        }
        best_idx
    }

    fn zoom_in(&mut self) {
        let idx = self.nearest_zoom_step();
        if idx + 1 < ZOOM_STEPS.len() {
            self.zoom = ZOOM_STEPS[idx + 1];
            self.surface.request_resize();
        }
    }

    fn zoom_out(&mut self) {
        let idx = self.nearest_zoom_step();
        if idx > 0 {
            self.zoom = ZOOM_STEPS[idx - 1];
            self.surface.request_resize();
        }
    }

    fn toggle_capture(&mut self, ctx: &EguiContext) {
        let enabled = !self.overlay.capture_enabled();
        self.overlay.set_capture_enabled(enabled);
        self.settings.capture_enabled = enabled;
        if let Err(err) = self.settings.save() {
            warn!("cannot save settings: {err:#}");
        }
        if !enabled {
            let outcome = self.gesture.handle(GestureEvent::Cancel);
            self.apply_outcome(outcome, ctx);
        }
    }

    fn apply_outcome(&mut self, outcome: GestureOutcome, ctx: &EguiContext) {
        match outcome {
            GestureOutcome::Committed(points) => {
                self.commit_polygon(points);
                ctx.request_repaint();
            }
            GestureOutcome::StrokeChanged | GestureOutcome::Cancelled => {
                ctx.request_repaint();
            }
            GestureOutcome::Discarded | GestureOutcome::None => {}
        }
    }

    fn commit_polygon(&mut self, points: Vec<Point>) {
        let extraction = extract::extract_from_polygon(&self.page, &points);
        let bounds = bounding_box_of(&points);
        let id = self.overlay.commit(points, self.surface.extent());
        self.worker.submit(AnalysisRequest {
            polygon_id: id,
            content: extraction,
            bounds,
        });
    }

    fn show_canvas(&mut self, ui: &mut Ui, ctx: &EguiContext) {
        let available = ui.available_size();
        if available != self.last_viewport {
            self.last_viewport = available;
            self.surface.request_resize();
        }

        if self.surface.begin_frame(self.page.extent()) {
            self.overlay.reclamp(self.surface.extent());
        }
        let extent = self.surface.extent();

        let scaled = vec2(extent.width * self.zoom, extent.height * self.zoom);
        let canvas_size = vec2(
            (scaled.x + CANVAS_PADDING * 2.0).max(available.x),
            (scaled.y + CANVAS_PADDING * 2.0).max(available.y),
        );

        let output = ScrollArea::both()
            .id_source("lassonote_page_scroll")
            .show(ui, |ui| {
                let (canvas_rect, response) =
                    ui.allocate_exact_size(canvas_size, Sense::click_and_drag());

                let origin = Pos2::new(
                    canvas_rect.center().x - scaled.x * 0.5,
                    canvas_rect.min.y + CANVAS_PADDING,
                );
                let transform = PageTransform {
                    origin,
                    zoom: self.zoom,
                };

                let painter = ui.painter_at(canvas_rect);
                self.draw_page(&painter, &transform);
                self.surface.paint_ink(
                    &painter,
                    self.overlay.polygons(),
                    &transform,
                    &self.theme.lasso,
                );
                self.surface.paint_live(
                    &painter,
                    self.gesture.stroke(),
                    &transform,
                    &self.theme.lasso,
                );

                self.handle_pointer(ctx, &response, &transform);
                transform
            });

        // Scroll funnels into the same coalesced recompute as resizes:
        // lazy content growth is picked up on the next frame.
        let scroll = output.state.offset;
        if scroll != self.last_scroll {
            self.last_scroll = scroll;
            self.surface.request_resize();
        }
        self.page.set_scroll(scroll.x / self.zoom, scroll.y / self.zoom);

        self.show_annotations(ctx, &output.inner);
    }

    fn draw_page(&self, painter: &egui::Painter, transform: &PageTransform) {
        let extent = self.surface.extent();
        let rect = Rect::from_min_size(
            transform.to_screen(Point::new(0.0, 0.0)),
            vec2(extent.width * transform.zoom, extent.height * transform.zoom),
        );
        painter.rect_filled(rect, 12.0, self.theme.page.page_bg);
        painter.rect_stroke(rect, 12.0, Stroke::new(1.0, self.theme.page.page_stroke));

        for line in self.page.lines() {
            if !line.visible {
                continue;
            }
            let pos = transform.to_screen(Point::new(line.rect.min_x, line.rect.min_y));
            let color = if line.heading {
                self.theme.page.heading_text
            } else {
                self.theme.page.body_text
            };
            painter.text(
                pos,
                Align2::LEFT_TOP,
                &line.text,
                FontId::monospace(line.font_size * transform.zoom),
                color,
            );
        }
    }

    fn handle_pointer(&mut self, ctx: &EguiContext, response: &Response, transform: &PageTransform) {
        let modifier = ctx.input(|input| input.modifiers.command);
        if modifier != self.gesture.modifier_down() {
            let event = if modifier {
                GestureEvent::ModifierDown
            } else {
                GestureEvent::ModifierUp
            };
            let outcome = self.gesture.handle(event);
            self.apply_outcome(outcome, ctx);
        }

        if !self.overlay.capture_enabled() || !self.overlay.is_mounted() {
            return;
        }

        let pointer_pos = ctx.input(|input| input.pointer.interact_pos());

        if ctx.input(|input| input.pointer.primary_pressed()) && response.hovered() {
            if let Some(pos) = pointer_pos {
                let outcome = self
                    .gesture
                    .handle(GestureEvent::PointerDown(transform.to_page(pos)));
                self.apply_outcome(outcome, ctx);
            }
        }

        if self.gesture.is_drawing() {
            if let Some(pos) = pointer_pos {
                let outcome = self
                    .gesture
                    .handle(GestureEvent::PointerMoved(transform.to_page(pos)));
                self.apply_outcome(outcome, ctx);
            }
        }

        if ctx.input(|input| input.pointer.primary_released()) {
            let outcome = self.gesture.handle(GestureEvent::PointerReleased);
            self.apply_outcome(outcome, ctx);
        }
    }

    fn show_annotations(&mut self, ctx: &EguiContext, transform: &PageTransform) {
        let mut closed: Vec<PolygonId> = Vec::new();

        for annotation in self.overlay.annotations() {
            let screen = transform.to_screen(annotation.position);
            egui::Area::new(Id::new(("lassonote_bubble", annotation.id)))
                .order(Order::Foreground)
                .fixed_pos(screen)
                .show(ctx, |ui| {
                    egui::Frame::none()
                        .fill(self.theme.surfaces.card_bg)
                        .rounding(Rounding::same(self.theme.controls.card_rounding))
                        .stroke(Stroke::new(1.0, self.theme.surfaces.stroke_strong))
                        .inner_margin(egui::Margin::symmetric(12.0, 10.0))
                        .show(ui, |ui| {
                            ui.set_width(ESTIMATED_WIDTH - 24.0);
                            ui.horizontal(|ui| {
                                ui.label(RichText::new("Selection").strong().size(13.0));
                                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                                    if ui.small_button("✕").clicked() {
                                        closed.push(annotation.id);
                                    }
                                });
                            });
                            ui.add_space(2.0);

                            match &annotation.content {
                                AnnotationContent::Pending { .. } => {
                                    ui.horizontal(|ui| {
                                        ui.add(egui::Spinner::new().size(14.0));
                                        ui.label(
                                            RichText::new("Analyzing selection…")
                                                .color(self.theme.text.secondary)
                                                .size(12.5),
                                        );
                                    });
                                }
                                AnnotationContent::Ready(result) => {
                                    ui.label(RichText::new(&result.summary).size(12.5));
                                    ui.add_space(4.0);
                                    ui.label(
                                        RichText::new(&result.analysis)
                                            .color(self.theme.text.secondary)
                                            .size(12.0),
                                    );
                                    if !result.suggestions.is_empty() {
                                        ui.add_space(4.0);
                                        for suggestion in &result.suggestions {
                                            ui.label(
                                                RichText::new(format!("• {suggestion}"))
                                                    .color(self.theme.text.muted)
                                                    .size(12.0),
                                            );
                                        }
                                    }
                                }
                                AnnotationContent::Failed(error) => {
                                    ui.colored_label(
                                        self.theme.text.error,
                                        RichText::new(error).size(12.5),
                                    );
                                }
                            }
                        });
                });
        }

        for id in closed {
            self.overlay.close_annotation(id);
        }
    }
}

impl App for LassoNoteApp {
    fn update(&mut self, ctx: &EguiContext, _frame: &mut Frame) {
        theme::apply_theme(ctx, &self.theme);
        self.pump_analysis(ctx);
        self.handle_shortcuts(ctx);

        let toolbar_out = TopBottomPanel::top("lassonote_toolbar")
            .exact_height(self.theme.layout.toolbar_height)
            .frame(
                egui::Frame::none()
                    .fill(self.theme.surfaces.panel_bg)
                    .inner_margin(egui::Margin::symmetric(
                        self.theme.layout.panel_padding_x,
                        self.theme.layout.panel_padding_y,
                    )),
            )
            .show(ctx, |ui| {
                toolbar::show_toolbar(
                    ui,
                    &self.theme,
                    &self.overlay,
                    self.gesture.phase(),
                    self.settings.show_hint,
                )
            })
            .inner;

        if toolbar_out.toggle_capture {
            self.toggle_capture(ctx);
        }
        if toolbar_out.undo {
            self.overlay.undo();
        }
        if toolbar_out.clear {
            self.overlay.clear();
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(self.theme.surfaces.canvas_bg))
            .show(ctx, |ui| {
                self.show_canvas(ui, ctx);
            });

        if self.overlay.capture_enabled()
            && matches!(
                self.gesture.phase(),
                GesturePhase::Armed | GesturePhase::Drawing
            )
        {
            ctx.set_cursor_icon(CursorIcon::Crosshair);
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.overlay.unmount();
    }
}
