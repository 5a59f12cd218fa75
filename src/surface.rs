use egui::epaint::PathShape;
use egui::{Painter, Pos2, Shape, Stroke};

use crate::geometry::{PageExtent, Point};
use crate::overlay::Polygon;
use crate::theme::LassoTokens;

/// Maps page-space coordinates to screen space for the current frame.
/// egui works in logical points, so device-pixel-ratio crispness comes
/// with the mapping for free.
#[derive(Clone, Copy, Debug)]
pub struct PageTransform {
    pub origin: Pos2,
    pub zoom: f32,
}

impl PageTransform {
    pub fn to_screen(&self, point: Point) -> Pos2 {
        Pos2::new(
            self.origin.x + point.x * self.zoom,
            self.origin.y + point.y * self.zoom,
        )
    }

    pub fn to_page(&self, pos: Pos2) -> Point {
        Point::new(
            (pos.x - self.origin.x) / self.zoom,
            (pos.y - self.origin.y) / self.zoom,
        )
    }
}

/// The two lasso drawing layers, both sized to the full document extent.
/// Extent recomputes are coalesced: scroll and resize events raise a
/// pending flag, and `begin_frame` applies at most one recompute per
/// frame.
pub struct RenderSurface {
    extent: PageExtent,
    resize_pending: bool,
}

impl Default for RenderSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSurface {
    pub fn new() -> Self {
        Self {
            extent: PageExtent::ZERO,
            resize_pending: true,
        }
    }

    pub fn extent(&self) -> PageExtent {
        self.extent
    }

    /// Queues an extent recompute. Safe to call from every scroll or
    /// resize observation; repeated calls within a frame coalesce.
    pub fn request_resize(&mut self) {
        self.resize_pending = true;
    }

    /// Applies a pending recompute against the freshly measured document
    /// extent. Returns true when the extent actually changed, in which
    /// case annotations must be re-clamped.
    pub fn begin_frame(&mut self, measured: PageExtent) -> bool {
        if !self.resize_pending {
            return false;
        }
        self.resize_pending = false;
        if measured == self.extent {
            return false;
        }
        self.extent = measured;
        true
    }

    /// Committed layer: every polygon as a filled, stroked, closed path.
    pub fn paint_ink(
        &self,
        painter: &Painter,
        polygons: &[Polygon],
        transform: &PageTransform,
        tokens: &LassoTokens,
    ) {
        for polygon in polygons {
            if polygon.points.len() < 3 {
                continue;
            }
            let points: Vec<Pos2> = polygon
                .points
                .iter()
                .map(|point| transform.to_screen(*point))
                .collect();
            let stroke = Stroke::new(
                (tokens.ink_stroke_width * transform.zoom).max(1.0),
                tokens.ink_stroke,
            );
            painter.add(Shape::Path(PathShape {
                points,
                closed: true,
                fill: tokens.ink_fill,
                stroke,
            }));
        }
    }

    /// Live layer: the in-progress stroke as a dashed rubber band,
    /// closed back to its first point.
    pub fn paint_live(
        &self,
        painter: &Painter,
        stroke_points: &[Point],
        transform: &PageTransform,
        tokens: &LassoTokens,
    ) {
        if stroke_points.len() < 2 {
            return;
        }
        let mut points: Vec<Pos2> = stroke_points
            .iter()
            .map(|point| transform.to_screen(*point))
            .collect();
        points.push(points[0]);

        let stroke = Stroke::new(
            (tokens.live_stroke_width * transform.zoom).max(1.0),
            tokens.live_stroke,
        );
        painter.extend(Shape::dashed_line(
            &points,
            stroke,
            tokens.dash_length,
            tokens.gap_length,
        ));
    }
}
