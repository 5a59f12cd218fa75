use std::time::Instant;

use crate::analysis::AnalysisResult;
use crate::geometry::{BoundingBox, PageExtent, Point, PolygonId};

/// Estimated bubble footprint used for placement; the rendered bubble is
/// constrained to stay inside it.
pub const ESTIMATED_WIDTH: f32 = 260.0;
pub const ESTIMATED_HEIGHT: f32 = 180.0;
pub const ANCHOR_GAP: f32 = 8.0;

#[derive(Clone, Debug)]
pub enum AnnotationContent {
    Pending { since: Instant },
    Ready(AnalysisResult),
    Failed(String),
}

/// The floating bubble paired 1:1 with a committed polygon. Lives and
/// dies with its polygon, except that the user may close it early.
#[derive(Clone, Debug)]
pub struct Annotation {
    pub id: PolygonId,
    pub bounds: BoundingBox,
    pub position: Point,
    pub content: AnnotationContent,
}

impl Annotation {
    pub fn pending(id: PolygonId, bounds: BoundingBox, extent: PageExtent) -> Self {
        Self {
            id,
            bounds,
            position: anchor_position(bounds, extent),
            content: AnnotationContent::Pending {
                since: Instant::now(),
            },
        }
    }

    /// Recomputes the anchor from the stored bounding box against a new
    /// page extent.
    pub fn reclamp(&mut self, extent: PageExtent) {
        self.position = anchor_position(self.bounds, extent);
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.content, AnnotationContent::Pending { .. })
    }
}

/// Bubble anchor for a polygon's bounding box: to the right of the box,
/// top-aligned; flipped to the left when the right edge of the page would
/// overflow; shifted up when the bottom would; and finally clamped so the
/// estimated footprint always stays inside the extent.
pub fn anchor_position(bounds: BoundingBox, extent: PageExtent) -> Point {
    let mut x = bounds.max_x + ANCHOR_GAP;
    if x + ESTIMATED_WIDTH > extent.width {
        x = (bounds.min_x - ESTIMATED_WIDTH - ANCHOR_GAP).max(0.0);
    }

    let mut y = bounds.min_y;
    if y + ESTIMATED_HEIGHT > extent.height {
        y = (extent.height - ESTIMATED_HEIGHT - ANCHOR_GAP).max(0.0);
    }

    x = x.clamp(0.0, (extent.width - ESTIMATED_WIDTH).max(0.0));
    y = y.clamp(0.0, (extent.height - ESTIMATED_HEIGHT).max(0.0));
    Point::new(x, y)
}

#[cfg(test)]
mod tests {
    use super::{anchor_position, ANCHOR_GAP, ESTIMATED_HEIGHT, ESTIMATED_WIDTH};
    use crate::geometry::{BoundingBox, PageExtent};

    #[test]
    fn default_placement_sits_right_of_the_box() {
        let bounds = BoundingBox::new(100.0, 100.0, 200.0, 150.0);
        let extent = PageExtent::new(1000.0, 2000.0);
        let anchor = anchor_position(bounds, extent);
        assert_eq!(anchor.x, 200.0 + ANCHOR_GAP);
        assert_eq!(anchor.y, 100.0);
    }

    #[test]
    fn right_overflow_flips_to_the_left() {
        // The worked placement scenario: extent 1000x2000, box
        // {900..950, 100..150}, width 260.
        let bounds = BoundingBox::new(900.0, 100.0, 950.0, 150.0);
        let extent = PageExtent::new(1000.0, 2000.0);
        let anchor = anchor_position(bounds, extent);
        assert_eq!(anchor.x, 632.0);
        assert_eq!(anchor.y, 100.0);
    }

    #[test]
    fn flip_clamps_at_the_left_edge() {
        let bounds = BoundingBox::new(700.0, 50.0, 780.0, 90.0);
        let extent = PageExtent::new(800.0, 600.0);
        let anchor = anchor_position(bounds, extent);
        // 700 - 260 - 8 = 432, still on-page.
        assert_eq!(anchor.x, 432.0);

        let narrow = BoundingBox::new(100.0, 50.0, 380.0, 90.0);
        let extent = PageExtent::new(400.0, 600.0);
        let anchor = anchor_position(narrow, extent);
        assert_eq!(anchor.x, 0.0);
    }

    #[test]
    fn bottom_overflow_shifts_up() {
        let bounds = BoundingBox::new(100.0, 1900.0, 200.0, 1950.0);
        let extent = PageExtent::new(1000.0, 2000.0);
        let anchor = anchor_position(bounds, extent);
        assert_eq!(anchor.y, 2000.0 - ESTIMATED_HEIGHT - ANCHOR_GAP);
    }

    #[test]
    fn placement_always_stays_inside_the_extent() {
        let extent = PageExtent::new(1000.0, 1500.0);
        let boxes = [
            BoundingBox::new(-50.0, -50.0, 20.0, 20.0),
            BoundingBox::new(980.0, 10.0, 1020.0, 60.0),
            BoundingBox::new(10.0, 1480.0, 80.0, 1540.0),
            BoundingBox::new(990.0, 1490.0, 1000.0, 1500.0),
            BoundingBox::new(0.0, 0.0, 1000.0, 1500.0),
        ];
        for bounds in boxes {
            let anchor = anchor_position(bounds, extent);
            assert!(anchor.x >= 0.0, "x negative for {bounds:?}");
            assert!(anchor.y >= 0.0, "y negative for {bounds:?}");
            assert!(
                anchor.x + ESTIMATED_WIDTH <= extent.width,
                "x overflow for {bounds:?}"
            );
            assert!(
                anchor.y + ESTIMATED_HEIGHT <= extent.height,
                "y overflow for {bounds:?}"
            );
        }
    }
}
