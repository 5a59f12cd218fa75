use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

pub type PolygonId = u64;

static NEXT_POLYGON_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique id shared by a committed polygon and its annotation.
pub fn next_polygon_id() -> PolygonId {
    NEXT_POLYGON_ID.fetch_add(1, Ordering::Relaxed)
}

/// A page-space coordinate: relative to the full scrollable document,
/// stable under scrolling.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_sq(self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }
}

/// Full scrollable size of the document.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PageExtent {
    pub width: f32,
    pub height: f32,
}

impl PageExtent {
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoundingBox {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl BoundingBox {
    pub fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.min_x + self.width() * 0.5,
            self.min_y + self.height() * 0.5,
        )
    }
}

/// Axis-aligned bounds of a point sequence. An empty sequence collapses
/// to a zero box at the origin.
pub fn bounding_box_of(points: &[Point]) -> BoundingBox {
    let Some(first) = points.first() else {
        return BoundingBox::default();
    };
    let mut bounds = BoundingBox::new(first.x, first.y, first.x, first.y);
    for point in &points[1..] {
        bounds.min_x = bounds.min_x.min(point.x);
        bounds.min_y = bounds.min_y.min(point.y);
        bounds.max_x = bounds.max_x.max(point.x);
        bounds.max_y = bounds.max_y.max(point.y);
    }
    bounds
}

/// Ray casting: an odd number of polygon edges crossed by the horizontal
/// ray to the right of (x, y) puts the point inside. The epsilon on the
/// edge slope keeps horizontal edges from dividing by zero.
pub fn point_in_polygon(x: f32, y: f32, polygon: &[Point]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (xi, yi) = (polygon[i].x, polygon[i].y);
        let (xj, yj) = (polygon[j].x, polygon[j].y);
        let crosses = (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi + 1e-7) + xi;
        if crosses {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::{bounding_box_of, next_polygon_id, point_in_polygon, Point};

    fn square() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ]
    }

    #[test]
    fn square_contains_center_excludes_outside() {
        let poly = square();
        assert!(point_in_polygon(5.0, 5.0, &poly));
        assert!(!point_in_polygon(15.0, 15.0, &poly));
        assert!(!point_in_polygon(-1.0, 5.0, &poly));
    }

    #[test]
    fn concave_polygon_respects_notch() {
        // A "U" shape: the notch between the arms is outside.
        let poly = vec![
            Point::new(0.0, 0.0),
            Point::new(12.0, 0.0),
            Point::new(12.0, 12.0),
            Point::new(8.0, 12.0),
            Point::new(8.0, 4.0),
            Point::new(4.0, 4.0),
            Point::new(4.0, 12.0),
            Point::new(0.0, 12.0),
        ];
        assert!(point_in_polygon(2.0, 8.0, &poly));
        assert!(point_in_polygon(10.0, 8.0, &poly));
        assert!(!point_in_polygon(6.0, 8.0, &poly));
    }

    #[test]
    fn degenerate_polygon_contains_nothing() {
        assert!(!point_in_polygon(0.0, 0.0, &[]));
        assert!(!point_in_polygon(
            0.0,
            0.0,
            &[Point::new(0.0, 0.0), Point::new(1.0, 1.0)]
        ));
    }

    #[test]
    fn bounding_box_covers_all_points() {
        let bounds = bounding_box_of(&[
            Point::new(3.0, 7.0),
            Point::new(-2.0, 4.0),
            Point::new(9.0, -1.0),
        ]);
        assert_eq!(bounds.min_x, -2.0);
        assert_eq!(bounds.min_y, -1.0);
        assert_eq!(bounds.max_x, 9.0);
        assert_eq!(bounds.max_y, 7.0);
    }

    #[test]
    fn polygon_ids_are_unique() {
        let a = next_polygon_id();
        let b = next_polygon_id();
        assert_ne!(a, b);
    }
}
