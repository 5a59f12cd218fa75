use anyhow::Result;
use log::debug;

use crate::geometry::{self, BoundingBox, PageExtent, Point};

pub type FragmentId = usize;

/// Read-only view of the rendered document the overlay sits on. The core
/// never mutates the document through this seam.
pub trait ContentSource {
    /// Text fragment ids in document order.
    fn fragments(&self) -> Vec<FragmentId>;

    fn fragment_text(&self, id: FragmentId) -> &str;

    /// Whether the fragment's nearest container is rendered at all
    /// (displayed, not hidden, non-zero opacity).
    fn is_visible(&self, id: FragmentId) -> bool;

    /// Rendered rectangles in viewport space. Fails for detached
    /// fragments; callers are expected to skip those.
    fn client_rects(&self, id: FragmentId) -> Result<Vec<BoundingBox>>;

    /// Current scroll offset, added to viewport coordinates to obtain
    /// page coordinates.
    fn scroll_offset(&self) -> (f32, f32);

    fn extent(&self) -> PageExtent;
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Extraction {
    /// All hit fragments joined in document order, normalized.
    pub text: String,
    /// Per-fragment texts, for consumers that want finer control.
    pub parts: Vec<String>,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Collapses whitespace runs (including non-breaking spaces) to single
/// spaces and trims the ends.
pub fn normalize_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collects the text of every visible fragment whose rendered center
/// falls inside `polygon` (page space). Centroid-based on purpose: a
/// fragment merely touching the boundary does not count.
///
/// Callers only invoke this with a committed polygon, so `polygon` has at
/// least three points.
pub fn extract_from_polygon(source: &dyn ContentSource, polygon: &[Point]) -> Extraction {
    debug_assert!(polygon.len() >= 3);

    let (scroll_x, scroll_y) = source.scroll_offset();
    let mut parts = Vec::new();

    for id in source.fragments() {
        let raw = source.fragment_text(id);
        if raw.trim().is_empty() {
            continue;
        }
        if !source.is_visible(id) {
            continue;
        }

        // A malformed fragment must never abort the whole extraction.
        let rects = match source.client_rects(id) {
            Ok(rects) => rects,
            Err(err) => {
                debug!("skipping fragment {id}: {err:#}");
                continue;
            }
        };

        let hit = rects
            .iter()
            .filter(|rect| rect.width() > 0.0 && rect.height() > 0.0)
            .any(|rect| {
                let center = rect.center();
                geometry::point_in_polygon(center.x + scroll_x, center.y + scroll_y, polygon)
            });

        if hit {
            let text = normalize_whitespace(raw);
            if !text.is_empty() {
                parts.push(text);
            }
        }
    }

    let text = normalize_whitespace(&parts.join(" "));
    Extraction { text, parts }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::{extract_from_polygon, normalize_whitespace, ContentSource, FragmentId};
    use crate::geometry::{BoundingBox, PageExtent, Point};

    struct Fragment {
        text: &'static str,
        rect: Option<BoundingBox>,
        visible: bool,
    }

    struct FixtureSource {
        fragments: Vec<Fragment>,
        scroll: (f32, f32),
    }

    impl ContentSource for FixtureSource {
        fn fragments(&self) -> Vec<FragmentId> {
            (0..self.fragments.len()).collect()
        }

        fn fragment_text(&self, id: FragmentId) -> &str {
            self.fragments[id].text
        }

        fn is_visible(&self, id: FragmentId) -> bool {
            self.fragments[id].visible
        }

        fn client_rects(&self, id: FragmentId) -> anyhow::Result<Vec<BoundingBox>> {
            self.fragments[id]
                .rect
                .map(|rect| vec![rect])
                .ok_or_else(|| anyhow!("fragment {id} is detached"))
        }

        fn scroll_offset(&self) -> (f32, f32) {
            self.scroll
        }

        fn extent(&self) -> PageExtent {
            PageExtent::new(1000.0, 1000.0)
        }
    }

    fn unit_square_100() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(0.0, 100.0),
        ]
    }

    #[test]
    fn hits_only_fragments_with_center_inside() {
        let source = FixtureSource {
            fragments: vec![
                Fragment {
                    text: "Hello",
                    rect: Some(BoundingBox::new(10.0, 10.0, 50.0, 30.0)),
                    visible: true,
                },
                Fragment {
                    text: "World",
                    rect: Some(BoundingBox::new(200.0, 200.0, 250.0, 220.0)),
                    visible: true,
                },
            ],
            scroll: (0.0, 0.0),
        };

        let extraction = extract_from_polygon(&source, &unit_square_100());
        assert_eq!(extraction.text, "Hello");
        assert_eq!(extraction.parts, vec!["Hello".to_string()]);
    }

    #[test]
    fn scroll_offset_shifts_centers_into_page_space() {
        // Viewport rect near the origin, but the page is scrolled down by
        // 500: the page-space center lands outside the polygon.
        let source = FixtureSource {
            fragments: vec![Fragment {
                text: "Scrolled",
                rect: Some(BoundingBox::new(10.0, 10.0, 50.0, 30.0)),
                visible: true,
            }],
            scroll: (0.0, 500.0),
        };

        let extraction = extract_from_polygon(&source, &unit_square_100());
        assert!(extraction.is_empty());

        let tall_polygon = vec![
            Point::new(0.0, 480.0),
            Point::new(100.0, 480.0),
            Point::new(100.0, 600.0),
            Point::new(0.0, 600.0),
        ];
        let extraction = extract_from_polygon(&source, &tall_polygon);
        assert_eq!(extraction.text, "Scrolled");
    }

    #[test]
    fn skips_invisible_whitespace_and_detached_fragments() {
        let inside = BoundingBox::new(10.0, 10.0, 50.0, 30.0);
        let source = FixtureSource {
            fragments: vec![
                Fragment {
                    text: "hidden",
                    rect: Some(inside),
                    visible: false,
                },
                Fragment {
                    text: "   \u{a0}  ",
                    rect: Some(inside),
                    visible: true,
                },
                Fragment {
                    text: "detached",
                    rect: None,
                    visible: true,
                },
                Fragment {
                    text: "kept",
                    rect: Some(inside),
                    visible: true,
                },
            ],
            scroll: (0.0, 0.0),
        };

        let extraction = extract_from_polygon(&source, &unit_square_100());
        assert_eq!(extraction.text, "kept");
    }

    #[test]
    fn zero_size_rects_are_ignored() {
        let source = FixtureSource {
            fragments: vec![Fragment {
                text: "collapsed",
                rect: Some(BoundingBox::new(20.0, 20.0, 20.0, 40.0)),
                visible: true,
            }],
            scroll: (0.0, 0.0),
        };
        assert!(extract_from_polygon(&source, &unit_square_100()).is_empty());
    }

    #[test]
    fn normalization_collapses_runs_and_nbsp() {
        assert_eq!(
            normalize_whitespace("  one\u{a0}\u{a0}two\n\t three  "),
            "one two three"
        );
        assert_eq!(normalize_whitespace("   "), "");
    }
}
