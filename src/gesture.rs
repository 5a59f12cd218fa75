use crate::geometry::Point;

/// Squared distance a pointer sample must travel from the last recorded
/// point before it is appended to the live stroke.
pub const MIN_SAMPLE_SPACING_SQ: f32 = 2.0;

/// Strokes with fewer points than this are discarded at release.
pub const MIN_COMMIT_POINTS: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GesturePhase {
    Idle,
    /// Activation modifier held, no drag yet.
    Armed,
    Drawing,
    /// Drag aborted by the cancel key; pointer moves are swallowed until
    /// the button comes back up so the stroke cannot resume.
    Cancelling,
}

#[derive(Clone, Copy, Debug)]
pub enum GestureEvent {
    ModifierDown,
    ModifierUp,
    /// Primary-button press at a page-space position. The caller filters
    /// out secondary buttons.
    PointerDown(Point),
    PointerMoved(Point),
    /// Pointer-up and pointer-cancel both map here.
    PointerReleased,
    Cancel,
}

#[derive(Clone, Debug, PartialEq)]
pub enum GestureOutcome {
    None,
    /// The live stroke gained a point; the live layer needs a redraw.
    StrokeChanged,
    /// The frozen stroke, ready to become a polygon.
    Committed(Vec<Point>),
    /// Release with too few points; nothing was stored.
    Discarded,
    Cancelled,
}

/// Turns raw pointer/keyboard events into lasso commit and cancel
/// decisions. Owns the live stroke exclusively while drawing; committing
/// moves the points out, so the committed polygon never aliases it.
pub struct GestureMachine {
    phase: GesturePhase,
    modifier_down: bool,
    stroke: Vec<Point>,
}

impl Default for GestureMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureMachine {
    pub fn new() -> Self {
        Self {
            phase: GesturePhase::Idle,
            modifier_down: false,
            stroke: Vec::new(),
        }
    }

    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    pub fn modifier_down(&self) -> bool {
        self.modifier_down
    }

    pub fn is_drawing(&self) -> bool {
        self.phase == GesturePhase::Drawing
    }

    pub fn stroke(&self) -> &[Point] {
        &self.stroke
    }

    pub fn handle(&mut self, event: GestureEvent) -> GestureOutcome {
        match event {
            GestureEvent::ModifierDown => {
                self.modifier_down = true;
                if self.phase == GesturePhase::Idle {
                    self.phase = GesturePhase::Armed;
                }
                GestureOutcome::None
            }
            GestureEvent::ModifierUp => {
                self.modifier_down = false;
                match self.phase {
                    GesturePhase::Armed => {
                        self.phase = GesturePhase::Idle;
                        GestureOutcome::None
                    }
                    // Releasing the hotkey mid-drag finalizes the stroke,
                    // exactly like releasing the button.
                    GesturePhase::Drawing => self.finish(),
                    _ => GestureOutcome::None,
                }
            }
            GestureEvent::PointerDown(point) => {
                if self.phase != GesturePhase::Armed {
                    return GestureOutcome::None;
                }
                self.phase = GesturePhase::Drawing;
                self.stroke.clear();
                self.stroke.push(point);
                GestureOutcome::StrokeChanged
            }
            GestureEvent::PointerMoved(point) => {
                if self.phase != GesturePhase::Drawing {
                    return GestureOutcome::None;
                }
                let Some(last) = self.stroke.last().copied() else {
                    return GestureOutcome::None;
                };
                if last.distance_sq(point) < MIN_SAMPLE_SPACING_SQ {
                    return GestureOutcome::None;
                }
                self.stroke.push(point);
                GestureOutcome::StrokeChanged
            }
            GestureEvent::PointerReleased => match self.phase {
                GesturePhase::Drawing => self.finish(),
                GesturePhase::Cancelling => {
                    self.phase = self.rest_phase();
                    GestureOutcome::None
                }
                _ => GestureOutcome::None,
            },
            GestureEvent::Cancel => {
                if self.phase != GesturePhase::Drawing {
                    return GestureOutcome::None;
                }
                self.stroke.clear();
                self.phase = GesturePhase::Cancelling;
                GestureOutcome::Cancelled
            }
        }
    }

    fn finish(&mut self) -> GestureOutcome {
        let stroke = std::mem::take(&mut self.stroke);
        self.phase = self.rest_phase();
        if stroke.len() >= MIN_COMMIT_POINTS {
            GestureOutcome::Committed(stroke)
        } else {
            GestureOutcome::Discarded
        }
    }

    fn rest_phase(&self) -> GesturePhase {
        if self.modifier_down {
            GesturePhase::Armed
        } else {
            GesturePhase::Idle
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{GestureEvent, GestureMachine, GestureOutcome, GesturePhase};
    use crate::geometry::Point;

    fn drawing_machine(points: &[(f32, f32)]) -> GestureMachine {
        let mut machine = GestureMachine::new();
        machine.handle(GestureEvent::ModifierDown);
        let mut iter = points.iter();
        let first = iter.next().expect("at least one point");
        machine.handle(GestureEvent::PointerDown(Point::new(first.0, first.1)));
        for &(x, y) in iter {
            machine.handle(GestureEvent::PointerMoved(Point::new(x, y)));
        }
        machine
    }

    #[test]
    fn well_separated_points_commit_exactly_once() {
        let mut machine = drawing_machine(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        let outcome = machine.handle(GestureEvent::PointerReleased);
        match outcome {
            GestureOutcome::Committed(points) => {
                assert_eq!(points.len(), 4);
                assert_eq!(points[0], Point::new(0.0, 0.0));
                assert_eq!(points[3], Point::new(0.0, 10.0));
            }
            other => panic!("expected commit, got {other:?}"),
        }
        assert!(machine.stroke().is_empty());
        // Modifier still held, so the machine stays armed for another lasso.
        assert_eq!(machine.phase(), GesturePhase::Armed);
    }

    #[test]
    fn close_samples_are_decimated() {
        let mut machine = drawing_machine(&[(0.0, 0.0)]);
        assert_eq!(
            machine.handle(GestureEvent::PointerMoved(Point::new(0.5, 0.5))),
            GestureOutcome::None
        );
        assert_eq!(
            machine.handle(GestureEvent::PointerMoved(Point::new(1.0, 1.0))),
            GestureOutcome::StrokeChanged
        );
        assert_eq!(machine.stroke().len(), 2);
    }

    #[test]
    fn short_stroke_is_discarded_silently() {
        let mut machine = drawing_machine(&[(0.0, 0.0), (5.0, 5.0)]);
        assert_eq!(
            machine.handle(GestureEvent::PointerReleased),
            GestureOutcome::Discarded
        );
        assert!(machine.stroke().is_empty());
    }

    #[test]
    fn modifier_release_commits_like_pointer_release() {
        let points = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (5.0, 15.0), (0.0, 10.0)];

        let mut by_pointer = drawing_machine(&points);
        let committed_by_pointer = match by_pointer.handle(GestureEvent::PointerReleased) {
            GestureOutcome::Committed(points) => points,
            other => panic!("expected commit, got {other:?}"),
        };

        let mut by_modifier = drawing_machine(&points);
        let committed_by_modifier = match by_modifier.handle(GestureEvent::ModifierUp) {
            GestureOutcome::Committed(points) => points,
            other => panic!("expected commit, got {other:?}"),
        };

        assert_eq!(committed_by_pointer, committed_by_modifier);
        assert_eq!(committed_by_pointer.len(), 5);
        assert_eq!(by_modifier.phase(), GesturePhase::Idle);
    }

    #[test]
    fn cancel_clears_stroke_and_swallows_moves_until_release() {
        let mut machine = drawing_machine(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);
        assert_eq!(machine.handle(GestureEvent::Cancel), GestureOutcome::Cancelled);
        assert!(machine.stroke().is_empty());
        assert_eq!(machine.phase(), GesturePhase::Cancelling);

        // The button is still down; moves must not restart the stroke.
        assert_eq!(
            machine.handle(GestureEvent::PointerMoved(Point::new(50.0, 50.0))),
            GestureOutcome::None
        );
        assert!(machine.stroke().is_empty());

        assert_eq!(
            machine.handle(GestureEvent::PointerReleased),
            GestureOutcome::None
        );
        assert_eq!(machine.phase(), GesturePhase::Armed);
    }

    #[test]
    fn pointer_down_without_modifier_is_ignored() {
        let mut machine = GestureMachine::new();
        assert_eq!(
            machine.handle(GestureEvent::PointerDown(Point::new(1.0, 1.0))),
            GestureOutcome::None
        );
        assert_eq!(machine.phase(), GesturePhase::Idle);
    }

    #[test]
    fn releasing_modifier_while_armed_disarms() {
        let mut machine = GestureMachine::new();
        machine.handle(GestureEvent::ModifierDown);
        assert_eq!(machine.phase(), GesturePhase::Armed);
        machine.handle(GestureEvent::ModifierUp);
        assert_eq!(machine.phase(), GesturePhase::Idle);
    }
}
