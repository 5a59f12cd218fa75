use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisResult;
use crate::annotation::{Annotation, AnnotationContent};
use crate::geometry::{self, bounding_box_of, PageExtent, Point, PolygonId};

/// A committed lasso shape, closed implicitly. Immutable after creation;
/// removal only happens in bulk through undo and clear.
#[derive(Clone, Debug)]
pub struct Polygon {
    pub id: PolygonId,
    pub points: Vec<Point>,
}

/// Owns everything the overlay has committed: the polygon set and the
/// annotation set, paired 1:1 by id, plus the mount guard and the capture
/// toggle. All mutation happens on the UI thread.
pub struct Overlay {
    mounted: bool,
    capture_enabled: bool,
    polygons: Vec<Polygon>,
    annotations: Vec<Annotation>,
}

impl Overlay {
    pub fn new(capture_enabled: bool) -> Self {
        Self {
            mounted: false,
            capture_enabled,
            polygons: Vec::new(),
            annotations: Vec::new(),
        }
    }

    /// Idempotent: mounting an already-mounted overlay is a no-op.
    /// Returns whether this call actually mounted.
    pub fn mount(&mut self) -> bool {
        if self.mounted {
            return false;
        }
        self.mounted = true;
        true
    }

    pub fn unmount(&mut self) {
        self.mounted = false;
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn capture_enabled(&self) -> bool {
        self.capture_enabled
    }

    pub fn set_capture_enabled(&mut self, enabled: bool) {
        self.capture_enabled = enabled;
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Freezes a finished stroke into a polygon and creates its pending
    /// annotation, anchored off the polygon's bounding box.
    pub fn commit(&mut self, points: Vec<Point>, extent: PageExtent) -> PolygonId {
        debug_assert!(points.len() >= 3);
        let id = geometry::next_polygon_id();
        let bounds = bounding_box_of(&points);
        self.polygons.push(Polygon { id, points });
        self.annotations.push(Annotation::pending(id, bounds, extent));
        id
    }

    /// Applies an analysis outcome to the annotation it was keyed for.
    /// Results may arrive in any order; a result for an annotation that
    /// has since been closed or undone is dropped.
    pub fn resolve(&mut self, id: PolygonId, outcome: Result<AnalysisResult, String>) {
        let Some(annotation) = self.annotations.iter_mut().find(|a| a.id == id) else {
            debug!("dropping late analysis result for polygon {id}");
            return;
        };
        annotation.content = match outcome {
            Ok(result) => AnnotationContent::Ready(result),
            Err(error) => AnnotationContent::Failed(error),
        };
    }

    /// Flips pending annotations older than `timeout` to a failed state
    /// so an unresponsive analyzer can never hang a bubble forever.
    /// Returns how many were flipped.
    pub fn fail_stale(&mut self, timeout: Duration) -> usize {
        let mut flipped = 0;
        for annotation in &mut self.annotations {
            if let AnnotationContent::Pending { since } = annotation.content {
                if since.elapsed() > timeout {
                    annotation.content =
                        AnnotationContent::Failed("analysis timed out".to_string());
                    flipped += 1;
                }
            }
        }
        flipped
    }

    /// Removes only the bubble; the polygon stays inked.
    pub fn close_annotation(&mut self, id: PolygonId) {
        self.annotations.retain(|annotation| annotation.id != id);
    }

    /// Removes the most recently committed polygon together with its
    /// annotation. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(polygon) = self.polygons.pop() else {
            return false;
        };
        self.annotations.retain(|annotation| annotation.id != polygon.id);
        true
    }

    pub fn clear(&mut self) {
        self.polygons.clear();
        self.annotations.clear();
    }

    /// Re-clamps every annotation against a new page extent.
    pub fn reclamp(&mut self, extent: PageExtent) {
        for annotation in &mut self.annotations {
            annotation.reclamp(extent);
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub capture_enabled: bool,
    pub show_hint: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            capture_enabled: true,
            show_hint: true,
        }
    }
}

impl UserSettings {
    fn file_path() -> Option<PathBuf> {
        let dirs = ProjectDirs::from("dev", "lassonote", "lassonote")?;
        let config_dir = dirs.config_dir();
        std::fs::create_dir_all(config_dir).ok()?;
        Some(config_dir.join("settings.json"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::file_path().context("cannot resolve settings path")?;
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::file_path().context("cannot resolve settings path")?;
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
