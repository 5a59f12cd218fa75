use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use anyhow::{bail, Result};
use log::debug;

use crate::extract::Extraction;
use crate::geometry::{BoundingBox, PolygonId};

/// A `Pending` annotation older than this is surfaced as failed rather
/// than left hanging.
pub const ANALYSIS_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Clone, Debug)]
pub struct AnalysisRequest {
    pub polygon_id: PolygonId,
    pub content: Extraction,
    pub bounds: BoundingBox,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnalysisResult {
    pub summary: String,
    pub analysis: String,
    pub suggestions: Vec<String>,
}

/// The injectable analysis seam: given extracted content, eventually
/// produce a result or fail with a reported error.
pub trait Analyzer: Send {
    fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult>;
}

#[derive(Debug)]
pub enum AnalysisEvent {
    Completed {
        polygon_id: PolygonId,
        result: AnalysisResult,
    },
    Failed {
        polygon_id: PolygonId,
        error: String,
    },
}

/// Runs the analyzer off the UI thread. Jobs go in over a channel,
/// events come back keyed by polygon id, so completions may resolve in
/// any order relative to commits. Dropping the worker closes the job
/// channel and ends the thread.
pub struct AnalysisWorker {
    jobs: Sender<AnalysisRequest>,
    events: Receiver<AnalysisEvent>,
    _worker: thread::JoinHandle<()>,
}

impl AnalysisWorker {
    pub fn spawn(analyzer: Box<dyn Analyzer>) -> Self {
        let (job_tx, job_rx) = mpsc::channel::<AnalysisRequest>();
        let (event_tx, event_rx) = mpsc::channel();

        let worker = thread::spawn(move || worker_loop(analyzer, job_rx, event_tx));

        Self {
            jobs: job_tx,
            events: event_rx,
            _worker: worker,
        }
    }

    pub fn submit(&self, request: AnalysisRequest) {
        let _ = self.jobs.send(request);
    }

    pub fn try_recv(&self) -> Option<AnalysisEvent> {
        self.events.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<AnalysisEvent> {
        self.events.recv_timeout(timeout).ok()
    }
}

fn worker_loop(
    analyzer: Box<dyn Analyzer>,
    jobs: Receiver<AnalysisRequest>,
    events: Sender<AnalysisEvent>,
) {
    while let Ok(request) = jobs.recv() {
        let polygon_id = request.polygon_id;
        debug!(
            "analyzing polygon {polygon_id}: {} fragments in a {:.0}x{:.0} region",
            request.content.parts.len(),
            request.bounds.width(),
            request.bounds.height(),
        );
        let event = match analyzer.analyze(&request) {
            Ok(result) => AnalysisEvent::Completed { polygon_id, result },
            Err(err) => AnalysisEvent::Failed {
                polygon_id,
                error: format!("{err:#}"),
            },
        };
        if events.send(event).is_err() {
            break;
        }
    }
}

/// Local stand-in for a remote analysis service: a processing delay, a
/// word-count summary with a truncated quote, key themes by word
/// frequency, and fixed suggestions.
pub struct SimulatedAnalyzer {
    pub delay: Duration,
}

impl Default for SimulatedAnalyzer {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(900),
        }
    }
}

impl Analyzer for SimulatedAnalyzer {
    fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult> {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }

        let content = request.content.text.trim();
        if content.is_empty() {
            bail!("selection contains no readable text");
        }

        let word_count = content.split_whitespace().count();
        let quote: String = content.chars().take(100).collect();
        let ellipsis = if content.chars().count() > 100 { "…" } else { "" };

        let register = if word_count > 50 { "substantial" } else { "brief" };
        let themes = key_themes(content, 3);

        Ok(AnalysisResult {
            summary: format!("Selected text contains {word_count} words: \"{quote}{ellipsis}\""),
            analysis: format!(
                "This appears to be {register} text content. Key themes include: {}",
                themes.join(", ")
            ),
            suggestions: vec![
                "Highlight important phrases for better understanding".to_string(),
                "Consider the context and source of this information".to_string(),
                "Look for actionable insights or key takeaways".to_string(),
            ],
        })
    }
}

/// Most frequent words longer than three characters, most common first.
fn key_themes(text: &str, limit: usize) -> Vec<String> {
    let mut frequencies: HashMap<String, usize> = HashMap::new();
    for word in text.split_whitespace() {
        let word: String = word
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        if word.chars().count() > 3 {
            *frequencies.entry(word).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(String, usize)> = frequencies.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.into_iter().take(limit).map(|(word, _)| word).collect()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{
        key_themes, AnalysisEvent, AnalysisRequest, AnalysisWorker, Analyzer, SimulatedAnalyzer,
    };
    use crate::extract::Extraction;
    use crate::geometry::BoundingBox;

    fn request(text: &str) -> AnalysisRequest {
        AnalysisRequest {
            polygon_id: 7,
            content: Extraction {
                text: text.to_string(),
                parts: vec![text.to_string()],
            },
            bounds: BoundingBox::new(0.0, 0.0, 10.0, 10.0),
        }
    }

    #[test]
    fn simulated_analyzer_summarizes_word_count() {
        let analyzer = SimulatedAnalyzer {
            delay: Duration::ZERO,
        };
        let result = analyzer.analyze(&request("one two three")).expect("result");
        assert!(result.summary.contains("3 words"));
        assert_eq!(result.suggestions.len(), 3);
    }

    #[test]
    fn simulated_analyzer_rejects_empty_selection() {
        let analyzer = SimulatedAnalyzer {
            delay: Duration::ZERO,
        };
        assert!(analyzer.analyze(&request("   ")).is_err());
    }

    #[test]
    fn key_themes_rank_by_frequency() {
        let themes = key_themes("ledger ledger ledger weather weather lamp lamp gull", 3);
        assert_eq!(themes[0], "ledger");
        // lamp and weather tie on count; ties rank alphabetically.
        assert_eq!(themes[1], "lamp");
        assert_eq!(themes[2], "weather");
    }

    #[test]
    fn key_themes_ignore_short_words() {
        assert!(key_themes("a an the of to it", 3).is_empty());
    }

    #[test]
    fn worker_resolves_jobs_keyed_by_polygon_id() {
        let worker = AnalysisWorker::spawn(Box::new(SimulatedAnalyzer {
            delay: Duration::ZERO,
        }));
        worker.submit(request("hello from the worker thread"));

        let event = worker
            .recv_timeout(Duration::from_secs(5))
            .expect("worker event");
        match event {
            AnalysisEvent::Completed { polygon_id, result } => {
                assert_eq!(polygon_id, 7);
                assert!(result.summary.contains("5 words"));
            }
            AnalysisEvent::Failed { error, .. } => panic!("unexpected failure: {error}"),
        }
    }

    #[test]
    fn worker_reports_analyzer_errors() {
        let worker = AnalysisWorker::spawn(Box::new(SimulatedAnalyzer {
            delay: Duration::ZERO,
        }));
        worker.submit(request(""));

        match worker.recv_timeout(Duration::from_secs(5)) {
            Some(AnalysisEvent::Failed { polygon_id, error }) => {
                assert_eq!(polygon_id, 7);
                assert!(error.contains("no readable text"));
            }
            other => panic!("expected failure event, got {other:?}"),
        }
    }
}
