use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};

use crate::extract::{ContentSource, FragmentId};
use crate::geometry::{BoundingBox, PageExtent};

pub const PAGE_MARGIN: f32 = 48.0;
pub const CONTENT_WIDTH: f32 = 720.0;

const BODY_SIZE: f32 = 16.0;
const HEADING_SIZE: f32 = 24.0;
const LINE_SPACING: f32 = 1.45;
const BLOCK_GAP: f32 = 18.0;
// Estimated monospace glyph advance as a fraction of the font size.
const CHAR_ADVANCE: f32 = 0.6;

/// One laid-out line of the document, with its rendered rectangle in
/// page space.
#[derive(Clone, Debug)]
pub struct LineFragment {
    pub text: String,
    pub rect: BoundingBox,
    pub font_size: f32,
    pub heading: bool,
    pub visible: bool,
}

/// The rendered document the overlay sits on: a markdown-lite text file
/// laid out into line fragments. Stands in for the host page and is
/// read-only to the rest of the core.
pub struct PageModel {
    title: String,
    lines: Vec<LineFragment>,
    extent: PageExtent,
    scroll: (f32, f32),
}

impl PageModel {
    /// Lays out `text`: lines starting with `# ` become headings, blank
    /// lines separate paragraphs, and each paragraph is wrapped to the
    /// content width.
    pub fn from_text(title: impl Into<String>, text: &str) -> Self {
        let mut lines = Vec::new();
        let mut cursor_y = PAGE_MARGIN;

        for block in blocks_of(text) {
            let (font_size, content) = match &block {
                Block::Heading(content) => (HEADING_SIZE, content.as_str()),
                Block::Paragraph(content) => (BODY_SIZE, content.as_str()),
            };
            let heading = matches!(block, Block::Heading(_));

            let advance = font_size * CHAR_ADVANCE;
            let wrap_columns = ((CONTENT_WIDTH / advance) as usize).max(8);
            let line_height = font_size * LINE_SPACING;

            for wrapped in textwrap::wrap(content, wrap_columns) {
                let width = wrapped.chars().count() as f32 * advance;
                lines.push(LineFragment {
                    text: wrapped.into_owned(),
                    rect: BoundingBox::new(
                        PAGE_MARGIN,
                        cursor_y,
                        PAGE_MARGIN + width,
                        cursor_y + line_height,
                    ),
                    font_size,
                    heading,
                    visible: true,
                });
                cursor_y += line_height;
            }
            cursor_y += BLOCK_GAP;
        }

        let extent = PageExtent::new(
            CONTENT_WIDTH + PAGE_MARGIN * 2.0,
            (cursor_y + PAGE_MARGIN).max(PAGE_MARGIN * 2.0),
        );

        Self {
            title: title.into(),
            lines,
            extent,
            scroll: (0.0, 0.0),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("cannot read document {}", path.display()))?;
        let title = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("document")
            .to_string();
        Ok(Self::from_text(title, &text))
    }

    pub fn sample() -> Self {
        Self::from_text("sample", SAMPLE_DOCUMENT)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn lines(&self) -> &[LineFragment] {
        &self.lines
    }

    /// Records the current viewport scroll, in page units. Client rects
    /// are reported relative to this offset.
    pub fn set_scroll(&mut self, x: f32, y: f32) {
        self.scroll = (x, y);
    }
}

impl ContentSource for PageModel {
    fn fragments(&self) -> Vec<FragmentId> {
        (0..self.lines.len()).collect()
    }

    fn fragment_text(&self, id: FragmentId) -> &str {
        self.lines.get(id).map(|line| line.text.as_str()).unwrap_or("")
    }

    fn is_visible(&self, id: FragmentId) -> bool {
        self.lines.get(id).map(|line| line.visible).unwrap_or(false)
    }

    fn client_rects(&self, id: FragmentId) -> Result<Vec<BoundingBox>> {
        let line = self
            .lines
            .get(id)
            .ok_or_else(|| anyhow!("fragment {id} is detached"))?;
        Ok(vec![BoundingBox::new(
            line.rect.min_x - self.scroll.0,
            line.rect.min_y - self.scroll.1,
            line.rect.max_x - self.scroll.0,
            line.rect.max_y - self.scroll.1,
        )])
    }

    fn scroll_offset(&self) -> (f32, f32) {
        self.scroll
    }

    fn extent(&self) -> PageExtent {
        self.extent
    }
}

enum Block {
    Heading(String),
    Paragraph(String),
}

fn blocks_of(text: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            flush_paragraph(&mut blocks, &mut paragraph);
        } else if let Some(heading) = trimmed.strip_prefix("# ") {
            flush_paragraph(&mut blocks, &mut paragraph);
            blocks.push(Block::Heading(heading.trim().to_string()));
        } else {
            paragraph.push(trimmed);
        }
    }
    flush_paragraph(&mut blocks, &mut paragraph);
    blocks
}

fn flush_paragraph(blocks: &mut Vec<Block>, paragraph: &mut Vec<&str>) {
    if !paragraph.is_empty() {
        blocks.push(Block::Paragraph(paragraph.join(" ")));
        paragraph.clear();
    }
}

const SAMPLE_DOCUMENT: &str = "\
# The Lighthouse Keeper's Ledger

For forty-one years the lamp at Wren Point was trimmed by a single keeper, \
and for forty-one years the ledger on the chart table recorded nothing but \
weather, oil, and the occasional passing brig. The entries are terse to the \
point of rudeness, yet read in sequence they amount to a biography.

October storms feature heavily. The keeper notes wind out of the northeast, \
a cracked pane in the lantern room, and a gull that took up residence on the \
gallery rail and refused every eviction. By December the gull has a name, \
and by the following March it has an obituary, written in the same flat hand \
as the oil inventory.

# On Reading Old Ledgers

A ledger rewards slow reading. Skim it and you find stock counts; sit with \
it and you find a man measuring his life in wicks and weather glass \
readings. The same is true of most archives, which is why the hurried \
researcher so often leaves empty-handed.

Take notes in the margins of your transcription, never on the original. \
Cross-reference dates against the harbormaster's log, where one survives. \
And when two accounts disagree about a storm, trust the one written by the \
man who had to climb the tower that night.

The ledger ends mid-sentence in a January entry about re-glazing the lamp. \
The next hand is unfamiliar, careful, and a little too neat. It records the \
same weather, the same oil, and nothing at all about its predecessor.
";
