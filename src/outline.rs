//! Section reconstruction: one pass over the body, opening a section at every
//! heading and attaching the content that follows to it.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::classify::{self, heading_level, ListState, MAX_HEADING_LEVEL};
use crate::counter::{Counters, PathRegistry};
use crate::docx::body::{RawElement, RawParagraph};
use crate::docx::styles::StyleTable;
use crate::docx::LoadedDocx;
use crate::error::ParseError;
use crate::images::{ImageCatalog, RenderedImage};
use crate::numbering::NumberingDefinitions;
use crate::table::{render_table, RenderedTable};

static NUMBER_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\d.]+\s+(.+)$").expect("number prefix regex"));

/// Heading counters in heading-style mode all live under this list id.
const HEADING_LIST: i32 = 0;

/// How headings are recognised.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseMode {
    /// `heading k` paragraph styles, numbered by document-wide counters.
    #[default]
    #[serde(rename = "heading", alias = "heading_style")]
    HeadingStyle,
    /// Paragraphs carrying their own list numbering, numbered from the
    /// document's numbering definitions.
    #[serde(rename = "numbering", alias = "native_numbering")]
    NativeNumbering,
}

impl FromStr for ParseMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "heading" | "heading_style" | "headings" => Ok(Self::HeadingStyle),
            "numbering" | "native_numbering" | "native" => Ok(Self::NativeNumbering),
            other => Err(format!(
                "unknown parse mode {other:?} (expected \"heading\" or \"numbering\")"
            )),
        }
    }
}

impl fmt::Display for ParseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HeadingStyle => f.write_str("heading"),
            Self::NativeNumbering => f.write_str("numbering"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParserOptions {
    pub max_heading_level: u32,
    pub mode: ParseMode,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_heading_level: MAX_HEADING_LEVEL,
            mode: ParseMode::HeadingStyle,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ContentItem {
    Text(String),
    /// List item text with its indent and `<N> ` / `- ` marker.
    MarkedText(String),
    Table(RenderedTable),
    Image(RenderedImage),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// `h{level}`.
    pub heading_label: String,
    /// Unique within the document.
    pub number_path: String,
    pub level: u32,
    pub parent_ref: Option<String>,
    pub title: Option<String>,
    pub ordered_content: Vec<ContentItem>,
}

impl Section {
    /// `"{number_path} {title}"`, or just the path for untitled sections.
    pub fn heading_text(&self) -> String {
        match self.title.as_deref() {
            Some(t) if !t.is_empty() => format!("{} {}", self.number_path, t),
            _ => self.number_path.clone(),
        }
    }

    pub fn tables(&self) -> impl Iterator<Item = &RenderedTable> {
        self.ordered_content.iter().filter_map(|c| match c {
            ContentItem::Table(t) => Some(t),
            _ => None,
        })
    }

    pub fn images(&self) -> impl Iterator<Item = &RenderedImage> {
        self.ordered_content.iter().filter_map(|c| match c {
            ContentItem::Image(i) => Some(i),
            _ => None,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParsedDocument {
    pub original_filename: String,
    /// Lower-case hex SHA-256 of the package bytes.
    pub hash: String,
    pub byte_size: u64,
    pub sections: Vec<Section>,
}

/// Per-parse state machine. No section is open until the first heading.
pub struct OutlineBuilder<'a> {
    mode: ParseMode,
    max_heading_level: u32,
    styles: &'a StyleTable,
    numbering: Option<NumberingDefinitions>,
    images: ImageCatalog<'a>,
    heading_counters: Counters,
    registry: PathRegistry,
    /// Number path of the most recent section per level.
    recent: BTreeMap<u32, String>,
    list_state: ListState,
    current: Option<Section>,
    sections: Vec<Section>,
    discarded: usize,
}

impl<'a> OutlineBuilder<'a> {
    pub fn new(doc: &'a LoadedDocx, options: &ParserOptions) -> Self {
        Self {
            mode: options.mode,
            max_heading_level: options.max_heading_level.clamp(1, MAX_HEADING_LEVEL),
            styles: &doc.styles,
            numbering: doc.numbering.as_ref().map(NumberingDefinitions::parse),
            images: ImageCatalog::new(&doc.package, &doc.relationships, &doc.content_types),
            heading_counters: Counters::new(),
            registry: PathRegistry::new(),
            recent: BTreeMap::new(),
            list_state: ListState::new(),
            current: None,
            sections: Vec::new(),
            discarded: 0,
        }
    }

    pub fn feed(&mut self, element: &RawElement) {
        match element {
            RawElement::Paragraph(p) => self.paragraph(p),
            RawElement::Table(t) => {
                let Some(rendered) = render_table(t) else {
                    return;
                };
                match self.current.as_mut() {
                    Some(section) => section.ordered_content.push(ContentItem::Table(rendered)),
                    None => {
                        debug!("dropping table before first heading");
                        self.discarded += 1;
                    }
                }
            }
            RawElement::Other(_) => {}
        }
    }

    fn paragraph(&mut self, para: &RawParagraph) {
        let text = para.text.trim();
        let blank = text.is_empty() && !para.has_drawing;
        // Empty numbered paragraphs still take a number in numbering mode.
        if blank && self.mode == ParseMode::HeadingStyle {
            return;
        }

        if let Some((path, level, title)) = self.heading(para, text) {
            self.open_section(path, level, title);
            self.attach_images(para);
            return;
        }
        if blank {
            return;
        }

        let Some(section) = self.current.as_mut() else {
            debug!("dropping paragraph before first heading: {text:?}");
            self.discarded += 1;
            self.attach_images(para);
            return;
        };
        if !text.is_empty() {
            let item = match classify::list_ref(para, self.styles) {
                Some(list) => ContentItem::MarkedText(self.list_state.mark(
                    list,
                    self.numbering.as_ref(),
                    text,
                )),
                None => {
                    self.list_state.reset();
                    ContentItem::Text(text.to_string())
                }
            };
            section.ordered_content.push(item);
        }
        self.attach_images(para);
    }

    /// Claims the paragraph's images even when no section is open to hold them.
    fn attach_images(&mut self, para: &RawParagraph) {
        let images = self.images.take_for(para);
        let Some(section) = self.current.as_mut() else {
            if !images.is_empty() {
                debug!("dropping {} images before first heading", images.len());
            }
            return;
        };
        section
            .ordered_content
            .extend(images.into_iter().map(ContentItem::Image));
    }

    /// `(unique number path, level, title)` when the paragraph opens a section.
    fn heading(&mut self, para: &RawParagraph, text: &str) -> Option<(String, u32, Option<String>)> {
        let title = (!text.is_empty()).then(|| text.to_string());
        match self.mode {
            ParseMode::HeadingStyle => {
                let style = para.style_id.as_deref()?;
                let level = heading_level(self.styles.display_name(style), self.max_heading_level)?;
                self.heading_counters.advance(HEADING_LIST, level, 1);
                let path = self.heading_counters.padded_path(HEADING_LIST, 1, level);
                Some((self.registry.claim(&path), level, title))
            }
            ParseMode::NativeNumbering => {
                let list = classify::explicit_list_ref(para)?;
                let template = self
                    .numbering
                    .as_ref()
                    .and_then(|n| n.resolve(list.list_id, list.level));
                let start = template.as_ref().map(|t| t.start).unwrap_or(1);
                self.heading_counters.advance(list.list_id, list.level, start);
                let mut path = self.heading_counters.render_path(
                    list.list_id,
                    list.level,
                    template.as_ref().map(|t| t.display_template.as_str()),
                );
                if path.is_empty() {
                    path = self.heading_counters.render_path(list.list_id, list.level, None);
                }
                let path = self.registry.claim(&path);
                let level = path.matches('.').count() as u32 + 1;
                let title = NUMBER_PREFIX_RE
                    .captures(text)
                    .map(|c| c[1].trim().to_string())
                    .or(title);
                Some((path, level, title))
            }
        }
    }

    fn open_section(&mut self, number_path: String, level: u32, title: Option<String>) {
        self.finalize();
        let parent_ref = if level > 1 {
            self.recent.get(&(level - 1)).cloned()
        } else {
            None
        };
        self.recent.retain(|l, _| *l <= level);
        self.recent.insert(level, number_path.clone());
        self.list_state.reset();
        debug!("section {number_path} (level {level}, parent {parent_ref:?})");
        self.current = Some(Section {
            heading_label: format!("h{level}"),
            number_path,
            level,
            parent_ref,
            title,
            ordered_content: Vec::new(),
        });
    }

    fn finalize(&mut self) {
        if let Some(section) = self.current.take() {
            self.sections.push(section);
        }
    }

    /// Closes the open section and returns every section in body order.
    pub fn finish(mut self) -> Vec<Section> {
        self.finalize();
        if self.discarded > 0 {
            debug!("{} elements preceded the first heading", self.discarded);
        }
        self.sections
    }
}

/// Parse a `.docx` package into its numbered sections.
pub fn parse_document(
    bytes: &[u8],
    filename: &str,
    options: &ParserOptions,
) -> Result<ParsedDocument, ParseError> {
    let hash = hex::encode(Sha256::digest(bytes));
    let doc = LoadedDocx::from_bytes(bytes)?;

    let mut builder = OutlineBuilder::new(&doc, options);
    for element in &doc.body {
        builder.feed(element);
    }
    let sections = builder.finish();
    info!(
        "{filename}: {} sections from {} body elements ({} mode)",
        sections.len(),
        doc.body.len(),
        options.mode
    );

    Ok(ParsedDocument {
        original_filename: filename.to_string(),
        hash,
        byte_size: bytes.len() as u64,
        sections,
    })
}
