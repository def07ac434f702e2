//! Per-section HTML and editor-block rendering.

use quick_xml::escape::escape;
use serde::{Deserialize, Serialize};

use crate::images::RenderedImage;
use crate::outline::{ContentItem, Section};
use crate::table::RenderedTable;

/// Rich-text editor node. The `type` tag is the node name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Block {
    Doc {
        content: Vec<Block>,
    },
    Heading {
        attrs: HeadingAttrs,
        #[serde(default)]
        content: Vec<Block>,
    },
    Paragraph {
        #[serde(default)]
        content: Vec<Block>,
    },
    Image {
        attrs: ImageAttrs,
    },
    Table {
        content: Vec<Block>,
    },
    TableRow {
        content: Vec<Block>,
    },
    TableCell {
        content: Vec<Block>,
    },
    Text {
        text: String,
    },
    Html {
        content: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingAttrs {
    pub level: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAttrs {
    pub src: String,
    pub alt: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Text nodes may not be empty, so empty text yields no children.
fn text_nodes(text: &str) -> Vec<Block> {
    if text.is_empty() {
        Vec::new()
    } else {
        vec![Block::Text {
            text: text.to_string(),
        }]
    }
}

impl Block {
    pub fn paragraph(text: &str) -> Self {
        Block::Paragraph {
            content: text_nodes(text),
        }
    }

    pub fn heading(text: &str, level: u32) -> Self {
        Block::Heading {
            attrs: HeadingAttrs { level },
            content: text_nodes(text),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenderedSection {
    pub html: String,
    pub json: Block,
}

/// Accumulates blocks and the matching HTML fragment for each.
#[derive(Debug, Default)]
pub struct RichTextRenderer {
    blocks: Vec<Block>,
    html: Vec<String>,
}

impl RichTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_heading(&mut self, text: &str, level: u32) {
        let level = level.clamp(1, 6);
        self.html
            .push(format!("<h{level}>{}</h{level}>", escape(text)));
        self.blocks.push(Block::heading(text, level));
    }

    /// Blank paragraphs are dropped.
    pub fn add_paragraph(&mut self, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        self.html.push(format!("<p>{}</p>", escape(text)));
        self.blocks.push(Block::paragraph(text));
    }

    pub fn add_image(&mut self, image: &RenderedImage) {
        let src = image.data_uri();
        let mut tag = format!(r#"<img src="{src}" alt="""#);
        if let Some(w) = image.width {
            tag.push_str(&format!(r#" width="{w}""#));
        }
        if let Some(h) = image.height {
            tag.push_str(&format!(r#" height="{h}""#));
        }
        tag.push_str(" />");
        self.html.push(tag);
        self.blocks.push(Block::Image {
            attrs: ImageAttrs {
                src,
                alt: String::new(),
                width: image.width,
                height: image.height,
            },
        });
    }

    pub fn add_table(&mut self, table: &RenderedTable) {
        self.html.push(table.html.clone());
        self.blocks.push(match &table.json_block {
            Some(block) => block.clone(),
            None => Block::Html {
                content: table.html.clone(),
            },
        });
    }

    pub fn render_html(&self) -> String {
        self.html.concat()
    }

    pub fn render_json(&self) -> Block {
        Block::Doc {
            content: self.blocks.clone(),
        }
    }
}

/// Heading line followed by the section body, in encounter order.
pub fn render_section(section: &Section) -> RenderedSection {
    let mut r = RichTextRenderer::new();
    r.add_heading(&section.heading_text(), section.level);
    for item in &section.ordered_content {
        match item {
            ContentItem::Text(t) | ContentItem::MarkedText(t) => r.add_paragraph(t),
            ContentItem::Table(t) => r.add_table(t),
            ContentItem::Image(img) => r.add_image(img),
        }
    }
    RenderedSection {
        html: r.render_html(),
        json: r.render_json(),
    }
}
