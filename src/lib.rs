//! Rebuilds the numbered section outline of a `.docx` document and renders
//! each section's content as HTML and as editor JSON blocks.

pub mod classify;
pub mod config;
pub mod counter;
pub mod docx;
pub mod error;
pub mod export;
pub mod images;
pub mod numbering;
pub mod outline;
pub mod render;
pub mod table;
pub mod tree;

pub use error::ParseError;
pub use outline::{parse_document, ContentItem, ParseMode, ParsedDocument, ParserOptions, Section};
pub use render::{render_section, RenderedSection};
pub use tree::{build_section_tree, SectionNode};
