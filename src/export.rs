use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context;
use log::info;
use serde::{Deserialize, Serialize};

use crate::images::RenderedImage;
use crate::outline::{parse_document, ParseMode, ParsedDocument, ParserOptions, Section};
use crate::render::{render_section, Block};
use crate::tree::{build_section_tree, SectionNode};

/// Which rendered forms of each section end up in the export.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentFormat {
    Html,
    Json,
    #[default]
    Both,
}

impl ContentFormat {
    fn html(self) -> bool {
        matches!(self, Self::Html | Self::Both)
    }

    fn json(self) -> bool {
        matches!(self, Self::Json | Self::Both)
    }
}

impl FromStr for ContentFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "json" => Ok(Self::Json),
            "both" => Ok(Self::Both),
            other => Err(format!(
                "unknown content format {other:?} (expected html, json or both)"
            )),
        }
    }
}

impl fmt::Display for ContentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Html => "html",
            Self::Json => "json",
            Self::Both => "both",
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExportOptions {
    pub content_format: ContentFormat,
    pub include_tree: bool,
    pub pretty: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct TableExport {
    pub index: usize,
    pub row_count: usize,
    pub col_count: usize,
    pub html: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct ImageExport {
    pub index: usize,
    #[serde(flatten)]
    pub image: RenderedImage,
}

#[derive(Clone, Debug, Serialize)]
pub struct SectionExport {
    pub heading_label: String,
    pub number_path: String,
    pub level: u32,
    pub parent_ref: Option<String>,
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_json: Option<Block>,
    pub tables: Vec<TableExport>,
    pub images: Vec<ImageExport>,
}

#[derive(Clone, Debug, Serialize)]
pub struct DocumentExport {
    pub filename: String,
    pub hash: String,
    pub byte_size: u64,
    pub mode: ParseMode,
    pub section_count: usize,
    pub sections: Vec<SectionExport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tree: Option<Vec<SectionNode>>,
}

fn export_section(section: &Section, format: ContentFormat) -> SectionExport {
    let rendered = render_section(section);
    SectionExport {
        heading_label: section.heading_label.clone(),
        number_path: section.number_path.clone(),
        level: section.level,
        parent_ref: section.parent_ref.clone(),
        title: section.title.clone(),
        content_html: format.html().then(|| rendered.html.clone()),
        content_json: format.json().then_some(rendered.json),
        tables: section
            .tables()
            .enumerate()
            .map(|(index, t)| TableExport {
                index,
                row_count: t.row_count,
                col_count: t.col_count,
                html: t.html.clone(),
            })
            .collect(),
        images: section
            .images()
            .enumerate()
            .map(|(index, image)| ImageExport {
                index,
                image: image.clone(),
            })
            .collect(),
    }
}

pub fn build_export(doc: &ParsedDocument, mode: ParseMode, options: &ExportOptions) -> DocumentExport {
    DocumentExport {
        filename: doc.original_filename.clone(),
        hash: doc.hash.clone(),
        byte_size: doc.byte_size,
        mode,
        section_count: doc.sections.len(),
        sections: doc
            .sections
            .iter()
            .map(|s| export_section(s, options.content_format))
            .collect(),
        tree: options
            .include_tree
            .then(|| build_section_tree(&doc.sections)),
    }
}

pub fn default_output_for(input_docx: &Path) -> PathBuf {
    let stem = input_docx
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("docx");
    let dir = input_docx.parent().unwrap_or_else(|| Path::new("."));
    dir.join(format!("{stem}.outline.json"))
}

pub fn write_export(export: &DocumentExport, output_json: &Path, pretty: bool) -> anyhow::Result<()> {
    let bytes = if pretty {
        serde_json::to_vec_pretty(export)
    } else {
        serde_json::to_vec(export)
    }
    .context("serialize outline json")?;
    fs::write(output_json, bytes)
        .with_context(|| format!("write outline json: {}", output_json.display()))?;
    Ok(())
}

/// Read `input_docx`, parse it and write the export to `output_json`.
pub fn extract_outline_json(
    input_docx: &Path,
    output_json: &Path,
    parser: &ParserOptions,
    options: &ExportOptions,
) -> anyhow::Result<DocumentExport> {
    let bytes = fs::read(input_docx)
        .with_context(|| format!("read docx: {}", input_docx.display()))?;
    let filename = input_docx
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("document.docx");
    let doc = parse_document(&bytes, filename, parser)
        .with_context(|| format!("parse docx: {}", input_docx.display()))?;
    let export = build_export(&doc, parser.mode, options);
    write_export(&export, output_json, options.pretty)?;
    info!(
        "wrote {} sections to {}",
        export.section_count,
        output_json.display()
    );
    Ok(export)
}
