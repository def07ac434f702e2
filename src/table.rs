//! Body tables as HTML and editor blocks.

use once_cell::sync::Lazy;
use quick_xml::escape::{escape, unescape};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::docx::body::RawTable;
use crate::render::Block;

static ROW_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<tr\b[^>]*>(.*?)</tr>").expect("row regex"));
static CELL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<t[hd]\b[^>]*>(.*?)</t[hd]>").expect("cell regex"));

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenderedTable {
    pub row_count: usize,
    pub col_count: usize,
    pub html: String,
    /// Editor block; consumers fall back to `html` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_block: Option<Block>,
}

/// `<table>` with the first row as header cells.
pub fn table_to_html(rows: &[Vec<String>]) -> String {
    if rows.is_empty() {
        return String::new();
    }
    let mut html = String::from("<table>");
    for (i, row) in rows.iter().enumerate() {
        let tag = if i == 0 { "th" } else { "td" };
        html.push_str("<tr>");
        for cell in row {
            html.push_str(&format!("<{tag}>{}</{tag}>", escape(cell.as_str())));
        }
        html.push_str("</tr>");
    }
    html.push_str("</table>");
    html
}

pub fn table_to_json(rows: &[Vec<String>]) -> Option<Block> {
    if rows.is_empty() {
        return None;
    }
    let content = rows
        .iter()
        .map(|row| Block::TableRow {
            content: row
                .iter()
                .map(|cell| Block::TableCell {
                    content: vec![Block::paragraph(cell)],
                })
                .collect(),
        })
        .collect();
    Some(Block::Table { content })
}

/// Reads the cell texts of an HTML table back into a grid.
pub fn grid_from_html(html: &str) -> Vec<Vec<String>> {
    ROW_RE
        .captures_iter(html)
        .map(|row| {
            CELL_RE
                .captures_iter(&row[1])
                .map(|cell| {
                    let raw = &cell[1];
                    unescape(raw)
                        .map(|c| c.into_owned())
                        .unwrap_or_else(|_| raw.to_string())
                })
                .collect()
        })
        .collect()
}

/// `None` when the table has no cells at all.
pub fn render_table(raw: &RawTable) -> Option<RenderedTable> {
    if raw.rows.iter().all(|r| r.is_empty()) {
        return None;
    }
    Some(RenderedTable {
        row_count: raw.rows.len(),
        col_count: raw.rows[0].len(),
        html: table_to_html(&raw.rows),
        json_block: table_to_json(&raw.rows),
    })
}
