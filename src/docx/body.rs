use super::xml::{find_attr, parse_i32_attr, val_attr, XmlEvent, XmlPart};

/// Raw `w:numPr` values as written; validation happens during classification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NumRefAttr {
    pub num_id: Option<i32>,
    pub ilvl: Option<i32>,
}

/// An `a:blip` reference plus the size of the drawing that holds it, in EMU.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlipRef {
    pub rel_id: String,
    pub extent: Option<(i64, i64)>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawParagraph {
    pub style_id: Option<String>,
    pub text: String,
    pub num_ref: Option<NumRefAttr>,
    pub has_drawing: bool,
    pub blips: Vec<BlipRef>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawTable {
    pub rows: Vec<Vec<String>>,
}

/// One direct child of `w:body`.
#[derive(Clone, Debug, PartialEq)]
pub enum RawElement {
    Paragraph(RawParagraph),
    Table(RawTable),
    Other(String),
}

/// Containers whose text does not belong to the enclosing paragraph.
fn hides_text(name: &str) -> bool {
    matches!(
        name,
        "w:drawing" | "w:pict" | "w:object" | "w:txbxContent" | "mc:Fallback" | "w:del"
    )
}

fn control_append(buf: &mut String, name: &str, attrs: &[(String, String)]) {
    match name {
        "w:tab" | "w:ptab" => buf.push('\t'),
        "w:cr" => buf.push('\n'),
        "w:br" => {
            let br_type = find_attr(attrs, "w:type");
            if br_type.unwrap_or("textWrapping") == "textWrapping" {
                buf.push('\n');
            }
        }
        "w:noBreakHyphen" => buf.push('-'),
        _ => {}
    }
}

struct ParaCapture {
    p_len: usize,
    raw: RawParagraph,
    extent: Option<(i64, i64)>,
}

struct CellCapture {
    span: usize,
    /// `w:vMerge` continuation: the text comes from the cell above.
    merged_above: bool,
    paras: Vec<String>,
}

struct TableCapture {
    tbl_len: usize,
    rows: Vec<Vec<String>>,
    row: Option<Vec<String>>,
    cell: Option<CellCapture>,
    cell_para: Option<String>,
}

impl TableCapture {
    fn new(tbl_len: usize) -> Self {
        Self {
            tbl_len,
            rows: Vec::new(),
            row: None,
            cell: None,
            cell_para: None,
        }
    }

    fn finish_cell(&mut self) {
        let Some(cell) = self.cell.take() else {
            return;
        };
        let Some(col) = self.row.as_ref().map(Vec::len) else {
            return;
        };
        let text = if cell.merged_above {
            self.rows
                .last()
                .and_then(|above| above.get(col))
                .cloned()
                .unwrap_or_default()
        } else {
            cell.paras.join("\n").trim().to_string()
        };
        if let Some(row) = self.row.as_mut() {
            for _ in 0..cell.span.max(1) {
                row.push(text.clone());
            }
        }
    }
}

/// Walk `word/document.xml` and return the body's block-level children in order.
pub fn read_body(part: &XmlPart) -> Vec<RawElement> {
    let mut out = Vec::new();
    let mut stack: Vec<String> = Vec::new();
    let mut body_len: Option<usize> = None;
    let mut para: Option<ParaCapture> = None;
    let mut table: Option<TableCapture> = None;
    let mut hidden_depth = 0usize;
    let mut in_t = false;

    for ev in &part.events {
        match ev {
            XmlEvent::Start { name, attrs } | XmlEvent::Empty { name, attrs } => {
                let is_empty = matches!(ev, XmlEvent::Empty { .. });
                let depth = stack.len();
                let parent = stack.last().map(|s| s.as_str()).unwrap_or("");

                if name == "w:body" && body_len.is_none() {
                    body_len = Some(depth + 1);
                } else if body_len == Some(depth) && para.is_none() && table.is_none() {
                    match name.as_str() {
                        "w:p" if is_empty => {
                            out.push(RawElement::Paragraph(RawParagraph::default()))
                        }
                        "w:p" => {
                            para = Some(ParaCapture {
                                p_len: depth + 1,
                                raw: RawParagraph::default(),
                                extent: None,
                            })
                        }
                        "w:tbl" if is_empty => out.push(RawElement::Table(RawTable::default())),
                        "w:tbl" => table = Some(TableCapture::new(depth + 1)),
                        other => out.push(RawElement::Other(other.to_string())),
                    }
                } else if let Some(p) = para.as_mut() {
                    match name.as_str() {
                        "w:pStyle" if parent == "w:pPr" && depth == p.p_len + 1 => {
                            p.raw.style_id = val_attr(attrs);
                        }
                        "w:numId" | "w:ilvl" if parent == "w:numPr" && depth == p.p_len + 2 => {
                            let r = p.raw.num_ref.get_or_insert_with(NumRefAttr::default);
                            let v = parse_i32_attr(attrs, "w:val");
                            if name == "w:numId" {
                                r.num_id = v;
                            } else {
                                r.ilvl = v;
                            }
                        }
                        "w:drawing" => {
                            p.raw.has_drawing = true;
                            p.extent = None;
                        }
                        "wp:extent" => {
                            let cx = find_attr(attrs, "cx").and_then(|v| v.trim().parse().ok());
                            let cy = find_attr(attrs, "cy").and_then(|v| v.trim().parse().ok());
                            p.extent = cx.zip(cy);
                        }
                        "a:blip" => {
                            if let Some(rid) = find_attr(attrs, "r:embed") {
                                let rid = rid.trim();
                                if !rid.is_empty() {
                                    p.raw.blips.push(BlipRef {
                                        rel_id: rid.to_string(),
                                        extent: p.extent,
                                    });
                                }
                            }
                        }
                        "w:t" if !is_empty && hidden_depth == 0 => in_t = true,
                        _ if parent == "w:r" && hidden_depth == 0 => {
                            control_append(&mut p.raw.text, name, attrs)
                        }
                        _ => {}
                    }
                } else if let Some(t) = table.as_mut() {
                    let base = t.tbl_len;
                    match name.as_str() {
                        "w:tr" if depth == base => {
                            t.row = Some(Vec::new());
                            if is_empty {
                                t.rows.extend(t.row.take());
                            }
                        }
                        "w:tc" if depth == base + 1 => {
                            t.cell = Some(CellCapture {
                                span: 1,
                                merged_above: false,
                                paras: Vec::new(),
                            });
                            if is_empty {
                                t.finish_cell();
                            }
                        }
                        "w:gridSpan" if parent == "w:tcPr" && depth == base + 3 => {
                            if let Some(cell) = t.cell.as_mut() {
                                cell.span = parse_i32_attr(attrs, "w:val")
                                    .filter(|n| *n > 0)
                                    .map(|n| n as usize)
                                    .unwrap_or(1);
                            }
                        }
                        "w:vMerge" if parent == "w:tcPr" && depth == base + 3 => {
                            if let Some(cell) = t.cell.as_mut() {
                                cell.merged_above =
                                    find_attr(attrs, "w:val").unwrap_or("continue") == "continue";
                            }
                        }
                        "w:p" if depth == base + 2 => {
                            if is_empty {
                                if let Some(cell) = t.cell.as_mut() {
                                    cell.paras.push(String::new());
                                }
                            } else {
                                t.cell_para = Some(String::new());
                            }
                        }
                        "w:t" if !is_empty && hidden_depth == 0 && t.cell_para.is_some() => {
                            in_t = true
                        }
                        _ if parent == "w:r" && hidden_depth == 0 => {
                            if let Some(buf) = t.cell_para.as_mut() {
                                control_append(buf, name, attrs);
                            }
                        }
                        _ => {}
                    }
                }

                if !is_empty {
                    if hides_text(name) {
                        hidden_depth += 1;
                    }
                    stack.push(name.clone());
                }
            }
            XmlEvent::Text { text } => {
                if !in_t || hidden_depth > 0 {
                    continue;
                }
                if let Some(p) = para.as_mut() {
                    p.raw.text.push_str(text);
                } else if let Some(buf) = table.as_mut().and_then(|t| t.cell_para.as_mut()) {
                    buf.push_str(text);
                }
            }
            XmlEvent::End { name } => {
                let depth = stack.len();
                if name == "w:t" {
                    in_t = false;
                }
                if hides_text(name) {
                    hidden_depth = hidden_depth.saturating_sub(1);
                }

                if para.as_ref().is_some_and(|p| name == "w:p" && depth == p.p_len) {
                    if let Some(p) = para.take() {
                        out.push(RawElement::Paragraph(p.raw));
                    }
                } else if let Some(t) = table.as_mut() {
                    let base = t.tbl_len;
                    if name == "w:p" && depth == base + 3 {
                        if let (Some(text), Some(cell)) = (t.cell_para.take(), t.cell.as_mut()) {
                            cell.paras.push(text);
                        }
                    } else if name == "w:tc" && depth == base + 2 {
                        t.finish_cell();
                    } else if name == "w:tr" && depth == base + 1 {
                        t.finish_cell();
                        if let Some(row) = t.row.take() {
                            t.rows.push(row);
                        }
                    } else if name == "w:tbl" && depth == base {
                        if let Some(t) = table.take() {
                            out.push(RawElement::Table(RawTable { rows: t.rows }));
                        }
                    }
                }
                let _ = stack.pop();
            }
        }
    }
    out
}
