//! In-memory `.docx` builder for tests.

use std::collections::BTreeMap;
use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const W_NS: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture""#;

pub struct DocxBuilder {
    body: String,
    document: Option<String>,
    rels: Vec<(String, String, String)>,
    media: Vec<(String, Vec<u8>)>,
    numbering: Option<String>,
    extra: BTreeMap<String, String>,
}

fn esc(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

impl DocxBuilder {
    pub fn new() -> Self {
        Self {
            body: String::new(),
            document: None,
            rels: Vec::new(),
            media: Vec::new(),
            numbering: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn paragraph(mut self, style: &str, text: &str) -> Self {
        self.body.push_str(&format!(
            r#"<w:p><w:pPr><w:pStyle w:val="{}"/></w:pPr><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
            esc(style),
            esc(text)
        ));
        self
    }

    pub fn heading(self, level: usize, text: &str) -> Self {
        self.paragraph(&format!("Heading{level}"), text)
    }

    pub fn numbered(mut self, num_id: i32, ilvl: i32, text: &str) -> Self {
        self.body.push_str(&format!(
            r#"<w:p><w:pPr><w:pStyle w:val="ListParagraph"/><w:numPr><w:ilvl w:val="{ilvl}"/><w:numId w:val="{num_id}"/></w:numPr></w:pPr><w:r><w:t>{}</w:t></w:r></w:p>"#,
            esc(text)
        ));
        self
    }

    /// Paragraph with `text` followed by one inline drawing per relationship id.
    pub fn picture_paragraph(mut self, text: &str, rel_ids: &[&str]) -> Self {
        let mut runs = String::new();
        if !text.is_empty() {
            runs.push_str(&format!("<w:r><w:t>{}</w:t></w:r>", esc(text)));
        }
        for rid in rel_ids {
            runs.push_str(&format!(
                r#"<w:r><w:drawing><wp:inline><wp:extent cx="1905000" cy="952500"/><a:graphic><a:graphicData><pic:pic><pic:blipFill><a:blip r:embed="{rid}"/></pic:blipFill></pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r>"#
            ));
        }
        self.body.push_str(&format!("<w:p>{runs}</w:p>"));
        self
    }

    pub fn table(mut self, rows: &[&[&str]]) -> Self {
        self.body.push_str("<w:tbl><w:tblPr/>");
        for row in rows {
            self.body.push_str("<w:tr>");
            for cell in row.iter() {
                self.body.push_str(&format!(
                    "<w:tc><w:p><w:r><w:t>{}</w:t></w:r></w:p></w:tc>",
                    esc(cell)
                ));
            }
            self.body.push_str("</w:tr>");
        }
        self.body.push_str("</w:tbl>");
        self
    }

    pub fn raw_body(mut self, xml: &str) -> Self {
        self.body.push_str(xml);
        self
    }

    pub fn raw_document(mut self, xml: &str) -> Self {
        self.document = Some(xml.to_string());
        self
    }

    /// Replace or add an arbitrary part.
    pub fn raw_part(mut self, name: &str, xml: &str) -> Self {
        self.extra.insert(name.to_string(), xml.to_string());
        self
    }

    pub fn image(mut self, rel_id: &str, file_name: &str, bytes: &[u8]) -> Self {
        self.rels.push((
            rel_id.to_string(),
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image"
                .to_string(),
            format!("media/{file_name}"),
        ));
        self.media
            .push((format!("word/media/{file_name}"), bytes.to_vec()));
        self
    }

    /// Extra relationship entry pointing at an existing target.
    pub fn relationship(mut self, rel_id: &str, rel_type: &str, target: &str) -> Self {
        self.rels
            .push((rel_id.to_string(), rel_type.to_string(), target.to_string()));
        self
    }

    /// `levels` are `(ilvl, numFmt, lvlText, start)` of one abstract definition
    /// bound to each list id in `num_ids`.
    pub fn numbering(mut self, abstract_id: i32, levels: &[(i32, &str, &str, i32)], num_ids: &[i32]) -> Self {
        let mut xml = self
            .numbering
            .take()
            .unwrap_or_default();
        xml.push_str(&format!(r#"<w:abstractNum w:abstractNumId="{abstract_id}">"#));
        for (ilvl, fmt, text, start) in levels {
            xml.push_str(&format!(
                r#"<w:lvl w:ilvl="{ilvl}"><w:start w:val="{start}"/><w:numFmt w:val="{fmt}"/><w:lvlText w:val="{}"/></w:lvl>"#,
                esc(text)
            ));
        }
        xml.push_str("</w:abstractNum>");
        for num_id in num_ids {
            xml.push_str(&format!(
                r#"<w:num w:numId="{num_id}"><w:abstractNumId w:val="{abstract_id}"/></w:num>"#
            ));
        }
        self.numbering = Some(xml);
        self
    }

    fn styles_xml() -> String {
        let mut styles = String::new();
        styles.push_str(r#"<w:style w:type="paragraph" w:styleId="Normal"><w:name w:val="Normal"/></w:style>"#);
        for level in 1..=9 {
            styles.push_str(&format!(
                r#"<w:style w:type="paragraph" w:styleId="Heading{level}"><w:name w:val="heading {level}"/><w:basedOn w:val="Normal"/></w:style>"#
            ));
        }
        styles.push_str(r#"<w:style w:type="paragraph" w:styleId="ListParagraph"><w:name w:val="List Paragraph"/><w:basedOn w:val="Normal"/></w:style>"#);
        styles.push_str(r#"<w:style w:type="paragraph" w:styleId="ListNumber"><w:name w:val="List Number"/><w:pPr><w:numPr><w:numId w:val="1"/></w:numPr></w:pPr></w:style>"#);
        format!("<w:styles {W_NS}>{styles}</w:styles>")
    }

    fn files(&self, with_document: bool) -> BTreeMap<String, Vec<u8>> {
        let mut files: BTreeMap<String, Vec<u8>> = BTreeMap::new();
        files.insert(
            "[Content_Types].xml".to_string(),
            br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/><Default Extension="jpeg" ContentType="image/jpeg"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#.to_vec(),
        );
        files.insert(
            "_rels/.rels".to_string(),
            br#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#.to_vec(),
        );
        if with_document {
            let doc = self.document.clone().unwrap_or_else(|| {
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document {W_NS}><w:body>{}<w:sectPr/></w:body></w:document>"#,
                    self.body
                )
            });
            files.insert("word/document.xml".to_string(), doc.into_bytes());
        }
        files.insert("word/styles.xml".to_string(), Self::styles_xml().into_bytes());

        let mut rels = String::from(
            r#"<Relationship Id="rIdStyles" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
        );
        for (id, typ, target) in &self.rels {
            rels.push_str(&format!(
                r#"<Relationship Id="{id}" Type="{typ}" Target="{target}"/>"#
            ));
        }
        files.insert(
            "word/_rels/document.xml.rels".to_string(),
            format!(r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{rels}</Relationships>"#).into_bytes(),
        );
        if let Some(n) = &self.numbering {
            files.insert(
                "word/numbering.xml".to_string(),
                format!("<w:numbering {W_NS}>{n}</w:numbering>").into_bytes(),
            );
        }
        for (name, bytes) in &self.media {
            files.insert(name.clone(), bytes.clone());
        }
        for (name, xml) in &self.extra {
            files.insert(name.clone(), xml.clone().into_bytes());
        }
        files
    }

    fn zip(files: BTreeMap<String, Vec<u8>>) -> Vec<u8> {
        let mut zout = ZipWriter::new(Cursor::new(Vec::new()));
        let opts = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        for (name, data) in files {
            zout.start_file(name, opts).expect("start zip file");
            zout.write_all(&data).expect("write zip file");
        }
        zout.finish().expect("finish zip").into_inner()
    }

    pub fn build(&self) -> Vec<u8> {
        Self::zip(self.files(true))
    }

    pub fn build_without_document(&self) -> Vec<u8> {
        Self::zip(self.files(false))
    }
}
