pub mod body;
pub mod content_types;
pub mod package;
pub mod rels;
pub mod styles;
pub mod xml;

#[cfg(test)]
pub(crate) mod fixture;

use log::warn;

use crate::error::ParseError;
use body::{read_body, RawElement};
use content_types::ContentTypes;
use package::{
    DocxPackage, CONTENT_TYPES_PART, DOCUMENT_PART, DOCUMENT_RELS_PART, NUMBERING_PART,
    STYLES_PART,
};
use rels::{parse_relationships, Relationship};
use styles::StyleTable;
use xml::{parse_xml_part, XmlPart};

/// Everything one parse reads from the package, decoded up front.
pub struct LoadedDocx {
    pub package: DocxPackage,
    pub body: Vec<RawElement>,
    pub styles: StyleTable,
    pub relationships: Vec<Relationship>,
    pub content_types: ContentTypes,
    pub numbering: Option<XmlPart>,
}

impl LoadedDocx {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ParseError> {
        let package = DocxPackage::from_bytes(bytes)?;
        let doc_bytes = package
            .part(DOCUMENT_PART)
            .ok_or_else(|| ParseError::MissingPart(DOCUMENT_PART.to_string()))?;
        let doc = parse_xml_part(DOCUMENT_PART, doc_bytes).map_err(|e| ParseError::Xml {
            part: DOCUMENT_PART.to_string(),
            message: format!("{e:#}"),
        })?;
        let body = read_body(&doc);

        let styles = optional_part(&package, STYLES_PART)
            .map(|p| StyleTable::parse(&p))
            .unwrap_or_default();
        let relationships = optional_part(&package, DOCUMENT_RELS_PART)
            .map(|p| parse_relationships(&p, "word/"))
            .unwrap_or_default();
        let content_types = optional_part(&package, CONTENT_TYPES_PART)
            .map(|p| ContentTypes::parse(&p))
            .unwrap_or_default();
        let numbering = optional_part(&package, NUMBERING_PART);

        Ok(Self {
            package,
            body,
            styles,
            relationships,
            content_types,
            numbering,
        })
    }
}

/// Optional parts that fail to parse are treated as absent.
fn optional_part(package: &DocxPackage, name: &str) -> Option<XmlPart> {
    let bytes = package.part(name)?;
    match parse_xml_part(name, bytes) {
        Ok(part) => Some(part),
        Err(e) => {
            warn!("ignoring malformed {name}: {e:#}");
            None
        }
    }
}
