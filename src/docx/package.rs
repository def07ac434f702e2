use std::collections::HashMap;
use std::io::{Cursor, Read};

use zip::ZipArchive;

use crate::error::ParseError;

pub const DOCUMENT_PART: &str = "word/document.xml";
pub const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";
pub const NUMBERING_PART: &str = "word/numbering.xml";
pub const STYLES_PART: &str = "word/styles.xml";
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// Upper bound on the buffer reserved from a zip entry's declared size.
const MAX_PREALLOC: usize = 16 * 1024 * 1024;

fn prealloc_hint(declared: u64) -> usize {
    usize::try_from(declared).unwrap_or(usize::MAX).min(MAX_PREALLOC)
}

/// A `.docx` archive held in memory, parts keyed by their zip entry name.
pub struct DocxPackage {
    pub entries: Vec<DocxEntry>,
    by_name: HashMap<String, usize>,
}

pub struct DocxEntry {
    pub name: String,
    pub data: Vec<u8>,
}

impl DocxPackage {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ParseError> {
        let mut zip = ZipArchive::new(Cursor::new(bytes))?;
        let mut entries = Vec::with_capacity(zip.len());
        let mut by_name = HashMap::new();
        for i in 0..zip.len() {
            let mut file = zip.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let mut data = Vec::with_capacity(prealloc_hint(file.size()));
            file.read_to_end(&mut data)?;
            let name = file.name().trim_start_matches('/').to_string();
            by_name.insert(name.clone(), entries.len());
            entries.push(DocxEntry { name, data });
        }
        if !by_name.contains_key(DOCUMENT_PART) {
            return Err(ParseError::MissingPart(DOCUMENT_PART.to_string()));
        }
        Ok(Self { entries, by_name })
    }

    /// Part bytes by name; a leading `/` is ignored.
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        let name = name.trim_start_matches('/');
        self.by_name
            .get(name)
            .map(|&i| self.entries[i].data.as_slice())
    }
}
