//! Embedded pictures: decoded once per parse, attached to at most one paragraph.

use std::collections::{HashMap, HashSet};

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use log::{debug, warn};
use once_cell::unsync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::docx::body::RawParagraph;
use crate::docx::content_types::ContentTypes;
use crate::docx::package::DocxPackage;
use crate::docx::rels::Relationship;

const EMU_PER_PIXEL: i64 = 9525;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedImage {
    pub filename: String,
    pub mime_type: String,
    pub base64_payload: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl RenderedImage {
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64_payload)
    }
}

fn emu_to_px(emu: i64) -> Option<u32> {
    if emu <= 0 {
        return None;
    }
    let rounded = emu.checked_add(EMU_PER_PIXEL / 2)? / EMU_PER_PIXEL;
    u32::try_from(rounded).ok()
}

struct DecodedImage {
    part_name: String,
    image: RenderedImage,
}

struct Lookup {
    images: Vec<DecodedImage>,
    by_rel_id: HashMap<String, usize>,
}

/// Image relationships of one document plus the set of parts already attached.
pub struct ImageCatalog<'a> {
    package: &'a DocxPackage,
    relationships: &'a [Relationship],
    content_types: &'a ContentTypes,
    lookup: OnceCell<Lookup>,
    attached: HashSet<String>,
}

impl<'a> ImageCatalog<'a> {
    pub fn new(
        package: &'a DocxPackage,
        relationships: &'a [Relationship],
        content_types: &'a ContentTypes,
    ) -> Self {
        Self {
            package,
            relationships,
            content_types,
            lookup: OnceCell::new(),
            attached: HashSet::new(),
        }
    }

    fn build_lookup(&self) -> Lookup {
        let mut images: Vec<DecodedImage> = Vec::new();
        let mut by_part: HashMap<&str, usize> = HashMap::new();
        let mut by_rel_id = HashMap::new();

        for rel in self.relationships.iter().filter(|r| r.is_image()) {
            if let Some(&idx) = by_part.get(rel.part_name.as_str()) {
                by_rel_id.insert(rel.id.clone(), idx);
                continue;
            }
            let Some(bytes) = self.package.part(&rel.part_name) else {
                warn!("image {} ({}) missing from package", rel.id, rel.part_name);
                continue;
            };
            let mime = match self.content_types.mime_for(&rel.part_name) {
                Some(m) if m.starts_with("image/") => m.to_string(),
                other => {
                    warn!(
                        "skipping {}: unsupported content type {:?}",
                        rel.part_name, other
                    );
                    continue;
                }
            };
            by_part.insert(rel.part_name.as_str(), images.len());
            by_rel_id.insert(rel.id.clone(), images.len());
            images.push(DecodedImage {
                part_name: rel.part_name.clone(),
                image: RenderedImage {
                    filename: rel.file_name().to_string(),
                    mime_type: mime,
                    base64_payload: B64.encode(bytes),
                    width: None,
                    height: None,
                },
            });
        }
        debug!("decoded {} embedded images", images.len());
        Lookup { images, by_rel_id }
    }

    /// Images referenced by the paragraph that no earlier paragraph took.
    pub fn take_for(&mut self, para: &RawParagraph) -> Vec<RenderedImage> {
        if !para.has_drawing && para.blips.is_empty() {
            return Vec::new();
        }
        let lookup = self.lookup.get_or_init(|| self.build_lookup());

        let mut out = Vec::new();
        for blip in &para.blips {
            let Some(&idx) = lookup.by_rel_id.get(&blip.rel_id) else {
                debug!("blip {} does not resolve to an image", blip.rel_id);
                continue;
            };
            let decoded = &lookup.images[idx];
            if !self.attached.insert(decoded.part_name.clone()) {
                continue;
            }
            let mut image = decoded.image.clone();
            if let Some((cx, cy)) = blip.extent {
                image.width = emu_to_px(cx);
                image.height = emu_to_px(cy);
            }
            out.push(image);
        }
        out
    }

    #[cfg(test)]
    fn is_loaded(&self) -> bool {
        self.lookup.get().is_some()
    }
}
