use std::collections::HashMap;

use super::xml::{find_attr, XmlEvent, XmlPart};

/// `[Content_Types].xml`: per-part overrides first, then per-extension defaults.
#[derive(Debug, Default, Clone)]
pub struct ContentTypes {
    defaults: HashMap<String, String>,
    overrides: HashMap<String, String>,
}

impl ContentTypes {
    pub fn parse(part: &XmlPart) -> Self {
        let mut out = Self::default();
        for ev in &part.events {
            if let XmlEvent::Empty { name, attrs } | XmlEvent::Start { name, attrs } = ev {
                let Some(content_type) = find_attr(attrs, "ContentType") else {
                    continue;
                };
                match name.as_str() {
                    "Default" => {
                        if let Some(ext) = find_attr(attrs, "Extension") {
                            out.defaults
                                .insert(ext.to_ascii_lowercase(), content_type.to_string());
                        }
                    }
                    "Override" => {
                        if let Some(part_name) = find_attr(attrs, "PartName") {
                            out.overrides.insert(
                                part_name.trim_start_matches('/').to_string(),
                                content_type.to_string(),
                            );
                        }
                    }
                    _ => {}
                }
            }
        }
        out
    }

    pub fn mime_for(&self, part_name: &str) -> Option<&str> {
        let part_name = part_name.trim_start_matches('/');
        if let Some(ct) = self.overrides.get(part_name) {
            return Some(ct.as_str());
        }
        let ext = part_name.rsplit_once('.')?.1.to_ascii_lowercase();
        self.defaults.get(&ext).map(String::as_str)
    }
}
