use super::xml::{find_attr, XmlEvent, XmlPart};

pub const IMAGE_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    /// Package part name the relationship points to, e.g. `word/media/image1.png`.
    pub part_name: String,
    pub external: bool,
}

impl Relationship {
    pub fn is_image(&self) -> bool {
        !self.external && (self.rel_type == IMAGE_REL_TYPE || self.part_name.contains("image"))
    }

    /// Last path segment of the target part.
    pub fn file_name(&self) -> &str {
        self.part_name.rsplit('/').next().unwrap_or(&self.part_name)
    }
}

/// Resolve a relationship target relative to `base` (the source part's folder,
/// with trailing slash).
pub fn normalize_target(base: &str, target: &str) -> String {
    let t = target.replace('\\', "/");
    if let Some(abs) = t.strip_prefix('/') {
        return abs.to_string();
    }
    let mut segments: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();
    for seg in t.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

/// Relationships in document order. Entries without an id or target are skipped.
pub fn parse_relationships(rels: &XmlPart, base: &str) -> Vec<Relationship> {
    let mut out = Vec::new();
    for ev in &rels.events {
        if let XmlEvent::Empty { name, attrs } | XmlEvent::Start { name, attrs } = ev {
            if name != "Relationship" {
                continue;
            }
            let id = find_attr(attrs, "Id").unwrap_or("").trim();
            let target = find_attr(attrs, "Target").unwrap_or("").trim();
            if id.is_empty() || target.is_empty() {
                continue;
            }
            let external = find_attr(attrs, "TargetMode")
                .map(|m| m.eq_ignore_ascii_case("External"))
                .unwrap_or(false);
            out.push(Relationship {
                id: id.to_string(),
                rel_type: find_attr(attrs, "Type").unwrap_or("").trim().to_string(),
                part_name: if external {
                    target.to_string()
                } else {
                    normalize_target(base, target)
                },
                external,
            });
        }
    }
    out
}
