use std::collections::{HashMap, HashSet};

use super::body::NumRefAttr;
use super::xml::{find_attr, parse_i32_attr, val_attr, XmlEvent, XmlPart};

#[derive(Clone, Debug, Default)]
pub struct StyleDef {
    pub name: Option<String>,
    pub based_on: Option<String>,
    pub num_ref: Option<NumRefAttr>,
}

/// `word/styles.xml` reduced to what paragraph classification needs.
#[derive(Clone, Debug, Default)]
pub struct StyleTable {
    styles: HashMap<String, StyleDef>,
}

impl StyleTable {
    pub fn parse(part: &XmlPart) -> Self {
        let mut styles = HashMap::new();
        let mut stack: Vec<String> = Vec::new();
        let mut current: Option<(String, StyleDef)> = None;

        for ev in &part.events {
            match ev {
                XmlEvent::Start { name, attrs } | XmlEvent::Empty { name, attrs } => {
                    let parent = stack.last().map(|s| s.as_str()).unwrap_or("");
                    match name.as_str() {
                        "w:style" => {
                            if let Some(id) = find_attr(attrs, "w:styleId") {
                                current = Some((id.trim().to_string(), StyleDef::default()));
                            }
                        }
                        "w:name" if parent == "w:style" => {
                            if let Some((_, def)) = current.as_mut() {
                                def.name = val_attr(attrs);
                            }
                        }
                        "w:basedOn" if parent == "w:style" => {
                            if let Some((_, def)) = current.as_mut() {
                                def.based_on = val_attr(attrs);
                            }
                        }
                        "w:numId" | "w:ilvl" if parent == "w:numPr" => {
                            if let Some((_, def)) = current.as_mut() {
                                let r = def.num_ref.get_or_insert_with(NumRefAttr::default);
                                let v = parse_i32_attr(attrs, "w:val");
                                if name == "w:numId" {
                                    r.num_id = v;
                                } else {
                                    r.ilvl = v;
                                }
                            }
                        }
                        _ => {}
                    }
                    if matches!(ev, XmlEvent::Start { .. }) {
                        stack.push(name.clone());
                    } else if name == "w:style" {
                        if let Some((id, def)) = current.take() {
                            styles.insert(id, def);
                        }
                    }
                }
                XmlEvent::End { name } => {
                    if name == "w:style" {
                        if let Some((id, def)) = current.take() {
                            styles.insert(id, def);
                        }
                    }
                    let _ = stack.pop();
                }
                XmlEvent::Text { .. } => {}
            }
        }
        Self { styles }
    }

    /// Display name used for heading matching; falls back to the id itself.
    pub fn display_name<'a>(&'a self, style_id: &'a str) -> &'a str {
        self.styles
            .get(style_id)
            .and_then(|s| s.name.as_deref())
            .unwrap_or(style_id)
    }

    /// Numbering reference declared by the style or the nearest `basedOn` ancestor.
    pub fn numbering_ref(&self, style_id: &str) -> Option<NumRefAttr> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut cur = style_id;
        while seen.insert(cur) {
            let def = self.styles.get(cur)?;
            if let Some(r) = def.num_ref {
                return Some(r);
            }
            cur = def.based_on.as_deref()?;
        }
        None
    }
}
