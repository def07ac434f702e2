//! List numbering definitions from `word/numbering.xml`.
//!
//! Word stores numbering in two layers: abstract definitions carry one
//! template per indent level, and concrete list ids (`w:numId`) point at an
//! abstract definition, optionally overriding start values per level.

use std::collections::{BTreeMap, HashMap};

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::docx::xml::{find_attr, parse_i32_attr, XmlEvent, XmlPart};

pub static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%(\d+)").expect("placeholder regex"));

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberFormat {
    Decimal,
    Roman,
    UpperRoman,
    LowerRoman,
    UpperLetter,
    LowerLetter,
    /// Locale counting schemes such as `chineseCounting` or `japaneseCounting`.
    Locale(String),
    Bullet,
    None,
    Other(String),
}

impl NumberFormat {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "" | "decimal" => Self::Decimal,
            "roman" => Self::Roman,
            "upperRoman" => Self::UpperRoman,
            "lowerRoman" => Self::LowerRoman,
            "upperLetter" => Self::UpperLetter,
            "lowerLetter" => Self::LowerLetter,
            "bullet" => Self::Bullet,
            "none" => Self::None,
            s if is_locale_scheme(s) => Self::Locale(s.to_string()),
            s => Self::Other(s.to_string()),
        }
    }
}

fn is_locale_scheme(s: &str) -> bool {
    const PREFIXES: &[&str] = &[
        "chinese", "ideograph", "japanese", "korean", "taiwanese", "hebrew", "arabic", "hindi",
        "thai", "vietnamese", "russian", "aiueo", "iroha", "ganada", "chosung",
    ];
    PREFIXES.iter().any(|p| s.starts_with(p))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Ordered,
    Unordered,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LevelTemplate {
    pub level: u32,
    pub start: i64,
    pub format: NumberFormat,
    pub display_template: String,
}

impl LevelTemplate {
    fn with_level(level: u32) -> Self {
        Self {
            level,
            start: 1,
            format: NumberFormat::Decimal,
            display_template: "%1.".to_string(),
        }
    }

    /// Unknown formats are ordered only when the template shows a `%N` counter.
    pub fn kind(&self) -> ListKind {
        match &self.format {
            NumberFormat::Bullet | NumberFormat::None => ListKind::Unordered,
            NumberFormat::Other(_) => {
                if PLACEHOLDER_RE.is_match(&self.display_template) {
                    ListKind::Ordered
                } else {
                    ListKind::Unordered
                }
            }
            _ => ListKind::Ordered,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct AbstractNumbering {
    pub levels: BTreeMap<u32, LevelTemplate>,
}

#[derive(Clone, Debug, Default)]
pub struct NumberingDefinitions {
    abstracts: HashMap<i32, AbstractNumbering>,
    lists: HashMap<i32, i32>,
    start_overrides: HashMap<(i32, u32), i64>,
}

fn level_attr(attrs: &[(String, String)]) -> Option<u32> {
    parse_i32_attr(attrs, "w:ilvl").and_then(|v| u32::try_from(v).ok())
}

impl NumberingDefinitions {
    pub fn parse(part: &XmlPart) -> Self {
        let mut defs = Self::default();
        let mut stack: Vec<String> = Vec::new();
        let mut cur_abstract: Option<(i32, AbstractNumbering)> = None;
        let mut cur_level: Option<LevelTemplate> = None;
        let mut cur_num: Option<i32> = None;
        let mut cur_override_level: Option<u32> = None;

        for ev in &part.events {
            match ev {
                XmlEvent::Start { name, attrs } | XmlEvent::Empty { name, attrs } => {
                    let parent = stack.last().map(|s| s.as_str()).unwrap_or("");
                    match name.as_str() {
                        "w:abstractNum" => match parse_i32_attr(attrs, "w:abstractNumId") {
                            Some(id) => cur_abstract = Some((id, AbstractNumbering::default())),
                            None => debug!("abstractNum without a usable id"),
                        },
                        "w:lvl" if parent == "w:abstractNum" => {
                            cur_level = level_attr(attrs).map(LevelTemplate::with_level);
                        }
                        "w:start" if parent == "w:lvl" => {
                            if let (Some(lvl), Some(v)) =
                                (cur_level.as_mut(), parse_i32_attr(attrs, "w:val"))
                            {
                                lvl.start = i64::from(v);
                            }
                        }
                        "w:numFmt" if parent == "w:lvl" => {
                            if let (Some(lvl), Some(v)) =
                                (cur_level.as_mut(), find_attr(attrs, "w:val"))
                            {
                                lvl.format = NumberFormat::parse(v);
                            }
                        }
                        "w:lvlText" if parent == "w:lvl" => {
                            if let (Some(lvl), Some(v)) =
                                (cur_level.as_mut(), find_attr(attrs, "w:val"))
                            {
                                lvl.display_template = v.to_string();
                            }
                        }
                        "w:num" => cur_num = parse_i32_attr(attrs, "w:numId"),
                        "w:abstractNumId" if parent == "w:num" => {
                            if let (Some(num), Some(abs)) =
                                (cur_num, parse_i32_attr(attrs, "w:val"))
                            {
                                defs.lists.insert(num, abs);
                            }
                        }
                        "w:lvlOverride" if parent == "w:num" => {
                            cur_override_level = level_attr(attrs);
                        }
                        "w:startOverride" if parent == "w:lvlOverride" => {
                            if let (Some(num), Some(lvl), Some(v)) = (
                                cur_num,
                                cur_override_level,
                                parse_i32_attr(attrs, "w:val"),
                            ) {
                                defs.start_overrides.insert((num, lvl), i64::from(v));
                            }
                        }
                        _ => {}
                    }
                    if matches!(ev, XmlEvent::Start { .. }) {
                        stack.push(name.clone());
                    } else {
                        defs.close(name, &mut cur_abstract, &mut cur_level);
                    }
                }
                XmlEvent::End { name } => {
                    defs.close(name, &mut cur_abstract, &mut cur_level);
                    match name.as_str() {
                        "w:num" => cur_num = None,
                        "w:lvlOverride" => cur_override_level = None,
                        _ => {}
                    }
                    let _ = stack.pop();
                }
                XmlEvent::Text { .. } => {}
            }
        }
        defs
    }

    fn close(
        &mut self,
        name: &str,
        cur_abstract: &mut Option<(i32, AbstractNumbering)>,
        cur_level: &mut Option<LevelTemplate>,
    ) {
        match name {
            "w:lvl" => {
                if let (Some(lvl), Some((_, abs))) = (cur_level.take(), cur_abstract.as_mut()) {
                    abs.levels.insert(lvl.level, lvl);
                }
            }
            "w:abstractNum" => {
                if let Some((id, abs)) = cur_abstract.take() {
                    self.abstracts.insert(id, abs);
                }
            }
            _ => {}
        }
    }

    /// Template for `(list_id, level)` with any per-list start override applied.
    pub fn resolve(&self, list_id: i32, level: u32) -> Option<LevelTemplate> {
        let abstract_id = self.lists.get(&list_id)?;
        let mut tpl = self.abstracts.get(abstract_id)?.levels.get(&level)?.clone();
        if let Some(start) = self.start_overrides.get(&(list_id, level)) {
            tpl.start = *start;
        }
        Some(tpl)
    }

    /// Kind of the list as a whole, decided by its first level. Lists without a
    /// definition count as ordered.
    pub fn list_kind(&self, list_id: i32) -> ListKind {
        self.resolve(list_id, 0)
            .map(|t| t.kind())
            .unwrap_or(ListKind::Ordered)
    }
}
