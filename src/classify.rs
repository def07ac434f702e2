//! Paragraph classification: heading levels from style names, list items from
//! numbering references.

use crate::counter::Counters;
use crate::docx::body::{NumRefAttr, RawParagraph};
use crate::docx::styles::StyleTable;
use crate::numbering::{ListKind, NumberingDefinitions};

pub const MAX_HEADING_LEVEL: u32 = 9;
const MAX_LIST_LEVEL: i32 = 8;

/// Heading level of a style display name, `1..=max_level`.
///
/// The name is lower-cased and the first `k` for which it contains
/// `"heading k"` wins.
pub fn heading_level(style_name: &str, max_level: u32) -> Option<u32> {
    let name = style_name.to_lowercase();
    (1..=max_level.clamp(1, MAX_HEADING_LEVEL)).find(|k| name.contains(&format!("heading {k}")))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListRef {
    pub list_id: i32,
    pub level: u32,
}

fn clamp_level(ilvl: Option<i32>) -> u32 {
    ilvl.unwrap_or(0).clamp(0, MAX_LIST_LEVEL) as u32
}

/// What the paragraph's own `w:numPr` says.
#[derive(Debug, PartialEq, Eq)]
enum Explicit {
    Absent,
    /// `numId` 0: numbering switched off for this paragraph.
    Removed,
    Level(Option<i32>),
    Ref(ListRef),
}

fn explicit(num_ref: Option<NumRefAttr>) -> Explicit {
    let Some(r) = num_ref else {
        return Explicit::Absent;
    };
    match r.num_id {
        Some(0) => Explicit::Removed,
        Some(id) => Explicit::Ref(ListRef {
            list_id: id,
            level: clamp_level(r.ilvl),
        }),
        None => Explicit::Level(r.ilvl),
    }
}

/// List reference carried by the paragraph itself; style numbering is ignored.
pub fn explicit_list_ref(para: &RawParagraph) -> Option<ListRef> {
    match explicit(para.num_ref) {
        Explicit::Ref(r) => Some(r),
        _ => None,
    }
}

/// List reference from the paragraph, else from its style chain. A
/// paragraph-level `ilvl` without a `numId` still picks the level of a
/// style-provided list.
pub fn list_ref(para: &RawParagraph, styles: &StyleTable) -> Option<ListRef> {
    let own_level = match explicit(para.num_ref) {
        Explicit::Ref(r) => return Some(r),
        Explicit::Removed => return None,
        Explicit::Level(l) => l,
        Explicit::Absent => None,
    };
    let style_id = para.style_id.as_deref()?;
    let inherited = styles.numbering_ref(style_id)?;
    match inherited.num_id {
        Some(id) if id != 0 => Some(ListRef {
            list_id: id,
            level: clamp_level(own_level.or(inherited.ilvl)),
        }),
        _ => None,
    }
}

/// In-section list numbering. Counting restarts whenever the active
/// `(list id, kind)` changes or [`ListState::reset`] is called.
#[derive(Debug, Default)]
pub struct ListState {
    counters: Counters,
    active: Option<(i32, ListKind)>,
}

impl ListState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.counters.reset();
        self.active = None;
    }

    /// `text` prefixed with two spaces per level and `"<N> "` or `"- "`.
    pub fn mark(
        &mut self,
        list: ListRef,
        numbering: Option<&NumberingDefinitions>,
        text: &str,
    ) -> String {
        let list_kind = numbering
            .map(|n| n.list_kind(list.list_id))
            .unwrap_or(ListKind::Ordered);
        if self.active != Some((list.list_id, list_kind)) {
            self.counters.reset();
            self.active = Some((list.list_id, list_kind));
        }

        let template = numbering.and_then(|n| n.resolve(list.list_id, list.level));
        let item_kind = template.as_ref().map(|t| t.kind()).unwrap_or(list_kind);
        let indent = "  ".repeat(list.level as usize);
        match item_kind {
            ListKind::Ordered => {
                let start = template.map(|t| t.start).unwrap_or(1);
                let n = self.counters.advance(list.list_id, list.level, start);
                format!("{indent}<{n}> {text}")
            }
            ListKind::Unordered => format!("{indent}- {text}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::xml::parse_xml_part;

    fn para(style: Option<&str>, num_ref: Option<NumRefAttr>) -> RawParagraph {
        RawParagraph {
            style_id: style.map(str::to_string),
            text: "item".to_string(),
            num_ref,
            ..Default::default()
        }
    }

    fn num(num_id: Option<i32>, ilvl: Option<i32>) -> Option<NumRefAttr> {
        Some(NumRefAttr { num_id, ilvl })
    }

    fn styles() -> StyleTable {
        let xml = br#"<w:styles xmlns:w="w">
<w:style w:styleId="ListNumber"><w:name w:val="List Number"/><w:pPr><w:numPr><w:ilvl w:val="1"/><w:numId w:val="4"/></w:numPr></w:pPr></w:style>
<w:style w:styleId="Plain"><w:name w:val="Plain"/></w:style>
</w:styles>"#;
        StyleTable::parse(&parse_xml_part("word/styles.xml", xml).expect("styles"))
    }

    fn numbering() -> NumberingDefinitions {
        let xml = br#"<w:numbering xmlns:w="w">
<w:abstractNum w:abstractNumId="0">
  <w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="decimal"/><w:lvlText w:val="%1."/></w:lvl>
  <w:lvl w:ilvl="1"><w:start w:val="1"/><w:numFmt w:val="bullet"/><w:lvlText w:val="o"/></w:lvl>
</w:abstractNum>
<w:abstractNum w:abstractNumId="1">
  <w:lvl w:ilvl="0"><w:numFmt w:val="bullet"/><w:lvlText w:val="-"/></w:lvl>
</w:abstractNum>
<w:abstractNum w:abstractNumId="2">
  <w:lvl w:ilvl="0"><w:start w:val="3"/><w:numFmt w:val="lowerRoman"/><w:lvlText w:val="%1)"/></w:lvl>
</w:abstractNum>
<w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num>
<w:num w:numId="2"><w:abstractNumId w:val="1"/></w:num>
<w:num w:numId="3"><w:abstractNumId w:val="2"/></w:num>
</w:numbering>"#;
        NumberingDefinitions::parse(&parse_xml_part("word/numbering.xml", xml).expect("numbering"))
    }

    #[test]
    fn matches_heading_styles_case_insensitively() {
        assert_eq!(heading_level("heading 1", 9), Some(1));
        assert_eq!(heading_level("Heading 3", 9), Some(3));
        assert_eq!(heading_level("My Heading 2 Custom", 9), Some(2));
        assert_eq!(heading_level("Heading 5", 3), None);
        assert_eq!(heading_level("Heading 1", 0), Some(1));
        assert_eq!(heading_level("Heading1", 9), None);
        assert_eq!(heading_level("Title", 9), None);
    }

    #[test]
    fn explicit_numbering_wins_over_style() {
        let t = styles();
        let r = list_ref(&para(Some("ListNumber"), num(Some(9), Some(2))), &t);
        assert_eq!(r, Some(ListRef { list_id: 9, level: 2 }));
        let r = list_ref(&para(None, num(Some(9), None)), &t);
        assert_eq!(r, Some(ListRef { list_id: 9, level: 0 }));
    }

    #[test]
    fn style_numbering_is_inherited_unless_removed() {
        let t = styles();
        assert_eq!(
            list_ref(&para(Some("ListNumber"), None), &t),
            Some(ListRef { list_id: 4, level: 1 })
        );
        assert_eq!(
            list_ref(&para(Some("ListNumber"), num(None, Some(0))), &t),
            Some(ListRef { list_id: 4, level: 0 })
        );
        assert_eq!(list_ref(&para(Some("ListNumber"), num(Some(0), None)), &t), None);
        assert_eq!(list_ref(&para(Some("Plain"), None), &t), None);
        assert_eq!(list_ref(&para(None, num(None, None)), &t), None);
    }

    #[test]
    fn explicit_ref_ignores_style_numbering() {
        assert_eq!(explicit_list_ref(&para(Some("ListNumber"), None)), None);
        assert_eq!(explicit_list_ref(&para(None, num(Some(0), None))), None);
        assert_eq!(
            explicit_list_ref(&para(None, num(Some(2), Some(42)))),
            Some(ListRef { list_id: 2, level: 8 })
        );
    }

    #[test]
    fn ordered_items_count_per_level() {
        let defs = numbering();
        let mut state = ListState::new();
        let marks: Vec<String> = [0, 0, 0, 1, 1, 0]
            .iter()
            .map(|&level| state.mark(ListRef { list_id: 3, level }, Some(&defs), "x"))
            .collect();
        // Level 1 is undefined for list 3 and falls back to the list's kind.
        assert_eq!(marks, ["<3> x", "<4> x", "<5> x", "  <1> x", "  <2> x", "<6> x"]);
    }

    #[test]
    fn mixed_levels_use_their_own_marker() {
        let defs = numbering();
        let mut state = ListState::new();
        assert_eq!(state.mark(ListRef { list_id: 1, level: 0 }, Some(&defs), "a"), "<1> a");
        assert_eq!(state.mark(ListRef { list_id: 1, level: 1 }, Some(&defs), "b"), "  - b");
        assert_eq!(state.mark(ListRef { list_id: 2, level: 0 }, Some(&defs), "c"), "- c");
        // Switching lists restarts counting.
        assert_eq!(state.mark(ListRef { list_id: 1, level: 0 }, Some(&defs), "d"), "<1> d");
    }

    #[test]
    fn missing_numbering_defaults_to_ordered() {
        let mut state = ListState::new();
        let r = ListRef { list_id: 5, level: 0 };
        assert_eq!(state.mark(r, None, "a"), "<1> a");
        assert_eq!(state.mark(r, None, "b"), "<2> b");
        state.reset();
        assert_eq!(state.mark(r, None, "c"), "<1> c");
    }
}
