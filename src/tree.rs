//! Nested view of the flat section list, following `parent_ref`.

use std::collections::HashMap;

use serde::Serialize;

use crate::outline::Section;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SectionNode {
    pub number_path: String,
    pub level: u32,
    pub title: Option<String>,
    pub children: Vec<SectionNode>,
}

struct ArenaNode<'a> {
    section: &'a Section,
    children: Vec<usize>,
}

fn arena_to_tree(idx: usize, arena: &[ArenaNode<'_>]) -> SectionNode {
    let n = &arena[idx];
    SectionNode {
        number_path: n.section.number_path.clone(),
        level: n.section.level,
        title: n.section.title.clone(),
        children: n
            .children
            .iter()
            .copied()
            .map(|c| arena_to_tree(c, arena))
            .collect(),
    }
}

/// Sections whose parent is unknown (or not yet seen) become roots. Siblings
/// keep document order.
pub fn build_section_tree(sections: &[Section]) -> Vec<SectionNode> {
    let mut arena: Vec<ArenaNode<'_>> = Vec::with_capacity(sections.len());
    let mut by_path: HashMap<&str, usize> = HashMap::new();
    let mut roots: Vec<usize> = Vec::new();

    for section in sections {
        let idx = arena.len();
        arena.push(ArenaNode {
            section,
            children: Vec::new(),
        });
        match section
            .parent_ref
            .as_deref()
            .and_then(|p| by_path.get(p).copied())
        {
            Some(parent) => arena[parent].children.push(idx),
            None => roots.push(idx),
        }
        by_path.insert(section.number_path.as_str(), idx);
    }

    roots.into_iter().map(|r| arena_to_tree(r, &arena)).collect()
}
