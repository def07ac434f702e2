//! Running counters for numbered headings and list items.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::numbering::PLACEHOLDER_RE;

/// `list_id -> (level -> count)`. Advancing a level forgets every deeper level.
#[derive(Debug, Default)]
pub struct Counters {
    lists: HashMap<i32, BTreeMap<u32, i64>>,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bump `level` of `list_id`, starting from `start` on first touch.
    pub fn advance(&mut self, list_id: i32, level: u32, start: i64) -> i64 {
        let levels = self.lists.entry(list_id).or_default();
        levels.retain(|l, _| *l <= level);
        let count = levels.entry(level).or_insert(start - 1);
        *count += 1;
        *count
    }

    /// Counts present for levels `0..=level`, in level order.
    fn present(&self, list_id: i32, level: u32) -> Vec<i64> {
        self.lists
            .get(&list_id)
            .map(|levels| levels.range(..=level).map(|(_, c)| *c).collect())
            .unwrap_or_default()
    }

    /// Display number for the current state of `(list_id, level)`.
    ///
    /// Present counts fill `%1`, `%2`, ... positionally; placeholders with no
    /// count are dropped and trailing dots are stripped. Without a template the
    /// counts are dot-joined.
    pub fn render_path(&self, list_id: i32, level: u32, template: Option<&str>) -> String {
        let counts = self.present(list_id, level);
        let rendered = match template {
            Some(t) => PLACEHOLDER_RE
                .replace_all(t, |caps: &regex::Captures| {
                    caps[1]
                        .parse::<usize>()
                        .ok()
                        .and_then(|n| n.checked_sub(1))
                        .and_then(|i| counts.get(i))
                        .map(|c| c.to_string())
                        .unwrap_or_default()
                })
                .into_owned(),
            None => join_counts(&counts),
        };
        rendered.trim_end_matches('.').to_string()
    }

    /// Counts for `first..=last`, with untouched levels shown as 0.
    pub fn padded_path(&self, list_id: i32, first: u32, last: u32) -> String {
        let levels = self.lists.get(&list_id);
        let counts: Vec<i64> = (first..=last)
            .map(|l| levels.and_then(|m| m.get(&l)).copied().unwrap_or(0))
            .collect();
        join_counts(&counts)
    }

    pub fn reset(&mut self) {
        self.lists.clear();
    }
}

fn join_counts(counts: &[i64]) -> String {
    counts
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(".")
}

/// Hands out document-unique number paths.
#[derive(Debug, Default)]
pub struct PathRegistry {
    used: HashSet<String>,
}

impl PathRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `path` itself the first time, then `path.1`, `path.2`, ... (first unused).
    pub fn claim(&mut self, path: &str) -> String {
        let mut candidate = path.to_string();
        let mut suffix = 1u32;
        while self.used.contains(&candidate) {
            candidate = format!("{path}.{suffix}");
            suffix += 1;
        }
        self.used.insert(candidate.clone());
        candidate
    }
}
