//! Fuzzy index behind the palette's search mode
//!
//! Scores each item's title, description and tags as one haystack.

use nucleo_matcher::pattern::{CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Config, Matcher, Utf32Str};

use crate::content::ContentMeta;

/// Results shown in the palette
pub const MAX_RESULTS: usize = 8;

pub struct FuzzyIndex {
    items: Vec<ContentMeta>,
    haystacks: Vec<String>,
    matcher: Matcher,
}

impl FuzzyIndex {
    pub fn new(items: Vec<ContentMeta>) -> Self {
        let haystacks = items
            .iter()
            .map(|item| {
                format!(
                    "{} {} {}",
                    item.title,
                    item.description.as_deref().unwrap_or_default(),
                    item.tags.join(" ")
                )
            })
            .collect();

        Self {
            items,
            haystacks,
            matcher: Matcher::new(Config::DEFAULT),
        }
    }

    /// Best matches first; an empty query lists items in index order
    pub fn search(&mut self, query: &str) -> Vec<ContentMeta> {
        if query.trim().is_empty() {
            return self.items.iter().take(MAX_RESULTS).cloned().collect();
        }

        let pat = Pattern::parse(query, CaseMatching::Smart, Normalization::Smart);
        let mut buf = Vec::new();
        let mut scored: Vec<(u32, usize)> = Vec::new();

        for (i, haystack) in self.haystacks.iter().enumerate() {
            let hay = Utf32Str::new(haystack, &mut buf);
            if let Some(score) = pat.score(hay, &mut self.matcher) {
                scored.push((score, i));
            }
        }

        // Stable on ties so index order breaks them
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored
            .into_iter()
            .take(MAX_RESULTS)
            .map(|(_, i)| self.items[i].clone())
            .collect()
    }
}
