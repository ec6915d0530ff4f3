//! Medication autocomplete.
//!
//! A query is answered in two passes over the medication names and their alternates:
//!
//! 1. **Substring pass.** Every medication whose name or an alternate name contains the query
//!    (ignoring case) is returned. Name prefixes rank first, then alternate prefixes, then plain
//!    substring hits; ties are ordered by canonical name.
//! 2. **Fuzzy pass.** Remaining medications are scored word by word with a partial-ratio
//!    similarity (0..=100, best window of the longer string, LCS based). Candidates starting
//!    with the query get a bonus. Those scoring above the threshold are appended, best first,
//!    up to the configured limit.
//!
//! Each result is a `[canonical_name, matched_name]` pair, where `matched_name` is the name or
//! alternate that produced the hit.

use crate::constants::{FUZZY_THRESHOLD, MAX_QUERY_CHARS, PREFIX_BONUS};
use crate::medications::MedicationStore;
use api_shared::SuggestionPair;

#[derive(Clone, Debug)]
struct Entry {
    canonical: String,
    name_lower: String,
    /// `(original, lowercased)` alternate names.
    alternates: Vec<(String, String)>,
}

/// Prebuilt lookup structure for `/suggestions`.
#[derive(Clone, Debug, Default)]
pub struct SuggestionIndex {
    entries: Vec<Entry>,
    fuzzy_limit: usize,
}

impl SuggestionIndex {
    pub fn build(store: &MedicationStore, fuzzy_limit: usize) -> Self {
        let entries = store
            .iter()
            .map(|m| Entry {
                canonical: m.name.clone(),
                name_lower: m.name.to_lowercase(),
                alternates: m
                    .alternate_names
                    .iter()
                    .map(|alt| (alt.clone(), alt.to_lowercase()))
                    .collect(),
            })
            .collect();
        Self {
            entries,
            fuzzy_limit,
        }
    }

    /// Suggestions for `query`. A blank query yields no suggestions.
    ///
    /// Only the first [`MAX_QUERY_CHARS`] characters of the trimmed query are matched.
    pub fn suggest(&self, query: &str) -> Vec<SuggestionPair> {
        let query: String = query
            .trim()
            .chars()
            .take(MAX_QUERY_CHARS)
            .collect::<String>()
            .to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }

        let mut substring_hits: Vec<(u8, &str, &str)> = Vec::new();
        let mut fuzzy_hits: Vec<(u32, &str, &str)> = Vec::new();

        for entry in &self.entries {
            if let Some((rank, matched)) = substring_match(entry, &query) {
                substring_hits.push((rank, entry.canonical.as_str(), matched));
            } else if let Some((score, matched)) = fuzzy_match(entry, &query) {
                fuzzy_hits.push((score, entry.canonical.as_str(), matched));
            }
        }

        substring_hits.sort_by(|a, b| {
            a.0.cmp(&b.0)
                .then_with(|| a.1.to_lowercase().cmp(&b.1.to_lowercase()))
        });
        fuzzy_hits.sort_by(|a, b| {
            b.0.cmp(&a.0)
                .then_with(|| a.1.to_lowercase().cmp(&b.1.to_lowercase()))
        });
        fuzzy_hits.truncate(self.fuzzy_limit);

        substring_hits
            .into_iter()
            .map(|(_, canonical, matched)| (canonical, matched))
            .chain(
                fuzzy_hits
                    .into_iter()
                    .map(|(_, canonical, matched)| (canonical, matched)),
            )
            .map(|(canonical, matched)| SuggestionPair(canonical.to_string(), matched.to_string()))
            .collect()
    }
}

fn substring_match<'a>(entry: &'a Entry, query: &str) -> Option<(u8, &'a str)> {
    let mut best: Option<(u8, &'a str)> = None;

    if entry.name_lower.contains(query) {
        let rank = if entry.name_lower.starts_with(query) { 0 } else { 2 };
        best = Some((rank, entry.canonical.as_str()));
    }

    for (original, lower) in &entry.alternates {
        if lower.contains(query) {
            let rank = if lower.starts_with(query) { 1 } else { 3 };
            if best.map_or(true, |(current, _)| rank < current) {
                best = Some((rank, original.as_str()));
            }
        }
    }

    best
}

fn fuzzy_match<'a>(entry: &'a Entry, query: &str) -> Option<(u32, &'a str)> {
    let (_, mut name_score) = best_word(query, &entry.name_lower);
    if entry.name_lower.starts_with(query) {
        name_score += PREFIX_BONUS;
    }

    let mut best_alt: Option<(u32, &str, &'a str)> = None;
    for (original, lower) in &entry.alternates {
        let (word, score) = best_word(query, lower);
        if best_alt.map_or(score > 0, |(current, _, _)| score > current) {
            best_alt = Some((score, word, original.as_str()));
        }
    }

    let alt = best_alt.map(|(score, word, original)| {
        let bonus = if word.starts_with(query) { PREFIX_BONUS } else { 0 };
        (score + bonus, original)
    });

    match alt {
        Some((alt_score, original)) if alt_score > name_score => {
            (alt_score > FUZZY_THRESHOLD).then_some((alt_score, original))
        }
        _ => (name_score > FUZZY_THRESHOLD).then_some((name_score, entry.canonical.as_str())),
    }
}

/// Best-scoring whitespace-separated word of `text` against `query`. The first word wins ties.
fn best_word<'t>(query: &str, text: &'t str) -> (&'t str, u32) {
    let mut best = ("", 0);
    for word in text.split_whitespace() {
        let score = partial_ratio(query, word);
        if score > best.1 {
            best = (word, score);
        }
    }
    best
}

/// Similarity of two strings in `0..=100`: `2 * LCS / (len_a + len_b)`, rounded.
pub fn ratio(a: &str, b: &str) -> u32 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    ratio_chars(&a, &b)
}

fn ratio_chars(a: &[char], b: &[char]) -> u32 {
    let total = a.len() + b.len();
    if total == 0 {
        return 100;
    }
    let lcs = lcs_len(a, b);
    ((200 * lcs) as f64 / total as f64).round() as u32
}

/// Best [`ratio`] between the shorter string and any same-length window of the longer one.
pub fn partial_ratio(a: &str, b: &str) -> u32 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    if short.is_empty() {
        return 0;
    }
    if short.len() == long.len() {
        return ratio_chars(&short, &long);
    }

    let mut best = 0;
    for window in long.windows(short.len()) {
        best = best.max(ratio_chars(&short, window));
        if best == 100 {
            break;
        }
    }
    best
}

fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}
