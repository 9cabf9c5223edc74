use std::collections::HashMap;
use std::ops::RangeInclusive;

use tracing::debug;

use crate::catalog::Catalog;
use crate::record::StampRecord;

/// Numeric queries inside this range are treated as an exact year filter.
pub const YEAR_RANGE: RangeInclusive<i32> = 1840..=2100;

/// Equivalence groups; a term matching any member also finds the others.
const SYNONYM_GROUPS: &[&[&str]] = &[
    &["ship", "boat", "vessel", "sailing"],
    &["plane", "aircraft", "airplane", "aeroplane", "aviation"],
    &["train", "locomotive", "railway", "railroad"],
    &["car", "automobile", "motor"],
    &["king", "monarch", "royal"],
    &["queen", "monarch", "royal"],
    &["flower", "floral", "flora", "blossom"],
    &["bird", "birds", "avian"],
    &["animal", "fauna", "wildlife"],
    &["space", "rocket", "satellite", "astronaut", "moon"],
    &["map", "cartography"],
    &["christmas", "xmas"],
    &["olympic", "olympics", "games", "sport"],
    &["red", "carmine", "scarlet", "vermilion"],
    &["blue", "ultramarine", "azure", "indigo"],
];

/// Scored fields, highest weight first: `(exact, substring)` points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    MainTopic,
    SubTopic,
    Color,
    Denomination,
    Notes,
    Identifier,
    Year,
}

impl Field {
    const ALL: [Field; 7] = [
        Field::MainTopic,
        Field::SubTopic,
        Field::Color,
        Field::Denomination,
        Field::Notes,
        Field::Identifier,
        Field::Year,
    ];

    fn weights(self) -> (u32, u32) {
        match self {
            Field::MainTopic => (100, 40),
            Field::SubTopic => (30, 12),
            Field::Color => (20, 8),
            Field::Denomination => (15, 6),
            Field::Notes => (10, 4),
            Field::Identifier => (8, 3),
            Field::Year => (5, 2),
        }
    }

    fn text(self, record: &StampRecord) -> String {
        match self {
            Field::MainTopic => record.main_topic.to_lowercase(),
            Field::SubTopic => record.sub_topic.as_deref().unwrap_or("").to_lowercase(),
            Field::Color => record.color.as_deref().unwrap_or("").to_lowercase(),
            Field::Denomination => record.denomination.as_deref().unwrap_or("").to_lowercase(),
            Field::Notes => record.notes.as_deref().unwrap_or("").to_lowercase(),
            Field::Identifier => record.id.to_lowercase(),
            Field::Year => record.year.to_string(),
        }
    }
}

/// One search hit: a catalog index and its relevance score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchMatch {
    pub index: usize,
    pub score: u32,
}

/// Synonyms of `term`, not including the term itself.
pub fn synonyms(term: &str) -> Vec<&'static str> {
    let mut out: Vec<&'static str> = Vec::new();
    for group in SYNONYM_GROUPS.iter().filter(|g| g.contains(&term)) {
        for &word in group.iter() {
            if word != term && !out.contains(&word) {
                out.push(word);
            }
        }
    }
    out
}

/// Interpret a query as a year filter if it is a bare integer in [`YEAR_RANGE`].
pub fn parse_year_query(query: &str) -> Option<i32> {
    let q = query.trim();
    if q.is_empty() || !q.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    q.parse().ok().filter(|y| YEAR_RANGE.contains(y))
}

/// Rank catalog records against `query`.
///
/// Results are ordered by descending score, then catalog order.
pub fn search(catalog: &Catalog, query: &str) -> Vec<SearchMatch> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }

    if let Some(year) = parse_year_query(&query) {
        return catalog
            .all()
            .iter()
            .enumerate()
            .filter(|(_, r)| r.year == year)
            .map(|(index, _)| SearchMatch { index, score: 0 })
            .collect();
    }

    let terms: Vec<(&str, Vec<&'static str>)> = query
        .split_whitespace()
        .map(|t| (t, synonyms(t)))
        .collect();

    let mut matches: Vec<SearchMatch> = catalog
        .all()
        .iter()
        .enumerate()
        .filter_map(|(index, record)| {
            score_record(record, &query, &terms).map(|score| SearchMatch { index, score })
        })
        .collect();
    // Stable: equal scores keep catalog order.
    matches.sort_by(|a, b| b.score.cmp(&a.score));
    debug!(query = %query, hits = matches.len(), "Search ranked");
    matches
}

fn score_record(
    record: &StampRecord,
    phrase: &str,
    terms: &[(&str, Vec<&'static str>)],
) -> Option<u32> {
    let text = record.search_text();
    let all_terms_hit = terms
        .iter()
        .all(|(t, syn)| text.contains(t) || syn.iter().any(|s| text.contains(s)));
    if !all_terms_hit {
        return None;
    }

    let fields: Vec<(Field, String)> = Field::ALL.iter().map(|&f| (f, f.text(record))).collect();
    let mut score = 0;
    for (term, syns) in terms {
        for (field, value) in &fields {
            let direct = field_hit(*field, value, term);
            let via_synonym = syns
                .iter()
                .map(|s| field_hit(*field, value, s) / 2)
                .max()
                .unwrap_or(0);
            score += direct.max(via_synonym);
        }
    }
    if terms.len() > 1 {
        for (field, value) in &fields {
            if value == phrase {
                score += field.weights().0;
            }
        }
    }
    // A term straddling two fields still matched the search text.
    Some(score.max(1))
}

fn field_hit(field: Field, value: &str, term: &str) -> u32 {
    let (exact, substring) = field.weights();
    if value.is_empty() {
        0
    } else if value == term {
        exact
    } else if value.contains(term) {
        substring
    } else {
        0
    }
}

// ---------------------------------------------------------------------------
// Search state
// ---------------------------------------------------------------------------

/// Current query, its ranked matches, and the cyclic cursor over them.
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    query: String,
    matches: Vec<SearchMatch>,
    position: HashMap<usize, usize>,
    current: Option<usize>,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `query` and move the cursor to the best match.
    pub fn set_query(&mut self, catalog: &Catalog, query: &str) -> &[SearchMatch] {
        self.query = query.to_string();
        self.matches = search(catalog, query);
        self.position = self
            .matches
            .iter()
            .enumerate()
            .map(|(pos, m)| (m.index, pos))
            .collect();
        self.current = if self.matches.is_empty() { None } else { Some(0) };
        &self.matches
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn matches(&self) -> &[SearchMatch] {
        &self.matches
    }

    /// Position of the cursor within the match list.
    pub fn current_position(&self) -> Option<usize> {
        self.current
    }

    pub fn current(&self) -> Option<SearchMatch> {
        self.current.map(|i| self.matches[i])
    }

    /// Advance the cursor, wrapping at the end.
    pub fn next(&mut self) -> Option<SearchMatch> {
        let len = self.matches.len();
        self.current = self.current.map(|i| (i + 1) % len);
        self.current()
    }

    /// Move the cursor back, wrapping at the start.
    pub fn previous(&mut self) -> Option<SearchMatch> {
        let len = self.matches.len();
        self.current = self.current.map(|i| (i + len - 1) % len);
        self.current()
    }

    /// Highlight role of a catalog record under the current search.
    pub fn role_of(&self, index: usize) -> Option<MatchRole> {
        let pos = *self.position.get(&index)?;
        Some(if Some(pos) == self.current {
            MatchRole::Current
        } else {
            MatchRole::Other
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRole {
    Current,
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::from_records(vec![
            StampRecord::new("1", 1851, "Shipwreck memorial"),
            StampRecord::new("2", 1935, "Ship").with_color("green"),
            StampRecord::new("3", 1935, "King George V").with_notes("Printed 1936"),
            StampRecord::new("4", 1936, "Lighthouse").with_notes("Issued 1935 proofs"),
            StampRecord::new("5", 1960, "Harbour").with_sub_topic("Sailing boat"),
        ])
    }

    fn ids(catalog: &Catalog, matches: &[SearchMatch]) -> Vec<String> {
        matches
            .iter()
            .map(|m| catalog.get(m.index).unwrap().id.clone())
            .collect()
    }

    #[test]
    fn exact_topic_outranks_substring_topic() {
        let c = catalog();
        let m = search(&c, "ship");
        let order = ids(&c, &m);
        let exact = order.iter().position(|id| id == "2").unwrap();
        let substring = order.iter().position(|id| id == "1").unwrap();
        assert!(exact < substring, "{order:?}");
    }

    #[test]
    fn synonyms_extend_matches() {
        let c = catalog();
        let order = ids(&c, &search(&c, "vessel"));
        assert!(order.contains(&"2".to_string()));
        assert!(order.contains(&"5".to_string()));
    }

    #[test]
    fn year_query_filters_exactly() {
        let c = catalog();
        let order = ids(&c, &search(&c, "1935"));
        assert_eq!(order, ["2", "3"]);
    }

    #[test]
    fn numbers_outside_year_range_are_text() {
        assert_eq!(parse_year_query("1935"), Some(1935));
        assert_eq!(parse_year_query(" 1840 "), Some(1840));
        assert_eq!(parse_year_query("12"), None);
        assert_eq!(parse_year_query("1935a"), None);
        let c = catalog();
        let order = ids(&c, &search(&c, "5"));
        assert_eq!(order.len(), 5, "every record mentions a 5 somewhere");
        assert_eq!(order[0], "5", "identifier hit outranks year substrings");
    }

    #[test]
    fn all_terms_must_match() {
        let c = catalog();
        assert_eq!(ids(&c, &search(&c, "king george")), ["3"]);
        assert!(search(&c, "king lighthouse").is_empty());
    }

    #[test]
    fn ties_break_chronologically() {
        let c = Catalog::from_records(vec![
            StampRecord::new("b", 1900, "Bird"),
            StampRecord::new("a", 1890, "Bird"),
        ]);
        assert_eq!(ids(&c, &search(&c, "bird")), ["a", "b"]);
    }

    #[test]
    fn empty_query_has_no_matches() {
        let c = catalog();
        assert!(search(&c, "   ").is_empty());
        let mut state = SearchState::new();
        state.set_query(&c, "");
        assert_eq!(state.current_position(), None);
        assert_eq!(state.next(), None);
        assert_eq!(state.previous(), None);
    }

    #[test]
    fn next_cycles_through_three_matches() {
        let c = Catalog::from_records(vec![
            StampRecord::new("1", 1900, "Bird"),
            StampRecord::new("2", 1910, "Bird"),
            StampRecord::new("3", 1920, "Bird"),
        ]);
        let mut state = SearchState::new();
        assert_eq!(state.set_query(&c, "bird").len(), 3);
        assert_eq!(state.current_position(), Some(0));
        state.next();
        state.next();
        state.next();
        assert_eq!(state.current_position(), Some(0));
        state.previous();
        assert_eq!(state.current_position(), Some(2));
    }

    #[test]
    fn roles_mark_one_current() {
        let c = catalog();
        let mut state = SearchState::new();
        state.set_query(&c, "1935");
        assert_eq!(state.role_of(1), Some(MatchRole::Current));
        assert_eq!(state.role_of(2), Some(MatchRole::Other));
        assert_eq!(state.role_of(0), None);
        state.next();
        assert_eq!(state.role_of(1), Some(MatchRole::Other));
        assert_eq!(state.role_of(2), Some(MatchRole::Current));
    }
}
