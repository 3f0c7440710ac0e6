//! Search filtering and row truncation
//!
//! Filtering is a case-insensitive substring match on the label and, when
//! enabled, the secondary text. There is no ranking: matches keep the order
//! of the input. Truncation caps the number of rendered rows and reports how
//! many matches were left out.

use crate::option::SelectOption;

/// Search text of an open panel
///
/// Lives only while the panel is open; every open starts empty.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchState {
    query: String,
}

impl SearchState {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn reset(&mut self) {
        self.query.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.query.is_empty()
    }
}

/// Which fields a search looks at
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OptionFilter {
    pub search_secondary: bool,
}

impl Default for OptionFilter {
    fn default() -> Self {
        Self {
            search_secondary: true,
        }
    }
}

impl OptionFilter {
    /// Check a single option against `query`
    ///
    /// `query_lower` must already be lowercased.
    fn matches_lowered(&self, option: &SelectOption, query_lower: &str) -> bool {
        if option.label.to_lowercase().contains(query_lower) {
            return true;
        }
        self.search_secondary
            && option
                .secondary
                .as_ref()
                .map(|s| s.to_lowercase().contains(query_lower))
                .unwrap_or(false)
    }

    /// Whether one option matches `query`
    pub fn matches(&self, option: &SelectOption, query: &str) -> bool {
        query.is_empty() || self.matches_lowered(option, &query.to_lowercase())
    }

    /// Options matching `query`, in input order
    pub fn apply<'a, I>(&self, options: I, query: &str) -> Vec<&'a SelectOption>
    where
        I: IntoIterator<Item = &'a SelectOption>,
    {
        if query.is_empty() {
            return options.into_iter().collect();
        }
        let query_lower = query.to_lowercase();
        options
            .into_iter()
            .filter(|o| self.matches_lowered(o, &query_lower))
            .collect()
    }
}

/// Options whose label or secondary text contains `query` (case-insensitive)
pub fn filter<'a, I>(options: I, query: &str) -> Vec<&'a SelectOption>
where
    I: IntoIterator<Item = &'a SelectOption>,
{
    OptionFilter::default().apply(options, query)
}

/// A capped prefix of a list
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Truncated<'a, T> {
    /// Rows to render
    pub visible: &'a [T],
    /// Matches not rendered
    pub hidden: usize,
}

impl<'a, T> Truncated<'a, T> {
    /// True when a "N more results" footer is needed
    pub fn has_more(&self) -> bool {
        self.hidden > 0
    }
}

/// Keep at most `max` rows of `list`
pub fn truncate<T>(list: &[T], max: usize) -> Truncated<'_, T> {
    let shown = list.len().min(max);
    Truncated {
        visible: &list[..shown],
        hidden: list.len() - shown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn courses() -> Vec<SelectOption> {
        vec![
            SelectOption::new("1", "Toán").secondary("MATH101"),
            SelectOption::new("2", "Lý").secondary("PHYS101"),
        ]
    }

    fn values(list: &[&SelectOption]) -> Vec<String> {
        list.iter().map(|o| o.value.clone()).collect()
    }

    #[test]
    fn test_empty_query_returns_everything_in_order() {
        let options = courses();
        let filtered = filter(&options, "");
        assert_eq!(filtered.len(), options.len());
        assert_eq!(values(&filtered), vec!["1", "2"]);
    }

    #[test]
    fn test_case_insensitive() {
        let options = vec![SelectOption::new("h", "Hello")];
        assert_eq!(filter(&options, "HELLO").len(), 1);
        assert_eq!(filter(&options, "ell").len(), 1);
        assert!(filter(&options, "world").is_empty());
    }

    #[test]
    fn test_secondary_text_matches() {
        let options = courses();
        assert_eq!(values(&filter(&options, "101")), vec!["1", "2"]);
        assert_eq!(values(&filter(&options, "toán")), vec!["1"]);
        assert_eq!(values(&filter(&options, "TOÁN")), vec!["1"]);
        assert_eq!(values(&filter(&options, "phys")), vec!["2"]);
    }

    #[test]
    fn test_secondary_search_can_be_disabled() {
        let options = courses();
        let labels_only = OptionFilter {
            search_secondary: false,
        };
        assert!(labels_only.apply(&options, "101").is_empty());
        assert_eq!(labels_only.apply(&options, "lý").len(), 1);
    }

    #[test]
    fn test_filter_does_not_touch_source() {
        let options = courses();
        let before = options.clone();
        let _ = filter(&options, "lý");
        assert_eq!(options, before);
    }

    #[test]
    fn test_truncate_bound() {
        let rows: Vec<u32> = (0..25).collect();
        let t = truncate(&rows, 10);
        assert_eq!(t.visible.len(), 10);
        assert_eq!(t.hidden, 15);
        assert!(t.has_more());

        let exact: Vec<u32> = (0..10).collect();
        let t = truncate(&exact, 10);
        assert_eq!(t.visible.len(), 10);
        assert!(!t.has_more());

        let short = [1, 2, 3];
        let t = truncate(&short, 10);
        assert_eq!(t.visible, &short[..]);
        assert!(!t.has_more());
    }

    #[test]
    fn test_search_state_reset() {
        let mut search = SearchState::default();
        search.set("abc");
        assert_eq!(search.query(), "abc");
        search.reset();
        assert!(search.is_empty());
    }
}
