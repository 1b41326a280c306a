use serde::{Deserialize, Serialize};

/// Row predicate applied to a loaded collection.
pub trait RowFilter<T> {
    fn accepts(&self, row: &T) -> bool;
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Inactive,
}

impl StatusFilter {
    pub fn accepts(self, is_active: bool) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => is_active,
            StatusFilter::Inactive => !is_active,
        }
    }
}

/// Blank terms match everything.
pub fn term_matches(term: &str, matches: impl FnOnce(&str) -> bool) -> bool {
    let term = term.trim();
    term.is_empty() || matches(term)
}
