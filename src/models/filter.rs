//! Filter, sort, and page state models.
//!
//! Sort options form a closed enum validated once at the codec boundary;
//! downstream components never see raw sort strings.

use serde::{Deserialize, Serialize};

/// User-facing sort option carried in the URL.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum SortOption {
    #[default]
    Newest,
    Oldest,
    Alphabetical,
}

impl SortOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOption::Newest => "newest",
            SortOption::Oldest => "oldest",
            SortOption::Alphabetical => "alphabetical",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "newest" => Some(SortOption::Newest),
            "oldest" => Some(SortOption::Oldest),
            "alphabetical" => Some(SortOption::Alphabetical),
            _ => None,
        }
    }

    /// Server-side sort field for this option.
    pub fn order_by(&self) -> OrderBy {
        match self {
            SortOption::Newest | SortOption::Oldest => OrderBy::CreatedAt,
            SortOption::Alphabetical => OrderBy::Title,
        }
    }

    /// Server-side sort direction for this option.
    pub fn sort_direction(&self) -> SortDirection {
        match self {
            SortOption::Newest => SortDirection::Descending,
            SortOption::Oldest | SortOption::Alphabetical => SortDirection::Ascending,
        }
    }
}

/// Server sort field (two-part sort contract, first half).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OrderBy {
    CreatedAt,
    UpdatedAt,
    Title,
}

impl OrderBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderBy::CreatedAt => "CreatedAt",
            OrderBy::UpdatedAt => "UpdatedAt",
            OrderBy::Title => "Title",
        }
    }
}

/// Server sort direction (two-part sort contract, second half).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "Ascending",
            SortDirection::Descending => "Descending",
        }
    }
}

/// Validated, defaulted representation of search/category/sort/page state.
///
/// Every field resolves to a defined value downstream of the codec; the
/// descriptor is never partially undefined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterDescriptor {
    /// Search text; empty string when absent
    pub search_query: String,
    pub category_id: Option<String>,
    pub sort: SortOption,
    /// 1-indexed page number, always >= 1
    pub page: u32,
}

impl Default for FilterDescriptor {
    fn default() -> Self {
        Self {
            search_query: String::new(),
            category_id: None,
            sort: SortOption::default(),
            page: 1,
        }
    }
}

impl FilterDescriptor {
    /// Whether two descriptors differ in any field other than page.
    ///
    /// A change here invalidates loaded results and resets pagination.
    pub fn filters_changed(&self, other: &FilterDescriptor) -> bool {
        self.search_query != other.search_query
            || self.category_id != other.category_id
            || self.sort != other.sort
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_mapping_table() {
        // The fixed three-row mapping to the server's two-part sort contract.
        let cases = [
            (SortOption::Newest, OrderBy::CreatedAt, SortDirection::Descending),
            (SortOption::Oldest, OrderBy::CreatedAt, SortDirection::Ascending),
            (SortOption::Alphabetical, OrderBy::Title, SortDirection::Ascending),
        ];

        for (sort, order_by, direction) in cases {
            assert_eq!(sort.order_by(), order_by);
            assert_eq!(sort.sort_direction(), direction);
        }
    }

    #[test]
    fn test_sort_option_round_trip() {
        for sort in [SortOption::Newest, SortOption::Oldest, SortOption::Alphabetical] {
            assert_eq!(SortOption::from_str(sort.as_str()), Some(sort));
        }
        assert_eq!(SortOption::from_str("bogus"), None);
    }

    #[test]
    fn test_filters_changed_ignores_page() {
        let a = FilterDescriptor::default();
        let mut b = a.clone();
        b.page = 5;
        assert!(!a.filters_changed(&b));

        b.category_id = Some("kitchen".to_string());
        assert!(a.filters_changed(&b));
    }
}
