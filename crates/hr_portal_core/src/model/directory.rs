//! Staff directory filter preferences stored under `directory.filters.v2`.

use serde::{Deserialize, Serialize};

/// Wildcard value for the dept/type/status selectors.
pub const ALL: &str = "All";

pub const EMPLOYMENT_TYPES: &[&str] = &[ALL, "Faculty", "Staff", "Student", "Postdoc", "Temp"];
pub const PERSON_STATUSES: &[&str] = &[ALL, "Active", "On Leave", "Terminated"];
pub const PAGE_SIZES: &[usize] = &[10, 25, 50];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DirectoryFilters {
    pub search: String,
    pub employment_type: String,
    pub status: String,
    pub dept: String,
    /// `<key>-<asc|desc>`; unknown keys sort by name.
    pub sort: String,
    /// 1-based.
    pub page: usize,
    pub page_size: usize,
}

impl Default for DirectoryFilters {
    fn default() -> Self {
        Self {
            search: String::new(),
            employment_type: ALL.to_string(),
            status: ALL.to_string(),
            dept: ALL.to_string(),
            sort: "name-asc".to_string(),
            page: 1,
            page_size: 25,
        }
    }
}

impl DirectoryFilters {
    /// Splits `sort` into `(key, descending)`.
    pub fn sort_parts(&self) -> (&str, bool) {
        match self.sort.rsplit_once('-') {
            Some((key, dir)) => (key, dir == "desc"),
            None => (self.sort.as_str(), false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DirectoryFilters;

    #[test]
    fn partial_document_fills_defaults() {
        let filters: DirectoryFilters =
            serde_json::from_str(r#"{"search":"lab","pageSize":10}"#).expect("partial filters");
        assert_eq!(filters.search, "lab");
        assert_eq!(filters.page_size, 10);
        assert_eq!(filters.page, 1);
        assert_eq!(filters.sort_parts(), ("name", false));
    }

    #[test]
    fn sort_parts_reads_direction() {
        let filters = DirectoryFilters {
            sort: "startDate-desc".to_string(),
            ..DirectoryFilters::default()
        };
        assert_eq!(filters.sort_parts(), ("startDate", true));
    }
}
