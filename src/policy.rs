//! Rules for which files and tabs to read and how to spot header rows.

/// Default column limit when reading a tab.
pub const DEFAULT_COLUMN_RANGE_LIMIT: &str = "ZZ";

/// Caller-supplied rules applied while scanning folders and reading tabs.
pub trait HandlingPolicy: Send + Sync {
    /// Last column (A1 notation) fetched from each tab.
    fn column_range_limit(&self) -> &str {
        DEFAULT_COLUMN_RANGE_LIMIT
    }

    /// Whether a Drive file should be skipped.
    fn is_file_name_ignored(&self, full_name: &str) -> bool;

    /// Whether a spreadsheet tab should be skipped.
    fn is_tab_name_ignored(&self, title: &str) -> bool;

    /// Whether `row` looks like the header row of a tab.
    fn is_headings_row(&self, row: Option<&[String]>) -> bool;
}

/// Files named `foo_` or `foo_.xlsx` are private by convention.
pub fn is_private_file_name(full_name: &str) -> bool {
    let without_extension = full_name.split('.').next().unwrap_or(full_name);
    full_name.ends_with('_') || without_extension.ends_with('_')
}

/// Tabs named `foo_` are private by convention.
pub fn is_private_tab_name(title: &str) -> bool {
    title.ends_with('_')
}

/// The stock policy: skips private files and tabs, reads up to column `ZZ`,
/// and accepts a row as the header row when every targeted heading appears in
/// it. Extra columns are allowed.
#[derive(Debug, Clone, Default)]
pub struct DefaultHandlingPolicy {
    targeted_headings: Vec<String>,
}

impl DefaultHandlingPolicy {
    pub fn new<I, S>(targeted_headings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            targeted_headings: targeted_headings.into_iter().map(Into::into).collect(),
        }
    }

    pub fn targeted_headings(&self) -> &[String] {
        &self.targeted_headings
    }
}

impl HandlingPolicy for DefaultHandlingPolicy {
    fn is_file_name_ignored(&self, full_name: &str) -> bool {
        is_private_file_name(full_name)
    }

    fn is_tab_name_ignored(&self, title: &str) -> bool {
        is_private_tab_name(title)
    }

    fn is_headings_row(&self, row: Option<&[String]>) -> bool {
        let row = match row {
            Some(row) if !row.is_empty() => row,
            _ => return false,
        };

        self.targeted_headings
            .iter()
            .all(|heading| row.iter().any(|cell| cell == heading.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_file_name_ignored() {
        let policy = DefaultHandlingPolicy::default();
        assert!(policy.is_file_name_ignored("foo_"));
        assert!(policy.is_file_name_ignored("foo_.xlsx"));
        assert!(policy.is_file_name_ignored("foo__"));
        assert!(!policy.is_file_name_ignored("foo.xlsx"));
        assert!(!policy.is_file_name_ignored("foo"));
        assert!(!policy.is_file_name_ignored(""));
    }

    #[test]
    fn test_tab_name_ignored() {
        let policy = DefaultHandlingPolicy::default();
        assert!(policy.is_tab_name_ignored("bar_"));
        assert!(!policy.is_tab_name_ignored("bar"));
        assert!(!policy.is_tab_name_ignored("_bar"));
    }

    #[test]
    fn test_column_range_limit_default() {
        assert_eq!(DefaultHandlingPolicy::default().column_range_limit(), "ZZ");
    }

    #[test]
    fn test_headings_row_allows_extra_columns() {
        let policy = DefaultHandlingPolicy::new(["A", "B"]);
        assert!(policy.is_headings_row(Some(row(&["A", "B", "C"]).as_slice())));
        assert!(policy.is_headings_row(Some(row(&["C", "B", "A"]).as_slice())));
    }

    #[test]
    fn test_headings_row_missing_heading() {
        let policy = DefaultHandlingPolicy::new(["A", "D"]);
        assert!(!policy.is_headings_row(Some(row(&["A", "B", "C"]).as_slice())));
    }

    #[test]
    fn test_headings_row_empty_or_missing() {
        let policy = DefaultHandlingPolicy::new(["A"]);
        assert!(!policy.is_headings_row(None));
        assert!(!policy.is_headings_row(Some(Vec::new().as_slice())));
    }

    #[test]
    fn test_headings_are_trimmed_and_case_sensitive() {
        let policy = DefaultHandlingPolicy::new([" Name "]);
        assert!(policy.is_headings_row(Some(row(&["Name"]).as_slice())));
        assert!(!policy.is_headings_row(Some(row(&["name"]).as_slice())));
    }
}
