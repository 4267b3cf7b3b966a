//! Reading the tabs of a spreadsheet.

use async_trait::async_trait;
use tracing::debug;

use crate::error::Result;
use crate::policy::HandlingPolicy;

/// Read access to spreadsheet tabs and cell ranges.
#[async_trait]
pub trait SpreadsheetSource: Send + Sync {
    /// Tab titles in display order.
    async fn tab_titles(&self, spreadsheet_id: &str) -> Result<Vec<String>>;

    /// Cell values of an A1-notation range.
    async fn read_range(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<Vec<String>>>;
}

/// The raw contents of one spreadsheet tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRecord {
    pub spreadsheet_id: String,
    pub tab_name: String,
    pub rows: Vec<Vec<String>>,
    /// Index into `rows` of the first row the policy accepted as headings,
    /// `None` when no row qualified.
    pub header_row: Option<usize>,
}

impl SheetRecord {
    pub fn headings(&self) -> Option<&[String]> {
        self.header_row
            .and_then(|i| self.rows.get(i))
            .map(Vec::as_slice)
    }

    /// Rows after the header row; empty when there is no header row.
    pub fn data_rows(&self) -> &[Vec<String>] {
        self.header_row
            .and_then(|i| self.rows.get(i.saturating_add(1)..))
            .unwrap_or(&[])
    }
}

/// A1 range covering every row of `tab_name` up to `column_limit`.
pub fn tab_range(tab_name: &str, column_limit: &str) -> String {
    format!("'{}'!A1:{}", tab_name.replace('\'', "''"), column_limit)
}

/// Index of the first row the policy accepts as the header row.
pub fn find_header_row(rows: &[Vec<String>], policy: &dyn HandlingPolicy) -> Option<usize> {
    rows.iter()
        .position(|row| policy.is_headings_row(Some(row.as_slice())))
}

/// Read every tab of a spreadsheet that the policy doesn't ignore.
pub async fn read_spreadsheet<S>(
    source: &S,
    spreadsheet_id: &str,
    policy: &dyn HandlingPolicy,
) -> Result<Vec<SheetRecord>>
where
    S: SpreadsheetSource + ?Sized,
{
    let titles = source.tab_titles(spreadsheet_id).await?;
    let mut records = Vec::with_capacity(titles.len());

    for title in titles {
        if policy.is_tab_name_ignored(&title) {
            debug!(spreadsheet_id, tab = %title, "Ignoring private tab");
            continue;
        }

        let range = tab_range(&title, policy.column_range_limit());
        let rows = source.read_range(spreadsheet_id, &range).await?;
        let header_row = find_header_row(&rows, policy);
        if header_row.is_none() {
            debug!(spreadsheet_id, tab = %title, "No header row found");
        }

        records.push(SheetRecord {
            spreadsheet_id: spreadsheet_id.to_string(),
            tab_name: title,
            rows,
            header_row,
        });
    }

    debug!(spreadsheet_id, tabs = records.len(), "Read spreadsheet");
    Ok(records)
}
