//! Finding the spreadsheets inside a Drive folder.

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use tracing::debug;

use crate::error::Result;
use crate::models::FileMetadata;
use crate::policy::HandlingPolicy;

/// Lists the direct children of a Drive folder.
#[async_trait]
pub trait FolderListing: Send + Sync {
    async fn list_folder(&self, folder_id: &str) -> Result<Vec<FileMetadata>>;
}

/// IDs of the spreadsheets in a folder, in listing order.
///
/// Sub-folders are descended into depth first when `recursive` is set and
/// skipped otherwise. Spreadsheets whose names the policy ignores are left
/// out; other file types are skipped.
pub async fn list_spreadsheets_in_folder<L>(
    drive: &L,
    folder_id: &str,
    recursive: bool,
    policy: &dyn HandlingPolicy,
) -> Result<Vec<String>>
where
    L: FolderListing + ?Sized,
{
    let mut spreadsheet_ids = Vec::new();
    collect(drive, folder_id.to_string(), recursive, policy, &mut spreadsheet_ids).await?;
    Ok(spreadsheet_ids)
}

// Drive folders form a tree, so the recursion needs no visited set.
fn collect<'a, L>(
    drive: &'a L,
    folder_id: String,
    recursive: bool,
    policy: &'a dyn HandlingPolicy,
    found: &'a mut Vec<String>,
) -> BoxFuture<'a, Result<()>>
where
    L: FolderListing + ?Sized,
{
    async move {
        let entries = drive.list_folder(&folder_id).await?;
        debug!(folder_id = %folder_id, entries = entries.len(), "Listed folder");

        for entry in entries {
            if entry.is_folder() {
                if recursive {
                    collect(drive, entry.id, recursive, policy, &mut *found).await?;
                } else {
                    debug!(name = %entry.name, "Skipping sub-folder (not recursive)");
                }
            } else if entry.is_spreadsheet() {
                if policy.is_file_name_ignored(&entry.name) {
                    debug!(name = %entry.name, "Ignoring private spreadsheet");
                } else {
                    found.push(entry.id);
                }
            }
        }

        Ok(())
    }
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MIME_TYPE_DRIVE_FOLDER, MIME_TYPE_GOOGLE_SPREADSHEET};
    use crate::policy::DefaultHandlingPolicy;
    use std::collections::HashMap;

    struct FakeDrive(HashMap<&'static str, Vec<FileMetadata>>);

    #[async_trait]
    impl FolderListing for FakeDrive {
        async fn list_folder(&self, folder_id: &str) -> Result<Vec<FileMetadata>> {
            Ok(self.0.get(folder_id).cloned().unwrap_or_default())
        }
    }

    fn entry(id: &str, name: &str, mime: &str) -> FileMetadata {
        FileMetadata {
            id: id.to_string(),
            name: name.to_string(),
            mime_type: Some(mime.to_string()),
        }
    }

    fn drive() -> FakeDrive {
        let mut folders = HashMap::new();
        folders.insert(
            "root",
            vec![
                entry("sub", "Sub", MIME_TYPE_DRIVE_FOLDER),
                entry("s1", "Products", MIME_TYPE_GOOGLE_SPREADSHEET),
                entry("s2", "Drafts_", MIME_TYPE_GOOGLE_SPREADSHEET),
                entry("pdf", "Manual.pdf", "application/pdf"),
            ],
        );
        folders.insert(
            "sub",
            vec![
                entry("s3", "Inventory", MIME_TYPE_GOOGLE_SPREADSHEET),
                entry("deeper", "Deeper", MIME_TYPE_DRIVE_FOLDER),
            ],
        );
        folders.insert(
            "deeper",
            vec![entry("s4", "Prices", MIME_TYPE_GOOGLE_SPREADSHEET)],
        );
        FakeDrive(folders)
    }

    #[tokio::test]
    async fn test_non_recursive_skips_sub_folders() {
        let policy = DefaultHandlingPolicy::default();
        let ids = list_spreadsheets_in_folder(&drive(), "root", false, &policy)
            .await
            .unwrap();
        assert_eq!(ids, vec!["s1"]);
    }

    #[tokio::test]
    async fn test_recursive_is_depth_first_in_listing_order() {
        let policy = DefaultHandlingPolicy::default();
        let ids = list_spreadsheets_in_folder(&drive(), "root", true, &policy)
            .await
            .unwrap();
        assert_eq!(ids, vec!["s3", "s4", "s1"]);
    }

    #[tokio::test]
    async fn test_empty_folder() {
        let policy = DefaultHandlingPolicy::default();
        let ids = list_spreadsheets_in_folder(&drive(), "nothing-here", true, &policy)
            .await
            .unwrap();
        assert!(ids.is_empty());
    }
}
