//! Tests for Drive URL classification and ID extraction.

use gsheet_ingest::url_parser::{
    classify, is_folder, is_spreadsheet, parse_folder_id, parse_spreadsheet_id, ResourceKind,
};
use gsheet_ingest::IngestError;

mod folder_urls {
    use super::*;

    #[test]
    fn basic_folder_url() {
        let url = "https://drive.google.com/drive/folders/1abc123XYZ-_def456";
        let reference = classify(url).unwrap();
        assert_eq!(reference.kind(), ResourceKind::Folder);
        assert_eq!(reference.id(), "1abc123XYZ-_def456");
        assert!(!is_spreadsheet(url));
    }

    #[test]
    fn folder_url_with_user() {
        let url = "https://drive.google.com/drive/u/1/folders/ABC123";
        assert_eq!(classify(url).unwrap().id(), "ABC123");
    }

    #[test]
    fn folder_url_with_query_params() {
        let url = "https://drive.google.com/drive/folders/ABC123?usp=sharing";
        assert_eq!(parse_folder_id(url).as_deref(), Some("ABC123"));
    }

    #[test]
    fn folder_url_with_trailing_slash() {
        let url = "https://drive.google.com/drive/folders/ABC123/";
        assert!(is_folder(url));
        assert_eq!(classify(url).unwrap().id(), "ABC123");
    }
}

mod spreadsheet_urls {
    use super::*;

    #[test]
    fn edit_url() {
        let url = "https://docs.google.com/spreadsheets/d/1BxiMVs0XRA5nFMdKvBdBZjgmUUqptlbs74OgvE2upms/edit#gid=0";
        let reference = classify(url).unwrap();
        assert_eq!(reference.kind(), ResourceKind::Spreadsheet);
        assert_eq!(reference.id(), "1BxiMVs0XRA5nFMdKvBdBZjgmUUqptlbs74OgvE2upms");
        assert_eq!(reference.url(), url);
    }

    #[test]
    fn bare_url() {
        let url = "https://docs.google.com/spreadsheets/d/S1";
        assert_eq!(parse_spreadsheet_id(url).as_deref(), Some("S1"));
        assert!(!is_folder(url));
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let reference = classify("  https://docs.google.com/spreadsheets/d/S1/edit \n").unwrap();
        assert_eq!(reference.id(), "S1");
        assert_eq!(reference.url(), "https://docs.google.com/spreadsheets/d/S1/edit");
    }
}

mod invalid_inputs {
    use super::*;

    #[test]
    fn empty_string() {
        assert!(matches!(classify(""), Err(IngestError::InvalidUrl(_))));
    }

    #[test]
    fn unrelated_url() {
        let err = classify("https://example.com/folder/123").unwrap_err();
        assert!(matches!(err, IngestError::InvalidUrl(_)));
        assert!(err.to_string().contains("https://example.com/folder/123"));
    }

    #[test]
    fn drive_file_url() {
        assert!(classify("https://drive.google.com/file/d/1abc123XYZ/view").is_err());
    }

    #[test]
    fn spreadsheet_segment_without_id() {
        assert!(parse_spreadsheet_id("https://docs.google.com/spreadsheets/").is_none());
        assert!(classify("https://docs.google.com/spreadsheets/").is_err());
    }

    #[test]
    fn folder_segment_without_id() {
        assert!(parse_folder_id("https://drive.google.com/drive/folders/").is_none());
        assert!(classify("https://drive.google.com/drive/folders/").is_err());
    }
}
