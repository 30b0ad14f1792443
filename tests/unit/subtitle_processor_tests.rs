/*!
 * Tests for subtitle parsing, serialization and manipulation
 */

use std::fmt::Write;
use subtrans::subtitle_processor::{SubtitleCollection, SubtitleEntry};
use crate::common;

/// Test timestamp parsing and formatting
#[test]
fn test_timestamp_parsing_withValidTimestamp_shouldParseAndFormat() {
    let ts = "01:23:45,678";
    let ms = SubtitleEntry::parse_timestamp(ts).unwrap();
    assert_eq!(ms, 5025678);

    let formatted = SubtitleEntry::format_timestamp(ms);
    assert_eq!(formatted, ts);
}

#[test]
fn test_timestamp_parsing_withInvalidTimestamp_shouldFail() {
    assert!(SubtitleEntry::parse_timestamp("not a timestamp").is_err());
    assert!(SubtitleEntry::parse_timestamp("00:99:00,000").is_err());
    assert!(SubtitleEntry::parse_timestamp("00:00:00").is_err());
}

/// Test subtitle entry display formatting
#[test]
fn test_subtitle_entry_display_withValidEntry_shouldFormatCorrectly() {
    let entry = SubtitleEntry::new(1, 5000, 10000, "Test subtitle".to_string());
    let mut output = String::new();
    write!(output, "{}", entry).unwrap();

    assert!(output.contains("1"));
    assert!(output.contains("00:00:05,000 --> 00:00:10,000"));
    assert!(output.contains("Test subtitle"));
}

#[test]
fn test_new_validated_withBadTimeRange_shouldFail() {
    assert!(SubtitleEntry::new_validated(1, 5000, 4000, "x".to_string()).is_err());
    // Equal start and end is allowed
    assert!(SubtitleEntry::new_validated(1, 5000, 5000, "x".to_string()).is_ok());
    // Empty text is rejected
    assert!(SubtitleEntry::new_validated(1, 0, 1000, "  ".to_string()).is_err());
}

#[test]
fn test_entry_lines_roundTrip_shouldPreserveLineStructure() {
    let mut entry = SubtitleEntry::new(1, 0, 1000, "First\nSecond".to_string());
    let lines = entry.lines();
    assert_eq!(lines, vec!["First".to_string(), "Second".to_string()]);

    entry.set_lines(&[String::from("One"), String::from("Two"), String::from("Three")]);
    assert_eq!(entry.text, "One\nTwo\nThree");
}

#[test]
fn test_parse_srt_string_withValidContent_shouldParseAllEntries() {
    let content = "1\n00:00:01,000 --> 00:00:04,000\nFirst cue\n\n2\n00:00:05,000 --> 00:00:09,000\nSecond cue\nwith two lines\n\n";
    let entries = SubtitleCollection::parse_srt_string(content).unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].text, "First cue");
    assert_eq!(entries[1].text, "Second cue\nwith two lines");
    assert_eq!(entries[1].start_time_ms, 5000);
}

#[test]
fn test_parse_srt_string_withBom_shouldStripIt() {
    let content = "\u{feff}1\n00:00:01,000 --> 00:00:02,000\nHello\n";
    let entries = SubtitleCollection::parse_srt_string(content).unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].text, "Hello");
}

/// File order is canonical: out-of-order cues are never re-sorted
#[test]
fn test_parse_srt_string_withOutOfOrderCues_shouldPreserveFileOrder() {
    let content = "1\n00:00:10,000 --> 00:00:12,000\nLater\n\n2\n00:00:01,000 --> 00:00:03,000\nEarlier\n";
    let entries = SubtitleCollection::parse_srt_string(content).unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].text, "Later");
    assert_eq!(entries[1].text, "Earlier");
}

#[test]
fn test_parse_srt_string_withMalformedEntry_shouldSkipIt() {
    // The second block has a broken timestamp line and is dropped
    let content = "1\n00:00:01,000 --> 00:00:02,000\nGood\n\n2\nbroken timestamp\nBad\n\n3\n00:00:05,000 --> 00:00:06,000\nAlso good\n";
    let entries = SubtitleCollection::parse_srt_string(content).unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].text, "Good");
    assert_eq!(entries[1].text, "Also good");
}

#[test]
fn test_parse_srt_string_withNoEntries_shouldFail() {
    assert!(SubtitleCollection::parse_srt_string("").is_err());
    assert!(SubtitleCollection::parse_srt_string("just some text\n").is_err());
}

#[test]
fn test_from_srt_file_withMissingFile_shouldReportReadFailure() {
    let temp_dir = common::create_temp_dir().unwrap();
    let missing = temp_dir.path().join("missing.srt");

    let error = SubtitleCollection::from_srt_file(&missing, "en").unwrap_err();
    assert!(error.to_string().contains("Failed to read subtitle file"));
}

#[test]
fn test_to_srt_string_shouldSerializeBackToSrt() {
    let collection = SubtitleCollection {
        source_file: "test.srt".into(),
        entries: vec![
            SubtitleEntry::new(1, 1000, 2000, "One".to_string()),
            SubtitleEntry::new(2, 3000, 4000, "Two".to_string()),
        ],
        source_language: "en".to_string(),
    };

    let srt = collection.to_srt_string();
    let reparsed = SubtitleCollection::parse_srt_string(&srt).unwrap();
    assert_eq!(reparsed.len(), 2);
    assert_eq!(reparsed[0].text, "One");
    assert_eq!(reparsed[1].end_time_ms, 4000);
}

#[test]
fn test_from_srt_file_withTestFile_shouldLoadEntries() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = common::create_test_subtitle(&temp_dir.path().to_path_buf(), "test.srt").unwrap();

    let collection = SubtitleCollection::from_srt_file(&path, "en").unwrap();
    assert_eq!(collection.entries.len(), 3);
    assert_eq!(collection.source_language, "en");
    assert_eq!(collection.entries[2].text, "For testing purposes.");
}

#[test]
fn test_write_to_srt_shouldRoundTripThroughDisk() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = temp_dir.path().join("out").join("written.srt");

    let collection = SubtitleCollection {
        source_file: path.clone(),
        entries: vec![SubtitleEntry::new(1, 0, 1500, "Written".to_string())],
        source_language: "en".to_string(),
    };
    collection.write_to_srt(&path).unwrap();

    let reloaded = SubtitleCollection::from_srt_file(&path, "en").unwrap();
    assert_eq!(reloaded.entries.len(), 1);
    assert_eq!(reloaded.entries[0].text, "Written");
}

/// Invalid UTF-8 degrades to replacement characters instead of aborting
#[test]
fn test_parse_srt_file_withInvalidUtf8_shouldStillParse() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = temp_dir.path().join("latin1.srt");
    let mut bytes = b"1\n00:00:01,000 --> 00:00:02,000\ncaf".to_vec();
    bytes.push(0xE9); // 'e' acute in Latin-1, invalid as UTF-8
    bytes.extend_from_slice(b"\n");
    std::fs::write(&path, bytes).unwrap();

    let entries = SubtitleCollection::parse_srt_file(&path).unwrap();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].text.starts_with("caf"));
}
