/*!
 * Integration tests for the per-file pipeline: bytes in, encoded buffers out
 */

use std::collections::HashSet;

use asstools::errors::{AssError, DiagnosticKind};
use asstools::export::{ExportOptions, Exporter, FilterRules};
use asstools::pipeline::{self, FileState};
use asstools::text_reader::{self, OutputEncoding};
use encoding_rs::GB18030;
use crate::common;

fn bilingual_exporter(keep_source_encoding: bool) -> Exporter {
    Exporter::new(ExportOptions {
        field_name: "Style".to_string(),
        rules: FilterRules::new(
            &["中文字幕".to_string(), "英文字幕".to_string()],
            &["_CN".to_string(), "_EN".to_string()],
        ),
        keep_source_encoding,
        ..Default::default()
    })
}

fn garbage() -> HashSet<String> {
    ["[Aegisub Project Garbage]".to_string()].into_iter().collect()
}

#[test]
fn test_exportText_withDefaults_shouldProduceUtf8Lf() {
    let source = text_reader::decode(common::BILINGUAL_ASS.as_bytes()).unwrap();
    let outcome = pipeline::export_text(&source, "ep05", "ep05.ass", &bilingual_exporter(false)).unwrap();

    assert_eq!(outcome.encoding, OutputEncoding::Utf8);
    assert_eq!(outcome.state, FileState::Rendered);
    assert_eq!(outcome.files.len(), 2);
    assert_eq!(outcome.files[0].file_name, "ep05_CN.txt");
    assert_eq!(outcome.files[0].bytes, "你好，世界\n第二行\\N换行\n".as_bytes());
    assert_eq!(outcome.files[1].record_count, 2);
    assert!(outcome.diagnostics.is_empty());
}

/// A GB18030 source re-encoded to GB18030 with CRLF
#[test]
fn test_exportText_withKeepSourceEncoding_shouldUseSourceCodecAndCrLf() {
    let (bytes, _, _) = GB18030.encode(common::BILINGUAL_ASS);
    let source = text_reader::decode(&bytes).unwrap();
    assert_eq!(source.encoding.encoding(), GB18030);

    let outcome = pipeline::export_text(&source, "ep05", "ep05.ass", &bilingual_exporter(true)).unwrap();
    let (expected, _, _) = GB18030.encode("你好，世界\r\n第二行\\N换行\r\n");
    assert_eq!(outcome.files[0].bytes, expected.into_owned());
}

#[test]
fn test_exportText_withContentBeforeHeader_shouldFail() {
    let source = text_reader::decode(b"oops\n[Events]\nFormat: Text\n").unwrap();
    let err = pipeline::export_text(&source, "x", "x.ass", &bilingual_exporter(false)).unwrap_err();
    assert_eq!(err, AssError::ContentBeforeFirstSection { line: 1 });
}

#[test]
fn test_exportText_withoutEvents_shouldWarnAndWriteNothing() {
    let source = text_reader::decode(b"[Script Info]\nTitle: x\n").unwrap();
    let outcome = pipeline::export_text(&source, "x", "x.ass", &bilingual_exporter(false)).unwrap();
    assert!(outcome.files.is_empty());
    assert!(outcome.diagnostics.iter().any(|d| d.kind == DiagnosticKind::NoEvents));
}

/// Deletion normalises line endings to LF by default
#[test]
fn test_deleteText_withDefaults_shouldRemoveSectionAndUseLf() {
    let source = text_reader::decode(common::BILINGUAL_ASS.as_bytes()).unwrap();
    let outcome = pipeline::delete_text(&source, &garbage(), false, "ep05.ass").unwrap();

    assert_eq!(outcome.removed_sections, 1);
    assert!(!outcome.text.contains("Aegisub Project Garbage"));
    assert!(!outcome.text.contains('\r'));
    let expected = common::BILINGUAL_ASS
        .replace("[Aegisub Project Garbage]\r\nVideo File: ep05.mkv\r\n\r\n", "")
        .replace("\r\n", "\n");
    assert_eq!(outcome.text, expected);
    assert_eq!(outcome.bytes, expected.as_bytes());
}

/// With the source encoding kept, every retained byte is unchanged
#[test]
fn test_deleteText_withKeepSourceEncoding_shouldBeLossless() {
    let mut bytes = b"\xEF\xBB\xBF".to_vec();
    bytes.extend_from_slice(common::BILINGUAL_ASS.as_bytes());
    let source = text_reader::decode(&bytes).unwrap();

    let outcome = pipeline::delete_text(&source, &garbage(), true, "ep05.ass").unwrap();
    let mut expected = b"\xEF\xBB\xBF".to_vec();
    expected.extend_from_slice(
        common::BILINGUAL_ASS
            .replace("[Aegisub Project Garbage]\r\nVideo File: ep05.mkv\r\n\r\n", "")
            .as_bytes(),
    );
    assert_eq!(outcome.bytes, expected);
    assert!(outcome.newline.is_none());
}

/// Deleting nothing reproduces the input
#[test]
fn test_deleteText_withNoMatch_shouldRoundTrip() {
    let source = text_reader::decode(common::BILINGUAL_ASS.as_bytes()).unwrap();
    let names: HashSet<String> = ["[Fonts]".to_string()].into_iter().collect();
    let outcome = pipeline::delete_text(&source, &names, true, "ep05.ass").unwrap();
    assert_eq!(outcome.removed_sections, 0);
    assert_eq!(outcome.bytes, common::BILINGUAL_ASS.as_bytes());
}
