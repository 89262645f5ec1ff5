/*!
 * Tests for the events model
 */

use asstools::document::Document;
use asstools::errors::{AssError, DiagnosticKind};
use asstools::events::EventsModel;
use crate::common;

/// Events are read in file order with fields named by the Format line
#[test]
fn test_fromDocument_withBilingualScript_shouldReadAllEvents() {
    let doc = Document::parse(common::BILINGUAL_ASS).unwrap();
    let model = EventsModel::from_document(&doc, "ep05.ass").unwrap();

    assert_eq!(model.records.len(), 5);
    assert!(model.diagnostics.is_empty());
    assert_eq!(model.formats[0].len(), 10);

    let first = &model.records[0];
    assert_eq!(first.keyword(), "Dialogue");
    assert_eq!(first.get("Style"), Some("中文字幕"));
    assert_eq!(first.get("Start"), Some("0:00:01.00"));
    assert_eq!(first.text(), "{\\fad(200,200)}你好，世界");

    assert_eq!(model.records[1].text(), "{\\i1}Hello{\\i0}, world");
    assert_eq!(model.records[2].keyword(), "Comment");
}

/// A short event line is dropped with a FieldCountMismatch warning
#[test]
fn test_fromDocument_withShortEventLine_shouldDropAndWarn() {
    let text = common::events_script(
        "Layer,Style,Start,End,Text",
        &["Dialogue: 0,A,0:00:01.00,0:00:02.00,ok", "Dialogue: 0,A,0:00:03.00", "Dialogue: 0,B,0:00:04.00,0:00:05.00,also ok"],
    );
    let doc = Document::parse(&text).unwrap();
    let model = EventsModel::from_document(&doc, "short.ass").unwrap();

    assert_eq!(model.records.len(), 2);
    assert_eq!(model.diagnostics.len(), 1);
    assert_eq!(model.diagnostics[0].kind, DiagnosticKind::FieldCountMismatch);
    assert_eq!(model.diagnostics[0].file_context, "short.ass");
}

/// An events section without a Format line cannot be read
#[test]
fn test_fromDocument_withoutFormatLine_shouldFail() {
    let doc = Document::parse("[Events]\n; nothing here\n").unwrap();
    let err = EventsModel::from_document(&doc, "x").unwrap_err();
    assert!(matches!(err, AssError::FormatLineMissing { .. }));
}

/// Only the first Format line counts
#[test]
fn test_fromDocument_withRepeatedFormat_shouldUseFirst() {
    let text = "[Events]\nFormat: Style, Text\nFormat: Text\nDialogue: A,hi, there\n";
    let doc = Document::parse(text).unwrap();
    let model = EventsModel::from_document(&doc, "x").unwrap();
    assert_eq!(model.records[0].get("Style"), Some("A"));
    assert_eq!(model.records[0].text(), "hi, there");
}

/// Unknown keys produce a warning, comments and blank lines are ignored
#[test]
fn test_fromDocument_withUnknownKey_shouldWarn() {
    let text = "[Events]\nFormat: Style, Text\n\n; comment\nKaraoke: A,x\nDialogue: A,y\n";
    let doc = Document::parse(text).unwrap();
    let model = EventsModel::from_document(&doc, "x").unwrap();
    assert_eq!(model.records.len(), 1);
    assert_eq!(model.diagnostics[0].kind, DiagnosticKind::UnknownEventLine);
}

/// A script without an events section yields a NoEvents warning
#[test]
fn test_fromDocument_withoutEvents_shouldReportNoEvents() {
    let doc = Document::parse("[Script Info]\nTitle: x\n").unwrap();
    let model = EventsModel::from_document(&doc, "x").unwrap();
    assert!(model.records.is_empty());
    assert_eq!(model.diagnostics[0].kind, DiagnosticKind::NoEvents);
}
