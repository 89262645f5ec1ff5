/*!
 * Common test utilities for the asstools test suite
 */

use std::fs;
use std::path::{Path, PathBuf};
use anyhow::Result;
use tempfile::TempDir;

/// A small bilingual script as produced by Aegisub
pub const BILINGUAL_ASS: &str = "[Script Info]\r
; Script generated by Aegisub 3.2.2\r
Title: Episode 5\r
ScriptType: v4.00+\r
\r
[V4+ Styles]\r
Format: Name, Fontname, Fontsize\r
Style: 中文字幕,Microsoft YaHei,20\r
Style: 英文字幕,Arial,14\r
\r
[Aegisub Project Garbage]\r
Video File: ep05.mkv\r
\r
[Events]\r
Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\r
Dialogue: 0,0:00:01.00,0:00:03.00,中文字幕,,0,0,0,,{\\fad(200,200)}你好，世界\r
Dialogue: 0,0:00:01.00,0:00:03.00,英文字幕,,0,0,0,,{\\i1}Hello{\\i0}, world\r
Comment: 0,0:00:04.00,0:00:05.00,Default,,0,0,0,,note to self\r
Dialogue: 0,0:00:06.00,0:00:08.00,中文字幕,,0,0,0,,第二行\\N换行\r
Dialogue: 0,0:00:06.00,0:00:08.00,英文字幕,,0,0,0,,Second line\\Nbreak\r
";

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &[u8]) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Creates the bilingual sample script in the given directory
pub fn create_test_ass(dir: &Path, filename: &str) -> Result<PathBuf> {
    create_test_file(dir, filename, BILINGUAL_ASS.as_bytes())
}

/// Builds an `[Events]` script from a format line and event lines
pub fn events_script(format: &str, events: &[&str]) -> String {
    let mut text = String::from("[Script Info]\nTitle: test\n\n[Events]\n");
    text.push_str("Format: ");
    text.push_str(format);
    text.push('\n');
    for event in events {
        text.push_str(event);
        text.push('\n');
    }
    text
}
