/*!
 * Per-file processing pipeline.
 *
 * Takes the decoded text of one subtitle file and produces fully encoded
 * output buffers. Nothing here touches the filesystem; every output is built
 * completely in memory so the caller can write it in one go.
 *
 * A file moves through `Idle → Parsed → Grouped → Rendered` here and reaches
 * `Written` once the caller has stored the buffers. Fatal errors stop the
 * file at the state it had reached.
 */

use std::collections::HashSet;
use std::fmt;

use log::debug;

use crate::document::{Document, Newline};
use crate::errors::{AssError, Diagnostic, DiagnosticKind};
use crate::events::EventsModel;
use crate::export::Exporter;
use crate::section_filter;
use crate::text_reader::{self, DecodedText, OutputEncoding};

/// Processing state of one input file
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FileState {
    Idle,
    Parsed,
    Grouped,
    Rendered,
    Written,
}

impl FileState {
    /// Move forward to `next`; states never go backwards.
    pub fn advance(&mut self, next: FileState, file_context: &str) {
        if next <= *self {
            debug!("{}: ignoring transition {} -> {}", file_context, self, next);
            return;
        }
        debug!("{}: {} -> {}", file_context, self, next);
        *self = next;
    }
}

impl fmt::Display for FileState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "Idle",
            Self::Parsed => "Parsed",
            Self::Grouped => "Grouped",
            Self::Rendered => "Rendered",
            Self::Written => "Written",
        };
        f.write_str(name)
    }
}

/// One encoded file ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub record_count: usize,
}

/// Result of exporting one input file
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub files: Vec<OutputFile>,
    pub encoding: OutputEncoding,
    pub diagnostics: Vec<Diagnostic>,
    pub state: FileState,
}

/// Result of deleting sections from one input file
#[derive(Debug, Clone)]
pub struct DeleteOutcome {
    /// Serialized document before encoding
    pub text: String,
    pub bytes: Vec<u8>,
    pub encoding: OutputEncoding,
    /// `None` when the source line endings were kept
    pub newline: Option<Newline>,
    pub removed_sections: usize,
    pub diagnostics: Vec<Diagnostic>,
    pub state: FileState,
}

/// Pick the output encoding for a source file.
pub fn output_encoding(source: &DecodedText, keep_source_encoding: bool) -> OutputEncoding {
    if keep_source_encoding {
        OutputEncoding::Source(source.encoding)
    } else {
        OutputEncoding::Utf8
    }
}

/// Parse, group, render and encode the events of one file.
pub fn export_text(
    source: &DecodedText,
    base_name: &str,
    file_context: &str,
    exporter: &Exporter,
) -> Result<ExportOutcome, AssError> {
    let mut state = FileState::Idle;

    let doc = Document::parse(&source.text)?;
    let model = EventsModel::from_document(&doc, file_context)?;
    state.advance(FileState::Parsed, file_context);

    let result = exporter.export(&model, base_name, file_context)?;
    state.advance(FileState::Grouped, file_context);

    let encoding = output_encoding(source, exporter.options().keep_source_encoding);
    let mut diagnostics = result.diagnostics;
    let files = result
        .outputs
        .into_iter()
        .map(|output| {
            let encoded = text_reader::encode(&output.text, encoding);
            if encoded.had_unmappable {
                diagnostics.push(unmappable(file_context, &output.file_name, encoding));
            }
            OutputFile {
                file_name: output.file_name,
                bytes: encoded.bytes,
                record_count: output.record_count,
            }
        })
        .collect();
    state.advance(FileState::Rendered, file_context);

    Ok(ExportOutcome {
        files,
        encoding,
        diagnostics,
        state,
    })
}

/// Remove the named sections from one file and encode the result.
///
/// By default the output is UTF-8 with LF line endings. When the source
/// encoding is kept, the source line endings are kept too.
pub fn delete_text(
    source: &DecodedText,
    names: &HashSet<String>,
    keep_source_encoding: bool,
    file_context: &str,
) -> Result<DeleteOutcome, AssError> {
    let mut state = FileState::Idle;

    let doc = Document::parse(&source.text)?;
    state.advance(FileState::Parsed, file_context);

    let retained = section_filter::delete_sections(&doc, names);
    let removed_sections = doc.sections().len() - retained.sections().len();
    state.advance(FileState::Grouped, file_context);

    let newline = (!keep_source_encoding).then_some(Newline::Lf);
    let text = match newline {
        Some(newline) => retained.serialize_with(newline),
        None => retained.serialize(),
    };

    let encoding = output_encoding(source, keep_source_encoding);
    let encoded = text_reader::encode(&text, encoding);
    let mut diagnostics = Vec::new();
    if encoded.had_unmappable {
        diagnostics.push(unmappable(file_context, file_context, encoding));
    }
    state.advance(FileState::Rendered, file_context);

    Ok(DeleteOutcome {
        text,
        bytes: encoded.bytes,
        encoding,
        newline,
        removed_sections,
        diagnostics,
        state,
    })
}

fn unmappable(file_context: &str, target: &str, encoding: OutputEncoding) -> Diagnostic {
    Diagnostic::new(
        DiagnosticKind::UnmappableCharacters,
        file_context,
        format!("{}: characters not representable in {} were replaced", target, encoding.name()),
    )
}
