/*!
 * Events model: field-valued records read from `[Events]` sections.
 *
 * The first `Format:` line of a section names the fields. Each event line is
 * split on commas for all but the last field, so the last field (normally
 * `Text`) keeps any commas it contains.
 */

use log::debug;

use crate::document::{Document, LineKind, Section};
use crate::errors::{AssError, Diagnostic, DiagnosticKind};

/// Line keywords that introduce an event
pub const EVENT_KEYWORDS: [&str; 6] = ["Dialogue", "Comment", "Picture", "Sound", "Movie", "Command"];

/// Name of the field holding the spoken text
pub const TEXT_FIELD: &str = "Text";

/// Ordered field names declared by a `Format:` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSpec {
    fields: Vec<String>,
}

impl FormatSpec {
    /// Parse the value of a `Format:` line.
    pub fn parse(value: &str) -> Self {
        let fields = value
            .trim()
            .split(',')
            .map(|field| field.trim().to_string())
            .collect();
        Self { fields }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f == name)
    }
}

/// One event line mapped onto its format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    keyword: String,
    fields: Vec<(String, String)>,
}

impl EventRecord {
    /// Split an event value according to `format`.
    ///
    /// Returns `None` when the value has fewer than `format.len() - 1`
    /// separators.
    pub fn parse(keyword: &str, value: &str, format: &FormatSpec) -> Option<Self> {
        let expected = format.len().max(1);
        let values: Vec<&str> = value.splitn(expected, ',').collect();
        if values.len() < expected {
            return None;
        }

        let fields = format
            .fields()
            .iter()
            .zip(values)
            .map(|(name, value)| (name.clone(), value.to_string()))
            .collect();

        Some(Self {
            keyword: keyword.to_string(),
            fields,
        })
    }

    /// Event type, e.g. `Dialogue` or `Comment`
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    /// The `Text` field, or the last field when no field carries that name
    pub fn text(&self) -> &str {
        self.get(TEXT_FIELD)
            .or_else(|| self.fields.last().map(|(_, value)| value.as_str()))
            .unwrap_or_default()
    }

    /// Every field except the text field, in format order
    pub fn non_text_fields(&self) -> impl Iterator<Item = &(String, String)> {
        let text_index = self
            .fields
            .iter()
            .position(|(name, _)| name == TEXT_FIELD)
            .unwrap_or(self.fields.len().saturating_sub(1));
        self.fields
            .iter()
            .enumerate()
            .filter(move |(index, _)| *index != text_index)
            .map(|(_, field)| field)
    }
}

/// All events of a document, plus the warnings raised while reading them
#[derive(Debug, Clone, Default)]
pub struct EventsModel {
    pub formats: Vec<FormatSpec>,
    pub records: Vec<EventRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

impl EventsModel {
    /// Read every `[Events]` section of a document, in file order.
    pub fn from_document(doc: &Document, file_context: &str) -> Result<Self, AssError> {
        let mut model = Self::default();

        for section in doc.sections().iter().filter(|s| s.is_events()) {
            let (format, records, diagnostics) = Self::from_section(section, file_context)?;
            model.formats.push(format);
            model.records.extend(records);
            model.diagnostics.extend(diagnostics);
        }

        if model.records.is_empty() {
            model.diagnostics.push(Diagnostic::new(
                DiagnosticKind::NoEvents,
                file_context,
                "no event lines found",
            ));
        }

        Ok(model)
    }

    /// Read a single events section.
    pub fn from_section(
        section: &Section,
        file_context: &str,
    ) -> Result<(FormatSpec, Vec<EventRecord>, Vec<Diagnostic>), AssError> {
        let mut format: Option<FormatSpec> = None;
        let mut records = Vec::new();
        let mut diagnostics = Vec::new();

        for (index, line) in section.lines.iter().enumerate() {
            let (key, value) = match line.kind() {
                LineKind::KeyValue { key, value } => (key, value),
                LineKind::Text(_) => continue,
            };

            if key == "Format" {
                if format.is_none() {
                    format = Some(FormatSpec::parse(value));
                } else {
                    debug!("Ignoring repeated Format line in {}", section.name());
                }
                continue;
            }

            if !EVENT_KEYWORDS.contains(&key) {
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::UnknownEventLine,
                    file_context,
                    format!("{} line {}: unknown event type '{}'", section.name(), index + 1, key),
                ));
                continue;
            }

            let spec = format.as_ref().ok_or_else(|| AssError::FormatLineMissing {
                section: section.name().to_string(),
            })?;

            match EventRecord::parse(key, value, spec) {
                Some(record) => records.push(record),
                None => diagnostics.push(Diagnostic::new(
                    DiagnosticKind::FieldCountMismatch,
                    file_context,
                    format!(
                        "{} line {}: expected {} fields, found {}; event dropped",
                        section.name(),
                        index + 1,
                        spec.len(),
                        value.split(',').count()
                    ),
                )),
            }
        }

        let format = format.ok_or_else(|| AssError::FormatLineMissing {
            section: section.name().to_string(),
        })?;

        debug!("Read {} event(s) from {}", records.len(), section.name());
        Ok((format, records, diagnostics))
    }
}
