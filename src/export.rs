/*!
 * Event export: splitting events into plain-text files.
 *
 * Events are grouped by the content of one field (usually `Style`). Each
 * group becomes one text file holding the text of its events, one line per
 * event, optionally preceded by a custom header line.
 *
 * Grouping follows a list of `FilterRule`s built once per export run. With an
 * empty filter every distinct field value forms its own group, in order of
 * first appearance.
 */

use std::collections::{HashMap, HashSet};

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::document::Newline;
use crate::errors::{AssError, Diagnostic, DiagnosticKind};
use crate::events::{EventRecord, EventsModel};
use crate::override_tags;

static DIGITS_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("Invalid digits regex"));

/// Name tail appended to groups that hold everything but the text
pub const TEXT_EXCLUDED_TAIL: &str = "_t";

/// Extension of exported files
pub const EXPORT_EXTENSION: &str = "txt";

/// Selects the events whose grouping field equals `match_value`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRule {
    pub match_value: String,
    pub output_tail: String,
}

impl FilterRule {
    pub fn new(match_value: &str, output_tail: &str) -> Self {
        Self {
            match_value: match_value.to_string(),
            output_tail: output_tail.to_string(),
        }
    }
}

/// The complete, immutable set of rules for one export run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRules {
    rules: Vec<FilterRule>,
    arity_mismatch: Option<(usize, usize)>,
    tails_from_values: bool,
}

impl FilterRules {
    /// Pair filter values with name tails by position.
    ///
    /// When fewer tails than filter values are given, every rule derives its
    /// tail from its own match value instead, groups follow the file order of
    /// their first event, and the mismatch is remembered so it can be
    /// reported. Surplus tails are ignored and reported as well.
    /// An empty filter produces no rules, which means "group by value"; any
    /// tails given alongside it are reported as ignored.
    pub fn new(filter: &[String], name_tails: &[String]) -> Self {
        let arity_mismatch = (filter.len() != name_tails.len()).then_some((filter.len(), name_tails.len()));
        let tails_from_values = name_tails.len() < filter.len();

        let rules = if tails_from_values {
            filter
                .iter()
                .map(|value| FilterRule::new(value, &sanitize_name_tail(value)))
                .collect()
        } else {
            filter
                .iter()
                .zip(name_tails)
                .map(|(value, tail)| FilterRule::new(value, tail))
                .collect()
        };

        Self {
            rules,
            arity_mismatch,
            tails_from_values,
        }
    }

    /// Rules built from explicit pairs
    pub fn from_rules(rules: Vec<FilterRule>) -> Self {
        Self {
            rules,
            arity_mismatch: None,
            tails_from_values: false,
        }
    }

    pub fn rules(&self) -> &[FilterRule] {
        &self.rules
    }

    /// Whether events are grouped by each distinct value
    pub fn groups_by_value(&self) -> bool {
        self.rules.is_empty()
    }

    /// `(filter values, name tails)` when the two lists had different lengths
    pub fn arity_mismatch(&self) -> Option<(usize, usize)> {
        self.arity_mismatch
    }

    /// Whether the name tails were derived from the match values
    pub fn tails_from_values(&self) -> bool {
        self.tails_from_values
    }
}

/// Per-run export settings
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Field whose content decides the group of an event
    pub field_name: String,
    pub rules: FilterRules,
    /// Remove override runs from the text (false keeps override code)
    pub strip_override: bool,
    /// Also emit a `_t` file per group holding every field but the text
    pub text_excluded: bool,
    /// Replace the base name with `E` + the first number found in it
    pub rename_number: bool,
    /// Use CRLF line endings (the source encoding is applied by the caller)
    pub keep_source_encoding: bool,
    /// Header line written first; empty for none
    pub custom_message: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            field_name: "Style".to_string(),
            rules: FilterRules::new(&[], &[]),
            strip_override: true,
            text_excluded: false,
            rename_number: false,
            keep_source_encoding: false,
            custom_message: String::new(),
        }
    }
}

impl ExportOptions {
    pub fn newline(&self) -> Newline {
        if self.keep_source_encoding {
            Newline::CrLf
        } else {
            Newline::Lf
        }
    }
}

/// Events that end up in the same output file
#[derive(Debug, Clone)]
pub struct ExportGroup<'a> {
    pub name_tail: String,
    pub records: Vec<&'a EventRecord>,
    /// Render the non-text fields instead of the text
    pub text_excluded: bool,
}

/// A fully rendered output file, not yet encoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedOutput {
    pub file_name: String,
    pub text: String,
    /// Number of events rendered into the file
    pub record_count: usize,
}

/// Outputs of one file together with the warnings raised for it
#[derive(Debug, Clone, Default)]
pub struct ExportResult {
    pub outputs: Vec<RenderedOutput>,
    pub diagnostics: Vec<Diagnostic>,
}

// @struct: Groups, renders and names exported event files
pub struct Exporter {
    options: ExportOptions,
}

impl Exporter {
    pub fn new(options: ExportOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Export the events of one file.
    ///
    /// `base_name` is the input file name without extension; `file_context`
    /// labels the diagnostics.
    pub fn export(&self, model: &EventsModel, base_name: &str, file_context: &str) -> Result<ExportResult, AssError> {
        let field = self.options.field_name.as_str();
        if model.formats.iter().any(|format| !format.contains(field)) {
            return Err(AssError::UnknownField {
                field: field.to_string(),
            });
        }

        let mut result = ExportResult {
            outputs: Vec::new(),
            diagnostics: model.diagnostics.clone(),
        };

        if let Some((filters, tails)) = self.options.rules.arity_mismatch() {
            let message = if filters == 0 {
                format!("no filter value but {} name tail(s); grouping by field contents, name tails ignored", tails)
            } else if tails < filters {
                format!("{} filter value(s) but {} name tail(s); using field contents as name tails", filters, tails)
            } else {
                format!("{} filter value(s) but {} name tail(s); extra name tails ignored", filters, tails)
            };
            result.diagnostics.push(Diagnostic::new(
                DiagnosticKind::FilterNameTailArityMismatch,
                file_context,
                message,
            ));
        }

        let base = self.output_base_name(base_name, file_context, &mut result.diagnostics);
        let groups = self.group(&model.records, file_context, &mut result.diagnostics);

        let mut seen_names = HashSet::new();
        for group in groups {
            let mut file_name = format!("{}{}.{}", base, group.name_tail, EXPORT_EXTENSION);
            if seen_names.contains(&file_name) {
                let taken = file_name;
                file_name = (2..)
                    .map(|n| format!("{}{}_{}.{}", base, group.name_tail, n, EXPORT_EXTENSION))
                    .find(|candidate| !seen_names.contains(candidate))
                    .unwrap_or_default();
                result.diagnostics.push(Diagnostic::new(
                    DiagnosticKind::DuplicateOutputName,
                    file_context,
                    format!("'{}' is produced by more than one group; writing '{}' instead", taken, file_name),
                ));
            }
            seen_names.insert(file_name.clone());
            result.outputs.push(RenderedOutput {
                text: self.render(&group),
                record_count: group.records.len(),
                file_name,
            });
        }

        debug!("{}: {} output(s)", file_context, result.outputs.len());
        Ok(result)
    }

    /// Partition records into export groups.
    ///
    /// With rules, a record joins every rule whose match value equals its
    /// field value and records matching no rule are left out. Groups follow
    /// the rule order, or the file order of their first event when the tails
    /// were derived from the values. Without rules, each distinct value forms
    /// a group and nothing is left out.
    pub fn group<'a>(
        &self,
        records: &'a [EventRecord],
        file_context: &str,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Vec<ExportGroup<'a>> {
        let field = self.options.field_name.as_str();
        let value_of = |record: &EventRecord| record.get(field).unwrap_or_default().to_string();

        let mut groups: Vec<ExportGroup<'a>> = if self.options.rules.groups_by_value() {
            let mut order: Vec<ExportGroup<'a>> = Vec::new();
            let mut index: HashMap<String, usize> = HashMap::new();
            for record in records {
                let value = value_of(record);
                let slot = *index.entry(value.clone()).or_insert_with(|| {
                    order.push(ExportGroup {
                        name_tail: sanitize_name_tail(&value),
                        records: Vec::new(),
                        text_excluded: false,
                    });
                    order.len() - 1
                });
                order[slot].records.push(record);
            }
            order
        } else {
            let mut matched: Vec<(usize, ExportGroup<'a>)> = self
                .options
                .rules
                .rules()
                .iter()
                .filter_map(|rule| {
                    let hits: Vec<(usize, &EventRecord)> = records
                        .iter()
                        .enumerate()
                        .filter(|(_, record)| record.get(field) == Some(rule.match_value.as_str()))
                        .collect();
                    let Some(&(first, _)) = hits.first() else {
                        diagnostics.push(Diagnostic::new(
                            DiagnosticKind::EmptyGroup,
                            file_context,
                            format!("no event has {} '{}'", field, rule.match_value),
                        ));
                        return None;
                    };
                    Some((
                        first,
                        ExportGroup {
                            name_tail: rule.output_tail.clone(),
                            records: hits.into_iter().map(|(_, record)| record).collect(),
                            text_excluded: false,
                        },
                    ))
                })
                .collect();
            if self.options.rules.tails_from_values() {
                matched.sort_by_key(|(first, _)| *first);
            }
            matched.into_iter().map(|(_, group)| group).collect()
        };

        if self.options.text_excluded {
            groups = groups
                .into_iter()
                .flat_map(|group| {
                    let extra = ExportGroup {
                        name_tail: format!("{}{}", group.name_tail, TEXT_EXCLUDED_TAIL),
                        records: group.records.clone(),
                        text_excluded: true,
                    };
                    [group, extra]
                })
                .collect();
        }

        groups
    }

    /// Render a group to text, one line per record, each line terminated.
    pub fn render(&self, group: &ExportGroup<'_>) -> String {
        let newline = self.options.newline().as_str();
        let mut out = String::new();

        if !self.options.custom_message.is_empty() {
            out.push_str(&self.options.custom_message);
            out.push_str(newline);
        }

        for record in &group.records {
            if group.text_excluded {
                let fields: Vec<&str> = record.non_text_fields().map(|(_, value)| value.as_str()).collect();
                out.push_str(record.keyword());
                out.push_str(": ");
                out.push_str(&fields.join(","));
            } else {
                out.push_str(&override_tags::strip_unless(record.text(), !self.options.strip_override));
            }
            out.push_str(newline);
        }

        out
    }

    fn output_base_name(&self, base_name: &str, file_context: &str, diagnostics: &mut Vec<Diagnostic>) -> String {
        if !self.options.rename_number {
            return base_name.to_string();
        }
        match rename_with_number(base_name) {
            Some(renamed) => renamed,
            None => {
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::NoDigitsForRename,
                    file_context,
                    format!("no digits in '{}'; keeping the original name", base_name),
                ));
                base_name.to_string()
            }
        }
    }
}

/// `E` followed by the first run of digits in `base_name`, if any.
pub fn rename_with_number(base_name: &str) -> Option<String> {
    DIGITS_REGEX
        .find(base_name)
        .map(|digits| format!("E{}", digits.as_str()))
}

/// Make a field value usable as part of a file name.
pub fn sanitize_name_tail(value: &str) -> String {
    let sanitized: String = value
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let trimmed = sanitized.trim_end_matches(['.', ' ']);
    if trimmed.is_empty() {
        "_".to_string()
    } else {
        trimmed.to_string()
    }
}
