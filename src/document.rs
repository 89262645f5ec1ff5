/*!
 * Section-level document model for ASS subtitle files.
 *
 * A file is an ordered list of bracket-headed sections, each holding its raw
 * lines verbatim. Every line remembers its own terminator so that
 * `Document::serialize` reproduces the parsed text byte for byte.
 */

use std::fmt;

use log::debug;

use crate::errors::AssError;

/// Terminator that followed a line in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    CrLf,
    /// Last line of the input, not terminated
    None,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
            Self::None => "",
        }
    }
}

/// Newline convention used when normalizing output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Newline {
    #[default]
    Lf,
    CrLf,
}

impl Newline {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }
}

/// Interpretation of a raw line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// `Key: Value` pair; the value has its leading whitespace removed
    KeyValue { key: &'a str, value: &'a str },
    /// Anything else: blank lines, `;` comments, free text
    Text(&'a str),
}

/// One raw line of a section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Line content without its terminator
    pub content: String,

    /// Original terminator
    pub ending: LineEnding,
}

impl Line {
    pub fn new(content: &str, ending: LineEnding) -> Self {
        Self {
            content: content.to_string(),
            ending,
        }
    }

    /// Key/value split at the first colon, or opaque text
    pub fn kind(&self) -> LineKind<'_> {
        let content = self.content.as_str();
        if content.starts_with(';') {
            return LineKind::Text(content);
        }
        match content.split_once(':') {
            Some((key, value)) if !key.is_empty() && !key.contains('[') => LineKind::KeyValue {
                key,
                value: value.trim_start(),
            },
            _ => LineKind::Text(content),
        }
    }

    /// Whether the line opens a new section
    pub fn is_section_header(&self) -> bool {
        let trimmed = self.content.trim();
        trimmed.len() >= 2 && trimmed.starts_with('[') && trimmed.ends_with(']')
    }

    fn write_to(&self, out: &mut String, newline: Option<Newline>) {
        out.push_str(&self.content);
        match (self.ending, newline) {
            (LineEnding::None, _) => {}
            (ending, None) => out.push_str(ending.as_str()),
            (_, Some(newline)) => out.push_str(newline.as_str()),
        }
    }
}

/// A bracket-headed block of lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    header: Line,
    pub lines: Vec<Line>,
}

impl Section {
    /// Create a section from its raw header line.
    pub fn new(header: Line) -> Self {
        Self {
            header,
            lines: Vec::new(),
        }
    }

    /// Header text including brackets, e.g. `[Events]`
    pub fn name(&self) -> &str {
        self.header.content.trim()
    }

    pub fn header(&self) -> &Line {
        &self.header
    }

    /// Whether this section is the `[Events]` section
    pub fn is_events(&self) -> bool {
        self.name() == "[Events]"
    }
}

/// An ASS file as an ordered sequence of sections.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    sections: Vec<Section>,
}

impl Document {
    pub fn from_sections(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    /// Parse decoded text into sections.
    ///
    /// Every line after a header, blank lines included, belongs to that
    /// header's section. Any line ahead of the first header is an error.
    pub fn parse(text: &str) -> Result<Self, AssError> {
        let mut sections: Vec<Section> = Vec::new();

        for (index, raw) in text.split_inclusive('\n').enumerate() {
            let line = split_terminator(raw);

            if line.is_section_header() {
                sections.push(Section::new(line));
                continue;
            }

            match sections.last_mut() {
                Some(section) => section.lines.push(line),
                None => return Err(AssError::ContentBeforeFirstSection { line: index + 1 }),
            }
        }

        debug!("Parsed {} section(s)", sections.len());
        Ok(Self { sections })
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn into_sections(self) -> Vec<Section> {
        self.sections
    }

    /// All sections carrying the given header, in file order
    pub fn sections_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Section> + 'a {
        self.sections.iter().filter(move |s| s.name() == name)
    }

    /// Reproduce the text, keeping every original line terminator.
    pub fn serialize(&self) -> String {
        self.render(None)
    }

    /// Reproduce the text with every terminator replaced by `newline`.
    ///
    /// An unterminated final line stays unterminated.
    pub fn serialize_with(&self, newline: Newline) -> String {
        self.render(Some(newline))
    }

    fn render(&self, newline: Option<Newline>) -> String {
        let mut out = String::new();
        for section in &self.sections {
            section.header.write_to(&mut out, newline);
            for line in &section.lines {
                line.write_to(&mut out, newline);
            }
        }
        out
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

fn split_terminator(raw: &str) -> Line {
    if let Some(content) = raw.strip_suffix("\r\n") {
        Line::new(content, LineEnding::CrLf)
    } else if let Some(content) = raw.strip_suffix('\n') {
        Line::new(content, LineEnding::Lf)
    } else {
        Line::new(raw, LineEnding::None)
    }
}
