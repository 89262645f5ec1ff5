/*!
 * Override tag stripping for event text.
 *
 * An override run starts at `{` and ends at the next `}`; runs do not nest.
 * Escapes such as `\N` or `\h` are plain text and survive stripping.
 */

use std::borrow::Cow;

/// A piece of event text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideSpan<'a> {
    /// Text shown on screen
    Plain(&'a str),
    /// A complete `{...}` run, braces included
    Tag(&'a str),
    /// A `{` without a closing brace, or a `}` without an opening one
    Stray(&'a str),
}

/// Decompose text into plain, tag and stray-brace spans.
///
/// Concatenating the spans yields the input again.
pub fn spans(text: &str) -> Vec<OverrideSpan<'_>> {
    let mut spans = Vec::new();
    let mut pos = 0;

    while pos < text.len() {
        let Some(offset) = text[pos..].find(['{', '}']) else {
            spans.push(OverrideSpan::Plain(&text[pos..]));
            break;
        };

        let at = pos + offset;
        if at > pos {
            spans.push(OverrideSpan::Plain(&text[pos..at]));
        }

        if text[at..].starts_with('}') {
            spans.push(OverrideSpan::Stray(&text[at..at + 1]));
            pos = at + 1;
            continue;
        }

        match text[at + 1..].find('}') {
            Some(close) => {
                let end = at + 1 + close + 1;
                spans.push(OverrideSpan::Tag(&text[at..end]));
                pos = end;
            }
            None => {
                spans.push(OverrideSpan::Stray(&text[at..at + 1]));
                pos = at + 1;
            }
        }
    }

    spans
}

/// Remove every override run and stray brace from `text`.
pub fn strip(text: &str) -> String {
    spans(text)
        .into_iter()
        .filter_map(|span| match span {
            OverrideSpan::Plain(plain) => Some(plain),
            OverrideSpan::Tag(_) | OverrideSpan::Stray(_) => None,
        })
        .collect()
}

/// Strip unless the caller asked to keep override code.
pub fn strip_unless(text: &str, keep_override_code: bool) -> Cow<'_, str> {
    if keep_override_code {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(strip(text))
    }
}
