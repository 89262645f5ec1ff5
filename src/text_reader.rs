/*!
 * Decoding of raw subtitle bytes and encoding of rendered output.
 *
 * Input files are sniffed for a byte order mark first. Without one, a fixed
 * list of candidate codecs is tried strictly (malformed sequences are fatal)
 * and the first codec that decodes the whole buffer wins.
 */

use std::borrow::Cow;

use encoding_rs::{BIG5, Encoding, GB18030, SHIFT_JIS, UTF_8, UTF_16BE, UTF_16LE};
use log::debug;

use crate::errors::AssError;

/// Codecs attempted, in order, when the input carries no byte order mark.
fn candidate_encodings() -> [&'static Encoding; 4] {
    [UTF_8, GB18030, BIG5, SHIFT_JIS]
}

/// The encoding detected for an input file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceEncoding {
    encoding: &'static Encoding,
    has_bom: bool,
}

impl SourceEncoding {
    /// Describe a detected encoding.
    pub fn new(encoding: &'static Encoding, has_bom: bool) -> Self {
        Self { encoding, has_bom }
    }

    /// UTF-8 without a byte order mark.
    pub fn utf8() -> Self {
        Self::new(UTF_8, false)
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Whether the input started with a byte order mark
    pub fn has_bom(&self) -> bool {
        self.has_bom
    }

    /// Canonical codec label, e.g. `UTF-8` or `gb18030`
    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }
}

/// Decoded file content together with the encoding it was stored in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    pub encoding: SourceEncoding,
}

/// Decode raw file bytes.
///
/// A UTF-8 or UTF-16 byte order mark selects the codec directly and is not
/// part of the returned text. Otherwise UTF-8, GB18030, Big5 and Shift_JIS are
/// tried in that order.
pub fn decode(bytes: &[u8]) -> Result<DecodedText, AssError> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        debug!("Byte order mark found: {}", encoding.name());
        return decode_strict(encoding, &bytes[bom_len..])
            .map(|text| DecodedText {
                text: text.into_owned(),
                encoding: SourceEncoding::new(encoding, true),
            })
            .ok_or_else(|| AssError::EncodingUnsupported {
                tried: encoding.name().to_string(),
            });
    }

    for encoding in candidate_encodings() {
        if let Some(text) = decode_strict(encoding, bytes) {
            debug!("Decoded input as {}", encoding.name());
            return Ok(DecodedText {
                text: text.into_owned(),
                encoding: SourceEncoding::new(encoding, false),
            });
        }
    }

    let tried = candidate_encodings()
        .iter()
        .map(|e| e.name())
        .collect::<Vec<_>>()
        .join(", ");
    Err(AssError::EncodingUnsupported { tried })
}

fn decode_strict<'a>(encoding: &'static Encoding, bytes: &'a [u8]) -> Option<Cow<'a, str>> {
    encoding.decode_without_bom_handling_and_without_replacement(bytes)
}

/// Target encoding for serialized output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputEncoding {
    /// UTF-8 without byte order mark
    Utf8,
    /// Re-use the encoding (and byte order mark) of the input file
    Source(SourceEncoding),
}

impl OutputEncoding {
    /// Label of the codec that will be written
    pub fn name(&self) -> &'static str {
        match self {
            Self::Utf8 => UTF_8.name(),
            Self::Source(source) => source.name(),
        }
    }
}

/// Bytes ready to be written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedOutput {
    pub bytes: Vec<u8>,

    /// Set when some characters had no mapping in the target codec and were
    /// replaced by numeric character references
    pub had_unmappable: bool,
}

/// Encode rendered text for writing.
pub fn encode(text: &str, target: OutputEncoding) -> EncodedOutput {
    let source = match target {
        OutputEncoding::Utf8 => {
            return EncodedOutput {
                bytes: text.as_bytes().to_vec(),
                had_unmappable: false,
            };
        }
        OutputEncoding::Source(source) => source,
    };

    let encoding = source.encoding();
    let mut bytes = Vec::with_capacity(text.len() + 3);

    // encoding_rs never encodes into UTF-16, so both byte orders are written by hand
    if encoding == UTF_16LE || encoding == UTF_16BE {
        let little_endian = encoding == UTF_16LE;
        let units = source
            .has_bom()
            .then_some(0xFEFF_u16)
            .into_iter()
            .chain(text.encode_utf16());
        for unit in units {
            if little_endian {
                bytes.extend_from_slice(&unit.to_le_bytes());
            } else {
                bytes.extend_from_slice(&unit.to_be_bytes());
            }
        }
        return EncodedOutput {
            bytes,
            had_unmappable: false,
        };
    }

    if encoding == UTF_8 && source.has_bom() {
        bytes.extend_from_slice(b"\xEF\xBB\xBF");
    }
    let (encoded, _, had_unmappable) = encoding.encode(text);
    bytes.extend_from_slice(&encoded);

    EncodedOutput {
        bytes,
        had_unmappable,
    }
}
