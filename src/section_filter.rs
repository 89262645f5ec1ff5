/*!
 * Section deletion.
 */

use std::collections::HashSet;

use log::debug;

use crate::document::Document;

/// Return a copy of `doc` without the sections whose header is in `names`.
///
/// Headers are compared exactly, brackets included. Names that do not occur
/// in the document are ignored, and retained sections keep their order and
/// raw lines.
pub fn delete_sections(doc: &Document, names: &HashSet<String>) -> Document {
    let retained: Vec<_> = doc
        .sections()
        .iter()
        .filter(|section| !names.contains(section.name()))
        .cloned()
        .collect();

    debug!(
        "Deleted {} of {} section(s)",
        doc.sections().len() - retained.len(),
        doc.sections().len()
    );
    Document::from_sections(retained)
}
