//! Output filename hygiene.
//!
//! Chat titles and participant names come straight from the archive and may
//! contain characters that are illegal in filenames on at least one
//! supported platform, so every output name is scrubbed and length-capped
//! before it reaches the filesystem.

use unicode_segmentation::UnicodeSegmentation;

/// Characters that cannot appear in a filename on some supported platform.
const FORBIDDEN: [char; 9] = ['/', ':', '\\', '*', '?', '"', '<', '>', '|'];

/// Replace filesystem-hostile characters with `-`.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| if FORBIDDEN.contains(&c) { '-' } else { c })
        .collect()
}

/// Truncate to at most `max` grapheme clusters, never splitting a cluster.
pub fn truncate_graphemes(name: &str, max: usize) -> &str {
    match name.grapheme_indices(true).nth(max) {
        Some((idx, _)) => &name[..idx],
        None => name,
    }
}
