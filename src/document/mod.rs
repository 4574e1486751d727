//! Document model for rendered chat transcripts.
//!
//! A small block-based intermediate representation sits between message
//! conversion and the output backend, so the conversion logic never deals
//! with markup and the backend never deals with archive JSON.

pub mod html;

use serde::{Deserialize, Serialize};

/// Paper size for the printable output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PageSize {
    #[default]
    A4,
    Letter,
}

impl PageSize {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "a4" => Some(PageSize::A4),
            "letter" => Some(PageSize::Letter),
            _ => None,
        }
    }

    /// Name understood by CSS `@page { size: ...; }`.
    pub fn css_name(self) -> &'static str {
        match self {
            PageSize::A4 => "A4",
            PageSize::Letter => "letter",
        }
    }
}

/// One chat transcript ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub title: String,
    pub blocks: Vec<Block>,
}

/// A renderable block. `from_me` selects the side-dependent style: the
/// exporting user's blocks sit on the left with a right inset, everyone
/// else's on the right with a left inset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// The participant roster shown under the title.
    Participants { entries: Vec<String> },
    /// "Name (email) at timestamp:" line above each message.
    Header {
        author: String,
        email: Option<String>,
        timestamp: String,
        from_me: bool,
    },
    /// A message body, already reshaped when `rtl` is set.
    Text {
        text: String,
        rtl: bool,
        from_me: bool,
    },
    /// An embedded image, hyperlinked to its source.
    Image { src: String, link: String },
    /// A non-embeddable attachment.
    FileLink {
        href: String,
        label: String,
        from_me: bool,
    },
    /// System-ish one liners: video calls, call status, tasks, drive files.
    Notice { text: String, from_me: bool },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_from_str() {
        assert_eq!(PageSize::from_str("a4"), Some(PageSize::A4));
        assert_eq!(PageSize::from_str("A4"), Some(PageSize::A4));
        assert_eq!(PageSize::from_str("letter"), Some(PageSize::Letter));
        assert_eq!(PageSize::from_str("legal"), None);
    }

    #[test]
    fn test_page_size_css_name() {
        assert_eq!(PageSize::A4.css_name(), "A4");
        assert_eq!(PageSize::Letter.css_name(), "letter");
    }
}
