//! Self-contained HTML backend with print CSS.
//!
//! The layout model is a plain left-to-right paragraph flow: text is drawn
//! line by line in the exact character order it arrives in. Reshaped Hebrew
//! blocks are therefore rendered with `unicode-bidi: bidi-override` and a
//! forced LTR direction, which disables the browser's own bidi reordering —
//! the reshaper has already produced visual order, and running the Unicode
//! algorithm on top of it would scramble it again. The RTL flag only picks
//! the right-aligned paragraph style and the Hebrew font stack.

use super::{Block, Document, PageSize};

/// Rendering knobs owned by the layout layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    pub page: PageSize,
    /// Thumbnail height cap, CSS pixels.
    pub max_img_height_px: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            page: PageSize::A4,
            max_img_height_px: 192,
        }
    }
}

/// Escape text for HTML element content and attribute values.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape, then convert embedded whitespace controls into markup: tabs
/// become five no-break spaces and newlines become line breaks.
fn markup(text: &str) -> String {
    escape(text)
        .replace('\t', "&nbsp;&nbsp;&nbsp;&nbsp;&nbsp;")
        .replace('\n', "<br />")
}

fn side_class(from_me: bool) -> &'static str {
    if from_me {
        "me"
    } else {
        "other"
    }
}

/// Render one document to a complete standalone HTML page.
pub fn render(doc: &Document, opts: &RenderOptions) -> String {
    let mut out = String::with_capacity(4096 + doc.blocks.len() * 128);
    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\" />\n");
    out.push_str(&format!("<title>{}</title>\n", escape(&doc.title)));
    out.push_str("<style>\n");
    out.push_str(&format!(
        "@page {{ size: {}; margin: 1in 0.75in 0.75in; }}\n",
        opts.page.css_name()
    ));
    out.push_str(concat!(
        "body { font-family: Helvetica, Arial, sans-serif; font-size: 10pt; ",
        "max-width: 7in; margin: 0 auto; }\n",
        "h1 { text-align: center; }\n",
        ".participants { font-size: 9pt; }\n",
        ".header { font-weight: bold; margin: 0.8em 0 0.2em; }\n",
        ".header.other { text-align: right; }\n",
        ".msg { margin: 0.1em 0; text-align: justify; }\n",
        ".msg.me { margin-right: 2in; }\n",
        ".msg.other { margin-left: 2in; }\n",
        ".msg.heb { unicode-bidi: bidi-override; direction: ltr; ",
        "text-align: right; font-family: Arial, 'Noto Sans Hebrew', sans-serif; ",
        "font-size: 12pt; }\n",
        ".image { text-align: center; margin: 0.3em 0; }\n",
    ));
    out.push_str(&format!(
        ".image img {{ max-height: {}px; max-width: 100%; }}\n",
        opts.max_img_height_px
    ));
    out.push_str("</style>\n</head>\n<body>\n");
    out.push_str(&format!("<h1>{}</h1>\n", escape(&doc.title)));

    for block in &doc.blocks {
        render_block(&mut out, block);
    }

    out.push_str("</body>\n</html>\n");
    out
}

fn render_block(out: &mut String, block: &Block) {
    match block {
        Block::Participants { entries } => {
            out.push_str("<p class=\"participants\"><u>Participants:</u>");
            for entry in entries {
                out.push_str("<br />&nbsp;&nbsp;&nbsp;&nbsp;&nbsp;");
                out.push_str(&escape(entry));
            }
            out.push_str("</p>\n");
        }
        Block::Header {
            author,
            email,
            timestamp,
            from_me,
        } => {
            let who = match email {
                Some(email) => format!("{author} ({email})"),
                None => author.clone(),
            };
            out.push_str(&format!(
                "<p class=\"header {}\">{} at {}:</p>\n",
                side_class(*from_me),
                escape(&who),
                escape(timestamp)
            ));
        }
        Block::Text { text, rtl, from_me } => {
            let heb = if *rtl { " heb" } else { "" };
            out.push_str(&format!(
                "<p class=\"msg {}{}\">{}</p>\n",
                side_class(*from_me),
                heb,
                markup(text)
            ));
        }
        Block::Image { src, link } => {
            out.push_str(&format!(
                "<div class=\"image\"><a href=\"{}\"><img src=\"{}\" /></a></div>\n",
                escape(link),
                escape(src)
            ));
        }
        Block::FileLink {
            href,
            label,
            from_me,
        } => {
            out.push_str(&format!(
                "<p class=\"msg {}\"><u>File attached:</u> <a href=\"{}\">{}</a></p>\n",
                side_class(*from_me),
                escape(href),
                escape(label)
            ));
        }
        Block::Notice { text, from_me } => {
            out.push_str(&format!(
                "<p class=\"msg {}\"><u>{}</u></p>\n",
                side_class(*from_me),
                escape(text)
            ));
        }
    }
}
