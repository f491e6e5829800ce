//! Header block detection.
//!
//! A document may start with a YAML header fenced by `---` lines:
//!
//! ```text
//! ---
//! title: Introduction
//! order: 1
//! ---
//! # Hello
//! ```

const DELIMITER: &str = "---";
const BOM: char = '\u{feff}';

/// A document split into its optional header and its body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrontMatter<'a> {
    /// Raw header text between the delimiter lines, if present.
    pub header: Option<&'a str>,
    /// Everything after the closing delimiter, or the whole text when there
    /// is no header.
    pub body: &'a str,
}

/// Split raw document text into header and body.
///
/// The opening delimiter must be the first line. The header ends at the next
/// line that is exactly `---` (trailing whitespace ignored). Without a closing
/// delimiter the header runs to the end of the text and the body is empty.
#[must_use]
pub fn split(text: &str) -> FrontMatter<'_> {
    let no_header = FrontMatter {
        header: None,
        body: text,
    };

    let content = text.strip_prefix(BOM).unwrap_or(text);
    let (first, rest) = content.split_once('\n').unwrap_or((content, ""));
    if first.trim_end() != DELIMITER {
        return no_header;
    }

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            return FrontMatter {
                header: Some(&rest[..offset]),
                body: &rest[offset + line.len()..],
            };
        }
        offset += line.len();
    }

    FrontMatter {
        header: Some(rest),
        body: "",
    }
}
