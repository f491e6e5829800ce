//! URL-safe document identifiers.
//!
//! A [`DocumentId`] is the percent-encoded base name of a document file
//! (extension stripped). The encode set matches the one used for URI
//! components: everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )` is escaped,
//! so an identifier can be embedded in a URL path segment as-is.

use std::borrow::Cow;
use std::fmt;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use serde::{Deserialize, Serialize};

/// URI component unreserved characters: A-Z a-z 0-9 - _ . ! ~ * ' ( )
const COMPONENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Error returned when an identifier does not decode to a valid base name.
#[derive(Debug, thiserror::Error)]
#[error("identifier `{id}` is not valid percent-encoded UTF-8")]
pub struct IdentifierError {
    id: String,
    #[source]
    source: std::str::Utf8Error,
}

/// Opaque, URL-safe identifier of a document.
///
/// Identifiers built with [`DocumentId::from_file_stem`] always decode back to
/// the original name. Identifiers received from the outside (e.g. a URL path
/// segment) are wrapped with [`DocumentId::new`] and only validated when
/// decoded.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Wrap an already-encoded identifier.
    #[must_use]
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Encode a file base name (without extension) into an identifier.
    ///
    /// ```
    /// use quire_storage::DocumentId;
    ///
    /// assert_eq!(DocumentId::from_file_stem("intro").as_str(), "intro");
    /// assert_eq!(DocumentId::from_file_stem("Part 1: Lexing").as_str(), "Part%201%3A%20Lexing");
    /// ```
    #[must_use]
    pub fn from_file_stem(stem: &str) -> Self {
        Self(utf8_percent_encode(stem, COMPONENT_ENCODE_SET).to_string())
    }

    /// Decode the identifier back into the file base name.
    pub fn decode(&self) -> Result<String, IdentifierError> {
        percent_decode_str(&self.0)
            .decode_utf8()
            .map(Cow::into_owned)
            .map_err(|source| IdentifierError {
                id: self.0.clone(),
                source,
            })
    }

    /// Decoded base name, or the raw identifier if it does not decode.
    ///
    /// Used as the fallback title for documents without a `title` field.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.decode().unwrap_or_else(|_| self.0.clone())
    }

    /// The encoded form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DocumentId {
    fn from(encoded: &str) -> Self {
        Self::new(encoded)
    }
}
