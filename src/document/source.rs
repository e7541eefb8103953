//! Source text and locations inside it.

use std::fmt;

use crate::utils::{bytes_to_hex, ChecksumAlgorithm};

/// A contiguous range of a source document.
///
/// Line and character indices are zero-based; [`fmt::Display`] renders them one-based as
/// `line:character`, the way editors show positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SourceSpan {
    /// Byte offset of the first character
    pub absolute_index: usize,
    /// Zero-based line of the first character
    pub line_index: usize,
    /// Zero-based character offset inside the line
    pub character_index: usize,
    /// Length in bytes
    pub length: usize,
}

impl SourceSpan {
    /// Create a new span
    #[must_use]
    pub const fn new(
        absolute_index: usize,
        line_index: usize,
        character_index: usize,
        length: usize,
    ) -> Self {
        SourceSpan {
            absolute_index,
            line_index,
            character_index,
            length,
        }
    }

    /// Byte offset one past the last character
    #[must_use]
    pub const fn end(&self) -> usize {
        self.absolute_index + self.length
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line_index + 1, self.character_index + 1)
    }
}

/// The text of one template file together with where it came from.
///
/// The content checksum is computed once on construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    file_path: Option<String>,
    relative_path: Option<String>,
    content: String,
    checksum_algorithm: ChecksumAlgorithm,
    checksum: Vec<u8>,
}

impl SourceDocument {
    /// Create a source document from a file path and its content
    #[must_use]
    pub fn new(file_path: impl Into<String>, content: impl Into<String>) -> Self {
        Self::from_parts(Some(file_path.into()), content.into(), ChecksumAlgorithm::default())
    }

    /// Create a source document which does not correspond to a file
    #[must_use]
    pub fn from_content(content: impl Into<String>) -> Self {
        Self::from_parts(None, content.into(), ChecksumAlgorithm::default())
    }

    fn from_parts(
        file_path: Option<String>,
        content: String,
        checksum_algorithm: ChecksumAlgorithm,
    ) -> Self {
        let checksum = checksum_algorithm.compute(content.as_bytes());
        SourceDocument {
            file_path,
            relative_path: None,
            content,
            checksum_algorithm,
            checksum,
        }
    }

    /// Set the project-relative path
    #[must_use]
    pub fn with_relative_path(mut self, relative_path: impl Into<String>) -> Self {
        self.relative_path = Some(relative_path.into());
        self
    }

    /// Recompute the checksum with `algorithm`
    #[must_use]
    pub fn with_checksum_algorithm(mut self, algorithm: ChecksumAlgorithm) -> Self {
        if algorithm != self.checksum_algorithm {
            self.checksum = algorithm.compute(self.content.as_bytes());
            self.checksum_algorithm = algorithm;
        }
        self
    }

    /// The file path, if any
    #[must_use]
    pub fn file_path(&self) -> Option<&str> {
        self.file_path.as_deref()
    }

    /// The project-relative path, if any
    #[must_use]
    pub fn relative_path(&self) -> Option<&str> {
        self.relative_path.as_deref()
    }

    /// The template text
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// The algorithm the checksum was computed with
    #[must_use]
    pub fn checksum_algorithm(&self) -> ChecksumAlgorithm {
        self.checksum_algorithm
    }

    /// Raw checksum bytes of the content
    #[must_use]
    pub fn checksum(&self) -> &[u8] {
        &self.checksum
    }

    /// Checksum as lowercase hex
    #[must_use]
    pub fn checksum_hex(&self) -> String {
        bytes_to_hex(&self.checksum)
    }

    /// Compute the span of `length` bytes starting at byte offset `absolute_index`
    #[must_use]
    pub fn span(&self, absolute_index: usize, length: usize) -> SourceSpan {
        let absolute_index = absolute_index.min(self.content.len());
        let before = &self.content.as_bytes()[..absolute_index];
        let line_index = before.iter().filter(|b| **b == b'\n').count();
        let line_start = before
            .iter()
            .rposition(|b| *b == b'\n')
            .map_or(0, |position| position + 1);

        SourceSpan::new(absolute_index, line_index, absolute_index - line_start, length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_display_is_one_based() {
        assert_eq!(SourceSpan::new(0, 0, 0, 1).to_string(), "1:1");
        assert_eq!(SourceSpan::new(4, 1, 2, 3).to_string(), "2:3");
    }

    #[test]
    fn test_span_from_offset() {
        let source = SourceDocument::new("a.tag", "ab\ncd\nef");
        let span = source.span(4, 2);
        assert_eq!(span.line_index, 1);
        assert_eq!(span.character_index, 1);
        assert_eq!(span.end(), 6);

        let clamped = source.span(100, 0);
        assert_eq!(clamped.absolute_index, 8);
        assert_eq!(clamped.line_index, 2);
    }

    #[test]
    fn test_checksum_defaults_to_sha1() {
        let source = SourceDocument::new("a.tag", "abc");
        assert_eq!(source.checksum_algorithm(), ChecksumAlgorithm::Sha1);
        assert_eq!(
            source.checksum_hex(),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
    }

    #[test]
    fn test_checksum_md5() {
        let source =
            SourceDocument::new("a.tag", "abc").with_checksum_algorithm(ChecksumAlgorithm::Md5);
        assert_eq!(source.checksum().len(), 16);
        assert_eq!(source.checksum_hex(), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn test_paths() {
        let source = SourceDocument::new("/app/Views/index.tag", "")
            .with_relative_path("Views/index.tag");
        assert_eq!(source.file_path(), Some("/app/Views/index.tag"));
        assert_eq!(source.relative_path(), Some("Views/index.tag"));
        assert_eq!(SourceDocument::from_content("x").file_path(), None);
    }
}
