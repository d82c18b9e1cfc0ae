//! Path segmentation.
//!
//! # Responsibilities
//! - Split a request path on `/`
//! - Drop empty segments (`/a//b/` → `["a", "b"]`)
//! - Classify each segment as plain data or a routing directive
//!
//! # Design Decisions
//! - Pure function, no allocation beyond the returned vector
//! - Segments borrow from the input path

/// Marker character that turns a path segment into a directive.
pub const DIRECTIVE_MARKER: char = '_';

/// A single non-empty path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// A data segment (database or document identifier).
    Plain(&'a str),
    /// A reserved segment carrying routing instructions. Holds the name
    /// with the marker stripped.
    Directive(&'a str),
}

impl<'a> Segment<'a> {
    /// Classify a raw, non-empty segment.
    pub fn classify(raw: &'a str) -> Self {
        match raw.strip_prefix(DIRECTIVE_MARKER) {
            Some(name) => Segment::Directive(name),
            None => Segment::Plain(raw),
        }
    }

    /// The directive name, if this is a directive.
    pub fn directive_name(&self) -> Option<&'a str> {
        match self {
            Segment::Directive(name) => Some(name),
            Segment::Plain(_) => None,
        }
    }

    /// The segment exactly as it appeared in the path.
    pub fn raw(&self) -> std::borrow::Cow<'a, str> {
        match self {
            Segment::Plain(s) => std::borrow::Cow::Borrowed(s),
            Segment::Directive(name) => std::borrow::Cow::Owned(format!("{DIRECTIVE_MARKER}{name}")),
        }
    }

    /// The segment as a data identifier. Directives never carry data and
    /// normalize to the empty string.
    pub fn as_identifier(&self) -> String {
        match self {
            Segment::Plain(s) => (*s).to_string(),
            Segment::Directive(_) => String::new(),
        }
    }
}

/// Split `path` into ordered, non-empty, classified segments.
pub fn segment_path(path: &str) -> Vec<Segment<'_>> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(Segment::classify)
        .collect()
}
