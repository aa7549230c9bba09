//! Source positions.
//!
//! A [`Span`] is a byte range plus the line/column of its start, used by
//! every stage from the lexer (token spans) through the emitter (diagnostic
//! spans). [`SourceMap`] owns the loaded source text; Mini-C only ever
//! compiles a single file, but the map is still indexed by [`FileId`] so
//! the diagnostic machinery does not need a single-file special case.

use crate::error::{SourceMapError, SourceMapResult};

/// Identifies a source file registered with a [`SourceMap`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub u32);

impl FileId {
    pub const DUMMY: FileId = FileId(u32::MAX);
}

impl std::fmt::Debug for FileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FileId({})", self.0)
    }
}

impl Default for FileId {
    fn default() -> Self {
        FileId::DUMMY
    }
}

/// A byte range in a source file, with the line/column of its start for
/// quick diagnostic rendering without re-scanning the file.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
    pub file_id: FileId,
}

impl Span {
    pub const DUMMY: Span = Span {
        start: 0,
        end: 0,
        line: 0,
        column: 0,
        file_id: FileId::DUMMY,
    };

    pub fn new(start: usize, end: usize, line: u32, column: u32, file_id: FileId) -> Self {
        Self {
            start,
            end,
            line,
            column,
            file_id,
        }
    }

    pub fn point(pos: usize, line: u32, column: u32, file_id: FileId) -> Self {
        Self::new(pos, pos, line, column, file_id)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// The smallest span covering both `self` and `other`. Keeps `self`'s
    /// line/column, matching the convention that a merged span reports the
    /// position of its left-most constituent.
    pub fn merge(&self, other: &Span) -> Span {
        let (start, line, column) = if self.start <= other.start {
            (self.start, self.line, self.column)
        } else {
            (other.start, other.line, other.column)
        };
        Span {
            start,
            end: self.end.max(other.end),
            line,
            column,
            file_id: self.file_id,
        }
    }
}

impl std::fmt::Debug for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{} ({}..{})",
            self.file_id.0, self.line, self.column, self.start, self.end
        )
    }
}

/// A single loaded source file: its path, its full text, and the byte
/// offset at which each line starts (line 1 starts at offset 0).
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: String,
    pub content: String,
    line_starts: Vec<usize>,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        let mut line_starts = vec![0];
        for (i, b) in content.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self {
            path: path.into(),
            content,
            line_starts,
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Returns the source text of the given 1-based line number, without
    /// its trailing newline.
    pub fn line_text(&self, line: u32) -> Option<&str> {
        let idx = (line as usize).checked_sub(1)?;
        let start = *self.line_starts.get(idx)?;
        let end = self
            .line_starts
            .get(idx + 1)
            .map(|&s| s.saturating_sub(1))
            .unwrap_or(self.content.len());
        self.content.get(start..end)
    }
}

/// Owns every file loaded during a compile, keyed by [`FileId`].
#[derive(Debug, Default)]
pub struct SourceMap {
    files: Vec<SourceFile>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self { files: Vec::new() }
    }

    pub fn add_file(&mut self, path: impl Into<String>, content: impl Into<String>) -> FileId {
        let id = FileId(self.files.len() as u32);
        self.files.push(SourceFile::new(path, content));
        id
    }

    pub fn get(&self, id: FileId) -> SourceMapResult<&SourceFile> {
        self.files
            .get(id.0 as usize)
            .ok_or(SourceMapError::UnknownFile(id))
    }

    pub fn line_text(&self, span: Span) -> Option<&str> {
        self.get(span.file_id).ok()?.line_text(span.line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_starts_track_newlines() {
        let file = SourceFile::new("t.mc", "int a;\nint b;\n");
        assert_eq!(file.line_text(1), Some("int a;"));
        assert_eq!(file.line_text(2), Some("int b;"));
    }

    #[test]
    fn single_line_file_has_one_line() {
        let file = SourceFile::new("t.mc", "int a;");
        assert_eq!(file.line_count(), 1);
        assert_eq!(file.line_text(1), Some("int a;"));
    }

    #[test]
    fn source_map_round_trips_registered_file() {
        let mut map = SourceMap::new();
        let id = map.add_file("t.mc", "int main() { return 0; }");
        assert_eq!(map.get(id).unwrap().path, "t.mc");
    }

    #[test]
    fn unknown_file_id_is_an_error() {
        let map = SourceMap::new();
        assert!(map.get(FileId(0)).is_err());
    }

    #[test]
    fn span_merge_takes_the_union() {
        let file_id = FileId(0);
        let a = Span::new(5, 10, 1, 6, file_id);
        let b = Span::new(8, 20, 1, 9, file_id);
        let merged = a.merge(&b);
        assert_eq!(merged.start, 5);
        assert_eq!(merged.end, 20);
    }
}
