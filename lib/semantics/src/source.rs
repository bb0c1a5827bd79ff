//! Source files and their parsed syntax trees.

use std::path::Path;

use crate::error::SemanticsError;

/// A source file scheduled for analysis. Keeps the raw text around so
/// later stages can slice spans out of it (diagnostics, body logging).
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: String,
    pub text: String,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }

    /// Read a source file from disk.
    pub fn read(path: &Path) -> Result<Self, SemanticsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SemanticsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::new(path.display().to_string(), text))
    }
}

/// A parsed source file. Span byte ranges on nodes inside `file` index
/// into `text`.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    pub path: String,
    pub text: String,
    pub file: syn::File,
}

impl SyntaxTree {
    /// Parse a source file. Syntax errors carry the file path and the
    /// error position.
    pub fn parse(source: &SourceFile) -> Result<Self, SemanticsError> {
        let file = syn::parse_file(&source.text).map_err(|err| {
            let start = err.span().start();
            SemanticsError::Parse {
                path: source.path.clone(),
                line: start.line,
                column: start.column + 1,
                message: err.to_string(),
            }
        })?;
        Ok(Self {
            path: source.path.clone(),
            text: source.text.clone(),
            file,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_source() {
        let src = SourceFile::new("ok.rs", "pub struct Item { pub id: i32 }");
        let tree = SyntaxTree::parse(&src).unwrap();
        assert_eq!(tree.file.items.len(), 1);
        assert_eq!(tree.path, "ok.rs");
    }

    #[test]
    fn syntax_error_names_the_file() {
        let src = SourceFile::new("broken.rs", "struct {");
        let err = SyntaxTree::parse(&src).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("broken.rs"), "got: {msg}");
    }
}
