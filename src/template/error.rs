// ABOUTME: Error type for template parsing and execution.
// ABOUTME: Messages follow the `template: :line[:col]: ...` convention users already know.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// The template text could not be compiled.
    #[error("template: :{line}: {message}")]
    Parse { line: usize, message: String },

    /// A node failed while executing against a context.
    #[error("template: :{line}:{col}: executing \"\" at <{node}>: {message}")]
    Exec {
        line: usize,
        col: usize,
        node: String,
        message: String,
    },
}

impl TemplateError {
    pub(crate) fn parse(src: &str, pos: usize, message: impl Into<String>) -> Self {
        let (line, _) = location(src, pos);
        TemplateError::Parse {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn exec(
        src: &str,
        pos: usize,
        node: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let (line, col) = location(src, pos);
        TemplateError::Exec {
            line,
            col,
            node: node.into(),
            message: message.into(),
        }
    }

    /// Whether the error was raised before any output was produced.
    pub fn is_parse(&self) -> bool {
        matches!(self, TemplateError::Parse { .. })
    }
}

/// 1-based line and 0-based byte column of `pos` within `src`.
fn location(src: &str, pos: usize) -> (usize, usize) {
    let pos = pos.min(src.len());
    let before = &src[..pos];
    let line = 1 + before.matches('\n').count();
    let col = match before.rfind('\n') {
        Some(nl) => pos - (nl + 1),
        None => pos,
    };
    (line, col)
}
