// ABOUTME: Rendering error types with SNAFU pattern.
// ABOUTME: Wraps template parse/execute failures and output sink errors behind one type.

use crate::template::TemplateError;
use snafu::Snafu;

/// Failure of one render pass.
///
/// Both template variants keep the evaluator's message verbatim behind the
/// `template parsing error:` prefix users already recognize.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RenderError {
    #[snafu(display("template parsing error: {source}"))]
    Parse { source: TemplateError },

    #[snafu(display("template parsing error: {source}"))]
    Execute { source: TemplateError },

    #[snafu(display("failed to write output: {source}"))]
    Output { source: std::io::Error },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderErrorKind {
    /// The format could not be compiled; nothing was written.
    TemplateParse,
    /// A record failed to evaluate.
    TemplateExecute,
    /// The output sink rejected a write.
    Output,
}

impl RenderError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> RenderErrorKind {
        match self {
            RenderError::Parse { .. } => RenderErrorKind::TemplateParse,
            RenderError::Execute { .. } => RenderErrorKind::TemplateExecute,
            RenderError::Output { .. } => RenderErrorKind::Output,
        }
    }
}

impl From<std::io::Error> for RenderError {
    fn from(source: std::io::Error) -> Self {
        RenderError::Output { source }
    }
}
