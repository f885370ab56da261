//! Error and diagnostic types.
//!
//! Rendering itself never fails. [`Error`] only covers decoding host input
//! (context JSON, option JSON); [`RenderIssue`] describes how a render was
//! degraded so an editor can point the author at it.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid context JSON: {0}")]
    Context(#[source] serde_json::Error),

    #[error("Invalid render options: {0}")]
    Options(#[source] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// A non-fatal degradation observed while rendering.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderIssue {
    #[error("Unresolved path `{0}` rendered as empty text")]
    UnresolvedPath(String),

    #[error("`#each {0}` does not resolve to an array; block removed")]
    UnresolvedArray(String),

    #[error("Condition `{0}` is not a valid comparison; evaluated as an existence check")]
    MalformedCondition(String),

    /// `offset` is a byte position in the text as it stood after every
    /// resolvable block had been expanded.
    #[error("Unmatched `{directive}` opener left as text (byte {offset} of the expanded template)")]
    UnmatchedBlock { directive: &'static str, offset: usize },

    #[error("Stopped expanding blocks after {0} passes")]
    PassLimitReached(usize),
}

/// Output of a render together with every degradation it went through.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    pub output: String,
    pub issues: Vec<RenderIssue>,
}

impl Rendered {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}
