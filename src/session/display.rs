use crate::error::{EmitError, RefinementError};
use crate::graph::NodeId;
use serde::Serialize;

/// Where the code on display came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CodeSource {
    Generated,
    Refined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCategory {
    /// The block graph could not be turned into code.
    Generator,
    /// The refinement service failed.
    Collaborator,
}

/// The inline error shown next to the last good code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBanner {
    pub category: ErrorCategory,
    pub message: String,
    /// The block to highlight, for generator errors.
    pub node_id: Option<NodeId>,
}

/// What the display surface shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeState {
    code: String,
    source: CodeSource,
    revision: u64,
    banner: Option<ErrorBanner>,
}

impl Default for CodeState {
    fn default() -> Self {
        Self {
            code: String::new(),
            source: CodeSource::Generated,
            revision: 0,
            banner: None,
        }
    }
}

impl CodeState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last good code.
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn source(&self) -> CodeSource {
        self.source
    }

    /// Graph revision the code belongs to.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn banner(&self) -> Option<&ErrorBanner> {
        self.banner.as_ref()
    }

    /// Records a generation run for graph revision `revision`.
    ///
    /// Refined code is only replaced by a generation of a later revision, i.e.
    /// after the graph was edited. Returns whether the state changed.
    pub fn apply_generation(&mut self, revision: u64, result: Result<String, EmitError>) -> bool {
        let stale = match self.source {
            CodeSource::Refined => revision <= self.revision,
            CodeSource::Generated => revision < self.revision,
        };
        if stale {
            return false;
        }
        match result {
            Ok(code) => {
                self.code = code;
                self.source = CodeSource::Generated;
                self.revision = revision;
                self.banner = None;
            }
            Err(error) => {
                self.banner = Some(ErrorBanner {
                    category: ErrorCategory::Generator,
                    message: error.to_string(),
                    node_id: Some(error.node_id().clone()),
                });
            }
        }
        true
    }

    /// Records a refinement requested against graph revision `revision`.
    pub fn apply_refinement(
        &mut self,
        revision: u64,
        result: Result<String, RefinementError>,
    ) -> bool {
        if revision < self.revision {
            return false;
        }
        match result {
            Ok(code) => {
                self.code = code;
                self.source = CodeSource::Refined;
                self.revision = revision;
                self.banner = None;
            }
            Err(error) => {
                self.banner = Some(ErrorBanner {
                    category: ErrorCategory::Collaborator,
                    message: error.to_string(),
                    node_id: None,
                });
            }
        }
        true
    }

    pub fn dismiss_banner(&mut self) {
        self.banner = None;
    }
}
