use std::io;
use std::path::PathBuf;

use futil_core::BindingError;
use futil_lib::Diagnostics;

use super::package_locator::PackageError;

/// Everything that can stop a `futil` run.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(&'static str),

    #[error(transparent)]
    Binding(#[from] BindingError),

    #[error(transparent)]
    PackageLookup(#[from] PackageError),

    #[error("failed to read template '{}': {reason}{}", path.display(), did_you_mean(suggestion))]
    TemplateRead {
        path: PathBuf,
        reason: String,
        suggestion: Option<String>,
    },

    /// Parse or execution failure, located in the template text.
    #[error("{}:{summary}", path.display())]
    Template {
        path: PathBuf,
        summary: String,
        diagnostics: Diagnostics,
        text: String,
    },

    #[error("failed to serialize context: {0}")]
    Dump(#[from] serde_json::Error),

    #[error("failed to write '{}': {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CliError {
    /// Annotated snippets for template errors.
    pub fn render_diagnostics(&self, colored: bool) -> Option<String> {
        let CliError::Template {
            path,
            diagnostics,
            text,
            ..
        } = self
        else {
            return None;
        };
        let path = path.to_string_lossy();
        Some(
            diagnostics
                .printer(text)
                .path(&path)
                .colored(colored)
                .render(),
        )
    }
}

fn did_you_mean(suggestion: &Option<String>) -> String {
    suggestion
        .as_ref()
        .map(|kind| format!(" (did you mean '{kind}'?)"))
        .unwrap_or_default()
}
