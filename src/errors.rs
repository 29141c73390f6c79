//! Errors that can occur while loading or rendering a QC report.
//!
//! Nothing in this crate catches or retries any of these errors: every
//! failure aborts the whole render and is surfaced verbatim to the operator.

use std::io;

use thiserror::Error;

/// All errors that can be produced while rendering a report.
#[derive(Debug, Error)]
pub enum Error {
    /// The stage-type tag of a section is not one we know how to render.
    #[error("unknown stage type: `{0}`")]
    UnknownStageType(String),

    /// The input document does not have the expected structure.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// A quality histogram has no data where data is required.
    #[error("missing data: {0}")]
    MissingData(String),

    /// A percentile fraction outside of `[0, 1]` was requested.
    #[error("percentile must be within [0, 1], got {0}")]
    InvalidPercentile(f64),

    /// A template failed to render.
    #[error("could not render template `{template}`")]
    TemplateRender {
        /// The name of the template that failed.
        template: String,

        /// The underlying templating error.
        #[source]
        source: tera::Error,
    },

    /// A chart failed to draw or rasterize.
    #[error("could not render chart: {0}")]
    ChartRender(String),

    /// An I/O error.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// An error raised while rendering a particular stage of the document.
    #[error("failed to render stage `{tag}` (\"{name}\")")]
    Stage {
        /// The stage-type tag of the failing section.
        tag: String,

        /// The display name of the failing report.
        name: String,

        /// The error raised by the stage renderer.
        #[source]
        source: Box<Error>,
    },

    /// An error raised while loading a particular section of the document.
    #[error("invalid {location} of the document")]
    Section {
        /// The section index, with the report name when it is known.
        location: String,

        /// The error raised for the section.
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wraps an error with the stage it was raised in.
    pub fn in_stage<T, N>(self, tag: T, name: N) -> Self
    where
        T: Into<String>,
        N: Into<String>,
    {
        Error::Stage {
            tag: tag.into(),
            name: name.into(),
            source: Box::new(self),
        }
    }

    /// Wraps an error with the document section it was raised for.
    pub fn in_section<L: Into<String>>(self, location: L) -> Self {
        Error::Section {
            location: location.into(),
            source: Box::new(self),
        }
    }

    /// Shorthand for a [`Error::ChartRender`] from anything displayable.
    pub(crate) fn chart<E: std::fmt::Display>(err: E) -> Self {
        Error::ChartRender(err.to_string())
    }
}
