//! `qcpp-report` renders the YAML report written by the `qcpp` read quality
//! control pipeline into one self-contained HTML page. This package is
//! composed of both a library crate, as well as a binary crate.
//!
//! A report is first loaded and validated into a [`document::Document`].
//! Each of its stages is then rendered by the renderer registered for its
//! stage type (see [`stages::StageKind`]) into an HTML fragment, and the
//! fragments are assembled into the final page by [`render::render_document`].
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![warn(rust_2021_compatibility)]

pub mod document;
pub mod errors;
pub mod list;
pub mod plot;
pub mod quality;
pub mod render;
pub mod stages;
pub mod templates;
pub mod utils;

pub use errors::Error;
