//! Listing of the stage types a report can be rendered for.

pub mod command;
