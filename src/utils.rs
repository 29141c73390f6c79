//! Utilities that are used across the renderers.

pub mod display;
