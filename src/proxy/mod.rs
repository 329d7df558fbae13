//! Output side of the pipeline: metadata rewriting, playlist assembly and
//! persistence.

pub mod generator;
pub mod rewriter;

pub use generator::{OutputEntry, PlaylistAssembler, PlaylistWriter};
pub use rewriter::{derived_display_name, render_extinf, rewrite};
