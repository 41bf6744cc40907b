//! Asset collection and transforms.

pub mod minify;
mod scan;

pub use scan::collect_stage_files;
