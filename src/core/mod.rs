//! Core types shared across the build.

mod kind;
mod session;

pub use kind::StageKind;
pub use session::BuildSession;
