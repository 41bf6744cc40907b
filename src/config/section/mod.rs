//! Configuration section definitions.
//!
//! Each module corresponds to a section in `velvet.toml`:
//!
//! | Module    | TOML Section  | Purpose                                   |
//! |-----------|---------------|-------------------------------------------|
//! | `build`   | `[build]`     | Source/build paths, stage dirs, revisions |
//! | `objects` | `[[objects]]` | Explicit site objects and their variants  |
//! | `hooks`   | `hooks = ..`  | Render hooks attached to an object        |

pub mod build;
mod hooks;
mod objects;

pub use build::{BuildSectionConfig, DirsConfig, HashPlacement, RevisionConfig};
pub use hooks::{HookConfig, ObjectHooksConfig};
pub use objects::ObjectEntry;
