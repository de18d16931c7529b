#![deny(missing_docs)]
//! Shipwright core library.
//!
//! Release level classification and changelog rendering shared by the
//! publisher and the command-line interface.

pub mod changelog;
pub mod error;
pub mod fs;
pub mod release;
pub mod report;

pub use changelog::{
    ChangelogContext, MISSING_NOTES_TEXT, MISSING_TEMPLATE_TEXT, ReleaseNotesInput, apply_context,
    notes_candidates, render_release_notes, template_path, unknown_tokens, write_release_notes,
};
pub use error::{Result, ShipwrightError};
pub use fs::{FileSystem, StdFileSystem};
pub use release::{ReleaseLevel, VersionDescriptor, classify};
pub use report::{LevelReport, render_json, render_level_text};
