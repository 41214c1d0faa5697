//! Post extraction for WordPress admin pages.
//!
//! An in-page script captures a [`PageSnapshot`] of the list table or the
//! editor, and [`extract`] turns it into post records.

// Sub-modules
pub mod extractors;
pub mod js_scripts;
pub mod schema;
pub mod snapshot;

// Re-exports for public API
pub use extractors::{ExtractionOutcome, extract, remove_shortcodes};
pub use schema::{ImageKind, ImageRef, PostRecord, PostStatus};
pub use snapshot::{AcfFieldSnapshot, EditorSnapshot, ListRow, PageSnapshot, RawImage};
