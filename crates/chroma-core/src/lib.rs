//! View-model layer of the Chroma back-office.
//!
//! Reads raw scan and palette records from a [`source::RecordSource`],
//! normalizes them into [`chroma_types::activity::ActivityLog`] entries,
//! merges them into one timeline, and pages through single collections.
//! Every fetch goes through a generation-guarded [`view::ViewModel`] so a
//! late response can never overwrite a newer one.

pub mod error;
pub mod http;
pub mod normalize;
pub mod pagination;
pub mod session;
pub mod source;
pub mod sqlite;
pub mod stats;
pub mod timeline;
pub mod validate;
pub mod view;

pub use error::CoreError;
