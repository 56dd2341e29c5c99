//! Shared domain model for the folio editorial backend.
//!
//! This crate defines the types exchanged between a CMS host and a backend
//! implementation: the collection/entry model the host supplies, the file
//! descriptors that flow through the fetch and persistence pipelines, and
//! the options controlling commits.

pub mod models;
pub mod paths;

pub use models::{
    Collection, CollectionFile, FetchedFile, FileHandle, FilePayload, MediaRecord, PersistOptions,
};
pub use paths::{file_extension, trim_leading_slash};
