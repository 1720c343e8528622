//! Core library: image listing, paging, class mapping and label writing.

pub mod config;
pub mod error;
pub mod labeler;
pub mod labels;
pub mod pagination;
pub mod store;

pub use error::StoreError;
