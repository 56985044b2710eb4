//! Read-only virtual filesystem abstraction for docview.
//!
//! This crate provides a [`Storage`] trait over a POSIX-like, read-only tree of
//! files and directories with modification times. Components above it (path
//! resolution, directory merging, template and icon loading) never touch the OS
//! filesystem directly, which keeps them testable in memory.
//!
//! # Architecture
//!
//! The crate provides:
//! - [`Storage`] trait with `stat()`, `read_dir()`, `read()` and `open()`
//! - [`FsStorage`] backed by the local filesystem
//! - [`MockStorage`] for testing (behind `mock` feature flag)
//! - [`vpath`] helpers for slash-separated virtual paths with a trailing
//!   directory marker
//!
//! # Example
//!
//! ```ignore
//! use docview_storage::{FsStorage, Storage};
//!
//! let storage = FsStorage::new("/srv");
//! let info = storage.stat("/docs/README.md")?;
//! assert!(!info.is_dir);
//! ```

mod fs;
#[cfg(feature = "mock")]
mod mock;
mod storage;
pub mod vpath;

pub use fs::FsStorage;
#[cfg(feature = "mock")]
pub use mock::MockStorage;
pub use storage::{FileInfo, Storage, StorageError, StorageErrorKind};
