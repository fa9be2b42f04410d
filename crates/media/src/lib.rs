//! Media resolver: content-type policy, upload staging, remote-URL fetch.
//!
//! Every uploaded item is validated against the format policy *before* its
//! staged file is considered committed, so a rejected item never leaves an
//! orphaned file behind.

pub mod error;
pub mod fetch;
pub mod policy;
pub mod staging;

pub use {
    error::{Error, Result},
    fetch::{FetchedMedia, fetch_remote, file_name_from_url},
    policy::{MAX_MEDIA_BYTES, MediaKind, check_size, classify},
    staging::StagedUpload,
};
