//! Fixed limits and expiry horizons.
//!
//! These are capability limits of the service, not per-request knobs.

use std::time::Duration;

/// Smallest part a multipart upload is split into (matches the S3 multipart minimum).
pub const MIN_PART_SIZE: u64 = 5 * 1024 * 1024;

/// Hard ceiling on parts per upload. 10,000 x 5 MiB caps a source video at ~50 GB.
pub const MAX_PART_COUNT: u64 = 10_000;

/// Lifetime of a presigned per-part upload URL.
pub const UPLOAD_PART_URL_TTL: Duration = Duration::from_secs(60 * 60);

/// Lifetime of a signed playback path handed to viewers.
pub const PLAYBACK_LINK_TTL: Duration = Duration::from_secs(2 * 60 * 60);

/// Lifetime of the temporary storage URL a stream request is redirected to.
pub const STREAM_URL_TTL: Duration = Duration::from_secs(5 * 60);

/// Playlist served when a stream request names no object.
pub const DEFAULT_STREAM_OBJECT: &str = "index.m3u8";

/// MIME type of the HLS playlist returned with playback info.
pub const PLAYBACK_MIME_TYPE: &str = "application/x-mpegURL";

/// Minimum accepted length of the playback signing secret.
pub const MIN_SIGNING_SECRET_LEN: usize = 32;

/// Most tags a video carries; extra tags are dropped.
pub const MAX_TAGS: usize = 10;

/// Longest accepted tag, in characters.
pub const MAX_TAG_LEN: usize = 32;

/// Page size of public listings when the caller gives none.
pub const DEFAULT_LIST_LIMIT: i64 = 20;

/// Largest page size of public listings.
pub const MAX_LIST_LIMIT: i64 = 100;
