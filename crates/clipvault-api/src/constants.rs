//! API constants
//!
//! Route prefixes and the headers used to hand stream requests to the reverse proxy.

/// Prefix of signed playback paths; the full layout is
/// `/api/streams/{hash}/{expires}/{video_id}/{object}`.
pub const STREAMS_PREFIX: &str = "/api/streams";

/// Internal location the reverse proxy serves presigned storage URLs from
pub const INTERNAL_PROXY_LOCATION: &str = "/internal-s3-proxy";

pub const X_ACCEL_REDIRECT: &str = "x-accel-redirect";

pub const X_S3_SIGNED_URL: &str = "x-s3-signed-url";

/// Largest JSON body accepted; requests carry at most 10 000 part descriptors
pub const MAX_REQUEST_BODY_BYTES: usize = 2 * 1024 * 1024;
