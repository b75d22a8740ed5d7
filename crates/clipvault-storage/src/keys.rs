//! Shared key generation for storage backends.
//!
//! Key format: `videos/{video_id}/source` for the uploaded original and
//! `videos/{video_id}/stream/` as the prefix for transcoded renditions.

use uuid::Uuid;

/// Storage key of the original upload for a video.
pub fn source_key(video_id: Uuid) -> String {
    format!("videos/{}/source", video_id)
}

/// Prefix under which transcoded renditions of a video are written.
pub fn stream_key(video_id: Uuid) -> String {
    format!("videos/{}/stream/", video_id)
}

/// Join an already-normalized relative object path onto a stream prefix.
pub fn stream_object_key(stream_key: &str, object_path: &str) -> String {
    format!(
        "{}/{}",
        stream_key.trim_end_matches('/'),
        object_path.trim_start_matches('/')
    )
}
