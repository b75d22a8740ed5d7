//! Playback link signing
//!
//! A playback link is `/api/streams/{hash}/{expires}/{video_id}/index.m3u8`, where `hash` is
//! HMAC-SHA256 over `"{expires}{video_id}"` keyed with the service secret, base64url without
//! padding. Links are verified with a constant-time comparison before any stream is resolved.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use clipvault_core::constants::{DEFAULT_STREAM_OBJECT, PLAYBACK_LINK_TTL};
use clipvault_core::AppError;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

use crate::constants::STREAMS_PREFIX;

type HmacSha256 = Hmac<Sha256>;

/// Keyed signer for playback links. Built once from configuration at startup.
#[derive(Clone)]
pub struct PlaybackSigner {
    mac: HmacSha256,
}

impl std::fmt::Debug for PlaybackSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackSigner").finish_non_exhaustive()
    }
}

impl PlaybackSigner {
    pub fn new(secret: &[u8]) -> Result<Self, AppError> {
        if secret.is_empty() {
            return Err(AppError::Internal(
                "Playback signing secret must not be empty".to_string(),
            ));
        }
        let mac = HmacSha256::new_from_slice(secret)
            .map_err(|e| AppError::Internal(format!("Invalid playback signing key: {}", e)))?;
        Ok(Self { mac })
    }

    fn keyed(&self, expires: i64, video_id: Uuid) -> HmacSha256 {
        let mut mac = self.mac.clone();
        mac.update(expires.to_string().as_bytes());
        mac.update(video_id.to_string().as_bytes());
        mac
    }

    /// URL-safe signature for `(expires, video_id)`.
    pub fn sign(&self, expires: i64, video_id: Uuid) -> String {
        URL_SAFE_NO_PAD.encode(self.keyed(expires, video_id).finalize().into_bytes())
    }

    /// Signed path valid until `now` plus the playback horizon.
    pub fn signed_path(&self, video_id: Uuid, now: DateTime<Utc>) -> String {
        let expires = now.timestamp() + PLAYBACK_LINK_TTL.as_secs() as i64;
        let hash = self.sign(expires, video_id);
        format!(
            "{}/{}/{}/{}/{}",
            STREAMS_PREFIX, hash, expires, video_id, DEFAULT_STREAM_OBJECT
        )
    }

    /// Check a presented `(hash, expires, video_id)` triple. Expired links and signatures that
    /// do not match fail alike with `InvalidSignature`.
    pub fn verify(
        &self,
        hash: &str,
        expires: i64,
        video_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        if now.timestamp() > expires {
            return Err(AppError::InvalidSignature);
        }

        let presented = URL_SAFE_NO_PAD
            .decode(hash)
            .map_err(|_| AppError::InvalidSignature)?;

        self.keyed(expires, video_id)
            .verify_slice(&presented)
            .map_err(|_| AppError::InvalidSignature)
    }
}
