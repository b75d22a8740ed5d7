//! Clipvault persistence layer
//!
//! Postgres-backed Unit of Work for the video aggregate, the transactional outbox and
//! the read-only video store used by the playback gate.

pub mod db;

pub use db::{
    with_transaction, PgUnitOfWork, TransactionFuture, UnitOfWork, VideoRepository,
    VideoStore, VideoTransaction,
};
