//! Database repositories for data access layer
//!
//! `transaction` holds the Unit of Work contract and its Postgres implementation,
//! `video` the read-side store and row mapping, `outbox` the event writer.

pub mod outbox;
pub mod transaction;
pub mod video;

pub use transaction::{
    with_transaction, PgUnitOfWork, PgVideoTransaction, TransactionFuture, UnitOfWork,
    VideoTransaction,
};
pub use video::{VideoRepository, VideoRow, VideoStore};
