//! Unified error type.

use crate::config::ConfigError;
use crate::db::DbError;

/// The error type returned by keel's fallible operations.
///
/// Application-level errors (404, 422, etc.) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s. This type surfaces
/// startup and infrastructure failures: bad configuration, an unreachable
/// database, a port that cannot be bound.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Db(#[from] DbError),
}
