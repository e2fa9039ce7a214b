use std::io;

use thiserror::Error;

/// A specialized `Result` type for obfuscated cell operations.
pub type Result<T, E = Error> = core::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum Error {
    /// The secret memory backing a cell could not be mapped.
    #[error("failed to allocate a {len} byte obfuscation buffer: {source}")]
    AllocationFailed {
        len: usize,
        #[source]
        source: io::Error,
    },
}
