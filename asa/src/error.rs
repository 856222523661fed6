use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error that can be returned by [`crate::agds::Column`] methods.
#[derive(Debug, Error)]
pub enum Error {
    /// No value has been attached to this row in this column.
    #[error("no value attached to row {0} in this column")]
    RowNotFound(crate::agds::RowId),
}
