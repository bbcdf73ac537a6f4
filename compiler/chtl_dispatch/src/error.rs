//! Dispatcher errors.

use chtl_scanner::ScanError;
use thiserror::Error;

/// A failure that aborts dispatch of a whole file.
///
/// Extension failures never end up here; they are reported per fragment
/// as [`FragmentOutcome::Failed`](crate::FragmentOutcome::Failed).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// The source could not be split into fragments.
    #[error(transparent)]
    Scan(#[from] ScanError),
}
