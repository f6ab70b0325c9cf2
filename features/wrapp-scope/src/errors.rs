use thiserror::Error;

use crate::types::DynError;

/// Errors surfaced by a state change of an [Observable](crate::observable::Observable)
///
/// Absence of a service or scope is never an error, lookups return `None` instead.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// A listener failed, the remaining listeners of this pass were not notified
    #[error("Listener failed during notification: {source}")]
    ListenerFailed {
        #[source]
        source: DynError,
    },
}
