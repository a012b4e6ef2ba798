//! Classification of wrapped call results.
//!
//! The board never looks inside a response. It only asks whether the value
//! counts as a success or a failure, and how to build the "nothing useful"
//! value it hands back while the breaker is open.

use crate::webhook::SyncResponse;

/// How a returned value counts toward breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observed {
    Success,
    Failure,
}

/// A value a wrapped webhook call can return.
pub trait CallOutcome: Sized {
    /// `None` means the value is not counted at all.
    fn observed(&self) -> Option<Observed>;

    /// Value returned instead of calling the endpoint while the breaker is
    /// open: no usable response and no error.
    fn short_circuit() -> Self;
}

impl<T> CallOutcome for Option<T> {
    fn observed(&self) -> Option<Observed> {
        Some(if self.is_some() {
            Observed::Success
        } else {
            Observed::Failure
        })
    }

    fn short_circuit() -> Self {
        None
    }
}

impl CallOutcome for SyncResponse {
    fn observed(&self) -> Option<Observed> {
        Some(if self.error.is_none() && self.has_content() {
            Observed::Success
        } else {
            Observed::Failure
        })
    }

    fn short_circuit() -> Self {
        SyncResponse::empty()
    }
}

/// Errors belong to the caller; they are passed back untouched and not
/// counted.
impl<T: CallOutcome, E> CallOutcome for Result<T, E> {
    fn observed(&self) -> Option<Observed> {
        match self {
            Ok(value) => value.observed(),
            Err(_) => None,
        }
    }

    fn short_circuit() -> Self {
        Ok(T::short_circuit())
    }
}
