//! Definition of errors.

use std::error::Error;
use std::fmt;

/// A specialized Result type for this crate.
pub type Result<T, E = DafoError> = std::result::Result<T, E>;

/// Errors in dafo.
#[derive(Debug)]
pub enum DafoError {
    /// Contains [`AutomatonScaleError`].
    AutomatonScale(AutomatonScaleError),
}

impl fmt::Display for DafoError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::AutomatonScale(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl Error for DafoError {}

impl DafoError {
    pub(crate) const fn automaton_scale(arg: &'static str, max: u32) -> Self {
        Self::AutomatonScale(AutomatonScaleError { arg, max })
    }
}

/// Error used when the scale of the automaton exceeds the expected one.
#[derive(Debug)]
pub struct AutomatonScaleError {
    /// Name of the exceeded value.
    arg: &'static str,

    /// The maximum allowed value.
    max: u32,
}

impl fmt::Display for AutomatonScaleError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "AutomatonScaleError: {} must be <= {}", self.arg, self.max)
    }
}

impl Error for AutomatonScaleError {}
