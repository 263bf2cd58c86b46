//! Error types for tiered-simd.
//!
//! Only two things can fail recoverably: the aligned allocator, and parsing a
//! tier name. Misaligned pointers, out-of-range lanes and bad masked ranges
//! are `unsafe` preconditions, not errors.

use std::fmt;
use thiserror::Error;

/// Error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Invalid argument provided.
    InvalidArgument,
    /// The allocator could not satisfy the request.
    ResourceExhausted,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::InvalidArgument => write!(f, "INVALID_ARGUMENT"),
            ErrorCode::ResourceExhausted => write!(f, "RESOURCE_EXHAUSTED"),
        }
    }
}

/// Main error type for tiered-simd operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct SimdError {
    code: ErrorCode,
    message: String,
}

impl SimdError {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Get the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidArgument, msg)
    }

    /// Create a resource exhausted error.
    pub fn resource_exhausted(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ResourceExhausted, msg)
    }

    /// True if the allocator ran out of memory.
    pub fn is_allocation_failure(&self) -> bool {
        self.code == ErrorCode::ResourceExhausted
    }
}

/// Result type alias for tiered-simd operations.
pub type Result<T> = std::result::Result<T, SimdError>;
