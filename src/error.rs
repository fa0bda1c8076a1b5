// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Domain failures that callers are expected to see and act on.
///
/// Everything else (SQLite, I/O, serialization) travels as a plain
/// `anyhow::Error`; the HTTP layer downcasts to this type to pick a status.
#[derive(Debug, Error)]
pub enum FinanceError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Validation(String),
}

impl FinanceError {
    pub fn validation(msg: impl Into<String>) -> Self {
        FinanceError::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        FinanceError::Conflict(msg.into())
    }
}
