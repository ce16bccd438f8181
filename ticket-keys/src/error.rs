//! Error types for ticket key management
// Copyright 2025 Francisco F. Pinochet
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use thiserror::Error;

/// Ticket key management errors
///
/// The display strings are short on purpose: they are handed back verbatim
/// as the error message at the status-code boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TicketKeyError {
    #[error("invalid key list size")]
    InvalidCapacity,

    #[error("key allocation failure in ticket key array")]
    AllocationFailure,

    #[error("uninitialized ticket key list")]
    UninitializedRing,

    #[error("ssl session ticket key is not supported")]
    UnsupportedFeature,

    #[error("invalid ticket key length: {0} (expected 48)")]
    InvalidKeyLength(usize),

    #[error("invalid ticket key encoding: {0}")]
    InvalidEncoding(String),
}

impl TicketKeyError {
    /// Static message for callers that can only carry a `&'static str`
    pub fn message(&self) -> &'static str {
        match self {
            TicketKeyError::InvalidCapacity => "invalid key list size",
            TicketKeyError::AllocationFailure => "key allocation failure in ticket key array",
            TicketKeyError::UninitializedRing => "uninitialized ticket key list",
            TicketKeyError::UnsupportedFeature => "ssl session ticket key is not supported",
            TicketKeyError::InvalidKeyLength(_) => "invalid ticket key length",
            TicketKeyError::InvalidEncoding(_) => "invalid ticket key encoding",
        }
    }
}

impl From<std::collections::TryReserveError> for TicketKeyError {
    fn from(_: std::collections::TryReserveError) -> Self {
        TicketKeyError::AllocationFailure
    }
}

/// Result type for ticket key operations
pub type TicketKeyResult<T> = Result<T, TicketKeyError>;
