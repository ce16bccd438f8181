//! Status-code entry points for the TLS server's key-distribution hooks
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


use crate::context_registry::ContextRegistry;
use crate::error::TicketKeyResult;
use crate::key_store::TicketKeyStore;
use crate::key_types::{ContextHandle, KeyRecord};

pub const STATUS_OK: i32 = 0;
pub const STATUS_ERROR: i32 = -1;

/// Outcome of a key update: a status code plus an error message on failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateStatus {
    pub code: i32,
    pub err: Option<&'static str>,
}

impl UpdateStatus {
    pub fn is_ok(&self) -> bool {
        self.code == STATUS_OK
    }
}

impl<T> From<TicketKeyResult<T>> for UpdateStatus {
    fn from(result: TicketKeyResult<T>) -> Self {
        match result {
            Ok(_) => UpdateStatus {
                code: STATUS_OK,
                err: None,
            },
            Err(e) => UpdateStatus {
                code: STATUS_ERROR,
                err: Some(e.message()),
            },
        }
    }
}

/// Push raw key bytes as the new encryption key of `ctx`
pub fn update_ticket_encryption_key(
    store: &TicketKeyStore,
    ctx: ContextHandle,
    key: &[u8],
    max_keys: usize,
) -> UpdateStatus {
    KeyRecord::from_bytes(key)
        .and_then(|key| store.set_encryption_key(ctx, key, max_keys))
        .into()
}

/// Push raw key bytes as the extra decryption-only key of `ctx`
pub fn update_last_ticket_decryption_key(
    store: &TicketKeyStore,
    ctx: ContextHandle,
    key: &[u8],
) -> UpdateStatus {
    KeyRecord::from_bytes(key)
        .and_then(|key| store.add_decryption_only_key(ctx, key))
        .into()
}

pub fn ssl_ctx_count(registry: &ContextRegistry) -> usize {
    registry.count()
}

/// Same precondition as [`ContextRegistry::list`]: `buf` holds at least `ssl_ctx_count` entries.
pub fn ssl_ctx_list(registry: &ContextRegistry, buf: &mut [ContextHandle]) -> i32 {
    registry.list(buf);
    STATUS_OK
}
