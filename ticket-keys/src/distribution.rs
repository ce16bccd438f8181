//! Fan-out of ticket key updates to every registered context
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
use crate::error::TicketKeyError;
use crate::key_ring::Rotation;
use crate::key_store::TicketKeyStore;
use crate::key_types::{ContextHandle, KeyRecord};
use std::sync::Arc;
use tracing::warn;

/// Per-run summary of a key push
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistributionReport {
    /// Contexts whose ring changed
    pub updated: usize,
    /// Contexts that already held the key as their encryption key
    pub unchanged: usize,
    pub failures: Vec<(ContextHandle, TicketKeyError)>,
}

impl DistributionReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Pushes keys to every context of one configuration generation
///
/// Failures are collected per context and never retried here.
pub struct KeyDistributor {
    registry: Arc<ContextRegistry>,
    store: Arc<TicketKeyStore>,
    max_keys: usize,
}

impl KeyDistributor {
    pub fn new(registry: Arc<ContextRegistry>, store: Arc<TicketKeyStore>, max_keys: usize) -> Self {
        Self {
            registry,
            store,
            max_keys,
        }
    }

    /// Registered contexts, in registration order
    pub fn contexts(&self) -> Vec<ContextHandle> {
        let mut buf = vec![ContextHandle::from_raw(0); self.registry.count()];
        self.registry.list(&mut buf);
        buf
    }

    /// Make `key` the encryption key of every registered context
    pub fn push_encryption_key(&self, key: KeyRecord) -> DistributionReport {
        let mut report = DistributionReport::default();
        for ctx in self.contexts() {
            match self.store.set_encryption_key(ctx, key, self.max_keys) {
                Ok(Rotation::Duplicate) => report.unchanged += 1,
                Ok(Rotation::Rotated { .. }) => report.updated += 1,
                Err(e) => {
                    warn!(context = %ctx, error = %e, "Failed to update ticket encryption key");
                    report.failures.push((ctx, e));
                }
            }
        }
        report
    }

    /// Install `key` as the extra decryption-only key of every registered context
    pub fn push_decryption_key(&self, key: KeyRecord) -> DistributionReport {
        self.push_decryption_key_to(key, &self.contexts())
    }

    /// Install `key` as the extra decryption-only key of the given contexts only
    pub fn push_decryption_key_to(
        &self,
        key: KeyRecord,
        contexts: &[ContextHandle],
    ) -> DistributionReport {
        let mut report = DistributionReport::default();
        for &ctx in contexts {
            match self.store.add_decryption_only_key(ctx, key) {
                Ok(_) => report.updated += 1,
                Err(e) => {
                    warn!(context = %ctx, error = %e, "Failed to update ticket decryption key");
                    report.failures.push((ctx, e));
                }
            }
        }
        report
    }

    pub fn registry(&self) -> &ContextRegistry {
        &self.registry
    }

    pub fn store(&self) -> &TicketKeyStore {
        &self.store
    }
}
