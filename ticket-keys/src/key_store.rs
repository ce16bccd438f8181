//! Per-context ticket key store
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


use crate::error::{TicketKeyError, TicketKeyResult};
use crate::key_ring::{DecryptionSlot, KeyRing, Rotation};
use crate::key_types::{ContextHandle, KeyRecord, TicketKeyName};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{debug, info};

/// A key found for decrypting a ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecryptionMatch {
    pub key: KeyRecord,
    /// The key is no longer the active encryption key; the ticket should be reissued
    pub renew: bool,
}

/// Ticket key rings, one per TLS context
///
/// A context without an entry has never received an encryption key. All
/// mutations take the write lock, so readers never see a half-rotated ring.
pub struct TicketKeyStore {
    rings: RwLock<HashMap<ContextHandle, KeyRing>>,
}

impl Default for TicketKeyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TicketKeyStore {
    pub fn new() -> Self {
        Self {
            rings: RwLock::new(HashMap::new()),
        }
    }

    fn ensure_supported() -> TicketKeyResult<()> {
        if cfg!(feature = "session-tickets") {
            Ok(())
        } else {
            Err(TicketKeyError::UnsupportedFeature)
        }
    }

    /// Make `key` the active encryption key of `ctx`, retaining up to `max_keys` keys
    ///
    /// The ring is created on the first call for a context.
    pub fn set_encryption_key(
        &self,
        ctx: ContextHandle,
        key: KeyRecord,
        max_keys: usize,
    ) -> TicketKeyResult<Rotation> {
        Self::ensure_supported()?;
        if max_keys < 1 {
            return Err(TicketKeyError::InvalidCapacity);
        }

        let mut rings = self.rings.write();
        let outcome = match rings.get_mut(&ctx) {
            Some(ring) => ring.set_encryption_key(key, max_keys)?,
            None => {
                rings.try_reserve(1)?;
                let mut ring = KeyRing::with_capacity(max_keys)?;
                let outcome = ring.set_encryption_key(key, max_keys)?;
                rings.insert(ctx, ring);
                info!(context = %ctx, max_keys, "Initialized ticket key ring");
                outcome
            }
        };

        if let Rotation::Rotated { evicted } = outcome {
            info!(
                context = %ctx,
                name = %key.name_hex(),
                evicted,
                "Updated ticket encryption key"
            );
        }
        Ok(outcome)
    }

    /// Install the extra decryption-only key of `ctx`
    pub fn add_decryption_only_key(
        &self,
        ctx: ContextHandle,
        key: KeyRecord,
    ) -> TicketKeyResult<DecryptionSlot> {
        Self::ensure_supported()?;

        let mut rings = self.rings.write();
        let ring = rings
            .get_mut(&ctx)
            .ok_or(TicketKeyError::UninitializedRing)?;
        let slot = ring.add_decryption_only_key(key)?;
        info!(
            context = %ctx,
            name = %key.name_hex(),
            slot = ?slot,
            "Updated last ticket decryption key"
        );
        Ok(slot)
    }

    /// Active encryption key of `ctx`
    pub fn encryption_key(&self, ctx: ContextHandle) -> Option<KeyRecord> {
        self.rings
            .read()
            .get(&ctx)
            .and_then(|ring| ring.encryption_key().copied())
    }

    /// Look up the key named in a ticket presented to `ctx`
    pub fn find_decryption_key(
        &self,
        ctx: ContextHandle,
        name: &TicketKeyName,
    ) -> Option<DecryptionMatch> {
        let rings = self.rings.read();
        let (slot, key) = rings.get(&ctx)?.find(name)?;
        Some(DecryptionMatch {
            key: *key,
            renew: slot != 0,
        })
    }

    /// Snapshot of the ring of `ctx` in slot order
    pub fn keys(&self, ctx: ContextHandle) -> Option<Vec<KeyRecord>> {
        self.rings.read().get(&ctx).map(KeyRing::to_vec)
    }

    /// Drop the ring of a destroyed context
    pub fn remove_context(&self, ctx: ContextHandle) -> bool {
        let removed = self.rings.write().remove(&ctx).is_some();
        if removed {
            debug!(context = %ctx, "Removed ticket key ring");
        }
        removed
    }

    pub fn is_initialized(&self, ctx: ContextHandle) -> bool {
        self.rings.read().contains_key(&ctx)
    }

    /// Number of contexts holding an initialized ring
    pub fn context_count(&self) -> usize {
        self.rings.read().len()
    }
}
