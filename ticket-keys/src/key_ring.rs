//! Bounded, ordered ring of session ticket keys for one TLS context
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
use crate::key_types::{KeyRecord, TicketKeyName};
use std::collections::VecDeque;
use tracing::debug;

/// Result of installing a new encryption key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    /// The key already was the active encryption key
    Duplicate,
    /// The key became the active encryption key; `evicted` older keys were dropped
    Rotated { evicted: usize },
}

/// Result of installing a decryption-only key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecryptionSlot {
    /// A new tail slot was added
    Appended,
    /// The existing tail slot was overwritten
    Replaced,
}

/// Ticket keys for one context
///
/// Slot 0 is the active encryption key. Every later slot is decryption-only,
/// ordered from most to least recently active.
#[derive(Debug, Clone, Default)]
pub struct KeyRing {
    keys: VecDeque<KeyRecord>,
}

impl KeyRing {
    /// Create an empty ring with room for `max_keys` records
    pub fn with_capacity(max_keys: usize) -> TicketKeyResult<Self> {
        if max_keys < 1 {
            return Err(TicketKeyError::InvalidCapacity);
        }

        let mut keys = VecDeque::new();
        keys.try_reserve_exact(max_keys)?;
        Ok(Self { keys })
    }

    /// Make `key` the active encryption key, retaining up to `max_keys` keys
    ///
    /// Re-applying the current active key is a no-op. Only slot 0 is compared,
    /// so a key equal to an older slot is promoted again as a fresh rotation.
    pub fn set_encryption_key(
        &mut self,
        key: KeyRecord,
        max_keys: usize,
    ) -> TicketKeyResult<Rotation> {
        if max_keys < 1 {
            return Err(TicketKeyError::InvalidCapacity);
        }

        if self.keys.front() == Some(&key) {
            debug!(name = %key.name_hex(), "Duplicate ticket key, skipping update");
            return Ok(Rotation::Duplicate);
        }

        let evicted = self.push_front_evicting_tail(key, max_keys)?;
        Ok(Rotation::Rotated { evicted })
    }

    /// Insert `key` at slot 0, shifting every other key one slot toward the tail
    ///
    /// The ring grows by one slot only while it is shorter than `capacity`;
    /// otherwise the tail key is evicted and the length is kept. Returns the
    /// number of evicted keys. On allocation failure the ring is unchanged.
    pub fn push_front_evicting_tail(
        &mut self,
        key: KeyRecord,
        capacity: usize,
    ) -> TicketKeyResult<usize> {
        if capacity < 1 {
            return Err(TicketKeyError::InvalidCapacity);
        }

        let evicted = if self.keys.len() < capacity {
            self.keys.try_reserve(1)?;
            0
        } else {
            self.keys.pop_back();
            1
        };

        self.keys.push_front(key);
        debug!(
            name = %key.name_hex(),
            len = self.keys.len(),
            evicted,
            "Rotated ticket keys"
        );
        Ok(evicted)
    }

    /// Install the single manually injected decryption-only key
    ///
    /// A ring holding only its encryption key grows by one slot regardless of
    /// capacity. Otherwise the tail slot is replaced in place.
    pub fn add_decryption_only_key(&mut self, key: KeyRecord) -> TicketKeyResult<DecryptionSlot> {
        match self.keys.len() {
            0 => Err(TicketKeyError::UninitializedRing),
            1 => {
                self.keys.try_reserve(1)?;
                self.keys.push_back(key);
                debug!(name = %key.name_hex(), "Appended decryption-only ticket key");
                Ok(DecryptionSlot::Appended)
            }
            _ => {
                if let Some(tail) = self.keys.back_mut() {
                    *tail = key;
                }
                debug!(name = %key.name_hex(), "Replaced last ticket decryption key");
                Ok(DecryptionSlot::Replaced)
            }
        }
    }

    /// The active encryption key
    pub fn encryption_key(&self) -> Option<&KeyRecord> {
        self.keys.front()
    }

    /// Find a key by name, returning its slot index
    pub fn find(&self, name: &TicketKeyName) -> Option<(usize, &KeyRecord)> {
        self.keys.iter().enumerate().find(|(_, k)| k.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeyRecord> {
        self.keys.iter()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn to_vec(&self) -> Vec<KeyRecord> {
        self.iter().copied().collect()
    }
}
