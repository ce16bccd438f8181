//! Ticket key record and context handle types
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
use std::fmt;

/// Length of each key record field
pub const TICKET_KEY_FIELD_LEN: usize = 16;

/// Length of a full key record: name, AES key, HMAC key
pub const TICKET_KEY_LEN: usize = 3 * TICKET_KEY_FIELD_LEN;

/// Name identifying a ticket key inside issued tickets
pub type TicketKeyName = [u8; TICKET_KEY_FIELD_LEN];

/// Opaque identity of a TLS context owned by the server configuration
///
/// Two handles are the same context exactly when their raw values match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextHandle(u64);

impl ContextHandle {
    pub const fn from_raw(raw: u64) -> Self {
        ContextHandle(raw)
    }
}

impl fmt::Display for ContextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx#{:x}", self.0)
    }
}

/// A 48-byte session ticket key
///
/// Layout of the raw form: bytes 0..16 name, 16..32 AES key, 32..48 HMAC key.
/// Equality covers all 48 bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyRecord {
    name: TicketKeyName,
    aes_key: [u8; TICKET_KEY_FIELD_LEN],
    hmac_key: [u8; TICKET_KEY_FIELD_LEN],
}

impl KeyRecord {
    fn new(
        name: TicketKeyName,
        aes_key: [u8; TICKET_KEY_FIELD_LEN],
        hmac_key: [u8; TICKET_KEY_FIELD_LEN],
    ) -> Self {
        Self {
            name,
            aes_key,
            hmac_key,
        }
    }

    pub fn from_array(raw: &[u8; TICKET_KEY_LEN]) -> Self {
        let mut name = [0u8; TICKET_KEY_FIELD_LEN];
        let mut aes_key = [0u8; TICKET_KEY_FIELD_LEN];
        let mut hmac_key = [0u8; TICKET_KEY_FIELD_LEN];
        name.copy_from_slice(&raw[..16]);
        aes_key.copy_from_slice(&raw[16..32]);
        hmac_key.copy_from_slice(&raw[32..]);
        Self::new(name, aes_key, hmac_key)
    }

    /// Parse a record from raw bytes, which must be exactly 48 long
    pub fn from_bytes(raw: &[u8]) -> TicketKeyResult<Self> {
        let raw: &[u8; TICKET_KEY_LEN] = raw
            .try_into()
            .map_err(|_| TicketKeyError::InvalidKeyLength(raw.len()))?;
        Ok(Self::from_array(raw))
    }

    /// Parse a hex-encoded record, ignoring surrounding whitespace
    pub fn from_hex(encoded: &str) -> TicketKeyResult<Self> {
        let raw = hex::decode(encoded.trim())
            .map_err(|e| TicketKeyError::InvalidEncoding(e.to_string()))?;
        Self::from_bytes(&raw)
    }

    pub fn to_bytes(&self) -> [u8; TICKET_KEY_LEN] {
        let mut raw = [0u8; TICKET_KEY_LEN];
        raw[..16].copy_from_slice(&self.name);
        raw[16..32].copy_from_slice(&self.aes_key);
        raw[32..].copy_from_slice(&self.hmac_key);
        raw
    }

    pub fn name(&self) -> &TicketKeyName {
        &self.name
    }

    pub fn aes_key(&self) -> &[u8; TICKET_KEY_FIELD_LEN] {
        &self.aes_key
    }

    pub fn hmac_key(&self) -> &[u8; TICKET_KEY_FIELD_LEN] {
        &self.hmac_key
    }

    /// Hex form of the key name, safe to log
    pub fn name_hex(&self) -> String {
        hex::encode(self.name)
    }
}

impl fmt::Debug for KeyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyRecord")
            .field("name", &self.name_hex())
            .field("aes_key", &"<redacted>")
            .field("hmac_key", &"<redacted>")
            .finish()
    }
}
