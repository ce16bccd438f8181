//! TLS session ticket key rotation
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


pub mod context_registry;
pub mod distribution;
pub mod error;
pub mod key_ring;
pub mod key_store;
pub mod key_types;
pub mod status;

pub use context_registry::ContextRegistry;
pub use distribution::{DistributionReport, KeyDistributor};
pub use error::{TicketKeyError, TicketKeyResult};
pub use key_ring::{DecryptionSlot, KeyRing, Rotation};
pub use key_store::{DecryptionMatch, TicketKeyStore};
pub use key_types::{ContextHandle, KeyRecord, TicketKeyName, TICKET_KEY_LEN};
