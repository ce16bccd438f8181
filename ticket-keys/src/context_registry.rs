//! Registry of TLS contexts that take session ticket keys
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


use crate::error::TicketKeyResult;
use crate::key_types::ContextHandle;
use tracing::debug;

/// Ordered, deduplicated set of context handles
///
/// Filled while the server configuration is merged, then shared read-only
/// (typically behind an `Arc`) for the lifetime of that configuration. A reload
/// builds a new registry instead of mutating this one.
#[derive(Debug, Clone, Default)]
pub struct ContextRegistry {
    handles: Vec<ContextHandle>,
}

impl ContextRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from handles in discovery order
    pub fn from_handles<I>(handles: I) -> TicketKeyResult<Self>
    where
        I: IntoIterator<Item = ContextHandle>,
    {
        let mut registry = Self::new();
        for handle in handles {
            registry.register(handle)?;
        }
        Ok(registry)
    }

    /// Register a context handle
    ///
    /// Returns `true` when the handle was new. Registering a known handle is a no-op.
    pub fn register(&mut self, handle: ContextHandle) -> TicketKeyResult<bool> {
        if self.handles.contains(&handle) {
            return Ok(false);
        }

        self.handles.try_reserve(1)?;
        self.handles.push(handle);
        debug!(context = %handle, count = self.handles.len(), "Registered TLS context");
        Ok(true)
    }

    /// Number of distinct registered handles
    pub fn count(&self) -> usize {
        self.handles.len()
    }

    /// Copy all handles, in registration order, into `buf`
    ///
    /// Returns the number of handles written.
    ///
    /// # Panics
    ///
    /// The caller must size `buf` to at least [`count`](Self::count); a shorter
    /// buffer panics.
    pub fn list(&self, buf: &mut [ContextHandle]) -> usize {
        let n = self.handles.len();
        buf[..n].copy_from_slice(&self.handles);
        n
    }

    pub fn handles(&self) -> &[ContextHandle] {
        &self.handles
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
