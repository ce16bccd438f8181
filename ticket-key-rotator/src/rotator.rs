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


use crate::source::KeySource;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use ticket_keys::{ContextHandle, DistributionReport, KeyDistributor, KeyRecord};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, warn};

/// Result of one rotation pass
#[derive(Debug, Default)]
pub struct RotationPass {
    pub encryption: DistributionReport,
    /// `None` when no decryption-only key was pushed this pass
    pub decryption: Option<DistributionReport>,
}

/// Periodically pulls keys from a [`KeySource`] and pushes them to every context
pub struct Rotator {
    source: Arc<dyn KeySource>,
    distributor: KeyDistributor,
    check_interval: Duration,
    /// Last decryption-only key pushed, with the contexts it still has to reach
    decryption_state: Option<(KeyRecord, Vec<ContextHandle>)>,
}

impl Rotator {
    pub fn new(
        source: Arc<dyn KeySource>,
        distributor: KeyDistributor,
        check_interval: Duration,
    ) -> Self {
        Self {
            source,
            distributor,
            check_interval,
            decryption_state: None,
        }
    }

    /// Run a single pass
    ///
    /// The encryption key goes first so every ring exists before the
    /// decryption-only key is installed. An unchanged decryption-only key is
    /// only retried on the contexts where it previously failed, since a
    /// repeated push would overwrite the tail slot once rotation has moved an
    /// older encryption key there.
    pub async fn run_once(&mut self) -> Result<RotationPass> {
        let key = self
            .source
            .encryption_key()
            .await
            .context("Failed to read ticket encryption key")?;
        let encryption = self.distributor.push_encryption_key(key);

        let decryption = match self
            .source
            .decryption_key()
            .await
            .context("Failed to read ticket decryption key")?
        {
            Some(extra) => {
                let targets = match &self.decryption_state {
                    Some((last, pending)) if *last == extra => pending.clone(),
                    _ => self.distributor.contexts(),
                };

                if targets.is_empty() {
                    None
                } else {
                    let report = self.distributor.push_decryption_key_to(extra, &targets);
                    let pending = report.failures.iter().map(|(ctx, _)| *ctx).collect();
                    self.decryption_state = Some((extra, pending));
                    Some(report)
                }
            }
            None => None,
        };

        Ok(RotationPass {
            encryption,
            decryption,
        })
    }

    /// Run passes on every tick until the task is cancelled
    pub async fn run(mut self) {
        let mut ticker = interval(self.check_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match self.run_once().await {
                Ok(pass) => {
                    if !pass.encryption.is_success()
                        || pass.decryption.as_ref().is_some_and(|r| !r.is_success())
                    {
                        warn!(
                            encryption_failures = pass.encryption.failures.len(),
                            decryption_failures = pass
                                .decryption
                                .as_ref()
                                .map_or(0, |r| r.failures.len()),
                            "Ticket key rotation pass had failures"
                        );
                    }
                    info!(
                        updated = pass.encryption.updated,
                        unchanged = pass.encryption.unchanged,
                        decryption_updated = pass.decryption.as_ref().map_or(0, |r| r.updated),
                        "Ticket key rotation pass complete"
                    );
                }
                Err(e) => {
                    error!(error = %e, "Ticket key rotation pass failed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{SourceError, SourceResult};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use ticket_keys::{ContextHandle, ContextRegistry, TicketKeyStore, TICKET_KEY_LEN};

    struct StaticSource {
        keys: Mutex<(KeyRecord, Option<KeyRecord>)>,
    }

    #[async_trait]
    impl KeySource for StaticSource {
        async fn encryption_key(&self) -> SourceResult<KeyRecord> {
            Ok(self.keys.lock().unwrap().0)
        }

        async fn decryption_key(&self) -> SourceResult<Option<KeyRecord>> {
            Ok(self.keys.lock().unwrap().1)
        }
    }

    struct FailingSource;

    #[async_trait]
    impl KeySource for FailingSource {
        async fn encryption_key(&self) -> SourceResult<KeyRecord> {
            Err(SourceError::Io {
                path: "missing.key".into(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
        }

        async fn decryption_key(&self) -> SourceResult<Option<KeyRecord>> {
            Ok(None)
        }
    }

    /// Drops one context's ring right before the decryption key is read
    struct DroppingSource {
        keys: Mutex<(KeyRecord, Option<KeyRecord>)>,
        drop_once: Mutex<Option<(Arc<TicketKeyStore>, ContextHandle)>>,
    }

    #[async_trait]
    impl KeySource for DroppingSource {
        async fn encryption_key(&self) -> SourceResult<KeyRecord> {
            Ok(self.keys.lock().unwrap().0)
        }

        async fn decryption_key(&self) -> SourceResult<Option<KeyRecord>> {
            if let Some((store, ctx)) = self.drop_once.lock().unwrap().take() {
                store.remove_context(ctx);
            }
            Ok(self.keys.lock().unwrap().1)
        }
    }

    fn key(tag: u8) -> KeyRecord {
        KeyRecord::from_array(&[tag; TICKET_KEY_LEN])
    }

    fn distributor(store: Arc<TicketKeyStore>) -> KeyDistributor {
        let registry = ContextRegistry::from_handles(
            [1, 2].into_iter().map(ContextHandle::from_raw),
        )
        .unwrap();
        KeyDistributor::new(Arc::new(registry), store, 2)
    }

    #[tokio::test]
    async fn test_pass_pushes_both_keys() {
        let store = Arc::new(TicketKeyStore::new());
        let source = Arc::new(StaticSource {
            keys: Mutex::new((key(1), Some(key(9)))),
        });
        let mut rotator = Rotator::new(source.clone(), distributor(store.clone()), Duration::from_secs(1));

        let pass = rotator.run_once().await.unwrap();
        assert_eq!(pass.encryption.updated, 2);
        assert_eq!(pass.decryption.unwrap().updated, 2);
        assert_eq!(
            store.keys(ContextHandle::from_raw(1)),
            Some(vec![key(1), key(9)])
        );

        // unchanged source: encryption dedups, decryption is skipped
        let pass = rotator.run_once().await.unwrap();
        assert_eq!(pass.encryption.unchanged, 2);
        assert!(pass.decryption.is_none());

        // new encryption key evicts the injected key at capacity 2
        source.keys.lock().unwrap().0 = key(2);
        rotator.run_once().await.unwrap();
        assert_eq!(
            store.keys(ContextHandle::from_raw(2)),
            Some(vec![key(2), key(1)])
        );
    }

    #[tokio::test]
    async fn test_decryption_retry_only_reaches_failed_contexts() {
        let store = Arc::new(TicketKeyStore::new());
        let source = Arc::new(DroppingSource {
            keys: Mutex::new((key(1), Some(key(9)))),
            drop_once: Mutex::new(Some((store.clone(), ContextHandle::from_raw(2)))),
        });
        let mut rotator = Rotator::new(source.clone(), distributor(store.clone()), Duration::from_secs(1));

        let pass = rotator.run_once().await.unwrap();
        let decryption = pass.decryption.unwrap();
        assert_eq!(decryption.updated, 1);
        assert_eq!(decryption.failures.len(), 1);
        assert_eq!(decryption.failures[0].0, ContextHandle::from_raw(2));

        source.keys.lock().unwrap().0 = key(2);
        let pass = rotator.run_once().await.unwrap();
        assert_eq!(pass.decryption.unwrap().updated, 1);

        // context 1 keeps the previous encryption key for decryption
        assert_eq!(
            store.keys(ContextHandle::from_raw(1)),
            Some(vec![key(2), key(1)])
        );
        assert_eq!(
            store.keys(ContextHandle::from_raw(2)),
            Some(vec![key(2), key(9)])
        );

        let pass = rotator.run_once().await.unwrap();
        assert!(pass.decryption.is_none());
    }

    #[tokio::test]
    async fn test_source_error_propagates() {
        let store = Arc::new(TicketKeyStore::new());
        let mut rotator = Rotator::new(Arc::new(FailingSource), distributor(store.clone()), Duration::from_secs(1));
        assert!(rotator.run_once().await.is_err());
        assert_eq!(store.context_count(), 0);
    }
}
