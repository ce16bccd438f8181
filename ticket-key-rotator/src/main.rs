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


use anyhow::{Context, Result};
use std::sync::Arc;
use ticket_key_rotator::{FileKeySource, Rotator};
use ticket_keys::{ContextHandle, ContextRegistry, KeyDistributor, TicketKeyStore};
use ticket_keys_config::RotatorConfig;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = RotatorConfig::from_env().context("Failed to load configuration")?;

    // Initialize logging
    ticket_keys_logging::init("ticket-key-rotator", config.log_level(), config.log_format());

    info!(
        max_keys = config.max_keys,
        check_interval_secs = config.check_interval_secs,
        key_file = %config.key_file.display(),
        "Configuration loaded"
    );

    // Build the context registry for this configuration generation
    let registry = ContextRegistry::from_handles(
        config
            .context_ids()?
            .into_iter()
            .map(ContextHandle::from_raw),
    )
    .context("Failed to register TLS contexts")?;
    info!(contexts = registry.count(), "TLS contexts registered");

    let store = Arc::new(TicketKeyStore::new());
    let distributor = KeyDistributor::new(Arc::new(registry), store, config.max_keys);
    let source = Arc::new(FileKeySource::new(
        config.key_file.clone(),
        config.decryption_key_file.clone(),
    ));
    let rotator = Rotator::new(source, distributor, config.check_interval());

    info!("Starting ticket key rotation");
    let rotator_handle = tokio::spawn(rotator.run());

    // Wait for shutdown signal
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received");
        }
        Err(err) => {
            error!(error = %err, "Unable to listen for shutdown signal");
        }
    }

    rotator_handle.abort();
    info!("Ticket key rotator stopped");

    Ok(())
}
