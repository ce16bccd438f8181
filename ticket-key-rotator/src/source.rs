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


use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use ticket_keys::{KeyRecord, TicketKeyError};
use tokio::fs;
use tracing::debug;

/// Errors reading key material
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid key in {path}: {source}")]
    InvalidKey {
        path: PathBuf,
        #[source]
        source: TicketKeyError,
    },
}

pub type SourceResult<T> = Result<T, SourceError>;

/// Where the rotator gets its key material from
#[async_trait]
pub trait KeySource: Send + Sync {
    /// Current encryption key
    async fn encryption_key(&self) -> SourceResult<KeyRecord>;

    /// Extra decryption-only key, if one is configured
    async fn decryption_key(&self) -> SourceResult<Option<KeyRecord>>;
}

/// Reads hex-encoded keys from files on every call
pub struct FileKeySource {
    key_file: PathBuf,
    decryption_key_file: Option<PathBuf>,
}

impl FileKeySource {
    pub fn new(key_file: impl Into<PathBuf>, decryption_key_file: Option<PathBuf>) -> Self {
        Self {
            key_file: key_file.into(),
            decryption_key_file,
        }
    }

    async fn read_key(path: &Path) -> SourceResult<KeyRecord> {
        let encoded = fs::read_to_string(path)
            .await
            .map_err(|source| SourceError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let key = KeyRecord::from_hex(&encoded).map_err(|source| SourceError::InvalidKey {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), name = %key.name_hex(), "Read ticket key");
        Ok(key)
    }
}

#[async_trait]
impl KeySource for FileKeySource {
    async fn encryption_key(&self) -> SourceResult<KeyRecord> {
        Self::read_key(&self.key_file).await
    }

    async fn decryption_key(&self) -> SourceResult<Option<KeyRecord>> {
        match &self.decryption_key_file {
            Some(path) => Self::read_key(path).await.map(Some),
            None => Ok(None),
        }
    }
}
