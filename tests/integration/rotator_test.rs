//! Integration tests for the file-driven ticket key rotator

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use ticket_key_rotator::{FileKeySource, Rotator};
use ticket_keys::{ContextHandle, ContextRegistry, KeyDistributor, KeyRecord, TicketKeyStore, TICKET_KEY_LEN};

fn write_key(path: &Path, tag: u8) -> KeyRecord {
    let raw = [tag; TICKET_KEY_LEN];
    std::fs::write(path, format!("{}\n", hex::encode(raw))).unwrap();
    KeyRecord::from_array(&raw)
}

#[tokio::test]
async fn test_rotator_follows_key_file() {
    let temp_dir = TempDir::new().unwrap();
    let key_file = temp_dir.path().join("current.key");
    let extra_file = temp_dir.path().join("peer.key");

    let k1 = write_key(&key_file, 1);
    let peer = write_key(&extra_file, 0xee);

    let registry = ContextRegistry::from_handles(
        [11, 12].into_iter().map(ContextHandle::from_raw),
    )
    .unwrap();
    let store = Arc::new(TicketKeyStore::new());
    let distributor = KeyDistributor::new(Arc::new(registry), store.clone(), 3);
    let source = Arc::new(FileKeySource::new(&key_file, Some(extra_file.clone())));
    let mut rotator = Rotator::new(source, distributor, Duration::from_secs(60));

    rotator.run_once().await.unwrap();
    let ctx = ContextHandle::from_raw(12);
    assert_eq!(store.keys(ctx), Some(vec![k1, peer]));

    let k2 = write_key(&key_file, 2);
    let pass = rotator.run_once().await.unwrap();
    assert_eq!(pass.encryption.updated, 2);
    assert!(pass.decryption.is_none());
    assert_eq!(store.keys(ctx), Some(vec![k2, k1, peer]));
    assert_eq!(store.encryption_key(ContextHandle::from_raw(11)), Some(k2));
}

#[tokio::test]
async fn test_rotator_reports_unreadable_key() {
    let temp_dir = TempDir::new().unwrap();
    let key_file = temp_dir.path().join("current.key");
    std::fs::write(&key_file, "not hex").unwrap();

    let registry = ContextRegistry::from_handles([ContextHandle::from_raw(1)]).unwrap();
    let store = Arc::new(TicketKeyStore::new());
    let distributor = KeyDistributor::new(Arc::new(registry), store.clone(), 2);
    let mut rotator = Rotator::new(
        Arc::new(FileKeySource::new(&key_file, None)),
        distributor,
        Duration::from_secs(60),
    );

    assert!(rotator.run_once().await.is_err());
    assert_eq!(store.context_count(), 0);
}
