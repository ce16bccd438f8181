//! Integration tests for ticket key rotation across registered contexts
//!
//! Drives the status-code entry points the way a key-distribution hook does:
//! enumerate contexts, then push raw 48-byte keys to each.

use std::sync::Arc;
use std::thread;
use ticket_keys::status::{
    ssl_ctx_count, ssl_ctx_list, update_last_ticket_decryption_key,
    update_ticket_encryption_key, STATUS_ERROR, STATUS_OK,
};
use ticket_keys::{ContextHandle, ContextRegistry, KeyRecord, TicketKeyStore, TICKET_KEY_LEN};

fn raw(tag: u8) -> [u8; TICKET_KEY_LEN] {
    let mut raw = [tag; TICKET_KEY_LEN];
    // distinct name, AES and HMAC parts
    raw[16] = tag.wrapping_add(1);
    raw[32] = tag.wrapping_add(2);
    raw
}

fn record(tag: u8) -> KeyRecord {
    KeyRecord::from_array(&raw(tag))
}

fn enumerate(registry: &ContextRegistry) -> Vec<ContextHandle> {
    let mut buf = vec![ContextHandle::from_raw(0); ssl_ctx_count(registry)];
    assert_eq!(ssl_ctx_list(registry, &mut buf), STATUS_OK);
    buf
}

#[test]
fn test_rotation_history_per_context() {
    let mut registry = ContextRegistry::new();
    for id in [0x10, 0x20, 0x10] {
        registry.register(ContextHandle::from_raw(id)).unwrap();
    }
    let registry = Arc::new(registry);
    assert_eq!(ssl_ctx_count(&registry), 2);

    let store = TicketKeyStore::new();
    for tag in [1, 2, 3] {
        for ctx in enumerate(&registry) {
            let status = update_ticket_encryption_key(&store, ctx, &raw(tag), 2);
            assert_eq!(status.code, STATUS_OK);
        }
    }

    for ctx in enumerate(&registry) {
        assert_eq!(store.keys(ctx), Some(vec![record(3), record(2)]));
    }
}

#[test]
fn test_manual_decryption_key_lifecycle() {
    let store = TicketKeyStore::new();
    let ctx = ContextHandle::from_raw(1);

    let status = update_last_ticket_decryption_key(&store, ctx, &raw(50));
    assert_eq!(status.code, STATUS_ERROR);
    assert!(!store.is_initialized(ctx));

    assert!(update_ticket_encryption_key(&store, ctx, &raw(1), 1).is_ok());
    assert!(update_last_ticket_decryption_key(&store, ctx, &raw(50)).is_ok());
    assert_eq!(store.keys(ctx), Some(vec![record(1), record(50)]));

    assert!(update_last_ticket_decryption_key(&store, ctx, &raw(51)).is_ok());
    assert_eq!(store.keys(ctx), Some(vec![record(1), record(51)]));

    // tickets under the injected key decrypt but must be renewed
    let found = store.find_decryption_key(ctx, record(51).name()).unwrap();
    assert!(found.renew);
    assert!(store.find_decryption_key(ctx, record(50).name()).is_none());
}

#[test]
fn test_redundant_updates_keep_history() {
    let store = TicketKeyStore::new();
    let ctx = ContextHandle::from_raw(7);

    for tag in [1, 2, 2, 2, 3, 3] {
        assert!(update_ticket_encryption_key(&store, ctx, &raw(tag), 3).is_ok());
    }
    assert_eq!(store.keys(ctx), Some(vec![record(3), record(2), record(1)]));
}

#[test]
fn test_concurrent_readers_see_whole_rings() {
    let store = Arc::new(TicketKeyStore::new());
    let ctx = ContextHandle::from_raw(3);
    store.set_encryption_key(ctx, record(0), 4).unwrap();

    let writer = {
        let store = store.clone();
        thread::spawn(move || {
            for tag in 1..=200u8 {
                store.set_encryption_key(ctx, record(tag), 4).unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = store.clone();
            thread::spawn(move || {
                for _ in 0..500 {
                    let keys = store.keys(ctx).unwrap();
                    assert!(!keys.is_empty() && keys.len() <= 4);
                    // consecutive rotations: each slot is one older than the previous
                    for pair in keys.windows(2) {
                        assert_eq!(pair[0].name()[0], pair[1].name()[0].wrapping_add(1));
                    }
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(store.encryption_key(ctx), Some(record(200)));
}
