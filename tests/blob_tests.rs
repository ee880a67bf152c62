//! Tests for the content-addressed BlobStore
//!
//! These tests verify:
//! - Digest-named layout (shard directory + remaining hex)
//! - Deduplication of identical payloads
//! - Streaming writes leave no temp files behind
//! - Blob-backed columns inside a collection

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;

use rowdb::blob::{BlobStore, Digest};
use rowdb::{Collection, Field, NumType, Patch, Query, RowDbError, Schema, Value};
use sha2::{Digest as _, Sha256};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

/// Every regular file below `dir`
fn files_under(dir: &Path) -> Vec<std::path::PathBuf> {
    let mut files = Vec::new();
    if !dir.exists() {
        return files;
    }
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            files.extend(files_under(&path));
        } else {
            files.push(path);
        }
    }
    files
}

fn paste_schema(root: &Path) -> Schema {
    Schema::builder()
        .column("id", Field::num(NumType::U32))
        .column("preview", Field::text(root.join("pastes/preview")))
        .column("data", Field::binary(root.join("pastes/data")))
        .column("meta", Field::json(root.join("pastes/meta")))
        .build()
        .unwrap()
}

fn ids(collection: &Collection, query: &Query) -> Vec<Value> {
    collection
        .all(query)
        .unwrap()
        .map(|r| r.unwrap().get("id").cloned().unwrap())
        .collect()
}

fn insert_paste(collection: &Collection, id: i64, preview: &str, data: &[u8]) {
    collection
        .insert([
            ("id", Value::Int(id)),
            ("preview", Value::from(preview)),
            ("data", Value::from(data)),
            ("meta", Value::Json(serde_json::json!({ "id": id }))),
        ])
        .unwrap();
}

// =============================================================================
// Store Tests
// =============================================================================

#[test]
fn test_put_writes_sharded_path() {
    let temp = TempDir::new().unwrap();
    let store = BlobStore::new(temp.path().join("blobs"));

    let digest = store.put_bytes(b"hello").unwrap();

    let expected: [u8; 32] = Sha256::digest(b"hello").into();
    assert_eq!(digest.as_bytes(), &expected);

    let path = store.path_for(&digest);
    assert_eq!(path, temp.path().join("blobs").join(&digest.to_hex()[..2]).join(&digest.to_hex()[2..]));
    assert_eq!(fs::read(&path).unwrap(), b"hello");
    assert!(store.contains(&digest));
}

#[test]
fn test_put_deduplicates() {
    let temp = TempDir::new().unwrap();
    let store = BlobStore::new(temp.path());

    let a = store.put_bytes(b"same content").unwrap();
    let b = store.put_bytes(b"same content").unwrap();
    let c = store.put_bytes(b"other content").unwrap();

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(files_under(temp.path()).len(), 2);
}

#[test]
fn test_put_streams_from_reader() {
    let temp = TempDir::new().unwrap();
    let store = BlobStore::new(temp.path());

    // Larger than one copy buffer
    let payload: Vec<u8> = (0..100_000u32).map(|i| (i % 251) as u8).collect();
    let mut reader = std::io::Cursor::new(payload.clone());

    let digest = store.put(&mut reader).unwrap();

    assert_eq!(store.read(&digest).unwrap(), payload);
    assert_eq!(files_under(temp.path()).len(), 1);
}

#[test]
fn test_put_empty_payload() {
    let temp = TempDir::new().unwrap();
    let store = BlobStore::new(temp.path());

    let digest = store.put_bytes(b"").unwrap();

    assert_eq!(
        digest.to_hex(),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
    assert!(store.read(&digest).unwrap().is_empty());
}

#[test]
fn test_open_missing_blob_fails() {
    let temp = TempDir::new().unwrap();
    let store = BlobStore::new(temp.path());
    let digest = Digest::from_bytes([0x42; 32]);

    assert!(!store.contains(&digest));
    assert!(matches!(store.open(&digest), Err(RowDbError::Io(_))));
}

#[test]
fn test_concurrent_puts_of_same_content() {
    let temp = TempDir::new().unwrap();
    let store = Arc::new(BlobStore::new(temp.path()));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || store.put_bytes(b"contended payload").unwrap())
        })
        .collect();
    let digests: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert!(digests.windows(2).all(|w| w[0] == w[1]));
    let files = files_under(temp.path());
    assert_eq!(files, vec![store.path_for(&digests[0])]);
}

// =============================================================================
// Collection Integration Tests
// =============================================================================

#[test]
fn test_collection_with_blob_columns() {
    let temp = TempDir::new().unwrap();
    let collection = Collection::open_path(&temp.path().join("pastes"), paste_schema(temp.path())).unwrap();

    insert_paste(&collection, 1, "Poopy", b"Poopy butthole lol");
    insert_paste(&collection, 2, "MEEMEE", b"MEEMEE butthole lol");

    assert_eq!(collection.row_size(), 4 + 32 + 32 + 32);

    let record = collection.by_id(1u64).unwrap();
    assert_eq!(record.get("id"), Some(&Value::Int(2)));
    assert_eq!(record.get("preview"), Some(&Value::from("MEEMEE")));
    assert_eq!(
        record.get("data").unwrap().as_blob().unwrap().read_to_vec().unwrap(),
        b"MEEMEE butthole lol"
    );
    assert_eq!(record.get("meta"), Some(&Value::Json(serde_json::json!({"id": 2}))));
}

#[test]
fn test_collection_dedups_identical_payloads() {
    let temp = TempDir::new().unwrap();
    let collection = Collection::open_path(&temp.path().join("pastes"), paste_schema(temp.path())).unwrap();

    insert_paste(&collection, 1, "same", b"same bytes");
    insert_paste(&collection, 1, "same", b"same bytes");

    assert_eq!(files_under(&temp.path().join("pastes/data")).len(), 1);
    assert_eq!(files_under(&temp.path().join("pastes/preview")).len(), 1);
    assert_eq!(files_under(&temp.path().join("pastes/meta")).len(), 1);
}

#[test]
fn test_query_on_text_blob_column() {
    let temp = TempDir::new().unwrap();
    let collection = Collection::open_path(&temp.path().join("pastes"), paste_schema(temp.path())).unwrap();

    insert_paste(&collection, 1, "Poopy", b"a");
    insert_paste(&collection, 2, "MEEMEE", b"b");
    insert_paste(&collection, 3, "Poopy", b"c");

    let ids = ids(&collection, &Query::new().where_eq("preview", "Poopy"));
    assert_eq!(ids, vec![Value::Int(1), Value::Int(3)]);
}

#[test]
fn test_update_keeps_blob_reference() {
    let temp = TempDir::new().unwrap();
    let collection = Collection::open_path(&temp.path().join("pastes"), paste_schema(temp.path())).unwrap();
    insert_paste(&collection, 1, "Poopy", b"payload");

    collection
        .update(&Query::all(), &Patch::new().set("id", 7))
        .unwrap();

    let record = collection.by_id(0u64).unwrap();
    assert_eq!(record.get("id"), Some(&Value::Int(7)));
    assert_eq!(
        record.get("data").unwrap().as_blob().unwrap().read_to_vec().unwrap(),
        b"payload"
    );
    assert_eq!(files_under(&temp.path().join("pastes/data")).len(), 1);
}

#[test]
fn test_query_on_json_and_binary_columns() {
    let temp = TempDir::new().unwrap();
    let collection = Collection::open_path(&temp.path().join("pastes"), paste_schema(temp.path())).unwrap();

    insert_paste(&collection, 1, "a", b"first");
    insert_paste(&collection, 2, "b", b"second");
    insert_paste(&collection, 3, "c", b"first");

    let by_meta = Query::new().where_eq("meta", serde_json::json!({ "id": 2 }));
    assert_eq!(ids(&collection, &by_meta), vec![Value::Int(2)]);

    let by_data = Query::new().where_eq("data", &b"first"[..]);
    assert_eq!(ids(&collection, &by_data), vec![Value::Int(1), Value::Int(3)]);

    // A decoded blob matches the rows holding the same payload
    let blob = collection.by_id(1u64).unwrap().get("data").cloned().unwrap();
    assert_eq!(ids(&collection, &Query::new().where_eq("data", blob)), vec![Value::Int(2)]);
}

#[test]
fn test_update_patches_text_and_json_columns() {
    let temp = TempDir::new().unwrap();
    let collection = Collection::open_path(&temp.path().join("pastes"), paste_schema(temp.path())).unwrap();
    insert_paste(&collection, 1, "Poopy", b"payload");
    insert_paste(&collection, 2, "MEEMEE", b"payload");

    let patch = Patch::new()
        .set("preview", "edited")
        .set("meta", serde_json::json!({ "edited": true }));
    let updated = collection
        .update(&Query::new().where_eq("id", 2), &patch)
        .unwrap();
    assert_eq!(updated, vec![rowdb::RowId::Index(1)]);

    let record = collection.by_id(1u64).unwrap();
    assert_eq!(record.get("preview"), Some(&Value::from("edited")));
    assert_eq!(record.get("meta"), Some(&Value::Json(serde_json::json!({ "edited": true }))));

    let untouched = collection.by_id(0u64).unwrap();
    assert_eq!(untouched.get("preview"), Some(&Value::from("Poopy")));
    assert_eq!(ids(&collection, &Query::new().where_eq("preview", "edited")), vec![Value::Int(2)]);
}

// =============================================================================
// Streaming Input Tests
// =============================================================================

#[test]
fn test_insert_streamed_binary_payload() {
    let temp = TempDir::new().unwrap();
    let collection = Collection::open_path(&temp.path().join("pastes"), paste_schema(temp.path())).unwrap();

    // Several copy buffers long
    let payload: Vec<u8> = (0..100_000u32).map(|i| (i % 253) as u8).collect();
    let mut reader = std::io::Cursor::new(payload.clone());
    let data = collection
        .schema()
        .field("data")
        .unwrap()
        .put_stream(&mut reader)
        .unwrap();

    collection
        .insert([
            ("id", Value::Int(1)),
            ("preview", Value::from("big")),
            ("data", data),
            ("meta", Value::Json(serde_json::json!(null))),
        ])
        .unwrap();

    let record = collection.by_id(0u64).unwrap();
    assert_eq!(record.get("data").unwrap().as_blob().unwrap().read_to_vec().unwrap(), payload);
    assert_eq!(files_under(&temp.path().join("pastes/data")).len(), 1);
}

#[test]
fn test_put_stream_rejects_non_binary_field() {
    let temp = TempDir::new().unwrap();
    let field = Field::text(temp.path().join("preview"));

    let result = field.put_stream(&mut &b"hello"[..]);
    assert!(matches!(result, Err(RowDbError::Encoding(_))));
}

#[test]
fn test_parse_value_streams_file_argument() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("upload.bin");
    fs::write(&source, vec![7u8; 20_000]).unwrap();

    let field = Field::binary(temp.path().join("data"));
    let value = field
        .parse_value(&format!("@{}", source.display()))
        .unwrap();

    let blob = value.as_blob().unwrap();
    assert!(blob.path().starts_with(temp.path().join("data")));
    assert_eq!(blob.read_to_vec().unwrap(), vec![7u8; 20_000]);
}

// =============================================================================
// Cross-Store Tests
// =============================================================================

#[test]
fn test_blob_from_another_column_is_copied_into_store() {
    let temp = TempDir::new().unwrap();
    let schema = Schema::builder()
        .column("original", Field::binary(temp.path().join("originals")))
        .column("copy", Field::binary(temp.path().join("copies")))
        .build()
        .unwrap();
    let collection = Collection::open_path(&temp.path().join("coll"), schema).unwrap();

    collection
        .insert([
            ("original", Value::from(&b"shared payload"[..])),
            ("copy", Value::from(&b"placeholder"[..])),
        ])
        .unwrap();

    let original = collection.by_id(0u64).unwrap().get("original").cloned().unwrap();
    collection
        .update(&Query::all(), &Patch::new().set("copy", original))
        .unwrap();

    let record = collection.by_id(0u64).unwrap();
    let copy = record.get("copy").unwrap().as_blob().unwrap();
    assert!(copy.path().starts_with(temp.path().join("copies")));
    assert_eq!(copy.read_to_vec().unwrap(), b"shared payload");
}

#[test]
fn test_pack_of_missing_blob_is_io_error() {
    let temp = TempDir::new().unwrap();
    let field = Field::binary(temp.path().join("data"));
    let dangling = BlobStore::new(temp.path().join("elsewhere")).blob_ref(Digest::from_bytes([7; 32]));

    let mut buf = [0u8; 32];
    let result = field.pack(&Value::Blob(dangling), &mut buf);
    assert!(matches!(result, Err(RowDbError::Io(_))));
}
