//! Blob Module
//!
//! Content-addressed storage for variable-length column payloads.
//!
//! ## Responsibilities
//! - Stream payloads to disk while hashing them with SHA-256
//! - Store each distinct payload exactly once, named by its digest
//! - Reopen payloads from the 32-byte digest kept inline in a row
//!
//! ## Directory Layout
//! ```text
//! {field_dir}/
//!   ├── 3f9a0c…e1          (in-flight write, 16 random bytes as hex)
//!   ├── a4/
//!   │   └── 1b7e…90        (committed blob: digest[2..])
//!   └── e3/
//!       └── b0c4…55
//! ```
//!
//! Blobs are never deleted or reference-counted.

mod digest;
mod store;

pub use digest::{Digest, DIGEST_SIZE};
pub use store::{BlobRef, BlobStore};
