//! # rowdb
//!
//! A minimal embedded, file-backed record store with:
//! - Fixed-width binary rows laid out from a typed schema
//! - Linear-scan queries that compare packed bytes without decoding
//! - In-place updates that never resize the data file
//! - Content-addressed, deduplicated storage for variable-length payloads
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Collection                            │
//! │      insert / by_id / all / one / update / update_one        │
//! └──────────┬───────────────────┬──────────────────┬───────────┘
//!            │                   │                  │
//!            ▼                   ▼                  ▼
//!   ┌─────────────────┐  ┌──────────────┐   ┌──────────────┐
//!   │   Row Layout    │  │ Field Codecs │   │  Surrogate   │
//!   │ (size, offsets) │  │ (pack/read)  │   │   ID Codec   │
//!   └─────────────────┘  └──────┬───────┘   └──────────────┘
//!                               │
//!                               ▼
//!                       ┌──────────────┐
//!                       │  Blob Store  │
//!                       │  (SHA-256)   │
//!                       └──────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use rowdb::{Collection, CollectionConfig, Field, Query, Schema, Value};
//!
//! # fn main() -> rowdb::Result<()> {
//! let schema = Schema::builder()
//!     .column("created", Field::datetime())
//!     .column("username", Field::inline_text(255)?)
//!     .build()?;
//! let users = Collection::open(CollectionConfig::builder().dir("users").build(), schema)?;
//!
//! users.insert([("created", Value::now()), ("username", Value::from("Miguel"))])?;
//! for row in users.all(&Query::new().where_eq("username", "Miguel"))? {
//!     println!("{}", row?.to_json());
//! }
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod id;
pub mod field;
pub mod blob;
pub mod layout;
pub mod collection;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, RowDbError};
pub use config::{CollectionConfig, IdMode};
pub use field::{BigType, Field, NumType, Value};
pub use layout::{RowLayout, Schema};
pub use collection::{Collection, Patch, Query, Record, RowId, Scan};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of rowdb
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
