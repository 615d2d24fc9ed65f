//! # objmem-store
//!
//! The canonical, in-process object memory.
//!
//! A [`Memory`] owns its blocks and a small worker pool that delivers change
//! events to registered [`MemoryListener`]s. The [`persist`] module saves and
//! loads memories in document or binary form.
//!
//! ```rust
//! use objmem_model::{ActionResult, Block, Entity, Format, TypedValue};
//! use objmem_store::Memory;
//!
//! let mut memory = Memory::with_primary_id(TypedValue::new("url", "http://host/rest/M"));
//! let actor = Entity::now("email", "a@b");
//! let block = Block::builder("1")
//!     .title("en", "T")
//!     .creator(actor.clone())
//!     .format(Format::new("text/plain"))
//!     .payload(TypedValue::new("none", "hello"))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(memory.add_block(block, &actor), ActionResult::Ok);
//! assert_eq!(
//!     memory.block("1").and_then(|b| b.payload_as_string()).as_deref(),
//!     Some("hello")
//! );
//! ```

pub mod error;
pub mod event;
pub mod memory;
pub mod persist;

pub use error::{Result, StoreError};
pub use event::{DispatcherConfig, EventDispatcher, EventKind, MemoryEvent, MemoryListener};
pub use memory::{BlockMut, Memory, Source};
pub use persist::{load, load_block, save, save_block, FileFormat};
