//! # objmem-model
//!
//! The entity and value model of an object memory.
//!
//! A memory is a header plus an ordered set of [`Block`]s. Each block carries
//! metadata (title, creator, contributors, format, subjects, ...) and either
//! an inline payload or a link. Every change names the acting [`Entity`],
//! which is recorded as a contributor.
//!
//! ```rust
//! use objmem_model::{Block, Entity, Format, TypedValue};
//!
//! let block = Block::builder("1")
//!     .title("en", "T")
//!     .creator(Entity::parse("email", "a@b", "2020-01-01T00:00:00+00:00").unwrap())
//!     .format(Format::new("text/plain"))
//!     .payload(TypedValue::new("none", "hello"))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(block.payload_as_string().as_deref(), Some("hello"));
//! ```

pub mod block;
pub mod document;
pub mod entity;
pub mod error;
pub mod format;
pub mod header;
pub mod kind;
pub mod link;
pub mod payload;
pub mod result;
pub mod subject;
pub mod value;
pub mod view;

pub use block::{Block, BlockBuilder, Content};
pub use document::{BlockDocument, DocumentCodec, JsonDocumentCodec, MemoryDocument, TocEntry};
pub use entity::{Entity, WELL_KNOWN_ENTITY_TYPES};
pub use error::{ModelError, Result};
pub use format::{Format, ResourceType};
pub use header::Header;
pub use kind::BlockKind;
pub use link::{PreviousBlockLink, Relation};
pub use payload::{Base64Codec, PayloadCodec, PayloadCodecs, PlainCodec};
pub use result::ActionResult;
pub use subject::{SubjectKind, SubjectTag, MAX_SUBJECT_DEPTH};
pub use value::{MultiLangText, TypedValue};
pub use view::BlockView;
