//! # objmem-http
//!
//! Access to an object memory served over HTTP.
//!
//! [`RemoteMemory`] discovers the storage node from the endpoint's
//! negotiation document and exposes the memory's blocks as [`RemoteBlock`]
//! handles. A `RemoteBlock` implements the same read contract as a local
//! block ([`objmem_model::BlockView`]).
//!
//! ```no_run
//! use std::path::Path;
//!
//! use objmem_http::{AccessMode, RemoteConfig, RemoteMemory};
//! use objmem_model::BlockView;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RemoteConfig::default()
//!     .with_access_mode(AccessMode::CompleteDownloadLimitedLifetime);
//! let memory = RemoteMemory::connect("http://host/rest/M", config)?;
//!
//! for block in memory.blocks() {
//!     println!("{}: {:?}", block.block_id(), block.title_text("en"));
//! }
//!
//! // Keep a local copy.
//! let local = memory.export_memory()?;
//! objmem_store::save(&local, Path::new("M.ommz"))?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Access modes
//!
//! - `SingleAccess` fetches each field from its own sub-resource and keeps
//!   the last few responses per block for a short time.
//! - `CompleteDownloadLimitedLifetime` downloads a block's metadata once and
//!   refetches it after the cache TTL.
//! - `CompleteDownloadUnlimited` keeps downloaded metadata until
//!   [`RemoteMemory::invalidate_cache`] or a mode switch.

mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod executor;
pub mod negotiation;
pub mod remote;
pub mod remote_block;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AccessMode, RemoteConfig};
pub use error::{Error, Result};
pub use executor::{HttpExecutor, ReqwestExecutor};
pub use negotiation::{Capacity, ManagementNode, NegotiationData, StorageNode};
pub use remote::RemoteMemory;
pub use remote_block::RemoteBlock;
pub use types::{HttpRequest, HttpResponse, Method};
