//! `cap-channel`: The asynchronous settings channel.
//!
//! Architecture:
//!
//! ```text
//! Poll Thread (1 Hz)                       Frame Path
//! ┌──────────────────────┐               ┌────────────────┐
//! │ read_latest()        │               │ cell.load()    │
//! │ base64 + JSON decode │── publish ───▶│ compose frame  │
//! │ compare by value     │   (OverlayCell)│               │
//! │ render on change     │               └────────────────┘
//! └──────────────────────┘
//! ```
//!
//! The transport is deliberately abstract: the original carrier was a
//! clipboard-like channel, but anything with "read the latest payload"
//! semantics works: a file, a socket message, an in-memory slot. Malformed
//! or missing payloads never propagate past this crate; the previous
//! settings simply stay in force.

pub mod decode;
pub mod error;
pub mod poller;
pub mod transport;

pub use decode::{decode_payload, encode_payload};
pub use error::{ChannelError, TransportError};
pub use poller::{SettingsPoller, SettingsWatcher};
pub use transport::{FileTransport, MemoryTransport, SettingsTransport};
