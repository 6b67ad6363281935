//! Protocol dispatch: stored IR payloads in, transmit parameters out.

pub mod encoder;
pub mod registry;

pub use encoder::{encode, EncodedCommand};
pub use registry::{FieldKind, Protocol, ProtocolDescriptor};
