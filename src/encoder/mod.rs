//! Serializes owned and borrowed values into the wire format.

mod builder;
mod element;
mod encodable;
mod error;

pub use builder::Encoder;
pub use element::Element;
pub use error::EncodeError;

pub(crate) use builder::Slot;
pub(crate) use encodable::Encodable;
