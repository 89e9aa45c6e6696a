//! Wrapper codec for datacfg.
//!
//! Every stored config is an [`Envelope`]: the config's type name, its
//! human name, an opaque JSON payload, and an opaque JSON [`ReferenceTable`]
//! recording links to external resources. This crate turns envelopes into
//! bytes and back. Payload and reference documents stay strings at this
//! layer and are decoded lazily by callers.

pub mod codec;
pub mod envelope;
pub mod error;
pub mod references;

pub use codec::EnvelopeCodec;
pub use envelope::Envelope;
pub use error::{CodecError, CodecResult};
pub use references::{ReferenceEntry, ReferenceTable};
