//! # Itinera Engine
//!
//! Source-level manipulation of generated template text.
//!
//! The generation pipeline emits tag-based markup mixed with scripting
//! expressions; user-owned components carry their payload as a bracketed
//! array of record literals in an attribute, e.g.
//!
//! ```text
//! <AirplaneSection id="user_airplane_7" flights={[
//!   {
//!     airline: "KLM",
//!     flightNumber: 1601,
//!     travelers: {
//!       adults: 2
//!     }
//!   }
//! ]} />
//! ```
//!
//! There is no grammar for the host templating language here. The engine
//! locates regions with regexes, splits record literals with a brace-depth
//! scan, and re-splices edited text back into the source, validating tag
//! balance so it never returns a corrupt region. The seams are the
//! caller contracts, not the scanning technique: a real parser could
//! replace the internals without touching any caller.
//!
//! Every mutation is a pure function over the full source text: it either
//! returns a complete new source string or an error, never a half-spliced
//! result.

pub mod error;
pub mod locator;
pub mod mutations;
pub mod records;
pub mod tags;

pub use error::{EngineError, EngineResult};
pub use locator::{find_tagged_region, TaggedRegion};
pub use mutations::{
    append_record, new_region, remove_record, remove_tagged_region, update_attributes,
    update_record, AttrValue,
};
pub use records::{decode_family_records, decode_records, encode_records, replace_records, Record, RecordValue};
pub use tags::{family_for_id, family_for_kind, TagFamily, AIRPLANE_SECTION, HOTEL_SECTION};
