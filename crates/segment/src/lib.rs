//! Building blocks for composing a segment out of schema fields and sending it
//! to the segment endpoint.
//!
//! - [`catalog`]: the fixed set of fields, their labels and trait types
//! - [`selection`]: ordered, duplicate-free list of chosen fields
//! - [`payload`]: validation and the wire payload
//! - [`gateway`]: async submission over HTTP
//! - [`session`]: one composition session (draft + in-flight flag)

pub mod catalog;
pub mod error;
pub mod gateway;
pub mod payload;
pub mod selection;
pub mod session;

pub use catalog::{
    all_fields, describe, lookup, trait_type_of, FieldDescriptor, SchemaField, TraitType, CATALOG,
};
pub use error::{Error, Result};
pub use gateway::{HttpGateway, SegmentGateway, ServerResponse};
pub use payload::{build, SegmentPayload};
pub use selection::SelectionList;
pub use session::DraftSession;
