//! Form state store for the intake engine.
//!
//! Owns the live form session state the stateless engine reads from and
//! the rendering layer writes to: current field values, per-field
//! touched/error metadata, and the per-field visible flag with its
//! registration lifecycle. Single-threaded; handles are cheap clones over
//! shared state.

pub mod error;
pub mod store;

pub use error::StoreError;
pub use store::{FieldMeta, FormStore, Registration, StoreEvent, SubscriberId};
