//! Task descriptors and baseline lookup.
//!
//! A task descriptor describes the breakdown that produced a result tree:
//! one level per nested `child` (or `then`), optionally flagging one level
//! as the self-baseline reference.

pub mod baseline;
pub mod descriptor;

// Re-export main types
pub use baseline::{locate_baseline, BaselineLevel};
pub use descriptor::{field_path, TaskDescriptor, DESCRIPTOR_FIELDS};
