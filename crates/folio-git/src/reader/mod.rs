//! Reading component content out of work items.
//!
//! The descriptor is loaded first; the tree below the start path is then walked
//! and every file classified once by the content layout.

mod descriptor;
mod walker;

pub use descriptor::{ComponentDescriptor, load_descriptor};
pub use walker::{WalkResult, walk};
