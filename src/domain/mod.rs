//! Domain layer: tool kinds, descriptors, versions and checkout requests.
//!
//! Nothing in here touches the filesystem or spawns processes.

pub mod entities;
pub mod value_objects;
