//! rtp core data - geometry and pixel buffers handed to the path tracer.
//!
//! This crate provides:
//!
//! - **Mesh geometry**: `Mesh`, shared by every triangle that indexes into it
//! - **Image data**: `ImageData` decoded pixel buffers and a `TextureCache`
//!   that loads them from disk
//!
//! The tracer itself never touches the filesystem; the host loads images here
//! and passes the decoded buffers along.

pub mod mesh;
pub mod texture;

// Re-export commonly used types
pub use mesh::{Mesh, MeshError};
pub use texture::{ImageData, TextureCache, TextureError, TextureResult};
