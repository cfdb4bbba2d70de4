//! Plain data the GL wrappers consume: decoded bitmaps, per-vertex attribute
//! streams and the small amount of linear algebra needed to feed uniforms.

pub mod bitmap;
pub mod errors;
pub mod linear;
pub mod vertex_attribs;

pub use bitmap::{Bitmap, BitmapFormat};
pub use errors::GeometryError;
pub use linear::{Matrix4x4f, Vector2f, Vector3f, Vector4f};
pub use vertex_attribs::{AttribSlot, UVRectangle, VertexAttribs, TOTAL_ATTRIBS};
