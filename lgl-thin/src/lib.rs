pub mod config;
pub mod errors;
pub mod gl_fancy;
pub mod gl_helper;
pub mod glsl;
pub mod shader_program;
pub mod texture;
pub mod vertex_array;

#[cfg(any(test, feature = "headless"))]
pub mod headless;

