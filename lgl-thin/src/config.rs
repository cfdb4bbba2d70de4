use gl::types::{GLenum, GLint};

/// Which flavor of GLSL and texture/attribute features the context supports.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum GlProfile {
    /// OpenGL 3.2+ core, GLSL 1.50
    Desktop3,
    /// OpenGL ES 2, GLSL 1.00
    Es2,
}

impl GlProfile {
    pub fn is_es(&self) -> bool {
        *self == GlProfile::Es2
    }

    /// ES 2 has no border clamping, so the default wrap mode falls back to edge clamping there.
    pub fn default_wrap_mode(&self) -> GLint {
        match self {
            GlProfile::Desktop3 => gl::CLAMP_TO_BORDER as GLint,
            GlProfile::Es2 => gl::CLAMP_TO_EDGE as GLint,
        }
    }

    pub fn supports_frag_data_location(&self) -> bool {
        !self.is_es()
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct GlConfig {
    pub profile: GlProfile,
    /// cache attribute bindings in a vertex array object instead of re-rigging every draw
    pub use_vertex_array_objects: bool,
}

impl GlConfig {
    pub fn desktop() -> Self {
        Self {
            profile: GlProfile::Desktop3,
            use_vertex_array_objects: true,
        }
    }

    pub fn gles2() -> Self {
        Self {
            profile: GlProfile::Es2,
            use_vertex_array_objects: false,
        }
    }

    /// Picks a profile from the `GL_VERSION` string, e.g. `"OpenGL ES 3.2 build 1.13"`
    /// or `"4.6.0 NVIDIA 535.54.03"`. ES 3 contexts are treated as ES 2 since that is
    /// the shading language dialect the translator emits for them.
    pub fn from_version_string(version: &str) -> Self {
        if version.trim_start().starts_with("OpenGL ES") {
            Self::gles2()
        } else {
            Self::desktop()
        }
    }

    /// `GL_TEXTURE0 + unit`, or `None` when that does not fit in a `GLenum`.
    pub fn texture_unit(unit: u32) -> Option<GLenum> {
        gl::TEXTURE0.checked_add(unit)
    }
}

impl Default for GlConfig {
    fn default() -> Self {
        if cfg!(target_os = "android") {
            Self::gles2()
        } else {
            Self::desktop()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_string_detection() {
        assert_eq!(
            GlConfig::from_version_string("OpenGL ES 3.2 build 1.13").profile,
            GlProfile::Es2
        );
        assert_eq!(
            GlConfig::from_version_string("4.6.0 NVIDIA 535.54.03").profile,
            GlProfile::Desktop3
        );
    }

    #[test]
    fn test_wrap_modes() {
        assert_eq!(
            GlProfile::Es2.default_wrap_mode(),
            gl::CLAMP_TO_EDGE as GLint
        );
        assert_eq!(
            GlProfile::Desktop3.default_wrap_mode(),
            gl::CLAMP_TO_BORDER as GLint
        );
    }

    #[test]
    fn test_texture_unit_enum() {
        assert_eq!(GlConfig::texture_unit(0), Some(gl::TEXTURE0));
        assert_eq!(GlConfig::texture_unit(3), Some(gl::TEXTURE3));
        assert_eq!(GlConfig::texture_unit(u32::MAX), None);
    }

    #[test]
    fn test_es_has_no_vertex_array_objects() {
        assert!(!GlConfig::gles2().use_vertex_array_objects);
        assert!(GlConfig::desktop().use_vertex_array_objects);
    }
}
