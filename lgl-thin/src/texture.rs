use crate::config::{GlConfig, GlProfile};
use crate::errors::GLErrorWrapper;
use crate::gl_fancy::GPUState;
use crate::gl_helper::GLBufferType;
use gl::types::{GLenum, GLint, GLsizei, GLuint};
use lgl_geometry::{Bitmap, BitmapFormat};

/// `(internal_format, format)` for uploading `format` pixels, or `None` if the
/// profile has no matching texture format.
///
/// ES 2 has no BGR(A) upload formats, so the bytes go up as RGB(A) unchanged and
/// red and blue end up swapped. Shaders written for ES account for that.
pub fn choose_internal_format(format: BitmapFormat, profile: GlProfile) -> Option<(GLint, GLenum)> {
    match (format, profile) {
        (BitmapFormat::Bgr8, GlProfile::Es2) => Some((gl::RGB as GLint, gl::RGB)),
        (BitmapFormat::Bgr8, GlProfile::Desktop3) => Some((gl::RGB8 as GLint, gl::BGR)),
        (BitmapFormat::Bgra8, GlProfile::Es2) => Some((gl::RGBA as GLint, gl::RGBA)),
        (BitmapFormat::Bgra8, GlProfile::Desktop3) => Some((gl::RGBA8 as GLint, gl::BGRA)),
        _ => None,
    }
}

/// A 2D texture object that is created lazily by the first upload or [Texture::set_format].
pub struct Texture {
    gpu: GPUState,
    id: GLuint,
    target: GLenum,
    internal_format: GLint,
    format: GLenum,
}

impl Texture {
    pub fn new(gpu: &GPUState) -> Self {
        Self {
            gpu: gpu.clone(),
            id: 0,
            target: gl::TEXTURE_2D,
            internal_format: 0,
            format: 0,
        }
    }

    /// 0 until something has been allocated
    pub fn id(&self) -> GLuint {
        self.id
    }

    pub fn target(&self) -> GLenum {
        self.target
    }

    pub fn format(&self) -> GLenum {
        self.format
    }

    pub fn internal_format(&self) -> GLint {
        self.internal_format
    }

    /// Throws away any previous texture object and allocates fresh, uninitialized
    /// storage. Useful as a render target.
    pub fn set_format(
        &mut self,
        target: GLenum,
        internal_format: GLint,
        format: GLenum,
        width: GLsizei,
        height: GLsizei,
    ) -> Result<(), GLErrorWrapper> {
        self.release();
        self.target = target;
        self.internal_format = internal_format;
        self.format = format;

        self.allocate();
        self.bind(0)?;
        self.apply_default_parameters();
        self.gpu.api().tex_image_2d(
            target,
            0,
            internal_format,
            width,
            height,
            format,
            u8::TYPE_CODE,
            None,
        );
        self.gpu.api().bind_texture(target, 0);
        self.gpu.check()
    }

    /// Uploads the bitmap's pixels. `None` leaves the texture untouched.
    pub fn load_from_bitmap(&mut self, bitmap: Option<&Bitmap>) -> Result<(), GLErrorWrapper> {
        let Some(bitmap) = bitmap else {
            return Ok(());
        };

        let profile = self.gpu.config().profile;
        let Some((internal_format, format)) = choose_internal_format(bitmap.format(), profile)
        else {
            log::error!(
                "cannot upload {:?} bitmap to a {:?} context",
                bitmap.format(),
                profile
            );
            return Err(GLErrorWrapper::unsupported_format(bitmap.format()));
        };

        self.allocate();
        self.internal_format = internal_format;
        self.format = format;
        self.bind(0)?;
        self.apply_default_parameters();

        if bitmap.is_empty() {
            log::debug!("texture {} gets no storage for an empty bitmap", self.id);
            return self.gpu.check();
        }

        self.gpu.api().tex_image_2d(
            self.target,
            0,
            internal_format,
            bitmap.width() as GLsizei,
            bitmap.height() as GLsizei,
            format,
            u8::TYPE_CODE,
            Some(bitmap.data()),
        );
        self.gpu.check()
    }

    /// Makes this texture current on texture unit `unit`.
    pub fn bind(&self, unit: u32) -> Result<(), GLErrorWrapper> {
        let Some(unit_enum) = GlConfig::texture_unit(unit) else {
            log::error!("texture unit {} is out of range", unit);
            return Err(GLErrorWrapper::new(gl::INVALID_ENUM));
        };
        let api = self.gpu.api();
        api.active_texture(unit_enum);
        api.bind_texture(self.target, self.id);
        self.gpu.check()
    }

    /// Sets both wrap axes to `mode` (`gl::REPEAT`, `gl::CLAMP_TO_EDGE`, ...).
    /// Leaves the texture bound on unit 0.
    pub fn set_clamping(&self, mode: GLint) -> Result<(), GLErrorWrapper> {
        self.bind(0)?;
        self.set_wrap(mode);
        self.gpu.check()
    }

    fn allocate(&mut self) {
        if self.id == 0 {
            self.id = self.gpu.api().gen_texture();
        }
    }

    fn set_wrap(&self, mode: GLint) {
        let api = self.gpu.api();
        api.tex_parameter_i(self.target, gl::TEXTURE_WRAP_S, mode);
        api.tex_parameter_i(self.target, gl::TEXTURE_WRAP_T, mode);
    }

    fn apply_default_parameters(&self) {
        let api = self.gpu.api();
        api.tex_parameter_i(self.target, gl::TEXTURE_MIN_FILTER, gl::LINEAR as GLint);
        api.tex_parameter_i(self.target, gl::TEXTURE_MAG_FILTER, gl::LINEAR as GLint);
        self.set_wrap(self.gpu.config().profile.default_wrap_mode());
    }

    fn release(&mut self) {
        if self.id != 0 {
            self.gpu.api().delete_texture(self.id);
            self.id = 0;
        }
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        self.release()
    }
}
