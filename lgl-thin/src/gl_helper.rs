use crate::errors::GLErrorWrapper;
use gl::types::{GLchar, GLenum, GLfloat, GLint, GLsizei, GLsizeiptr, GLuint};
use std::ffi::{c_void, CStr, CString};
use std::ptr::null;

#[cfg(feature = "egl")]
pub fn initialize_gl_using_egli() {
    gl::load_with(|name| {
        let Ok(name) = CString::new(name) else {
            return null();
        };
        (unsafe { egli::ffi::eglGetProcAddress(name.as_ptr()) }) as *const _
    });
}

/// For windowing layers that hand out their own `get_proc_address`.
pub fn initialize_gl_with<F>(loader: F)
where
    F: FnMut(&'static str) -> *const c_void,
{
    gl::load_with(loader);
}

pub fn explode_if_gl_error(api: &dyn GlApi) -> Result<(), GLErrorWrapper> {
    let mut last_err = None;
    loop {
        let err = api.get_error();
        if err == gl::NO_ERROR {
            break;
        } else {
            last_err = Some(err);
        }
    }

    match last_err {
        Some(e) => Err(GLErrorWrapper::new(e)),
        None => Ok(()),
    }
}

//

/// Every OpenGL entry point the wrappers touch.
///
/// The wrappers never call `gl::*` directly; they go through a [GlApi] reached from
/// [crate::gl_fancy::GPUState]. [NativeGl] forwards to the loaded driver, and the
/// `headless` backend records calls for tests.
///
/// Object names are plain `GLuint`s with 0 meaning "none", as in GL itself.
pub trait GlApi {
    fn get_error(&self) -> GLenum;
    fn get_string(&self, name: GLenum) -> Option<String>;

    fn create_shader(&self, kind: GLenum) -> GLuint;
    fn shader_source(&self, shader: GLuint, source: &str);
    fn compile_shader(&self, shader: GLuint);
    fn get_shader_iv(&self, shader: GLuint, pname: GLenum) -> GLint;
    fn get_shader_info_log(&self, shader: GLuint) -> String;
    fn is_shader(&self, object: GLuint) -> bool;
    fn delete_shader(&self, shader: GLuint);

    fn create_program(&self) -> GLuint;
    fn attach_shader(&self, program: GLuint, shader: GLuint);
    fn bind_attrib_location(&self, program: GLuint, index: GLuint, name: &str);
    /// silently ignored where the driver has no such entry point (GLES 2)
    fn bind_frag_data_location(&self, program: GLuint, color_number: GLuint, name: &str);
    fn link_program(&self, program: GLuint);
    fn get_program_iv(&self, program: GLuint, pname: GLenum) -> GLint;
    fn get_program_info_log(&self, program: GLuint) -> String;
    fn is_program(&self, object: GLuint) -> bool;
    fn use_program(&self, program: GLuint);
    fn delete_program(&self, program: GLuint);
    fn get_active_uniform_name(&self, program: GLuint, index: GLuint) -> String;
    fn get_uniform_location(&self, program: GLuint, name: &str) -> GLint;

    fn uniform_1i(&self, location: GLint, v0: GLint);
    fn uniform_1f(&self, location: GLint, v0: GLfloat);
    fn uniform_1fv(&self, location: GLint, values: &[GLfloat]);
    /// `values.len()` must be a multiple of 3
    fn uniform_3fv(&self, location: GLint, values: &[GLfloat]);
    /// `values.len()` must be a multiple of 4
    fn uniform_4fv(&self, location: GLint, values: &[GLfloat]);
    /// column-major, `values.len()` must be a multiple of 16
    fn uniform_matrix_4fv(&self, location: GLint, values: &[GLfloat]);

    fn gen_texture(&self) -> GLuint;
    fn delete_texture(&self, texture: GLuint);
    fn active_texture(&self, unit: GLenum);
    fn bind_texture(&self, target: GLenum, texture: GLuint);
    fn tex_parameter_i(&self, target: GLenum, pname: GLenum, param: GLint);
    #[allow(clippy::too_many_arguments)]
    fn tex_image_2d(
        &self,
        target: GLenum,
        level: GLint,
        internal_format: GLint,
        width: GLsizei,
        height: GLsizei,
        format: GLenum,
        data_type: GLenum,
        pixels: Option<&[u8]>,
    );

    fn gen_buffer(&self) -> GLuint;
    fn delete_buffer(&self, buffer: GLuint);
    fn bind_buffer(&self, target: GLenum, buffer: GLuint);
    fn buffer_data(&self, target: GLenum, size: usize, data: Option<&[u8]>, usage: GLenum);
    fn buffer_sub_data(&self, target: GLenum, offset: usize, data: &[u8]);

    fn gen_vertex_array(&self) -> GLuint;
    fn delete_vertex_array(&self, array: GLuint);
    fn bind_vertex_array(&self, array: GLuint);
    /// `offset` is a byte offset into the bound GL_ARRAY_BUFFER
    fn vertex_attrib_pointer(
        &self,
        index: GLuint,
        size: GLint,
        data_type: GLenum,
        normalized: bool,
        stride: GLsizei,
        offset: usize,
    );
    fn enable_vertex_attrib_array(&self, index: GLuint);
    fn disable_vertex_attrib_array(&self, index: GLuint);
    fn draw_arrays(&self, mode: GLenum, first: GLint, count: GLsizei);
}

//

pub trait GLBufferType {
    const TYPE_CODE: GLenum;
}

impl GLBufferType for GLfloat {
    const TYPE_CODE: GLenum = gl::FLOAT;
}

impl GLBufferType for u8 {
    const TYPE_CODE: GLenum = gl::UNSIGNED_BYTE;
}

//

/// Forwards to the function pointers loaded by [initialize_gl_using_egli] or
/// [initialize_gl_with]. Calling anything before loading them will crash.
pub struct NativeGl;

fn c_name(name: &str) -> Option<CString> {
    match CString::new(name) {
        Ok(c) => Some(c),
        Err(e) => {
            log::error!("GL name {:?} is not a C string: {}", name, e);
            None
        }
    }
}

fn from_glchar_to_string(mut src: Vec<GLchar>) -> String {
    // drivers count the terminating NUL in some places and not in others
    while src.last() == Some(&0) {
        src.pop();
    }
    let bytes = src.into_iter().map(|x| x as u8).collect::<Vec<_>>();
    String::from_utf8_lossy(&bytes).into_owned()
}

impl GlApi for NativeGl {
    fn get_error(&self) -> GLenum {
        unsafe { gl::GetError() }
    }

    fn get_string(&self, name: GLenum) -> Option<String> {
        let raw = unsafe { gl::GetString(name) };
        if raw.is_null() {
            None
        } else {
            let s = unsafe { CStr::from_ptr(raw as *const _) };
            Some(s.to_string_lossy().into_owned())
        }
    }

    fn create_shader(&self, kind: GLenum) -> GLuint {
        unsafe { gl::CreateShader(kind) }
    }

    fn shader_source(&self, shader: GLuint, source: &str) {
        let bytes = source.as_bytes();
        let strings = [bytes.as_ptr() as *const GLchar];
        let lengths = [bytes.len() as GLint];
        unsafe { gl::ShaderSource(shader, 1, strings.as_ptr(), lengths.as_ptr()) };
    }

    fn compile_shader(&self, shader: GLuint) {
        unsafe { gl::CompileShader(shader) }
    }

    fn get_shader_iv(&self, shader: GLuint, pname: GLenum) -> GLint {
        let mut rval = 0;
        unsafe { gl::GetShaderiv(shader, pname, &mut rval) };
        rval
    }

    fn get_shader_info_log(&self, shader: GLuint) -> String {
        let mut max_length = self.get_shader_iv(shader, gl::INFO_LOG_LENGTH);
        if max_length <= 0 {
            return String::new();
        }
        let mut error_log = Vec::with_capacity(max_length as usize);
        unsafe {
            gl::GetShaderInfoLog(shader, max_length, &mut max_length, error_log.as_mut_ptr());
            error_log.set_len(max_length as usize);
        }
        from_glchar_to_string(error_log)
    }

    fn is_shader(&self, object: GLuint) -> bool {
        unsafe { gl::IsShader(object) != 0 }
    }

    fn delete_shader(&self, shader: GLuint) {
        unsafe { gl::DeleteShader(shader) }
    }

    fn create_program(&self) -> GLuint {
        unsafe { gl::CreateProgram() }
    }

    fn attach_shader(&self, program: GLuint, shader: GLuint) {
        unsafe { gl::AttachShader(program, shader) }
    }

    fn bind_attrib_location(&self, program: GLuint, index: GLuint, name: &str) {
        if let Some(name) = c_name(name) {
            unsafe { gl::BindAttribLocation(program, index, name.as_ptr()) }
        }
    }

    fn bind_frag_data_location(&self, program: GLuint, color_number: GLuint, name: &str) {
        if !gl::BindFragDataLocation::is_loaded() {
            return;
        }
        if let Some(name) = c_name(name) {
            unsafe { gl::BindFragDataLocation(program, color_number, name.as_ptr()) }
        }
    }

    fn link_program(&self, program: GLuint) {
        unsafe { gl::LinkProgram(program) }
    }

    fn get_program_iv(&self, program: GLuint, pname: GLenum) -> GLint {
        let mut rval = 0;
        unsafe { gl::GetProgramiv(program, pname, &mut rval) };
        rval
    }

    fn get_program_info_log(&self, program: GLuint) -> String {
        let mut max_length = self.get_program_iv(program, gl::INFO_LOG_LENGTH);
        if max_length <= 0 {
            return String::new();
        }
        let mut error_log = Vec::with_capacity(max_length as usize);
        unsafe {
            gl::GetProgramInfoLog(program, max_length, &mut max_length, error_log.as_mut_ptr());
            error_log.set_len(max_length as usize);
        }
        from_glchar_to_string(error_log)
    }

    fn is_program(&self, object: GLuint) -> bool {
        unsafe { gl::IsProgram(object) != 0 }
    }

    fn use_program(&self, program: GLuint) {
        unsafe { gl::UseProgram(program) }
    }

    fn delete_program(&self, program: GLuint) {
        unsafe { gl::DeleteProgram(program) }
    }

    fn get_active_uniform_name(&self, program: GLuint, index: GLuint) -> String {
        let mut buff: Vec<GLchar> = vec![0; 256];
        let mut length: GLsizei = 0;
        let mut size: GLint = 0;
        let mut data_type: GLenum = 0;
        unsafe {
            gl::GetActiveUniform(
                program,
                index,
                buff.len() as GLsizei,
                &mut length,
                &mut size,
                &mut data_type,
                buff.as_mut_ptr(),
            )
        };
        buff.truncate(length.max(0) as usize);
        from_glchar_to_string(buff)
    }

    fn get_uniform_location(&self, program: GLuint, name: &str) -> GLint {
        match c_name(name) {
            Some(name) => unsafe { gl::GetUniformLocation(program, name.as_ptr()) },
            None => -1,
        }
    }

    fn uniform_1i(&self, location: GLint, v0: GLint) {
        unsafe { gl::Uniform1i(location, v0) }
    }

    fn uniform_1f(&self, location: GLint, v0: GLfloat) {
        unsafe { gl::Uniform1f(location, v0) }
    }

    fn uniform_1fv(&self, location: GLint, values: &[GLfloat]) {
        unsafe { gl::Uniform1fv(location, values.len() as GLsizei, values.as_ptr()) }
    }

    fn uniform_3fv(&self, location: GLint, values: &[GLfloat]) {
        unsafe { gl::Uniform3fv(location, (values.len() / 3) as GLsizei, values.as_ptr()) }
    }

    fn uniform_4fv(&self, location: GLint, values: &[GLfloat]) {
        unsafe { gl::Uniform4fv(location, (values.len() / 4) as GLsizei, values.as_ptr()) }
    }

    fn uniform_matrix_4fv(&self, location: GLint, values: &[GLfloat]) {
        let count = (values.len() / 16) as GLsizei;
        unsafe { gl::UniformMatrix4fv(location, count, gl::FALSE, values.as_ptr()) }
    }

    fn gen_texture(&self) -> GLuint {
        let mut rval = 0;
        unsafe { gl::GenTextures(1, &mut rval) };
        rval
    }

    fn delete_texture(&self, texture: GLuint) {
        unsafe { gl::DeleteTextures(1, &texture) }
    }

    fn active_texture(&self, unit: GLenum) {
        unsafe { gl::ActiveTexture(unit) }
    }

    fn bind_texture(&self, target: GLenum, texture: GLuint) {
        unsafe { gl::BindTexture(target, texture) }
    }

    fn tex_parameter_i(&self, target: GLenum, pname: GLenum, param: GLint) {
        unsafe { gl::TexParameteri(target, pname, param) }
    }

    fn tex_image_2d(
        &self,
        target: GLenum,
        level: GLint,
        internal_format: GLint,
        width: GLsizei,
        height: GLsizei,
        format: GLenum,
        data_type: GLenum,
        pixels: Option<&[u8]>,
    ) {
        let pixels = pixels.map_or(null(), |p| p.as_ptr() as *const c_void);
        unsafe {
            gl::TexImage2D(
                target,
                level,
                internal_format,
                width,
                height,
                0,
                format,
                // the call can crash if you pass the wrong value for type
                data_type,
                pixels,
            )
        }
    }

    fn gen_buffer(&self) -> GLuint {
        let mut rval = 0;
        unsafe { gl::GenBuffers(1, &mut rval) };
        rval
    }

    fn delete_buffer(&self, buffer: GLuint) {
        unsafe { gl::DeleteBuffers(1, &buffer) }
    }

    fn bind_buffer(&self, target: GLenum, buffer: GLuint) {
        unsafe { gl::BindBuffer(target, buffer) }
    }

    fn buffer_data(&self, target: GLenum, size: usize, data: Option<&[u8]>, usage: GLenum) {
        let data = data.map_or(null(), |d| d.as_ptr() as *const c_void);
        unsafe { gl::BufferData(target, size as GLsizeiptr, data, usage) }
    }

    fn buffer_sub_data(&self, target: GLenum, offset: usize, data: &[u8]) {
        unsafe {
            gl::BufferSubData(
                target,
                offset as isize,
                data.len() as GLsizeiptr,
                data.as_ptr() as *const c_void,
            )
        }
    }

    fn gen_vertex_array(&self) -> GLuint {
        let mut rval = 0;
        unsafe { gl::GenVertexArrays(1, &mut rval) };
        rval
    }

    fn delete_vertex_array(&self, array: GLuint) {
        unsafe { gl::DeleteVertexArrays(1, &array) }
    }

    fn bind_vertex_array(&self, array: GLuint) {
        unsafe { gl::BindVertexArray(array) }
    }

    fn vertex_attrib_pointer(
        &self,
        index: GLuint,
        size: GLint,
        data_type: GLenum,
        normalized: bool,
        stride: GLsizei,
        offset: usize,
    ) {
        // The "pointer" is really a byte offset into the bound buffer.
        // The OpenGL API is dumb like that.
        let normalized = if normalized { gl::TRUE } else { gl::FALSE };
        unsafe {
            gl::VertexAttribPointer(
                index,
                size,
                data_type,
                normalized,
                stride,
                offset as *const c_void,
            )
        }
    }

    fn enable_vertex_attrib_array(&self, index: GLuint) {
        unsafe { gl::EnableVertexAttribArray(index) }
    }

    fn disable_vertex_attrib_array(&self, index: GLuint) {
        unsafe { gl::DisableVertexAttribArray(index) }
    }

    fn draw_arrays(&self, mode: GLenum, first: GLint, count: GLsizei) {
        unsafe { gl::DrawArrays(mode, first, count) }
    }
}
