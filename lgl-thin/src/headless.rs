//! A [GlApi] that needs no driver. It hands out object names, pretends to compile
//! and link, remembers buffer contents, uniform values and vertex attribute state,
//! and logs every call. Tests assert against it.
//!
//! Simulation rules:
//! * a shader fails to compile iff a line starts with `#error`
//! * a program links iff one compiled vertex and one compiled fragment shader are attached
//! * active uniforms are the `uniform` declarations of the attached shaders; arrays are
//!   reported as `name[0]` the way drivers do

use crate::config::GlConfig;
use crate::gl_fancy::GPUState;
use crate::gl_helper::GlApi;
use gl::types::{GLenum, GLfloat, GLint, GLsizei, GLuint};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

#[derive(Clone, Debug, PartialEq)]
pub enum GlCall {
    CreateShader(GLenum, GLuint),
    CompileShader(GLuint),
    DeleteShader(GLuint),
    CreateProgram(GLuint),
    AttachShader(GLuint, GLuint),
    BindAttribLocation(GLuint, GLuint, String),
    BindFragDataLocation(GLuint, GLuint, String),
    LinkProgram(GLuint),
    UseProgram(GLuint),
    DeleteProgram(GLuint),
    Uniform1i(GLint, GLint),
    /// location, components per element, flattened values
    UniformFloats(GLint, usize, Vec<GLfloat>),
    GenTexture(GLuint),
    DeleteTexture(GLuint),
    ActiveTexture(GLenum),
    BindTexture(GLenum, GLuint),
    TexParameter(GLenum, GLenum, GLint),
    TexImage2D {
        target: GLenum,
        internal_format: GLint,
        width: GLsizei,
        height: GLsizei,
        format: GLenum,
        data_len: Option<usize>,
    },
    GenBuffer(GLuint),
    DeleteBuffer(GLuint),
    BindBuffer(GLenum, GLuint),
    BufferData(GLenum, usize),
    BufferSubData(GLenum, usize, usize),
    GenVertexArray(GLuint),
    DeleteVertexArray(GLuint),
    BindVertexArray(GLuint),
    VertexAttribPointer {
        index: GLuint,
        size: GLint,
        offset: usize,
    },
    EnableVertexAttribArray(GLuint),
    DisableVertexAttribArray(GLuint),
    DrawArrays(GLenum, GLint, GLsizei),
}

struct HeadlessShader {
    kind: GLenum,
    source: String,
    compiled: bool,
    log: String,
}

#[derive(Default)]
struct HeadlessProgram {
    attached: Vec<GLuint>,
    linked: bool,
    log: String,
    uniforms: Vec<String>,
    values: HashMap<GLint, Vec<GLfloat>>,
    ints: HashMap<GLint, GLint>,
}

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttribState {
    pub enabled: bool,
    pub size: GLint,
    pub offset: usize,
    pub buffer: GLuint,
}

#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct TextureState {
    pub width: GLsizei,
    pub height: GLsizei,
    pub internal_format: GLint,
    pub format: GLenum,
    pub params: HashMap<GLenum, GLint>,
}

#[derive(Default)]
struct State {
    next_id: GLuint,
    calls: Vec<GlCall>,
    pending_errors: Vec<GLenum>,
    // entry point name -> error raised the next time it is called
    armed_errors: HashMap<&'static str, GLenum>,
    shaders: HashMap<GLuint, HeadlessShader>,
    programs: HashMap<GLuint, HeadlessProgram>,
    current_program: GLuint,
    textures: HashMap<GLuint, TextureState>,
    active_unit: GLenum,
    texture_bindings: HashMap<GLenum, GLuint>,
    buffers: HashMap<GLuint, Vec<u8>>,
    array_buffer: GLuint,
    vertex_arrays: HashSet<GLuint>,
    bound_vertex_array: GLuint,
    // keyed by vertex array object, 0 being the default one
    attribs: HashMap<GLuint, HashMap<GLuint, AttribState>>,
}

impl State {
    fn fresh_id(&mut self) -> GLuint {
        self.next_id += 1;
        self.next_id
    }

    fn error(&mut self, code: GLenum) {
        self.pending_errors.push(code);
    }

    fn attrib_mut(&mut self, index: GLuint) -> &mut AttribState {
        self.attribs
            .entry(self.bound_vertex_array)
            .or_default()
            .entry(index)
            .or_default()
    }
}

fn compile(source: &str) -> (bool, String) {
    match source
        .lines()
        .enumerate()
        .find(|(_, line)| line.trim_start().starts_with("#error"))
    {
        Some((n, line)) => (
            false,
            format!("ERROR: 0:{}: '{}' : error directive", n + 1, line.trim()),
        ),
        None => (true, String::new()),
    }
}

/// `uniform [precision] type name[N];` declarations, in order of appearance
fn declared_uniforms(source: &str) -> Vec<String> {
    source
        .split(';')
        .filter_map(|statement| {
            let words: Vec<&str> = statement.split_whitespace().collect();
            let uniform_at = words.iter().position(|w| *w == "uniform")?;
            let declarator = words.get(uniform_at + 2..)?.last()?;
            Some(match declarator.split_once('[') {
                Some((name, _)) => format!("{}[0]", name),
                None => declarator.to_string(),
            })
        })
        .collect()
}

#[derive(Default)]
pub struct HeadlessGl {
    state: RefCell<State>,
}

impl HeadlessGl {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn calls(&self) -> Vec<GlCall> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    /// queue an error for the next `get_error`
    pub fn push_error(&self, code: GLenum) {
        self.state.borrow_mut().error(code);
    }

    /// Makes the next call to `entry_point` (e.g. `"glUniform1i"`) raise `code`.
    pub fn fail_at(&self, entry_point: &'static str, code: GLenum) {
        self.state
            .borrow_mut()
            .armed_errors
            .insert(entry_point, code);
    }

    fn trip(&self, entry_point: &'static str) {
        let mut state = self.state.borrow_mut();
        if let Some(code) = state.armed_errors.remove(entry_point) {
            state.error(code);
        }
    }

    pub fn current_program(&self) -> GLuint {
        self.state.borrow().current_program
    }

    pub fn program_exists(&self, program: GLuint) -> bool {
        self.state.borrow().programs.contains_key(&program)
    }

    pub fn shader_exists(&self, shader: GLuint) -> bool {
        self.state.borrow().shaders.contains_key(&shader)
    }

    pub fn uniform_floats(&self, program: GLuint, name: &str) -> Option<Vec<GLfloat>> {
        let state = self.state.borrow();
        let p = state.programs.get(&program)?;
        let location = p.uniforms.iter().position(|u| u == name)? as GLint;
        p.values.get(&location).cloned()
    }

    pub fn uniform_int(&self, program: GLuint, name: &str) -> Option<GLint> {
        let state = self.state.borrow();
        let p = state.programs.get(&program)?;
        let location = p.uniforms.iter().position(|u| u == name)? as GLint;
        p.ints.get(&location).copied()
    }

    pub fn texture(&self, texture: GLuint) -> Option<TextureState> {
        self.state.borrow().textures.get(&texture).cloned()
    }

    pub fn bound_texture(&self, unit: GLenum) -> GLuint {
        self.state
            .borrow()
            .texture_bindings
            .get(&unit)
            .copied()
            .unwrap_or(0)
    }

    pub fn buffer_contents(&self, buffer: GLuint) -> Option<Vec<u8>> {
        self.state.borrow().buffers.get(&buffer).cloned()
    }

    pub fn bound_array_buffer(&self) -> GLuint {
        self.state.borrow().array_buffer
    }

    pub fn vertex_array_exists(&self, array: GLuint) -> bool {
        self.state.borrow().vertex_arrays.contains(&array)
    }

    /// attribute state as seen by the vertex array object `array` (0 for the default one)
    pub fn attrib(&self, array: GLuint, index: GLuint) -> AttribState {
        self.state
            .borrow()
            .attribs
            .get(&array)
            .and_then(|a| a.get(&index))
            .copied()
            .unwrap_or_default()
    }

    /// attribute state of whatever vertex array is bound right now
    pub fn current_attrib(&self, index: GLuint) -> AttribState {
        let array = self.state.borrow().bound_vertex_array;
        self.attrib(array, index)
    }

    /// shaders, programs, textures, buffers and vertex arrays not yet deleted
    pub fn live_objects(&self) -> usize {
        let state = self.state.borrow();
        state.shaders.len()
            + state.programs.len()
            + state.textures.len()
            + state.buffers.len()
            + state.vertex_arrays.len()
    }

    fn record(&self, call: GlCall) {
        self.state.borrow_mut().calls.push(call);
    }

    fn upload_floats(&self, location: GLint, components: usize, values: &[GLfloat]) {
        self.record(GlCall::UniformFloats(location, components, values.to_vec()));
        if location < 0 {
            return;
        }
        let mut state = self.state.borrow_mut();
        let current = state.current_program;
        let stored = match state.programs.get_mut(&current) {
            Some(p) if p.linked => {
                p.values.insert(location, values.to_vec());
                true
            }
            _ => false,
        };
        if !stored {
            state.error(gl::INVALID_OPERATION);
        }
    }
}

/// A context plus the backend behind it, for tests.
pub fn headless_gpu(config: GlConfig) -> (Rc<HeadlessGl>, GPUState) {
    let gl = Rc::new(HeadlessGl::new());
    let gpu = GPUState::new(gl.clone(), config);
    (gl, gpu)
}

impl GlApi for HeadlessGl {
    fn get_error(&self) -> GLenum {
        let mut state = self.state.borrow_mut();
        if state.pending_errors.is_empty() {
            gl::NO_ERROR
        } else {
            state.pending_errors.remove(0)
        }
    }

    fn get_string(&self, name: GLenum) -> Option<String> {
        match name {
            gl::VERSION => Some("OpenGL ES 2.0 headless".to_string()),
            gl::VENDOR => Some("lgl".to_string()),
            _ => None,
        }
    }

    fn create_shader(&self, kind: GLenum) -> GLuint {
        self.trip("glCreateShader");
        let mut state = self.state.borrow_mut();
        let id = state.fresh_id();
        state.shaders.insert(
            id,
            HeadlessShader {
                kind,
                source: String::new(),
                compiled: false,
                log: String::new(),
            },
        );
        state.calls.push(GlCall::CreateShader(kind, id));
        id
    }

    fn shader_source(&self, shader: GLuint, source: &str) {
        let mut state = self.state.borrow_mut();
        let found = match state.shaders.get_mut(&shader) {
            Some(s) => {
                s.source = source.to_string();
                true
            }
            None => false,
        };
        if !found {
            state.error(gl::INVALID_VALUE);
        }
    }

    fn compile_shader(&self, shader: GLuint) {
        self.record(GlCall::CompileShader(shader));
        let mut state = self.state.borrow_mut();
        let found = match state.shaders.get_mut(&shader) {
            Some(s) => {
                let (compiled, log) = compile(&s.source);
                s.compiled = compiled;
                s.log = log;
                true
            }
            None => false,
        };
        if !found {
            state.error(gl::INVALID_VALUE);
        }
    }

    fn get_shader_iv(&self, shader: GLuint, pname: GLenum) -> GLint {
        let state = self.state.borrow();
        let Some(s) = state.shaders.get(&shader) else {
            return 0;
        };
        match pname {
            gl::COMPILE_STATUS => s.compiled as GLint,
            gl::INFO_LOG_LENGTH => s.log.len() as GLint,
            gl::SHADER_TYPE => s.kind as GLint,
            _ => 0,
        }
    }

    fn get_shader_info_log(&self, shader: GLuint) -> String {
        let state = self.state.borrow();
        state
            .shaders
            .get(&shader)
            .map(|s| s.log.clone())
            .unwrap_or_default()
    }

    fn is_shader(&self, object: GLuint) -> bool {
        self.shader_exists(object)
    }

    fn delete_shader(&self, shader: GLuint) {
        self.record(GlCall::DeleteShader(shader));
        self.state.borrow_mut().shaders.remove(&shader);
    }

    fn create_program(&self) -> GLuint {
        let mut state = self.state.borrow_mut();
        let id = state.fresh_id();
        state.programs.insert(id, HeadlessProgram::default());
        state.calls.push(GlCall::CreateProgram(id));
        id
    }

    fn attach_shader(&self, program: GLuint, shader: GLuint) {
        self.record(GlCall::AttachShader(program, shader));
        let mut state = self.state.borrow_mut();
        if !state.shaders.contains_key(&shader) {
            state.error(gl::INVALID_VALUE);
            return;
        }
        let found = match state.programs.get_mut(&program) {
            Some(p) => {
                p.attached.push(shader);
                true
            }
            None => false,
        };
        if !found {
            state.error(gl::INVALID_VALUE);
        }
    }

    fn bind_attrib_location(&self, program: GLuint, index: GLuint, name: &str) {
        self.record(GlCall::BindAttribLocation(program, index, name.to_string()));
    }

    fn bind_frag_data_location(&self, program: GLuint, color_number: GLuint, name: &str) {
        self.record(GlCall::BindFragDataLocation(
            program,
            color_number,
            name.to_string(),
        ));
    }

    fn link_program(&self, program: GLuint) {
        self.record(GlCall::LinkProgram(program));
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        if !state.programs.contains_key(&program) {
            state.error(gl::INVALID_VALUE);
            return;
        }
        let Some(p) = state.programs.get_mut(&program) else {
            return;
        };

        let stages: Vec<&HeadlessShader> = p
            .attached
            .iter()
            .filter_map(|id| state.shaders.get(id))
            .collect();
        let has_stage = |kind: GLenum| stages.iter().any(|s| s.kind == kind && s.compiled);

        if has_stage(gl::VERTEX_SHADER) && has_stage(gl::FRAGMENT_SHADER) {
            let mut uniforms: Vec<String> = Vec::new();
            for name in stages.iter().flat_map(|s| declared_uniforms(&s.source)) {
                if !uniforms.contains(&name) {
                    uniforms.push(name);
                }
            }
            p.linked = true;
            p.log = String::new();
            p.uniforms = uniforms;
            p.values.clear();
            p.ints.clear();
        } else {
            p.linked = false;
            p.log = "error: program needs a compiled vertex and fragment shader".to_string();
            p.uniforms.clear();
        }
    }

    fn get_program_iv(&self, program: GLuint, pname: GLenum) -> GLint {
        let state = self.state.borrow();
        let Some(p) = state.programs.get(&program) else {
            return 0;
        };
        match pname {
            gl::LINK_STATUS => p.linked as GLint,
            gl::INFO_LOG_LENGTH => p.log.len() as GLint,
            gl::ACTIVE_UNIFORMS => p.uniforms.len() as GLint,
            _ => 0,
        }
    }

    fn get_program_info_log(&self, program: GLuint) -> String {
        let state = self.state.borrow();
        state
            .programs
            .get(&program)
            .map(|p| p.log.clone())
            .unwrap_or_default()
    }

    fn is_program(&self, object: GLuint) -> bool {
        self.program_exists(object)
    }

    fn use_program(&self, program: GLuint) {
        self.record(GlCall::UseProgram(program));
        let mut state = self.state.borrow_mut();
        let usable = program == 0 || state.programs.get(&program).map_or(false, |p| p.linked);
        if usable {
            state.current_program = program;
        } else {
            state.error(gl::INVALID_OPERATION);
        }
    }

    fn delete_program(&self, program: GLuint) {
        self.record(GlCall::DeleteProgram(program));
        let mut state = self.state.borrow_mut();
        state.programs.remove(&program);
        if state.current_program == program {
            state.current_program = 0;
        }
    }

    fn get_active_uniform_name(&self, program: GLuint, index: GLuint) -> String {
        self.trip("glGetActiveUniform");
        let state = self.state.borrow();
        state
            .programs
            .get(&program)
            .and_then(|p| p.uniforms.get(index as usize).cloned())
            .unwrap_or_default()
    }

    fn get_uniform_location(&self, program: GLuint, name: &str) -> GLint {
        let state = self.state.borrow();
        let Some(p) = state.programs.get(&program) else {
            return -1;
        };
        let array_name = format!("{}[0]", name);
        p.uniforms
            .iter()
            .position(|u| *u == name || *u == array_name)
            .map_or(-1, |i| i as GLint)
    }

    fn uniform_1i(&self, location: GLint, v0: GLint) {
        self.trip("glUniform1i");
        self.record(GlCall::Uniform1i(location, v0));
        if location < 0 {
            return;
        }
        let mut state = self.state.borrow_mut();
        let current = state.current_program;
        let stored = match state.programs.get_mut(&current) {
            Some(p) if p.linked => {
                p.ints.insert(location, v0);
                true
            }
            _ => false,
        };
        if !stored {
            state.error(gl::INVALID_OPERATION);
        }
    }

    fn uniform_1f(&self, location: GLint, v0: GLfloat) {
        self.upload_floats(location, 1, &[v0]);
    }

    fn uniform_1fv(&self, location: GLint, values: &[GLfloat]) {
        self.upload_floats(location, 1, values);
    }

    fn uniform_3fv(&self, location: GLint, values: &[GLfloat]) {
        self.upload_floats(location, 3, values);
    }

    fn uniform_4fv(&self, location: GLint, values: &[GLfloat]) {
        self.upload_floats(location, 4, values);
    }

    fn uniform_matrix_4fv(&self, location: GLint, values: &[GLfloat]) {
        self.upload_floats(location, 16, values);
    }

    fn gen_texture(&self) -> GLuint {
        let mut state = self.state.borrow_mut();
        let id = state.fresh_id();
        state.textures.insert(id, TextureState::default());
        state.calls.push(GlCall::GenTexture(id));
        id
    }

    fn delete_texture(&self, texture: GLuint) {
        self.record(GlCall::DeleteTexture(texture));
        let mut state = self.state.borrow_mut();
        state.textures.remove(&texture);
        state.texture_bindings.retain(|_, bound| *bound != texture);
    }

    fn active_texture(&self, unit: GLenum) {
        self.record(GlCall::ActiveTexture(unit));
        self.state.borrow_mut().active_unit = unit;
    }

    fn bind_texture(&self, target: GLenum, texture: GLuint) {
        self.record(GlCall::BindTexture(target, texture));
        let mut state = self.state.borrow_mut();
        if texture != 0 && !state.textures.contains_key(&texture) {
            state.error(gl::INVALID_OPERATION);
            return;
        }
        let unit = if state.active_unit == 0 {
            gl::TEXTURE0
        } else {
            state.active_unit
        };
        state.texture_bindings.insert(unit, texture);
    }

    fn tex_parameter_i(&self, target: GLenum, pname: GLenum, param: GLint) {
        self.record(GlCall::TexParameter(target, pname, param));
        let mut state = self.state.borrow_mut();
        let unit = state.active_unit.max(gl::TEXTURE0);
        let bound = state.texture_bindings.get(&unit).copied().unwrap_or(0);
        if let Some(t) = state.textures.get_mut(&bound) {
            t.params.insert(pname, param);
        }
    }

    fn tex_image_2d(
        &self,
        target: GLenum,
        _level: GLint,
        internal_format: GLint,
        width: GLsizei,
        height: GLsizei,
        format: GLenum,
        _data_type: GLenum,
        pixels: Option<&[u8]>,
    ) {
        self.record(GlCall::TexImage2D {
            target,
            internal_format,
            width,
            height,
            format,
            data_len: pixels.map(|p| p.len()),
        });
        let mut state = self.state.borrow_mut();
        let unit = state.active_unit.max(gl::TEXTURE0);
        let bound = state.texture_bindings.get(&unit).copied().unwrap_or(0);
        if let Some(t) = state.textures.get_mut(&bound) {
            t.width = width;
            t.height = height;
            t.internal_format = internal_format;
            t.format = format;
        }
    }

    fn gen_buffer(&self) -> GLuint {
        let mut state = self.state.borrow_mut();
        let id = state.fresh_id();
        state.buffers.insert(id, Vec::new());
        state.calls.push(GlCall::GenBuffer(id));
        id
    }

    fn delete_buffer(&self, buffer: GLuint) {
        self.record(GlCall::DeleteBuffer(buffer));
        let mut state = self.state.borrow_mut();
        state.buffers.remove(&buffer);
        if state.array_buffer == buffer {
            state.array_buffer = 0;
        }
    }

    fn bind_buffer(&self, target: GLenum, buffer: GLuint) {
        self.record(GlCall::BindBuffer(target, buffer));
        let mut state = self.state.borrow_mut();
        if buffer != 0 && !state.buffers.contains_key(&buffer) {
            state.error(gl::INVALID_OPERATION);
            return;
        }
        if target == gl::ARRAY_BUFFER {
            state.array_buffer = buffer;
        }
    }

    fn buffer_data(&self, target: GLenum, size: usize, data: Option<&[u8]>, _usage: GLenum) {
        self.record(GlCall::BufferData(target, size));
        let mut state = self.state.borrow_mut();
        let bound = state.array_buffer;
        let err = match state.buffers.get_mut(&bound) {
            Some(contents) if target == gl::ARRAY_BUFFER => {
                *contents = vec![0; size];
                if let Some(data) = data {
                    let n = data.len().min(size);
                    contents[..n].copy_from_slice(&data[..n]);
                }
                None
            }
            _ => Some(gl::INVALID_OPERATION),
        };
        if let Some(code) = err {
            state.error(code);
        }
    }

    fn buffer_sub_data(&self, target: GLenum, offset: usize, data: &[u8]) {
        self.record(GlCall::BufferSubData(target, offset, data.len()));
        let mut state = self.state.borrow_mut();
        let bound = state.array_buffer;
        let err = match state.buffers.get_mut(&bound) {
            Some(contents) if target == gl::ARRAY_BUFFER => {
                if offset + data.len() > contents.len() {
                    Some(gl::INVALID_VALUE)
                } else {
                    contents[offset..offset + data.len()].copy_from_slice(data);
                    None
                }
            }
            _ => Some(gl::INVALID_OPERATION),
        };
        if let Some(code) = err {
            state.error(code);
        }
    }

    fn gen_vertex_array(&self) -> GLuint {
        let mut state = self.state.borrow_mut();
        let id = state.fresh_id();
        state.vertex_arrays.insert(id);
        state.calls.push(GlCall::GenVertexArray(id));
        id
    }

    fn delete_vertex_array(&self, array: GLuint) {
        self.record(GlCall::DeleteVertexArray(array));
        let mut state = self.state.borrow_mut();
        state.vertex_arrays.remove(&array);
        state.attribs.remove(&array);
        if state.bound_vertex_array == array {
            state.bound_vertex_array = 0;
        }
    }

    fn bind_vertex_array(&self, array: GLuint) {
        self.record(GlCall::BindVertexArray(array));
        let mut state = self.state.borrow_mut();
        if array != 0 && !state.vertex_arrays.contains(&array) {
            state.error(gl::INVALID_OPERATION);
            return;
        }
        state.bound_vertex_array = array;
    }

    fn vertex_attrib_pointer(
        &self,
        index: GLuint,
        size: GLint,
        _data_type: GLenum,
        _normalized: bool,
        _stride: GLsizei,
        offset: usize,
    ) {
        self.record(GlCall::VertexAttribPointer {
            index,
            size,
            offset,
        });
        let mut state = self.state.borrow_mut();
        let buffer = state.array_buffer;
        let attrib = state.attrib_mut(index);
        attrib.size = size;
        attrib.offset = offset;
        attrib.buffer = buffer;
    }

    fn enable_vertex_attrib_array(&self, index: GLuint) {
        self.record(GlCall::EnableVertexAttribArray(index));
        self.state.borrow_mut().attrib_mut(index).enabled = true;
    }

    fn disable_vertex_attrib_array(&self, index: GLuint) {
        self.record(GlCall::DisableVertexAttribArray(index));
        self.state.borrow_mut().attrib_mut(index).enabled = false;
    }

    fn draw_arrays(&self, mode: GLenum, first: GLint, count: GLsizei) {
        self.record(GlCall::DrawArrays(mode, first, count));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_uniforms() {
        let src = "uniform mat4 u_MVP;\nuniform highp vec3 u_Lights[4];\nin vec3 in_Vertex;\n\
                   uniform sampler2D Texture0;";
        assert_eq!(
            declared_uniforms(src),
            vec!["u_MVP", "u_Lights[0]", "Texture0"]
        );
    }

    #[test]
    fn test_error_directive_fails_compile() {
        assert!(compile("void main() {}").0);
        let (ok, log) = compile("void main() {}\n  #error nope\n");
        assert!(!ok);
        assert!(log.contains("0:2"));
    }

    #[test]
    fn test_sub_data_overflow_is_an_error() {
        let api = HeadlessGl::new();
        let b = api.gen_buffer();
        api.bind_buffer(gl::ARRAY_BUFFER, b);
        api.buffer_data(gl::ARRAY_BUFFER, 4, None, gl::STATIC_DRAW);
        api.buffer_sub_data(gl::ARRAY_BUFFER, 2, &[1, 2, 3]);
        assert_eq!(api.get_error(), gl::INVALID_VALUE);
        assert_eq!(api.get_error(), gl::NO_ERROR);
        assert_eq!(api.buffer_contents(b), Some(vec![0; 4]));
    }
}
