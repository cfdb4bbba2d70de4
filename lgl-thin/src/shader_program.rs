use crate::errors::{GLErrorWrapper, ShaderStage};
use crate::gl_fancy::GPUState;
use crate::gl_helper::GlApi;
use crate::glsl;
use gl::types::{GLenum, GLint, GLuint};
use lgl_geometry::{AttribSlot, Matrix4x4f, Vector3f, Vector4f};
use std::marker::PhantomData;

/// What [ShaderProgram::uniform_location] answers for names the linked program does not have.
pub const UNKNOWN_UNIFORM: GLint = -1;

/// Sampler uniforms wired to texture units 0..3 after every successful link.
pub const SAMPLER_NAMES: [&str; 4] = ["Texture0", "Texture1", "Texture2", "Texture3"];

pub const FRAG_COLOR_OUTPUT: &str = "out_FragColor";

//

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ObjectKind {
    Program,
    Shader,
    Unknown,
}

#[derive(Clone, Debug)]
pub struct StatusReport {
    pub kind: ObjectKind,
    pub success: bool,
    pub log: String,
}

/// Reads `pname` (COMPILE_STATUS, LINK_STATUS, ...) and the info log of either a
/// program or a shader object. A non-empty log is written to the info log.
pub fn check_status(api: &dyn GlApi, object: GLuint, pname: GLenum) -> StatusReport {
    let (kind, flag, info) = if api.is_program(object) {
        (
            ObjectKind::Program,
            api.get_program_iv(object, pname),
            api.get_program_info_log(object),
        )
    } else if api.is_shader(object) {
        (
            ObjectKind::Shader,
            api.get_shader_iv(object, pname),
            api.get_shader_info_log(object),
        )
    } else {
        (ObjectKind::Unknown, 0, String::new())
    };

    if !info.is_empty() {
        log::info!("{:?} info:\n{}", kind, info);
    }

    StatusReport {
        kind,
        success: flag != 0,
        log: info,
    }
}

//

pub trait ShaderFlavor {
    const STAGE: ShaderStage;
}

pub struct VertexShader {}
impl ShaderFlavor for VertexShader {
    const STAGE: ShaderStage = ShaderStage::Vertex;
}

pub struct FragmentShader {}
impl ShaderFlavor for FragmentShader {
    const STAGE: ShaderStage = ShaderStage::Fragment;
}

//

pub struct Shader<F> {
    gpu: GPUState,
    handle: GLuint,
    phantom_data: PhantomData<F>,
}

impl<F: ShaderFlavor> Shader<F> {
    /// Translates engine-dialect `source` for the context's profile and compiles it.
    /// The shader object is deleted again if compilation fails.
    pub fn compile(gpu: &GPUState, source: &str) -> Result<Self, GLErrorWrapper> {
        let api = gpu.api();
        let code = glsl::translate(source, F::STAGE, gpu.config().profile);

        let rval = Self {
            gpu: gpu.clone(),
            handle: api.create_shader(F::STAGE.gl_enum()),
            phantom_data: Default::default(),
        };
        let handle = rval.handle;
        gpu.check()?;

        api.shader_source(handle, &code);
        api.compile_shader(handle);
        gpu.check()?;

        let status = check_status(api, handle, gl::COMPILE_STATUS);
        if status.success {
            Ok(rval)
        } else {
            Err(GLErrorWrapper::compile_failed(F::STAGE, status.log))
        }
    }
}

impl<F> Shader<F> {
    /// get access to the GL handle in case you need to call some low-level stuff
    pub fn borrow(&self) -> GLuint {
        self.handle
    }
}

impl<F> Drop for Shader<F> {
    fn drop(&mut self) {
        self.gpu.api().delete_shader(self.handle)
    }
}

//

pub struct Program {
    gpu: GPUState,
    handle: GLuint,
}

impl Program {
    pub fn new_empty(gpu: &GPUState) -> Result<Self, GLErrorWrapper> {
        let handle = gpu.api().create_program();
        gpu.check()?;
        Ok(Self {
            gpu: gpu.clone(),
            handle,
        })
    }

    pub fn borrow(&self) -> GLuint {
        self.handle
    }

    fn attach<F>(&self, shader: &Shader<F>) -> Result<(), GLErrorWrapper> {
        self.gpu.api().attach_shader(self.handle, shader.borrow());
        self.gpu.check()
    }

    /// vertex inputs to their fixed slots, and the color output to draw buffer 0
    fn bind_default_locations(&self) {
        let api = self.gpu.api();
        for slot in AttribSlot::ALL {
            api.bind_attrib_location(self.handle, slot.index() as GLuint, slot.attribute_name());
        }
        if self.gpu.config().profile.supports_frag_data_location() {
            api.bind_frag_data_location(self.handle, 0, FRAG_COLOR_OUTPUT);
        }
    }

    fn link(&self) -> Result<(), GLErrorWrapper> {
        self.gpu.api().link_program(self.handle);
        self.gpu.check()?;
        let status = check_status(self.gpu.api(), self.handle, gl::LINK_STATUS);
        if status.success {
            Ok(())
        } else {
            Err(GLErrorWrapper::link_failed(status.log))
        }
    }
}

impl Program {
    /// The active uniforms as the driver reports them after a successful link.
    fn active_uniforms(&self) -> Result<Vec<Uniform>, GLErrorWrapper> {
        let api = self.gpu.api();
        let count = api.get_program_iv(self.handle, gl::ACTIVE_UNIFORMS);

        let mut rval = Vec::with_capacity(count.max(0) as usize);
        for i in 0..count.max(0) as GLuint {
            let reported = api.get_active_uniform_name(self.handle, i);
            let location = api.get_uniform_location(self.handle, &reported);
            // arrays come back as "name[0]", callers use the bare name
            let name = match reported.strip_suffix("[0]") {
                Some(base) => base.to_string(),
                None => reported,
            };
            rval.push(Uniform { name, location });
        }
        self.gpu.check()?;
        log::debug!("program {} has {} active uniforms", self.handle, rval.len());
        Ok(rval)
    }
}

impl Drop for Program {
    fn drop(&mut self) {
        self.gpu.api().delete_program(self.handle)
    }
}

//

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Uniform {
    pub name: String,
    pub location: GLint,
}

/// A vertex + fragment program written in the engine's shader dialect.
///
/// Construction never fails. If the sources do not compile or link the object stays
/// usable but unlinked ([ShaderProgram::is_linked] is false, binding it binds program 0).
/// A failed [ShaderProgram::relink] leaves the previously linked program in place.
pub struct ShaderProgram {
    gpu: GPUState,
    vertex_source: String,
    fragment_source: String,
    vertex_shader: Option<Shader<VertexShader>>,
    fragment_shader: Option<Shader<FragmentShader>>,
    program: Option<Program>,
    uniforms: Vec<Uniform>,
}

impl ShaderProgram {
    pub fn new(
        gpu: &GPUState,
        vertex_source: impl Into<String>,
        fragment_source: impl Into<String>,
    ) -> Self {
        let mut rval = Self {
            gpu: gpu.clone(),
            vertex_source: vertex_source.into(),
            fragment_source: fragment_source.into(),
            vertex_shader: None,
            fragment_shader: None,
            program: None,
            uniforms: Vec::new(),
        };
        // already logged; an unlinked program is a valid state
        let _ = rval.relink();
        rval
    }

    /// Recompiles both stages and links a fresh program from them.
    ///
    /// A stage that fails to compile keeps its previous shader object, and nothing is
    /// linked in that pass. The old program is only replaced once the new one has linked.
    pub fn relink(&mut self) -> Result<(), GLErrorWrapper> {
        let rval = self.relink_inner();
        if let Err(e) = &rval {
            log::error!("error while relinking shader program: {}", e);
        }
        rval
    }

    fn relink_inner(&mut self) -> Result<(), GLErrorWrapper> {
        let mut first_err = None;

        match Shader::<VertexShader>::compile(&self.gpu, &self.vertex_source) {
            Ok(shader) => self.vertex_shader = Some(shader),
            Err(e) => first_err = Some(e),
        }
        match Shader::<FragmentShader>::compile(&self.gpu, &self.fragment_source) {
            Ok(shader) => self.fragment_shader = Some(shader),
            Err(e) => first_err = first_err.or(Some(e)),
        }
        if let Some(e) = first_err {
            return Err(e);
        }

        let (Some(vertex_shader), Some(fragment_shader)) =
            (&self.vertex_shader, &self.fragment_shader)
        else {
            return Err(GLErrorWrapper::link_failed(
                "missing a compiled shader stage".to_string(),
            ));
        };

        let program = Program::new_empty(&self.gpu)?;
        program.attach(vertex_shader)?;
        program.attach(fragment_shader)?;
        program.bind_default_locations();
        program.link()?;
        let uniforms = program.active_uniforms()?;

        // program and uniform cache are adopted together; dropping the old program deletes it
        self.program = Some(program);
        self.uniforms = uniforms;

        // already adopted, so a sampler failure does not fail the relink
        if let Err(e) = self.bind().and_then(|_| self.bind_samplers()) {
            log::warn!(
                "program {} linked but its samplers were not set: {}",
                self.program_id(),
                e
            );
        }
        Ok(())
    }

    /// Swaps in new sources and relinks. On failure the previous program stays bound,
    /// but the new sources are kept for the next [ShaderProgram::relink].
    pub fn replace_sources(
        &mut self,
        vertex_source: impl Into<String>,
        fragment_source: impl Into<String>,
    ) -> Result<(), GLErrorWrapper> {
        self.vertex_source = vertex_source.into();
        self.fragment_source = fragment_source.into();
        self.relink()
    }

    fn bind_samplers(&self) -> Result<(), GLErrorWrapper> {
        let api = self.gpu.api();
        let program = self.program_id();
        for (unit, name) in SAMPLER_NAMES.iter().enumerate() {
            api.uniform_1i(api.get_uniform_location(program, name), unit as GLint);
        }
        self.gpu.check()
    }

    pub fn bind(&self) -> Result<(), GLErrorWrapper> {
        self.gpu.api().use_program(self.program_id());
        self.gpu.check()
    }

    pub fn program_id(&self) -> GLuint {
        self.program.as_ref().map_or(0, Program::borrow)
    }

    pub fn is_linked(&self) -> bool {
        self.program.is_some()
    }

    pub fn uniforms(&self) -> &[Uniform] {
        &self.uniforms
    }

    pub fn vertex_source(&self) -> &str {
        &self.vertex_source
    }

    pub fn fragment_source(&self) -> &str {
        &self.fragment_source
    }

    /// Linear scan of the uniforms cached at the last successful link.
    pub fn uniform_location(&self, name: &str) -> GLint {
        self.uniforms
            .iter()
            .find(|u| u.name == name)
            .map_or(UNKNOWN_UNIFORM, |u| u.location)
    }

    //

    /// Uploads go to whichever program is current, so [ShaderProgram::bind] first.
    /// Names the program does not have are accepted and ignored.
    fn upload(
        &self,
        name: &str,
        upload: impl FnOnce(&dyn GlApi, GLint),
    ) -> Result<(), GLErrorWrapper> {
        let location = self.uniform_location(name);
        if location == UNKNOWN_UNIFORM {
            log::trace!("program {} has no uniform {}", self.program_id(), name);
            return Ok(());
        }
        upload(self.gpu.api(), location);
        self.gpu.check()
    }

    pub fn set_uniform_float(&self, name: &str, value: f32) -> Result<(), GLErrorWrapper> {
        self.upload(name, |api, location| api.uniform_1f(location, value))
    }

    pub fn set_uniform_float_array(&self, name: &str, values: &[f32]) -> Result<(), GLErrorWrapper> {
        self.upload(name, |api, location| api.uniform_1fv(location, values))
    }

    pub fn set_uniform_vec3_array(
        &self,
        name: &str,
        values: &[Vector3f],
    ) -> Result<(), GLErrorWrapper> {
        self.upload(name, |api, location| {
            api.uniform_3fv(location, bytemuck::cast_slice(values))
        })
    }

    pub fn set_uniform_vec4_array(
        &self,
        name: &str,
        values: &[Vector4f],
    ) -> Result<(), GLErrorWrapper> {
        self.upload(name, |api, location| {
            api.uniform_4fv(location, bytemuck::cast_slice(values))
        })
    }

    pub fn set_uniform_mat4_array(
        &self,
        name: &str,
        values: &[Matrix4x4f],
    ) -> Result<(), GLErrorWrapper> {
        self.upload(name, |api, location| {
            api.uniform_matrix_4fv(location, bytemuck::cast_slice(values))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GlConfig;
    use crate::errors::GLErrorKind;
    use crate::headless::{headless_gpu, GlCall};

    const VS: &str = "in vec3 in_Vertex;\n\
                      in vec2 in_TexCoord;\n\
                      out vec2 TexCoord;\n\
                      uniform mat4 u_MVP;\n\
                      void main() { TexCoord = in_TexCoord; gl_Position = u_MVP * vec4(in_Vertex, 1.0); }\n";

    const FS: &str = "in vec2 TexCoord;\n\
                      uniform sampler2D Texture0;\n\
                      uniform sampler2D Texture1;\n\
                      uniform vec3 u_Lights[4];\n\
                      uniform float u_Alpha;\n\
                      out vec4 out_FragColor;\n\
                      void main() { out_FragColor = texture(Texture0, TexCoord); }\n";

    const BROKEN_FS: &str = "#error this does not compile\n";

    #[test]
    fn test_link_caches_uniforms_and_binds_samplers() {
        let (gl, gpu) = headless_gpu(GlConfig::gles2());
        let program = ShaderProgram::new(&gpu, VS, FS);

        assert!(program.is_linked());
        let id = program.program_id();
        assert_ne!(id, 0);

        let names: Vec<&str> = program.uniforms().iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["u_MVP", "Texture0", "Texture1", "u_Lights", "u_Alpha"]);
        assert_ne!(program.uniform_location("u_Lights"), UNKNOWN_UNIFORM);

        assert_eq!(gl.uniform_int(id, "Texture0"), Some(0));
        assert_eq!(gl.uniform_int(id, "Texture1"), Some(1));
        assert_eq!(gl.current_program(), id);
    }

    #[test]
    fn test_default_locations_bound_before_link() {
        let (gl, gpu) = headless_gpu(GlConfig::desktop());
        let program = ShaderProgram::new(&gpu, VS, FS);
        let id = program.program_id();

        let calls = gl.calls();
        let link_at = calls
            .iter()
            .position(|c| *c == GlCall::LinkProgram(id))
            .unwrap();
        for (slot, name) in ["in_Vertex", "in_TexCoord", "in_Normal", "in_Color"]
            .iter()
            .enumerate()
        {
            let at = calls
                .iter()
                .position(|c| *c == GlCall::BindAttribLocation(id, slot as GLuint, name.to_string()))
                .unwrap();
            assert!(at < link_at);
        }
        assert!(calls.contains(&GlCall::BindFragDataLocation(
            id,
            0,
            "out_FragColor".to_string()
        )));
    }

    #[test]
    fn test_es_skips_frag_data_location() {
        let (gl, gpu) = headless_gpu(GlConfig::gles2());
        let _program = ShaderProgram::new(&gpu, VS, FS);
        assert!(!gl
            .calls()
            .iter()
            .any(|c| matches!(c, GlCall::BindFragDataLocation(..))));
    }

    #[test]
    fn test_broken_source_leaves_program_unlinked() {
        let (gl, gpu) = headless_gpu(GlConfig::gles2());
        let program = ShaderProgram::new(&gpu, VS, BROKEN_FS);

        assert!(!program.is_linked());
        assert_eq!(program.program_id(), 0);
        assert!(program.uniforms().is_empty());
        assert_eq!(program.uniform_location("u_MVP"), UNKNOWN_UNIFORM);
        assert!(program.bind().is_ok());
        assert_eq!(gl.current_program(), 0);
    }

    #[test]
    fn test_failed_relink_keeps_previous_program() {
        let (gl, gpu) = headless_gpu(GlConfig::gles2());
        let mut program = ShaderProgram::new(&gpu, VS, FS);
        let old = program.program_id();

        let err = program.replace_sources(VS, BROKEN_FS).unwrap_err();
        assert_eq!(err.kind, GLErrorKind::Compile(ShaderStage::Fragment));

        assert_eq!(program.program_id(), old);
        assert!(gl.program_exists(old));
        assert!(!gl.calls().contains(&GlCall::DeleteProgram(old)));

        program.bind().unwrap();
        assert_eq!(gl.current_program(), old);
        program.set_uniform_float("u_Alpha", 0.5).unwrap();
        assert_eq!(gl.uniform_floats(old, "u_Alpha"), Some(vec![0.5]));
    }

    #[test]
    fn test_successful_relink_replaces_program() {
        let (gl, gpu) = headless_gpu(GlConfig::desktop());
        let mut program = ShaderProgram::new(&gpu, VS, FS);
        let old = program.program_id();

        program.relink().unwrap();
        let new = program.program_id();
        assert_ne!(new, old);
        assert!(!gl.program_exists(old));
        assert!(gl.program_exists(new));
        assert_eq!(gl.uniform_int(new, "Texture1"), Some(1));
    }

    #[test]
    fn test_uniform_query_error_keeps_previous_program() {
        let (gl, gpu) = headless_gpu(GlConfig::gles2());
        let mut program = ShaderProgram::new(&gpu, VS, FS);
        let old = program.program_id();
        let old_uniforms = program.uniforms().to_vec();

        gl.fail_at("glGetActiveUniform", gl::INVALID_VALUE);
        let err = program.relink().unwrap_err();
        assert_eq!(err.code, gl::INVALID_VALUE);

        assert_eq!(program.program_id(), old);
        assert_eq!(program.uniforms(), old_uniforms.as_slice());
        assert_eq!(gl.current_program(), old);
        // the half-built program is gone, the old one is not
        assert!(gl.program_exists(old));
        assert_eq!(
            gl.calls()
                .iter()
                .filter(|c| matches!(c, GlCall::DeleteProgram(_)))
                .count(),
            1
        );
    }

    #[test]
    fn test_sampler_error_after_adoption_is_not_a_failed_relink() {
        let (gl, gpu) = headless_gpu(GlConfig::gles2());
        let mut program = ShaderProgram::new(&gpu, VS, FS);
        let old = program.program_id();

        gl.fail_at("glUniform1i", gl::INVALID_OPERATION);
        program.relink().unwrap();

        let new = program.program_id();
        assert_ne!(new, old);
        assert!(!gl.program_exists(old));
        assert_eq!(program.uniforms().len(), 5);
        assert_ne!(program.uniform_location("u_Alpha"), UNKNOWN_UNIFORM);
    }

    #[test]
    fn test_pending_error_does_not_leak_shader() {
        let (gl, gpu) = headless_gpu(GlConfig::gles2());
        gl.fail_at("glCreateShader", gl::OUT_OF_MEMORY);
        let program = ShaderProgram::new(&gpu, VS, FS);
        assert!(!program.is_linked());

        let vertex = gl
            .calls()
            .iter()
            .find_map(|c| match c {
                GlCall::CreateShader(kind, id) if *kind == gl::VERTEX_SHADER => Some(*id),
                _ => None,
            })
            .unwrap();
        assert!(!gl.shader_exists(vertex));
        assert!(gl.calls().contains(&GlCall::DeleteShader(vertex)));
    }

    #[test]
    fn test_failed_stage_keeps_old_shader_object() {
        let (gl, gpu) = headless_gpu(GlConfig::gles2());
        let mut program = ShaderProgram::new(&gpu, VS, FS);
        let old_fragment = program.fragment_shader.as_ref().map(Shader::borrow).unwrap();

        assert!(program.replace_sources(VS, BROKEN_FS).is_err());
        assert_eq!(
            program.fragment_shader.as_ref().map(Shader::borrow),
            Some(old_fragment)
        );
        assert!(gl.shader_exists(old_fragment));
    }

    #[test]
    fn test_unknown_uniform_is_a_no_op() {
        let (gl, gpu) = headless_gpu(GlConfig::gles2());
        let program = ShaderProgram::new(&gpu, VS, FS);
        program.bind().unwrap();
        gl.clear_calls();

        assert_eq!(program.uniform_location("u_DoesNotExist"), UNKNOWN_UNIFORM);
        program.set_uniform_float("u_DoesNotExist", 3.0).unwrap();
        program
            .set_uniform_mat4_array("u_DoesNotExist", &[Matrix4x4f::identity()])
            .unwrap();

        assert!(gl.calls().is_empty());
        assert_eq!(gl.uniform_floats(program.program_id(), "u_Alpha"), None);
    }

    #[test]
    fn test_array_uniforms_upload_flattened() {
        let (gl, gpu) = headless_gpu(GlConfig::gles2());
        let program = ShaderProgram::new(&gpu, VS, FS);
        program.bind().unwrap();

        let lights = [Vector3f::new(1.0, 0.0, 0.0), Vector3f::new(0.0, 1.0, 0.0)];
        program.set_uniform_vec3_array("u_Lights", &lights).unwrap();
        program
            .set_uniform_mat4_array("u_MVP", &[Matrix4x4f::identity()])
            .unwrap();

        let id = program.program_id();
        assert_eq!(
            gl.uniform_floats(id, "u_Lights[0]"),
            Some(vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0])
        );
        assert_eq!(
            gl.uniform_floats(id, "u_MVP").map(|v| v.len()),
            Some(16)
        );
    }

    #[test]
    fn test_check_status_classifies_objects() {
        let (gl, gpu) = headless_gpu(GlConfig::gles2());
        let program = ShaderProgram::new(&gpu, VS, FS);

        let report = check_status(&*gl, program.program_id(), gl::LINK_STATUS);
        assert_eq!(report.kind, ObjectKind::Program);
        assert!(report.success);

        let shader = program.vertex_shader.as_ref().map(Shader::borrow).unwrap();
        let report = check_status(&*gl, shader, gl::COMPILE_STATUS);
        assert_eq!(report.kind, ObjectKind::Shader);
        assert!(report.success);

        let report = check_status(&*gl, 9999, gl::LINK_STATUS);
        assert_eq!(report.kind, ObjectKind::Unknown);
        assert!(!report.success);
    }

    #[test]
    fn test_drop_releases_everything() {
        let (gl, gpu) = headless_gpu(GlConfig::gles2());
        {
            let mut program = ShaderProgram::new(&gpu, VS, FS);
            let _ = program.replace_sources(VS, BROKEN_FS);
        }
        assert_eq!(gl.live_objects(), 0);
    }
}
