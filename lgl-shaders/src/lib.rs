use lgl_thin::errors::GLErrorWrapper;
use lgl_thin::gl_fancy::GPUState;
use lgl_thin::shader_program::ShaderProgram;

pub mod flat_color_shader;
pub mod phong_shader;
pub mod textured_shader;

/// The stock shaders are fixed text, so a link failure here is a driver problem
/// and worth reporting instead of drawing nothing.
fn compile_stock(
    gpu: &GPUState,
    name: &str,
    vertex_source: &str,
    fragment_source: &str,
) -> Result<ShaderProgram, GLErrorWrapper> {
    let program = ShaderProgram::new(gpu, vertex_source, fragment_source);
    if program.is_linked() {
        log::debug!("{} is program {}", name, program.program_id());
        Ok(program)
    } else {
        Err(GLErrorWrapper::link_failed(format!("{} did not link", name)))
    }
}
