use lgl_geometry::{Matrix4x4f, Vector4f};
use lgl_thin::errors::GLErrorWrapper;
use lgl_thin::gl_fancy::GPUState;
use lgl_thin::shader_program::ShaderProgram;
use lgl_thin::vertex_array::VertexArray;

pub struct FlatColorShader {
    pub program: ShaderProgram,
}

impl FlatColorShader {
    pub fn new(gpu: &GPUState) -> Result<Self, GLErrorWrapper> {
        const VERTEX_SHADER: &str = "
uniform mat4 u_MVP;

in vec3 in_Vertex;

void main() {
    gl_Position = u_MVP * vec4(in_Vertex, 1.0);
}
            ";
        const FRAGMENT_SHADER: &str = "
uniform vec4 u_Color;

out vec4 out_FragColor;

void main() {
    out_FragColor = u_Color;
}
            ";
        let program =
            crate::compile_stock(gpu, "FlatColorShader", VERTEX_SHADER, FRAGMENT_SHADER)?;
        Ok(Self { program })
    }

    pub fn set_params(&self, mvp: &Matrix4x4f, color: &Vector4f) -> Result<(), GLErrorWrapper> {
        self.program
            .set_uniform_mat4_array("u_MVP", std::slice::from_ref(mvp))?;
        self.program
            .set_uniform_vec4_array("u_Color", std::slice::from_ref(color))
    }

    pub fn draw(
        &self,
        mvp: &Matrix4x4f,
        color: &Vector4f,
        geometry: &VertexArray,
        wireframe: bool,
    ) -> Result<(), GLErrorWrapper> {
        self.program.bind()?;
        self.set_params(mvp, color)?;
        geometry.draw(wireframe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lgl_geometry::{Vector3f, VertexAttribs};
    use lgl_thin::config::GlConfig;
    use lgl_thin::headless::{headless_gpu, GlCall};

    #[test]
    fn test_links_on_both_profiles() {
        for config in [GlConfig::gles2(), GlConfig::desktop()] {
            let (_gl, gpu) = headless_gpu(config);
            let shader = FlatColorShader::new(&gpu).unwrap();
            assert!(shader.program.uniform_location("u_MVP") >= 0);
            assert!(shader.program.uniform_location("u_Color") >= 0);
        }
    }

    #[test]
    fn test_draw_sets_color() {
        let (gl, gpu) = headless_gpu(GlConfig::gles2());
        let shader = FlatColorShader::new(&gpu).unwrap();
        let mut geometry = VertexArray::new(&gpu).unwrap();
        geometry
            .set_vertex_attribs(&VertexAttribs::from_positions(vec![
                Vector3f::new(0.0, 0.0, 0.0),
                Vector3f::new(1.0, 0.0, 0.0),
                Vector3f::new(0.0, 1.0, 0.0),
            ]))
            .unwrap();

        let color = Vector4f::new(0.25, 0.5, 0.75, 1.0);
        shader
            .draw(&Matrix4x4f::identity(), &color, &geometry, true)
            .unwrap();

        let id = shader.program.program_id();
        assert_eq!(gl.current_program(), id);
        assert_eq!(
            gl.uniform_floats(id, "u_Color"),
            Some(vec![0.25, 0.5, 0.75, 1.0])
        );
        assert_eq!(
            gl.uniform_floats(id, "u_MVP"),
            Some(Matrix4x4f::identity().slice().to_vec())
        );
        assert_eq!(
            gl.calls().last(),
            Some(&GlCall::DrawArrays(gl::LINE_LOOP, 0, 3))
        );
    }
}
