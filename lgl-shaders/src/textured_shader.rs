use lgl_geometry::Matrix4x4f;
use lgl_thin::errors::GLErrorWrapper;
use lgl_thin::gl_fancy::GPUState;
use lgl_thin::shader_program::ShaderProgram;
use lgl_thin::texture::Texture;
use lgl_thin::vertex_array::VertexArray;

/// Unlit, samples `Texture0` with the mesh's texture coordinates.
pub struct TexturedShader {
    pub program: ShaderProgram,
}

impl TexturedShader {
    pub fn new(gpu: &GPUState) -> Result<Self, GLErrorWrapper> {
        let program = crate::compile_stock(gpu, "TexturedShader", shader_v_src(), shader_f_src())?;
        Ok(Self { program })
    }

    pub fn draw(
        &self,
        mvp: &Matrix4x4f,
        texture: &Texture,
        geometry: &VertexArray,
        wireframe: bool,
    ) -> Result<(), GLErrorWrapper> {
        self.program.bind()?;
        self.program
            .set_uniform_mat4_array("u_MVP", std::slice::from_ref(mvp))?;
        texture.bind(0)?;
        geometry.draw(wireframe)
    }
}

fn shader_v_src() -> &'static str {
    "
uniform mat4 u_MVP;

in vec3 in_Vertex;
in vec2 in_TexCoord;

out vec2 TexCoord;

void main() {
    TexCoord = in_TexCoord;
    gl_Position = u_MVP * vec4(in_Vertex, 1.0);
}
"
}

fn shader_f_src() -> &'static str {
    "
uniform sampler2D Texture0;

in vec2 TexCoord;

out vec4 out_FragColor;

void main() {
    out_FragColor = texture(Texture0, TexCoord);
}
"
}

#[cfg(test)]
mod tests {
    use super::*;
    use lgl_geometry::{Bitmap, BitmapFormat, UVRectangle};
    use lgl_thin::config::GlConfig;
    use lgl_thin::headless::{headless_gpu, GlCall};

    #[test]
    fn test_draw_full_screen_quad() {
        let (gl, gpu) = headless_gpu(GlConfig::desktop());
        let shader = TexturedShader::new(&gpu).unwrap();

        let mut texture = Texture::new(&gpu);
        texture
            .load_from_bitmap(Some(&Bitmap::new(4, 4, BitmapFormat::Bgra8)))
            .unwrap();

        let mut quad = VertexArray::new(&gpu).unwrap();
        quad.set_vertex_attribs(&UVRectangle::full_screen().to_vertex_attribs())
            .unwrap();

        shader
            .draw(&Matrix4x4f::identity(), &texture, &quad, false)
            .unwrap();

        let id = shader.program.program_id();
        assert_eq!(gl.uniform_int(id, "Texture0"), Some(0));
        assert_eq!(gl.bound_texture(gl::TEXTURE0), texture.id());
        assert!(gl
            .calls()
            .contains(&GlCall::DrawArrays(gl::TRIANGLES, 0, 6)));
        assert!(quad.layout().enabled[1]);
    }
}
