use lgl_geometry::{Matrix4x4f, Vector3f};
use lgl_thin::errors::GLErrorWrapper;
use lgl_thin::gl_fancy::GPUState;
use lgl_thin::shader_program::ShaderProgram;
use lgl_thin::vertex_array::VertexArray;

/// `u_LightDir` array length in the fragment shader
pub const MAX_LIGHTS: usize = 4;

/// Diffuse lighting from up to [MAX_LIGHTS] directional lights plus a flat ambient term.
/// Base color comes from the mesh's color stream.
pub struct PhongShader {
    pub program: ShaderProgram,
}

impl PhongShader {
    pub fn new(gpu: &GPUState) -> Result<Self, GLErrorWrapper> {
        let program = crate::compile_stock(gpu, "PhongShader", shader_v_src(), shader_f_src())?;
        Ok(Self { program })
    }

    pub fn set_parameters(
        &self,
        model_view: &Matrix4x4f,
        projection: &Matrix4x4f,
        light_directions: &[Vector3f],
        ambient: f32,
    ) -> Result<(), GLErrorWrapper> {
        self.program
            .set_uniform_mat4_array("u_ModelView", std::slice::from_ref(model_view))?;
        self.program
            .set_uniform_mat4_array("u_Projection", std::slice::from_ref(projection))?;
        self.set_light_directions(light_directions)?;
        self.program.set_uniform_float("u_Ambient", ambient)
    }

    /// Directions point from the light toward the scene, in eye space.
    /// Unused slots are zeroed so they contribute nothing.
    fn set_light_directions(&self, light_directions: &[Vector3f]) -> Result<(), GLErrorWrapper> {
        if light_directions.len() > MAX_LIGHTS {
            log::warn!(
                "{} lights given, only the first {} are used",
                light_directions.len(),
                MAX_LIGHTS
            );
        }
        let mut lights = [Vector3f::default(); MAX_LIGHTS];
        for (dst, src) in lights.iter_mut().zip(light_directions) {
            *dst = src.normalized();
        }
        self.program.set_uniform_vec3_array("u_LightDir", &lights)
    }

    pub fn draw(
        &self,
        model_view: &Matrix4x4f,
        projection: &Matrix4x4f,
        light_directions: &[Vector3f],
        ambient: f32,
        geometry: &VertexArray,
        wireframe: bool,
    ) -> Result<(), GLErrorWrapper> {
        self.program.bind()?;
        self.set_parameters(model_view, projection, light_directions, ambient)?;
        geometry.draw(wireframe)
    }
}

fn shader_v_src() -> &'static str {
    "
uniform mat4 u_ModelView;
uniform mat4 u_Projection;

in vec3 in_Vertex;
in vec3 in_Normal;
in vec4 in_Color;

out vec3 Normal;
out vec4 Color;

void main() {
    Normal = (u_ModelView * vec4(in_Normal, 0.0)).xyz;
    Color = in_Color;
    gl_Position = u_Projection * u_ModelView * vec4(in_Vertex, 1.0);
}
"
}

fn shader_f_src() -> &'static str {
    "
uniform vec3 u_LightDir[4];
uniform float u_Ambient;

in vec3 Normal;
in vec4 Color;

out vec4 out_FragColor;

void main() {
    vec3 n = normalize(Normal);
    float diffuse = 0.0;
    for (int i = 0; i < 4; i++) {
        diffuse += max(dot(n, -u_LightDir[i]), 0.0);
    }
    float lit = min(u_Ambient + diffuse, 1.0);
    out_FragColor = vec4(Color.rgb * lit, Color.a);
}
"
}

#[cfg(test)]
mod tests {
    use super::*;
    use lgl_geometry::{Vector4f, VertexAttribs};
    use lgl_thin::config::GlConfig;
    use lgl_thin::headless::{headless_gpu, GlCall};

    fn lit_triangle() -> VertexAttribs {
        let mut attribs = VertexAttribs::new();
        for p in [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]] {
            attribs.push_vertex(
                Vector3f::new(p[0], p[1], 0.0),
                None,
                Some(Vector3f::new(0.0, 0.0, 1.0)),
                Some(Vector4f::new(1.0, 1.0, 1.0, 1.0)),
            );
        }
        attribs
    }

    #[test]
    fn test_draw_uploads_padded_lights() {
        let (gl, gpu) = headless_gpu(GlConfig::gles2());
        let shader = PhongShader::new(&gpu).unwrap();
        let mut geometry = VertexArray::new(&gpu).unwrap();
        geometry.set_vertex_attribs(&lit_triangle()).unwrap();

        shader
            .draw(
                &Matrix4x4f::identity(),
                &Matrix4x4f::perspective(1.0, 1.0, 0.1, 100.0),
                &[Vector3f::new(0.0, 0.0, -2.0)],
                0.2,
                &geometry,
                false,
            )
            .unwrap();

        let id = shader.program.program_id();
        let mut expected = vec![0.0; 12];
        expected[2] = -1.0;
        assert_eq!(gl.uniform_floats(id, "u_LightDir[0]"), Some(expected));
        assert_eq!(gl.uniform_floats(id, "u_Ambient"), Some(vec![0.2]));
        assert_eq!(
            gl.calls().last(),
            Some(&GlCall::DrawArrays(gl::TRIANGLES, 0, 3))
        );
        assert_eq!(geometry.layout().enabled, [true, false, true, true]);
    }

    #[test]
    fn test_extra_lights_are_dropped() {
        let (gl, gpu) = headless_gpu(GlConfig::desktop());
        let shader = PhongShader::new(&gpu).unwrap();
        shader.program.bind().unwrap();

        let lights = vec![Vector3f::new(1.0, 0.0, 0.0); MAX_LIGHTS + 2];
        shader
            .set_parameters(
                &Matrix4x4f::identity(),
                &Matrix4x4f::identity(),
                &lights,
                0.0,
            )
            .unwrap();

        let uploaded = gl
            .uniform_floats(shader.program.program_id(), "u_LightDir[0]")
            .unwrap();
        assert_eq!(uploaded.len(), MAX_LIGHTS * 3);
    }
}
