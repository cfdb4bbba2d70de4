// column-major matrices laid out the way glUniformMatrix4fv expects them with transpose=false

use bytemuck::{Pod, Zeroable};

#[derive(Default, Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Vector2f {
    pub x: f32,
    pub y: f32,
}

impl Vector2f {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

//

#[derive(Default, Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Vector3f {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3f {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(&self, rhs: &Vector3f) -> f32 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    pub fn length(&self) -> f32 {
        self.dot(self).sqrt()
    }

    /// returns the zero vector unchanged instead of dividing by zero
    pub fn normalized(&self) -> Vector3f {
        let len = self.length();
        if len == 0.0 {
            *self
        } else {
            Vector3f::new(self.x / len, self.y / len, self.z / len)
        }
    }
}

impl std::ops::Add for Vector3f {
    type Output = Vector3f;

    fn add(self, rhs: Self) -> Self::Output {
        Vector3f {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        }
    }
}

impl std::ops::Sub for Vector3f {
    type Output = Vector3f;

    fn sub(self, rhs: Self) -> Self::Output {
        Vector3f {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
            z: self.z - rhs.z,
        }
    }
}

impl std::ops::Neg for Vector3f {
    type Output = Vector3f;

    fn neg(self) -> Self::Output {
        Vector3f {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

//

#[derive(Default, Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Vector4f {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vector4f {
    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    pub fn from_rgb(rgb: &[f32; 3]) -> Self {
        Self::new(rgb[0], rgb[1], rgb[2], 1.0)
    }
}

//

#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Matrix4x4f {
    m: [f32; 16],
}

impl Matrix4x4f {
    pub fn new(m: [f32; 16]) -> Self {
        Matrix4x4f { m }
    }

    pub fn slice(&self) -> &[f32; 16] {
        &self.m
    }

    #[rustfmt::skip]
    pub fn identity() -> Matrix4x4f {
        [
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ].into()
    }

    #[rustfmt::skip]
    pub fn translation(dx: f32, dy: f32, dz: f32) -> Matrix4x4f {
        [
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            dx, dy, dz, 1.0,
        ].into()
    }

    #[rustfmt::skip]
    pub fn scale(x: f32, y: f32, z: f32) -> Matrix4x4f {
        [
            x, 0.0, 0.0, 0.0,
            0.0, y, 0.0, 0.0,
            0.0, 0.0, z, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ].into()
    }

    /// OpenGL clip space: Y up, Z in [-1,1].
    /// A `far_z` at or below `near_z` places the far plane at infinity.
    pub fn perspective(fov_y_radians: f32, aspect: f32, near_z: f32, far_z: f32) -> Matrix4x4f {
        let tan_half = (fov_y_radians * 0.5).tan();
        let m0 = 1.0 / (aspect * tan_half);
        let m5 = 1.0 / tan_half;

        let (m10, m14) = if far_z <= near_z {
            (-1.0, -2.0 * near_z)
        } else {
            (
                -(far_z + near_z) / (far_z - near_z),
                -(2.0 * far_z * near_z) / (far_z - near_z),
            )
        };

        let mut m = [0.0; 16];
        m[0] = m0;
        m[5] = m5;
        m[10] = m10;
        m[11] = -1.0;
        m[14] = m14;
        m.into()
    }

    pub fn multiply(&self, b: &Matrix4x4f) -> Matrix4x4f {
        let a = &self.m;
        let b = &b.m;
        let mut m = [0.0; 16];
        for col in 0..4 {
            for row in 0..4 {
                m[col * 4 + row] = a[row] * b[col * 4]
                    + a[4 + row] * b[col * 4 + 1]
                    + a[8 + row] * b[col * 4 + 2]
                    + a[12 + row] * b[col * 4 + 3];
            }
        }
        m.into()
    }

    pub fn transform_point(&self, v: &Vector3f) -> Vector3f {
        let m = &self.m;
        let w = m[3] * v.x + m[7] * v.y + m[11] * v.z + m[15];
        let rcp_w = 1.0 / w;
        let x = (m[0] * v.x + m[4] * v.y + m[8] * v.z + m[12]) * rcp_w;
        let y = (m[1] * v.x + m[5] * v.y + m[9] * v.z + m[13]) * rcp_w;
        let z = (m[2] * v.x + m[6] * v.y + m[10] * v.z + m[14]) * rcp_w;
        Vector3f { x, y, z }
    }
}

impl Default for Matrix4x4f {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<[f32; 16]> for Matrix4x4f {
    fn from(value: [f32; 16]) -> Self {
        Matrix4x4f::new(value)
    }
}

impl<'a, 'b> std::ops::Mul<&'a Matrix4x4f> for &'b Matrix4x4f {
    type Output = Matrix4x4f;

    fn mul(self, rhs: &Matrix4x4f) -> Self::Output {
        self.multiply(rhs)
    }
}

impl std::ops::Mul<Matrix4x4f> for Matrix4x4f {
    type Output = Matrix4x4f;

    fn mul(self, rhs: Matrix4x4f) -> Self::Output {
        self.multiply(&rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_neutral() {
        let t = Matrix4x4f::translation(1.0, 2.0, 3.0);
        assert_eq!(t * Matrix4x4f::identity(), t);
        assert_eq!(Matrix4x4f::identity() * t, t);
    }

    #[test]
    fn test_translate_then_scale() {
        let m = Matrix4x4f::translation(1.0, 0.0, 0.0) * Matrix4x4f::scale(2.0, 2.0, 2.0);
        let p = m.transform_point(&Vector3f::new(1.0, 1.0, 1.0));
        assert_eq!(p, Vector3f::new(3.0, 2.0, 2.0));
    }

    #[test]
    fn test_vectors_cast_to_flat_floats() {
        let v = [Vector3f::new(1.0, 2.0, 3.0), Vector3f::new(4.0, 5.0, 6.0)];
        let flat: &[f32] = bytemuck::cast_slice(&v);
        assert_eq!(flat, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_normalized_zero_vector() {
        assert_eq!(Vector3f::default().normalized(), Vector3f::default());
        let n = Vector3f::new(3.0, 0.0, 4.0).normalized();
        assert!((n.length() - 1.0).abs() < 1e-6);
    }
}
