use crate::errors::GeometryError;
use crate::linear::{Vector2f, Vector3f, Vector4f};
use itertools::izip;

/// The fixed attribute slots every engine shader agrees on.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AttribSlot {
    Vertex = 0,
    TexCoord = 1,
    Normal = 2,
    Color = 3,
}

pub const TOTAL_ATTRIBS: usize = 4;

impl AttribSlot {
    pub const ALL: [AttribSlot; TOTAL_ATTRIBS] = [
        AttribSlot::Vertex,
        AttribSlot::TexCoord,
        AttribSlot::Normal,
        AttribSlot::Color,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    /// floats per vertex in this stream
    pub fn components(&self) -> usize {
        match self {
            AttribSlot::Vertex => 3,
            AttribSlot::TexCoord => 2,
            AttribSlot::Normal => 3,
            AttribSlot::Color => 4,
        }
    }

    /// name of the vertex shader input bound to this slot
    pub fn attribute_name(&self) -> &'static str {
        match self {
            AttribSlot::Vertex => "in_Vertex",
            AttribSlot::TexCoord => "in_TexCoord",
            AttribSlot::Normal => "in_Normal",
            AttribSlot::Color => "in_Color",
        }
    }
}

//

/// Per-vertex streams for one mesh. Only `vertices` is mandatory;
/// an empty optional stream means the mesh does not provide it.
#[derive(Clone, Debug, Default)]
pub struct VertexAttribs {
    pub vertices: Vec<Vector3f>,
    pub tex_coords: Vec<Vector2f>,
    pub normals: Vec<Vector3f>,
    pub colors: Vec<Vector4f>,
    active_vertex_count: usize,
}

impl VertexAttribs {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn from_positions(vertices: Vec<Vector3f>) -> Self {
        let active_vertex_count = vertices.len();
        Self {
            vertices,
            active_vertex_count,
            ..Default::default()
        }
    }

    pub fn with_tex_coords(mut self, tex_coords: Vec<Vector2f>) -> Result<Self, GeometryError> {
        self.check_stream_len("tex_coords", tex_coords.len())?;
        self.tex_coords = tex_coords;
        Ok(self)
    }

    pub fn with_normals(mut self, normals: Vec<Vector3f>) -> Result<Self, GeometryError> {
        self.check_stream_len("normals", normals.len())?;
        self.normals = normals;
        Ok(self)
    }

    pub fn with_colors(mut self, colors: Vec<Vector4f>) -> Result<Self, GeometryError> {
        self.check_stream_len("colors", colors.len())?;
        self.colors = colors;
        Ok(self)
    }

    fn check_stream_len(&self, name: &str, len: usize) -> Result<(), GeometryError> {
        if len != 0 && len != self.vertices.len() {
            return Err(GeometryError::simple(format!(
                "{} has {} entries but there are {} vertices",
                name,
                len,
                self.vertices.len()
            )));
        }
        Ok(())
    }

    /// Appends a full vertex. Optional streams are only extended when given,
    /// so mixing `Some` and `None` across calls produces a ragged mesh.
    pub fn push_vertex(
        &mut self,
        position: Vector3f,
        tex_coord: Option<Vector2f>,
        normal: Option<Vector3f>,
        color: Option<Vector4f>,
    ) {
        self.vertices.push(position);
        if let Some(uv) = tex_coord {
            self.tex_coords.push(uv);
        }
        if let Some(n) = normal {
            self.normals.push(n);
        }
        if let Some(c) = color {
            self.colors.push(c);
        }
        self.active_vertex_count = self.vertices.len();
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// how many vertices a draw call should consume, never more than `vertex_count()`
    pub fn active_vertex_count(&self) -> usize {
        self.active_vertex_count.min(self.vertices.len())
    }

    pub fn set_active_vertex_count(&mut self, count: usize) {
        self.active_vertex_count = count.min(self.vertices.len());
    }

    /// One entry per [AttribSlot], in slot order, `None` for streams this mesh does not provide.
    pub fn enumerate_vertex_streams(&self) -> [Option<&[f32]>; TOTAL_ATTRIBS] {
        let streams: [&[f32]; TOTAL_ATTRIBS] = [
            bytemuck::cast_slice(&self.vertices),
            bytemuck::cast_slice(&self.tex_coords),
            bytemuck::cast_slice(&self.normals),
            bytemuck::cast_slice(&self.colors),
        ];
        streams.map(|s| if s.is_empty() { None } else { Some(s) })
    }
}

//

pub struct UVRectangle {
    pub x1: f32,
    pub x2: f32,
    pub y1: f32,
    pub y2: f32,
    pub u1: f32,
    pub u2: f32,
    pub v1: f32,
    pub v2: f32,
}

impl UVRectangle {
    /// the unit quad in the XY plane covering the whole texture
    pub fn full_screen() -> Self {
        Self {
            x1: -1.0,
            x2: 1.0,
            y1: -1.0,
            y2: 1.0,
            u1: 0.0,
            u2: 1.0,
            v1: 0.0,
            v2: 1.0,
        }
    }

    /// Two counter-clockwise triangles facing +Z.
    pub fn to_vertex_attribs(&self) -> VertexAttribs {
        let corners = [
            (self.x1, self.y1, self.u1, self.v1),
            (self.x2, self.y1, self.u2, self.v1),
            (self.x2, self.y2, self.u2, self.v2),
            (self.x1, self.y1, self.u1, self.v1),
            (self.x2, self.y2, self.u2, self.v2),
            (self.x1, self.y2, self.u1, self.v2),
        ];

        let mut rval = VertexAttribs::new();
        for (x, y, u, v) in corners {
            rval.push_vertex(
                Vector3f::new(x, y, 0.0),
                Some(Vector2f::new(u, v)),
                Some(Vector3f::new(0.0, 0.0, 1.0)),
                None,
            );
        }
        rval
    }
}

/// Sums the byte size of every stream this mesh provides, `vertex_count * components * 4` each.
pub fn packed_byte_size(attribs: &VertexAttribs) -> usize {
    let streams = attribs.enumerate_vertex_streams();
    izip!(AttribSlot::ALL.iter(), streams.iter())
        .filter(|(_, stream)| stream.is_some())
        .map(|(slot, _)| attribs.vertex_count() * slot.components() * std::mem::size_of::<f32>())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_only_streams() {
        let attribs = VertexAttribs::from_positions(vec![Vector3f::default(); 3]);
        let streams = attribs.enumerate_vertex_streams();
        assert_eq!(streams[0].map(|s| s.len()), Some(9));
        assert!(streams[1].is_none());
        assert!(streams[2].is_none());
        assert!(streams[3].is_none());
    }

    #[test]
    fn test_quad_has_uv_and_normals() {
        let quad = UVRectangle::full_screen().to_vertex_attribs();
        assert_eq!(quad.vertex_count(), 6);
        assert_eq!(quad.active_vertex_count(), 6);
        let streams = quad.enumerate_vertex_streams();
        assert_eq!(streams[AttribSlot::TexCoord.index()].map(|s| s.len()), Some(12));
        assert_eq!(streams[AttribSlot::Normal.index()].map(|s| s.len()), Some(18));
        assert!(streams[AttribSlot::Color.index()].is_none());
    }

    #[test]
    fn test_ragged_stream_rejected() {
        let attribs = VertexAttribs::from_positions(vec![Vector3f::default(); 3]);
        assert!(attribs
            .clone()
            .with_tex_coords(vec![Vector2f::default(); 2])
            .is_err());
        assert!(attribs.with_tex_coords(vec![Vector2f::default(); 3]).is_ok());
    }

    #[test]
    fn test_active_count_is_clamped() {
        let mut attribs = VertexAttribs::from_positions(vec![Vector3f::default(); 4]);
        attribs.set_active_vertex_count(2);
        assert_eq!(attribs.active_vertex_count(), 2);
        attribs.set_active_vertex_count(40);
        assert_eq!(attribs.active_vertex_count(), 4);
    }

    #[test]
    fn test_packed_byte_size() {
        let quad = UVRectangle::full_screen().to_vertex_attribs();
        assert_eq!(packed_byte_size(&quad), 6 * (3 + 2 + 3) * 4);
    }
}
