use crate::errors::GLErrorWrapper;
use crate::gl_fancy::GPUState;
use crate::gl_helper::GLBufferType;
use gl::types::{GLfloat, GLint, GLsizei, GLuint};
use itertools::izip;
use lgl_geometry::{AttribSlot, VertexAttribs, TOTAL_ATTRIBS};
use std::mem::size_of;

/// Where each [AttribSlot] lives inside the packed vertex buffer.
///
/// Streams are laid out one after another in slot order, not interleaved.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct AttribLayout {
    /// byte offset of each slot's stream; 0 for absent streams
    pub offsets: [usize; TOTAL_ATTRIBS],
    pub enabled: [bool; TOTAL_ATTRIBS],
    pub total_size: usize,
}

pub fn compute_layout(attribs: &VertexAttribs) -> AttribLayout {
    let mut rval = AttribLayout::default();
    let streams = attribs.enumerate_vertex_streams();
    for (slot, stream, offset, enabled) in izip!(
        AttribSlot::ALL.iter(),
        streams.iter(),
        rval.offsets.iter_mut(),
        rval.enabled.iter_mut()
    ) {
        // positions are always wired up, even for an empty mesh
        if stream.is_none() && *slot != AttribSlot::Vertex {
            continue;
        }
        *offset = rval.total_size;
        *enabled = true;
        rval.total_size += stream_byte_size(attribs, *slot);
    }
    rval
}

fn stream_byte_size(attribs: &VertexAttribs, slot: AttribSlot) -> usize {
    attribs.vertex_count() * slot.components() * size_of::<GLfloat>()
}

/// One vertex buffer holding every stream of a mesh, plus (when the context is
/// configured for it) a vertex array object that remembers the attribute wiring.
pub struct VertexArray {
    gpu: GPUState,
    vertex_array: GLuint,
    buffer: GLuint,
    layout: AttribLayout,
    active_vertex_count: usize,
}

impl VertexArray {
    pub fn new(gpu: &GPUState) -> Result<Self, GLErrorWrapper> {
        let vertex_array = if gpu.config().use_vertex_array_objects {
            gpu.api().gen_vertex_array()
        } else {
            0
        };
        gpu.check()?;
        Ok(Self {
            gpu: gpu.clone(),
            vertex_array,
            buffer: 0,
            layout: AttribLayout::default(),
            active_vertex_count: 0,
        })
    }

    pub fn layout(&self) -> &AttribLayout {
        &self.layout
    }

    pub fn buffer_id(&self) -> GLuint {
        self.buffer
    }

    /// 0 when the context does not use vertex array objects
    pub fn vertex_array_id(&self) -> GLuint {
        self.vertex_array
    }

    pub fn active_vertex_count(&self) -> usize {
        self.active_vertex_count
    }

    /// Replaces the buffer with a freshly allocated one sized for `attribs` and
    /// uploads every stream it provides.
    pub fn set_vertex_attribs(&mut self, attribs: &VertexAttribs) -> Result<(), GLErrorWrapper> {
        let api = self.gpu.api();
        let layout = compute_layout(attribs);

        if self.buffer != 0 {
            api.delete_buffer(self.buffer);
        }
        self.buffer = api.gen_buffer();
        api.bind_buffer(gl::ARRAY_BUFFER, self.buffer);
        api.buffer_data(gl::ARRAY_BUFFER, layout.total_size, None, gl::STATIC_DRAW);

        // buffer, offsets and vertex count always change together
        self.layout = layout;
        self.active_vertex_count = attribs.active_vertex_count();

        let streams = attribs.enumerate_vertex_streams();
        for (slot, stream, offset) in izip!(AttribSlot::ALL, streams, layout.offsets) {
            let Some(stream) = stream else {
                continue;
            };
            let bytes: &[u8] = bytemuck::cast_slice(stream);
            // a ragged stream never writes past its own range
            let n = bytes.len().min(stream_byte_size(attribs, slot));
            api.buffer_sub_data(gl::ARRAY_BUFFER, offset, &bytes[..n]);
        }
        log::debug!(
            "vertex buffer {} holds {} bytes for {} vertices",
            self.buffer,
            layout.total_size,
            attribs.vertex_count()
        );

        if self.vertex_array != 0 {
            api.bind_vertex_array(self.vertex_array);
            self.rig_attributes();
            api.bind_vertex_array(0);
        }
        self.gpu.check()
    }

    /// Makes this mesh's attribute wiring current: the cached vertex array object when
    /// there is one, otherwise the buffer with the four fixed slots pointed into it.
    pub fn bind(&self) -> Result<(), GLErrorWrapper> {
        if self.vertex_array != 0 {
            self.gpu.api().bind_vertex_array(self.vertex_array);
        } else {
            self.rig_attributes();
        }
        self.gpu.check()
    }

    fn rig_attributes(&self) {
        let api = self.gpu.api();
        api.bind_buffer(gl::ARRAY_BUFFER, self.buffer);
        for (slot, offset, enabled) in izip!(AttribSlot::ALL, self.layout.offsets, self.layout.enabled)
        {
            let index = slot.index() as GLuint;
            if enabled {
                api.vertex_attrib_pointer(
                    index,
                    slot.components() as GLint,
                    GLfloat::TYPE_CODE,
                    false,
                    0,
                    offset,
                );
                api.enable_vertex_attrib_array(index);
            } else {
                api.disable_vertex_attrib_array(index);
            }
        }
    }

    /// Draws the active vertices as triangles, or as one line loop when `wireframe`.
    pub fn draw(&self, wireframe: bool) -> Result<(), GLErrorWrapper> {
        if self.buffer == 0 {
            log::warn!("drawing a vertex array that has no vertex data");
            return Ok(());
        }

        let api = self.gpu.api();
        self.bind()?;

        let mode = if wireframe { gl::LINE_LOOP } else { gl::TRIANGLES };
        api.draw_arrays(mode, 0, self.active_vertex_count as GLsizei);

        if self.vertex_array != 0 {
            api.bind_vertex_array(0);
        }
        self.gpu.check()
    }
}

impl Drop for VertexArray {
    fn drop(&mut self) {
        let api = self.gpu.api();
        if self.buffer != 0 {
            api.delete_buffer(self.buffer);
        }
        if self.vertex_array != 0 {
            api.delete_vertex_array(self.vertex_array);
        }
    }
}
