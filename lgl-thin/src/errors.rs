use gl::types::GLenum;
use lgl_geometry::BitmapFormat;
use std::fmt::{Debug, Display, Formatter};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn gl_enum(&self) -> GLenum {
        match self {
            ShaderStage::Vertex => gl::VERTEX_SHADER,
            ShaderStage::Fragment => gl::FRAGMENT_SHADER,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum GLErrorKind {
    /// something glGetError reported
    Driver,
    Compile(ShaderStage),
    Link,
    UnsupportedFormat,
}

#[derive(Clone)]
pub enum MessageForError {
    None,
    Str(String),
}

#[derive(Clone)]
pub struct GLErrorWrapper {
    pub kind: GLErrorKind,
    pub code: GLenum,
    pub message: MessageForError,
}

impl GLErrorWrapper {
    pub fn new(code: GLenum) -> Self {
        Self {
            kind: GLErrorKind::Driver,
            code,
            message: MessageForError::None,
        }
    }

    pub fn compile_failed(stage: ShaderStage, log: String) -> Self {
        Self {
            kind: GLErrorKind::Compile(stage),
            code: 0,
            message: MessageForError::Str(log),
        }
    }

    pub fn link_failed(log: String) -> Self {
        Self {
            kind: GLErrorKind::Link,
            code: 0,
            message: MessageForError::Str(log),
        }
    }

    pub fn unsupported_format(format: BitmapFormat) -> Self {
        Self {
            kind: GLErrorKind::UnsupportedFormat,
            code: 0,
            message: MessageForError::Str(format!("no texture format for {:?}", format)),
        }
    }
}

impl Debug for GLErrorWrapper {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            GLErrorKind::Driver => {}
            GLErrorKind::Compile(stage) => write!(f, "{:?} shader wasn't compiled: ", stage)?,
            GLErrorKind::Link => f.write_str("program wasn't linked: ")?,
            GLErrorKind::UnsupportedFormat => f.write_str("unsupported format: ")?,
        }
        match &self.message {
            MessageForError::Str(msg) => write!(f, "{:?}", msg),
            MessageForError::None => write!(f, "0x{:x}", self.code),
        }
    }
}

impl Display for GLErrorWrapper {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        <Self as Debug>::fmt(self, f)
    }
}

impl std::error::Error for GLErrorWrapper {}
