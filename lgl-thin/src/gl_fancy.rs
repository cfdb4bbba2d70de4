use crate::config::GlConfig;
use crate::errors::GLErrorWrapper;
use crate::gl_helper::{explode_if_gl_error, GlApi, NativeGl};
use std::rc::Rc;

/// The graphics context every wrapper is built against.
///
/// Cloning is cheap and shares the same [GlApi]. The `Rc` keeps wrappers on the thread
/// that owns the GL context, which is the only thread allowed to talk to it anyway.
#[derive(Clone)]
pub struct GPUState {
    api: Rc<dyn GlApi>,
    config: GlConfig,
}

impl GPUState {
    pub fn new(api: Rc<dyn GlApi>, config: GlConfig) -> Self {
        Self { api, config }
    }

    /// Assumes the GL function pointers are already loaded and a context is current.
    pub fn native(config: GlConfig) -> Self {
        Self::new(Rc::new(NativeGl), config)
    }

    /// Like [GPUState::native] but asks the driver which profile it speaks.
    pub fn native_detected() -> Self {
        let api = NativeGl;
        let config = match api.get_string(gl::VERSION) {
            Some(version) => {
                log::info!("GL_VERSION {}", version);
                GlConfig::from_version_string(&version)
            }
            None => {
                log::warn!("GL_VERSION unavailable, assuming defaults");
                GlConfig::default()
            }
        };
        Self::new(Rc::new(api), config)
    }

    pub fn api(&self) -> &dyn GlApi {
        self.api.as_ref()
    }

    pub fn config(&self) -> &GlConfig {
        &self.config
    }

    pub fn check(&self) -> Result<(), GLErrorWrapper> {
        explode_if_gl_error(self.api())
    }
}
