//! the GL side applications call into.

use crate::error::ErrorState;
use crate::gl::*;
use crate::helper::CommandBufferHelper;
use crate::resources::ClientIds;

/// bucket strings are sent through, emptied again after every use.
pub const STRING_BUCKET_ID: u32 = 1;

/// encodes GL calls as commands.
///
/// ids are allocated here, so gen and create functions return without waiting for the service.
/// arguments the service could never accept are rejected here and never sent.
#[derive(Debug, Default)]
pub struct Gles2Implementation {
    pub helper: CommandBufferHelper,
    pub ids: ClientIds,
    error_state: ErrorState,
}

impl Gles2Implementation {
    pub fn new() -> Self {
        Self::default()
    }

    fn set_gl_error(&mut self, code: GLenum, function: &str, msg: &str) {
        log::debug!("{function}: {msg} ({code:#06x})");
        self.error_state.set(code);
    }

    /// errors raised on this side only. errors of the service are queried with a command.
    pub fn get_error(&mut self) -> GLenum {
        self.error_state.take()
    }
}

include!(concat!(env!("OUT_DIR"), "/client_impl_generated.rs"));

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context_state::Features;
    use crate::decoder::Decoder;
    use crate::driver::RecordingDriver;

    #[test]
    fn test_constant_enum() {
        let mut gl = Gles2Implementation::new();
        gl.renderbuffer_storage(FRAMEBUFFER, RGBA, 1, 1);
        assert_eq!(gl.get_error(), INVALID_ENUM);
        assert!(gl.helper.is_empty());

        gl.renderbuffer_storage(RENDERBUFFER, RGBA, 1, 1);
        assert_eq!(gl.get_error(), NO_ERROR);
        assert!(!gl.helper.is_empty());
    }

    #[test]
    fn test_negative_size() {
        let mut gl = Gles2Implementation::new();
        let mut textures = [0; 2];
        gl.gen_textures(-1, &mut textures);
        assert_eq!(gl.get_error(), INVALID_VALUE);
        assert!(gl.helper.is_empty());
    }

    #[test]
    fn test_gen_and_delete() {
        let mut gl = Gles2Implementation::new();
        let mut textures = [0; 2];
        gl.gen_textures(2, &mut textures);
        assert_eq!(textures, [1, 2]);
        gl.delete_textures(1, &textures[..1]);
        assert!(!gl.ids.textures.in_use(1));
        let mut texture = [0; 1];
        gl.gen_textures(1, &mut texture);
        assert_eq!(texture, [1]);
    }

    #[test]
    fn test_decoded_by_service() {
        let mut gl = Gles2Implementation::new();
        let mut textures = [0; 1];
        gl.gen_textures(1, &mut textures);
        gl.bind_texture(TEXTURE_2D, textures[0]);
        let shader = gl.create_shader(VERTEX_SHADER);
        let source = "void main() {}";
        gl.shader_source(shader, source);

        let mut decoder = Decoder::new(RecordingDriver::default(), Features::default(), false);
        decoder.driver.queue_result("create_shader", 7);
        assert_eq!(decoder.execute(&gl.helper.take()), Ok(7));
        assert_eq!(
            decoder.driver.take_calls(),
            [
                "gen_textures(1, out[1])".to_string(),
                format!("bind_texture({TEXTURE_2D}, 1001)"),
                format!("create_shader({VERTEX_SHADER})"),
                format!("shader_source(7, {source:?})"),
            ]
        );
        assert_eq!(decoder.resources.textures.get(textures[0]), Some(1001));
        assert_eq!(decoder.resources.shaders.get(shader), Some(7));
        assert_eq!(decoder.buckets.get(STRING_BUCKET_ID), Some(&[][..]));
        assert_eq!(decoder.error_state.take(), NO_ERROR);
    }
}
