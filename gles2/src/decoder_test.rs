//! decoder tests. most of them are generated, the ones here cover what the generated ones can
//! not express.

use crate::context_state::Features;
use crate::decoder::Decoder;
use crate::driver::RecordingDriver;
use crate::error::Error;
use crate::gl::*;
use crate::helper::CommandBufferHelper;

const CLIENT_BUFFER_ID: GLuint = 101;
const CLIENT_FRAMEBUFFER_ID: GLuint = 102;
const CLIENT_PROGRAM_ID: GLuint = 103;
const CLIENT_RENDERBUFFER_ID: GLuint = 104;
const CLIENT_SHADER_ID: GLuint = 105;
const CLIENT_TEXTURE_ID: GLuint = 106;

const SERVICE_BUFFER_ID: GLuint = 201;
const SERVICE_FRAMEBUFFER_ID: GLuint = 202;
const SERVICE_PROGRAM_ID: GLuint = 203;
const SERVICE_RENDERBUFFER_ID: GLuint = 204;
const SERVICE_SHADER_ID: GLuint = 205;
const SERVICE_TEXTURE_ID: GLuint = 206;

const INVALID_CLIENT_ID: GLuint = 999;
const NEW_CLIENT_ID: GLuint = 501;
const NEW_SERVICE_ID: u32 = 502;

const SHM_ID: u32 = 7;
const SHM_OFFSET: u32 = 0;
const SHM_SIZE: usize = 4096;
const BUCKET_ID: u32 = 3;

/// a decoder with one resource of every kind and a registered shared memory segment.
struct DecoderTest {
    helper: CommandBufferHelper,
    decoder: Decoder<RecordingDriver>,
}

impl DecoderTest {
    fn new() -> Self {
        Self::with_options(Features::default(), true)
    }

    fn with_features(features: Features) -> Self {
        Self::with_options(features, true)
    }

    fn with_options(features: Features, bind_generates_resource: bool) -> Self {
        let mut decoder = Decoder::new(RecordingDriver::default(), features, bind_generates_resource);
        decoder.shared_memory.register(SHM_ID, SHM_SIZE);
        let resources = &mut decoder.resources;
        resources.buffers.insert(CLIENT_BUFFER_ID, SERVICE_BUFFER_ID);
        resources.framebuffers.insert(CLIENT_FRAMEBUFFER_ID, SERVICE_FRAMEBUFFER_ID);
        resources.programs.insert(CLIENT_PROGRAM_ID, SERVICE_PROGRAM_ID);
        resources.renderbuffers.insert(CLIENT_RENDERBUFFER_ID, SERVICE_RENDERBUFFER_ID);
        resources.shaders.insert(CLIENT_SHADER_ID, SERVICE_SHADER_ID);
        resources.textures.insert(CLIENT_TEXTURE_ID, SERVICE_TEXTURE_ID);
        Self {
            helper: CommandBufferHelper::default(),
            decoder,
        }
    }

    /// runs everything the helper holds.
    fn execute(&mut self) -> Result<usize, Error> {
        let data = self.helper.take();
        self.decoder.execute(&data)
    }

    fn gl_error(&mut self) -> GLenum {
        self.decoder.error_state.take()
    }

    fn take_calls(&mut self) -> Vec<String> {
        self.decoder.driver.take_calls()
    }

    fn queue_result(&mut self, name: &'static str, value: u32) {
        self.decoder.driver.queue_result(name, value);
    }

    /// the `index`th word of the shared memory.
    fn read_shm(&self, index: u32) -> u32 {
        let values = self
            .decoder
            .shared_memory
            .get_array::<u32>(SHM_ID, SHM_OFFSET + index * 4, 1)
            .unwrap();
        values[0]
    }

    fn write_shm(&mut self, index: u32, value: u32) {
        assert!(
            self.decoder
                .shared_memory
                .write_result(SHM_ID, SHM_OFFSET + index * 4, value)
        );
    }
}

include!(concat!(env!("OUT_DIR"), "/decoder_test_generated.rs"));

#[test]
fn test_depth_mask_reaches_driver_before_clear() {
    let mut t = DecoderTest::new();
    t.helper.depth_mask(FALSE);
    t.helper.clear(COLOR_BUFFER_BIT);
    t.helper.clear(COLOR_BUFFER_BIT);
    assert_eq!(t.execute(), Ok(3));
    assert_eq!(t.gl_error(), NO_ERROR);
    assert_eq!(
        t.take_calls(),
        [
            format!("depth_mask({:?})", FALSE),
            format!("clear({:?})", COLOR_BUFFER_BIT),
            format!("clear({:?})", COLOR_BUFFER_BIT),
        ]
    );
}

#[test]
fn test_enable_is_not_repeated() {
    let mut t = DecoderTest::new();
    t.helper.enable(DEPTH_TEST);
    t.helper.enable(DEPTH_TEST);
    t.helper.is_enabled(DEPTH_TEST, SHM_ID, SHM_OFFSET);
    assert_eq!(t.execute(), Ok(3));
    assert_eq!(t.take_calls(), [format!("enable({:?})", DEPTH_TEST)]);
    assert_eq!(t.read_shm(0), TRUE as u32);

    t.helper.disable(DEPTH_TEST);
    assert_eq!(t.execute(), Ok(1));
    assert_eq!(t.take_calls(), [format!("disable({:?})", DEPTH_TEST)]);
}

#[test]
fn test_tex_parameteriv_is_tex_parameteri() {
    let mut t = DecoderTest::new();
    t.helper
        .tex_parameteri(TEXTURE_2D, TEXTURE_MIN_FILTER, NEAREST as GLint);
    assert_eq!(t.execute(), Ok(1));
    let scalar = t.take_calls();

    t.helper
        .tex_parameteriv_immediate(TEXTURE_2D, TEXTURE_MIN_FILTER, &[NEAREST as GLint]);
    assert_eq!(t.execute(), Ok(1));
    assert_eq!(t.gl_error(), NO_ERROR);
    assert_eq!(t.take_calls(), scalar);
    assert_eq!(
        scalar,
        [format!(
            "tex_parameteri({:?}, {:?}, {:?})",
            TEXTURE_2D, TEXTURE_MIN_FILTER, NEAREST as GLint
        )]
    );
}

#[test]
fn test_gen_then_delete_leaves_nothing() {
    let ids = [NEW_CLIENT_ID, NEW_CLIENT_ID + 1];
    let mut t = DecoderTest::new();
    t.helper.gen_textures_immediate(2, &ids);
    t.helper.delete_textures_immediate(2, &ids);
    assert_eq!(t.execute(), Ok(2));
    assert_eq!(t.gl_error(), NO_ERROR);
    let first = RecordingDriver::FIRST_SERVICE_ID + 1;
    assert_eq!(
        t.take_calls(),
        [
            "gen_textures(2, out[2])".to_string(),
            format!("delete_textures(2, [{}, {}])", first, first + 1),
        ]
    );
    assert_eq!(t.decoder.resources.textures.get(ids[0]), None);
    assert_eq!(t.decoder.resources.textures.get(ids[1]), None);
    // only the texture the fixture starts with is left.
    assert_eq!(t.decoder.resources.textures.len(), 1);

    t.helper.delete_textures_immediate(2, &ids);
    assert_eq!(t.execute(), Ok(1));
    assert_eq!(t.gl_error(), NO_ERROR);
    assert!(t.take_calls().is_empty());
}

#[test]
fn test_gen_rejects_zero_and_repeated_ids() {
    let mut t = DecoderTest::new();
    t.helper.gen_textures_immediate(2, &[NEW_CLIENT_ID, NEW_CLIENT_ID]);
    assert_eq!(t.execute(), Err(Error::InvalidArguments));
    assert!(t.take_calls().is_empty());
    assert_eq!(t.decoder.resources.textures.get(NEW_CLIENT_ID), None);

    t.helper.gen_textures_immediate(1, &[0]);
    assert_eq!(t.execute(), Err(Error::InvalidArguments));
    assert!(t.take_calls().is_empty());
    assert_eq!(t.decoder.resources.textures.get(0), None);
}

#[test]
fn test_uniform_count_is_clamped() {
    let mut t = DecoderTest::new();
    t.decoder.register_uniform(SERVICE_PROGRAM_ID, 2, 3);
    t.helper.use_program(CLIENT_PROGRAM_ID);
    t.helper.uniform_1fv_immediate(2, 5, &[1.0, 2.0, 3.0, 4.0, 5.0]);
    assert_eq!(t.execute(), Ok(2));
    assert_eq!(t.gl_error(), NO_ERROR);
    assert_eq!(
        t.take_calls(),
        [
            format!("use_program({SERVICE_PROGRAM_ID})"),
            "uniform_1fv(2, 3, [1.0, 2.0, 3.0])".to_string(),
        ]
    );
}

#[test]
fn test_uniform_location() {
    let mut t = DecoderTest::new();
    t.helper.uniform_1f(2, 1.0);
    assert_eq!(t.execute(), Ok(1));
    assert_eq!(t.gl_error(), INVALID_OPERATION);

    t.helper.use_program(CLIENT_PROGRAM_ID);
    t.helper.uniform_1f(-1, 1.0);
    assert_eq!(t.execute(), Ok(2));
    assert_eq!(t.gl_error(), NO_ERROR);

    t.helper.uniform_4f(7, 1.0, 2.0, 3.0, 4.0);
    assert_eq!(t.execute(), Ok(1));
    assert_eq!(t.gl_error(), INVALID_OPERATION);
    assert_eq!(t.take_calls(), [format!("use_program({SERVICE_PROGRAM_ID})")]);
}

#[test]
fn test_bind_attrib_location_bucket() {
    let mut t = DecoderTest::new();
    t.helper.set_bucket_as_string(BUCKET_ID, "a_position");
    t.helper.bind_attrib_location_bucket(CLIENT_PROGRAM_ID, 0, BUCKET_ID);
    assert_eq!(t.execute(), Ok(3));
    assert_eq!(
        t.take_calls(),
        [format!("bind_attrib_location({SERVICE_PROGRAM_ID}, 0, {:?})", "a_position")]
    );

    t.helper.set_bucket_as_string(BUCKET_ID, "gl_Position");
    t.helper.bind_attrib_location_bucket(CLIENT_PROGRAM_ID, 0, BUCKET_ID);
    assert_eq!(t.execute(), Ok(3));
    assert_eq!(t.gl_error(), INVALID_OPERATION);
    assert!(t.take_calls().is_empty());

    t.helper.bind_attrib_location_bucket(CLIENT_PROGRAM_ID, 0, BUCKET_ID + 1);
    assert_eq!(t.execute(), Err(Error::InvalidArguments));
}

#[test]
fn test_bucket_data_from_shared_memory() {
    let mut t = DecoderTest::new();
    assert!(t.decoder.shared_memory.write_bytes(SHM_ID, 16, b"abcd"));
    t.helper.set_bucket_size(BUCKET_ID, 4);
    t.helper.set_bucket_data(BUCKET_ID, 0, 4, SHM_ID, 16);
    assert_eq!(t.execute(), Ok(2));
    assert_eq!(t.decoder.buckets.get(BUCKET_ID), Some(&b"abcd"[..]));

    t.helper.set_bucket_data(BUCKET_ID, 2, 4, SHM_ID, 16);
    assert_eq!(t.execute(), Err(Error::InvalidArguments));
    t.helper.set_bucket_data(BUCKET_ID, 0, 4, SHM_ID, SHM_SIZE as u32);
    assert_eq!(t.execute(), Err(Error::OutOfBounds));
}

#[test]
fn test_bucket_size_is_limited() {
    let mut t = DecoderTest::new();
    t.helper.set_bucket_size(BUCKET_ID, u32::MAX);
    assert_eq!(t.execute(), Err(Error::OutOfBounds));
    assert_eq!(t.decoder.buckets.get(BUCKET_ID), None);

    t.helper
        .set_bucket_size(BUCKET_ID, crate::shm::MAX_BUCKET_SIZE as u32);
    assert_eq!(t.execute(), Ok(1));
    assert_eq!(
        t.decoder.buckets.get(BUCKET_ID).map(<[u8]>::len),
        Some(crate::shm::MAX_BUCKET_SIZE)
    );
}

#[test]
fn test_get_integerv_cached_state() {
    let mut t = DecoderTest::new();
    t.helper.get_integerv(DEPTH_WRITEMASK, SHM_ID, SHM_OFFSET);
    assert_eq!(t.execute(), Ok(1));
    assert!(t.take_calls().is_empty());
    assert_eq!(t.read_shm(0), 1);
    assert_eq!(t.read_shm(1), TRUE as u32);

    t.write_shm(0, 0);
    t.helper.get_integerv(MAX_VIEWPORT_DIMS, SHM_ID, SHM_OFFSET);
    assert_eq!(t.execute(), Ok(1));
    assert_eq!(t.take_calls(), [format!("get_integerv({MAX_VIEWPORT_DIMS}, out[2])")]);
    assert_eq!(t.read_shm(0), 2);
}

#[test]
fn test_get_error_includes_driver_errors() {
    let mut t = DecoderTest::new();
    t.queue_result("get_error", INVALID_VALUE);
    t.helper.cull_face(TRIANGLES);
    t.helper.get_error(SHM_ID, SHM_OFFSET);
    t.helper.get_error(SHM_ID, SHM_OFFSET + 4);
    t.helper.get_error(SHM_ID, SHM_OFFSET + 8);
    assert_eq!(t.execute(), Ok(4));
    assert_eq!(t.read_shm(0), INVALID_ENUM);
    assert_eq!(t.read_shm(1), INVALID_VALUE);
    assert_eq!(t.read_shm(2), NO_ERROR);
}

#[test]
fn test_draw_arrays() {
    let mut t = DecoderTest::new();
    t.helper.draw_arrays(TRIANGLES, 0, 3);
    t.helper.draw_arrays(TRIANGLES, 0, 0);
    t.helper.draw_arrays(TRIANGLES, -1, 3);
    assert_eq!(t.execute(), Ok(3));
    assert_eq!(t.gl_error(), INVALID_VALUE);
    assert_eq!(t.take_calls(), [format!("draw_arrays({TRIANGLES}, 0, 3)")]);

    t.helper.draw_elements(TRIANGLES, 6, UNSIGNED_INT, 0);
    assert_eq!(t.execute(), Ok(1));
    assert_eq!(t.gl_error(), INVALID_ENUM);
    assert!(t.take_calls().is_empty());
}

#[test]
fn test_read_pixels() {
    let mut t = DecoderTest::new();
    t.helper.read_pixels(0, 0, 2, 2, RGBA, UNSIGNED_BYTE, SHM_ID, 64);
    assert_eq!(t.execute(), Ok(1));
    assert_eq!(
        t.take_calls(),
        [format!("read_pixels(0, 0, 2, 2, {RGBA}, {UNSIGNED_BYTE}, out[16])")]
    );

    t.helper.read_pixels(0, 0, 2, 2, RGBA, SHORT, SHM_ID, 64);
    assert_eq!(t.execute(), Ok(1));
    assert_eq!(t.gl_error(), INVALID_ENUM);

    t.helper
        .read_pixels(0, 0, 64, 64, RGBA, UNSIGNED_BYTE, SHM_ID, SHM_OFFSET);
    assert_eq!(t.execute(), Err(Error::OutOfBounds));
    assert!(t.take_calls().is_empty());
}

#[test]
fn test_bind_generates_resource() {
    let mut t = DecoderTest::new();
    t.helper.bind_texture(TEXTURE_2D, NEW_CLIENT_ID);
    t.helper.bind_texture(TEXTURE_2D, NEW_CLIENT_ID);
    assert_eq!(t.execute(), Ok(2));
    let service_id = t.decoder.resources.textures.get(NEW_CLIENT_ID).unwrap();
    assert_eq!(service_id, RecordingDriver::FIRST_SERVICE_ID + 1);
    assert_eq!(
        t.take_calls(),
        [
            "gen_textures(1, out[1])".to_string(),
            format!("bind_texture({TEXTURE_2D}, {service_id})"),
            format!("bind_texture({TEXTURE_2D}, {service_id})"),
        ]
    );
}

#[test]
fn test_unknown_command() {
    let mut t = DecoderTest::new();
    t.helper.flush();
    let mut data = t.helper.take();
    data.push(bytemuck::cast(crate::cmd::CommandHeader::new(2000, 1)));
    assert_eq!(t.decoder.execute(&data), Err(Error::UnknownCommand(2000)));
    // commands before the bad one have run.
    assert_eq!(t.take_calls(), ["flush()"]);
}

#[test]
fn test_command_past_the_end() {
    let mut t = DecoderTest::new();
    t.helper.set_token(5);
    let mut data = t.helper.take();
    data.push(bytemuck::cast(crate::cmd::CommandHeader::new(
        crate::cmd_ids::SET_TOKEN,
        3,
    )));
    data.push(0);
    assert_eq!(t.decoder.execute(&data), Err(Error::OutOfBounds));
    assert_eq!(t.decoder.token(), 5);

    assert_eq!(t.decoder.execute(&[0]), Err(Error::OutOfBounds));
}

#[test]
fn test_wrong_size() {
    let mut t = DecoderTest::new();
    t.helper.set_token(5);
    let mut data = t.helper.take();
    data[0] = bytemuck::cast(crate::cmd::CommandHeader::new(crate::cmd_ids::SET_TOKEN, 3));
    data.push(0);
    assert_eq!(t.decoder.execute(&data), Err(Error::InvalidSize));
}
