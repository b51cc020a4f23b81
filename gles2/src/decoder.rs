//! the service side: validates commands and forwards them to a [`Driver`].

use nohash::NoHashMap;

use crate::cmd::{
    Command as _, CommandHeader, SetBucketData, SetBucketDataImmediate, SetBucketSize, SetToken,
    immediate_array, read_command,
};
use crate::cmd_format;
use crate::cmd_ids;
use crate::context_state::{ContextState, Features, num_values_returned};
use crate::driver::Driver;
use crate::error::{Error, ErrorState};
use crate::gl::*;
use crate::resources::{ResourceMaps, has_zero_or_duplicate};
use crate::shm::{Buckets, SharedMemory};
use crate::validators::Validators;

/// how many errors are pulled from the driver at most before giving up on it.
const MAX_DRIVER_ERRORS: usize = 16;

/// rows of pixels read back are padded to this many bytes.
const PACK_ALIGNMENT: usize = 4;

pub struct Decoder<D> {
    pub driver: D,
    pub features: Features,
    /// binding an id that was never generated creates it, instead of failing.
    pub bind_generates_resource: bool,
    pub state: ContextState,
    validators: Validators,
    pub resources: ResourceMaps,
    pub shared_memory: SharedMemory,
    pub buckets: Buckets,
    pub error_state: ErrorState,
    /// array size of every active uniform, by program service id and location.
    uniforms: NoHashMap<GLuint, NoHashMap<GLint, GLsizei>>,
    current_program: GLuint,
    token: u32,
}

impl<D: Driver> Decoder<D> {
    pub fn new(driver: D, features: Features, bind_generates_resource: bool) -> Self {
        let mut validators = Validators::new();
        if features.blend_equation_advanced {
            validators.equation.add_value(MULTIPLY_KHR);
        }
        Self {
            driver,
            features,
            bind_generates_resource,
            state: ContextState::default(),
            validators,
            resources: ResourceMaps::default(),
            shared_memory: SharedMemory::default(),
            buckets: Buckets::default(),
            error_state: ErrorState::default(),
            uniforms: NoHashMap::default(),
            current_program: 0,
            token: 0,
        }
    }

    /// makes `location` of a linked program known to the uniform commands.
    pub fn register_uniform(&mut self, program: GLuint, location: GLint, size: GLsizei) {
        self.uniforms.entry(program).or_default().insert(location, size);
    }

    /// the last token the client set.
    pub fn token(&self) -> u32 {
        self.token
    }

    /// decodes every command in `data`, returns how many there were.
    ///
    /// stops at the first command that can not be decoded. commands before it have been
    /// executed.
    pub fn execute(&mut self, data: &[u32]) -> Result<usize, Error> {
        let mut offset = 0;
        let mut processed = 0;
        while offset < data.len() {
            let header: CommandHeader = bytemuck::cast(data[offset]);
            let size = header.size() as usize;
            if size == 0 || offset + size > data.len() {
                log::debug!("command {processed} at {offset} does not fit");
                return Err(Error::OutOfBounds);
            }
            let command = header.command();
            let cmd = &data[offset..offset + size];
            let result = if command < cmd_ids::FIRST_GLES2_COMMAND {
                self.do_common_command(command, cmd)
            } else {
                self.do_gles2_command(command, cmd)
            };
            if let Err(err) = result {
                log::debug!(
                    "{} failed after {processed} commands: {err}",
                    cmd_ids::command_name(command)
                );
                return Err(err);
            }
            offset += size;
            processed += 1;
        }
        Ok(processed)
    }

    fn do_common_command(&mut self, command: u32, data: &[u32]) -> Result<(), Error> {
        match command {
            cmd_ids::NOOP => Ok(()),
            cmd_ids::SET_TOKEN => {
                let (c, _) = read_command::<SetToken>(data)?;
                self.token = c.token;
                Ok(())
            }
            cmd_ids::SET_BUCKET_SIZE => {
                let (c, _) = read_command::<SetBucketSize>(data)?;
                if !self.buckets.set_size(c.bucket_id, c.size as usize) {
                    return Err(Error::OutOfBounds);
                }
                Ok(())
            }
            cmd_ids::SET_BUCKET_DATA => {
                let (c, _) = read_command::<SetBucketData>(data)?;
                let Some(bytes) = self.shared_memory.get_array::<u8>(
                    c.shared_memory_id,
                    c.shared_memory_offset,
                    c.size as usize,
                ) else {
                    return Err(Error::OutOfBounds);
                };
                if !self.buckets.set_data(c.bucket_id, c.offset as usize, &bytes) {
                    return Err(Error::InvalidArguments);
                }
                Ok(())
            }
            cmd_ids::SET_BUCKET_DATA_IMMEDIATE => {
                let (c, payload) = read_command::<SetBucketDataImmediate>(data)?;
                let Some(bytes) = immediate_array::<u8>(payload, c.size as usize) else {
                    return Err(Error::OutOfBounds);
                };
                if !self.buckets.set_data(c.bucket_id, c.offset as usize, &bytes) {
                    return Err(Error::InvalidArguments);
                }
                Ok(())
            }
            _ => Err(Error::UnknownCommand(command)),
        }
    }

    fn set_gl_error(&mut self, code: GLenum, function: &str, msg: &str) {
        log::debug!("{function}: {msg} ({code:#06x})");
        self.error_state.set(code);
    }

    /// moves errors the driver raised so far into our own error state, so that they are not
    /// mistaken for errors of the next driver call.
    fn copy_real_gl_errors(&mut self) {
        for _ in 0..MAX_DRIVER_ERRORS {
            let error = self.driver.get_error();
            if error == NO_ERROR {
                return;
            }
            self.error_state.set(error);
        }
        log::warn!("driver keeps reporting errors");
    }

    /// the depth mask is only cached when set, it reaches the driver before something is
    /// drawn into the depth buffer.
    fn apply_dirty_state(&mut self) {
        if self.state.clear_state_dirty {
            self.driver.depth_mask(self.state.depth_mask);
            self.state.clear_state_dirty = false;
        }
    }

    fn do_clear(&mut self, mask: GLbitfield) -> Result<(), Error> {
        self.apply_dirty_state();
        self.driver.clear(mask);
        Ok(())
    }

    fn do_enable(&mut self, cap: GLenum) -> Result<(), Error> {
        if self.state.set_capability(cap, true) {
            self.driver.enable(cap);
        }
        Ok(())
    }

    fn do_disable(&mut self, cap: GLenum) -> Result<(), Error> {
        if self.state.set_capability(cap, false) {
            self.driver.disable(cap);
        }
        Ok(())
    }

    fn do_is_enabled(&mut self, cap: GLenum) -> Result<GLboolean, Error> {
        match self.state.is_capability_enabled(cap) {
            Some(true) => Ok(TRUE),
            _ => Ok(FALSE),
        }
    }

    fn do_get_error(&mut self) -> Result<GLenum, Error> {
        self.copy_real_gl_errors();
        Ok(self.error_state.take())
    }

    fn do_get_integerv(&mut self, pname: GLenum, params: &mut [GLint]) -> Result<(), Error> {
        if let Some(values) = self.state.get_state_iv(pname) {
            for (param, value) in params.iter_mut().zip(values) {
                *param = value;
            }
            return Ok(());
        }
        self.copy_real_gl_errors();
        self.driver.get_integerv(pname, params);
        let error = self.driver.get_error();
        if error != NO_ERROR {
            self.set_gl_error(error, "glGetIntegerv", "");
        }
        Ok(())
    }

    fn do_check_framebuffer_status(&mut self, target: GLenum) -> Result<GLenum, Error> {
        Ok(self.driver.check_framebuffer_status(target))
    }

    fn do_use_program(&mut self, program: GLuint) -> Result<(), Error> {
        self.current_program = program;
        self.driver.use_program(program);
        Ok(())
    }

    fn do_bind_attrib_location(
        &mut self,
        program: GLuint,
        index: GLuint,
        name: &str,
    ) -> Result<(), Error> {
        if name.starts_with("gl_") {
            self.set_gl_error(INVALID_OPERATION, "glBindAttribLocation", "reserved prefix");
            return Ok(());
        }
        self.driver.bind_attrib_location(program, index, name);
        Ok(())
    }

    fn do_shader_source(&mut self, shader: GLuint, source: &str) -> Result<(), Error> {
        self.driver.shader_source(shader, source);
        Ok(())
    }

    fn do_buffer_data(
        &mut self,
        target: GLenum,
        size: GLsizeiptr,
        data: Option<&[u8]>,
        usage: GLenum,
    ) -> Result<(), Error> {
        self.driver.buffer_data(target, size, data, usage);
        Ok(())
    }

    fn do_buffer_sub_data(
        &mut self,
        target: GLenum,
        offset: GLintptr,
        size: GLsizeiptr,
        data: &[u8],
    ) -> Result<(), Error> {
        self.driver.buffer_sub_data(target, offset, size, data);
        Ok(())
    }

    fn do_tex_parameterfv(
        &mut self,
        target: GLenum,
        pname: GLenum,
        params: &[GLfloat],
    ) -> Result<(), Error> {
        let Some(&param) = params.first() else {
            return Err(Error::OutOfBounds);
        };
        self.driver.tex_parameterf(target, pname, param);
        Ok(())
    }

    fn do_tex_parameteriv(
        &mut self,
        target: GLenum,
        pname: GLenum,
        params: &[GLint],
    ) -> Result<(), Error> {
        let Some(&param) = params.first() else {
            return Err(Error::OutOfBounds);
        };
        self.driver.tex_parameteri(target, pname, param);
        Ok(())
    }

    /// how many elements of a uniform array `count` may touch, `None` when nothing is to be
    /// done. a count past the end of the array is clamped.
    fn uniform_count(&mut self, function: &str, location: GLint, count: GLsizei) -> Option<GLsizei> {
        if self.current_program == 0 {
            self.set_gl_error(INVALID_OPERATION, function, "no program in use");
            return None;
        }
        if location == -1 {
            return None;
        }
        let Some(&size) = self
            .uniforms
            .get(&self.current_program)
            .and_then(|locations| locations.get(&location))
        else {
            self.set_gl_error(INVALID_OPERATION, function, "unknown location");
            return None;
        };
        Some(count.min(size))
    }

    fn do_uniform_1fv(&mut self, location: GLint, count: GLsizei, v: &[GLfloat]) -> Result<(), Error> {
        let Some(count) = self.uniform_count("glUniform1fv", location, count) else {
            return Ok(());
        };
        let Some(v) = v.get(..count as usize) else {
            return Err(Error::OutOfBounds);
        };
        self.driver.uniform_1fv(location, count, v);
        Ok(())
    }

    fn do_uniform_4fv(&mut self, location: GLint, count: GLsizei, v: &[GLfloat]) -> Result<(), Error> {
        let Some(count) = self.uniform_count("glUniform4fv", location, count) else {
            return Ok(());
        };
        let Some(v) = v.get(..count as usize * 4) else {
            return Err(Error::OutOfBounds);
        };
        self.driver.uniform_4fv(location, count, v);
        Ok(())
    }

    fn do_uniform_matrix_4fv(
        &mut self,
        location: GLint,
        count: GLsizei,
        transpose: GLboolean,
        value: &[GLfloat],
    ) -> Result<(), Error> {
        let Some(count) = self.uniform_count("glUniformMatrix4fv", location, count) else {
            return Ok(());
        };
        let Some(value) = value.get(..count as usize * 16) else {
            return Err(Error::OutOfBounds);
        };
        self.driver.uniform_matrix_4fv(location, count, transpose, value);
        Ok(())
    }

    fn handle_draw_arrays(&mut self, c: cmd_format::DrawArrays) -> Result<(), Error> {
        let mode = c.mode as GLenum;
        let first = c.first as GLint;
        let count = c.count as GLsizei;
        if !self.validators.draw_mode.is_valid(mode) {
            self.set_gl_error(INVALID_ENUM, "glDrawArrays", "mode");
            return Ok(());
        }
        if first < 0 || count < 0 {
            self.set_gl_error(INVALID_VALUE, "glDrawArrays", "first or count < 0");
            return Ok(());
        }
        if count == 0 {
            return Ok(());
        }
        self.apply_dirty_state();
        self.driver.draw_arrays(mode, first, count);
        Ok(())
    }

    fn handle_draw_elements(&mut self, c: cmd_format::DrawElements) -> Result<(), Error> {
        let mode = c.mode as GLenum;
        let count = c.count as GLsizei;
        let r#type = c.r#type as GLenum;
        if !self.validators.draw_mode.is_valid(mode) {
            self.set_gl_error(INVALID_ENUM, "glDrawElements", "mode");
            return Ok(());
        }
        if !self.validators.index_type.is_valid(r#type) {
            self.set_gl_error(INVALID_ENUM, "glDrawElements", "type");
            return Ok(());
        }
        if count < 0 {
            self.set_gl_error(INVALID_VALUE, "glDrawElements", "count < 0");
            return Ok(());
        }
        if count == 0 {
            return Ok(());
        }
        self.apply_dirty_state();
        self.driver.draw_elements(mode, count, r#type, c.indices);
        Ok(())
    }

    fn handle_read_pixels(&mut self, data: &[u32]) -> Result<(), Error> {
        let (c, _) = read_command::<cmd_format::ReadPixels>(data)?;
        let format = c.format as GLenum;
        let r#type = c.r#type as GLenum;
        if !self.validators.read_pixel_format.is_valid(format) {
            self.set_gl_error(INVALID_ENUM, "glReadPixels", "format");
            return Ok(());
        }
        if !self.validators.pixel_type.is_valid(r#type) {
            self.set_gl_error(INVALID_ENUM, "glReadPixels", "type");
            return Ok(());
        }
        if c.width < 0 || c.height < 0 {
            self.set_gl_error(INVALID_VALUE, "glReadPixels", "width or height < 0");
            return Ok(());
        }
        let Some(size) = read_pixels_size(c.width as usize, c.height as usize, format, r#type)
        else {
            return Err(Error::OutOfBounds);
        };
        let Some(mut pixels) =
            self.shared_memory
                .get_array::<u8>(c.pixels_shm_id, c.pixels_shm_offset, size)
        else {
            return Err(Error::OutOfBounds);
        };
        self.copy_real_gl_errors();
        self.driver
            .read_pixels(c.x, c.y, c.width, c.height, format, r#type, &mut pixels);
        let error = self.driver.get_error();
        if error != NO_ERROR {
            self.set_gl_error(error, "glReadPixels", "");
            return Ok(());
        }
        if !self
            .shared_memory
            .write_bytes(c.pixels_shm_id, c.pixels_shm_offset, &pixels)
        {
            return Err(Error::OutOfBounds);
        }
        Ok(())
    }
}

fn bytes_per_pixel(format: GLenum, r#type: GLenum) -> usize {
    match r#type {
        UNSIGNED_BYTE => match format {
            ALPHA => 1,
            RGB => 3,
            _ => 4,
        },
        _ => 2,
    }
}

/// bytes `ReadPixels` writes. every row but the last is padded to [`PACK_ALIGNMENT`].
fn read_pixels_size(width: usize, height: usize, format: GLenum, r#type: GLenum) -> Option<usize> {
    if width == 0 || height == 0 {
        return Some(0);
    }
    let row = width.checked_mul(bytes_per_pixel(format, r#type))?;
    let padded = row.checked_next_multiple_of(PACK_ALIGNMENT)?;
    padded.checked_mul(height - 1)?.checked_add(row)
}

include!(concat!(env!("OUT_DIR"), "/decoder_generated.rs"));

#[test]
fn test_read_pixels_size() {
    assert_eq!(read_pixels_size(0, 5, RGBA, UNSIGNED_BYTE), Some(0));
    assert_eq!(read_pixels_size(2, 2, RGBA, UNSIGNED_BYTE), Some(16));
    // 3 bytes rows are padded to 4, except the last one.
    assert_eq!(read_pixels_size(1, 3, RGB, UNSIGNED_BYTE), Some(4 + 4 + 3));
    assert_eq!(read_pixels_size(3, 1, RGB, UNSIGNED_SHORT_5_6_5), Some(6));
    assert_eq!(read_pixels_size(usize::MAX, 2, RGBA, UNSIGNED_BYTE), None);
}
