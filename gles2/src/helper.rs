//! writes commands into a buffer.

use crate::cmd::{
    Command, Noop, SetBucketData, SetBucketDataImmediate, SetBucketSize, SetToken,
    words_for_bytes,
};
use crate::cmd_format;
use crate::gl::*;

#[derive(Debug, Default)]
pub struct CommandBufferHelper {
    buffer: Vec<u32>,
}

impl CommandBufferHelper {
    pub fn push<T: Command>(&mut self, cmd: T) {
        self.buffer
            .extend_from_slice(bytemuck::cast_slice(std::slice::from_ref(&cmd)));
    }

    /// `payload` is padded with zeros to a whole number of words.
    pub fn push_immediate<T: Command>(&mut self, cmd: T, payload: &[u8]) {
        self.push(cmd);
        let start = self.buffer.len();
        self.buffer.resize(start + words_for_bytes(payload.len()), 0);
        let dst: &mut [u8] = bytemuck::cast_slice_mut(&mut self.buffer[start..]);
        dst[..payload.len()].copy_from_slice(payload);
    }

    pub fn noop(&mut self, skip_words: u32) {
        self.push(Noop::new(skip_words));
        let len = self.buffer.len();
        self.buffer.resize(len + skip_words as usize, 0);
    }

    pub fn set_token(&mut self, token: u32) {
        self.push(SetToken::new(token));
    }

    pub fn set_bucket_size(&mut self, bucket_id: u32, size: u32) {
        self.push(SetBucketSize::new(bucket_id, size));
    }

    pub fn set_bucket_data(
        &mut self,
        bucket_id: u32,
        offset: u32,
        size: u32,
        shared_memory_id: u32,
        shared_memory_offset: u32,
    ) {
        self.push(SetBucketData::new(
            bucket_id,
            offset,
            size,
            shared_memory_id,
            shared_memory_offset,
        ));
    }

    pub fn set_bucket_data_immediate(&mut self, bucket_id: u32, offset: u32, data: &[u8]) {
        self.push_immediate(
            SetBucketDataImmediate::new(bucket_id, offset, data.len() as u32),
            data,
        );
    }

    pub fn set_bucket_as_string(&mut self, bucket_id: u32, s: &str) {
        self.set_bucket_size(bucket_id, s.len() as u32);
        if !s.is_empty() {
            self.set_bucket_data_immediate(bucket_id, 0, s.as_bytes());
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn read_pixels(
        &mut self,
        x: GLint,
        y: GLint,
        width: GLsizei,
        height: GLsizei,
        format: GLenum,
        r#type: GLenum,
        pixels_shm_id: u32,
        pixels_shm_offset: u32,
    ) {
        self.push(cmd_format::ReadPixels::new(
            x,
            y,
            width,
            height,
            format,
            r#type,
            pixels_shm_id,
            pixels_shm_offset,
        ));
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// everything written so far, leaving the helper empty.
    pub fn take(&mut self) -> Vec<u32> {
        std::mem::take(&mut self.buffer)
    }
}

include!(concat!(env!("OUT_DIR"), "/cmd_helper_generated.rs"));

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::CommandHeader;

    #[test]
    fn test_push_immediate_pads_payload() {
        let mut helper = CommandBufferHelper::default();
        helper.set_bucket_data_immediate(2, 0, b"hello");
        let data = helper.take();
        assert_eq!(data.len(), 4 + 2);
        let header: CommandHeader = bytemuck::cast(data[0]);
        assert_eq!(header.size() as usize, data.len());
        let payload: &[u8] = bytemuck::cast_slice(&data[4..]);
        assert_eq!(payload, b"hello\0\0\0");
        assert!(helper.is_empty());
    }

    #[test]
    fn test_noop_skips() {
        let mut helper = CommandBufferHelper::default();
        helper.noop(2);
        assert_eq!(helper.len(), 3);
    }

    #[test]
    fn test_generated_helper() {
        let mut helper = CommandBufferHelper::default();
        helper.bind_texture(TEXTURE_2D, 5);
        let data = helper.take();
        let header: CommandHeader = bytemuck::cast(data[0]);
        assert_eq!(header.command(), crate::cmd_ids::BIND_TEXTURE);
        assert_eq!(&data[1..], [TEXTURE_2D, 5]);
    }
}
