//! GLES2 command structs.

#![allow(clippy::unnecessary_cast)]

use std::mem::offset_of;

use bytemuck::{Pod, Zeroable};

use crate::cmd::{ArgFlags, Command, CommandHeader, words_for_bytes};
use crate::cmd_ids;
use crate::gl::*;

include!(concat!(env!("OUT_DIR"), "/cmd_format_generated.rs"));

/// the service writes the pixels into shared memory itself, so this one is not generated.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct ReadPixels {
    pub header: CommandHeader,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub format: u32,
    pub r#type: u32,
    pub pixels_shm_id: u32,
    pub pixels_shm_offset: u32,
}

impl Command for ReadPixels {
    const ID: u32 = cmd_ids::READ_PIXELS;
    const ARG_FLAGS: ArgFlags = ArgFlags::Fixed;
    const NAME: &'static str = "ReadPixels";
}

impl ReadPixels {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        x: GLint,
        y: GLint,
        width: GLsizei,
        height: GLsizei,
        format: GLenum,
        r#type: GLenum,
        pixels_shm_id: u32,
        pixels_shm_offset: u32,
    ) -> Self {
        Self {
            header: CommandHeader::new(Self::ID, (size_of::<Self>() / 4) as u32),
            x,
            y,
            width,
            height,
            format,
            r#type,
            pixels_shm_id,
            pixels_shm_offset,
        }
    }
}

const _: () = assert!(size_of::<ReadPixels>() == 36);
const _: () = assert!(offset_of!(ReadPixels, x) == 4);
const _: () = assert!(offset_of!(ReadPixels, pixels_shm_offset) == 32);

#[cfg(test)]
mod tests {
    use super::*;

    include!(concat!(env!("OUT_DIR"), "/cmd_format_test_generated.rs"));

    #[test]
    fn test_read_pixels() {
        let cmd = ReadPixels::new(1, 2, 3, 4, RGBA, UNSIGNED_BYTE, 5, 6);
        assert_eq!(cmd.header.command(), cmd_ids::READ_PIXELS);
        assert_eq!(cmd.header.size(), 9);
        assert_eq!(cmd.r#type, UNSIGNED_BYTE);
    }
}
