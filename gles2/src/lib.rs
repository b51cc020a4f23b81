//! GLES2 over a command buffer.
//!
//! [`Gles2Implementation`] turns GL calls into commands, [`Decoder`] validates them and forwards
//! them to a [`Driver`]. most of both sides is generated by `gles2-generator` from
//! `gl-specs/gles2_cmd_buffer_functions.txt`, the modules here hold what the generated code
//! plugs into.

pub mod client;
pub mod cmd;
pub mod cmd_format;
pub mod cmd_ids;
pub mod context_state;
pub mod decoder;
pub mod driver;
pub mod error;
pub mod gl;
pub mod helper;
pub mod resources;
pub mod shm;
pub mod validators;

#[cfg(test)]
mod decoder_test;

pub use client::Gles2Implementation;
pub use context_state::Features;
pub use decoder::Decoder;
pub use driver::{Driver, RecordingDriver};
pub use error::Error;
pub use helper::CommandBufferHelper;
