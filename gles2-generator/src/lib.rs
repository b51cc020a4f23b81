//! generator for the GLES2 command buffer protocol.
//!
//! reads a table of GL signatures and emits the wire format of every command, the client side
//! that encodes them and the service side that validates and decodes them. see [`generator`]
//! for the list of files.

pub mod argument;
pub mod config;
pub mod function;
pub mod function_info;
pub mod generator;
pub mod gl_types;
pub mod handler;
pub mod named_types;
pub mod names;
pub mod policy;
pub mod signature;
pub mod states;

pub use generator::{Generator, generate};
