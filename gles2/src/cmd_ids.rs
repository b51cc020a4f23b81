//! opcodes. the common commands are written here, the GLES2 ones are generated and start at
//! [`FIRST_GLES2_COMMAND`].

pub const NOOP: u32 = 0;
pub const SET_TOKEN: u32 = 1;
pub const SET_BUCKET_SIZE: u32 = 2;
pub const SET_BUCKET_DATA: u32 = 3;
pub const SET_BUCKET_DATA_IMMEDIATE: u32 = 4;

pub const FIRST_GLES2_COMMAND: u32 = 256;

include!(concat!(env!("OUT_DIR"), "/cmd_ids_generated.rs"));

pub fn command_name(id: u32) -> &'static str {
    let common = match id {
        NOOP => Some("Noop"),
        SET_TOKEN => Some("SetToken"),
        SET_BUCKET_SIZE => Some("SetBucketSize"),
        SET_BUCKET_DATA => Some("SetBucketData"),
        SET_BUCKET_DATA_IMMEDIATE => Some("SetBucketDataImmediate"),
        _ => None,
    };
    common.or_else(|| gles2_command_name(id)).unwrap_or("unknown")
}

#[test]
fn test_command_name() {
    assert_eq!(command_name(SET_TOKEN), "SetToken");
    assert_eq!(command_name(FIRST_GLES2_COMMAND), "ActiveTexture");
    assert_eq!(command_name(BIND_TEXTURE), "BindTexture");
    assert_eq!(command_name(FIRST_GLES2_COMMAND - 1), "unknown");
}
