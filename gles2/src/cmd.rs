//! wire format shared by every command, and the common commands.

use std::mem::offset_of;

use bytemuck::{Pod, Zeroable};

use crate::cmd_ids;
use crate::error::Error;

const SIZE_BITS: u32 = 21;
const SIZE_MASK: u32 = (1 << SIZE_BITS) - 1;

/// first word of every command. the low 21 bits hold the size of the command in words, header
/// included, the high 11 bits the command id.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct CommandHeader(u32);

impl CommandHeader {
    pub const fn new(command: u32, size: u32) -> Self {
        Self((command << SIZE_BITS) | (size & SIZE_MASK))
    }

    pub fn size(self) -> u32 {
        self.0 & SIZE_MASK
    }

    pub fn command(self) -> u32 {
        self.0 >> SIZE_BITS
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgFlags {
    /// the size in the header must match the struct exactly.
    Fixed,
    /// the struct is followed by a payload.
    AtLeastN,
}

pub trait Command: Pod {
    const ID: u32;
    const ARG_FLAGS: ArgFlags;
    const NAME: &'static str;
}

pub const fn words_for_bytes(bytes: usize) -> usize {
    bytes.div_ceil(4)
}

/// reads `T` from the start of `data`, which holds exactly one command. returns the payload that
/// follows the struct.
pub fn read_command<T: Command>(data: &[u32]) -> Result<(T, &[u32]), Error> {
    let words = size_of::<T>() / 4;
    match T::ARG_FLAGS {
        ArgFlags::Fixed if data.len() != words => return Err(Error::InvalidSize),
        ArgFlags::AtLeastN if data.len() < words => return Err(Error::InvalidSize),
        _ => {}
    }
    let (head, payload) = data.split_at(words);
    Ok((bytemuck::pod_read_unaligned(bytemuck::cast_slice(head)), payload))
}

/// the first `count` elements of an immediate payload, `None` if the payload is shorter.
pub fn immediate_array<T: Pod>(payload: &[u32], count: usize) -> Option<Vec<T>> {
    let len = count.checked_mul(size_of::<T>())?;
    let bytes: &[u8] = bytemuck::cast_slice(payload);
    Some(bytemuck::pod_collect_to_vec(bytes.get(..len)?))
}

/// skips `skip_words` words of padding.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Noop {
    pub header: CommandHeader,
}

impl Command for Noop {
    const ID: u32 = cmd_ids::NOOP;
    const ARG_FLAGS: ArgFlags = ArgFlags::AtLeastN;
    const NAME: &'static str = "Noop";
}

impl Noop {
    pub fn new(skip_words: u32) -> Self {
        Self {
            header: CommandHeader::new(Self::ID, 1 + skip_words),
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct SetToken {
    pub header: CommandHeader,
    pub token: u32,
}

impl Command for SetToken {
    const ID: u32 = cmd_ids::SET_TOKEN;
    const ARG_FLAGS: ArgFlags = ArgFlags::Fixed;
    const NAME: &'static str = "SetToken";
}

impl SetToken {
    pub fn new(token: u32) -> Self {
        Self {
            header: CommandHeader::new(Self::ID, (size_of::<Self>() / 4) as u32),
            token,
        }
    }
}

/// resizes a bucket, creating it if needed. new bytes are zero.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct SetBucketSize {
    pub header: CommandHeader,
    pub bucket_id: u32,
    pub size: u32,
}

impl Command for SetBucketSize {
    const ID: u32 = cmd_ids::SET_BUCKET_SIZE;
    const ARG_FLAGS: ArgFlags = ArgFlags::Fixed;
    const NAME: &'static str = "SetBucketSize";
}

impl SetBucketSize {
    pub fn new(bucket_id: u32, size: u32) -> Self {
        Self {
            header: CommandHeader::new(Self::ID, (size_of::<Self>() / 4) as u32),
            bucket_id,
            size,
        }
    }
}

/// copies `size` bytes from shared memory into a bucket at `offset`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct SetBucketData {
    pub header: CommandHeader,
    pub bucket_id: u32,
    pub offset: u32,
    pub size: u32,
    pub shared_memory_id: u32,
    pub shared_memory_offset: u32,
}

impl Command for SetBucketData {
    const ID: u32 = cmd_ids::SET_BUCKET_DATA;
    const ARG_FLAGS: ArgFlags = ArgFlags::Fixed;
    const NAME: &'static str = "SetBucketData";
}

impl SetBucketData {
    pub fn new(
        bucket_id: u32,
        offset: u32,
        size: u32,
        shared_memory_id: u32,
        shared_memory_offset: u32,
    ) -> Self {
        Self {
            header: CommandHeader::new(Self::ID, (size_of::<Self>() / 4) as u32),
            bucket_id,
            offset,
            size,
            shared_memory_id,
            shared_memory_offset,
        }
    }
}

/// like [`SetBucketData`] with the bytes following the command.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct SetBucketDataImmediate {
    pub header: CommandHeader,
    pub bucket_id: u32,
    pub offset: u32,
    pub size: u32,
}

impl Command for SetBucketDataImmediate {
    const ID: u32 = cmd_ids::SET_BUCKET_DATA_IMMEDIATE;
    const ARG_FLAGS: ArgFlags = ArgFlags::AtLeastN;
    const NAME: &'static str = "SetBucketDataImmediate";
}

impl SetBucketDataImmediate {
    pub fn new(bucket_id: u32, offset: u32, size: u32) -> Self {
        Self {
            header: CommandHeader::new(
                Self::ID,
                words_for_bytes(size_of::<Self>() + size as usize) as u32,
            ),
            bucket_id,
            offset,
            size,
        }
    }
}

const _: () = assert!(size_of::<CommandHeader>() == 4);
const _: () = assert!(size_of::<Noop>() == 4);
const _: () = assert!(size_of::<SetToken>() == 8);
const _: () = assert!(size_of::<SetBucketSize>() == 12);
const _: () = assert!(offset_of!(SetBucketSize, size) == 8);
const _: () = assert!(size_of::<SetBucketData>() == 24);
const _: () = assert!(offset_of!(SetBucketData, shared_memory_offset) == 20);
const _: () = assert!(size_of::<SetBucketDataImmediate>() == 16);
const _: () = assert!(offset_of!(SetBucketDataImmediate, size) == 12);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header() {
        let header = CommandHeader::new(300, 5);
        assert_eq!(header.command(), 300);
        assert_eq!(header.size(), 5);
        // the id lives above the size.
        assert_eq!(bytemuck::cast::<CommandHeader, u32>(header), (300 << 21) | 5);
    }

    #[test]
    fn test_read_command() {
        let cmd = SetBucketSize::new(3, 10);
        let data: &[u32] = bytemuck::cast_slice(std::slice::from_ref(&cmd));
        let (read, payload) = read_command::<SetBucketSize>(data).unwrap();
        assert_eq!(read, cmd);
        assert!(payload.is_empty());

        assert_eq!(read_command::<SetBucketSize>(&data[..2]), Err(Error::InvalidSize));
        let mut longer = data.to_vec();
        longer.push(0);
        assert_eq!(read_command::<SetBucketSize>(&longer), Err(Error::InvalidSize));
    }

    #[test]
    fn test_immediate_array() {
        let payload = [1u32, 2, 3];
        assert_eq!(immediate_array::<u32>(&payload, 2), Some(vec![1, 2]));
        assert_eq!(immediate_array::<u8>(&payload, 5).map(|v| v.len()), Some(5));
        assert_eq!(immediate_array::<u32>(&payload, 4), None);
        assert_eq!(immediate_array::<u32>(&payload, usize::MAX), None);
    }

    #[test]
    fn test_immediate_size_is_rounded_up() {
        let cmd = SetBucketDataImmediate::new(1, 0, 5);
        assert_eq!(cmd.header.size(), 4 + 2);
        assert_eq!(words_for_bytes(0), 0);
        assert_eq!(words_for_bytes(4), 1);
    }
}
