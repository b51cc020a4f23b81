//! memory shared between client and service, and the service side buckets.

use bytemuck::Pod;
use nohash::NoHashMap;

/// segments registered by the client, addressed by id and byte offset. id 0 is never valid.
#[derive(Debug, Default)]
pub struct SharedMemory {
    segments: NoHashMap<u32, Vec<u8>>,
}

impl SharedMemory {
    pub fn register(&mut self, id: u32, size: usize) {
        if id == 0 {
            log::warn!("shared memory id 0 is reserved");
            return;
        }
        self.segments.insert(id, vec![0; size]);
    }

    pub fn unregister(&mut self, id: u32) {
        self.segments.remove(&id);
    }

    fn bytes(&self, id: u32, offset: u32, len: usize) -> Option<&[u8]> {
        let segment = self.segments.get(&id)?;
        let start = offset as usize;
        segment.get(start..start.checked_add(len)?)
    }

    fn bytes_mut(&mut self, id: u32, offset: u32, len: usize) -> Option<&mut [u8]> {
        let segment = self.segments.get_mut(&id)?;
        let start = offset as usize;
        segment.get_mut(start..start.checked_add(len)?)
    }

    /// `count` elements at `offset`, `None` if they do not fit the segment.
    pub fn get_array<T: Pod>(&self, id: u32, offset: u32, count: usize) -> Option<Vec<T>> {
        let len = count.checked_mul(size_of::<T>())?;
        Some(bytemuck::pod_collect_to_vec(self.bytes(id, offset, len)?))
    }

    pub fn write_bytes(&mut self, id: u32, offset: u32, data: &[u8]) -> bool {
        match self.bytes_mut(id, offset, data.len()) {
            Some(dst) => {
                dst.copy_from_slice(data);
                true
            }
            None => false,
        }
    }

    pub fn write_result<T: Pod>(&mut self, id: u32, offset: u32, value: T) -> bool {
        self.write_bytes(id, offset, bytemuck::bytes_of(&value))
    }

    /// the element count of a sized result, which the client clears before asking.
    pub fn read_result_size(&self, id: u32, offset: u32) -> Option<u32> {
        self.get_array::<u32>(id, offset, 1)?.first().copied()
    }

    /// writes `{ size: u32, values }` where size is the number of values.
    pub fn write_sized_result<T: Pod>(&mut self, id: u32, offset: u32, values: &[T]) -> bool {
        let data: &[u8] = bytemuck::cast_slice(values);
        let Some(dst) = self.bytes_mut(id, offset, 4 + data.len()) else {
            return false;
        };
        let (size, rest) = dst.split_at_mut(4);
        size.copy_from_slice(&(values.len() as u32).to_ne_bytes());
        rest.copy_from_slice(data);
        true
    }
}

/// largest size a bucket can be set to.
pub const MAX_BUCKET_SIZE: usize = 64 * 1024 * 1024;

/// byte containers the client fills piece by piece, used for data of unbounded size.
#[derive(Debug, Default)]
pub struct Buckets {
    buckets: NoHashMap<u32, Vec<u8>>,
}

impl Buckets {
    /// fails if `size` is over [`MAX_BUCKET_SIZE`], the bucket is left as it was then.
    pub fn set_size(&mut self, id: u32, size: usize) -> bool {
        if size > MAX_BUCKET_SIZE {
            log::debug!("bucket {id} can not hold {size} bytes");
            return false;
        }
        let bucket = self.buckets.entry(id).or_default();
        bucket.resize(size, 0);
        true
    }

    /// fails if the bucket does not exist or is too small.
    pub fn set_data(&mut self, id: u32, offset: usize, data: &[u8]) -> bool {
        let Some(bucket) = self.buckets.get_mut(&id) else {
            return false;
        };
        let Some(end) = offset.checked_add(data.len()) else {
            return false;
        };
        match bucket.get_mut(offset..end) {
            Some(dst) => {
                dst.copy_from_slice(data);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: u32) -> Option<&[u8]> {
        self.buckets.get(&id).map(Vec::as_slice)
    }

    pub fn remove(&mut self, id: u32) {
        self.buckets.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_array() {
        let mut shm = SharedMemory::default();
        shm.register(1, 16);
        assert!(shm.write_bytes(1, 4, &[1, 0, 0, 0, 2, 0, 0, 0]));
        assert_eq!(
            shm.get_array::<u32>(1, 4, 2),
            Some(vec![u32::from_ne_bytes([1, 0, 0, 0]), u32::from_ne_bytes([2, 0, 0, 0])])
        );
        // unaligned reads are fine.
        assert_eq!(shm.get_array::<u8>(1, 5, 3), Some(vec![0, 0, 0]));
        assert_eq!(shm.get_array::<u32>(1, 12, 2), None);
        assert_eq!(shm.get_array::<u32>(1, u32::MAX, 1), None);
        assert_eq!(shm.get_array::<u32>(2, 0, 1), None);
        assert_eq!(shm.get_array::<u32>(0, 0, 1), None);
    }

    #[test]
    fn test_register_zero_is_ignored() {
        let mut shm = SharedMemory::default();
        shm.register(0, 16);
        assert!(!shm.write_result(0, 0, 1u32));
    }

    #[test]
    fn test_sized_result() {
        let mut shm = SharedMemory::default();
        shm.register(1, 12);
        assert_eq!(shm.read_result_size(1, 0), Some(0));
        assert!(shm.write_sized_result(1, 0, &[7i32, 8]));
        assert_eq!(shm.read_result_size(1, 0), Some(2));
        assert_eq!(shm.get_array::<i32>(1, 4, 2), Some(vec![7, 8]));
        assert!(!shm.write_sized_result(1, 4, &[7i32, 8]));
    }

    #[test]
    fn test_buckets() {
        let mut buckets = Buckets::default();
        assert!(!buckets.set_data(1, 0, b"abc"));
        assert!(buckets.set_size(1, 4));
        assert!(buckets.set_data(1, 1, b"abc"));
        assert!(!buckets.set_data(1, 2, b"abc"));
        assert_eq!(buckets.get(1), Some(&b"\0abc"[..]));
        assert!(!buckets.set_size(1, MAX_BUCKET_SIZE + 1));
        assert_eq!(buckets.get(1), Some(&b"\0abc"[..]));
        assert!(buckets.set_size(1, 0));
        assert_eq!(buckets.get(1), Some(&[][..]));
        buckets.remove(1);
        assert_eq!(buckets.get(1), None);
    }
}
