//! client ids, and what they map to on the service.

use nohash::{NoHashMap, NoHashSet};
use rangealloc::RangeAlloc;

use crate::gl::GLuint;

/// client id to service id of one kind of resource.
#[derive(Debug, Default)]
pub struct ResourceMap {
    ids: NoHashMap<GLuint, GLuint>,
}

impl ResourceMap {
    pub fn get(&self, client_id: GLuint) -> Option<GLuint> {
        self.ids.get(&client_id).copied()
    }

    pub fn contains(&self, client_id: GLuint) -> bool {
        self.ids.contains_key(&client_id)
    }

    pub fn insert(&mut self, client_id: GLuint, service_id: GLuint) {
        self.ids.insert(client_id, service_id);
    }

    pub fn remove(&mut self, client_id: GLuint) -> Option<GLuint> {
        self.ids.remove(&client_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct ResourceMaps {
    pub buffers: ResourceMap,
    pub framebuffers: ResourceMap,
    pub programs: ResourceMap,
    pub renderbuffers: ResourceMap,
    pub shaders: ResourceMap,
    pub textures: ResourceMap,
}

/// true if a batch of client ids can not all be created, because one of them is 0 or
/// repeats.
pub fn has_zero_or_duplicate(ids: &[GLuint]) -> bool {
    let mut seen = NoHashSet::default();
    ids.iter().any(|&id| id == 0 || !seen.insert(id))
}

/// hands out ids that are not in use, reusing freed ones. 0 is never handed out.
#[derive(Debug)]
pub struct IdAllocator {
    free: RangeAlloc<GLuint>,
    /// every id in use, and whether it was taken out of `free`.
    used: NoHashMap<GLuint, bool>,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self {
            free: RangeAlloc::new(1..GLuint::MAX),
            used: NoHashMap::default(),
        }
    }
}

impl IdAllocator {
    /// 0 once every id is taken.
    pub fn allocate(&mut self) -> GLuint {
        loop {
            let Ok(range) = self.free.allocate(1) else {
                log::error!("out of client ids");
                return 0;
            };
            // ids the client marked itself still sit in `free`, they are skipped here.
            if self.used.insert(range.start, true).is_none() {
                return range.start;
            }
        }
    }

    /// ids the client made up itself, e.g. by binding a name it never generated.
    pub fn mark_as_used(&mut self, id: GLuint) {
        if id != 0 {
            self.used.entry(id).or_insert(false);
        }
    }

    pub fn free(&mut self, id: GLuint) {
        if let Some(true) = self.used.remove(&id) {
            self.free.deallocate(id..id + 1);
        }
    }

    pub fn in_use(&self, id: GLuint) -> bool {
        self.used.contains_key(&id)
    }
}

#[derive(Debug, Default)]
pub struct ClientIds {
    pub buffers: IdAllocator,
    pub framebuffers: IdAllocator,
    pub programs: IdAllocator,
    pub renderbuffers: IdAllocator,
    pub shaders: IdAllocator,
    pub textures: IdAllocator,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_reuses_freed() {
        let mut ids = IdAllocator::default();
        assert_eq!(ids.allocate(), 1);
        assert_eq!(ids.allocate(), 2);
        assert_eq!(ids.allocate(), 3);
        ids.free(2);
        assert!(!ids.in_use(2));
        assert_eq!(ids.allocate(), 2);
        ids.mark_as_used(4);
        assert_eq!(ids.allocate(), 5);
        ids.mark_as_used(0);
        assert!(!ids.in_use(0));
    }

    #[test]
    fn test_free_marked_id() {
        let mut ids = IdAllocator::default();
        ids.mark_as_used(1);
        ids.free(1);
        assert!(!ids.in_use(1));
        assert_eq!(ids.allocate(), 1);
        ids.free(1);
        ids.free(1);
        assert_eq!(ids.allocate(), 1);
        assert_eq!(ids.allocate(), 2);
    }

    #[test]
    fn test_has_zero_or_duplicate() {
        assert!(!has_zero_or_duplicate(&[]));
        assert!(!has_zero_or_duplicate(&[501, 502]));
        assert!(has_zero_or_duplicate(&[501, 501]));
        assert!(has_zero_or_duplicate(&[0]));
    }

    #[test]
    fn test_resource_map() {
        let mut map = ResourceMap::default();
        assert!(map.is_empty());
        map.insert(1, 100);
        assert!(map.contains(1));
        assert_eq!(map.get(1), Some(100));
        assert_eq!(map.remove(1), Some(100));
        assert_eq!(map.remove(1), None);
        assert_eq!(map.len(), 0);
    }
}
