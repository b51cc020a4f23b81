use std::collections::{HashMap, VecDeque};
use std::mem;

use crate::gl::*;

include!(concat!(env!("OUT_DIR"), "/driver_generated.rs"));

/// a [`Driver`] that only writes down what it is asked to do.
///
/// calls are recorded as `name(args)` with slices the driver writes to shown as `out[len]`.
/// return values come from [`RecordingDriver::queue_result`] and default to 0.
#[derive(Debug, Default)]
pub struct RecordingDriver {
    calls: Vec<String>,
    results: HashMap<&'static str, VecDeque<u32>>,
    last_id: GLuint,
}

impl RecordingDriver {
    /// service ids handed out by gen functions start above this.
    pub const FIRST_SERVICE_ID: GLuint = 1000;

    fn record(&mut self, call: String) {
        log::trace!("{call}");
        self.calls.push(call);
    }

    pub fn take_calls(&mut self) -> Vec<String> {
        mem::take(&mut self.calls)
    }

    pub fn queue_result(&mut self, name: &'static str, value: u32) {
        self.results.entry(name).or_default().push_back(value);
    }

    fn take_result(&mut self, name: &str) -> u32 {
        self.results
            .get_mut(name)
            .and_then(VecDeque::pop_front)
            .unwrap_or(0)
    }

    fn next_service_id(&mut self) -> GLuint {
        self.last_id += 1;
        Self::FIRST_SERVICE_ID + self.last_id
    }
}

include!(concat!(env!("OUT_DIR"), "/driver_mock_generated.rs"));
