//! GL state the decoder keeps a copy of, so that queries do not reach the driver.

use crate::gl::*;

include!(concat!(env!("OUT_DIR"), "/context_state_generated.rs"));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_capability() {
        let mut state = ContextState::default();
        assert_eq!(state.is_capability_enabled(DEPTH_TEST), Some(false));
        assert!(state.set_capability(DEPTH_TEST, true));
        assert!(state.clear_state_dirty);
        assert_eq!(state.is_capability_enabled(DEPTH_TEST), Some(true));
        // already on.
        assert!(!state.set_capability(DEPTH_TEST, true));
        assert!(!state.set_capability(TEXTURE_2D, true));
        assert_eq!(state.is_capability_enabled(TEXTURE_2D), None);
    }

    #[test]
    fn test_get_state_iv() {
        let mut state = ContextState::default();
        assert_eq!(state.get_state_iv(DEPTH_WRITEMASK), Some(vec![1]));
        state.set_capability(BLEND, true);
        assert_eq!(state.get_state_iv(BLEND), Some(vec![1]));
        assert_eq!(state.get_state_iv(TEXTURE_2D), None);
        assert_eq!(num_values_returned(DEPTH_WRITEMASK), Some(1));
        assert_eq!(num_values_returned(TEXTURE_2D), None);
    }
}
