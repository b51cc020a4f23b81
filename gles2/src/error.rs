use crate::gl::*;

/// why a command could not be decoded. decoding stops at the first of these, unlike GL errors
/// which are queued and decoding goes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("out of bounds")]
    OutOfBounds,
    #[error("invalid arguments")]
    InvalidArguments,
    #[error("invalid command size")]
    InvalidSize,
    #[error("unknown command {0}")]
    UnknownCommand(u32),
}

const ERRORS: &[GLenum] = &[
    INVALID_ENUM,
    INVALID_VALUE,
    INVALID_OPERATION,
    OUT_OF_MEMORY,
    INVALID_FRAMEBUFFER_OPERATION,
];

/// pending GL errors, one sticky bit per error.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ErrorState {
    bits: u32,
}

impl ErrorState {
    pub fn set(&mut self, code: GLenum) {
        match ERRORS.iter().position(|&error| error == code) {
            Some(bit) => self.bits |= 1 << bit,
            None => log::warn!("unknown GL error {code:#06x}"),
        }
    }

    /// pending errors in the order of [`ERRORS`], `NO_ERROR` once all are taken.
    pub fn take(&mut self) -> GLenum {
        if self.bits == 0 {
            return NO_ERROR;
        }
        let bit = self.bits.trailing_zeros();
        self.bits &= !(1 << bit);
        ERRORS[bit as usize]
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }
}

#[test]
fn test_error_state() {
    let mut errors = ErrorState::default();
    assert_eq!(errors.take(), NO_ERROR);

    errors.set(INVALID_OPERATION);
    errors.set(INVALID_ENUM);
    errors.set(INVALID_OPERATION);
    assert!(!errors.is_empty());
    assert_eq!(errors.take(), INVALID_ENUM);
    assert_eq!(errors.take(), INVALID_OPERATION);
    assert_eq!(errors.take(), NO_ERROR);
    assert!(errors.is_empty());

    errors.set(0x1234);
    assert!(errors.is_empty());
}
