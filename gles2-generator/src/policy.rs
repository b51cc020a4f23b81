//! what happens when a check in generated code fails.
//!
//! a failure either queues a GL error and lets the command succeed, or rejects the command
//! itself. the second kind stops decoding of the whole stream, so everything that can end up
//! there is listed in [`failure`] and nowhere else.

#![allow(clippy::write_with_newline)] // this lint is dumb

use std::{fmt, io};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    /// enum argument outside its named type.
    InvalidEnum,
    /// int argument outside its named type.
    InvalidIntValue,
    /// bool argument outside its named type.
    InvalidBool,
    NegativeSize,
    /// negative size that is also used to compute a payload length.
    NegativeSizeNotNegative,
    UnknownResource,
    /// bind of an id that was never generated while resources are not generated on bind.
    UnknownBindResource,
    NullSharedMemory,
    PayloadTooSmall,
    SizeOverflow,
    MissingBucket,
    InvalidString,
    ResultNotEmpty,
    ClientIdInUse,
    /// a batch of ids to create holds 0 or the same id twice.
    ZeroOrDuplicateId,
    FunctionNotAvailable,
    NotImplemented,
}

/// GL errors generated code raises. displays as the name of the generated constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlError {
    InvalidEnum,
    InvalidValue,
    InvalidOperation,
}

impl fmt::Display for GlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::InvalidEnum => "INVALID_ENUM",
            Self::InvalidValue => "INVALID_VALUE",
            Self::InvalidOperation => "INVALID_OPERATION",
        })
    }
}

/// the variants of `gles2::Error` a check can reject a command with. displays as the variant
/// name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    OutOfBounds,
    InvalidArguments,
    InvalidSize,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::OutOfBounds => "OutOfBounds",
            Self::InvalidArguments => "InvalidArguments",
            Self::InvalidSize => "InvalidSize",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// queue the GL error and report success.
    Gl(GlError),
    /// reject the command.
    Decode(Rejection),
}

pub fn failure(check: Check) -> Failure {
    use Check::*;
    match check {
        InvalidEnum => Failure::Gl(GlError::InvalidEnum),
        InvalidIntValue => Failure::Gl(GlError::InvalidValue),
        InvalidBool => Failure::Gl(GlError::InvalidValue),
        NegativeSize => Failure::Gl(GlError::InvalidValue),
        NegativeSizeNotNegative => Failure::Decode(Rejection::OutOfBounds),
        UnknownResource => Failure::Gl(GlError::InvalidValue),
        UnknownBindResource => Failure::Gl(GlError::InvalidOperation),
        NullSharedMemory => Failure::Decode(Rejection::OutOfBounds),
        PayloadTooSmall => Failure::Decode(Rejection::OutOfBounds),
        SizeOverflow => Failure::Decode(Rejection::OutOfBounds),
        MissingBucket => Failure::Decode(Rejection::InvalidArguments),
        InvalidString => Failure::Decode(Rejection::InvalidArguments),
        ResultNotEmpty => Failure::Decode(Rejection::InvalidArguments),
        ClientIdInUse => Failure::Decode(Rejection::InvalidArguments),
        ZeroOrDuplicateId => Failure::Decode(Rejection::InvalidArguments),
        FunctionNotAvailable => Failure::Gl(GlError::InvalidOperation),
        NotImplemented => Failure::Gl(GlError::InvalidOperation),
    }
}

/// the client can only ever raise GL errors; it never sees a malformed command.
pub fn client_failure(check: Check) -> Option<GlError> {
    match check {
        Check::InvalidEnum => Some(GlError::InvalidEnum),
        Check::NegativeSize | Check::NegativeSizeNotNegative | Check::PayloadTooSmall => {
            Some(GlError::InvalidValue)
        }
        _ => None,
    }
}

/// writes the body of the failure branch of a service side check.
pub fn emit_failure<W: io::Write>(
    w: &mut W,
    indent: &str,
    check: Check,
    gl_name: &str,
    msg: &str,
) -> io::Result<()> {
    match failure(check) {
        Failure::Gl(code) => {
            write!(w, "{indent}self.set_gl_error({code}, \"{gl_name}\", \"{msg}\");\n")?;
            write!(w, "{indent}return Ok(());\n")
        }
        Failure::Decode(rejection) => write!(w, "{indent}return Err(Error::{rejection});\n"),
    }
}

/// like [`emit_failure`], for a failure that ends the function body.
pub fn emit_final_failure<W: io::Write>(
    w: &mut W,
    indent: &str,
    check: Check,
    gl_name: &str,
    msg: &str,
) -> io::Result<()> {
    match failure(check) {
        Failure::Gl(code) => {
            write!(w, "{indent}self.set_gl_error({code}, \"{gl_name}\", \"{msg}\");\n")?;
            write!(w, "{indent}Ok(())\n")
        }
        Failure::Decode(rejection) => write!(w, "{indent}Err(Error::{rejection})\n"),
    }
}

/// writes the body of the failure branch of a client side check. `ret` is what the client
/// function returns on failure, if it returns anything.
pub fn emit_client_failure<W: io::Write>(
    w: &mut W,
    indent: &str,
    check: Check,
    gl_name: &str,
    msg: &str,
    ret: Option<&str>,
) -> anyhow::Result<()> {
    let Some(code) = client_failure(check) else {
        anyhow::bail!("{check:?} can not fail on the client");
    };
    write!(w, "{indent}self.set_gl_error({code}, \"{gl_name}\", \"{msg}\");\n")?;
    match ret {
        Some(ret) => write!(w, "{indent}return {ret};\n")?,
        None => write!(w, "{indent}return;\n")?,
    }
    Ok(())
}

#[test]
fn test_sizes_used_for_payloads_are_fatal() {
    assert_eq!(failure(Check::NegativeSize), Failure::Gl(GlError::InvalidValue));
    assert_eq!(
        failure(Check::NegativeSizeNotNegative),
        Failure::Decode(Rejection::OutOfBounds)
    );
    assert_eq!(
        failure(Check::ZeroOrDuplicateId),
        Failure::Decode(Rejection::InvalidArguments)
    );
}

#[test]
fn test_emit_failure() {
    let mut out = Vec::new();
    emit_failure(&mut out, "    ", Check::InvalidEnum, "glCullFace", "mode").unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "    self.set_gl_error(INVALID_ENUM, \"glCullFace\", \"mode\");\n    return Ok(());\n"
    );

    let mut out = Vec::new();
    emit_failure(&mut out, "", Check::PayloadTooSmall, "glGenTextures", "").unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "return Err(Error::OutOfBounds);\n");
}

#[test]
fn test_emit_final_failure() {
    let mut out = Vec::new();
    emit_final_failure(&mut out, "", Check::NotImplemented, "glReleaseShaderCompiler", "x").unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "self.set_gl_error(INVALID_OPERATION, \"glReleaseShaderCompiler\", \"x\");\nOk(())\n"
    );
}
