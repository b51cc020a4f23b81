use std::io;

/// a primitive type that may appear in a function signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlType {
    pub name: &'static str,
    /// what generated rust code spells the type as.
    pub rust: &'static str,
    /// the 4-byte type the value travels as inside a command.
    pub wire: &'static str,
}

const fn gl(name: &'static str, wire: &'static str) -> GlType {
    GlType {
        name,
        rust: name,
        wire,
    }
}

pub const GL_TYPES: &[GlType] = &[
    gl("GLbitfield", "u32"),
    gl("GLboolean", "u32"),
    gl("GLbyte", "i32"),
    gl("GLchar", "i32"),
    gl("GLclampf", "f32"),
    gl("GLenum", "u32"),
    gl("GLfloat", "f32"),
    gl("GLint", "i32"),
    // pointer sized, narrowed on the wire.
    gl("GLintptr", "i32"),
    gl("GLshort", "i32"),
    gl("GLsizei", "i32"),
    gl("GLsizeiptr", "i32"),
    gl("GLubyte", "u32"),
    gl("GLuint", "u32"),
    gl("GLushort", "u32"),
    GlType {
        name: "int32_t",
        rust: "i32",
        wire: "i32",
    },
    GlType {
        name: "uint32_t",
        rust: "u32",
        wire: "u32",
    },
];

pub fn find_gl_type(name: &str) -> Option<&'static GlType> {
    GL_TYPES.iter().find(|t| t.name == name)
}

/// element size in bytes of a type that pointer arguments point at.
pub fn element_size(pointee: &str) -> Option<usize> {
    match pointee {
        "void" | "char" | "GLchar" | "GLubyte" | "GLbyte" | "GLboolean" => Some(1),
        "GLshort" | "GLushort" => Some(2),
        "GLfloat" | "GLint" | "GLuint" | "GLenum" | "GLsizei" | "GLclampf" => Some(4),
        _ => None,
    }
}

/// rust element type used for slices of `pointee`.
pub fn element_rust_type(pointee: &str) -> Option<&'static str> {
    match pointee {
        "void" | "char" => Some("u8"),
        other => find_gl_type(other).map(|t| t.rust),
    }
}

const GL_TYPES_RS: &str = "pub type GLbitfield = u32;
pub type GLboolean = u8;
pub type GLbyte = i8;
pub type GLchar = i8;
pub type GLclampf = f32;
pub type GLenum = u32;
pub type GLfloat = f32;
pub type GLint = i32;
pub type GLintptr = isize;
pub type GLshort = i16;
pub type GLsizei = i32;
pub type GLsizeiptr = isize;
pub type GLubyte = u8;
pub type GLuint = u32;
pub type GLushort = u16;
";

pub fn emit_types<W: io::Write>(w: &mut W) -> anyhow::Result<()> {
    w.write_all(GL_TYPES_RS.as_bytes())?;
    Ok(())
}

#[test]
fn test_every_type_is_emitted() {
    for t in GL_TYPES.iter().filter(|t| t.name.starts_with("GL")) {
        assert!(
            GL_TYPES_RS.contains(&format!("pub type {} =", t.name)),
            "{} is not emitted",
            t.name
        );
    }
}

#[test]
fn test_pointer_sized_types_are_narrowed() {
    assert_eq!(find_gl_type("GLintptr").map(|t| t.wire), Some("i32"));
    assert_eq!(find_gl_type("GLsizeiptr").map(|t| t.wire), Some("i32"));
    assert!(find_gl_type("GLdouble").is_none());
}
