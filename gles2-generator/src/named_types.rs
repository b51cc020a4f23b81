/// value space of an argument position, e.g. the targets a texture can be bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedType {
    pub name: String,
    pub r#type: String,
    pub valid: Vec<String>,
    pub invalid: Vec<String>,
    /// valid values will never grow (no extension adds to them).
    pub is_complete: bool,
}

impl NamedType {
    pub fn is_constant(&self) -> bool {
        self.is_complete && self.valid.len() == 1
    }

    pub fn constant_value(&self) -> Option<&str> {
        if self.is_constant() {
            Some(self.valid[0].as_str())
        } else {
            None
        }
    }

    pub fn valid_values(&self) -> &[String] {
        &self.valid
    }

    pub fn invalid_values(&self) -> &[String] {
        &self.invalid
    }
}

/// static description, turned into [`NamedType`] by the config.
#[derive(Debug)]
pub struct NamedTypeDef {
    pub name: &'static str,
    pub r#type: &'static str,
    pub valid: &'static [&'static str],
    pub invalid: &'static [&'static str],
    pub is_complete: bool,
}

const fn enum_type(
    name: &'static str,
    valid: &'static [&'static str],
    invalid: &'static [&'static str],
) -> NamedTypeDef {
    NamedTypeDef {
        name,
        r#type: "GLenum",
        valid,
        invalid,
        is_complete: false,
    }
}

const BLEND_FACTORS: &[&str] = &[
    "GL_ZERO",
    "GL_ONE",
    "GL_SRC_COLOR",
    "GL_ONE_MINUS_SRC_COLOR",
    "GL_DST_COLOR",
    "GL_ONE_MINUS_DST_COLOR",
    "GL_SRC_ALPHA",
    "GL_ONE_MINUS_SRC_ALPHA",
    "GL_DST_ALPHA",
    "GL_ONE_MINUS_DST_ALPHA",
    "GL_CONSTANT_COLOR",
    "GL_ONE_MINUS_CONSTANT_COLOR",
    "GL_CONSTANT_ALPHA",
    "GL_ONE_MINUS_CONSTANT_ALPHA",
];

const SRC_BLEND_FACTORS: &[&str] = &[
    "GL_ZERO",
    "GL_ONE",
    "GL_SRC_COLOR",
    "GL_ONE_MINUS_SRC_COLOR",
    "GL_DST_COLOR",
    "GL_ONE_MINUS_DST_COLOR",
    "GL_SRC_ALPHA",
    "GL_ONE_MINUS_SRC_ALPHA",
    "GL_DST_ALPHA",
    "GL_ONE_MINUS_DST_ALPHA",
    "GL_CONSTANT_COLOR",
    "GL_ONE_MINUS_CONSTANT_COLOR",
    "GL_CONSTANT_ALPHA",
    "GL_ONE_MINUS_CONSTANT_ALPHA",
    "GL_SRC_ALPHA_SATURATE",
];

pub const NAMED_TYPES: &[NamedTypeDef] = &[
    enum_type(
        "BufferTarget",
        &["GL_ARRAY_BUFFER", "GL_ELEMENT_ARRAY_BUFFER"],
        &["GL_RENDERBUFFER"],
    ),
    enum_type(
        "BufferUsage",
        &["GL_STREAM_DRAW", "GL_STATIC_DRAW", "GL_DYNAMIC_DRAW"],
        &["GL_STATIC_READ"],
    ),
    // filled in from the capability table
    enum_type("Capability", &[], &["GL_CLIP_PLANE0", "GL_POINT_SPRITE"]),
    enum_type(
        "CmpFunction",
        &[
            "GL_NEVER",
            "GL_LESS",
            "GL_EQUAL",
            "GL_LEQUAL",
            "GL_GREATER",
            "GL_NOTEQUAL",
            "GL_GEQUAL",
            "GL_ALWAYS",
        ],
        &[],
    ),
    enum_type(
        "DrawMode",
        &[
            "GL_POINTS",
            "GL_LINE_STRIP",
            "GL_LINE_LOOP",
            "GL_LINES",
            "GL_TRIANGLE_STRIP",
            "GL_TRIANGLE_FAN",
            "GL_TRIANGLES",
        ],
        &["GL_QUADS", "GL_POLYGON"],
    ),
    enum_type("DstBlendFactor", BLEND_FACTORS, &["GL_SRC_ALPHA_SATURATE"]),
    enum_type(
        "Equation",
        &["GL_FUNC_ADD", "GL_FUNC_SUBTRACT", "GL_FUNC_REVERSE_SUBTRACT"],
        &["GL_MIN", "GL_MAX"],
    ),
    enum_type("FaceMode", &["GL_CW", "GL_CCW"], &[]),
    enum_type("FaceType", &["GL_FRONT", "GL_BACK", "GL_FRONT_AND_BACK"], &[]),
    NamedTypeDef {
        name: "FalseOnly",
        r#type: "GLboolean",
        valid: &["false"],
        invalid: &["true"],
        is_complete: false,
    },
    NamedTypeDef {
        name: "FrameBufferTarget",
        r#type: "GLenum",
        valid: &["GL_FRAMEBUFFER"],
        invalid: &["GL_DRAW_FRAMEBUFFER", "GL_READ_FRAMEBUFFER"],
        is_complete: true,
    },
    // filled in from the state and capability tables
    enum_type(
        "GLState",
        &[
            "GL_MAX_TEXTURE_SIZE",
            "GL_MAX_VIEWPORT_DIMS",
            "GL_MAX_VERTEX_ATTRIBS",
            "GL_MAX_TEXTURE_IMAGE_UNITS",
        ],
        &["GL_FOG_HINT"],
    ),
    enum_type(
        "HintMode",
        &["GL_FASTEST", "GL_NICEST", "GL_DONT_CARE"],
        &[],
    ),
    // one valid value, but extensions may add more.
    enum_type(
        "HintTarget",
        &["GL_GENERATE_MIPMAP_HINT"],
        &["GL_PERSPECTIVE_CORRECTION_HINT"],
    ),
    enum_type(
        "IndexType",
        &["GL_UNSIGNED_BYTE", "GL_UNSIGNED_SHORT"],
        &["GL_UNSIGNED_INT", "GL_INT"],
    ),
    enum_type(
        "PixelStore",
        &["GL_PACK_ALIGNMENT", "GL_UNPACK_ALIGNMENT"],
        &["GL_PACK_SWAP_BYTES", "GL_UNPACK_SWAP_BYTES"],
    ),
    NamedTypeDef {
        name: "PixelStoreAlignment",
        r#type: "GLint",
        valid: &["1", "2", "4", "8"],
        invalid: &["3", "9"],
        is_complete: false,
    },
    enum_type(
        "PixelType",
        &[
            "GL_UNSIGNED_BYTE",
            "GL_UNSIGNED_SHORT_5_6_5",
            "GL_UNSIGNED_SHORT_4_4_4_4",
            "GL_UNSIGNED_SHORT_5_5_5_1",
        ],
        &["GL_SHORT", "GL_INT"],
    ),
    enum_type(
        "ReadPixelFormat",
        &["GL_ALPHA", "GL_RGB", "GL_RGBA"],
        &[],
    ),
    enum_type(
        "RenderBufferFormat",
        &[
            "GL_RGBA4",
            "GL_RGB565",
            "GL_RGB5_A1",
            "GL_DEPTH_COMPONENT16",
            "GL_STENCIL_INDEX8",
        ],
        &[],
    ),
    NamedTypeDef {
        name: "RenderBufferTarget",
        r#type: "GLenum",
        valid: &["GL_RENDERBUFFER"],
        invalid: &["GL_FRAMEBUFFER"],
        is_complete: true,
    },
    enum_type(
        "ShaderParameter",
        &[
            "GL_SHADER_TYPE",
            "GL_DELETE_STATUS",
            "GL_COMPILE_STATUS",
            "GL_INFO_LOG_LENGTH",
            "GL_SHADER_SOURCE_LENGTH",
        ],
        &[],
    ),
    enum_type(
        "ShaderType",
        &["GL_VERTEX_SHADER", "GL_FRAGMENT_SHADER"],
        &["GL_GEOMETRY_SHADER"],
    ),
    enum_type("SrcBlendFactor", SRC_BLEND_FACTORS, &["GL_GREATER"]),
    enum_type(
        "TextureBindTarget",
        &["GL_TEXTURE_2D", "GL_TEXTURE_CUBE_MAP"],
        &["GL_TEXTURE_1D", "GL_TEXTURE_3D"],
    ),
    enum_type(
        "TextureParameter",
        &[
            "GL_TEXTURE_MAG_FILTER",
            "GL_TEXTURE_MIN_FILTER",
            "GL_TEXTURE_WRAP_S",
            "GL_TEXTURE_WRAP_T",
        ],
        &["GL_GENERATE_MIPMAP"],
    ),
];

impl NamedTypeDef {
    pub fn to_named_type(&self) -> NamedType {
        NamedType {
            name: self.name.to_string(),
            r#type: self.r#type.to_string(),
            valid: self.valid.iter().map(|v| v.to_string()).collect(),
            invalid: self.invalid.iter().map(|v| v.to_string()).collect(),
            is_complete: self.is_complete,
        }
    }
}

#[cfg(test)]
fn find(name: &str) -> NamedType {
    NAMED_TYPES
        .iter()
        .find(|def| def.name == name)
        .map(NamedTypeDef::to_named_type)
        .unwrap()
}

#[test]
fn test_constant_requires_complete_and_single_value() {
    assert!(find("FrameBufferTarget").is_constant());
    assert_eq!(
        find("RenderBufferTarget").constant_value(),
        Some("GL_RENDERBUFFER")
    );
    // single value, but not complete.
    assert!(!find("HintTarget").is_constant());
    assert!(!find("TextureBindTarget").is_constant());
}

#[test]
fn test_names_are_unique() {
    for (i, a) in NAMED_TYPES.iter().enumerate() {
        for b in NAMED_TYPES[i + 1..].iter() {
            assert_ne!(a.name, b.name);
        }
    }
}
