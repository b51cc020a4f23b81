//! service side cached state.
//!
//! every state setter function names one entry of [`STATES`]; the decoder keeps a copy of the
//! items and skips calls that would not change anything.

#[derive(Debug)]
pub struct StateItem {
    pub name: &'static str,
    pub r#type: &'static str,
    /// pname a query for this item goes through. items sharing a pname are returned together.
    pub r#enum: &'static str,
    pub default: &'static str,
}

#[derive(Debug)]
pub struct StateDef {
    pub name: &'static str,
    /// flag raised whenever the state changes.
    pub state_flag: Option<&'static str>,
    pub items: &'static [StateItem],
}

#[derive(Debug)]
pub struct CapabilityDef {
    pub name: &'static str,
    pub default: bool,
    pub state_flag: Option<&'static str>,
}

const fn item(
    name: &'static str,
    r#type: &'static str,
    r#enum: &'static str,
    default: &'static str,
) -> StateItem {
    StateItem {
        name,
        r#type,
        r#enum,
        default,
    }
}

pub const STATES: &[StateDef] = &[
    StateDef {
        name: "BlendColor",
        state_flag: None,
        items: &[
            item("blend_color_red", "GLfloat", "GL_BLEND_COLOR", "0.0"),
            item("blend_color_green", "GLfloat", "GL_BLEND_COLOR", "0.0"),
            item("blend_color_blue", "GLfloat", "GL_BLEND_COLOR", "0.0"),
            item("blend_color_alpha", "GLfloat", "GL_BLEND_COLOR", "0.0"),
        ],
    },
    StateDef {
        name: "BlendEquation",
        state_flag: None,
        items: &[
            item("blend_equation_rgb", "GLenum", "GL_BLEND_EQUATION_RGB", "GL_FUNC_ADD"),
            item("blend_equation_alpha", "GLenum", "GL_BLEND_EQUATION_ALPHA", "GL_FUNC_ADD"),
        ],
    },
    StateDef {
        name: "BlendFunc",
        state_flag: None,
        items: &[
            item("blend_source_rgb", "GLenum", "GL_BLEND_SRC_RGB", "GL_ONE"),
            item("blend_dest_rgb", "GLenum", "GL_BLEND_DST_RGB", "GL_ZERO"),
            item("blend_source_alpha", "GLenum", "GL_BLEND_SRC_ALPHA", "GL_ONE"),
            item("blend_dest_alpha", "GLenum", "GL_BLEND_DST_ALPHA", "GL_ZERO"),
        ],
    },
    StateDef {
        name: "ClearColor",
        state_flag: None,
        items: &[
            item("color_clear_red", "GLfloat", "GL_COLOR_CLEAR_VALUE", "0.0"),
            item("color_clear_green", "GLfloat", "GL_COLOR_CLEAR_VALUE", "0.0"),
            item("color_clear_blue", "GLfloat", "GL_COLOR_CLEAR_VALUE", "0.0"),
            item("color_clear_alpha", "GLfloat", "GL_COLOR_CLEAR_VALUE", "0.0"),
        ],
    },
    StateDef {
        name: "ClearDepthf",
        state_flag: None,
        items: &[item("depth_clear", "GLclampf", "GL_DEPTH_CLEAR_VALUE", "1.0")],
    },
    StateDef {
        name: "ClearStencil",
        state_flag: None,
        items: &[item("stencil_clear", "GLint", "GL_STENCIL_CLEAR_VALUE", "0")],
    },
    StateDef {
        name: "ColorMask",
        state_flag: Some("clear_state_dirty"),
        items: &[
            item("color_mask_red", "GLboolean", "GL_COLOR_WRITEMASK", "GL_TRUE"),
            item("color_mask_green", "GLboolean", "GL_COLOR_WRITEMASK", "GL_TRUE"),
            item("color_mask_blue", "GLboolean", "GL_COLOR_WRITEMASK", "GL_TRUE"),
            item("color_mask_alpha", "GLboolean", "GL_COLOR_WRITEMASK", "GL_TRUE"),
        ],
    },
    StateDef {
        name: "CullFace",
        state_flag: None,
        items: &[item("cull_mode", "GLenum", "GL_CULL_FACE_MODE", "GL_BACK")],
    },
    StateDef {
        name: "DepthFunc",
        state_flag: None,
        items: &[item("depth_func", "GLenum", "GL_DEPTH_FUNC", "GL_LESS")],
    },
    StateDef {
        name: "DepthMask",
        state_flag: Some("clear_state_dirty"),
        items: &[item("depth_mask", "GLboolean", "GL_DEPTH_WRITEMASK", "GL_TRUE")],
    },
    StateDef {
        name: "DepthRangef",
        state_flag: None,
        items: &[
            item("z_near", "GLclampf", "GL_DEPTH_RANGE", "0.0"),
            item("z_far", "GLclampf", "GL_DEPTH_RANGE", "1.0"),
        ],
    },
    StateDef {
        name: "FrontFace",
        state_flag: None,
        items: &[item("front_face", "GLenum", "GL_FRONT_FACE", "GL_CCW")],
    },
    StateDef {
        name: "Hint",
        state_flag: None,
        items: &[item(
            "hint_generate_mipmap",
            "GLenum",
            "GL_GENERATE_MIPMAP_HINT",
            "GL_DONT_CARE",
        )],
    },
    StateDef {
        name: "LineWidth",
        state_flag: None,
        items: &[item("line_width", "GLfloat", "GL_LINE_WIDTH", "1.0")],
    },
    StateDef {
        name: "PolygonOffset",
        state_flag: None,
        items: &[
            item("polygon_offset_factor", "GLfloat", "GL_POLYGON_OFFSET_FACTOR", "0.0"),
            item("polygon_offset_units", "GLfloat", "GL_POLYGON_OFFSET_UNITS", "0.0"),
        ],
    },
    StateDef {
        name: "SampleCoverage",
        state_flag: None,
        items: &[
            item("sample_coverage_value", "GLclampf", "GL_SAMPLE_COVERAGE_VALUE", "1.0"),
            item("sample_coverage_invert", "GLboolean", "GL_SAMPLE_COVERAGE_INVERT", "GL_FALSE"),
        ],
    },
    StateDef {
        name: "Scissor",
        state_flag: None,
        items: &[
            item("scissor_x", "GLint", "GL_SCISSOR_BOX", "0"),
            item("scissor_y", "GLint", "GL_SCISSOR_BOX", "0"),
            item("scissor_width", "GLsizei", "GL_SCISSOR_BOX", "0"),
            item("scissor_height", "GLsizei", "GL_SCISSOR_BOX", "0"),
        ],
    },
    StateDef {
        name: "StencilFunc",
        state_flag: None,
        items: &[
            item("stencil_front_func", "GLenum", "GL_STENCIL_FUNC", "GL_ALWAYS"),
            item("stencil_front_ref", "GLint", "GL_STENCIL_REF", "0"),
            item("stencil_front_mask", "GLuint", "GL_STENCIL_VALUE_MASK", "0xFFFFFFFF"),
            item("stencil_back_func", "GLenum", "GL_STENCIL_BACK_FUNC", "GL_ALWAYS"),
            item("stencil_back_ref", "GLint", "GL_STENCIL_BACK_REF", "0"),
            item("stencil_back_mask", "GLuint", "GL_STENCIL_BACK_VALUE_MASK", "0xFFFFFFFF"),
        ],
    },
    StateDef {
        name: "StencilMask",
        state_flag: Some("clear_state_dirty"),
        items: &[
            item("stencil_front_writemask", "GLuint", "GL_STENCIL_WRITEMASK", "0xFFFFFFFF"),
            item("stencil_back_writemask", "GLuint", "GL_STENCIL_BACK_WRITEMASK", "0xFFFFFFFF"),
        ],
    },
    StateDef {
        name: "Viewport",
        state_flag: None,
        items: &[
            item("viewport_x", "GLint", "GL_VIEWPORT", "0"),
            item("viewport_y", "GLint", "GL_VIEWPORT", "0"),
            item("viewport_width", "GLsizei", "GL_VIEWPORT", "0"),
            item("viewport_height", "GLsizei", "GL_VIEWPORT", "0"),
        ],
    },
];

const fn cap(name: &'static str, default: bool) -> CapabilityDef {
    CapabilityDef {
        name,
        default,
        state_flag: None,
    }
}

pub const CAPABILITIES: &[CapabilityDef] = &[
    cap("blend", false),
    cap("cull_face", false),
    CapabilityDef {
        name: "depth_test",
        default: false,
        state_flag: Some("clear_state_dirty"),
    },
    cap("dither", true),
    cap("polygon_offset_fill", false),
    cap("sample_alpha_to_coverage", false),
    cap("sample_coverage", false),
    cap("scissor_test", false),
    CapabilityDef {
        name: "stencil_test",
        default: false,
        state_flag: Some("clear_state_dirty"),
    },
];

/// pnames that are not cached but still need a result size.
pub const QUERY_ONLY: &[(&str, usize)] = &[
    ("GL_MAX_TEXTURE_SIZE", 1),
    ("GL_MAX_VIEWPORT_DIMS", 2),
    ("GL_MAX_VERTEX_ATTRIBS", 1),
    ("GL_MAX_TEXTURE_IMAGE_UNITS", 1),
    ("GL_SHADER_TYPE", 1),
    ("GL_DELETE_STATUS", 1),
    ("GL_COMPILE_STATUS", 1),
    ("GL_INFO_LOG_LENGTH", 1),
    ("GL_SHADER_SOURCE_LENGTH", 1),
];

impl CapabilityDef {
    pub fn gl_enum(&self) -> String {
        format!("GL_{}", self.name.to_uppercase())
    }
}

pub fn find_state(name: &str) -> Option<&'static StateDef> {
    STATES.iter().find(|state| state.name == name)
}

#[test]
fn test_capability_enum() {
    assert_eq!(CAPABILITIES[0].gl_enum(), "GL_BLEND");
    assert_eq!(CAPABILITIES[4].gl_enum(), "GL_POLYGON_OFFSET_FILL");
}

#[test]
fn test_items_sharing_an_enum_are_adjacent() {
    for state in STATES.iter() {
        for (i, a) in state.items.iter().enumerate() {
            let rest = &state.items[i + 1..];
            let Some(pos) = rest.iter().position(|b| b.r#enum == a.r#enum) else {
                continue;
            };
            assert_eq!(pos, 0, "{} items for {} are split", state.name, a.r#enum);
        }
    }
}
