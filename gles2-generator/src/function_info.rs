use crate::handler::{StateSetKind, TypeHandler};

/// how the variable length data of a function reaches the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataTransfer {
    /// shared memory id and offset.
    Shm,
    /// inline, right after the fixed fields of the command.
    Immediate,
    /// a bucket filled by earlier commands.
    Bucket,
}

/// per function overrides. everything is optional, missing fields mean the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionInfo {
    pub r#type: Option<TypeHandler>,
    /// service side function that does the work instead of the driver.
    pub decoder_func: Option<&'static str>,
    /// driver function generated service tests expect instead of the function itself.
    pub gl_test_func: Option<&'static str>,
    /// replaces the argument list the command is derived from.
    pub cmd_args: Option<&'static str>,
    pub data_transfer_methods: Option<&'static [DataTransfer]>,
    /// `Features` flag that has to be on for the function to be available.
    pub extension_flag: Option<&'static str>,
    pub trace_level: Option<u8>,
    /// element type of a query result, defaults to the type the pointer points at.
    pub result: Option<&'static str>,
    pub state: Option<&'static str>,
    pub resource_type: Option<&'static str>,
    pub gen_func: Option<&'static str>,
    /// number of elements behind a pointer (per count for PUTn).
    pub count: Option<usize>,
    /// only update the cached state, the driver is called later.
    pub no_gl: bool,
    pub unit_test: Option<bool>,
}

impl FunctionInfo {
    pub const DEFAULT: Self = Self {
        r#type: None,
        decoder_func: None,
        gl_test_func: None,
        cmd_args: None,
        data_transfer_methods: None,
        extension_flag: None,
        trace_level: None,
        result: None,
        state: None,
        resource_type: None,
        gen_func: None,
        count: None,
        no_gl: false,
        unit_test: None,
    };

    pub fn handler(&self) -> TypeHandler {
        self.r#type.unwrap_or(TypeHandler::Default)
    }
}

const fn handler(r#type: TypeHandler) -> FunctionInfo {
    FunctionInfo {
        r#type: Some(r#type),
        ..FunctionInfo::DEFAULT
    }
}

const fn state_set(kind: StateSetKind, state: &'static str) -> FunctionInfo {
    FunctionInfo {
        r#type: Some(TypeHandler::StateSet(kind)),
        state: Some(state),
        ..FunctionInfo::DEFAULT
    }
}

const fn resource(r#type: TypeHandler, resource: &'static str) -> FunctionInfo {
    FunctionInfo {
        r#type: Some(r#type),
        resource_type: Some(resource),
        ..FunctionInfo::DEFAULT
    }
}

const fn bind(resource: &'static str, gen_func: &'static str) -> FunctionInfo {
    FunctionInfo {
        r#type: Some(TypeHandler::Bind),
        resource_type: Some(resource),
        gen_func: Some(gen_func),
        ..FunctionInfo::DEFAULT
    }
}

const fn uniform(r#type: TypeHandler, count: usize, decoder_func: &'static str) -> FunctionInfo {
    FunctionInfo {
        r#type: Some(r#type),
        count: Some(count),
        decoder_func: Some(decoder_func),
        unit_test: Some(false),
        ..FunctionInfo::DEFAULT
    }
}

const TRACED: FunctionInfo = FunctionInfo {
    trace_level: Some(1),
    ..FunctionInfo::DEFAULT
};

use StateSetKind::*;
use TypeHandler::*;

pub const FUNCTION_INFO: &[(&str, FunctionInfo)] = &[
    (
        "BindAttribLocation",
        FunctionInfo {
            r#type: Some(Custom),
            data_transfer_methods: Some(&[DataTransfer::Bucket]),
            ..FunctionInfo::DEFAULT
        },
    ),
    ("BindBuffer", bind("Buffer", "GenBuffers")),
    ("BindFramebuffer", bind("Framebuffer", "GenFramebuffers")),
    ("BindRenderbuffer", bind("Renderbuffer", "GenRenderbuffers")),
    ("BindTexture", bind("Texture", "GenTextures")),
    (
        "BlendBarrierKHR",
        FunctionInfo {
            extension_flag: Some("blend_equation_advanced"),
            ..FunctionInfo::DEFAULT
        },
    ),
    ("BlendColor", state_set(Normal, "BlendColor")),
    ("BlendEquation", state_set(RgbAlpha, "BlendEquation")),
    ("BlendEquationSeparate", state_set(Normal, "BlendEquation")),
    ("BlendFunc", state_set(RgbAlpha, "BlendFunc")),
    ("BlendFuncSeparate", state_set(Normal, "BlendFunc")),
    (
        "BufferData",
        FunctionInfo {
            r#type: Some(Custom),
            data_transfer_methods: Some(&[DataTransfer::Shm]),
            unit_test: Some(false),
            ..FunctionInfo::DEFAULT
        },
    ),
    (
        "BufferSubData",
        FunctionInfo {
            r#type: Some(Custom),
            data_transfer_methods: Some(&[DataTransfer::Shm]),
            unit_test: Some(false),
            ..FunctionInfo::DEFAULT
        },
    ),
    ("CheckFramebufferStatus", handler(Custom)),
    (
        "Clear",
        FunctionInfo {
            decoder_func: Some("DoClear"),
            gl_test_func: Some("Clear"),
            trace_level: Some(1),
            ..FunctionInfo::DEFAULT
        },
    ),
    ("ClearColor", state_set(Normal, "ClearColor")),
    ("ClearDepthf", state_set(Normal, "ClearDepthf")),
    ("ClearStencil", state_set(Normal, "ClearStencil")),
    ("ColorMask", state_set(Normal, "ColorMask")),
    (
        "CreateProgram",
        FunctionInfo {
            r#type: Some(Create),
            cmd_args: Some("uint32_t client_id"),
            resource_type: Some("Program"),
            ..FunctionInfo::DEFAULT
        },
    ),
    (
        "CreateShader",
        FunctionInfo {
            r#type: Some(Create),
            cmd_args: Some("GLenumShaderType type, uint32_t client_id"),
            resource_type: Some("Shader"),
            ..FunctionInfo::DEFAULT
        },
    ),
    ("CullFace", state_set(Normal, "CullFace")),
    ("DeleteBuffers", resource(DelN, "Buffer")),
    ("DeleteFramebuffers", resource(DelN, "Framebuffer")),
    ("DeleteProgram", resource(Delete, "Program")),
    ("DeleteRenderbuffers", resource(DelN, "Renderbuffer")),
    ("DeleteShader", resource(Delete, "Shader")),
    ("DeleteTextures", resource(DelN, "Texture")),
    ("DepthFunc", state_set(Normal, "DepthFunc")),
    (
        "DepthMask",
        FunctionInfo {
            no_gl: true,
            ..state_set(Normal, "DepthMask")
        },
    ),
    ("DepthRangef", state_set(Normal, "DepthRangef")),
    (
        "Disable",
        FunctionInfo {
            decoder_func: Some("DoDisable"),
            ..FunctionInfo::DEFAULT
        },
    ),
    (
        "DrawArrays",
        FunctionInfo {
            r#type: Some(Manual),
            trace_level: Some(1),
            ..FunctionInfo::DEFAULT
        },
    ),
    (
        "DrawElements",
        FunctionInfo {
            r#type: Some(Manual),
            trace_level: Some(1),
            ..FunctionInfo::DEFAULT
        },
    ),
    (
        "Enable",
        FunctionInfo {
            decoder_func: Some("DoEnable"),
            gl_test_func: Some("Enable"),
            ..FunctionInfo::DEFAULT
        },
    ),
    ("Finish", TRACED),
    ("Flush", TRACED),
    ("FrontFace", state_set(Normal, "FrontFace")),
    ("GenBuffers", resource(GenN, "Buffer")),
    ("GenFramebuffers", resource(GenN, "Framebuffer")),
    ("GenRenderbuffers", resource(GenN, "Renderbuffer")),
    ("GenTextures", resource(GenN, "Texture")),
    (
        "GetError",
        FunctionInfo {
            r#type: Some(Custom),
            unit_test: Some(false),
            ..FunctionInfo::DEFAULT
        },
    ),
    (
        "GetIntegerv",
        FunctionInfo {
            r#type: Some(GetN),
            decoder_func: Some("DoGetIntegerv"),
            unit_test: Some(false),
            ..FunctionInfo::DEFAULT
        },
    ),
    (
        "GetShaderiv",
        FunctionInfo {
            r#type: Some(GetN),
            result: Some("GLint"),
            ..FunctionInfo::DEFAULT
        },
    ),
    ("Hint", state_set(NamedParameter, "Hint")),
    ("IsBuffer", resource(Is, "Buffer")),
    (
        "IsEnabled",
        FunctionInfo {
            r#type: Some(Custom),
            unit_test: Some(false),
            ..FunctionInfo::DEFAULT
        },
    ),
    ("IsTexture", resource(Is, "Texture")),
    ("LineWidth", state_set(Normal, "LineWidth")),
    ("PolygonOffset", state_set(Normal, "PolygonOffset")),
    ("ReadPixels", handler(HandWritten)),
    ("ReleaseShaderCompiler", handler(Todo)),
    ("SampleCoverage", state_set(Normal, "SampleCoverage")),
    ("Scissor", state_set(Normal, "Scissor")),
    (
        "ShaderSource",
        FunctionInfo {
            r#type: Some(Custom),
            cmd_args: Some("GLidShader shader, const char* data, uint32_t data_size"),
            data_transfer_methods: Some(&[DataTransfer::Shm, DataTransfer::Bucket]),
            unit_test: Some(false),
            ..FunctionInfo::DEFAULT
        },
    ),
    ("StencilFunc", state_set(FrontBack, "StencilFunc")),
    ("StencilFuncSeparate", state_set(FrontBackSeparate, "StencilFunc")),
    ("StencilMask", state_set(FrontBack, "StencilMask")),
    ("StencilMaskSeparate", state_set(FrontBackSeparate, "StencilMask")),
    (
        "TexParameterfv",
        FunctionInfo {
            r#type: Some(Put),
            count: Some(1),
            decoder_func: Some("DoTexParameterfv"),
            gl_test_func: Some("TexParameterf"),
            ..FunctionInfo::DEFAULT
        },
    ),
    (
        "TexParameteriv",
        FunctionInfo {
            r#type: Some(Put),
            count: Some(1),
            decoder_func: Some("DoTexParameteriv"),
            gl_test_func: Some("TexParameteri"),
            ..FunctionInfo::DEFAULT
        },
    ),
    ("Uniform1f", uniform(PutXn, 1, "DoUniform1fv")),
    ("Uniform1fv", uniform(PutN, 1, "DoUniform1fv")),
    ("Uniform4f", uniform(PutXn, 4, "DoUniform4fv")),
    ("Uniform4fv", uniform(PutN, 4, "DoUniform4fv")),
    ("UniformMatrix4fv", uniform(PutN, 16, "DoUniformMatrix4fv")),
    (
        "UseProgram",
        FunctionInfo {
            decoder_func: Some("DoUseProgram"),
            ..FunctionInfo::DEFAULT
        },
    ),
    ("Viewport", state_set(Normal, "Viewport")),
];

#[test]
fn test_names_are_unique_and_sorted() {
    for pair in FUNCTION_INFO.windows(2) {
        assert!(pair[0].0 < pair[1].0, "{} >= {}", pair[0].0, pair[1].0);
    }
}
