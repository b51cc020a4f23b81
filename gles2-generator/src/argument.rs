#![allow(clippy::write_with_newline)] // this lint is dumb

use std::io;

use anyhow::{Context as _, bail};

use crate::config::Config;
use crate::gl_types::{element_rust_type, find_gl_type};
use crate::named_types::NamedType;
use crate::names::{const_name, is_numeric_token, resource_field, rust_ident, screaming_snake_case, snake_case};
use crate::policy::{Check, emit_client_failure, emit_failure};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgKind {
    /// passed through as is.
    Value,
    /// data in shared memory, referenced by id and offset.
    Pointer,
    /// data inlined after the command.
    ImmediatePointer,
    /// data staged in a bucket.
    BucketPointer,
    /// pointer that travels as an offset (into a bound buffer) and never carries data.
    NonImmediatePointer,
    ResourceId { resource: String },
    /// unknown ids may be generated on bind.
    ResourceIdBind { resource: String },
    /// 0 is a valid "none" and is never translated.
    ResourceIdZero { resource: String },
    Enum { named_type: String },
    Int { named_type: String },
    ValidatedBool { named_type: String },
    /// negative values are a GL error.
    Size,
    /// negative values reject the command, the value sizes a payload.
    SizeNotNegative,
    UniformLocation,
    /// byte length of untyped data, dropped when the data comes from a bucket.
    DataSize,
    /// string staged in a bucket.
    InputStringBucket,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub name: String,
    /// type as declared, e.g. `GLenumTextureBindTarget` or `const GLfloat*`.
    pub r#type: String,
    /// primitive type, or for pointers the type pointed at.
    pub base: String,
    pub kind: ArgKind,
    /// pointers only: null is allowed.
    pub optional: bool,
    /// pointers only.
    pub is_const: bool,
}

type Matcher = fn(&str, &str) -> bool;
type Constructor = fn(&str, &str) -> anyhow::Result<Argument>;

fn scalar(r#type: &str, name: &str, base: &str, kind: ArgKind) -> anyhow::Result<Argument> {
    if find_gl_type(base).is_none() {
        bail!("unknown type {base} of {name}");
    }
    Ok(Argument {
        name: name.to_string(),
        r#type: r#type.to_string(),
        base: base.to_string(),
        kind,
        optional: false,
        is_const: false,
    })
}

fn pointer(r#type: &str, name: &str, kind: ArgKind) -> anyhow::Result<Argument> {
    let mut rest = r#type.trim();
    let optional = match rest.strip_prefix("Optional ") {
        Some(stripped) => {
            rest = stripped;
            true
        }
        None => false,
    };
    let is_const = match rest.strip_prefix("const ") {
        Some(stripped) => {
            rest = stripped;
            true
        }
        None => false,
    };
    let Some(pointee) = rest.strip_suffix('*') else {
        bail!("{name}: {} is not a pointer", r#type);
    };
    let pointee = pointee.trim();
    if pointee.contains('*') {
        bail!("{name}: pointers to pointers are not supported");
    }
    if element_rust_type(pointee).is_none() {
        bail!("{name}: unknown pointee type {pointee}");
    }
    Ok(Argument {
        name: name.to_string(),
        r#type: r#type.to_string(),
        base: pointee.to_string(),
        kind,
        optional,
        is_const,
    })
}

fn match_non_immediate(t: &str, _: &str) -> bool {
    t.starts_with("NonImmediate ") && t.contains('*')
}

fn new_non_immediate(t: &str, n: &str) -> anyhow::Result<Argument> {
    let inner = t.trim_start_matches("NonImmediate ");
    let arg = pointer(inner, n, ArgKind::NonImmediatePointer)?;
    Ok(Argument {
        r#type: t.to_string(),
        ..arg
    })
}

fn match_pointer(t: &str, _: &str) -> bool {
    t.contains('*')
}

fn new_pointer(t: &str, n: &str) -> anyhow::Result<Argument> {
    pointer(t, n, ArgKind::Pointer)
}

fn match_id_bind(t: &str, _: &str) -> bool {
    t.starts_with("GLidBind")
}

fn new_id_bind(t: &str, n: &str) -> anyhow::Result<Argument> {
    let resource = t["GLidBind".len()..].to_string();
    scalar(t, n, "GLuint", ArgKind::ResourceIdBind { resource })
}

fn match_id_zero(t: &str, _: &str) -> bool {
    t.starts_with("GLidZero")
}

fn new_id_zero(t: &str, n: &str) -> anyhow::Result<Argument> {
    let resource = t["GLidZero".len()..].to_string();
    scalar(t, n, "GLuint", ArgKind::ResourceIdZero { resource })
}

fn match_id(t: &str, _: &str) -> bool {
    t.starts_with("GLid")
}

fn new_id(t: &str, n: &str) -> anyhow::Result<Argument> {
    let resource = t["GLid".len()..].to_string();
    scalar(t, n, "GLuint", ArgKind::ResourceId { resource })
}

fn match_enum(t: &str, _: &str) -> bool {
    t.starts_with("GLenum") && t.len() > "GLenum".len()
}

fn new_enum(t: &str, n: &str) -> anyhow::Result<Argument> {
    let named_type = t["GLenum".len()..].to_string();
    scalar(t, n, "GLenum", ArgKind::Enum { named_type })
}

fn match_validated_bool(t: &str, _: &str) -> bool {
    t.starts_with("GLboolean") && t.len() > "GLboolean".len()
}

fn new_validated_bool(t: &str, n: &str) -> anyhow::Result<Argument> {
    let named_type = t["GLboolean".len()..].to_string();
    scalar(t, n, "GLboolean", ArgKind::ValidatedBool { named_type })
}

fn match_uniform_location(t: &str, _: &str) -> bool {
    t == "GLintUniformLocation"
}

fn new_uniform_location(t: &str, n: &str) -> anyhow::Result<Argument> {
    scalar(t, n, "GLint", ArgKind::UniformLocation)
}

fn match_int(t: &str, _: &str) -> bool {
    t.starts_with("GLint") && t.len() > "GLint".len() && !t.starts_with("GLintptr")
}

fn new_int(t: &str, n: &str) -> anyhow::Result<Argument> {
    let named_type = t["GLint".len()..].to_string();
    scalar(t, n, "GLint", ArgKind::Int { named_type })
}

fn match_size_not_negative(t: &str, _: &str) -> bool {
    t.starts_with("GLsizeiNotNegative") || t.starts_with("GLintptrNotNegative")
}

fn new_size_not_negative(t: &str, n: &str) -> anyhow::Result<Argument> {
    let base = t.trim_end_matches("NotNegative");
    scalar(t, n, base, ArgKind::SizeNotNegative)
}

fn match_size(t: &str, _: &str) -> bool {
    t.starts_with("GLsize")
}

fn new_size(t: &str, n: &str) -> anyhow::Result<Argument> {
    scalar(t, n, t, ArgKind::Size)
}

fn match_data_size(t: &str, n: &str) -> bool {
    t == "uint32_t" && n == "data_size"
}

fn new_data_size(t: &str, n: &str) -> anyhow::Result<Argument> {
    scalar(t, n, t, ArgKind::DataSize)
}

fn match_any(_: &str, _: &str) -> bool {
    true
}

fn new_value(t: &str, n: &str) -> anyhow::Result<Argument> {
    scalar(t, n, t, ArgKind::Value)
}

/// declared type -> argument kind. first match wins, so more specific prefixes come first.
const RULES: &[(Matcher, Constructor)] = &[
    (match_non_immediate, new_non_immediate),
    (match_pointer, new_pointer),
    (match_id_bind, new_id_bind),
    (match_id_zero, new_id_zero),
    (match_id, new_id),
    (match_enum, new_enum),
    (match_validated_bool, new_validated_bool),
    (match_uniform_location, new_uniform_location),
    (match_int, new_int),
    (match_size_not_negative, new_size_not_negative),
    (match_size, new_size),
    (match_data_size, new_data_size),
    (match_any, new_value),
];

fn split_declaration(decl: &str) -> anyhow::Result<(String, &str)> {
    let decl = decl.trim();
    let name_start = decl
        .rfind(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .map(|i| i + 1)
        .context("missing type")?;
    let name = &decl[name_start..];
    if name.is_empty() {
        bail!("missing name in {decl:?}");
    }
    // `const GLfloat *v` and `const GLfloat* v` are the same thing.
    let r#type = decl[..name_start].trim().replace(" *", "*");
    Ok((r#type, name))
}

impl Argument {
    /// parses one `type name` declaration. `void` is not an argument.
    pub fn parse(decl: &str) -> anyhow::Result<Option<Argument>> {
        if decl.trim() == "void" {
            return Ok(None);
        }
        let (r#type, name) = split_declaration(decl)?;
        for (matcher, constructor) in RULES.iter() {
            if matcher(&r#type, name) {
                return constructor(&r#type, name).map(Some);
            }
        }
        unreachable!()
    }

    pub fn parse_list(list: &str) -> anyhow::Result<Vec<Argument>> {
        let mut args = Vec::new();
        for decl in list.split(',') {
            if let Some(arg) = Argument::parse(decl).with_context(|| format!("in {decl:?}"))? {
                args.push(arg);
            }
        }
        Ok(args)
    }

    pub(crate) fn derived(name: String, kind: ArgKind) -> Argument {
        Argument {
            name,
            r#type: "uint32_t".to_string(),
            base: "uint32_t".to_string(),
            kind,
            optional: false,
            is_const: false,
        }
    }

    pub fn rust_name(&self) -> String {
        rust_ident(&snake_case(&self.name))
    }

    pub fn is_pointer(&self) -> bool {
        matches!(
            self.kind,
            ArgKind::Pointer
                | ArgKind::ImmediatePointer
                | ArgKind::BucketPointer
                | ArgKind::InputStringBucket
        )
    }

    pub fn is_string(&self) -> bool {
        self.is_pointer() && (self.base == "char" || self.base == "GLchar")
    }

    pub fn resource(&self) -> Option<&str> {
        match &self.kind {
            ArgKind::ResourceId { resource }
            | ArgKind::ResourceIdBind { resource }
            | ArgKind::ResourceIdZero { resource } => Some(resource),
            _ => None,
        }
    }

    pub fn named_type<'c>(&self, cx: &'c Config) -> Option<&'c NamedType> {
        match &self.kind {
            ArgKind::Enum { named_type }
            | ArgKind::Int { named_type }
            | ArgKind::ValidatedBool { named_type } => cx.named_type(named_type),
            _ => None,
        }
    }

    pub fn is_constant(&self, cx: &Config) -> bool {
        self.named_type(cx).is_some_and(NamedType::is_constant)
    }

    /// fails on references the config can not resolve.
    pub fn check(&self, cx: &Config) -> anyhow::Result<()> {
        match &self.kind {
            ArgKind::Enum { named_type }
            | ArgKind::Int { named_type }
            | ArgKind::ValidatedBool { named_type } => {
                let Some(t) = cx.named_type(named_type) else {
                    bail!("{}: unknown named type {named_type}", self.name);
                };
                if t.r#type != self.base {
                    bail!("{}: {named_type} is a {} not a {}", self.name, t.r#type, self.base);
                }
                if t.valid.is_empty() {
                    bail!("{}: {named_type} has no valid values", self.name);
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// host type of a scalar, element type of a pointer.
    pub fn rust_type(&self) -> &'static str {
        if matches!(self.kind, ArgKind::NonImmediatePointer) {
            return "u32";
        }
        if self.is_pointer() {
            return element_rust_type(&self.base).unwrap_or("u8");
        }
        find_gl_type(&self.base).map_or("u32", |t| t.rust)
    }

    pub fn wire_type(&self) -> &'static str {
        if matches!(self.kind, ArgKind::NonImmediatePointer) || self.is_pointer() {
            return "u32";
        }
        find_gl_type(&self.base).map_or("u32", |t| t.wire)
    }

    /// type in client, helper and driver signatures.
    pub fn param_type(&self) -> String {
        if !self.is_pointer() {
            return self.rust_type().to_string();
        }
        if self.is_string() && self.is_const {
            return "&str".to_string();
        }
        let element = self.rust_type();
        match (self.is_const, self.optional) {
            (true, true) => format!("Option<&[{element}]>"),
            (true, false) => format!("&[{element}]"),
            (false, true) => format!("Option<&mut [{element}]>"),
            (false, false) => format!("&mut [{element}]"),
        }
    }

    /// fields this argument contributes to the command struct.
    pub fn cmd_fields(&self, cx: &Config) -> Vec<Argument> {
        match self.kind {
            ArgKind::Pointer => vec![
                Argument::derived(format!("{}_shm_id", self.name), ArgKind::Value),
                Argument::derived(format!("{}_shm_offset", self.name), ArgKind::Value),
            ],
            ArgKind::ImmediatePointer => Vec::new(),
            ArgKind::BucketPointer | ArgKind::InputStringBucket => vec![Argument::derived(
                format!("{}_bucket_id", self.name),
                ArgKind::Value,
            )],
            _ if self.is_constant(cx) => Vec::new(),
            _ => vec![self.clone()],
        }
    }

    pub fn immediate_version(&self) -> Option<Argument> {
        match self.kind {
            ArgKind::Pointer => Some(Argument {
                kind: ArgKind::ImmediatePointer,
                ..self.clone()
            }),
            _ => Some(self.clone()),
        }
    }

    pub fn bucket_version(&self) -> Option<Argument> {
        match self.kind {
            ArgKind::Pointer if self.is_string() => Some(Argument {
                kind: ArgKind::InputStringBucket,
                ..self.clone()
            }),
            ArgKind::Pointer => Some(Argument {
                kind: ArgKind::BucketPointer,
                ..self.clone()
            }),
            ArgKind::DataSize => None,
            _ => Some(self.clone()),
        }
    }

    pub(crate) fn token_expr(&self, token: &str) -> String {
        if is_numeric_token(token) {
            format!("{token} as {}", self.rust_type())
        } else {
            const_name(token)
        }
    }

    /// value generated tests pass in. `index` is the position of the argument.
    pub fn valid_value(&self, cx: &Config, index: usize) -> String {
        if let Some(named_type) = self.named_type(cx) {
            return self.token_expr(&named_type.valid[0]);
        }
        if let Some(resource) = self.resource() {
            return format!("CLIENT_{}_ID", screaming_snake_case(resource));
        }
        if self.name.ends_with("_shm_id") {
            return "SHM_ID".to_string();
        }
        if self.name.ends_with("_shm_offset") {
            return "SHM_OFFSET".to_string();
        }
        if self.name.ends_with("_bucket_id") {
            return "BUCKET_ID".to_string();
        }
        if self.name == "client_id" {
            return "NEW_CLIENT_ID".to_string();
        }
        format!("{} as {}", index + 11, self.rust_type())
    }

    /// what the driver is expected to see for [`Self::valid_value`].
    pub fn valid_service_value(&self, cx: &Config, index: usize) -> String {
        match self.resource() {
            Some(resource) => format!("SERVICE_{}_ID", screaming_snake_case(resource)),
            None => self.valid_value(cx, index),
        }
    }

    /// every value that must be rejected, with the check that rejects it.
    pub fn invalid_values(&self, cx: &Config) -> Vec<(String, Check)> {
        match &self.kind {
            ArgKind::Enum { .. } | ArgKind::Int { .. } | ArgKind::ValidatedBool { .. } => {
                let Some(named_type) = self.named_type(cx) else {
                    return Vec::new();
                };
                if named_type.is_constant() {
                    return Vec::new();
                }
                let check = match self.kind {
                    ArgKind::Enum { .. } => Check::InvalidEnum,
                    ArgKind::Int { .. } => Check::InvalidIntValue,
                    _ => Check::InvalidBool,
                };
                named_type
                    .invalid_values()
                    .iter()
                    .map(|token| (self.token_expr(token), check))
                    .collect()
            }
            ArgKind::Size => vec![(format!("-1 as {}", self.rust_type()), Check::NegativeSize)],
            ArgKind::SizeNotNegative => vec![(
                format!("-1 as {}", self.rust_type()),
                Check::NegativeSizeNotNegative,
            )],
            ArgKind::ResourceId { .. } | ArgKind::ResourceIdZero { .. } => {
                vec![("INVALID_CLIENT_ID".to_string(), Check::UnknownResource)]
            }
            _ => Vec::new(),
        }
    }

    /// like [`Self::invalid_values`] but one at a time. asking past the end keeps returning
    /// the last invalid value.
    pub fn invalid_arg(&self, cx: &Config, index: usize) -> Option<(String, Check)> {
        let mut values = self.invalid_values(cx);
        if values.is_empty() {
            return None;
        }
        let index = index.min(values.len() - 1);
        Some(values.swap_remove(index))
    }

    /// declares the local holding this argument on the service side, `c` being the command.
    pub fn write_get_code<W: io::Write>(&self, w: &mut W, cx: &Config) -> anyhow::Result<()> {
        let name = self.rust_name();
        if self.is_pointer() {
            return Ok(());
        }
        if let Some(value) = self.named_type(cx).and_then(NamedType::constant_value) {
            write!(w, "        let {name}: {} = {};\n", self.rust_type(), const_name(value))?;
            return Ok(());
        }
        write!(w, "        let {name} = c.{name} as {};\n", self.rust_type())?;
        Ok(())
    }

    /// service side validation. resource ids are translated to service ids in place.
    pub fn write_validation<W: io::Write>(
        &self,
        w: &mut W,
        cx: &Config,
        gl_name: &str,
        gen_func: Option<&str>,
    ) -> anyhow::Result<()> {
        let name = self.rust_name();
        match &self.kind {
            ArgKind::Enum { named_type }
            | ArgKind::Int { named_type }
            | ArgKind::ValidatedBool { named_type } => {
                if self.is_constant(cx) {
                    return Ok(());
                }
                let check = match self.kind {
                    ArgKind::Int { .. } => Check::InvalidIntValue,
                    ArgKind::ValidatedBool { .. } => Check::InvalidBool,
                    _ => Check::InvalidEnum,
                };
                write!(
                    w,
                    "        if !self.validators.{}.is_valid({name}) {{\n",
                    snake_case(named_type)
                )?;
                emit_failure(w, "            ", check, gl_name, &self.name)?;
                write!(w, "        }}\n")?;
            }
            ArgKind::Size | ArgKind::SizeNotNegative => {
                let check = if self.kind == ArgKind::Size {
                    Check::NegativeSize
                } else {
                    Check::NegativeSizeNotNegative
                };
                write!(w, "        if {name} < 0 {{\n")?;
                emit_failure(w, "            ", check, gl_name, &format!("{} < 0", self.name))?;
                write!(w, "        }}\n")?;
            }
            ArgKind::ResourceId { resource } => {
                let field = resource_field(resource);
                write!(
                    w,
                    "        let Some({name}) = self.resources.{field}.get({name}) else {{\n"
                )?;
                emit_failure(w, "            ", Check::UnknownResource, gl_name, &format!("unknown {}", snake_case(resource)))?;
                write!(w, "        }};\n")?;
            }
            ArgKind::ResourceIdZero { resource } => {
                let field = resource_field(resource);
                write!(w, "        let {name} = if {name} == 0 {{\n")?;
                write!(w, "            0\n")?;
                write!(
                    w,
                    "        }} else if let Some(service_id) = self.resources.{field}.get({name}) {{\n"
                )?;
                write!(w, "            service_id\n")?;
                write!(w, "        }} else {{\n")?;
                emit_failure(w, "            ", Check::UnknownResource, gl_name, &format!("unknown {}", snake_case(resource)))?;
                write!(w, "        }};\n")?;
            }
            ArgKind::ResourceIdBind { resource } => {
                let field = resource_field(resource);
                write!(w, "        let {name} = if {name} == 0 {{\n")?;
                write!(w, "            0\n")?;
                write!(
                    w,
                    "        }} else if let Some(service_id) = self.resources.{field}.get({name}) {{\n"
                )?;
                write!(w, "            service_id\n")?;
                if let Some(gen_func) = gen_func {
                    write!(w, "        }} else if self.bind_generates_resource {{\n")?;
                    write!(w, "            let mut service_ids = [0; 1];\n")?;
                    write!(w, "            self.driver.{}(1, &mut service_ids);\n", snake_case(gen_func))?;
                    write!(w, "            self.resources.{field}.insert({name}, service_ids[0]);\n")?;
                    write!(w, "            service_ids[0]\n")?;
                }
                write!(w, "        }} else {{\n")?;
                emit_failure(
                    w,
                    "            ",
                    Check::UnknownBindResource,
                    gl_name,
                    &format!("{} was not generated", snake_case(resource)),
                )?;
                write!(w, "        }};\n")?;
            }
            _ => {}
        }
        Ok(())
    }

    /// client side validation. only what the service can never see is checked here.
    pub fn write_client_validation<W: io::Write>(
        &self,
        w: &mut W,
        cx: &Config,
        gl_name: &str,
        ret: Option<&str>,
    ) -> anyhow::Result<()> {
        let name = self.rust_name();
        if let Some(value) = self.named_type(cx).and_then(NamedType::constant_value) {
            write!(w, "        if {name} != {} {{\n", const_name(value))?;
            emit_client_failure(w, "            ", Check::InvalidEnum, gl_name, &self.name, ret)?;
            write!(w, "        }}\n")?;
        }
        if matches!(self.kind, ArgKind::Size | ArgKind::SizeNotNegative) {
            write!(w, "        if {name} < 0 {{\n")?;
            emit_client_failure(
                w,
                "            ",
                Check::NegativeSize,
                gl_name,
                &format!("{} < 0", self.name),
                ret,
            )?;
            write!(w, "        }}\n")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_defines;

    fn parse(decl: &str) -> Argument {
        Argument::parse(decl).unwrap().unwrap()
    }

    #[test]
    fn test_grammar() {
        assert_eq!(parse("GLenum texture").kind, ArgKind::Value);
        assert_eq!(
            parse("GLenumTextureBindTarget target").kind,
            ArgKind::Enum {
                named_type: "TextureBindTarget".to_string()
            }
        );
        assert_eq!(
            parse("GLidBindTexture texture").kind,
            ArgKind::ResourceIdBind {
                resource: "Texture".to_string()
            }
        );
        assert_eq!(
            parse("GLidZeroProgram program").kind,
            ArgKind::ResourceIdZero {
                resource: "Program".to_string()
            }
        );
        assert_eq!(parse("GLintUniformLocation location").kind, ArgKind::UniformLocation);
        assert_eq!(parse("GLintptr offset").kind, ArgKind::Value);
        assert_eq!(parse("GLintptrNotNegative offset").kind, ArgKind::SizeNotNegative);
        assert_eq!(parse("GLintptrNotNegative offset").base, "GLintptr");
        assert_eq!(parse("GLsizeiNotNegative n").kind, ArgKind::SizeNotNegative);
        assert_eq!(parse("GLsizeiptr size").kind, ArgKind::Size);
        assert_eq!(parse("uint32_t data_size").kind, ArgKind::DataSize);
        assert_eq!(parse("uint32_t client_id").kind, ArgKind::Value);
        assert_eq!(
            parse("GLbooleanFalseOnly transpose").kind,
            ArgKind::ValidatedBool {
                named_type: "FalseOnly".to_string()
            }
        );
        assert!(Argument::parse("void").unwrap().is_none());
        assert!(Argument::parse("GLdouble depth").is_err());
    }

    #[test]
    fn test_pointers() {
        let arg = parse("const GLfloat *v");
        assert_eq!(arg.kind, ArgKind::Pointer);
        assert_eq!(arg.base, "GLfloat");
        assert_eq!(arg.param_type(), "&[GLfloat]");

        let arg = parse("GLuint* textures");
        assert!(!arg.is_const);
        assert_eq!(arg.param_type(), "&mut [GLuint]");

        let arg = parse("Optional const void* data");
        assert!(arg.optional);
        assert_eq!(arg.param_type(), "Option<&[u8]>");

        assert_eq!(parse("const char* name").param_type(), "&str");

        let arg = parse("NonImmediate const void* indices");
        assert_eq!(arg.kind, ArgKind::NonImmediatePointer);
        assert!(!arg.is_pointer());
        assert_eq!(arg.param_type(), "u32");

        assert!(Argument::parse("const GLchar* const* strings").is_err());
    }

    #[test]
    fn test_cmd_fields() {
        let cx = Config::new(test_defines()).unwrap();
        let names = |arg: &Argument| -> Vec<String> {
            arg.cmd_fields(&cx).into_iter().map(|a| a.name).collect()
        };
        let arg = parse("const GLint* params");
        assert_eq!(names(&arg), ["params_shm_id", "params_shm_offset"]);
        assert!(names(&arg.immediate_version().unwrap()).is_empty());
        assert_eq!(names(&arg.bucket_version().unwrap()), ["params_bucket_id"]);
        assert_eq!(
            parse("const char* name").bucket_version().unwrap().kind,
            ArgKind::InputStringBucket
        );
        assert!(parse("uint32_t data_size").bucket_version().is_none());
        // constants never go over the wire.
        assert!(names(&parse("GLenumRenderBufferTarget target")).is_empty());
        assert_eq!(names(&parse("GLenumBufferTarget target")), ["target"]);
    }

    #[test]
    fn test_invalid_arg_is_clamped() {
        let cx = Config::new(test_defines()).unwrap();
        let arg = parse("GLenumTextureBindTarget target");
        assert_eq!(
            arg.invalid_arg(&cx, 0),
            Some(("TEXTURE_1D".to_string(), Check::InvalidEnum))
        );
        assert_eq!(
            arg.invalid_arg(&cx, 1),
            Some(("TEXTURE_3D".to_string(), Check::InvalidEnum))
        );
        assert_eq!(arg.invalid_arg(&cx, 5), arg.invalid_arg(&cx, 1));
        assert_eq!(parse("GLenumFaceMode mode").invalid_arg(&cx, 0), None);

        let arg = parse("GLintPixelStoreAlignment param");
        assert_eq!(
            arg.invalid_arg(&cx, 0),
            Some(("3 as GLint".to_string(), Check::InvalidIntValue))
        );
    }

    #[test]
    fn test_validation_code() {
        let cx = Config::new(test_defines()).unwrap();
        let mut out = Vec::new();
        parse("GLenumCmpFunction func")
            .write_validation(&mut out, &cx, "glDepthFunc", None)
            .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            concat!(
                "        if !self.validators.cmp_function.is_valid(func) {\n",
                "            self.set_gl_error(INVALID_ENUM, \"glDepthFunc\", \"func\");\n",
                "            return Ok(());\n",
                "        }\n",
            )
        );

        let mut out = Vec::new();
        parse("GLsizeiNotNegative n")
            .write_validation(&mut out, &cx, "glGenTextures", None)
            .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "        if n < 0 {\n            return Err(Error::OutOfBounds);\n        }\n"
        );
    }
}
