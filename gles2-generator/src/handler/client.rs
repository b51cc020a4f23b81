#![allow(clippy::write_with_newline)] // this lint is dumb

use std::io;

use anyhow::{Context as _, bail};

use super::TypeHandler;
use super::format::helper_params;
use crate::argument::{ArgKind, Argument};
use crate::config::Config;
use crate::function::{Function, Variant};
use crate::names::resource_field;
use crate::policy::{Check, emit_client_failure};

const INDENT: &str = "        ";

/// the command the client sends: immediate beats bucket beats shared memory.
fn pick(functions: &[Function]) -> Option<&Function> {
    [Variant::Immediate, Variant::Bucket, Variant::Base]
        .into_iter()
        .find_map(|variant| functions.iter().find(|func| func.variant == variant))
}

fn ids(func: &Function) -> anyhow::Result<String> {
    let resource = func.info.resource_type.context("missing resource type")?;
    Ok(format!("self.ids.{}", resource_field(resource)))
}

fn write_signature<W: io::Write>(w: &mut W, func: &Function, ret: Option<&str>) -> anyhow::Result<()> {
    let mut decl = vec!["&mut self".to_string()];
    for arg in func.original_args.iter() {
        decl.push(format!("{}: {}", arg.rust_name(), arg.param_type()));
    }
    let ret = ret.map(|ret| format!(" -> {ret}")).unwrap_or_default();
    write!(w, "    pub fn {}({}){ret} {{\n", func.original_snake_name(), decl.join(", "))?;
    Ok(())
}

fn write_validations<W: io::Write>(
    w: &mut W,
    cx: &Config,
    func: &Function,
    ret: Option<&str>,
) -> anyhow::Result<()> {
    for arg in func.original_args.iter() {
        arg.write_client_validation(w, cx, &func.gl_name(), ret)?;
    }
    Ok(())
}

/// arguments of the helper call, in helper parameter order.
fn helper_args(cx: &Config, func: &Function, data: Option<&str>) -> anyhow::Result<String> {
    let mut args = Vec::new();
    for (name, _) in helper_params(cx, func) {
        let arg = func.init_args.iter().find(|arg| arg.rust_name() == name);
        match arg.map(|arg| &arg.kind) {
            Some(ArgKind::ImmediatePointer) => args.push(data.context("missing data")?.to_string()),
            _ if name.ends_with("_bucket_id") => args.push("STRING_BUCKET_ID".to_string()),
            _ => args.push(name),
        }
    }
    Ok(args.join(", "))
}

fn write_helper_call<W: io::Write>(
    w: &mut W,
    cx: &Config,
    func: &Function,
    data: Option<&str>,
) -> anyhow::Result<()> {
    write!(
        w,
        "{INDENT}self.helper.{}({});\n",
        func.snake_name(),
        helper_args(cx, func, data)?
    )?;
    Ok(())
}

/// checks that `data` holds at least `len` elements and leaves `{data}` sliced to exactly that.
fn write_length_check<W: io::Write>(
    w: &mut W,
    func: &Function,
    data: &Argument,
    len: &str,
) -> anyhow::Result<String> {
    let name = data.rust_name();
    write!(w, "{INDENT}if {name}.len() < {len} {{\n")?;
    emit_client_failure(
        w,
        "            ",
        Check::PayloadTooSmall,
        &func.gl_name(),
        &format!("{} too small", data.name),
        None,
    )?;
    write!(w, "{INDENT}}}\n")?;
    Ok(format!("&{name}[..{len}]"))
}

fn write_simple<W: io::Write>(w: &mut W, cx: &Config, func: &Function) -> anyhow::Result<()> {
    write_signature(w, func, None)?;
    write_validations(w, cx, func, None)?;
    write_helper_call(w, cx, func, None)?;
    if func.handler == TypeHandler::Bind {
        let id = func
            .original_args
            .iter()
            .find(|arg| matches!(arg.kind, ArgKind::ResourceIdBind { .. }))
            .context("bind without an id")?;
        write!(w, "{INDENT}{}.mark_as_used({});\n", ids(func)?, id.rust_name())?;
    }
    write!(w, "    }}\n\n")?;
    Ok(())
}

fn write_put<W: io::Write>(w: &mut W, cx: &Config, func: &Function) -> anyhow::Result<()> {
    let data = func.pointer_arg().context("missing data")?;
    let count = func.info.count.context("missing count")?;
    let len = match func.find_arg("count") {
        Some(arg) => format!("{} as usize * {count}", arg.rust_name()),
        None => count.to_string(),
    };
    write_signature(w, func, None)?;
    write_validations(w, cx, func, None)?;
    let slice = write_length_check(w, func, data, &len)?;
    write_helper_call(w, cx, func, Some(&slice))?;
    write!(w, "    }}\n\n")?;
    Ok(())
}

fn write_gen_n<W: io::Write>(w: &mut W, cx: &Config, func: &Function) -> anyhow::Result<()> {
    let ids = ids(func)?;
    let data = func.pointer_arg().context("missing id array")?;
    let name = data.rust_name();
    write_signature(w, func, None)?;
    write_validations(w, cx, func, None)?;
    let slice = write_length_check(w, func, data, "n as usize")?;
    write!(w, "{INDENT}for id in {name}[..n as usize].iter_mut() {{\n")?;
    write!(w, "{INDENT}    *id = {ids}.allocate();\n")?;
    write!(w, "{INDENT}}}\n")?;
    write_helper_call(w, cx, func, Some(&slice))?;
    write!(w, "    }}\n\n")?;
    Ok(())
}

fn write_del_n<W: io::Write>(w: &mut W, cx: &Config, func: &Function) -> anyhow::Result<()> {
    let ids = ids(func)?;
    let data = func.pointer_arg().context("missing id array")?;
    write_signature(w, func, None)?;
    write_validations(w, cx, func, None)?;
    let slice = write_length_check(w, func, data, "n as usize")?;
    write_helper_call(w, cx, func, Some(&slice))?;
    write!(w, "{INDENT}for &id in {slice} {{\n")?;
    write!(w, "{INDENT}    {ids}.free(id);\n")?;
    write!(w, "{INDENT}}}\n")?;
    write!(w, "    }}\n\n")?;
    Ok(())
}

fn write_create<W: io::Write>(w: &mut W, cx: &Config, func: &Function) -> anyhow::Result<()> {
    let ids = ids(func)?;
    write_signature(w, func, Some("GLuint"))?;
    write_validations(w, cx, func, Some("0"))?;
    write!(w, "{INDENT}let client_id = {ids}.allocate();\n")?;
    write_helper_call(w, cx, func, None)?;
    write!(w, "{INDENT}client_id\n")?;
    write!(w, "    }}\n\n")?;
    Ok(())
}

fn write_delete<W: io::Write>(w: &mut W, cx: &Config, func: &Function) -> anyhow::Result<()> {
    let ids = ids(func)?;
    let id = func.original_args.first().context("missing id")?.rust_name();
    write_signature(w, func, None)?;
    write_helper_call(w, cx, func, None)?;
    write!(w, "{INDENT}{ids}.free({id});\n")?;
    write!(w, "    }}\n\n")?;
    Ok(())
}

fn write_string_bucket<W: io::Write>(
    w: &mut W,
    cx: &Config,
    func: &Function,
    string: &Argument,
) -> anyhow::Result<()> {
    write_signature(w, func, None)?;
    write_validations(w, cx, func, None)?;
    write!(
        w,
        "{INDENT}self.helper.set_bucket_as_string(STRING_BUCKET_ID, {});\n",
        string.rust_name()
    )?;
    write_helper_call(w, cx, func, None)?;
    write!(w, "{INDENT}self.helper.set_bucket_size(STRING_BUCKET_ID, 0);\n")?;
    write!(w, "    }}\n\n")?;
    Ok(())
}

/// client entry point of one GL function. functions that need results from the service are
/// left to hand-written code.
pub fn write_client_impl<W: io::Write>(
    handler: TypeHandler,
    w: &mut W,
    cx: &Config,
    functions: &[Function],
) -> anyhow::Result<()> {
    let Some(func) = pick(functions) else {
        bail!("nothing to send");
    };
    match handler {
        TypeHandler::Default
        | TypeHandler::Bind
        | TypeHandler::StateSet(_)
        | TypeHandler::PutXn
        | TypeHandler::Manual
        | TypeHandler::Todo => write_simple(w, cx, func),
        TypeHandler::Put | TypeHandler::PutN if func.is_immediate() => write_put(w, cx, func),
        TypeHandler::GenN => write_gen_n(w, cx, func),
        TypeHandler::DelN => write_del_n(w, cx, func),
        TypeHandler::Create => write_create(w, cx, func),
        TypeHandler::Delete => write_delete(w, cx, func),
        TypeHandler::Custom if func.variant == Variant::Bucket => {
            let strings: Vec<&Argument> = func
                .original_args
                .iter()
                .filter(|arg| arg.is_string())
                .collect();
            match strings.as_slice() {
                [string] => write_string_bucket(w, cx, func, string),
                _ => Ok(()),
            }
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{emit, expand};

    fn client(name: &str, args: &str, ret: &str) -> String {
        let (cx, functions) = expand(name, args, ret);
        emit(|w| functions[0].handler.write_client_impl(w, &cx, &functions))
    }

    #[test]
    fn test_constant_enum_is_checked_on_the_client() {
        let out = client(
            "RenderbufferStorage",
            "GLenumRenderBufferTarget target, GLenumRenderBufferFormat internalformat, \
             GLsizei width, GLsizei height",
            "void",
        );
        assert!(out.starts_with(concat!(
            "    pub fn renderbuffer_storage(&mut self, target: GLenum, internalformat: GLenum, width: GLsizei, height: GLsizei) {\n",
            "        if target != RENDERBUFFER {\n",
            "            self.set_gl_error(INVALID_ENUM, \"glRenderbufferStorage\", \"target\");\n",
            "            return;\n",
            "        }\n",
        )));
        assert!(out.contains("        self.helper.renderbuffer_storage(internalformat, width, height);\n"));
    }

    #[test]
    fn test_gen_allocates_ids() {
        let out = client("GenTextures", "GLsizeiNotNegative n, GLuint* textures", "void");
        assert!(out.contains(concat!(
            "        for id in textures[..n as usize].iter_mut() {\n",
            "            *id = self.ids.textures.allocate();\n",
            "        }\n",
            "        self.helper.gen_textures_immediate(n, &textures[..n as usize]);\n",
        )));
    }

    #[test]
    fn test_delete_frees_ids() {
        let out = client("DeleteTextures", "GLsizeiNotNegative n, const GLuint* textures", "void");
        assert!(out.contains(concat!(
            "        self.helper.delete_textures_immediate(n, &textures[..n as usize]);\n",
            "        for &id in &textures[..n as usize] {\n",
            "            self.ids.textures.free(id);\n",
            "        }\n",
        )));
    }

    #[test]
    fn test_bind_marks_id_used() {
        let out = client(
            "BindTexture",
            "GLenumTextureBindTarget target, GLidBindTexture texture",
            "void",
        );
        assert!(out.contains(
            "        self.helper.bind_texture(target, texture);\n        self.ids.textures.mark_as_used(texture);\n"
        ));
    }

    #[test]
    fn test_string_goes_through_bucket() {
        let out = client("ShaderSource", "GLidShader shader, const char* source", "void");
        assert_eq!(
            out,
            concat!(
                "    pub fn shader_source(&mut self, shader: GLuint, source: &str) {\n",
                "        self.helper.set_bucket_as_string(STRING_BUCKET_ID, source);\n",
                "        self.helper.shader_source_bucket(shader, STRING_BUCKET_ID);\n",
                "        self.helper.set_bucket_size(STRING_BUCKET_ID, 0);\n",
                "    }\n",
                "\n",
            )
        );
    }

    #[test]
    fn test_queries_have_no_client() {
        assert!(client("IsBuffer", "GLuint buffer", "GLboolean").is_empty());
    }
}
