#![allow(clippy::write_with_newline)] // this lint is dumb

use std::io;

use crate::argument::{ArgKind, Argument};
use crate::config::Config;
use crate::function::Function;

fn new_params(fields: &[Argument], immediate: bool) -> String {
    let mut params: Vec<String> = fields
        .iter()
        .map(|field| format!("{}: {}", field.rust_name(), field.rust_type()))
        .collect();
    if immediate {
        params.push("payload_size: usize".to_string());
    }
    params.join(", ")
}

pub fn write_struct<W: io::Write>(w: &mut W, cx: &Config, func: &Function) -> anyhow::Result<()> {
    let name = &func.name;
    let fields = func.cmd_fields(cx);

    write!(w, "#[repr(C)]\n")?;
    write!(w, "#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]\n")?;
    write!(w, "pub struct {name} {{\n")?;
    write!(w, "    pub header: CommandHeader,\n")?;
    for field in fields.iter() {
        write!(w, "    pub {}: {},\n", field.rust_name(), field.wire_type())?;
    }
    write!(w, "}}\n\n")?;

    let arg_flags = if func.is_immediate() { "AtLeastN" } else { "Fixed" };
    write!(w, "impl Command for {name} {{\n")?;
    write!(w, "    const ID: u32 = cmd_ids::{};\n", func.const_name())?;
    write!(w, "    const ARG_FLAGS: ArgFlags = ArgFlags::{arg_flags};\n")?;
    write!(w, "    const NAME: &'static str = \"{name}\";\n")?;
    write!(w, "}}\n\n")?;

    write!(w, "impl {name} {{\n")?;
    write!(w, "    pub fn new({}) -> Self {{\n", new_params(&fields, func.is_immediate()))?;
    write!(w, "        Self {{\n")?;
    if func.is_immediate() {
        write!(
            w,
            "            header: CommandHeader::new(Self::ID, words_for_bytes(size_of::<Self>() + payload_size) as u32),\n"
        )?;
    } else {
        write!(
            w,
            "            header: CommandHeader::new(Self::ID, (size_of::<Self>() / 4) as u32),\n"
        )?;
    }
    for field in fields.iter() {
        let field_name = field.rust_name();
        write!(w, "            {field_name}: {field_name} as {},\n", field.wire_type())?;
    }
    write!(w, "        }}\n")?;
    write!(w, "    }}\n")?;
    write!(w, "}}\n\n")?;

    write!(w, "const _: () = assert!(size_of::<{name}>() == {});\n", 4 * (1 + fields.len()))?;
    write!(w, "const _: () = assert!(offset_of!({name}, header) == 0);\n")?;
    for (i, field) in fields.iter().enumerate() {
        write!(
            w,
            "const _: () = assert!(offset_of!({name}, {}) == {});\n",
            field.rust_name(),
            4 * (i + 1)
        )?;
    }
    write!(w, "\n")?;
    Ok(())
}

pub fn write_format_test<W: io::Write>(w: &mut W, cx: &Config, func: &Function) -> anyhow::Result<()> {
    let name = &func.name;
    let fields = func.cmd_fields(cx);
    let values: Vec<String> = fields
        .iter()
        .enumerate()
        .map(|(i, field)| format!("{} as {}", i + 11, field.rust_type()))
        .collect();
    let mut args = values.clone();
    if func.is_immediate() {
        // not a multiple of 4, the header has to round up.
        args.push("5".to_string());
    }

    write!(w, "#[test]\n")?;
    write!(w, "fn test_{}() {{\n", func.snake_name())?;
    write!(w, "    let cmd = {name}::new({});\n", args.join(", "))?;
    write!(w, "    assert_eq!(cmd.header.command(), cmd_ids::{});\n", func.const_name())?;
    if func.is_immediate() {
        write!(w, "    assert_eq!(cmd.header.size() as usize, size_of::<{name}>() / 4 + 2);\n")?;
    } else {
        write!(w, "    assert_eq!(cmd.header.size() as usize, size_of::<{name}>() / 4);\n")?;
    }
    for (field, value) in fields.iter().zip(values.iter()) {
        write!(w, "    assert_eq!(cmd.{}, {value} as {});\n", field.rust_name(), field.wire_type())?;
    }
    write!(w, "}}\n\n")?;
    Ok(())
}

/// parameters of the helper function: the command fields, except that immediate data is passed
/// as a slice.
pub(super) fn helper_params(cx: &Config, func: &Function) -> Vec<(String, String)> {
    let mut params = Vec::new();
    for arg in func.init_args.iter() {
        if arg.kind == ArgKind::ImmediatePointer {
            params.push((arg.rust_name(), format!("&[{}]", arg.rust_type())));
            continue;
        }
        for field in arg.cmd_fields(cx) {
            params.push((field.rust_name(), field.rust_type().to_string()));
        }
    }
    if func.has_result() {
        params.push(("result_shm_id".to_string(), "u32".to_string()));
        params.push(("result_shm_offset".to_string(), "u32".to_string()));
    }
    params
}

pub fn write_cmd_helper<W: io::Write>(w: &mut W, cx: &Config, func: &Function) -> anyhow::Result<()> {
    let params = helper_params(cx, func);
    let mut decl = vec!["&mut self".to_string()];
    decl.extend(params.iter().map(|(name, ty)| format!("{name}: {ty}")));
    let fields: Vec<String> = func.cmd_fields(cx).iter().map(Argument::rust_name).collect();

    write!(w, "    pub fn {}({}) {{\n", func.snake_name(), decl.join(", "))?;
    match func.init_args.iter().find(|arg| arg.kind == ArgKind::ImmediatePointer) {
        Some(data) => {
            let mut args = fields;
            args.push("payload.len()".to_string());
            write!(w, "        let payload: &[u8] = bytemuck::cast_slice({});\n", data.rust_name())?;
            write!(
                w,
                "        self.push_immediate(cmd_format::{}::new({}), payload);\n",
                func.name,
                args.join(", ")
            )?;
        }
        None => {
            write!(w, "        self.push(cmd_format::{}::new({}));\n", func.name, fields.join(", "))?;
        }
    }
    write!(w, "    }}\n\n")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::tests::{emit, expand};

    #[test]
    fn test_struct_layout() {
        let (cx, functions) = expand(
            "BindTexture",
            "GLenumTextureBindTarget target, GLidBindTexture texture",
            "void",
        );
        let func = &functions[0];
        let out = emit(|w| super::write_struct(w, &cx, func));
        assert!(out.contains("pub struct BindTexture {\n    pub header: CommandHeader,\n    pub target: u32,\n    pub texture: u32,\n}\n"));
        assert!(out.contains("const _: () = assert!(size_of::<BindTexture>() == 12);\n"));
        assert!(out.contains("const _: () = assert!(offset_of!(BindTexture, texture) == 8);\n"));
        assert!(out.contains("const ARG_FLAGS: ArgFlags = ArgFlags::Fixed;\n"));
    }

    #[test]
    fn test_constant_enum_has_no_field() {
        let (cx, functions) = expand(
            "RenderbufferStorage",
            "GLenumRenderBufferTarget target, GLenumRenderBufferFormat internalformat, \
             GLsizei width, GLsizei height",
            "void",
        );
        let func = &functions[0];
        let out = emit(|w| super::write_struct(w, &cx, func));
        assert!(!out.contains("pub target"));
        assert!(out.contains("assert!(size_of::<RenderbufferStorage>() == 16)"));
    }

    #[test]
    fn test_immediate_helper() {
        let (cx, functions) = expand("GenTextures", "GLsizeiNotNegative n, GLuint* textures", "void");
        let func = &functions[0];
        assert_eq!(
            emit(|w| super::write_cmd_helper(w, &cx, func)),
            concat!(
                "    pub fn gen_textures_immediate(&mut self, n: GLsizei, textures: &[GLuint]) {\n",
                "        let payload: &[u8] = bytemuck::cast_slice(textures);\n",
                "        self.push_immediate(cmd_format::GenTexturesImmediate::new(n, payload.len()), payload);\n",
                "    }\n",
                "\n",
            )
        );
    }
}
