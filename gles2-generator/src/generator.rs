//! drives the handlers over every function and writes the generated files.

#![allow(clippy::write_with_newline)] // this lint is dumb

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write as _};
use std::path::Path;

use anyhow::{Context as _, bail};

use crate::config::Config;
use crate::function::Function;
use crate::function_info::FunctionInfo;
use crate::gl_types::{emit_types, find_gl_type};
use crate::handler::TypeHandler;
use crate::names::{const_name, is_numeric_token, snake_case};
use crate::signature::{Signature, parse_signatures};
use crate::states::StateItem;

/// first opcode of the GLES2 commands, everything below belongs to the common commands.
pub const FIRST_COMMAND_ID: u32 = 256;

const HEADER: &str = "// automatically generated by gles2-generator, do not edit.\n\n";

/// one entry point with the commands it expanded into.
#[derive(Debug)]
pub struct Entry {
    pub signature: Signature,
    pub functions: Vec<Function>,
}

impl Entry {
    fn handler(&self) -> TypeHandler {
        self.functions[0].handler
    }

    fn info(&self) -> &FunctionInfo {
        &self.functions[0].info
    }
}

#[derive(Debug)]
pub struct Generator {
    pub config: Config,
    pub entries: Vec<Entry>,
}

impl Generator {
    /// parses and expands everything. errors of single functions are logged and counted so that
    /// one run reports all of them.
    pub fn new(input: &str) -> anyhow::Result<Self> {
        let file = parse_signatures(input)?;
        let config = Config::new(file.defines)?;

        let mut errors = 0;
        let mut names = Vec::with_capacity(file.functions.len());
        let mut entries = Vec::with_capacity(file.functions.len());
        for signature in file.functions {
            names.push(signature.name.clone());
            match Function::expand(&signature, &config) {
                Ok(functions) => entries.push(Entry {
                    signature,
                    functions,
                }),
                Err(err) => {
                    log::error!("{}: {err:#}", signature.name);
                    errors += 1;
                }
            }
        }

        let mut unused: Vec<&str> = config
            .function_info_names()
            .filter(|name| !names.iter().any(|known| known == name))
            .collect();
        unused.sort();
        for name in unused {
            log::error!("{name} has function info but no signature");
            errors += 1;
        }

        if errors > 0 {
            bail!("{errors} errors");
        }
        log::info!("{} functions", entries.len());
        Ok(Self { config, entries })
    }

    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.entries.iter().flat_map(|entry| entry.functions.iter())
    }

    pub fn emit_enums<W: io::Write>(&self, w: &mut W) -> anyhow::Result<()> {
        for define in self.config.defines.iter() {
            let name = const_name(&define.name);
            let ty = if name == "TRUE" || name == "FALSE" {
                "GLboolean"
            } else {
                "GLenum"
            };
            write!(w, "pub const {name}: {ty} = {};\n", define.value)?;
        }
        Ok(())
    }

    pub fn emit_cmd_ids<W: io::Write>(&self, w: &mut W) -> anyhow::Result<()> {
        let functions: Vec<&Function> = self.functions().collect();
        for (id, func) in (FIRST_COMMAND_ID..).zip(functions.iter()) {
            write!(w, "pub const {}: u32 = {id};\n", func.const_name())?;
        }
        write!(w, "\n")?;
        write!(w, "pub fn gles2_command_name(id: u32) -> Option<&'static str> {{\n")?;
        write!(w, "    match id {{\n")?;
        for func in functions.iter() {
            write!(w, "        {} => Some(\"{}\"),\n", func.const_name(), func.name)?;
        }
        write!(w, "        _ => None,\n")?;
        write!(w, "    }}\n")?;
        write!(w, "}}\n")?;
        Ok(())
    }

    pub fn emit_cmd_format<W: io::Write>(&self, w: &mut W) -> anyhow::Result<()> {
        for func in self.functions() {
            func.handler.write_struct(w, &self.config, func)?;
        }
        Ok(())
    }

    pub fn emit_cmd_format_test<W: io::Write>(&self, w: &mut W) -> anyhow::Result<()> {
        for func in self.functions() {
            func.handler.write_format_test(w, &self.config, func)?;
        }
        Ok(())
    }

    pub fn emit_cmd_helper<W: io::Write>(&self, w: &mut W) -> anyhow::Result<()> {
        write!(w, "impl CommandBufferHelper {{\n")?;
        for func in self.functions() {
            func.handler.write_cmd_helper(w, &self.config, func)?;
        }
        write!(w, "}}\n")?;
        Ok(())
    }

    pub fn emit_client_impl<W: io::Write>(&self, w: &mut W) -> anyhow::Result<()> {
        write!(w, "impl Gles2Implementation {{\n")?;
        for entry in self.entries.iter() {
            entry
                .handler()
                .write_client_impl(w, &self.config, &entry.functions)
                .with_context(|| entry.signature.name.clone())?;
        }
        write!(w, "}}\n")?;
        Ok(())
    }

    pub fn emit_validators<W: io::Write>(&self, w: &mut W) -> anyhow::Result<()> {
        let named_types: Vec<_> = self
            .config
            .named_types()
            .into_iter()
            .filter(|t| !t.is_constant())
            .collect();
        let value = |token: &str, ty: &str| -> String {
            if is_numeric_token(token) {
                format!("{token} as {ty}")
            } else {
                const_name(token)
            }
        };
        let rust_type = |name: &str| find_gl_type(name).map_or("GLenum", |t| t.rust);

        write!(w, "#[derive(Debug)]\n")?;
        write!(w, "pub struct Validators {{\n")?;
        for t in named_types.iter() {
            write!(w, "    pub {}: ValueValidator<{}>,\n", snake_case(&t.name), rust_type(&t.r#type))?;
        }
        write!(w, "}}\n\n")?;

        write!(w, "impl Validators {{\n")?;
        write!(w, "    pub fn new() -> Self {{\n")?;
        write!(w, "        Self {{\n")?;
        for t in named_types.iter() {
            let ty = rust_type(&t.r#type);
            let values: Vec<String> = t.valid_values().iter().map(|v| value(v, ty)).collect();
            write!(
                w,
                "            {}: ValueValidator::new(&[{}]),\n",
                snake_case(&t.name),
                values.join(", ")
            )?;
        }
        write!(w, "        }}\n")?;
        write!(w, "    }}\n")?;
        write!(w, "}}\n\n")?;

        write!(w, "impl Default for Validators {{\n")?;
        write!(w, "    fn default() -> Self {{\n")?;
        write!(w, "        Self::new()\n")?;
        write!(w, "    }}\n")?;
        write!(w, "}}\n\n")?;

        write!(w, "#[test]\n")?;
        write!(w, "fn test_validators() {{\n")?;
        write!(w, "    let validators = Validators::new();\n")?;
        for t in named_types.iter() {
            let ty = rust_type(&t.r#type);
            let field = snake_case(&t.name);
            for v in t.valid_values().iter() {
                write!(w, "    assert!(validators.{field}.is_valid({}));\n", value(v, ty))?;
            }
            for v in t.invalid_values().iter() {
                write!(w, "    assert!(!validators.{field}.is_valid({}));\n", value(v, ty))?;
            }
        }
        write!(w, "}}\n")?;
        Ok(())
    }

    pub fn emit_driver<W: io::Write>(&self, w: &mut W) -> anyhow::Result<()> {
        write!(w, "/// the real GL the decoder forwards to, one method per GL function.\n")?;
        write!(w, "pub trait Driver {{\n")?;
        for entry in self.entries.iter() {
            let func = &entry.functions[0];
            write!(w, "    fn {};\n", driver_signature(func))?;
        }
        write!(w, "}}\n")?;
        Ok(())
    }

    pub fn emit_driver_mock<W: io::Write>(&self, w: &mut W) -> anyhow::Result<()> {
        write!(w, "impl Driver for RecordingDriver {{\n")?;
        for entry in self.entries.iter() {
            let func = &entry.functions[0];
            let name = func.original_snake_name();
            write!(w, "    fn {} {{\n", driver_signature(func))?;
            if name != "get_error" {
                let mut pattern = Vec::new();
                let mut values = Vec::new();
                for arg in func.original_args.iter() {
                    let arg_name = arg.rust_name();
                    if arg.is_pointer() && !arg.is_const {
                        pattern.push("out[{}]".to_string());
                        if arg.optional {
                            values.push(format!("{arg_name}.as_ref().map_or(0, |v| v.len())"));
                        } else {
                            values.push(format!("{arg_name}.len()"));
                        }
                    } else {
                        pattern.push("{:?}".to_string());
                        values.push(arg_name);
                    }
                }
                let values: String = values.iter().map(|v| format!(", {v}")).collect();
                write!(
                    w,
                    "        self.record(format!(\"{name}({})\"{values}));\n",
                    pattern.join(", ")
                )?;
            }
            if entry.handler() == TypeHandler::GenN {
                let ids = func.pointer_arg().context("gen without ids")?.rust_name();
                write!(w, "        for id in {ids}.iter_mut() {{\n")?;
                write!(w, "            *id = self.next_service_id();\n")?;
                write!(w, "        }}\n")?;
            }
            if let Some(ret) = func.return_rust_type() {
                write!(w, "        self.take_result(\"{name}\") as {ret}\n")?;
            }
            write!(w, "    }}\n\n")?;
        }
        write!(w, "}}\n")?;
        Ok(())
    }

    pub fn emit_context_state<W: io::Write>(&self, w: &mut W) -> anyhow::Result<()> {
        let cx = &self.config;
        let features: BTreeSet<&str> = self
            .entries
            .iter()
            .filter_map(|entry| entry.info().extension_flag)
            .collect();
        write!(w, "/// optional functionality the decoder exposes.\n")?;
        write!(w, "#[derive(Debug, Clone, Default)]\n")?;
        write!(w, "pub struct Features {{\n")?;
        for feature in features.iter() {
            write!(w, "    pub {feature}: bool,\n")?;
        }
        write!(w, "}}\n\n")?;

        write!(w, "#[derive(Debug, Clone, PartialEq)]\n")?;
        write!(w, "pub struct EnableFlags {{\n")?;
        for cap in cx.capabilities.iter() {
            write!(w, "    pub {}: bool,\n", cap.name)?;
        }
        write!(w, "}}\n\n")?;
        write!(w, "impl Default for EnableFlags {{\n")?;
        write!(w, "    fn default() -> Self {{\n")?;
        write!(w, "        Self {{\n")?;
        for cap in cx.capabilities.iter() {
            write!(w, "            {}: {},\n", cap.name, cap.default)?;
        }
        write!(w, "        }}\n")?;
        write!(w, "    }}\n")?;
        write!(w, "}}\n\n")?;

        let items = unique_items(cx);
        let flags: BTreeSet<&str> = cx
            .states
            .iter()
            .filter_map(|state| state.state_flag)
            .chain(cx.capabilities.iter().filter_map(|cap| cap.state_flag))
            .collect();

        write!(w, "#[derive(Debug, Clone, PartialEq)]\n")?;
        write!(w, "pub struct ContextState {{\n")?;
        write!(w, "    pub enable_flags: EnableFlags,\n")?;
        for item in items.iter() {
            write!(w, "    pub {}: {},\n", item.name, item_type(item))?;
        }
        for flag in flags.iter() {
            write!(w, "    pub {flag}: bool,\n")?;
        }
        write!(w, "}}\n\n")?;

        write!(w, "impl Default for ContextState {{\n")?;
        write!(w, "    fn default() -> Self {{\n")?;
        write!(w, "        Self {{\n")?;
        write!(w, "            enable_flags: EnableFlags::default(),\n")?;
        for item in items.iter() {
            write!(w, "            {}: {},\n", item.name, item_default(item))?;
        }
        for flag in flags.iter() {
            // the defaults are what a fresh context starts with.
            write!(w, "            {flag}: false,\n")?;
        }
        write!(w, "        }}\n")?;
        write!(w, "    }}\n")?;
        write!(w, "}}\n\n")?;

        write!(w, "impl ContextState {{\n")?;
        write!(w, "    /// returns whether the flag changed, false for enums that are not capabilities.\n")?;
        write!(w, "    pub fn set_capability(&mut self, cap: GLenum, enabled: bool) -> bool {{\n")?;
        write!(w, "        match cap {{\n")?;
        for cap in cx.capabilities.iter() {
            write!(w, "            {} => {{\n", const_name(&cap.gl_enum()))?;
            write!(w, "                if self.enable_flags.{} == enabled {{\n", cap.name)?;
            write!(w, "                    return false;\n")?;
            write!(w, "                }}\n")?;
            write!(w, "                self.enable_flags.{} = enabled;\n", cap.name)?;
            if let Some(flag) = cap.state_flag {
                write!(w, "                self.{flag} = true;\n")?;
            }
            write!(w, "            }}\n")?;
        }
        write!(w, "            _ => return false,\n")?;
        write!(w, "        }}\n")?;
        write!(w, "        true\n")?;
        write!(w, "    }}\n\n")?;

        write!(w, "    pub fn is_capability_enabled(&self, cap: GLenum) -> Option<bool> {{\n")?;
        write!(w, "        match cap {{\n")?;
        for cap in cx.capabilities.iter() {
            write!(
                w,
                "            {} => Some(self.enable_flags.{}),\n",
                const_name(&cap.gl_enum()),
                cap.name
            )?;
        }
        write!(w, "            _ => None,\n")?;
        write!(w, "        }}\n")?;
        write!(w, "    }}\n\n")?;

        write!(w, "    /// cached values of `pname`, `None` when they have to come from the driver.\n")?;
        write!(w, "    pub fn get_state_iv(&self, pname: GLenum) -> Option<Vec<GLint>> {{\n")?;
        write!(w, "        match pname {{\n")?;
        for (pname, group) in group_by_enum(&items) {
            let values: Vec<String> = group
                .iter()
                .map(|item| format!("self.{} as GLint", item.name))
                .collect();
            write!(w, "            {} => Some(vec![{}]),\n", const_name(pname), values.join(", "))?;
        }
        for cap in cx.capabilities.iter() {
            write!(
                w,
                "            {} => Some(vec![self.enable_flags.{} as GLint]),\n",
                const_name(&cap.gl_enum()),
                cap.name
            )?;
        }
        write!(w, "            _ => None,\n")?;
        write!(w, "        }}\n")?;
        write!(w, "    }}\n")?;
        write!(w, "}}\n\n")?;

        write!(w, "/// number of values a GETn query of `pname` writes.\n")?;
        write!(w, "pub fn num_values_returned(pname: GLenum) -> Option<usize> {{\n")?;
        write!(w, "    match pname {{\n")?;
        for (pname, group) in group_by_enum(&items) {
            write!(w, "        {} => Some({}),\n", const_name(pname), group.len())?;
        }
        for cap in cx.capabilities.iter() {
            write!(w, "        {} => Some(1),\n", const_name(&cap.gl_enum()))?;
        }
        for (pname, count) in cx.query_only.iter() {
            write!(w, "        {} => Some({count}),\n", const_name(pname))?;
        }
        write!(w, "        _ => None,\n")?;
        write!(w, "    }}\n")?;
        write!(w, "}}\n")?;
        Ok(())
    }

    pub fn emit_decoder<W: io::Write>(&self, w: &mut W) -> anyhow::Result<()> {
        write!(w, "impl<D: Driver> Decoder<D> {{\n")?;
        for func in self.functions() {
            func.handler
                .write_service_impl(w, &self.config, func)
                .with_context(|| func.name.clone())?;
        }
        write!(
            w,
            "    pub(crate) fn do_gles2_command(&mut self, command: u32, data: &[u32]) -> Result<(), Error> {{\n"
        )?;
        write!(w, "        match command {{\n")?;
        for func in self.functions() {
            func.handler.write_decoder_dispatch(w, func)?;
        }
        write!(w, "            _ => Err(Error::UnknownCommand(command)),\n")?;
        write!(w, "        }}\n")?;
        write!(w, "    }}\n")?;
        write!(w, "}}\n")?;
        Ok(())
    }

    pub fn emit_decoder_test<W: io::Write>(&self, w: &mut W) -> anyhow::Result<()> {
        for func in self.functions() {
            func.handler
                .write_service_test(w, &self.config, func)
                .with_context(|| func.name.clone())?;
        }
        Ok(())
    }

    /// writes every generated file into `out_dir`.
    pub fn write_all(&self, out_dir: &Path) -> anyhow::Result<()> {
        type Emit = fn(&Generator, &mut BufWriter<File>) -> anyhow::Result<()>;
        let files: &[(&str, Emit)] = &[
            ("gl_types", |_, w| emit_types(w)),
            ("gl_enums", Generator::emit_enums),
            ("cmd_ids", Generator::emit_cmd_ids),
            ("cmd_format", Generator::emit_cmd_format),
            ("cmd_format_test", Generator::emit_cmd_format_test),
            ("cmd_helper", Generator::emit_cmd_helper),
            ("client_impl", Generator::emit_client_impl),
            ("validators", Generator::emit_validators),
            ("driver", Generator::emit_driver),
            ("driver_mock", Generator::emit_driver_mock),
            ("context_state", Generator::emit_context_state),
            ("decoder", Generator::emit_decoder),
            ("decoder_test", Generator::emit_decoder_test),
        ];
        fs::create_dir_all(out_dir)
            .with_context(|| format!("could not create {}", out_dir.display()))?;
        for (name, emit) in files.iter() {
            let path = out_dir.join(format!("{name}_generated.rs"));
            let mut w = BufWriter::new(
                File::create(&path).with_context(|| format!("could not create {}", path.display()))?,
            );
            w.write_all(HEADER.as_bytes())?;
            emit(self, &mut w).with_context(|| format!("{name}_generated.rs"))?;
            w.flush()?;
            log::debug!("wrote {}", path.display());
        }
        Ok(())
    }
}

fn driver_signature(func: &Function) -> String {
    let mut decl = vec!["&mut self".to_string()];
    for arg in func.original_args.iter() {
        decl.push(format!("{}: {}", arg.rust_name(), arg.param_type()));
    }
    let ret = func
        .return_rust_type()
        .map(|ret| format!(" -> {ret}"))
        .unwrap_or_default();
    format!("{}({}){ret}", func.original_snake_name(), decl.join(", "))
}

/// state items with unique names, in table order.
fn unique_items(cx: &Config) -> Vec<&'static StateItem> {
    let mut items: Vec<&'static StateItem> = Vec::new();
    for state in cx.states.iter() {
        for item in state.items.iter() {
            if !items.iter().any(|seen| seen.name == item.name) {
                items.push(item);
            }
        }
    }
    items
}

fn group_by_enum<'a>(items: &[&'a StateItem]) -> Vec<(&'a str, Vec<&'a StateItem>)> {
    let mut groups: Vec<(&'a str, Vec<&'a StateItem>)> = Vec::new();
    for item in items.iter() {
        match groups.iter_mut().find(|(pname, _)| *pname == item.r#enum) {
            Some((_, group)) => group.push(item),
            None => groups.push((item.r#enum, vec![item])),
        }
    }
    groups
}

fn item_type(item: &StateItem) -> &'static str {
    find_gl_type(item.r#type).map_or("GLenum", |t| t.rust)
}

fn item_default(item: &StateItem) -> String {
    if is_numeric_token(item.default) || item.default.contains('.') {
        format!("{} as {}", item.default, item_type(item))
    } else {
        const_name(item.default)
    }
}

/// reads `input`, writes all files into `out_dir`.
pub fn generate(input: &Path, out_dir: &Path) -> anyhow::Result<()> {
    let input = fs::read_to_string(input)
        .with_context(|| format!("could not read {}", input.display()))?;
    let generator = Generator::new(&input)?;
    generator.write_all(out_dir)
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    const FUNCTIONS: &str = include_str!("../../gles2/gl-specs/gles2_cmd_buffer_functions.txt");

    fn generator() -> Generator {
        Generator::new(FUNCTIONS).unwrap()
    }

    fn emit(f: impl FnOnce(&mut Vec<u8>) -> anyhow::Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_cmd_ids_start_after_common_commands() {
        let generator = generator();
        let out = emit(|w| generator.emit_cmd_ids(w));
        assert!(out.starts_with(indoc! {"
            pub const ACTIVE_TEXTURE: u32 = 256;
            pub const ATTACH_SHADER: u32 = 257;
        "}));
        assert!(out.contains("        READ_PIXELS => Some(\"ReadPixels\"),\n"));
    }

    #[test]
    fn test_num_values_returned() {
        let generator = generator();
        let out = emit(|w| generator.emit_context_state(w));
        assert!(out.contains(indoc! {"
            /// number of values a GETn query of `pname` writes.
            pub fn num_values_returned(pname: GLenum) -> Option<usize> {
                match pname {
                    BLEND_COLOR => Some(4),
                    BLEND_EQUATION_RGB => Some(1),
        "}));
        assert!(out.contains("        MAX_VIEWPORT_DIMS => Some(2),\n"));
    }

    #[test]
    fn test_driver_mock() {
        let generator = generator();
        let out = emit(|w| generator.emit_driver_mock(w));
        assert!(out.contains(concat!(
            "    fn gen_textures(&mut self, n: GLsizei, textures: &mut [GLuint]) {\n",
            "        self.record(format!(\"gen_textures({:?}, out[{}])\", n, textures.len()));\n",
            "        for id in textures.iter_mut() {\n",
            "            *id = self.next_service_id();\n",
            "        }\n",
            "    }\n",
        )));
        // errors are polled all the time, recording them would only be noise.
        assert!(out.contains(concat!(
            "    fn get_error(&mut self) -> GLenum {\n",
            "        self.take_result(\"get_error\") as GLenum\n",
            "    }\n",
        )));
    }

    #[test]
    fn test_unknown_function_info() {
        let input = FUNCTIONS.replace("glUseProgram", "glUseProgramX");
        let err = Generator::new(&input).unwrap_err();
        assert_eq!(err.to_string(), "1 errors");
    }

    #[test]
    fn test_write_all() {
        let out_dir = std::env::temp_dir().join(format!("gles2-generator-{}", std::process::id()));
        generator().write_all(&out_dir).unwrap();
        let validators = fs::read_to_string(out_dir.join("validators_generated.rs")).unwrap();
        assert!(validators.starts_with(HEADER));
        fs::remove_dir_all(&out_dir).unwrap();
    }
}
