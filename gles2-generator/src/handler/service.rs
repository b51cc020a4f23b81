#![allow(clippy::write_with_newline)] // this lint is dumb

use std::io;

use anyhow::{Context as _, bail};

use super::{TypeHandler, state_set};
use crate::argument::{ArgKind, Argument};
use crate::config::Config;
use crate::function::Function;
use crate::names::{resource_field, snake_case};
use crate::policy::{Check, emit_failure, emit_final_failure};

const INDENT: &str = "        ";
const INNER: &str = "            ";

/// expression passing `arg` on to the driver or a `do_*` function.
pub(super) fn call_arg(arg: &Argument) -> String {
    let name = arg.rust_name();
    if !arg.is_pointer() {
        return name;
    }
    if arg.optional {
        format!("{name}.as_deref()")
    } else {
        format!("&{name}")
    }
}

fn call_args(func: &Function) -> String {
    func.init_args
        .iter()
        .filter(|arg| arg.kind != ArgKind::DataSize)
        .map(call_arg)
        .collect::<Vec<_>>()
        .join(", ")
}

fn resource(func: &Function) -> anyhow::Result<String> {
    let resource = func.info.resource_type.context("missing resource type")?;
    Ok(resource_field(resource))
}

fn write_fail<W: io::Write>(w: &mut W, func: &Function, check: Check, msg: &str) -> anyhow::Result<()> {
    emit_failure(w, INNER, check, &func.gl_name(), msg)?;
    Ok(())
}

/// brings the data behind a pointer argument into a local of the same name.
fn write_fetch<W: io::Write>(w: &mut W, func: &Function, arg: &Argument) -> anyhow::Result<()> {
    let name = arg.rust_name();
    let field = snake_case(&arg.name);
    let elem = arg.rust_type();
    match arg.kind {
        ArgKind::Pointer => {
            let count = func.element_count(arg)?;
            let get = format!(
                "self.shared_memory.get_array::<{elem}>(c.{field}_shm_id, c.{field}_shm_offset, {count})"
            );
            if arg.optional {
                write!(w, "{INDENT}let {name} = if c.{field}_shm_id == 0 {{\n")?;
                write!(w, "{INDENT}    None\n")?;
                write!(w, "{INDENT}}} else {{\n")?;
                write!(w, "{INNER}let Some({name}) = {get} else {{\n")?;
                emit_failure(w, "                ", Check::NullSharedMemory, &func.gl_name(), &arg.name)?;
                write!(w, "{INNER}}};\n")?;
                write!(w, "{INNER}Some({name})\n")?;
                write!(w, "{INDENT}}};\n")?;
            } else {
                write!(w, "{INDENT}let Some({name}) = {get} else {{\n")?;
                write_fail(w, func, Check::NullSharedMemory, &arg.name)?;
                write!(w, "{INDENT}}};\n")?;
            }
            if arg.is_string() {
                write!(w, "{INDENT}let Ok({name}) = String::from_utf8({name}) else {{\n")?;
                write_fail(w, func, Check::InvalidString, &arg.name)?;
                write!(w, "{INDENT}}};\n")?;
            }
        }
        ArgKind::ImmediatePointer => {
            let count = func.element_count(arg)?;
            write!(w, "{INDENT}let Some({name}) = immediate_array::<{elem}>(payload, {count}) else {{\n")?;
            write_fail(w, func, Check::PayloadTooSmall, &arg.name)?;
            write!(w, "{INDENT}}};\n")?;
        }
        ArgKind::BucketPointer => {
            write!(w, "{INDENT}let Some({name}) = self.buckets.get(c.{field}_bucket_id) else {{\n")?;
            write_fail(w, func, Check::MissingBucket, &arg.name)?;
            write!(w, "{INDENT}}};\n")?;
            write!(w, "{INDENT}let {name}: Vec<{elem}> = bytemuck::pod_collect_to_vec({name});\n")?;
        }
        ArgKind::InputStringBucket => {
            write!(w, "{INDENT}let Some({name}) = self.buckets.get(c.{field}_bucket_id) else {{\n")?;
            write_fail(w, func, Check::MissingBucket, &arg.name)?;
            write!(w, "{INDENT}}};\n")?;
            write!(w, "{INDENT}let Ok({name}) = String::from_utf8({name}.to_vec()) else {{\n")?;
            write_fail(w, func, Check::InvalidString, &arg.name)?;
            write!(w, "{INDENT}}};\n")?;
        }
        _ => {}
    }
    Ok(())
}

fn write_fetches<W: io::Write>(w: &mut W, func: &Function) -> anyhow::Result<()> {
    for arg in func.init_args.iter().filter(|arg| arg.is_pointer()) {
        if let (Some(count_arg), Some(multiplier)) = (func.find_arg("count"), func.count_multiplier()) {
            let name = arg.rust_name();
            write!(
                w,
                "{INDENT}let Some(count_{name}) = ({} as usize).checked_mul({multiplier}) else {{\n",
                count_arg.rust_name()
            )?;
            write_fail(w, func, Check::SizeOverflow, "count")?;
            write!(w, "{INDENT}}};\n")?;
        }
        write_fetch(w, func, arg)?;
    }
    Ok(())
}

fn write_result<W: io::Write>(w: &mut W, func: &Function) -> anyhow::Result<()> {
    write!(
        w,
        "{INDENT}if !self.shared_memory.write_result(c.result_shm_id, c.result_shm_offset, result as u32) {{\n"
    )?;
    write_fail(w, func, Check::NullSharedMemory, "result")?;
    write!(w, "{INDENT}}}\n")?;
    Ok(())
}

fn write_call<W: io::Write>(w: &mut W, func: &Function) -> anyhow::Result<()> {
    let args = call_args(func);
    match func.info.decoder_func {
        Some(_) => write!(w, "{INDENT}self.{}({args})?;\n", func.decoder_func())?,
        None => write!(w, "{INDENT}self.driver.{}({args});\n", func.original_snake_name())?,
    }
    Ok(())
}

fn write_create<W: io::Write>(w: &mut W, func: &Function) -> anyhow::Result<()> {
    let resources = resource(func)?;
    if func.find_arg("client_id").is_none() {
        bail!("{} has no client_id", func.name);
    }
    let args: Vec<String> = func.original_args.iter().map(Argument::rust_name).collect();
    write!(w, "{INDENT}if self.resources.{resources}.contains(client_id) {{\n")?;
    write_fail(w, func, Check::ClientIdInUse, "client_id")?;
    write!(w, "{INDENT}}}\n")?;
    write!(
        w,
        "{INDENT}let service_id = self.driver.{}({});\n",
        func.original_snake_name(),
        args.join(", ")
    )?;
    write!(w, "{INDENT}self.resources.{resources}.insert(client_id, service_id);\n")?;
    Ok(())
}

fn write_delete<W: io::Write>(w: &mut W, func: &Function) -> anyhow::Result<()> {
    let resources = resource(func)?;
    let id = func.init_args.first().context("missing id")?.rust_name();
    write!(w, "{INDENT}if {id} == 0 {{\n")?;
    write!(w, "{INNER}return Ok(());\n")?;
    write!(w, "{INDENT}}}\n")?;
    write!(w, "{INDENT}let Some(service_id) = self.resources.{resources}.remove({id}) else {{\n")?;
    write_fail(w, func, Check::UnknownResource, &format!("unknown {id}"))?;
    write!(w, "{INDENT}}};\n")?;
    write!(w, "{INDENT}self.driver.{}(service_id);\n", func.original_snake_name())?;
    Ok(())
}

fn write_is<W: io::Write>(w: &mut W, func: &Function) -> anyhow::Result<()> {
    let resources = resource(func)?;
    let id = func.init_args.first().context("missing id")?.rust_name();
    write!(w, "{INDENT}let result = match self.resources.{resources}.get({id}) {{\n")?;
    write!(
        w,
        "{INNER}Some(service_id) => self.driver.{}(service_id),\n",
        func.original_snake_name()
    )?;
    write!(w, "{INNER}None => FALSE,\n")?;
    write!(w, "{INDENT}}};\n")?;
    write_result(w, func)
}

fn write_gen_n<W: io::Write>(w: &mut W, func: &Function) -> anyhow::Result<()> {
    let resources = resource(func)?;
    let ids = func.pointer_arg().context("missing id array")?.rust_name();
    let n = func.find_arg("n").context("missing n")?.rust_name();
    write_fetches(w, func)?;
    write!(w, "{INDENT}if has_zero_or_duplicate(&{ids}) {{\n")?;
    write_fail(w, func, Check::ZeroOrDuplicateId, &ids)?;
    write!(w, "{INDENT}}}\n")?;
    write!(w, "{INDENT}for &client_id in {ids}.iter() {{\n")?;
    write!(w, "{INNER}if self.resources.{resources}.contains(client_id) {{\n")?;
    emit_failure(w, "                ", Check::ClientIdInUse, &func.gl_name(), &ids)?;
    write!(w, "{INNER}}}\n")?;
    write!(w, "{INDENT}}}\n")?;
    write!(w, "{INDENT}let mut service_ids = vec![0; {ids}.len()];\n")?;
    write!(w, "{INDENT}self.driver.{}({n}, &mut service_ids);\n", func.original_snake_name())?;
    write!(
        w,
        "{INDENT}for (&client_id, &service_id) in {ids}.iter().zip(service_ids.iter()) {{\n"
    )?;
    write!(w, "{INNER}self.resources.{resources}.insert(client_id, service_id);\n")?;
    write!(w, "{INDENT}}}\n")?;
    Ok(())
}

fn write_del_n<W: io::Write>(w: &mut W, func: &Function) -> anyhow::Result<()> {
    let resources = resource(func)?;
    let ids = func.pointer_arg().context("missing id array")?.rust_name();
    write_fetches(w, func)?;
    write!(w, "{INDENT}let service_ids: Vec<GLuint> = {ids}\n")?;
    write!(w, "{INDENT}    .iter()\n")?;
    write!(
        w,
        "{INDENT}    .filter_map(|&client_id| self.resources.{resources}.remove(client_id))\n"
    )?;
    write!(w, "{INDENT}    .collect();\n")?;
    write!(w, "{INDENT}if !service_ids.is_empty() {{\n")?;
    write!(
        w,
        "{INNER}self.driver.{}(service_ids.len() as GLsizei, &service_ids);\n",
        func.original_snake_name()
    )?;
    write!(w, "{INDENT}}}\n")?;
    Ok(())
}

fn write_get_n<W: io::Write>(w: &mut W, func: &Function) -> anyhow::Result<()> {
    let gl_name = func.gl_name();
    let pname = func.find_arg("pname").context("missing pname")?.rust_name();
    let params = func.pointer_arg().context("missing result pointer")?;
    let field = snake_case(&params.name);
    let name = params.rust_name();
    let elem = func.info.result.unwrap_or(params.rust_type());
    let args: Vec<String> = func
        .init_args
        .iter()
        .map(|arg| if arg.is_pointer() { format!("&mut {name}") } else { arg.rust_name() })
        .collect();
    let args = args.join(", ");

    write!(w, "{INDENT}let Some(num_values) = num_values_returned({pname}) else {{\n")?;
    write_fail(w, func, Check::InvalidEnum, "pname")?;
    write!(w, "{INDENT}}};\n")?;
    write!(
        w,
        "{INDENT}let Some(result_size) = self.shared_memory.read_result_size(c.{field}_shm_id, c.{field}_shm_offset) else {{\n"
    )?;
    write_fail(w, func, Check::NullSharedMemory, &params.name)?;
    write!(w, "{INDENT}}};\n")?;
    write!(w, "{INDENT}if result_size != 0 {{\n")?;
    write_fail(w, func, Check::ResultNotEmpty, &params.name)?;
    write!(w, "{INDENT}}}\n")?;
    write!(w, "{INDENT}let mut {name} = vec![{elem}::default(); num_values];\n")?;
    match func.info.decoder_func {
        Some(_) => write!(w, "{INDENT}self.{}({args})?;\n", func.decoder_func())?,
        None => {
            write!(w, "{INDENT}self.copy_real_gl_errors();\n")?;
            write!(w, "{INDENT}self.driver.{}({args});\n", func.original_snake_name())?;
            write!(w, "{INDENT}let error = self.driver.get_error();\n")?;
            write!(w, "{INDENT}if error != NO_ERROR {{\n")?;
            write!(w, "{INNER}self.set_gl_error(error, \"{gl_name}\", \"\");\n")?;
            write!(w, "{INNER}return Ok(());\n")?;
            write!(w, "{INDENT}}}\n")?;
        }
    }
    write!(
        w,
        "{INDENT}if !self.shared_memory.write_sized_result(c.{field}_shm_id, c.{field}_shm_offset, &{name}) {{\n"
    )?;
    write_fail(w, func, Check::NullSharedMemory, &params.name)?;
    write!(w, "{INDENT}}}\n")?;
    Ok(())
}

fn write_put_xn<W: io::Write>(w: &mut W, func: &Function) -> anyhow::Result<()> {
    if func.info.decoder_func.is_none() {
        bail!("{} needs a decoder function taking a vector", func.name);
    }
    let Some((location, values)) = func.init_args.split_first() else {
        bail!("{} has no location", func.name);
    };
    let values: Vec<String> = values.iter().map(Argument::rust_name).collect();
    write!(w, "{INDENT}let values = [{}];\n", values.join(", "))?;
    write!(w, "{INDENT}self.{}({}, 1, &values)?;\n", func.decoder_func(), location.rust_name())?;
    Ok(())
}

fn write_custom<W: io::Write>(w: &mut W, func: &Function) -> anyhow::Result<()> {
    if let Some(arg) = func.init_args.iter().find(|arg| arg.is_pointer() && !arg.is_const) {
        bail!("{}: {} is written to, that needs a hand-written handler", func.name, arg.name);
    }
    write_fetches(w, func)?;
    let args = call_args(func);
    if func.has_result() {
        write!(w, "{INDENT}let result = self.{}({args})?;\n", func.decoder_func())?;
        write_result(w, func)?;
    } else {
        write!(w, "{INDENT}self.{}({args})?;\n", func.decoder_func())?;
    }
    Ok(())
}

pub fn write_service_impl<W: io::Write>(
    handler: TypeHandler,
    w: &mut W,
    cx: &Config,
    func: &Function,
) -> anyhow::Result<()> {
    let gl_name = func.gl_name();
    let uses_cmd = handler != TypeHandler::Todo && !func.cmd_fields(cx).is_empty();
    let c = if uses_cmd { "c" } else { "_c" };
    let payload = if func.is_immediate() { ", payload: &[u32]" } else { "" };
    write!(
        w,
        "    fn handle_{}(&mut self, {c}: cmd_format::{}{payload}) -> Result<(), Error> {{\n",
        func.snake_name(),
        func.name
    )?;

    if let Some(flag) = func.info.extension_flag {
        write!(w, "{INDENT}if !self.features.{flag} {{\n")?;
        write_fail(w, func, Check::FunctionNotAvailable, "function not available")?;
        write!(w, "{INDENT}}}\n")?;
    }
    if handler == TypeHandler::Todo {
        emit_final_failure(w, INDENT, Check::NotImplemented, &gl_name, "not implemented")?;
        write!(w, "    }}\n\n")?;
        return Ok(());
    }

    for arg in func.init_args.iter() {
        arg.write_get_code(w, cx)?;
    }
    for arg in func.init_args.iter() {
        arg.write_validation(w, cx, &gl_name, func.info.gen_func)?;
    }

    match handler {
        TypeHandler::Default | TypeHandler::Bind => write_call(w, func)?,
        TypeHandler::Put | TypeHandler::PutN => {
            write_fetches(w, func)?;
            write_call(w, func)?;
        }
        TypeHandler::PutXn => write_put_xn(w, func)?,
        TypeHandler::Create => write_create(w, func)?,
        TypeHandler::Delete => write_delete(w, func)?,
        TypeHandler::Is => write_is(w, func)?,
        TypeHandler::GenN => write_gen_n(w, func)?,
        TypeHandler::DelN => write_del_n(w, func)?,
        TypeHandler::GetN => write_get_n(w, func)?,
        TypeHandler::StateSet(kind) => state_set::write_body(kind, w, cx, func)?,
        TypeHandler::Custom => write_custom(w, func)?,
        TypeHandler::Manual | TypeHandler::HandWritten | TypeHandler::Todo => unreachable!(),
    }
    write!(w, "{INDENT}Ok(())\n")?;
    write!(w, "    }}\n\n")?;
    Ok(())
}

pub fn write_decoder_dispatch<W: io::Write>(
    handler: TypeHandler,
    w: &mut W,
    func: &Function,
) -> anyhow::Result<()> {
    let id = func.const_name();
    let snake = func.snake_name();
    if handler == TypeHandler::HandWritten {
        write!(w, "            cmd_ids::{id} => self.handle_{snake}(data),\n")?;
        return Ok(());
    }
    write!(w, "            cmd_ids::{id} => {{\n")?;
    if func.info.trace_level.is_some() {
        write!(w, "                log::trace!(\"{{}}\", cmd_format::{}::NAME);\n", func.name)?;
    }
    if func.is_immediate() {
        write!(w, "                let (c, payload) = read_command::<cmd_format::{}>(data)?;\n", func.name)?;
        write!(w, "                self.handle_{snake}(c, payload)\n")?;
    } else {
        write!(w, "                let (c, _) = read_command::<cmd_format::{}>(data)?;\n", func.name)?;
        write!(w, "                self.handle_{snake}(c)\n")?;
    }
    write!(w, "            }}\n")?;
    Ok(())
}
