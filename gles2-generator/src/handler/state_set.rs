#![allow(clippy::write_with_newline)] // this lint is dumb

use std::io;

use anyhow::{Context as _, bail};

use super::StateSetKind;
use crate::argument::{ArgKind, Argument};
use crate::config::Config;
use crate::function::Function;
use crate::names::const_name;
use crate::states::{StateDef, StateItem};

fn state(cx: &Config, func: &Function) -> anyhow::Result<&'static StateDef> {
    let name = func.info.state.context("state setter without a state")?;
    cx.state(name).with_context(|| format!("unknown state {name}"))
}

/// (item, argument) pairs for the kinds where every argument maps onto items directly.
fn pairs<'a>(
    kind: StateSetKind,
    state: &'static StateDef,
    args: &'a [Argument],
) -> anyhow::Result<Vec<(&'static StateItem, &'a Argument)>> {
    let items = state.items;
    let expected = match kind {
        StateSetKind::Normal => args.len(),
        StateSetKind::RgbAlpha | StateSetKind::FrontBack => 2 * args.len(),
        _ => bail!("{kind:?} does not map arguments to items one by one"),
    };
    if items.len() != expected {
        bail!("{} has {} items, {} arguments", state.name, items.len(), args.len());
    }
    Ok(items
        .iter()
        .enumerate()
        .map(|(i, item)| (item, &args[i % args.len()]))
        .collect())
}

fn changed(pairs: &[(&StateItem, &Argument)]) -> String {
    pairs
        .iter()
        .map(|(item, arg)| format!("self.state.{} != {}", item.name, arg.rust_name()))
        .collect::<Vec<_>>()
        .join(" || ")
}

fn write_assign<W: io::Write>(
    w: &mut W,
    indent: &str,
    pairs: &[(&StateItem, &Argument)],
) -> anyhow::Result<()> {
    for (item, arg) in pairs.iter() {
        write!(w, "{indent}self.state.{} = {};\n", item.name, arg.rust_name())?;
    }
    Ok(())
}

fn write_apply<W: io::Write>(
    w: &mut W,
    indent: &str,
    state: &StateDef,
    func: &Function,
) -> anyhow::Result<()> {
    if let Some(flag) = state.state_flag {
        write!(w, "{indent}self.state.{flag} = true;\n")?;
    }
    if !func.info.no_gl {
        let args: Vec<String> = func.init_args.iter().map(Argument::rust_name).collect();
        write!(
            w,
            "{indent}self.driver.{}({});\n",
            func.original_snake_name(),
            args.join(", ")
        )?;
    }
    Ok(())
}

/// skips the driver call when nothing would change.
pub fn write_body<W: io::Write>(
    kind: StateSetKind,
    w: &mut W,
    cx: &Config,
    func: &Function,
) -> anyhow::Result<()> {
    let state = state(cx, func)?;
    let args = &func.init_args;
    match kind {
        StateSetKind::Normal | StateSetKind::RgbAlpha | StateSetKind::FrontBack => {
            let pairs = pairs(kind, state, args)?;
            write!(w, "        if {} {{\n", changed(&pairs))?;
            write_assign(w, "            ", &pairs)?;
            write_apply(w, "            ", state, func)?;
            write!(w, "        }}\n")?;
        }
        StateSetKind::FrontBackSeparate => {
            let Some((face, rest)) = args.split_first() else {
                bail!("{} has no face", func.name);
            };
            if state.items.len() != 2 * rest.len() {
                bail!("{} has {} items, {} arguments", state.name, state.items.len(), args.len());
            }
            let (front_items, back_items) = state.items.split_at(rest.len());
            let front: Vec<_> = front_items.iter().zip(rest.iter()).collect();
            let back: Vec<_> = back_items.iter().zip(rest.iter()).collect();
            let face = face.rust_name();
            write!(w, "        let front = {face} == FRONT || {face} == FRONT_AND_BACK;\n")?;
            write!(w, "        let back = {face} == BACK || {face} == FRONT_AND_BACK;\n")?;
            write!(
                w,
                "        if (front && ({})) || (back && ({})) {{\n",
                changed(&front),
                changed(&back)
            )?;
            write!(w, "            if front {{\n")?;
            write_assign(w, "                ", &front)?;
            write!(w, "            }}\n")?;
            write!(w, "            if back {{\n")?;
            write_assign(w, "                ", &back)?;
            write!(w, "            }}\n")?;
            write_apply(w, "            ", state, func)?;
            write!(w, "        }}\n")?;
        }
        StateSetKind::NamedParameter => {
            let [target, value] = args.as_slice() else {
                bail!("{} takes a parameter name and a value", func.name);
            };
            write!(w, "        match {} {{\n", target.rust_name())?;
            for item in state.items.iter() {
                let pairs = [(item, value)];
                write!(w, "            {} => {{\n", const_name(item.r#enum))?;
                write!(w, "                if {} {{\n", changed(&pairs))?;
                write_assign(w, "                    ", &pairs)?;
                write_apply(w, "                    ", state, func)?;
                write!(w, "                }}\n")?;
                write!(w, "            }}\n")?;
            }
            if func.info.no_gl {
                write!(w, "            _ => {{}}\n")?;
            } else {
                write!(w, "            _ => {{\n")?;
                write_apply(w, "                ", state, func)?;
                write!(w, "            }}\n")?;
            }
            write!(w, "        }}\n")?;
        }
    }
    Ok(())
}

/// defaults of the items an argument ends up in.
fn item_defaults(kind: StateSetKind, state: &StateDef, index: usize, arg_count: usize) -> Vec<&'static str> {
    let items = state.items;
    let pick = |i: usize| items.get(i).map(|item| item.default);
    match kind {
        StateSetKind::Normal => pick(index).into_iter().collect(),
        StateSetKind::RgbAlpha | StateSetKind::FrontBack => {
            [pick(index), pick(index + arg_count)].into_iter().flatten().collect()
        }
        StateSetKind::FrontBackSeparate if index > 0 => {
            let n = arg_count - 1;
            [pick(index - 1), pick(n + index - 1)].into_iter().flatten().collect()
        }
        StateSetKind::FrontBackSeparate => Vec::new(),
        StateSetKind::NamedParameter if index > 0 => items.iter().map(|item| item.default).collect(),
        StateSetKind::NamedParameter => Vec::new(),
    }
}

/// valid values that all differ from the initial state, so that the first call is never elided.
pub fn test_values(kind: StateSetKind, cx: &Config, func: &Function) -> anyhow::Result<Vec<String>> {
    let state = state(cx, func)?;
    let arg_count = func.init_args.len();
    let mut values = Vec::with_capacity(arg_count);
    for (i, arg) in func.init_args.iter().enumerate() {
        let default = arg.valid_value(cx, i);
        let value = match (&arg.kind, arg.named_type(cx)) {
            (ArgKind::Enum { .. }, Some(named_type)) if !named_type.is_constant() => {
                let defaults: Vec<String> = item_defaults(kind, state, i, arg_count)
                    .into_iter()
                    .map(const_name)
                    .collect();
                named_type
                    .valid_values()
                    .iter()
                    .map(|token| const_name(token))
                    .find(|value| !defaults.contains(value))
                    .unwrap_or(default)
            }
            _ => default,
        };
        values.push(value);
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::super::tests::{emit, expand};
    use super::*;

    #[test]
    fn test_rgb_alpha() {
        let (cx, functions) = expand("BlendEquation", "GLenumEquation mode", "void");
        let func = &functions[0];
        let out = emit(|w| func.handler.write_service_impl(w, &cx, func));
        assert!(out.contains(concat!(
            "        if self.state.blend_equation_rgb != mode || self.state.blend_equation_alpha != mode {\n",
            "            self.state.blend_equation_rgb = mode;\n",
            "            self.state.blend_equation_alpha = mode;\n",
            "            self.driver.blend_equation(mode);\n",
            "        }\n",
        )));
        // FUNC_ADD is the default.
        assert_eq!(test_values(StateSetKind::RgbAlpha, &cx, func).unwrap(), ["FUNC_SUBTRACT"]);
    }

    #[test]
    fn test_no_gl_only_marks_dirty() {
        let (cx, functions) = expand("DepthMask", "GLboolean flag", "void");
        let func = &functions[0];
        let out = emit(|w| func.handler.write_service_impl(w, &cx, func));
        assert!(out.contains("            self.state.clear_state_dirty = true;\n        }\n"));
        assert!(!out.contains("self.driver"));
    }

    #[test]
    fn test_front_back_separate() {
        let (cx, functions) = expand("StencilMaskSeparate", "GLenumFaceType face, GLuint mask", "void");
        let func = &functions[0];
        let out = emit(|w| func.handler.write_service_impl(w, &cx, func));
        assert!(out.contains(
            "        if (front && (self.state.stencil_front_writemask != mask)) || (back && (self.state.stencil_back_writemask != mask)) {\n"
        ));
        assert!(out.contains("            self.driver.stencil_mask_separate(face, mask);\n"));
    }

    #[test]
    fn test_named_parameter() {
        let (cx, functions) = expand("Hint", "GLenumHintTarget target, GLenumHintMode mode", "void");
        let func = &functions[0];
        let out = emit(|w| func.handler.write_service_impl(w, &cx, func));
        assert!(out.contains("            GENERATE_MIPMAP_HINT => {\n"));
        assert!(out.contains("                if self.state.hint_generate_mipmap != mode {\n"));
        assert_eq!(
            test_values(StateSetKind::NamedParameter, &cx, func).unwrap(),
            ["GENERATE_MIPMAP_HINT", "FASTEST"]
        );
    }
}
