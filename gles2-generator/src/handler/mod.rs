//! per function code emission.
//!
//! every function has exactly one [`TypeHandler`]. the handler decides which pieces are
//! generated and how the service side does its work; the pieces themselves live in the
//! submodules.

mod client;
mod format;
mod service;
mod state_set;

use std::io;

use crate::config::Config;
use crate::function::Function;

/// how the arguments of a state setter map onto the items of its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateSetKind {
    /// one argument per item.
    Normal,
    /// the arguments are applied to the rgb items and again to the alpha items.
    RgbAlpha,
    /// the arguments are applied to the front items and again to the back items.
    FrontBack,
    /// the first argument selects front, back or both.
    FrontBackSeparate,
    /// the first argument selects the item.
    NamedParameter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeHandler {
    Default,
    Bind,
    Create,
    Delete,
    GenN,
    DelN,
    GetN,
    Is,
    Put,
    PutN,
    PutXn,
    StateSet(StateSetKind),
    Custom,
    Manual,
    HandWritten,
    Todo,
}

impl TypeHandler {
    pub fn needs_data_transfer_function(self, func: &Function) -> bool {
        match self {
            TypeHandler::GetN => false,
            TypeHandler::HandWritten => func.info.data_transfer_methods.is_some(),
            _ => func.init_args.iter().any(|arg| arg.is_pointer()),
        }
    }

    /// command struct with its wire layout assertions.
    pub fn write_struct<W: io::Write>(self, w: &mut W, cx: &Config, func: &Function) -> anyhow::Result<()> {
        if self == TypeHandler::HandWritten {
            return Ok(());
        }
        format::write_struct(w, cx, func)
    }

    pub fn write_format_test<W: io::Write>(self, w: &mut W, cx: &Config, func: &Function) -> anyhow::Result<()> {
        if self == TypeHandler::HandWritten {
            return Ok(());
        }
        format::write_format_test(w, cx, func)
    }

    pub fn write_cmd_helper<W: io::Write>(self, w: &mut W, cx: &Config, func: &Function) -> anyhow::Result<()> {
        if self == TypeHandler::HandWritten {
            return Ok(());
        }
        format::write_cmd_helper(w, cx, func)
    }

    /// client entry point. called once per entry point, with every command it expanded into.
    pub fn write_client_impl<W: io::Write>(
        self,
        w: &mut W,
        cx: &Config,
        functions: &[Function],
    ) -> anyhow::Result<()> {
        client::write_client_impl(self, w, cx, functions)
    }

    pub fn write_service_impl<W: io::Write>(self, w: &mut W, cx: &Config, func: &Function) -> anyhow::Result<()> {
        match self {
            TypeHandler::Manual | TypeHandler::HandWritten => Ok(()),
            _ => service::write_service_impl(self, w, cx, func),
        }
    }

    pub fn write_decoder_dispatch<W: io::Write>(self, w: &mut W, func: &Function) -> anyhow::Result<()> {
        service::write_decoder_dispatch(self, w, func)
    }

    pub fn write_service_test<W: io::Write>(self, w: &mut W, cx: &Config, func: &Function) -> anyhow::Result<()> {
        if func.info.unit_test == Some(false) {
            return Ok(());
        }
        match self {
            TypeHandler::Custom | TypeHandler::Manual | TypeHandler::HandWritten => Ok(()),
            _ => service_test::write_service_test(self, w, cx, func),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_defines;
    use crate::signature::Signature;

    pub(super) fn expand(name: &str, args: &str, ret: &str) -> (Config, Vec<Function>) {
        let cx = Config::new(test_defines()).unwrap();
        let sig = Signature {
            name: name.to_string(),
            return_type: ret.to_string(),
            args: args.to_string(),
        };
        let functions = Function::expand(&sig, &cx).unwrap();
        (cx, functions)
    }

    pub(super) fn emit(f: impl FnOnce(&mut Vec<u8>) -> anyhow::Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_hand_written_emits_dispatch_only() {
        let (cx, functions) = expand(
            "ReadPixels",
            "GLint x, GLint y, GLsizei width, GLsizei height, GLenumReadPixelFormat format, \
             GLenumPixelType type, void* pixels",
            "void",
        );
        assert_eq!(functions.len(), 1);
        let func = &functions[0];
        let handler = func.handler;
        assert_eq!(handler, TypeHandler::HandWritten);
        assert!(emit(|w| handler.write_struct(w, &cx, func)).is_empty());
        assert!(emit(|w| handler.write_cmd_helper(w, &cx, func)).is_empty());
        assert!(emit(|w| handler.write_service_impl(w, &cx, func)).is_empty());
        assert_eq!(
            emit(|w| handler.write_decoder_dispatch(w, func)),
            "            cmd_ids::READ_PIXELS => self.handle_read_pixels(data),\n"
        );
    }
}
