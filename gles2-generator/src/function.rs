use anyhow::{Context as _, bail};

use crate::argument::{ArgKind, Argument};
use crate::config::Config;
use crate::function_info::{DataTransfer, FunctionInfo};
use crate::handler::TypeHandler;
use crate::names::{screaming_snake_case, snake_case};
use crate::signature::Signature;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Base,
    Immediate,
    Bucket,
}

impl Variant {
    fn suffix(self) -> &'static str {
        match self {
            Variant::Base => "",
            Variant::Immediate => "Immediate",
            Variant::Bucket => "Bucket",
        }
    }
}

/// one command of the protocol. an entry point expands into up to three of these.
#[derive(Debug, Clone)]
pub struct Function {
    /// command name, e.g. `GenTexturesImmediate`.
    pub name: String,
    /// entry point name, e.g. `GenTextures`.
    pub original_name: String,
    /// arguments of the entry point as the driver and the client see them.
    pub original_args: Vec<Argument>,
    /// arguments of the command, already turned into this variant's versions.
    pub init_args: Vec<Argument>,
    pub return_type: String,
    pub handler: TypeHandler,
    pub info: FunctionInfo,
    pub variant: Variant,
}

impl Function {
    /// expands one signature into its commands, base first.
    pub fn expand(sig: &Signature, cx: &Config) -> anyhow::Result<Vec<Function>> {
        let info = *cx.function_info(&sig.name);
        let original_args = Argument::parse_list(&sig.args).context("arguments")?;
        let base_args = match info.cmd_args {
            Some(cmd_args) => Argument::parse_list(cmd_args).context("cmd_args")?,
            None => original_args.clone(),
        };
        for arg in original_args.iter().chain(base_args.iter()) {
            arg.check(cx)?;
        }

        let base = Function {
            name: sig.name.clone(),
            original_name: sig.name.clone(),
            original_args,
            init_args: base_args,
            return_type: sig.return_type.clone(),
            handler: info.handler(),
            info,
            variant: Variant::Base,
        };
        if base.handler == TypeHandler::Default && !base.can_auto_generate() {
            bail!("{} can not be auto generated, it needs a type", base.name);
        }
        if matches!(base.handler, TypeHandler::GenN | TypeHandler::DelN | TypeHandler::Create | TypeHandler::Delete | TypeHandler::Is | TypeHandler::Bind)
            && base.info.resource_type.is_none()
        {
            bail!("{} has no resource type", base.name);
        }

        let methods = base.data_transfer_methods();
        let needs_transfer = base.handler.needs_data_transfer_function(&base);
        let mut functions = Vec::with_capacity(3);
        if !needs_transfer || methods.contains(&DataTransfer::Shm) {
            functions.push(base.clone());
        }
        if needs_transfer && methods.contains(&DataTransfer::Immediate) {
            functions.push(base.variant(Variant::Immediate, Argument::immediate_version)?);
        }
        if needs_transfer && methods.contains(&DataTransfer::Bucket) {
            functions.push(base.variant(Variant::Bucket, Argument::bucket_version)?);
        }
        if functions.is_empty() {
            bail!("{} has no data transfer method", base.name);
        }
        Ok(functions)
    }

    fn variant(
        &self,
        variant: Variant,
        version: fn(&Argument) -> Option<Argument>,
    ) -> anyhow::Result<Function> {
        let init_args: Vec<Argument> = self.init_args.iter().filter_map(version).collect();
        if variant == Variant::Immediate {
            let immediates = init_args
                .iter()
                .filter(|arg| arg.kind == ArgKind::ImmediatePointer)
                .count();
            if immediates != 1 {
                bail!("{} has {immediates} pointers, immediate commands take one", self.name);
            }
        }
        Ok(Function {
            name: format!("{}{}", self.original_name, variant.suffix()),
            init_args,
            variant,
            ..self.clone()
        })
    }

    pub fn can_auto_generate(&self) -> bool {
        self.return_type == "void" && !self.original_args.iter().any(Argument::is_pointer)
    }

    pub fn data_transfer_methods(&self) -> Vec<DataTransfer> {
        if let Some(methods) = self.info.data_transfer_methods {
            return methods.to_vec();
        }
        if self.handler == TypeHandler::GetN {
            return vec![DataTransfer::Shm];
        }
        match self.init_args.iter().filter(|arg| arg.is_pointer()).count() {
            0 => Vec::new(),
            1 => vec![DataTransfer::Immediate],
            _ => vec![DataTransfer::Shm],
        }
    }

    pub fn is_immediate(&self) -> bool {
        self.variant == Variant::Immediate
    }

    /// results travel back through shared memory. create returns its id through the command.
    pub fn has_result(&self) -> bool {
        self.return_type != "void" && self.handler != TypeHandler::Create
    }

    pub fn snake_name(&self) -> String {
        snake_case(&self.name)
    }

    pub fn original_snake_name(&self) -> String {
        snake_case(&self.original_name)
    }

    pub fn const_name(&self) -> String {
        screaming_snake_case(&self.name)
    }

    pub fn gl_name(&self) -> String {
        format!("gl{}", self.original_name)
    }

    pub fn return_rust_type(&self) -> Option<&'static str> {
        if self.return_type == "void" {
            return None;
        }
        crate::gl_types::find_gl_type(&self.return_type).map(|t| t.rust)
    }

    /// hand-written service function doing the work of a custom (or overridden) function.
    pub fn decoder_func(&self) -> String {
        match self.info.decoder_func {
            Some(func) => snake_case(func),
            None => format!("do_{}", self.original_snake_name()),
        }
    }

    /// every 4-byte field of the command after the header.
    pub fn cmd_fields(&self, cx: &Config) -> Vec<Argument> {
        let mut fields: Vec<Argument> = self
            .init_args
            .iter()
            .flat_map(|arg| arg.cmd_fields(cx))
            .collect();
        if self.has_result() {
            fields.push(Argument::derived("result_shm_id".to_string(), ArgKind::Value));
            fields.push(Argument::derived("result_shm_offset".to_string(), ArgKind::Value));
        }
        fields
    }

    pub fn find_arg(&self, name: &str) -> Option<&Argument> {
        self.init_args.iter().find(|arg| arg.name == name)
    }

    pub fn pointer_arg(&self) -> Option<&Argument> {
        self.init_args.iter().find(|arg| arg.is_pointer())
    }

    /// elements behind `arg`, as an expression over the locals of the generated function.
    pub fn element_count(&self, arg: &Argument) -> anyhow::Result<String> {
        if let Some(count) = self.info.count {
            return Ok(match self.find_arg("count") {
                Some(_) => format!("count_{}", arg.rust_name().trim_start_matches("r#")),
                None => count.to_string(),
            });
        }
        for name in ["data_size", "size", "n", "count"] {
            if let Some(size) = self.find_arg(name) {
                return Ok(format!("{} as usize", size.rust_name()));
            }
        }
        bail!("{}: can not tell how many elements {} points at", self.name, arg.name)
    }

    /// the per-count multiplier of PUTn style functions.
    pub fn count_multiplier(&self) -> Option<usize> {
        self.find_arg("count").and(self.info.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_defines;

    fn expand(args: &str, name: &str, ret: &str) -> anyhow::Result<Vec<Function>> {
        let cx = Config::new(test_defines()).unwrap();
        let sig = Signature {
            name: name.to_string(),
            return_type: ret.to_string(),
            args: args.to_string(),
        };
        Function::expand(&sig, &cx)
    }

    fn names(functions: &[Function]) -> Vec<&str> {
        functions.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_single_pointer_is_immediate_only() {
        let functions = expand("GLsizeiNotNegative n, GLuint* textures", "GenTextures", "void").unwrap();
        assert_eq!(names(&functions), ["GenTexturesImmediate"]);
        assert_eq!(functions[0].init_args[1].kind, ArgKind::ImmediatePointer);
        assert_eq!(functions[0].element_count(&functions[0].init_args[1]).unwrap(), "n as usize");
    }

    #[test]
    fn test_shm_and_bucket() {
        let functions = expand("GLidShader shader, const char* source", "ShaderSource", "void").unwrap();
        assert_eq!(names(&functions), ["ShaderSource", "ShaderSourceBucket"]);
        let cx = Config::new(test_defines()).unwrap();
        let fields = |f: &Function| -> Vec<String> {
            f.cmd_fields(&cx).into_iter().map(|a| a.name).collect()
        };
        assert_eq!(fields(&functions[0]), ["shader", "data_shm_id", "data_shm_offset", "data_size"]);
        assert_eq!(fields(&functions[1]), ["shader", "data_bucket_id"]);
        // the driver still sees the entry point's arguments.
        assert_eq!(functions[1].original_args[1].name, "source");
    }

    #[test]
    fn test_results_and_create() {
        let cx = Config::new(test_defines()).unwrap();
        let functions = expand("GLuint buffer", "IsBuffer", "GLboolean").unwrap();
        let fields: Vec<String> = functions[0].cmd_fields(&cx).into_iter().map(|a| a.name).collect();
        assert_eq!(fields, ["buffer", "result_shm_id", "result_shm_offset"]);

        let functions = expand("void", "CreateProgram", "GLuint").unwrap();
        assert!(!functions[0].has_result());
        assert_eq!(functions[0].init_args[0].name, "client_id");
    }

    #[test]
    fn test_default_needs_auto_generate() {
        let err = expand("const GLfloat* v", "VertexAttrib4fv", "void").unwrap_err();
        assert_eq!(err.to_string(), "VertexAttrib4fv can not be auto generated, it needs a type");
        assert!(expand("GLenum texture", "ActiveTexture", "void").unwrap()[0].can_auto_generate());
    }

    #[test]
    fn test_uniform_count() {
        let functions = expand(
            "GLintUniformLocation location, GLsizei count, const GLfloat* v",
            "Uniform4fv",
            "void",
        )
        .unwrap();
        let f = &functions[0];
        assert_eq!(f.count_multiplier(), Some(4));
        assert_eq!(f.element_count(&f.init_args[2]).unwrap(), "count_v");
    }
}
