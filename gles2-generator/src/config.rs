use std::collections::{HashMap, HashSet};

use anyhow::{Context as _, bail};

use crate::function_info::{FUNCTION_INFO, FunctionInfo};
use crate::named_types::{NAMED_TYPES, NamedType, NamedTypeDef};
use crate::names::is_numeric_token;
use crate::signature::Define;
use crate::states::{CAPABILITIES, CapabilityDef, QUERY_ONLY, STATES, StateDef};

/// everything the generator knows besides the signatures themselves.
///
/// built once, never changed afterwards.
#[derive(Debug)]
pub struct Config {
    pub defines: Vec<Define>,
    named_types: HashMap<String, NamedType>,
    function_info: HashMap<&'static str, FunctionInfo>,
    pub states: &'static [StateDef],
    pub capabilities: &'static [CapabilityDef],
    pub query_only: &'static [(&'static str, usize)],
}

fn push_unique(values: &mut Vec<String>, value: String) {
    if !values.contains(&value) {
        values.push(value);
    }
}

/// capabilities can be enabled and queried, cached state can be queried. both tables are the
/// source of truth, the named types only list what is not covered by them.
fn enrich_named_types(
    defs: &[NamedTypeDef],
    states: &[StateDef],
    capabilities: &[CapabilityDef],
) -> HashMap<String, NamedType> {
    let mut named_types = HashMap::with_capacity(defs.len());
    for def in defs.iter() {
        let mut named_type = def.to_named_type();
        match def.name {
            "Capability" => {
                for cap in capabilities.iter() {
                    push_unique(&mut named_type.valid, cap.gl_enum());
                }
            }
            "GLState" => {
                for state in states.iter() {
                    for item in state.items.iter() {
                        push_unique(&mut named_type.valid, item.r#enum.to_string());
                    }
                }
                for cap in capabilities.iter() {
                    push_unique(&mut named_type.valid, cap.gl_enum());
                }
            }
            _ => {}
        }
        named_types.insert(def.name.to_string(), named_type);
    }
    named_types
}

impl Config {
    pub fn new(defines: Vec<Define>) -> anyhow::Result<Self> {
        Self::with_tables(defines, NAMED_TYPES, FUNCTION_INFO, STATES, CAPABILITIES)
    }

    pub fn with_tables(
        defines: Vec<Define>,
        named_types: &[NamedTypeDef],
        function_info: &'static [(&'static str, FunctionInfo)],
        states: &'static [StateDef],
        capabilities: &'static [CapabilityDef],
    ) -> anyhow::Result<Self> {
        let mut seen = HashSet::new();
        for define in defines.iter() {
            if !seen.insert(define.name.as_str()) {
                bail!("{} is defined twice", define.name);
            }
        }

        let config = Self {
            named_types: enrich_named_types(named_types, states, capabilities),
            function_info: function_info.iter().copied().collect(),
            defines,
            states,
            capabilities,
            query_only: QUERY_ONLY,
        };
        config.check_tokens()?;
        log::debug!(
            "config: {} named types, {} function overrides",
            config.named_types.len(),
            config.function_info.len()
        );
        Ok(config)
    }

    fn check_token(&self, token: &str) -> anyhow::Result<()> {
        if is_numeric_token(token) || token.contains('.') || token == "true" || token == "false" {
            return Ok(());
        }
        self.enum_value(token).context(token.to_string())?;
        Ok(())
    }

    fn check_tokens(&self) -> anyhow::Result<()> {
        let mut unknown = Vec::new();
        for named_type in self.named_types.values() {
            for token in named_type.valid.iter().chain(named_type.invalid.iter()) {
                if self.check_token(token).is_err() {
                    unknown.push(format!("{} (in {})", token, named_type.name));
                }
            }
        }
        for state in self.states.iter() {
            for item in state.items.iter() {
                for token in [item.r#enum, item.default] {
                    if self.check_token(token).is_err() {
                        unknown.push(format!("{} (in state {})", token, state.name));
                    }
                }
            }
        }
        for (token, _) in self.query_only.iter() {
            if self.check_token(token).is_err() {
                unknown.push(token.to_string());
            }
        }
        if !unknown.is_empty() {
            unknown.sort();
            bail!("undefined enums: {}", unknown.join(", "));
        }
        Ok(())
    }

    pub fn enum_value(&self, name: &str) -> Option<&str> {
        self.defines
            .iter()
            .find(|define| define.name == name)
            .map(|define| define.value.as_str())
    }

    pub fn named_type(&self, name: &str) -> Option<&NamedType> {
        self.named_types.get(name)
    }

    /// sorted by name so that output does not depend on hashing.
    pub fn named_types(&self) -> Vec<&NamedType> {
        let mut named_types: Vec<&NamedType> = self.named_types.values().collect();
        named_types.sort_by(|a, b| a.name.cmp(&b.name));
        named_types
    }

    pub fn function_info(&self, name: &str) -> &FunctionInfo {
        self.function_info
            .get(name)
            .unwrap_or(&FunctionInfo::DEFAULT)
    }

    pub fn has_function_info(&self, name: &str) -> bool {
        self.function_info.contains_key(name)
    }

    pub fn function_info_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.function_info.keys().copied()
    }

    pub fn state(&self, name: &str) -> Option<&'static StateDef> {
        self.states.iter().find(|state| state.name == name)
    }

    /// how many values a query of `pname` returns.
    pub fn num_values(&self, pname: &str) -> Option<usize> {
        for state in self.states.iter() {
            let count = state.items.iter().filter(|item| item.r#enum == pname).count();
            if count > 0 {
                return Some(count);
            }
        }
        if self.capabilities.iter().any(|cap| cap.gl_enum() == pname) {
            return Some(1);
        }
        self.query_only
            .iter()
            .find(|(name, _)| *name == pname)
            .map(|(_, count)| *count)
    }
}

#[cfg(test)]
pub(crate) fn test_defines() -> Vec<Define> {
    let input = include_str!("../../gles2/gl-specs/gles2_cmd_buffer_functions.txt");
    crate::signature::parse_signatures(input)
        .expect("signature file")
        .defines
}

#[test]
fn test_capabilities_are_added_to_named_types() {
    let config = Config::new(test_defines()).unwrap();
    let capability = config.named_type("Capability").unwrap();
    assert_eq!(capability.valid[0], "GL_BLEND");
    assert_eq!(capability.valid.len(), CAPABILITIES.len());

    let gl_state = config.named_type("GLState").unwrap();
    assert!(gl_state.valid.contains(&"GL_COLOR_WRITEMASK".to_string()));
    assert!(gl_state.valid.contains(&"GL_DEPTH_TEST".to_string()));
    // shared enums are listed once.
    let count = gl_state
        .valid
        .iter()
        .filter(|v| v.as_str() == "GL_BLEND_COLOR")
        .count();
    assert_eq!(count, 1);

    // the static table is left as it was.
    let def = NAMED_TYPES.iter().find(|def| def.name == "Capability").unwrap();
    assert!(def.valid.is_empty());
}

#[test]
fn test_undefined_enums_are_reported() {
    let err = Config::new(Vec::new()).unwrap_err();
    assert!(err.to_string().starts_with("undefined enums: "));
}

#[test]
fn test_missing_function_info_is_default() {
    let config = Config::new(test_defines()).unwrap();
    assert_eq!(config.function_info("ActiveTexture"), &FunctionInfo::DEFAULT);
    assert!(!config.has_function_info("ActiveTexture"));
}

#[test]
fn test_num_values() {
    let config = Config::new(test_defines()).unwrap();
    assert_eq!(config.num_values("GL_COLOR_WRITEMASK"), Some(4));
    assert_eq!(config.num_values("GL_DEPTH_TEST"), Some(1));
    assert_eq!(config.num_values("GL_MAX_VIEWPORT_DIMS"), Some(2));
    assert_eq!(config.num_values("GL_TEXTURE_2D"), None);
}
