use anyhow::{Context as _, bail};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Define {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// name without the `gl` prefix.
    pub name: String,
    pub return_type: String,
    /// raw argument list, without the parens.
    pub args: String,
}

#[derive(Debug, Default)]
pub struct SignatureFile {
    pub defines: Vec<Define>,
    pub functions: Vec<Signature>,
}

fn parse_define(line: &str) -> anyhow::Result<Define> {
    let mut parts = line.split_whitespace();
    let (Some("#define"), Some(name), Some(value), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        bail!("malformed define");
    };
    if !name.starts_with("GL_") {
        bail!("define {name} is not a GL enum");
    }
    Ok(Define {
        name: name.to_string(),
        value: value.to_string(),
    })
}

fn parse_function(line: &str) -> anyhow::Result<Signature> {
    let Some(rest) = line.strip_prefix("GL_APICALL ") else {
        bail!("missing GL_APICALL");
    };
    let (return_type, rest) = rest.split_once(" GL_APIENTRY ").context("missing GL_APIENTRY")?;
    let (name, rest) = rest.split_once('(').context("missing argument list")?;
    let Some(args) = rest.trim_end().strip_suffix(");") else {
        bail!("argument list is not terminated with );");
    };
    let name = name.trim();
    let Some(name) = name.strip_prefix("gl") else {
        bail!("{name} does not start with gl");
    };
    Ok(Signature {
        name: name.to_string(),
        return_type: return_type.trim().to_string(),
        args: args.trim().to_string(),
    })
}

pub fn parse_signatures(input: &str) -> anyhow::Result<SignatureFile> {
    let mut file = SignatureFile::default();
    for (i, line) in input.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        if line.starts_with("#define") {
            let define = parse_define(line).with_context(|| format!("line {}", i + 1))?;
            file.defines.push(define);
        } else {
            let func = parse_function(line).with_context(|| format!("line {}", i + 1))?;
            file.functions.push(func);
        }
    }
    log::debug!(
        "parsed {} defines and {} functions",
        file.defines.len(),
        file.functions.len()
    );
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_signatures() {
        let input = indoc::indoc! {"
            // comment
            #define GL_TEXTURE_2D 0x0DE1

            GL_APICALL void GL_APIENTRY glBindTexture (GLenumTextureBindTarget target, GLidBindTexture texture);
            GL_APICALL GLboolean GL_APIENTRY glIsTexture (GLuint texture);
            GL_APICALL void GL_APIENTRY glFinish (void);
        "};
        let file = parse_signatures(input).unwrap();
        assert_eq!(
            file.defines,
            [Define {
                name: "GL_TEXTURE_2D".to_string(),
                value: "0x0DE1".to_string()
            }]
        );
        assert_eq!(file.functions.len(), 3);
        assert_eq!(file.functions[0].name, "BindTexture");
        assert_eq!(
            file.functions[0].args,
            "GLenumTextureBindTarget target, GLidBindTexture texture"
        );
        assert_eq!(file.functions[1].return_type, "GLboolean");
        assert_eq!(file.functions[2].args, "void");
    }

    #[test]
    fn test_reports_line() {
        let err = parse_signatures("#define GL_A 1\nGL_APICALL void glNope (void);\n").unwrap_err();
        assert_eq!(err.to_string(), "line 2");
    }
}
