//! naming conventions shared by all emitters.

/// `TexImage2D` -> `tex_image_2d`, `modeRGB` -> `mode_rgb`, `GLState` -> `gl_state`.
pub fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if i > 0 {
            let prev = chars[i - 1];
            let next = chars.get(i + 1).copied();
            let boundary = if c.is_ascii_uppercase() {
                prev.is_ascii_lowercase()
                    || (prev.is_ascii_uppercase() && next.is_some_and(|n| n.is_ascii_lowercase()))
            } else if c.is_ascii_digit() {
                prev.is_ascii_alphabetic()
            } else {
                false
            };
            if boundary {
                out.push('_');
            }
        }
        out.push(c.to_ascii_lowercase());
    }
    out
}

pub fn screaming_snake_case(name: &str) -> String {
    snake_case(name).to_ascii_uppercase()
}

const KEYWORDS: &[&str] = &[
    "as", "fn", "impl", "in", "loop", "match", "mod", "move", "ref", "static", "struct", "type",
    "use",
];

pub fn rust_ident(name: &str) -> String {
    if KEYWORDS.contains(&name) {
        format!("r#{name}")
    } else {
        name.to_string()
    }
}

/// `GL_TEXTURE_2D` -> `TEXTURE_2D`. the generated enums drop the prefix.
pub fn const_name(token: &str) -> String {
    match token {
        "true" => "TRUE".to_string(),
        "false" => "FALSE".to_string(),
        other => other.strip_prefix("GL_").unwrap_or(other).to_string(),
    }
}

pub fn is_numeric_token(token: &str) -> bool {
    let digits = token.strip_prefix('-').unwrap_or(token);
    !digits.is_empty()
        && (digits.chars().all(|c| c.is_ascii_digit())
            || digits
                .strip_prefix("0x")
                .is_some_and(|hex| hex.chars().all(|c| c.is_ascii_hexdigit())))
}

/// plural field name of a resource in the id maps: `Texture` -> `textures`.
pub fn resource_field(resource: &str) -> String {
    format!("{}s", snake_case(resource))
}

#[test]
fn test_snake_case() {
    assert_eq!(snake_case("TexImage2D"), "tex_image_2d");
    assert_eq!(snake_case("Uniform4fv"), "uniform_4fv");
    assert_eq!(snake_case("UniformMatrix4fv"), "uniform_matrix_4fv");
    assert_eq!(snake_case("modeRGB"), "mode_rgb");
    assert_eq!(snake_case("GLState"), "gl_state");
    assert_eq!(snake_case("BlendBarrierKHR"), "blend_barrier_khr");
    assert_eq!(snake_case("zNear"), "z_near");
    assert_eq!(snake_case("GenTexturesImmediate"), "gen_textures_immediate");
}

#[test]
fn test_rust_ident() {
    assert_eq!(rust_ident("type"), "r#type");
    assert_eq!(rust_ident("ref"), "r#ref");
    assert_eq!(rust_ident("target"), "target");
}

#[test]
fn test_const_name() {
    assert_eq!(const_name("GL_TEXTURE_2D"), "TEXTURE_2D");
    assert_eq!(const_name("false"), "FALSE");
    assert_eq!(const_name("4"), "4");
    assert!(is_numeric_token("4"));
    assert!(is_numeric_token("0xFFFFFFFF"));
    assert!(!is_numeric_token("GL_ONE"));
}
