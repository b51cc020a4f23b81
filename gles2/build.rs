use std::env;
use std::path::{Path, PathBuf};

fn main() -> anyhow::Result<()> {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=../gles2-generator");
    println!("cargo:rerun-if-changed=gl-specs");

    let out_dir = PathBuf::from(&env::var("OUT_DIR")?);
    gles2_generator::generate(
        Path::new("gl-specs/gles2_cmd_buffer_functions.txt"),
        &out_dir,
    )?;

    Ok(())
}
