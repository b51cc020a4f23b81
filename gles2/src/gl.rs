mod types {
    include!(concat!(env!("OUT_DIR"), "/gl_types_generated.rs"));
}

mod enums {
    use super::types::*;

    include!(concat!(env!("OUT_DIR"), "/gl_enums_generated.rs"));
}

pub use enums::*;
pub use types::*;
