use crate::gl::*;

/// the values a GL argument may take.
#[derive(Debug, Clone)]
pub struct ValueValidator<T> {
    values: Vec<T>,
}

impl<T: Copy + PartialEq> ValueValidator<T> {
    pub fn new(values: &[T]) -> Self {
        Self {
            values: values.to_vec(),
        }
    }

    /// extensions widen what is accepted.
    pub fn add_value(&mut self, value: T) {
        if !self.values.contains(&value) {
            self.values.push(value);
        }
    }

    pub fn is_valid(&self, value: T) -> bool {
        self.values.contains(&value)
    }
}

include!(concat!(env!("OUT_DIR"), "/validators_generated.rs"));

#[test]
fn test_add_value() {
    let mut validators = Validators::new();
    assert!(!validators.equation.is_valid(MIN));
    validators.equation.add_value(MIN);
    validators.equation.add_value(MIN);
    assert!(validators.equation.is_valid(MIN));
}
