mod json;
mod validation;

pub use json::{load_config_or_default, load_instance_from_dir};
pub use validation::{validate_input, ValidationResult};
