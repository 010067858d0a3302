pub mod code_generator;
pub mod jwt;
pub mod non_fatal;
pub mod password;
pub mod validation;

pub use code_generator::{generate_code_suffix, new_id};
pub use jwt::*;
pub use non_fatal::NonFatal;
pub use password::*;
pub use validation::*;
