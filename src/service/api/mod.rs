pub mod generate;
pub mod health;

pub use generate::generate_memo;
pub use health::{health_check, version};
