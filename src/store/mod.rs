pub mod field_cache;
pub mod prompt;
pub mod rule_set_store;
pub mod traits;

pub use field_cache::*;
pub use prompt::*;
pub use rule_set_store::*;
pub use traits::*;
