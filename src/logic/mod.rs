pub mod dirty;
pub mod tree;
pub mod validate;

pub use dirty::*;
pub use tree::*;
pub use validate::*;
