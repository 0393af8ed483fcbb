pub mod commit;
pub mod common;
pub mod error;
pub mod fields;
pub mod raw;
pub mod rules;

pub use commit::*;
pub use common::*;
pub use error::*;
pub use fields::*;
pub use raw::*;
pub use rules::*;
