pub mod id;
pub mod transform;

pub use id::*;
pub use transform::*;
