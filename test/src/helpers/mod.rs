pub mod assertions;
pub mod session;

pub use session::{replica_dependencies, TestSession};
