pub mod letter;
pub mod row;

pub use letter::*;
pub use row::*;
