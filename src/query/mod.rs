pub mod pagination;
pub mod server;

pub use pagination::*;
pub use server::*;
