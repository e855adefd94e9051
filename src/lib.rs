#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

pub mod client;
pub mod config;
pub mod core;
pub mod error;
pub mod index;
pub mod ingest;
pub mod query;
pub mod store;
