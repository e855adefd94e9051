pub mod fetcher;
pub mod nav;
pub mod window;

pub use fetcher::{RangeFetcher, ServiceFetcher};
pub use nav::{LetterRange, Navigator};
pub use window::WindowCache;
