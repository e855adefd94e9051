pub mod alphabet;
pub mod state;

pub use alphabet::{LetterIndex, LetterIndexBuilder};
pub use state::{IndexState, RetryPolicy};
