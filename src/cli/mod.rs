pub mod import;

pub use import::{ClearMode, ImportConfig};
