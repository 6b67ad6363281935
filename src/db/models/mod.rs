pub mod code;

pub use code::{CodeFilter, DeletedCode, StoredCode};
