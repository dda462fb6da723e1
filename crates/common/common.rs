pub use ethereum_types::*;
pub mod constants;
pub mod serde_utils;
pub mod types;
pub use bytes::Bytes;
pub mod errors;
pub mod utils;
