pub mod account;
pub mod block_header;
pub mod network;
pub mod proof;
pub mod receipt;
pub mod roots;
pub mod rpc;
pub mod transaction;

pub use account::*;
pub use block_header::*;
pub use network::*;
pub use proof::*;
pub use receipt::*;
pub use roots::*;
pub use rpc::*;
pub use transaction::*;
