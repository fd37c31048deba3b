pub mod rpc;

pub use rpc::{RetryConfig, RpcConnection, RpcError, SolanaRpcConnection, SolanaRpcUrl};
