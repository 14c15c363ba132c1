pub mod provider;
pub mod rpc_client;

#[cfg(test)]
pub mod mock;

pub use provider::Provider;
pub use rpc_client::JsonRpcClient;
