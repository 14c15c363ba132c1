//! Loads the interface (ABI) of a deployed contract, either from the network
//! or from a local cache file written by `export_interface`.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, info};

use crate::{
    client::Provider,
    error::{Error, Result},
    types::{BlockId, Felt, abi::Abi},
};

/// Where a contract interface comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterfaceSource {
    Network,
    Cache(PathBuf),
}

/// Reads the class of the contract deployed at `address` and parses its ABI.
pub async fn fetch_interface(provider: &dyn Provider, address: Felt) -> Result<Abi> {
    let class = provider
        .get_class_at(BlockId::Latest, address)
        .await
        .map_err(|e| {
            Error::InterfaceUnavailable(format!("cannot fetch class at {:#x}: {}", address, e))
        })?;

    let raw = class.get("abi").ok_or_else(|| {
        Error::InterfaceUnavailable(format!("class at {:#x} has no ABI", address))
    })?;

    let abi = Abi::from_class_abi(raw)?;
    debug!(address = %format!("{:#x}", address), entries = abi.0.len(), "fetched interface");

    Ok(abi)
}

pub fn load_interface(path: impl AsRef<Path>) -> Result<Abi> {
    let path = path.as_ref();

    let text = fs::read_to_string(path).map_err(|e| {
        Error::InterfaceUnavailable(format!("cannot read {}: {}", path.display(), e))
    })?;

    serde_json::from_str(&text).map_err(|e| {
        Error::InterfaceUnavailable(format!("malformed ABI in {}: {}", path.display(), e))
    })
}

/// Writes `abi` as pretty JSON, replacing the file if it exists.
pub fn save_interface(path: impl AsRef<Path>, abi: &Abi) -> Result<()> {
    let path = path.as_ref();

    let text = serde_json::to_string_pretty(abi)
        .map_err(|e| Error::InterfaceUnavailable(format!("cannot serialize ABI: {}", e)))?;

    fs::write(path, text).map_err(|e| {
        Error::InterfaceUnavailable(format!("cannot write {}: {}", path.display(), e))
    })
}

/// Fetches the interface of `address` and caches it at `path`.
pub async fn export_interface(
    provider: &dyn Provider,
    address: Felt,
    path: impl AsRef<Path>,
) -> Result<Abi> {
    let abi = fetch_interface(provider, address).await?;
    save_interface(&path, &abi)?;

    info!(
        address = %format!("{:#x}", address),
        path = %path.as_ref().display(),
        "interface exported"
    );

    Ok(abi)
}

pub async fn resolve_interface(
    source: &InterfaceSource,
    provider: &dyn Provider,
    address: Felt,
) -> Result<Abi> {
    match source {
        InterfaceSource::Network => fetch_interface(provider, address).await,
        InterfaceSource::Cache(path) => load_interface(path),
    }
}
