use std::sync::Arc;

use tracing::debug;

use crate::{
    basic_elements::{
        cairo_value::{CairoType, CairoValue},
        calldata::Calldata,
        felt::selector_from_name,
    },
    client::Provider,
    error::{Error, Result},
    types::{
        BlockId, Call, Felt, FunctionCall,
        abi::{Abi, AbiFunction},
    },
};

/// A deployed contract bound to its interface. Methods are looked up by name
/// in the ABI and their arguments and results are encoded from the declared
/// types.
#[derive(Clone)]
pub struct Contract {
    abi: Abi,
    address: Felt,
    provider: Arc<dyn Provider>,
}

impl Contract {
    pub fn new(abi: Abi, address: Felt, provider: Arc<dyn Provider>) -> Self {
        Self {
            abi,
            address,
            provider,
        }
    }

    pub fn address(&self) -> Felt {
        self.address
    }

    pub fn abi(&self) -> &Abi {
        &self.abi
    }

    fn function(&self, method: &str) -> Result<&AbiFunction> {
        self.abi.find_function(method).ok_or_else(|| {
            Error::invalid_argument(format!(
                "method '{}' is not in the interface of {:#x}",
                method, self.address
            ))
        })
    }

    fn encode_arguments(function: &AbiFunction, args: &[CairoValue]) -> Result<Vec<Felt>> {
        if function.inputs.len() != args.len() {
            return Err(Error::invalid_argument(format!(
                "'{}' expects {} arguments, got {}",
                function.name,
                function.inputs.len(),
                args.len()
            )));
        }

        let mut calldata = Calldata::new();
        for (input, value) in function.inputs.iter().zip(args) {
            CairoType::parse(&input.ty)?
                .encode(value, &mut calldata)
                .map_err(|e| {
                    Error::invalid_argument(format!("argument '{}' of '{}': {}", input.name, function.name, e))
                })?;
        }

        Ok(calldata.into_felts())
    }

    /// Builds the call descriptor of `method` without sending anything.
    pub fn populate(&self, method: &str, args: &[CairoValue]) -> Result<Call> {
        let function = self.function(method)?;
        let calldata = Self::encode_arguments(function, args)?;

        Ok(Call {
            to: self.address,
            selector: selector_from_name(method)?,
            calldata,
            method: method.to_string(),
        })
    }

    /// Runs a read-only call at the latest block and decodes its outputs.
    pub async fn call(&self, method: &str, args: &[CairoValue]) -> Result<Vec<CairoValue>> {
        let function = self.function(method)?;

        let request = FunctionCall {
            contract_address: self.address,
            entry_point_selector: selector_from_name(method)?,
            calldata: Self::encode_arguments(function, args)?,
        };

        debug!(method, contract = %format!("{:#x}", self.address), "view call");

        let raw = self.provider.call(&request, BlockId::Latest).await?;

        let mut reader = Calldata::from_felts(raw);
        function
            .outputs
            .iter()
            .map(|output| CairoType::parse(&output.ty)?.decode(&mut reader))
            .collect()
    }

    /// Same as `call` for methods with exactly one output.
    pub async fn call_single(&self, method: &str, args: &[CairoValue]) -> Result<CairoValue> {
        let mut values = self.call(method, args).await?;

        if values.len() != 1 {
            return Err(Error::transport(format!(
                "'{}' returned {} values, expected one",
                method,
                values.len()
            )));
        }

        Ok(values.remove(0))
    }
}
