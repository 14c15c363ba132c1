use std::{collections::BTreeMap, fmt, str::FromStr};

use crate::{
    basic_elements::{amount::parse_token_amount, cairo_value::CairoValue, felt::felt_from_str},
    contract::Contract,
    error::{Error, Result},
    types::Call,
};

/// The state-changing operations the builder knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// `mint_item(recipient, uri)` on an ERC-721 collection.
    Mint,
    /// `transfer(recipient, amount)` on an ERC-20 token.
    Transfer,
}

impl Intent {
    pub fn method(&self) -> &'static str {
        match self {
            Intent::Mint => "mint_item",
            Intent::Transfer => "transfer",
        }
    }
}

impl FromStr for Intent {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mint" => Ok(Intent::Mint),
            "transfer" => Ok(Intent::Transfer),
            other => Err(Error::invalid_argument(format!("unknown intent '{}'", other))),
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intent::Mint => f.write_str("mint"),
            Intent::Transfer => f.write_str("transfer"),
        }
    }
}

/// Turns an intent and its named arguments into a call on one contract.
/// Nothing here touches the network.
pub struct TransactionBuilder<'a> {
    contract: &'a Contract,
}

fn required<'m>(args: &'m BTreeMap<String, String>, intent: Intent, name: &str) -> Result<&'m str> {
    args.get(name)
        .map(String::as_str)
        .ok_or_else(|| Error::invalid_argument(format!("{} requires '{}'", intent, name)))
}

impl<'a> TransactionBuilder<'a> {
    pub fn new(contract: &'a Contract) -> Self {
        Self { contract }
    }

    pub fn build(&self, intent: Intent, args: &BTreeMap<String, String>) -> Result<Call> {
        let recipient = felt_from_str(required(args, intent, "recipient")?)?;

        let values = match intent {
            Intent::Mint => {
                let uri = required(args, intent, "uri")?;
                vec![
                    CairoValue::Address(recipient),
                    CairoValue::ByteArray(uri.to_string()),
                ]
            }
            Intent::Transfer => {
                let amount = parse_token_amount(required(args, intent, "amount")?)?;
                vec![CairoValue::Address(recipient), CairoValue::U256(amount)]
            }
        };

        self.contract.populate(intent.method(), &values)
    }

    pub fn mint(&self, recipient: &str, uri: &str) -> Result<Call> {
        let args = BTreeMap::from([
            ("recipient".to_string(), recipient.to_string()),
            ("uri".to_string(), uri.to_string()),
        ]);

        self.build(Intent::Mint, &args)
    }

    pub fn transfer(&self, recipient: &str, amount: &str) -> Result<Call> {
        let args = BTreeMap::from([
            ("recipient".to_string(), recipient.to_string()),
            ("amount".to_string(), amount.to_string()),
        ]);

        self.build(Intent::Transfer, &args)
    }
}
