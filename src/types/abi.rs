use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Callable-method description of a contract class, as found in the `abi`
/// field of `starknet_getClassAt` (Sierra and legacy layouts).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Abi(pub Vec<AbiEntry>);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AbiEntry {
    Function(AbiFunction),
    L1Handler(AbiFunction),
    Constructor(AbiConstructor),
    Event(AbiEvent),
    Struct(AbiStruct),
    Enum(AbiEnum),
    Interface(AbiInterface),
    Impl(AbiImpl),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiParam {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub ty: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiFunction {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<AbiParam>,
    #[serde(default)]
    pub outputs: Vec<AbiOutput>,
    // Legacy classes spell it `stateMutability`
    #[serde(
        default,
        alias = "stateMutability",
        skip_serializing_if = "Option::is_none"
    )]
    pub state_mutability: Option<String>,
}

impl AbiFunction {
    pub fn is_view(&self) -> bool {
        self.state_mutability.as_deref() == Some("view")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiConstructor {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<AbiParam>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiEventField {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiEvent {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<AbiEventField>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variants: Option<Vec<AbiEventField>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keys: Option<Vec<AbiParam>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<AbiParam>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiStructMember {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiStruct {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default)]
    pub members: Vec<AbiStructMember>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiEnum {
    pub name: String,
    #[serde(default)]
    pub variants: Vec<AbiParam>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiInterface {
    pub name: String,
    #[serde(default)]
    pub items: Vec<AbiEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiImpl {
    pub name: String,
    pub interface_name: String,
}

impl Abi {
    /// Parses the `abi` field of a contract class. Sierra classes carry it as
    /// a JSON-encoded string, legacy classes as an inline array.
    pub fn from_class_abi(raw: &Value) -> Result<Self> {
        let parsed = match raw {
            Value::String(text) => serde_json::from_str(text),
            other => serde_json::from_value(other.clone()),
        };

        parsed.map_err(|e| Error::InterfaceUnavailable(format!("malformed class ABI: {}", e)))
    }

    /// Functions declared at top level or inside interfaces.
    pub fn functions(&self) -> impl Iterator<Item = &AbiFunction> {
        self.0
            .iter()
            .flat_map(|entry| match entry {
                AbiEntry::Interface(interface) => interface.items.iter().collect::<Vec<_>>(),
                other => vec![other],
            })
            .filter_map(|entry| match entry {
                AbiEntry::Function(function) => Some(function),
                _ => None,
            })
    }

    pub fn find_function(&self, name: &str) -> Option<&AbiFunction> {
        self.functions().find(|function| function.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
