//! Programmable transaction payload assembly.
//!
//! A payload composes one or more Move calls into a single transaction.
//! Receiving call signatures are positional, so argument order in the built
//! payload exactly matches declaration order; that ordering is a contract,
//! not an implementation detail. A call may consume the result of an
//! earlier call in the same payload (e.g. splitting funds and then
//! transferring the split), which is validated at assembly time.
//!
//! Assembly is pure: no network I/O happens here. The payload encodes to
//! canonical JSON bytes for signing and submission.

use serde::{Deserialize, Serialize};

use sui_artifact_types::{
    address::{is_hex_address, parse_object_id},
    ArtifactError, SharedObjectRef,
};

/// A typed pure value bound into a call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PureValue {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    /// Encoded as a decimal string: JSON numbers cannot carry a full u128.
    U128(#[serde(with = "u128_string")] u128),
    Address(String),
    Str(String),
    Bytes(Vec<u8>),
}

mod u128_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Argument to a Move call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallArg {
    /// A pure (non-object) value.
    Pure(PureValue),
    /// A shared object reference produced by the resolver.
    SharedObject(SharedObjectRef),
    /// An object owned by the sender, referenced by id.
    OwnedObject(String),
    /// The result of an earlier call in the same payload, by call index.
    Result { call: usize },
}

/// One Move call: target, type arguments, and positional arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveCallSpec {
    /// `package::module::function`.
    pub target: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_arguments: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<CallArg>,
}

impl MoveCallSpec {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            type_arguments: Vec::new(),
            arguments: Vec::new(),
        }
    }

    /// Builder: append a type argument.
    pub fn type_argument(mut self, type_arg: impl Into<String>) -> Self {
        self.type_arguments.push(type_arg.into());
        self
    }

    /// Builder: append the next positional argument.
    pub fn argument(mut self, arg: CallArg) -> Self {
        self.arguments.push(arg);
        self
    }
}

/// A fully-assembled, inert transaction payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionPayload {
    pub calls: Vec<MoveCallSpec>,
}

impl TransactionPayload {
    pub fn call_count(&self) -> usize {
        self.calls.len()
    }

    /// Canonical JSON bytes of the payload, as signed and submitted.
    pub fn encode_to_bytes(&self) -> Result<Vec<u8>, ArtifactError> {
        serde_json::to_vec(self).map_err(|e| {
            ArtifactError::precondition(format!("payload not serializable: {e}"))
        })
    }
}

/// Assembles validated [`TransactionPayload`]s.
#[derive(Debug, Default)]
pub struct PtbBuilder {
    calls: Vec<MoveCallSpec>,
}

impl PtbBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a call. Calls execute in the order they are added.
    pub fn call(mut self, spec: MoveCallSpec) -> Self {
        self.calls.push(spec);
        self
    }

    /// Validate and produce the payload.
    ///
    /// All failures here are [`ArtifactError::PreconditionFailed`] (or
    /// [`ArtifactError::MissingSharedVersion`] for a shared reference that
    /// lost its version metadata): the caller supplied something the
    /// receiving signature cannot accept, and retrying will not help.
    pub fn build(self) -> Result<TransactionPayload, ArtifactError> {
        if self.calls.is_empty() {
            return Err(ArtifactError::precondition(
                "payload has no calls; add at least one MoveCallSpec",
            ));
        }

        let mut calls = Vec::with_capacity(self.calls.len());
        for (index, mut spec) in self.calls.into_iter().enumerate() {
            validate_target(&spec.target)?;

            for arg in spec.arguments.iter_mut() {
                match arg {
                    CallArg::Pure(_) => {}
                    CallArg::SharedObject(shared) => {
                        if shared.initial_shared_version.trim().is_empty() {
                            return Err(ArtifactError::MissingSharedVersion {
                                object_id: shared.object_id.clone(),
                            });
                        }
                    }
                    CallArg::OwnedObject(id) => {
                        // Normalize in place so the payload is canonical.
                        *id = parse_object_id(id)?;
                    }
                    CallArg::Result { call } => {
                        if *call >= index {
                            return Err(ArtifactError::precondition(format!(
                                "call #{index} references the result of call #{call}, \
                                 which has not executed yet; results may only flow forward"
                            )));
                        }
                    }
                }
            }

            calls.push(spec);
        }

        Ok(TransactionPayload { calls })
    }
}

fn validate_target(target: &str) -> Result<(), ArtifactError> {
    let parts: Vec<&str> = target.split("::").collect();
    if parts.len() != 3 {
        return Err(ArtifactError::precondition(format!(
            "call target `{target}` must be package::module::function"
        )));
    }
    if !is_hex_address(parts[0]) {
        return Err(ArtifactError::precondition(format!(
            "call target `{target}` has a non-address package segment"
        )));
    }
    for segment in &parts[1..] {
        let mut chars = segment.chars();
        let head_ok = chars
            .next()
            .map(|c| c.is_ascii_alphabetic() || c == '_')
            .unwrap_or(false);
        if !head_ok || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(ArtifactError::precondition(format!(
                "call target `{target}` has an invalid identifier `{segment}`"
            )));
        }
    }
    Ok(())
}
