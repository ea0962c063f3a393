//! Permit2 signing coordinator
//!
//! Assembles `(domain, types, message)` for a permit and hands it to a signer.
//! A [`Permit2`] value is never mutated: reconfiguring returns a new value, so
//! concurrent signing calls always observe one consistent configuration.

use super::domain::{default_domain, normalize_domain, DomainOverrides, Permit2Domain};
use super::type_graph::{
    build_plain_type_graph, build_witness_type_graph, TypeGraph, RESERVED_FIELD_NAMES,
};
use super::types::{PermitTransferFrom, WitnessSpec, WitnessValue};
use crate::config::Permit2Config;
use crate::eip712::{Eip712Domain, TypedData};
use crate::error::{Permit2Error, Permit2Result, ValidationError};
use crate::signer::{derive_signer, TypedDataSigner};
use crate::{log_debug, log_error, log_info};
use secrecy::ExposeSecret;
use std::fmt;
use std::sync::Arc;

/// Assembled payload, ready for a signer
struct Payload {
    domain: Permit2Domain,
    types: TypeGraph,
    message: serde_json::Value,
}

impl Payload {
    fn into_typed_data(self) -> TypedData {
        TypedData {
            primary_type: self.types.primary_type().to_string(),
            types: self.types.structs().clone(),
            domain: Eip712Domain::from(&self.domain),
            message: self.message,
        }
    }
}

/// Signs Permit2 `PermitTransferFrom` and `PermitWitnessTransferFrom` messages.
///
/// Holds a default domain and an optional default signer; both can be
/// overridden per call.
#[derive(Clone)]
pub struct Permit2 {
    domain: Permit2Domain,
    signer: Option<Arc<dyn TypedDataSigner>>,
}

impl Default for Permit2 {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Permit2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Permit2")
            .field("domain", &self.domain)
            .field("has_signer", &self.signer.is_some())
            .finish()
    }
}

impl Permit2 {
    /// Coordinator on the mainnet Permit2 domain with no signer
    pub fn new() -> Self {
        Self {
            domain: default_domain(),
            signer: None,
        }
    }

    /// Coordinator configured from domain overrides and an optional private key
    pub fn from_config(config: &Permit2Config) -> Permit2Result<Self> {
        let coordinator = Self::new().with_default_domain(&config.domain);

        match &config.signer_private_key {
            Some(key) => {
                let signer = derive_signer(key.expose_secret()).map_err(|e| {
                    Permit2Error::configuration(format!("signer private key: {}", e))
                })?;
                Ok(coordinator.with_default_signer(Arc::new(signer)))
            }
            None => Ok(coordinator),
        }
    }

    /// Returns a coordinator that signs with `signer` by default
    pub fn with_default_signer(self, signer: Arc<dyn TypedDataSigner>) -> Self {
        Self {
            signer: Some(signer),
            ..self
        }
    }

    /// Returns a coordinator whose default domain is `overrides` merged onto
    /// the mainnet Permit2 domain
    pub fn with_default_domain(self, overrides: &DomainOverrides) -> Self {
        Self {
            domain: normalize_domain(overrides),
            ..self
        }
    }

    /// Returns a coordinator whose default signer holds `private_key`
    pub fn with_signer_from_private_key(self, private_key: &str) -> Permit2Result<Self> {
        let signer = derive_signer(private_key)?;
        log_info!(
            "permit2",
            "installed local signer",
            signer_address = format!("{:?}", signer.address()),
        );
        Ok(self.with_default_signer(Arc::new(signer)))
    }

    pub fn domain(&self) -> &Permit2Domain {
        &self.domain
    }

    pub fn signer(&self) -> Option<&Arc<dyn TypedDataSigner>> {
        self.signer.as_ref()
    }

    /// Signs a `PermitTransferFrom` message.
    ///
    /// `signer` and `domain` override the configured defaults for this call.
    pub async fn sign_permit_transfer_from(
        &self,
        permit: &PermitTransferFrom,
        signer: Option<&dyn TypedDataSigner>,
        domain: Option<&DomainOverrides>,
    ) -> Permit2Result<String> {
        let signer = self.resolve_signer(signer)?;
        let payload = self.plain_payload(permit, domain)?;
        dispatch(signer, payload).await
    }

    /// Signs a `PermitWitnessTransferFrom` message binding `witness_value`.
    pub async fn sign_permit_witness_transfer_from(
        &self,
        permit: &PermitTransferFrom,
        witness_value: &WitnessValue,
        witness_spec: &WitnessSpec,
        signer: Option<&dyn TypedDataSigner>,
        domain: Option<&DomainOverrides>,
    ) -> Permit2Result<String> {
        let signer = self.resolve_signer(signer)?;
        let payload = self.witness_payload(permit, witness_value, witness_spec, domain)?;
        dispatch(signer, payload).await
    }

    /// The typed data [`Permit2::sign_permit_transfer_from`] would sign
    pub fn permit_transfer_from_typed_data(
        &self,
        permit: &PermitTransferFrom,
        domain: Option<&DomainOverrides>,
    ) -> Permit2Result<TypedData> {
        Ok(self.plain_payload(permit, domain)?.into_typed_data())
    }

    /// The typed data [`Permit2::sign_permit_witness_transfer_from`] would sign
    pub fn permit_witness_transfer_from_typed_data(
        &self,
        permit: &PermitTransferFrom,
        witness_value: &WitnessValue,
        witness_spec: &WitnessSpec,
        domain: Option<&DomainOverrides>,
    ) -> Permit2Result<TypedData> {
        Ok(self
            .witness_payload(permit, witness_value, witness_spec, domain)?
            .into_typed_data())
    }

    fn resolve_signer<'a>(
        &'a self,
        signer: Option<&'a dyn TypedDataSigner>,
    ) -> Permit2Result<&'a dyn TypedDataSigner> {
        signer
            .or_else(|| self.signer.as_deref())
            .ok_or_else(Permit2Error::signer_not_defined)
    }

    fn resolve_domain(&self, domain: Option<&DomainOverrides>) -> Permit2Domain {
        match domain {
            Some(overrides) => normalize_domain(overrides),
            None => self.domain.clone(),
        }
    }

    fn plain_payload(
        &self,
        permit: &PermitTransferFrom,
        domain: Option<&DomainOverrides>,
    ) -> Permit2Result<Payload> {
        let domain = self.resolve_domain(domain);
        let types = build_plain_type_graph();
        let message = permit.to_message()?;

        Ok(Payload {
            domain,
            types,
            message: serde_json::Value::Object(message),
        })
    }

    fn witness_payload(
        &self,
        permit: &PermitTransferFrom,
        witness_value: &WitnessValue,
        witness_spec: &WitnessSpec,
        domain: Option<&DomainOverrides>,
    ) -> Permit2Result<Payload> {
        let domain = self.resolve_domain(domain);
        let types = build_witness_type_graph(witness_spec)?;
        let message = witness_message(permit, witness_value, witness_spec)?;

        Ok(Payload {
            domain,
            types,
            message,
        })
    }
}

/// Permit fields followed by the witness value's fields
fn witness_message(
    permit: &PermitTransferFrom,
    witness_value: &WitnessValue,
    witness_spec: &WitnessSpec,
) -> Result<serde_json::Value, ValidationError> {
    if let Some(key) = witness_value
        .keys()
        .find(|key| RESERVED_FIELD_NAMES.contains(&key.as_str()))
    {
        return Err(ValidationError::ReservedWitnessKey(key.clone()));
    }

    let witness_name = &witness_spec.witness_field.name;
    if !witness_value.contains_key(witness_name) {
        return Err(ValidationError::MissingWitnessValue(witness_name.clone()));
    }

    let mut message = permit.to_message()?;
    message.extend(witness_value.iter().map(|(k, v)| (k.clone(), v.clone())));
    Ok(serde_json::Value::Object(message))
}

async fn dispatch(signer: &dyn TypedDataSigner, payload: Payload) -> Permit2Result<String> {
    let Payload {
        domain,
        types,
        message,
    } = payload;

    log_debug!(
        "permit2",
        "requesting signature",
        primary_type = types.primary_type(),
        chain_id = domain.chain_id(),
        verifying_contract = format!("{:?}", domain.verifying_contract()),
    );

    let eip712_domain = Eip712Domain::from(&domain);
    match signer.sign_typed_data(&eip712_domain, &types, &message).await {
        Ok(signature) => Ok(signature),
        Err(e) => {
            log_error!("permit2", "signer returned an error", code = format!("{:?}", e.code()));
            Err(Permit2Error::Signer(e))
        }
    }
}
