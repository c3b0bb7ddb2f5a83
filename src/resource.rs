//! Generic CRUD engine over the resource catalog.
//!
//! Every resource kind follows the same lifecycle against the service, so
//! one engine drives them all: the catalog entry supplies the path and the
//! field table, and the functions here build the request envelope, send it,
//! and map the response back into state.
//!
//! # Wire encoding
//!
//! The service stores booleans as `0`/`1` integers and mangles single
//! quotes, so flagged fields are translated on the way out (bool to int,
//! quotes stripped) and back (int to bool, quotes stripped again). Checks
//! placed on `all` report the entity list of every agent; the read path
//! normalizes `entities` back to `[]` so state stays stable.

use serde_json::Value;
use tracing::{debug, warn};

use crate::catalog::{field, FieldDef, FieldKind, ResourceDef};
use crate::client::Client;
use crate::error::ProviderError;
use crate::types::{decode_created, decode_object, Envelope};

/// Build the request envelope for a create or update from planned state.
///
/// Fields are emitted in catalog order. Missing optional fields fall back
/// to their declared default, or to the zero value of their type, matching
/// what the service expects for a full-object PUT.
pub fn build_envelope(def: &ResourceDef, state: &Value) -> Result<Envelope, ProviderError> {
    let obj = state.as_object().ok_or_else(|| {
        ProviderError::Validation(format!(
            "{} state must be a JSON object",
            def.type_name
        ))
    })?;

    let mut envelope = Envelope::new();
    for f in def.fields() {
        let value = match obj.get(f.name) {
            Some(v) if !v.is_null() => encode_field(f, v),
            _ => match f.default {
                Some(default) => default.to_value(),
                None => zero_value(f),
            },
        };
        envelope.insert(f.name.to_string(), value);
    }
    Ok(envelope)
}

/// Map a read response back into resource state.
///
/// The durable handle goes in as `id`; catalog fields are copied over with
/// the inverse wire translation applied.
pub fn state_from_remote(
    def: &ResourceDef,
    handle: &str,
    body: &[u8],
) -> Result<Value, ProviderError> {
    let remote = decode_object(body)?;

    let mut state = Envelope::new();
    state.insert(field::ID.to_string(), Value::from(handle));

    let place_is_all = remote
        .get(field::PLACE)
        .and_then(Value::as_str)
        .map(|p| p == "all")
        .unwrap_or(false);

    for f in def.fields() {
        let value = match remote.get(f.name) {
            Some(v) if !v.is_null() => decode_field(f, v),
            _ => zero_state_value(f),
        };
        // A check placed everywhere reports the entities of every agent;
        // state keeps the configured empty list instead.
        let value = if f.name == field::ENTITIES && place_is_all {
            Value::Array(Vec::new())
        } else {
            value
        };
        state.insert(f.name.to_string(), value);
    }

    Ok(Value::Object(state))
}

/// Create a remote entity from planned state and return the resulting state.
///
/// The create response carries the assigned id; the entity is then read
/// back so state reflects what the service actually stored.
pub async fn create(
    client: &Client,
    def: &ResourceDef,
    planned: &Value,
) -> Result<Value, ProviderError> {
    let envelope = build_envelope(def, planned)?;
    debug!(resource = def.type_name, "creating");

    let bytes = client.post(def.path, &Value::Object(envelope)).await?;
    let handle = decode_created(&bytes)?;
    debug!(resource = def.type_name, %handle, "created");

    read(client, def, &handle).await
}

/// Read a remote entity by its durable handle.
///
/// A 404 becomes [`ProviderError::NotFound`] so callers can drop the
/// entity from state.
pub async fn read(
    client: &Client,
    def: &ResourceDef,
    handle: &str,
) -> Result<Value, ProviderError> {
    let bytes = match client.get(&item_path(def, handle)).await {
        Ok(bytes) => bytes,
        Err(e) if e.status() == Some(reqwest::StatusCode::NOT_FOUND) => {
            return Err(ProviderError::NotFound(format!(
                "{} {}",
                def.type_name, handle
            )));
        }
        Err(e) => return Err(e),
    };
    state_from_remote(def, handle, &bytes)
}

/// Update a remote entity in place and return the refreshed state.
///
/// When the network port changed between prior and planned state the
/// envelope additionally carries `reconfigure: true` so the service rebinds
/// the listener.
pub async fn update(
    client: &Client,
    def: &ResourceDef,
    handle: &str,
    prior: &Value,
    planned: &Value,
) -> Result<Value, ProviderError> {
    let mut envelope = build_envelope(def, planned)?;
    if port_changed(def, prior, planned) {
        envelope.insert(field::RECONFIGURE.to_string(), Value::Bool(true));
    }
    debug!(resource = def.type_name, %handle, "updating");

    client
        .put(&item_path(def, handle), &Value::Object(envelope))
        .await?;

    read(client, def, handle).await
}

/// Delete a remote entity by its durable handle.
///
/// A 404 means the entity is already gone, which is the state delete is
/// trying to reach, so it counts as success.
pub async fn delete(
    client: &Client,
    def: &ResourceDef,
    handle: &str,
) -> Result<(), ProviderError> {
    debug!(resource = def.type_name, %handle, "deleting");
    match client.delete(&item_path(def, handle)).await {
        Ok(_) => Ok(()),
        Err(e) if e.status() == Some(reqwest::StatusCode::NOT_FOUND) => {
            warn!(resource = def.type_name, %handle, "already deleted");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

fn item_path(def: &ResourceDef, handle: &str) -> String {
    format!("{}/{}", def.path, handle)
}

fn encode_field(f: &FieldDef, value: &Value) -> Value {
    match (f.kind, value) {
        (FieldKind::Bool, Value::Bool(b)) if f.bool_as_int => {
            Value::from(if *b { 1 } else { 0 })
        }
        (FieldKind::Str, Value::String(s)) if f.strip_quotes => {
            Value::from(s.replace('\'', ""))
        }
        _ => value.clone(),
    }
}

fn decode_field(f: &FieldDef, value: &Value) -> Value {
    match f.kind {
        FieldKind::Bool => match value {
            Value::Bool(b) => Value::Bool(*b),
            Value::Number(n) => Value::Bool(n.as_f64().unwrap_or(0.0) != 0.0),
            other => other.clone(),
        },
        FieldKind::Str if f.strip_quotes => match value {
            Value::String(s) => Value::from(s.replace('\'', "")),
            other => other.clone(),
        },
        _ => value.clone(),
    }
}

/// Zero value on the wire: flagged bools are sent as `0`.
fn zero_value(f: &FieldDef) -> Value {
    match f.kind {
        FieldKind::Str => Value::from(""),
        FieldKind::Int => Value::from(0),
        FieldKind::Bool if f.bool_as_int => Value::from(0),
        FieldKind::Bool => Value::Bool(false),
        FieldKind::IntList => Value::Array(Vec::new()),
    }
}

/// Zero value in state: bools stay bools.
fn zero_state_value(f: &FieldDef) -> Value {
    match f.kind {
        FieldKind::Str => Value::from(""),
        FieldKind::Int => Value::from(0),
        FieldKind::Bool => Value::Bool(false),
        FieldKind::IntList => Value::Array(Vec::new()),
    }
}

fn port_changed(def: &ResourceDef, prior: &Value, planned: &Value) -> bool {
    if !def.has_field(field::PORT) {
        return false;
    }
    let before = prior.get(field::PORT);
    let after = planned.get(field::PORT);
    before.is_some() && after.is_some() && before != after
}
