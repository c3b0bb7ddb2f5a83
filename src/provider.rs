//! The provider seam and its registry-driven implementation.
//!
//! [`ProviderService`] is the trait an orchestrating tool talks to:
//! schema discovery, configuration, validation, plan, and the CRUD
//! lifecycle. [`RmonProvider`] implements it for every resource kind in
//! the catalog, so adding a kind to the registry is all it takes to expose
//! it here.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::info;

use crate::catalog::{self, field, FieldDef, FieldKind, ResourceDef};
use crate::client::Client;
use crate::config::ClientConfig;
use crate::error::ProviderError;
use crate::resource;
use crate::schema::{Attribute, AttributeType, Diagnostic, ProviderSchema, Schema};
use crate::types::{AttributeChange, ImportedResource, PlanResult};
use crate::validation;

/// Provider metadata for capability discovery.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProviderMetadata {
    /// List of resource type names.
    pub resources: Vec<String>,
}

/// Trait that provider implementations must implement.
///
/// This is the seam between the orchestrating tool and the provider:
/// ergonomic Rust types on both sides, no transport assumptions.
///
/// # Example
///
/// ```ignore
/// use rmon_provider::{ProviderService, RmonProvider};
/// use serde_json::json;
///
/// let provider = RmonProvider::new();
/// provider
///     .configure(json!({
///         "base_url": "https://rmon.example.com",
///         "login": "admin",
///         "password": "secret",
///     }))
///     .await?;
/// let state = provider
///     .create("rmon_group", json!({"name": "ops"}))
///     .await?;
/// ```
#[async_trait::async_trait]
pub trait ProviderService: Send + Sync + 'static {
    /// Return the provider's schema including all resources.
    fn schema(&self) -> ProviderSchema;

    /// Return provider metadata for capability discovery.
    /// By default, this is derived from the schema.
    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            resources: self.schema().resources.keys().cloned().collect(),
        }
    }

    /// Validate the provider configuration before configuring.
    /// Returns diagnostics (errors and warnings).
    async fn validate_provider_config(
        &self,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let _ = config;
        Ok(vec![])
    }

    /// Configure the provider with credentials and settings.
    /// Returns diagnostics (errors and warnings).
    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError>;

    /// Stop the provider gracefully.
    async fn stop(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    /// Validate a resource's configuration before planning.
    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let _ = (resource_type, config);
        Ok(vec![])
    }

    /// Plan changes for a resource.
    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
        config: Value,
    ) -> Result<PlanResult, ProviderError>;

    /// Create a new resource.
    async fn create(
        &self,
        resource_type: &str,
        planned_state: Value,
    ) -> Result<Value, ProviderError>;

    /// Read the current state of a resource.
    async fn read(&self, resource_type: &str, current_state: Value)
        -> Result<Value, ProviderError>;

    /// Update an existing resource.
    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError>;

    /// Delete a resource.
    async fn delete(&self, resource_type: &str, current_state: Value)
        -> Result<(), ProviderError>;

    /// Import existing infrastructure into management.
    async fn import_resource(
        &self,
        resource_type: &str,
        _id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        Err(ProviderError::UnknownResource(format!(
            "Import not supported for resource type: {}",
            resource_type
        )))
    }
}

/// The RMON provider: one implementation for the whole resource registry.
#[derive(Debug, Default)]
pub struct RmonProvider {
    client: RwLock<Option<Arc<Client>>>,
}

impl RmonProvider {
    /// Create an unconfigured provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider around an already-built client. Used by tests and
    /// embedders that manage configuration themselves.
    pub fn with_client(client: Client) -> Self {
        Self {
            client: RwLock::new(Some(Arc::new(client))),
        }
    }

    async fn client(&self) -> Result<Arc<Client>, ProviderError> {
        self.client.read().await.clone().ok_or_else(|| {
            ProviderError::Configuration("provider is not configured".to_string())
        })
    }

    fn resolve(resource_type: &str) -> Result<&'static ResourceDef, ProviderError> {
        catalog::lookup(resource_type)
            .ok_or_else(|| ProviderError::UnknownResource(resource_type.to_string()))
    }

    fn handle_of(def: &ResourceDef, state: &Value) -> Result<String, ProviderError> {
        state
            .get(field::ID)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                ProviderError::Validation(format!("{} state has no id", def.type_name))
            })
    }
}

/// Schema for a single resource kind, generated from its catalog entry.
///
/// Every kind gets a computed `id` on top of its declared fields.
pub fn resource_schema(def: &ResourceDef) -> Schema {
    let mut schema = Schema::v0().with_attribute(field::ID, Attribute::computed_string());
    for f in def.fields() {
        schema = schema.with_attribute(f.name, attribute_from_field(f));
    }
    schema
}

/// Schema for the provider configuration block.
pub fn provider_config_schema() -> Schema {
    Schema::v0()
        .with_attribute(
            "base_url",
            Attribute::required_string().with_description("Base URL of the RMON installation."),
        )
        .with_attribute(
            "login",
            Attribute::required_string().with_description("Login presented to the RMON API."),
        )
        .with_attribute(
            "password",
            Attribute::required_string()
                .sensitive()
                .with_description("Password presented to the RMON API."),
        )
        .with_attribute(
            "terraform_version",
            Attribute::optional_string()
                .with_description("Orchestrating tool version, reported in the user agent."),
        )
}

fn attribute_from_field(f: &FieldDef) -> Attribute {
    let attr_type = match f.kind {
        FieldKind::Str => AttributeType::String,
        FieldKind::Int => AttributeType::Int64,
        FieldKind::Bool => AttributeType::Bool,
        FieldKind::IntList => AttributeType::list(AttributeType::Int64),
    };
    let mut attr = if f.required {
        Attribute::new(attr_type, crate::schema::AttributeFlags::required())
    } else {
        Attribute::new(attr_type, crate::schema::AttributeFlags::optional())
    };
    if f.sensitive {
        attr = attr.sensitive();
    }
    if let Some(default) = f.default {
        attr = attr.with_default(default.to_value());
    }
    attr
}

#[async_trait::async_trait]
impl ProviderService for RmonProvider {
    fn schema(&self) -> ProviderSchema {
        let mut schema = ProviderSchema::new().with_provider_config(provider_config_schema());
        for def in catalog::REGISTRY {
            schema = schema.with_resource(def.type_name, resource_schema(def));
        }
        schema
    }

    async fn validate_provider_config(
        &self,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let mut diagnostics = Vec::new();
        for name in ["base_url", "login", "password"] {
            match config.get(name) {
                Some(Value::String(s)) if !s.is_empty() => {}
                _ => diagnostics.push(
                    Diagnostic::error(format!("Missing required attribute '{}'", name))
                        .with_attribute(name),
                ),
            }
        }
        Ok(diagnostics)
    }

    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        let diagnostics = self.validate_provider_config(config.clone()).await?;
        if !diagnostics.is_empty() {
            return Ok(diagnostics);
        }

        let base_url = config["base_url"].as_str().unwrap_or_default();
        let login = config["login"].as_str().unwrap_or_default();
        let password = config["password"].as_str().unwrap_or_default();
        let tool_version = config
            .get("terraform_version")
            .and_then(Value::as_str)
            .unwrap_or_default();

        let client_config =
            ClientConfig::new(base_url, login, password).with_tool_version(tool_version);
        let client = match Client::new(client_config) {
            Ok(client) => client,
            Err(e) => return Ok(vec![Diagnostic::error(e.to_string())]),
        };

        info!(base_url, "rmon provider configured");
        *self.client.write().await = Some(Arc::new(client));
        Ok(vec![])
    }

    async fn stop(&self) -> Result<(), ProviderError> {
        *self.client.write().await = None;
        Ok(())
    }

    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let def = Self::resolve(resource_type)?;
        Ok(validation::validate(def, &config))
    }

    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
        _config: Value,
    ) -> Result<PlanResult, ProviderError> {
        let def = Self::resolve(resource_type)?;

        let prior = match prior_state {
            None | Some(Value::Null) => {
                // Creating: every configured field is an addition.
                let changes = def
                    .fields()
                    .filter_map(|f| {
                        proposed_state
                            .get(f.name)
                            .filter(|v| !v.is_null())
                            .map(|v| AttributeChange::added(f.name, v.clone()))
                    })
                    .collect();
                return Ok(PlanResult::with_changes(proposed_state, changes, false));
            }
            Some(prior) => prior,
        };

        let mut changes = Vec::new();
        for f in def.fields() {
            let before = prior.get(f.name).cloned().filter(|v| !v.is_null());
            let after = proposed_state.get(f.name).cloned().filter(|v| !v.is_null());
            if before != after {
                changes.push(AttributeChange::new(f.name, before, after));
            }
        }

        // The computed handle always survives an in-place update.
        let mut planned = proposed_state;
        if planned.get(field::ID).is_none() {
            if let (Some(obj), Some(id)) = (planned.as_object_mut(), prior.get(field::ID)) {
                obj.insert(field::ID.to_string(), id.clone());
            }
        }

        if changes.is_empty() {
            Ok(PlanResult::no_change(planned))
        } else {
            Ok(PlanResult::with_changes(planned, changes, false))
        }
    }

    async fn create(
        &self,
        resource_type: &str,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        let def = Self::resolve(resource_type)?;
        let client = self.client().await?;
        resource::create(&client, def, &planned_state).await
    }

    async fn read(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<Value, ProviderError> {
        let def = Self::resolve(resource_type)?;
        let client = self.client().await?;
        let handle = Self::handle_of(def, &current_state)?;
        resource::read(&client, def, &handle).await
    }

    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        let def = Self::resolve(resource_type)?;
        let client = self.client().await?;
        let handle = Self::handle_of(def, &prior_state)?;
        resource::update(&client, def, &handle, &prior_state, &planned_state).await
    }

    async fn delete(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<(), ProviderError> {
        let def = Self::resolve(resource_type)?;
        let client = self.client().await?;
        let handle = Self::handle_of(def, &current_state)?;
        resource::delete(&client, def, &handle).await
    }

    async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        let def = Self::resolve(resource_type)?;
        let client = self.client().await?;
        let state = resource::read(&client, def, id).await?;
        Ok(vec![ImportedResource::new(resource_type, state)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_covers_the_whole_registry() {
        let provider = RmonProvider::new();
        let schema = provider.schema();
        assert_eq!(schema.resources.len(), catalog::REGISTRY.len());

        for def in catalog::REGISTRY {
            let resource = &schema.resources[def.type_name];
            let id = &resource.attributes[field::ID];
            assert!(id.flags.computed, "{} id must be computed", def.type_name);
        }
    }

    #[test]
    fn test_schema_marks_sensitive_attributes() {
        let provider = RmonProvider::new();
        let schema = provider.schema();

        assert!(schema.provider.attributes["password"].flags.sensitive);
        let smtp = &schema.resources["rmon_check_smtp"];
        assert!(smtp.attributes["password"].flags.sensitive);
    }

    #[test]
    fn test_schema_carries_catalog_defaults() {
        let provider = RmonProvider::new();
        let schema = provider.schema();
        let tcp = &schema.resources["rmon_check_tcp"];
        assert_eq!(tcp.attributes["retries"].default, Some(json!(3)));
    }

    #[test]
    fn test_metadata_lists_resources() {
        let provider = RmonProvider::new();
        let metadata = provider.metadata();
        assert_eq!(metadata.resources.len(), 16);
        assert!(metadata.resources.contains(&"rmon_agent".to_string()));
    }

    #[tokio::test]
    async fn test_validate_provider_config_reports_missing_fields() {
        let provider = RmonProvider::new();
        let diagnostics = provider
            .validate_provider_config(json!({"base_url": "https://rmon.example.com"}))
            .await
            .unwrap();
        let attrs: Vec<_> = diagnostics
            .iter()
            .filter_map(|d| d.attribute.as_deref())
            .collect();
        assert_eq!(attrs, vec!["login", "password"]);
    }

    #[tokio::test]
    async fn test_configure_surfaces_bad_url_as_diagnostic() {
        let provider = RmonProvider::new();
        let diagnostics = provider
            .configure(json!({
                "base_url": "ftp://rmon.example.com",
                "login": "admin",
                "password": "secret",
            }))
            .await
            .unwrap();
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.contains("http or https"));
    }

    #[tokio::test]
    async fn test_operations_require_configuration() {
        let provider = RmonProvider::new();
        let err = provider
            .create("rmon_group", json!({"name": "ops"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_unknown_resource_type() {
        let provider = RmonProvider::new();
        let err = provider
            .validate_resource_config("rmon_check_icmp", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::UnknownResource(_)));
    }

    #[tokio::test]
    async fn test_plan_for_create_lists_configured_fields() {
        let provider = RmonProvider::new();
        let plan = provider
            .plan(
                "rmon_check_tcp",
                None,
                json!({
                    "name": "db",
                    "place": "agent",
                    "entities": [12],
                    "ip": "10.0.0.5",
                    "port": 5432
                }),
                json!({}),
            )
            .await
            .unwrap();

        assert_eq!(plan.changes.len(), 5);
        assert!(plan.changes.iter().all(|c| c.before.is_none()));
        assert!(!plan.requires_replace);
    }

    #[tokio::test]
    async fn test_plan_for_update_diffs_and_carries_id() {
        let provider = RmonProvider::new();
        let prior = json!({
            "id": "77",
            "name": "db",
            "place": "agent",
            "entities": [12],
            "ip": "10.0.0.5",
            "port": 5432
        });
        let proposed = json!({
            "name": "db",
            "place": "agent",
            "entities": [12],
            "ip": "10.0.0.5",
            "port": 5433
        });

        let plan = provider
            .plan("rmon_check_tcp", Some(prior), proposed, json!({}))
            .await
            .unwrap();

        assert_eq!(plan.changes.len(), 1);
        assert_eq!(plan.changes[0].path, "port");
        assert_eq!(plan.changes[0].before, Some(json!(5432)));
        assert_eq!(plan.changes[0].after, Some(json!(5433)));
        assert_eq!(plan.planned_state["id"], "77");
        assert!(!plan.requires_replace);
    }

    #[tokio::test]
    async fn test_plan_without_changes() {
        let provider = RmonProvider::new();
        let state = json!({
            "id": "5",
            "name": "ops"
        });
        let plan = provider
            .plan("rmon_group", Some(state.clone()), state, json!({}))
            .await
            .unwrap();
        assert!(plan.changes.is_empty());
    }
}
