use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::configuration::BlueprintConfiguration;
use crate::entity::blueprint;
use crate::error::AppError;
use crate::store::BlueprintWithConfigurations;

/// Column width of `blueprint_name`, `stack_name` and `type_name`.
const MAX_NAME_LEN: usize = 255;

#[derive(Deserialize, ToSchema)]
pub struct CreateBlueprintRequest {
    #[schema(example = "cluster1")]
    pub blueprint_name: String,
    #[schema(example = "HDP")]
    pub stack_name: String,
    #[schema(example = "2.0")]
    pub stack_version: String,
    /// Configuration groups keyed by type, each a JSON object of properties.
    #[serde(default)]
    #[schema(value_type = Object, example = json!({"core-site": {"fs.defaultFS": "hdfs://nn:8020"}}))]
    pub configurations: BTreeMap<String, Value>,
}

#[derive(Deserialize, ToSchema)]
pub struct AddConfigurationRequest {
    #[schema(example = "hdfs-site")]
    pub type_name: String,
    #[schema(value_type = Object, example = json!({"dfs.replication": "3"}))]
    pub properties: Value,
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

#[derive(Serialize, ToSchema)]
pub struct BlueprintSummary {
    pub blueprint_name: String,
    pub stack_name: String,
    pub stack_version: String,
}

#[derive(Serialize, ToSchema)]
pub struct ConfigurationResponse {
    pub blueprint_name: String,
    pub type_name: String,
    /// Stored properties. Rows whose text is not valid JSON are returned as a string.
    #[schema(value_type = Object)]
    pub properties: Value,
}

#[derive(Serialize, ToSchema)]
pub struct BlueprintResponse {
    pub blueprint_name: String,
    pub stack_name: String,
    pub stack_version: String,
    pub configurations: Vec<ConfigurationResponse>,
}

impl From<blueprint::Model> for BlueprintSummary {
    fn from(m: blueprint::Model) -> Self {
        Self {
            blueprint_name: m.blueprint_name,
            stack_name: m.stack_name,
            stack_version: m.stack_version,
        }
    }
}

impl From<BlueprintConfiguration> for ConfigurationResponse {
    fn from(record: BlueprintConfiguration) -> Self {
        let properties = serde_json::from_str(record.config_data())
            .unwrap_or_else(|_| Value::String(record.config_data().to_string()));
        Self {
            blueprint_name: record.blueprint_name().to_string(),
            type_name: record.type_name().to_string(),
            properties,
        }
    }
}

impl From<BlueprintWithConfigurations> for BlueprintResponse {
    fn from(b: BlueprintWithConfigurations) -> Self {
        Self {
            blueprint_name: b.blueprint.blueprint_name,
            stack_name: b.blueprint.stack_name,
            stack_version: b.blueprint.stack_version,
            configurations: b
                .configurations
                .into_iter()
                .map(ConfigurationResponse::from)
                .collect(),
        }
    }
}

fn validate_name(value: &str, field: &str) -> Result<(), AppError> {
    let value = value.trim();
    if value.is_empty() || value.chars().count() > MAX_NAME_LEN {
        return Err(AppError::Validation(format!(
            "{field} must be 1-{MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_properties(type_name: &str, properties: &Value) -> Result<(), AppError> {
    if !properties.is_object() {
        return Err(AppError::Validation(format!(
            "Configuration '{type_name}' must be a JSON object"
        )));
    }
    Ok(())
}

pub fn validate_create_blueprint(req: &CreateBlueprintRequest) -> Result<(), AppError> {
    validate_name(&req.blueprint_name, "blueprint_name")?;
    validate_name(&req.stack_name, "stack_name")?;
    validate_name(&req.stack_version, "stack_version")?;
    let mut seen = HashSet::new();
    for (type_name, properties) in &req.configurations {
        validate_name(type_name, "type_name")?;
        validate_properties(type_name, properties)?;
        let trimmed = type_name.trim();
        if !seen.insert(trimmed) {
            return Err(AppError::Validation(format!(
                "Duplicate configuration type '{trimmed}'"
            )));
        }
    }
    Ok(())
}

pub fn validate_add_configuration(req: &AddConfigurationRequest) -> Result<(), AppError> {
    validate_name(&req.type_name, "type_name")?;
    validate_properties(&req.type_name, &req.properties)
}
