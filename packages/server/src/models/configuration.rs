use std::fmt;

use sea_orm::Set;

use crate::entity::blueprint_configuration;
use crate::store::StoreError;

/// Composite identity of a configuration row.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlueprintConfigKey {
    blueprint_name: String,
    type_name: String,
}

impl BlueprintConfigKey {
    pub fn new(blueprint_name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            blueprint_name: blueprint_name.into(),
            type_name: type_name.into(),
        }
    }

    pub fn blueprint_name(&self) -> &str {
        &self.blueprint_name
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Primary key tuple in column order, as accepted by `find_by_id`.
    pub fn as_tuple(&self) -> (String, String) {
        (self.blueprint_name.clone(), self.type_name.clone())
    }
}

impl fmt::Display for BlueprintConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.blueprint_name, self.type_name)
    }
}

/// Non-owning reference to a parent blueprint, by primary key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BlueprintRef {
    name: String,
}

impl BlueprintRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl From<&crate::entity::blueprint::Model> for BlueprintRef {
    fn from(m: &crate::entity::blueprint::Model) -> Self {
        Self::new(m.blueprint_name.clone())
    }
}

/// In-memory form of a `blueprint_configuration` row.
///
/// Setters perform no validation and never synchronise `blueprint_name` with
/// the parent reference. Callers that change one must change the other;
/// [`BlueprintConfiguration::is_consistent`] reports whether they agree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlueprintConfiguration {
    blueprint_name: String,
    type_name: String,
    config_data: String,
    blueprint: Option<BlueprintRef>,
}

impl BlueprintConfiguration {
    /// Build a record with no parent reference attached.
    pub fn new(
        blueprint_name: impl Into<String>,
        type_name: impl Into<String>,
        config_data: impl Into<String>,
    ) -> Self {
        Self {
            blueprint_name: blueprint_name.into(),
            type_name: type_name.into(),
            config_data: config_data.into(),
            blueprint: None,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn set_type_name(&mut self, type_name: impl Into<String>) {
        self.type_name = type_name.into();
    }

    /// Configuration properties as JSON text.
    pub fn config_data(&self) -> &str {
        &self.config_data
    }

    pub fn set_config_data(&mut self, config_data: impl Into<String>) {
        self.config_data = config_data.into();
    }

    pub fn blueprint_name(&self) -> &str {
        &self.blueprint_name
    }

    pub fn set_blueprint_name(&mut self, blueprint_name: impl Into<String>) {
        self.blueprint_name = blueprint_name.into();
    }

    pub fn blueprint(&self) -> Option<&BlueprintRef> {
        self.blueprint.as_ref()
    }

    pub fn set_blueprint(&mut self, blueprint: Option<BlueprintRef>) {
        self.blueprint = blueprint;
    }

    pub fn key(&self) -> BlueprintConfigKey {
        BlueprintConfigKey::new(self.blueprint_name.clone(), self.type_name.clone())
    }

    /// True when no parent is attached or the parent has the same name.
    pub fn is_consistent(&self) -> bool {
        self.blueprint
            .as_ref()
            .is_none_or(|parent| parent.name() == self.blueprint_name)
    }

    /// Convert into an insertable row.
    pub fn into_active_model(self) -> Result<blueprint_configuration::ActiveModel, StoreError> {
        if !self.is_consistent() {
            let parent = self.blueprint.map(|b| b.name).unwrap_or_default();
            return Err(StoreError::ParentMismatch {
                blueprint_name: self.blueprint_name,
                parent,
            });
        }

        Ok(blueprint_configuration::ActiveModel {
            blueprint_name: Set(self.blueprint_name),
            type_name: Set(self.type_name),
            config_data: Set(self.config_data),
        })
    }
}

impl From<blueprint_configuration::Model> for BlueprintConfiguration {
    fn from(m: blueprint_configuration::Model) -> Self {
        let parent = BlueprintRef::new(m.blueprint_name.clone());
        Self {
            blueprint_name: m.blueprint_name,
            type_name: m.type_name,
            config_data: m.config_data,
            blueprint: Some(parent),
        }
    }
}
