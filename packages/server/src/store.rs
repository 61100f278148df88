use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    RuntimeErr, Set, SqlErr,
};
use thiserror::Error;
use tracing::info;

use crate::entity::{blueprint, blueprint_configuration};
use crate::models::configuration::{BlueprintConfigKey, BlueprintConfiguration, BlueprintRef};

/// Storage-layer failure, classified by the constraint that rejected the write.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Not-null constraint violated: {0}")]
    NotNullViolation(String),

    #[error("Foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    #[error("blueprint_name '{blueprint_name}' does not match parent blueprint '{parent}'")]
    ParentMismatch {
        blueprint_name: String,
        parent: String,
    },

    #[error(transparent)]
    Database(DbErr),
}

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => StoreError::UniqueViolation(detail),
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
                StoreError::ForeignKeyViolation(detail)
            }
            _ if is_not_null_violation(&err) => StoreError::NotNullViolation(err.to_string()),
            _ => StoreError::Database(err),
        }
    }
}

/// SQLSTATE `23502` (Postgres) and extended code `1299` (SQLite).
const NOT_NULL_CODES: &[&str] = &["23502", "1299"];

/// SeaORM has no `SqlErr` variant for NOT NULL, so inspect the driver's error code.
fn is_not_null_violation(err: &DbErr) -> bool {
    match driver_code(err) {
        Some(code) => is_not_null_code(&code),
        // SQLite errors that reach us without a code
        None => err.to_string().contains("NOT NULL constraint failed"),
    }
}

fn is_not_null_code(code: &str) -> bool {
    NOT_NULL_CODES.contains(&code)
}

fn driver_code(err: &DbErr) -> Option<String> {
    match err {
        DbErr::Exec(RuntimeErr::SqlxError(e)) | DbErr::Query(RuntimeErr::SqlxError(e)) => e
            .as_database_error()
            .and_then(|db_err| db_err.code())
            .map(|code| code.into_owned()),
        _ => None,
    }
}

/// Fields of a blueprint to be created.
#[derive(Clone, Debug)]
pub struct NewBlueprint {
    pub blueprint_name: String,
    pub stack_name: String,
    pub stack_version: String,
}

/// Blueprint together with its configuration groups.
#[derive(Clone, Debug)]
pub struct BlueprintWithConfigurations {
    pub blueprint: blueprint::Model,
    pub configurations: Vec<BlueprintConfiguration>,
}

/// Storage operations for blueprints and their configuration rows.
///
/// Works over a pooled connection or a transaction. Multi-row operations
/// should be given a transaction by the caller.
pub struct BlueprintStore<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> BlueprintStore<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Insert a blueprint and one configuration row per `(type_name, config_data)` pair.
    pub async fn create_blueprint<I>(
        &self,
        new: NewBlueprint,
        configurations: I,
    ) -> Result<BlueprintWithConfigurations, StoreError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let model = blueprint::ActiveModel {
            blueprint_name: Set(new.blueprint_name),
            stack_name: Set(new.stack_name),
            stack_version: Set(new.stack_version),
        }
        .insert(self.conn)
        .await?;

        let parent = BlueprintRef::from(&model);
        let mut inserted = Vec::new();
        for (type_name, config_data) in configurations {
            let mut record =
                BlueprintConfiguration::new(model.blueprint_name.clone(), type_name, config_data);
            record.set_blueprint(Some(parent.clone()));
            inserted.push(self.insert_configuration(record).await?);
        }

        info!(
            blueprint = %model.blueprint_name,
            configurations = inserted.len(),
            "Created blueprint"
        );

        Ok(BlueprintWithConfigurations {
            blueprint: model,
            configurations: inserted,
        })
    }

    pub async fn find_blueprint(&self, name: &str) -> Result<Option<blueprint::Model>, StoreError> {
        Ok(blueprint::Entity::find_by_id(name.to_string())
            .one(self.conn)
            .await?)
    }

    pub async fn list_blueprints(&self) -> Result<Vec<blueprint::Model>, StoreError> {
        Ok(blueprint::Entity::find()
            .order_by_asc(blueprint::Column::BlueprintName)
            .all(self.conn)
            .await?)
    }

    /// Insert one configuration row. There is no update counterpart.
    pub async fn insert_configuration(
        &self,
        record: BlueprintConfiguration,
    ) -> Result<BlueprintConfiguration, StoreError> {
        let active = record.into_active_model()?;
        self.insert_row(active).await
    }

    /// Insert a row built by the caller. Columns left `NotSet` are omitted from
    /// the statement, so a missing required column fails as a not-null violation.
    pub async fn insert_row(
        &self,
        active: blueprint_configuration::ActiveModel,
    ) -> Result<BlueprintConfiguration, StoreError> {
        let model = active.insert(self.conn).await?;
        Ok(BlueprintConfiguration::from(model))
    }

    pub async fn find_configuration(
        &self,
        key: &BlueprintConfigKey,
    ) -> Result<Option<BlueprintConfiguration>, StoreError> {
        Ok(blueprint_configuration::Entity::find_by_id(key.as_tuple())
            .one(self.conn)
            .await?
            .map(BlueprintConfiguration::from))
    }

    /// All configuration rows of a blueprint, ordered by type name.
    pub async fn list_configurations(
        &self,
        blueprint_name: &str,
    ) -> Result<Vec<BlueprintConfiguration>, StoreError> {
        Ok(blueprint_configuration::Entity::find()
            .filter(blueprint_configuration::Column::BlueprintName.eq(blueprint_name))
            .order_by_asc(blueprint_configuration::Column::TypeName)
            .all(self.conn)
            .await?
            .into_iter()
            .map(BlueprintConfiguration::from)
            .collect())
    }

    pub async fn find_blueprint_with_configurations(
        &self,
        name: &str,
    ) -> Result<Option<BlueprintWithConfigurations>, StoreError> {
        let Some(model) = self.find_blueprint(name).await? else {
            return Ok(None);
        };
        let configurations = self.list_configurations(name).await?;
        Ok(Some(BlueprintWithConfigurations {
            blueprint: model,
            configurations,
        }))
    }

    /// Delete a blueprint and every configuration row it owns.
    ///
    /// Returns `false` if no blueprint with that name existed.
    pub async fn delete_blueprint(&self, name: &str) -> Result<bool, StoreError> {
        let configs = blueprint_configuration::Entity::delete_many()
            .filter(blueprint_configuration::Column::BlueprintName.eq(name))
            .exec(self.conn)
            .await?;
        let res = blueprint::Entity::delete_by_id(name.to_string())
            .exec(self.conn)
            .await?;

        if res.rows_affected == 0 {
            return Ok(false);
        }

        info!(
            blueprint = %name,
            configurations = configs.rows_affected,
            "Deleted blueprint"
        );
        Ok(true)
    }
}
