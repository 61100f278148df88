use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One configuration group of a blueprint, keyed by (blueprint_name, type_name).
///
/// Rows are insert-only. They are removed when the owning blueprint is deleted.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "blueprint_configuration")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub blueprint_name: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub type_name: String,
    #[sea_orm(belongs_to, from = "blueprint_name", to = "blueprint_name")]
    pub blueprint: HasOne<super::blueprint::Entity>,

    #[sea_orm(column_type = "Text")]
    pub config_data: String, // JSON text
}

impl ActiveModelBehavior for ActiveModel {}
