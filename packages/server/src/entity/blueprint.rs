use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "blueprint")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub blueprint_name: String,

    pub stack_name: String,
    pub stack_version: String,

    #[sea_orm(has_many)]
    pub configurations: HasMany<super::blueprint_configuration::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
