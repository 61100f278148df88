use sea_orm::{ActiveValue::Set, DatabaseConnection, TransactionTrait};

use blueprint_server::entity::blueprint_configuration;
use blueprint_server::models::configuration::{
    BlueprintConfigKey, BlueprintConfiguration, BlueprintRef,
};
use blueprint_server::store::{BlueprintStore, NewBlueprint, StoreError};

use crate::common::test_db;

fn new_blueprint(name: &str) -> NewBlueprint {
    NewBlueprint {
        blueprint_name: name.to_string(),
        stack_name: "HDP".to_string(),
        stack_version: "2.0".to_string(),
    }
}

fn pair(type_name: &str, data: &str) -> (String, String) {
    (type_name.to_string(), data.to_string())
}

async fn seed_cluster1(db: &DatabaseConnection) {
    BlueprintStore::new(db)
        .create_blueprint(
            new_blueprint("cluster1"),
            [
                pair("hdfs-site", r#"{"dfs.replication":"3"}"#),
                pair("core-site", r#"{"a":"1"}"#),
            ],
        )
        .await
        .expect("seed failed");
}

mod creation {
    use super::*;

    #[tokio::test]
    async fn persists_blueprint_and_configurations() {
        let db = test_db().await;
        seed_cluster1(&db).await;

        let store = BlueprintStore::new(&db);
        let found = store
            .find_blueprint_with_configurations("cluster1")
            .await
            .unwrap()
            .expect("blueprint should exist");

        assert_eq!(found.blueprint.stack_name, "HDP");
        assert_eq!(found.blueprint.stack_version, "2.0");
        let types: Vec<_> = found
            .configurations
            .iter()
            .map(|c| c.type_name().to_string())
            .collect();
        assert_eq!(types, vec!["core-site", "hdfs-site"]);
    }

    #[tokio::test]
    async fn reads_back_exact_literals() {
        let db = test_db().await;
        seed_cluster1(&db).await;

        let record = BlueprintStore::new(&db)
            .find_configuration(&BlueprintConfigKey::new("cluster1", "core-site"))
            .await
            .unwrap()
            .expect("configuration should exist");

        assert_eq!(record.blueprint_name(), "cluster1");
        assert_eq!(record.type_name(), "core-site");
        assert_eq!(record.config_data(), r#"{"a":"1"}"#);
        assert_eq!(record.blueprint().map(BlueprintRef::name), Some("cluster1"));
    }

    #[tokio::test]
    async fn blueprint_without_configurations_is_allowed() {
        let db = test_db().await;
        let store = BlueprintStore::new(&db);
        let created = store
            .create_blueprint(new_blueprint("empty"), Vec::new())
            .await
            .unwrap();

        assert!(created.configurations.is_empty());
        assert!(store.list_configurations("empty").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_blueprint_name_is_a_unique_violation() {
        let db = test_db().await;
        seed_cluster1(&db).await;

        let err = BlueprintStore::new(&db)
            .create_blueprint(new_blueprint("cluster1"), Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(_)), "{err:?}");
    }

    #[tokio::test]
    async fn failed_creation_rolls_back_with_transaction() {
        let db = test_db().await;
        seed_cluster1(&db).await;

        let txn = db.begin().await.unwrap();
        let err = BlueprintStore::new(&txn)
            .create_blueprint(
                new_blueprint("cluster2"),
                [pair("core-site", "{}"), pair("core-site", "{}")],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(_)), "{err:?}");
        txn.rollback().await.unwrap();

        let store = BlueprintStore::new(&db);
        assert!(store.find_blueprint("cluster2").await.unwrap().is_none());
        assert!(store.list_configurations("cluster2").await.unwrap().is_empty());
    }
}

mod constraints {
    use super::*;

    #[tokio::test]
    async fn composite_key_decides_uniqueness_not_config_data() {
        let db = test_db().await;
        seed_cluster1(&db).await;

        let store = BlueprintStore::new(&db);
        let err = store
            .insert_configuration(BlueprintConfiguration::new(
                "cluster1",
                "core-site",
                r#"{"different":"payload"}"#,
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(_)), "{err:?}");

        let kept = store
            .find_configuration(&BlueprintConfigKey::new("cluster1", "core-site"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(kept.config_data(), r#"{"a":"1"}"#);
    }

    #[tokio::test]
    async fn same_type_under_another_blueprint_is_allowed() {
        let db = test_db().await;
        seed_cluster1(&db).await;

        let store = BlueprintStore::new(&db);
        store
            .create_blueprint(new_blueprint("cluster2"), [pair("core-site", r#"{"b":"2"}"#)])
            .await
            .unwrap();

        let other = store
            .find_configuration(&BlueprintConfigKey::new("cluster2", "core-site"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(other.config_data(), r#"{"b":"2"}"#);
    }

    #[tokio::test]
    async fn unknown_blueprint_is_a_foreign_key_violation() {
        let db = test_db().await;

        let err = BlueprintStore::new(&db)
            .insert_configuration(BlueprintConfiguration::new("ghost", "core-site", "{}"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ForeignKeyViolation(_)), "{err:?}");
    }

    #[tokio::test]
    async fn missing_config_data_is_a_not_null_violation() {
        let db = test_db().await;
        seed_cluster1(&db).await;

        let row = blueprint_configuration::ActiveModel {
            blueprint_name: Set("cluster1".to_string()),
            type_name: Set("yarn-site".to_string()),
            ..Default::default()
        };
        let err = BlueprintStore::new(&db).insert_row(row).await.unwrap_err();
        assert!(matches!(err, StoreError::NotNullViolation(_)), "{err:?}");
    }

    #[tokio::test]
    async fn mismatched_parent_is_rejected_before_insert() {
        let db = test_db().await;
        seed_cluster1(&db).await;

        let mut record = BlueprintConfiguration::new("cluster1", "yarn-site", "{}");
        record.set_blueprint(Some(BlueprintRef::new("cluster2")));

        let store = BlueprintStore::new(&db);
        let err = store.insert_configuration(record).await.unwrap_err();
        assert!(matches!(err, StoreError::ParentMismatch { .. }), "{err:?}");
        assert!(
            store
                .find_configuration(&BlueprintConfigKey::new("cluster1", "yarn-site"))
                .await
                .unwrap()
                .is_none()
        );
    }
}

mod deletion {
    use super::*;

    #[tokio::test]
    async fn deleting_blueprint_removes_its_configurations() {
        let db = test_db().await;
        seed_cluster1(&db).await;
        BlueprintStore::new(&db)
            .create_blueprint(new_blueprint("cluster2"), [pair("core-site", "{}")])
            .await
            .unwrap();

        let store = BlueprintStore::new(&db);
        assert!(store.delete_blueprint("cluster1").await.unwrap());

        assert!(store.find_blueprint("cluster1").await.unwrap().is_none());
        assert!(store.list_configurations("cluster1").await.unwrap().is_empty());
        assert_eq!(store.list_configurations("cluster2").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn deleting_missing_blueprint_reports_false() {
        let db = test_db().await;
        assert!(!BlueprintStore::new(&db).delete_blueprint("ghost").await.unwrap());
    }

    #[tokio::test]
    async fn name_can_be_reused_after_delete() {
        let db = test_db().await;
        seed_cluster1(&db).await;

        let store = BlueprintStore::new(&db);
        store.delete_blueprint("cluster1").await.unwrap();
        seed_cluster1(&db).await;

        assert_eq!(store.list_configurations("cluster1").await.unwrap().len(), 2);
    }
}

#[tokio::test]
async fn list_blueprints_is_ordered_by_name() {
    let db = test_db().await;
    let store = BlueprintStore::new(&db);
    for name in ["zeta", "alpha", "mid"] {
        store
            .create_blueprint(new_blueprint(name), Vec::new())
            .await
            .unwrap();
    }

    let names: Vec<_> = store
        .list_blueprints()
        .await
        .unwrap()
        .into_iter()
        .map(|b| b.blueprint_name)
        .collect();
    assert_eq!(names, vec!["alpha", "mid", "zeta"]);
}
