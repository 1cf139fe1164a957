//! Rules enforced by the in-memory form service

use formdraft_client::memory::field;
use formdraft_client::{ClientError, FormService, InMemoryFormService, Operation};
use formdraft_schema::{FieldOrder, FieldPatch, FormPatch, NewField, ThemePatch, VersionState};

fn store_with_active() -> (InMemoryFormService, String, String) {
    let store = InMemoryFormService::new();
    let form_id = store.create_form("Contact");
    let v1 = store
        .insert_version(
            &form_id,
            VersionState::Active,
            vec![field("f1", "Email", 0, "email"), field("f2", "Topic", 1, "select")],
        )
        .unwrap();
    (store, form_id, v1)
}

#[tokio::test]
async fn test_branch_copies_active_with_fresh_ids() {
    let (store, form_id, _v1) = store_with_active();

    let branched = store.create_branch(&form_id).await.unwrap();

    assert_eq!(branched.version, 2);
    assert_eq!(branched.fields.len(), 2);
    assert_eq!(branched.fields[0].label, "Email");
    assert_eq!(branched.fields[0].order, 0);
    assert_eq!(branched.fields[0].type_key(), "email");
    assert_ne!(branched.fields[0].id, "f1");
    assert_ne!(branched.fields[1].id, "f2");

    let versions = store.versions(&form_id);
    assert_eq!(versions[1].state(), VersionState::Draft);
}

#[tokio::test]
async fn test_second_branch_is_rejected() {
    let (store, form_id, _v1) = store_with_active();

    store.create_branch(&form_id).await.unwrap();
    let err = store.create_branch(&form_id).await.unwrap_err();

    assert!(matches!(err, ClientError::Rejected { .. }));
    assert_eq!(store.versions(&form_id).len(), 2);
}

#[tokio::test]
async fn test_field_mutation_on_published_version_is_rejected() {
    let (store, _form_id, v1) = store_with_active();

    let err = store
        .update_field(&v1, "f1", &FieldPatch::label("Work email"))
        .await
        .unwrap_err();

    assert!(err.is_stale_reference());
    assert_eq!(store.fields(&v1)[0].label, "Email");
}

#[tokio::test]
async fn test_unknown_field_is_not_found() {
    let store = InMemoryFormService::new();
    let form_id = store.create_form("Contact");
    let draft = store
        .insert_version(&form_id, VersionState::Draft, vec![])
        .unwrap();

    let err = store.delete_field(&draft, "missing").await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound { .. }));
}

#[tokio::test]
async fn test_publish_then_activate_supersedes_prior_active() {
    let (store, form_id, v1) = store_with_active();
    let branched = store.create_branch(&form_id).await.unwrap();

    store
        .publish_version(&form_id, &branched.version_id)
        .await
        .unwrap();
    store
        .activate_version(&form_id, &branched.version_id)
        .await
        .unwrap();

    let versions = store.versions(&form_id);
    let old = versions.iter().find(|v| v.id == v1).unwrap();
    let new = versions.iter().find(|v| v.id == branched.version_id).unwrap();
    assert_eq!(old.state(), VersionState::Closed);
    assert_eq!(new.state(), VersionState::Active);
    assert_eq!(store.form(&form_id).unwrap().version, 2);
}

#[tokio::test]
async fn test_activate_requires_publish() {
    let (store, form_id, _v1) = store_with_active();
    let branched = store.create_branch(&form_id).await.unwrap();

    let err = store
        .activate_version(&form_id, &branched.version_id)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Rejected { .. }));
}

#[tokio::test]
async fn test_add_field_with_options() {
    let store = InMemoryFormService::new();
    let form_id = store.create_form("Poll");
    let draft = store
        .insert_version(&form_id, VersionState::Draft, vec![])
        .unwrap();

    let created = store
        .add_field(
            &draft,
            &NewField {
                label: "New select".to_string(),
                field_type_id: "type-select".to_string(),
                required: false,
                order: 0,
                options: Some(vec!["Option 1".to_string()]),
            },
        )
        .await
        .unwrap();

    assert_eq!(created.kind.options()[0].label, "Option 1");
    assert_eq!(store.fields(&draft).len(), 1);
}

#[tokio::test]
async fn test_reorder_requires_full_permutation() {
    let store = InMemoryFormService::new();
    let form_id = store.create_form("Poll");
    let draft = store
        .insert_version(
            &form_id,
            VersionState::Draft,
            vec![field("a", "A", 0, "text"), field("b", "B", 1, "text")],
        )
        .unwrap();

    let partial = [FieldOrder { field_id: "b".to_string(), order: 0 }];
    assert!(store.reorder_fields(&draft, &partial).await.is_err());

    let full = [
        FieldOrder { field_id: "b".to_string(), order: 0 },
        FieldOrder { field_id: "a".to_string(), order: 1 },
    ];
    store.reorder_fields(&draft, &full).await.unwrap();

    let ids: Vec<String> = store.fields(&draft).into_iter().map(|f| f.id).collect();
    assert_eq!(ids, vec!["b", "a"]);
}

#[tokio::test]
async fn test_update_form_validates_theme() {
    let (store, form_id, _v1) = store_with_active();

    let bad = FormPatch::theme(ThemePatch {
        button_color: Some("blue".to_string()),
        ..Default::default()
    });
    assert!(store.update_form(&form_id, &bad).await.is_err());

    let good = FormPatch::theme(ThemePatch {
        button_color: Some("#1d4ed8".to_string()),
        ..Default::default()
    });
    let form = store.update_form(&form_id, &good).await.unwrap();
    assert_eq!(form.theme.button_color, "#1d4ed8");
}

#[tokio::test]
async fn test_journal_and_fault_injection() {
    let (store, form_id, _v1) = store_with_active();
    store.fail_next(Operation::CreateBranch);

    assert!(matches!(
        store.create_branch(&form_id).await,
        Err(ClientError::Transport(_))
    ));
    assert!(store.create_branch(&form_id).await.is_ok());
    assert_eq!(store.count(Operation::CreateBranch), 2);
    assert_eq!(store.versions(&form_id).len(), 2);
}
