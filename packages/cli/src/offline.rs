//! Seeded in-process form service for `--offline` runs

use anyhow::Result;
use formdraft_client::memory::field;
use formdraft_client::InMemoryFormService;
use formdraft_schema::{FieldKind, FieldOption, VersionState};

/// Form id accepted in place of the seeded form's generated id
pub const DEMO_FORM: &str = "demo";

/// A "Customer feedback" form with one closed and one active version.
///
/// Returns the service and the generated form id.
pub fn seeded_service() -> Result<(InMemoryFormService, String)> {
    let service = InMemoryFormService::new();
    let form_id = service.create_form("Customer feedback");

    service.insert_version(
        &form_id,
        VersionState::Closed,
        vec![field("name", "Name", 0, "text")],
    )?;

    let mut topic = field("topic", "Topic", 3, "select");
    topic.kind = FieldKind::Select(
        ["Billing", "Support", "Other"]
            .iter()
            .enumerate()
            .map(|(i, label)| FieldOption {
                id: format!("opt-{}", i + 1),
                label: label.to_string(),
                value: label.to_lowercase(),
            })
            .collect(),
    );

    let mut email = field("email", "Email", 1, "email");
    email.required = true;

    service.insert_version(
        &form_id,
        VersionState::Active,
        vec![
            field("name", "Name", 0, "text"),
            email,
            field("rating", "How did we do?", 2, "rating"),
            topic,
        ],
    )?;

    Ok((service, form_id))
}
