pub mod fields;
pub mod form;
pub mod versions;

pub use fields::{
    add_field, delete_field, reorder, toggle_required, update_field, AddFieldArgs,
    FieldArgs, ReorderArgs, UpdateFieldArgs,
};
pub use form::{publish, theme, ThemeArgs};
pub use versions::{show, versions};

use crate::config::Config;
use crate::offline::{self, DEMO_FORM};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use formdraft_client::{FormService, HttpFormService};
use formdraft_editor::{EditSession, SessionEvent};
use formdraft_schema::Field;
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

#[derive(Debug, Args)]
pub struct FormArgs {
    /// Form id
    pub form: String,
}

/// Where commands send their requests
pub struct Context {
    service: Arc<dyn FormService>,
    demo_form: Option<String>,
}

impl Context {
    pub fn connect(offline: bool, cwd: &str) -> Result<Self> {
        if offline {
            let (service, form_id) = offline::seeded_service()?;
            println!(
                "{} offline mode, form {} is available as '{}'",
                "ℹ".bright_blue(),
                form_id.bright_white(),
                DEMO_FORM
            );
            return Ok(Self {
                service: Arc::new(service),
                demo_form: Some(form_id),
            });
        }

        let config = Config::load(cwd)?;
        let client = config.client_config(|name| std::env::var(name).ok())?;
        Ok(Self {
            service: Arc::new(HttpFormService::new(&client)?),
            demo_form: None,
        })
    }

    pub fn service(&self) -> &Arc<dyn FormService> {
        &self.service
    }

    pub fn form_id<'a>(&'a self, form: &'a str) -> &'a str {
        match &self.demo_form {
            Some(id) if form == DEMO_FORM => id.as_str(),
            _ => form,
        }
    }

    /// Open a session whose events are collected for [`report_events`]
    pub async fn open(&self, form: &str) -> Result<(EditSession, UnboundedReceiver<SessionEvent>)> {
        let mut session = EditSession::open(self.service.clone(), self.form_id(form)).await?;
        let (tx, rx) = unbounded_channel();
        session.subscribe(Arc::new(tx));
        Ok((session, rx))
    }
}

/// Print the lifecycle events worth telling the user about
pub fn report_events(events: &mut UnboundedReceiver<SessionEvent>) {
    while let Ok(event) = events.try_recv() {
        match event {
            SessionEvent::Branched { to, version, .. } => {
                println!(
                    "  {} Created draft v{} ({})",
                    "⎇".yellow(),
                    version,
                    to.bright_white()
                );
            }
            SessionEvent::Rebound { to, .. } => {
                println!("  {} Continuing in existing draft {}", "⎇".yellow(), to.bright_white());
            }
            SessionEvent::SelectionLost { field_id } => {
                println!("  {} Field {} has no counterpart in the draft", "⚠️".yellow(), field_id);
            }
            SessionEvent::RolledBack { reason } => {
                println!("  {} Change reverted: {}", "↺".red(), reason);
            }
            SessionEvent::Published { version, .. } => {
                println!("  {} Version {} is live", "✓".green(), version);
            }
            SessionEvent::SelectionChanged(_) | SessionEvent::SnapshotRefreshed { .. } => {}
        }
    }
}

pub fn print_fields(fields: &[Field]) {
    if fields.is_empty() {
        println!("  {}", "(no fields)".dimmed());
        return;
    }

    for field in fields {
        let required = if field.required { "*".red().to_string() } else { " ".to_string() };
        println!(
            "  {:>3} {}{} {} {}",
            field.order,
            field.label.bright_white(),
            required,
            format!("[{}]", field.type_key()).dimmed(),
            field.id.dimmed()
        );
        for option in field.kind.options() {
            println!("        - {}", option.label);
        }
    }
}
