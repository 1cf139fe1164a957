use super::{print_fields, report_events, Context};
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use formdraft_schema::FieldPatch;

#[derive(Debug, Args)]
pub struct AddFieldArgs {
    /// Form id
    pub form: String,

    /// Field type id or key (text, email, select, ...)
    #[arg(short = 't', long = "type")]
    pub field_type: String,

    /// Label to use instead of "New <type>"
    #[arg(short, long)]
    pub label: Option<String>,
}

#[derive(Debug, Args)]
pub struct UpdateFieldArgs {
    /// Form id
    pub form: String,

    /// Field id in the version being edited
    pub field: String,

    #[arg(short, long)]
    pub label: Option<String>,

    #[arg(short, long)]
    pub description: Option<String>,

    #[arg(short, long)]
    pub required: Option<bool>,
}

#[derive(Debug, Args)]
pub struct FieldArgs {
    /// Form id
    pub form: String,

    /// Field id in the version being edited
    pub field: String,
}

#[derive(Debug, Args)]
pub struct ReorderArgs {
    /// Form id
    pub form: String,

    /// Every field id, in the new order
    #[arg(required = true)]
    pub fields: Vec<String>,
}

pub async fn add_field(args: AddFieldArgs, ctx: &Context) -> Result<()> {
    let (mut session, mut events) = ctx.open(&args.form).await?;

    let mut field_id = session.add_field(&args.field_type).await?;
    if let Some(label) = args.label {
        field_id = session.update_field(&field_id, FieldPatch::label(label)).await?;
    }
    report_events(&mut events);

    println!("{} Added field {}", "✓".green(), field_id.bright_white());
    print_fields(session.fields());
    Ok(())
}

pub async fn update_field(args: UpdateFieldArgs, ctx: &Context) -> Result<()> {
    let patch = FieldPatch {
        label: args.label,
        description: args.description,
        required: args.required,
        rules: None,
    };
    if patch.is_empty() {
        return Err(anyhow!(
            "Nothing to update: pass --label, --description or --required"
        ));
    }

    let (mut session, mut events) = ctx.open(&args.form).await?;
    session.select_field(&args.field)?;

    let field_id = session.update_field(&args.field, patch).await?;
    report_events(&mut events);

    println!("{} Updated field {}", "✓".green(), field_id.bright_white());
    print_fields(session.fields());
    Ok(())
}

pub async fn toggle_required(args: FieldArgs, ctx: &Context) -> Result<()> {
    let (mut session, mut events) = ctx.open(&args.form).await?;

    let result = session.toggle_required(&args.field).await;
    report_events(&mut events);
    let (field_id, required) = result?;

    let state = if required { "required" } else { "optional" };
    println!("{} Field {} is now {}", "✓".green(), field_id, state.bright_white());
    print_fields(session.fields());
    Ok(())
}

pub async fn delete_field(args: FieldArgs, ctx: &Context) -> Result<()> {
    let (mut session, mut events) = ctx.open(&args.form).await?;

    let result = session.delete_field(&args.field).await;
    report_events(&mut events);
    let field_id = result?;

    println!("{} Deleted field {}", "✓".green(), field_id);
    print_fields(session.fields());
    Ok(())
}

pub async fn reorder(args: ReorderArgs, ctx: &Context) -> Result<()> {
    let (mut session, mut events) = ctx.open(&args.form).await?;

    let result = session.reorder_fields(&args.fields).await;
    report_events(&mut events);
    result?;

    println!("{} Reordered {} fields", "✓".green(), args.fields.len());
    print_fields(session.fields());
    Ok(())
}
