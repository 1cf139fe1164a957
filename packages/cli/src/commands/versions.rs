use super::{print_fields, Context, FormArgs};
use anyhow::Result;
use colored::{ColoredString, Colorize};
use formdraft_client::FormService;
use formdraft_editor::DraftResolver;
use formdraft_schema::VersionState;

fn state_label(state: VersionState) -> ColoredString {
    let label = state.to_string();
    match state {
        VersionState::Draft => label.yellow(),
        VersionState::Active => label.green().bold(),
        VersionState::Published => label.bright_blue(),
        VersionState::Closed => label.dimmed(),
    }
}

/// List every version of a form with its lifecycle state
pub async fn versions(args: FormArgs, ctx: &Context) -> Result<()> {
    let form_id = ctx.form_id(&args.form);
    let versions = ctx.service().list_versions(form_id).await?;

    if versions.is_empty() {
        println!("{}", "⚠️  Form has no versions yet".yellow());
        return Ok(());
    }

    let resolution = DraftResolver::resolve(&versions);
    let editing = resolution.edit_target().map(|v| v.id.clone());

    for version in &versions {
        let marker = if editing.as_deref() == Some(version.id.as_str()) {
            "→".bright_blue().to_string()
        } else {
            " ".to_string()
        };
        let published = version
            .published_at
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!(
            "{} v{:<3} {:<10} {:<16} {}",
            marker,
            version.version,
            state_label(version.state()),
            published,
            version.id.dimmed()
        );
    }

    Ok(())
}

/// Show the form and the fields of the version an editor would open on
pub async fn show(args: FormArgs, ctx: &Context) -> Result<()> {
    let (session, _events) = ctx.open(&args.form).await?;
    let form = session.form();

    println!("{}", form.title.bright_white().bold());
    if let Some(description) = &form.description {
        println!("{}", description);
    }
    println!(
        "slug {}  live version {}",
        form.slug.bright_white(),
        form.version
    );
    println!(
        "theme primary {} background {} button {} text {}",
        form.theme.primary_color,
        form.theme.background_color,
        form.theme.button_color,
        form.theme.text_color
    );
    println!();

    match (session.version_id(), session.version_number()) {
        (Some(id), Some(number)) => {
            println!("Editing v{} {}", number, id.dimmed());
            print_fields(session.fields());
        }
        _ => println!("{}", "No version yet; adding a field creates the first draft".dimmed()),
    }

    Ok(())
}
