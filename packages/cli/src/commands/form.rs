use super::{report_events, Context, FormArgs};
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use formdraft_schema::ThemePatch;

#[derive(Debug, Args)]
pub struct ThemeArgs {
    /// Form id
    pub form: String,

    /// Hex color, e.g. #2563eb
    #[arg(long)]
    pub primary: Option<String>,

    #[arg(long)]
    pub background: Option<String>,

    #[arg(long)]
    pub button: Option<String>,

    #[arg(long)]
    pub text: Option<String>,
}

/// Change theme colors; never creates a draft
pub async fn theme(args: ThemeArgs, ctx: &Context) -> Result<()> {
    let patch = ThemePatch {
        primary_color: args.primary,
        background_color: args.background,
        button_color: args.button,
        text_color: args.text,
    };
    if patch.is_empty() {
        return Err(anyhow!(
            "Nothing to update: pass --primary, --background, --button or --text"
        ));
    }

    let (mut session, mut events) = ctx.open(&args.form).await?;
    session.update_theme(patch).await?;
    report_events(&mut events);

    let theme = &session.form().theme;
    println!("{} Theme updated", "✓".green());
    println!("  primary    {}", theme.primary_color);
    println!("  background {}", theme.background_color);
    println!("  button     {}", theme.button_color);
    println!("  text       {}", theme.text_color);
    Ok(())
}

/// Publish the draft (or re-activate the active version) and make it live
pub async fn publish(args: FormArgs, ctx: &Context) -> Result<()> {
    let (mut session, mut events) = ctx.open(&args.form).await?;

    println!("{}", "🚀 Publishing...".bright_blue().bold());
    let version = session.publish().await?;
    report_events(&mut events);

    println!(
        "{} {} now serves v{}",
        "✓".green(),
        session.form().title.bright_white(),
        version
    );
    Ok(())
}
