use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    load_settings, session_gate::CONFIRMATION_PROMPT, GoTrueClient, IdentityProvider,
    IdentitySettings, SignUpOutcome,
};
use shared::{
    catalog::{filter_courses, CatalogFacets},
    domain::{Course, Level},
    sample::sample_courses,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "academy", about = "Red Consult Academy companion")]
struct Cli {
    /// Settings file; defaults to ./academy.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Where the session is kept between runs.
    #[arg(long, global = true)]
    session_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(subcommand)]
    Catalog(CatalogCommand),
    #[command(subcommand)]
    Auth(AuthCommand),
}

#[derive(Subcommand, Debug)]
enum CatalogCommand {
    /// Filters the course catalog by title or tag.
    Search {
        #[arg(default_value = "")]
        query: String,
        #[arg(long, value_parser = parse_level)]
        level: Option<Level>,
        #[arg(long)]
        topic: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum AuthCommand {
    /// Shows the stored session, refreshing it when it is about to expire.
    Session,
    SignIn {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    SignUp {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    SignOut,
}

impl AuthCommand {
    fn name(&self) -> &'static str {
        match self {
            Self::Session => "session",
            Self::SignIn { .. } => "sign_in",
            Self::SignUp { .. } => "sign_up",
            Self::SignOut => "sign_out",
        }
    }
}

fn parse_level(raw: &str) -> Result<Level, String> {
    Level::parse(raw).ok_or_else(|| {
        let known: Vec<&str> = Level::ALL.iter().map(|level| level.label()).collect();
        format!("unknown level '{raw}', expected one of: {}", known.join(", "))
    })
}

fn render_course_line(course: &Course) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}%\t{}",
        course.id,
        course.title,
        course.level,
        course.duration,
        course.progress_percent,
        course.tags.join(", ")
    )
}

fn search_catalog(query: &str, facets: &CatalogFacets) -> Vec<String> {
    let courses = sample_courses();
    filter_courses(&courses, query)
        .into_iter()
        .filter(|course| facets.accepts(course))
        .map(render_course_line)
        .collect()
}

fn identity_settings(config: Option<&Path>, session_file: Option<PathBuf>) -> IdentitySettings {
    let mut settings = load_settings(config);
    if session_file.is_some() {
        settings.session_file = session_file;
    }
    settings.log_summary();
    settings
}

async fn run_auth(settings: IdentitySettings, command: AuthCommand) -> Result<()> {
    let problems = settings.problems();
    if !problems.is_empty() {
        bail!("identity service is not configured: {}", problems.join("; "));
    }
    let client: Arc<GoTrueClient> = GoTrueClient::from_settings(&settings);
    debug!(command = command.name(), "identity request");

    match command {
        AuthCommand::Session => match client
            .get_session()
            .await
            .context("session lookup failed")?
        {
            Some(session) => {
                info!(user = %session.user.id, "session restored");
                let expires = match session.expires_at_utc() {
                    Some(at) => {
                        let minutes = (at - chrono::Utc::now()).num_minutes();
                        format!("{}, {minutes} min left", at.to_rfc3339())
                    }
                    None => "unknown".to_string(),
                };
                println!(
                    "signed in as {} (expires {expires})",
                    session.email().unwrap_or("<no email>")
                );
            }
            None => println!("no active session"),
        },
        AuthCommand::SignIn { email, password } => {
            client
                .sign_in_with_password(&email, &password)
                .await
                .context("sign-in failed")?;
            info!("signed in");
            println!("signed in as {email}");
        }
        AuthCommand::SignUp { email, password } => {
            match client
                .sign_up(&email, &password)
                .await
                .context("sign-up failed")?
            {
                SignUpOutcome::ConfirmationRequired { .. } => {
                    info!("sign-up awaits email confirmation");
                    println!("{CONFIRMATION_PROMPT}");
                }
                SignUpOutcome::SignedIn => println!("account created, signed in as {email}"),
            }
        }
        AuthCommand::SignOut => {
            client.get_session().await.context("session lookup failed")?;
            client.sign_out().await.context("sign-out failed")?;
            info!("session cleared");
            println!("signed out");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let Cli {
        config,
        session_file,
        command,
    } = Cli::parse();

    match command {
        Command::Catalog(CatalogCommand::Search {
            query,
            level,
            topic,
        }) => {
            let lines = search_catalog(&query, &CatalogFacets { level, topic });
            if lines.is_empty() {
                println!("no courses match '{query}'");
            }
            for line in lines {
                println!("{line}");
            }
        }
        Command::Auth(command) => {
            let settings = identity_settings(config.as_deref(), session_file);
            run_auth(settings, command).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_level_labels_and_variant_names() {
        assert_eq!(parse_level("básico"), Ok(Level::Basic));
        assert_eq!(parse_level("Advanced"), Ok(Level::Advanced));
        assert!(parse_level("experto").is_err());
    }

    #[test]
    fn search_lists_matching_courses_in_catalog_order() {
        let lines = search_catalog("fraude", &CatalogFacets::default());
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("fraud-110\t"));
    }

    #[test]
    fn empty_query_lists_the_whole_catalog() {
        let lines = search_catalog("", &CatalogFacets::default());
        assert_eq!(lines.len(), sample_courses().len());
    }

    #[test]
    fn level_facet_narrows_the_search() {
        let facets = CatalogFacets {
            level: Some(Level::Intermediate),
            topic: None,
        };
        let lines = search_catalog("", &facets);
        assert!(!lines.is_empty());
        assert!(lines.iter().all(|line| line.contains("\tIntermedio\t")));
    }

    #[test]
    fn cli_parses_auth_sign_in() {
        let cli = Cli::try_parse_from([
            "academy",
            "auth",
            "sign-in",
            "--email",
            "ana@example.com",
            "--password",
            "secret",
        ])
        .expect("parse");
        assert!(matches!(
            cli.command,
            Command::Auth(AuthCommand::SignIn { ref email, .. }) if email == "ana@example.com"
        ));
    }

    #[test]
    fn auth_commands_carry_log_names() {
        let cli = Cli::try_parse_from(["academy", "auth", "sign-out"]).expect("parse");
        let Command::Auth(command) = cli.command else {
            panic!("expected an auth command");
        };
        assert_eq!(command.name(), "sign_out");
        assert_eq!(AuthCommand::Session.name(), "session");
    }

    #[tokio::test]
    async fn unconfigured_auth_fails_before_any_request() {
        let settings = IdentitySettings::default();
        let err = run_auth(settings, AuthCommand::Session)
            .await
            .expect_err("missing settings");
        assert!(err.to_string().contains("not configured"));
    }
}
