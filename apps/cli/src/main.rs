use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use client_core::{
    load_settings, routes, AuthApiClient, ClientError, ClientSettings, DashboardShell,
    FormOrchestrator, OrchestratorError, RuleValidator,
};
use shared::protocol::FieldErrors;
use shared::domain::{fields, SubmitKind};

#[derive(Parser, Debug)]
#[command(name = "portal", about = "Organisation portal client")]
struct Cli {
    /// Overrides the configured backend base URL.
    #[arg(long)]
    api_base_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account.
    SignUp(SignUpArgs),
    /// Change the signed-in user's password.
    ChangePassword {
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
    },
    /// Show the page and title a dashboard path resolves to.
    Route {
        path: String,
        #[arg(long, default_value = routes::DASHBOARD_ROOT)]
        base: String,
    },
    /// Load the profile and render the dashboard shell for a path.
    Dashboard {
        #[arg(default_value = routes::DASHBOARD_ROOT)]
        path: String,
    },
}

#[derive(Args, Debug)]
struct SignUpArgs {
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    username: String,
    #[arg(long)]
    password: String,
    #[arg(long)]
    confirm_password: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings();
    if let Some(url) = cli.api_base_url {
        settings.api_base_url = url;
    }

    match cli.command {
        Command::Route { path, base } => {
            let route = routes::resolve(&base, &path);
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "title": routes::title_for(&path),
                    "page": route.map(|r| r.page),
                    "routes": routes::routes_for(&base),
                }))?
            );
        }
        Command::Dashboard { path } => {
            let client = AuthApiClient::from_settings(&settings)?;
            let shell = DashboardShell::new(Arc::new(client));
            shell.mount().await;
            let view = shell.view(routes::DASHBOARD_ROOT, &path).await;
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        Command::SignUp(args) => {
            let values = [
                (fields::FIRST_NAME, args.first_name),
                (fields::LAST_NAME, args.last_name),
                (fields::EMAIL, args.email),
                (fields::USERNAME, args.username),
                (fields::PASSWORD, args.password),
                (fields::CONFIRM_PASSWORD, args.confirm_password),
            ];
            submit_form(&settings, SubmitKind::SignUp, values).await?;
        }
        Command::ChangePassword {
            password,
            confirm_password,
        } => {
            let values = [
                (fields::PASSWORD, password),
                (fields::CONFIRM_PASSWORD, confirm_password),
            ];
            submit_form(&settings, SubmitKind::NewPassword, values).await?;
        }
    }

    Ok(())
}

async fn submit_form<const N: usize>(
    settings: &ClientSettings,
    kind: SubmitKind,
    values: [(&str, String); N],
) -> Result<()> {
    let client = Arc::new(AuthApiClient::from_settings(settings)?);
    let form = FormOrchestrator::authentication(
        Arc::new(RuleValidator),
        &client.dispatcher(),
        settings,
    )?;

    tracing::debug!(api = %settings.api_base_url, operation = %kind.operation(), "submitting form");
    if let Err(err) = form.submit_values(kind, values).await {
        if let Some(OrchestratorError::Rejected { errors }) =
            err.downcast_ref::<OrchestratorError>()
        {
            print_field_errors(errors);
        } else if let Some(errors) = err
            .downcast_ref::<ClientError>()
            .and_then(ClientError::field_errors)
        {
            print_field_errors(errors);
        }
        return Err(err.context(format!("{} failed", kind.operation())));
    }

    println!("{} succeeded", kind.operation());
    Ok(())
}

fn print_field_errors(errors: &FieldErrors) {
    for (field, messages) in errors {
        for message in messages {
            eprintln!("{field}: {message}");
        }
    }
}
