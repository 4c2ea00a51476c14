use std::{process::ExitCode, sync::Arc};

use anyhow::Result;
use clap::{Parser, Subcommand};
use client_core::{
    load_client_settings, ClientEvent, DeleteOutcome, HttpRecordStore, KodersController,
    ListView, LoadOutcome, NotificationLevel, SubmitOutcome, SubmitPolicy,
};
use shared::{domain::KoderId, validation::Field};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "koders", about = "Manage the Koders List from the terminal")]
struct Args {
    /// Base URL of the koders API; overrides koders.toml and the environment.
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[arg(long, global = true)]
    submit_policy: Option<SubmitPolicy>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every koder.
    List,
    /// Validate and create a koder, then print the refreshed list.
    Add {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
    },
    /// Delete a koder by identifier, then print the refreshed list.
    Delete { id: String },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_client_settings();
    if let Some(api_url) = args.api_url {
        settings.api_url = api_url;
    }
    if let Some(policy) = args.submit_policy {
        settings.submit_policy = policy;
    }

    let store = HttpRecordStore::new(&settings.api_url)?;
    let controller = KodersController::new(Arc::new(store), settings.submit_policy);
    let mut events = controller.subscribe_events();

    let succeeded = match args.command {
        Command::List => !matches!(controller.load().await, LoadOutcome::Failed(_)),
        Command::Add {
            first_name,
            last_name,
            email,
        } => {
            controller.update_field(Field::FirstName, first_name).await;
            controller.update_field(Field::LastName, last_name).await;
            controller.update_field(Field::Email, email).await;
            match controller.submit().await {
                SubmitOutcome::Invalid(errors) => {
                    for error in errors {
                        eprintln!("{}: {}", error.field.label(), error.message());
                    }
                    false
                }
                SubmitOutcome::Created { .. } => true,
                SubmitOutcome::Failed(_) => false,
            }
        }
        Command::Delete { id } => matches!(
            controller.delete(&KoderId::new(id)).await,
            DeleteOutcome::Deleted { .. }
        ),
    };

    while let Ok(event) = events.try_recv() {
        if let ClientEvent::Notification(notification) = event {
            match notification.level {
                NotificationLevel::Success => println!("{}", notification.message),
                NotificationLevel::Error => eprintln!("{}", notification.message),
            }
        }
    }

    match controller.view().await.list {
        ListView::Placeholder(text) => println!("{text}"),
        ListView::Rows(rows) => {
            for row in rows {
                println!("{row}");
            }
        }
    }

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
