use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    config::{load_directory, load_settings, load_settings_from},
    CascadeController, HttpBookingClient,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

mod shell;

use shell::{Echo, ShellCommand};

#[derive(Parser, Debug)]
#[command(about = "Book clinic appointments from the terminal")]
struct Args {
    /// Settings file; defaults to ./booking.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    server_url: Option<String>,
    /// JSON file mapping departments to their doctors.
    #[arg(long)]
    directory: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = match &args.config {
        Some(path) => load_settings_from(path),
        None => load_settings(),
    };
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }
    if let Some(directory) = args.directory {
        settings.directory_path = Some(directory);
    }

    let directory_path = settings.directory_path.clone().context(
        "no doctor directory configured; pass --directory or set BOOKING_DIRECTORY",
    )?;
    let directory = Arc::new(load_directory(&directory_path)?);
    let client = HttpBookingClient::new(&settings.server_url, settings.request_timeout())?;
    info!(
        "booking against {} with {} departments",
        client.base_url(),
        directory.departments().count()
    );

    let mut controller = CascadeController::new(Arc::new(client), directory);
    for notice in controller.start().await {
        println!("{}", shell::format_notice(&notice));
    }
    println!("{}", shell::describe_appointments(controller.state()));
    println!("Type 'help' for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match shell::parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };

        match command {
            ShellCommand::Blank => {}
            ShellCommand::Help => println!("{}", shell::HELP),
            ShellCommand::Quit => break,
            ShellCommand::Departments => {
                println!("{}", shell::format_departments(controller.state().directory()))
            }
            ShellCommand::Show => println!("{}", shell::describe_form(controller.state())),
            ShellCommand::List => println!("{}", shell::describe_appointments(controller.state())),
            ShellCommand::Update(event) => {
                let echo = Echo::for_event(&event);
                // Echo the form before it is reset by a successful save.
                if let Some(Echo::Submission) = echo {
                    println!("{}", Echo::Submission.render(controller.state()));
                }

                let notices = controller.dispatch(event).await;
                for notice in &notices {
                    println!("{}", shell::format_notice(notice));
                }
                match echo {
                    Some(Echo::Submission) => {
                        if notices.iter().any(|notice| !notice.is_error()) {
                            println!("{}", shell::describe_appointments(controller.state()));
                        }
                    }
                    Some(echo) => println!("{}", echo.render(controller.state())),
                    None => {}
                }
            }
        }
    }

    Ok(())
}
