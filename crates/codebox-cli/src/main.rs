//! CodeBox command-line entry point.
//!
//! Starts a session, performs a single operation, prints the result and
//! stops the session again. Configuration comes from `CODEBOX_*` environment
//! variables, backed by a `.env` file; logs go to stderr so stdout carries
//! only results.

use anyhow::Context;
use clap::{Parser, Subcommand};
use codebox_core::{CodeBox, CodeBoxConfig};
use std::path::PathBuf;
use tokio::io::AsyncReadExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Run one operation in a fresh CodeBox session.
#[derive(Parser, Debug)]
#[command(name = "codebox")]
#[command(about = "CodeBox CLI - run code in a remote sandbox session")]
#[command(version)]
struct Cli {
    /// Env file read before the process environment falls back to defaults.
    #[arg(long, global = true, value_name = "FILE", default_value = ".env")]
    env_file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Execute code in the session (`-` reads the code from stdin).
    Run {
        #[arg(value_name = "CODE")]
        code: String,
    },
    /// Install a package into the session environment.
    Install {
        #[arg(value_name = "PACKAGE")]
        package: String,
    },
    /// Upload a local file into the session filesystem.
    Upload {
        /// Name of the file inside the session.
        name: String,
        /// Local file to read.
        file: PathBuf,
    },
    /// Print the content of a file in the session filesystem.
    Download { name: String },
    /// List files in the session filesystem.
    Files,
    /// Show the session status.
    Status,
    /// Restart the session's execution environment.
    Restart,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = CodeBoxConfig::from_env_file(&cli.env_file)?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::from_default_env()
                .add_directive(format!("codebox_core={}", config.log_directive()).parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!(base_url = %config.base_url, timeout = ?config.timeout, "Configuration loaded");
    config.validate_warn();

    let codebox = CodeBox::new(&config).context("invalid CodeBox configuration")?;
    codebox.start().await.context("failed to start CodeBox")?;

    let result = execute(&codebox, cli.command).await;

    // Stop even when the command failed so the remote session is released.
    if let Err(e) = codebox.stop().await {
        tracing::warn!(error = %e, "Failed to stop CodeBox");
    }
    codebox.cleanup().await;

    let output = result?;
    println!("{output}");
    Ok(())
}

async fn execute(codebox: &CodeBox, command: Command) -> anyhow::Result<String> {
    let output = match command {
        Command::Run { code } => {
            let code = if code == "-" {
                let mut buf = String::new();
                tokio::io::stdin()
                    .read_to_string(&mut buf)
                    .await
                    .context("failed to read code from stdin")?;
                buf
            } else {
                code
            };
            codebox.run(&code).await?.to_string()
        }
        Command::Install { package } => codebox.install(&package).await?.to_string(),
        Command::Upload { name, file } => {
            let content = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("failed to read {}", file.display()))?;
            codebox.upload(&name, &content).await?.to_string()
        }
        Command::Download { name } => {
            let file = codebox.download(&name).await?;
            file.content.unwrap_or_default()
        }
        Command::Files => codebox
            .list_files()
            .await?
            .iter()
            .map(|f| f.name.as_str())
            .collect::<Vec<_>>()
            .join("\n"),
        Command::Status => serde_json::to_string(&codebox.status().await?)?,
        Command::Restart => codebox.restart().await?.to_string(),
    };
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_parse_commands() {
        let cli = Cli::try_parse_from(["codebox", "run", "print(1)"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Run {
                code: "print(1)".into()
            }
        );
        assert_eq!(cli.env_file, PathBuf::from(".env"));

        let cli = Cli::try_parse_from(["codebox", "upload", "a.py", "./a.py"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Upload {
                name: "a.py".into(),
                file: PathBuf::from("./a.py")
            }
        );

        let cli = Cli::try_parse_from(["codebox", "files"]).unwrap();
        assert_eq!(cli.command, Command::Files);
        let cli = Cli::try_parse_from(["codebox", "status"]).unwrap();
        assert_eq!(cli.command, Command::Status);
    }

    #[test]
    fn test_parse_restart() {
        let cli = Cli::try_parse_from(["codebox", "restart"]).unwrap();
        assert_eq!(cli.command, Command::Restart);
    }

    #[test]
    fn test_parse_env_file_flag() {
        let cli =
            Cli::try_parse_from(["codebox", "status", "--env-file", "/etc/codebox.env"]).unwrap();
        assert_eq!(cli.env_file, PathBuf::from("/etc/codebox.env"));
    }

    #[test]
    fn test_help_is_displayed() {
        let err = Cli::try_parse_from(["codebox", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_parse_rejects_bad_usage() {
        let err = Cli::try_parse_from(["codebox", "run"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);

        let err = Cli::try_parse_from(["codebox", "explode"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSubcommand);

        assert!(Cli::try_parse_from(["codebox"]).is_err());
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
