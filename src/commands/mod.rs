pub mod account;
pub mod notes;

use anyhow::Result;
use clap::{Parser, Subcommand};
use notekeeper::config::Config;
use notekeeper::http::ApiClient;
use notekeeper::session::{FileTokenStorage, SessionStore};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "notekeeper",
    author,
    version,
    about = "Keep Notes - personal notes from the command line",
    long_about = "Sign in once and your session is kept between runs.\n\nThe API address comes \
                  from --api-url, NOTEKEEPER_API_URL, config.toml, or defaults to \
                  http://localhost:8000"
)]
pub struct Cli {
    /// Base address of the notes API
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Create an account")]
    Signup(account::SignUpArgs),

    #[command(about = "Sign in and keep the session")]
    Signin(account::SignInArgs),

    #[command(about = "Forget the stored session")]
    Logout,

    #[command(about = "Show API address and session state")]
    Status,

    #[command(about = "Show the signed-in account")]
    Whoami,

    #[command(about = "Exchange the session token for a fresh one")]
    Refresh,

    #[command(about = "Check that the API is reachable")]
    Health,

    #[command(about = "List or search notes")]
    List(notes::ListArgs),

    #[command(about = "Create a note")]
    Create(notes::CreateArgs),

    #[command(about = "Show one note")]
    Show(notes::ShowArgs),

    #[command(about = "Edit a note's title and/or content")]
    Edit(notes::EditArgs),

    #[command(about = "Delete a note")]
    Delete(notes::DeleteArgs),
}

/// Everything a command needs: resolved config, API client, session.
pub struct App {
    pub config: Config,
    pub client: ApiClient,
    pub session: SessionStore,
    pub session_path: PathBuf,
}

impl App {
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config = Config::load()?;
        if let Some(url) = &cli.api_url {
            config.api_url = url.clone();
        }
        if let Some(timeout) = cli.timeout {
            config.timeout_secs = timeout;
        }

        let client = ApiClient::from_config(&config)?;
        let storage = FileTokenStorage::in_dir(&config.resolved_data_dir()?);
        let session_path = storage.path().to_path_buf();
        let session = SessionStore::persistent(storage)?;

        tracing::debug!(api_url = %client.base_url(), "Client ready");
        Ok(Self {
            config,
            client,
            session,
            session_path,
        })
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let mut app = App::load(&cli)?;

    match cli.command {
        Commands::Signup(args) => account::signup(&app, args).await,
        Commands::Signin(args) => account::signin(&mut app, args).await,
        Commands::Logout => account::logout(&mut app),
        Commands::Status => account::status(&app),
        Commands::Whoami => account::whoami(&app).await,
        Commands::Refresh => account::refresh(&mut app).await,
        Commands::Health => account::health(&app).await,
        Commands::List(args) => notes::list(&app, args).await,
        Commands::Create(args) => notes::create(&app, args).await,
        Commands::Show(args) => notes::show(&app, args).await,
        Commands::Edit(args) => notes::edit(&app, args).await,
        Commands::Delete(args) => notes::delete(&app, args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "notekeeper",
            "list",
            "--query",
            "milk",
            "--api-url",
            "http://example.com",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("http://example.com"));
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::List(args) => assert_eq!(args.query.as_deref(), Some("milk")),
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn edit_requires_a_field() {
        assert!(Cli::try_parse_from(["notekeeper", "edit", "n1"]).is_err());
        assert!(Cli::try_parse_from(["notekeeper", "edit", "n1", "--content", "x"]).is_ok());
    }
}
