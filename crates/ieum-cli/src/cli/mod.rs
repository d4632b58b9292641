//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use ieum_core::api::BackendClient;
use ieum_core::config::{self, Config};
use ieum_core::search::{MaritalStatus, TagRowKind};
use ieum_core::{interrupt, logging};

mod commands;

#[derive(Parser)]
#[command(name = "ieum")]
#[command(version)]
#[command(about = "청년이음 youth policy chatbot client")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Backend base URL (overrides IEUM_BASE_URL and the config file)
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Ask a single question and print the answer
    Ask {
        /// The question (read from stdin when omitted)
        #[arg(value_name = "QUESTION")]
        question: Vec<String>,
    },

    /// Manage saved conversations
    Conversations {
        #[command(subcommand)]
        command: ConversationCommands,
    },

    /// Search youth policies
    Search(SearchArgs),

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConversationCommands {
    /// Lists saved conversations
    List,
    /// Shows the messages of a conversation
    Show {
        #[arg(value_name = "CONVERSATION_ID")]
        id: String,
    },
    /// Starts a new conversation
    New,
    /// Renames a conversation
    Rename {
        #[arg(value_name = "CONVERSATION_ID")]
        id: String,
        /// New title for the conversation
        #[arg(value_name = "TITLE")]
        title: String,
    },
    /// Deletes a conversation
    Delete {
        #[arg(value_name = "CONVERSATION_ID")]
        id: String,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Save the backend base URL to the config file
    SetUrl {
        #[arg(value_name = "URL")]
        url: String,
    },
}

#[derive(clap::Args)]
struct SearchArgs {
    /// Search keywords (title, description, keywords)
    #[arg(value_name = "QUERY")]
    query: Vec<String>,

    /// Hide policies whose application period has ended
    #[arg(long)]
    exclude_closed: bool,

    /// Region as PROVINCE or PROVINCE:DISTRICT, e.g. seoul:강남구 (repeatable)
    #[arg(long = "region", value_name = "REGION")]
    regions: Vec<String>,

    #[arg(long, value_enum, default_value_t = Marital::Any)]
    marital: Marital,

    #[arg(long)]
    age: Option<u32>,

    /// Minimum annual income (10k KRW)
    #[arg(long)]
    income_min: Option<u32>,

    /// Maximum annual income (10k KRW)
    #[arg(long)]
    income_max: Option<u32>,

    #[arg(long)]
    education: Option<String>,

    #[arg(long)]
    major: Option<String>,

    #[arg(long)]
    employment: Option<String>,

    #[arg(long)]
    specialization: Option<String>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// List accepted filter values and exit
    #[arg(long)]
    list_options: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Marital {
    Any,
    Single,
    Married,
}

impl From<Marital> for MaritalStatus {
    fn from(value: Marital) -> Self {
        match value {
            Marital::Any => MaritalStatus::Any,
            Marital::Single => MaritalStatus::Single,
            Marital::Married => MaritalStatus::Married,
        }
    }
}

impl From<SearchArgs> for commands::search::SearchOptions {
    fn from(args: SearchArgs) -> Self {
        let tags = [
            (TagRowKind::Education, args.education),
            (TagRowKind::Major, args.major),
            (TagRowKind::EmploymentStatus, args.employment),
            (TagRowKind::Specialization, args.specialization),
        ]
        .into_iter()
        .filter_map(|(kind, value)| value.map(|v| (kind, v)))
        .collect();

        Self {
            query: args.query.join(" "),
            exclude_closed: args.exclude_closed,
            regions: args.regions,
            marital_status: args.marital.into(),
            age: args.age,
            income_min: args.income_min,
            income_max: args.income_max,
            tags,
            json: args.json,
        }
    }
}

pub fn run() -> Result<()> {
    let mut cli = Cli::parse();

    // Piped questions are read before the runtime starts.
    if let Some(Commands::Ask { question }) = &mut cli.command
        && question.is_empty()
    {
        question.extend(commands::ask::read_piped_stdin()?);
    }

    interrupt::init()?;

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    let result = rt.block_on(async move { dispatch(cli).await });

    // The REPL may leave a blocking stdin read behind; do not wait for it.
    rt.shutdown_background();
    result
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config = Config::load().context("load config")?;

    // Logging is best-effort; a read-only home must not block chatting.
    let _log_guard = logging::init(&config)
        .inspect_err(|e| eprintln!("Warning: logging disabled: {e:#}"))
        .ok();

    let Cli { command, base_url } = cli;
    let client = || backend(&config, base_url.as_deref());

    // default to chat mode
    let Some(command) = command else {
        return commands::chat::run(client()?, &config).await;
    };

    match command {
        Commands::Ask { question } => commands::ask::run(client()?, &question).await,

        Commands::Conversations { command } => {
            let client = client()?;
            match command {
                ConversationCommands::List => {
                    commands::conversations::list(&client).await;
                    Ok(())
                }
                ConversationCommands::Show { id } => {
                    commands::conversations::show(&client, &id).await
                }
                ConversationCommands::New => commands::conversations::new(&client).await,
                ConversationCommands::Rename { id, title } => {
                    commands::conversations::rename(&client, &id, &title).await
                }
                ConversationCommands::Delete { id } => {
                    commands::conversations::delete(&client, &id).await
                }
            }
        }

        Commands::Search(args) => {
            if args.list_options {
                commands::search::print_options();
                return Ok(());
            }
            commands::search::run(&client()?, args.into()).await
        }

        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::SetUrl { url } => commands::config::set_url(&url),
        },
    }
}

/// Builds the backend client; `--base-url` beats env and config.
fn backend(config: &Config, base_url: Option<&str>) -> Result<BackendClient> {
    match base_url {
        Some(url) => {
            let url = config::resolve_base_url(Some(url), None)?;
            Ok(BackendClient::new(url).with_timeout(config.request_timeout()))
        }
        None => BackendClient::from_config(config),
    }
}
