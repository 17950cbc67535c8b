//! eshop CLI - browse the catalog, manage a session and check out.
//!
//! # Usage
//!
//! ```bash
//! # Create an account, or sign in to an existing one
//! eshop signup --first-name Ada --last-name Lovelace -e ada@example.com --contact-number 5550100
//! eshop login -e ada@example.com
//!
//! # Browse
//! eshop products list --category Home --sort price-low-to-high
//! eshop products show 64f0c2
//!
//! # Buy two units, shipping to a saved address
//! eshop checkout --product 64f0c2 --quantity 2 --address 65a1d9 --yes
//! ```
//!
//! Passwords are read from `ESHOP_PASSWORD` when `--password` is not given.
//! Every command other than `signup`, `login` and `logout` needs a stored session.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::print_stdout)]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use eshop_client::config::ClientConfig;

mod commands;

use commands::{AddressArgs, CheckoutArgs, Context, ProductArgs, SortArg};

#[derive(Parser)]
#[command(name = "eshop")]
#[command(author, version, about = "eshop storefront from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and sign in
    Signup {
        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        #[arg(short, long)]
        email: eshop_core::Email,

        #[arg(long)]
        contact_number: String,

        #[arg(short, long, env = "ESHOP_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign in with an existing account
    Login {
        #[arg(short, long)]
        email: eshop_core::Email,

        #[arg(short, long, env = "ESHOP_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show whether a session is stored
    Whoami,
    /// Browse and manage products
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Manage saved shipping addresses
    Addresses {
        #[command(subcommand)]
        action: AddressAction,
    },
    /// Buy a product
    Checkout(CheckoutArgs),
}

#[derive(Subcommand)]
enum ProductAction {
    /// List products
    List {
        /// Only show this category
        #[arg(short, long)]
        category: Option<String>,

        #[arg(short, long, value_enum, default_value = "default")]
        sort: SortArg,

        /// Server-side search
        #[arg(long)]
        search: Option<String>,
    },
    /// List product categories
    Categories,
    /// Show one product
    Show { id: String },
    /// Add a product
    Add(ProductArgs),
    /// Modify a product; omitted fields keep their current value
    Update {
        id: String,

        #[command(flatten)]
        fields: ProductArgs,
    },
    /// Delete a product
    Delete { id: String },
}

#[derive(Subcommand)]
enum AddressAction {
    /// List saved addresses
    List,
    /// Save a new address
    Add(AddressArgs),
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Map tracing levels onto Sentry: warnings and errors become events,
/// info and debug become breadcrumbs.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        tracing::Level::TRACE => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    let config = ClientConfig::from_env();
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "eshop_cli=info,eshop_client=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result = match config {
        Ok(config) => run(cli, &config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        if let Some(hint) = e
            .downcast_ref::<commands::CommandError>()
            .and_then(commands::CommandError::hint)
        {
            println!("{hint}");
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::new(config)?;

    match cli.command {
        Commands::Signup {
            first_name,
            last_name,
            email,
            contact_number,
            password,
        } => {
            let request = eshop_core::SignupRequest {
                first_name,
                last_name,
                email,
                password,
                contact_number,
            };
            commands::auth::signup(&ctx, &request).await?;
        }
        Commands::Login { email, password } => {
            let credentials = eshop_core::Credentials {
                username: email,
                password,
            };
            commands::auth::login(&ctx, &credentials).await?;
        }
        Commands::Logout => commands::auth::logout(&ctx),
        Commands::Whoami => commands::auth::whoami(&ctx)?,
        Commands::Products { action } => match action {
            ProductAction::List {
                category,
                sort,
                search,
            } => {
                commands::products::list(&ctx, category.as_deref(), sort.into(), search.as_deref())
                    .await?;
            }
            ProductAction::Categories => commands::products::categories(&ctx).await?,
            ProductAction::Show { id } => commands::products::show(&ctx, &id).await?,
            ProductAction::Add(fields) => commands::products::add(&ctx, fields).await?,
            ProductAction::Update { id, fields } => {
                commands::products::update(&ctx, &id, fields).await?;
            }
            ProductAction::Delete { id } => commands::products::delete(&ctx, &id).await?,
        },
        Commands::Addresses { action } => match action {
            AddressAction::List => commands::addresses::list(&ctx).await?,
            AddressAction::Add(fields) => commands::addresses::add(&ctx, fields).await?,
        },
        Commands::Checkout(args) => commands::checkout::run(&ctx, args).await?,
    }
    Ok(())
}
