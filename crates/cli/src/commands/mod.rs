//! CLI command implementations.

pub mod addresses;
pub mod auth;
pub mod checkout;
pub mod products;

use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use thiserror::Error;

use eshop_client::addresses::AddressError;
use eshop_client::api::{ApiError, HttpGateway};
use eshop_client::catalog::{CatalogError, SortOption};
use eshop_client::checkout::WizardError;
use eshop_client::config::ClientConfig;
use eshop_client::guard::{Authenticated, GuardRejection, RouteGuard};
use eshop_client::session::{AuthError, FileTokenStorage, SessionStore};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Guard(#[from] GuardRejection),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Address(#[from] AddressError),

    #[error(transparent)]
    Checkout(#[from] WizardError),

    #[error(transparent)]
    Api(#[from] ApiError),

    /// Command-line input that clap cannot check on its own.
    #[error("{0}")]
    InvalidArgument(String),
}

impl CommandError {
    /// What the user can do about it, when there is something obvious.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Guard(GuardRejection::Unauthenticated { .. })
            | Self::Auth(AuthError::MissingToken) => Some("Run `eshop login` to sign in."),
            _ => None,
        }
    }
}

/// Shared state for one CLI invocation.
pub struct Context {
    pub session: SessionStore,
    pub gateway: HttpGateway,
    guard: RouteGuard,
}

impl Context {
    /// Open the stored session and build the API gateway.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::Api` if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, CommandError> {
        let session = SessionStore::open(FileTokenStorage::new(&config.session_file));
        let gateway = HttpGateway::new(config, session.clone())?;
        Ok(Self {
            guard: RouteGuard::new(session.clone()),
            session,
            gateway,
        })
    }

    /// Pass the route guard or fail the command.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::Guard` when there is no session.
    pub fn authenticated(&self) -> Result<Authenticated, CommandError> {
        Ok(self.guard.check()?)
    }
}

/// `--sort` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    Default,
    PriceHighToLow,
    PriceLowToHigh,
    Newest,
}

impl From<SortArg> for SortOption {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Default => Self::Default,
            SortArg::PriceHighToLow => Self::PriceHighToLow,
            SortArg::PriceLowToHigh => Self::PriceLowToHigh,
            SortArg::Newest => Self::Newest,
        }
    }
}

/// Product fields; all optional so `update` can patch a subset.
#[derive(Debug, Clone, Default, Args)]
pub struct ProductArgs {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    /// Unit price in dollars, e.g. `19.99`
    #[arg(long)]
    pub price: Option<Decimal>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub manufacturer: Option<String>,

    #[arg(long)]
    pub available_items: Option<u32>,

    #[arg(long)]
    pub image_url: Option<String>,
}

/// A shipping address typed on the command line.
#[derive(Debug, Clone, Default, Args)]
pub struct AddressArgs {
    #[arg(long)]
    pub street: Option<String>,

    #[arg(long)]
    pub city: Option<String>,

    #[arg(long)]
    pub state: Option<String>,

    #[arg(long)]
    pub zip: Option<String>,

    /// Recipient name
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub contact_number: Option<String>,

    #[arg(long)]
    pub landmark: Option<String>,
}

impl AddressArgs {
    /// Whether any of the four required fields was given.
    #[must_use]
    pub const fn is_given(&self) -> bool {
        self.street.is_some() || self.city.is_some() || self.state.is_some() || self.zip.is_some()
    }

    #[must_use]
    pub fn into_form(self) -> eshop_core::AddressForm {
        let mut form = eshop_core::AddressForm::new(
            self.street.unwrap_or_default(),
            self.city.unwrap_or_default(),
            self.state.unwrap_or_default(),
            self.zip.unwrap_or_default(),
        );
        form.name = self.name;
        form.contact_number = self.contact_number;
        form.landmark = self.landmark;
        form
    }
}

/// `eshop checkout` arguments.
#[derive(Debug, Clone, Args)]
pub struct CheckoutArgs {
    /// Product to buy
    #[arg(long)]
    pub product: String,

    #[arg(long, default_value_t = 1)]
    pub quantity: u32,

    /// Ship to this saved address
    #[arg(long, conflicts_with_all = ["street", "city", "state", "zip"])]
    pub address: Option<String>,

    /// Or save and ship to a new one
    #[command(flatten)]
    pub new_address: AddressArgs,

    /// Place the order without asking
    #[arg(short, long)]
    pub yes: bool,
}
