//! Tunda CLI - drive the marketplace client from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse listings anonymously
//! tunda listings --search kale
//!
//! # Shop into the guest cart (no account needed)
//! tunda cart add 42 --quantity 2.5
//! tunda cart show
//!
//! # Log in; a customer login merges the guest cart into the server cart
//! tunda login -p +254712345678
//! tunda whoami
//! tunda logout
//! ```
//!
//! # Commands
//!
//! - `login` / `logout` / `register` / `whoami` - session management
//! - `listings` - browse produce listings
//! - `cart` - show or mutate the cart (guest or server, per session role)
//!
//! # Environment Variables
//!
//! - `TUNDA_API_BASE_URL` - Base URL of the Tunda REST API (required)
//! - `TUNDA_STORAGE_PATH` - Durable storage file (default `.tunda/storage.json`)
//! - `TUNDA_HTTP_TIMEOUT_SECS` - Request timeout in seconds (default 30)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use tunda_core::{PhoneNumber, UserRole};

mod commands;

#[derive(Parser)]
#[command(name = "tunda")]
#[command(author, version, about = "Tunda marketplace client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in with phone number and password
    Login {
        /// Account phone number
        #[arg(short, long)]
        phone: PhoneNumber,

        /// Account password
        #[arg(short = 'w', long)]
        password: String,
    },
    /// Log out, keeping any guest cart
    Logout,
    /// Create an account and log straight in
    Register {
        /// Account phone number
        #[arg(short, long)]
        phone: PhoneNumber,

        /// Account password
        #[arg(short = 'w', long)]
        password: String,

        /// First name
        #[arg(long)]
        first_name: String,

        /// Last name
        #[arg(long)]
        last_name: String,

        /// Email address
        #[arg(short, long)]
        email: Option<String>,

        /// Account role (`customer`, `farmer`, `rider`)
        #[arg(short, long, default_value = "customer")]
        role: UserRole,
    },
    /// Show the current session
    Whoami,
    /// Browse produce listings
    Listings {
        /// Page number (1-based)
        #[arg(short, long)]
        page: Option<u32>,

        /// Free-text product search
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show or mutate the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart's lines and totals
    Show,
    /// Add a listing to the cart
    Add {
        /// Listing ID
        listing_id: i32,

        /// Quantity in the listing's unit (defaults to its minimum order)
        #[arg(short, long)]
        quantity: Option<Decimal>,
    },
    /// Replace a line's quantity
    Update {
        /// Listing ID (guest cart) or cart item ID (server cart)
        item_id: i32,

        /// New quantity
        #[arg(short, long)]
        quantity: Decimal,
    },
    /// Remove a line
    Remove {
        /// Listing ID (guest cart) or cart item ID (server cart)
        item_id: i32,
    },
    /// Empty the cart
    Clear,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let client = commands::build_client().await?;

    match cli.command {
        Commands::Login { phone, password } => {
            commands::auth::login(&client, &phone, &password).await;
        }
        Commands::Logout => commands::auth::logout(&client),
        Commands::Register {
            phone,
            password,
            first_name,
            last_name,
            email,
            role,
        } => {
            let new_user = tunda_client::NewUser {
                phone_number: phone,
                email,
                first_name,
                last_name,
                password,
                user_role: role,
            };
            commands::auth::register(&client, &new_user).await;
        }
        Commands::Whoami => commands::auth::whoami(&client),
        Commands::Listings { page, search } => {
            commands::listings::browse(&client, page, search).await?;
        }
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&client).await?,
            CartAction::Add {
                listing_id,
                quantity,
            } => commands::cart::add(&client, listing_id, quantity).await?,
            CartAction::Update { item_id, quantity } => {
                commands::cart::update(&client, item_id, quantity).await?;
            }
            CartAction::Remove { item_id } => commands::cart::remove(&client, item_id).await?,
            CartAction::Clear => commands::cart::clear(&client).await?,
        },
    }
    Ok(())
}
