//! zenvia - Storefront CLI over two public product feeds

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use zenvia::catalog::LoadPolicy;
use zenvia::commands::{
    open_store, AccountCommand, CartCommand, CatalogCommand, CatalogQuery, CheckoutCommand,
    ProductCommand,
};
use zenvia::config::{Config, OutputFormat};
use zenvia::filters::SortOrder;
use zenvia::store::Theme;

#[derive(Parser)]
#[command(
    name = "zenvia",
    version,
    about = "Storefront CLI over two public product feeds",
    long_about = "Browse a merged product catalog, manage a persistent cart and wishlist, and place simulated orders."
)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Directory for cart, wishlist, accounts and orders
    #[arg(long, global = true, env = "ZENVIA_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, global = true, env = "ZENVIA_PROXY")]
    proxy: Option<String>,

    /// Feed failure policy: strict or partial
    #[arg(long, global = true)]
    policy: Option<LoadPolicy>,

    /// Seed for synthesized reviews
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the merged catalog
    #[command(alias = "ls")]
    Catalog {
        /// Minimum price filter
        #[arg(long)]
        min_price: Option<f64>,

        /// Maximum price filter
        #[arg(long)]
        max_price: Option<f64>,

        /// Minimum rating filter (0.0-5.0)
        #[arg(long)]
        min_rating: Option<f32>,

        /// Only this category
        #[arg(long)]
        category: Option<String>,

        /// Required keywords (comma-separated)
        #[arg(long, value_delimiter = ',')]
        keywords: Option<Vec<String>>,

        /// Excluded keywords (comma-separated)
        #[arg(long, value_delimiter = ',')]
        exclude: Option<Vec<String>>,

        /// featured, price-asc, price-desc, rating, title
        #[arg(short, long, default_value = "featured")]
        sort: SortOrder,

        /// Maximum number of results
        #[arg(short, long)]
        max: Option<usize>,
    },

    /// List category labels
    Categories,

    /// Show one product with reviews
    #[command(alias = "p")]
    Product {
        /// Product id, e.g. fs-1 or dj-42
        id: String,
    },

    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: Option<CartAction>,
    },

    /// Manage the wishlist
    Wishlist {
        #[command(subcommand)]
        action: Option<WishlistAction>,
    },

    /// Apply a coupon code
    Coupon { code: String },

    /// Place an order for the current cart
    Checkout,

    /// Show order history
    Orders,

    /// Show recently viewed products
    Recent,

    /// Show or set the theme
    Theme { theme: Option<Theme> },

    /// Create an account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "ZENVIA_PASSWORD")]
        password: String,
    },

    /// Log in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "ZENVIA_PASSWORD")]
        password: String,
    },

    /// End the current session
    Logout,

    /// Log in with an emailed one-time code
    Otp {
        #[command(subcommand)]
        action: OtpAction,
    },

    /// Reset a forgotten password
    Reset {
        #[command(subcommand)]
        action: ResetAction,
    },

    /// Show the logged-in user
    Whoami,
}

#[derive(Subcommand)]
enum CartAction {
    /// Show lines and totals
    Show,
    /// Add a product in a size
    Add {
        id: String,
        #[arg(short, long)]
        size: String,
    },
    /// Add a product in the default size
    QuickAdd { id: String },
    /// Change a line's quantity by a delta, e.g. `qty 1 -- -1`
    Qty {
        line: usize,
        #[arg(allow_negative_numbers = true)]
        delta: i32,
    },
    /// Remove a line
    Remove { line: usize },
}

#[derive(Subcommand)]
enum WishlistAction {
    Show,
    /// Save or unsave a product
    Toggle { id: String },
}

#[derive(Subcommand)]
enum OtpAction {
    /// Email a login code
    Send { email: String },
    /// Log in with the code
    Verify { email: String, code: String },
}

#[derive(Subcommand)]
enum ResetAction {
    /// Email a reset link
    Request { email: String },
    /// Set a new password using the emailed token
    Confirm {
        email: String,
        token: String,
        #[arg(long, env = "ZENVIA_PASSWORD")]
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    let mut config = Config::load(cli.config.as_deref())?.with_env();

    if let Some(format) = cli.format {
        config.format = format;
    }
    if let Some(dir) = cli.data_dir {
        config.data_dir = Some(dir);
    }
    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }
    if let Some(policy) = cli.policy {
        config.policy = policy;
    }
    if cli.seed.is_some() {
        config.review_seed = cli.seed;
    }

    let mut store = open_store(&config)?;

    let output = match cli.command {
        Commands::Catalog {
            min_price,
            max_price,
            min_rating,
            category,
            keywords,
            exclude,
            sort,
            max,
        } => {
            let query = CatalogQuery {
                min_price,
                max_price,
                min_rating,
                category,
                keywords: keywords.unwrap_or_default(),
                exclude: exclude.unwrap_or_default(),
                sort,
                limit: max,
            };
            CatalogCommand::new(config).execute(&mut store, &query).await?
        }

        Commands::Categories => CatalogCommand::new(config).categories(&mut store).await?,

        Commands::Product { id } => ProductCommand::new(config).execute(&mut store, &id).await?,

        Commands::Recent => ProductCommand::new(config).recent(&mut store).await?,

        Commands::Cart { action } => {
            let cmd = CartCommand::new(config);
            match action.unwrap_or(CartAction::Show) {
                CartAction::Show => cmd.show(&store),
                CartAction::Add { id, size } => cmd.add(&mut store, &id, &size).await?,
                CartAction::QuickAdd { id } => cmd.quick_add(&mut store, &id).await?,
                CartAction::Qty { line, delta } => cmd.update_quantity(&mut store, line, delta)?,
                CartAction::Remove { line } => cmd.remove(&mut store, line)?,
            }
        }

        Commands::Wishlist { action } => {
            let cmd = CartCommand::new(config);
            match action.unwrap_or(WishlistAction::Show) {
                WishlistAction::Show => cmd.wishlist(&mut store).await?,
                WishlistAction::Toggle { id } => cmd.toggle_wishlist(&mut store, &id)?,
            }
        }

        Commands::Coupon { code } => CartCommand::new(config).apply_coupon(&mut store, &code)?,

        Commands::Checkout => {
            let (_store, result) = CheckoutCommand::new(config).execute(store).await;
            result?
        }

        Commands::Orders => CheckoutCommand::new(config).orders(&store),

        Commands::Theme { theme } => AccountCommand::new(config).theme(&mut store, theme)?,

        Commands::Register { name, email, password } => {
            AccountCommand::new(config).register(&mut store, &name, &email, &password)?
        }

        Commands::Login { email, password } => {
            AccountCommand::new(config).login(&mut store, &email, &password)?
        }

        Commands::Logout => AccountCommand::new(config).logout(&mut store)?,

        Commands::Whoami => AccountCommand::new(config).whoami(&store),

        Commands::Otp { action } => {
            let cmd = AccountCommand::new(config);
            match action {
                OtpAction::Send { email } => cmd.send_otp(&mut store, &email).await?,
                OtpAction::Verify { email, code } => cmd.verify_otp(&mut store, &email, &code)?,
            }
        }

        Commands::Reset { action } => {
            let cmd = AccountCommand::new(config);
            match action {
                ResetAction::Request { email } => cmd.request_reset(&mut store, &email).await?,
                ResetAction::Confirm { email, token, password } => {
                    cmd.confirm_reset(&mut store, &email, &token, &password)?
                }
            }
        }
    };

    println!("{}", output);
    Ok(())
}
