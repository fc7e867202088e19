//! Souq storefront CLI

use std::{
    io::{self, Write},
    path::PathBuf,
    process,
    str::FromStr,
};

use clap::{Args, Parser, Subcommand};
use jiff::Timestamp;
use tabled::{Table, builder::Builder, settings::Style};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use souq::{
    cart::{Cart, CartSnapshot},
    catalog::{Catalog, FixtureCatalog, HttpCatalog},
    config::StoreConfig,
    orders::{Order, OrderHistory, ShippingAddress},
    products::{Product, estimated_delivery, related_products},
    receipt::Receipt,
    search::{
        SearchRequest, SortKey, best_sellers, featured, latest, new_arrivals, offers, paginate,
    },
    storage::{CART_KEY, LocalStorage},
};

#[derive(Debug, Parser)]
#[command(name = "souq", about = "Souq storefront CLI", long_about = None)]
struct Cli {
    /// Store configuration file (YAML)
    #[arg(long, env = "SOUQ_CONFIG")]
    config: Option<PathBuf>,

    /// Catalog API base URL; the fixture catalog is used when omitted
    #[arg(long, env = "SOUQ_CATALOG_URL")]
    catalog_url: Option<String>,

    /// Catalog fixture file
    #[arg(long, default_value = "fixtures/catalog/storefront.yml")]
    fixture: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search the catalog
    Search(SearchArgs),

    /// Show one product with its related products
    Product(ProductArgs),

    /// Show the home page sections
    Home,

    /// Build a cart and print its receipt
    Cart(CartArgs),
}

#[derive(Debug, Args)]
struct SearchArgs {
    /// Free-text query matched against names and categories
    #[arg(default_value = "")]
    query: String,

    /// Category key
    #[arg(long, default_value = "all")]
    category: String,

    /// Sort order (relevance, price-low, price-high, rating, newest)
    #[arg(long, default_value = "relevance")]
    sort: String,

    /// 1-based results page
    #[arg(long, default_value_t = 1)]
    page: usize,
}

#[derive(Debug, Args)]
struct ProductArgs {
    /// Product id
    id: String,
}

#[derive(Debug, Args)]
struct CartArgs {
    /// Line to add, as `id[:quantity[:variant]]`
    #[arg(long = "add")]
    lines: Vec<CartLineArg>,

    /// Directory the cart and order history are kept in
    #[arg(long, env = "SOUQ_STORAGE_DIR")]
    storage: Option<PathBuf>,

    /// Place an order for the cart and clear it
    #[arg(long, requires = "storage")]
    checkout: bool,

    /// Recipient name
    #[arg(long, default_value = "")]
    name: String,

    /// Street address
    #[arg(long, default_value = "")]
    address: String,

    /// City
    #[arg(long, default_value = "")]
    city: String,

    /// Contact phone number
    #[arg(long, default_value = "")]
    phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CartLineArg {
    product_id: String,
    quantity: u32,
    variant: Option<String>,
}

impl FromStr for CartLineArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');

        let product_id = parts
            .next()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| format!("missing product id in {s:?}"))?
            .to_string();

        let quantity = match parts.next() {
            Some(quantity) => quantity
                .trim()
                .parse()
                .map_err(|error| format!("invalid quantity in {s:?}: {error}"))?,
            None => 1,
        };

        let variant = parts
            .next()
            .map(str::trim)
            .filter(|variant| !variant.is_empty())
            .map(str::to_string);

        Ok(Self {
            product_id,
            quantity,
            variant,
        })
    }
}

#[tokio::main]
pub async fn main() {
    let _env = dotenvy::dotenv();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .init();

    if let Err(error) = run(cli).await {
        #[expect(clippy::print_stderr, reason = "final error report for the CLI user")]
        {
            eprintln!("{error}");
        }

        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    let config = match &cli.config {
        Some(path) => StoreConfig::load(path)
            .map_err(|error| format!("failed to load config {}: {error}", path.display()))?,
        None => StoreConfig::default(),
    };

    let currency = config.currency().map_err(|error| error.to_string())?;

    let catalog = match &cli.catalog_url {
        Some(url) => {
            info!(%url, "loading catalog from API");
            Catalog::load(&HttpCatalog::new(url.as_str()), currency).await
        }
        None => {
            info!(fixture = %cli.fixture.display(), "loading catalog from fixture");
            Catalog::load(&FixtureCatalog::new(&cli.fixture), currency).await
        }
    };

    debug!(products = catalog.products().len(), "catalog ready");

    match cli.command {
        Commands::Search(args) => search(&catalog, &config, &args),
        Commands::Product(args) => product(&catalog, &config, &args.id),
        Commands::Home => home(&catalog, &config),
        Commands::Cart(args) => cart(&catalog, &config, args),
    }
}

fn search(catalog: &Catalog, config: &StoreConfig, args: &SearchArgs) -> Result<(), String> {
    let sort = args.sort.parse::<SortKey>().unwrap_or_else(|error| {
        warn!(%error, "falling back to relevance order");
        SortKey::default()
    });

    let request = SearchRequest {
        query: args.query.clone(),
        category: args.category.clone(),
        sort,
    };

    let results = request.run(catalog.products());
    let page = paginate(&results, args.page, config.page_size);
    let table = product_table(page.items, config)?;

    writeln!(
        io::stdout().lock(),
        "{table}\n page {} of {} ({} results)",
        page.page, page.total_pages, page.total_items
    )
    .map_err(|error| error.to_string())
}

fn product(catalog: &Catalog, config: &StoreConfig, id: &str) -> Result<(), String> {
    let product = catalog
        .product(id)
        .ok_or_else(|| format!("no such product: {id}"))?;

    let price = product.effective_price().map_err(|error| error.to_string())?;
    let local = config
        .local_currency()
        .format(&price)
        .map_err(|error| error.to_string())?;
    let delivery = estimated_delivery(Timestamp::now()).map_err(|error| error.to_string())?;

    let mut out = io::stdout().lock();

    writeln!(out, "\n {} ({})", product.name, product.id).map_err(|error| error.to_string())?;

    let written = if product.is_discounted() {
        let savings = product.savings().map_err(|error| error.to_string())?;
        writeln!(out, " {price} (was {}, save {savings}) / {local}", product.price)
    } else {
        writeln!(out, " {price} / {local}")
    };
    written.map_err(|error| error.to_string())?;

    writeln!(
        out,
        " {} | rating {} | estimated delivery {}",
        stock_label(product, config),
        product.rating,
        delivery.strftime("%Y-%m-%d")
    )
    .map_err(|error| error.to_string())?;

    if !product.colors.is_empty() {
        writeln!(out, " colours: {}", product.colors.join(", "))
            .map_err(|error| error.to_string())?;
    }

    let related = related_products(product, catalog.products(), config.related_products);

    if !related.is_empty() {
        let table = product_table(&related, config)?;
        writeln!(out, "\n Related products\n{table}").map_err(|error| error.to_string())?;
    }

    Ok(())
}

fn home(catalog: &Catalog, config: &StoreConfig) -> Result<(), String> {
    let products = catalog.products();

    let sections = [
        ("Latest", latest(products, config.latest_products)),
        ("Featured", featured(products)),
        ("Best sellers", best_sellers(products)),
        ("New arrivals", new_arrivals(products)),
        ("Offers", offers(products)),
    ];

    let mut out = io::stdout().lock();

    for (title, section) in &sections {
        if section.is_empty() {
            continue;
        }

        let table = product_table(section, config)?;
        writeln!(out, "\n {title}\n{table}").map_err(|error| error.to_string())?;
    }

    Ok(())
}

fn stock_label(product: &Product<'_>, config: &StoreConfig) -> String {
    if product.is_low_stock(config.low_stock_threshold) {
        format!("{} left", product.stock)
    } else if product.in_stock() {
        format!("{} in stock", product.stock)
    } else {
        "out of stock".to_string()
    }
}

fn product_table(products: &[&Product<'_>], config: &StoreConfig) -> Result<Table, String> {
    let local = config.local_currency();

    let mut builder = Builder::default();
    builder.push_record(["ID", "Name", "Category", "Price", "Local", "Rating", "Stock"]);

    for product in products {
        let price = product.effective_price().map_err(|error| error.to_string())?;

        builder.push_record([
            product.id.clone(),
            product.name.clone(),
            product.category.clone(),
            price.to_string(),
            local.format(&price).map_err(|error| error.to_string())?,
            product.rating.to_string(),
            stock_label(product, config),
        ]);
    }

    let mut table = builder.build();
    table.with(Style::modern_rounded());

    Ok(table)
}

fn cart(catalog: &Catalog, config: &StoreConfig, args: CartArgs) -> Result<(), String> {
    let storage = args.storage.as_ref().map(LocalStorage::new);

    let mut cart = match &storage {
        Some(storage) => match storage.load::<CartSnapshot>(CART_KEY) {
            Ok(Some(snapshot)) => Cart::restore(&snapshot, catalog),
            Ok(None) => Cart::new(catalog.currency()),
            Err(error) => {
                warn!(%error, "saved cart is unreadable; starting empty");
                Cart::new(catalog.currency())
            }
        },
        None => Cart::new(catalog.currency()),
    };

    for line in &args.lines {
        let Some(product) = catalog.product(&line.product_id) else {
            warn!(product_id = %line.product_id, "no such product");
            continue;
        };

        if cart
            .add(product, line.quantity, line.variant.as_deref())
            .is_none()
        {
            warn!(product_id = %line.product_id, "product was not added to the cart");
        }
    }

    let policy = config.pricing_policy().map_err(|error| error.to_string())?;

    let receipt = Receipt::from_cart(&cart, &policy)
        .map_err(|error| error.to_string())?
        .with_local_currency(config.local_currency());

    receipt
        .write_to(io::stdout().lock())
        .map_err(|error| error.to_string())?;

    let Some(storage) = storage else {
        return Ok(());
    };

    if args.checkout {
        let address = ShippingAddress {
            name: args.name,
            address: args.address,
            city: args.city,
            phone: args.phone,
        };

        let order = Order::place(&cart, address, &policy, Timestamp::now())
            .map_err(|error| error.to_string())?;

        let placed = format!(
            " order {} placed: {} {} ({})",
            order.id,
            order.total,
            order.currency,
            order.status.delivery_note()
        );

        OrderHistory::append(&storage, order).map_err(|error| {
            format!("order not recorded, saved order history left untouched: {error}")
        })?;

        writeln!(io::stdout().lock(), "{placed}").map_err(|error| error.to_string())?;

        cart.clear();
    }

    storage
        .save(CART_KEY, &cart.snapshot())
        .map_err(|error| error.to_string())
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn cart_line_defaults_to_one_unit() -> TestResult {
        let line: CartLineArg = "p1".parse()?;

        assert_eq!(
            line,
            CartLineArg {
                product_id: "p1".to_string(),
                quantity: 1,
                variant: None,
            }
        );

        Ok(())
    }

    #[test]
    fn cart_line_reads_quantity_and_variant() -> TestResult {
        let line: CartLineArg = "p1:3:red".parse()?;

        assert_eq!(line.quantity, 3);
        assert_eq!(line.variant.as_deref(), Some("red"));

        Ok(())
    }

    async fn storefront() -> Catalog {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("fixtures")
            .join("catalog")
            .join("storefront.yml");

        Catalog::load(&FixtureCatalog::new(path), rusty_money::iso::USD).await
    }

    #[tokio::test]
    async fn sections_follow_configured_limits() -> TestResult {
        let catalog = storefront().await;
        let config = StoreConfig {
            related_products: 1,
            latest_products: 2,
            ..StoreConfig::default()
        };

        let newest = latest(catalog.products(), config.latest_products);
        let phone = catalog.product("phone-a54").ok_or("phone missing")?;
        let related = related_products(phone, catalog.products(), config.related_products);

        assert_eq!(product_table(&newest, &config)?.count_rows(), 3);
        assert_eq!(product_table(&related, &config)?.count_rows(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn stock_label_uses_configured_threshold() -> TestResult {
        let catalog = storefront().await;
        let blender = catalog.product("blender").ok_or("blender missing")?;
        let speaker = catalog.product("speaker").ok_or("speaker missing")?;

        let strict = StoreConfig {
            low_stock_threshold: 2,
            ..StoreConfig::default()
        };

        assert_eq!(stock_label(blender, &StoreConfig::default()), "3 left");
        assert_eq!(stock_label(blender, &strict), "3 in stock");
        assert_eq!(stock_label(speaker, &strict), "out of stock");

        Ok(())
    }

    #[test]
    fn cart_line_rejects_bad_input() {
        assert!("".parse::<CartLineArg>().is_err());
        assert!("p1:many".parse::<CartLineArg>().is_err());
    }
}
