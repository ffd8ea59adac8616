mod address;
mod cart;
mod catalogue;
mod config;
mod database;
mod error;
mod loyalty;
mod model;
mod order;
mod payment;
mod shop;
mod store;
mod warehouse;

use clap::{Args, Parser, Subcommand};
use config::Config;
use log::debug;
use model::*;
use rust_decimal::Decimal;
use shop::{PaymentChoice, Session, Shop};
use std::path::PathBuf;
use std::process;
use std::str::FromStr;

#[derive(Parser)]
#[command(name = "rentflix")]
#[command(about = "Movie rental shop backed by CSV files.")]
struct CommandLine {
    /// Directory holding the CSV files (defaults to $RENTFLIX_DATA_DIR or ./data)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Credentials {
    #[arg(short, long)]
    username: String,
    #[arg(short, long)]
    password: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new account
    Register {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
        #[arg(short, long, default_value = "customer")]
        account: AccountType,
    },
    /// Check credentials
    Login(Credentials),
    ChangeUsername {
        #[command(flatten)]
        credentials: Credentials,
        new: String,
    },
    ChangePassword {
        #[command(flatten)]
        credentials: Credentials,
        new: String,
    },
    ChangeEmail {
        #[command(flatten)]
        credentials: Credentials,
        new: String,
    },
    /// List movies, optionally filtered by title or genre
    Movies { search: Option<String> },
    /// Add a movie to the catalogue (employees and admins)
    AddMovie {
        #[command(flatten)]
        credentials: Credentials,
        #[arg(long)]
        barcode: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        genre: String,
        #[arg(long, default_value = "")]
        release_date: String,
        #[arg(long)]
        quantity: u32,
        #[arg(long)]
        cost: Decimal,
    },
    /// Take a movie out of the catalogue (employees and admins)
    RemoveMovie {
        #[command(flatten)]
        credentials: Credentials,
        #[arg(long)]
        barcode: String,
        #[arg(long)]
        title: String,
    },
    /// List all accounts (admins)
    Users(Credentials),
    /// Show the shipping address, or save a new one when fields are given
    Address {
        #[command(flatten)]
        credentials: Credentials,
        #[arg(long)]
        street: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        province: Option<String>,
        #[arg(long)]
        postal_code: Option<String>,
    },
    /// Order movies, written as BARCODE[:TITLE][=QUANTITY]. A quantity of 0
    /// drops an item named earlier.
    Order {
        #[command(flatten)]
        credentials: Credentials,
        #[arg(long, value_enum)]
        payment: PaymentChoice,
        #[arg(required = true)]
        items: Vec<Item>,
    },
    /// Show the loyalty point balance
    Points(Credentials),
    /// Show past orders
    Orders(Credentials),
}

impl Commands {
    /// Whether the command can change any data file.
    fn mutates(&self) -> bool {
        match self {
            Commands::Login(_)
            | Commands::Movies { .. }
            | Commands::Users(_)
            | Commands::Points(_)
            | Commands::Orders(_) => false,
            Commands::Address {
                street,
                city,
                province,
                postal_code,
                ..
            } => [street, city, province, postal_code]
                .iter()
                .any(|field| field.is_some()),
            _ => true,
        }
    }
}

#[derive(Clone, Debug)]
struct Item {
    barcode: String,
    title: Option<String>,
    quantity: u32,
}

impl FromStr for Item {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (movie, quantity) = match s.rsplit_once('=') {
            Some((movie, quantity)) => (
                movie,
                quantity
                    .parse()
                    .map_err(|err| format!("bad quantity in {:?}: {}", s, err))?,
            ),
            None => (s, 1),
        };
        let (barcode, title) = match movie.split_once(':') {
            Some((barcode, title)) => (barcode, Some(title.to_owned())),
            None => (movie, None),
        };
        if barcode.is_empty() {
            return Err(format!("missing barcode in {:?}", s));
        }
        if title.as_deref() == Some("") {
            return Err(format!("missing title in {:?}", s));
        }
        Ok(Item {
            barcode: barcode.to_owned(),
            title,
            quantity,
        })
    }
}

fn login(shop: &Shop, credentials: &Credentials) -> Result<Session, String> {
    shop.login(&credentials.username, &credentials.password)
        .ok_or_else(|| "Invalid username or password.".to_owned())
}

fn print_movie(movie: &Movie) {
    println!(
        "{:<10} {:<30} {:<15} {:<12} {:>4} {:>8}",
        movie.barcode, movie.title, movie.genre, movie.release_date, movie.quantity, movie.cost
    );
}

fn run(command: Commands, shop: &mut Shop) -> Result<(), String> {
    match command {
        Commands::Register {
            username,
            email,
            password,
            account,
        } => {
            shop.register(User::new(&username, &email, &password, account))
                .map_err(|err| err.to_string())?;
            let (_, user) = shop
                .users
                .get_user_by_username(&username)
                .ok_or("Registration failed.")?;
            println!("Registered {} as {}.", user.username, user.account);
        }
        Commands::Login(credentials) => {
            let session = login(shop, &credentials)?;
            let user = shop.user(&session).map_err(|err| err.to_string())?;
            println!("Welcome {} ({}, {}).", user.username, user.account, user.email);
        }
        Commands::ChangeUsername { credentials, new } => {
            let session = login(shop, &credentials)?;
            shop.change_username(&session, &new)
                .map_err(|err| err.to_string())?;
            println!("Username changed to {}.", new);
        }
        Commands::ChangePassword { credentials, new } => {
            let session = login(shop, &credentials)?;
            shop.change_password(&session, &new)
                .map_err(|err| err.to_string())?;
            println!("Password changed.");
        }
        Commands::ChangeEmail { credentials, new } => {
            let session = login(shop, &credentials)?;
            shop.change_email(&session, &new)
                .map_err(|err| err.to_string())?;
            println!("Email changed to {}.", new);
        }
        Commands::Movies { search } => {
            if shop.catalogue.is_empty() {
                println!("No movies.");
            }
            match search {
                Some(query) => shop.catalogue.search(&query).for_each(print_movie),
                None => shop.catalogue.movies().for_each(print_movie),
            }
        }
        Commands::AddMovie {
            credentials,
            barcode,
            title,
            genre,
            release_date,
            quantity,
            cost,
        } => {
            let session = login(shop, &credentials)?;
            let user = shop.user(&session).map_err(|err| err.to_string())?;
            if !user.account.is_staff() {
                return Err("Only employees can add movies.".to_owned());
            }
            let movie = Movie {
                barcode,
                title,
                genre,
                release_date,
                quantity,
                cost,
            };
            let key = movie.key();
            shop.catalogue
                .add_movie(movie)
                .map_err(|err| err.to_string())?;
            println!("Added {}.", key);
        }
        Commands::RemoveMovie {
            credentials,
            barcode,
            title,
        } => {
            let session = login(shop, &credentials)?;
            let user = shop.user(&session).map_err(|err| err.to_string())?;
            if !user.account.is_staff() {
                return Err("Only employees can remove movies.".to_owned());
            }
            let key = MovieKey::new(&barcode, &title);
            let movie = shop
                .catalogue
                .remove_movie(&key)
                .ok_or_else(|| format!("Movie {} is not in the catalogue.", key))?;
            println!("Removed {}.", movie.key());
        }
        Commands::Users(credentials) => {
            let session = login(shop, &credentials)?;
            let user = shop.user(&session).map_err(|err| err.to_string())?;
            if user.account != AccountType::Admin {
                return Err("Only admins can list accounts.".to_owned());
            }
            for (_, user) in shop.users.users() {
                println!("{:<20} {:<30} {}", user.username, user.email, user.account);
            }
        }
        Commands::Address {
            credentials,
            street,
            city,
            province,
            postal_code,
        } => {
            let session = login(shop, &credentials)?;
            if street.is_none() && city.is_none() && province.is_none() && postal_code.is_none() {
                match shop.address(&session) {
                    Some(address) => println!(
                        "{}, {}, {} {}",
                        address.street, address.city, address.province, address.postal_code
                    ),
                    None => println!("No address on file."),
                }
                return Ok(());
            }
            shop.save_address(
                &session,
                &street.unwrap_or_default(),
                &city.unwrap_or_default(),
                &province.unwrap_or_default(),
                &postal_code.unwrap_or_default(),
            )
            .map_err(|err| err.to_string())?;
            println!("Saved address.");
        }
        Commands::Order {
            credentials,
            payment,
            items,
        } => {
            let mut session = login(shop, &credentials)?;
            for item in items {
                let key = shop
                    .catalogue
                    .resolve(&item.barcode, item.title.as_deref())
                    .map_err(|err| err.to_string())?;
                if item.quantity == 0 {
                    shop.remove_from_cart(&mut session, &key);
                    continue;
                }
                shop.add_to_cart(&mut session, &key, item.quantity)
                    .map_err(|err| err.to_string())?;
            }
            let order = shop
                .checkout(&mut session, payment)
                .map_err(|err| err.to_string())?;
            for line in &order.lines {
                println!(
                    "{:<10} {:<30} {:>8} x{}",
                    line.movie.barcode, line.movie.title, line.movie.cost, line.quantity
                );
            }
            println!(
                "Order {} created! Total {:.2}, shipping from the {} warehouse.",
                order.id, order.total, order.warehouse
            );
            println!("Loyalty points: {}", shop.loyalty_points(&session));
        }
        Commands::Points(credentials) => {
            let session = login(shop, &credentials)?;
            println!("Loyalty points: {}", shop.loyalty_points(&session));
        }
        Commands::Orders(credentials) => {
            let session = login(shop, &credentials)?;
            let user = shop.user(&session).map_err(|err| err.to_string())?;
            let history = shop.orders.orders_for(&user.username);
            if history.is_empty() {
                println!("No orders.");
            }
            for (id, lines) in history {
                let first = &lines[0];
                println!("Order {} ({}, {} warehouse)", id, first.payment, first.warehouse);
                for line in lines {
                    println!(
                        "  {:<10} {:<30} {:>8} x{}",
                        line.barcode, line.title, line.cost, line.quantity
                    );
                }
            }
        }
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("rentflix=info"))
        .init();

    let commands = CommandLine::parse();
    let config = match commands.data_dir {
        Some(dir) => Config::new(dir),
        None => match Config::from_env() {
            Ok(config) => config,
            Err(err) => {
                eprintln!("cannot resolve data directory: {}", err);
                process::exit(1);
            }
        },
    };
    debug!("data directory {}", config.data_dir.display());

    let mut shop = Shop::open(&config);
    let mutates = commands.command.mutates();
    let result = run(commands.command, &mut shop);
    if mutates {
        if let Err(err) = shop.flush() {
            log::error!("failed to write shop data: {}", err);
        }
    }
    if let Err(message) = result {
        eprintln!("{}", message);
        process::exit(1);
    }
}
