// Library Client Core - Library management client
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


use anyhow::{bail, Context as _, Result};
use clap::{Parser, Subcommand};
use library_core::api::models::RentalWithBook;
use library_core::config::ENV_API_URL;
use library_core::{LibraryConfig, LibraryContext};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "library-cli")]
#[command(about = "Library client CLI - desktop testing tool", long_about = None)]
struct Cli {
    /// Backend root, overrides LIBRARY_API_URL
    #[arg(long, env = ENV_API_URL)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and remember the session
    Login {
        /// Library card number
        #[arg(short, long)]
        card: String,
        #[arg(short, long)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Create an account
    Register {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// List the catalog
    Books {
        /// Only books whose title or author contains this text
        #[arg(short, long)]
        query: Option<String>,
    },
    /// List books with a copy on the shelf
    Available,
    /// Borrow a book
    Borrow { book_id: String },
    /// Return a rental
    Return { rental_id: String },
    /// List rentals of the signed-in user
    Rentals {
        /// Only rentals started in this month (1-12)
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,
    },
    /// Show the audit log (admin)
    Logs,
    /// List users (admin)
    Users,
    /// Delete the signed-in account
    DeleteAccount,
}

fn initialize_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_rental(rental: &RentalWithBook) {
    println!(
        "{:>6}  {:<9}  {}  {}{}",
        rental.id,
        rental.status.as_str(),
        rental.rental_date,
        rental.display_title(),
        rental
            .return_date
            .as_deref()
            .map(|d| format!(" (zwrócono {})", d))
            .unwrap_or_default()
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    initialize_tracing();
    let cli = Cli::parse();

    let mut config = LibraryConfig::from_env().context("reading configuration")?;
    if let Some(url) = cli.api_url {
        config.api.base_url = url;
    }
    let context = LibraryContext::new(config).await.context("starting client")?;
    let session = context.session();

    match cli.command {
        Commands::Login { card, password } => match session.login(&card, &password).await {
            Some(user) => println!("Zalogowano jako {} ({})", user.name, user.library_card_id),
            None => bail!("{}", session.error().await.unwrap_or_default()),
        },
        Commands::Logout => {
            session.logout().await;
            println!("Wylogowano");
        }
        Commands::Register {
            name,
            email,
            password,
        } => {
            if !session.register(&name, &email, &password).await {
                bail!("{}", session.error().await.unwrap_or_default());
            }
            println!("Konto utworzone, możesz się zalogować");
        }
        Commands::Books { query } => {
            let catalog = context.catalog();
            catalog.fetch_books().await;
            if let Some(error) = catalog.error().await {
                bail!("{}", error);
            }
            let books = match query {
                Some(query) => catalog.search(&query).await,
                None => catalog.books().await,
            };
            for book in books {
                println!(
                    "{:>6}  {} - {}  [{} dostępnych]",
                    book.id,
                    book.title,
                    book.author,
                    book.copies_on_shelf()
                );
            }
        }
        Commands::Available => {
            let catalog = context.catalog();
            catalog.fetch_books().await;
            if let Some(error) = catalog.error().await {
                bail!("{}", error);
            }
            for book in catalog.available_books().await {
                println!("{:>6}  {} - {}", book.id, book.title, book.author);
            }
        }
        Commands::Borrow { book_id } => {
            let rentals = context.rentals();
            if !rentals.borrow_book(&book_id).await {
                bail!("{}", rentals.error().await.unwrap_or_default());
            }
            println!("Wypożyczono książkę {}", book_id);
        }
        Commands::Return { rental_id } => {
            let rentals = context.rentals();
            // the local state check needs the rental loaded
            rentals.fetch_rentals().await;
            if !rentals.return_book(&rental_id).await {
                bail!("{}", rentals.error().await.unwrap_or_default());
            }
            println!("Zwrócono wypożyczenie {}", rental_id);
        }
        Commands::Rentals { month } => {
            let rentals = context.rentals();
            rentals.fetch_rentals().await;
            let state = rentals.snapshot().await;
            if let Some(error) = &state.error {
                bail!("{}", error);
            }
            let listed = match month {
                Some(month) => state.in_month(month),
                None => state.rentals.clone(),
            };
            for rental in &listed {
                print_rental(rental);
            }
            let stats = state.stats();
            println!(
                "Zwrócone: {}  Po terminie: {}  Obecne: {}",
                stats.returned, stats.overdue, stats.current
            );
        }
        Commands::Logs => {
            let logs = context.logs();
            logs.fetch_logs().await;
            if let Some(error) = logs.error().await {
                bail!("{}", error);
            }
            for entry in logs.logs().await {
                println!("{}  {}  {}", entry.timestamp, entry.user, entry.action);
            }
        }
        Commands::Users => {
            let users = context.users();
            users.fetch_users().await;
            if let Some(error) = users.error().await {
                bail!("{}", error);
            }
            for user in users.users().await {
                println!("{:>6}  {:<24}  {}", user.id, user.name, user.email);
            }
        }
        Commands::DeleteAccount => {
            let Some(user) = session.user().await else {
                bail!("Nie jesteś zalogowany");
            };

            let rentals = context.rentals();
            rentals.fetch_rentals().await;
            let state = rentals.snapshot().await;
            match state.has_open_rentals(&user.id) {
                Some(false) => {}
                Some(true) => bail!("Nie można usunąć konta, dopóki masz niezwrócone książki"),
                None => bail!("{}", state.error.as_deref().unwrap_or_default()),
            }

            if let Err(e) = session.delete_user(&user.id).await {
                bail!("{} ({})", e.user_message(), e);
            }
            println!("Konto usunięte");
        }
    }

    Ok(())
}
