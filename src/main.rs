mod cli;
mod db;
mod error;
mod export;
mod filters;
mod fmt;
mod logging;
mod models;
mod settings;
mod storage;
mod store;
mod summary;

use clap::{CommandFactory, Parser};

use cli::{Cli, Commands};

fn main() {
    logging::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Add {
            amount,
            category,
            note,
            date,
        } => cli::add::run(amount, category, &note, date),
        Commands::List { filters } => cli::list::run(filters),
        Commands::Edit {
            id,
            amount,
            category,
            note,
            date,
        } => cli::edit::run(&id, amount, category, note, date),
        Commands::Delete { id } => cli::delete::run(&id),
        Commands::Summary { month } => cli::summary::run(month),
        Commands::Export { filters, output } => cli::export::run(filters, output),
        Commands::Categories => cli::categories::list(),
        Commands::Demo => cli::demo::run(),
        Commands::Status => cli::status::run(),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "tally", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
