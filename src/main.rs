use clap::Parser;
use std::process;

use plano::cli;
use plano::cli::commands::{Cli, Commands};

fn main() {
    let cli_args = Cli::parse();
    let json_output = cli_args.json;

    let exit_code = match cli_args.command {
        Commands::Init {
            admin_name,
            admin_email,
        } => cli::init::run(admin_name.as_deref(), admin_email.as_deref(), json_output),
        Commands::Auth(cmd) => cli::auth::run(cmd, json_output),
        Commands::Task(cmd) => cli::task::run(cmd, json_output),
        Commands::Approvals(cmd) => cli::approvals::run(cmd, json_output),
        Commands::Setor(cmd) => cli::setor::run(cmd, json_output),
        Commands::User(cmd) => cli::user::run(cmd, json_output),
        Commands::Export(cmd) => cli::export::run(cmd, json_output),
        Commands::Status => cli::status::run(json_output),
    };

    process::exit(exit_code);
}
