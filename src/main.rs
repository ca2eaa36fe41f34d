use clap::{Parser, Subcommand};
use riffraff_publisher::{
    cli::{
        self,
        commands::{ExportArgs, PublishArgs},
    },
    config::Environment,
    error::Result,
};

#[derive(Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload the build manifest and every artifact file
    Publish {
        #[command(flatten)]
        args: PublishArgs,
    },
    /// Expose temporary role credentials to later workflow steps
    ExportCredentials {
        #[command(flatten)]
        args: ExportArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    riffraff_publisher::init_logging()?;

    // Parse command line arguments
    let cli = Cli::parse();

    // The process environment is captured once; components only ever see
    // this snapshot.
    let environment = Environment::from_process();

    let result = match cli.command {
        Commands::Publish { args } => cli::handlers::handle_publish(args, &environment).await,
        Commands::ExportCredentials { args } => {
            cli::handlers::handle_export_credentials(args, &environment).await
        }
    };

    // Format and display any errors, exactly once
    if let Err(e) = result {
        eprintln!("{}", cli::format_error(&e));
        std::process::exit(1);
    }

    Ok(())
}
