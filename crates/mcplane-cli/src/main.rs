//! CLI entry point - the composition root.
//!
//! This is the ONLY place where infrastructure is wired together via
//! bootstrap. Command dispatch routes to handlers which delegate to the
//! manager and context handler.

use clap::Parser;

use mcplane_cli::{
    Cli, CliConfig, CliError, Commands, ContextCommand, ServerCommand, TemplateCommand, bootstrap,
    handlers,
};

#[tokio::main]
async fn main() {
    // Load environment variables before anything reads them
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(exit_code_for(&e));
    }
}

fn exit_code_for(e: &anyhow::Error) -> i32 {
    if let Some(cli_err) = e.downcast_ref::<CliError>() {
        return cli_err.exit_code();
    }
    if let Some(mcp_err) = e.downcast_ref::<mcplane_core::McpError>() {
        return CliError::from(mcp_err).exit_code();
    }
    1
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_filter = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        return Ok(());
    };

    // Template inspection needs no database or subprocess wiring
    if let Commands::Template { command } = &command {
        return match command {
            TemplateCommand::List => handlers::template::list(cli.json),
            TemplateCommand::Steps { kind } => handlers::template::steps(kind, cli.json),
        };
    }

    let ctx = bootstrap(CliConfig::from_env()).await?;
    let user = cli.user;
    let json = cli.json;

    match command {
        Commands::Template { .. } => unreachable!("handled above"),
        Commands::Server { command } => match command {
            ServerCommand::Add { name, kind, inputs } => {
                handlers::server::add(&ctx, user, &name, &kind, &inputs, json).await?;
            }
            ServerCommand::List => handlers::server::list(&ctx, user, json).await?,
            ServerCommand::Remove { name } => handlers::server::remove(&ctx, user, &name).await?,
            ServerCommand::Enable { name } => handlers::server::enable(&ctx, user, &name).await?,
            ServerCommand::Disable { name } => {
                handlers::server::disable(&ctx, user, &name).await?;
            }
            ServerCommand::Status { name } => {
                handlers::server::status(&ctx, user, &name, json).await?;
            }
        },
        Commands::Context { command } => match command {
            ContextCommand::Use { name } => handlers::context::use_server(&ctx, user, &name).await?,
            ContextCommand::Show => handlers::context::show(&ctx, user, json).await?,
            ContextCommand::Clear => handlers::context::clear(&ctx, user).await?,
        },
        Commands::Query {
            prompt,
            dir,
            session,
        } => {
            handlers::query::execute(
                &ctx,
                user,
                prompt.as_deref(),
                dir.as_deref(),
                session.as_deref(),
                json,
            )
            .await?;
        }
        Commands::Stats { days, recent } => {
            handlers::stats::execute(&ctx, user, days, recent, json).await?;
        }
        Commands::Reconcile => handlers::reconcile::execute(&ctx, user, json).await?,
    }

    Ok(())
}
