use clap::Parser;
use taarifa::cli::{
    handle_add, handle_clear, handle_count, handle_delete, handle_export, handle_get,
    handle_import, handle_init, handle_list, handle_serve, handle_update, Cli, Commands,
};
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let default = if verbose { "taarifa=debug" } else { "taarifa=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    let global = &cli.global;
    let result = match cli.command {
        Commands::Init => handle_init(),
        Commands::Add {
            name,
            description,
            json,
        } => handle_add(global, name, description, json),
        Commands::List { json } => handle_list(global, json),
        Commands::Get { key, id, json } => handle_get(global, key, id, json),
        Commands::Update {
            id,
            name,
            description,
            json,
        } => handle_update(global, id, name, description, json),
        Commands::Delete { id, force } => handle_delete(global, id, force),
        Commands::Clear { force } => handle_clear(global, force),
        Commands::Count => handle_count(global),
        Commands::Export { output } => handle_export(global, output),
        Commands::Import { file } => handle_import(global, file),
        Commands::Serve { host, port } => handle_serve(global, host, port),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
