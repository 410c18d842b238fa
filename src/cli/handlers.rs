use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::GlobalArgs;
use crate::config::{Config, CONFIG_FILE, TAARIFA_DIR};
use crate::entity::{Product, ProductUpdate};
use crate::error::{Result, TaarifaError};
use crate::reconcile::Reconciler;
use crate::server::{self, AppState};
use crate::storage::ProductStore;
use crate::validation::{validate_new_product, validate_update};

/// Find the project root by looking for .taarifa/, falling back to the cwd
fn find_project_root() -> PathBuf {
    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let mut current = cwd.as_path();
    loop {
        if current.join(TAARIFA_DIR).exists() {
            return current.to_path_buf();
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return cwd,
        }
    }
}

/// Resolved project root and configuration for one command invocation.
struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Config file, then `TAARIFA_*` environment, then command-line flags.
    fn load(global: &GlobalArgs) -> Result<Self> {
        let root = find_project_root();
        let mut config = Config::load(&root, global.config.as_deref())?;
        config.apply_env(|key| env::var(key).ok())?;

        if let Some(backend) = &global.backend {
            config.storage.backend = backend.parse().map_err(TaarifaError::Config)?;
        }
        if let Some(data) = &global.data {
            config.storage.path = Some(absolute(data));
        }

        debug!(
            root = %root.display(),
            backend = %config.storage.backend,
            hash = %config.hash,
            "project loaded"
        );
        Ok(Self { root, config })
    }

    fn open_store(&self) -> Result<ProductStore> {
        self.config.open_store(&self.root)
    }

    fn reconciler(&self) -> Reconciler {
        self.config.reconciler(&self.root)
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}

/// Ask for confirmation on a TTY; refuse in non-interactive mode.
fn confirm(prompt: &str, what: &str) -> Result<bool> {
    eprint!("{} [y/N] ", prompt);
    io::stderr().flush()?;

    if atty::is(atty::Stream::Stdin) {
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        Ok(input.trim().eq_ignore_ascii_case("y"))
    } else {
        eprintln!();
        Err(TaarifaError::Confirmation(format!(
            "use --force to {} in non-interactive mode",
            what
        )))
    }
}

fn short_hash(hash: &str) -> &str {
    &hash[..hash.len().min(12)]
}

fn print_product(product: &Product) {
    println!("{} ({})", product.name, product.id);
    println!("  Description: {}", product.description);
    println!("  Hash:        {}", product.hash);
    println!("  Created:     {}", product.created_at.to_rfc3339());
}

pub fn handle_init() -> Result<()> {
    let root = env::current_dir()?;
    let dir = root.join(TAARIFA_DIR);

    if dir.exists() {
        return Err(TaarifaError::AlreadyInitialized);
    }

    fs::create_dir_all(&dir)?;
    fs::write(dir.join(CONFIG_FILE), Config::default().to_yaml()?)?;

    println!("Initialized taarifa project in {}", root.display());
    Ok(())
}

pub fn handle_add(global: &GlobalArgs, name: String, description: String, json: bool) -> Result<()> {
    validate_new_product(Some(name.as_str()), Some(description.as_str()))?;

    let project = Project::load(global)?;
    let mut store = project.open_store()?;
    let product = store.add(name, description);

    if json {
        println!("{}", serde_json::to_string_pretty(&product)?);
    } else {
        println!(
            "Added product {} ({}) - {}",
            product.id,
            short_hash(&product.hash),
            product.name
        );
    }

    Ok(())
}

pub fn handle_list(global: &GlobalArgs, json: bool) -> Result<()> {
    let project = Project::load(global)?;
    let store = project.open_store()?;
    let reconciler = project.reconciler();

    let products = runtime()?.block_on(reconciler.load(store.list()));

    if json {
        println!("{}", serde_json::to_string_pretty(&products)?);
    } else if products.is_empty() {
        println!("No products found.");
    } else {
        println!("Found {} products:\n", products.len());
        for (i, p) in products.iter().enumerate() {
            println!("  {}. {} ({})", i + 1, p.name, p.id);
            println!("     Description: {}", p.description);
            println!("     Hash: {}", p.hash);
            println!("     Created: {}", p.created_at.to_rfc3339());
        }
    }

    Ok(())
}

pub fn handle_get(global: &GlobalArgs, key: String, by_id: bool, json: bool) -> Result<()> {
    let project = Project::load(global)?;
    let store = project.open_store()?;
    let reconciler = project.reconciler();

    let rt = runtime()?;
    let found = if by_id {
        rt.block_on(reconciler.find_by_id(store.list(), &key))
    } else {
        rt.block_on(reconciler.find_by_hash(store.list(), &key))
    };
    let product = found.ok_or(TaarifaError::NotFound(key))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&product)?);
    } else {
        print_product(&product);
    }

    Ok(())
}

pub fn handle_update(
    global: &GlobalArgs,
    id: String,
    name: Option<String>,
    description: Option<String>,
    json: bool,
) -> Result<()> {
    let update = ProductUpdate { name, description };
    validate_update(&update)?;

    let project = Project::load(global)?;
    let mut store = project.open_store()?;
    let product = store
        .update(&id, update)
        .ok_or(TaarifaError::NotFound(id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&product)?);
    } else {
        println!("Updated product {} - {}", product.id, product.name);
    }

    Ok(())
}

pub fn handle_delete(global: &GlobalArgs, id: String, force: bool) -> Result<()> {
    let project = Project::load(global)?;
    let mut store = project.open_store()?;

    let product = store
        .find_by_id(&id)
        .ok_or_else(|| TaarifaError::NotFound(id.clone()))?;

    if !force && !confirm(&format!("Delete product {} - {}?", product.id, product.name), "delete")? {
        println!("Cancelled.");
        return Ok(());
    }

    store.delete(&id);
    println!("Deleted product {} - {}", product.id, product.name);
    Ok(())
}

pub fn handle_clear(global: &GlobalArgs, force: bool) -> Result<()> {
    let project = Project::load(global)?;
    let mut store = project.open_store()?;
    let count = store.count();

    if !force && !confirm(&format!("Remove all {} products?", count), "clear")? {
        println!("Cancelled.");
        return Ok(());
    }

    store.clear();
    println!("All products cleared ({} removed)", count);
    Ok(())
}

pub fn handle_count(global: &GlobalArgs) -> Result<()> {
    let project = Project::load(global)?;
    let store = project.open_store()?;
    let reconciler = project.reconciler();

    let products = runtime()?.block_on(reconciler.load(store.list()));
    println!("{}", products.len());
    Ok(())
}

pub fn handle_export(global: &GlobalArgs, output: Option<PathBuf>) -> Result<()> {
    let project = Project::load(global)?;
    let store = project.open_store()?;
    let reconciler = project.reconciler();

    let products = runtime()?.block_on(reconciler.load(store.list()));
    let json = serde_json::to_string_pretty(&products)?;

    match output {
        Some(path) => {
            fs::write(&path, json)?;
            eprintln!("Exported {} products to {}", products.len(), path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}

pub fn handle_import(global: &GlobalArgs, file: PathBuf) -> Result<()> {
    let data = fs::read_to_string(&file)?;

    let project = Project::load(global)?;
    let mut store = project.open_store()?;
    let count = store.import_json(&data)?;

    println!("Imported {} products from {}", count, file.display());
    Ok(())
}

pub fn handle_serve(global: &GlobalArgs, host: Option<String>, port: Option<u16>) -> Result<()> {
    let project = Project::load(global)?;
    let store = project.open_store()?;
    let reconciler = project.reconciler();

    let host = host.unwrap_or_else(|| project.config.server.host.clone());
    let port = port.unwrap_or(project.config.server.port);
    let addr = format!("{}:{}", host, port);

    let state = AppState::new(store, reconciler);
    runtime()?.block_on(server::serve(state, &addr))
}
