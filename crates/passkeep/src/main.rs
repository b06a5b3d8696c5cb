//! passkeep - Local credential manager
//!
//! Commands:
//! - add <NAME> [SECRET]: Add an entry, or update the one with that name
//! - edit <NAME> [SECRET]: Replace an entry's password
//! - delete <NAME> | --all: Remove entries
//! - search [QUERY]: Substring search over every field
//! - list: Show entries (optionally sorted or filtered by category)
//! - sort <name|category>: Reorder the file
//! - category add|delete|list: Manage categories
//! - encrypt / decrypt: XOR-obfuscate every stored password
//! - generate: Print a random password

mod strength;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use passkeep::generator::{self, Charset};
use passkeep::store::write_record;
use passkeep::{AddOutcome, Entry, SortKey, Store};
use passkeep_core::{Config, GeneratorConfig, Paths};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use strength::Strength;

#[derive(Parser)]
#[command(name = "passkeep")]
#[command(about = "Local credential manager - named passwords in a flat file")]
#[command(version)]
#[command(after_help = r#"STORAGE:
    Entries live in one text file, rewritten after every change.
    Default: ~/.local/share/passkeep/passwords.txt
    Override with --file, $PASSKEEP_STORE or store_path in
    ~/.config/passkeep/config.toml

SECURITY:
    encrypt/decrypt apply a single-byte XOR to the stored passwords.
    It hides them from a casual glance and nothing more."#)]
struct Cli {
    /// Password file to use
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a random password
    Generate {
        #[command(flatten)]
        charset: CharsetArgs,
    },

    #[command(flatten)]
    Store(StoreCommands),
}

/// Commands that open the password file
#[derive(Subcommand)]
enum StoreCommands {
    /// Add an entry (an existing entry with the same name is updated)
    Add {
        /// Entry name
        name: String,
        /// Password (omit for a hidden prompt, or use --generate)
        secret: Option<String>,
        #[arg(short, long, default_value = "")]
        category: String,
        /// Website the password belongs to
        #[arg(long, default_value = "")]
        site: String,
        /// Login / username
        #[arg(long, default_value = "")]
        login: String,
        /// Generate the password instead of supplying one
        #[arg(short, long, conflicts_with = "secret")]
        generate: bool,
        #[command(flatten)]
        charset: CharsetArgs,
    },

    /// Replace the password of an entry
    Edit {
        name: String,
        /// New password (omit for a hidden prompt)
        secret: Option<String>,
    },

    /// Delete an entry, or every entry with --all
    Delete {
        #[arg(required_unless_present = "all")]
        name: Option<String>,
        #[arg(long, conflicts_with = "name")]
        all: bool,
    },

    /// Find entries containing QUERY in any field (case-sensitive)
    Search {
        #[arg(default_value = "")]
        query: String,
        #[arg(long)]
        json: bool,
    },

    /// List entries
    List {
        /// Sort the output by "name" or "category"
        #[arg(long)]
        sort: Option<String>,
        /// Only entries in this category
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        json: bool,
    },

    /// Sort the stored entries by "name" or "category"
    Sort { criterion: String },

    /// Manage categories
    Category {
        #[command(subcommand)]
        action: CategoryCommands,
    },

    /// XOR-obfuscate every stored password
    Encrypt,

    /// Reverse `encrypt`
    Decrypt,
}

#[derive(Subcommand)]
enum CategoryCommands {
    /// Register a category
    Add { name: String },

    /// Delete a category AND EVERY ENTRY IN IT, passwords included
    Delete { name: String },

    /// List categories in use
    List,
}

#[derive(clap::Args)]
struct CharsetArgs {
    /// Password length (defaults to the configured length)
    #[arg(short, long)]
    length: Option<usize>,
    /// Leave out uppercase letters
    #[arg(long)]
    no_upper: bool,
    /// Leave out lowercase letters
    #[arg(long)]
    no_lower: bool,
    /// Leave out special characters
    #[arg(long)]
    no_special: bool,
}

impl CharsetArgs {
    fn resolve(&self, defaults: &GeneratorConfig) -> (usize, Charset) {
        let length = self.length.unwrap_or(defaults.length);
        let charset = Charset::new(
            defaults.upper && !self.no_upper,
            defaults.lower && !self.no_lower,
            defaults.special && !self.no_special,
        );
        (length, charset)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    let command = match cli.command {
        Some(Commands::Generate { charset }) => return cmd_generate(&config, &charset),
        Some(Commands::Store(command)) => Some(command),
        None => None,
    };

    let path = cli
        .file
        .clone()
        .unwrap_or_else(|| config.store_file(&Paths::new()));
    let mut store = Store::load_with_key(&path, config.transform_key);

    let result = run(&mut store, &config, command);

    // Final write happens regardless of how the command went
    let closed = store.close();
    result?;
    closed
}

fn run(store: &mut Store, config: &Config, command: Option<StoreCommands>) -> Result<()> {
    match command {
        Some(StoreCommands::Add {
            name,
            secret,
            category,
            site,
            login,
            generate,
            charset,
        }) => {
            let secret = if generate {
                generate_secret(config, &charset)?
            } else {
                secret_or_prompt(secret, "Enter password: ")?
            };
            cmd_add(store, Entry::new(name, secret, category, site, login))
        }
        Some(StoreCommands::Edit { name, secret }) => {
            let secret = secret_or_prompt(secret, "Enter new password: ")?;
            cmd_edit(store, &name, &secret)
        }
        Some(StoreCommands::Delete { name, all }) => cmd_delete(store, name.as_deref(), all),
        Some(StoreCommands::Search { query, json }) => cmd_search(store, &query, json),
        Some(StoreCommands::List {
            sort,
            category,
            json,
        }) => cmd_list(store, sort.as_deref(), category.as_deref(), json),
        Some(StoreCommands::Sort { criterion }) => cmd_sort(store, &criterion),
        Some(StoreCommands::Category { action }) => match action {
            CategoryCommands::Add { name } => cmd_category_add(store, &name),
            CategoryCommands::Delete { name } => cmd_category_delete(store, &name),
            CategoryCommands::List => cmd_category_list(store),
        },
        Some(StoreCommands::Encrypt) => {
            store.encrypt_all()?;
            println!("success: All passwords encrypted and saved");
            Ok(())
        }
        Some(StoreCommands::Decrypt) => {
            store.decrypt_all()?;
            println!("success: All passwords decrypted and saved");
            Ok(())
        }
        None => cmd_list(store, None, None, false),
    }
}

/// Use the given secret or prompt for a hidden one
fn secret_or_prompt(secret: Option<String>, prompt: &str) -> Result<String> {
    let secret = match secret {
        Some(s) => s,
        None => rpassword::prompt_password(prompt).context("Failed to read password")?,
    };

    if secret.is_empty() {
        bail!("Empty password not allowed");
    }
    Ok(secret)
}

fn generate_secret(config: &Config, args: &CharsetArgs) -> Result<String> {
    let (length, charset) = args.resolve(&config.generator);

    if charset.class_count() > length {
        bail!(
            "Length {} is shorter than the {} selected character classes",
            length,
            charset.class_count()
        );
    }

    let password = generator::generate(length, charset.upper, charset.lower, charset.special)?;
    println!("Generated password: {}", password);
    Ok(password)
}

fn cmd_add(store: &mut Store, entry: Entry) -> Result<()> {
    if entry.name.is_empty() {
        bail!("Name cannot be empty");
    }

    let strength = strength::check(&entry.secret);
    let name = entry.name.clone();

    match store.add(entry)? {
        AddOutcome::Added => println!("success: Entry added: {}", name),
        AddOutcome::Updated => println!("success: Entry updated: {}", name),
    }

    println!("Password strength: {}", strength);
    if strength == Strength::Weak {
        println!("warning: Consider a password of at least 6 characters");
    }

    Ok(())
}

fn cmd_edit(store: &mut Store, name: &str, secret: &str) -> Result<()> {
    store.edit(name, secret)?;
    println!("success: Password updated: {}", name);
    Ok(())
}

fn cmd_delete(store: &mut Store, name: Option<&str>, all: bool) -> Result<()> {
    if all {
        let count = store.delete_all()?;
        println!("success: Deleted all {} entries", count);
        return Ok(());
    }

    let Some(name) = name else {
        bail!("Entry name required (or --all)");
    };

    store.delete(name)?;
    println!("success: Entry deleted: {}", name);
    Ok(())
}

fn cmd_search(store: &Store, query: &str, json: bool) -> Result<()> {
    let results = store.search(query);

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No entries match: {}", query);
        return Ok(());
    }

    println!("Found {} matching entries", results.len());
    println!();
    print_entries(&results)
}

fn cmd_list(
    store: &Store,
    sort: Option<&str>,
    category: Option<&str>,
    json: bool,
) -> Result<()> {
    let mut entries: Vec<&Entry> = match category {
        Some(category) => store.filter_category(category),
        None => store.entries().iter().collect(),
    };

    // Only the displayed order changes; the stored sequence stays as it is
    if let Some(criterion) = sort {
        let key: SortKey = criterion.parse()?;
        entries.sort_by(|a, b| key.compare(a, b));
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        match category {
            Some(category) => println!("No entries in category: {}", category),
            None => println!("No entries stored. Add one with: passkeep add <name>"),
        }
        return Ok(());
    }

    print_entries(&entries)
}

fn cmd_sort(store: &mut Store, criterion: &str) -> Result<()> {
    store.sort(criterion)?;
    println!("success: Sorted by {}", criterion);
    println!();
    let entries: Vec<&Entry> = store.entries().iter().collect();
    print_entries(&entries)
}

fn cmd_category_add(store: &mut Store, name: &str) -> Result<()> {
    store.add_category(name)?;
    println!("success: Category added: {}", name);
    Ok(())
}

fn cmd_category_delete(store: &mut Store, name: &str) -> Result<()> {
    // An empty name would match every uncategorized entry
    if name.is_empty() {
        bail!("Category name cannot be empty");
    }

    let removed = store.delete_category(name)?;
    println!("success: Category deleted: {} ({} entries removed)", name, removed);
    Ok(())
}

fn cmd_category_list(store: &Store) -> Result<()> {
    let categories = store.categories();

    if categories.is_empty() {
        println!("No categories. Add one with: passkeep category add <name>");
        return Ok(());
    }

    for category in categories {
        println!("  {}", category);
    }
    Ok(())
}

fn cmd_generate(config: &Config, args: &CharsetArgs) -> Result<()> {
    let (length, charset) = args.resolve(&config.generator);
    let password = generator::generate(length, charset.upper, charset.lower, charset.special)?;
    println!("{}", password);
    Ok(())
}

/// Print entries in the file's record layout
fn print_entries(entries: &[&Entry]) -> Result<()> {
    let mut out = io::stdout().lock();
    for entry in entries {
        write_record(&mut out, entry)?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn store_command(cli: Cli) -> StoreCommands {
        match cli.command {
            Some(Commands::Store(command)) => command,
            _ => panic!("Expected a store command"),
        }
    }

    fn no_charset() -> CharsetArgs {
        CharsetArgs {
            length: None,
            no_upper: false,
            no_lower: false,
            no_special: false,
        }
    }

    #[test]
    fn test_cli_parse() {
        let cli = Cli::try_parse_from(["passkeep", "add", "github", "hunter2", "-c", "dev"]).unwrap();
        if let StoreCommands::Add {
            name,
            secret,
            category,
            site,
            generate,
            ..
        } = store_command(cli)
        {
            assert_eq!(name, "github");
            assert_eq!(secret, Some("hunter2".to_string()));
            assert_eq!(category, "dev");
            assert_eq!(site, "");
            assert!(!generate);
        } else {
            panic!("Expected Add command");
        }

        let cli = Cli::try_parse_from(["passkeep", "--file", "/tmp/p.txt", "list"]).unwrap();
        assert_eq!(cli.file, Some(PathBuf::from("/tmp/p.txt")));
        assert!(matches!(store_command(cli), StoreCommands::List { .. }));

        let cli = Cli::try_parse_from(["passkeep"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_generate_is_not_a_store_command() {
        let cli = Cli::try_parse_from(["passkeep", "generate", "-l", "8", "--no-upper"]).unwrap();
        if let Some(Commands::Generate { charset }) = cli.command {
            let (length, charset) = charset.resolve(&GeneratorConfig::default());
            assert_eq!(length, 8);
            assert_eq!(charset, Charset::new(false, true, true));
        } else {
            panic!("Expected Generate command");
        }
    }

    #[test]
    fn test_cli_generate_conflicts_with_secret() {
        assert!(Cli::try_parse_from(["passkeep", "add", "a", "pw", "--generate"]).is_err());

        let cli = Cli::try_parse_from(["passkeep", "add", "a", "--generate", "-l", "20", "--no-special"])
            .unwrap();
        if let StoreCommands::Add {
            generate, charset, ..
        } = store_command(cli)
        {
            assert!(generate);
            let (length, charset) = charset.resolve(&GeneratorConfig::default());
            assert_eq!(length, 20);
            assert_eq!(charset, Charset::new(true, true, false));
        } else {
            panic!("Expected Add command");
        }
    }

    #[test]
    fn test_cli_delete() {
        assert!(Cli::try_parse_from(["passkeep", "delete"]).is_err());
        assert!(Cli::try_parse_from(["passkeep", "delete", "a", "--all"]).is_err());

        let cli = Cli::try_parse_from(["passkeep", "delete", "--all"]).unwrap();
        assert!(matches!(
            store_command(cli),
            StoreCommands::Delete { name: None, all: true }
        ));
    }

    #[test]
    fn test_cli_category() {
        let cli = Cli::try_parse_from(["passkeep", "category", "delete", "work"]).unwrap();
        if let StoreCommands::Category {
            action: CategoryCommands::Delete { name },
        } = store_command(cli)
        {
            assert_eq!(name, "work");
        } else {
            panic!("Expected category delete");
        }
    }

    #[test]
    fn test_search_defaults_to_everything() {
        let cli = Cli::try_parse_from(["passkeep", "search"]).unwrap();
        if let StoreCommands::Search { query, json } = store_command(cli) {
            assert_eq!(query, "");
            assert!(!json);
        } else {
            panic!("Expected Search command");
        }
    }

    #[test]
    fn test_generate_rejects_more_classes_than_length() {
        let config = Config::default();
        let args = CharsetArgs {
            length: Some(2),
            ..no_charset()
        };
        assert!(generate_secret(&config, &args).is_err());

        let args = CharsetArgs {
            length: Some(3),
            ..args
        };
        assert_eq!(generate_secret(&config, &args).unwrap().len(), 3);
    }

    #[test]
    fn test_run_against_temp_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("passwords.txt");
        let config = Config::default();

        let mut store = Store::load(&path);
        run(
            &mut store,
            &config,
            Some(StoreCommands::Add {
                name: "git".to_string(),
                secret: Some("hunter2".to_string()),
                category: "dev".to_string(),
                site: String::new(),
                login: String::new(),
                generate: false,
                charset: no_charset(),
            }),
        )
        .unwrap();
        run(&mut store, &config, Some(StoreCommands::Encrypt)).unwrap();
        store.close().unwrap();

        let reloaded = Store::load(&path);
        assert_eq!(reloaded.entries()[0].secret, passkeep::transform("hunter2", 10));
    }

    #[test]
    fn test_list_sort_leaves_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("passwords.txt");
        let config = Config::default();

        let mut store = Store::load(&path);
        store.add(Entry::new("b", "1", "", "", "")).unwrap();
        store.add(Entry::new("a", "2", "", "", "")).unwrap();

        run(
            &mut store,
            &config,
            Some(StoreCommands::List {
                sort: Some("name".to_string()),
                category: None,
                json: false,
            }),
        )
        .unwrap();
        store.close().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let names: Vec<&str> = content
            .lines()
            .filter_map(|line| line.strip_prefix("Name: "))
            .collect();
        assert_eq!(names, ["b", "a"]);
    }

    #[test]
    fn test_list_rejects_unknown_sort() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::load(dir.path().join("passwords.txt"));
        assert!(cmd_list(&store, Some("site"), None, false).is_err());
    }

    #[test]
    fn test_category_delete_rejects_empty_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("passwords.txt");
        let config = Config::default();

        let mut store = Store::load(&path);
        store.add(Entry::new("plain", "1", "", "", "")).unwrap();

        let result = run(
            &mut store,
            &config,
            Some(StoreCommands::Category {
                action: CategoryCommands::Delete {
                    name: String::new(),
                },
            }),
        );
        assert!(result.is_err());
        assert_eq!(store.len(), 1);
    }
}
