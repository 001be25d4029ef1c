use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bv_cli")]
#[command(about = "BudgetVault CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    Store {
        #[command(subcommand)]
        cmd: StoreCmd,
    },
    Grant {
        #[command(subcommand)]
        cmd: GrantCmd,
    },
    Files {
        #[command(subcommand)]
        cmd: FilesCmd,
    },
    Sync {
        #[command(subcommand)]
        cmd: SyncCmd,
    },
    /// Ingest host-delivered "open with" file references.
    Open {
        store_path: String,
        file_paths: Vec<String>,
    },
    /// Manual import: read local files into the cache as cache-only records.
    Import {
        store_path: String,
        file_paths: Vec<String>,
    },
    /// Manual export: emit a cached record as a file download.
    Export {
        store_path: String,
        filename: String,
        dest_dir: String,
    },
}

#[derive(Subcommand)]
pub enum StoreCmd {
    Init {
        store_path: String,
        store_slug: String,
    },
    Status {
        store_path: String,
    },
}

#[derive(Subcommand)]
pub enum GrantCmd {
    /// Request access to a storage root. Omitting --root simulates the user
    /// dismissing the prompt.
    Request {
        store_path: String,
        #[arg(long)]
        root: Option<String>,
    },
    Status {
        store_path: String,
    },
}

#[derive(Subcommand)]
pub enum FilesCmd {
    List {
        store_path: String,
    },
    Get {
        store_path: String,
        filename: String,
    },
    Put {
        store_path: String,
        filename: String,
        content_file: String,
    },
    Delete {
        store_path: String,
        filename: String,
    },
}

#[derive(Subcommand)]
pub enum SyncCmd {
    Run {
        store_path: String,
        #[arg(long)]
        root: Option<String>,
    },
}
