mod cli;
mod commands {
    pub mod files;
    pub mod grant;
    pub mod open;
    pub mod store;
    pub mod sync;
    pub mod transfer;
}

use clap::Parser;
use cli::{Cli, Command, FilesCmd, GrantCmd, StoreCmd, SyncCmd};

fn now_ms() -> i64 {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system time before unix epoch");
    now.as_millis() as i64
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let result = match cli.cmd {
        Command::Store { cmd } => match cmd {
            StoreCmd::Init {
                store_path,
                store_slug,
            } => commands::store::run_init(&store_path, &store_slug, now_ms()),
            StoreCmd::Status { store_path } => commands::store::run_status(&store_path),
        },
        Command::Grant { cmd } => match cmd {
            GrantCmd::Request { store_path, root } => {
                commands::grant::run_request(&store_path, root.as_deref(), now_ms())
            }
            GrantCmd::Status { store_path } => commands::grant::run_status(&store_path),
        },
        Command::Files { cmd } => match cmd {
            FilesCmd::List { store_path } => commands::files::run_list(&store_path),
            FilesCmd::Get {
                store_path,
                filename,
            } => commands::files::run_get(&store_path, &filename),
            FilesCmd::Put {
                store_path,
                filename,
                content_file,
            } => commands::files::run_put(&store_path, &filename, &content_file, now_ms()),
            FilesCmd::Delete {
                store_path,
                filename,
            } => commands::files::run_delete(&store_path, &filename),
        },
        Command::Sync { cmd } => match cmd {
            SyncCmd::Run { store_path, root } => {
                commands::sync::run_sync(&store_path, root.as_deref(), now_ms())
            }
        },
        Command::Open {
            store_path,
            file_paths,
        } => commands::open::run_open(&store_path, &file_paths, now_ms()),
        Command::Import {
            store_path,
            file_paths,
        } => commands::transfer::run_import(&store_path, &file_paths, now_ms()),
        Command::Export {
            store_path,
            filename,
            dest_dir,
        } => commands::transfer::run_export(&store_path, &filename, &dest_dir),
    };

    if let Err(err) = result {
        eprintln!("{}: {}", err.code, err.message);
        std::process::exit(1);
    }
}
