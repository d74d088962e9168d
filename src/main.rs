//! framemark entry point.
//!
//! Prints the annotation progress of the image tree under a working directory
//! (the first argument, or the current directory).

use std::path::PathBuf;

use framemark::{AppConfig, EntryKind, Explorer, FsDirectorySource, MagicSniffer};

fn main() {
    let config = AppConfig::load_from_default_path().unwrap_or_default();

    env_logger::Builder::new()
        .filter_level(config.log_level.to_level_filter())
        .init();

    let work_dir = match std::env::args_os().nth(1) {
        Some(dir) => PathBuf::from(dir),
        None => match std::env::current_dir() {
            Ok(dir) => dir,
            Err(e) => {
                eprintln!("Cannot determine working directory: {}", e);
                std::process::exit(1);
            }
        },
    };

    if let Err(e) = run(&config, work_dir) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(config: &AppConfig, work_dir: PathBuf) -> Result<(), framemark::ExplorerError> {
    let roots = config.resolve_roots(&work_dir);
    log::info!(
        "Images in {:?}, saves in {:?}",
        roots.image_root,
        roots.save_root
    );

    // Tall enough to hold every entry: the listing is printed, not scrolled
    let explorer = Explorer::new(
        roots.image_root,
        roots.save_root,
        Box::new(FsDirectorySource),
        Box::new(MagicSniffer),
        f32::MAX,
        config.item_height,
    )?;

    for entry in explorer.list().window() {
        let marker = match entry.kind {
            EntryKind::Directory => "/",
            _ => "",
        };
        let counts = entry.completion.to_string();
        println!(
            "{:>5.1}%  {:>9}  {}{}",
            entry.completion.percent() * 100.0,
            counts,
            entry.display_name,
            marker
        );
    }
    println!("total {}", explorer.completion());

    for failure in explorer.failures() {
        log::warn!("{}", failure);
    }
    Ok(())
}
