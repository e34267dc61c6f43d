//! Main application entry point (native).

#[cfg(feature = "native")]
fn main() {
    env_logger::init();

    if let Err(e) = run() {
        log::error!("{e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(feature = "native")]
fn run() -> Result<(), tabletop_app::AppError> {
    use std::path::PathBuf;
    use std::sync::Arc;

    use tabletop_app::{App, AppConfig, Session, ShortcutRegistry, SystemClipboard};
    use tabletop_core::storage::{FileStorage, create_default_storage};

    let mut config_path: Option<PathBuf> = None;
    let mut session_path: Option<PathBuf> = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => config_path = args.next().map(PathBuf::from),
            "--shortcuts" => {
                ShortcutRegistry::print_all();
                return Ok(());
            }
            _ => session_path = Some(PathBuf::from(arg)),
        }
    }

    let Some(session_path) = session_path else {
        eprintln!("usage: tabletop [--config <config.json>] [--shortcuts] <session.json>");
        return Ok(());
    };

    let config = match config_path {
        Some(path) => AppConfig::load(&path)?,
        None => AppConfig::default(),
    };
    let storage = match &config.storage_dir {
        Some(dir) => Arc::new(FileStorage::new(dir.clone())?),
        None => create_default_storage()?,
    };
    log::info!("Starting {} (storage: {})", config.title, storage.base_path().display());

    let session = Session::load(&session_path)?;
    let mut app = App::new(config, storage, Box::new(SystemClipboard::new()));
    app.run(&session)?;

    let canvas = app.editor().canvas();
    println!(
        "{} events, {} frames, {} images, {} drawings",
        session.events.len(),
        app.renderer().frames(),
        canvas.scene.len(),
        canvas.annotations.len()
    );
    for notice in app.notices() {
        println!("{:?}: {}", notice.level, notice.message);
    }
    Ok(())
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native`");
}
