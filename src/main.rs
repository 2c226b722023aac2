use color_eyre::eyre::{
    Result,
    WrapErr,
    eyre,
};
use piedra_papel_tijera::game::Move;
use std::path::{
    Path,
    PathBuf,
};
use tracing_appender::rolling::{
    RollingFileAppender,
    Rotation,
};
use tracing_subscriber::EnvFilter;

mod client;
mod ui;

const LOG_FILE: &str = "piedra-papel-tijera.log";

fn print_usage_and_exit() -> ! {
    println!(
        "Usage: piedra-papel-tijera [--data-dir <path>] [--ephemeral] [--fixed-opponent <move>]\n\
         \n\
         Flags:\n\
           --data-dir <path>        Where statistics, theme and logs are kept (default ~/.piedra-papel-tijera)\n\
           --ephemeral              Keep everything in memory for this session only\n\
           --fixed-opponent <move>  Make the computer always play rock, paper or scissors\n\
         \n\
         Keys: r rock | p paper | s scissors | x reset | t theme | q quit"
    );
    std::process::exit(0);
}

fn default_data_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").wrap_err("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".piedra-papel-tijera"))
}

fn resolve_data_dir(dir: Option<&str>) -> Result<PathBuf> {
    match dir {
        Some(raw) => {
            let expanded = shellexpand::tilde(raw);
            Ok(PathBuf::from(expanded.into_owned()))
        }
        None => default_data_dir(),
    }
}

fn parse_cli_args(args: impl IntoIterator<Item = String>) -> Result<client::AppConfig> {
    let mut args = args.into_iter();
    let mut data_dir: Option<String> = None;
    let mut ephemeral = false;
    let mut fixed: Option<Move> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--data-dir" => {
                let dir = args
                    .next()
                    .ok_or_else(|| eyre!("--data-dir requires a path argument"))?;
                if data_dir.is_some() {
                    return Err(eyre!("--data-dir may only be specified once"));
                }
                data_dir = Some(dir);
            }
            "--ephemeral" => {
                if ephemeral {
                    return Err(eyre!("--ephemeral may only be specified once"));
                }
                ephemeral = true;
            }
            "--fixed-opponent" => {
                let raw = args
                    .next()
                    .ok_or_else(|| eyre!("--fixed-opponent requires a move"))?;
                if fixed.is_some() {
                    return Err(eyre!("--fixed-opponent may only be specified once"));
                }
                fixed = Some(raw.parse()?);
            }
            "--help" | "-h" => print_usage_and_exit(),
            other => return Err(eyre!("Unknown argument: {other}")),
        }
    }

    if ephemeral && data_dir.is_some() {
        return Err(eyre!("--ephemeral and --data-dir cannot be combined"));
    }
    let storage = if ephemeral {
        client::StorageConfig::Ephemeral
    } else {
        client::StorageConfig::Directory(resolve_data_dir(data_dir.as_deref())?)
    };
    let opponent = match fixed {
        Some(m) => client::OpponentMode::Fixed(m),
        None => client::OpponentMode::Random,
    };
    Ok(client::AppConfig { storage, opponent })
}

/// Log to a file in the data directory; the terminal belongs to the UI.
fn init_tracing(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .wrap_err_with(|| format!("Failed to create {}", dir.display()))?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(LOG_FILE)
        .build(dir)
        .wrap_err("Failed to open log file")?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(appender)
        .with_ansi(false)
        .try_init()
        .map_err(|e| eyre!(e))?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let app_config = parse_cli_args(std::env::args().skip(1))?;
    if let client::StorageConfig::Directory(dir) = &app_config.storage {
        if let Err(err) = init_tracing(dir) {
            eprintln!("logging disabled: {err:#}");
        }
    }
    tracing::info!("starting piedra-papel-tijera");
    client::run_app(app_config).await
}
