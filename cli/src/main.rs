use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use delight_cli::CliContext;
use delight_cli::args::{parse_point, parse_rect, parse_viewport};
use delight_cli::commands::{self, RenderArgs, SetArgs};
use delight_core::geometry::Rect;

#[derive(Parser)]
#[command(version, about = "Darkening overlay with lit cutouts")]
struct Cli {
    /// Preferences file (defaults to the platform config directory)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a host's preferences as JSON
    Get { host: String },
    /// Change a host's preferences
    Set {
        host: String,
        #[arg(long)]
        enabled: Option<bool>,
        /// CSS color, e.g. "rgba(0, 0, 0, 0.8)" or "#000000cc"
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        width: Option<String>,
        #[arg(long)]
        height: Option<String>,
    },
    /// Flip a host's enabled switch
    Toggle { host: String },
    /// List hosts with stored preferences
    Hosts,
    /// Render one frame for a host into a PNG
    Render {
        host: String,
        /// Viewport size, WxH
        #[arg(long, value_parser = parse_viewport)]
        viewport: (u32, u32),
        /// Pointer position X,Y; repeat to replay several moves
        #[arg(long = "pointer", value_parser = parse_point)]
        pointers: Vec<(f32, f32)>,
        /// Focused element box X,Y,W,H
        #[arg(long, value_parser = parse_rect)]
        focus: Option<Rect>,
        /// Blur the focused element after focusing it
        #[arg(long)]
        blur: bool,
        #[arg(long)]
        out: PathBuf,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let _log_guard = delight_cli::logging::init();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    if let Commands::Hosts = cli.command {
        return commands::hosts(cli.store.as_deref());
    }

    let ctx = CliContext::open(cli.store.as_deref())?;
    tracing::debug!(store = ?ctx.store_path(), "CLI context ready");

    let result = match cli.command {
        Commands::Get { host } => commands::get(&host, &ctx).await,
        Commands::Set {
            host,
            enabled,
            color,
            width,
            height,
        } => {
            let args = SetArgs {
                enabled,
                color,
                width,
                height,
            };
            commands::set(&host, args, &ctx).await
        }
        Commands::Toggle { host } => commands::toggle(&host, &ctx).await,
        Commands::Render {
            host,
            viewport,
            pointers,
            focus,
            blur,
            out,
        } => {
            let args = RenderArgs {
                viewport,
                pointers,
                focus,
                blur,
            };
            commands::render(&host, &args, &out, &ctx).await
        }
        Commands::Hosts => Ok(()),
    };

    // Let queued writes land before exiting
    ctx.shutdown().await?;
    result
}
