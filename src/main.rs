
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use plot_canvas::doc::Element;
use plot_canvas::engine::EditorCore;
use plot_canvas::render;
use plot_canvas::surface::PixmapSurface;
use plotdesk::config::{self, BridgeConfig, ConfigError};
use plotdesk::fonts::{self, FontError};
use plotdesk::service::{BridgeError, HttpLayoutService, LayoutService};
use plotdesk::session::{EditorSession, SessionError};
use plotdesk::wire;
use tiny_skia::{Color, Pixmap, PixmapPaint, Transform};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Bridge(#[from] BridgeError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Font(#[from] FontError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("invalid image size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    #[error("element not found: {0}")]
    UnknownElement(String),
    #[error("failed to write {path}: {message}")]
    Png { path: String, message: String },
}

#[derive(Parser, Debug)]
#[command(name = "plotdesk", about = "Plot layout editor back-office tool")]
struct Cli {
    /// Layout service base URL.
    #[arg(long, env = "PLOTDESK_API_BASE_URL")]
    base_url: Option<String>,

    /// Layout resource keying: `property` or `project`.
    #[arg(long, env = "PLOTDESK_LAYOUT_KEYING")]
    keying: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a layout as normalized JSON, in z-order.
    Show { id: String },
    /// Render a layout to a PNG file.
    Render(RenderArgs),
    /// Load a layout and save it back in canonical form.
    Resave { id: String },
}

#[derive(Args, Debug)]
struct RenderArgs {
    id: String,

    #[arg(long)]
    out: PathBuf,

    #[arg(long, default_value_t = 1200)]
    width: u32,

    #[arg(long, default_value_t = 800)]
    height: u32,

    #[arg(long)]
    zoom: Option<f64>,

    #[arg(long)]
    pan_x: Option<f64>,

    #[arg(long)]
    pan_y: Option<f64>,

    /// Font family for labels; falls back to the system sans-serif.
    #[arg(long)]
    font: Option<String>,

    /// Font file for labels; takes precedence over --font.
    #[arg(long)]
    font_file: Option<PathBuf>,

    /// Draw the selection overlay for this element.
    #[arg(long)]
    select: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = bridge_config(&cli)?;
    let service: Arc<dyn LayoutService> = Arc::new(HttpLayoutService::new(config)?);

    match cli.command {
        Command::Show { id } => {
            let elements = service.load_layout(&id).await?;
            print_layout(&elements)?;
        }
        Command::Render(args) => render_png(service, args).await?,
        Command::Resave { id } => {
            let mut session = EditorSession::open(service, id).await?;
            session.save().await?;
            println!("saved {} elements to {}", session.core().elements().len(), session.layout_id());
        }
    }
    Ok(())
}

fn bridge_config(cli: &Cli) -> Result<BridgeConfig, CliError> {
    let mut config = BridgeConfig::from_env()?;
    if let Some(keying) = cli.keying.as_deref() {
        config.keying = config::parse_keying(Some(keying))?;
    }
    if let Some(base_url) = &cli.base_url {
        config = BridgeConfig::new(base_url.as_str(), config.keying, config.timeouts);
    }
    Ok(config)
}

fn print_layout(elements: &[Element]) -> Result<(), CliError> {
    let records: Vec<serde_json::Value> = elements.iter().map(wire::to_wire).collect();
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

async fn render_png(service: Arc<dyn LayoutService>, args: RenderArgs) -> Result<(), CliError> {
    let invalid = CliError::InvalidSize { width: args.width, height: args.height };
    let Some(surface) = PixmapSurface::new(args.width, args.height) else {
        return Err(invalid);
    };

    let mut core = EditorCore::new();
    core.set_viewport(f64::from(args.width), f64::from(args.height));
    core.load_elements(service.load_layout(&args.id).await?);
    if let Some(zoom) = args.zoom {
        core.set_zoom(zoom);
    }
    if let Some(pan_x) = args.pan_x {
        core.camera.pan_x = pan_x;
    }
    if let Some(pan_y) = args.pan_y {
        core.camera.pan_y = pan_y;
    }
    if let Some(selected) = args.select.as_deref() {
        if core.select(selected).is_empty() {
            return Err(CliError::UnknownElement(selected.to_owned()));
        }
    }

    let fonts = match &args.font_file {
        Some(path) => fonts::font_file(path)?,
        None => fonts::system_fonts(args.font.as_deref()),
    };
    let mut surface = surface.with_fonts(fonts);
    let Ok(()) = render::draw(&mut surface, &core.scene, &core.camera);

    let Some(mut page) = Pixmap::new(args.width, args.height) else {
        return Err(invalid);
    };
    page.fill(Color::WHITE);
    page.draw_pixmap(0, 0, surface.pixmap().as_ref(), &PixmapPaint::default(), Transform::identity(), None);

    let path = args.out.display().to_string();
    page.save_png(&args.out).map_err(|e| CliError::Png { path: path.clone(), message: e.to_string() })?;
    println!("rendered {} elements to {path}", core.elements().len());
    Ok(())
}
