use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use sha2::Digest as _;

use qrcompose::{
    BaseFit, CanvasSpec, ComposeRequest, LayerOrder, OutputFormat, Placement, PlacementMode,
};

#[derive(Parser, Debug)]
#[command(name = "qrcompose", version)]
struct Cli {
    /// Log at DEBUG instead of INFO.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compose an overlay onto a base image and write the encoded result.
    Compose(ComposeArgs),
    /// Print the base plan and overlay geometry as JSON without rendering.
    Geometry(GeometryArgs),
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    #[command(flatten)]
    inputs: InputArgs,

    /// Output image path.
    #[arg(long)]
    out: PathBuf,

    /// Print the SHA-256 of the encoded output to stdout.
    #[arg(long)]
    print_digest: bool,

    #[command(flatten)]
    request: RequestArgs,
}

#[derive(Parser, Debug)]
struct GeometryArgs {
    #[command(flatten)]
    inputs: InputArgs,

    #[command(flatten)]
    request: RequestArgs,
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Base layer image (raster or SVG).
    #[arg(long)]
    base: PathBuf,

    /// Overlay image (raster or SVG).
    #[arg(long)]
    overlay: PathBuf,
}

/// Request fields. Flags override values loaded from `--request`.
#[derive(Args, Debug)]
struct RequestArgs {
    /// Compose request JSON.
    #[arg(long)]
    request: Option<PathBuf>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    /// Draw the base in a centered square of this size instead of scaling it to fill.
    #[arg(long)]
    qr_size: Option<u32>,

    /// How the base fills the `--qr-size` square.
    #[arg(long, value_enum)]
    fit: Option<FitChoice>,

    #[arg(long, allow_hyphen_values = true)]
    rel_x: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    rel_y: Option<f64>,

    #[arg(long)]
    rel_w: Option<f64>,

    /// Clockwise rotation in degrees.
    #[arg(long, allow_hyphen_values = true)]
    rotation: Option<f64>,

    #[arg(long)]
    anchor_x: Option<f64>,

    #[arg(long)]
    anchor_y: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    opacity: Option<f64>,

    /// Draw the base layer over the overlay.
    #[arg(long)]
    base_on_top: bool,

    #[arg(long, value_enum)]
    format: Option<FormatChoice>,

    /// Background colour as `RRGGBB` or `RRGGBBAA` hex, optionally prefixed with `#`.
    #[arg(long, value_parser = parse_hex_rgba)]
    background: Option<[u8; 4]>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FitChoice {
    Stretch,
    Contain,
}

impl From<FitChoice> for BaseFit {
    fn from(v: FitChoice) -> Self {
        match v {
            FitChoice::Stretch => BaseFit::Stretch,
            FitChoice::Contain => BaseFit::Contain,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Png,
    Bmp,
    Tiff,
}

impl From<FormatChoice> for OutputFormat {
    fn from(v: FormatChoice) -> Self {
        match v {
            FormatChoice::Png => OutputFormat::Png,
            FormatChoice::Bmp => OutputFormat::Bmp,
            FormatChoice::Tiff => OutputFormat::Tiff,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Compose(args) => cmd_compose(args),
        Command::Geometry(args) => cmd_geometry(args),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();
}

fn cmd_compose(args: ComposeArgs) -> anyhow::Result<()> {
    let request = build_request(&args.request)?;
    let base = read_input(&args.inputs.base)?;
    let overlay = read_input(&args.inputs.overlay)?;

    let bytes = qrcompose::compose(&base, &overlay, &request)?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, &bytes)
        .with_context(|| format!("write output '{}'", args.out.display()))?;

    tracing::info!(
        width = request.canvas.width,
        height = request.canvas.height,
        format = request.format.extension(),
        "composed"
    );
    if args.print_digest {
        println!("{}", sha256_hex(&bytes));
    }
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_geometry(args: GeometryArgs) -> anyhow::Result<()> {
    let request = build_request(&args.request)?;
    let base_bytes = read_input(&args.inputs.base)?;
    let overlay_bytes = read_input(&args.inputs.overlay)?;
    let (base, overlay) = qrcompose::decode_inputs(&base_bytes, &overlay_bytes, &request)
        .with_context(|| {
            format!(
                "decode inputs '{}' and '{}'",
                args.inputs.base.display(),
                args.inputs.overlay.display()
            )
        })?;

    let plan = qrcompose::plan_composition(&base, &overlay, &request)?;
    let json = serde_json::to_string_pretty(&plan).context("serialize geometry")?;
    println!("{json}");
    Ok(())
}

fn build_request(args: &RequestArgs) -> anyhow::Result<ComposeRequest> {
    let mut req = match &args.request {
        Some(path) => ComposeRequest::from_json_path(path)?,
        None => {
            let (Some(width), Some(height)) = (args.width, args.height) else {
                anyhow::bail!("--width and --height are required without --request");
            };
            let (Some(rel_x), Some(rel_y), Some(rel_w)) = (args.rel_x, args.rel_y, args.rel_w)
            else {
                anyhow::bail!("--rel-x, --rel-y and --rel-w are required without --request");
            };
            ComposeRequest::new(
                CanvasSpec::new(width, height),
                Placement::new(rel_x, rel_y, rel_w),
            )
        }
    };

    if let Some(w) = args.width {
        req.canvas.width = w;
    }
    if let Some(h) = args.height {
        req.canvas.height = h;
    }

    match (args.qr_size, args.fit) {
        (Some(size_px), fit) => {
            req.mode = PlacementMode::FixedSizeCentered {
                size_px,
                fit: fit.map(BaseFit::from).unwrap_or_default(),
            };
        }
        (None, Some(fit)) => match &mut req.mode {
            PlacementMode::FixedSizeCentered { fit: f, .. } => *f = fit.into(),
            PlacementMode::ScaleToFillCentered => {
                anyhow::bail!("--fit only applies together with --qr-size");
            }
        },
        (None, None) => {}
    }

    let p = &mut req.placement;
    if let Some(v) = args.rel_x {
        p.rel_x = v;
    }
    if let Some(v) = args.rel_y {
        p.rel_y = v;
    }
    if let Some(v) = args.rel_w {
        p.rel_w = v;
    }
    if let Some(v) = args.rotation {
        p.rotation_deg = v;
    }
    if let Some(v) = args.anchor_x {
        p.anchor_x = v;
    }
    if let Some(v) = args.anchor_y {
        p.anchor_y = v;
    }
    if let Some(v) = args.opacity {
        p.opacity = v;
    }

    if args.base_on_top {
        req.layer_order = LayerOrder::BaseOnTop;
    }
    if let Some(format) = args.format {
        req.format = format.into();
    }
    if let Some(bg) = args.background {
        req.background = Some(bg);
    }

    req.validate()?;
    tracing::debug!(request = ?req, "resolved compose request");
    Ok(req)
}

fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("read input '{}'", path.display()))
}

fn parse_hex_rgba(s: &str) -> Result<[u8; 4], String> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if !(hex.len() == 6 || hex.len() == 8) || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(format!("expected RRGGBB or RRGGBBAA hex, got '{s}'"));
    }
    let mut out = [255u8; 4];
    for (i, slot) in out.iter_mut().enumerate().take(hex.len() / 2) {
        *slot = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
            .map_err(|e| format!("invalid hex '{s}': {e}"))?;
    }
    Ok(out)
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{:02x}", b));
    }
    out
}
