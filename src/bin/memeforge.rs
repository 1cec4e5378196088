use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

use memeforge::{
    CaptionSlot, FileTemplateSource, HttpTemplateSource, ImageFile, IndexSource, Offset,
    RasterCompositor, ScriptedIndexSource, SeededIndexSource, Session, StderrNotifier, Studio,
    StudioConfig, StudioHooks, TemplateSource, ThreadRngIndexSource,
};

#[derive(Parser, Debug)]
#[command(name = "memeforge", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the available meme templates.
    Templates(TemplatesArgs),
    /// Compose one meme and write it as JPEG.
    Make(MakeArgs),
    /// Edit interactively, one command per line on stdin.
    Studio(StudioArgs),
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Template listing URL (overrides MEMEFORGE_TEMPLATE_URL).
    #[arg(long)]
    endpoint: Option<String>,

    /// Read the template listing from a JSON file instead of the network.
    #[arg(long, conflicts_with = "endpoint")]
    catalog_file: Option<PathBuf>,

    /// HTTP timeout in seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// JPEG quality (1-100).
    #[arg(long)]
    quality: Option<u8>,

    /// Extra directory with .ttf/.otf fonts for captions (repeatable).
    #[arg(long = "font-dir")]
    font_dirs: Vec<PathBuf>,

    /// Seed for random template selection.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Parser, Debug)]
struct TemplatesArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Print at most this many templates.
    #[arg(long)]
    limit: Option<usize>,
}

#[derive(Parser, Debug)]
struct MakeArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Output JPEG path.
    #[arg(long)]
    out: PathBuf,

    /// Use a local .jpg/.jpeg/.png instead of a template.
    #[arg(long, conflicts_with = "template")]
    image: Option<PathBuf>,

    /// Use the template at this catalog index instead of a random one.
    #[arg(long)]
    template: Option<usize>,

    /// Top caption.
    #[arg(long, default_value = "")]
    top: String,

    /// Bottom caption.
    #[arg(long, default_value = "")]
    bottom: String,

    /// Move the top caption by "dx,dy" pixels.
    #[arg(long, allow_hyphen_values = true)]
    top_offset: Option<Offset>,

    /// Move the bottom caption by "dx,dy" pixels.
    #[arg(long, allow_hyphen_values = true)]
    bottom_offset: Option<Offset>,
}

#[derive(Parser, Debug)]
struct StudioArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Directory for exports without an explicit path.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Print a little celebration after each export.
    #[arg(long)]
    celebrate: bool,
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Templates(args) => cmd_templates(args),
        Command::Make(args) => cmd_make(args),
        Command::Studio(args) => cmd_studio(args),
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

impl CommonArgs {
    fn config(&self) -> anyhow::Result<StudioConfig> {
        let mut cfg = StudioConfig::from_env().context("read MEMEFORGE_* environment")?;
        if let Some(endpoint) = &self.endpoint {
            cfg.template_endpoint = endpoint.clone();
        }
        if let Some(secs) = self.timeout_secs {
            cfg.http_timeout = Duration::from_secs(secs);
        }
        if let Some(q) = self.quality {
            cfg.jpeg_quality = q;
        }
        cfg.font_dirs.extend(self.font_dirs.iter().cloned());
        if self.seed.is_some() {
            cfg.seed = self.seed;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    fn compositor(&self, cfg: &StudioConfig) -> anyhow::Result<RasterCompositor> {
        // templates from a local listing may point at local files
        let opts = cfg
            .compositor_opts()
            .with_local_templates(self.catalog_file.is_some());
        Ok(RasterCompositor::with_default_fetcher(opts, cfg.http_timeout)?)
    }

    fn template_source(&self, cfg: &StudioConfig) -> anyhow::Result<Box<dyn TemplateSource>> {
        Ok(match &self.catalog_file {
            Some(path) => Box::new(FileTemplateSource::new(path)),
            None => Box::new(HttpTemplateSource::new(
                cfg.template_endpoint.clone(),
                cfg.http_timeout,
            )?),
        })
    }
}

fn index_source(cfg: &StudioConfig) -> Box<dyn IndexSource> {
    match cfg.seed {
        Some(seed) => Box::new(SeededIndexSource::new(seed)),
        None => Box::new(ThreadRngIndexSource),
    }
}

fn cmd_templates(args: TemplatesArgs) -> anyhow::Result<()> {
    let cfg = args.common.config()?;
    let source = args.common.template_source(&cfg)?;
    let templates = source
        .fetch_templates()
        .with_context(|| format!("load templates from {}", source.describe()))?;

    let limit = args.limit.unwrap_or(usize::MAX);
    for t in templates.iter().take(limit) {
        println!(
            "{}\t{}\t{}",
            t.index(),
            t.name().unwrap_or("-"),
            t.display_url()
        );
    }
    eprintln!("{} templates", templates.len());
    Ok(())
}

fn cmd_make(args: MakeArgs) -> anyhow::Result<()> {
    let cfg = args.common.config()?;

    let indices: Box<dyn IndexSource> = match args.template {
        Some(i) => Box::new(ScriptedIndexSource::fixed(i)),
        None => index_source(&cfg),
    };
    let mut session = Session::with_index_source(indices);

    match &args.image {
        Some(path) => {
            let file = ImageFile::from_path(path)?;
            session
                .set_active_image_from_local_file(file)
                .with_context(|| format!("use '{}' as base image", path.display()))?;
        }
        None => {
            let source = args.common.template_source(&cfg)?;
            session
                .load_from_source(source.as_ref())
                .with_context(|| format!("load templates from {}", source.describe()))?;
        }
    }

    session.set_caption_text(CaptionSlot::Top, args.top);
    session.set_caption_text(CaptionSlot::Bottom, args.bottom);
    if let Some(delta) = args.top_offset {
        session.move_caption(CaptionSlot::Top, delta);
    }
    if let Some(delta) = args.bottom_offset {
        session.move_caption(CaptionSlot::Bottom, delta);
    }

    let mut compositor = args.common.compositor(&cfg)?;
    let artifact = session.export(&mut compositor)?;
    let written = artifact.save_to(&args.out)?;

    eprintln!("wrote {}", written.display());
    Ok(())
}

fn cmd_studio(args: StudioArgs) -> anyhow::Result<()> {
    let cfg = args.common.config()?;
    let source = args.common.template_source(&cfg)?;
    let compositor = args.common.compositor(&cfg)?;

    let mut hooks = StudioHooks::new();
    if args.celebrate {
        hooks = hooks.on_export_success(|artifact, path| {
            eprintln!(
                "  *  .  *  {} ({} bytes) is ready  *  .  *",
                path.display(),
                artifact.bytes.len()
            );
        });
    }

    let session = Session::with_index_source(index_source(&cfg));
    let mut studio = Studio::new(session, compositor, StderrNotifier)
        .with_output_dir(&args.out_dir)
        .with_hooks(hooks);

    studio.start(source.as_ref());
    studio.run(std::io::stdin().lock())?;
    Ok(())
}
