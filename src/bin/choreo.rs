use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "choreo", version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a show plan into a gap-free timeline JSON.
    Compile(CompileArgs),
    /// Print the repeat schedule of a template over a bar window.
    Schedule(ScheduleArgs),
}

#[derive(Parser, Debug)]
struct CompileArgs {
    /// Input show plan JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Compile configuration JSON; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output timeline JSON path.
    #[arg(long)]
    out: PathBuf,

    /// Write per-channel xLights placements instead of raw effects.
    #[arg(long, default_value_t = false)]
    placements: bool,

    /// Compile fixtures one after another.
    #[arg(long, default_value_t = false)]
    sequential: bool,

    /// Override rayon worker threads.
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Parser, Debug)]
struct ScheduleArgs {
    /// Input template JSON (must carry a repeat contract).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Window length in bars.
    #[arg(long)]
    bars: f64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    match cli.cmd {
        Command::Compile(args) => cmd_compile(args),
        Command::Schedule(args) => cmd_schedule(args),
    }
}

fn cmd_compile(args: CompileArgs) -> anyhow::Result<()> {
    let plan = choreo::ShowPlan::from_path(&args.in_path)
        .with_context(|| format!("load show plan '{}'", args.in_path.display()))?;
    let mut config = match &args.config {
        Some(path) => choreo::CompileConfig::from_path(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => choreo::CompileConfig::default(),
    };
    if args.sequential {
        config = config.with_parallel(false);
    }
    if args.threads.is_some() {
        config = config.with_threads(args.threads);
    }

    let choreographer = choreo::Choreographer::new(config)?;
    let show = choreographer.render_show(&plan)?;
    for d in show.diagnostics.records() {
        tracing::warn!(kind = ?d.kind, subject = %d.subject, "{}", d.message);
    }

    let json = if args.placements {
        let mut placements = Vec::new();
        for effect in &show.effects {
            let fixture = plan.fixtures.get(&effect.fixture_id)?;
            placements.extend(choreo::effect_placements(effect, fixture));
        }
        serde_json::to_string_pretty(&serde_json::json!({
            "song_duration_ms": show.song_duration_ms,
            "fingerprint": show.fingerprint,
            "placements": placements,
        }))?
    } else {
        serde_json::to_string_pretty(&show)?
    };
    write_output(&args.out, &json)?;

    eprintln!(
        "wrote {} ({} effects, {} gaps filled, fingerprint {})",
        args.out.display(),
        show.effects.len(),
        show.gaps.len(),
        show.fingerprint
    );
    Ok(())
}

fn cmd_schedule(args: ScheduleArgs) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.in_path)
        .with_context(|| format!("read template '{}'", args.in_path.display()))?;
    let template: choreo::Template = serde_json::from_str(&text)
        .with_context(|| format!("parse template '{}'", args.in_path.display()))?;
    template.validate()?;
    let contract = template
        .repeat
        .as_ref()
        .with_context(|| format!("template '{}' has no repeat contract", template.template_id))?;
    let durations = template.loop_durations()?;
    let schedule = choreo::schedule_repeats(contract, args.bars, durations.as_deref())?;
    println!("{}", serde_json::to_string_pretty(&schedule)?);
    Ok(())
}

fn write_output(path: &Path, contents: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, contents).with_context(|| format!("write '{}'", path.display()))
}
