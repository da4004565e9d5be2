//! DebateKit CLI - AI Debate Pipeline
//!
//! Generates a moderated AI debate, scores it with a judge panel, and turns
//! it into a narrated, subtitled video.

use std::env;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{ArgAction, Args, Parser, Subcommand};
use colored::Colorize;
use debatekit_core::config::Config;
use debatekit_core::judge::Criterion;
use debatekit_core::{
    CallPolicy, DebateError, DebateEvent, DebateOrchestrator, JudgePanel, JudgeRunner, KokoroSpeech,
    ModelBackend, OpenAiBackend, ScoreReport, SeedPlan, SeedSource, Transcript, TurnGenerator,
    render, speech, subtitles,
};
use tracing::{info, warn};

#[derive(Parser)]
#[command(
    name = "debatekit",
    version,
    about = "AI Debate Pipeline - debate, judge, narrate, render",
    long_about = "Runs a moderated debate between two AI personas, scores it with a panel of AI judges, and renders a narrated video with subtitles."
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, global = true, default_value = "debatekit.toml", value_name = "FILE")]
    config: PathBuf,

    /// Output directory for transcript, scores, audio and video
    #[arg(short, long, global = true, default_value = "out", value_name = "DIR")]
    out: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate the debate transcript
    Debate(DebateArgs),
    /// Score the transcript with the judge panel
    Judge(JudgeArgs),
    /// Narrate the transcript and write subtitles
    Narrate,
    /// Render the final video
    Render,
    /// Run every stage in order
    Run {
        #[command(flatten)]
        debate: DebateArgs,
        #[command(flatten)]
        judge: JudgeArgs,
    },
}

#[derive(Args)]
struct DebateArgs {
    /// The topic to debate (overrides the config file)
    #[arg(long, value_name = "TOPIC")]
    topic: Option<String>,

    /// Number of debate rounds
    #[arg(short, long, value_name = "ROUNDS")]
    rounds: Option<u32>,

    /// Target words per turn
    #[arg(long, value_name = "WORDS")]
    words: Option<u32>,

    /// Continue from the partial transcript of an interrupted run
    #[arg(long)]
    resume: bool,
}

#[derive(Args)]
struct JudgeArgs {
    /// Number of judges on the panel
    #[arg(long, value_name = "COUNT")]
    judges: Option<usize>,
}

/// Output locations under the `--out` directory.
struct OutputPaths {
    transcript: PathBuf,
    partial: PathBuf,
    scores: PathBuf,
    subtitles: PathBuf,
    audio: PathBuf,
    video: PathBuf,
}

impl OutputPaths {
    fn new(out: &Path) -> Self {
        Self {
            transcript: out.join("transcript.json"),
            partial: out.join("transcript.partial.json"),
            scores: out.join("scores.json"),
            subtitles: out.join("debate.srt"),
            audio: out.join("audio").join("debate_audio.wav"),
            video: out.join("final.mp4"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::load_or_default(&cli.config)?;
    config.apply_env(
        env::var("OPENAI_API_BASE")
            .or_else(|_| env::var("OPENAI_BASE_URL"))
            .ok(),
        env::var("OPENAI_API_KEY").ok(),
    );

    let paths = OutputPaths::new(&cli.out);

    match cli.command {
        Command::Debate(args) => {
            run_debate(&mut config, &args, &paths).await?;
        }
        Command::Judge(args) => {
            run_judges(&mut config, &args, &paths).await?;
        }
        Command::Narrate => run_narrate(&config, &cli.out, &paths).await?,
        Command::Render => run_render(&config, &paths).await?,
        Command::Run { debate, judge } => {
            run_debate(&mut config, &debate, &paths).await?;
            run_judges(&mut config, &judge, &paths).await?;
            run_narrate(&config, &cli.out, &paths).await?;
            run_render(&config, &paths).await?;
            println!(
                "{} {}",
                "Done ->".bright_green().bold(),
                paths.video.display()
            );
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn backend(config: &Config) -> Result<Arc<dyn ModelBackend>, Box<dyn Error>> {
    if config.backend.api_key.is_empty() {
        eprintln!(
            "{}",
            "Warning: OPENAI_API_KEY not set. API calls may fail.".yellow()
        );
    }
    Ok(Arc::new(OpenAiBackend::from_config(&config.backend)?))
}

async fn run_debate(
    config: &mut Config,
    args: &DebateArgs,
    paths: &OutputPaths,
) -> Result<Transcript, Box<dyn Error>> {
    if let Some(topic) = &args.topic {
        config.topic = Some(topic.clone());
    }
    if let Some(rounds) = args.rounds {
        config.rounds = rounds;
    }
    if let Some(words) = args.words {
        config.words_per_turn = words;
    }

    let turns = TurnGenerator::new(
        backend(config)?,
        config.model.clone(),
        CallPolicy::from_config(&config.backend),
    );

    let orchestrator = if let Some(partial_path) = resume_from(args.resume, &paths.partial)? {
        let partial = Transcript::load_json(partial_path)?;
        info!(
            path = %paths.partial.display(),
            completed = partial.utterances.len(),
            "loaded partial transcript"
        );
        DebateOrchestrator::resume(turns, partial, config.words_per_turn)?
    } else {
        config.validate()?;
        let topic = config.topic().unwrap_or_default().to_string();
        DebateOrchestrator::new(
            turns,
            topic,
            config.rounds,
            config.words_per_turn,
            config.names.clone(),
        )?
    };

    let snapshot = orchestrator.transcript();
    print_header(&snapshot, &config.model);

    let mut orchestrator = orchestrator
        .with_checkpoint(&paths.partial)
        .with_callback(create_console_callback());

    match orchestrator.run().await {
        Ok(transcript) => {
            transcript.save_json(&paths.transcript)?;
            if paths.partial.exists() {
                std::fs::remove_file(&paths.partial)?;
            }
            print_rule();
            println!("{}", "  Debate concluded.".bright_green().bold());
            println!("  Transcript saved to {}", paths.transcript.display());
            print_rule();
            Ok(transcript)
        }
        Err(e) => {
            eprintln!(
                "{} {} ({} utterances kept in {}; rerun with --resume)",
                "Error:".red().bold(),
                e,
                orchestrator.utterances().len(),
                paths.partial.display()
            );
            Err(e.into())
        }
    }
}

/// The partial transcript to continue from, if `--resume` was given.
fn resume_from(resume: bool, partial: &Path) -> Result<Option<&Path>, DebateError> {
    if !resume {
        return Ok(None);
    }
    if !partial.exists() {
        return Err(DebateError::Config(format!(
            "--resume given but no partial transcript at {}",
            partial.display()
        )));
    }
    Ok(Some(partial))
}

async fn run_judges(
    config: &mut Config,
    args: &JudgeArgs,
    paths: &OutputPaths,
) -> Result<ScoreReport, Box<dyn Error>> {
    if let Some(count) = args.judges {
        config.judges.count = count;
    }
    config.validate_judges()?;

    let transcript = Transcript::load_json(&paths.transcript)?;
    transcript.validate()?;

    let runner = JudgeRunner::new(
        backend(config)?,
        config.judge_model.clone(),
        CallPolicy::from_config(&config.backend),
    );
    let seeds = if config.judges.seed_variation {
        SeedPlan::Varied(SeedSource::from_entropy())
    } else {
        SeedPlan::Fixed(config.judges.fixed_seed)
    };
    let mut panel = JudgePanel::new(runner, config.judges.count, seeds)
        .with_concurrency(config.judges.concurrency);

    println!(
        "{} {} judges scoring \"{}\"",
        "▶".bright_cyan(),
        config.judges.count,
        transcript.topic.bright_white()
    );
    let verdicts = panel.run(Arc::new(transcript.clone())).await;
    let report = ScoreReport::new(verdicts);
    report.save_json(&paths.scores)?;

    print_scores(&report, &transcript);
    println!("  Scores saved to {}", paths.scores.display());
    Ok(report)
}

async fn run_narrate(config: &Config, out: &Path, paths: &OutputPaths) -> Result<(), Box<dyn Error>> {
    let mut transcript = Transcript::load_json(&paths.transcript)?;
    transcript.validate()?;

    let mut engine = KokoroSpeech::new().await?;
    engine.validate_voices(&config.voices)?;

    let track = speech::narrate(&mut transcript, &mut engine, &config.voices, out)?;
    transcript.save_json(&paths.transcript)?;
    subtitles::write_srt(&transcript, &paths.subtitles)?;

    println!(
        "  Audio & subtitles created: {} {}",
        track.display(),
        paths.subtitles.display()
    );
    Ok(())
}

async fn run_render(config: &Config, paths: &OutputPaths) -> Result<(), Box<dyn Error>> {
    if !paths.audio.exists() || !paths.subtitles.exists() {
        warn!("narration output missing; run `debatekit narrate` first");
    }
    let video = render::render_video(&paths.audio, &paths.subtitles, &paths.video, &config.video).await?;
    println!("  Rendered: {}", video.display());
    Ok(())
}

fn print_rule() {
    println!("{}", "═".repeat(70).bright_blue());
}

fn print_header(transcript: &Transcript, model: &str) {
    println!();
    print_rule();
    println!("{}", format!("  {}", "DebateKit".bold()).bright_blue().bold());
    print_rule();
    println!();
    println!("{} {}", "Topic:".bold(), transcript.topic.bright_white());
    println!("{} {}", "Rounds:".bold(), transcript.rounds);
    println!("{} {}", "Model:".bold(), model.dimmed());
    println!();
    println!("{}", "Participants:".bold());
    println!("  {} (moderator)", transcript.names.moderator.bright_magenta());
    println!("  {} ({})", transcript.names.debater_a.bright_cyan(), "FOR".yellow());
    println!("  {} ({})", transcript.names.debater_b.bright_cyan(), "AGAINST".yellow());
    println!();
    println!("{}", "─".repeat(70).dimmed());
}

fn print_scores(report: &ScoreReport, transcript: &Transcript) {
    let aggregate = &report.aggregate;
    println!();
    print_rule();
    let winner = aggregate
        .winner
        .map(|role| transcript.names.get(role).to_string())
        .unwrap_or_else(|| "undecided".to_string());
    println!(
        "  {} {}  ({} of {} verdicts valid)",
        "Winner:".bold(),
        winner.bright_green().bold(),
        aggregate.valid,
        aggregate.count
    );
    println!();
    for criterion in Criterion::ALL {
        let average = aggregate
            .averages
            .get(&criterion)
            .copied()
            .flatten()
            .map(|avg| format!("{avg:6.1}"))
            .unwrap_or_else(|| "   n/a".to_string());
        println!("  {:<16} {}", criterion.key(), average);
    }
    print_rule();
}

/// Create a callback that prints debate events to the console.
fn create_console_callback() -> Box<dyn Fn(DebateEvent) + Send + Sync> {
    Box::new(move |event| match event {
        DebateEvent::StepStart {
            step,
            speaker,
            round,
        } => {
            println!(
                "{} {} {}",
                "▶".bright_cyan(),
                speaker.bright_cyan().bold(),
                format!("({}, round {})", step.role(), round).yellow()
            );
        }
        DebateEvent::Spoken { utterance } => {
            // Word wrap and indent the content
            let wrapped = textwrap(&utterance.text, 66);
            for line in wrapped.lines() {
                println!("  {}", line);
            }
            println!();
        }
        DebateEvent::DebateEnd => {
            // Handled in run_debate
        }
    })
}

/// Simple text wrapping function.
fn textwrap(text: &str, width: usize) -> String {
    let mut result = String::new();
    let mut current_line_len = 0;

    for word in text.split_whitespace() {
        if current_line_len + word.len() + 1 > width && current_line_len > 0 {
            result.push('\n');
            current_line_len = 0;
        }
        if current_line_len > 0 {
            result.push(' ');
            current_line_len += 1;
        }
        result.push_str(word);
        current_line_len += word.len();
    }

    result
}
