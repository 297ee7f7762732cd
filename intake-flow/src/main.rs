//! Patient intake (intake-flow) - terminal driver
//!
//! Walks the whole intake from a terminal: the survey on stdin/stdout,
//! photo capture from a directory of image files, review, submission
//! and a dashboard summary.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use intake_common::config::{ConfigResolver, IntakeConfig};
use intake_common::events::CaptureMode;
use tracing::{info, warn};

use intake_flow::capture::{
    CaptureEngine, CaptureOutcome, CaptureProviders, TokioTicker, CAPTURE_STEPS,
};
use intake_flow::capture::steps::step_label;
use intake_flow::dashboard::{checklist_badge, Journey, ProgressBoard, PRE_OP_CHECKLIST};
use intake_flow::providers::{Console, ConsoleSpeech, DirectoryCamera, DirectoryPicker};
use intake_flow::review::{completion_greeting, NEXT_STEPS};
use intake_flow::survey::{
    Advance, Location, QuestionKind, StepInput, SurveyCatalog, PHOTO_PREPARATION,
};
use intake_flow::{IntakeSession, Route};

/// Command-line arguments for intake-flow
#[derive(Parser, Debug)]
#[command(name = "intake-flow")]
#[command(about = "Patient intake: survey, reference photos, review")]
#[command(version)]
struct Args {
    /// Configuration file (overrides INTAKE_CONFIG and the user config)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full intake in the terminal
    Run {
        /// Directory of image files used as camera and gallery
        #[arg(short, long, env = "INTAKE_PHOTO_DIR", default_value = ".")]
        photos: PathBuf,
    },
    /// Print the survey question graph
    Catalog,
    /// Validate a JSON survey catalog
    CheckCatalog {
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (config, source) = ConfigResolver::new("intake")
        .with_cli_path(args.config.clone())
        .resolve()
        .context("Failed to load configuration")?;

    init_tracing(&config)?;
    info!(
        "Starting intake-flow v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!(?source, "Configuration resolved");

    match args.command {
        Command::Run { photos } => run(config, photos).await,
        Command::Catalog => {
            let session = IntakeSession::new(config).context("Failed to load survey catalog")?;
            print_catalog(session.catalog());
            Ok(())
        }
        Command::CheckCatalog { file } => {
            let catalog = SurveyCatalog::load(&file)
                .with_context(|| format!("Invalid catalog: {}", file.display()))?;
            println!("✓ {} ({} questions)", file.display(), catalog.len());
            Ok(())
        }
    }
}

fn init_tracing(config: &IntakeConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match &config.logging.file {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn print_catalog(catalog: &SurveyCatalog) {
    for question in catalog.questions() {
        println!("{} [{:?}] {}", question.id, question.kind, question.title);
        if let Some(next) = &question.next {
            println!("    → {}", next);
        }
        for (i, option) in question.options.iter().enumerate() {
            let target = question
                .option_target(i)
                .map(|t| t.to_string())
                .unwrap_or_default();
            println!("    • {} → {}", option.label, target);
        }
    }
}

async fn run(config: IntakeConfig, photo_dir: PathBuf) -> Result<()> {
    let session = IntakeSession::new(config).context("Failed to create intake session")?;
    let console = Console::new();
    let providers = CaptureProviders {
        camera: Arc::new(DirectoryCamera::new(&photo_dir)),
        speech: Arc::new(ConsoleSpeech::new(console.clone())),
        picker: Arc::new(DirectoryPicker::new(&photo_dir, console.clone())),
        ticker: Arc::new(TokioTicker),
    };

    let mut route = Route::Welcome;
    loop {
        info!(route = %route, "Route");
        route = match route {
            Route::Welcome => run_survey(&session, &console).await?,
            Route::ModeSelection => Route::Capture {
                mode: choose_mode(&console).await?,
                retake: None,
            },
            Route::Capture { mode, retake } => {
                let engine = session.capture(mode, retake, providers.clone())?;
                run_capture(&engine, mode, &console).await?
            }
            Route::Review => run_review(&session, &console).await?,
            Route::Completion { patient_name } => {
                console.say(&completion_greeting(patient_name.as_deref())).await?;
                for (i, step) in NEXT_STEPS.iter().enumerate() {
                    console.say(&format!("  {}. {}", i + 1, step)).await?;
                }
                Route::Dashboard
            }
            Route::Dashboard => {
                print_dashboard(&session, &console).await?;
                return Ok(());
            }
        };
    }
}

async fn read_line(console: &Console, prompt: &str) -> Result<String> {
    match console.ask(prompt).await? {
        Some(line) => Ok(line),
        None => bail!("Input closed"),
    }
}

async fn run_survey(session: &IntakeSession, console: &Console) -> Result<Route> {
    let mut navigator = session.navigator();
    navigator.start().await;

    loop {
        let question = match navigator.location().clone() {
            Location::Exited(route) => return Ok(route),
            Location::NotFound(id) => bail!("Survey question not found: {}", id),
            Location::Question(_) => match navigator.current_question() {
                Some(question) => question.clone(),
                None => bail!("Survey location has no question"),
            },
        };

        if let Some(progress) = navigator.progress().await {
            console.say(&format!("\n{} (%{})", progress.label(), progress.percent)).await?;
        }
        let title = navigator.current_title().await.unwrap_or_default();
        console.say(&title).await?;
        if let Some(subtitle) = &question.subtitle {
            console.say(subtitle).await?;
        }
        let back_hint = if navigator.can_go_back() { " ('<' geri)" } else { "" };

        let input = match question.kind {
            QuestionKind::Instructional => {
                for item in PHOTO_PREPARATION {
                    console.say(&format!("  ✓ {}", item)).await?;
                }
                read_line(console, "Devam etmek için Enter").await?;
                StepInput::Acknowledge
            }
            kind if kind.is_choice() => {
                for (i, option) in question.options.iter().enumerate() {
                    match &option.subtitle {
                        Some(sub) => console.say(&format!("  [{}] {} ({})", i + 1, option.label, sub)).await?,
                        None => console.say(&format!("  [{}] {}", i + 1, option.label)).await?,
                    }
                }
                let line = read_line(console, &format!("Seçiminiz{}:", back_hint)).await?;
                if line.trim() == "<" {
                    navigator.back();
                    continue;
                }
                match line.trim().parse::<usize>() {
                    Ok(n) if n >= 1 => StepInput::Choice(n - 1),
                    _ => continue,
                }
            }
            _ => {
                let draft = navigator.current_draft().await.unwrap_or_default();
                let hint = match (&question.placeholder, draft.is_empty()) {
                    (_, false) => format!("[{}]", draft),
                    (Some(placeholder), true) => format!("({})", placeholder),
                    (None, true) => String::new(),
                };
                let line = read_line(console, &format!("{}{}:", hint, back_hint)).await?;
                if line.trim() == "<" {
                    navigator.back();
                    continue;
                }
                if line.trim().is_empty() { StepInput::Text(draft) } else { StepInput::Text(line) }
            }
        };

        if navigator.submit(input).await == Advance::Blocked {
            console.say("Lütfen geçerli bir cevap girin.").await?;
        }
    }
}

async fn choose_mode(console: &Console) -> Result<CaptureMode> {
    console.say("\nFotoğraf çekim modu:").await?;
    console.say("  [1] Stüdyo (sesli yönlendirme)").await?;
    console.say("  [2] Manuel").await?;
    console.say("  [3] Galeriden yükle").await?;
    loop {
        let line = read_line(console, "Seçiminiz:").await?;
        match line.trim() {
            "1" => return Ok(CaptureMode::Guided),
            "2" => return Ok(CaptureMode::Manual),
            "3" => return Ok(CaptureMode::Gallery),
            other => match other.parse::<CaptureMode>() {
                Ok(mode) => return Ok(mode),
                Err(_) => continue,
            },
        }
    }
}

async fn run_capture(engine: &CaptureEngine, mode: CaptureMode, console: &Console) -> Result<Route> {
    let mut outcome = engine.start().await;
    loop {
        match outcome {
            CaptureOutcome::Finished(route) => return Ok(route),
            CaptureOutcome::Exited { route, message, .. } => {
                console.say(&message).await?;
                return Ok(route);
            }
            CaptureOutcome::PermissionRequired => {
                console.say("Kamera izni gerekiyor").await?;
                if console.confirm("İzin ver? [E/h]").await? {
                    outcome = engine.request_camera_permission().await;
                } else {
                    engine.abandon().await;
                    return Ok(Route::ModeSelection);
                }
                continue;
            }
            CaptureOutcome::Failed(message) => {
                warn!(error = %message, "Capture attempt failed");
                console.say(&format!("Çekim başarısız: {}", message)).await?;
                if !console.confirm("Tekrar denensin mi? [E/h]").await? {
                    engine.abandon().await;
                    return Ok(Route::ModeSelection);
                }
            }
            CaptureOutcome::Abandoned => return Ok(Route::ModeSelection),
            CaptureOutcome::Ready
            | CaptureOutcome::Advanced { .. }
            | CaptureOutcome::Reprompt
            | CaptureOutcome::Ignored => {}
        }

        let status = engine.status().await;
        let step = &CAPTURE_STEPS[status.step_index];
        console
            .say(&format!("\n{} - {}\n{}", step_label(status.step_index), step.title, step.instruction))
            .await?;

        outcome = match mode {
            CaptureMode::Guided => engine.run_guided().await?,
            CaptureMode::Gallery => engine.run_gallery().await?,
            CaptureMode::Manual => {
                let line = read_line(console, "Enter: çek, f: kamerayı çevir, q: çık").await?;
                match line.trim() {
                    "f" => {
                        let facing = engine.toggle_facing().await?;
                        console.say(&format!("Kamera: {:?}", facing)).await?;
                        CaptureOutcome::Ignored
                    }
                    "q" => {
                        engine.abandon().await;
                        return Ok(Route::ModeSelection);
                    }
                    _ => engine.capture_manual().await?,
                }
            }
        };
    }
}

async fn run_review(session: &IntakeSession, console: &Console) -> Result<Route> {
    let desk = session.review();
    loop {
        let summary = desk.summary().await;
        console.say("\nFotoğraflarınız:").await?;
        for entry in &summary.entries {
            let mark = if entry.filled { "✓" } else { "✗" };
            console.say(&format!("  [{}] {} {}", entry.index + 1, mark, entry.title)).await?;
        }

        let prompt = if summary.complete {
            "g: gönder, r N: yeniden çek, b: baştan başla"
        } else {
            "r N: yeniden çek, b: baştan başla"
        };
        let line = read_line(console, prompt).await?;
        let mut parts = line.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some("g"), _) if summary.complete => {
                let receipt = desk.submit().await?;
                info!(submission_id = %receipt.submission.id, "Submitted from terminal");
                return Ok(receipt.route);
            }
            (Some("r"), Some(n)) => {
                if let Some(index) = n.parse::<usize>().ok().and_then(|n| n.checked_sub(1)) {
                    match desk.retake(index) {
                        Ok(route) => return Ok(route),
                        Err(e) => console.say(&e.to_string()).await?,
                    }
                }
            }
            (Some("b"), _) => return Ok(desk.redo_all().await),
            _ => {}
        }
    }
}

async fn print_dashboard(session: &IntakeSession, console: &Console) -> Result<()> {
    let journey = Journey::default();
    console.say("\nTedavi yolculuğunuz:").await?;
    if let Some(current) = journey.current() {
        console.say(&format!("  Şu an: {} ({})", current.title, current.date.unwrap_or("-"))).await?;
    }
    console
        .say(&format!("  {}/{} adım tamamlandı", journey.completed_count(), journey.steps().len()))
        .await?;
    console.say(&format!("  Kontrol listesi: {}", checklist_badge(&PRE_OP_CHECKLIST))).await?;

    let photos = session.photos();
    let photos = photos.read().await;
    let board = ProgressBoard::new(photos.history());
    for record in board.gallery() {
        console.say(&format!("  Fotoğraf seti: {} ({})", record.period_label, record.date_label)).await?;
    }
    Ok(())
}
