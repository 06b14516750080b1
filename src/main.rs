use clap::Parser;
use std::process::ExitCode;
use tokio::sync::broadcast;

use codecalc::cli::{self, Args, Command};
use codecalc::clipboard::{self, ArboardClipboard, ClipboardWriter};
use codecalc::config::Config;
use codecalc::errors::FlowError;
use codecalc::ingest::{self, AcceptList};
use codecalc::schema::FlowInput;
use codecalc::session::{Mode, Notice, OperationState, Session};
use codecalc::wire::{AppPromptInput, FullProjectInput, GenerateCodeInput, MergeCodeInput};
use codecalc::{build_flows, diff, ux};

fn apply_overrides(cfg: &mut Config, args: &Args) {
    if let Some(p) = args.provider {
        cfg.provider = p;
    }
    if let Some(m) = &args.model {
        cfg.model = Some(m.clone());
    }
    if let Some(t) = args.timeout_secs {
        cfg.timeout_secs = t;
    }
    if let Some(n) = args.max_attempts {
        cfg.max_attempts = n;
    }
    if args.save_artifacts {
        cfg.save_artifacts = true;
    }
}

/// Drains pending notices to stderr.
fn flush_notices(rx: &mut broadcast::Receiver<Notice>) {
    while let Ok(n) = rx.try_recv() {
        ux::print_notice(&n);
    }
}

fn copy<T: Clone>(session: &Session<T>, id: &str, text: &str) {
    let mut board = match ArboardClipboard::new() {
        Ok(b) => Some(b),
        Err(e) => {
            tracing::debug!(error = %e, "no clipboard");
            None
        }
    };
    let writer = board.as_mut().map(|b| b as &mut dyn ClipboardWriter);
    match clipboard::copy_or_notice(writer, text) {
        Ok(()) => session.mark_copied(id),
        Err(msg) => session.notify_failure(format!("Copy failed: {msg}")),
    }
}

/// Prints the final state; returns whether the operation succeeded.
fn report<T: Clone>(state: &OperationState<T>, show: impl FnOnce(&T)) -> bool {
    match state {
        OperationState::Success(v) => {
            show(v);
            true
        }
        OperationState::Error(msg) => {
            ux::error_banner(msg);
            false
        }
        OperationState::Idle | OperationState::Loading => false,
    }
}

async fn run_code(cfg: &Config, c: &cli::CodeArgs) -> Result<bool, FlowError> {
    if c.full_project {
        let input = FullProjectInput { feature_description: c.description.clone() };
        input.validate()?;
        let mut cfg = cfg.clone();
        cfg.strict_unique_file_names |= c.strict;
        let flows = build_flows(&cfg)?;

        let session = Session::new();
        session.set_mode(Mode::FullProject);
        let mut rx = session.subscribe();
        let pb = ux::spinner("Generating project...");
        let state = session
            .run("Project generation", || flows.generate_full_project(&input))
            .await?;
        pb.finish_and_clear();

        let ok = report(&state, ux::show_project);
        if let (true, OperationState::Success(p), true) = (ok, &state, c.copy) {
            let all = p
                .sections
                .iter()
                .map(|s| format!("// {}\n{}", s.file_name, s.code))
                .collect::<Vec<_>>()
                .join("\n\n");
            copy(&session, &p.project_name, &all);
        }
        flush_notices(&mut rx);
        Ok(ok)
    } else {
        let input = GenerateCodeInput { feature_description: c.description.clone() };
        input.validate()?;
        let flows = build_flows(cfg)?;

        let session = Session::new();
        let mut rx = session.subscribe();
        let pb = ux::spinner("Generating...");
        let state = session.run("Code generation", || flows.generate_code(&input)).await?;
        pb.finish_and_clear();

        let ok = report(&state, ux::show_code);
        if let (true, OperationState::Success(out), true) = (ok, &state, c.copy) {
            copy(&session, "javaCode", &out.java_code);
        }
        flush_notices(&mut rx);
        Ok(ok)
    }
}

async fn run_prompt(cfg: &Config, p: &cli::PromptArgs) -> Result<bool, FlowError> {
    let input = AppPromptInput { user_input: p.input.clone() };
    input.validate()?;
    let flows = build_flows(cfg)?;

    let session = Session::new();
    let mut rx = session.subscribe();
    let pb = ux::spinner("Generating app prompt...");
    let state = session.run("Prompt generation", || flows.generate_app_prompt(&input)).await?;
    pb.finish_and_clear();

    let ok = report(&state, ux::show_app_prompt);
    if let (true, OperationState::Success(out), true) = (ok, &state, p.copy) {
        copy(&session, "fullAppDescription", &out.full_app_description);
    }
    flush_notices(&mut rx);
    Ok(ok)
}

async fn run_compare(cfg: &Config, c: &cli::CompareArgs) -> Result<bool, FlowError> {
    let accept = AcceptList::parse(c.accept.as_deref().unwrap_or(&cfg.accept));

    let slots = ingest::load_pair(&c.original, &c.duplicate, c.paste, &accept, std::io::stdin())?;
    let (original, duplicate) = match slots {
        (Ok(a), Ok(b)) => (a, b),
        (a, b) => {
            for e in [a.err(), b.err()].into_iter().flatten() {
                ux::error_banner(&e.user_message());
            }
            return Ok(false);
        }
    };

    ux::show_sources(&original, &duplicate);
    let segments = diff::diff_chars(&original.content, &duplicate.content);
    ux::show_diff(&segments);

    if !c.merge {
        return Ok(true);
    }

    let input = MergeCodeInput {
        original_code: original.content.clone(),
        duplicate_code: duplicate.content.clone(),
    };
    input.validate()?;
    let flows = build_flows(cfg)?;

    let session = Session::new();
    let mut rx = session.subscribe();
    let pb = ux::spinner("Merging...");
    let state = session.run("Merge", || flows.merge_code(&input)).await?;
    pb.finish_and_clear();

    let ok = report(&state, ux::show_merge);
    if let (true, OperationState::Success(out), true) = (ok, &state, c.copy) {
        copy(&session, "mergedCode", &out.merged_code);
    }
    flush_notices(&mut rx);
    Ok(ok)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    codecalc::log::init_tracing(args.debug);

    let mut cfg = match Config::load(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            ux::error_banner(&e.user_message());
            return ExitCode::FAILURE;
        }
    };
    apply_overrides(&mut cfg, &args);
    tracing::debug!(?cfg, "effective config");

    let outcome = match &args.command {
        Command::Code(c) => run_code(&cfg, c).await,
        Command::Prompt(p) => run_prompt(&cfg, p).await,
        Command::Compare(c) => run_compare(&cfg, c).await,
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            ux::error_banner(&e.user_message());
            ExitCode::FAILURE
        }
    }
}
