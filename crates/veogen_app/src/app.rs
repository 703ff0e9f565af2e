use std::time::Duration;

use anyhow::bail;
use veogen_core::{update, AppState, ArtifactKind, Msg, SessionState, MODEL_OPTIONS};
use veogen_engine::RequestSettings;

use crate::cli::Cli;
use crate::runner::EffectRunner;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub fn run(cli: Cli) -> anyhow::Result<()> {
    if cli.list_models {
        for (_, label) in MODEL_OPTIONS {
            println!("{label}");
        }
        return Ok(());
    }

    let runner = EffectRunner::new(RequestSettings::default());
    let mut state = AppState::new();

    let seed = [
        Msg::TokenChanged(cli.token.unwrap_or_default()),
        Msg::ModelSelected(cli.model),
        Msg::PromptChanged(cli.prompt.unwrap_or_default()),
        Msg::ImageUrlChanged(cli.image_url.unwrap_or_default()),
        Msg::ExtraChanged(cli.extra.unwrap_or_default()),
        Msg::StreamToggled(cli.stream),
        Msg::GenerateClicked,
    ];
    for msg in seed {
        state = apply(state, msg, &runner);
    }

    loop {
        match state.view().session {
            SessionState::Done | SessionState::Failed | SessionState::Idle => break,
            SessionState::Probing | SessionState::Requesting | SessionState::Streaming => {}
        }
        if let Some(msg) = runner.poll(POLL_INTERVAL) {
            // Show frames live so a long stream is not a silent wait.
            if let Msg::FrameArrived { frame, .. } = &msg {
                println!("| {frame}");
            }
            state = apply(state, msg, &runner);
        }
    }

    report(&state)
}

fn apply(state: AppState, msg: Msg, runner: &EffectRunner) -> AppState {
    let (state, effects) = update(state, msg);
    runner.run(effects);
    state
}

fn report(state: &AppState) -> anyhow::Result<()> {
    let view = state.view();

    if view.session == SessionState::Failed {
        bail!(
            "{}",
            view.error.unwrap_or_else(|| "generation failed".to_string())
        );
    }

    let Some(result) = view.result else {
        bail!("session ended without a result");
    };

    if result.interrupted {
        println!("(stream interrupted; showing partial output)");
    }

    if result.text.is_empty() {
        println!("The response contained no text content.");
        return Ok(());
    }

    println!("{}", result.text);
    println!();

    match result.kind {
        ArtifactKind::RecognizedMedia => {
            // candidate is always present for this kind
            if let Some(url) = result.candidate {
                println!("Video URL: {url}");
            }
        }
        ArtifactKind::UnrecognizedLink => {
            if let Some(url) = result.candidate {
                println!("A link was found but it may not be a direct video file: {url}");
            }
        }
        ArtifactKind::NoLink => {
            println!("No video link found in the response.");
        }
    }

    Ok(())
}
