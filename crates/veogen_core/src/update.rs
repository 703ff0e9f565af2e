use crate::{AppState, Effect, Msg, SessionState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::TokenChanged(token) => {
            state.set_token(token);
            Vec::new()
        }
        Msg::PromptChanged(prompt) => {
            state.set_prompt(prompt);
            Vec::new()
        }
        Msg::ImageUrlChanged(url) => {
            state.set_image_url(url);
            Vec::new()
        }
        Msg::ExtraChanged(extra) => {
            state.set_extra(extra);
            Vec::new()
        }
        Msg::ModelSelected(model) => {
            state.set_model(model);
            Vec::new()
        }
        Msg::StreamToggled(stream) => {
            state.set_stream(stream);
            Vec::new()
        }
        Msg::GenerateClicked => {
            // One session at a time; a click mid-session is ignored.
            match state.session() {
                SessionState::Idle | SessionState::Done | SessionState::Failed => {}
                SessionState::Probing | SessionState::Requesting | SessionState::Streaming => {
                    return (state, Vec::new());
                }
            }

            let draft = match state.draft() {
                Ok(draft) => draft,
                Err(message) => {
                    state.fail_session(message);
                    return (state, Vec::new());
                }
            };

            match draft.start_image_url.clone() {
                Some(url) => {
                    let job_id = state.begin_session(SessionState::Probing);
                    state.set_pending_draft(draft);
                    vec![Effect::ProbeImage { job_id, url }]
                }
                None => {
                    let job_id = state.begin_session(SessionState::Requesting);
                    vec![Effect::StartGeneration { job_id, draft }]
                }
            }
        }
        Msg::ProbeFinished { job_id, result } => {
            if state.active_job() != Some(job_id) {
                return (state, Vec::new());
            }
            match result {
                Ok(()) => match state.take_pending_draft() {
                    Some(draft) => {
                        state.set_session(SessionState::Requesting);
                        vec![Effect::StartGeneration { job_id, draft }]
                    }
                    None => Vec::new(),
                },
                Err(message) => {
                    state.fail_session(format!("first-frame image rejected: {message}"));
                    Vec::new()
                }
            }
        }
        Msg::FrameArrived { job_id, frame } => {
            if state.active_job() == Some(job_id) {
                state.set_session(SessionState::Streaming);
                state.push_frame(frame);
            }
            Vec::new()
        }
        Msg::JobFinished { job_id, result } => {
            if state.active_job() != Some(job_id) {
                return (state, Vec::new());
            }
            match result {
                Ok(outcome) => state.finish_session(outcome),
                Err(message) => state.fail_session(message),
            }
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
