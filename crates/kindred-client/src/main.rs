//! # kindred-demo
//!
//! Walks through the client end to end against the in-memory
//! collaborators and prints every UI event as a JSON line:
//!
//! - **Onboarding**: phone number, OTP, photos, face verification and the
//!   profile questionnaire, ending with the profile commit
//! - **Discovery**: filters, tier switch, like and pass
//! - **Chat**: a text and a voice message with the simulated peer

use std::collections::BTreeSet;
use std::time::Duration;

use anyhow::Context;
use tracing::info;

use kindred_chat::ChatEvent;
use kindred_client::chat_driver::ChatCommand;
use kindred_client::events::{
    render_event, ChatEventPayload, FeedPayload, EVENT_CHAT, EVENT_FEED_CHANGED,
    EVENT_OTP_COUNTDOWN, EVENT_PROFILE_COMMITTED, EVENT_STEP_CHANGED,
};
use kindred_client::mock::{in_memory_collaborators, DEMO_OTP};
use kindred_client::onboarding::{OnboardingService, PhotoSource, StepOutcome};
use kindred_client::state::AppState;
use kindred_client::{init_tracing, ClientConfig};
use kindred_onboarding::StepId;
use kindred_onboarding::StepInput;
use kindred_shared::constants::APP_NAME;
use kindred_shared::profile::{HabitFrequency, Identity, LifestyleHabits, PhotoPrompt};
use kindred_shared::types::{ConversationId, Tier};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    init_tracing();
    info!("Starting {} demo v{}", APP_NAME, env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ClientConfig::from_env();
    info!(?config, "Loaded configuration");

    let collaborators = in_memory_collaborators(&config);
    let mut state = AppState::new(config.clone(), collaborators.clone());

    // -----------------------------------------------------------------------
    // 3. Onboarding
    // -----------------------------------------------------------------------
    let mut onboarding = OnboardingService::new(&collaborators, &config);
    let profile_id = run_onboarding(&mut onboarding)
        .await
        .context("onboarding failed")?;
    state.profile_id = Some(profile_id);
    emit(render_event(EVENT_PROFILE_COMMITTED, profile_id));

    // -----------------------------------------------------------------------
    // 4. Discovery
    // -----------------------------------------------------------------------
    state.apply_filters().await.context("loading candidates failed")?;
    emit_feed(&state);
    state.feed.like();
    emit_feed(&state);
    state.feed.set_tier_filter(Tier::Executive);
    emit_feed(&state);
    state.feed.pass();
    emit_feed(&state);

    // -----------------------------------------------------------------------
    // 5. Chat
    // -----------------------------------------------------------------------
    let peer = state
        .feed
        .current()
        .map(|c| c.name.clone())
        .unwrap_or_else(|| "Amara".to_string());
    let conversation = ConversationId::new();
    let handle = state.open_chat(conversation, &peer, true);

    handle.send_text("Hi! How was your day?").await;
    handle.commands.send(ChatCommand::StartRecording).await?;
    tokio::time::sleep(Duration::from_secs(3)).await;
    handle.commands.send(ChatCommand::StopRecording).await?;

    // Both replies arrive within the reply delay.
    let quiet = config.reply_delay + Duration::from_millis(500);
    while let Ok(Some(event)) = tokio::time::timeout(quiet, handle.events.recv()).await {
        emit_chat(conversation, &event);
    }
    handle.commands.send(ChatCommand::MarkRead).await?;

    let mut handle = state
        .close_chat(conversation)
        .context("chat was not open")?;
    drop(handle.commands);
    while let Some(event) = handle.events.recv().await {
        emit_chat(conversation, &event);
    }

    info!("Demo finished");
    Ok(())
}

async fn run_onboarding(svc: &mut OnboardingService) -> anyhow::Result<kindred_shared::types::ProfileId> {
    svc.submit_phone("+91", "98765 43210").await?;
    emit_step(svc);
    if let Some(otp) = svc.otp() {
        emit(render_event(EVENT_OTP_COUNTDOWN, otp.view()));
    }
    svc.verify_otp(DEMO_OTP).await?;
    emit_step(svc);

    svc.add_photo(PhotoSource::Camera, None).await?;
    svc.add_photo(PhotoSource::Library, Some(0)).await?;
    svc.submit_photos().await?;
    emit_step(svc);

    loop {
        let step = svc.wizard().current();
        let outcome = match step {
            StepId::PhotoGrid => svc.submit_photos().await?,
            StepId::FaceVerification => StepOutcome::Moved(svc.run_face_verification().await?),
            step => match answer(step) {
                Some(input) => svc.submit(input).await?,
                None => svc.skip().await?,
            },
        };
        match outcome {
            StepOutcome::Moved(_) => emit_step(svc),
            StepOutcome::Committed(id) => return Ok(id),
        }
    }
}

/// Canned answers for the questionnaire; `None` skips the step.
fn answer(step: StepId) -> Option<StepInput> {
    let set = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>();
    let input = match step {
        StepId::AddPrompt => StepInput::PhotoPrompt(PhotoPrompt {
            prompt: Some("Two truths and a lie".into()),
            location: Some("Jaipur".into()),
            caption: None,
        }),
        StepId::Identity => StepInput::Identity(Identity {
            first_name: "Priya".into(),
            last_name: Some("Sharma".into()),
            birth_date: Some("04/12/1998".into()),
            height: Some("5'6\"".into()),
        }),
        StepId::Location => StepInput::Location("Jaipur".into()),
        StepId::Interests => StepInput::Interests(set(&["Travel", "Photography", "Music"])),
        StepId::GenderIdentity => StepInput::GenderIdentity("Woman".into()),
        StepId::SexualOrientation => StepInput::SexualOrientation("Straight".into()),
        StepId::PoliticalAffiliation => StepInput::PoliticalAffiliation("Moderate".into()),
        StepId::Languages => StepInput::Languages(set(&["English", "Hindi"])),
        StepId::LifestyleHabits => StepInput::Lifestyle(LifestyleHabits {
            smoking: Some(HabitFrequency::Never),
            drinking: Some(HabitFrequency::Occasionally),
            weed: Some(HabitFrequency::Never),
        }),
        StepId::IdealRelationship => {
            StepInput::IdealRelationship("Someone kind who loves long walks.".into())
        }
        StepId::Ethnicity => StepInput::Ethnicity("South Asian".into()),
        _ => return None,
    };
    Some(input)
}

fn emit(line: Option<String>) {
    if let Some(line) = line {
        println!("{line}");
    }
}

fn emit_step(svc: &OnboardingService) {
    emit(render_event(EVENT_STEP_CHANGED, svc.view()));
}

fn emit_feed(state: &AppState) {
    emit(render_event(
        EVENT_FEED_CHANGED,
        FeedPayload {
            tier: state.feed.tier().to_string(),
            candidate: state.feed.current().map(|c| c.headline()),
            visible: state.feed.len(),
        },
    ));
}

fn emit_chat(conversation: ConversationId, event: &ChatEvent) {
    emit(render_event(
        EVENT_CHAT,
        ChatEventPayload {
            conversation,
            event,
        },
    ));
}
