//! The UI loop.
//!
//! Everything that changes what the user sees, plus the conversation
//! history, is mutated here and only here. Workers (completion, listening)
//! report back through the event queue; voice output runs detached.

use super::events::{parse_input, UiEvent};
use super::presenter::Presenter;
use crate::ai::context::{ConversationHistory, Turn};
use crate::ai::emotion::{CharacterState, Emotion, ParsedReply};
use crate::ai::pipeline::TurnPipeline;
use crate::assets::AssetResolver;
use crate::llm::LlmError;
use crate::stt::SpeechInput;
use crate::tts::VoiceService;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

const QUEUE_CAPACITY: usize = 32;

pub struct CompanionApp<P: Presenter> {
    character_name: String,
    pipeline: TurnPipeline,
    resolver: Arc<dyn AssetResolver>,
    voice: VoiceService,
    speech: SpeechInput,
    presenter: P,
    history: ConversationHistory,
    state: CharacterState,
    chat_visible: bool,
    in_flight: bool,
    listening: bool,
    tx: mpsc::Sender<UiEvent>,
    rx: mpsc::Receiver<UiEvent>,
}

impl<P: Presenter> CompanionApp<P> {
    pub fn new(
        character_name: impl Into<String>,
        max_turns: usize,
        pipeline: TurnPipeline,
        resolver: Arc<dyn AssetResolver>,
        voice: VoiceService,
        speech: SpeechInput,
        presenter: P,
    ) -> Self {
        let (tx, rx) = mpsc::channel::<UiEvent>(QUEUE_CAPACITY);
        Self {
            character_name: character_name.into(),
            pipeline,
            resolver,
            voice,
            speech,
            presenter,
            history: ConversationHistory::new(max_turns),
            state: CharacterState::new(),
            chat_visible: true,
            in_flight: false,
            listening: false,
            tx,
            rx,
        }
    }

    /// Handle for input sources to post events.
    pub fn sender(&self) -> mpsc::Sender<UiEvent> {
        self.tx.clone()
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn state(&self) -> &CharacterState {
        &self.state
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Show a random neutral asset before the first turn.
    pub fn show_initial_asset(&mut self) {
        self.apply_emotion(Emotion::Neutral);
    }

    /// Drain the queue until a quit event.
    pub async fn run(mut self) {
        self.show_initial_asset();
        while self.step().await {}
        tracing::info!(turns = self.history.len(), "companion stopped");
    }

    /// Handle the next queued event. Returns `false` once the loop should stop.
    pub async fn step(&mut self) -> bool {
        match self.rx.recv().await {
            Some(event) => self.handle(event),
            None => false,
        }
    }

    pub fn handle(&mut self, event: UiEvent) -> bool {
        match event {
            UiEvent::UserInput(text) => self.submit(text),
            UiEvent::MicRequested => self.start_listening(),
            UiEvent::Transcribed(text) => self.on_transcribed(text),
            UiEvent::TurnCompleted(reply) => self.on_completed(reply),
            UiEvent::TurnFailed(err) => self.on_failed(err),
            UiEvent::ToggleChat => {
                self.chat_visible = !self.chat_visible;
                self.presenter.set_chat_visible(self.chat_visible);
            }
            UiEvent::Quit => {
                self.presenter
                    .show_notice(&format!("{} waves goodbye.", self.character_name));
                return false;
            }
        }
        true
    }

    fn submit(&mut self, text: String) {
        let text = text.trim().to_string();
        if text.is_empty() {
            return;
        }
        if self.in_flight {
            self.presenter.show_notice(&format!(
                "{} is still answering, try again in a moment.",
                self.character_name
            ));
            return;
        }

        self.presenter.show_user(&text);
        self.history.append(Turn::user(text));
        self.in_flight = true;

        let snapshot = self.history.snapshot();
        let pipeline = self.pipeline.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let event = match pipeline.run(&snapshot).await {
                Ok(reply) => UiEvent::TurnCompleted(reply),
                Err(e) => UiEvent::TurnFailed(e),
            };
            if tx.send(event).await.is_err() {
                tracing::debug!("event loop gone, dropping turn result");
            }
        });
    }

    fn on_completed(&mut self, reply: ParsedReply) {
        self.in_flight = false;
        tracing::info!(emotion = %reply.emotion, chars = reply.text.len(), "reply received");

        if !reply.text.is_empty() {
            self.presenter.show_reply(&self.character_name, &reply.text);
            self.history.append(Turn::assistant(reply.text.clone()));
        }
        self.apply_emotion(reply.emotion);
        self.voice.speak_detached(reply.text);
    }

    fn on_failed(&mut self, err: LlmError) {
        self.in_flight = false;
        tracing::error!(error = %err, "completion failed");
        let message = if err.is_auth() {
            format!(
                "{} can't sign in to the chat service, check the API key. ({})",
                self.character_name, err
            )
        } else {
            format!("{} couldn't answer: {}", self.character_name, err)
        };
        self.presenter.show_error(&message);
    }

    fn apply_emotion(&mut self, emotion: Emotion) {
        self.state.set_emotion(emotion);
        let asset = self.resolver.resolve(emotion).into_option();
        if let Some(asset) = &asset {
            self.presenter.show_asset(asset);
        }
        self.state.set_asset(asset);
    }

    fn start_listening(&mut self) {
        if !self.speech.is_enabled() {
            self.presenter
                .show_notice("Speech input is not configured (set OPENAI_API_KEY).");
            return;
        }
        if self.listening {
            self.presenter.show_notice("Already listening.");
            return;
        }
        self.listening = true;
        self.presenter.show_notice("Listening...");

        let speech = self.speech.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let text = speech.listen().await;
            if tx.send(UiEvent::Transcribed(text)).await.is_err() {
                tracing::debug!("event loop gone, dropping transcription");
            }
        });
    }

    fn on_transcribed(&mut self, text: String) {
        self.listening = false;
        if text.trim().is_empty() {
            self.presenter.show_notice("Didn't catch that.");
            return;
        }
        self.submit(text);
    }
}

/// Forward terminal lines into the queue. End of input posts `Quit`.
pub fn spawn_stdin_reader(tx: mpsc::Sender<UiEvent>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let event = match lines.next_line().await {
                Ok(Some(line)) => match parse_input(&line) {
                    Some(event) => event,
                    None => continue,
                },
                Ok(None) => UiEvent::Quit,
                Err(e) => {
                    tracing::error!(error = %e, "failed to read input");
                    UiEvent::Quit
                }
            };
            let quit = matches!(event, UiEvent::Quit);
            if tx.send(event).await.is_err() || quit {
                break;
            }
        }
    })
}
