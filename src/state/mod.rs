pub mod clients;
pub mod clock;
pub mod devices;
pub mod elimination;
pub mod players;
pub mod questions;
pub mod scoring;
mod sse;
pub mod state_machine;

use std::sync::Arc;

use crate::{dao::content_store::ContentStore, services::trivia_runtime::TriviaHandle};

use self::devices::DeviceTracker;

pub use self::clients::ClientHub;
pub use self::sse::SseHub;

pub type SharedState = Arc<AppState>;

/// Buffered events per display stream before a slow reader starts lagging.
pub const DISPLAY_STREAM_CAPACITY: usize = 64;

/// Central application state: connections, the trivia actor, the content store
/// and the device tracker.
pub struct AppState {
    clients: Arc<ClientHub>,
    trivia: TriviaHandle,
    content: Arc<dyn ContentStore>,
    devices: DeviceTracker,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(
        clients: Arc<ClientHub>,
        trivia: TriviaHandle,
        content: Arc<dyn ContentStore>,
    ) -> SharedState {
        Arc::new(Self {
            clients,
            trivia,
            content,
            devices: DeviceTracker::new(),
        })
    }

    /// Live WebSocket connections and the display hub.
    pub fn clients(&self) -> &ClientHub {
        &self.clients
    }

    /// Front door of the trivia actor.
    pub fn trivia(&self) -> &TriviaHandle {
        &self.trivia
    }

    /// Content shown on the shared display.
    pub fn content(&self) -> Arc<dyn ContentStore> {
        self.content.clone()
    }

    /// Browsers seen through joins and heartbeats.
    pub fn devices(&self) -> &DeviceTracker {
        &self.devices
    }

    /// Hub used for the display SSE stream.
    pub fn display_sse(&self) -> &SseHub {
        self.clients.display()
    }
}

#[cfg(test)]
impl AppState {
    /// State over the built-in questions and the welcome slide. Needs a Tokio runtime.
    pub(crate) fn for_tests() -> SharedState {
        use crate::dao::content_store::InMemoryContentStore;

        Self::for_tests_with(Arc::new(InMemoryContentStore::with_welcome()))
    }

    /// State over the built-in questions and `content`. Needs a Tokio runtime.
    pub(crate) fn for_tests_with(content: Arc<dyn ContentStore>) -> SharedState {
        use crate::{
            config::TriviaSettings,
            state::{clock::SystemClock, questions::QuestionBank, state_machine::TriviaEngine},
        };

        let settings = TriviaSettings::default();
        let tick_period = settings.tick_period;
        let engine = TriviaEngine::new(
            settings,
            Arc::new(QuestionBank::builtin()),
            Arc::new(SystemClock),
        );
        let clients = Arc::new(ClientHub::new(DISPLAY_STREAM_CAPACITY));
        let (trivia, _task) = TriviaHandle::spawn(engine, tick_period, clients.clone());
        Self::new(clients, trivia, content)
    }
}
