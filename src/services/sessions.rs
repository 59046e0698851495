use crate::core::{Command, ControllerError, Event, FetchFailure, Quiz, StageController};
use crate::models::SessionView;
use crate::services::catalog::CatalogService;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Errors surfaced by the session store
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(Uuid),

    #[error(transparent)]
    Rejected(#[from] ControllerError),
}

type SessionHandle = Arc<Mutex<StageController>>;

/// In-memory registry of live sessions
///
/// Each session is a `StageController` behind its own mutex. The lock is
/// released while a catalog call is in flight; completions carry the ticket
/// of the generation that issued them, so a restart in the meantime wins.
/// Catalog calls run on their own task so a completion is applied even when
/// the request that triggered it goes away.
pub struct SessionStore {
    sessions: moka::future::Cache<Uuid, SessionHandle>,
    catalog: Arc<dyn CatalogService>,
    quiz: Arc<Quiz>,
}

impl SessionStore {
    /// Create a new session store
    pub fn new(
        catalog: Arc<dyn CatalogService>,
        quiz: Arc<Quiz>,
        max_sessions: u64,
        idle_ttl_secs: u64,
    ) -> Self {
        let sessions = moka::future::CacheBuilder::new(max_sessions)
            .time_to_idle(Duration::from_secs(idle_ttl_secs))
            .build();

        Self {
            sessions,
            catalog,
            quiz,
        }
    }

    pub fn quiz(&self) -> &Arc<Quiz> {
        &self.quiz
    }

    pub fn active_sessions(&self) -> u64 {
        self.sessions.entry_count()
    }

    /// Start a new session at the first question
    pub async fn create(&self) -> SessionView {
        let id = Uuid::new_v4();
        let (controller, command) = StageController::new(Arc::clone(&self.quiz));
        let handle: SessionHandle = Arc::new(Mutex::new(controller));
        self.sessions.insert(id, Arc::clone(&handle)).await;

        tracing::info!("Created session {}", id);

        self.run(id, &handle, command).await;
        Self::render(id, &handle).await
    }

    /// Current view of a session
    pub async fn view(&self, id: Uuid) -> Result<SessionView, SessionError> {
        let handle = self.handle(id).await?;
        Ok(Self::render(id, &handle).await)
    }

    /// Apply a user event and run whatever remote calls it triggers
    pub async fn dispatch(&self, id: Uuid, event: Event) -> Result<SessionView, SessionError> {
        let handle = self.handle(id).await?;

        let command = {
            let mut controller = handle.lock().await;
            controller.dispatch(event)?
        };

        self.run(id, &handle, command).await;
        Ok(Self::render(id, &handle).await)
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), SessionError> {
        match self.sessions.remove(&id).await {
            Some(_) => {
                tracing::info!("Removed session {}", id);
                Ok(())
            }
            None => Err(SessionError::NotFound(id)),
        }
    }

    async fn handle(&self, id: Uuid) -> Result<SessionHandle, SessionError> {
        self.sessions.get(&id).await.ok_or(SessionError::NotFound(id))
    }

    async fn render(id: Uuid, handle: &SessionHandle) -> SessionView {
        let controller = handle.lock().await;
        SessionView::render(id, controller.state())
    }

    /// Drive `command` on a detached task and wait for it to settle
    async fn run(&self, id: Uuid, handle: &SessionHandle, command: Option<Command>) {
        let Some(command) = command else {
            return;
        };

        let task = tokio::spawn(Self::drive(
            Arc::clone(&self.catalog),
            id,
            Arc::clone(handle),
            command,
        ));

        if let Err(e) = task.await {
            tracing::error!("Session {}: catalog task failed: {}", id, e);
        }
    }

    /// Execute commands until the controller stops asking for more
    async fn drive(
        catalog: Arc<dyn CatalogService>,
        id: Uuid,
        handle: SessionHandle,
        command: Command,
    ) {
        let mut command = Some(command);
        while let Some(cmd) = command.take() {
            let completion = Self::execute(catalog.as_ref(), id, cmd).await;

            let mut controller = handle.lock().await;
            command = match controller.dispatch(completion) {
                Ok(next) => next,
                Err(e) => {
                    tracing::warn!("Session {} rejected completion: {}", id, e);
                    None
                }
            };
        }
    }

    async fn execute(catalog: &dyn CatalogService, id: Uuid, command: Command) -> Event {
        match command {
            Command::FetchCandidates { ticket, answers } => {
                let outcome = catalog.fetch_candidates(&answers).await.map_err(|e| {
                    tracing::error!("Session {}: failed to fetch swipe candidates: {}", id, e);
                    FetchFailure::CandidatesFetchFailed
                });
                Event::CandidatesLoaded { ticket, outcome }
            }
            Command::FetchRecommendations { ticket, liked, gender } => {
                let outcome = catalog
                    .fetch_recommendations(&liked, gender.as_deref())
                    .await
                    .map_err(|e| {
                        tracing::error!("Session {}: failed to fetch recommendations: {}", id, e);
                        FetchFailure::RecommendationsFetchFailed
                    });
                Event::RecommendationsLoaded { ticket, outcome }
            }
        }
    }
}
