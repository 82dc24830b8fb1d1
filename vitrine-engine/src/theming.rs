//! Theme apply/remove requests and the progress vocabulary the dispatcher
//! reports while driving them.

use async_trait::async_trait;
use log::debug;
use vitrine_model::ThemeId;

use crate::api_client::ApiClient;
use crate::error::EngineResult;

const THEMING_PATH: &str = "themes/apply";

/// What to do with the target dashboard's theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeAction {
    Apply,
    Remove,
}

impl ThemeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Apply => "apply",
            Self::Remove => "remove",
        }
    }
}

/// One theming request. `theme_id` is `None` for removals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeActionRequest {
    pub dashboard: String,
    pub source_app: String,
    pub theme_id: Option<ThemeId>,
    pub action: ThemeAction,
}

/// The three user-visible steps of an apply/remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStep {
    Prepare,
    Submit,
    Refresh,
}

impl ActionStep {
    pub const ALL: [ActionStep; 3] = [Self::Prepare, Self::Submit, Self::Refresh];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStage {
    Pending,
    Active,
    Completed,
}

/// Progress stream emitted while an action runs. Steps advance with the real
/// request lifecycle, never on a fixed schedule.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Step { step: ActionStep, stage: StepStage },
    Completed,
    Failed { step: ActionStep, error: String },
}

/// Server-side theming endpoint.
#[async_trait]
pub trait ThemingApi: Send + Sync {
    async fn submit(&self, request: &ThemeActionRequest) -> EngineResult<()>;
}

/// Submits theming requests as form posts against the service API.
#[derive(Debug, Clone)]
pub struct HttpThemingApi {
    api: ApiClient,
}

impl HttpThemingApi {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ThemingApi for HttpThemingApi {
    async fn submit(&self, request: &ThemeActionRequest) -> EngineResult<()> {
        debug!(
            "[Theming] {} on dashboard {}",
            request.action.as_str(),
            request.dashboard
        );
        let mut fields = vec![
            ("dashboard", request.dashboard.as_str()),
            ("source_app", request.source_app.as_str()),
            ("action", request.action.as_str()),
            ("output_mode", "json"),
        ];
        if let Some(theme_id) = &request.theme_id {
            fields.push(("theme_id", theme_id.as_str()));
        }
        self.api.post_form(THEMING_PATH, &fields).await
    }
}
