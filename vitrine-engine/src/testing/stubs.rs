//! Scripted stand-ins for the network seams.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::sleep;
use vitrine_model::{CatalogDocument, ThemeRecord};

use crate::catalog::CatalogSource;
use crate::error::{EngineError, EngineResult};
use crate::favorites::{PreferenceRecord, PreferenceTransport};
use crate::theming::{ThemeActionRequest, ThemingApi};

/// One scripted transport response. An exhausted script hangs, which under
/// paused test time surfaces as a timeout settlement.
#[derive(Debug, Clone)]
pub enum Script {
    Ok {
        delay: Duration,
        record: PreferenceRecord,
    },
    Err {
        delay: Duration,
        error: EngineError,
    },
    Hang,
}

impl Script {
    /// Successful save (the record is ignored for saves).
    pub fn ok(delay: Duration) -> Self {
        Self::Ok {
            delay,
            record: PreferenceRecord::default(),
        }
    }

    /// Successful load carrying an encoded favorites string.
    pub fn ok_record(delay: Duration, favorites: &str) -> Self {
        Self::Ok {
            delay,
            record: PreferenceRecord {
                favorites: Some(favorites.to_string()),
            },
        }
    }

    pub fn err(delay: Duration, error: EngineError) -> Self {
        Self::Err { delay, error }
    }
}

async fn play(script: Option<Script>) -> EngineResult<PreferenceRecord> {
    match script {
        Some(Script::Ok { delay, record }) => {
            sleep(delay).await;
            Ok(record)
        }
        Some(Script::Err { delay, error }) => {
            sleep(delay).await;
            Err(error)
        }
        Some(Script::Hang) | None => std::future::pending().await,
    }
}

/// Preference transport driven by a queue of [`Script`]s per operation.
#[derive(Debug)]
pub struct ScriptedTransport {
    label: &'static str,
    loads: Mutex<VecDeque<Script>>,
    saves: Mutex<VecDeque<Script>>,
    load_calls: AtomicUsize,
    save_calls: AtomicUsize,
    recorded_saves: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            loads: Mutex::new(VecDeque::new()),
            saves: Mutex::new(VecDeque::new()),
            load_calls: AtomicUsize::new(0),
            save_calls: AtomicUsize::new(0),
            recorded_saves: Mutex::new(Vec::new()),
        }
    }

    pub fn push_load(&self, script: Script) {
        self.loads.lock().push_back(script);
    }

    pub fn push_save(&self, script: Script) {
        self.saves.lock().push_back(script);
    }

    pub fn load_calls(&self) -> usize {
        self.load_calls.load(Ordering::SeqCst)
    }

    pub fn save_calls(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    /// The favorites payloads this transport was asked to persist, in order.
    pub fn recorded_saves(&self) -> Vec<String> {
        self.recorded_saves.lock().clone()
    }
}

#[async_trait]
impl PreferenceTransport for ScriptedTransport {
    fn label(&self) -> &'static str {
        self.label
    }

    async fn load_preferences(&self) -> EngineResult<PreferenceRecord> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        let script = self.loads.lock().pop_front();
        play(script).await
    }

    async fn save_preferences(&self, favorites: &str) -> EngineResult<()> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        self.recorded_saves.lock().push(favorites.to_string());
        let script = self.saves.lock().pop_front();
        play(script).await.map(|_| ())
    }
}

/// Catalog source returning a fixed document or a fixed error.
#[derive(Debug)]
pub struct ScriptedCatalogSource {
    outcome: Result<Vec<ThemeRecord>, String>,
}

impl ScriptedCatalogSource {
    pub fn ok(themes: Vec<ThemeRecord>) -> Self {
        Self {
            outcome: Ok(themes),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
        }
    }
}

#[async_trait]
impl CatalogSource for ScriptedCatalogSource {
    async fn fetch_catalog(&self) -> EngineResult<CatalogDocument> {
        match &self.outcome {
            Ok(themes) => Ok(CatalogDocument {
                themes: themes.clone(),
            }),
            Err(message) => Err(EngineError::Network(message.clone())),
        }
    }
}

/// Theming API recording every request; outcomes are scripted per call and
/// default to success.
#[derive(Debug, Default)]
pub struct ScriptedThemingApi {
    requests: Mutex<Vec<ThemeActionRequest>>,
    outcomes: Mutex<VecDeque<EngineResult<()>>>,
}

impl ScriptedThemingApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_outcome(&self, outcome: EngineResult<()>) {
        self.outcomes.lock().push_back(outcome);
    }

    pub fn requests(&self) -> Vec<ThemeActionRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl ThemingApi for ScriptedThemingApi {
    async fn submit(&self, request: &ThemeActionRequest) -> EngineResult<()> {
        self.requests.lock().push(request.clone());
        self.outcomes.lock().pop_front().unwrap_or(Ok(()))
    }
}
