//! Favorites synchronizer: dual-transport persistence with first-settlement
//! arbitration and optimistic local updates.
//!
//! Loads and saves race the primary service transport against a plain REST
//! fallback. The fallback joins after a grace period, or immediately when the
//! primary errors. Whichever settlement claims the shared [`SyncAttempt`]
//! first wins; everything later is discarded. A hard timeout settles the
//! attempt as failure so the gallery never blocks on a hung transport.

pub mod attempt;
pub mod transport;

pub use attempt::SyncAttempt;
pub use transport::{PreferenceRecord, PreferenceTransport, RestPreferenceStore, ServicePreferenceStore};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, warn};
use parking_lot::RwLock;
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep, timeout};
use vitrine_model::{FavoriteSet, ThemeId};

use crate::config::SyncTunables;

/// How an attempt settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Success,
    Failure,
}

/// Lifecycle of the synchronizer, observable by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    Loading,
    Saving,
    Settled(SyncOutcome),
}

#[derive(Debug)]
struct LoadSettlement {
    outcome: SyncOutcome,
    favorites: FavoriteSet,
}

#[derive(Debug, Clone, Copy)]
enum SaveSettlement {
    Success,
    Failure,
}

struct SyncInner {
    primary: Arc<dyn PreferenceTransport>,
    fallback: Arc<dyn PreferenceTransport>,
    tunables: SyncTunables,
    favorites: RwLock<FavoriteSet>,
    phase: RwLock<SyncPhase>,
    ever_settled: AtomicBool,
    inflight_load: tokio::sync::Mutex<Option<watch::Receiver<bool>>>,
    nudge: mpsc::UnboundedSender<()>,
}

impl std::fmt::Debug for SyncInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncInner")
            .field("phase", &*self.phase.read())
            .field("favorites", &*self.favorites.read())
            .finish_non_exhaustive()
    }
}

/// Cheaply cloneable handle; all clones share one set of favorites and one
/// in-flight attempt.
#[derive(Debug, Clone)]
pub struct FavoritesSynchronizer {
    inner: Arc<SyncInner>,
}

impl FavoritesSynchronizer {
    /// `nudge` is poked whenever a background settlement changes the set, so
    /// the owner can re-render.
    pub fn new(
        primary: Arc<dyn PreferenceTransport>,
        fallback: Arc<dyn PreferenceTransport>,
        tunables: SyncTunables,
        nudge: mpsc::UnboundedSender<()>,
    ) -> Self {
        Self {
            inner: Arc::new(SyncInner {
                primary,
                fallback,
                tunables,
                favorites: RwLock::new(FavoriteSet::default()),
                phase: RwLock::new(SyncPhase::Idle),
                ever_settled: AtomicBool::new(false),
                inflight_load: tokio::sync::Mutex::new(None),
                nudge,
            }),
        }
    }

    /// Whether any load has reached a terminal state. Gates the first render.
    pub fn is_settled(&self) -> bool {
        self.inner.ever_settled.load(Ordering::SeqCst)
    }

    pub fn phase(&self) -> SyncPhase {
        *self.inner.phase.read()
    }

    pub fn snapshot(&self) -> FavoriteSet {
        self.inner.favorites.read().clone()
    }

    pub fn contains(&self, id: &ThemeId) -> bool {
        self.inner.favorites.read().contains(id)
    }

    /// Flip membership locally and return the resulting set. No network; the
    /// caller renders immediately and persists via [`Self::spawn_save`].
    pub fn toggle_local(&self, id: &ThemeId) -> FavoriteSet {
        let mut favorites = self.inner.favorites.write();
        let now_favorite = favorites.toggle(id);
        debug!("[Favorites] toggled {id} -> favorite={now_favorite}");
        favorites.clone()
    }

    /// Load the persisted set. Concurrent callers join the attempt already
    /// in flight instead of spawning competing ones.
    pub async fn load(&self) {
        let mut guard = self.inner.inflight_load.lock().await;
        if let Some(rx) = guard.as_ref() {
            let mut rx = rx.clone();
            drop(guard);
            debug!("[Favorites] joining in-flight load");
            let _ = rx.wait_for(|done| *done).await;
            return;
        }

        let (done_tx, done_rx) = watch::channel(false);
        *guard = Some(done_rx);
        drop(guard);

        self.run_load().await;

        let _ = done_tx.send(true);
        *self.inner.inflight_load.lock().await = None;
    }

    async fn run_load(&self) {
        self.set_phase(SyncPhase::Loading);

        let attempt = Arc::new(SyncAttempt::new());
        let fallback_started = Arc::new(AtomicBool::new(false));
        let (settle_tx, mut settle_rx) = mpsc::channel::<LoadSettlement>(2);

        {
            let primary = Arc::clone(&self.inner.primary);
            let fallback = Arc::clone(&self.inner.fallback);
            let attempt = Arc::clone(&attempt);
            let fallback_started = Arc::clone(&fallback_started);
            let settle_tx = settle_tx.clone();
            tokio::spawn(async move {
                match primary.load_preferences().await {
                    Ok(record) => {
                        if attempt.claim() {
                            let _ = settle_tx.send(settlement_from(record)).await;
                        } else {
                            debug!("[Favorites] {} load result discarded (already settled)", primary.label());
                        }
                    }
                    Err(err) => {
                        warn!("[Favorites] {} load failed: {err}", primary.label());
                        if !fallback_started.swap(true, Ordering::SeqCst) {
                            fallback_load(fallback, attempt, settle_tx).await;
                        }
                    }
                }
            });
        }

        {
            let fallback = Arc::clone(&self.inner.fallback);
            let attempt = Arc::clone(&attempt);
            let fallback_started = Arc::clone(&fallback_started);
            let settle_tx = settle_tx.clone();
            let grace = self.inner.tunables.fallback_grace();
            tokio::spawn(async move {
                sleep(grace).await;
                if attempt.is_settled() || fallback_started.swap(true, Ordering::SeqCst) {
                    return;
                }
                debug!("[Favorites] grace elapsed; starting {} load", fallback.label());
                fallback_load(fallback, attempt, settle_tx).await;
            });
        }

        drop(settle_tx);

        let settlement = match timeout(self.inner.tunables.settle_timeout(), settle_rx.recv()).await
        {
            Ok(Some(settlement)) => settlement,
            Ok(None) | Err(_) => {
                attempt.claim();
                let timeout = self.inner.tunables.settle_timeout();
                warn!(
                    "[Favorites] load: {}; treating as empty",
                    crate::error::EngineError::TimeoutExhausted { timeout }
                );
                LoadSettlement {
                    outcome: SyncOutcome::Failure,
                    favorites: FavoriteSet::default(),
                }
            }
        };

        *self.inner.favorites.write() = settlement.favorites;
        self.set_phase(SyncPhase::Settled(settlement.outcome));
        self.inner.ever_settled.store(true, Ordering::SeqCst);
        let _ = self.inner.nudge.send(());
    }

    /// Persist a snapshot in the background.
    pub fn spawn_save(&self, snapshot: FavoriteSet) {
        let this = self.clone();
        tokio::spawn(async move {
            this.run_save(snapshot).await;
        });
    }

    async fn run_save(&self, snapshot: FavoriteSet) {
        self.set_phase(SyncPhase::Saving);
        let payload = snapshot.encode();

        let attempt = Arc::new(SyncAttempt::new());
        let fallback_started = Arc::new(AtomicBool::new(false));
        let (settle_tx, mut settle_rx) = mpsc::channel::<SaveSettlement>(2);

        {
            let primary = Arc::clone(&self.inner.primary);
            let fallback = Arc::clone(&self.inner.fallback);
            let attempt = Arc::clone(&attempt);
            let fallback_started = Arc::clone(&fallback_started);
            let settle_tx = settle_tx.clone();
            let payload = payload.clone();
            tokio::spawn(async move {
                match primary.save_preferences(&payload).await {
                    Ok(()) => {
                        if attempt.claim() {
                            let _ = settle_tx.send(SaveSettlement::Success).await;
                        } else {
                            debug!("[Favorites] {} save result discarded (already settled)", primary.label());
                        }
                    }
                    Err(err) => {
                        warn!("[Favorites] {} save failed: {err}", primary.label());
                        if !fallback_started.swap(true, Ordering::SeqCst) {
                            fallback_save(fallback, attempt, settle_tx, payload).await;
                        }
                    }
                }
            });
        }

        {
            let fallback = Arc::clone(&self.inner.fallback);
            let attempt = Arc::clone(&attempt);
            let fallback_started = Arc::clone(&fallback_started);
            let settle_tx = settle_tx.clone();
            let payload = payload.clone();
            let grace = self.inner.tunables.save_grace();
            tokio::spawn(async move {
                sleep(grace).await;
                if attempt.is_settled() || fallback_started.swap(true, Ordering::SeqCst) {
                    return;
                }
                debug!("[Favorites] grace elapsed; starting {} save", fallback.label());
                fallback_save(fallback, attempt, settle_tx, payload).await;
            });
        }

        drop(settle_tx);

        let outcome = match timeout(self.inner.tunables.settle_timeout(), settle_rx.recv()).await {
            Ok(Some(SaveSettlement::Success)) => SyncOutcome::Success,
            Ok(Some(SaveSettlement::Failure)) => SyncOutcome::Failure,
            Ok(None) | Err(_) => {
                attempt.claim();
                let timeout = self.inner.tunables.settle_timeout();
                warn!(
                    "[Favorites] save: {}",
                    crate::error::EngineError::TimeoutExhausted { timeout }
                );
                SyncOutcome::Failure
            }
        };

        self.set_phase(SyncPhase::Settled(outcome));

        match outcome {
            SyncOutcome::Success => {
                // Reconciling reload, delayed so rapid toggles can coalesce.
                sleep(self.inner.tunables.reconcile_delay()).await;
                self.load().await;
            }
            SyncOutcome::Failure => {
                warn!("[Favorites] save failed; reloading to roll back optimistic state");
                self.load().await;
            }
        }
    }

    fn set_phase(&self, phase: SyncPhase) {
        *self.inner.phase.write() = phase;
    }
}

fn settlement_from(record: PreferenceRecord) -> LoadSettlement {
    let favorites = record
        .favorites
        .map(|raw| FavoriteSet::decode(&raw))
        .unwrap_or_default();
    LoadSettlement {
        outcome: SyncOutcome::Success,
        favorites,
    }
}

async fn fallback_load(
    fallback: Arc<dyn PreferenceTransport>,
    attempt: Arc<SyncAttempt>,
    settle_tx: mpsc::Sender<LoadSettlement>,
) {
    match fallback.load_preferences().await {
        Ok(record) => {
            if attempt.claim() {
                let _ = settle_tx.send(settlement_from(record)).await;
            } else {
                debug!("[Favorites] {} load result discarded (already settled)", fallback.label());
            }
        }
        Err(err) => {
            warn!("[Favorites] {} load failed: {err}", fallback.label());
            if attempt.claim() {
                let _ = settle_tx
                    .send(LoadSettlement {
                        outcome: SyncOutcome::Failure,
                        favorites: FavoriteSet::default(),
                    })
                    .await;
            }
        }
    }
}

async fn fallback_save(
    fallback: Arc<dyn PreferenceTransport>,
    attempt: Arc<SyncAttempt>,
    settle_tx: mpsc::Sender<SaveSettlement>,
    payload: String,
) {
    match fallback.save_preferences(&payload).await {
        Ok(()) => {
            if attempt.claim() {
                let _ = settle_tx.send(SaveSettlement::Success).await;
            } else {
                debug!("[Favorites] {} save result discarded (already settled)", fallback.label());
            }
        }
        Err(err) => {
            warn!("[Favorites] {} save failed: {err}", fallback.label());
            if attempt.claim() {
                let _ = settle_tx.send(SaveSettlement::Failure).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::testing::stubs::{Script, ScriptedTransport};
    use std::time::Duration;

    fn tunables() -> SyncTunables {
        SyncTunables::default()
    }

    fn synchronizer(
        primary: ScriptedTransport,
        fallback: ScriptedTransport,
        tunables: SyncTunables,
    ) -> (FavoritesSynchronizer, Arc<ScriptedTransport>, Arc<ScriptedTransport>) {
        let primary = Arc::new(primary);
        let fallback = Arc::new(fallback);
        let (nudge_tx, _nudge_rx) = mpsc::unbounded_channel();
        let sync = FavoritesSynchronizer::new(
            Arc::clone(&primary) as Arc<dyn PreferenceTransport>,
            Arc::clone(&fallback) as Arc<dyn PreferenceTransport>,
            tunables,
            nudge_tx,
        );
        (sync, primary, fallback)
    }

    fn ids(sync: &FavoritesSynchronizer) -> Vec<String> {
        sync.snapshot().iter().map(|id| id.to_string()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn primary_load_wins_within_grace() {
        let primary = ScriptedTransport::new("primary");
        primary.push_load(Script::ok_record(Duration::from_millis(50), "t1,t2"));
        let fallback = ScriptedTransport::new("fallback");
        fallback.push_load(Script::ok_record(Duration::from_millis(5), "t9"));

        let (sync, _, fallback) = synchronizer(primary, fallback, tunables());
        sync.load().await;

        assert_eq!(ids(&sync), vec!["t1", "t2"]);
        assert_eq!(sync.phase(), SyncPhase::Settled(SyncOutcome::Success));
        // The fallback never started: primary settled inside the grace window.
        assert_eq!(fallback.load_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn first_settlement_wins_and_the_loser_is_discarded() {
        let mut tunables = tunables();
        tunables.fallback_grace_ms = 0;

        let primary = ScriptedTransport::new("primary");
        primary.push_load(Script::ok_record(Duration::from_millis(50), "t1,t2"));
        let fallback = ScriptedTransport::new("fallback");
        fallback.push_load(Script::ok_record(Duration::from_millis(80), "t3"));

        let (sync, _, fallback) = synchronizer(primary, fallback, tunables);
        sync.load().await;

        // Primary settled at 50ms; the fallback's 80ms result must not
        // overwrite it.
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(ids(&sync), vec!["t1", "t2"]);
        assert_eq!(fallback.load_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn primary_error_starts_fallback_immediately() {
        let primary = ScriptedTransport::new("primary");
        primary.push_load(Script::err(
            Duration::from_millis(10),
            EngineError::Network("boom".into()),
        ));
        let fallback = ScriptedTransport::new("fallback");
        fallback.push_load(Script::ok_record(Duration::from_millis(10), "t5"));

        let (sync, _, _) = synchronizer(primary, fallback, tunables());
        let started = tokio::time::Instant::now();
        sync.load().await;

        // Settled at ~20ms, far before the 1000ms grace would have fired.
        assert!(started.elapsed() < Duration::from_millis(100));
        assert_eq!(ids(&sync), vec!["t5"]);
        assert_eq!(sync.phase(), SyncPhase::Settled(SyncOutcome::Success));
    }

    #[tokio::test(start_paused = true)]
    async fn both_transports_hung_settles_empty_at_the_timeout() {
        let primary = ScriptedTransport::new("primary");
        primary.push_load(Script::Hang);
        let fallback = ScriptedTransport::new("fallback");
        fallback.push_load(Script::Hang);

        let (sync, _, _) = synchronizer(primary, fallback, tunables());
        let started = tokio::time::Instant::now();
        sync.load().await;

        assert_eq!(started.elapsed(), Duration::from_millis(3000));
        assert!(sync.snapshot().is_empty());
        assert!(sync.is_settled());
        assert_eq!(sync.phase(), SyncPhase::Settled(SyncOutcome::Failure));
    }

    #[tokio::test(start_paused = true)]
    async fn both_transports_failing_settles_empty_failure() {
        let primary = ScriptedTransport::new("primary");
        primary.push_load(Script::err(
            Duration::from_millis(5),
            EngineError::Network("down".into()),
        ));
        let fallback = ScriptedTransport::new("fallback");
        fallback.push_load(Script::err(
            Duration::from_millis(5),
            EngineError::Network("also down".into()),
        ));

        let (sync, _, _) = synchronizer(primary, fallback, tunables());
        sync.load().await;

        assert!(sync.snapshot().is_empty());
        assert_eq!(sync.phase(), SyncPhase::Settled(SyncOutcome::Failure));
    }

    #[tokio::test(start_paused = true)]
    async fn missing_favorites_field_means_empty_set() {
        let primary = ScriptedTransport::new("primary");
        primary.push_load(Script::Ok {
            delay: Duration::from_millis(5),
            record: PreferenceRecord { favorites: None },
        });
        let fallback = ScriptedTransport::new("fallback");

        let (sync, _, _) = synchronizer(primary, fallback, tunables());
        sync.load().await;

        assert!(sync.snapshot().is_empty());
        assert_eq!(sync.phase(), SyncPhase::Settled(SyncOutcome::Success));
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_loads_share_one_attempt() {
        let primary = ScriptedTransport::new("primary");
        primary.push_load(Script::ok_record(Duration::from_millis(50), "t1"));
        let fallback = ScriptedTransport::new("fallback");

        let (sync, primary, _) = synchronizer(primary, fallback, tunables());
        let a = sync.clone();
        let b = sync.clone();
        tokio::join!(a.load(), b.load());

        assert_eq!(primary.load_calls(), 1);
        assert_eq!(ids(&sync), vec!["t1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn save_success_reconciles_after_the_delay() {
        let primary = ScriptedTransport::new("primary");
        primary.push_save(Script::ok(Duration::from_millis(10)));
        primary.push_load(Script::ok_record(Duration::from_millis(10), "t1,t2"));
        let fallback = ScriptedTransport::new("fallback");

        let (sync, primary, _) = synchronizer(primary, fallback, tunables());
        let snapshot = sync.toggle_local(&ThemeId::from("t1"));
        sync.spawn_save(snapshot);

        tokio::time::sleep(Duration::from_millis(5000)).await;

        assert_eq!(primary.save_calls(), 1);
        assert_eq!(primary.recorded_saves(), vec!["t1".to_string()]);
        // The reconciling reload replaced local state with the server's.
        assert_eq!(ids(&sync), vec!["t1", "t2"]);
        assert_eq!(sync.phase(), SyncPhase::Settled(SyncOutcome::Success));
    }

    #[tokio::test(start_paused = true)]
    async fn save_failure_rolls_back_by_reloading() {
        let primary = ScriptedTransport::new("primary");
        primary.push_save(Script::err(
            Duration::from_millis(10),
            EngineError::Network("write refused".into()),
        ));
        primary.push_load(Script::ok_record(Duration::from_millis(10), ""));
        let fallback = ScriptedTransport::new("fallback");
        fallback.push_save(Script::err(
            Duration::from_millis(10),
            EngineError::Network("write refused".into()),
        ));

        let (sync, _, _) = synchronizer(primary, fallback, tunables());
        let snapshot = sync.toggle_local(&ThemeId::from("t1"));
        assert!(sync.contains(&ThemeId::from("t1")));
        sync.spawn_save(snapshot);

        tokio::time::sleep(Duration::from_millis(5000)).await;

        // Rollback: the optimistic toggle is gone again.
        assert!(!sync.contains(&ThemeId::from("t1")));
    }
}
