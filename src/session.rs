// Analysis session controller
//
// Three request kinds (normal, unoptimized, comparison pair) can be in flight
// at once. Only one result variant is displayed at a time: starting a request
// clears the other variants, and each resolution clears them again. The last
// request to *resolve* wins, regardless of which was issued last.
//
// Known quirk: a slow normal analysis resolving after a fast comparison
// replaces the comparison view.
//
// Completions that are ready in the same turn are applied in issue order.
use crate::client::{AnalyzerClient, ClientError};
use crate::models::{AnalysisResult, AnalysisWithMetrics};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Normal,
    Unoptimized,
    Comparison,
}

impl RequestKind {
    pub fn name(&self) -> &'static str {
        match self {
            RequestKind::Normal => "normal",
            RequestKind::Unoptimized => "unoptimized",
            RequestKind::Comparison => "comparison",
        }
    }
}

/// The result currently on display.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum ResultVariant {
    #[default]
    None,
    Normal(AnalysisResult),
    Unoptimized(AnalysisWithMetrics),
    Comparison {
        optimized: AnalysisWithMetrics,
        unoptimized: AnalysisWithMetrics,
    },
}

impl ResultVariant {
    pub fn kind(&self) -> Option<RequestKind> {
        match self {
            ResultVariant::None => None,
            ResultVariant::Normal(_) => Some(RequestKind::Normal),
            ResultVariant::Unoptimized(_) => Some(RequestKind::Unoptimized),
            ResultVariant::Comparison { .. } => Some(RequestKind::Comparison),
        }
    }

    #[allow(dead_code)]
    pub fn normal(&self) -> Option<&AnalysisResult> {
        match self {
            ResultVariant::Normal(result) => Some(result),
            _ => None,
        }
    }

    #[allow(dead_code)]
    pub fn unoptimized(&self) -> Option<&AnalysisWithMetrics> {
        match self {
            ResultVariant::Unoptimized(result) => Some(result),
            _ => None,
        }
    }

    #[allow(dead_code)]
    pub fn comparison(&self) -> Option<(&AnalysisWithMetrics, &AnalysisWithMetrics)> {
        match self {
            ResultVariant::Comparison {
                optimized,
                unoptimized,
            } => Some((optimized, unoptimized)),
            _ => None,
        }
    }
}

/// One loading flag per request kind. Flags never block each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InFlight {
    pub normal: bool,
    pub unoptimized: bool,
    pub comparison: bool,
}

impl InFlight {
    #[allow(dead_code)]
    pub fn get(&self, kind: RequestKind) -> bool {
        match kind {
            RequestKind::Normal => self.normal,
            RequestKind::Unoptimized => self.unoptimized,
            RequestKind::Comparison => self.comparison,
        }
    }

    fn set(&mut self, kind: RequestKind, value: bool) {
        match kind {
            RequestKind::Normal => self.normal = value,
            RequestKind::Unoptimized => self.unoptimized = value,
            RequestKind::Comparison => self.comparison = value,
        }
    }

    #[allow(dead_code)]
    pub fn any(&self) -> bool {
        self.normal || self.unoptimized || self.comparison
    }
}

/// What a finished request produced, before it is folded into the state.
#[derive(Debug)]
pub enum Outcome {
    Normal(Result<AnalysisResult, ClientError>),
    Unoptimized(Result<AnalysisWithMetrics, ClientError>),
    Comparison(Result<(AnalysisWithMetrics, AnalysisWithMetrics), ClientError>),
}

impl Outcome {
    pub fn kind(&self) -> RequestKind {
        match self {
            Outcome::Normal(_) => RequestKind::Normal,
            Outcome::Unoptimized(_) => RequestKind::Unoptimized,
            Outcome::Comparison(_) => RequestKind::Comparison,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionState {
    pub displayed: ResultVariant,
    pub in_flight: InFlight,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `kind` as loading and clear every other variant.
    pub fn start(mut self, kind: RequestKind) -> Self {
        self.in_flight.set(kind, true);
        if self.displayed.kind() != Some(kind) {
            self.displayed = ResultVariant::None;
        }
        self
    }

    /// Fold a finished request into the state.
    ///
    /// Transport failures of single requests become synthetic failure
    /// payloads. A failed comparison leg drops the whole pair.
    pub fn resolve(mut self, outcome: Outcome) -> Self {
        self.in_flight.set(outcome.kind(), false);

        self.displayed = match outcome {
            Outcome::Normal(Ok(result)) => ResultVariant::Normal(result),
            Outcome::Normal(Err(e)) => {
                warn!("Normal analysis failed: {}", e);
                ResultVariant::Normal(AnalysisResult::connection_failure())
            }
            Outcome::Unoptimized(Ok(result)) => ResultVariant::Unoptimized(result),
            Outcome::Unoptimized(Err(e)) => {
                warn!("Unoptimized analysis failed: {}", e);
                ResultVariant::Unoptimized(AnalysisWithMetrics::connection_failure())
            }
            Outcome::Comparison(Ok((optimized, unoptimized))) => ResultVariant::Comparison {
                optimized,
                unoptimized,
            },
            Outcome::Comparison(Err(e)) => {
                warn!("Performance comparison failed: {}", e);
                match self.displayed {
                    ResultVariant::Comparison { .. } => ResultVariant::None,
                    other => other,
                }
            }
        };

        self
    }
}

/// Run one request kind against the analyzer.
///
/// The comparison issues both legs concurrently and waits for both.
pub async fn run_request<C>(client: &C, kind: RequestKind, code: &str) -> Outcome
where
    C: AnalyzerClient + ?Sized,
{
    match kind {
        RequestKind::Normal => Outcome::Normal(client.analyze(code).await),
        RequestKind::Unoptimized => Outcome::Unoptimized(client.analyze_unoptimized(code).await),
        RequestKind::Comparison => {
            let (optimized, unoptimized) = futures::future::join(
                client.analyze_optimized(code),
                client.analyze_unoptimized(code),
            )
            .await;
            Outcome::Comparison(optimized.and_then(|o| unoptimized.map(|u| (o, u))))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RequestId(u64);

struct Completion {
    id: RequestId,
    outcome: Outcome,
}

/// Issues requests in the background and applies their results to a
/// [`SessionState`] at well-defined resolution points.
pub struct SessionController<C: AnalyzerClient + 'static> {
    client: Arc<C>,
    state: SessionState,
    next_id: u64,
    pending: usize,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
}

impl<C: AnalyzerClient + 'static> SessionController<C> {
    pub fn new(client: C) -> Self {
        Self::with_client(Arc::new(client))
    }

    pub fn with_client(client: Arc<C>) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            client,
            state: SessionState::new(),
            next_id: 0,
            pending: 0,
            completions_tx,
            completions_rx,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[allow(dead_code)]
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Start a request without waiting for it.
    pub fn submit(&mut self, kind: RequestKind, code: &str) -> RequestId {
        let id = RequestId(self.next_id);
        self.next_id += 1;
        self.pending += 1;
        self.state = std::mem::take(&mut self.state).start(kind);
        debug!("Submitted {} request #{}", kind.name(), id.0);

        let client = Arc::clone(&self.client);
        let tx = self.completions_tx.clone();
        let code = code.to_string();
        tokio::spawn(async move {
            let outcome = run_request(client.as_ref(), kind, &code).await;
            // The receiver lives as long as the controller; a send error only
            // means the controller was dropped.
            let _ = tx.send(Completion { id, outcome });
        });

        id
    }

    /// Wait for at least one request to finish and apply every completion
    /// that is ready, in issue order. Returns the ids applied, or `None` when
    /// nothing is pending.
    pub async fn next_resolution(&mut self) -> Option<Vec<RequestId>> {
        if self.pending == 0 {
            return None;
        }

        let first = self.completions_rx.recv().await?;
        let mut batch = vec![first];
        while let Ok(completion) = self.completions_rx.try_recv() {
            batch.push(completion);
        }
        batch.sort_by_key(|c| c.id);

        let mut applied = Vec::with_capacity(batch.len());
        for Completion { id, outcome } in batch {
            debug!("Resolved {} request #{}", outcome.kind().name(), id.0);
            self.state = std::mem::take(&mut self.state).resolve(outcome);
            self.pending -= 1;
            applied.push(id);
        }
        Some(applied)
    }

    /// Resolve everything currently pending.
    #[allow(dead_code)]
    pub async fn settle(&mut self) -> &SessionState {
        while self.next_resolution().await.is_some() {}
        &self.state
    }

    async fn request(&mut self, kind: RequestKind, code: &str) -> &SessionState {
        let id = self.submit(kind, code);
        while let Some(applied) = self.next_resolution().await {
            if applied.contains(&id) {
                break;
            }
        }
        &self.state
    }

    pub async fn request_normal(&mut self, code: &str) -> &SessionState {
        self.request(RequestKind::Normal, code).await
    }

    pub async fn request_unoptimized(&mut self, code: &str) -> &SessionState {
        self.request(RequestKind::Unoptimized, code).await
    }

    pub async fn request_comparison(&mut self, code: &str) -> &SessionState {
        self.request(RequestKind::Comparison, code).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PerformanceMetrics, Token, CONNECTION_ERROR_MESSAGE};
    use crate::token_classifier::{classify, TokenCategory};
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::Semaphore;

    const SAMPLE: &str = "let a: number = 0; do { a = 1; } while (a === 1);";

    /// In-memory analyzer. Each endpoint waits on its own gate, so tests
    /// decide in which order responses arrive.
    struct ScriptedClient {
        normal_ok: bool,
        optimized_ok: bool,
        unoptimized_ok: bool,
        normal_gate: Semaphore,
        optimized_gate: Semaphore,
        unoptimized_gate: Semaphore,
    }

    impl ScriptedClient {
        fn open() -> Self {
            Self::gated(Semaphore::MAX_PERMITS)
        }

        fn gated(permits: usize) -> Self {
            Self {
                normal_ok: true,
                optimized_ok: true,
                unoptimized_ok: true,
                normal_gate: Semaphore::new(permits),
                optimized_gate: Semaphore::new(permits),
                unoptimized_gate: Semaphore::new(permits),
            }
        }
    }

    fn transport_error() -> ClientError {
        ClientError::Transport {
            url: "http://localhost:8080".to_string(),
            reason: "connection refused".to_string(),
        }
    }

    fn sample_result() -> AnalysisResult {
        let token = |kind: &str, value: &str, position: usize| Token {
            kind: kind.to_string(),
            value: value.to_string(),
            position,
            line: 1,
            column: position + 1,
        };
        AnalysisResult {
            is_valid: true,
            tokens: vec![
                token("KEYWORD", "let", 0),
                token("IDENTIFIER", "a", 4),
                token("COLON", ":", 5),
                token("TYPE", "number", 7),
            ],
            syntax_errors: vec![],
            semantic_info: vec!["✓ Variable 'a' declarada correctamente".to_string()],
        }
    }

    fn with_metrics(time: &str) -> AnalysisWithMetrics {
        AnalysisWithMetrics {
            analysis: sample_result(),
            metrics: PerformanceMetrics {
                execution_time: time.to_string(),
                ..PerformanceMetrics::zeroed()
            },
        }
    }

    #[async_trait]
    impl AnalyzerClient for ScriptedClient {
        async fn analyze(&self, _code: &str) -> Result<AnalysisResult, ClientError> {
            self.normal_gate.acquire().await.unwrap().forget();
            if self.normal_ok {
                Ok(sample_result())
            } else {
                Err(transport_error())
            }
        }

        async fn analyze_optimized(&self, _code: &str) -> Result<AnalysisWithMetrics, ClientError> {
            self.optimized_gate.acquire().await.unwrap().forget();
            if self.optimized_ok {
                Ok(with_metrics("100ms"))
            } else {
                Err(transport_error())
            }
        }

        async fn analyze_unoptimized(
            &self,
            _code: &str,
        ) -> Result<AnalysisWithMetrics, ClientError> {
            self.unoptimized_gate.acquire().await.unwrap().forget();
            if self.unoptimized_ok {
                Ok(with_metrics("200ms"))
            } else {
                Err(transport_error())
            }
        }
    }

    async fn let_tasks_run() {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    #[test]
    fn test_start_clears_other_variants() {
        let state = SessionState {
            displayed: ResultVariant::Normal(sample_result()),
            in_flight: InFlight::default(),
        };

        let kept = state.clone().start(RequestKind::Normal);
        assert!(kept.displayed.normal().is_some());
        assert!(kept.in_flight.normal);

        let cleared = state.start(RequestKind::Comparison);
        assert_eq!(cleared.displayed, ResultVariant::None);
        assert!(cleared.in_flight.comparison);
        assert!(!cleared.in_flight.normal);
    }

    #[test]
    fn test_resolution_clears_flag_and_replaces_variant() {
        let state = SessionState::new()
            .start(RequestKind::Unoptimized)
            .resolve(Outcome::Unoptimized(Ok(with_metrics("1ms"))));
        assert!(!state.in_flight.any());
        assert!(state.displayed.unoptimized().is_some());

        let state = state
            .start(RequestKind::Normal)
            .resolve(Outcome::Normal(Ok(sample_result())));
        assert!(state.displayed.normal().is_some());
        assert!(state.displayed.unoptimized().is_none());
        assert!(state.displayed.comparison().is_none());
    }

    #[test]
    fn test_failures_become_synthetic_payloads() {
        let state = SessionState::new()
            .start(RequestKind::Normal)
            .resolve(Outcome::Normal(Err(transport_error())));
        let normal = state.displayed.normal().unwrap();
        assert!(!normal.is_valid);
        assert!(normal.tokens.is_empty());
        assert_eq!(normal.syntax_errors, vec![CONNECTION_ERROR_MESSAGE.to_string()]);
        assert!(!state.in_flight.normal);

        let state = state
            .start(RequestKind::Unoptimized)
            .resolve(Outcome::Unoptimized(Err(transport_error())));
        let unoptimized = state.displayed.unoptimized().unwrap();
        assert!(!unoptimized.analysis.is_valid);
        assert_eq!(unoptimized.metrics, PerformanceMetrics::zeroed());
        assert!(state.displayed.normal().is_none());
    }

    #[test]
    fn test_failed_comparison_drops_the_pair() {
        let state = SessionState::new()
            .start(RequestKind::Comparison)
            .resolve(Outcome::Comparison(Ok((
                with_metrics("1ms"),
                with_metrics("2ms"),
            ))));
        assert!(state.displayed.comparison().is_some());

        let state = state
            .start(RequestKind::Comparison)
            .resolve(Outcome::Comparison(Err(transport_error())));
        assert_eq!(state.displayed, ResultVariant::None);
        assert!(!state.in_flight.comparison);
    }

    #[test]
    fn test_failed_comparison_leaves_other_variants() {
        let state = SessionState {
            displayed: ResultVariant::Normal(sample_result()),
            in_flight: InFlight {
                comparison: true,
                ..InFlight::default()
            },
        }
        .resolve(Outcome::Comparison(Err(transport_error())));
        assert!(state.displayed.normal().is_some());
    }

    #[tokio::test]
    async fn test_request_normal_scenario() {
        let mut controller = SessionController::new(ScriptedClient::open());
        let state = controller.request_normal(SAMPLE).await;

        let result = state.displayed.normal().unwrap();
        assert!(result.is_valid);
        assert_eq!(result.tokens[0].value, "let");
        assert_eq!(classify(&result.tokens[0]), TokenCategory::ReservedWord);
        assert!(state.displayed.unoptimized().is_none());
        assert!(state.displayed.comparison().is_none());
        assert!(!state.in_flight.any());
    }

    #[tokio::test]
    async fn test_request_unoptimized_failure() {
        let mut client = ScriptedClient::open();
        client.unoptimized_ok = false;
        let mut controller = SessionController::new(client);

        let state = controller.request_unoptimized(SAMPLE).await;
        let result = state.displayed.unoptimized().unwrap();
        assert!(!result.analysis.is_valid);
        assert_eq!(result.metrics.execution_time, "0ms");
    }

    #[tokio::test]
    async fn test_comparison_success() {
        let mut controller = SessionController::new(ScriptedClient::open());
        controller.request_normal(SAMPLE).await;

        let state = controller.request_comparison(SAMPLE).await;
        let (optimized, unoptimized) = state.displayed.comparison().unwrap();
        assert_eq!(optimized.metrics.execution_time, "100ms");
        assert_eq!(unoptimized.metrics.execution_time, "200ms");
        assert!(state.displayed.normal().is_none());
    }

    #[tokio::test]
    async fn test_comparison_with_one_failed_leg_shows_nothing() {
        let mut client = ScriptedClient::open();
        client.optimized_ok = false;
        let mut controller = SessionController::new(client);

        let state = controller.request_comparison(SAMPLE).await;
        assert!(state.displayed.comparison().is_none());
        assert_eq!(state.displayed, ResultVariant::None);
    }

    #[tokio::test]
    async fn test_comparison_waits_for_both_legs() {
        let client = Arc::new(ScriptedClient::gated(0));
        let mut controller = SessionController::with_client(Arc::clone(&client));
        controller.submit(RequestKind::Comparison, SAMPLE);

        client.optimized_gate.add_permits(1);
        let_tasks_run().await;
        assert!(controller.completions_rx.try_recv().is_err());
        assert!(controller.state().in_flight.comparison);

        client.unoptimized_gate.add_permits(1);
        controller.settle().await;
        assert!(controller.state().displayed.comparison().is_some());
        assert!(!controller.state().in_flight.comparison);
    }

    #[tokio::test]
    async fn test_last_resolved_request_wins() {
        let client = Arc::new(ScriptedClient::gated(0));
        let mut controller = SessionController::with_client(Arc::clone(&client));

        controller.submit(RequestKind::Normal, SAMPLE);
        controller.submit(RequestKind::Comparison, SAMPLE);
        assert!(controller.state().in_flight.normal);
        assert!(controller.state().in_flight.comparison);

        client.optimized_gate.add_permits(1);
        client.unoptimized_gate.add_permits(1);
        controller.next_resolution().await;
        assert!(controller.state().displayed.comparison().is_some());
        assert!(controller.state().in_flight.normal);

        // The slower normal analysis overwrites the comparison view.
        client.normal_gate.add_permits(1);
        controller.next_resolution().await;
        assert!(controller.state().displayed.normal().is_some());
        assert!(controller.state().displayed.comparison().is_none());
        assert_eq!(controller.pending(), 0);
    }

    #[tokio::test]
    async fn test_same_turn_completions_apply_in_issue_order() {
        let client = Arc::new(ScriptedClient::gated(0));
        let mut controller = SessionController::with_client(Arc::clone(&client));

        let comparison = controller.submit(RequestKind::Comparison, SAMPLE);
        let normal = controller.submit(RequestKind::Normal, SAMPLE);

        client.normal_gate.add_permits(1);
        let_tasks_run().await;
        client.optimized_gate.add_permits(1);
        client.unoptimized_gate.add_permits(1);
        let_tasks_run().await;

        // Normal finished first, but both are ready: issue order decides.
        let applied = controller.next_resolution().await.unwrap();
        assert_eq!(applied, vec![comparison, normal]);
        assert!(controller.state().displayed.normal().is_some());
    }

    #[tokio::test]
    async fn test_next_resolution_with_nothing_pending() {
        let mut controller = SessionController::new(ScriptedClient::open());
        assert!(controller.next_resolution().await.is_none());
        assert_eq!(controller.settle().await, &SessionState::new());
    }
}
