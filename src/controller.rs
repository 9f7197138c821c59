//! Upload cycle orchestration
//!
//! One cycle: check the selection, upload, fetch, render table then chart,
//! report the outcome. A failed cycle leaves the previous table and chart in
//! place; only the status changes.

use crate::classifier::Classifier;
use crate::config::Messages;
use crate::render::{ChartRenderer, Dashboard, Status, TableRenderer};
use crate::service::{ScoringService, ServiceError};
use crate::ResultSet;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Controller lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Submitting,
    AwaitingResults,
    Rendering,
    Failed,
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ControllerState::Idle => "idle",
            ControllerState::Submitting => "submitting",
            ControllerState::AwaitingResults => "awaiting-results",
            ControllerState::Rendering => "rendering",
            ControllerState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Why a submission did not start
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Precondition {
    /// Nothing selected
    NoFile,
    /// Selected path is missing or not a regular file
    Missing(PathBuf),
}

#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("failed to render dashboard: {0}")]
    Render(#[source] io::Error),
}

/// Result of one call to [`UploadController::submit`]
#[derive(Debug)]
pub enum CycleOutcome {
    /// New results are on the dashboard
    Rendered { records: usize, message: String },
    /// The cycle started and failed; previous output is unchanged
    Failed(CycleError),
    /// The cycle never started; no request was made
    Blocked(Precondition),
}

impl CycleOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, CycleOutcome::Rendered { .. })
    }
}

/// Drives upload cycles against a scoring service and a dashboard
pub struct UploadController<S, D> {
    service: S,
    dashboard: D,
    messages: Messages,
    table: TableRenderer,
    chart: ChartRenderer,
    state: ControllerState,
    results: Option<ResultSet>,
    trace: Vec<ControllerState>,
}

impl<S: ScoringService, D: Dashboard> UploadController<S, D> {
    pub fn new(service: S, dashboard: D, classifier: Classifier, messages: Messages) -> Self {
        Self {
            service,
            dashboard,
            messages,
            table: TableRenderer::new(classifier),
            chart: ChartRenderer::new(),
            state: ControllerState::Idle,
            results: None,
            trace: Vec::new(),
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// States visited by the most recent cycle, starting and ending at `Idle`
    pub fn last_cycle(&self) -> &[ControllerState] {
        &self.trace
    }

    /// Results of the latest successful cycle
    pub fn results(&self) -> Option<&ResultSet> {
        self.results.as_ref()
    }

    pub fn dashboard(&self) -> &D {
        &self.dashboard
    }

    pub fn dashboard_mut(&mut self) -> &mut D {
        &mut self.dashboard
    }

    pub fn into_dashboard(self) -> D {
        self.dashboard
    }

    fn enter(&mut self, state: ControllerState) {
        log::debug!("controller: {} -> {}", self.state, state);
        self.state = state;
        self.trace.push(state);
    }

    /// Run one upload cycle for the selected dataset
    pub fn submit(&mut self, dataset: Option<&Path>) -> CycleOutcome {
        self.trace = vec![ControllerState::Idle];

        let dataset = match dataset {
            Some(path) if path.is_file() => path,
            Some(path) => return self.block(Precondition::Missing(path.to_path_buf())),
            None => return self.block(Precondition::NoFile),
        };

        match self.run_cycle(dataset) {
            Ok((records, message)) => {
                self.enter(ControllerState::Idle);
                if let Err(e) = self.dashboard.set_status(&Status::success(message.as_str())) {
                    log::error!("failed to update status: {}", e);
                }
                CycleOutcome::Rendered { records, message }
            }
            Err(err) => {
                self.enter(ControllerState::Failed);
                match &err {
                    CycleError::Service(e) => {
                        log::error!("{} stage failed [{}]: {}", e.stage(), e.category(), e)
                    }
                    CycleError::Render(e) => log::error!("render stage failed: {}", e),
                }
                let failure = Status::failure(self.messages.failure.as_str());
                if let Err(e) = self.dashboard.set_status(&failure) {
                    log::error!("failed to update status: {}", e);
                }
                self.enter(ControllerState::Idle);
                CycleOutcome::Failed(err)
            }
        }
    }

    fn block(&mut self, reason: Precondition) -> CycleOutcome {
        let text = match &reason {
            Precondition::NoFile => self.messages.no_file.clone(),
            Precondition::Missing(path) => format!("{} ({})", self.messages.no_file, path.display()),
        };
        log::warn!("submission blocked: {:?}", reason);
        if let Err(e) = self.dashboard.warn(&text) {
            log::error!("failed to show warning: {}", e);
        }
        CycleOutcome::Blocked(reason)
    }

    fn run_cycle(&mut self, dataset: &Path) -> Result<(usize, String), CycleError> {
        self.enter(ControllerState::Submitting);
        self.dashboard
            .set_status(&Status::progress(self.messages.progress.as_str()))
            .map_err(CycleError::Render)?;

        let ack = self.service.upload(dataset)?;
        log::debug!("upload acknowledged: {:?}", ack.message);

        self.enter(ControllerState::AwaitingResults);
        let set = self.service.fetch_results()?;
        log::debug!("fetched {} records", set.len());

        self.enter(ControllerState::Rendering);
        // The new set supersedes the previous one even if rendering fails
        let set = self.results.insert(set);
        self.table
            .render(set, &mut self.dashboard)
            .map_err(CycleError::Render)?;
        self.chart
            .render(set, &mut self.dashboard)
            .map_err(CycleError::Render)?;

        let message = ack
            .message
            .unwrap_or_else(|| self.messages.success.clone());
        Ok((set.len(), message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{HtmlDashboard, MemoryDashboard, StatusKind};
    use crate::service::{Stage, UploadAck};
    use crate::{RecommendationTier, ResultRecord, RiskTier};
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::{NamedTempFile, TempDir};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Call {
        Upload,
        Fetch,
    }

    /// Scripted service; records every call in order
    struct FakeService {
        calls: Rc<RefCell<Vec<Call>>>,
        upload: Box<dyn FnMut() -> Result<UploadAck, ServiceError>>,
        fetch: Box<dyn FnMut() -> Result<ResultSet, ServiceError>>,
    }

    impl FakeService {
        fn new(
            upload: impl FnMut() -> Result<UploadAck, ServiceError> + 'static,
            fetch: impl FnMut() -> Result<ResultSet, ServiceError> + 'static,
        ) -> (Self, Rc<RefCell<Vec<Call>>>) {
            let calls = Rc::new(RefCell::new(Vec::new()));
            let service = Self {
                calls: Rc::clone(&calls),
                upload: Box::new(upload),
                fetch: Box::new(fetch),
            };
            (service, calls)
        }
    }

    impl ScoringService for FakeService {
        fn upload(&mut self, _dataset: &Path) -> Result<UploadAck, ServiceError> {
            self.calls.borrow_mut().push(Call::Upload);
            (self.upload)()
        }

        fn fetch_results(&mut self) -> Result<ResultSet, ServiceError> {
            self.calls.borrow_mut().push(Call::Fetch);
            (self.fetch)()
        }
    }

    fn ack(message: &str) -> UploadAck {
        UploadAck {
            message: Some(message.to_string()),
        }
    }

    fn acme() -> ResultSet {
        ResultSet::from(vec![ResultRecord::new("Acme", 3.5, "Low", "Should lend")])
    }

    fn beta() -> ResultSet {
        ResultSet::from(vec![ResultRecord::new(
            "Beta",
            2.0,
            "Medium",
            "Should review further",
        )])
    }

    fn dataset() -> NamedTempFile {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "Ten_doanh_nghiep,Z_score\nAcme,3.5\n").unwrap();
        file
    }

    fn controller(service: FakeService) -> UploadController<FakeService, MemoryDashboard> {
        UploadController::new(
            service,
            MemoryDashboard::new(),
            Classifier::new(),
            Messages::default(),
        )
    }

    #[test]
    fn test_successful_cycle_uses_server_message() {
        let (service, calls) = FakeService::new(|| Ok(ack("Processed 3 rows")), || Ok(acme()));
        let mut ctl = controller(service);
        let file = dataset();

        let outcome = ctl.submit(Some(file.path()));

        assert!(matches!(
            &outcome,
            CycleOutcome::Rendered { records: 1, message } if message == "Processed 3 rows"
        ));
        let board = ctl.dashboard();
        assert_eq!(board.status(), Some(&Status::success("Processed 3 rows")));
        let row = &board.table().unwrap().rows[0];
        assert_eq!(row.name, "Acme");
        assert_eq!(row.score, "3.50");
        assert_eq!(row.recommendation_tier, RecommendationTier::Positive);
        assert_eq!(row.color_class, "text-green-600");
        let bar = &board.chart().unwrap().bars[0];
        assert_eq!(bar.tier, RiskTier::Safe);
        assert_eq!(bar.fill, "rgba(34,197,94,0.6)");
        assert_eq!(*calls.borrow(), vec![Call::Upload, Call::Fetch]);
    }

    #[test]
    fn test_caution_row_is_orange() {
        let (service, _) = FakeService::new(|| Ok(UploadAck::default()), || Ok(beta()));
        let mut ctl = controller(service);
        let file = dataset();

        assert!(ctl.submit(Some(file.path())).is_rendered());
        let board = ctl.dashboard();
        assert_eq!(board.table().unwrap().rows[0].color_class, "text-orange-600");
        assert_eq!(board.chart().unwrap().bars[0].fill, "rgba(249,115,22,0.6)");
        // No server message: default success text
        assert_eq!(
            board.status(),
            Some(&Status::success(Messages::default().success))
        );
    }

    #[test]
    fn test_no_file_blocks_without_network() {
        let (service, calls) = FakeService::new(|| Ok(UploadAck::default()), || Ok(acme()));
        let mut ctl = controller(service);

        let outcome = ctl.submit(None);

        assert!(matches!(outcome, CycleOutcome::Blocked(Precondition::NoFile)));
        assert!(calls.borrow().is_empty());
        assert_eq!(ctl.state(), ControllerState::Idle);
        assert_eq!(ctl.last_cycle(), [ControllerState::Idle]);
        let board = ctl.dashboard();
        assert_eq!(board.warnings(), [Messages::default().no_file]);
        assert!(board.status().is_none());
        assert!(board.table().is_none());
    }

    #[test]
    fn test_missing_path_blocks_without_network() {
        let (service, calls) = FakeService::new(|| Ok(UploadAck::default()), || Ok(acme()));
        let mut ctl = controller(service);
        let missing = Path::new("/no/such/financials.csv");

        let outcome = ctl.submit(Some(missing));

        assert!(
            matches!(outcome, CycleOutcome::Blocked(Precondition::Missing(ref p)) if p == missing)
        );
        assert!(calls.borrow().is_empty());
        assert!(ctl.dashboard().warnings()[0].contains("/no/such/financials.csv"));
    }

    #[test]
    fn test_upload_failure_preserves_previous_output() {
        let mut uploads = 0;
        let (service, calls) = FakeService::new(
            move || {
                uploads += 1;
                if uploads == 1 {
                    Ok(ack("Processed 3 rows"))
                } else {
                    Err(ServiceError::Status {
                        stage: Stage::Upload,
                        status: 500,
                        body: "internal error".to_string(),
                    })
                }
            },
            || Ok(acme()),
        );
        let mut ctl = controller(service);
        let file = dataset();

        assert!(ctl.submit(Some(file.path())).is_rendered());
        let table_before = ctl.dashboard().table().cloned();
        let chart_before = ctl.dashboard().chart().cloned();

        let outcome = ctl.submit(Some(file.path()));

        assert!(matches!(outcome, CycleOutcome::Failed(CycleError::Service(_))));
        let board = ctl.dashboard();
        assert_eq!(board.table().cloned(), table_before);
        assert_eq!(board.chart().cloned(), chart_before);
        assert_eq!(board.table_writes(), 1);
        assert_eq!(board.chart_draws(), 1);
        assert_eq!(board.status().unwrap().kind, StatusKind::Failure);
        assert_eq!(board.status().unwrap().text, Messages::default().failure);
        // The failed cycle never asked for results
        assert_eq!(
            *calls.borrow(),
            vec![Call::Upload, Call::Fetch, Call::Upload]
        );
        assert_eq!(
            ctl.last_cycle(),
            [
                ControllerState::Idle,
                ControllerState::Submitting,
                ControllerState::Failed,
                ControllerState::Idle
            ]
        );
    }

    #[test]
    fn test_malformed_fetch_fails_like_transport() {
        let (service, _) = FakeService::new(
            || Ok(UploadAck::default()),
            || {
                Err(ServiceError::Malformed {
                    stage: Stage::Fetch,
                    reason: "missing field `Z_score`".to_string(),
                })
            },
        );
        let mut ctl = controller(service);
        let file = dataset();

        let outcome = ctl.submit(Some(file.path()));

        assert!(matches!(outcome, CycleOutcome::Failed(_)));
        assert!(ctl.results().is_none());
        assert_eq!(ctl.dashboard().status().unwrap().text, Messages::default().failure);
        assert_eq!(
            ctl.last_cycle(),
            [
                ControllerState::Idle,
                ControllerState::Submitting,
                ControllerState::AwaitingResults,
                ControllerState::Failed,
                ControllerState::Idle
            ]
        );
    }

    #[test]
    fn test_success_trace_and_ordering() {
        let (service, _) = FakeService::new(|| Ok(UploadAck::default()), || Ok(acme()));
        let mut ctl = controller(service);
        let file = dataset();

        ctl.submit(Some(file.path()));

        assert_eq!(
            ctl.last_cycle(),
            [
                ControllerState::Idle,
                ControllerState::Submitting,
                ControllerState::AwaitingResults,
                ControllerState::Rendering,
                ControllerState::Idle
            ]
        );
        assert_eq!(ctl.state(), ControllerState::Idle);
    }

    #[test]
    fn test_new_results_supersede_old() {
        let mut fetches = 0;
        let (service, _) = FakeService::new(
            || Ok(UploadAck::default()),
            move || {
                fetches += 1;
                Ok(if fetches == 1 { acme() } else { beta() })
            },
        );
        let mut ctl = controller(service);
        let file = dataset();

        ctl.submit(Some(file.path()));
        assert_eq!(ctl.results(), Some(&acme()));

        ctl.submit(Some(file.path()));
        assert_eq!(ctl.results(), Some(&beta()));
        let board = ctl.dashboard();
        assert_eq!(board.table().unwrap().rows.len(), 1);
        assert_eq!(board.table().unwrap().rows[0].name, "Beta");
        assert_eq!(board.live_charts(), 1);
    }

    #[test]
    fn test_empty_results_render_empty_dashboard() {
        let (service, _) =
            FakeService::new(|| Ok(UploadAck::default()), || Ok(ResultSet::default()));
        let mut ctl = controller(service);
        let file = dataset();

        let outcome = ctl.submit(Some(file.path()));

        assert!(matches!(outcome, CycleOutcome::Rendered { records: 0, .. }));
        let board = ctl.dashboard();
        assert!(board.table().unwrap().rows.is_empty());
        assert!(board.chart().unwrap().bars.is_empty());
    }

    #[test]
    fn test_failed_run_keeps_previous_html_page() {
        let dir = TempDir::new().unwrap();
        let page = dir.path().join("board.html");
        let file = dataset();

        let (service, _) = FakeService::new(|| Ok(ack("Processed 1 rows")), || Ok(acme()));
        let mut first = UploadController::new(
            service,
            HtmlDashboard::new(&page),
            Classifier::new(),
            Messages::default(),
        );
        assert!(first.submit(Some(file.path())).is_rendered());
        drop(first);
        let before = std::fs::read_to_string(&page).unwrap();

        let (service, calls) = FakeService::new(
            || {
                Err(ServiceError::Transport {
                    stage: Stage::Upload,
                    reason: "connection refused".to_string(),
                })
            },
            || Ok(beta()),
        );
        let mut second = UploadController::new(
            service,
            HtmlDashboard::new(&page),
            Classifier::new(),
            Messages::default(),
        );
        let outcome = second.submit(Some(file.path()));

        assert!(matches!(outcome, CycleOutcome::Failed(CycleError::Service(_))));
        assert_eq!(*calls.borrow(), vec![Call::Upload]);
        let after = std::fs::read_to_string(&page).unwrap();
        assert_eq!(after, before);
        assert!(after.contains("<td>Acme</td>"));
        assert!(after.contains("<svg"));
    }
}
