use crate::stream::StreamError;
use std::time::{Duration, Instant};
use tad_core::{normalize_record, AgentStatus, DashboardState, Event, Record, Snapshot};
use thiserror::Error;
use tracing::{info, warn};

pub const DEFAULT_MIN_RENDER_INTERVAL: Duration = Duration::from_millis(250);

/// Render contract: takes a completed snapshot, draws it somewhere. Must
/// not assume uniform call intervals. Failures are the renderer's own and
/// never reach the aggregate.
pub trait Renderer {
    fn render(&mut self, snapshot: &Snapshot) -> anyhow::Result<()>;
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    Stream(#[from] StreamError),
}

/// What a finished (non-failed) run looked like.
#[derive(Debug)]
pub struct RunReport {
    pub snapshot: Snapshot,
    pub cancelled: bool,
    pub records_seen: usize,
    pub render_failures: usize,
}

/// The single cooperative loop of the system. Pulls records (the sole
/// blocking point), normalizes and applies them atomically relative to
/// rendering, and redraws at a capped cadence so record bursts coalesce
/// into one frame.
pub struct Driver<R: Renderer> {
    store: DashboardState,
    renderer: R,
    min_render_interval: Duration,
    last_render: Option<Instant>,
    render_failures: usize,
}

impl<R: Renderer> Driver<R> {
    pub fn new(store: DashboardState, renderer: R, min_render_interval: Duration) -> Self {
        Self {
            store,
            renderer,
            min_render_interval,
            last_render: None,
            render_failures: 0,
        }
    }

    /// Runs the loop to completion.
    ///
    /// Exhaustion finalizes the aggregate (whatever is still pending or
    /// running is nominally finished) and renders one last frame.
    /// A producer failure marks the in-flight agent as errored, renders
    /// one last consistent frame, and propagates the failure. `cancel` is
    /// consulted only at iteration boundaries, after a record's events are
    /// fully applied and rendered.
    pub fn run<I>(
        mut self,
        records: I,
        mut cancel: impl FnMut() -> bool,
    ) -> Result<RunReport, DriverError>
    where
        I: IntoIterator<Item = Result<Record, StreamError>>,
    {
        let mut records_seen = 0usize;
        for pulled in records {
            let record = match pulled {
                Ok(record) => record,
                Err(err) => {
                    warn!(error = %err, records_seen, "analysis stream failed");
                    if let Some(agent) = self.store.current_agent() {
                        self.store.apply(Event::AgentStatusUpdate {
                            agent,
                            status: AgentStatus::Error,
                        });
                    }
                    self.render_now();
                    return Err(DriverError::Stream(err));
                }
            };
            records_seen += 1;
            for event in normalize_record(&record) {
                self.store.apply(event);
            }
            self.render_if_due();

            if cancel() {
                info!(records_seen, "cancelled at iteration boundary");
                self.render_now();
                return Ok(self.report(records_seen, true));
            }
        }

        info!(records_seen, "analysis stream exhausted, finalizing");
        self.store.finalize();
        self.render_now();
        Ok(self.report(records_seen, false))
    }

    fn report(&self, records_seen: usize, cancelled: bool) -> RunReport {
        RunReport {
            snapshot: self.store.snapshot(),
            cancelled,
            records_seen,
            render_failures: self.render_failures,
        }
    }

    fn render_if_due(&mut self) {
        let due = self
            .last_render
            .map_or(true, |at| at.elapsed() >= self.min_render_interval);
        if due {
            self.render_now();
        }
    }

    fn render_now(&mut self) {
        let snapshot = self.store.snapshot();
        if let Err(err) = self.renderer.render(&snapshot) {
            self.render_failures += 1;
            warn!(error = %err, "render failed, continuing");
        }
        self.last_render = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tad_core::{AgentName, ReportSection, Team};

    #[derive(Default, Clone)]
    struct CapturingRenderer {
        frames: Rc<RefCell<Vec<Snapshot>>>,
        fail_on: Option<usize>,
        calls: Rc<RefCell<usize>>,
    }

    impl Renderer for CapturingRenderer {
        fn render(&mut self, snapshot: &Snapshot) -> anyhow::Result<()> {
            let call = {
                let mut calls = self.calls.borrow_mut();
                *calls += 1;
                *calls
            };
            if self.fail_on == Some(call) {
                return Err(anyhow!("terminal went away"));
            }
            self.frames.borrow_mut().push(snapshot.clone());
            Ok(())
        }
    }

    fn driver(renderer: CapturingRenderer, interval: Duration) -> Driver<CapturingRenderer> {
        Driver::new(DashboardState::new(), renderer, interval)
    }

    fn never_cancel() -> impl FnMut() -> bool {
        || false
    }

    fn ok_records(records: Vec<Record>) -> Vec<Result<Record, StreamError>> {
        records.into_iter().map(Ok).collect()
    }

    #[test]
    fn analyst_reports_complete_the_analyst_team_only() {
        // Six records, each setting one of the four analyst slots (two are
        // later refinements of an already-set slot).
        let records = ok_records(vec![
            json!({"market_report": "bullish"}),
            json!({"sentiment_report": "positive"}),
            json!({"news_report": "favorable"}),
            json!({"fundamentals_report": "strong"}),
            json!({"market_report": "bullish, refined"}),
            json!({"news_report": "favorable, refined"}),
        ]);
        let renderer = CapturingRenderer::default();
        let report = driver(renderer, Duration::ZERO)
            .run(records, never_cancel())
            .expect("run completes");

        assert_eq!(report.records_seen, 6);
        // Finalize then forces the rest to completed.
        for agent in AgentName::ALL {
            assert_eq!(report.snapshot.status(agent), Some(AgentStatus::Completed));
        }
    }

    #[test]
    fn analyst_reports_leave_the_rest_of_the_roster_pending_before_finalize() {
        let records = ok_records(vec![
            json!({"market_report": "bullish"}),
            json!({"sentiment_report": "positive"}),
            json!({"news_report": "favorable"}),
            json!({"fundamentals_report": "strong"}),
            json!({"market_report": "bullish, refined"}),
            json!({"news_report": "favorable, refined"}),
        ]);
        let renderer = CapturingRenderer::default();
        let frames = renderer.frames.clone();
        driver(renderer, Duration::ZERO)
            .run(records, never_cancel())
            .expect("run completes");

        let all_frames = frames.borrow();
        // Second-to-last frame: after the last record, before finalize.
        let last_live = &all_frames[all_frames.len() - 2];
        for agent in Team::Analyst.members() {
            assert_eq!(last_live.status(*agent), Some(AgentStatus::Completed));
        }
        for agent in AgentName::ALL {
            if agent.team() != Team::Analyst {
                assert_eq!(last_live.status(agent), Some(AgentStatus::Pending), "{agent}");
            }
        }
    }

    #[test]
    fn tool_call_record_fills_the_tool_ring_in_order() {
        let records = ok_records(vec![json!({
            "messages": [{
                "content": "Fetching data",
                "tool_calls": [
                    {"name": "fetch-price", "args": {"ticker": "SPY"}},
                    {"name": "fetch-news", "args": {"ticker": "SPY"}},
                ],
            }],
        })]);
        let report = driver(CapturingRenderer::default(), Duration::ZERO)
            .run(records, never_cancel())
            .expect("run completes");

        assert_eq!(report.snapshot.messages.len(), 1);
        assert_eq!(report.snapshot.tool_calls.len(), 2);
        assert_eq!(report.snapshot.tool_calls[0].tool_name, "fetch-price");
        assert_eq!(report.snapshot.tool_calls[1].tool_name, "fetch-news");
    }

    #[test]
    fn stream_failure_marks_the_inflight_agent_and_stops() {
        let mut records = ok_records(vec![
            json!({"market_report": "bullish"}),
            json!({"sentiment_report": "positive"}),
            json!({"news_report": "favorable"}),
            json!({"fundamentals_report": "strong"}),
            json!({"investment_plan": "accumulate"}),
        ]);
        records.push(Err(StreamError::Provider("backend reset".to_string())));

        let renderer = CapturingRenderer::default();
        let frames = renderer.frames.clone();
        let result = driver(renderer, Duration::ZERO).run(records, never_cancel());
        assert!(matches!(result, Err(DriverError::Stream(_))));

        let all_frames = frames.borrow();
        let last = all_frames.last().expect("failure renders a final frame");
        assert_eq!(last.status(AgentName::Trader), Some(AgentStatus::Error));
        for agent in [
            AgentName::RiskyAnalyst,
            AgentName::NeutralAnalyst,
            AgentName::SafeAnalyst,
            AgentName::PortfolioManager,
        ] {
            assert_eq!(last.status(agent), Some(AgentStatus::Pending), "{agent}");
        }
    }

    #[test]
    fn exhaustion_finalizes_and_renders_exactly_one_extra_frame() {
        let records = ok_records(vec![
            json!({"market_report": "bullish"}),
            json!({"messages": [{"content": "thinking"}]}),
        ]);
        let renderer = CapturingRenderer::default();
        let frames = renderer.frames.clone();
        let report = driver(renderer, Duration::ZERO)
            .run(records, never_cancel())
            .expect("run completes");

        let all_frames = frames.borrow();
        // One frame per record plus exactly one finalize frame.
        assert_eq!(all_frames.len(), report.records_seen + 1);
        let last = all_frames.last().unwrap();
        assert_eq!(
            last.status(AgentName::PortfolioManager),
            Some(AgentStatus::Completed)
        );
        let before_finalize = &all_frames[all_frames.len() - 2];
        assert_eq!(
            before_finalize.status(AgentName::PortfolioManager),
            Some(AgentStatus::Pending)
        );
    }

    #[test]
    fn record_bursts_coalesce_under_the_render_cap() {
        let records = ok_records(
            (0..20)
                .map(|index| json!({"messages": [{"content": format!("step {index}")}]}))
                .collect(),
        );
        let renderer = CapturingRenderer::default();
        let frames = renderer.frames.clone();
        driver(renderer, Duration::from_secs(3600))
            .run(records, never_cancel())
            .expect("run completes");

        // First record renders, the burst coalesces, finalize renders once.
        assert_eq!(frames.borrow().len(), 2);
    }

    #[test]
    fn render_failure_does_not_stop_the_loop_or_touch_state() {
        let records = ok_records(vec![
            json!({"market_report": "bullish"}),
            json!({"sentiment_report": "positive"}),
        ]);
        let renderer = CapturingRenderer {
            fail_on: Some(1),
            ..CapturingRenderer::default()
        };
        let report = driver(renderer, Duration::ZERO)
            .run(records, never_cancel())
            .expect("run completes despite render failure");

        assert_eq!(report.render_failures, 1);
        assert_eq!(
            report.snapshot.section(ReportSection::Market),
            Some("bullish")
        );
        assert_eq!(
            report.snapshot.status(AgentName::SocialAnalyst),
            Some(AgentStatus::Completed)
        );
    }

    #[test]
    fn cancellation_stops_at_the_boundary_without_finalizing() {
        let records = ok_records(vec![
            json!({"market_report": "bullish"}),
            json!({"sentiment_report": "positive"}),
            json!({"news_report": "favorable"}),
        ]);
        let mut seen = 0;
        let report = driver(CapturingRenderer::default(), Duration::ZERO)
            .run(records, move || {
                seen += 1;
                seen == 2
            })
            .expect("cancelled run still reports");

        assert!(report.cancelled);
        assert_eq!(report.records_seen, 2);
        // No finalize: untouched agents stay pending.
        assert_eq!(
            report.snapshot.status(AgentName::PortfolioManager),
            Some(AgentStatus::Pending)
        );
        // The second record's events were fully applied before stopping.
        assert_eq!(
            report.snapshot.status(AgentName::SocialAnalyst),
            Some(AgentStatus::Completed)
        );
    }
}
