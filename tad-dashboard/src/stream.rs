use serde_json::{json, Value};
use std::time::Duration;
use tad_core::{Record, ReportSection};
use thiserror::Error;

/// Terminal failure raised by the record producer instead of a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    #[error("provider backend unreachable: {0}")]
    Provider(String),
    #[error("pipeline stage '{stage}' failed: {message}")]
    Stage { stage: String, message: String },
}

/// A scripted stand-in for the analysis pipeline: a finite, lazy,
/// non-restartable record sequence with an optional per-pull delay (the
/// suspension point) and an optional terminal failure.
pub struct ScriptedStream {
    records: std::vec::IntoIter<Record>,
    delay: Duration,
    failure: Option<StreamError>,
}

impl ScriptedStream {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records: records.into_iter(),
            delay: Duration::ZERO,
            failure: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Raise `failure` once the scripted records run out, instead of
    /// ending normally.
    pub fn with_failure(mut self, failure: StreamError) -> Self {
        self.failure = Some(failure);
        self
    }
}

impl Iterator for ScriptedStream {
    type Item = Result<Record, StreamError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.records.next() {
            Some(record) => {
                if !self.delay.is_zero() {
                    std::thread::sleep(self.delay);
                }
                Some(Ok(record))
            }
            None => self.failure.take().map(Err),
        }
    }
}

/// Demo script shaped like a full pipeline run: reasoning messages, tool
/// fetches, one report per selected analyst, a research debate, then the
/// plan / trader / decision stages.
pub fn scripted_demo(
    ticker: &str,
    date: &str,
    analyst_sections: &[ReportSection],
    research_depth: u32,
) -> ScriptedStream {
    let mut records = Vec::new();
    records.push(json!({
        "messages": [{"content": format!("Starting analysis for {ticker} on {date}.")}],
    }));
    records.push(json!({
        "messages": [{
            "content": format!("Fetching data for {ticker}."),
            "tool_calls": [
                {"name": "fetch-price", "args": {"ticker": ticker}},
                {"name": "fetch-news", "args": {"ticker": ticker}},
            ],
        }],
    }));

    records.extend(
        analyst_sections
            .iter()
            .filter_map(|section| analyst_record(*section, ticker)),
    );

    for round in 1..=research_depth {
        records.push(json!({
            "messages": [{"content": format!("Bull researcher argues for {ticker} (round {round}).")}],
        }));
        records.push(json!({
            "messages": [{"content": format!("Bear researcher argues against {ticker} (round {round}).")}],
        }));
    }

    records.push(json!({
        "messages": [{"content": "Research manager weighs the debate."}],
        "investment_plan": format!("Accumulate {ticker} on weakness; thesis supported by the analyst reports."),
    }));
    records.push(json!({
        "messages": [{"content": "Trader sizes the position."}],
        "trader_investment_plan": format!("Enter {ticker} in thirds over three sessions with a 5% stop."),
    }));
    records.push(json!({
        "messages": [{"content": "Portfolio manager signs off."}],
        "final_trade_decision": format!("BUY {ticker}."),
    }));

    ScriptedStream::new(records)
}

/// Only the four analyst slots have a scripted analyst record; the later
/// stages get dedicated records above.
fn analyst_record(section: ReportSection, ticker: &str) -> Option<Value> {
    let (note, body) = match section {
        ReportSection::Market => (
            "Market analyst reviews price action.",
            format!("Technical indicators for {ticker} point to a sustained uptrend."),
        ),
        ReportSection::Sentiment => (
            "Social analyst scans the chatter.",
            format!("Social sentiment around {ticker} is broadly positive."),
        ),
        ReportSection::News => (
            "News analyst digests the headlines.",
            format!("Recent coverage of {ticker} is favorable."),
        ),
        ReportSection::Fundamentals => (
            "Fundamentals analyst reads the filings.",
            format!("{ticker} fundamentals remain strong across the board."),
        ),
        ReportSection::InvestmentPlan
        | ReportSection::TraderInvestmentPlan
        | ReportSection::FinalTradeDecision => return None,
    };
    let mut fields = serde_json::Map::new();
    fields.insert("messages".to_string(), json!([{"content": note}]));
    fields.insert(section.key().to_string(), Value::String(body));
    Some(Value::Object(fields))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANALYSTS: [ReportSection; 4] = [
        ReportSection::Market,
        ReportSection::Sentiment,
        ReportSection::News,
        ReportSection::Fundamentals,
    ];

    #[test]
    fn demo_script_covers_selected_sections_in_order() {
        let records: Vec<Record> = scripted_demo("SPY", "2026-08-31", &ANALYSTS, 1)
            .map(|pulled| pulled.expect("scripted records never fail"))
            .collect();

        let seen: Vec<ReportSection> = records
            .iter()
            .flat_map(|record| {
                ReportSection::ALL
                    .into_iter()
                    .filter(|section| record.get(section.key()).is_some())
            })
            .collect();
        assert_eq!(
            seen,
            vec![
                ReportSection::Market,
                ReportSection::Sentiment,
                ReportSection::News,
                ReportSection::Fundamentals,
                ReportSection::InvestmentPlan,
                ReportSection::TraderInvestmentPlan,
                ReportSection::FinalTradeDecision,
            ]
        );
    }

    #[test]
    fn analyst_subset_drops_unselected_reports() {
        let records: Vec<Record> = scripted_demo("SPY", "2026-08-31", &[ReportSection::Market], 0)
            .map(|pulled| pulled.expect("scripted records never fail"))
            .collect();
        assert!(records
            .iter()
            .all(|record| record.get(ReportSection::Sentiment.key()).is_none()));
        assert!(records
            .iter()
            .any(|record| record.get(ReportSection::Market.key()).is_some()));
    }

    #[test]
    fn later_stage_sections_never_get_an_analyst_record() {
        let records: Vec<Record> = scripted_demo(
            "SPY",
            "2026-08-31",
            &[ReportSection::Market, ReportSection::InvestmentPlan],
            0,
        )
        .map(|pulled| pulled.expect("scripted records never fail"))
        .collect();
        // The plan stage appears only through its dedicated record.
        let plan_records = records
            .iter()
            .filter(|record| record.get(ReportSection::InvestmentPlan.key()).is_some())
            .count();
        assert_eq!(plan_records, 1);
    }

    #[test]
    fn injected_failure_surfaces_after_the_last_record() {
        let failure = StreamError::Stage {
            stage: "trader".to_string(),
            message: "backend timeout".to_string(),
        };
        let mut stream =
            ScriptedStream::new(vec![json!({"market_report": "bullish"})]).with_failure(failure.clone());
        assert!(matches!(stream.next(), Some(Ok(_))));
        assert_eq!(stream.next(), Some(Err(failure)));
        assert!(stream.next().is_none());
    }
}
