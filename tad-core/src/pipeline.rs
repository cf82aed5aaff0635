use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed roster of pipeline stages, in pipeline order.
///
/// The roster is closed configuration: records naming anything outside it
/// carry no signal. Ordering of the variants is the pipeline order, which
/// `Ord` exposes directly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum AgentName {
    MarketAnalyst,
    SocialAnalyst,
    NewsAnalyst,
    FundamentalsAnalyst,
    BullResearcher,
    BearResearcher,
    ResearchManager,
    Trader,
    RiskyAnalyst,
    NeutralAnalyst,
    SafeAnalyst,
    PortfolioManager,
}

impl AgentName {
    pub const ALL: [AgentName; 12] = [
        AgentName::MarketAnalyst,
        AgentName::SocialAnalyst,
        AgentName::NewsAnalyst,
        AgentName::FundamentalsAnalyst,
        AgentName::BullResearcher,
        AgentName::BearResearcher,
        AgentName::ResearchManager,
        AgentName::Trader,
        AgentName::RiskyAnalyst,
        AgentName::NeutralAnalyst,
        AgentName::SafeAnalyst,
        AgentName::PortfolioManager,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AgentName::MarketAnalyst => "Market Analyst",
            AgentName::SocialAnalyst => "Social Analyst",
            AgentName::NewsAnalyst => "News Analyst",
            AgentName::FundamentalsAnalyst => "Fundamentals Analyst",
            AgentName::BullResearcher => "Bull Researcher",
            AgentName::BearResearcher => "Bear Researcher",
            AgentName::ResearchManager => "Research Manager",
            AgentName::Trader => "Trader",
            AgentName::RiskyAnalyst => "Risky Analyst",
            AgentName::NeutralAnalyst => "Neutral Analyst",
            AgentName::SafeAnalyst => "Safe Analyst",
            AgentName::PortfolioManager => "Portfolio Manager",
        }
    }

    pub fn team(self) -> Team {
        match self {
            AgentName::MarketAnalyst
            | AgentName::SocialAnalyst
            | AgentName::NewsAnalyst
            | AgentName::FundamentalsAnalyst => Team::Analyst,
            AgentName::BullResearcher | AgentName::BearResearcher | AgentName::ResearchManager => {
                Team::Research
            }
            AgentName::Trader => Team::Trading,
            AgentName::RiskyAnalyst | AgentName::NeutralAnalyst | AgentName::SafeAnalyst => {
                Team::RiskManagement
            }
            AgentName::PortfolioManager => Team::PortfolioManagement,
        }
    }
}

impl fmt::Display for AgentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The five teams the progress table groups agents under.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Team {
    Analyst,
    Research,
    Trading,
    RiskManagement,
    PortfolioManagement,
}

impl Team {
    pub const ALL: [Team; 5] = [
        Team::Analyst,
        Team::Research,
        Team::Trading,
        Team::RiskManagement,
        Team::PortfolioManagement,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Team::Analyst => "Analyst Team",
            Team::Research => "Research Team",
            Team::Trading => "Trading Team",
            Team::RiskManagement => "Risk Management",
            Team::PortfolioManagement => "Portfolio Management",
        }
    }

    pub fn members(self) -> &'static [AgentName] {
        match self {
            Team::Analyst => &[
                AgentName::MarketAnalyst,
                AgentName::SocialAnalyst,
                AgentName::NewsAnalyst,
                AgentName::FundamentalsAnalyst,
            ],
            Team::Research => &[
                AgentName::BullResearcher,
                AgentName::BearResearcher,
                AgentName::ResearchManager,
            ],
            Team::Trading => &[AgentName::Trader],
            Team::RiskManagement => &[
                AgentName::RiskyAnalyst,
                AgentName::NeutralAnalyst,
                AgentName::SafeAnalyst,
            ],
            Team::PortfolioManagement => &[AgentName::PortfolioManager],
        }
    }
}

/// Per-agent lifecycle. `Error` is absorbing; forward movement only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Pending,
    InProgress,
    Completed,
    Error,
}

impl Default for AgentStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl AgentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AgentStatus::Pending => "pending",
            AgentStatus::InProgress => "in_progress",
            AgentStatus::Completed => "completed",
            AgentStatus::Error => "error",
        }
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named report destinations, in declaration order. Declaration order is
/// also the order sections are scanned in a record and assembled into the
/// final report.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ReportSection {
    Market,
    Sentiment,
    News,
    Fundamentals,
    InvestmentPlan,
    TraderInvestmentPlan,
    FinalTradeDecision,
}

impl ReportSection {
    pub const ALL: [ReportSection; 7] = [
        ReportSection::Market,
        ReportSection::Sentiment,
        ReportSection::News,
        ReportSection::Fundamentals,
        ReportSection::InvestmentPlan,
        ReportSection::TraderInvestmentPlan,
        ReportSection::FinalTradeDecision,
    ];

    /// Key the section travels under in a raw record.
    pub fn key(self) -> &'static str {
        match self {
            ReportSection::Market => "market_report",
            ReportSection::Sentiment => "sentiment_report",
            ReportSection::News => "news_report",
            ReportSection::Fundamentals => "fundamentals_report",
            ReportSection::InvestmentPlan => "investment_plan",
            ReportSection::TraderInvestmentPlan => "trader_investment_plan",
            ReportSection::FinalTradeDecision => "final_trade_decision",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        ReportSection::ALL
            .into_iter()
            .find(|section| section.key() == key)
    }

    pub fn title(self) -> &'static str {
        match self {
            ReportSection::Market => "Market Analysis",
            ReportSection::Sentiment => "Social Sentiment",
            ReportSection::News => "News Analysis",
            ReportSection::Fundamentals => "Fundamentals Analysis",
            ReportSection::InvestmentPlan => "Research Team Decision",
            ReportSection::TraderInvestmentPlan => "Trading Team Plan",
            ReportSection::FinalTradeDecision => "Portfolio Management Decision",
        }
    }

    /// Terminal slot: once it is set, the current report becomes the full
    /// assembled report.
    pub fn is_terminal(self) -> bool {
        matches!(self, ReportSection::FinalTradeDecision)
    }

    /// Static stage-dependency table. Producing a section completes its
    /// producer and, where the pipeline hands off directly, starts the next
    /// stage. The research debate and risk analysts advance through
    /// messages only, so the fundamentals and terminal sections have no
    /// successor.
    pub fn stage_transition(self) -> StageTransition {
        match self {
            ReportSection::Market => StageTransition {
                completes: AgentName::MarketAnalyst,
                starts: Some(AgentName::SocialAnalyst),
            },
            ReportSection::Sentiment => StageTransition {
                completes: AgentName::SocialAnalyst,
                starts: Some(AgentName::NewsAnalyst),
            },
            ReportSection::News => StageTransition {
                completes: AgentName::NewsAnalyst,
                starts: Some(AgentName::FundamentalsAnalyst),
            },
            ReportSection::Fundamentals => StageTransition {
                completes: AgentName::FundamentalsAnalyst,
                starts: None,
            },
            ReportSection::InvestmentPlan => StageTransition {
                completes: AgentName::ResearchManager,
                starts: Some(AgentName::Trader),
            },
            ReportSection::TraderInvestmentPlan => StageTransition {
                completes: AgentName::Trader,
                starts: Some(AgentName::RiskyAnalyst),
            },
            ReportSection::FinalTradeDecision => StageTransition {
                completes: AgentName::PortfolioManager,
                starts: None,
            },
        }
    }
}

impl fmt::Display for ReportSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One row of the stage-dependency table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTransition {
    pub completes: AgentName,
    pub starts: Option<AgentName>,
}
