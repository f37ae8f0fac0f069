//! Agent lifecycle event tags.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

/// Every event type the backend agent runtime can emit.
///
/// The wire encoding is `snake_case` for both serde and `FromStr`/`Display`,
/// so `"work_plan".parse::<EventType>()` and `EventType::WorkPlan.to_string()`
/// agree with the JSON representation.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventType {
    /// A complete assistant or user message.
    Message,
    /// Agent reasoning output.
    Thought,
    /// Streaming fragment of a thought.
    ThoughtDelta,
    /// A tool invocation.
    Act,
    /// The result of a tool invocation.
    Observe,
    /// A plan of steps for the current task.
    WorkPlan,
    StepStart,
    StepEnd,
    TextStart,
    TextDelta,
    TextEnd,
    /// HITL: the agent asks the user to clarify something.
    ClarificationAsked,
    ClarificationAnswered,
    /// HITL: the agent asks the user to pick between options.
    DecisionAsked,
    DecisionAnswered,
    /// HITL: the agent needs an environment variable value.
    EnvVarRequested,
    EnvVarProvided,
    /// HITL: the agent asks for permission to run a tool.
    PermissionAsked,
    PermissionReplied,
    /// Result of a pattern inspection.
    PatternMatch,
    Complete,
    Error,
}

impl EventType {
    /// Returns all event types in declaration order.
    pub fn all() -> Vec<EventType> {
        EventType::iter().collect()
    }

    /// Returns true for human-in-the-loop requests and their replies.
    pub const fn is_hitl(&self) -> bool {
        matches!(
            self,
            EventType::ClarificationAsked
                | EventType::ClarificationAnswered
                | EventType::DecisionAsked
                | EventType::DecisionAnswered
                | EventType::EnvVarRequested
                | EventType::EnvVarProvided
                | EventType::PermissionAsked
                | EventType::PermissionReplied
        )
    }
}
