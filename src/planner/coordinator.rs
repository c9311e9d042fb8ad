use eyre::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::request::TripRequest;
use crate::agent::loader::ensure_unique_roles;
use crate::agent::role::is_failure;
use crate::agent::RoleAgent;
use crate::gateway::CompletionGateway;

/// Generated plan text keyed by role, in agent declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanResult {
    entries: IndexMap<String, String>,
}

impl PlanResult {
    #[allow(dead_code)] // lookup by role; the CLI only iterates
    pub fn get(&self, role: &str) -> Option<&str> {
        self.entries.get(role).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[allow(dead_code)] // companion to len()
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Roles whose entry is an absorbed gateway failure
    pub fn failed_roles(&self) -> Vec<&str> {
        self.iter().filter(|(_, text)| is_failure(text)).map(|(role, _)| role).collect()
    }
}

impl FromIterator<(String, String)> for PlanResult {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Task description handed to one agent
pub fn task_description(agent: &RoleAgent, request: &TripRequest) -> String {
    format!(
        "Plan a trip from {origin} to {destination} for {travelers} travelers.\n\
         - Dates: {dates}\n\
         - Budget: ${budget}\n\
         - Preferences: {preferences}\n\
         \n\
         Your task: {goal}",
        origin = request.origin,
        destination = request.destination,
        travelers = request.travelers,
        dates = request.dates,
        budget = request.budget,
        preferences = request.preferences,
        goal = agent.goal,
    )
}

/// (role, prompt) for every agent, in run order
pub fn preview_prompts(agents: &[RoleAgent], request: &TripRequest) -> Vec<(String, String)> {
    agents
        .iter()
        .map(|agent| (agent.role.clone(), agent.prompt(&task_description(agent, request))))
        .collect()
}

/// Runs every agent of a crew, one after another, against one gateway
pub struct Coordinator<G> {
    agents: Vec<RoleAgent>,
    gateway: G,
    model: String,
}

impl<G: CompletionGateway> Coordinator<G> {
    pub fn new(agents: Vec<RoleAgent>, gateway: G, model: impl Into<String>) -> Result<Self> {
        ensure_unique_roles(&agents)?;
        Ok(Self {
            agents,
            gateway,
            model: model.into(),
        })
    }

    pub fn agents(&self) -> &[RoleAgent] {
        &self.agents
    }

    /// Invoke each agent exactly once, in order. Never aborts on an agent failure.
    pub fn execute_plan(&self, request: &TripRequest) -> PlanResult {
        log::info!(
            "Planning {} with {} agents (model={})",
            request.summary(),
            self.agents.len(),
            self.model
        );

        let result: PlanResult = self
            .agents
            .iter()
            .map(|agent| {
                log::debug!("Running agent: {}", agent.role);
                let task = task_description(agent, request);
                (agent.role.clone(), agent.execute(&self.gateway, &self.model, &task))
            })
            .collect();

        let failed = result.failed_roles();
        if failed.is_empty() {
            log::info!("Plan complete: {} sections", result.len());
        } else {
            log::warn!("Plan complete with {} failed sections: {}", failed.len(), failed.join(", "));
        }
        result
    }
}
