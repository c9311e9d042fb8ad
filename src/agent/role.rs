use serde::{Deserialize, Serialize};

use crate::gateway::{CompletionGateway, CompletionRequest, GatewayError};

/// Sampling temperature for every agent call
pub const TEMPERATURE: f32 = 0.7;

/// Prefix marking a plan entry that failed to generate
pub const FAILURE_MARKER: &str = "❌ Error:";

/// A named capability advertised in the prompt. Purely descriptive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    pub name: String,
    pub description: String,
}

impl Capability {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    pub fn search() -> Self {
        Self::new("Search", "Search travel info")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAgent {
    pub role: String,
    pub goal: String,
    pub backstory: String,
    #[serde(default)]
    pub capabilities: Vec<Capability>,
}

impl RoleAgent {
    pub fn new(
        role: impl Into<String>,
        goal: impl Into<String>,
        backstory: impl Into<String>,
        capabilities: Vec<Capability>,
    ) -> Self {
        Self {
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
            capabilities,
        }
    }

    /// The three-agent crew used when no crew file exists
    pub fn default_crew() -> Vec<RoleAgent> {
        vec![
            RoleAgent::new(
                "Flight Specialist",
                "Find best flights",
                "Airfare wizard",
                vec![Capability::search()],
            ),
            RoleAgent::new(
                "Accommodation Expert",
                "Recommend hotels",
                "Hotel finder pro",
                vec![Capability::search()],
            ),
            RoleAgent::new(
                "Activity Planner",
                "Create an itinerary",
                "Loves planning memorable trips",
                vec![Capability::search()],
            ),
        ]
    }

    /// Render capabilities as a bullet list
    pub fn capability_list(&self) -> String {
        self.capabilities
            .iter()
            .map(|c| format!("- {}: {}", c.name, c.description))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Build the full prompt for a task description
    pub fn prompt(&self, task_description: &str) -> String {
        format!(
            "Role: {role}\n\
             Goal: {goal}\n\
             Background: {backstory}\n\
             \n\
             Available Tools:\n\
             {tools}\n\
             \n\
             Task: {task}\n\
             \n\
             Please respond with a well-formatted markdown plan with headers, bullet points, and details.\n",
            role = self.role,
            goal = self.goal,
            backstory = self.backstory,
            tools = self.capability_list(),
            task = task_description.trim(),
        )
    }

    /// Send the rendered prompt to the gateway once
    pub fn run<G: CompletionGateway + ?Sized>(
        &self,
        gateway: &G,
        model: &str,
        task_description: &str,
    ) -> Result<String, GatewayError> {
        let request = CompletionRequest {
            model: model.to_string(),
            prompt: self.prompt(task_description),
            temperature: TEMPERATURE,
        };
        gateway.complete(&request)
    }

    /// Like `run`, but a gateway failure becomes inline error text
    pub fn execute<G: CompletionGateway + ?Sized>(&self, gateway: &G, model: &str, task_description: &str) -> String {
        match self.run(gateway, model, task_description) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("{} failed: {}", self.role, e);
                failure_text(&e)
            }
        }
    }
}

pub fn failure_text(error: &GatewayError) -> String {
    format!("{} {}", FAILURE_MARKER, error)
}

pub fn is_failure(text: &str) -> bool {
    text.starts_with(FAILURE_MARKER)
}
