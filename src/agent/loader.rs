//! Crew loading from `crew.yaml`

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use super::role::RoleAgent;

/// On-disk crew declaration. Agent order is the order they run in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrewFile {
    pub agents: Vec<RoleAgent>,
}

pub struct CrewLoader {
    crew_path: PathBuf,
}

impl CrewLoader {
    pub fn new(crew_path: PathBuf) -> Self {
        Self { crew_path }
    }

    pub fn crew_path(&self) -> &Path {
        &self.crew_path
    }

    /// Load the declared crew, or the built-in crew when no file exists
    pub fn load(&self) -> Result<Vec<RoleAgent>> {
        if !self.crew_path.exists() {
            log::debug!("No crew file at {}, using default crew", self.crew_path.display());
            return Ok(RoleAgent::default_crew());
        }

        let content = fs::read_to_string(&self.crew_path)
            .with_context(|| format!("Failed to read crew file: {}", self.crew_path.display()))?;
        let crew: CrewFile = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse crew file: {}", self.crew_path.display()))?;

        if crew.agents.is_empty() {
            eyre::bail!("Crew file {} declares no agents", self.crew_path.display());
        }
        ensure_unique_roles(&crew.agents)?;

        log::info!(
            "Loaded {} agents from {}",
            crew.agents.len(),
            self.crew_path.display()
        );
        Ok(crew.agents)
    }

    /// Find an agent by role name (case-insensitive)
    pub fn get(&self, role: &str) -> Result<Option<RoleAgent>> {
        Ok(self
            .load()?
            .into_iter()
            .find(|a| a.role.eq_ignore_ascii_case(role)))
    }

    /// Write the default crew as an editable template
    pub fn write_template(&self, force: bool) -> Result<bool> {
        if self.crew_path.exists() && !force {
            return Ok(false);
        }
        if let Some(parent) = self.crew_path.parent() {
            fs::create_dir_all(parent).context("Failed to create crew directory")?;
        }

        fs::write(&self.crew_path, template()?)
            .with_context(|| format!("Failed to write crew file: {}", self.crew_path.display()))?;
        Ok(true)
    }
}

/// Role names key the plan result, so two agents may not share one
pub fn ensure_unique_roles(agents: &[RoleAgent]) -> Result<()> {
    let mut seen = HashSet::new();
    for agent in agents {
        if !seen.insert(agent.role.as_str()) {
            eyre::bail!("Duplicate agent role '{}': role names must be unique", agent.role);
        }
    }
    Ok(())
}

fn template() -> Result<String> {
    let crew = CrewFile {
        agents: RoleAgent::default_crew(),
    };
    let body = serde_yaml::to_string(&crew).context("Failed to serialize default crew")?;

    Ok(format!(
        "# Crew for tripcrew plan\n\
         # Agents run top to bottom; each contributes one section of the plan.\n\
         # Role names must be unique.\n\
         \n\
         {}",
        body
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_yields_default_crew() {
        let dir = tempdir().unwrap();
        let loader = CrewLoader::new(dir.path().join("crew.yaml"));

        let crew = loader.load().unwrap();
        let roles: Vec<&str> = crew.iter().map(|a| a.role.as_str()).collect();
        assert_eq!(roles, ["Flight Specialist", "Accommodation Expert", "Activity Planner"]);
    }

    #[test]
    fn test_load_preserves_declared_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("crew.yaml");
        fs::write(
            &path,
            r#"
agents:
  - role: Activity Planner
    goal: Create an itinerary
    backstory: Loves planning memorable trips
  - role: Budget Analyst
    goal: Keep the trip on budget
    backstory: Counts every cent
    capabilities:
      - name: Calculator
        description: Sum up costs
"#,
        )
        .unwrap();

        let crew = CrewLoader::new(path).load().unwrap();
        assert_eq!(crew.len(), 2);
        assert_eq!(crew[0].role, "Activity Planner");
        assert_eq!(crew[1].capabilities[0].name, "Calculator");
    }

    #[test]
    fn test_duplicate_roles_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("crew.yaml");
        fs::write(
            &path,
            r#"
agents:
  - role: Planner
    goal: a
    backstory: b
  - role: Planner
    goal: c
    backstory: d
"#,
        )
        .unwrap();

        let err = CrewLoader::new(path).load().unwrap_err();
        assert!(format!("{:#}", err).contains("Duplicate agent role 'Planner'"));
    }

    #[test]
    fn test_empty_crew_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("crew.yaml");
        fs::write(&path, "agents: []\n").unwrap();

        assert!(CrewLoader::new(path).load().is_err());
    }

    #[test]
    fn test_template_roundtrips_to_default_crew() {
        let dir = tempdir().unwrap();
        let loader = CrewLoader::new(dir.path().join("nested").join("crew.yaml"));

        assert!(loader.write_template(false).unwrap());
        assert!(!loader.write_template(false).unwrap());
        assert_eq!(loader.load().unwrap(), RoleAgent::default_crew());
    }

    #[test]
    fn test_get_is_case_insensitive() {
        let dir = tempdir().unwrap();
        let loader = CrewLoader::new(dir.path().join("crew.yaml"));

        let agent = loader.get("activity planner").unwrap().unwrap();
        assert_eq!(agent.goal, "Create an itinerary");
        assert!(loader.get("Chauffeur").unwrap().is_none());
    }
}
