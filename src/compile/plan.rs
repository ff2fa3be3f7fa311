use std::{
    collections::{BTreeMap, BTreeSet},
    path::Path,
};

use crate::{
    compile::template::Template,
    fixture::config::FixtureGroup,
    foundation::{
        core::{BeatGrid, PanTilt},
        error::{ChoreoError, ChoreoResult},
    },
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NamedPose {
    pub name: String,
    #[serde(flatten)]
    pub pose: PanTilt,
}

/// A template played over a bar window by some or all fixtures.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SectionPlan {
    pub section_id: String,
    pub template_id: String,
    pub start_bar: f64,
    pub end_bar: f64,
    /// Subset of the group; `None` means every fixture.
    #[serde(default)]
    pub fixtures: Option<Vec<String>>,
}

impl SectionPlan {
    pub fn duration_bars(&self) -> f64 {
        self.end_bar - self.start_bar
    }
}

/// Everything needed to render one song.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ShowPlan {
    pub song_duration_ms: u64,
    pub beat_grid: BeatGrid,
    pub fixtures: FixtureGroup,
    #[serde(default)]
    pub pose_overrides: BTreeMap<String, PanTilt>,
    #[serde(default)]
    pub custom_poses: Vec<NamedPose>,
    pub templates: Vec<Template>,
    pub sections: Vec<SectionPlan>,
}

impl ShowPlan {
    pub fn from_json_str(s: &str) -> ChoreoResult<Self> {
        let plan: Self = serde_json::from_str(s).map_err(|e| ChoreoError::serde(e.to_string()))?;
        plan.validate()?;
        Ok(plan)
    }

    pub fn from_path(path: impl AsRef<Path>) -> ChoreoResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ChoreoError::Other(anyhow::anyhow!("read show plan '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> ChoreoResult<()> {
        self.beat_grid.validate()?;
        self.fixtures.validate()?;

        let mut template_ids = BTreeSet::new();
        for t in &self.templates {
            t.validate()?;
            if !template_ids.insert(t.template_id.as_str()) {
                return Err(ChoreoError::validation(format!(
                    "duplicate template_id '{}'",
                    t.template_id
                )));
            }
        }

        let mut section_ids = BTreeSet::new();
        for s in &self.sections {
            if !section_ids.insert(s.section_id.as_str()) {
                return Err(ChoreoError::validation(format!(
                    "duplicate section_id '{}'",
                    s.section_id
                )));
            }
            if !s.start_bar.is_finite() || !s.end_bar.is_finite() || s.end_bar <= s.start_bar {
                return Err(ChoreoError::validation(format!(
                    "section '{}': window must satisfy start_bar < end_bar, got [{}, {}]",
                    s.section_id, s.start_bar, s.end_bar
                )));
            }
            self.template(&s.template_id)?;
            for f in s.fixtures.iter().flatten() {
                self.fixtures.get(f)?;
            }
        }
        Ok(())
    }

    pub fn template(&self, template_id: &str) -> ChoreoResult<&Template> {
        self.templates
            .iter()
            .find(|t| t.template_id == template_id)
            .ok_or_else(|| {
                ChoreoError::unknown(
                    "template",
                    template_id,
                    self.templates.iter().map(|t| t.template_id.clone()),
                )
            })
    }

    pub fn custom_pose_pairs(&self) -> Vec<(String, PanTilt)> {
        self.custom_poses
            .iter()
            .map(|p| (p.name.clone(), p.pose))
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compile/plan.rs"]
mod tests;
