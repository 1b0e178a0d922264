use std::path::Path;

use serde::Serialize;

use crate::content::{ObstacleRecord, SourceAttempt};
use crate::physics::AgentState;
use crate::planning::{JumpSchedule, PlanDiagnostics};
use crate::run::{RunDiagnostics, RunFailure, RunOutcome};

use super::atomic_io::write_text_atomic;
use super::macro_text::render_macro_text;
use super::ArtifactError;

/// Post-mortem record of one run, written whether or not it succeeded.
///
/// `objects` uses the capture encoding, so a report can be replayed as a
/// capture file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
    pub source: Option<String>,
    pub start: Option<AgentState>,
    pub goal_x: Option<f32>,
    pub obstacle_count: usize,
    pub course_fingerprint: Option<String>,
    pub jumps_count: usize,
    pub jumps: Vec<u32>,
    pub plan: Option<PlanDiagnostics>,
    pub sources: Vec<SourceAttempt>,
    pub objects: Vec<ObstacleRecord>,
}

impl RunReport {
    pub fn from_outcome(outcome: &RunOutcome) -> Self {
        let mut report = Self::from_diagnostics(&outcome.diagnostics);
        report.success = true;
        report.jumps_count = outcome.schedule.len();
        report.jumps = outcome.schedule.frames().to_vec();
        report
    }

    pub fn from_failure(failure: &RunFailure) -> Self {
        let mut report = Self::from_diagnostics(&failure.diagnostics);
        report.failure_kind = Some(failure.kind.code());
        report.failure = Some(failure.kind.to_string());
        report
    }

    pub fn from_result(result: &Result<RunOutcome, RunFailure>) -> Self {
        match result {
            Ok(outcome) => Self::from_outcome(outcome),
            Err(failure) => Self::from_failure(failure),
        }
    }

    fn from_diagnostics(diagnostics: &RunDiagnostics) -> Self {
        Self {
            success: false,
            failure_kind: None,
            failure: None,
            source: diagnostics.source.clone(),
            start: diagnostics.start,
            goal_x: diagnostics.goal_x,
            obstacle_count: diagnostics.obstacles.len(),
            course_fingerprint: diagnostics.course_fingerprint.clone(),
            jumps_count: 0,
            jumps: Vec::new(),
            plan: diagnostics.plan.clone(),
            sources: diagnostics.source_attempts.clone(),
            objects: diagnostics
                .obstacles
                .iter()
                .map(ObstacleRecord::from)
                .collect(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

pub fn write_report(path: &Path, report: &RunReport) -> Result<(), ArtifactError> {
    let text = report
        .to_json_pretty()
        .map_err(|source| ArtifactError::Encode {
            path: path.to_path_buf(),
            source,
        })?;
    write_text_atomic(path, &text).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn write_macro(path: &Path, schedule: &JumpSchedule) -> Result<(), ArtifactError> {
    write_text_atomic(path, &render_macro_text(schedule)).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })
}
