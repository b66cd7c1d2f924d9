use crate::PlannerError;
use serde::{Deserialize, Serialize};
use spirebot_core::PlannedSequence;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundStats {
    pub depth: usize,
    pub expanded: usize,
    pub deduped: usize,
    pub beam: usize,
    pub best_score: f64,
    pub elapsed_ms: u64,
}

/// An action whose magnitude came from the conservative fallback rather
/// than real data; collected for offline tuning of the effect book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissingEffectRecord {
    pub action_key: String,
    pub id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanTrace {
    pub legal_actions: usize,
    pub lethal: bool,
    pub timed_out: bool,
    pub fallback_used: bool,
    pub rounds: Vec<RoundStats>,
    pub missing_effects: Vec<MissingEffectRecord>,
    pub wall_time_ms: u64,
}

impl PlanTrace {
    pub fn note_missing(&mut self, action_key: String, id: String) {
        if self.missing_effects.iter().any(|record| record.id == id) {
            return;
        }
        self.missing_effects.push(MissingEffectRecord { action_key, id });
    }
}

/// One planning call, packaged for inspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanReport {
    pub sequence: PlannedSequence,
    pub trace: PlanTrace,
}

impl PlanReport {
    pub fn to_text_report(&self) -> String {
        let mut lines = vec![
            format!(
                "plan: {} action(s), score {:.2}, energy {}, projected hp {}{}",
                self.sequence.actions.len(),
                self.sequence.score,
                self.sequence.energy_spent,
                self.sequence.projected_hp,
                if self.sequence.lethal { " [lethal]" } else { "" }
            ),
            format!(
                "search: {} legal, {} round(s), {} ms{}{}",
                self.trace.legal_actions,
                self.trace.rounds.len(),
                self.trace.wall_time_ms,
                if self.trace.timed_out { ", timed out" } else { "" },
                if self.trace.fallback_used {
                    ", fast-score fallback"
                } else {
                    ""
                }
            ),
        ];
        for action in &self.sequence.actions {
            lines.push(format!("  {}", action.short_label()));
        }
        for round in &self.trace.rounds {
            lines.push(format!(
                "  round {}: expanded {} -> deduped {} -> beam {} (best {:.2}, {} ms)",
                round.depth, round.expanded, round.deduped, round.beam, round.best_score,
                round.elapsed_ms
            ));
        }
        if !self.trace.missing_effects.is_empty() {
            lines.push("missing effect data:".to_string());
            for record in &self.trace.missing_effects {
                lines.push(format!("  {} ({})", record.id, record.action_key));
            }
        }
        lines.join("\n")
    }
}

pub fn write_json(path: &Path, report: &PlanReport) -> Result<(), PlannerError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let body = serde_json::to_string_pretty(report)?;
    fs::write(path, body)?;
    Ok(())
}

pub fn write_text(path: &Path, report: &PlanReport) -> Result<(), PlannerError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, report.to_text_report())?;
    Ok(())
}
