//! Rows for the agent status panel.

use crate::fmt::fmt_f64_compact;
use crate::geometry::CellPos;
use crate::palette::{Color, Palette};
use crate::snapshot::{AgentRole, SimulationSnapshot};

#[derive(Debug, Clone, PartialEq)]
pub struct AgentStatusRow {
    pub name: String,
    pub color: Color,
    pub position: Option<CellPos>,
    pub reward: f64,
    pub arrived: bool,
}

impl AgentStatusRow {
    pub fn position_label(&self) -> String {
        match self.position {
            Some(p) => format!("[{}, {}]", p.x, p.y),
            None => "unknown".to_string(),
        }
    }

    pub fn reward_label(&self) -> String {
        format!("{} points", fmt_f64_compact(self.reward, 2))
    }
}

/// Same agents and colours as the canvas: ensemble first, then active models
/// with state. Models without state are silently left out.
pub fn agent_status_rows(sim: &SimulationSnapshot, palette: &Palette) -> Vec<AgentStatusRow> {
    sim.drawn_agents()
        .into_iter()
        .map(|(name, role, state)| AgentStatusRow {
            name: name.to_string(),
            color: palette.color_for(role),
            position: state.position,
            reward: state.reward,
            arrived: role != AgentRole::Ensemble && state.has_arrived(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::MODEL_COLORS;
    use crate::snapshot::AgentState;

    #[test]
    fn rows_skip_missing_and_default_reward() {
        let mut sim = SimulationSnapshot {
            active_models: vec!["a".into(), "missing".into()],
            ..Default::default()
        };
        sim.states.insert(
            "a".into(),
            AgentState {
                position: Some(CellPos::new(1, 1)),
                goal: Some(CellPos::new(1, 1)),
                ..AgentState::default()
            },
        );
        let rows = agent_status_rows(&sim, &Palette::default());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "a");
        assert_eq!(rows[0].color, MODEL_COLORS[0]);
        assert_eq!(rows[0].position_label(), "[1, 1]");
        assert_eq!(rows[0].reward_label(), "0 points");
        assert!(rows[0].arrived);
    }
}
