//! Grid and simulation snapshots, plus the JSON shapes the backend sends.
//!
//! The wire structs mirror the HTTP payloads field-for-field and tolerate
//! missing optional fields. Conversion into the domain types validates bounds
//! and applies defaults (reward 0, empty path).

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, ViewError};
use crate::geometry::CellPos;
use crate::resources::ResourceIndex;

/// Reserved name of the synthetic agent that combines the other models.
pub const ENSEMBLE: &str = "ensemble";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridWire {
    pub grid_size_x: u32,
    pub grid_size_y: u32,
    #[serde(default)]
    pub resources: Vec<[i32; 2]>,
    #[serde(default)]
    pub resource_map: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentWire {
    #[serde(default)]
    pub agent_pos: Option<[i32; 2]>,
    #[serde(default)]
    pub goal_pos: Option<[i32; 2]>,
    #[serde(default)]
    pub path: Vec<[i32; 2]>,
    #[serde(default)]
    pub reward: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationWire {
    #[serde(default)]
    pub active_models: Vec<String>,
    #[serde(default)]
    pub states: HashMap<String, AgentWire>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridSnapshot {
    pub width: u32,
    pub height: u32,
    /// Sorted, deduplicated, all within bounds.
    pub resources: Vec<CellPos>,
    pub resource_names: HashMap<CellPos, String>,
}

impl Default for GridSnapshot {
    /// Placeholder shown before `/grid` has answered.
    fn default() -> Self {
        Self {
            width: 10,
            height: 10,
            resources: Vec::new(),
            resource_names: HashMap::new(),
        }
    }
}

impl GridSnapshot {
    pub fn in_bounds(&self, cell: CellPos) -> bool {
        cell.x >= 0 && cell.y >= 0 && (cell.x as u32) < self.width && (cell.y as u32) < self.height
    }

    pub fn index(&self) -> ResourceIndex {
        ResourceIndex::new(
            self.resources.iter().copied(),
            self.resource_names
                .iter()
                .map(|(cell, name)| (*cell, name.clone())),
        )
    }
}

impl TryFrom<GridWire> for GridSnapshot {
    type Error = ViewError;

    fn try_from(wire: GridWire) -> Result<Self> {
        if wire.grid_size_x == 0 || wire.grid_size_y == 0 {
            return Err(ViewError::InvalidGrid {
                width: wire.grid_size_x,
                height: wire.grid_size_y,
            });
        }

        let mut grid = GridSnapshot {
            width: wire.grid_size_x,
            height: wire.grid_size_y,
            resources: Vec::with_capacity(wire.resources.len()),
            resource_names: HashMap::with_capacity(wire.resource_map.len()),
        };

        for raw in wire.resources {
            let cell = CellPos::from(raw);
            if grid.in_bounds(cell) {
                grid.resources.push(cell);
            } else {
                warn!(x = cell.x, y = cell.y, "dropping resource outside the grid");
            }
        }
        grid.resources.sort_unstable();
        grid.resources.dedup();

        for (key, name) in wire.resource_map {
            match CellPos::parse_key(&key) {
                Some(cell) => {
                    grid.resource_names.insert(cell, name);
                }
                None => warn!(%key, "dropping unparsable resource_map key"),
            }
        }

        Ok(grid)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentState {
    pub position: Option<CellPos>,
    pub goal: Option<CellPos>,
    /// Visit order; may contain repeats.
    pub path: Vec<CellPos>,
    pub reward: f64,
}

impl AgentState {
    /// True only when both position and goal are known and equal.
    pub fn has_arrived(&self) -> bool {
        matches!((self.position, self.goal), (Some(p), Some(g)) if p == g)
    }

    /// The subsequence of `path` on resource cells, duplicates kept.
    pub fn resource_visits(&self, resources: &ResourceIndex) -> Vec<CellPos> {
        self.path
            .iter()
            .copied()
            .filter(|c| resources.is_resource(*c))
            .collect()
    }

    /// The last two resource visits, if there are at least two.
    pub fn latest_segment(&self, resources: &ResourceIndex) -> Option<(CellPos, CellPos)> {
        let mut last = None;
        let mut prev = None;
        for cell in self.path.iter().copied() {
            if resources.is_resource(cell) {
                prev = last;
                last = Some(cell);
            }
        }
        Some((prev?, last?))
    }
}

impl From<AgentWire> for AgentState {
    fn from(w: AgentWire) -> Self {
        Self {
            position: w.agent_pos.map(CellPos::from),
            goal: w.goal_pos.map(CellPos::from),
            path: w.path.into_iter().map(CellPos::from).collect(),
            reward: w.reward.filter(|r| r.is_finite()).unwrap_or(0.0),
        }
    }
}

/// How an agent is placed in the draw order and coloured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentRole {
    Ensemble,
    /// Position within `active_models`.
    Active(usize),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationSnapshot {
    /// Unique, in backend order.
    pub active_models: Vec<String>,
    pub states: HashMap<String, AgentState>,
}

impl SimulationSnapshot {
    pub fn agent(&self, name: &str) -> Option<&AgentState> {
        self.states.get(name)
    }

    /// Agents that are actually drawn: the ensemble first (if it has state),
    /// then each active model that has state, in list order. Active models
    /// without state are skipped.
    pub fn drawn_agents(&self) -> Vec<(&str, AgentRole, &AgentState)> {
        let mut out = Vec::with_capacity(self.active_models.len() + 1);
        if let Some(s) = self.states.get(ENSEMBLE) {
            out.push((ENSEMBLE, AgentRole::Ensemble, s));
        }
        for (i, name) in self.active_models.iter().enumerate() {
            if name == ENSEMBLE {
                continue;
            }
            if let Some(s) = self.states.get(name) {
                out.push((name.as_str(), AgentRole::Active(i), s));
            }
        }
        out
    }

    /// Every active model stands on its own goal. False when nothing is active.
    pub fn all_active_arrived(&self) -> bool {
        !self.active_models.is_empty()
            && self
                .active_models
                .iter()
                .all(|name| self.states.get(name).is_some_and(AgentState::has_arrived))
    }
}

impl From<SimulationWire> for SimulationSnapshot {
    fn from(w: SimulationWire) -> Self {
        let mut active_models: Vec<String> = Vec::with_capacity(w.active_models.len());
        for name in w.active_models {
            if !active_models.contains(&name) {
                active_models.push(name);
            }
        }
        Self {
            active_models,
            states: w
                .states
                .into_iter()
                .map(|(name, s)| (name, AgentState::from(s)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(cells: &[(i32, i32)]) -> ResourceIndex {
        ResourceIndex::new(cells.iter().map(|&(x, y)| CellPos::new(x, y)), [])
    }

    fn path(cells: &[(i32, i32)]) -> Vec<CellPos> {
        cells.iter().map(|&(x, y)| CellPos::new(x, y)).collect()
    }

    #[test]
    fn visit_sequence_keeps_duplicates_and_order() {
        let res = index(&[(0, 0), (1, 1)]);
        let agent = AgentState {
            path: path(&[(0, 0), (0, 1), (1, 1), (1, 1)]),
            ..AgentState::default()
        };
        assert_eq!(agent.resource_visits(&res), path(&[(0, 0), (1, 1), (1, 1)]));
        assert_eq!(
            agent.latest_segment(&res),
            Some((CellPos::new(1, 1), CellPos::new(1, 1)))
        );
    }

    #[test]
    fn fewer_than_two_visits_has_no_segment() {
        let res = index(&[(0, 0)]);
        let agent = AgentState {
            path: path(&[(0, 0), (0, 1), (0, 2)]),
            ..AgentState::default()
        };
        assert_eq!(agent.latest_segment(&res), None);
        assert_eq!(AgentState::default().latest_segment(&res), None);
    }

    #[test]
    fn missing_fields_get_defaults() {
        let raw = r#"{"active_models":["m1","m1","m2"],"states":{"m1":{"agent_pos":[1,2]}}}"#;
        let snap: SimulationSnapshot = serde_json::from_str::<SimulationWire>(raw).unwrap().into();
        assert_eq!(snap.active_models, vec!["m1", "m2"]);
        let m1 = snap.agent("m1").unwrap();
        assert_eq!(m1.position, Some(CellPos::new(1, 2)));
        assert_eq!(m1.goal, None);
        assert!(m1.path.is_empty());
        assert_eq!(m1.reward, 0.0);
        assert!(!m1.has_arrived());
    }

    #[test]
    fn drawn_agents_skip_missing_state_and_put_ensemble_first() {
        let mut snap = SimulationSnapshot {
            active_models: vec!["a".into(), "missing".into(), "b".into()],
            ..Default::default()
        };
        snap.states.insert("a".into(), AgentState::default());
        snap.states.insert("b".into(), AgentState::default());
        snap.states.insert(ENSEMBLE.into(), AgentState::default());

        let drawn: Vec<(&str, AgentRole)> =
            snap.drawn_agents().into_iter().map(|(n, r, _)| (n, r)).collect();
        assert_eq!(
            drawn,
            vec![
                (ENSEMBLE, AgentRole::Ensemble),
                ("a", AgentRole::Active(0)),
                ("b", AgentRole::Active(2)),
            ]
        );
    }

    #[test]
    fn arrival_uses_each_agents_own_goal() {
        let at = |p: (i32, i32), g: (i32, i32)| AgentState {
            position: Some(CellPos::new(p.0, p.1)),
            goal: Some(CellPos::new(g.0, g.1)),
            ..AgentState::default()
        };
        let mut snap = SimulationSnapshot {
            active_models: vec!["a".into(), "b".into()],
            ..Default::default()
        };
        snap.states.insert("a".into(), at((3, 3), (3, 3)));
        snap.states.insert("b".into(), at((0, 4), (0, 4)));
        assert!(snap.all_active_arrived());

        snap.states.insert("b".into(), at((0, 3), (0, 4)));
        assert!(!snap.all_active_arrived());

        snap.states.remove("b");
        assert!(!snap.all_active_arrived());

        assert!(!SimulationSnapshot::default().all_active_arrived());
    }

    #[test]
    fn grid_conversion_validates() {
        let wire = GridWire {
            grid_size_x: 2,
            grid_size_y: 2,
            resources: vec![[1, 1], [0, 0], [5, 0], [1, 1]],
            resource_map: [("0,0".to_string(), "Book".to_string()), ("x".into(), "Bad".into())]
                .into_iter()
                .collect(),
        };
        let grid = GridSnapshot::try_from(wire).unwrap();
        assert_eq!(grid.resources, vec![CellPos::new(0, 0), CellPos::new(1, 1)]);
        assert_eq!(grid.index().name_at(CellPos::new(0, 0)), Some("Book"));
        assert_eq!(grid.resource_names.len(), 1);

        let empty = GridWire {
            grid_size_x: 0,
            grid_size_y: 3,
            resources: vec![],
            resource_map: HashMap::new(),
        };
        assert!(matches!(
            GridSnapshot::try_from(empty),
            Err(ViewError::InvalidGrid { width: 0, height: 3 })
        ));
    }
}
