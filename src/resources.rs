use hashbrown::{HashMap, HashSet};

use crate::geometry::CellPos;

/// O(1) lookup of resource cells and their display names.
///
/// Built once per grid fetch and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceIndex {
    cells: HashSet<CellPos>,
    names: HashMap<CellPos, String>,
}

impl ResourceIndex {
    pub fn new(
        resources: impl IntoIterator<Item = CellPos>,
        names: impl IntoIterator<Item = (CellPos, String)>,
    ) -> Self {
        Self {
            cells: resources.into_iter().collect(),
            names: names.into_iter().collect(),
        }
    }

    pub fn is_resource(&self, cell: CellPos) -> bool {
        self.cells.contains(&cell)
    }

    /// Name of the resource at `cell`. A name without a matching resource cell
    /// is not reported.
    pub fn name_at(&self, cell: CellPos) -> Option<&str> {
        if !self.is_resource(cell) {
            return None;
        }
        self.names.get(&cell).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_hit_only_resource_cells() {
        let idx = ResourceIndex::new(
            [CellPos::new(0, 0), CellPos::new(1, 1)],
            [
                (CellPos::new(0, 0), "Book".to_string()),
                (CellPos::new(2, 2), "Orphan".to_string()),
            ],
        );
        assert!(idx.is_resource(CellPos::new(1, 1)));
        assert!(!idx.is_resource(CellPos::new(1, 0)));
        assert_eq!(idx.name_at(CellPos::new(0, 0)), Some("Book"));
        assert_eq!(idx.name_at(CellPos::new(1, 1)), None);
        assert_eq!(idx.name_at(CellPos::new(2, 2)), None);
        assert_eq!(idx.len(), 2);
    }

    #[test]
    fn duplicate_resources_collapse() {
        let idx = ResourceIndex::new([CellPos::new(3, 1), CellPos::new(3, 1)], []);
        assert_eq!(idx.len(), 1);
        assert!(idx.is_resource(CellPos::new(3, 1)));
    }
}
