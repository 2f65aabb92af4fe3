use crate::geometry::CellMapper;
use crate::resources::ResourceIndex;

/// Tooltip offset from the pointer so it does not sit under the cursor.
pub const TOOLTIP_OFFSET_PX: f64 = 12.0;

#[derive(Debug, Clone, PartialEq)]
pub struct HoverInfo {
    pub left_px: f64,
    pub top_px: f64,
    pub name: String,
}

/// Resolve the resource under a pointer at canvas-relative `(px, py)`.
/// Cells outside the grid, non-resource cells and unnamed resources yield `None`.
pub fn inspect(mapper: &CellMapper, resources: &ResourceIndex, px: f64, py: f64) -> Option<HoverInfo> {
    let cell = mapper.pixel_to_cell(px, py)?;
    let name = resources.name_at(cell)?;
    Some(HoverInfo {
        left_px: px + TOOLTIP_OFFSET_PX,
        top_px: py + TOOLTIP_OFFSET_PX,
        name: name.to_string(),
    })
}
