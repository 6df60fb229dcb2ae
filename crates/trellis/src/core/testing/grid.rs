//! Grid test utility for building regular layouts of focusable cells.

use crate::{
    core::{coords::PositionBase, id::WidgetId, scene::Scene},
    error::Result,
    widget::{WidgetKind, WidgetTemplate},
};

/// A builder for a panel holding `rows` x `cols` buttons named `cell_<r>_<c>`,
/// laid out in owner-relative pixels.
#[derive(Debug, Clone, Copy)]
pub struct Grid {
    /// Number of rows.
    rows: usize,
    /// Number of columns.
    cols: usize,
    /// Side of each square cell.
    cell: f32,
    /// Space between cells.
    gap: f32,
}

/// Handles to a grid built into a scene.
#[derive(Debug, Clone)]
pub struct GridWidgets {
    /// The containing panel.
    pub container: WidgetId,
    /// Cells in row-major order.
    pub cells: Vec<Vec<WidgetId>>,
}

impl GridWidgets {
    /// The cell at a row and column.
    ///
    /// # Panics
    ///
    /// Panics if the position is outside the grid.
    pub fn cell(&self, row: usize, col: usize) -> WidgetId {
        self.cells[row][col]
    }

    /// Grid dimensions as (rows, cols).
    pub fn dimensions(&self) -> (usize, usize) {
        (self.cells.len(), self.cells.first().map_or(0, Vec::len))
    }
}

impl Grid {
    /// A grid of 10 pixel cells with a 2 pixel gap.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cell: 10.0,
            gap: 2.0,
        }
    }

    /// Set the cell size and gap.
    pub fn spacing(mut self, cell: f32, gap: f32) -> Self {
        self.cell = cell;
        self.gap = gap;
        self
    }

    /// The template for the whole grid.
    pub fn template(&self, name: &str) -> WidgetTemplate {
        let mut t = WidgetTemplate::new(name, WidgetKind::Panel).bounds(
            0.0,
            0.0,
            1.0,
            1.0,
            PositionBase::PercentageOwner,
        );
        let pitch = self.cell + self.gap;
        for r in 0..self.rows {
            for c in 0..self.cols {
                t = t.child(
                    WidgetTemplate::new(
                        &format!("cell_{r}_{c}"),
                        WidgetKind::Button {
                            caption: format!("{r},{c}"),
                        },
                    )
                    .bounds(
                        c as f32 * pitch,
                        r as f32 * pitch,
                        self.cell,
                        self.cell,
                        PositionBase::PixelOwner,
                    ),
                );
            }
        }
        t
    }

    /// Create the grid and attach it under the scene root.
    pub fn build(&self, scene: &mut Scene) -> Result<GridWidgets> {
        let container = scene.create_widget(&self.template("grid"))?;
        scene.insert_child(scene.root(), container)?;
        let flat = scene.children(container)?.to_vec();
        let cells = flat.chunks(self.cols.max(1)).map(<[WidgetId]>::to_vec).collect();
        Ok(GridWidgets { container, cells })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{resolve::PositionResolver, viewport::FixedViewport};

    #[test]
    fn cells_are_laid_out() {
        let mut s = Scene::default().with_viewport(FixedViewport::new(100.0, 100.0));
        let g = Grid::new(3, 4).spacing(20.0, 5.0).build(&mut s).unwrap();
        assert_eq!(g.dimensions(), (3, 4));
        s.update().unwrap();
        let r = s.pixel_rect(g.cell(2, 3)).unwrap();
        assert_eq!((r.left, r.top, r.right, r.bottom), (75.0, 50.0, 95.0, 70.0));
        assert_eq!(s.widget(g.cell(1, 2)).unwrap().name(), &"cell_1_2");
    }
}
