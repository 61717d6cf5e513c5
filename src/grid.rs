//! Grid geometry for workspaces.
//!
//! Workspaces are laid out row-major in a `cols × rows` grid whose shape is
//! a pure function of the workspace count: `cols = ⌈√N⌉`,
//! `rows = ⌈N / cols⌉`.  Workspace `i` sits at column `i % cols`, row
//! `i / cols`.
//!
//! [`GridLayout`] answers the three questions the pager and the overview
//! ask of that grid:
//!
//! * where does each workspace slide to when another one is current
//!   ([`GridLayout::slide_offset`]),
//! * which cell is under a point on the output ([`GridLayout::cell_at`]),
//! * where and how small is each workspace in the overview
//!   ([`GridLayout::overview`]).
//!
//! Positions are `(col, row)` pairs throughout.

use glam::Vec2;

/// Shape of the workspace grid for a given workspace count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    cols: usize,
    rows: usize,
    count: usize,
}

impl GridLayout {
    /// Grid shape for `count` workspaces.  An empty pager still gets one
    /// column so cell arithmetic never divides by zero.
    pub fn for_count(count: usize) -> Self {
        let mut cols = 1;
        while cols * cols < count {
            cols += 1;
        }
        let rows = count.div_ceil(cols);
        Self { cols, rows, count }
    }

    /// Grid dimensions as `(cols, rows)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Cell of workspace `index` as `(col, row)`.
    pub fn cell_of(&self, index: usize) -> (usize, usize) {
        (index % self.cols, index / self.cols)
    }

    /// Workspace index at `(col, row)`, if that cell holds one.
    pub fn index_of(&self, col: usize, row: usize) -> Option<usize> {
        if col >= self.cols {
            return None;
        }
        let index = row * self.cols + col;
        (index < self.count).then_some(index)
    }

    /// Translation that places workspace `index` relative to `current`
    /// when every workspace is one output in size.  `current` itself always
    /// lands at the origin.
    pub fn slide_offset(&self, index: usize, current: usize, output: Vec2) -> Vec2 {
        let (col, row) = self.cell_of(index);
        let (cur_col, cur_row) = self.cell_of(current);
        Vec2::new(
            col as f32 * output.x - cur_col as f32 * output.x,
            row as f32 * output.y - cur_row as f32 * output.y,
        )
    }

    /// Size of one overview picking cell: the output divided evenly
    /// (whole pixels) among the columns and rows.
    pub fn cell_size(&self, width: u32, height: u32) -> Vec2 {
        let cols = self.cols as u32;
        let rows = self.rows.max(1) as u32;
        Vec2::new((width / cols).max(1) as f32, (height / rows).max(1) as f32)
    }

    /// Workspace whose picking cell contains `point` on a `width × height`
    /// output.
    pub fn cell_at(&self, point: Vec2, width: u32, height: u32) -> Option<usize> {
        if point.x < 0.0 || point.y < 0.0 {
            return None;
        }
        let cell = self.cell_size(width, height);
        let col = (point.x / cell.x) as usize;
        let row = (point.y / cell.y) as usize;
        self.index_of(col, row)
    }

    /// Overview placement on a `width × height` output with margins of
    /// `1 / margin_divisor` of the output on each axis.
    pub fn overview(&self, width: u32, height: u32, margin_divisor: u32) -> OverviewLayout {
        let divisor = margin_divisor.max(1);
        let margin = Vec2::new((width / divisor) as f32, (height / divisor) as f32);
        let size = Vec2::new(width as f32, height as f32);
        let cols = self.cols as f32;
        let rows = self.rows.max(1) as f32;

        let rx = (1.0 - (1.0 + cols) * margin.x / size.x) / cols;
        let ry = (1.0 - (1.0 + rows) * margin.y / size.y) / rows;

        OverviewLayout {
            grid: *self,
            scale: rx.min(ry),
            margin,
            size,
        }
    }
}

/// Where each workspace goes while the overview is shown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverviewLayout {
    grid: GridLayout,
    scale: f32,
    margin: Vec2,
    size: Vec2,
}

impl OverviewLayout {
    /// Uniform scale applied to every workspace.  The smaller of the
    /// width- and height-constrained ratios, so no two cells overlap.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn margin(&self) -> Vec2 {
        self.margin
    }

    /// Top-left corner of workspace `index` in the overview.
    pub fn cell_origin(&self, index: usize) -> Vec2 {
        let (col, row) = self.grid.cell_of(index);
        let (cols, rows) = self.grid.dimensions();
        let (cols, rows) = (cols as f32, rows.max(1) as f32);
        let (col, row) = (col as f32, row as f32);
        Vec2::new(
            col * (self.size.x - self.margin.x * (1.0 + cols)) / cols + (1.0 + col) * self.margin.x,
            row * (self.size.y - self.margin.y * (1.0 + rows)) / rows + (1.0 + row) * self.margin.y,
        )
    }
}

//  Tests
