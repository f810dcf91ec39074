//! Visualization collaborator (spec.md §6): a read-only sink over flow
//! state. Grounded in the teacher's `plotters` + `colorgrad` dependencies
//! and `original_source/incompressible/simulation.py`'s `dovis` (four-panel
//! velocity/vorticity/divergence plot), reworked from interactive
//! matplotlib into a PNG written per step.

use std::path::{Path, PathBuf};

use plotters::prelude::*;

use crate::error::SolverError;
use crate::grid::{CellArray, Grid2D};
use crate::timestepper::FlowState;
use crate::types::Scalar;

pub trait Visualization {
    fn render(&mut self, flow: &FlowState, grid: &Grid2D, vorticity: &CellArray, divergence: &CellArray) -> Result<(), SolverError>;
}

/// Renders a single PNG with four panels (u, v, vorticity, divergence),
/// one file per call, named by step count.
pub struct PpmSnapshotVisualization {
    output_dir: PathBuf,
}

impl PpmSnapshotVisualization {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        PpmSnapshotVisualization {
            output_dir: output_dir.into(),
        }
    }

    fn panel_colors(&self, field: &CellArray, grid: &Grid2D) -> (Vec<Scalar>, Scalar, Scalar) {
        let mut values = Vec::with_capacity(grid.nx * grid.ny);
        let mut lo = Scalar::INFINITY;
        let mut hi = Scalar::NEG_INFINITY;
        for j in grid.jlo()..=grid.jhi() {
            for i in grid.ilo()..=grid.ihi() {
                let v = field.get(i, j);
                lo = lo.min(v);
                hi = hi.max(v);
                values.push(v);
            }
        }
        (values, lo, hi)
    }

    fn draw_panel(
        &self,
        area: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
        title: &str,
        field: &CellArray,
        grid: &Grid2D,
        gradient: &colorgrad::Gradient,
    ) -> Result<(), SolverError> {
        let (values, lo, hi) = self.panel_colors(field, grid);
        let span = (hi - lo).max(1e-12);

        let mut chart = ChartBuilder::on(area)
            .caption(title, ("sans-serif", 16))
            .margin(5)
            .build_cartesian_2d(0..grid.nx, 0..grid.ny)
            .map_err(|e| SolverError::Io(e.to_string()))?;
        chart.configure_mesh().disable_mesh().draw().map_err(|e| SolverError::Io(e.to_string()))?;

        for (idx, value) in values.iter().enumerate() {
            let i = idx % grid.nx;
            let j = idx / grid.nx;
            let t = (value - lo) / span;
            let c = gradient.at(t.clamp(0.0, 1.0));
            let color = RGBColor(
                (c.r * 255.0) as u8,
                (c.g * 255.0) as u8,
                (c.b * 255.0) as u8,
            );
            chart
                .draw_series(std::iter::once(Rectangle::new(
                    [(i, j), (i + 1, j + 1)],
                    color.filled(),
                )))
                .map_err(|e| SolverError::Io(e.to_string()))?;
        }
        Ok(())
    }
}

impl Visualization for PpmSnapshotVisualization {
    fn render(&mut self, flow: &FlowState, grid: &Grid2D, vorticity: &CellArray, divergence: &CellArray) -> Result<(), SolverError> {
        std::fs::create_dir_all(&self.output_dir).map_err(|e| SolverError::Io(e.to_string()))?;
        let path: &Path = &self.output_dir.join(format!("step_{:06}.png", flow.n));

        let gradient = colorgrad::viridis();

        let root = BitMapBackend::new(path, (1024, 1024)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| SolverError::Io(e.to_string()))?;
        let panels = root.split_evenly((2, 2));

        self.draw_panel(&panels[0], "u", &flow.u, grid, &gradient)?;
        self.draw_panel(&panels[1], "v", &flow.v, grid, &gradient)?;
        self.draw_panel(&panels[2], "vorticity", vorticity, grid, &gradient)?;
        self.draw_panel(&panels[3], "divergence", divergence, grid, &gradient)?;

        root.present().map_err(|e| SolverError::Io(e.to_string()))?;
        Ok(())
    }
}
