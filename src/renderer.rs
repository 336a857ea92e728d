use crate::color::Pixel;
use crate::game::{GameController, TickReport};
use crate::grid::Grid;
use crate::spark::SparkField;

/// Frame compositor - the main orchestrator
///
/// Owns the grid and the spark layer and applies every layer in a fixed
/// order each frame:
///
/// 1. fade the previous frame,
/// 2. game events (flash fills, spark spawns),
/// 3. sparks, blended on top,
/// 4. flatten to strip order.
pub struct Renderer<
    'a,
    const COLUMNS: usize,
    const CELLS: usize,
    const SPARKS: usize,
    const QUEUE: usize,
> {
    grid: Grid<COLUMNS, CELLS>,
    sparks: SparkField<SPARKS>,
    game: GameController<'a, QUEUE>,
    last_report: TickReport,
}

impl<'a, const COLUMNS: usize, const CELLS: usize, const SPARKS: usize, const QUEUE: usize>
    Renderer<'a, COLUMNS, CELLS, SPARKS, QUEUE>
{
    pub const fn new(
        grid: Grid<COLUMNS, CELLS>,
        sparks: SparkField<SPARKS>,
        game: GameController<'a, QUEUE>,
    ) -> Self {
        Self {
            grid,
            sparks,
            game,
            last_report: TickReport {
                events: 0,
                ignored: 0,
                crossings: 0,
            },
        }
    }

    /// Process one frame and return it in strip order
    pub fn render(&mut self) -> &[Pixel] {
        self.grid.fade();
        self.last_report = self.game.tick(&mut self.grid, &mut self.sparks);
        self.sparks.show_and_update(&mut self.grid);
        self.sparks.commit();
        self.grid.flatten()
    }

    pub const fn grid(&self) -> &Grid<COLUMNS, CELLS> {
        &self.grid
    }

    /// Access the grid to draw extra layers between frames
    pub fn grid_mut(&mut self) -> &mut Grid<COLUMNS, CELLS> {
        &mut self.grid
    }

    pub const fn sparks(&self) -> &SparkField<SPARKS> {
        &self.sparks
    }

    pub fn sparks_mut(&mut self) -> &mut SparkField<SPARKS> {
        &mut self.sparks
    }

    pub const fn game(&self) -> &GameController<'a, QUEUE> {
        &self.game
    }

    /// Game activity during the most recent frame
    pub const fn last_report(&self) -> TickReport {
        self.last_report
    }
}
