//! Terminal rendering of the ring road
//!
//! Linear and circular views of each snapshot, printed to stdout.

use std::f64::consts::TAU;
use std::ops::RangeInclusive;
use std::time::Duration;

use crate::simulation::{density_profile, SimulationState, SnapshotSink};

const EMPTY_CELL: char = '.';
const EMPTY_RING_CELL: char = '·';
const DENSITY_SHADES: [char; 5] = [' ', '░', '▒', '▓', '█'];
/// Highest value `density_profile` can produce (every kernel cell occupied)
const MAX_DENSITY: f64 = 2.5;
/// Cells shown beyond the first and last vehicle in the scrolling strip
const SCROLL_MARGIN: usize = 2;

/// Which views to print for every snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Road as a single line of cells plus its density strip
    Strip,
    /// Road drawn as a circle
    Ring,
    /// Circle followed by the strip views
    Combined,
    /// Strip views cropped to the stretch of road holding vehicles
    Scrolling,
}

fn vehicle_char(velocity: usize) -> char {
    if velocity < 10 {
        char::from_digit(velocity as u32, 10).unwrap_or('+')
    } else {
        '+'
    }
}

/// One character per cell: `.` when empty, the velocity digit otherwise
pub fn render_strip(state: &SimulationState) -> String {
    let mut cells = vec![EMPTY_CELL; state.params().length];
    for vehicle in state.vehicles() {
        cells[vehicle.position] = vehicle_char(vehicle.velocity);
    }
    cells.into_iter().collect()
}

/// Shaded density strip aligned with `render_strip`
pub fn render_density(state: &SimulationState) -> String {
    let top = DENSITY_SHADES.len() - 1;
    density_profile(state)
        .into_iter()
        .map(|density| {
            let level = (density / MAX_DENSITY * top as f64).round() as usize;
            DENSITY_SHADES[level.min(top)]
        })
        .collect()
}

/// Cells from the first vehicle to the last, widened by a small margin
///
/// The window does not wrap. An empty road shows every cell.
pub fn visible_cells(state: &SimulationState) -> RangeInclusive<usize> {
    let last_cell = state.params().length - 1;
    match (state.vehicles().first(), state.vehicles().last()) {
        (Some(first), Some(last)) => {
            first.position.saturating_sub(SCROLL_MARGIN)
                ..=(last.position + SCROLL_MARGIN).min(last_cell)
        }
        _ => 0..=last_cell,
    }
}

fn crop(line: &str, window: &RangeInclusive<usize>) -> String {
    line.chars()
        .skip(*window.start())
        .take(window.end() - window.start() + 1)
        .collect()
}

/// Radius that keeps neighbouring cells mostly apart on the ring view
pub fn ring_radius(length: usize) -> usize {
    (length / 7).clamp(4, 20)
}

/// Lay the cells out on a circle, cell 0 at the top, travelling clockwise
pub fn render_ring(state: &SimulationState, radius: usize) -> Vec<String> {
    let length = state.params().length;
    let height = 2 * radius + 1;
    // Terminal characters are about twice as tall as they are wide
    let width = 2 * height;
    let mut grid = vec![vec![' '; width]; height];

    let to_grid = |cell: usize| -> (usize, usize) {
        let angle = TAU * cell as f64 / length as f64;
        let r = radius as f64;
        let row = (r - angle.cos() * r).round() as usize;
        let col = ((r + angle.sin() * r) * 2.0).round() as usize;
        (row.min(height - 1), col.min(width - 1))
    };

    for cell in 0..length {
        let (row, col) = to_grid(cell);
        if grid[row][col] == ' ' {
            grid[row][col] = EMPTY_RING_CELL;
        }
    }

    for vehicle in state.vehicles() {
        let (row, col) = to_grid(vehicle.position);
        grid[row][col] = vehicle_char(vehicle.velocity);
    }

    grid.into_iter()
        .map(|row| row.into_iter().collect::<String>().trim_end().to_string())
        .collect()
}

/// Prints every snapshot it receives
pub struct TerminalSink {
    layout: Layout,
    /// Pause after each frame so the road can be watched
    delay: Duration,
}

impl TerminalSink {
    pub fn new(layout: Layout, delay: Duration) -> Self {
        Self { layout, delay }
    }

    /// Text printed for one snapshot
    pub fn frame(&self, state: &SimulationState) -> String {
        let mut lines = vec![format!("step {}", state.step())];

        if matches!(self.layout, Layout::Ring | Layout::Combined) {
            lines.extend(render_ring(state, ring_radius(state.params().length)));
        }
        if matches!(self.layout, Layout::Strip | Layout::Combined) {
            lines.push(render_strip(state));
            lines.push(render_density(state));
        }
        if self.layout == Layout::Scrolling {
            let window = visible_cells(state);
            lines.push(crop(&render_strip(state), &window));
            lines.push(crop(&render_density(state), &window));
        }

        lines.join("\n")
    }
}

impl SnapshotSink for TerminalSink {
    fn consume(&mut self, snapshot: &SimulationState) {
        println!("{}", self.frame(snapshot));
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::Parameters;

    fn state(length: usize, pairs: &[(usize, usize)]) -> SimulationState {
        let params = Parameters::new(length, pairs.len(), 12, 0.0).unwrap();
        SimulationState::from_vehicles(params, pairs).unwrap()
    }

    #[test]
    fn test_strip() {
        let road = state(10, &[(0, 0), (3, 2), (9, 11)]);
        assert_eq!(render_strip(&road), "0..2.....+");
    }

    #[test]
    fn test_density_strip_length() {
        let road = state(12, &[(0, 0), (1, 0), (2, 0)]);
        let density = render_density(&road);
        assert_eq!(density.chars().count(), 12);
        assert_eq!(density.chars().nth(1), Some('▓'));
        assert_eq!(density.chars().nth(6), Some(' '));
    }

    #[test]
    fn test_ring_marks_vehicles() {
        let road = state(40, &[(0, 3), (20, 1)]);
        let rows = render_ring(&road, 5);
        assert_eq!(rows.len(), 11);
        // Cell 0 at the top centre, cell 20 at the bottom centre
        assert_eq!(rows[0].chars().nth(10), Some('3'));
        assert_eq!(rows[10].chars().nth(10), Some('1'));
    }

    #[test]
    fn test_frame_layouts() {
        let road = state(10, &[(0, 1)]);
        let strip = TerminalSink::new(Layout::Strip, Duration::ZERO).frame(&road);
        assert_eq!(strip.lines().count(), 3);
        assert!(strip.starts_with("step 0"));

        let combined = TerminalSink::new(Layout::Combined, Duration::ZERO).frame(&road);
        assert_eq!(combined.lines().count(), 1 + 9 + 2);
    }

    #[test]
    fn test_scrolling_window_follows_vehicles() {
        let road = state(30, &[(10, 1), (14, 2)]);
        assert_eq!(visible_cells(&road), 8..=16);

        let frame = TerminalSink::new(Layout::Scrolling, Duration::ZERO).frame(&road);
        let lines: Vec<&str> = frame.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "..1...2..");
        assert_eq!(lines[2].chars().count(), 9);
    }

    #[test]
    fn test_scrolling_window_clamps_to_road() {
        assert_eq!(visible_cells(&state(10, &[(0, 0), (9, 0)])), 0..=9);
        assert_eq!(visible_cells(&state(10, &[(1, 0), (3, 0)])), 0..=5);
        assert_eq!(visible_cells(&state(10, &[])), 0..=9);
    }
}
