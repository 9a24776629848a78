use crate::model::ScheduleRecord;
use crate::slot::{slot_label, SLOTS_PER_DAY};
use log::trace;

pub const NOW_TEXT: &str = "..NOW.....";

/// Tracks which grid cell currently shows the "now" marker and what it
/// displayed before being overwritten.
#[derive(Clone, Debug, Default)]
pub struct NowIndicator {
    marked: Option<(usize, String)>,
}

impl NowIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn marked_slot(&self) -> Option<usize> {
        self.marked.as_ref().map(|(i, _)| *i)
    }

    /// Restores the previously marked cell, then marks `current_slot` when
    /// today's schedule is the one on display.
    pub fn update(&mut self, grid: &mut [String], current_slot: usize, today_selected: bool) {
        self.clear(grid);
        if !today_selected {
            return;
        }
        if let Some(cell) = grid.get_mut(current_slot) {
            let original = std::mem::replace(cell, NOW_TEXT.to_string());
            trace!("now marker -> slot {} (was {:?})", current_slot, original);
            self.marked = Some((current_slot, original));
        }
    }

    pub fn clear(&mut self, grid: &mut [String]) {
        if let Some((i, original)) = self.marked.take() {
            if let Some(cell) = grid.get_mut(i) {
                *cell = original;
            }
        }
    }
}

/// One display line per slot of the day. Slots past the end of the table
/// show their start time only.
pub fn schedule_grid(table: &[ScheduleRecord]) -> Vec<String> {
    (0..SLOTS_PER_DAY)
        .map(|i| match table.get(i) {
            Some(r) if r.is_live() => format!("{}  LIVE {}", slot_label(i), r.title),
            Some(r) => format!("{}  {}", slot_label(i), r.title),
            None => slot_label(i),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Vec<String> {
        vec!["00:00  A".into(), "00:15  B".into(), "00:30  C".into()]
    }

    #[test]
    fn marks_and_restores() {
        let mut g = grid();
        let mut now = NowIndicator::new();

        now.update(&mut g, 0, true);
        assert_eq!(g[0], NOW_TEXT);
        assert_eq!(now.marked_slot(), Some(0));

        now.update(&mut g, 1, true);
        assert_eq!(g[0], "00:00  A");
        assert_eq!(g[1], NOW_TEXT);

        now.clear(&mut g);
        assert_eq!(g, grid());
        assert_eq!(now.marked_slot(), None);
    }

    #[test]
    fn other_day_selected_leaves_grid_untouched() {
        let mut g = grid();
        let mut now = NowIndicator::new();
        now.update(&mut g, 2, true);
        now.update(&mut g, 2, false);
        assert_eq!(g, grid());
        assert_eq!(now.marked_slot(), None);
    }

    #[test]
    fn repeated_update_same_slot_keeps_original() {
        let mut g = grid();
        let mut now = NowIndicator::new();
        now.update(&mut g, 1, true);
        now.update(&mut g, 1, true);
        now.clear(&mut g);
        assert_eq!(g[1], "00:15  B");
    }

    #[test]
    fn out_of_grid_slot_is_ignored() {
        let mut g = grid();
        let mut now = NowIndicator::new();
        now.update(&mut g, 50, true);
        assert_eq!(g, grid());
    }

    #[test]
    fn grid_covers_whole_day() {
        let g = schedule_grid(&[]);
        assert_eq!(g.len(), SLOTS_PER_DAY);
        assert_eq!(g[95], "23:45");
    }
}
