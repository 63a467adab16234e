use super::types::DensityCounts;
use crate::schedule::GameRecord;

/// Windows and magnitudes for schedule density, parsed from config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DensityRule {
    pub window_days: [i64; 4],
    pub min_games: [usize; 4],
    pub penalty_single: i32,
    pub penalty_multiple: i32,
}

impl DensityRule {
    /// Scans backwards from `idx`, counting games per window. Relies on the
    /// timeline being date-ordered: once a game is outside the widest window
    /// every earlier one is too.
    pub fn evaluate(&self, records: &[GameRecord], idx: usize) -> DensityCounts {
        let mut counts = [1usize; 4];
        let current = records[idx].sequence_date;
        let widest = self.window_days.iter().copied().max().unwrap_or(0);

        for back_idx in (0..idx).rev() {
            let delta_days = (current - records[back_idx].sequence_date).num_days();
            if delta_days > widest {
                break;
            }
            for (count, &days) in counts.iter_mut().zip(self.window_days.iter()) {
                if delta_days <= days {
                    *count += 1;
                }
            }
        }

        let conditions_met = counts
            .iter()
            .zip(self.min_games.iter())
            .filter(|(count, min)| *count >= *min)
            .count() as u8;

        DensityCounts {
            window_counts: counts,
            conditions_met,
        }
    }

    pub fn penalty(&self, conditions_met: u8) -> i32 {
        match conditions_met {
            0 => 0,
            1 => self.penalty_single,
            _ => self.penalty_multiple,
        }
    }
}
