//! The candidate parameter vectors of the ensemble search.
use tracing::warn;

use crate::constants::{IGB_OPTIONS, LEVELS, NORM_OPTIONS, WORD_LENGTHS};
use crate::dictionary::ParameterVector;
use crate::error::{Result, TdeError};


/// Window lengths explored for series of a given length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WindowRange {
    pub(crate) min_window: usize,
    pub(crate) max_window: usize,
    pub(crate) increment: usize,
}


impl WindowRange {
    /// `max_window = floor(n_timepoints * max_win_len_prop)`.
    /// A `min_window` at or above `max_window` is lowered to `max_window`.
    /// The increment is
    /// `max(1, floor((max_window - min_window) / (n_timepoints / 4)))`.
    pub(crate) fn new(
        n_timepoints: usize,
        min_window: usize,
        max_win_len_prop: f64,
    ) -> Result<Self>
    {
        let max_window = (n_timepoints as f64 * max_win_len_prop).floor() as usize;
        if max_window == 0 {
            return Err(TdeError::Config(format!(
                "max_win_len_prop {max_win_len_prop} leaves no window \
                for series of length {n_timepoints}"
            )));
        }

        let min_window = if min_window >= max_window {
            warn!(
                "min_window {min_window} is no smaller than \
                the max window {max_window}; using {max_window}"
            );
            max_window
        } else {
            min_window
        };

        let span = (max_window - min_window) as f64;
        let increment = ((span / (n_timepoints as f64 / 4.0)) as usize).max(1);

        Ok(Self { min_window, max_window, increment })
    }


    /// The window lengths, ascending.
    pub(crate) fn windows(&self) -> impl Iterator<Item = usize> {
        (self.min_window..=self.max_window).step_by(self.increment)
    }
}


/// Every parameter vector of the search,
/// normalisation outermost, then window, word length, levels, and binning.
pub(crate) fn candidates(range: &WindowRange) -> Vec<ParameterVector> {
    let mut candidates = Vec::new();
    for norm in NORM_OPTIONS {
        for window_size in range.windows() {
            for word_length in WORD_LENGTHS {
                for levels in LEVELS {
                    for igb in IGB_OPTIONS {
                        candidates.push(ParameterVector {
                            window_size,
                            word_length,
                            norm,
                            levels,
                            igb,
                        });
                    }
                }
            }
        }
    }
    candidates
}
