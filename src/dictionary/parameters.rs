use serde::{Serialize, Deserialize};

use std::fmt;

use crate::transform::{BinningMethod, Sfa};


/// The hyper-parameters of one dictionary member.
/// This is the unit of the ensemble's parameter search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterVector {
    /// Length of the sliding window.
    pub window_size: usize,
    /// Number of letters per word.
    pub word_length: usize,
    /// Drop the first Fourier coefficient.
    pub norm: bool,
    /// Number of spatial pyramid levels.
    pub levels: usize,
    /// Use information gain binning instead of equi-depth binning.
    pub igb: bool,
}


impl ParameterVector {
    /// Construct a new `ParameterVector`.
    pub fn new(
        window_size: usize,
        word_length: usize,
        norm: bool,
        levels: usize,
        igb: bool,
    ) -> Self
    {
        Self { window_size, word_length, norm, levels, igb }
    }


    /// Numerical encoding used by the surrogate model:
    /// `[window_size, word_length, norm, levels, igb]`
    /// with booleans as `0` or `1`.
    pub fn features(&self) -> [f64; 5] {
        [
            self.window_size as f64,
            self.word_length as f64,
            f64::from(u8::from(self.norm)),
            self.levels as f64,
            f64::from(u8::from(self.igb)),
        ]
    }


    /// The binning method these parameters select.
    pub fn binning(&self) -> BinningMethod {
        if self.igb {
            BinningMethod::InformationGain
        } else {
            BinningMethod::EquiDepth
        }
    }


    /// An unfitted SFA configured with these parameters.
    pub(crate) fn sfa(&self, alphabet_size: usize) -> Sfa {
        Sfa::new(self.window_size, self.word_length)
            .alphabet_size(alphabet_size)
            .norm(self.norm)
            .levels(self.levels)
            .binning(self.binning())
    }
}


impl Default for ParameterVector {
    fn default() -> Self {
        Self {
            window_size: 10,
            word_length: 8,
            norm: false,
            levels: 1,
            igb: false,
        }
    }
}


impl fmt::Display for ParameterVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "window={}, word={}, norm={}, levels={}, igb={}",
            self.window_size,
            self.word_length,
            self.norm,
            self.levels,
            self.igb,
        )
    }
}
