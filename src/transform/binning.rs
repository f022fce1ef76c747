//! Breakpoints that discretize Fourier values into letters.
use serde::{Serialize, Deserialize};


/// How the breakpoints of each Fourier value are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinningMethod {
    /// Supervised splits that best separate the ordinal labels
    /// (largest reduction of the squared error of the labels).
    InformationGain,
    /// Unsupervised splits with the same number of values per letter.
    EquiDepth,
}


/// Ascending breakpoints of one Fourier value.
/// A value gets the letter `#{breakpoints < value}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakpoints(Vec<f64>);


impl Breakpoints {
    /// Returns the letter of `value`.
    #[inline(always)]
    pub fn letter(&self, value: f64) -> u64 {
        self.0.partition_point(|&bp| bp < value) as u64
    }


    /// The breakpoints, ascending.
    pub fn as_slice(&self) -> &[f64] {
        &self.0[..]
    }


    /// Cut `values` into at most `alphabet_size` bins
    /// holding the same number of values.
    pub fn equi_depth(values: &[f64], alphabet_size: usize) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len();
        let depth = n as f64 / alphabet_size as f64;
        let mut breakpoints = (1..alphabet_size)
            .map(|a| {
                let ix = ((depth * a as f64) as usize).min(n - 1);
                sorted[ix]
            })
            .collect::<Vec<_>>();
        breakpoints.dedup();

        Self(breakpoints)
    }


    /// Splits `values` greedily, best split first,
    /// into at most `alphabet_size` bins.
    /// A split is scored by how much it reduces the squared error
    /// of the ordinal `labels` around their bin means.
    /// Thresholds are midpoints between neighboring distinct values.
    pub fn information_gain(
        values: &[f64],
        labels: &[f64],
        alphabet_size: usize,
    ) -> Self
    {
        let mut pairs = values.iter()
            .copied()
            .zip(labels.iter().copied())
            .collect::<Vec<_>>();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        let (xs, ys): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();

        // Prefix sums of the labels for `O(1)` range statistics.
        let mut prefix = vec![0f64; ys.len() + 1];
        for (i, y) in ys.iter().enumerate() {
            prefix[i + 1] = prefix[i] + y;
        }

        let mut leaves = vec![(0, xs.len())];
        let mut thresholds = Vec::with_capacity(alphabet_size - 1);
        while leaves.len() < alphabet_size {
            let best = leaves.iter()
                .enumerate()
                .filter_map(|(l, &(lo, hi))| {
                    best_split(&xs, &prefix, lo, hi)
                        .map(|(pos, gain)| (l, pos, gain))
                })
                .max_by(|a, b| a.2.total_cmp(&b.2));

            let Some((l, pos, _)) = best else { break; };

            let (lo, hi) = leaves.swap_remove(l);
            thresholds.push((xs[pos - 1] + xs[pos]) / 2.0);
            leaves.push((lo, pos));
            leaves.push((pos, hi));
        }
        thresholds.sort_by(f64::total_cmp);

        Self(thresholds)
    }
}


/// Best split position of `xs[lo..hi]` and its gain.
/// A position `pos` sends `xs[lo..pos]` left.
/// Returns `None` if no split reduces the error.
fn best_split(xs: &[f64], prefix: &[f64], lo: usize, hi: usize)
    -> Option<(usize, f64)>
{
    let n = (hi - lo) as f64;
    let total = prefix[hi] - prefix[lo];
    let base = total * total / n;

    (lo + 1..hi)
        .filter(|&pos| xs[pos - 1] < xs[pos])
        .map(|pos| {
            let nl = (pos - lo) as f64;
            let nr = (hi - pos) as f64;
            let sl = prefix[pos] - prefix[lo];
            let sr = total - sl;
            (pos, sl * sl / nl + sr * sr / nr - base)
        })
        .filter(|&(_, gain)| gain > 1e-12)
        .max_by(|a, b| a.1.total_cmp(&b.1))
}
