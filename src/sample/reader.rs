use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{Result, TdeError};
use super::series_collection::SeriesCollection;


/// A struct that reads the data section of a `.ts` file
/// into a [`SeriesCollection`] and its label vector.
///
/// Each data line holds one case.
/// Channels are separated by `:`, values by `,`,
/// and the last `:`-separated field is the integer class label.
/// Lines starting with `@` or `#` and blank lines are skipped.
/// `?` and `NaN` are read as missing values.
///
/// # Example
/// ```no_run
/// use ordinal_tde::SeriesReader;
/// let (x, y) = SeriesReader::default()
///     .file("/path/to/train.ts")
///     .read()
///     .unwrap();
/// ```
pub struct SeriesReader<P> {
    file: Option<P>,
}


impl<P> Default for SeriesReader<P> {
    fn default() -> Self {
        Self { file: None }
    }
}


impl<P> SeriesReader<P>
    where P: AsRef<Path>
{
    /// Set the file name.
    pub fn file(mut self, file: P) -> Self {
        self.file = Some(file);
        self
    }


    /// Reads the file and returns the collection and its labels.
    /// This method consumes `self.`
    pub fn read(self) -> Result<(SeriesCollection, Vec<i64>)> {
        let file = self.file
            .ok_or_else(|| TdeError::Config(
                "the file name is not set. use `SeriesReader::file`".into()
            ))?;
        let file = File::open(file)?;
        read_ts(BufReader::new(file))
    }
}


/// Reads a `.ts` data body from any buffered reader.
pub fn read_ts<R>(reader: R) -> Result<(SeriesCollection, Vec<i64>)>
    where R: BufRead,
{
    let mut cases = Vec::new();
    let mut labels = Vec::new();

    for (k, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('@') || line.starts_with('#') {
            continue;
        }
        let lineno = k + 1;

        let mut fields = line.split(':').collect::<Vec<_>>();
        if fields.len() < 2 {
            return Err(TdeError::Parse {
                line: lineno,
                message: "expected at least one channel and a label".into(),
            });
        }

        let label = fields.pop()
            .map(str::trim)
            .unwrap_or_default();
        let label = label.parse::<i64>()
            .map_err(|_| TdeError::Parse {
                line: lineno,
                message: format!("class label `{label}` is not an integer"),
            })?;

        let case = fields.into_iter()
            .map(|channel| parse_channel(channel, lineno))
            .collect::<Result<Vec<_>>>()?;

        cases.push(case);
        labels.push(label);
    }

    let collection = SeriesCollection::from_cases(cases)?;
    Ok((collection, labels))
}


fn parse_channel(channel: &str, line: usize) -> Result<Vec<f64>> {
    channel.split(',')
        .map(str::trim)
        .map(|token| match token {
            "?" | "NaN" | "nan" => Ok(f64::NAN),
            _ => token.parse::<f64>()
                .map_err(|_| TdeError::Parse {
                    line,
                    message: format!("`{token}` is not a number"),
                }),
        })
        .collect()
}
