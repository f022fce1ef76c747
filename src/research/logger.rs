use colored::Colorize;

use std::time::Duration;

use crate::constants::{FULL_WIDTH, PRINT_WIDTH as WIDTH};
use crate::dictionary::ParameterVector;

const PREC_WIDTH: usize = 5;
const STAT_WIDTH: usize = (FULL_WIDTH - 4) / 2;


/// Prints the progress of the ensemble search to the console.
/// A disabled logger prints nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchLogger {
    enabled: bool,
}


impl SearchLogger {
    /// Create a new instance of `SearchLogger`.
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }


    /// Returns `true` if the logger prints.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }


    /// Print the estimator settings.
    pub fn print_stats(
        &self,
        name: &str,
        info: Option<Vec<(&str, String)>>,
        time_limit: Option<Duration>,
    )
    {
        if !self.enabled { return; }

        let limit = time_limit.map_or_else(
            || "Nothing".to_string(),
            |limit| time_format(limit.as_millis()),
        );
        let header = format!(
            "{:=>FULL_WIDTH$}\n{:^FULL_WIDTH$}\n{:->FULL_WIDTH$}",
            "", "STATS".bold(), "",
        );
        println!(
            "\n{header}\n\
            + {:<STAT_WIDTH$}\t{:>STAT_WIDTH$}",
            "Estimator".bold(),
            name.bold().green(),
        );

        if let Some(info) = info {
            let line = info.into_iter()
                .map(|(key, val)| {
                    format!(
                        "    + {:<STAT_WIDTH$}\t{:>width$}",
                        key,
                        val.bold().yellow(),
                        width = STAT_WIDTH - 8
                    )
                })
                .collect::<Vec<_>>()
                .join("\n");
            println!("{line}");
        }
        println!(
            "\
            + {:<STAT_WIDTH$}\t{:>STAT_WIDTH$}\n\
            {:=^FULL_WIDTH$}\n\
            ",
            "Time Limit".bold(),
            limit.bold().green(),
            "".bold(),
        );
        self.print_log_header();
    }


    fn print_log_header(&self) {
        println!(
            "      {:>WIDTH$}\t{:>WIDTH$}\t{:>WIDTH$}\t{:>WIDTH$}\t{:>WIDTH$}",
            "".bold().red(),
            "MEMBER".bold().blue(),
            "MEMBER".bold().green(),
            "POOL".bold().yellow(),
            "ACC.".bold().cyan(),
        );
        println!(
            "      {:>WIDTH$}\t{:>WIDTH$}\t{:>WIDTH$}\t{:>WIDTH$}\t{:>WIDTH$}\n",
            "ROUND".bold().red(),
            "MAE".bold().blue(),
            "WEIGHT".bold().green(),
            "SIZE".bold().yellow(),
            "TIME".bold().cyan(),
        );
    }


    /// Print one evaluated parameter vector.
    pub fn log_iteration(
        &self,
        iteration: usize,
        params: &ParameterVector,
        mae: f64,
        weight: f64,
        pool_size: usize,
        elapsed: Duration,
    )
    {
        if !self.enabled { return; }

        println!(
            "{} {}\t{}\t{}\t{}\t{}\t{}",
            "[LOG]".bold().magenta(),
            format!("{:>WIDTH$}", iteration).red(),
            format!("{:>WIDTH$.PREC_WIDTH$}", mae).blue(),
            format!("{:>WIDTH$.PREC_WIDTH$}", weight).green(),
            format!("{:>WIDTH$}", pool_size).yellow(),
            time_format(elapsed.as_millis()).bold().cyan(),
            format!("{params}").dimmed(),
        );
    }


    /// Print the end of the search.
    pub fn finish(&self, iterations: usize, pool_size: usize, elapsed: Duration) {
        if !self.enabled { return; }

        println!(
            "{} {}\t{:>WIDTH$}\t{:>WIDTH$}\t{}\t{}\n",
            "[FIN]".bold().bright_green(),
            format!("{:>WIDTH$}", iterations).red(),
            "",
            "",
            format!("{:>WIDTH$}", pool_size).bold().yellow(),
            time_format(elapsed.as_millis()).bold().cyan(),
        );
    }
}


fn time_format(millisec: u128) -> String {
    if millisec < 1_000 {
        return format!("  0.{:0>3}s", millisec);
    }
    let sec = millisec / 1_000;
    let millisec = millisec % 1_000;
    if sec < 60 {
        return format!(" {:0>2}.{:0>3}s", sec, millisec);
    }
    let min = sec / 60;
    let sec = sec % 60;
    if min < 60 {
        return format!(" {:0>2}m {:0>2}s", min, sec);
    }
    let hours = min / 60;
    let min = min % 60;
    format!(" {:0>2}h {:0>2}m", hours, min)
}
