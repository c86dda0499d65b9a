//! Parser for ffmpeg's `-progress` key=value output.

/// Turns `-progress` lines into percentages of a known duration.
#[derive(Debug, Clone)]
pub struct ProgressParser {
    duration: f64,
}

impl ProgressParser {
    pub fn new(duration: f64) -> Self {
        Self { duration }
    }

    /// Percent complete for `line`, or `None` when the line carries no position.
    /// `progress=end` is ignored; completion is reported once the output is verified.
    pub fn feed(&self, line: &str) -> Option<f64> {
        let (key, value) = line.trim().split_once('=')?;
        match key {
            // both keys are microseconds; out_time_ms is misnamed upstream
            "out_time_us" | "out_time_ms" => {
                let micros: i64 = value.trim().parse().ok()?;
                self.percent(micros as f64 / 1_000_000.0)
            }
            "out_time" => self.percent(parse_timestamp(value.trim())?),
            _ => None,
        }
    }

    fn percent(&self, seconds: f64) -> Option<f64> {
        if self.duration <= 0.0 || seconds < 0.0 {
            return None;
        }
        Some((seconds / self.duration * 100.0).min(100.0))
    }
}

/// `HH:MM:SS.micro` to seconds.
fn parse_timestamp(s: &str) -> Option<f64> {
    let mut parts = s.splitn(3, ':');
    let hours: f64 = parts.next()?.parse().ok()?;
    let minutes: f64 = parts.next()?.parse().ok()?;
    let seconds: f64 = parts.next()?.parse().ok()?;
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}
