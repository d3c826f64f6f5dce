//! Sleep-and-sample loops shared by the monitor tests.

use std::ops::ControlFlow;
use std::thread;
use std::time::{Duration, Instant};

/// Calls `step` immediately and then once per `interval` until `duration`
/// has elapsed. The last sleep is shortened so the final call lands at the
/// end of the window. Returns `false` if `step` stopped the loop early.
pub fn poll<F>(duration: Duration, interval: Duration, mut step: F) -> bool
where
    F: FnMut() -> ControlFlow<()>,
{
    let start = Instant::now();
    loop {
        if step().is_break() {
            return false;
        }

        let elapsed = start.elapsed();
        if elapsed >= duration {
            return true;
        }
        thread::sleep(interval.min(duration - elapsed));
    }
}

/// Collects every `Some` sample produced over the window.
pub fn sample_for<T, F>(duration: Duration, interval: Duration, mut probe: F) -> Vec<T>
where
    F: FnMut() -> Option<T>,
{
    let mut samples = Vec::new();
    poll(duration, interval, || {
        if let Some(sample) = probe() {
            samples.push(sample);
        }
        ControlFlow::Continue(())
    });
    samples
}

/// Difference between the largest and smallest sample.
pub fn spread(samples: &[f64]) -> Option<f64> {
    let first = *samples.first()?;
    let (min, max) = samples
        .iter()
        .fold((first, first), |(lo, hi), &s| (lo.min(s), hi.max(s)));
    Some(max - min)
}

/// Header line of every monitor report.
pub fn completed_line(label: &str, duration: Duration) -> String {
    format!("{} monitoring completed for {} seconds", label, duration.as_secs())
}
