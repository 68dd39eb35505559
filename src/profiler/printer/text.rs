//! Plain-text flat profile.

use std::fmt::Write;

use crate::profiler::profile::Profile;

/// Render a flat report, one row per symbol:
///
/// ```text
/// Total: 65 samples
///       60  92.3%  92.3%       60  92.3% add
///        5   7.7% 100.0%       65 100.0% handle
/// ```
///
/// Columns are flat samples, flat share, running sum of flat share,
/// cumulative samples, cumulative share, symbol.
pub fn report(profile: &Profile) -> String {
    let total = profile.total();
    let mut out = String::new();
    let _ = writeln!(out, "Total: {} samples", total);
    if total == 0 {
        return out;
    }

    let pct = |n: u64| n as f64 * 100.0 / total as f64;
    let mut running: u64 = 0;
    for symbol in profile.symbols() {
        running = running.saturating_add(symbol.flat);
        let _ = writeln!(
            out,
            "{:>8} {:>5.1}% {:>5.1}% {:>8} {:>5.1}% {}",
            symbol.flat,
            pct(symbol.flat),
            pct(running),
            symbol.cum,
            pct(symbol.cum),
            symbol.name
        );
    }
    out
}
