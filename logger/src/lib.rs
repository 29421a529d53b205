//! Logging setup for hoard's binaries.
//!
//! Every record is prefixed with the elapsed time since [`setup`], the current resident set size
//! and the peak resident set size of the process. A header line is written whenever the record's
//! target changes. The filter is read from `HOARD_LOG` (default `info`) and the color choice from
//! `HOARD_LOG_STYLE`.
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::undocumented_unsafe_blocks)]
#![warn(missing_docs)]

use std::{
    fmt,
    io::Write,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Instant,
};

use anstyle::{AnsiColor, Color, Style};

/// Environment variable holding the log filter.
pub const FILTER_ENV: &str = "HOARD_LOG";
/// Environment variable holding the color choice.
pub const STYLE_ENV: &str = "HOARD_LOG_STYLE";

const TIMESTAMP_STYLE: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightBlack)));
const MEMORY_STYLE: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Blue)));
const MEMORY_NEW_PEAK_STYLE: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red)));
const MEMORY_PEAK_STYLE: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightBlack)));
const TARGET_STYLE: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Magenta)));

/// A byte count rendered with a binary unit in a fixed width column.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
struct MemoryAmount(usize);

impl fmt::Debug for MemoryAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for MemoryAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.0;
        if bytes < 1000 {
            write!(f, "{bytes:5}B")
        } else if bytes < 1000 << 10 {
            write!(f, "{:5.1}K", bytes as f64 / (1u64 << 10) as f64)
        } else if bytes < 1000 << 20 {
            write!(f, "{:5.1}M", bytes as f64 / (1u64 << 20) as f64)
        } else {
            write!(f, "{:5.1}G", bytes as f64 / (1u64 << 30) as f64)
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct RssStats {
    current: MemoryAmount,
    peak: MemoryAmount,
}

impl RssStats {
    /// Samples the process' memory usage, reporting zero for anything that cannot be read.
    fn now() -> Self {
        #[cfg(all(unix, not(miri)))]
        {
            Self {
                current: MemoryAmount(current_rss().unwrap_or(0)),
                peak: MemoryAmount(peak_rss().unwrap_or(0)),
            }
        }
        #[cfg(not(all(unix, not(miri))))]
        {
            Self::default()
        }
    }
}

#[cfg(all(unix, not(miri)))]
fn peak_rss() -> Option<usize> {
    // SAFETY: rusage is plain old data so all zeros is valid
    let mut rusage: libc::rusage = unsafe { std::mem::zeroed() };
    // SAFETY: getrusage only writes to the passed pointer, which is valid for a `rusage`
    if unsafe { libc::getrusage(libc::RUSAGE_SELF, &mut rusage) } < 0 {
        return None;
    }
    let max_rss = usize::try_from(rusage.ru_maxrss).ok()?;
    // Linux reports kilobytes, macOS bytes.
    if cfg!(target_os = "macos") {
        Some(max_rss)
    } else {
        Some(max_rss * 1024)
    }
}

#[cfg(all(target_os = "linux", not(miri)))]
fn current_rss() -> Option<usize> {
    let statm = std::fs::read_to_string("/proc/self/statm").ok()?;
    let rss_pages = statm.split_ascii_whitespace().nth(1)?.parse::<usize>().ok()?;
    // SAFETY: standard way to obtain the page size
    let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    Some(rss_pages * usize::try_from(page_size).ok()?)
}

#[cfg(all(unix, not(target_os = "linux"), not(miri)))]
fn current_rss() -> Option<usize> {
    None
}

/// Writes the common prefix of every line: elapsed time, current and peak memory.
fn write_prefix(
    buf: &mut impl Write,
    elapsed: std::time::Duration,
    stats: RssStats,
    new_peak: bool,
) -> std::io::Result<()> {
    let RssStats { current, peak } = stats;
    let peak_style = if new_peak {
        MEMORY_NEW_PEAK_STYLE
    } else {
        MEMORY_PEAK_STYLE
    };
    write!(
        buf,
        "{} {} {}",
        format_args!("{style}{elapsed:>9.2?}{style:#}", style = TIMESTAMP_STYLE),
        format_args!("{style}{current}{style:#}", style = MEMORY_STYLE),
        format_args!("{style}{peak}{style:#}", style = peak_style),
    )
}

/// Installs the logger, returning an error if another logger was installed before.
pub fn try_setup() -> Result<(), log::SetLoggerError> {
    let start_time = Instant::now();
    let peak = AtomicUsize::new(RssStats::now().peak.0);
    let last_target = Mutex::new(String::new());

    env_logger::Builder::from_env(
        env_logger::Env::new()
            .filter_or(FILTER_ENV, "info")
            .write_style(STYLE_ENV),
    )
    .format(move |buf, record| {
        let elapsed = start_time.elapsed();
        let stats = RssStats::now();
        let new_peak = peak.fetch_max(stats.peak.0, Ordering::Relaxed) < stats.peak.0;
        let target = record.target();

        let mut last_target = last_target.lock().unwrap_or_else(|poison| poison.into_inner());
        if target != *last_target {
            last_target.clear();
            last_target.push_str(target);

            write_prefix(buf, elapsed, stats, new_peak)?;
            writeln!(buf, " {style}{target}{style:#}", style = TARGET_STYLE)?;
        }

        let level = record.level();
        write_prefix(buf, elapsed, stats, new_peak)?;
        writeln!(
            buf,
            " {style}{level}{style:#} {}",
            record.args(),
            style = buf.default_level_style(level),
        )
    })
    .try_init()
}

/// Installs the logger, ignoring the request if a logger is already installed.
pub fn setup() {
    // A second call keeps the first logger.
    let _ = try_setup();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_amounts_use_binary_units() {
        assert_eq!(MemoryAmount(512).to_string(), "  512B");
        assert_eq!(MemoryAmount(2048).to_string(), "  2.0K");
        assert_eq!(MemoryAmount(3 << 20).to_string(), "  3.0M");
        assert_eq!(MemoryAmount(5 << 30).to_string(), "  5.0G");
    }

    #[test]
    fn prefix_is_styled() {
        let mut buf = vec![];
        let stats = RssStats {
            current: MemoryAmount(10),
            peak: MemoryAmount(20),
        };
        write_prefix(&mut buf, std::time::Duration::from_millis(1500), stats, false).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("1.50s"));
        assert!(text.contains("   10B"));
        assert!(text.contains("   20B"));
    }

    #[test]
    fn repeated_setup_is_harmless() {
        setup();
        setup();
        log::info!("logger installed");
    }
}
