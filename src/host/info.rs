// src/host/info.rs

//! One-shot system overview for `sysmaint info`.

use std::fmt;
use std::time::Duration;

use sysinfo::{System, MINIMUM_CPU_UPDATE_INTERVAL};

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// OS, load, memory and uptime at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemSnapshot {
    pub os: String,
    pub cpu_percent: f32,
    /// Bytes.
    pub memory_used: u64,
    /// Bytes.
    pub memory_total: u64,
    pub uptime: Duration,
}

impl SystemSnapshot {
    pub fn memory_percent(&self) -> f64 {
        if self.memory_total == 0 {
            return 0.0;
        }
        self.memory_used as f64 * 100.0 / self.memory_total as f64
    }
}

impl fmt::Display for SystemSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "OS: {}", self.os)?;
        writeln!(f, "CPU: {:.1}%", self.cpu_percent)?;
        writeln!(
            f,
            "RAM: {:.1}% ({:.2} / {:.2} GB)",
            self.memory_percent(),
            self.memory_used as f64 / GIB,
            self.memory_total as f64 / GIB
        )?;
        write!(f, "Uptime: {}", format_uptime(self.uptime))
    }
}

/// `3d 4h 5m`; seconds are dropped.
pub fn format_uptime(uptime: Duration) -> String {
    let secs = uptime.as_secs();
    let days = secs / 86_400;
    let hours = secs % 86_400 / 3_600;
    let minutes = secs % 3_600 / 60;
    format!("{days}d {hours}h {minutes}m")
}

/// Sample the host. CPU usage needs two readings, so this takes at least
/// `MINIMUM_CPU_UPDATE_INTERVAL`.
pub async fn collect() -> SystemSnapshot {
    let mut sys = System::new();
    sys.refresh_cpu_usage();
    tokio::time::sleep(MINIMUM_CPU_UPDATE_INTERVAL).await;
    sys.refresh_cpu_usage();
    sys.refresh_memory();

    let os = match (System::name(), System::os_version()) {
        (Some(name), Some(version)) => format!("{name} {version}"),
        (Some(name), None) => name,
        _ => std::env::consts::OS.to_string(),
    };

    SystemSnapshot {
        os,
        cpu_percent: sys.global_cpu_usage(),
        memory_used: sys.used_memory(),
        memory_total: sys.total_memory(),
        uptime: Duration::from_secs(System::uptime()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uptime_breaks_down_into_days_hours_minutes() {
        assert_eq!(format_uptime(Duration::from_secs(0)), "0d 0h 0m");
        assert_eq!(format_uptime(Duration::from_secs(59)), "0d 0h 0m");
        assert_eq!(format_uptime(Duration::from_secs(3 * 3_600 + 125)), "0d 3h 2m");
        assert_eq!(
            format_uptime(Duration::from_secs(2 * 86_400 + 23 * 3_600 + 59 * 60 + 59)),
            "2d 23h 59m"
        );
    }

    #[test]
    fn snapshot_renders_one_line_per_metric() {
        let snapshot = SystemSnapshot {
            os: "Windows 11".to_string(),
            cpu_percent: 12.34,
            memory_used: 4 * 1024 * 1024 * 1024,
            memory_total: 16 * 1024 * 1024 * 1024,
            uptime: Duration::from_secs(90_061),
        };

        assert_eq!(
            snapshot.to_string(),
            "OS: Windows 11\nCPU: 12.3%\nRAM: 25.0% (4.00 / 16.00 GB)\nUptime: 1d 1h 1m"
        );
    }

    #[test]
    fn zero_total_memory_does_not_divide() {
        let snapshot = SystemSnapshot {
            os: String::new(),
            cpu_percent: 0.0,
            memory_used: 0,
            memory_total: 0,
            uptime: Duration::ZERO,
        };
        assert_eq!(snapshot.memory_percent(), 0.0);
    }

    #[tokio::test]
    async fn collect_reads_real_memory() {
        let snapshot = collect().await;
        assert!(snapshot.memory_total > 0);
        assert!(snapshot.memory_used <= snapshot.memory_total);
        assert!(!snapshot.os.is_empty());
    }
}
