//! # Métricas do Processo
//!
//! Snapshot de memória usado pelo benchmark de QA, tirado logo após o
//! carregamento do modelo e depois de cada inferência.
//!
//! | Métrica | Fonte |
//! |---------|-------|
//! | RSS do processo (MB) | `sysinfo` |
//! | RAM total (MB) | `sysinfo` |
//! | Cores lógicos | `sysinfo` |

use serde::Serialize;
use sysinfo::{Pid, ProcessesToUpdate, System};

const MB: f64 = 1024.0 * 1024.0;

#[derive(Clone, Debug, Serialize)]
pub struct ProcessMetrics {
    /// RSS do processo em MB (0 se o SO não informar).
    pub memory_used_mb: f64,
    pub memory_total_mb: f64,
    pub cpu_total_cores: usize,
}

/// Coleta um snapshot do processo atual.
pub fn collect_metrics() -> ProcessMetrics {
    let pid = Pid::from_u32(std::process::id());

    let mut sys = System::new();
    sys.refresh_memory();
    sys.refresh_cpu_usage();
    sys.refresh_processes(ProcessesToUpdate::Some(&[pid]), false);

    let memory_used_mb = sys
        .process(pid)
        .map(|p| p.memory() as f64 / MB)
        .unwrap_or(0.0);

    ProcessMetrics {
        memory_used_mb,
        memory_total_mb: sys.total_memory() as f64 / MB,
        cpu_total_cores: sys.cpus().len(),
    }
}

impl ProcessMetrics {
    /// `"RAM 150.3 MB / 16384 MB | 8 cores"`
    pub fn summary_line(&self) -> String {
        format!(
            "RAM {:.1} MB / {:.0} MB | {} cores",
            self.memory_used_mb, self.memory_total_mb, self.cpu_total_cores
        )
    }
}
