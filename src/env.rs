use crate::bench::{KEY_WIDTH, VALUE_LEN};
use crate::config::BenchConfig;
use std::io::Write;

const CPUINFO: &str = "/proc/cpuinfo";

/// Processor summary taken from `/proc/cpuinfo`.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CpuInfo {
    /// Number of `model name` entries, one per logical CPU.
    pub count: usize,
    /// Last reported model name.
    pub model: String,
    /// Last reported cache size.
    pub cache_size: String,
}

/// Summarise the text of a `/proc/cpuinfo` file. `None` when it lists no
/// processor model at all.
pub fn parse_cpuinfo(text: &str) -> Option<CpuInfo> {
    let mut info = CpuInfo::default();

    for line in text.lines() {
        let mut parts = line.splitn(2, ':');
        let (key, value) = match (parts.next(), parts.next()) {
            (Some(key), Some(value)) => (key.trim(), value.trim()),
            _ => continue,
        };

        match key {
            "model name" => {
                info.count += 1;
                info.model = value.to_owned();
            }
            "cache size" => info.cache_size = value.to_owned(),
            _ => {}
        }
    }

    if info.count == 0 {
        None
    } else {
        Some(info)
    }
}

/// Processor summary of this host, if the platform exposes one.
pub fn cpu_info() -> Option<CpuInfo> {
    std::fs::read_to_string(CPUINFO)
        .ok()
        .and_then(|text| parse_cpuinfo(&text))
}

/// Write the report header: versions, host and workload shape.
pub fn write_header<W: Write>(out: &mut W, config: &BenchConfig) -> std::io::Result<()> {
    writeln!(out, "kvbench:        version {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(out, "Engine:         {}", config.engine)?;
    writeln!(out, "Date:           {}", time::now().ctime())?;

    if let Some(cpu) = cpu_info() {
        writeln!(out, "CPU:            {} * [{}]", cpu.count, cpu.model)?;
        writeln!(out, "CPUCache:       {}", cpu.cache_size)?;
    }

    writeln!(out, "Keys:           {} bytes each", KEY_WIDTH)?;
    writeln!(out, "Values:         {} bytes each", VALUE_LEN)?;
    writeln!(out, "Entries:        {}", config.num_records)?;
    writeln!(out, "------------------------------------------------")
}
