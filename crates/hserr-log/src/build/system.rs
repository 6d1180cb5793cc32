//! The SYSTEM section: OS identity, limits, memory, containers and CPUs.

use once_cell::sync::Lazy;
use regex::Regex;

use super::fields::{self, Built, Fields};
use crate::classify::is_header;
use crate::ir::Value;
use crate::kind::EventKind;
use crate::normalize::{Arch, HexAddress, Limit, LimitValue, OsFingerprint};

static RELEASE_ROW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<key>[A-Z_][A-Z0-9_]*)=(?P<value>.*)$").unwrap());

static UPTIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?P<days>\d+) days? (?P<hours>\d+):(?P<minutes>\d+) hours?").unwrap()
});

static PEAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"peak:\s*(?P<peak>\d+(?:\.\d+)?\s*[KMGT]?B?)").unwrap());

static NAMED_SIZE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?P<name>anon|file|shmem|retained):\s*(?P<size>\d+[KMGT]?)").unwrap()
});

static CPU_COUNTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"total (?P<total>\d+)(?: \(initial active (?P<active>\d+)\))?(?: \((?P<cores>\d+) cores per cpu, (?P<threads>\d+) threads per core\))?",
    )
    .unwrap()
});

static CPU_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"family (?P<family>\d+) model (?P<model>\d+) stepping (?P<stepping>\d+)(?: microcode (?P<microcode>0x[0-9a-fA-F]+))?",
    )
    .unwrap()
});

static MEMORY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^Memory: (?P<page>\d+[kKmMgG]) page,(?:.*?physical (?P<pt>\d+[kKmMgG])\s*\((?P<pf>\d+[kKmMgG]) free\))?(?:.*?swap (?P<st>\d+[kKmMgG])\s*\((?P<sf>\d+[kKmMgG]) free\))?",
    )
    .unwrap()
});

static PAGE_FILE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^TotalPageFile size (?P<total>\d+[KMG])(?: \(AvailPageFile size (?P<avail>\d+[KMG])\))?",
    )
    .unwrap()
});

static PROCESS_USAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^current process (?P<metric>WorkingSet|commit charge)[^:]*:\s*(?P<current>\d+[KMG])")
        .unwrap()
});

static PROC_SYS_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<path>/proc/sys/\S+?)(?:\s*\((?P<description>[^)]*)\))?\s*:\s*(?P<limit>\d+)?")
        .unwrap()
});

fn os_value(os: Option<OsFingerprint>) -> Value {
    os.map_or(Value::Absent, Value::Os)
}

/// Snake-cased field name from a label such as `Max Mhz`.
fn field_name(label: &str) -> String {
    label
        .trim()
        .to_ascii_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// `<Not Available>` placeholders read as missing.
fn available(value: &str) -> Option<&str> {
    let v = value.trim();
    (!v.is_empty() && !(v.starts_with('<') && v.ends_with('>'))).then_some(v)
}

fn release_row(key: &str, value: &str) -> Built {
    let value = value.trim().trim_matches('"');
    Fields::new()
        .with("key", Value::text(key))
        .with("value", fields::present(value))
        .with("os", os_value(OsFingerprint::from_release_row(key, value)))
        .done()
}

/// `OS:` followed by release-file rows or a distribution string. JDK 8 puts
/// the first row on the header line itself (`OS:DISTRIB_ID=Ubuntu`).
pub(super) fn os(kind: EventKind, line: &str) -> Built {
    let rest = if is_header(kind, line) {
        fields::tail(line)
    } else {
        line.trim()
    };
    if let Some(caps) = RELEASE_ROW.captures(rest) {
        return release_row(&caps["key"], &caps["value"]);
    }
    Fields::new()
        .with("description", fields::text(Some(rest)))
        .with("os", os_value(OsFingerprint::from_prose(rest)))
        .done()
}

/// `uname: Linux 5.15.0-1034-aws #38~20.04.1-Ubuntu SMP Wed Mar 29 19:35:58 UTC 2023 x86_64`
pub(super) fn uname(_kind: EventKind, line: &str) -> Built {
    let rest = fields::tail(line);
    let mut words = rest.split_whitespace();
    let sysname = words.next();
    let release = words.next();
    let arch = rest.split_whitespace().last().and_then(Arch::from_token);
    let identity = [sysname, release].into_iter().flatten().collect::<Vec<_>>().join(" ");
    Fields::new()
        .with("sysname", fields::text(sysname))
        .with("release", fields::text(release))
        .with("arch", arch.map_or(Value::Absent, Value::Arch))
        .with("os", os_value(OsFingerprint::from_prose(&identity)))
        .done()
}

/// `OS uptime: 12 days 3:04 hours`
pub(super) fn os_uptime(_kind: EventKind, line: &str) -> Built {
    let rest = fields::tail(line);
    let seconds = UPTIME.captures(rest).and_then(|c| {
        let n = |g: &str, unit: u64| c[g].parse::<u64>().ok()?.checked_mul(unit);
        n("days", 86_400)?
            .checked_add(n("hours", 3_600)?)?
            .checked_add(n("minutes", 60)?)
    });
    Fields::new()
        .with("uptime", fields::text(Some(rest)))
        .with("seconds", seconds.map_or(Value::Absent, Value::Count))
        .done()
}

/// `libc: glibc 2.31 NPTL 2.31`
pub(super) fn libc(_kind: EventKind, line: &str) -> Built {
    let mut words = fields::tail(line).split_whitespace();
    Fields::new()
        .with("implementation", fields::text(words.next()))
        .with("version", fields::text(words.next()))
        .done()
}

/// `rlimit (soft/hard): STACK 8192k/infinity , CORE 0k/infinity , NOFILE 1048576/1048576`
/// and the soft-only JDK 8 form `rlimit: STACK 8192k, CORE 0k, NOFILE 4096`.
pub(super) fn rlimit(_kind: EventKind, line: &str) -> Built {
    let mut f = Fields::new();
    for entry in fields::tail(line).split(',') {
        let Some((resource, amount)) = entry.trim().split_once(char::is_whitespace) else {
            continue;
        };
        let amount = amount.trim();
        let (soft, hard) = match amount.split_once('/') {
            Some((soft, hard)) => (soft, Some(hard)),
            None => (amount, None),
        };
        let soft = LimitValue::parse(soft);
        let hard = hard.map(LimitValue::parse).transpose();
        let value = match (soft, hard) {
            (Ok(soft), Ok(hard)) => Value::Limit(Limit { soft, hard }),
            _ => Value::text(amount),
        };
        f.push(resource.trim(), value);
    }
    f.done()
}

/// `load average: 0.52 0.58 0.59`
pub(super) fn load_average(_kind: EventKind, line: &str) -> Built {
    let mut loads = fields::tail(line).split_whitespace();
    Fields::new()
        .with("load_1m", fields::decimal(loads.next()))
        .with("load_5m", fields::decimal(loads.next()))
        .with("load_15m", fields::decimal(loads.next()))
        .done()
}

/// `MemTotal:       16132456 kB`
pub(super) fn meminfo(kind: EventKind, line: &str) -> Built {
    if is_header(kind, line) {
        return Fields::new().done();
    }
    fields::keyed_row(line)
}

/// `/sys/kernel/mm/transparent_hugepage/enabled: [always] madvise never`,
/// or the `THP mode: madvise` rows of newer releases.
pub(super) fn transparent_huge_page(_kind: EventKind, line: &str) -> Built {
    let (setting, value) = line.split_once(": ").unwrap_or_else(|| {
        line.trim_end()
            .strip_suffix(':')
            .map_or((line, ""), |setting| (setting, ""))
    });
    let selected = match (value.find('['), value.find(']')) {
        (Some(open), Some(close)) if open < close => Some(&value[open + 1..close]),
        _ => available(value),
    };
    let options = if value.contains('[') {
        fields::list(value.split_whitespace().map(|o| o.trim_matches(['[', ']'])))
    } else {
        Value::List(Vec::new())
    };
    Fields::new()
        .with("setting", fields::text(Some(setting)))
        .with("selected", fields::text(selected))
        .with("options", options)
        .done()
}

/// `Resident Set Size: 123456K (peak: 123456K) (anon: 100000K, file: 23456K, shmem: 0K)`
pub(super) fn process_memory(kind: EventKind, line: &str) -> Built {
    if is_header(kind, line) {
        return Fields::new().done();
    }
    let Some((key, rest)) = line.split_once(':') else {
        return Fields::new().with("detail", fields::text(Some(line))).done();
    };
    let first = rest.split([' ', ',']).find(|w| !w.is_empty());
    let value = match fields::size(first) {
        Value::Absent => fields::scalar(rest),
        size => size,
    };
    let mut f = Fields::new()
        .with("key", Value::text(key.trim()))
        .with("value", value)
        .with(
            "peak",
            fields::size(PEAK.captures(rest).and_then(|c| c.name("peak")).map(|m| m.as_str())),
        );
    for caps in NAMED_SIZE.captures_iter(rest) {
        f.push(&caps["name"], fields::size(Some(&caps["size"])));
    }
    f.done()
}

/// `memory_limit_in_bytes: unlimited` and the other cgroup rows.
pub(super) fn container(kind: EventKind, line: &str) -> Built {
    if is_header(kind, line) {
        return Fields::new().done();
    }
    fields::keyed_row(line)
}

/// `Steal ticks since vm start: 1234` or `Steal ticks percentage since vm start:  0.123`
pub(super) fn steal_ticks(_kind: EventKind, line: &str) -> Built {
    let metric = if line.contains("percentage") {
        "percentage"
    } else {
        "ticks"
    };
    Fields::new()
        .with("metric", Value::text(metric))
        .with("value", fields::scalar(fields::tail(line)))
        .done()
}

/// `CPU: total 4 (initial active 4) (2 cores per cpu, 2 threads per core) family 6 model 79 stepping 1 microcode 0xb000040, cmov, cx8, ...`
pub(super) fn cpu(_kind: EventKind, line: &str) -> Built {
    let rest = fields::tail(line);
    let counts = CPU_COUNTS.captures(rest);
    let id = CPU_ID.captures(rest);
    // The parenthesized counts contain commas of their own.
    let tail = rest.rfind(')').map_or(rest, |i| &rest[i + 1..]);
    let features = tail.split(',').skip(1);
    Fields::new()
        .with("total", fields::count(fields::group(&counts, "total")))
        .with("active", fields::count(fields::group(&counts, "active")))
        .with("cores_per_cpu", fields::count(fields::group(&counts, "cores")))
        .with("threads_per_core", fields::count(fields::group(&counts, "threads")))
        .with("family", fields::count(fields::group(&id, "family")))
        .with("model", fields::count(fields::group(&id, "model")))
        .with("stepping", fields::count(fields::group(&id, "stepping")))
        .with(
            "microcode",
            id.as_ref()
                .and_then(|c| c.name("microcode"))
                .and_then(|m| HexAddress::parse(m.as_str()).ok())
                .map_or(Value::Absent, Value::Address),
        )
        .with("features", fields::list(features))
        .done()
}

/// `/proc/cpuinfo` rows; `flags` becomes a list.
pub(super) fn cpu_model(kind: EventKind, line: &str) -> Built {
    if is_header(kind, line) {
        return Fields::new().done();
    }
    let Some((key, value)) = line.split_once(':') else {
        return Fields::new().with("detail", fields::text(Some(line))).done();
    };
    let key = key.trim();
    let value = match key {
        "flags" | "Features" | "bugs" => fields::list(value.split_whitespace()),
        _ => fields::scalar(value),
    };
    Fields::new()
        .with("key", Value::text(key))
        .with("value", value)
        .done()
}

/// `/proc/sys/kernel/threads-max (system-wide limit on the number of threads):`
/// with the limit on the following line. Some builds print it on the header
/// line itself.
pub(super) fn proc_sys_limit(kind: EventKind, line: &str) -> Built {
    if !is_header(kind, line) {
        return Fields::new()
            .with("limit", fields::count(Some(line)))
            .done();
    }
    let caps = PROC_SYS_HEADER.captures(line);
    Fields::new()
        .with("path", fields::text(fields::group(&caps, "path")))
        .with("description", fields::text(fields::group(&caps, "description")))
        .with("limit", fields::count(fields::group(&caps, "limit")))
        .done()
}

/// `Online cpus: 0-3`, `Current governor: <Not Available>`, ...
pub(super) fn cpu_topology(_kind: EventKind, line: &str) -> Built {
    let (key, value) = match line.split_once(':') {
        Some((key, value)) if value.trim().is_empty() => (key, fields::present(value)),
        Some((key, value)) => (key, available(value).map_or(Value::Absent, fields::scalar)),
        None => (line, Value::Absent),
    };
    Fields::new()
        .with("key", Value::text(key.trim()))
        .with("value", value)
        .done()
}

/// Windows processor table:
///
/// ```text
/// Processor Information for all 8 processors :
///   Max Mhz: 2904, Current Mhz: 2904, Mhz Limit: 2904
/// ```
pub(super) fn processor_information(kind: EventKind, line: &str) -> Built {
    if is_header(kind, line) {
        let processors = line
            .split_whitespace()
            .find(|w| w.chars().all(|c| c.is_ascii_digit()));
        return Fields::new()
            .with("processors", fields::count(processors))
            .done();
    }
    if let Some(n) = line.strip_prefix("Processor Information for processor ") {
        return Fields::new()
            .with("processor", fields::count(n.split_whitespace().next()))
            .done();
    }
    let mut f = Fields::new();
    for pair in line.split(',') {
        if let Some((key, value)) = fields::key_value(pair, ':') {
            f.push(field_name(key), value);
        }
    }
    if f.is_empty() {
        f.push("detail", fields::text(Some(line)));
    }
    f.done()
}

/// `Memory: 4k page, physical 16132456k(10234567k free), swap 0k(0k free)`
/// and the Windows `system-wide physical 16210M (8000M free)` form.
pub(super) fn memory(_kind: EventKind, line: &str) -> Built {
    let caps = MEMORY.captures(line);
    let group = |g: &str| fields::group(&caps, g);
    Fields::new()
        .with("page_size", fields::size(group("page")))
        .with("physical_total", fields::size(group("pt")))
        .with("physical_free", fields::size(group("pf")))
        .with("swap_total", fields::size(group("st")))
        .with("swap_free", fields::size(group("sf")))
        .done()
}

/// `TotalPageFile size 18642M (AvailPageFile size 6574M)`
pub(super) fn page_file(_kind: EventKind, line: &str) -> Built {
    let caps = PAGE_FILE.captures(line);
    let group = |g: &str| fields::group(&caps, g);
    Fields::new()
        .with("total", fields::size(group("total")))
        .with("available", fields::size(group("avail")))
        .done()
}

/// `current process WorkingSet (physical memory assigned to process): 245M, peak: 245M`
pub(super) fn process_memory_usage(_kind: EventKind, line: &str) -> Built {
    let caps = PROCESS_USAGE.captures(line);
    let group = |g: &str| fields::group(&caps, g);
    Fields::new()
        .with("metric", fields::text(group("metric")))
        .with("current", fields::size(group("current")))
        .with(
            "peak",
            fields::size(PEAK.captures(line).and_then(|c| c.name("peak")).map(|m| m.as_str())),
        )
        .done()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::fields::get;
    use crate::normalize::{ByteSize, OsFamily, OsVendor};

    fn size(bytes: u64) -> Value {
        Value::Size(ByteSize::from_bytes(bytes))
    }

    fn os_of(f: &[crate::ir::Field]) -> &OsFingerprint {
        match get(f, "os") {
            Value::Os(os) => os,
            other => panic!("Expected os, got {other:?}"),
        }
    }

    #[test]
    fn test_os_header_and_rows() {
        let f = os(EventKind::Os, "OS:DISTRIB_ID=Ubuntu").unwrap();
        assert_eq!(get(&f, "key"), &Value::text("DISTRIB_ID"));
        assert_eq!(os_of(&f).vendor, Some(OsVendor::Ubuntu));

        let f = os(EventKind::Os, r#"PRETTY_NAME="Ubuntu 20.04.6 LTS""#).unwrap();
        assert_eq!(os_of(&f).version.as_deref(), Some("20.04.6"));

        let f = os(EventKind::Os, "Red Hat Enterprise Linux release 8.6 (Ootpa)").unwrap();
        assert_eq!(os_of(&f).vendor, Some(OsVendor::RedHat));

        let f = os(EventKind::Os, "OS:").unwrap();
        assert_eq!(get(&f, "os"), &Value::Absent);
    }

    #[test]
    fn test_uname() {
        let f = uname(
            EventKind::Uname,
            "uname: Linux 5.15.0-1034-aws #38~20.04.1-Ubuntu SMP Wed Mar 29 19:35:58 UTC 2023 x86_64",
        )
        .unwrap();
        assert_eq!(get(&f, "sysname"), &Value::text("Linux"));
        assert_eq!(get(&f, "arch"), &Value::Arch(Arch::X86_64));
        assert_eq!(os_of(&f).family, OsFamily::Linux);
        assert_eq!(os_of(&f).vendor, None);
    }

    #[test]
    fn test_uptime_seconds() {
        let f = os_uptime(EventKind::OsUptime, "OS uptime: 2 days 3:04 hours").unwrap();
        assert_eq!(get(&f, "seconds"), &Value::Count(2 * 86_400 + 3 * 3_600 + 4 * 60));
    }

    #[test]
    fn test_rlimit_forms() {
        let f = rlimit(
            EventKind::Rlimit,
            "rlimit (soft/hard): STACK 8192k/infinity , CORE 0k/infinity , NOFILE 1048576/1048576",
        )
        .unwrap();
        assert_eq!(
            get(&f, "STACK"),
            &Value::Limit(Limit {
                soft: LimitValue::Amount(8192 * 1024),
                hard: Some(LimitValue::Infinity),
            })
        );
        assert_eq!(
            get(&f, "NOFILE"),
            &Value::Limit(Limit {
                soft: LimitValue::Amount(1048576),
                hard: Some(LimitValue::Amount(1048576)),
            })
        );

        let f = rlimit(EventKind::Rlimit, "rlimit: STACK 8192k, CORE 0k, NPROC 63450, AS infinity").unwrap();
        assert_eq!(
            get(&f, "AS"),
            &Value::Limit(Limit {
                soft: LimitValue::Infinity,
                hard: None,
            })
        );
    }

    #[test]
    fn test_load_and_meminfo() {
        let f = load_average(EventKind::LoadAverage, "load average: 0.52 0.58 0.59").unwrap();
        assert_eq!(get(&f, "load_15m"), &Value::Decimal(0.59));
        let f = load_average(EventKind::LoadAverage, "load average:").unwrap();
        assert_eq!(get(&f, "load_1m"), &Value::Absent);

        let f = meminfo(EventKind::MemInfo, "MemTotal:       16132456 kB").unwrap();
        assert_eq!(get(&f, "value"), &size(16132456 * 1024));
        let f = meminfo(EventKind::MemInfo, "HugePages_Total:       0").unwrap();
        assert_eq!(get(&f, "value"), &Value::Count(0));
    }

    #[test]
    fn test_thp_rows() {
        let f = transparent_huge_page(
            EventKind::TransparentHugePage,
            "/sys/kernel/mm/transparent_hugepage/enabled: [always] madvise never",
        )
        .unwrap();
        assert_eq!(get(&f, "selected"), &Value::text("always"));
        assert!(matches!(get(&f, "options"), Value::List(o) if o.len() == 3));

        let f = transparent_huge_page(EventKind::TransparentHugePage, "THP mode: madvise").unwrap();
        assert_eq!(get(&f, "selected"), &Value::text("madvise"));
        let f = transparent_huge_page(EventKind::TransparentHugePage, "Transparent hugepage (THP) support:").unwrap();
        assert_eq!(get(&f, "selected"), &Value::Absent);
    }

    #[test]
    fn test_process_memory_rows() {
        let f = process_memory(
            EventKind::ProcessMemory,
            "Resident Set Size: 123456K (peak: 234567K) (anon: 100000K, file: 23456K, shmem: 0K)",
        )
        .unwrap();
        assert_eq!(get(&f, "value"), &size(123456 * 1024));
        assert_eq!(get(&f, "peak"), &size(234567 * 1024));
        assert_eq!(get(&f, "anon"), &size(100000 * 1024));

        let f = process_memory(EventKind::ProcessMemory, "Swapped out: 0K").unwrap();
        assert_eq!(get(&f, "peak"), &Value::Absent);
    }

    #[test]
    fn test_cpu_line() {
        let f = cpu(
            EventKind::Cpu,
            "CPU: total 4 (initial active 4) (2 cores per cpu, 2 threads per core) family 6 model 79 stepping 1 microcode 0xb000040, cmov, cx8, fxsr",
        )
        .unwrap();
        assert_eq!(get(&f, "total"), &Value::Count(4));
        assert_eq!(get(&f, "threads_per_core"), &Value::Count(2));
        assert_eq!(get(&f, "model"), &Value::Count(79));
        assert_eq!(get(&f, "microcode"), &Value::Address(HexAddress::new(0xb000040)));
        assert_eq!(
            get(&f, "features"),
            &Value::List(vec!["cmov".into(), "cx8".into(), "fxsr".into()])
        );

        let f = cpu(EventKind::Cpu, "CPU: total 8 (initial active 8) 0x41:0x0:0xd0c:1, fp, asimd").unwrap();
        assert_eq!(get(&f, "family"), &Value::Absent);
        assert!(matches!(get(&f, "features"), Value::List(l) if l.len() == 2));
    }

    #[test]
    fn test_memory_forms() {
        let f = memory(
            EventKind::Memory,
            "Memory: 4k page, physical 16132456k(10234567k free), swap 0k(0k free)",
        )
        .unwrap();
        assert_eq!(get(&f, "page_size"), &size(4096));
        assert_eq!(get(&f, "physical_free"), &size(10234567 * 1024));
        assert_eq!(get(&f, "swap_total"), &size(0));

        let f = memory(EventKind::Memory, "Memory: 4k page, system-wide physical 16210M (8000M free)").unwrap();
        assert_eq!(get(&f, "physical_total"), &size(16210 << 20));
        assert_eq!(get(&f, "swap_total"), &Value::Absent);

        let f = page_file(EventKind::PageFile, "TotalPageFile size 18642M (AvailPageFile size 6574M)").unwrap();
        assert_eq!(get(&f, "available"), &size(6574 << 20));
    }

    #[test]
    fn test_windows_usage_and_processors() {
        let f = process_memory_usage(
            EventKind::ProcessMemoryUsage,
            "current process WorkingSet (physical memory assigned to process): 245M, peak: 246M",
        )
        .unwrap();
        assert_eq!(get(&f, "metric"), &Value::text("WorkingSet"));
        assert_eq!(get(&f, "peak"), &size(246 << 20));

        let f = processor_information(
            EventKind::ProcessorInformation,
            "  Max Mhz: 2904, Current Mhz: 2904, Mhz Limit: 2904",
        )
        .unwrap();
        assert_eq!(get(&f, "max_mhz"), &Value::Count(2904));
        assert_eq!(get(&f, "mhz_limit"), &Value::Count(2904));
    }

    #[test]
    fn test_proc_sys_limits() {
        let header = "/proc/sys/kernel/threads-max (system-wide limit on the number of threads):";
        let f = proc_sys_limit(EventKind::ThreadsMax, header).unwrap();
        assert_eq!(get(&f, "path"), &Value::text("/proc/sys/kernel/threads-max"));
        assert_eq!(
            get(&f, "description"),
            &Value::text("system-wide limit on the number of threads")
        );
        assert_eq!(get(&f, "limit"), &Value::Absent);

        let f = proc_sys_limit(EventKind::ThreadsMax, "63364").unwrap();
        assert_eq!(get(&f, "limit"), &Value::Count(63364));

        let f = proc_sys_limit(EventKind::PidMax, "/proc/sys/kernel/pid_max: 4194304").unwrap();
        assert_eq!(get(&f, "path"), &Value::text("/proc/sys/kernel/pid_max"));
        assert_eq!(get(&f, "description"), &Value::Absent);
        assert_eq!(get(&f, "limit"), &Value::Count(4194304));
    }

    #[test]
    fn test_cpu_topology_placeholders() {
        let f = cpu_topology(EventKind::CpuTopology, "Current governor: <Not Available>").unwrap();
        assert_eq!(get(&f, "value"), &Value::Absent);
        let f = cpu_topology(EventKind::CpuTopology, "Offline cpus: ").unwrap();
        assert_eq!(get(&f, "value"), &Value::text(""));
        let f = cpu_topology(EventKind::CpuTopology, "Online cpus: 0-3").unwrap();
        assert_eq!(get(&f, "value"), &Value::text("0-3"));
    }
}
