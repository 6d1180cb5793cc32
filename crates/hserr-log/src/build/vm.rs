//! Launch configuration and loaded code: arguments, flags, logging,
//! environment and the mapped library list.

use once_cell::sync::Lazy;
use regex::Regex;

use super::fields::{self, Built, Fields};
use crate::classify::is_header;
use crate::error::GrammarDefect;
use crate::ir::Value;
use crate::kind::EventKind;
use crate::normalize::{Arch, Device};

static MAPS_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<lo>[0-9a-fA-F]+)-(?P<hi>[0-9a-fA-F]+)\s+(?P<perms>[-rwxsp]{4})(?:\s+(?P<offset>[0-9a-fA-F]+)\s+(?P<dev>[0-9a-fA-F]+:[0-9a-fA-F]+)\s+(?P<inode>\d+))?\s*(?P<path>.*)$",
    )
    .unwrap()
});

static MODULE_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<lo>0x[0-9a-fA-F]+)(?:\s*-\s*(?P<hi>0x[0-9a-fA-F]+))?\s+(?P<path>.*)$").unwrap()
});

static FLAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?P<type>\w+)\s+(?P<name>\w+)\s+:?=\s*(?P<value>.*?)\s*(?P<origin>(?:\{[^}]*\}\s*)*)$",
    )
    .unwrap()
});

static ORIGIN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{(?P<origin>[^}]*)\}").unwrap());

static LOG_OUTPUT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*#(?P<index>\d+):\s*(?P<target>\S+)(?:\s+(?P<selection>\S+))?(?:\s+(?P<decorators>\S+))?(?:\s+(?P<options>.*))?$",
    )
    .unwrap()
});

static VM_INFO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^vm_info:\s*(?P<vm>.*?)\s*\((?P<version>[^)]*)\)\s*for\s+(?P<platform>[^\s,]+)(?:\s+JRE\s*\((?P<jre>[^)]*)\))?(?:,\s*built on (?P<built_on>.*?)(?:\s+by\s+"?(?P<by>[^"]*?)"?)?(?:\s+with\s+(?P<compiler>.*?))?)?\s*$"#,
    )
    .unwrap()
});

/// `/proc/self/maps` rows on Linux, `0x.. - 0x.. path` module rows on
/// Windows and `0x.. path` image rows on macOS.
pub(super) fn dynamic_library(kind: EventKind, line: &str) -> Built {
    if is_header(kind, line) {
        return Fields::new().done();
    }
    if let Some(caps) = MAPS_ROW.captures(line) {
        let group = |g: &str| caps.name(g).map(|m| m.as_str());
        let path = group("path").map(str::trim).filter(|p| !p.is_empty());
        let device = group("dev").map_or(Device::Unknown, |dev| {
            Device::classify(dev, path.unwrap_or_default())
        });
        return Fields::new()
            .with("bounds", fields::range(&[group("lo"), group("hi")]))
            .with("permissions", Value::text(&caps["perms"]))
            .with("offset", fields::address(group("offset")))
            .with("device_id", fields::text(group("dev")))
            .with("inode", fields::count(group("inode")))
            .with("path", fields::text(path))
            .with("device", Value::Device(device))
            .done();
    }
    let caps = fields::captures(&MODULE_ROW, kind, line)?;
    let bounds: Vec<Option<&str>> = ["lo", "hi"]
        .into_iter()
        .filter_map(|g| caps.name(g).map(|m| Some(m.as_str())))
        .collect();
    Fields::new()
        .with("bounds", fields::range(&bounds))
        .with("path", fields::text(Some(&caps["path"])))
        .done()
}

pub(super) fn jvm_args(_kind: EventKind, line: &str) -> Built {
    let args = fields::tail(line);
    Fields::new()
        .with("arguments", fields::present(args))
        .with("options", fields::list(args.split_whitespace()))
        .done()
}

/// `java_command: com.example.Main --port 8080`; `<unknown>` when the
/// launcher did not record one.
pub(super) fn java_command(_kind: EventKind, line: &str) -> Built {
    let command = fields::tail(line);
    let (main, arguments) = match command.split_once(char::is_whitespace) {
        Some((main, rest)) => (main, Some(rest)),
        None => (command, None),
    };
    let main = (!main.starts_with('<')).then_some(main);
    Fields::new()
        .with("command", fields::present(command))
        .with("main_class", fields::text(main))
        .with("arguments", fields::text(arguments))
        .done()
}

pub(super) fn class_path(_kind: EventKind, line: &str) -> Built {
    let path = fields::tail(line);
    let windows = path.contains(';') || path.get(1..3) == Some(":\\");
    let separator = if windows { ';' } else { ':' };
    Fields::new()
        .with("class_path", fields::present(path))
        .with("entries", fields::list(path.split(separator)))
        .done()
}

pub(super) fn launcher_type(_kind: EventKind, line: &str) -> Built {
    Fields::new()
        .with("launcher", fields::present(fields::tail(line)))
        .done()
}

/// `     bool UseG1GC                                  = true                                      {product} {ergonomic}`
pub(super) fn global_flags(kind: EventKind, line: &str) -> Built {
    let t = line.trim();
    if is_header(kind, line) || t.starts_with("[/") {
        return Fields::new().done();
    }
    let caps = fields::captures(&FLAG, kind, line)?;
    let value = match &caps["value"] {
        "true" => Value::Flag(true),
        "false" => Value::Flag(false),
        other => fields::scalar(other),
    };
    let origins = ORIGIN
        .captures_iter(&caps["origin"])
        .map(|c| c.name("origin").map_or("", |m| m.as_str()).to_string())
        .collect();
    Fields::new()
        .with("type", Value::text(&caps["type"]))
        .with("name", Value::text(&caps["name"]))
        .with("value", value)
        .with("origin", Value::List(origins))
        .done()
}

/// ` #0: stdout all=warning uptime,level,tags`
pub(super) fn logging(kind: EventKind, line: &str) -> Built {
    if is_header(kind, line) {
        return Fields::new().done();
    }
    let Some(caps) = LOG_OUTPUT.captures(line) else {
        return Fields::new().with("detail", fields::text(Some(line))).done();
    };
    let group = |g: &str| caps.name(g).map(|m| m.as_str());
    Fields::new()
        .with("output", fields::count(group("index")))
        .with("target", fields::text(group("target")))
        .with("selection", fields::text(group("selection")))
        .with("decorators", fields::list(group("decorators").unwrap_or_default().split(',')))
        .with("options", fields::text(group("options")))
        .done()
}

pub(super) fn environment(kind: EventKind, line: &str) -> Built {
    if is_header(kind, line) {
        return Fields::new().done();
    }
    let Some((name, value)) = line.split_once('=') else {
        return Err(GrammarDefect::rejected(kind, line));
    };
    Fields::new()
        .with("name", Value::text(name.trim()))
        .with("value", fields::present(value))
        .done()
}

/// `Periodic native trim disabled`
pub(super) fn native_trim(_kind: EventKind, line: &str) -> Built {
    Fields::new()
        .with("enabled", Value::Flag(!line.contains("disabled")))
        .done()
}

/// `vm_info: OpenJDK 64-Bit Server VM (17.0.8+7) for linux-amd64 JRE (17.0.8+7), built on ... by "buildd" with gcc 9.4.0`
pub(super) fn vm_info(_kind: EventKind, line: &str) -> Built {
    let Some(caps) = VM_INFO.captures(line) else {
        return Fields::new()
            .with("vm", fields::text(Some(fields::tail(line))))
            .with("arch", Value::Absent)
            .done();
    };
    let group = |g: &str| caps.name(g).map(|m| m.as_str());
    Fields::new()
        .with("vm", fields::text(group("vm")))
        .with("version", fields::text(group("version")))
        .with("platform", fields::text(group("platform")))
        .with(
            "arch",
            group("platform")
                .and_then(Arch::from_token)
                .map_or(Value::Absent, Value::Arch),
        )
        .with("jre_version", fields::text(group("jre")))
        .with("built_on", fields::text(group("built_on")))
        .with("built_by", fields::text(group("by")))
        .with("compiler", fields::text(group("compiler")))
        .done()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::fields::get;
    use crate::normalize::HexAddress;

    #[test]
    fn test_maps_row() {
        let f = dynamic_library(
            EventKind::DynamicLibrary,
            "7f3a4c000000-7f3a4d000000 r-xp 00000000 fd:00 1234567                    /usr/lib/jvm/java-17/lib/server/libjvm.so",
        )
        .unwrap();
        assert_eq!(
            get(&f, "bounds"),
            &Value::Range(vec![HexAddress::new(0x7f3a4c000000), HexAddress::new(0x7f3a4d000000)])
        );
        assert_eq!(get(&f, "permissions"), &Value::text("r-xp"));
        assert_eq!(get(&f, "inode"), &Value::Count(1234567));
        assert_eq!(get(&f, "device"), &Value::Device(Device::FixedDisk));
        assert_eq!(get(&f, "path"), &Value::text("/usr/lib/jvm/java-17/lib/server/libjvm.so"));
    }

    #[test]
    fn test_anonymous_and_nfs_mappings() {
        let f = dynamic_library(EventKind::DynamicLibrary, "7f3a4e000000-7f3a4e021000 rw-p 00000000 00:00 0 ").unwrap();
        assert_eq!(get(&f, "path"), &Value::Absent);
        assert_eq!(get(&f, "device"), &Value::Device(Device::Unknown));

        let f = dynamic_library(
            EventKind::DynamicLibrary,
            "7f3a40000000-7f3a40100000 r--s 00001000 00:2b 998877   /mnt/nfs/shared/app.jar",
        )
        .unwrap();
        assert_eq!(get(&f, "device"), &Value::Device(Device::Nfs));
    }

    #[test]
    fn test_windows_and_mac_module_rows() {
        let f = dynamic_library(
            EventKind::DynamicLibrary,
            "0x00007ff6a1b20000 - 0x00007ff6a1b2e000 \tC:\\Program Files\\Java\\jdk-17\\bin\\java.exe",
        )
        .unwrap();
        assert!(matches!(get(&f, "bounds"), Value::Range(r) if r.len() == 2));
        assert_eq!(get(&f, "path"), &Value::text("C:\\Program Files\\Java\\jdk-17\\bin\\java.exe"));

        let f = dynamic_library(EventKind::DynamicLibrary, "0x000000010a8d2000 \t/usr/lib/libz.1.dylib").unwrap();
        assert!(matches!(get(&f, "bounds"), Value::Range(r) if r.len() == 1));
    }

    #[test]
    fn test_flag_rows() {
        let f = global_flags(
            EventKind::GlobalFlags,
            "     bool UseG1GC                                  = true                                      {product} {ergonomic}",
        )
        .unwrap();
        assert_eq!(get(&f, "name"), &Value::text("UseG1GC"));
        assert_eq!(get(&f, "value"), &Value::Flag(true));
        assert_eq!(
            get(&f, "origin"),
            &Value::List(vec!["product".into(), "ergonomic".into()])
        );

        let f = global_flags(
            EventKind::GlobalFlags,
            "    uintx MaxHeapSize                              := 2147483648                          {product}",
        )
        .unwrap();
        assert_eq!(get(&f, "value"), &Value::Count(2147483648));
        assert!(global_flags(EventKind::GlobalFlags, "[/Global flags]").unwrap().is_empty());
    }

    #[test]
    fn test_java_command_and_class_path() {
        let f = java_command(EventKind::JavaCommand, "java_command: com.example.Main --port 8080").unwrap();
        assert_eq!(get(&f, "main_class"), &Value::text("com.example.Main"));
        assert_eq!(get(&f, "arguments"), &Value::text("--port 8080"));
        let f = java_command(EventKind::JavaCommand, "java_command: <unknown>").unwrap();
        assert_eq!(get(&f, "main_class"), &Value::Absent);

        let f = class_path(EventKind::ClassPath, "java_class_path (initial): lib/a.jar:lib/b.jar").unwrap();
        assert_eq!(get(&f, "entries"), &Value::List(vec!["lib/a.jar".into(), "lib/b.jar".into()]));
        let f = class_path(EventKind::ClassPath, "java_class_path (initial): C:\\app\\a.jar;C:\\app\\b.jar").unwrap();
        assert!(matches!(get(&f, "entries"), Value::List(e) if e.len() == 2));
    }

    #[test]
    fn test_logging_output() {
        let f = logging(EventKind::Logging, " #0: stdout all=warning uptime,level,tags").unwrap();
        assert_eq!(get(&f, "output"), &Value::Count(0));
        assert_eq!(get(&f, "target"), &Value::text("stdout"));
        assert_eq!(get(&f, "selection"), &Value::text("all=warning"));
        assert!(matches!(get(&f, "decorators"), Value::List(d) if d.len() == 3));
    }

    #[test]
    fn test_vm_info() {
        let f = vm_info(
            EventKind::VmInfo,
            r#"vm_info: OpenJDK 64-Bit Server VM (17.0.8+7-Ubuntu-120.04.2) for linux-amd64 JRE (17.0.8+7-Ubuntu-120.04.2), built on Jul 20 2023 00:00:00 by "buildd" with gcc 9.4.0"#,
        )
        .unwrap();
        assert_eq!(get(&f, "vm"), &Value::text("OpenJDK 64-Bit Server VM"));
        assert_eq!(get(&f, "arch"), &Value::Arch(Arch::X86_64));
        assert_eq!(get(&f, "built_by"), &Value::text("buildd"));
        assert_eq!(get(&f, "compiler"), &Value::text("gcc 9.4.0"));
    }

    #[test]
    fn test_environment_row() {
        let f = environment(EventKind::EnvironmentVariables, "JAVA_HOME=/usr/lib/jvm/java-17").unwrap();
        assert_eq!(get(&f, "name"), &Value::text("JAVA_HOME"));
        let f = environment(EventKind::EnvironmentVariables, "LD_PRELOAD=").unwrap();
        assert_eq!(get(&f, "value"), &Value::text(""));
        assert!(environment(EventKind::EnvironmentVariables, "LD_PRELOAD").is_err());
    }

    #[test]
    fn test_empty_jvm_args_are_present() {
        let f = jvm_args(EventKind::JvmArgs, "jvm_args:").unwrap();
        assert_eq!(get(&f, "arguments"), &Value::text(""));
        assert_eq!(get(&f, "options"), &Value::List(Vec::new()));

        let f = jvm_args(EventKind::JvmArgs, "jvm_args: -Xmx2g -XX:+UseG1GC").unwrap();
        assert_eq!(get(&f, "arguments"), &Value::text("-Xmx2g -XX:+UseG1GC"));
        assert!(matches!(get(&f, "options"), Value::List(o) if o.len() == 2));
    }
}
