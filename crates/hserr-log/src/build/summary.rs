use once_cell::sync::Lazy;
use regex::Regex;

use super::fields::{self, Built, Fields};
use crate::ir::Value;
use crate::kind::EventKind;
use crate::normalize::OsFingerprint;

static HOST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<cpu>.*?),\s*(?P<cores>\d+) cores?,\s*(?P<mem>\d+(?:\.\d+)?[KMGT]?),\s*(?P<os>.*)$",
    )
    .unwrap()
});

static TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[Tt]ime:\s*(?P<time>.*?)(?:\s*elapsed time:\s*(?P<elapsed>\d+(?:\.\d+)?) seconds.*)?$",
    )
    .unwrap()
});

static ELAPSED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^elapsed time:\s*(?P<secs>\d+(?:\.\d+)?) seconds").unwrap());

/// Options that take the following token as their value.
const VALUED_OPTIONS: &[&str] = &["-cp", "-classpath", "--class-path", "--module-path", "-p"];

/// Everything after one of these is the program being launched.
const LAUNCH_OPTIONS: &[(&str, &str)] = &[("-jar", "jar"), ("-m", "module"), ("--module", "module")];

/// A launcher command line split into its JVM options and the program
/// invocation. Either side is `None` when absent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandLine {
    pub options: Option<String>,
    pub invocation: Option<String>,
    /// `class`, `jar` or `module`.
    pub mode: Option<&'static str>,
}

/// Splits `-Xmx2048m -cp app.jar com.example.Main arg` into options
/// (`-Xmx2048m -cp app.jar`) and invocation (`com.example.Main arg`).
pub fn split_command_line(text: &str) -> CommandLine {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let mut options = Vec::new();
    let mut mode = None;
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];
        if let Some((_, launch)) = LAUNCH_OPTIONS.iter().find(|(opt, _)| *opt == token) {
            mode = Some(*launch);
            i += 1;
            break;
        }
        if !token.starts_with('-') {
            break;
        }
        options.push(token);
        if VALUED_OPTIONS.contains(&token)
            && let Some(value) = tokens.get(i + 1)
        {
            options.push(value);
            i += 1;
        }
        i += 1;
    }
    let rest = &tokens[i.min(tokens.len())..];
    if mode.is_none() && !rest.is_empty() {
        mode = Some("class");
    }
    CommandLine {
        options: (!options.is_empty()).then(|| options.join(" ")),
        invocation: (!rest.is_empty()).then(|| rest.join(" ")),
        mode,
    }
}

pub(super) fn nothing(_kind: EventKind, _line: &str) -> Built {
    Fields::new().done()
}

/// `---------------  S U M M A R Y ------------`
pub(super) fn section_banner(_kind: EventKind, line: &str) -> Built {
    let name: String = line
        .trim_matches(|c: char| c == '-' || c.is_whitespace())
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    Fields::new().with("section", Value::Text(name)).done()
}

pub(super) fn command_line(_kind: EventKind, line: &str) -> Built {
    let split = split_command_line(fields::tail(line));
    Fields::new()
        .with("options", fields::text(split.options.as_deref()))
        .with("invocation", fields::text(split.invocation.as_deref()))
        .with("mode", fields::text(split.mode))
        .done()
}

/// `Host: Intel(R) Xeon(R) CPU E5-2686 v4 @ 2.30GHz, 4 cores, 15G, Ubuntu 20.04.6 LTS`
pub(super) fn host(_kind: EventKind, line: &str) -> Built {
    let rest = fields::tail(line);
    let Some(caps) = HOST.captures(rest) else {
        return Fields::new()
            .with("cpu", fields::text(Some(rest)))
            .with("cores", Value::Absent)
            .with("memory", Value::Absent)
            .with("os_description", Value::Absent)
            .with("os", Value::Absent)
            .done();
    };
    let description = caps["os"].trim();
    Fields::new()
        .with("cpu", fields::text(Some(&caps["cpu"])))
        .with("cores", fields::count(Some(&caps["cores"])))
        .with("memory", fields::size(Some(&caps["mem"])))
        .with("os_description", fields::text(Some(description)))
        .with(
            "os",
            OsFingerprint::from_prose(description).map_or(Value::Absent, Value::Os),
        )
        .done()
}

pub(super) fn time(_kind: EventKind, line: &str) -> Built {
    let caps = TIME.captures(line);
    let time = caps
        .as_ref()
        .and_then(|c| c.name("time"))
        .map_or_else(|| fields::tail(line), |m| m.as_str());
    let elapsed = caps
        .as_ref()
        .and_then(|c| c.name("elapsed"))
        .map(|m| m.as_str());
    Fields::new()
        .with("time", fields::text(Some(time)))
        .with("elapsed_seconds", fields::decimal(elapsed))
        .done()
}

pub(super) fn elapsed_time(_kind: EventKind, line: &str) -> Built {
    let secs = ELAPSED
        .captures(line)
        .and_then(|c| c.name("secs"))
        .map(|m| m.as_str());
    Fields::new()
        .with("elapsed_seconds", fields::decimal(secs))
        .done()
}

pub(super) fn timezone(_kind: EventKind, line: &str) -> Built {
    Fields::new()
        .with("timezone", fields::text(Some(fields::tail(line))))
        .done()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::fields::get;
    use crate::normalize::{ByteSize, OsVendor};

    #[test]
    fn test_split_plain_class() {
        let split = split_command_line("-Xmx2048m TestCrash");
        assert_eq!(split.options.as_deref(), Some("-Xmx2048m"));
        assert_eq!(split.invocation.as_deref(), Some("TestCrash"));
        assert_eq!(split.mode, Some("class"));
    }

    #[test]
    fn test_split_classpath_value_is_an_option() {
        let split = split_command_line("-Xss1m -cp lib/a.jar:lib/b.jar com.example.Main --port 8080");
        assert_eq!(split.options.as_deref(), Some("-Xss1m -cp lib/a.jar:lib/b.jar"));
        assert_eq!(split.invocation.as_deref(), Some("com.example.Main --port 8080"));
    }

    #[test]
    fn test_split_jar() {
        let split = split_command_line("-Dfoo=bar -jar app.jar serve");
        assert_eq!(split.options.as_deref(), Some("-Dfoo=bar"));
        assert_eq!(split.invocation.as_deref(), Some("app.jar serve"));
        assert_eq!(split.mode, Some("jar"));
    }

    #[test]
    fn test_split_options_only_and_empty() {
        let split = split_command_line("-version");
        assert_eq!(split.options.as_deref(), Some("-version"));
        assert_eq!(split.invocation, None);
        assert_eq!(split_command_line("   "), CommandLine::default());
    }

    #[test]
    fn test_host_row() {
        let f = host(
            EventKind::Host,
            "Host: Intel(R) Xeon(R) CPU E5-2686 v4 @ 2.30GHz, 4 cores, 15G, Ubuntu 20.04.6 LTS",
        )
        .unwrap();
        assert_eq!(get(&f, "cores"), &Value::Count(4));
        assert_eq!(get(&f, "memory"), &Value::Size(ByteSize::from_bytes(15 << 30)));
        let Value::Os(os) = get(&f, "os") else {
            panic!("Expected os fingerprint");
        };
        assert_eq!(os.vendor, Some(OsVendor::Ubuntu));
    }

    #[test]
    fn test_time_with_and_without_elapsed() {
        let f = time(
            EventKind::Time,
            "Time: Mon Jan 15 10:23:45 2024 UTC elapsed time: 12.345678 seconds (0d 0h 0m 12s)",
        )
        .unwrap();
        assert_eq!(get(&f, "time"), &Value::text("Mon Jan 15 10:23:45 2024 UTC"));
        assert_eq!(get(&f, "elapsed_seconds"), &Value::Decimal(12.345678));

        let f = time(EventKind::Time, "time: Mon Jan 15 10:23:45 2024").unwrap();
        assert_eq!(get(&f, "elapsed_seconds"), &Value::Absent);
    }

    #[test]
    fn test_empty_command_line_is_absent() {
        let f = command_line(EventKind::CommandLine, "Command Line: ").unwrap();
        assert_eq!(get(&f, "options"), &Value::Absent);
        assert_eq!(get(&f, "invocation"), &Value::Absent);
    }

    #[test]
    fn test_section_banner_name() {
        let f = section_banner(EventKind::SectionBanner, "---------------  T H R E A D  ---------------").unwrap();
        assert_eq!(get(&f, "section"), &Value::text("THREAD"));
    }
}
