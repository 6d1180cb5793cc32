//! Thread identity rows: the crashing thread, thread lists, SMR info,
//! compile tasks and VM state.

use once_cell::sync::Lazy;
use regex::Regex;

use super::fields::{self, Built, Fields};
use crate::classify::is_header;
use crate::ir::Value;
use crate::kind::EventKind;
use crate::normalize::HexAddress;

static CURRENT_THREAD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Current thread \((?P<addr>0x[0-9a-fA-F]+)\):\s*(?P<desc>.*)$").unwrap()
});

static THREAD_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?P<current>=>)?\s*(?P<addr>0x[0-9a-fA-F]+)\s+(?P<desc>.*)$").unwrap()
});

static THREAD_DESC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(?:\(exited\)\s+)?(?P<type>[A-Za-z_]\w*)(?:\s+"(?P<name>[^"]*)")?(?P<rest>.*)$"#)
        .unwrap()
});

static THREAD_STATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[(?P<state>_thread_\w+)").unwrap());
static THREAD_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bid=(?P<id>\d+)").unwrap());
static THREAD_STACK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"stack[:(]\s*(?P<lo>0x[0-9a-fA-F]+)\s*,\s*(?P<hi>0x[0-9a-fA-F]+)").unwrap()
});

static TOTAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Total: (?P<n>\d+)").unwrap());

static STACK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^Stack: \[(?P<lo>0x[0-9a-fA-F]+),\s*(?P<hi>0x[0-9a-fA-F]+)\](?:.*?sp=(?P<sp>0x[0-9a-fA-F]+))?(?:.*?free space=(?P<free>\d+[kKmMgG]?))?",
    )
    .unwrap()
});

static COMPILE_TASK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<compiler>[Cc][12]|JVMCI):\s*(?P<task>.*)$").unwrap()
});

static COMPILER_THREAD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<thread>.*?CompilerThread\d*)\s+(?P<task>.*)$").unwrap());

static TASK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<ts>\d+)(?:\s+(?P<id>\d+))?").unwrap()
});

static TASK_METHOD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?P<method>\S+)\s+(?:@\s*\d+\s+)?\((?P<bytes>\d+) bytes\)").unwrap()
});

static VM_STATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^VM state:\s*(?P<state>[^(]*?)\s*(?:\((?P<detail>[^)]*)\))?\s*$").unwrap()
});

static MUTEX_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\[(?P<addr>0x[0-9a-fA-F]+)\]\s+(?P<lock>.*?)(?:\s+-\s+owner thread:\s*(?P<owner>0x[0-9a-fA-F]+))?\s*$",
    )
    .unwrap()
});

static SMR_PAIR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?P<key>\w+)=(?P<value>[^,\s{}]*)").unwrap());

/// Type, name, daemon flag, state, id and stack of a thread description
/// such as `JavaThread "main" [_thread_in_native, id=12346, stack(0x..,0x..)]`.
fn describe_thread(f: &mut Fields, desc: &str) {
    let caps = THREAD_DESC.captures(desc.trim());
    let thread_type = caps
        .as_ref()
        .and_then(|c| c.name("type"))
        .map(|m| m.as_str());
    let name = caps.as_ref().and_then(|c| c.name("name")).map(|m| m.as_str());
    let rest = caps
        .as_ref()
        .and_then(|c| c.name("rest"))
        .map_or(desc, |m| m.as_str());
    let daemon = rest
        .split('[')
        .next()
        .is_some_and(|before| before.split_whitespace().any(|w| w == "daemon"));
    let stack = THREAD_STACK.captures(rest);

    f.push("thread_type", fields::text(thread_type));
    f.push("name", name.map_or(Value::Absent, Value::text));
    f.push("daemon", Value::Flag(daemon));
    f.push(
        "state",
        fields::text(THREAD_STATE.captures(rest).and_then(|c| c.name("state")).map(|m| m.as_str())),
    );
    f.push(
        "id",
        fields::count(THREAD_ID.captures(rest).and_then(|c| c.name("id")).map(|m| m.as_str())),
    );
    f.push(
        "stack",
        match stack {
            Some(c) => fields::range(&[c.name("lo").map(|m| m.as_str()), c.name("hi").map(|m| m.as_str())]),
            None => Value::Absent,
        },
    );
}

/// Timestamp, compile id, method and bytecode size of a compile task.
fn describe_task(f: &mut Fields, task: &str) {
    let task = task.trim();
    let caps = TASK.captures(task);
    let method = TASK_METHOD.captures(task);
    f.push(
        "timestamp_ms",
        fields::count(caps.as_ref().and_then(|c| c.name("ts")).map(|m| m.as_str())),
    );
    f.push(
        "compile_id",
        fields::count(caps.as_ref().and_then(|c| c.name("id")).map(|m| m.as_str())),
    );
    f.push(
        "method",
        fields::text(method.as_ref().and_then(|c| c.name("method")).map(|m| m.as_str())),
    );
    f.push(
        "bytes",
        fields::count(method.as_ref().and_then(|c| c.name("bytes")).map(|m| m.as_str())),
    );
    f.push("task", fields::text(Some(task)));
}

pub(super) fn current_thread(kind: EventKind, line: &str) -> Built {
    if line.starts_with("Current thread is native thread") {
        return Fields::new()
            .with("address", Value::Absent)
            .with("thread_type", Value::text("native"))
            .done();
    }
    let caps = fields::captures(&CURRENT_THREAD, kind, line)?;
    let mut f = Fields::new().with("address", fields::address(Some(&caps["addr"])));
    describe_thread(&mut f, &caps["desc"]);
    f.done()
}

pub(super) fn stack(_kind: EventKind, line: &str) -> Built {
    let caps = STACK.captures(line);
    let name = |n: &str| caps.as_ref().and_then(|c| c.name(n)).map(|m| m.as_str());
    Fields::new()
        .with("bounds", fields::range(&[name("lo"), name("hi")]))
        .with("sp", fields::address(name("sp")))
        .with("free_space", fields::size(name("free")))
        .done()
}

pub(super) fn compile_task(kind: EventKind, line: &str) -> Built {
    if is_header(kind, line) {
        return Fields::new().done();
    }
    let caps = fields::captures(&COMPILE_TASK, kind, line)?;
    let mut f = Fields::new().with("compiler", Value::text(&caps["compiler"]));
    describe_task(&mut f, &caps["task"]);
    f.done()
}

/// `Threads class SMR info:` and its brace-delimited element lists.
pub(super) fn smr_info(kind: EventKind, line: &str) -> Built {
    let t = line.trim();
    if is_header(kind, line) || t.is_empty() || t == "}" {
        return Fields::new().done();
    }
    if t.starts_with('_') {
        let mut f = Fields::new();
        for caps in SMR_PAIR.captures_iter(t) {
            let value = fields::scalar(&caps["value"]);
            if !value.is_absent() {
                f.push(caps["key"].trim_start_matches('_'), value);
            }
        }
        return f.done();
    }
    let threads = HexAddress::scan(t);
    if threads.is_empty() {
        return Fields::new().with("detail", Value::text(t)).done();
    }
    Fields::new().with("threads", Value::Range(threads)).done()
}

/// `Java Threads:` and `Other Threads:` rows.
pub(super) fn thread_list(kind: EventKind, line: &str) -> Built {
    if is_header(kind, line) {
        return Fields::new().done();
    }
    if let Some(caps) = TOTAL.captures(line) {
        return Fields::new().with("total", fields::count(Some(&caps["n"]))).done();
    }
    let caps = fields::captures(&THREAD_ROW, kind, line)?;
    let mut f = Fields::new()
        .with("current", Value::Flag(caps.name("current").is_some()))
        .with("address", fields::address(Some(&caps["addr"])));
    describe_thread(&mut f, &caps["desc"]);
    f.done()
}

pub(super) fn compile_task_threads(kind: EventKind, line: &str) -> Built {
    if is_header(kind, line) {
        return Fields::new().done();
    }
    if let Some(caps) = TOTAL.captures(line) {
        return Fields::new().with("total", fields::count(Some(&caps["n"]))).done();
    }
    let caps = fields::captures(&COMPILER_THREAD, kind, line)?;
    let mut f = Fields::new().with("thread", Value::text(caps["thread"].trim()));
    describe_task(&mut f, &caps["task"]);
    f.done()
}

pub(super) fn vm_state(_kind: EventKind, line: &str) -> Built {
    let caps = VM_STATE.captures(line);
    let state = caps
        .as_ref()
        .and_then(|c| c.name("state"))
        .map_or_else(|| fields::tail(line), |m| m.as_str().trim());
    let detail = caps.as_ref().and_then(|c| c.name("detail")).map(|m| m.as_str());
    Fields::new()
        .with("state", fields::text(Some(state)))
        .with("detail", fields::text(detail))
        .with("at_safepoint", Value::Flag(state == "at safepoint"))
        .done()
}

pub(super) fn vm_mutex(kind: EventKind, line: &str) -> Built {
    if is_header(kind, line) {
        let owner = fields::tail(line);
        return Fields::new()
            .with("held", Value::Flag(!owner.is_empty() && owner != "None"))
            .done();
    }
    let caps = fields::captures(&MUTEX_ROW, kind, line)?;
    Fields::new()
        .with("address", fields::address(Some(&caps["addr"])))
        .with("lock", fields::text(Some(&caps["lock"])))
        .with("owner", fields::address(caps.name("owner").map(|m| m.as_str())))
        .done()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::fields::get;
    use crate::normalize::ByteSize;

    #[test]
    fn test_current_java_thread() {
        let f = current_thread(
            EventKind::CurrentThread,
            r#"Current thread (0x00007f3a44012345):  JavaThread "main" [_thread_in_native, id=12346, stack(0x00007f3a4d5e6000,0x00007f3a4d6e7000)]"#,
        )
        .unwrap();
        assert_eq!(get(&f, "address"), &Value::Address(HexAddress::new(0x7f3a44012345)));
        assert_eq!(get(&f, "thread_type"), &Value::text("JavaThread"));
        assert_eq!(get(&f, "name"), &Value::text("main"));
        assert_eq!(get(&f, "state"), &Value::text("_thread_in_native"));
        assert_eq!(get(&f, "id"), &Value::Count(12346));
        assert_eq!(
            get(&f, "stack"),
            &Value::Range(vec![HexAddress::new(0x7f3a4d5e6000), HexAddress::new(0x7f3a4d6e7000)])
        );
    }

    #[test]
    fn test_native_current_thread() {
        let f = current_thread(EventKind::CurrentThread, "Current thread is native thread").unwrap();
        assert_eq!(get(&f, "address"), &Value::Absent);
    }

    #[test]
    fn test_stack_line() {
        let f = stack(
            EventKind::Stack,
            "Stack: [0x00007f3a4d5e6000,0x00007f3a4d6e7000],  sp=0x00007f3a4d6e4a28,  free space=1018k",
        )
        .unwrap();
        assert_eq!(get(&f, "sp"), &Value::Address(HexAddress::new(0x7f3a4d6e4a28)));
        assert_eq!(get(&f, "free_space"), &Value::Size(ByteSize::from_bytes(1018 * 1024)));
    }

    #[test]
    fn test_truncated_stack_line() {
        let f = stack(EventKind::Stack, "Stack: [0x00007f3a4d5e6000").unwrap();
        assert_eq!(get(&f, "bounds"), &Value::Absent);
        assert_eq!(get(&f, "sp"), &Value::Absent);
    }

    #[test]
    fn test_thread_rows() {
        let f = thread_list(
            EventKind::JavaThreads,
            r#"=>0x00007f3a44012345 JavaThread "main" [_thread_in_native, id=12346, stack(0x00007f3a4d5e6000,0x00007f3a4d6e7000)]"#,
        )
        .unwrap();
        assert_eq!(get(&f, "current"), &Value::Flag(true));
        assert_eq!(get(&f, "daemon"), &Value::Flag(false));

        let f = thread_list(
            EventKind::JavaThreads,
            r#"  0x00007f3a440d4000 JavaThread "Reference Handler" daemon [_thread_blocked, id=12353, stack(0x00007f3a2c1f0000,0x00007f3a2c2f1000)]"#,
        )
        .unwrap();
        assert_eq!(get(&f, "current"), &Value::Flag(false));
        assert_eq!(get(&f, "daemon"), &Value::Flag(true));
        assert_eq!(get(&f, "name"), &Value::text("Reference Handler"));

        let f = thread_list(
            EventKind::OtherThreads,
            r#"  0x00007f3a440c6000 VMThread "VM Thread" [stack: 0x00007f3a2c3f2000,0x00007f3a2c4f2000] [id=12352]"#,
        )
        .unwrap();
        assert_eq!(get(&f, "thread_type"), &Value::text("VMThread"));
        assert_eq!(get(&f, "state"), &Value::Absent);
        assert_eq!(get(&f, "id"), &Value::Count(12352));
        assert!(matches!(get(&f, "stack"), Value::Range(r) if r.len() == 2));

        let f = thread_list(EventKind::JavaThreads, "Total: 13").unwrap();
        assert_eq!(get(&f, "total"), &Value::Count(13));
    }

    #[test]
    fn test_smr_rows() {
        let f = smr_info(
            EventKind::ThreadsSmrInfo,
            "_java_thread_list=0x00007f3a44123450, length=11, elements={",
        )
        .unwrap();
        assert_eq!(get(&f, "java_thread_list"), &Value::Address(HexAddress::new(0x7f3a44123450)));
        assert_eq!(get(&f, "length"), &Value::Count(11));
        assert!(f.iter().all(|field| field.name != "elements"));

        let f = smr_info(EventKind::ThreadsSmrInfo, "0x00007f3a44012345, 0x00007f3a440d4000,").unwrap();
        assert!(matches!(get(&f, "threads"), Value::Range(r) if r.len() == 2));
        assert!(smr_info(EventKind::ThreadsSmrInfo, "}").unwrap().is_empty());
    }

    #[test]
    fn test_compile_tasks() {
        let f = compile_task(
            EventKind::CurrentCompileTask,
            "C2:   1234  567   !   4       java.util.HashMap::get (23 bytes)",
        )
        .unwrap();
        assert_eq!(get(&f, "compiler"), &Value::text("C2"));
        assert_eq!(get(&f, "timestamp_ms"), &Value::Count(1234));
        assert_eq!(get(&f, "compile_id"), &Value::Count(567));
        assert_eq!(get(&f, "method"), &Value::text("java.util.HashMap::get"));
        assert_eq!(get(&f, "bytes"), &Value::Count(23));

        let f = compile_task_threads(
            EventKind::ThreadsWithCompileTasks,
            "C2 CompilerThread0    30528 6891       4       org.example.Parser::parse (1234 bytes)",
        )
        .unwrap();
        assert_eq!(get(&f, "thread"), &Value::text("C2 CompilerThread0"));
        assert_eq!(get(&f, "compile_id"), &Value::Count(6891));
    }

    #[test]
    fn test_vm_state_and_mutex() {
        let f = vm_state(EventKind::VmState, "VM state: not at safepoint (normal execution)").unwrap();
        assert_eq!(get(&f, "state"), &Value::text("not at safepoint"));
        assert_eq!(get(&f, "at_safepoint"), &Value::Flag(false));
        let f = vm_state(EventKind::VmState, "VM state:at safepoint (shutting down)").unwrap();
        assert_eq!(get(&f, "at_safepoint"), &Value::Flag(true));

        let f = vm_mutex(EventKind::VmMutex, "VM Mutex/Monitor currently owned by a thread: None").unwrap();
        assert_eq!(get(&f, "held"), &Value::Flag(false));
        let f = vm_mutex(
            EventKind::VmMutex,
            "[0x00007f3a44012bd0] Threads_lock - owner thread: 0x00007f3a440c6000",
        )
        .unwrap();
        assert_eq!(get(&f, "lock"), &Value::text("Threads_lock"));
        assert_eq!(get(&f, "owner"), &Value::Address(HexAddress::new(0x7f3a440c6000)));
    }
}
