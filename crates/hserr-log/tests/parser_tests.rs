use hserr_log::normalize::{Arch, ByteSize, HexAddress, MemoryAccess, OsFamily, OsVendor, Signal};
use hserr_log::{Document, EventKind, FrameTag, Role, Value, parse_document};

fn linux() -> Document {
    parse_document(include_str!("fixtures/linux_sigsegv.log").lines())
}

fn windows() -> Document {
    parse_document(include_str!("fixtures/windows_access_violation.log").lines())
}

fn jdk8() -> Document {
    parse_document(include_str!("fixtures/linux_jdk8.log").lines())
}

#[test]
fn test_document_facts() {
    let doc = linux();
    assert_eq!(doc.arch, Some(Arch::X86_64));
    let os = doc.os.as_ref().expect("os");
    assert_eq!(os.family, OsFamily::Linux);
    assert_eq!(os.vendor, Some(OsVendor::Ubuntu));

    let doc = windows();
    assert_eq!(doc.arch, Some(Arch::X86_64));
    let os = doc.os.as_ref().expect("os");
    assert_eq!(os.family, OsFamily::Windows);
    assert_eq!(os.vendor, Some(OsVendor::Microsoft));
}

#[test]
fn test_siginfo_preferred_over_banner() {
    let doc = linux();
    let signal = doc.signal().expect("signal");
    assert_eq!(signal.signal, Signal::Segv);
    assert_eq!(signal.address, Some(HexAddress::new(0)));

    let doc = windows();
    let signal = doc.signal().expect("signal");
    assert_eq!(signal.signal, Signal::Segv);
    assert_eq!(signal.access, Some(MemoryAccess::Read));
    assert_eq!(signal.address, Some(HexAddress::new(0x48)));
}

#[test]
fn test_native_frames() {
    let doc = linux();
    let frames: Vec<_> = doc
        .events_of(EventKind::NativeFrames)
        .filter_map(|e| e.field("frame").and_then(Value::as_frame))
        .collect();
    assert_eq!(frames.len(), 5);

    assert_eq!(frames[0].tag, FrameTag::Native);
    assert_eq!(frames[0].library.as_deref(), Some("libc.so.6"));
    assert_eq!(frames[0].offset, Some(HexAddress::new(0x18b6f5)));
    assert_eq!(frames[1].tag, FrameTag::Vm);
    assert_eq!(frames[2].tag, FrameTag::Interpreted);
    assert_eq!(frames[2].symbol.as_deref(), Some("com.example.TestCrash.crash()V+0"));
    assert_eq!(frames[4].tag, FrameTag::VmGenerated);
}

#[test]
fn test_problematic_frame_in_banner() {
    let doc = linux();
    let frame = doc
        .events_of(EventKind::ProblematicFrame)
        .find_map(|e| e.field("frame").and_then(Value::as_frame))
        .expect("problematic frame");
    assert_eq!(frame.library.as_deref(), Some("libc.so.6"));
    assert_eq!(frame.symbol.as_deref(), Some("__memmove_avx_unaligned_erms+0x2a5"));
}

#[test]
fn test_heap_metrics() {
    let doc = linux();
    let total = doc
        .events_of(EventKind::Heap)
        .find_map(|e| e.field("total").and_then(Value::as_size))
        .expect("heap total");
    assert_eq!(total, ByteSize::from_bytes(131072 * 1024));

    let bounds = doc
        .events_of(EventKind::Heap)
        .find_map(|e| e.field("bounds").and_then(Value::as_range))
        .expect("heap bounds");
    assert_eq!(
        bounds,
        &[HexAddress::new(0x80000000), HexAddress::new(0x100000000)][..]
    );
}

#[test]
fn test_global_flags() {
    let doc = linux();
    let flag = doc
        .events_of(EventKind::GlobalFlags)
        .find(|e| e.field("name") == Some(&Value::text("UseG1GC")))
        .expect("UseG1GC");
    assert_eq!(flag.field("value"), Some(&Value::Flag(true)));
    assert_eq!(
        flag.field("origin"),
        Some(&Value::List(vec!["product".to_string(), "command line".to_string()]))
    );
}

#[test]
fn test_thread_list() {
    let doc = linux();
    let rows: Vec<_> = doc
        .events_of(EventKind::JavaThreads)
        .filter(|e| e.role == Role::Body)
        .collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].field("current"), Some(&Value::Flag(true)));
    assert_eq!(rows[0].field("name"), Some(&Value::text("main")));
    assert_eq!(rows[1].field("daemon"), Some(&Value::Flag(true)));
    assert_eq!(rows[2].field("total"), Some(&Value::Count(2)));
}

#[test]
fn test_truncated_register_dump() {
    let doc = windows();
    let truncated: Vec<_> = doc.events.iter().filter(|e| e.truncated).collect();
    assert_eq!(truncated.len(), 1);
    assert_eq!(truncated[0].kind, EventKind::Register);
    assert_eq!(
        truncated[0].field("step"),
        Some(&Value::text("printing register info"))
    );
}

#[test]
fn test_event_logs() {
    let doc = linux();
    let compilation: Vec<_> = doc
        .events_of(EventKind::CompilationEvent)
        .filter(|e| e.role == Role::Body)
        .collect();
    assert_eq!(compilation.len(), 2);
    assert_eq!(compilation[0].field("timestamp"), Some(&Value::Decimal(0.045)));

    let header = doc
        .events_of(EventKind::DeoptimizationEvent)
        .find(|e| e.role == Role::Header)
        .expect("header");
    assert_eq!(header.field("events"), Some(&Value::Count(0)));
}

#[test]
fn test_every_line_kept_in_order() {
    let log = include_str!("fixtures/linux_sigsegv.log");
    let doc = parse_document(log.lines());
    for (event, line) in doc.events.iter().zip(log.lines()) {
        assert_eq!(event.text, line);
    }
}

#[test]
fn test_jdk8_lowercase_heap_address() {
    let doc = jdk8();
    let heap = doc
        .events_of(EventKind::HeapAddress)
        .next()
        .expect("heap address");
    assert_eq!(
        heap.field("address"),
        Some(&Value::Address(HexAddress::new(0x6c0000000)))
    );
    assert_eq!(heap.field("oop_shift"), Some(&Value::Count(3)));
}

#[test]
fn test_jdk8_proc_sys_limits() {
    let doc = jdk8();
    let limit = |kind| {
        doc.events_of(kind)
            .find(|e| e.role == Role::Body)
            .and_then(|e| e.field("limit").cloned())
    };
    assert_eq!(limit(EventKind::ThreadsMax), Some(Value::Count(63364)));
    assert_eq!(limit(EventKind::MaxMapCount), Some(Value::Count(65530)));
    assert_eq!(limit(EventKind::PidMax), Some(Value::Count(32768)));

    let header = doc
        .events_of(EventKind::PidMax)
        .find(|e| e.role == Role::Header)
        .expect("pid_max header");
    assert_eq!(
        header.field("path"),
        Some(&Value::text("/proc/sys/kernel/pid_max"))
    );
}

#[test]
fn test_jdk8_cpuinfo_spans_blank_lines() {
    let doc = jdk8();
    let rows = doc
        .events_of(EventKind::CpuModel)
        .filter(|e| e.role == Role::Body)
        .count();
    assert_eq!(rows, 6);
    let os = doc.os.as_ref().expect("os");
    assert_eq!(os.vendor, Some(OsVendor::RedHat));
    assert_eq!(doc.arch, Some(Arch::X86_64));
}
