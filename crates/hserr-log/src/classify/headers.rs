use once_cell::sync::Lazy;
use regex::{Regex, RegexSet};

use crate::kind::EventKind;

/// One row of the header/standalone table.
#[derive(Debug, Clone, Copy)]
pub struct HeaderRule {
    pub kind: EventKind,
    pub pattern: &'static str,
}

const fn rule(kind: EventKind, pattern: &'static str) -> HeaderRule {
    HeaderRule { kind, pattern }
}

/// Header and standalone lines, most specific first.
///
/// The first matching row decides the kind. Several rows are deliberately
/// prefixes of one another (every banner line also matches
/// [`EventKind::HeaderComment`], `CPU Model and flags` also starts with
/// `CPU`), so reordering this table changes classification.
///
/// Each section kind has exactly one row; its pattern doubles as the test
/// for [`Role::Header`](crate::ir::Role::Header).
pub static HEADER_TABLE: &[HeaderRule] = &[
    // `#` banner
    rule(EventKind::CrashSignal, r"^#\s+[A-Z][A-Z0-9_]*\s+\(0x[0-9a-fA-F]+\)\s+at pc="),
    rule(EventKind::InternalError, r"^#\s+(?:Internal Error|Out of Memory Error) \("),
    rule(
        EventKind::FailedCondition,
        r"^#\s+(?:(?:assert|guarantee|precond|postcond)\(.*\) failed|fatal error:|Error:)",
    ),
    rule(
        EventKind::InsufficientMemory,
        r"^#\s*There is insufficient memory for the Java Runtime Environment to continue",
    ),
    rule(EventKind::NativeAllocationFailure, r"^#\s+Native memory allocation \(\w+\) failed to "),
    rule(EventKind::JreVersion, r"^#\s+JRE version:"),
    rule(EventKind::JavaVm, r"^#\s+Java VM:"),
    rule(EventKind::ProblematicFrame, r"^#\s+Problematic frame:\s*$"),
    rule(
        EventKind::CoreDump,
        r"^#\s+(?:No core dump will be written|Failed to write core dump|Core dump (?:will be )?written)",
    ),
    rule(
        EventKind::FatalErrorBanner,
        r"^#\s+A fatal error has been detected by the Java Runtime Environment",
    ),
    rule(EventKind::HeaderComment, r"^#"),
    // layout
    rule(EventKind::SectionBanner, r"^-{3,}\s+(?:[A-Z]\s?)+\s*-{3,}\s*$"),
    rule(EventKind::End, r"^END\.\s*$"),
    // summary
    rule(EventKind::CommandLine, r"^Command Line:"),
    rule(EventKind::Host, r"^Host:"),
    rule(EventKind::Time, r"^[Tt]ime:"),
    rule(EventKind::ElapsedTime, r"^elapsed time:"),
    rule(EventKind::Timezone, r"^timezone:"),
    // thread
    rule(EventKind::CurrentThread, r"^Current thread(?: \(0x[0-9a-fA-F]+\):| is native thread)"),
    rule(EventKind::Stack, r"^Stack: \[0x"),
    rule(EventKind::NativeFrames, r"^Native frames:"),
    rule(EventKind::JavaFrames, r"^Java frames:"),
    rule(EventKind::ThreadBeingProcessed, r"^Thread being processed\b"),
    rule(EventKind::Siginfo, r"^siginfo:"),
    rule(EventKind::RegisterToMemoryMapping, r"^Register to memory mapping:\s*$"),
    rule(EventKind::Register, r"^Registers:\s*$"),
    rule(EventKind::TopOfStack, r"^Top of Stack: \(sp=0x[0-9a-fA-F]+\)\s*$"),
    rule(EventKind::Instructions, r"^Instructions: \(pc=0x[0-9a-fA-F]+\)\s*$"),
    rule(EventKind::StackSlotToMemoryMapping, r"^Stack slot to memory mapping:\s*$"),
    rule(EventKind::CurrentCompileTask, r"^Current CompileTask:\s*$"),
    // process
    rule(EventKind::ThreadsSmrInfo, r"^Threads class SMR info:\s*$"),
    rule(EventKind::JavaThreads, r"^Java Threads: \(\s*=> current thread\s*\)"),
    rule(EventKind::OtherThreads, r"^Other Threads:\s*$"),
    rule(EventKind::ThreadsWithCompileTasks, r"^Threads with active compile tasks:\s*$"),
    rule(EventKind::VmState, r"^VM state:"),
    rule(EventKind::VmMutex, r"^VM Mutex/Monitor currently owned by a thread:"),
    rule(EventKind::HeapAddress, r"^[Hh]eap address: 0x"),
    rule(EventKind::NarrowKlass, r"^Narrow klass base: 0x"),
    rule(EventKind::CompressedClassSpace, r"^Compressed class space (?:mapped at|size):"),
    rule(EventKind::CdsArchive, r"^CDS archive\(s\) (?:mapped at:|not mapped)"),
    rule(EventKind::GcPreciousLog, r"^GC Precious Log:\s*$"),
    rule(EventKind::HeapRegions, r"^Heap Regions:"),
    rule(EventKind::Heap, r"^Heap:?\s*$"),
    rule(EventKind::CardTable, r"^Card table byte_map: \["),
    rule(EventKind::MarkingBits, r"^Marking Bits(?: \(Prev, Next\))?:"),
    rule(EventKind::PollingPage, r"^Polling page: 0x"),
    rule(EventKind::Metaspace, r"^Metaspace:\s*$"),
    rule(EventKind::CodeCache, r"^(?:CodeCache|CodeHeap '[^']*'): size="),
    rule(EventKind::CompilationEvent, r"^Compilation events \(\d+ events\):\s*$"),
    rule(EventKind::GcHeapHistoryEvent, r"^GC Heap History \(\d+ events\):\s*$"),
    rule(EventKind::DeoptimizationEvent, r"^Deoptimization events \(\d+ events\):\s*$"),
    rule(EventKind::ClassUnloadEvent, r"^Classes unloaded \(\d+ events\):\s*$"),
    rule(EventKind::ClassRedefineEvent, r"^Classes redefined \(\d+ events\):\s*$"),
    rule(EventKind::ClassLoadEvent, r"^Classes loaded \(\d+ events\):\s*$"),
    rule(EventKind::InternalExceptionEvent, r"^Internal exceptions \(\d+ events\):\s*$"),
    rule(EventKind::VmEvent, r"^(?:Events|VM Operations) \(\d+ events\):\s*$"),
    rule(EventKind::DllOperationEvent, r"^Dll operation events \(\d+ events\):\s*$"),
    rule(EventKind::ZgcPhaseSwitchEvent, r"^ZGC Phase Switch \(\d+ events\):\s*$"),
    rule(EventKind::MemoryProtectionEvent, r"^Memory protections \(\d+ events\):\s*$"),
    rule(EventKind::NmethodFlushEvent, r"^Nmethod flushes \(\d+ events\):\s*$"),
    rule(EventKind::DynamicLibrary, r"^Dynamic libraries:\s*$"),
    rule(EventKind::VmArguments, r"^VM Arguments:\s*$"),
    rule(EventKind::JvmArgs, r"^jvm_args:"),
    rule(EventKind::JavaCommand, r"^java_command:"),
    rule(EventKind::ClassPath, r"^java_class_path \(initial\):"),
    rule(EventKind::LauncherType, r"^Launcher Type:"),
    rule(EventKind::GlobalFlags, r"^\[Global flags\]\s*$"),
    rule(EventKind::Logging, r"^Logging:\s*$"),
    rule(EventKind::EnvironmentVariables, r"^Environment Variables:\s*$"),
    rule(EventKind::SignalHandlers, r"^Signal Handlers:\s*$"),
    rule(EventKind::NativeTrim, r"^Periodic native trim\b"),
    // system
    rule(EventKind::OsUptime, r"^OS uptime:"),
    rule(EventKind::Os, r"^OS:"),
    rule(EventKind::Uname, r"^uname:"),
    rule(EventKind::Libc, r"^libc:"),
    rule(EventKind::Rlimit, r"^rlimit(?: \(soft/hard\))?:"),
    rule(EventKind::LoadAverage, r"^load average:"),
    rule(EventKind::MemInfo, r"^/proc/meminfo:\s*$"),
    rule(
        EventKind::TransparentHugePage,
        r"^(?:/sys/kernel/mm/transparent_hugepage/enabled:|Transparent hugepage \(THP\) support:)",
    ),
    rule(EventKind::ProcessMemory, r"^Process Memory:\s*$"),
    rule(EventKind::Container, r"^container \(cgroup\) information:\s*$"),
    rule(EventKind::ThreadsMax, r"^/proc/sys/kernel/threads-max\b[^:]*:"),
    rule(EventKind::MaxMapCount, r"^/proc/sys/vm/max_map_count\b[^:]*:"),
    rule(EventKind::PidMax, r"^/proc/sys/kernel/pid_max\b[^:]*:"),
    rule(EventKind::StealTicks, r"^Steal ticks (?:since vm start|percentage since vm start):"),
    rule(EventKind::CpuModel, r"^(?:CPU Model and flags from )?/proc/cpuinfo:\s*$"),
    rule(EventKind::Cpu, r"^CPU:"),
    rule(EventKind::CpuTopology, r"^Online cpus:"),
    rule(EventKind::ProcessorInformation, r"^Processor Information for (?:all )?\d+ processors?\s*:"),
    rule(EventKind::Memory, r"^Memory: \d+[kKmMgG] page,"),
    rule(EventKind::PageFile, r"^TotalPageFile size "),
    rule(EventKind::ProcessMemoryUsage, r"^current process (?:WorkingSet|commit charge)"),
    rule(EventKind::VmInfo, r"^vm_info:"),
];

static HEADER_SET: Lazy<RegexSet> =
    Lazy::new(|| RegexSet::new(HEADER_TABLE.iter().map(|r| r.pattern)).unwrap());

static HEADER_REGEXES: Lazy<Vec<Regex>> = Lazy::new(|| {
    HEADER_TABLE
        .iter()
        .map(|r| Regex::new(r.pattern).unwrap())
        .collect()
});

/// First table row matching `line`.
pub(crate) fn first_match(line: &str) -> Option<EventKind> {
    HEADER_SET
        .matches(line)
        .iter()
        .next()
        .map(|i| HEADER_TABLE[i].kind)
}

/// Every table row matching `line`, in table order.
pub(crate) fn all_matches(line: &str) -> Vec<EventKind> {
    HEADER_SET
        .matches(line)
        .iter()
        .map(|i| HEADER_TABLE[i].kind)
        .collect()
}

/// Whether `line` is the header of section `kind`.
pub(crate) fn is_header(kind: EventKind, line: &str) -> bool {
    HEADER_TABLE
        .iter()
        .position(|r| r.kind == kind)
        .is_some_and(|i| HEADER_REGEXES[i].is_match(line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_one_row_per_kind() {
        let mut seen = HashSet::new();
        for rule in HEADER_TABLE {
            assert!(seen.insert(rule.kind), "{} listed twice", rule.kind);
        }
    }

    #[test]
    fn test_every_section_has_a_header_row() {
        for kind in EventKind::ALL {
            if kind.is_section() {
                assert!(
                    HEADER_TABLE.iter().any(|r| r.kind == kind),
                    "section {kind} has no header row"
                );
            }
        }
    }

    #[test]
    fn test_patterns_compile() {
        assert_eq!(HEADER_REGEXES.len(), HEADER_TABLE.len());
        assert_eq!(HEADER_SET.len(), HEADER_TABLE.len());
    }
}
