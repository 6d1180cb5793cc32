use once_cell::sync::Lazy;
use regex::Regex;

use super::headers::{first_match, is_header};
use crate::kind::EventKind;
use crate::normalize::OsFingerprint;
use crate::state::OpenSection;

macro_rules! pattern {
    ($name:ident, $re:expr) => {
        static $name: Lazy<Regex> = Lazy::new(|| Regex::new($re).unwrap());
    };
}

pattern!(FRAME_ROW, r"^(?:[JjVvCA](?:\s|$)|\.\.\.<more frames>\.\.\.|Thread being processed\b)");
pattern!(BANNER_FRAME_ROW, r"^#\s+(?:[JjVvCA]\s|\.\.\.<more frames>\.\.\.)");
pattern!(REGISTER_ROW, r"^\s*[A-Za-z][A-Za-z0-9_\[\]]*\s*=\s*0x[0-9a-fA-F]+");
pattern!(NAMED_VALUE_ROW, r"^\s*[A-Za-z][A-Za-z0-9_]*\s*=");
pattern!(HEX_DUMP_ROW, r"^\s*0x[0-9a-fA-F]+:\s");
pattern!(STACK_SLOT_ROW, r"^stack at sp \+ \d+ slots?:");
pattern!(INDENTED, r"^\s+\S");
pattern!(COMPILE_TASK_ROW, r"^(?:[Cc][12]|JVMCI):\s*\d");
pattern!(SMR_ROW, r"^_\w+=");
pattern!(THREAD_ROW, r"^(?:=>)?\s*0x[0-9a-fA-F]+\s+\S|^Total: \d+");
pattern!(COMPILER_THREAD_ROW, r"^\S.*CompilerThread\d*\s|^Total: \d+");
pattern!(MUTEX_ROW, r"^\[0x[0-9a-fA-F]+\]\s");
pattern!(
    HEAP_REGION_ROW,
    r"^\|\s*\d+\||^\s*(?:A[CD]\s+)?\d+\s.*\bspace \d+[KMG], \d+% used \["
);
pattern!(MARKING_BITS_ROW, r"^\s+\w+ Bits:\s*\[");
pattern!(
    METASPACE_ROW,
    r"^(?:\s+\S|Usage:|Virtual space:|Chunk freelists:|MaxMetaspaceSize:|CompressedClassSpaceSize:|Initial GC threshold:|Current GC threshold:|CDS:|MetaspaceReclaimPolicy:|Internal statistics:|num_\w+:|UseCompressedClassPointers)"
);
pattern!(EVENT_ROW, r"^Event: \d|^No events\s*$|^\s+\S");
pattern!(
    MAPPING_ROW,
    r"^[0-9a-fA-F]+-[0-9a-fA-F]+\s+[-rwxsp]{4}\s|^0x[0-9a-fA-F]+\s"
);
pattern!(FLAG_ROW, r"^\s*\w+\s+\w+\s+:?=\s|^\[/Global flags\]\s*$");
pattern!(LOGGING_ROW, r"^Log output configuration:\s*$|^\s+\S");
pattern!(ENV_ROW, r"^[A-Za-z_][A-Za-z0-9_.]*=");
pattern!(HANDLER_ROW, r"^\s*SIG[A-Z0-9]+:\s|^\s*\*\*\*");
pattern!(RELEASE_ROW, r"^[A-Z_][A-Z0-9_]*=");
pattern!(MEMINFO_ROW, r"^[A-Za-z][\w()]*:\s+\d+(?:\s*kB)?\s*$");
pattern!(THP_ROW, r"^/sys/kernel/mm/transparent_hugepage/|^THP \w");
pattern!(
    PROCESS_MEMORY_ROW,
    r"^(?:Virtual Size|Resident Set Size|Swapped out|C-Heap outstanding allocations|glibc malloc tunables|Number of file descriptors):"
);
pattern!(CONTAINER_ROW, r"^[a-z][a-z0-9_]*:");
pattern!(CPUINFO_ROW, r"^[a-z][a-z0-9 _]*\s*:");
pattern!(LIMIT_ROW, r"^\s*\d+\s*$");
pattern!(
    CPU_TOPOLOGY_ROW,
    r"^(?:Offline cpus|BIOS frequency limitation|Frequency switch latency \(ns\)|Available cpu frequencies|Current governor|Core performance/turbo boost):"
);
pattern!(PROCESSOR_ROW, r"^\s+\S|^Processor Information for processor \d+");

/// Whether `line` continues the open section.
///
/// Brace-tracked sections accept anything but a section banner while their
/// depth is positive. Blank lines continue only sections that admit them.
pub(crate) fn continues(open: &OpenSection, line: &str) -> bool {
    let traits = open.kind.traits();
    if traits.brace_balanced && open.depth > 0 {
        return !is_header(EventKind::SectionBanner, line);
    }
    if line.trim().is_empty() {
        return traits.admits_blank;
    }
    body_row(open.kind, line)
}

fn body_row(kind: EventKind, line: &str) -> bool {
    match kind {
        EventKind::ProblematicFrame => BANNER_FRAME_ROW.is_match(line),
        EventKind::NativeFrames | EventKind::JavaFrames => FRAME_ROW.is_match(line),
        EventKind::Register => REGISTER_ROW.is_match(line),
        EventKind::RegisterToMemoryMapping => NAMED_VALUE_ROW.is_match(line),
        EventKind::TopOfStack | EventKind::Instructions => HEX_DUMP_ROW.is_match(line),
        EventKind::StackSlotToMemoryMapping => {
            STACK_SLOT_ROW.is_match(line) || INDENTED.is_match(line)
        }
        EventKind::CurrentCompileTask => COMPILE_TASK_ROW.is_match(line),
        EventKind::ThreadsSmrInfo => SMR_ROW.is_match(line),
        EventKind::JavaThreads | EventKind::OtherThreads => THREAD_ROW.is_match(line),
        EventKind::ThreadsWithCompileTasks => COMPILER_THREAD_ROW.is_match(line),
        EventKind::VmMutex => MUTEX_ROW.is_match(line),
        EventKind::GcPreciousLog | EventKind::Heap | EventKind::CodeCache => {
            INDENTED.is_match(line)
        }
        EventKind::HeapRegions => HEAP_REGION_ROW.is_match(line),
        EventKind::MarkingBits => MARKING_BITS_ROW.is_match(line),
        EventKind::Metaspace => METASPACE_ROW.is_match(line),
        EventKind::GcHeapHistoryEvent => EVENT_ROW.is_match(line) || line.starts_with('{'),
        EventKind::CompilationEvent
        | EventKind::DeoptimizationEvent
        | EventKind::ClassUnloadEvent
        | EventKind::ClassRedefineEvent
        | EventKind::ClassLoadEvent
        | EventKind::InternalExceptionEvent
        | EventKind::VmEvent
        | EventKind::DllOperationEvent
        | EventKind::ZgcPhaseSwitchEvent
        | EventKind::MemoryProtectionEvent
        | EventKind::NmethodFlushEvent => EVENT_ROW.is_match(line),
        EventKind::DynamicLibrary => MAPPING_ROW.is_match(line),
        EventKind::GlobalFlags => FLAG_ROW.is_match(line),
        EventKind::Logging => LOGGING_ROW.is_match(line),
        EventKind::EnvironmentVariables => ENV_ROW.is_match(line),
        EventKind::SignalHandlers => HANDLER_ROW.is_match(line),
        // Release files, or a bare distribution string such as
        // `Red Hat Enterprise Linux release 8.6 (Ootpa)`. Lines with a colon
        // are other facts (`uname: Linux ...`).
        EventKind::Os => {
            RELEASE_ROW.is_match(line)
                || (!line.contains(':') && OsFingerprint::from_prose(line).is_some())
        }
        EventKind::MemInfo => MEMINFO_ROW.is_match(line),
        EventKind::TransparentHugePage => THP_ROW.is_match(line),
        EventKind::ProcessMemory => PROCESS_MEMORY_ROW.is_match(line),
        EventKind::Container => CONTAINER_ROW.is_match(line),
        EventKind::ThreadsMax | EventKind::MaxMapCount | EventKind::PidMax => {
            LIMIT_ROW.is_match(line)
        }
        // `uname:`, `libc:` and friends have the same shape as cpuinfo keys.
        EventKind::CpuModel => CPUINFO_ROW.is_match(line) && first_match(line).is_none(),
        EventKind::CpuTopology => CPU_TOPOLOGY_ROW.is_match(line),
        EventKind::ProcessorInformation => PROCESSOR_ROW.is_match(line),

        EventKind::HeaderComment
        | EventKind::FatalErrorBanner
        | EventKind::CrashSignal
        | EventKind::InternalError
        | EventKind::FailedCondition
        | EventKind::InsufficientMemory
        | EventKind::NativeAllocationFailure
        | EventKind::JreVersion
        | EventKind::JavaVm
        | EventKind::CoreDump
        | EventKind::SectionBanner
        | EventKind::End
        | EventKind::CommandLine
        | EventKind::Host
        | EventKind::Time
        | EventKind::ElapsedTime
        | EventKind::Timezone
        | EventKind::CurrentThread
        | EventKind::Stack
        | EventKind::ThreadBeingProcessed
        | EventKind::Siginfo
        | EventKind::VmState
        | EventKind::HeapAddress
        | EventKind::NarrowKlass
        | EventKind::CompressedClassSpace
        | EventKind::CdsArchive
        | EventKind::CardTable
        | EventKind::PollingPage
        | EventKind::VmArguments
        | EventKind::JvmArgs
        | EventKind::JavaCommand
        | EventKind::ClassPath
        | EventKind::LauncherType
        | EventKind::NativeTrim
        | EventKind::Uname
        | EventKind::OsUptime
        | EventKind::Libc
        | EventKind::Rlimit
        | EventKind::LoadAverage
        | EventKind::StealTicks
        | EventKind::Cpu
        | EventKind::Memory
        | EventKind::PageFile
        | EventKind::ProcessMemoryUsage
        | EventKind::VmInfo
        | EventKind::ReportAborted
        | EventKind::Blank
        | EventKind::Unknown => false,
    }
}
