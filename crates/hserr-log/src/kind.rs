use std::fmt;

use serde::{Deserialize, Serialize};

/// Every category a crash-log line can fall into.
///
/// Section kinds (see [`EventKind::traits`]) cover a header line and the body
/// and footer lines that follow it; the remaining kinds are single-line facts,
/// plus the [`EventKind::Blank`], [`EventKind::ReportAborted`] and
/// [`EventKind::Unknown`] fallbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    // `#` banner at the top of the report
    HeaderComment,
    FatalErrorBanner,
    CrashSignal,
    InternalError,
    FailedCondition,
    InsufficientMemory,
    NativeAllocationFailure,
    JreVersion,
    JavaVm,
    ProblematicFrame,
    CoreDump,

    SectionBanner,
    End,

    // SUMMARY
    CommandLine,
    Host,
    Time,
    ElapsedTime,
    Timezone,

    // THREAD
    CurrentThread,
    Stack,
    NativeFrames,
    JavaFrames,
    ThreadBeingProcessed,
    Siginfo,
    Register,
    RegisterToMemoryMapping,
    TopOfStack,
    Instructions,
    StackSlotToMemoryMapping,
    CurrentCompileTask,

    // PROCESS
    ThreadsSmrInfo,
    JavaThreads,
    OtherThreads,
    ThreadsWithCompileTasks,
    VmState,
    VmMutex,
    HeapAddress,
    NarrowKlass,
    CompressedClassSpace,
    CdsArchive,
    GcPreciousLog,
    Heap,
    HeapRegions,
    CardTable,
    MarkingBits,
    PollingPage,
    Metaspace,
    CodeCache,
    CompilationEvent,
    GcHeapHistoryEvent,
    DeoptimizationEvent,
    ClassUnloadEvent,
    ClassRedefineEvent,
    ClassLoadEvent,
    InternalExceptionEvent,
    VmEvent,
    DllOperationEvent,
    ZgcPhaseSwitchEvent,
    MemoryProtectionEvent,
    NmethodFlushEvent,
    DynamicLibrary,
    VmArguments,
    JvmArgs,
    JavaCommand,
    ClassPath,
    LauncherType,
    GlobalFlags,
    Logging,
    EnvironmentVariables,
    SignalHandlers,
    NativeTrim,

    // SYSTEM
    Os,
    Uname,
    OsUptime,
    Libc,
    Rlimit,
    LoadAverage,
    MemInfo,
    TransparentHugePage,
    ProcessMemory,
    Container,
    ThreadsMax,
    MaxMapCount,
    PidMax,
    StealTicks,
    Cpu,
    CpuModel,
    CpuTopology,
    ProcessorInformation,
    Memory,
    PageFile,
    ProcessMemoryUsage,
    VmInfo,

    ReportAborted,
    Blank,
    Unknown,
}

/// Structural properties of a kind, consulted by the classifier and by
/// [`SectionState`](crate::state::SectionState).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SectionTraits {
    /// The kind opens a multi-line section.
    pub is_section: bool,
    /// Blank lines inside the section continue it instead of closing it.
    pub admits_blank: bool,
    /// Lines nothing else claims are attributed to the open section.
    pub absorbs: bool,
    /// `{` / `}` are tracked as a flat depth; everything at depth > 0 belongs
    /// to the section.
    pub brace_balanced: bool,
    /// Header is `<Name> (N events):` and rows use the timestamped grammar.
    pub event_log: bool,
}

const FACT: SectionTraits = SectionTraits {
    is_section: false,
    admits_blank: false,
    absorbs: false,
    brace_balanced: false,
    event_log: false,
};

const SECTION: SectionTraits = SectionTraits {
    is_section: true,
    ..FACT
};

const FREE_TEXT: SectionTraits = SectionTraits {
    is_section: true,
    admits_blank: true,
    absorbs: true,
    ..FACT
};

const EVENT_LOG: SectionTraits = SectionTraits {
    is_section: true,
    event_log: true,
    ..FACT
};

impl EventKind {
    pub const ALL: [EventKind; 96] = [
        EventKind::HeaderComment,
        EventKind::FatalErrorBanner,
        EventKind::CrashSignal,
        EventKind::InternalError,
        EventKind::FailedCondition,
        EventKind::InsufficientMemory,
        EventKind::NativeAllocationFailure,
        EventKind::JreVersion,
        EventKind::JavaVm,
        EventKind::ProblematicFrame,
        EventKind::CoreDump,
        EventKind::SectionBanner,
        EventKind::End,
        EventKind::CommandLine,
        EventKind::Host,
        EventKind::Time,
        EventKind::ElapsedTime,
        EventKind::Timezone,
        EventKind::CurrentThread,
        EventKind::Stack,
        EventKind::NativeFrames,
        EventKind::JavaFrames,
        EventKind::ThreadBeingProcessed,
        EventKind::Siginfo,
        EventKind::Register,
        EventKind::RegisterToMemoryMapping,
        EventKind::TopOfStack,
        EventKind::Instructions,
        EventKind::StackSlotToMemoryMapping,
        EventKind::CurrentCompileTask,
        EventKind::ThreadsSmrInfo,
        EventKind::JavaThreads,
        EventKind::OtherThreads,
        EventKind::ThreadsWithCompileTasks,
        EventKind::VmState,
        EventKind::VmMutex,
        EventKind::HeapAddress,
        EventKind::NarrowKlass,
        EventKind::CompressedClassSpace,
        EventKind::CdsArchive,
        EventKind::GcPreciousLog,
        EventKind::Heap,
        EventKind::HeapRegions,
        EventKind::CardTable,
        EventKind::MarkingBits,
        EventKind::PollingPage,
        EventKind::Metaspace,
        EventKind::CodeCache,
        EventKind::CompilationEvent,
        EventKind::GcHeapHistoryEvent,
        EventKind::DeoptimizationEvent,
        EventKind::ClassUnloadEvent,
        EventKind::ClassRedefineEvent,
        EventKind::ClassLoadEvent,
        EventKind::InternalExceptionEvent,
        EventKind::VmEvent,
        EventKind::DllOperationEvent,
        EventKind::ZgcPhaseSwitchEvent,
        EventKind::MemoryProtectionEvent,
        EventKind::NmethodFlushEvent,
        EventKind::DynamicLibrary,
        EventKind::VmArguments,
        EventKind::JvmArgs,
        EventKind::JavaCommand,
        EventKind::ClassPath,
        EventKind::LauncherType,
        EventKind::GlobalFlags,
        EventKind::Logging,
        EventKind::EnvironmentVariables,
        EventKind::SignalHandlers,
        EventKind::NativeTrim,
        EventKind::Os,
        EventKind::Uname,
        EventKind::OsUptime,
        EventKind::Libc,
        EventKind::Rlimit,
        EventKind::LoadAverage,
        EventKind::MemInfo,
        EventKind::TransparentHugePage,
        EventKind::ProcessMemory,
        EventKind::Container,
        EventKind::ThreadsMax,
        EventKind::MaxMapCount,
        EventKind::PidMax,
        EventKind::StealTicks,
        EventKind::Cpu,
        EventKind::CpuModel,
        EventKind::CpuTopology,
        EventKind::ProcessorInformation,
        EventKind::Memory,
        EventKind::PageFile,
        EventKind::ProcessMemoryUsage,
        EventKind::VmInfo,
        EventKind::ReportAborted,
        EventKind::Blank,
        EventKind::Unknown,
    ];

    /// Stable kebab-case name; identical to the serde representation.
    pub fn slug(self) -> &'static str {
        match self {
            EventKind::HeaderComment => "header-comment",
            EventKind::FatalErrorBanner => "fatal-error-banner",
            EventKind::CrashSignal => "crash-signal",
            EventKind::InternalError => "internal-error",
            EventKind::FailedCondition => "failed-condition",
            EventKind::InsufficientMemory => "insufficient-memory",
            EventKind::NativeAllocationFailure => "native-allocation-failure",
            EventKind::JreVersion => "jre-version",
            EventKind::JavaVm => "java-vm",
            EventKind::ProblematicFrame => "problematic-frame",
            EventKind::CoreDump => "core-dump",
            EventKind::SectionBanner => "section-banner",
            EventKind::End => "end",
            EventKind::CommandLine => "command-line",
            EventKind::Host => "host",
            EventKind::Time => "time",
            EventKind::ElapsedTime => "elapsed-time",
            EventKind::Timezone => "timezone",
            EventKind::CurrentThread => "current-thread",
            EventKind::Stack => "stack",
            EventKind::NativeFrames => "native-frames",
            EventKind::JavaFrames => "java-frames",
            EventKind::ThreadBeingProcessed => "thread-being-processed",
            EventKind::Siginfo => "siginfo",
            EventKind::Register => "register",
            EventKind::RegisterToMemoryMapping => "register-to-memory-mapping",
            EventKind::TopOfStack => "top-of-stack",
            EventKind::Instructions => "instructions",
            EventKind::StackSlotToMemoryMapping => "stack-slot-to-memory-mapping",
            EventKind::CurrentCompileTask => "current-compile-task",
            EventKind::ThreadsSmrInfo => "threads-smr-info",
            EventKind::JavaThreads => "java-threads",
            EventKind::OtherThreads => "other-threads",
            EventKind::ThreadsWithCompileTasks => "threads-with-compile-tasks",
            EventKind::VmState => "vm-state",
            EventKind::VmMutex => "vm-mutex",
            EventKind::HeapAddress => "heap-address",
            EventKind::NarrowKlass => "narrow-klass",
            EventKind::CompressedClassSpace => "compressed-class-space",
            EventKind::CdsArchive => "cds-archive",
            EventKind::GcPreciousLog => "gc-precious-log",
            EventKind::Heap => "heap",
            EventKind::HeapRegions => "heap-regions",
            EventKind::CardTable => "card-table",
            EventKind::MarkingBits => "marking-bits",
            EventKind::PollingPage => "polling-page",
            EventKind::Metaspace => "metaspace",
            EventKind::CodeCache => "code-cache",
            EventKind::CompilationEvent => "compilation-event",
            EventKind::GcHeapHistoryEvent => "gc-heap-history-event",
            EventKind::DeoptimizationEvent => "deoptimization-event",
            EventKind::ClassUnloadEvent => "class-unload-event",
            EventKind::ClassRedefineEvent => "class-redefine-event",
            EventKind::ClassLoadEvent => "class-load-event",
            EventKind::InternalExceptionEvent => "internal-exception-event",
            EventKind::VmEvent => "vm-event",
            EventKind::DllOperationEvent => "dll-operation-event",
            EventKind::ZgcPhaseSwitchEvent => "zgc-phase-switch-event",
            EventKind::MemoryProtectionEvent => "memory-protection-event",
            EventKind::NmethodFlushEvent => "nmethod-flush-event",
            EventKind::DynamicLibrary => "dynamic-library",
            EventKind::VmArguments => "vm-arguments",
            EventKind::JvmArgs => "jvm-args",
            EventKind::JavaCommand => "java-command",
            EventKind::ClassPath => "class-path",
            EventKind::LauncherType => "launcher-type",
            EventKind::GlobalFlags => "global-flags",
            EventKind::Logging => "logging",
            EventKind::EnvironmentVariables => "environment-variables",
            EventKind::SignalHandlers => "signal-handlers",
            EventKind::NativeTrim => "native-trim",
            EventKind::Os => "os",
            EventKind::Uname => "uname",
            EventKind::OsUptime => "os-uptime",
            EventKind::Libc => "libc",
            EventKind::Rlimit => "rlimit",
            EventKind::LoadAverage => "load-average",
            EventKind::MemInfo => "mem-info",
            EventKind::TransparentHugePage => "transparent-huge-page",
            EventKind::ProcessMemory => "process-memory",
            EventKind::Container => "container",
            EventKind::ThreadsMax => "threads-max",
            EventKind::MaxMapCount => "max-map-count",
            EventKind::PidMax => "pid-max",
            EventKind::StealTicks => "steal-ticks",
            EventKind::Cpu => "cpu",
            EventKind::CpuModel => "cpu-model",
            EventKind::CpuTopology => "cpu-topology",
            EventKind::ProcessorInformation => "processor-information",
            EventKind::Memory => "memory",
            EventKind::PageFile => "page-file",
            EventKind::ProcessMemoryUsage => "process-memory-usage",
            EventKind::VmInfo => "vm-info",
            EventKind::ReportAborted => "report-aborted",
            EventKind::Blank => "blank",
            EventKind::Unknown => "unknown",
        }
    }

    pub fn from_slug(slug: &str) -> Option<EventKind> {
        EventKind::ALL.iter().copied().find(|k| k.slug() == slug)
    }

    pub fn traits(self) -> SectionTraits {
        match self {
            EventKind::ProblematicFrame
            | EventKind::NativeFrames
            | EventKind::JavaFrames
            | EventKind::TopOfStack
            | EventKind::Instructions
            | EventKind::CurrentCompileTask
            | EventKind::JavaThreads
            | EventKind::OtherThreads
            | EventKind::ThreadsWithCompileTasks
            | EventKind::VmMutex
            | EventKind::GcPreciousLog
            | EventKind::Heap
            | EventKind::HeapRegions
            | EventKind::MarkingBits
            | EventKind::CodeCache
            | EventKind::DynamicLibrary
            | EventKind::GlobalFlags
            | EventKind::Logging
            | EventKind::EnvironmentVariables
            | EventKind::SignalHandlers
            | EventKind::Os
            | EventKind::MemInfo
            | EventKind::TransparentHugePage
            | EventKind::ProcessMemory
            | EventKind::Container
            | EventKind::ThreadsMax
            | EventKind::MaxMapCount
            | EventKind::PidMax
            | EventKind::CpuTopology
            | EventKind::ProcessorInformation => SECTION,

            // JDK 8 dumps /proc/cpuinfo whole, one blank-separated block per
            // processor.
            EventKind::Register | EventKind::CpuModel => SectionTraits {
                admits_blank: true,
                ..SECTION
            },

            EventKind::RegisterToMemoryMapping
            | EventKind::StackSlotToMemoryMapping
            | EventKind::Metaspace => FREE_TEXT,

            EventKind::ThreadsSmrInfo => SectionTraits {
                brace_balanced: true,
                ..SECTION
            },

            EventKind::GcHeapHistoryEvent => SectionTraits {
                brace_balanced: true,
                ..EVENT_LOG
            },

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
            | EventKind::NmethodFlushEvent => EVENT_LOG,

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
            | EventKind::Unknown => FACT,
        }
    }

    pub fn is_section(self) -> bool {
        self.traits().is_section
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}
