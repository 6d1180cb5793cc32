//! Field extraction, one builder per [`EventKind`], grouped by grammar
//! family.
//!
//! Builders share their grammars with the classifier: any line
//! [`classify`](crate::classify::classify) assigns to a kind is readable by
//! that kind's builder. A rejection is therefore a [`GrammarDefect`], which
//! [`build`] reports and degrades to an [`EventKind::Unknown`] event.

mod banner;
mod events;
pub(crate) mod fields;
mod frames;
mod heap;
mod registers;
mod signal;
mod summary;
mod system;
mod threads;
mod vm;

pub use signal::parse_signal;
pub use summary::split_command_line;

use crate::classify::{SENTINEL, is_header};
use crate::error::GrammarDefect;
use crate::ir::{Event, Role, Value};
use crate::kind::EventKind;
use fields::{Built, Fields};

type Builder = fn(EventKind, &str) -> Built;

/// Builds the event for `line` as `kind`, reporting a defect when the line
/// does not fit the kind's grammar.
///
/// The returned event is placed at index 0; the document assembler moves it
/// with [`Event::with_index`].
pub fn try_build(kind: EventKind, line: &str) -> Result<Event, GrammarDefect> {
    let role = role_for(kind, line);

    if let Some(caps) = SENTINEL.captures(line) {
        let fields = Fields::new()
            .with("step", Value::text(&caps["step"]))
            .with("id", Value::text(&caps["id"]))
            .with("detail", fields::text(caps.name("detail").map(|m| m.as_str())));
        return Ok(Event {
            index: 0,
            kind,
            role,
            text: line.to_string(),
            fields: fields.done()?,
            truncated: true,
        });
    }

    let fields = builder_for(kind)(kind, line)?;
    Ok(Event {
        index: 0,
        kind,
        role,
        text: line.to_string(),
        fields,
        truncated: false,
    })
}

/// Builds the event for `line` as `kind`.
///
/// Never fails: a grammar defect is logged, trips a debug assertion, and
/// yields an `Unknown` event carrying the raw text.
pub fn build(kind: EventKind, line: &str) -> Event {
    match try_build(kind, line) {
        Ok(event) => event,
        Err(defect) => {
            log::error!("grammar defect: {defect}");
            debug_assert!(false, "grammar defect: {defect}");
            unknown(line)
        }
    }
}

fn unknown(line: &str) -> Event {
    Event {
        index: 0,
        kind: EventKind::Unknown,
        role: Role::Unknown,
        text: line.to_string(),
        fields: Vec::new(),
        truncated: false,
    }
}

/// Role of `line` within `kind`, from the text alone.
pub fn role_for(kind: EventKind, line: &str) -> Role {
    match kind {
        EventKind::Unknown => Role::Unknown,
        EventKind::Blank | EventKind::HeaderComment | EventKind::NativeTrim => Role::Throwaway,
        _ if !kind.is_section() => Role::Standalone,
        _ if is_header(kind, line) => Role::Header,
        _ if line.trim().is_empty() => Role::Throwaway,
        _ if is_footer(line) => Role::Footer,
        _ => Role::Body,
    }
}

fn is_footer(line: &str) -> bool {
    let t = line.trim();
    t == "}" || t == "No events" || (t.starts_with("[/") && t.ends_with(']'))
}

fn builder_for(kind: EventKind) -> Builder {
    match kind {
        EventKind::HeaderComment | EventKind::FatalErrorBanner | EventKind::InsufficientMemory => {
            banner::plain
        }
        EventKind::CrashSignal => banner::crash_signal,
        EventKind::InternalError => banner::internal_error,
        EventKind::FailedCondition => banner::failed_condition,
        EventKind::NativeAllocationFailure => banner::native_allocation,
        EventKind::JreVersion => banner::jre_version,
        EventKind::JavaVm => banner::java_vm,
        EventKind::CoreDump => banner::core_dump,

        EventKind::SectionBanner => summary::section_banner,
        EventKind::End => summary::nothing,
        EventKind::CommandLine => summary::command_line,
        EventKind::Host => summary::host,
        EventKind::Time => summary::time,
        EventKind::ElapsedTime => summary::elapsed_time,
        EventKind::Timezone => summary::timezone,

        EventKind::ProblematicFrame | EventKind::NativeFrames | EventKind::JavaFrames => {
            frames::frame_section
        }
        EventKind::ThreadBeingProcessed => frames::thread_being_processed,

        EventKind::CurrentThread => threads::current_thread,
        EventKind::Stack => threads::stack,
        EventKind::CurrentCompileTask => threads::compile_task,
        EventKind::ThreadsSmrInfo => threads::smr_info,
        EventKind::JavaThreads | EventKind::OtherThreads => threads::thread_list,
        EventKind::ThreadsWithCompileTasks => threads::compile_task_threads,
        EventKind::VmState => threads::vm_state,
        EventKind::VmMutex => threads::vm_mutex,

        EventKind::Siginfo => signal::siginfo,
        EventKind::SignalHandlers => signal::signal_handlers,

        EventKind::Register => registers::registers,
        EventKind::RegisterToMemoryMapping => registers::register_mapping,
        EventKind::TopOfStack | EventKind::Instructions => registers::hex_dump,
        EventKind::StackSlotToMemoryMapping => registers::stack_slot_mapping,

        EventKind::HeapAddress => heap::heap_address,
        EventKind::NarrowKlass => heap::narrow_klass,
        EventKind::CompressedClassSpace => heap::compressed_class_space,
        EventKind::CdsArchive => heap::cds_archive,
        EventKind::GcPreciousLog => heap::precious_log,
        EventKind::Heap => heap::heap,
        EventKind::HeapRegions => heap::heap_regions,
        EventKind::CardTable => heap::card_table,
        EventKind::MarkingBits => heap::marking_bits,
        EventKind::PollingPage => heap::polling_page,
        EventKind::Metaspace => heap::metaspace,
        EventKind::CodeCache => heap::code_cache,

        EventKind::CompilationEvent
        | EventKind::GcHeapHistoryEvent
        | EventKind::DeoptimizationEvent
        | EventKind::ClassUnloadEvent
        | EventKind::ClassRedefineEvent
        | EventKind::ClassLoadEvent
        | EventKind::InternalExceptionEvent
        | EventKind::VmEvent
        | EventKind::DllOperationEvent
        | EventKind::ZgcPhaseSwitchEvent
        | EventKind::MemoryProtectionEvent
        | EventKind::NmethodFlushEvent => events::event_log,

        EventKind::DynamicLibrary => vm::dynamic_library,
        EventKind::VmArguments => summary::nothing,
        EventKind::JvmArgs => vm::jvm_args,
        EventKind::JavaCommand => vm::java_command,
        EventKind::ClassPath => vm::class_path,
        EventKind::LauncherType => vm::launcher_type,
        EventKind::GlobalFlags => vm::global_flags,
        EventKind::Logging => vm::logging,
        EventKind::EnvironmentVariables => vm::environment,
        EventKind::NativeTrim => vm::native_trim,
        EventKind::VmInfo => vm::vm_info,

        EventKind::Os => system::os,
        EventKind::Uname => system::uname,
        EventKind::OsUptime => system::os_uptime,
        EventKind::Libc => system::libc,
        EventKind::Rlimit => system::rlimit,
        EventKind::LoadAverage => system::load_average,
        EventKind::MemInfo => system::meminfo,
        EventKind::TransparentHugePage => system::transparent_huge_page,
        EventKind::ProcessMemory => system::process_memory,
        EventKind::Container => system::container,
        EventKind::ThreadsMax | EventKind::MaxMapCount | EventKind::PidMax => {
            system::proc_sys_limit
        }
        EventKind::StealTicks => system::steal_ticks,
        EventKind::Cpu => system::cpu,
        EventKind::CpuModel => system::cpu_model,
        EventKind::CpuTopology => system::cpu_topology,
        EventKind::ProcessorInformation => system::processor_information,
        EventKind::Memory => system::memory,
        EventKind::PageFile => system::page_file,
        EventKind::ProcessMemoryUsage => system::process_memory_usage,

        EventKind::ReportAborted => report_aborted,
        EventKind::Blank | EventKind::Unknown => summary::nothing,
    }
}

// Only reachable for lines that are not a sentinel; those were handled
// before dispatch.
fn report_aborted(kind: EventKind, line: &str) -> Built {
    Err(GrammarDefect::rejected(kind, line))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles_from_text() {
        assert_eq!(role_for(EventKind::Heap, "Heap:"), Role::Header);
        assert_eq!(role_for(EventKind::Heap, " PSYoungGen total 1K"), Role::Body);
        assert_eq!(role_for(EventKind::Register, ""), Role::Throwaway);
        assert_eq!(role_for(EventKind::GlobalFlags, "[/Global flags]"), Role::Footer);
        assert_eq!(role_for(EventKind::VmEvent, "No events"), Role::Footer);
        assert_eq!(role_for(EventKind::Host, "Host: x"), Role::Standalone);
        assert_eq!(role_for(EventKind::HeaderComment, "#"), Role::Throwaway);
    }

    #[test]
    fn test_sentinel_is_truncated_under_any_kind() {
        let line = "[error occurred during error reporting (printing memory info), id 0xb]";
        let event = try_build(EventKind::MemInfo, line).unwrap();
        assert!(event.truncated);
        assert_eq!(event.role, Role::Body);
        assert_eq!(event.field("step"), Some(&Value::text("printing memory info")));
        assert_eq!(event.field("id"), Some(&Value::text("0xb")));
        assert_eq!(event.field("detail"), Some(&Value::Absent));

        let aborted = try_build(EventKind::ReportAborted, line).unwrap();
        assert_eq!(aborted.role, Role::Standalone);
        assert!(aborted.truncated);
    }

    #[test]
    fn test_report_aborted_rejects_other_lines() {
        assert!(try_build(EventKind::ReportAborted, "Heap:").is_err());
    }
}
