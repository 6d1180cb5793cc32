//! One signal model for POSIX `siginfo` rows and Windows structured
//! exceptions.
//!
//! Windows exception codes are mapped onto the POSIX signal with the nearest
//! meaning (an access violation is a `SIGSEGV`, a misaligned access is a
//! `SIGBUS`, ...). Signal numbers always use the Linux numbering, so a
//! `SIGBUS (0xa)` from macOS and a `SIGBUS (0x7)` from Linux compare equal.

use serde::{Deserialize, Serialize};

use super::address::HexAddress;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Signal {
    Hup,
    Int,
    Quit,
    Ill,
    Trap,
    Abrt,
    Bus,
    Fpe,
    Kill,
    Usr1,
    Segv,
    Usr2,
    Pipe,
    Alrm,
    Term,
    Xcpu,
    Xfsz,
    Sys,
    /// A numbered signal without a well-known name.
    Other(u32),
    /// A Windows exception with no POSIX counterpart.
    Unknown,
}

const NAMED: &[(Signal, &str, u32)] = &[
    (Signal::Hup, "SIGHUP", 1),
    (Signal::Int, "SIGINT", 2),
    (Signal::Quit, "SIGQUIT", 3),
    (Signal::Ill, "SIGILL", 4),
    (Signal::Trap, "SIGTRAP", 5),
    (Signal::Abrt, "SIGABRT", 6),
    (Signal::Bus, "SIGBUS", 7),
    (Signal::Fpe, "SIGFPE", 8),
    (Signal::Kill, "SIGKILL", 9),
    (Signal::Usr1, "SIGUSR1", 10),
    (Signal::Segv, "SIGSEGV", 11),
    (Signal::Usr2, "SIGUSR2", 12),
    (Signal::Pipe, "SIGPIPE", 13),
    (Signal::Alrm, "SIGALRM", 14),
    (Signal::Term, "SIGTERM", 15),
    (Signal::Xcpu, "SIGXCPU", 24),
    (Signal::Xfsz, "SIGXFSZ", 25),
    (Signal::Sys, "SIGSYS", 31),
];

impl Signal {
    pub fn from_name(name: &str) -> Option<Signal> {
        let name = name.trim();
        // SIGIOT is the historical alias of SIGABRT.
        if name == "SIGIOT" {
            return Some(Signal::Abrt);
        }
        NAMED.iter().find(|(_, n, _)| *n == name).map(|(s, _, _)| *s)
    }

    pub fn from_number(number: u32) -> Signal {
        NAMED
            .iter()
            .find(|(_, _, n)| *n == number)
            .map(|(s, _, _)| *s)
            .unwrap_or(Signal::Other(number))
    }

    /// POSIX (Linux) signal number. `None` only for [`Signal::Unknown`].
    pub fn number(self) -> Option<u32> {
        match self {
            Signal::Other(n) => Some(n),
            Signal::Unknown => None,
            named => NAMED.iter().find(|(s, _, _)| *s == named).map(|(_, _, n)| *n),
        }
    }

    pub fn name(self) -> Option<&'static str> {
        NAMED.iter().find(|(s, _, _)| *s == self).map(|(_, n, _)| *n)
    }
}

/// The `si_code` of a signal, or the nearest equivalent for a Windows
/// exception.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignalCode {
    SegvMaperr,
    SegvAccerr,
    SegvBnderr,
    SegvPkuerr,
    BusAdraln,
    BusAdrerr,
    BusObjerr,
    IllIllopc,
    IllIllopn,
    IllIlladr,
    IllIlltrp,
    IllPrvopc,
    IllPrvreg,
    IllCoproc,
    IllBadstk,
    FpeIntdiv,
    FpeIntovf,
    FpeFltdiv,
    FpeFltovf,
    FpeFltund,
    FpeFltres,
    FpeFltinv,
    FpeFltsub,
    SiUser,
    SiKernel,
    SiQueue,
    SiTimer,
    SiTkill,
    /// Windows access violation; POSIX distinguishes map and access errors,
    /// Windows does not.
    AccessViolation,
    StackOverflow,
    Unknown,
}

const CODE_NAMES: &[(SignalCode, &str)] = &[
    (SignalCode::SegvMaperr, "SEGV_MAPERR"),
    (SignalCode::SegvAccerr, "SEGV_ACCERR"),
    (SignalCode::SegvBnderr, "SEGV_BNDERR"),
    (SignalCode::SegvPkuerr, "SEGV_PKUERR"),
    (SignalCode::BusAdraln, "BUS_ADRALN"),
    (SignalCode::BusAdrerr, "BUS_ADRERR"),
    (SignalCode::BusObjerr, "BUS_OBJERR"),
    (SignalCode::IllIllopc, "ILL_ILLOPC"),
    (SignalCode::IllIllopn, "ILL_ILLOPN"),
    (SignalCode::IllIlladr, "ILL_ILLADR"),
    (SignalCode::IllIlltrp, "ILL_ILLTRP"),
    (SignalCode::IllPrvopc, "ILL_PRVOPC"),
    (SignalCode::IllPrvreg, "ILL_PRVREG"),
    (SignalCode::IllCoproc, "ILL_COPROC"),
    (SignalCode::IllBadstk, "ILL_BADSTK"),
    (SignalCode::FpeIntdiv, "FPE_INTDIV"),
    (SignalCode::FpeIntovf, "FPE_INTOVF"),
    (SignalCode::FpeFltdiv, "FPE_FLTDIV"),
    (SignalCode::FpeFltovf, "FPE_FLTOVF"),
    (SignalCode::FpeFltund, "FPE_FLTUND"),
    (SignalCode::FpeFltres, "FPE_FLTRES"),
    (SignalCode::FpeFltinv, "FPE_FLTINV"),
    (SignalCode::FpeFltsub, "FPE_FLTSUB"),
    (SignalCode::SiUser, "SI_USER"),
    (SignalCode::SiKernel, "SI_KERNEL"),
    (SignalCode::SiQueue, "SI_QUEUE"),
    (SignalCode::SiTimer, "SI_TIMER"),
    (SignalCode::SiTkill, "SI_TKILL"),
];

impl SignalCode {
    pub fn from_name(name: &str) -> SignalCode {
        let name = name.trim();
        CODE_NAMES
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(c, _)| *c)
            .unwrap_or(SignalCode::Unknown)
    }

    /// Resolves a numeric `si_code` for `signal` when the name is missing.
    pub fn from_number(signal: Signal, code: i64) -> SignalCode {
        match (signal, code) {
            (_, 0) => SignalCode::SiUser,
            (_, 0x80) => SignalCode::SiKernel,
            (_, -1) => SignalCode::SiQueue,
            (_, -2) => SignalCode::SiTimer,
            (_, -6) => SignalCode::SiTkill,
            (Signal::Segv, 1) => SignalCode::SegvMaperr,
            (Signal::Segv, 2) => SignalCode::SegvAccerr,
            (Signal::Segv, 3) => SignalCode::SegvBnderr,
            (Signal::Segv, 4) => SignalCode::SegvPkuerr,
            (Signal::Bus, 1) => SignalCode::BusAdraln,
            (Signal::Bus, 2) => SignalCode::BusAdrerr,
            (Signal::Bus, 3) => SignalCode::BusObjerr,
            (Signal::Ill, 1) => SignalCode::IllIllopc,
            (Signal::Ill, 2) => SignalCode::IllIllopn,
            (Signal::Ill, 3) => SignalCode::IllIlladr,
            (Signal::Ill, 4) => SignalCode::IllIlltrp,
            (Signal::Ill, 5) => SignalCode::IllPrvopc,
            (Signal::Ill, 6) => SignalCode::IllPrvreg,
            (Signal::Ill, 7) => SignalCode::IllCoproc,
            (Signal::Ill, 8) => SignalCode::IllBadstk,
            (Signal::Fpe, 1) => SignalCode::FpeIntdiv,
            (Signal::Fpe, 2) => SignalCode::FpeIntovf,
            (Signal::Fpe, 3) => SignalCode::FpeFltdiv,
            (Signal::Fpe, 4) => SignalCode::FpeFltovf,
            (Signal::Fpe, 5) => SignalCode::FpeFltund,
            (Signal::Fpe, 6) => SignalCode::FpeFltres,
            (Signal::Fpe, 7) => SignalCode::FpeFltinv,
            (Signal::Fpe, 8) => SignalCode::FpeFltsub,
            _ => SignalCode::Unknown,
        }
    }

    pub fn is_access_violation(self) -> bool {
        matches!(
            self,
            SignalCode::SegvMaperr | SignalCode::SegvAccerr | SignalCode::AccessViolation
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Platform {
    Posix,
    Windows,
}

/// What the faulting instruction was doing, when Windows reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MemoryAccess {
    Read,
    Write,
    Execute,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalDescriptor {
    pub signal: Signal,
    pub code: SignalCode,
    pub address: Option<HexAddress>,
    pub access: Option<MemoryAccess>,
    pub platform: Platform,
    /// The platform's own spelling: `SEGV_MAPERR`, `0xc0000005`, ...
    pub raw_code: Option<String>,
}

struct WindowsException {
    code: u32,
    name: &'static str,
    signal: Signal,
    sig_code: SignalCode,
}

const WINDOWS_EXCEPTIONS: &[WindowsException] = &[
    WindowsException { code: 0xC000_0005, name: "EXCEPTION_ACCESS_VIOLATION", signal: Signal::Segv, sig_code: SignalCode::AccessViolation },
    WindowsException { code: 0xC000_00FD, name: "EXCEPTION_STACK_OVERFLOW", signal: Signal::Segv, sig_code: SignalCode::StackOverflow },
    WindowsException { code: 0xC000_008C, name: "EXCEPTION_ARRAY_BOUNDS_EXCEEDED", signal: Signal::Segv, sig_code: SignalCode::SegvBnderr },
    WindowsException { code: 0xC000_0006, name: "EXCEPTION_IN_PAGE_ERROR", signal: Signal::Bus, sig_code: SignalCode::BusObjerr },
    WindowsException { code: 0x8000_0002, name: "EXCEPTION_DATATYPE_MISALIGNMENT", signal: Signal::Bus, sig_code: SignalCode::BusAdraln },
    WindowsException { code: 0xC000_001D, name: "EXCEPTION_ILLEGAL_INSTRUCTION", signal: Signal::Ill, sig_code: SignalCode::IllIllopc },
    WindowsException { code: 0xC000_0096, name: "EXCEPTION_PRIV_INSTRUCTION", signal: Signal::Ill, sig_code: SignalCode::IllPrvopc },
    WindowsException { code: 0xC000_0094, name: "EXCEPTION_INT_DIVIDE_BY_ZERO", signal: Signal::Fpe, sig_code: SignalCode::FpeIntdiv },
    WindowsException { code: 0xC000_0095, name: "EXCEPTION_INT_OVERFLOW", signal: Signal::Fpe, sig_code: SignalCode::FpeIntovf },
    WindowsException { code: 0xC000_008E, name: "EXCEPTION_FLT_DIVIDE_BY_ZERO", signal: Signal::Fpe, sig_code: SignalCode::FpeFltdiv },
    WindowsException { code: 0xC000_0091, name: "EXCEPTION_FLT_OVERFLOW", signal: Signal::Fpe, sig_code: SignalCode::FpeFltovf },
    WindowsException { code: 0xC000_0093, name: "EXCEPTION_FLT_UNDERFLOW", signal: Signal::Fpe, sig_code: SignalCode::FpeFltund },
    WindowsException { code: 0xC000_008F, name: "EXCEPTION_FLT_INEXACT_RESULT", signal: Signal::Fpe, sig_code: SignalCode::FpeFltres },
    WindowsException { code: 0xC000_0090, name: "EXCEPTION_FLT_INVALID_OPERATION", signal: Signal::Fpe, sig_code: SignalCode::FpeFltinv },
    WindowsException { code: 0xC000_0092, name: "EXCEPTION_FLT_STACK_CHECK", signal: Signal::Fpe, sig_code: SignalCode::Unknown },
    WindowsException { code: 0x8000_0003, name: "EXCEPTION_BREAKPOINT", signal: Signal::Trap, sig_code: SignalCode::Unknown },
    WindowsException { code: 0x8000_0004, name: "EXCEPTION_SINGLE_STEP", signal: Signal::Trap, sig_code: SignalCode::Unknown },
    WindowsException { code: 0xC000_0409, name: "STATUS_STACK_BUFFER_OVERRUN", signal: Signal::Abrt, sig_code: SignalCode::Unknown },
];

impl SignalDescriptor {
    /// Builds a descriptor from the pieces of a POSIX `siginfo` row.
    ///
    /// The signal name wins over the number, since numbers differ between
    /// platforms.
    pub fn posix(
        name: Option<&str>,
        number: Option<u32>,
        code_name: Option<&str>,
        code_number: Option<i64>,
        address: Option<HexAddress>,
    ) -> Self {
        let signal = name
            .and_then(Signal::from_name)
            .or_else(|| number.map(Signal::from_number))
            .unwrap_or(Signal::Unknown);
        let code = match (code_name, code_number) {
            (Some(n), _) if SignalCode::from_name(n) != SignalCode::Unknown => SignalCode::from_name(n),
            (_, Some(c)) => SignalCode::from_number(signal, c),
            _ => SignalCode::Unknown,
        };
        let raw_code = code_name
            .map(str::to_string)
            .or_else(|| code_number.map(|c| c.to_string()));
        Self {
            signal,
            code,
            address,
            access: None,
            platform: Platform::Posix,
            raw_code,
        }
    }

    /// Builds a descriptor from a Windows exception code such as
    /// `0xc0000005`. Unmapped codes yield `Signal::Unknown` and
    /// `SignalCode::Unknown`.
    pub fn windows(code: u32, access: Option<MemoryAccess>, address: Option<HexAddress>) -> Self {
        let (signal, sig_code) = WINDOWS_EXCEPTIONS
            .iter()
            .find(|e| e.code == code)
            .map(|e| (e.signal, e.sig_code))
            .unwrap_or((Signal::Unknown, SignalCode::Unknown));
        Self {
            signal,
            code: sig_code,
            address,
            access,
            platform: Platform::Windows,
            raw_code: Some(format!("{code:#010x}")),
        }
    }

    /// Looks up a Windows exception by its symbolic name.
    pub fn windows_code_for(name: &str) -> Option<u32> {
        WINDOWS_EXCEPTIONS
            .iter()
            .find(|e| e.name == name.trim())
            .map(|e| e.code)
    }

    pub fn number(&self) -> Option<u32> {
        self.signal.number()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_beats_platform_number() {
        // macOS prints SIGBUS as 0xa.
        let d = SignalDescriptor::posix(Some("SIGBUS"), Some(10), None, None, None);
        assert_eq!(d.signal, Signal::Bus);
        assert_eq!(d.number(), Some(7));
    }

    #[test]
    fn test_access_violation_is_segv() {
        let win = SignalDescriptor::windows(0xc000_0005, Some(MemoryAccess::Read), None);
        let posix = SignalDescriptor::posix(Some("SIGSEGV"), Some(11), Some("SEGV_MAPERR"), Some(1), None);
        assert_eq!(win.number(), posix.number());
        assert!(win.code.is_access_violation());
        assert!(posix.code.is_access_violation());
        assert_eq!(win.raw_code.as_deref(), Some("0xc0000005"));
    }

    #[test]
    fn test_stack_overflow_maps_to_segv() {
        let d = SignalDescriptor::windows(0xc000_00fd, None, None);
        assert_eq!(d.signal, Signal::Segv);
        assert_eq!(d.code, SignalCode::StackOverflow);
    }

    #[test]
    fn test_unmapped_windows_code_is_unknown() {
        let d = SignalDescriptor::windows(0xe06d_7363, None, None);
        assert_eq!(d.signal, Signal::Unknown);
        assert_eq!(d.code, SignalCode::Unknown);
        assert_eq!(d.number(), None);
    }

    #[test]
    fn test_numeric_code_fallback() {
        let d = SignalDescriptor::posix(None, Some(11), None, Some(2), None);
        assert_eq!(d.signal, Signal::Segv);
        assert_eq!(d.code, SignalCode::SegvAccerr);
        let user = SignalDescriptor::posix(Some("SIGSEGV"), None, Some("SI_USER"), Some(0), None);
        assert_eq!(user.code, SignalCode::SiUser);
    }

    #[test]
    fn test_unnamed_number_is_other() {
        assert_eq!(Signal::from_number(35), Signal::Other(35));
        assert_eq!(Signal::Other(35).number(), Some(35));
        assert_eq!(Signal::from_name("SIGIOT"), Some(Signal::Abrt));
    }

    #[test]
    fn test_windows_name_lookup() {
        assert_eq!(
            SignalDescriptor::windows_code_for("EXCEPTION_STACK_OVERFLOW"),
            Some(0xc000_00fd)
        );
        assert_eq!(SignalDescriptor::windows_code_for("EXCEPTION_NOPE"), None);
    }
}
