use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OsFamily {
    Linux,
    Windows,
    MacOs,
    Solaris,
    Aix,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OsVendor {
    RedHat,
    CentOs,
    Oracle,
    Rocky,
    Alma,
    Fedora,
    Amazon,
    Ubuntu,
    Debian,
    Suse,
    Alpine,
    Microsoft,
    Apple,
    Ibm,
}

/// Operating system identity distilled from prose release strings and
/// `KEY=VALUE` release-file rows.
///
/// Fields the matcher cannot establish stay `None` (or `OsFamily::Unknown`);
/// nothing is guessed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsFingerprint {
    pub family: OsFamily,
    pub vendor: Option<OsVendor>,
    pub version: Option<String>,
}

struct ProseRule {
    pattern: Lazy<Regex>,
    family: OsFamily,
    vendor: Option<OsVendor>,
}

macro_rules! prose {
    ($re:expr, $family:expr, $vendor:expr) => {
        ProseRule {
            pattern: Lazy::new(|| Regex::new($re).unwrap()),
            family: $family,
            vendor: $vendor,
        }
    };
}

// Most specific first; the first capture group, when present, is the version.
static PROSE_RULES: [ProseRule; 16] = [
    prose!(r"Red Hat Enterprise Linux(?: Server| Workstation| CoreOS)? release (\d+(?:\.\d+)*)", OsFamily::Linux, Some(OsVendor::RedHat)),
    prose!(r"CentOS(?: Linux)?(?: Stream)? release (\d+(?:\.\d+)*)", OsFamily::Linux, Some(OsVendor::CentOs)),
    prose!(r"Oracle Linux Server release (\d+(?:\.\d+)*)", OsFamily::Linux, Some(OsVendor::Oracle)),
    prose!(r"Rocky Linux release (\d+(?:\.\d+)*)", OsFamily::Linux, Some(OsVendor::Rocky)),
    prose!(r"AlmaLinux release (\d+(?:\.\d+)*)", OsFamily::Linux, Some(OsVendor::Alma)),
    prose!(r"Fedora(?: Linux)? release (\d+)", OsFamily::Linux, Some(OsVendor::Fedora)),
    prose!(r"Amazon Linux(?: release)?(?: AMI)? (\d+(?:\.\d+)*)", OsFamily::Linux, Some(OsVendor::Amazon)),
    prose!(r"Ubuntu (\d+\.\d+(?:\.\d+)?)", OsFamily::Linux, Some(OsVendor::Ubuntu)),
    prose!(r"Debian GNU/Linux (\d+(?:\.\d+)*)", OsFamily::Linux, Some(OsVendor::Debian)),
    prose!(r"SUSE Linux Enterprise Server (\d+(?: SP\d+)?)", OsFamily::Linux, Some(OsVendor::Suse)),
    prose!(r"Alpine Linux v?(\d+\.\d+(?:\.\d+)?)", OsFamily::Linux, Some(OsVendor::Alpine)),
    prose!(r"Windows (Server \d+(?: R2)?|\d+(?:\.\d+)?)", OsFamily::Windows, Some(OsVendor::Microsoft)),
    prose!(r"(?:macOS|Mac OS X) (\d+(?:\.\d+)*)", OsFamily::MacOs, Some(OsVendor::Apple)),
    prose!(r"\bAIX (\d+\.\d+)", OsFamily::Aix, Some(OsVendor::Ibm)),
    prose!(r"\b(?:SunOS|Solaris) (\d+(?:\.\d+)?)", OsFamily::Solaris, None),
    prose!(r"\bDarwin\b()", OsFamily::MacOs, Some(OsVendor::Apple)),
];

static BARE_LINUX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bLinux\b").unwrap());

impl OsFingerprint {
    pub fn unknown() -> Self {
        Self {
            family: OsFamily::Unknown,
            vendor: None,
            version: None,
        }
    }

    /// Recognizes a prose distribution string such as
    /// `Red Hat Enterprise Linux release 8.3 (Ootpa)` or
    /// `Windows 10 , 64 bit Build 19041 (10.0.19041.1023)`.
    pub fn from_prose(text: &str) -> Option<Self> {
        for rule in PROSE_RULES.iter() {
            if let Some(caps) = rule.pattern.captures(text) {
                let version = caps
                    .get(1)
                    .map(|m| m.as_str().to_string())
                    .filter(|v| !v.is_empty());
                return Some(Self {
                    family: rule.family,
                    vendor: rule.vendor,
                    version,
                });
            }
        }
        if BARE_LINUX.is_match(text) {
            return Some(Self {
                family: OsFamily::Linux,
                vendor: None,
                version: None,
            });
        }
        None
    }

    /// Recognizes one `/etc/os-release` or `/etc/lsb-release` row.
    pub fn from_release_row(key: &str, value: &str) -> Option<Self> {
        let value = value.trim().trim_matches('"').trim_matches('\'');
        match key.trim() {
            "ID" | "DISTRIB_ID" => vendor_from_id(value).map(|vendor| Self {
                family: OsFamily::Linux,
                vendor: Some(vendor),
                version: None,
            }),
            "VERSION_ID" | "DISTRIB_RELEASE" if !value.is_empty() => Some(Self {
                family: OsFamily::Linux,
                vendor: None,
                version: Some(value.to_string()),
            }),
            "PRETTY_NAME" | "DISTRIB_DESCRIPTION" | "NAME" => Self::from_prose(value),
            _ => None,
        }
    }

    /// Fills fields still unknown in `self` from `other`. Known values are
    /// never overwritten.
    pub fn merge(&mut self, other: &OsFingerprint) {
        if self.family == OsFamily::Unknown {
            self.family = other.family;
        }
        if self.vendor.is_none() {
            self.vendor = other.vendor;
        }
        if self.version.is_none() {
            self.version = other.version.clone();
        }
    }
}

fn vendor_from_id(id: &str) -> Option<OsVendor> {
    match id.to_ascii_lowercase().as_str() {
        "rhel" | "redhatenterpriseserver" | "redhatenterprise" => Some(OsVendor::RedHat),
        "centos" => Some(OsVendor::CentOs),
        "ol" | "oracleserver" => Some(OsVendor::Oracle),
        "rocky" => Some(OsVendor::Rocky),
        "almalinux" => Some(OsVendor::Alma),
        "fedora" => Some(OsVendor::Fedora),
        "amzn" => Some(OsVendor::Amazon),
        "ubuntu" => Some(OsVendor::Ubuntu),
        "debian" => Some(OsVendor::Debian),
        "sles" | "opensuse-leap" | "suse" => Some(OsVendor::Suse),
        "alpine" => Some(OsVendor::Alpine),
        _ => None,
    }
}

/// CPU architecture of the crashed process.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Arch {
    X86_64,
    X86,
    Aarch64,
    Ppc64,
    Ppc64le,
    S390x,
    Sparcv9,
    Other(String),
}

impl Arch {
    /// Accepts a bare token (`x86_64`, `amd64`) or a HotSpot platform string
    /// (`linux-amd64`, `windows-aarch64`).
    pub fn from_token(token: &str) -> Option<Arch> {
        let token = token.trim().trim_end_matches(',');
        let arch = token.rsplit('-').next().unwrap_or(token);
        match arch.to_ascii_lowercase().as_str() {
            "amd64" | "x86_64" | "x64" => Some(Arch::X86_64),
            "x86" | "i386" | "i486" | "i586" | "i686" => Some(Arch::X86),
            "aarch64" | "arm64" => Some(Arch::Aarch64),
            "ppc64" => Some(Arch::Ppc64),
            "ppc64le" => Some(Arch::Ppc64le),
            "s390x" => Some(Arch::S390x),
            "sparcv9" => Some(Arch::Sparcv9),
            "arm" | "riscv64" | "ppc" | "zero" => Some(Arch::Other(arch.to_string())),
            _ => None,
        }
    }
}
