//! Heap layout, compressed pointers, CDS, code cache and metaspace.

use once_cell::sync::Lazy;
use regex::Regex;

use super::fields::{self, Built, Fields};
use crate::classify::is_header;
use crate::ir::Value;
use crate::kind::EventKind;
use crate::normalize::HexAddress;

static HEAP_ADDRESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[Hh]eap address: (?P<addr>0x[0-9a-fA-F]+)(?:, size: (?P<size>\d+ ?[KMGT]?B?))?(?:, Compressed Oops mode: (?P<mode>[^,]+))?(?:, Oop shift amount: (?P<shift>\d+))?",
    )
    .unwrap()
});

static NARROW_KLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^Narrow klass base: (?P<base>0x[0-9a-fA-F]+)(?:, Narrow klass shift: (?P<shift>\d+))?(?:, Narrow klass range: (?P<range>0x[0-9a-fA-F]+))?",
    )
    .unwrap()
});

static CLASS_SPACE_MAPPED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^Compressed class space mapped at: (?P<lo>0x[0-9a-fA-F]+)-(?P<hi>0x[0-9a-fA-F]+)(?:, reserved size: (?P<reserved>\d+))?",
    )
    .unwrap()
});

static CLASS_SPACE_SIZE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Compressed class space size: (?P<size>\d+)(?: Address: (?P<addr>0x[0-9a-fA-F]+))?")
        .unwrap()
});

static CDS_MAPPED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\[(?P<bounds>[^\])]*)[\])](?:, size (?P<size>\d+))?(?:, SharedBaseAddress: (?P<base>0x[0-9a-fA-F]+))?(?:, ArchiveRelocationMode: (?P<mode>\d+))?",
    )
    .unwrap()
});

static BRACKETED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[(?P<inner>0x[^\])]*)[\])]").unwrap());

static SPACE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?P<space>.*?)\s+(?:total\b|used\b|capacity\b|max capacity\b|\d)").unwrap()
});

static SPACE_METRIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?P<key>total reserved|total|used|max capacity|capacity|committed|reserved)\s+(?P<value>\d+[KMGT]?)\b",
    )
    .unwrap()
});

static SPACE_SIZE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bspace (?P<size>\d+[KMGT]),").unwrap());

static USED_PERCENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?P<pct>\d+)% used").unwrap());

static REGION_SIZE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"region size (?P<size>\d+[KMG])(?:, (?P<young>\d+) young \([^)]*\))?(?:, (?P<survivors>\d+) survivors)?",
    )
    .unwrap()
});

static JDK8_REGION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:A[CD]\s+)?(?P<region>\d+)\s").unwrap());

static CARD_TABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^Card table byte_map: \[(?P<lo>0x[0-9a-fA-F]+),\s*(?P<hi>0x[0-9a-fA-F]+)\](?:\s*_?byte_map_base: (?P<base>0x[0-9a-fA-F]+))?",
    )
    .unwrap()
});

static MARKING_ROW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s+(?P<name>\w+) Bits:\s*(?P<rest>.*)$").unwrap());

static CODE_HEAP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:CodeHeap '(?P<name>[^']*)'|CodeCache):\s*(?P<rest>.*)$").unwrap()
});

static KEY_EQUALS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?P<key>\w+)=(?P<value>[^,\s]+)").unwrap());

/// Every `0x` word inside the first `[...]` or `[...)` on the line.
fn bracketed_range(line: &str) -> Value {
    BRACKETED
        .captures(line)
        .map(|c| HexAddress::scan(&c["inner"]))
        .filter(|r| !r.is_empty())
        .map_or(Value::Absent, Value::Range)
}

/// `Heap address: 0x0000000080000000, size: 2048 MB, Compressed Oops mode: 32-bit`
pub(super) fn heap_address(_kind: EventKind, line: &str) -> Built {
    let caps = HEAP_ADDRESS.captures(line);
    Fields::new()
        .with("address", fields::address(fields::group(&caps, "addr")))
        .with("size", fields::size(fields::group(&caps, "size")))
        .with("compressed_oops_mode", fields::text(fields::group(&caps, "mode")))
        .with("oop_shift", fields::count(fields::group(&caps, "shift")))
        .done()
}

pub(super) fn narrow_klass(_kind: EventKind, line: &str) -> Built {
    let caps = NARROW_KLASS.captures(line);
    Fields::new()
        .with("base", fields::address(fields::group(&caps, "base")))
        .with("shift", fields::count(fields::group(&caps, "shift")))
        .with("range", fields::address(fields::group(&caps, "range")))
        .done()
}

/// The JDK 11+ `mapped at` form or the JDK 8 `size: ... Address:` form.
pub(super) fn compressed_class_space(_kind: EventKind, line: &str) -> Built {
    if let Some(caps) = CLASS_SPACE_MAPPED.captures(line) {
        let group = |g: &str| caps.name(g).map(|m| m.as_str());
        return Fields::new()
            .with("bounds", fields::range(&[group("lo"), group("hi")]))
            .with("reserved", fields::size(group("reserved")))
            .done();
    }
    let caps = CLASS_SPACE_SIZE.captures(line);
    Fields::new()
        .with("size", fields::size(fields::group(&caps, "size")))
        .with("address", fields::address(fields::group(&caps, "addr")))
        .done()
}

/// `CDS archive(s) mapped at: [0x..-0x..-0x..), size 12255232, SharedBaseAddress: 0x.., ArchiveRelocationMode: 1.`
pub(super) fn cds_archive(_kind: EventKind, line: &str) -> Built {
    if line.contains("not mapped") {
        return Fields::new().with("mapped", Value::Flag(false)).done();
    }
    let caps = CDS_MAPPED.captures(line);
    let bounds = fields::group(&caps, "bounds")
        .map(HexAddress::scan)
        .filter(|r| !r.is_empty())
        .map_or(Value::Absent, Value::Range);
    Fields::new()
        .with("mapped", Value::Flag(true))
        .with("bounds", bounds)
        .with("size", fields::size(fields::group(&caps, "size")))
        .with("shared_base", fields::address(fields::group(&caps, "base")))
        .with("relocation_mode", fields::count(fields::group(&caps, "mode")))
        .done()
}

/// ` CPUs: 4 total, 4 available` and the other `GC Precious Log:` rows.
pub(super) fn precious_log(kind: EventKind, line: &str) -> Built {
    if is_header(kind, line) {
        return Fields::new().done();
    }
    fields::keyed_row(line)
}

/// Rows under `Heap:`, for every collector's layout.
///
/// ```text
///  garbage-first heap   total 258048K, used 12345K [0x0000000080000000, 0x0000000100000000)
///   region size 1024K, 5 young (5120K), 0 survivors (0K)
///  PSYoungGen      total 76288K, used 3932K [0x00000000eab00000, 0x00000000f0000000, 0x0000000100000000)
///   eden space 65536K, 6% used [0x00000000eab00000,0x00000000eaed7240,0x00000000eeb00000)
///  ZHeap           used 10M, capacity 512M, max capacity 8192M
///  Metaspace       used 1234K, committed 1408K, reserved 1056768K
/// ```
pub(super) fn heap(kind: EventKind, line: &str) -> Built {
    if is_header(kind, line) {
        return Fields::new().done();
    }
    if let Some(caps) = REGION_SIZE.captures(line) {
        let group = |g: &str| caps.name(g).map(|m| m.as_str());
        return Fields::new()
            .with("region_size", fields::size(group("size")))
            .with("young", fields::count(group("young")))
            .with("survivors", fields::count(group("survivors")))
            .done();
    }

    let space = SPACE_NAME
        .captures(line)
        .and_then(|c| c.name("space"))
        .map_or(line, |m| m.as_str());
    let mut f = Fields::new().with("space", fields::text(Some(space)));
    if let Some(caps) = SPACE_SIZE.captures(line) {
        f.push("size", fields::size(Some(&caps["size"])));
    }
    for caps in SPACE_METRIC.captures_iter(line) {
        f.push(caps["key"].replace(' ', "_"), fields::size(Some(&caps["value"])));
    }
    if let Some(caps) = USED_PERCENT.captures(line) {
        f.push("used_percent", fields::count(Some(&caps["pct"])));
    }
    let bounds = bracketed_range(line);
    if !bounds.is_absent() {
        f.push("bounds", bounds);
    }
    f.done()
}

/// `Heap Regions:` legend and one row per G1 region.
///
/// ```text
/// |   0|0x0000000080000000, 0x0000000080100000, 0x0000000080100000|100%| O|  |TAMS 0x0000000080100000, 0x0000000080000000| Untracked
/// AC   0 O    TS     0 PTAMS 0x00000000c0100000 NTAMS 0x00000000c0100000 space 1024K, 100% used [0x00000000c0000000, 0x00000000c0100000)
/// ```
pub(super) fn heap_regions(kind: EventKind, line: &str) -> Built {
    if is_header(kind, line) {
        return Fields::new()
            .with("legend", fields::text(Some(fields::tail(line))))
            .done();
    }
    let t = line.trim();
    if t.starts_with('|') {
        let cols: Vec<&str> = t.split('|').map(str::trim).collect();
        let column = |i: usize| cols.get(i).copied();
        let bounds = HexAddress::scan(column(2).unwrap_or_default());
        return Fields::new()
            .with("region", fields::count(column(1)))
            .with(
                "bounds",
                if bounds.is_empty() {
                    Value::Absent
                } else {
                    Value::Range(bounds)
                },
            )
            .with(
                "used_percent",
                fields::count(column(3).map(|p| p.trim_end_matches('%'))),
            )
            .with("type", fields::text(column(4)))
            .done();
    }
    let region = JDK8_REGION
        .captures(line)
        .and_then(|c| c.name("region"))
        .map(|m| m.as_str());
    let mut f = Fields::new()
        .with("region", fields::count(region))
        .with("space_bounds", bracketed_range(line));
    f.push(
        "size",
        fields::size(SPACE_SIZE.captures(line).and_then(|c| c.name("size")).map(|m| m.as_str())),
    );
    f.push(
        "used_percent",
        fields::count(USED_PERCENT.captures(line).and_then(|c| c.name("pct")).map(|m| m.as_str())),
    );
    f.done()
}

pub(super) fn card_table(_kind: EventKind, line: &str) -> Built {
    let caps = CARD_TABLE.captures(line);
    Fields::new()
        .with("bounds", fields::range(&[fields::group(&caps, "lo"), fields::group(&caps, "hi")]))
        .with("byte_map_base", fields::address(fields::group(&caps, "base")))
        .done()
}

/// `Marking Bits (Prev, Next): (CMBitMap*) 0x.., (CMBitMap*) 0x..` and its
/// ` Prev Bits: [0x.., 0x..)` rows.
pub(super) fn marking_bits(kind: EventKind, line: &str) -> Built {
    if is_header(kind, line) {
        let bitmaps = HexAddress::scan(fields::tail(line));
        return Fields::new()
            .with(
                "bitmaps",
                if bitmaps.is_empty() {
                    Value::Absent
                } else {
                    Value::Range(bitmaps)
                },
            )
            .done();
    }
    let caps = fields::captures(&MARKING_ROW, kind, line)?;
    Fields::new()
        .with("name", Value::text(&caps["name"]))
        .with("bounds", bracketed_range(&caps["rest"]))
        .done()
}

pub(super) fn polling_page(_kind: EventKind, line: &str) -> Built {
    Fields::new()
        .with("address", fields::address(fields::tail(line).split_whitespace().next()))
        .done()
}

/// `Metaspace:` is free text; `Key: value` rows are typed when possible.
pub(super) fn metaspace(kind: EventKind, line: &str) -> Built {
    if is_header(kind, line) || line.trim().is_empty() {
        return Fields::new().done();
    }
    if !line.starts_with(char::is_whitespace)
        && let Some((key, value)) = fields::key_value(line, ':')
    {
        return Fields::new()
            .with("key", Value::text(key))
            .with("value", value)
            .done();
    }
    Fields::new().with("detail", fields::text(Some(line))).done()
}

/// `CodeHeap 'non-profiled nmethods': size=120032Kb used=1234Kb max_used=1234Kb free=118797Kb`
/// and the indented `bounds`, blob counts and `compilation:` rows under it.
pub(super) fn code_cache(kind: EventKind, line: &str) -> Built {
    if is_header(kind, line) {
        let caps = CODE_HEAP.captures(line);
        let heap = fields::group(&caps, "name").unwrap_or("CodeCache");
        let mut f = Fields::new().with("heap", Value::text(heap));
        for pair in KEY_EQUALS.captures_iter(fields::group(&caps, "rest").unwrap_or_default()) {
            f.push(&pair["key"], fields::size(Some(&pair["value"])));
        }
        return f.done();
    }
    let t = line.trim();
    if t.starts_with("bounds") {
        return Fields::new().with("bounds", bracketed_range(t)).done();
    }
    if let Some(state) = t.strip_prefix("compilation:") {
        return Fields::new()
            .with("compilation", fields::text(Some(state)))
            .done();
    }
    let mut f = Fields::new();
    for pair in KEY_EQUALS.captures_iter(t) {
        f.push(&pair["key"], fields::scalar(&pair["value"]));
    }
    if f.is_empty() {
        f.push("detail", fields::text(Some(t)));
    }
    f.done()
}
