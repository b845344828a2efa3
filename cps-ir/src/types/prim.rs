//! Primitive type tags (spec.md §3 "Type node — Primitive").

use std::fmt;
use std::str::FromStr;

/// `tag ∈ {bool, pu8/qu8/ps8/qs8, …, pf64/qf64}`.
///
/// Signedness (`s`/`u`) and saturation (`p` = wrapping/plain, `q` =
/// quiet/saturating — the original naming the backend itself uses) are
/// encoded directly in the tag, matching the wire format byte-for-byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimTag {
    Bool,
    Pu8,
    Qu8,
    Ps8,
    Qs8,
    Pu16,
    Qu16,
    Ps16,
    Qs16,
    Pu32,
    Qu32,
    Ps32,
    Qs32,
    Pu64,
    Qu64,
    Ps64,
    Qs64,
    Pf16,
    Qf16,
    Pf32,
    Qf32,
    Pf64,
    Qf64,
}

impl PrimTag {
    pub fn as_str(self) -> &'static str {
        match self {
            PrimTag::Bool => "bool",
            PrimTag::Pu8 => "pu8",
            PrimTag::Qu8 => "qu8",
            PrimTag::Ps8 => "ps8",
            PrimTag::Qs8 => "qs8",
            PrimTag::Pu16 => "pu16",
            PrimTag::Qu16 => "qu16",
            PrimTag::Ps16 => "ps16",
            PrimTag::Qs16 => "qs16",
            PrimTag::Pu32 => "pu32",
            PrimTag::Qu32 => "qu32",
            PrimTag::Ps32 => "ps32",
            PrimTag::Qs32 => "qs32",
            PrimTag::Pu64 => "pu64",
            PrimTag::Qu64 => "qu64",
            PrimTag::Ps64 => "ps64",
            PrimTag::Qs64 => "qs64",
            PrimTag::Pf16 => "pf16",
            PrimTag::Qf16 => "qf16",
            PrimTag::Pf32 => "pf32",
            PrimTag::Qf32 => "qf32",
            PrimTag::Pf64 => "pf64",
            PrimTag::Qf64 => "qf64",
        }
    }
}

impl fmt::Display for PrimTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrimTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "bool" => PrimTag::Bool,
            "pu8" => PrimTag::Pu8,
            "qu8" => PrimTag::Qu8,
            "ps8" => PrimTag::Ps8,
            "qs8" => PrimTag::Qs8,
            "pu16" => PrimTag::Pu16,
            "qu16" => PrimTag::Qu16,
            "ps16" => PrimTag::Ps16,
            "qs16" => PrimTag::Qs16,
            "pu32" => PrimTag::Pu32,
            "qu32" => PrimTag::Qu32,
            "ps32" => PrimTag::Ps32,
            "qs32" => PrimTag::Qs32,
            "pu64" => PrimTag::Pu64,
            "qu64" => PrimTag::Qu64,
            "ps64" => PrimTag::Ps64,
            "qs64" => PrimTag::Qs64,
            "pf16" => PrimTag::Pf16,
            "qf16" => PrimTag::Qf16,
            "pf32" => PrimTag::Pf32,
            "qf32" => PrimTag::Qf32,
            "pf64" => PrimTag::Pf64,
            "qf64" => PrimTag::Qf64,
            other => return Err(format!("unrecognized primitive tag `{other}`")),
        })
    }
}
