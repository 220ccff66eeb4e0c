//! Canonical organization names.
//!
//! Titles refer to the same organization in several ways (full registered name, name without the
//! legal-entity prefix, colloquial abbreviation). Every extraction strategy funnels its raw names
//! through [`canonicalize`] so that one real-world organization always renders the same way.

/// One canonical organization and the substrings that identify it.
#[derive(Debug, Clone, Copy)]
pub struct Alias {
    pub full: &'static str,
    /// Display abbreviation, reported only when the input used an abbreviated trigger.
    pub abbr: &'static str,
    /// Substrings of the long form. Checked before `short`.
    pub names: &'static [&'static str],
    /// Abbreviated forms.
    pub short: &'static [&'static str],
}

pub const ALIASES: &[Alias] = &[
    Alias {
        full: "中央投資股份有限公司",
        abbr: "中投",
        names: &["中央投資"],
        short: &["中投"],
    },
    Alias {
        full: "欣裕台股份有限公司",
        abbr: "",
        names: &["欣裕台"],
        short: &[],
    },
    Alias {
        full: "財團法人民生建設基金會",
        abbr: "",
        names: &["民生建設"],
        short: &[],
    },
    Alias {
        full: "欣光華股份有限公司",
        abbr: "",
        names: &["欣光華"],
        short: &[],
    },
    Alias {
        full: "中華民國婦女聯合會",
        abbr: "婦聯會",
        names: &["婦女聯合會"],
        short: &["婦聯"],
    },
    Alias {
        full: "中影股份有限公司",
        abbr: "中影",
        names: &["中影股份", "中央電影"],
        short: &["中影"],
    },
    Alias {
        full: "中國廣播股份有限公司",
        abbr: "中廣",
        names: &["中國廣播"],
        short: &["中廣"],
    },
    Alias {
        full: "中國電視股份有限公司",
        abbr: "中視",
        names: &["中國電視"],
        short: &["中視"],
    },
    Alias {
        full: "社團法人中國青年救國團",
        abbr: "救國團",
        names: &["中國青年救國團"],
        short: &["救國團"],
    },
    Alias {
        full: "社團法人中華救助總會",
        abbr: "救總",
        names: &["救助總會"],
        short: &["救總"],
    },
    Alias {
        full: "財團法人民族基金會",
        abbr: "",
        names: &["民族基金"],
        short: &[],
    },
    Alias {
        full: "財團法人民權基金會",
        abbr: "",
        names: &["民權基金"],
        short: &[],
    },
    Alias {
        full: "財團法人國家發展基金會",
        abbr: "",
        names: &["國家發展基金"],
        short: &[],
    },
    Alias {
        full: "中國國民黨",
        abbr: "",
        names: &["中國國民黨"],
        short: &[],
    },
];

/// A curated high-frequency organization for the whitelist scan.
#[derive(Debug, Clone, Copy)]
pub struct KnownOrg {
    pub name: &'static str,
    /// Also match on the leading [`WHITELIST_PREFIX_CHARS`] characters (long names only).
    pub prefix_match: bool,
}

pub const WHITELIST_PREFIX_CHARS: usize = 4;

pub const WHITELIST: &[KnownOrg] = &[
    KnownOrg { name: "民生建設基金會", prefix_match: true },
    KnownOrg { name: "欣光華股份有限公司", prefix_match: true },
    KnownOrg { name: "中央投資股份有限公司", prefix_match: true },
    KnownOrg { name: "欣裕台股份有限公司", prefix_match: true },
    KnownOrg { name: "中影股份有限公司", prefix_match: true },
    KnownOrg { name: "中廣股份有限公司", prefix_match: true },
    KnownOrg { name: "中國廣播股份有限公司", prefix_match: true },
    // These prefixes ("中華民國", "中國青年", "國家發展") also start unrelated names.
    KnownOrg { name: "中華民國婦女聯合會", prefix_match: false },
    KnownOrg { name: "中國青年救國團", prefix_match: false },
    KnownOrg { name: "中華救助總會", prefix_match: true },
    KnownOrg { name: "民族基金會", prefix_match: true },
    KnownOrg { name: "民權基金會", prefix_match: true },
    KnownOrg { name: "國家發展基金會", prefix_match: false },
    KnownOrg { name: "中視", prefix_match: true },
];

impl KnownOrg {
    pub fn matches(&self, title: &str) -> bool {
        if title.contains(self.name) {
            return true;
        }
        if !self.prefix_match || self.name.chars().count() <= WHITELIST_PREFIX_CHARS {
            return false;
        }
        let prefix: String = self.name.chars().take(WHITELIST_PREFIX_CHARS).collect();
        title.contains(&prefix)
    }
}

/// Alias-table hit for `name`: `(full, abbr)`.
pub fn lookup(name: &str) -> Option<(&'static str, &'static str)> {
    for a in ALIASES {
        if a.names.iter().any(|n| name.contains(n)) {
            return Some((a.full, ""));
        }
    }
    for a in ALIASES {
        if a.short.iter().any(|s| name.contains(s)) {
            return Some((a.full, a.abbr));
        }
    }
    None
}

/// Map a raw name to its canonical `(full, abbr)` pair.
///
/// Names not in the alias table come back trimmed with an empty abbreviation. Pure and
/// idempotent on the full name.
pub fn canonicalize(name: &str) -> (String, String) {
    match lookup(name) {
        Some((full, abbr)) => (full.to_string(), abbr.to_string()),
        None => (name.trim().to_string(), String::new()),
    }
}
