//! Regulation vocabulary and the category → regulation table.

use std::collections::BTreeSet;

/// A regulation the tool knows by name.
pub struct Regulation {
    /// Short name used in output rows.
    pub short_name: &'static str,
    pub full_name: &'static str,
    /// Other spellings a model answer may use.
    pub aliases: &'static [&'static str],
}

pub static REGULATIONS: &[Regulation] = &[
    Regulation {
        short_name: "DSA",
        full_name: "Digital Services Act (EU)",
        aliases: &["digital services act", "eu dsa"],
    },
    Regulation {
        short_name: "COPPA",
        full_name: "Children's Online Privacy Protection Act (US)",
        aliases: &["children's online privacy protection act"],
    },
    Regulation {
        short_name: "GDPR",
        full_name: "General Data Protection Regulation (EU)",
        aliases: &["general data protection regulation"],
    },
    Regulation {
        short_name: "California Protecting Our Kids Act",
        full_name: "California Protecting Our Kids from Social Media Addiction Act",
        aliases: &["protecting our kids act", "california protecting our kids", "sb 976"],
    },
    Regulation {
        short_name: "Florida Online Protections for Minors",
        full_name: "Florida Online Protections for Minors Act",
        aliases: &["florida online protections", "florida hb 3"],
    },
    Regulation {
        short_name: "Utah Social Media Regulation Act",
        full_name: "Utah Social Media Regulation Act",
        aliases: &["utah social media", "utah social media act"],
    },
    Regulation {
        short_name: "NCMEC",
        full_name: "NCMEC reporting requirements",
        aliases: &["ncmec reporting", "national center for missing and exploited children"],
    },
    Regulation {
        short_name: "CCPA",
        full_name: "California Consumer Privacy Act",
        aliases: &["california consumer privacy act", "cpra"],
    },
];

static CATEGORY_REGULATIONS: &[(&str, &[&str])] = &[
    (
        "age verification",
        &[
            "COPPA",
            "California Protecting Our Kids Act",
            "Utah Social Media Regulation Act",
        ],
    ),
    ("location blocking", &["DSA", "GDPR"]),
    ("data localization", &["GDPR", "CCPA"]),
    ("privacy", &["GDPR", "CCPA", "COPPA"]),
    ("content moderation", &["DSA", "NCMEC"]),
    ("monetization", &["DSA", "CCPA"]),
    (
        "social features",
        &[
            "Utah Social Media Regulation Act",
            "Florida Online Protections for Minors",
            "DSA",
        ],
    ),
    ("algorithms", &["DSA", "California Protecting Our Kids Act"]),
    ("live streaming", &["DSA", "NCMEC"]),
    ("e-commerce", &["CCPA", "GDPR"]),
];

/// Union of the regulations mapped to each category.
///
/// Unknown categories contribute nothing.
///
/// ```
/// use geo_compliance::rules::map_to_regulations;
///
/// let regs = map_to_regulations(["age verification"]);
/// assert!(regs.contains("COPPA"));
/// assert!(map_to_regulations(["weather"]).is_empty());
/// ```
pub fn map_to_regulations<I, S>(categories: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut regulations = BTreeSet::new();
    for category in categories {
        if let Some((_, regs)) = CATEGORY_REGULATIONS
            .iter()
            .find(|(name, _)| *name == category.as_ref())
        {
            regulations.extend(regs.iter().map(|r| r.to_string()));
        }
    }
    regulations
}

/// Map a free-text regulation mention onto a known short name.
///
/// Compares case-insensitively against the short name, full name and
/// aliases; a token that merely contains a short acronym such as
/// `"GDPR (EU)"` also resolves.  Returns `None` for unknown regulations and
/// for tokens that mention more than one, such as `"DSA and GDPR"`.
pub fn canonical_regulation(token: &str) -> Option<&'static str> {
    let token = token.trim().to_lowercase();
    if token.is_empty() {
        return None;
    }
    let exact = REGULATIONS.iter().find(|r| {
        r.short_name.to_lowercase() == token
            || r.full_name.to_lowercase() == token
            || r.aliases.iter().any(|a| *a == token)
    });
    if let Some(reg) = exact {
        return Some(reg.short_name);
    }
    let mut mentioned = REGULATIONS.iter().filter(|r| {
        let short = r.short_name.to_lowercase();
        token
            .split(|c: char| !c.is_alphanumeric())
            .any(|word| word == short)
            || r.aliases.iter().any(|a| token.contains(a))
    });
    match (mentioned.next(), mentioned.next()) {
        (Some(reg), None) => Some(reg.short_name),
        // Several regulations in one token: ambiguous, caller keeps it as is.
        _ => None,
    }
}
