//! Keyword-based compliance category detection.
//!
//! [`KeywordMatcher`] scans lower-cased feature text for curated regulatory
//! keywords and reports every category with at least one hit, together with
//! all of the keywords that hit.  Categories and keywords are reported in
//! table order so output is stable across runs.

// ---------------------------------------------------------------------------
// Internal types
// ---------------------------------------------------------------------------

/// One row of the static category table.
pub struct CategoryConfig {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    /// Categories that on their own strongly suggest jurisdiction-specific
    /// logic.  Reported alongside matches; the merge rules do not use it.
    pub high_priority: bool,
}

// ---------------------------------------------------------------------------
// Static category definitions
// ---------------------------------------------------------------------------

pub static CATEGORIES: &[CategoryConfig] = &[
    CategoryConfig {
        name: "age verification",
        keywords: &[
            "age gate",
            "age verification",
            "age check",
            "under 18",
            "under 13",
            "minors",
        ],
        high_priority: true,
    },
    CategoryConfig {
        name: "location blocking",
        keywords: &[
            "location-based blocking",
            "geo-blocking",
            "geographic restriction",
            "country-specific",
        ],
        high_priority: true,
    },
    CategoryConfig {
        name: "data localization",
        keywords: &[
            "data localization",
            "data residency",
            "local data storage",
            "regional data",
        ],
        high_priority: true,
    },
    CategoryConfig {
        name: "privacy",
        keywords: &[
            "privacy policy",
            "data protection",
            "personal information",
            "user data",
        ],
        high_priority: false,
    },
    CategoryConfig {
        name: "content moderation",
        keywords: &[
            "content moderation",
            "harmful content",
            "inappropriate content",
            "reporting",
        ],
        high_priority: true,
    },
    CategoryConfig {
        name: "monetization",
        keywords: &[
            "advertising",
            "monetization",
            "revenue",
            "sponsored content",
            "influencer",
        ],
        high_priority: false,
    },
    CategoryConfig {
        name: "social features",
        keywords: &[
            "social media",
            "user-generated content",
            "comments",
            "sharing",
            "messaging",
        ],
        high_priority: false,
    },
    CategoryConfig {
        name: "algorithms",
        keywords: &[
            "recommendation algorithm",
            "content recommendation",
            "personalized content",
        ],
        high_priority: false,
    },
    CategoryConfig {
        name: "live streaming",
        keywords: &[
            "live streaming",
            "live video",
            "broadcasting",
            "real-time content",
        ],
        high_priority: false,
    },
    CategoryConfig {
        name: "e-commerce",
        keywords: &[
            "shopping",
            "e-commerce",
            "purchases",
            "transactions",
            "payments",
        ],
        high_priority: false,
    },
];

// ---------------------------------------------------------------------------
// KeywordMatch
// ---------------------------------------------------------------------------

/// All keyword hits for one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordMatch {
    pub category: String,
    pub keywords: Vec<String>,
}

impl KeywordMatch {
    /// Whether this category is one of the high-priority ones.
    pub fn is_high_priority(&self) -> bool {
        CATEGORIES
            .iter()
            .any(|c| c.name == self.category && c.high_priority)
    }
}

// ---------------------------------------------------------------------------
// KeywordMatcher
// ---------------------------------------------------------------------------

/// Finds regulatory keywords in feature text.
///
/// Matching is a case-insensitive substring test, so `"age gate"` also hits
/// `"age gates"`.
///
/// # Example
/// ```rust
/// use geo_compliance::rules::KeywordMatcher;
///
/// let matcher = KeywordMatcher::new();
/// let matches = matcher.find("Implement age gates for users under 18");
/// assert_eq!(matches[0].category, "age verification");
/// assert_eq!(matches[0].keywords, vec!["age gate", "under 18"]);
/// ```
pub struct KeywordMatcher;

impl KeywordMatcher {
    /// Create a matcher over the built-in category table.
    pub fn new() -> Self {
        Self
    }

    /// Return one [`KeywordMatch`] per category with at least one hit.
    pub fn find(&self, text: &str) -> Vec<KeywordMatch> {
        let text = text.to_lowercase();
        CATEGORIES
            .iter()
            .filter_map(|category| {
                let found: Vec<String> = category
                    .keywords
                    .iter()
                    .filter(|kw| text.contains(**kw))
                    .map(|kw| kw.to_string())
                    .collect();
                if found.is_empty() {
                    None
                } else {
                    Some(KeywordMatch {
                        category: category.name.to_string(),
                        keywords: found,
                    })
                }
            })
            .collect()
    }
}

impl Default for KeywordMatcher {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
