//! Pricing catalog - maps a free-text project type to a priced bundle.
//!
//! Bundles and the keyword rules that select them are static data. Rules are
//! evaluated in order and the first match wins; anything unmatched (including
//! empty input) falls through to the generic bundle.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const CONTINGENCY_NAME: &str = "Contingency (5%)";
pub const CONTINGENCY_DURATION: &str = "—";

/// Contingency rate in hundredths (5%).
const CONTINGENCY_PERCENT: i64 = 5;

/// A bundle entry: (name, price in cents, duration).
type BundleEntry = (&'static str, i64, &'static str);

const WEBSITE_BUNDLE: &[BundleEntry] = &[
    ("Discovery & Planning", 500_00, "2 weeks"),
    ("Design & Prototyping", 1200_00, "2-3 weeks"),
    ("Development (static pages)", 1800_00, "2-4 weeks"),
    ("QA & Launch", 400_00, "1 week"),
];

const MOBILE_BUNDLE: &[BundleEntry] = &[
    ("Discovery & Planning", 700_00, "2 weeks"),
    ("UI/UX Design", 1500_00, "3 weeks"),
    ("Development (MVP)", 4500_00, "6-10 weeks"),
    ("QA & Launch", 800_00, "1-2 weeks"),
];

const MARKETING_BUNDLE: &[BundleEntry] = &[
    ("SEO Audit", 300_00, "1 week"),
    ("On-page Optimization", 600_00, "2-4 weeks"),
    ("Content & Outreach (monthly)", 800_00, "monthly"),
];

const GENERIC_BUNDLE: &[BundleEntry] = &[
    ("Discovery & Requirements", 400_00, "1-2 weeks"),
    ("Execution", 1500_00, "variable"),
    ("Maintenance (1 month)", 200_00, "1 month"),
];

/// Which bundle a project type resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BundleKind {
    Website,
    MobileApp,
    Marketing,
    Generic,
}

impl BundleKind {
    fn entries(self) -> &'static [BundleEntry] {
        match self {
            Self::Website => WEBSITE_BUNDLE,
            Self::MobileApp => MOBILE_BUNDLE,
            Self::Marketing => MARKETING_BUNDLE,
            Self::Generic => GENERIC_BUNDLE,
        }
    }
}

/// A keyword rule: matches when the normalized input contains any keyword.
#[derive(Debug, Clone, Copy)]
pub struct PricingRule {
    pub keywords: &'static [&'static str],
    pub bundle: BundleKind,
}

impl PricingRule {
    pub fn matches(&self, normalized: &str) -> bool {
        self.keywords.iter().any(|keyword| normalized.contains(keyword))
    }
}

/// Ordered rule table. Website is checked before mobile/app so that
/// "website + mobile" descriptions price as a website.
pub const PRICING_RULES: &[PricingRule] = &[
    PricingRule {
        keywords: &["website"],
        bundle: BundleKind::Website,
    },
    PricingRule {
        keywords: &["mobile", "app"],
        bundle: BundleKind::MobileApp,
    },
    PricingRule {
        keywords: &["seo", "marketing"],
        bundle: BundleKind::Marketing,
    },
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LineItem {
    #[schema(example = "Discovery & Planning")]
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 500.0)]
    pub price: Decimal,
    #[schema(example = "2 weeks")]
    pub duration: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricingResult {
    pub bundle: BundleKind,
    /// Display order; the contingency item is always last.
    pub items: Vec<LineItem>,
    pub total: Decimal,
}

impl PricingResult {
    pub fn contingency(&self) -> Option<&LineItem> {
        self.items.last().filter(|item| item.name == CONTINGENCY_NAME)
    }
}

/// Round to cents with midpoint-to-even, the same rule the pricing sheet has
/// always used.
pub fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}

/// Lowercase and trim a project type for keyword matching.
pub fn normalize(project_type: &str) -> String {
    project_type.trim().to_lowercase()
}

/// Resolve the bundle for a project type using [`PRICING_RULES`].
pub fn select_bundle(project_type: &str) -> BundleKind {
    let normalized = normalize(project_type);
    PRICING_RULES
        .iter()
        .find(|rule| rule.matches(&normalized))
        .map(|rule| rule.bundle)
        .unwrap_or(BundleKind::Generic)
}

/// Price a project type. Never fails.
///
/// Each line item is rounded to cents before it is added to the running sum,
/// the contingency is 5% of that sum rounded to cents, and the final total is
/// rounded again.
pub fn price(project_type: &str) -> PricingResult {
    let bundle = select_bundle(project_type);

    let mut items = Vec::with_capacity(bundle.entries().len() + 1);
    let mut subtotal = Decimal::ZERO;
    for &(name, cents, duration) in bundle.entries() {
        let item_price = round_cents(Decimal::new(cents, 2));
        subtotal += item_price;
        items.push(LineItem {
            name: name.to_string(),
            price: item_price,
            duration: duration.to_string(),
        });
    }

    let contingency = round_cents(subtotal * Decimal::new(CONTINGENCY_PERCENT, 2));
    items.push(LineItem {
        name: CONTINGENCY_NAME.to_string(),
        price: contingency,
        duration: CONTINGENCY_DURATION.to_string(),
    });

    PricingResult {
        bundle,
        items,
        total: round_cents(subtotal + contingency),
    }
}
