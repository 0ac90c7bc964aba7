// ── Domain model ──
//
// Canonical types shared by the engine, the registry, and the CLI.

pub mod issue;
pub mod site;
pub mod site_id;

pub use issue::{Advisory, Issue, IssueCategory, QuickHint, Severity, Suggestion};
pub use site::{
    DEFAULT_KEYWORD, SCORE_MAX, Scores, Site, SiteStatus, normalize_keywords, normalize_url,
    parse_keywords,
};
pub use site_id::SiteId;
