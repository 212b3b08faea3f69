//! # Sitemap Entries
//!
//! The site has a fixed set of public routes with no dynamic parameters.

use chrono::NaiveDate;
use serde::Serialize;

/// Date the static routes last changed.
pub const LAST_MODIFIED: (i32, u32, u32) = (2026, 2, 7);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFrequency {
    Weekly,
    Monthly,
}

impl ChangeFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

/// One `<url>` of `sitemap.xml`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SitemapEntry {
    /// Route path relative to the site base URL.
    pub path: &'static str,
    /// Human-readable title for the sitemap page.
    pub title: &'static str,
    pub change_frequency: ChangeFrequency,
    pub priority: f32,
}

const ENTRIES: &[SitemapEntry] = &[
    SitemapEntry {
        path: "/",
        title: "업체 목록",
        change_frequency: ChangeFrequency::Weekly,
        priority: 1.0,
    },
    SitemapEntry {
        path: "/register",
        title: "업체 등록",
        change_frequency: ChangeFrequency::Monthly,
        priority: 0.8,
    },
    SitemapEntry {
        path: "/quote",
        title: "견적 요청",
        change_frequency: ChangeFrequency::Monthly,
        priority: 0.8,
    },
    SitemapEntry {
        path: "/sitemap-page",
        title: "사이트맵",
        change_frequency: ChangeFrequency::Monthly,
        priority: 0.3,
    },
];

impl SitemapEntry {
    pub fn all() -> &'static [SitemapEntry] {
        ENTRIES
    }

    pub fn last_modified() -> Option<NaiveDate> {
        let (y, m, d) = LAST_MODIFIED;
        NaiveDate::from_ymd_opt(y, m, d)
    }

    /// Absolute URL under `base_url` (trailing slash tolerated).
    pub fn url(&self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_and_priorities() {
        let entries = SitemapEntry::all();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0].path, "/");
        assert_eq!(entries[0].priority, 1.0);
        assert_eq!(entries[0].change_frequency, ChangeFrequency::Weekly);
        assert!(entries[1..]
            .iter()
            .all(|e| e.change_frequency == ChangeFrequency::Monthly));
        assert_eq!(entries[3].priority, 0.3);
    }

    #[test]
    fn url_joins_base() {
        let e = SitemapEntry::all()[1];
        assert_eq!(e.url("https://doxtalk.co.kr/"), "https://doxtalk.co.kr/register");
        assert_eq!(
            SitemapEntry::last_modified().unwrap().to_string(),
            "2026-02-07"
        );
    }
}
