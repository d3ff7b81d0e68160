//! Network allow-list: the origins a TurboConvert page may talk to.
//!
//! The product's core claim is that conversion happens on-device: no file
//! content ever leaves the browser. The only permitted background traffic is
//! to the site's own origin, a small set of CDNs, and the advertising
//! network. Anything else observed during a scenario is a violation.

use serde::{Deserialize, Serialize};

/// Classification of an observed request URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginClass {
    FirstParty,
    Advertising,
    Disallowed,
}

/// Partitioned domain allow-list. Constructed explicitly and handed to the
/// network observer, so runs stay independently configurable per
/// environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllowList {
    first_party: Vec<String>,
    advertising: Vec<String>,
}

impl AllowList {
    /// The production defaults, audited from the deployed pages.
    pub fn builtin() -> Self {
        Self {
            first_party: [
                "turboconvert.io",
                "cdn.jsdelivr.net",
                "cdnjs.cloudflare.com",
                "unpkg.com",
                "localhost",
                "127.0.0.1",
            ]
            .map(String::from)
            .to_vec(),
            advertising: [
                "googlesyndication.com",
                "adtrafficquality.google",
                "doubleclick.net",
                "googletagservices.com",
                "google.com",
                "gstatic.com",
                "googleapis.com",
            ]
            .map(String::from)
            .to_vec(),
        }
    }

    /// An allow-list with no entries; every background call is a violation.
    pub fn empty() -> Self {
        Self {
            first_party: Vec::new(),
            advertising: Vec::new(),
        }
    }

    pub fn with_first_party(mut self, domain: impl Into<String>) -> Self {
        self.first_party.push(domain.into());
        self
    }

    pub fn with_advertising(mut self, domain: impl Into<String>) -> Self {
        self.advertising.push(domain.into());
        self
    }

    pub fn first_party(&self) -> &[String] {
        &self.first_party
    }

    pub fn advertising(&self) -> &[String] {
        &self.advertising
    }

    /// Substring match, as the pages reference CDN assets by many subdomains.
    pub fn classify(&self, url: &str) -> OriginClass {
        if self.first_party.iter().any(|d| url.contains(d.as_str())) {
            OriginClass::FirstParty
        } else if self.advertising.iter().any(|d| url.contains(d.as_str())) {
            OriginClass::Advertising
        } else {
            OriginClass::Disallowed
        }
    }

    /// Every URL in `urls` that is outside both partitions, preserving order.
    pub fn violations<'a>(&self, urls: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        urls.into_iter()
            .filter(|u| self.classify(u) == OriginClass::Disallowed)
            .map(String::from)
            .collect()
    }
}

impl Default for AllowList {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_all_three_partitions() {
        let list = AllowList::builtin();
        assert_eq!(
            list.classify("https://turboconvert.io/js/app.js"),
            OriginClass::FirstParty
        );
        assert_eq!(
            list.classify("https://pagead2.googlesyndication.com/pagead/sodar"),
            OriginClass::Advertising
        );
        assert_eq!(
            list.classify("https://v2.convertapi.com/convert/pdf/to/docx"),
            OriginClass::Disallowed
        );
    }

    #[test]
    fn violations_keep_the_full_offending_list() {
        let list = AllowList::builtin();
        let urls = [
            "https://cdn.jsdelivr.net/npm/pdf-lib",
            "https://api.evil.example/upload",
            "https://telemetry.example.net/beacon",
        ];
        let violations = list.violations(urls);
        assert_eq!(
            violations,
            vec![
                "https://api.evil.example/upload".to_string(),
                "https://telemetry.example.net/beacon".to_string(),
            ]
        );
    }

    #[test]
    fn empty_list_rejects_everything() {
        let list = AllowList::empty();
        assert_eq!(
            list.classify("https://turboconvert.io/"),
            OriginClass::Disallowed
        );
    }

    #[test]
    fn environment_overrides_compose() {
        let list = AllowList::empty().with_first_party("staging.turboconvert.dev");
        assert_eq!(
            list.classify("https://staging.turboconvert.dev/api/health"),
            OriginClass::FirstParty
        );
    }
}
