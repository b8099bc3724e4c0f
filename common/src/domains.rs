use std::slice::Iter;

/// Steam's API, web, CDN and login endpoints.
pub const STEAM_DOMAINS: &[&str] = &[
    "api.steampowered.com",
    "steamcommunity.com",
    "store.steampowered.com",
    "help.steampowered.com",
    "login.steampowered.com",
    "steamcdn-a.akamaihd.net",
    "cdn.cloudflare.steamstatic.com",
];

/// Ordered, duplicate-free list of the hostnames whose entries this tool owns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DomainList {
    domains: Vec<String>,
}

impl DomainList {
    /// Builds a list from `domains`, dropping case-insensitive duplicates and
    /// keeping the first occurrence's position.
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list: Vec<String> = Vec::new();
        for domain in domains {
            let domain: String = domain.into().trim().trim_end_matches('.').to_ascii_lowercase();
            if domain.is_empty() || list.contains(&domain) {
                continue;
            }
            list.push(domain);
        }
        Self { domains: list }
    }

    pub fn steam() -> Self {
        Self::new(STEAM_DOMAINS.iter().copied())
    }

    pub fn contains(&self, token: &str) -> bool {
        self.domains.iter().any(|d| d.eq_ignore_ascii_case(token))
    }

    pub fn iter(&self) -> Iter<'_, String> {
        self.domains.iter()
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

impl Default for DomainList {
    fn default() -> Self {
        Self::steam()
    }
}

impl<'a> IntoIterator for &'a DomainList {
    type Item = &'a String;
    type IntoIter = Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
