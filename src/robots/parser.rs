//! Robots.txt parser implementation
//!
//! Permission checks are delegated to the robotstxt crate's Google-compatible
//! matcher. Crawl-delay is not covered by that crate and is read here.

use robotstxt::DefaultMatcher;
use thiserror::Error;

/// Directives recognized when deciding whether a body is robots.txt at all
const KNOWN_DIRECTIVES: &[&str] = &["user-agent", "allow", "disallow", "crawl-delay", "sitemap"];

/// Why a robots.txt body could not be used
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RobotsParseError {
    #[error("robots.txt contains no recognizable directives")]
    NoDirectives,
}

/// Parsed robots.txt data
#[derive(Debug, Clone)]
pub struct ParsedRobots {
    /// Raw robots.txt content (empty string means allow all)
    content: String,
}

impl ParsedRobots {
    /// Parses a robots.txt body
    ///
    /// Invalid UTF-8 is decoded lossily and a leading byte-order mark is
    /// dropped, so a stray Latin-1 byte in a comment keeps the rules intact.
    /// An empty body is valid and allows everything. A non-empty body with no
    /// directive line (an HTML error page served with status 200, for
    /// instance) is rejected.
    pub fn parse(body: &[u8]) -> Result<Self, RobotsParseError> {
        let decoded = String::from_utf8_lossy(body);
        let content = decoded.strip_prefix('\u{feff}').unwrap_or(&decoded);

        if !content.trim().is_empty() && directive_lines(content).next().is_none() {
            return Err(RobotsParseError::NoDirectives);
        }

        Ok(Self::from_content(content))
    }

    /// Wraps robots.txt content without checking it
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
        }
    }

    /// Checks if a URL is allowed for the given user agent
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to check (absolute, or a path such as "/page.html")
    /// * `user_agent` - The user agent token, `*` for the generic group
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        if self.content.is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, user_agent, url)
    }

    /// Gets the crawl delay, in seconds, that applies to a user agent
    ///
    /// A group naming the agent wins over the `*` group. Consecutive
    /// `User-agent` lines share one group; any other directive closes the
    /// list of agents, so the next `User-agent` line starts a new group.
    pub fn crawl_delay(&self, user_agent: &str) -> Option<f64> {
        let normalized_agent = user_agent.to_lowercase();

        let mut group_agents: Vec<String> = Vec::new();
        let mut group_open = true;
        let mut crawl_delay_for_wildcard: Option<f64> = None;
        let mut crawl_delay_for_agent: Option<f64> = None;

        for (key, value) in directive_lines(&self.content) {
            if key == "user-agent" {
                if !group_open {
                    group_agents.clear();
                    group_open = true;
                }
                group_agents.push(value.to_lowercase());
                continue;
            }

            group_open = false;

            if key != "crawl-delay" {
                continue;
            }

            let Some(delay) = value
                .parse::<f64>()
                .ok()
                .filter(|d| d.is_finite() && *d >= 0.0)
            else {
                continue;
            };

            for agent in &group_agents {
                if agent == "*" {
                    crawl_delay_for_wildcard.get_or_insert(delay);
                } else if normalized_agent != "*" && normalized_agent.contains(agent.as_str()) {
                    crawl_delay_for_agent.get_or_insert(delay);
                }
            }
        }

        crawl_delay_for_agent.or(crawl_delay_for_wildcard)
    }
}

/// Yields `(lowercased key, trimmed value)` for every recognized directive,
/// with comments stripped
fn directive_lines(content: &str) -> impl Iterator<Item = (String, &str)> {
    content.lines().filter_map(|line| {
        let line = line.split('#').next().unwrap_or_default().trim();
        let (key, value) = line.split_once(':')?;
        let key = key.trim().to_lowercase();
        KNOWN_DIRECTIVES
            .contains(&key.as_str())
            .then(|| (key, value.trim()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_robots_txt_allows_all() {
        let robots = ParsedRobots::parse(b"").unwrap();
        assert!(robots.is_allowed("/any/path", "*"));
        assert_eq!(robots.crawl_delay("*"), None);
    }

    #[test]
    fn test_parse_disallow_all() {
        let robots = ParsedRobots::parse(b"User-agent: *\nDisallow: /").unwrap();
        assert!(!robots.is_allowed("https://example.com/", "*"));
        assert!(!robots.is_allowed("https://example.com/page", "*"));
    }

    #[test]
    fn test_parse_disallow_specific() {
        let robots = ParsedRobots::parse(b"User-agent: *\nDisallow: /admin").unwrap();
        assert!(robots.is_allowed("https://example.com/", "*"));
        assert!(robots.is_allowed("https://example.com/page", "*"));
        assert!(!robots.is_allowed("https://example.com/admin", "*"));
        assert!(!robots.is_allowed("https://example.com/admin/users", "*"));
    }

    #[test]
    fn test_parse_allow_and_disallow() {
        let content = "User-agent: *\nDisallow: /private\nAllow: /private/public";
        let robots = ParsedRobots::from_content(content);
        assert!(robots.is_allowed("/", "*"));
        assert!(!robots.is_allowed("/private", "*"));
        assert!(robots.is_allowed("/private/public", "*"));
    }

    #[test]
    fn test_wildcard_agent_ignores_named_groups() {
        let content = "User-agent: BadBot\nDisallow: /\n\nUser-agent: *\nAllow: /";
        let robots = ParsedRobots::from_content(content);
        assert!(robots.is_allowed("/page", "*"));
        assert!(!robots.is_allowed("/page", "BadBot"));
    }

    #[test]
    fn test_latin1_comment_keeps_rules() {
        let body = b"# Caf\xe9 robots\nUser-agent: *\nDisallow: /private\nCrawl-delay: 2";
        let robots = ParsedRobots::parse(body).unwrap();
        assert!(!robots.is_allowed("https://example.com/private", "*"));
        assert!(robots.is_allowed("https://example.com/public", "*"));
        assert_eq!(robots.crawl_delay("*"), Some(2.0));
    }

    #[test]
    fn test_byte_order_mark_ignored() {
        let body = "\u{feff}User-agent: *\nDisallow: /private\nCrawl-delay: 2";
        let robots = ParsedRobots::parse(body.as_bytes()).unwrap();
        assert!(!robots.is_allowed("https://example.com/private", "*"));
        assert_eq!(robots.crawl_delay("*"), Some(2.0));
    }

    #[test]
    fn test_binary_garbage_rejected() {
        let result = ParsedRobots::parse(&[0xff, 0xfe, 0x00, 0x41]);
        assert_eq!(result.unwrap_err(), RobotsParseError::NoDirectives);
    }

    #[test]
    fn test_html_body_rejected() {
        let body = b"<html><body><h1>Welcome to our site</h1></body></html>";
        assert_eq!(
            ParsedRobots::parse(body).unwrap_err(),
            RobotsParseError::NoDirectives
        );
    }

    #[test]
    fn test_comment_only_lines_do_not_count() {
        let body = b"# just a comment: nothing here\n";
        assert_eq!(
            ParsedRobots::parse(body).unwrap_err(),
            RobotsParseError::NoDirectives
        );
    }

    #[test]
    fn test_crawl_delay_wildcard() {
        let robots = ParsedRobots::from_content("User-agent: *\nCrawl-delay: 10\nDisallow: /admin");
        assert_eq!(robots.crawl_delay("*"), Some(10.0));
        assert_eq!(robots.crawl_delay("AnyBot"), Some(10.0));
    }

    #[test]
    fn test_crawl_delay_specific_agent() {
        let content = "User-agent: TestBot\nCrawl-delay: 5\n\nUser-agent: *\nCrawl-delay: 10";
        let robots = ParsedRobots::from_content(content);
        assert_eq!(robots.crawl_delay("TestBot"), Some(5.0));
        assert_eq!(robots.crawl_delay("OtherBot"), Some(10.0));
        assert_eq!(robots.crawl_delay("*"), Some(10.0));
    }

    #[test]
    fn test_crawl_delay_after_rules_in_group() {
        let content = "User-agent: *\nDisallow: /tmp\nCrawl-delay: 2\n";
        let robots = ParsedRobots::from_content(content);
        assert_eq!(robots.crawl_delay("*"), Some(2.0));
    }

    #[test]
    fn test_new_group_after_rules() {
        let content = "User-agent: BotA\nDisallow: /\nUser-agent: *\nCrawl-delay: 4\n";
        let robots = ParsedRobots::from_content(content);
        assert_eq!(robots.crawl_delay("*"), Some(4.0));
        assert_eq!(robots.crawl_delay("BotA"), Some(4.0));
    }

    #[test]
    fn test_crawl_delay_no_delay() {
        let robots = ParsedRobots::from_content("User-agent: *\nDisallow: /admin");
        assert_eq!(robots.crawl_delay("*"), None);
    }

    #[test]
    fn test_crawl_delay_decimal_and_comment() {
        let robots = ParsedRobots::from_content("User-agent: *\nCrawl-delay: 2.5 # be gentle");
        assert_eq!(robots.crawl_delay("*"), Some(2.5));
    }

    #[test]
    fn test_crawl_delay_invalid_values_ignored() {
        let robots = ParsedRobots::from_content("User-agent: *\nCrawl-delay: soon\nCrawl-delay: -3");
        assert_eq!(robots.crawl_delay("*"), None);
    }

    #[test]
    fn test_crawl_delay_case_insensitive() {
        let robots = ParsedRobots::from_content("User-agent: TestBot\ncrawl-delay: 7");
        assert_eq!(robots.crawl_delay("testbot"), Some(7.0));
        assert_eq!(robots.crawl_delay("TESTBOT"), Some(7.0));
        assert_eq!(robots.crawl_delay("*"), None);
    }

    #[test]
    fn test_crawl_delay_multiple_user_agents() {
        let robots = ParsedRobots::from_content("User-agent: BotA\nUser-agent: BotB\nCrawl-delay: 3");
        assert_eq!(robots.crawl_delay("BotA"), Some(3.0));
        assert_eq!(robots.crawl_delay("BotB"), Some(3.0));
        assert_eq!(robots.crawl_delay("BotC"), None);
    }
}
