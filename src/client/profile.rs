use crate::{
    client::markup::BadgeMarkup,
    config::ScraperSettings,
    core::leaderboard::ScoreRecord,
    error::{BoardError, BoardResult},
};
use reqwest::{header::USER_AGENT, Client, Url};
use tracing::{debug, warn};

/// Scrapes badge counts from public profile pages.
#[derive(Debug, Clone)]
pub struct ProfileScraper {
    http_client: Client,
    user_agent: String,
    markup: BadgeMarkup,
    completion_badge_marker: String,
}

impl ProfileScraper {
    pub fn new(settings: &ScraperSettings) -> BoardResult<Self> {
        let http_client = Client::builder().timeout(settings.timeout).build()?;
        let markup = BadgeMarkup::new(&settings.badge_selector, &settings.badge_title_selector)?;
        Ok(Self {
            http_client,
            user_agent: settings.user_agent.clone(),
            markup,
            completion_badge_marker: settings.completion_badge_marker.clone(),
        })
    }

    /// Score of the profile at `url`. Never fails: an unreadable profile gives a
    /// zero score carrying an error, and a missing URL gives a plain zero score.
    pub async fn scrape(&self, url: &str) -> ScoreRecord {
        let Some(url) = profile_url(url) else {
            debug!("Skipping profile without a valid URL: '{url}'");
            return ScoreRecord::default();
        };

        match self.get(url.clone()).await {
            Ok(page) => self.score_markup(&page),
            Err(e) => {
                warn!("Could not scrape profile {url}. {e}");
                ScoreRecord::private_or_invalid()
            }
        }
    }

    /// Count badges on a profile page. The completion badge sets a flag instead of
    /// adding to the count.
    pub fn score_markup(&self, page: &str) -> ScoreRecord {
        self.markup
            .find_badge_elements(page)
            .iter()
            .fold(ScoreRecord::default(), |mut score, badge| {
                if badge.title_text.contains(&self.completion_badge_marker) {
                    score.arcade_complete = 1;
                } else {
                    score.badge_count += 1;
                }
                score
            })
    }

    async fn get(&self, url: Url) -> BoardResult<String> {
        let response = self
            .http_client
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => response
                .text()
                .await
                .map_err(|e| BoardError::Parse(e.to_string())),
            status => Err(BoardError::Http(format!("{}", status))),
        }
    }
}

/// Absolute http(s) URL, or `None` when the roster value cannot be one.
fn profile_url(raw: &str) -> Option<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    Url::parse(raw)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
}
