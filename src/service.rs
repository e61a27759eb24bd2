use crate::{
    client::{profile::ProfileScraper, roster, roster::RosterSource},
    config::Settings,
    core::{
        cache::{CacheLayer, Source},
        executor::BoundedExecutor,
        leaderboard::{assemble, LeaderboardRow, Participant, ScoreRecord},
    },
    error::{BoardError, BoardResult},
    storage,
};
use std::{convert::Infallible, sync::Arc, time::Duration};
use tracing::{error, info};

/// Serves the leaderboard, refreshing it from the roster and the profiles on a
/// cache miss.
#[derive(Clone)]
pub struct LeaderboardService {
    roster: Option<Arc<dyn RosterSource>>,
    scraper: ProfileScraper,
    executor: BoundedExecutor,
    cache: CacheLayer,
    cache_key: String,
    cache_ttl: Duration,
}

impl LeaderboardService {
    pub fn new(
        roster: Option<Arc<dyn RosterSource>>,
        scraper: ProfileScraper,
        executor: BoundedExecutor,
        cache: CacheLayer,
    ) -> Self {
        Self {
            roster,
            scraper,
            executor,
            cache,
            cache_key: "leaderboard_data".to_string(),
            cache_ttl: Duration::from_secs(1800),
        }
    }

    pub fn with_cache_entry(mut self, key: impl Into<String>, ttl: Duration) -> Self {
        self.cache_key = key.into();
        self.cache_ttl = ttl;
        self
    }

    pub fn from_settings(settings: &Settings) -> BoardResult<Self> {
        let roster = roster::from_settings(&settings.roster())?;
        if roster.is_none() {
            info!("No roster configured. Set ROSTER_URL or ROSTER_FILE.");
        }
        let store = storage::from_settings(&settings.cache())?;
        if store.is_none() {
            info!("No cache store configured, the leaderboard is rebuilt on every request.");
        }

        Ok(LeaderboardService::new(
            roster,
            ProfileScraper::new(&settings.scraper())?,
            BoundedExecutor::new(settings.scrape_concurrency)?,
            CacheLayer::new(store),
        )
        .with_cache_entry(settings.cache_key.clone(), settings.cache_ttl()))
    }

    /// The ranked leaderboard and whether it came from the cache.
    pub async fn leaderboard(&self) -> BoardResult<(Vec<LeaderboardRow>, Source)> {
        let result = self
            .cache
            .get_or_refresh(&self.cache_key, self.cache_ttl, || self.refresh())
            .await;
        if let Err(e) = &result {
            error!("Could not build leaderboard. {e}");
        }
        result
    }

    /// Rebuild the leaderboard from scratch, bypassing the cache.
    pub async fn refresh(&self) -> BoardResult<Vec<LeaderboardRow>> {
        let roster = self.roster.as_ref().ok_or_else(|| {
            BoardError::Configuration("No roster source configured".to_string())
        })?;

        let participants = roster.load().await?;
        info!(
            "Scraping {} profiles, {} at a time",
            participants.len(),
            self.executor.limit()
        );

        let scores = self.scrape_all(&participants).await;
        let rows = assemble(participants, scores);

        info!("Leaderboard refreshed with {} rows", rows.len());
        Ok(rows)
    }

    async fn scrape_all(&self, participants: &[Participant]) -> Vec<ScoreRecord> {
        let scraper = &self.scraper;
        self.executor
            .run(
                participants.to_vec(),
                |participant: Participant| async move {
                    Ok::<_, Infallible>(scraper.scrape(&participant.profile_url).await)
                },
                |failure| ScoreRecord::failed(failure.to_string()),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{client::roster::StaticRoster, config::ScraperSettings};

    fn service(roster: Option<Arc<dyn RosterSource>>) -> LeaderboardService {
        LeaderboardService::new(
            roster,
            ProfileScraper::new(&ScraperSettings::default()).unwrap(),
            BoundedExecutor::new(5).unwrap(),
            CacheLayer::disabled(),
        )
    }

    #[tokio::test]
    async fn missing_roster_is_a_configuration_error() {
        let err = service(None).leaderboard().await.unwrap_err();
        assert!(matches!(err, BoardError::Configuration(_)));
    }

    #[tokio::test]
    async fn empty_roster_fails_the_whole_refresh() {
        let roster: Arc<dyn RosterSource> = Arc::new(StaticRoster::new(vec![]));
        let err = service(Some(roster)).leaderboard().await.unwrap_err();
        assert!(matches!(err, BoardError::RosterUnavailable(_)));
    }

    #[tokio::test]
    async fn participants_without_urls_score_zero() {
        let roster: Arc<dyn RosterSource> = Arc::new(StaticRoster::new(vec![
            Participant::new("X", ""),
            Participant::new("Unknown", "not a url"),
        ]));
        let (rows, source) = service(Some(roster)).leaderboard().await.unwrap();
        assert_eq!(source, Source::Fresh);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.badge_count == 0 && r.error.is_none()));
        assert_eq!(rows[0].name, "X");
    }
}
