//! Deterministic social feed.
//!
//! There is no social upstream; posts come from a fixed catalog. Ids are the
//! 1-based catalog position, so a post keeps its id whichever topics are
//! selected, and counters are derived from that position instead of drawn at
//! random. Timestamps are anchored to the moment the provider was created.
use chrono::{DateTime, Duration, Utc};

use crate::{
    error::AppResult,
    models::{ContentId, SocialPost, SEARCH_CATEGORY},
    services::providers::SocialSource,
};

const MAX_SEARCH_RESULTS: usize = 5;

struct MockUser {
    name: &'static str,
    username: &'static str,
}

const USERS: [MockUser; 5] = [
    MockUser { name: "Alice Johnson", username: "alicej" },
    MockUser { name: "Bob Smith", username: "bob_smith" },
    MockUser { name: "Carlos Rivera", username: "carlosr" },
    MockUser { name: "Diana Lee", username: "dianalee" },
    MockUser { name: "Emily Chen", username: "emchen" },
];

struct CatalogPost {
    category: &'static str,
    hashtags: &'static str,
    body: &'static str,
    trending: bool,
}

const fn entry(category: &'static str, hashtags: &'static str, body: &'static str, trending: bool) -> CatalogPost {
    CatalogPost { category, hashtags, body, trending }
}

const TECHNOLOGY: &str = "Technology";
const HEALTH: &str = "Health & Wellness";
const FITNESS: &str = "Fitness";
const TRAVEL: &str = "Travel & Lifestyle";
const HUMOR: &str = "Humor & Relatable Moments";

const CATALOG: [CatalogPost; 20] = [
    entry(TECHNOLOGY, "#CI #Automation", "Moved our release checklist into a pipeline. Merging to main now ships to staging with no manual steps.", true),
    entry(TECHNOLOGY, "#Rust #Performance", "Rewrote the log parser in Rust over the weekend and the nightly batch went from forty minutes to six.", true),
    entry(TECHNOLOGY, "#Testing #Containers", "Spinning up throwaway databases per test run finally killed our flaky integration suite.", false),
    entry(TECHNOLOGY, "#Observability", "Added request ids to every log line. Tracing a bad request across services takes seconds now.", false),
    entry(HEALTH, "#Mindfulness #Mornings", "Ten quiet minutes before opening any screen has made the whole morning calmer.", true),
    entry(HEALTH, "#Hydration #Habits", "Swapped the afternoon soda for sparkling water with lemon. No more three o'clock crash.", false),
    entry(HEALTH, "#Ergonomics #DeskLife", "Raised the monitor to eye level and the neck ache I blamed on stress is gone.", true),
    entry(HEALTH, "#Sleep #Routine", "Phone charges in the kitchen overnight now. Falling asleep has never been easier.", false),
    entry(FITNESS, "#Running #Progress", "First 10k without stopping. Six months ago I could barely run to the bus stop.", true),
    entry(FITNESS, "#Strength #Consistency", "Three short lifting sessions a week beat the two-hour marathons I never kept up.", false),
    entry(FITNESS, "#Mobility #Recovery", "Fifteen minutes of stretching after every ride and my knees have stopped complaining.", false),
    entry(FITNESS, "#Cycling #Commute", "Biked to work every day this month. Saved on fuel and gained a lot of energy.", true),
    entry(TRAVEL, "#SlowTravel #Trains", "Took the night train across the mountains instead of flying and woke up to snow peaks.", true),
    entry(TRAVEL, "#Minimalism #CarryOn", "Two weeks abroad with one backpack. Packing less meant worrying less.", false),
    entry(TRAVEL, "#LocalFood #Markets", "The best meal of the trip came from a market stall with no menu and a very patient cook.", false),
    entry(TRAVEL, "#Stargazing #Camping", "No signal and no city lights, just a sky full of stars above the campsite.", true),
    entry(HUMOR, "#DevLife #SmallWins", "The build passed on the first try and now I trust nothing.", true),
    entry(HUMOR, "#Debugging #Classic", "Spent an hour on the bug, then found the typo while explaining it to the rubber duck.", true),
    entry(HUMOR, "#Mondays #Legacy", "Opened Friday's code on Monday morning and could not understand who wrote it. It was me.", false),
    entry(HUMOR, "#Meetings #Relatable", "That meeting could have been an email, and the email could have been a thumbs-up.", true),
];

/// Mock social source over a fixed catalog
pub struct MockSocialProvider {
    anchor: DateTime<Utc>,
}

impl Default for MockSocialProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSocialProvider {
    pub fn new() -> Self {
        Self::anchored_at(Utc::now())
    }

    pub fn anchored_at(anchor: DateTime<Utc>) -> Self {
        Self { anchor }
    }

    /// Every topic in the catalog, in catalog order
    pub fn categories() -> Vec<&'static str> {
        let mut categories: Vec<&'static str> = Vec::new();
        for post in &CATALOG {
            if !categories.contains(&post.category) {
                categories.push(post.category);
            }
        }
        categories
    }

    fn post(&self, index: usize, entry: &CatalogPost) -> SocialPost {
        let user = &USERS[index % USERS.len()];
        let seed = index as u32;

        SocialPost {
            id: ContentId::from(index as u64 + 1),
            user_id: (index % USERS.len()) as u32 + 1,
            title: entry.hashtags.to_string(),
            body: entry.body.to_string(),
            image: Some(format!("https://picsum.photos/seed/post-{}/400/300", index + 1)),
            username: user.name.to_string(),
            handle: Some(format!("@{}", user.username)),
            avatar: Some(format!("https://i.pravatar.cc/150?u={}", user.username)),
            category: entry.category.to_string(),
            timestamp: self.anchor - Duration::hours(7 * i64::from(seed) + 1),
            likes: 10 + (seed * 7_919) % 990,
            comments: 1 + (seed * 131) % 99,
            shares: 1 + (seed * 37) % 49,
            trending: entry.trending,
        }
    }

    fn catalog(&self) -> impl Iterator<Item = SocialPost> + '_ {
        CATALOG
            .iter()
            .enumerate()
            .map(|(index, entry)| self.post(index, entry))
    }
}

#[async_trait::async_trait]
impl SocialSource for MockSocialProvider {
    async fn fetch_posts(&self, categories: &[String]) -> AppResult<Vec<SocialPost>> {
        let posts: Vec<SocialPost> = self
            .catalog()
            .filter(|post| categories.is_empty() || categories.contains(&post.category))
            .collect();

        tracing::debug!(
            categories = ?categories,
            posts = posts.len(),
            provider = "mock_social",
            "Social posts generated"
        );

        Ok(posts)
    }

    async fn search_posts(&self, query: &str) -> AppResult<Vec<SocialPost>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        Ok(self
            .catalog()
            .filter(|post| {
                post.title.to_lowercase().contains(&needle) || post.body.to_lowercase().contains(&needle)
            })
            .take(MAX_SEARCH_RESULTS)
            .map(|post| SocialPost {
                category: SEARCH_CATEGORY.to_string(),
                ..post
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "social"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_all_posts_when_no_category() {
        let provider = MockSocialProvider::new();
        let posts = provider.fetch_posts(&[]).await.unwrap();
        assert_eq!(posts.len(), CATALOG.len());
        assert_eq!(MockSocialProvider::categories().len(), 5);
    }

    #[tokio::test]
    async fn test_ids_survive_category_filter() {
        let provider = MockSocialProvider::new();
        let all = provider.fetch_posts(&[]).await.unwrap();
        let fitness = provider.fetch_posts(&[FITNESS.to_string()]).await.unwrap();

        assert_eq!(fitness.len(), 4);
        for post in &fitness {
            let same = all.iter().find(|p| p.id == post.id).unwrap();
            assert_eq!(same, post);
        }
    }

    #[test]
    fn test_repeated_fetches_are_identical() {
        let provider = MockSocialProvider::new();
        let first = tokio_test::assert_ok!(tokio_test::block_on(provider.fetch_posts(&[])));
        let second = tokio_test::assert_ok!(tokio_test::block_on(provider.fetch_posts(&[])));
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_counters_within_bounds() {
        let provider = MockSocialProvider::new();
        for post in provider.fetch_posts(&[]).await.unwrap() {
            assert!((10..1000).contains(&post.likes));
            assert!((1..100).contains(&post.comments));
            assert!((1..50).contains(&post.shares));
            assert!(post.handle.as_deref().unwrap().starts_with('@'));
        }
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_over_title_and_body() {
        let provider = MockSocialProvider::new();

        let by_body = provider.search_posts("RUBBER duck").await.unwrap();
        assert_eq!(by_body.len(), 1);
        assert_eq!(by_body[0].category, SEARCH_CATEGORY);

        let by_title = provider.search_posts("#rust").await.unwrap();
        assert_eq!(by_title.len(), 1);
        assert_eq!(by_title[0].id, ContentId::from(2u64));
    }

    #[tokio::test]
    async fn test_search_is_capped() {
        let provider = MockSocialProvider::new();
        // "the" appears in most bodies
        let results = provider.search_posts("the").await.unwrap();
        assert_eq!(results.len(), MAX_SEARCH_RESULTS);
        assert!(provider.search_posts("  ").await.unwrap().is_empty());
    }
}
