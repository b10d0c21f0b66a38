//! Built-in headlines served when the news upstream is unavailable.
use chrono::{Duration, Utc};

use crate::{
    models::{ArticleSource, NewsItem},
    services::normalize::news_id_for_url,
};

struct Headline {
    category: &'static str,
    source: &'static str,
    author: &'static str,
    title: &'static str,
    description: &'static str,
    slug: &'static str,
}

const HEADLINES: [Headline; 7] = [
    Headline {
        category: "technology",
        source: "Circuit Weekly",
        author: "Tech Desk",
        title: "Open-source compiler project ships its first stable release",
        description: "After four years of development the toolchain reaches 1.0 with a promise of long-term support.",
        slug: "technology-compiler-release",
    },
    Headline {
        category: "business",
        source: "Market Ledger",
        author: "Markets Team",
        title: "Retail earnings beat forecasts for a third straight quarter",
        description: "Strong holiday sales lifted results across the sector, analysts said on Tuesday.",
        slug: "business-retail-earnings",
    },
    Headline {
        category: "sports",
        source: "Final Whistle",
        author: "Sports Desk",
        title: "Underdogs clinch the title in an overtime thriller",
        description: "A late equalizer and a penalty save decided a final few pundits saw coming.",
        slug: "sports-overtime-final",
    },
    Headline {
        category: "health",
        source: "Wellbeing Today",
        author: "Health Correspondent",
        title: "Short daily walks linked to better sleep in new study",
        description: "Researchers followed two thousand adults for a year and found consistent improvements.",
        slug: "health-walking-sleep",
    },
    Headline {
        category: "entertainment",
        source: "Marquee",
        author: "Culture Desk",
        title: "Animated sequel tops the weekend box office",
        description: "The family film opened well ahead of expectations in more than forty markets.",
        slug: "entertainment-box-office",
    },
    Headline {
        category: "science",
        source: "Field Notes",
        author: "Science Desk",
        title: "Deep-sea survey catalogues dozens of unknown species",
        description: "The expedition mapped a trench system that had never been explored by submersible.",
        slug: "science-deep-sea-survey",
    },
    Headline {
        category: "general",
        source: "Daily Bulletin",
        author: "Newsroom",
        title: "City opens its largest public library in a century",
        description: "The new building doubles the collection and stays open until midnight.",
        slug: "general-library-opening",
    },
];

/// Fallback headlines in the given categories; every category when empty
pub fn headlines(categories: &[String]) -> Vec<NewsItem> {
    let now = Utc::now();

    HEADLINES
        .iter()
        .enumerate()
        .filter(|(_, h)| categories.is_empty() || categories.iter().any(|c| c == h.category))
        .map(|(i, h)| {
            let url = format!("https://example.com/news/{}", h.slug);
            NewsItem {
                id: news_id_for_url(&url),
                source: ArticleSource {
                    id: Some("mock".to_string()),
                    name: h.source.to_string(),
                },
                author: Some(h.author.to_string()),
                title: h.title.to_string(),
                description: h.description.to_string(),
                url,
                image_url: None,
                published_at: Some(now - Duration::hours(i as i64 + 1)),
                content: Some(h.description.to_string()),
                category: h.category.to_string(),
            }
        })
        .collect()
}
