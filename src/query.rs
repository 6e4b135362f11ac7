//! Query functions - filtering, ordering and paging over cached rows
//! Pure functions over a row snapshot, plus the city summary which reads the cache

use crate::cache::DatasetCache;
use crate::ingestion::normalize::{first_int, first_num, normalize, row_id, row_location};
use crate::ingestion::{City, NormalizedProperty, RawRow};
use futures::future::join_all;
use serde::Serialize;
use tracing::warn;

pub const DEFAULT_LIST_LIMIT: usize = 20;
pub const DEFAULT_SHOWCASE_LIMIT: usize = 12;

pub const AVAILABILITY_COLUMNS: &[&str] = &[
    "availability_30",
    "availability_60",
    "availability_90",
    "availability_365",
];

/// Conjunction of optional listing filters; unset filters match everything
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingFilter {
    pub min_guests: Option<i64>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub neighbourhood: Option<String>,
    pub room_type: Option<String>,
}

impl ListingFilter {
    pub fn matches(&self, row: &RawRow) -> bool {
        if let Some(min_guests) = self.min_guests {
            match first_int(row, &["accommodates"]) {
                Some(guests) if guests >= min_guests => {}
                _ => return false,
            }
        }

        // Rows without a parseable price stay in
        if let Some(price) = first_num(row, &["price"]) {
            if self.price_min.is_some_and(|min| price < min) {
                return false;
            }
            if self.price_max.is_some_and(|max| price > max) {
                return false;
            }
        }

        if let Some(wanted) = &self.neighbourhood {
            if !contains_ignore_case(row_location(row), wanted) {
                return false;
            }
        }

        if let Some(wanted) = &self.room_type {
            if !contains_ignore_case(row.text("room_type").unwrap_or_default(), wanted) {
                return false;
            }
        }

        true
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// One page of filtered listings
#[derive(Debug, Clone, PartialEq)]
pub struct ListingPage {
    /// Matches before paging
    pub total: usize,
    pub items: Vec<NormalizedProperty>,
}

/// Filter then page. `limit == 0` returns everything after `offset`.
pub fn list(
    rows: &[RawRow],
    city: City,
    filter: &ListingFilter,
    offset: usize,
    limit: usize,
) -> ListingPage {
    let matching: Vec<&RawRow> = rows.iter().filter(|row| filter.matches(row)).collect();
    let total = matching.len();
    let take = if limit == 0 { total } else { limit };

    let items = matching
        .into_iter()
        .skip(offset)
        .take(take)
        .map(|row| normalize(row, city))
        .collect();

    ListingPage { total, items }
}

/// Exact id match
pub fn find_by_id(rows: &[RawRow], city: City, id: &str) -> Option<NormalizedProperty> {
    rows.iter()
        .find(|row| row_id(row) == id)
        .map(|row| normalize(row, city))
}

/// Review score; unrated listings count as 0
pub fn rating(row: &RawRow) -> f64 {
    first_num(row, &["review_scores_rating"]).unwrap_or(0.0)
}

pub fn review_count(row: &RawRow) -> i64 {
    first_int(row, &["number_of_reviews"]).unwrap_or(0)
}

/// Best rated first, more reviews breaking ties. Stable, so equal rows keep
/// dataset order.
pub fn popular(rows: &[RawRow], city: City, limit: usize) -> Vec<NormalizedProperty> {
    let mut ranked: Vec<(f64, i64, &RawRow)> = rows
        .iter()
        .map(|row| (rating(row), review_count(row), row))
        .collect();

    ranked.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| b.1.cmp(&a.1)));

    ranked
        .into_iter()
        .take(limit)
        .map(|(_, _, row)| normalize(row, city))
        .collect()
}

/// Any availability window with open nights
pub fn has_availability(row: &RawRow) -> bool {
    AVAILABILITY_COLUMNS.iter().any(|column| {
        row.get(column)
            .and_then(|value| value.trim().parse::<f64>().ok())
            .is_some_and(|nights| nights > 0.0)
    })
}

/// Listings with open nights; falls back to the full set when none qualify
pub fn available_next_month(rows: &[RawRow], city: City, limit: usize) -> Vec<NormalizedProperty> {
    let available: Vec<&RawRow> = rows.iter().filter(|row| has_availability(row)).collect();

    let pool = if available.is_empty() {
        rows.iter().collect()
    } else {
        available
    };

    pool.into_iter()
        .take(limit)
        .map(|row| normalize(row, city))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CitySummary {
    pub key: &'static str,
    pub name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

/// Supported cities, optionally with live row counts. Each city loads on its
/// own; one that fails reports 0 instead of failing the rest.
pub async fn city_summaries(cache: &DatasetCache, with_counts: bool) -> Vec<CitySummary> {
    if !with_counts {
        return City::ALL
            .into_iter()
            .map(|city| CitySummary {
                key: city.key(),
                name: city.label(),
                count: None,
            })
            .collect();
    }

    let counts = join_all(City::ALL.into_iter().map(|city| async move {
        match cache.get(city).await {
            Ok(rows) => rows.len(),
            Err(e) => {
                warn!("Row count for {} unavailable: {}", city, e);
                0
            }
        }
    }))
    .await;

    City::ALL
        .into_iter()
        .zip(counts)
        .map(|(city, count)| CitySummary {
            key: city.key(),
            name: city.label(),
            count: Some(count),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::testing::{FakeSource, ManualClock};
    use crate::cache::DEFAULT_TTL;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs.iter().copied().collect()
    }

    fn ids(items: &[NormalizedProperty]) -> Vec<&str> {
        items.iter().map(|p| p.id.as_str()).collect()
    }

    fn priced_rows() -> Vec<RawRow> {
        vec![
            row(&[("id", "cheap"), ("price", "$50.00"), ("accommodates", "2")]),
            row(&[("id", "mid"), ("price", "$150.00"), ("accommodates", "4")]),
            row(&[("id", "pricey"), ("price", "$300.00"), ("accommodates", "6")]),
        ]
    }

    #[test]
    fn test_price_range_filter() {
        let filter = ListingFilter {
            price_min: Some(100.0),
            price_max: Some(200.0),
            ..Default::default()
        };

        let page = list(&priced_rows(), City::Austin, &filter, 0, 0);

        assert_eq!(page.total, 1);
        assert_eq!(ids(&page.items), vec!["mid"]);
    }

    #[test]
    fn test_unpriced_rows_survive_price_filter() {
        let mut rows = priced_rows();
        rows.push(row(&[("id", "unknown"), ("price", "")]));
        let filter = ListingFilter {
            price_max: Some(100.0),
            ..Default::default()
        };

        let page = list(&rows, City::Austin, &filter, 0, 0);

        assert_eq!(ids(&page.items), vec!["cheap", "unknown"]);
    }

    #[test]
    fn test_min_guests_filter() {
        let mut rows = priced_rows();
        rows.push(row(&[("id", "no-capacity")]));
        let filter = ListingFilter {
            min_guests: Some(4),
            ..Default::default()
        };

        let page = list(&rows, City::Austin, &filter, 0, 0);

        assert_eq!(ids(&page.items), vec!["mid", "pricey"]);
    }

    #[test]
    fn test_text_filters_ignore_case() {
        let rows = vec![
            row(&[
                ("id", "1"),
                ("neighbourhood_cleansed", "South Lamar"),
                ("room_type", "Entire home/apt"),
            ]),
            row(&[
                ("id", "2"),
                ("neighbourhood_cleansed", "East Austin"),
                ("room_type", "Private room"),
            ]),
            row(&[
                ("id", "3"),
                ("neighbourhood", "South Congress"),
                ("room_type", "Private room"),
            ]),
        ];

        let filter = ListingFilter {
            neighbourhood: Some("south".to_string()),
            room_type: Some("PRIVATE".to_string()),
            ..Default::default()
        };
        let page = list(&rows, City::Austin, &filter, 0, 0);

        assert_eq!(ids(&page.items), vec!["3"]);
    }

    #[test]
    fn test_pagination() {
        let rows: Vec<RawRow> = (1..=5).map(|i| row(&[("id", i.to_string().as_str())])).collect();
        let all = ListingFilter::default();

        let page = list(&rows, City::Boston, &all, 1, 2);
        assert_eq!(page.total, 5);
        assert_eq!(ids(&page.items), vec!["2", "3"]);

        let page = list(&rows, City::Boston, &all, 3, 0);
        assert_eq!(ids(&page.items), vec!["4", "5"]);

        let page = list(&rows, City::Boston, &all, 5, 10);
        assert_eq!(page.total, 5);
        assert!(page.items.is_empty());

        let page = list(&rows, City::Boston, &all, 99, 0);
        assert_eq!(page.total, 5);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_find_by_id() {
        let rows = vec![
            row(&[("id", "a1"), ("name", "First")]),
            row(&[("listing_id", "a2"), ("name", "Second")]),
        ];

        assert_eq!(find_by_id(&rows, City::Austin, "a2").unwrap().name, "Second");
        assert!(find_by_id(&rows, City::Austin, "zzz").is_none());
    }

    #[test]
    fn test_popular_orders_by_rating_then_reviews() {
        let rows = vec![
            row(&[("id", "low"), ("review_scores_rating", "80"), ("number_of_reviews", "500")]),
            row(&[("id", "few"), ("review_scores_rating", "90"), ("number_of_reviews", "10")]),
            row(&[("id", "unrated")]),
            row(&[("id", "many"), ("review_scores_rating", "90"), ("number_of_reviews", "50")]),
        ];

        let top = popular(&rows, City::Dallas, 12);
        assert_eq!(ids(&top), vec!["many", "few", "low", "unrated"]);

        let top = popular(&rows, City::Dallas, 2);
        assert_eq!(ids(&top), vec!["many", "few"]);
    }

    #[test]
    fn test_next_month_filters_on_availability() {
        let rows = vec![
            row(&[("id", "booked"), ("availability_30", "0"), ("availability_365", "0")]),
            row(&[("id", "open"), ("availability_30", "0"), ("availability_90", "12")]),
            row(&[("id", "garbage"), ("availability_30", "soon")]),
            row(&[("id", "yearly"), ("availability_365", "200")]),
        ];

        let items = available_next_month(&rows, City::Chicago, 12);
        assert_eq!(ids(&items), vec!["open", "yearly"]);

        let items = available_next_month(&rows, City::Chicago, 1);
        assert_eq!(ids(&items), vec!["open"]);
    }

    #[test]
    fn test_next_month_falls_back_to_all_rows() {
        let rows = vec![
            row(&[("id", "a"), ("availability_30", "0")]),
            row(&[("id", "b")]),
            row(&[("id", "c")]),
        ];

        let items = available_next_month(&rows, City::Chicago, 2);
        assert_eq!(ids(&items), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_city_summaries() {
        let source = Arc::new(FakeSource::new(HashMap::from([
            (City::Austin, vec![row(&[("id", "a1")]), row(&[("id", "a2")])]),
            (City::Boston, vec![row(&[("id", "b1")])]),
        ])));
        source.fail(City::Dallas);
        let cache = DatasetCache::new(source.clone(), Arc::new(ManualClock::new()), DEFAULT_TTL);

        let plain = city_summaries(&cache, false).await;
        assert_eq!(plain.len(), City::ALL.len());
        assert!(plain.iter().all(|c| c.count.is_none()));
        assert_eq!(source.calls(), 0);

        let counted = city_summaries(&cache, true).await;
        let count_of = |key: &str| counted.iter().find(|c| c.key == key).unwrap().count;

        assert_eq!(count_of("austin"), Some(2));
        assert_eq!(count_of("boston"), Some(1));
        assert_eq!(count_of("dallas"), Some(0));
        assert_eq!(counted[0].name, "Asheville, NC");
    }
}
