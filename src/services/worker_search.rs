//! Directory filtering over pre-joined worker listings.
//!
//! Kept free of database access so the predicate rules can be tested directly.

use crate::entities::TradeCategory;
use crate::models::{ReviewResponse, WorkerCard, WorkerDetail, WorkerFilter, WorkerListing};

/// Normalised form of a filter value. `None` when the predicate is disabled.
fn active_term(value: Option<&str>) -> Option<String> {
    let term = value?.trim();
    if term.is_empty() || term.eq_ignore_ascii_case("all") {
        None
    } else {
        Some(term.to_lowercase())
    }
}

/// Distinct categories of the listing's services, in first-seen order.
pub fn categories_of(listing: &WorkerListing) -> Vec<TradeCategory> {
    let mut categories = Vec::new();
    for service in &listing.services {
        if !categories.contains(&service.category) {
            categories.push(service.category);
        }
    }
    categories
}

/// Mean rating rounded to one decimal, 0 when there are no reviews.
pub fn average_rating(reviews: &[ReviewResponse]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    let sum: i64 = reviews.iter().map(|r| i64::from(r.rating)).sum();
    let mean = sum as f64 / reviews.len() as f64;
    (mean * 10.0).round() / 10.0
}

fn contains_ci(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(needle))
}

pub fn matches_text(listing: &WorkerListing, term: &str) -> bool {
    let portfolio = &listing.portfolio;
    contains_ci(Some(&portfolio.business_name), term)
        || contains_ci(portfolio.description.as_deref(), term)
        || contains_ci(portfolio.location.as_deref(), term)
        || listing.services.iter().any(|s| {
            s.name.to_lowercase().contains(term) || s.category.as_str().contains(term)
        })
}

pub fn matches_category(listing: &WorkerListing, category: &str) -> bool {
    categories_of(listing)
        .iter()
        .any(|c| c.as_str().eq_ignore_ascii_case(category))
}

/// Either side may contain the other, so "Dublin 4" matches "dublin" and vice versa.
pub fn matches_location(listing: &WorkerListing, location: &str) -> bool {
    let overlaps = |candidate: &str| {
        let candidate = candidate.to_lowercase();
        !candidate.is_empty() && (candidate.contains(location) || location.contains(&candidate))
    };

    listing.portfolio.location.as_deref().is_some_and(overlaps)
        || listing.secondary_locations.iter().any(|l| overlaps(l))
}

pub fn matches_filter(listing: &WorkerListing, filter: &WorkerFilter) -> bool {
    if let Some(term) = active_term(filter.search.as_deref())
        && !matches_text(listing, &term)
    {
        return false;
    }
    if let Some(category) = active_term(filter.category.as_deref())
        && !matches_category(listing, &category)
    {
        return false;
    }
    if let Some(location) = active_term(filter.location.as_deref())
        && !matches_location(listing, &location)
    {
        return false;
    }
    true
}

/// Keeps the listings satisfying every active predicate, preserving input order.
pub fn filter_listings(listings: Vec<WorkerListing>, filter: &WorkerFilter) -> Vec<WorkerListing> {
    listings
        .into_iter()
        .filter(|listing| matches_filter(listing, filter))
        .collect()
}

impl From<WorkerListing> for WorkerCard {
    fn from(listing: WorkerListing) -> Self {
        Self {
            categories: categories_of(&listing),
            average_rating: average_rating(&listing.reviews),
            review_count: listing.reviews.len(),
            portfolio: listing.portfolio,
            services: listing.services,
            secondary_locations: listing.secondary_locations,
        }
    }
}

impl From<WorkerListing> for WorkerDetail {
    fn from(listing: WorkerListing) -> Self {
        let reviews = listing.reviews.clone();
        Self {
            card: WorkerCard::from(listing),
            reviews,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::PortfolioStatus;
    use crate::models::{PortfolioResponse, WorkerServiceResponse};
    use chrono::Utc;

    fn listing(
        name: &str,
        category: TradeCategory,
        location: &str,
        ratings: &[i32],
        secondary: &[&str],
    ) -> WorkerListing {
        let id = name.to_lowercase().replace(' ', "-");
        WorkerListing {
            portfolio: PortfolioResponse {
                id: id.clone(),
                user_id: format!("user-{id}"),
                business_name: name.to_string(),
                email: None,
                phone: None,
                location: Some(location.to_string()),
                description: Some(format!("{name} serving {location}")),
                years_experience: Some(5),
                hourly_rate: Some(40.0),
                status: PortfolioStatus::Active,
                is_verified: false,
                is_featured: false,
                created_at: Utc::now(),
            },
            services: vec![WorkerServiceResponse {
                id: format!("svc-{id}"),
                portfolio_id: id.clone(),
                name: format!("{} work", category.as_str()),
                description: None,
                category,
                price_from: None,
                price_to: None,
            }],
            reviews: ratings
                .iter()
                .enumerate()
                .map(|(i, rating)| ReviewResponse {
                    id: format!("rev-{id}-{i}"),
                    portfolio_id: id.clone(),
                    customer_id: format!("customer-{i}"),
                    customer_name: None,
                    rating: *rating,
                    comment: None,
                    created_at: Utc::now(),
                })
                .collect(),
            secondary_locations: secondary.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn directory() -> Vec<WorkerListing> {
        vec![
            listing("Ace Plumbing", TradeCategory::Plumbing, "Dublin", &[5, 4], &[]),
            listing("Bright Electric", TradeCategory::Electrical, "Cork", &[], &[]),
        ]
    }

    fn filter(search: Option<&str>, category: Option<&str>, location: Option<&str>) -> WorkerFilter {
        WorkerFilter {
            search: search.map(String::from),
            category: category.map(String::from),
            location: location.map(String::from),
        }
    }

    fn names(listings: &[WorkerListing]) -> Vec<&str> {
        listings
            .iter()
            .map(|l| l.portfolio.business_name.as_str())
            .collect()
    }

    #[test]
    fn test_category_filter_returns_rated_plumber() {
        let result = filter_listings(directory(), &filter(None, Some("plumbing"), None));
        assert_eq!(names(&result), vec!["Ace Plumbing"]);
        let card = WorkerCard::from(result[0].clone());
        assert_eq!(card.average_rating, 4.5);
        assert_eq!(card.review_count, 2);
        assert_eq!(card.categories, vec![TradeCategory::Plumbing]);
    }

    #[test]
    fn test_location_filter_returns_unrated_electrician() {
        let result = filter_listings(directory(), &filter(None, None, Some("cork")));
        assert_eq!(names(&result), vec!["Bright Electric"]);
        assert_eq!(WorkerCard::from(result[0].clone()).average_rating, 0.0);
    }

    #[test]
    fn test_blank_and_all_disable_predicates() {
        let result = filter_listings(directory(), &filter(Some("  "), Some("All"), Some("")));
        assert_eq!(names(&result), vec!["Ace Plumbing", "Bright Electric"]);
        let result = filter_listings(directory(), &WorkerFilter::default());
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_text_search_covers_services_and_categories() {
        let by_category = filter_listings(directory(), &filter(Some("ELECTRICAL"), None, None));
        assert_eq!(names(&by_category), vec!["Bright Electric"]);

        let by_service = filter_listings(directory(), &filter(Some("plumbing work"), None, None));
        assert_eq!(names(&by_service), vec!["Ace Plumbing"]);

        let by_description = filter_listings(directory(), &filter(Some("serving dublin"), None, None));
        assert_eq!(names(&by_description), vec!["Ace Plumbing"]);

        let none = filter_listings(directory(), &filter(Some("roofing"), None, None));
        assert!(none.is_empty());
    }

    #[test]
    fn test_location_matches_in_either_direction_and_secondary() {
        let workers = vec![
            listing("Ace Plumbing", TradeCategory::Plumbing, "Dublin 4", &[], &["Wicklow"]),
            listing("Bright Electric", TradeCategory::Electrical, "Cork", &[], &[]),
        ];
        let shorter = filter_listings(workers.clone(), &filter(None, None, Some("dublin")));
        assert_eq!(names(&shorter), vec!["Ace Plumbing"]);

        let longer = filter_listings(workers.clone(), &filter(None, None, Some("Cork City")));
        assert_eq!(names(&longer), vec!["Bright Electric"]);

        let secondary = filter_listings(workers, &filter(None, None, Some("wicklow")));
        assert_eq!(names(&secondary), vec!["Ace Plumbing"]);
    }

    #[test]
    fn test_predicates_intersect() {
        let workers = directory();
        for search in [None, Some("ace"), Some("bright")] {
            for category in [None, Some("plumbing"), Some("electrical")] {
                for location in [None, Some("dublin"), Some("cork")] {
                    let f = filter(search, category, location);
                    let result = filter_listings(workers.clone(), &f);
                    for worker in &workers {
                        let expected = search.is_none_or(|s| matches_text(worker, s))
                            && category.is_none_or(|c| matches_category(worker, c))
                            && location.is_none_or(|l| matches_location(worker, l));
                        let present = result
                            .iter()
                            .any(|r| r.portfolio.id == worker.portfolio.id);
                        assert_eq!(expected, present, "{f:?} on {}", worker.portfolio.id);
                    }
                }
            }
        }
    }

    #[test]
    fn test_average_rating_rounding() {
        let worker = listing("Ace Plumbing", TradeCategory::Plumbing, "Dublin", &[5, 4, 4], &[]);
        assert_eq!(average_rating(&worker.reviews), 4.3);
        assert_eq!(average_rating(&[]), 0.0);
    }

    #[test]
    fn test_detail_keeps_reviews() {
        let worker = listing("Ace Plumbing", TradeCategory::Plumbing, "Dublin", &[3], &[]);
        let detail = WorkerDetail::from(worker);
        assert_eq!(detail.reviews.len(), 1);
        assert_eq!(detail.card.average_rating, 3.0);
    }
}
