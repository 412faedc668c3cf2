//! Collection analytics: breakdowns, rankings and summary figures over a
//! user's catalog items.
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::models::{CatalogItem, CollectionStats, Format, MonthCount, NameCount, ReleaseInfo};
use crate::tally::Tally;

/// Label name the catalog uses for self-released items.
pub const NOT_ON_LABEL: &str = "Not On Label";

const TOP_LIST_LIMIT: usize = 20;
const RECENTLY_ADDED_LIMIT: usize = 12;
const TIMELINE_MONTHS: usize = 12;
const TOP_RATED_LIMIT: usize = 12;
const TOP_RATED_MIN_RATING: u8 = 4;
const DETAIL_DESCRIPTIONS: usize = 2;

static DISAMBIGUATION_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\(\d+\)$").expect("disambiguation pattern is valid"));

/// Drops a trailing `" (<digits>)"` disambiguation suffix, so that
/// `"Nirvana (2)"` and `"Nirvana"` count as one artist.
pub fn strip_disambiguation(name: &str) -> &str {
    match DISAMBIGUATION_SUFFIX.find(name) {
        Some(m) => &name[..m.start()],
        None => name,
    }
}

/// Whether a label name names an actual label (not blank, not the
/// "Not On Label" placeholder).
pub fn is_real_label(name: &str) -> bool {
    !name.is_empty() && name != NOT_ON_LABEL
}

/// `floor(year / 10) * 10`, or `None` for an unknown year.
pub fn decade_of(year: i32) -> Option<i32> {
    (year > 0).then(|| year.div_euclid(10) * 10)
}

/// `"Vinyl (LP, Album)"` from the first two descriptions, or the bare name.
pub fn format_detail_key(format: &Format) -> String {
    if format.descriptions.is_empty() {
        return format.name.clone();
    }
    let end = format.descriptions.len().min(DETAIL_DESCRIPTIONS);
    format!("{} ({})", format.name, format.descriptions[..end].join(", "))
}

fn month_key(item: &CatalogItem) -> String {
    item.date_added.format("%Y-%m").to_string()
}

fn get_top_items(counts: &Tally<String>, n: usize) -> Vec<NameCount> {
    counts
        .top(n)
        .into_iter()
        .map(|(name, count)| NameCount { name, count })
        .collect()
}

/// Computes the full stats view of a collection.
///
/// Expects `items` newest-first (the order the catalog lists them in) for
/// `recently_added`. Never fails; an empty slice yields zeroed stats.
pub fn compute_stats(items: &[CatalogItem]) -> CollectionStats {
    debug!(items = items.len(), "computing collection stats");

    let mut formats = Tally::new();
    let mut format_details = Tally::new();
    let mut genres = Tally::new();
    let mut styles = Tally::new();
    let mut decades = Tally::new();
    let mut year_counts = Tally::new();
    let mut artists: Tally<String> = Tally::new();
    let mut labels = Tally::new();
    let mut months: Tally<String> = Tally::new();
    let mut ratings = Tally::new();

    let mut years: Vec<i32> = Vec::new();
    let mut oldest: Option<&ReleaseInfo> = None;
    let mut newest: Option<&ReleaseInfo> = None;
    let mut rating_sum: u64 = 0;
    let mut rated_count: usize = 0;

    for item in items {
        let info = &item.release;

        months.add(month_key(item));

        for format in &info.formats {
            formats.add(format.name.clone());
            format_details.add(format_detail_key(format));
        }

        for genre in &info.genres {
            genres.add(genre.clone());
        }
        for style in &info.styles {
            styles.add(style.clone());
        }

        if let Some(decade) = decade_of(info.year) {
            decades.add(decade);
            year_counts.add(info.year);
            years.push(info.year);

            // Strict comparisons: the first release seen at an extreme year wins.
            if oldest.map_or(true, |o| info.year < o.year) {
                oldest = Some(info);
            }
            if newest.map_or(true, |n| info.year > n.year) {
                newest = Some(info);
            }
        }

        for artist in &info.artists {
            artists.add(strip_disambiguation(&artist.name).to_string());
        }

        for label in &info.labels {
            if is_real_label(&label.name) {
                labels.add(label.name.clone());
            }
        }

        if item.rating > 0 {
            ratings.add(item.rating);
            rating_sum += u64::from(item.rating);
            rated_count += 1;
        }
    }

    let mut added_by_month: Vec<MonthCount> = months
        .iter()
        .map(|(date, count)| MonthCount { date: date.clone(), count })
        .collect();
    added_by_month.sort_by(|a, b| a.date.cmp(&b.date));
    let added_by_month =
        added_by_month.split_off(added_by_month.len().saturating_sub(TIMELINE_MONTHS));

    years.sort_unstable();
    let median_year = years.get(years.len() / 2).copied().unwrap_or(0);
    let average_year = if years.is_empty() {
        0
    } else {
        let sum: i64 = years.iter().map(|&y| i64::from(y)).sum();
        (sum as f64 / years.len() as f64).round() as i32
    };

    let collection_span = match (oldest, newest) {
        (Some(o), Some(n)) => n.year - o.year,
        _ => 0,
    };

    let unique_artist_ratio = if items.is_empty() {
        0.0
    } else {
        artists.len() as f64 / items.len() as f64
    };

    let average_rating = if rated_count > 0 {
        rating_sum as f64 / rated_count as f64
    } else {
        0.0
    };

    let mut top_rated_items: Vec<CatalogItem> = items
        .iter()
        .filter(|i| i.rating >= TOP_RATED_MIN_RATING)
        .cloned()
        .collect();
    top_rated_items.sort_by(|a, b| {
        b.rating
            .cmp(&a.rating)
            .then_with(|| a.release.title.cmp(&b.release.title))
    });
    top_rated_items.truncate(TOP_RATED_LIMIT);

    CollectionStats {
        total_items: items.len(),
        total_artists: artists.len(),
        total_labels: labels.len(),
        top_artists: get_top_items(&artists, TOP_LIST_LIMIT),
        top_labels: get_top_items(&labels, TOP_LIST_LIMIT),
        top_styles: get_top_items(&styles, TOP_LIST_LIMIT),
        recently_added: items.iter().take(RECENTLY_ADDED_LIMIT).cloned().collect(),
        added_by_month,
        oldest_release: oldest.cloned(),
        newest_release: newest.cloned(),
        average_year,
        median_year,
        unique_artist_ratio,
        collection_span,
        dominant_decade: decades.leader().map(|d| format!("{}s", d)).unwrap_or_default(),
        dominant_genre: genres.leader().cloned().unwrap_or_default(),
        format_breakdown: formats,
        format_detail_breakdown: format_details,
        genre_breakdown: genres,
        style_breakdown: styles,
        decade_breakdown: decades,
        year_breakdown: year_counts,
        rating_breakdown: ratings,
        average_rating,
        rated_count,
        top_rated_items,
    }
}
