//! Two-collection comparison: shared and unique albums, shared artists and
//! genres, and a Jaccard taste-similarity score.
use std::collections::HashSet;

use tracing::debug;

use crate::analytics::{decade_of, strip_disambiguation};
use crate::models::{CatalogItem, ComparisonResult, GenreOverlap};
use crate::tally::Tally;

const UNIQUE_LIST_LIMIT: usize = 20;
const SHARED_ARTISTS_LIMIT: usize = 10;
const GENRE_OVERLAP_LIMIT: usize = 10;

/// Identity of the album an item is a copy of.
///
/// Alternate pressings share a master id; items without one fall back to
/// their normalized primary artist and title.
pub fn album_key(item: &CatalogItem) -> String {
    let info = &item.release;
    if let Some(master_id) = info.master_id.filter(|&id| id != 0) {
        return format!("master:{}", master_id);
    }
    let title = info.title.to_lowercase();
    let artist = info
        .primary_artist()
        .map(|a| strip_disambiguation(&a.name.to_lowercase()).trim().to_string())
        .unwrap_or_default();
    format!("title:{}:{}", artist, title.trim())
}

/// Album keys in first-seen order, each mapped to the first copy seen.
struct AlbumIndex<'a> {
    albums: Vec<(String, &'a CatalogItem)>,
    keys: HashSet<String>,
}

impl<'a> AlbumIndex<'a> {
    fn build(items: &'a [CatalogItem]) -> Self {
        let mut index = AlbumIndex {
            albums: Vec::new(),
            keys: HashSet::new(),
        };
        for item in items {
            let key = album_key(item);
            if index.keys.insert(key.clone()) {
                index.albums.push((key, item));
            }
        }
        index
    }

    fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    fn len(&self) -> usize {
        self.albums.len()
    }
}

fn genre_counts(items: &[CatalogItem]) -> Tally<String> {
    items
        .iter()
        .flat_map(|i| i.release.genres.iter().cloned())
        .collect()
}

fn decade_counts(items: &[CatalogItem]) -> Tally<i32> {
    items
        .iter()
        .filter_map(|i| decade_of(i.release.year))
        .collect()
}

/// Raw artist names, first-seen order, no disambiguation stripping.
fn artist_names(items: &[CatalogItem]) -> Vec<&str> {
    let mut seen = HashSet::new();
    items
        .iter()
        .flat_map(|i| i.release.artists.iter())
        .map(|a| a.name.as_str())
        .filter(|name| seen.insert(*name))
        .collect()
}

fn similarity_percent(shared: usize, union: usize) -> u32 {
    if union == 0 {
        return 0;
    }
    (shared as f64 / union as f64 * 100.0).round() as u32
}

/// Compares two collections. Both inputs are already fetched; this never
/// fails and never performs I/O.
pub fn compare(items_a: &[CatalogItem], items_b: &[CatalogItem]) -> ComparisonResult {
    debug!(a = items_a.len(), b = items_b.len(), "comparing collections");

    let index_a = AlbumIndex::build(items_a);
    let index_b = AlbumIndex::build(items_b);

    let mut overlap = Vec::new();
    let mut unique_to_a = Vec::new();
    for (key, item) in &index_a.albums {
        if index_b.contains(key) {
            overlap.push((*item).clone());
        } else {
            unique_to_a.push((*item).clone());
        }
    }
    let mut unique_to_b: Vec<CatalogItem> = index_b
        .albums
        .iter()
        .filter(|(key, _)| !index_a.contains(key))
        .map(|(_, item)| (*item).clone())
        .collect();

    let overlap_count = overlap.len();
    let unique_to_a_count = unique_to_a.len();
    let unique_to_b_count = unique_to_b.len();
    let union = index_a.len() + index_b.len() - overlap_count;
    unique_to_a.truncate(UNIQUE_LIST_LIMIT);
    unique_to_b.truncate(UNIQUE_LIST_LIMIT);

    let names_b: HashSet<&str> = artist_names(items_b).into_iter().collect();
    let mut shared_artists: Vec<String> = artist_names(items_a)
        .into_iter()
        .filter(|name| names_b.contains(name))
        .map(str::to_string)
        .collect();
    let shared_artists_count = shared_artists.len();
    shared_artists.truncate(SHARED_ARTISTS_LIMIT);

    let genres_a = genre_counts(items_a);
    let genres_b = genre_counts(items_b);
    let shared_genres: Vec<String> = genres_a
        .keys()
        .filter(|g| genres_b.contains(g.as_str()))
        .cloned()
        .collect();

    let mut genre_overlap: Vec<GenreOverlap> = genres_a
        .keys()
        .chain(genres_b.keys().filter(|g| !genres_a.contains(g.as_str())))
        .map(|g| GenreOverlap {
            name: g.clone(),
            count_a: genres_a.get(g.as_str()),
            count_b: genres_b.get(g.as_str()),
        })
        .collect();
    genre_overlap.sort_by(|x, y| y.combined().cmp(&x.combined()));
    genre_overlap.truncate(GENRE_OVERLAP_LIMIT);

    ComparisonResult {
        overlap,
        unique_to_a,
        unique_to_b,
        overlap_count,
        unique_to_a_count,
        unique_to_b_count,
        total_a: items_a.len(),
        total_b: items_b.len(),
        similarity_score: similarity_percent(overlap_count, union),
        shared_artists,
        shared_artists_count,
        shared_genres,
        genre_overlap,
        decades_a: decade_counts(items_a),
        decades_b: decade_counts(items_b),
        genres_a,
        genres_b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::tests::make_item;
    use crate::models::ArtistRef;

    fn with_master(mut item: CatalogItem, master_id: i64) -> CatalogItem {
        item.release.master_id = Some(master_id);
        item
    }

    fn with_genres(mut item: CatalogItem, genres: &[&str]) -> CatalogItem {
        item.release.genres = genres.iter().map(|g| g.to_string()).collect();
        item
    }

    #[test]
    fn album_key_prefers_master_id() {
        let item = with_master(make_item(1, "Low", "David Bowie", 1977), 7);
        assert_eq!(album_key(&item), "master:7");
    }

    #[test]
    fn album_key_falls_back_to_artist_and_title() {
        let item = make_item(1, "  Bleach ", "Nirvana (2)", 1989);
        assert_eq!(album_key(&item), "title:nirvana:bleach");

        let zero_master = with_master(make_item(2, "Bleach", "NIRVANA", 1989), 0);
        assert_eq!(album_key(&zero_master), "title:nirvana:bleach");

        let mut no_artist = make_item(3, "Untitled", "X", 0);
        no_artist.release.artists.clear();
        assert_eq!(album_key(&no_artist), "title::untitled");
    }

    #[test]
    fn pressings_of_one_master_overlap() {
        let a = vec![with_master(make_item(10, "Low", "David Bowie", 1977), 7)];
        let b = vec![with_master(make_item(20, "Low (2017 Remaster)", "David Bowie", 2017), 7)];
        let result = compare(&a, &b);
        assert_eq!(result.overlap_count, 1);
        assert_eq!(result.overlap[0].id, 10);
        assert_eq!(result.similarity_score, 100);
    }

    #[test]
    fn title_fallback_overlaps() {
        let a = vec![make_item(1, "Bleach", "Nirvana (2)", 1989)];
        let b = vec![make_item(2, "bleach ", "Nirvana", 1989)];
        let result = compare(&a, &b);
        assert_eq!(result.overlap_count, 1);
        assert_eq!(result.unique_to_a_count, 0);
        assert_eq!(result.unique_to_b_count, 0);
    }

    #[test]
    fn jaccard_over_album_keys() {
        let a = vec![
            with_master(make_item(1, "a", "X", 2000), 1),
            with_master(make_item(2, "b", "X", 2000), 2),
            with_master(make_item(3, "c", "X", 2000), 3),
        ];
        let b = vec![
            with_master(make_item(4, "b", "X", 2000), 2),
            with_master(make_item(5, "c", "X", 2000), 3),
            with_master(make_item(6, "d", "X", 2000), 4),
        ];
        let result = compare(&a, &b);
        assert_eq!(result.overlap_count, 2);
        assert_eq!(result.unique_to_a_count, 1);
        assert_eq!(result.unique_to_b_count, 1);
        assert_eq!(result.similarity_score, 50);
    }

    #[test]
    fn duplicate_pressings_count_once() {
        let a = vec![
            with_master(make_item(1, "a", "X", 2000), 1),
            with_master(make_item(2, "a (reissue)", "X", 2010), 1),
        ];
        let b = vec![with_master(make_item(3, "a", "X", 2000), 1)];
        let result = compare(&a, &b);
        assert_eq!(result.overlap.len(), 1);
        assert_eq!(result.overlap[0].id, 1);
        assert_eq!(result.total_a, 2);
        assert_eq!(result.similarity_score, 100);
    }

    #[test]
    fn empty_side_scores_zero() {
        let a = vec![make_item(1, "a", "X", 2000)];
        let result = compare(&a, &[]);
        assert_eq!(result.similarity_score, 0);
        assert_eq!(result.overlap_count, 0);
        assert_eq!(result.unique_to_a_count, 1);

        let both_empty = compare(&[], &[]);
        assert_eq!(both_empty.similarity_score, 0);
        assert_eq!(both_empty, ComparisonResult::default());
    }

    #[test]
    fn unique_lists_are_capped_but_counts_are_not() {
        let a: Vec<_> = (0..30).map(|i| with_master(make_item(i, "a", "X", 2000), i + 1)).collect();
        let b: Vec<_> = (100..125).map(|i| with_master(make_item(i, "b", "Y", 2000), i + 1)).collect();
        let result = compare(&a, &b);
        assert_eq!(result.unique_to_a.len(), 20);
        assert_eq!(result.unique_to_b.len(), 20);
        assert_eq!(result.unique_to_a_count, 30);
        assert_eq!(result.unique_to_b_count, 25);
        assert_eq!(result.similarity_score, 0);
    }

    #[test]
    fn shared_artists_use_raw_names() {
        let mut a1 = make_item(1, "a", "Nirvana (2)", 2000);
        a1.release.artists.push(ArtistRef { id: 9, name: "Guest".to_string() });
        let a = vec![a1, make_item(2, "b", "Portishead", 2000)];
        let b = vec![
            make_item(3, "c", "Nirvana", 2000),
            make_item(4, "d", "Portishead", 2000),
            make_item(5, "e", "Guest", 2000),
        ];
        let result = compare(&a, &b);
        assert_eq!(result.shared_artists, vec!["Guest", "Portishead"]);
        assert_eq!(result.shared_artists_count, 2);
    }

    #[test]
    fn genre_overlap_ranks_by_combined_count() {
        let a = vec![
            with_genres(make_item(1, "a", "X", 1975), &["Jazz", "Rock"]),
            with_genres(make_item(2, "b", "X", 1982), &["Rock"]),
        ];
        let b = vec![
            with_genres(make_item(3, "c", "Y", 1991), &["Electronic", "Rock"]),
            with_genres(make_item(4, "d", "Y", 0), &["Electronic", "Jazz"]),
        ];
        let result = compare(&a, &b);
        assert_eq!(result.genres_a.get("Rock"), 2);
        assert_eq!(result.genres_b.get("Electronic"), 2);
        assert_eq!(result.shared_genres, vec!["Jazz", "Rock"]);

        let ranked: Vec<_> = result
            .genre_overlap
            .iter()
            .map(|g| (g.name.as_str(), g.count_a, g.count_b))
            .collect();
        assert_eq!(
            ranked,
            vec![("Rock", 2, 1), ("Jazz", 1, 1), ("Electronic", 0, 2)]
        );

        assert_eq!(result.decades_a.get(&1970), 1);
        assert_eq!(result.decades_a.get(&1980), 1);
        assert_eq!(result.decades_b.len(), 1);
        assert_eq!(result.decades_b.get(&1990), 1);
    }
}
