use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::tally::Tally;

/// Treats an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// Catalog wire models

/// One owned copy of a release, as listed in a user's collection.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct CatalogItem {
    /// Release id.
    pub id: i64,
    /// Identifies this physical copy; two copies of one release share `id`.
    pub instance_id: i64,
    #[serde(default)]
    pub folder_id: i64,
    /// 0 means unrated, otherwise 1-5.
    #[serde(default, deserialize_with = "null_as_default")]
    pub rating: u8,
    pub date_added: DateTime<Utc>,
    #[serde(rename = "basic_information")]
    pub release: ReleaseInfo,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Default)]
pub struct ReleaseInfo {
    pub id: i64,
    /// Canonical album shared by alternate pressings. 0 is treated as absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_id: Option<i64>,
    pub title: String,
    /// 0 means unknown.
    #[serde(default, deserialize_with = "null_as_default")]
    pub year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumb: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub artists: Vec<ArtistRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: Vec<LabelRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub formats: Vec<Format>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genres: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub styles: Vec<String>,
}

impl ReleaseInfo {
    pub fn primary_artist(&self) -> Option<&ArtistRef> {
        self.artists.first()
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ArtistRef {
    pub id: i64,
    pub name: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct LabelRef {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catno: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Format {
    pub name: String,
    #[serde(rename = "qty", default)]
    pub quantity: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub descriptions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Default)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub num_collection: u32,
    #[serde(default)]
    pub num_wantlist: u32,
}

// Derived views

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct NameCount {
    pub name: String,
    pub count: usize,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct MonthCount {
    /// `YYYY-MM`
    pub date: String,
    pub count: usize,
}

/// Single-collection analytics. Recomputed from the raw items on every call.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CollectionStats {
    pub total_items: usize,
    pub total_artists: usize,
    pub total_labels: usize,
    pub format_breakdown: Tally<String>,
    pub format_detail_breakdown: Tally<String>,
    pub genre_breakdown: Tally<String>,
    pub style_breakdown: Tally<String>,
    pub decade_breakdown: Tally<i32>,
    pub year_breakdown: Tally<i32>,
    pub top_artists: Vec<NameCount>,
    pub top_labels: Vec<NameCount>,
    pub top_styles: Vec<NameCount>,
    pub recently_added: Vec<CatalogItem>,
    pub added_by_month: Vec<MonthCount>,
    pub oldest_release: Option<ReleaseInfo>,
    pub newest_release: Option<ReleaseInfo>,
    pub average_year: i32,
    pub median_year: i32,
    pub unique_artist_ratio: f64,
    pub collection_span: i32,
    /// e.g. `"1970s"`, empty when no item carries a year.
    pub dominant_decade: String,
    pub dominant_genre: String,
    pub rating_breakdown: Tally<u8>,
    pub average_rating: f64,
    pub rated_count: usize,
    pub top_rated_items: Vec<CatalogItem>,
}

/// A collection together with its profile and precomputed stats; this is the
/// payload the collection cache stores per owner.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserCollection {
    pub profile: UserProfile,
    pub items: Vec<CatalogItem>,
    pub stats: CollectionStats,
    /// Epoch milliseconds.
    pub fetched_at: i64,
}

impl UserCollection {
    pub fn new(profile: UserProfile, items: Vec<CatalogItem>, fetched_at: DateTime<Utc>) -> Self {
        let stats = crate::analytics::compute_stats(&items);
        Self {
            profile,
            items,
            stats,
            fetched_at: fetched_at.timestamp_millis(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GenreOverlap {
    pub name: String,
    pub count_a: usize,
    pub count_b: usize,
}

impl GenreOverlap {
    pub fn combined(&self) -> usize {
        self.count_a + self.count_b
    }
}

/// Two-collection comparison keyed on album identity.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    /// Side A's representative copy of every shared album.
    pub overlap: Vec<CatalogItem>,
    pub unique_to_a: Vec<CatalogItem>,
    pub unique_to_b: Vec<CatalogItem>,
    pub overlap_count: usize,
    pub unique_to_a_count: usize,
    pub unique_to_b_count: usize,
    pub total_a: usize,
    pub total_b: usize,
    /// Jaccard index over album keys, as a rounded percentage.
    pub similarity_score: u32,
    pub shared_artists: Vec<String>,
    pub shared_artists_count: usize,
    pub genres_a: Tally<String>,
    pub genres_b: Tally<String>,
    pub shared_genres: Vec<String>,
    pub genre_overlap: Vec<GenreOverlap>,
    pub decades_a: Tally<i32>,
    pub decades_b: Tally<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_catalog_wire_format() {
        let raw = r#"{
            "id": 42,
            "instance_id": 4200,
            "folder_id": 1,
            "rating": 4,
            "date_added": "2024-01-15T10:00:00-08:00",
            "basic_information": {
                "id": 42,
                "master_id": 7,
                "title": "Low",
                "year": 1977,
                "resource_url": "https://example.invalid/releases/42",
                "artists": [{"id": 1, "name": "David Bowie", "resource_url": ""}],
                "labels": [{"id": 3, "name": "RCA", "catno": "PL 12030"}],
                "formats": [{"name": "Vinyl", "qty": "1", "descriptions": ["LP", "Album"]}],
                "genres": ["Rock", "Electronic"],
                "styles": null
            }
        }"#;

        let item: CatalogItem = serde_json::from_str(raw).unwrap();
        assert_eq!(item.instance_id, 4200);
        assert_eq!(item.release.master_id, Some(7));
        assert_eq!(item.release.formats[0].quantity, "1");
        assert!(item.release.styles.is_empty());
        assert_eq!(item.date_added.to_rfc3339(), "2024-01-15T18:00:00+00:00");
    }

    #[test]
    fn missing_optional_lists_default_to_empty() {
        let raw = r#"{
            "id": 1,
            "instance_id": 1,
            "date_added": "2024-01-15T10:00:00Z",
            "basic_information": {"id": 1, "title": "Untitled"}
        }"#;

        let item: CatalogItem = serde_json::from_str(raw).unwrap();
        assert_eq!(item.rating, 0);
        assert_eq!(item.release.year, 0);
        assert!(item.release.artists.is_empty());
        assert!(item.release.labels.is_empty());
        assert!(item.release.genres.is_empty());
        assert!(item.release.primary_artist().is_none());
    }
}
