//! Shirt records and the rules that normalize raw page fields into them

use crate::harvest::HarvestError;
use chrono::{DateTime, Local};
use serde::{Serialize, Serializer};

/// Format of the `Time` column
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Fields as they were pulled off a detail page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawShirt {
    /// Title text, prefixed with a price token on the catalog site
    pub title: String,

    /// Price text
    pub price: String,

    /// Image `src`, relative or absolute
    pub image_src: String,
}

/// One scraped shirt, as written to the CSV file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    #[serde(rename = "Title")]
    pub title: String,

    #[serde(rename = "Price")]
    pub price: String,

    #[serde(rename = "ImageURL")]
    pub image_url: String,

    #[serde(rename = "URL")]
    pub url: String,

    /// Moment the detail response was processed
    #[serde(rename = "Time", serialize_with = "serialize_time")]
    pub time: DateTime<Local>,
}

impl Record {
    /// Build a record from raw fields.
    ///
    /// Empty titles, prices and image sources are rejected rather than
    /// written as blank cells.
    pub fn build(
        raw: RawShirt,
        url: &str,
        site_base: &str,
        time: DateTime<Local>,
    ) -> Result<Self, HarvestError> {
        let missing = |field| HarvestError::MissingField {
            url: url.to_string(),
            field,
        };

        let title = normalize_title(&raw.title);
        if title.is_empty() {
            return Err(missing("title"));
        }

        let price = raw.price.trim();
        if price.is_empty() {
            return Err(missing("price"));
        }

        let image_src = raw.image_src.trim();
        if image_src.is_empty() {
            return Err(missing("image"));
        }

        Ok(Self {
            title,
            price: price.to_string(),
            image_url: resolve_image_url(site_base, image_src),
            url: url.to_string(),
            time,
        })
    }
}

fn serialize_time<S: Serializer>(time: &DateTime<Local>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&time.format(TIME_FORMAT))
}

/// Drop the leading price token: everything up to and including the first
/// whitespace. A title without whitespace is returned unchanged.
pub fn normalize_title(raw: &str) -> String {
    let raw = raw.trim();
    match raw.split_once(char::is_whitespace) {
        Some((_, rest)) => rest.trim().to_string(),
        None => raw.to_string(),
    }
}

/// Join a relative path to the site base with exactly one `/`
pub fn join_site_url(site_base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        site_base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Absolute image sources pass through, relative ones are joined to the site base
pub fn resolve_image_url(site_base: &str, src: &str) -> String {
    if src.starts_with("http") {
        src.to_string()
    } else {
        join_site_url(site_base, src)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const BASE: &str = "http://www.shirts4mike.com";

    fn raw(title: &str, price: &str, image: &str) -> RawShirt {
        RawShirt {
            title: title.to_string(),
            price: price.to_string(),
            image_src: image.to_string(),
        }
    }

    #[test]
    fn test_normalize_title_drops_price_token() {
        assert_eq!(normalize_title("$19.99 Clever Shirt"), "Clever Shirt");
        assert_eq!(normalize_title("  $20 Logo Shirt, Red "), "Logo Shirt, Red");
        assert_eq!(normalize_title("Plain"), "Plain");
    }

    #[test]
    fn test_resolve_image_url() {
        assert_eq!(
            resolve_image_url(BASE, "/images/shirt1.jpg"),
            "http://www.shirts4mike.com/images/shirt1.jpg"
        );
        assert_eq!(
            resolve_image_url(BASE, "img/shirts/shirt-101.jpg"),
            "http://www.shirts4mike.com/img/shirts/shirt-101.jpg"
        );
        assert_eq!(
            resolve_image_url(BASE, "https://cdn.example.com/a.jpg"),
            "https://cdn.example.com/a.jpg"
        );
    }

    #[test]
    fn test_join_site_url_collapses_slashes() {
        assert_eq!(
            join_site_url("http://www.shirts4mike.com/", "/shirt.php?id=101"),
            "http://www.shirts4mike.com/shirt.php?id=101"
        );
        assert_eq!(
            join_site_url(BASE, "shirt.php?id=102"),
            "http://www.shirts4mike.com/shirt.php?id=102"
        );
    }

    #[test]
    fn test_build_record() {
        let time = Local.with_ymd_and_hms(2026, 10, 17, 15, 4, 5).unwrap();
        let record = Record::build(
            raw("$18 Logo Shirt, Red", "$18", "img/shirts/shirt-101.jpg"),
            "http://www.shirts4mike.com/shirt.php?id=101",
            BASE,
            time,
        )
        .unwrap();

        assert_eq!(record.title, "Logo Shirt, Red");
        assert_eq!(record.price, "$18");
        assert_eq!(
            record.image_url,
            "http://www.shirts4mike.com/img/shirts/shirt-101.jpg"
        );
        assert_eq!(record.url, "http://www.shirts4mike.com/shirt.php?id=101");
        assert_eq!(record.time, time);
    }

    #[test]
    fn test_build_rejects_empty_fields() {
        let time = Local::now();
        let url = "http://www.shirts4mike.com/shirt.php?id=101";

        let err = Record::build(raw("   ", "$18", "a.jpg"), url, BASE, time).unwrap_err();
        assert!(matches!(err, HarvestError::MissingField { field: "title", .. }));

        let err = Record::build(raw("$18 Shirt", "", "a.jpg"), url, BASE, time).unwrap_err();
        assert!(matches!(err, HarvestError::MissingField { field: "price", .. }));

        let err = Record::build(raw("$18 Shirt", "$18", ""), url, BASE, time).unwrap_err();
        assert!(matches!(err, HarvestError::MissingField { field: "image", .. }));
    }
}
