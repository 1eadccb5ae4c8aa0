//! The movie records used by the demo table.
//!
//! Pure parsing and construction only; writing them is the caller's job.

use std::io::Read;

use serde::Deserialize;
use thiserror::Error;

use crate::key::PrimaryKey;
use crate::value::{Item, Number, NumberError, Value};

/// Year of the sample movie.
pub const SAMPLE_YEAR: i64 = 2015;

/// Title of the sample movie.
pub const SAMPLE_TITLE: &str = "Waddup the movie time";

/// Errors raised while reading movie records.
#[derive(Debug, Error)]
pub enum MovieError {
    #[error("failed to parse movie data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("movie '{title}' has a non-integer year: {year}")]
    InvalidYear { title: String, year: String },
    #[error("movie '{title}' has an invalid number: {source}")]
    Number {
        title: String,
        #[source]
        source: NumberError,
    },
}

/// One record of a bulk-load file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieRecord {
    pub year: i64,
    pub title: String,
    /// Free-form document; numbers are exact decimals.
    pub info: Value,
}

#[derive(Deserialize)]
struct RawMovie {
    year: serde_json::Number,
    title: String,
    #[serde(default)]
    info: serde_json::Value,
}

impl TryFrom<RawMovie> for MovieRecord {
    type Error = MovieError;

    fn try_from(raw: RawMovie) -> Result<Self, Self::Error> {
        let text = raw.year.to_string();
        let year = text
            .parse::<Number>()
            .ok()
            .and_then(|n| n.as_i64())
            .ok_or_else(|| MovieError::InvalidYear {
                title: raw.title.clone(),
                year: text,
            })?;

        let info = Value::from_json(raw.info).map_err(|source| MovieError::Number {
            title: raw.title.clone(),
            source,
        })?;

        Ok(Self {
            year,
            title: raw.title,
            info,
        })
    }
}

impl MovieRecord {
    /// The `year`/`title` key of this record.
    pub fn key(&self) -> PrimaryKey {
        PrimaryKey::partition("year", self.year).with_sort("title", self.title.clone())
    }

    /// The item written to the table: `{year, title, info}`.
    pub fn to_item(&self) -> Item {
        let mut item = self.key().to_item();
        item.insert("info".to_string(), self.info.clone());
        item
    }
}

/// Parses a JSON array of `{year, title, info}` records.
///
/// Floating point literals in `info` are kept as exact decimals.
pub fn parse_movies<R: Read>(reader: R) -> Result<Vec<MovieRecord>, MovieError> {
    let raw: Vec<RawMovie> = serde_json::from_reader(reader)?;
    raw.into_iter().map(MovieRecord::try_from).collect()
}

/// Key of the sample movie.
pub fn sample_movie_key() -> PrimaryKey {
    PrimaryKey::partition("year", SAMPLE_YEAR).with_sort("title", SAMPLE_TITLE)
}

/// The sample movie as first written: a plot and a zero rating.
pub fn sample_movie(year: i64, title: &str) -> Item {
    let mut info = Item::new();
    info.insert("plot".to_string(), "How you doing ?".into());
    info.insert("rating".to_string(), 0.into());

    MovieRecord {
        year,
        title: title.to_string(),
        info: Value::M(info),
    }
    .to_item()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATA: &str = r#"[
        {
            "year": 2013,
            "title": "Rush",
            "info": {
                "rating": 8.3,
                "rank": 2,
                "genres": ["Action", "Biography"],
                "actors": ["Daniel Bruhl", "Chris Hemsworth"]
            }
        },
        {
            "year": 1985,
            "title": "A View to a Kill",
            "info": {"rating": 6.3}
        }
    ]"#;

    #[test]
    fn test_parse_movies() {
        let movies = parse_movies(DATA.as_bytes()).unwrap();
        assert_eq!(movies.len(), 2);
        assert_eq!(movies[0].year, 2013);
        assert_eq!(movies[0].title, "Rush");
        assert_eq!(movies[1].key().to_string(), r#"year=1985, title="A View to a Kill""#);
    }

    #[test]
    fn test_parse_keeps_exact_decimals() {
        let movies = parse_movies(DATA.as_bytes()).unwrap();
        let info = movies[0].info.as_map().unwrap();
        assert_eq!(info["rating"], Value::number("8.3").unwrap());
        assert_eq!(info["rating"].as_number().unwrap().to_string(), "8.3");
    }

    #[test]
    fn test_parse_rejects_fractional_year() {
        let err = parse_movies(r#"[{"year": 1985.5, "title": "X", "info": {}}]"#.as_bytes())
            .unwrap_err();
        assert!(matches!(err, MovieError::InvalidYear { .. }));
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        let err = parse_movies("[{\"year\": 1985".as_bytes()).unwrap_err();
        assert!(matches!(err, MovieError::Json(_)));
    }

    #[test]
    fn test_missing_info_becomes_null() {
        let movies = parse_movies(r#"[{"year": 1999, "title": "X"}]"#.as_bytes()).unwrap();
        assert_eq!(movies[0].info, Value::Null);
    }

    #[test]
    fn test_record_to_item() {
        let movies = parse_movies(DATA.as_bytes()).unwrap();
        let item = movies[1].to_item();
        assert_eq!(item["year"], Value::from(1985));
        assert_eq!(item["title"], Value::from("A View to a Kill"));
        assert!(item["info"].as_map().is_some());
    }

    #[test]
    fn test_sample_movie() {
        let item = sample_movie(SAMPLE_YEAR, SAMPLE_TITLE);
        let info = item["info"].as_map().unwrap();
        assert_eq!(info["plot"], Value::from("How you doing ?"));
        assert_eq!(info["rating"], Value::from(0));
        assert_eq!(
            PrimaryKey::from_item(&crate::table::movies_table_definition(), &item).unwrap(),
            sample_movie_key()
        );
    }
}
