//! Book model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Book genre, a closed enumeration.
///
/// Wire format uses the catalog's display strings ("Self-Improvement",
/// "Politics-Biography", ...); the same strings are stored in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Genre {
    #[serde(rename = "Self-Improvement")]
    SelfImprovement,
    Politics,
    Biography,
    #[serde(rename = "Politics-Biography")]
    PoliticsBiography,
    Fiction,
    Novel,
}

impl Genre {
    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::SelfImprovement => "Self-Improvement",
            Genre::Politics => "Politics",
            Genre::Biography => "Biography",
            Genre::PoliticsBiography => "Politics-Biography",
            Genre::Fiction => "Fiction",
            Genre::Novel => "Novel",
        }
    }
}

impl std::fmt::Display for Genre {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Genre {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "self-improvement" => Ok(Genre::SelfImprovement),
            "politics" => Ok(Genre::Politics),
            "biography" => Ok(Genre::Biography),
            "politics-biography" => Ok(Genre::PoliticsBiography),
            "fiction" => Ok(Genre::Fiction),
            "novel" => Ok(Genre::Novel),
            _ => Err(format!("Invalid genre: {}", s)),
        }
    }
}

impl sqlx::Type<Postgres> for Genre {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for Genre {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for Genre {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <String as Encode<Postgres>>::encode(self.as_str().to_string(), buf)
    }
}

/// Book availability flag, derived from the copy counters.
///
/// The counters are authoritative; this flag only exists so listings can show
/// a stable label. Stored as "available"/"borrowed" (the source's mixed
/// "tersedia"/"dipinjam" vocabulary is not carried over).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookStatus {
    Available,
    Borrowed,
}

impl BookStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Available => "available",
            BookStatus::Borrowed => "borrowed",
        }
    }
}

impl std::fmt::Display for BookStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BookStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "available" => Ok(BookStatus::Available),
            "borrowed" => Ok(BookStatus::Borrowed),
            _ => Err(format!("Invalid book status: {}", s)),
        }
    }
}

impl sqlx::Type<Postgres> for BookStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for BookStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for BookStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <String as Encode<Postgres>>::encode(self.as_str().to_string(), buf)
    }
}

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub genre: Genre,
    pub cover_url: Option<String>,
    pub total_copies: i32,
    pub available_copies: i32,
    pub status: BookStatus,
    pub rating: f64,
    pub rating_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Book projection for listings, with computed availability
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookSummary {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub genre: Genre,
    pub cover_url: Option<String>,
    pub status: BookStatus,
    pub rating: f64,
    pub rating_count: i32,
    pub available_count: i32,
    /// Whether the requesting user currently holds an active borrow on it
    pub is_borrowed_by_user: bool,
}

/// Single-book projection with borrow counters
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookDetails {
    #[serde(flatten)]
    pub book: Book,
    pub borrowed_count: i64,
    pub available_count: i32,
    pub is_borrowed_by_user: bool,
}

/// Book list query parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct BookQuery {
    /// Filter by genre
    pub genre: Option<Genre>,
}

/// Create book request (admin)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author is required"))]
    pub author: String,
    pub genre: Genre,
    #[validate(url(message = "Cover must be a valid URL"))]
    pub cover_url: Option<String>,
    #[validate(range(min = 0, message = "Copies must be at least 0"))]
    pub total_copies: Option<i32>,
}

/// Update book request (admin)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Author is required"))]
    pub author: Option<String>,
    pub genre: Option<Genre>,
    #[validate(url(message = "Cover must be a valid URL"))]
    pub cover_url: Option<String>,
    #[validate(range(min = 0, message = "Copies must be at least 0"))]
    pub total_copies: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genre_round_trips_display_strings() {
        for g in [
            Genre::SelfImprovement,
            Genre::Politics,
            Genre::Biography,
            Genre::PoliticsBiography,
            Genre::Fiction,
            Genre::Novel,
        ] {
            assert_eq!(g.as_str().parse::<Genre>().unwrap(), g);
        }
        assert!("Cooking".parse::<Genre>().is_err());
    }

    #[test]
    fn genre_serializes_display_string() {
        let json = serde_json::to_string(&Genre::SelfImprovement).unwrap();
        assert_eq!(json, "\"Self-Improvement\"");
        let back: Genre = serde_json::from_str("\"Politics-Biography\"").unwrap();
        assert_eq!(back, Genre::PoliticsBiography);
    }

    #[test]
    fn book_status_is_canonical() {
        assert_eq!("available".parse::<BookStatus>().unwrap(), BookStatus::Available);
        assert_eq!("borrowed".parse::<BookStatus>().unwrap(), BookStatus::Borrowed);
        assert!("tersedia".parse::<BookStatus>().is_err());
    }
}
