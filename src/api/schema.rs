//! Wire format of the blog backend and the validator that turns it into
//! typed [`ContentItem`]s.
//!
//! Decoding is all-or-nothing: a response either yields fully populated items
//! or a [`DecodeError`] naming what was wrong. Optional wire fields stay
//! optional in the typed model; required ones are checked here once so view
//! code never has to.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::content::{Author, ContentItem, ContentStatus, ImageRef};

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a JSON object")]
    NotAnObject,
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    #[error("field '{0}' must be an array")]
    ExpectedArray(&'static str),
    #[error("field '{field}' is invalid: {message}")]
    InvalidField { field: &'static str, message: String },
    #[error("record {index}: {source}")]
    InvalidRecord {
        index: usize,
        #[source]
        source: Box<DecodeError>,
    },
}

/// A blog record as the backend sends it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlogRecord {
    #[serde(rename = "_id")]
    id: Option<String>,
    slug: Option<String>,
    title: Option<String>,
    category: Option<String>,
    subcategory: Option<String>,
    content: Option<String>,
    image: Option<String>,
    image_caption: Option<String>,
    author: Option<String>,
    author_avatar: Option<String>,
    author_bio: Option<String>,
    status: Option<String>,
    date: Option<String>,
    created_at: Option<String>,
    updated_at: Option<String>,
}

/// One page of the blog listing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BlogPage {
    pub items: Vec<ContentItem>,
    pub has_more: bool,
}

/// Decode `{ blogs: [...], hasMore: bool }`. `hasMore` may be omitted.
///
/// # Errors
///
/// Returns an error if the body is not an object, `blogs` is missing or not an
/// array, or any record fails validation.
pub fn decode_listing(body: &[u8]) -> Result<BlogPage, DecodeError> {
    let value: Value = serde_json::from_slice(body)?;
    let Value::Object(mut map) = value else {
        return Err(DecodeError::NotAnObject);
    };

    let has_more = match map.remove("hasMore") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => b,
        Some(other) => {
            return Err(DecodeError::InvalidField {
                field: "hasMore",
                message: format!("expected boolean, got {other}"),
            })
        }
    };

    let records = match map.remove("blogs") {
        None => return Err(DecodeError::MissingField("blogs")),
        Some(Value::Array(records)) => records,
        Some(_) => return Err(DecodeError::ExpectedArray("blogs")),
    };

    let items = records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            decode_item(record, None).map_err(|e| DecodeError::InvalidRecord {
                index,
                source: Box::new(e),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(BlogPage { items, has_more })
}

/// Decode a single-item response. `null` and `{}` mean "no such item".
///
/// # Errors
///
/// Returns an error if the body is present but malformed.
pub fn decode_detail(
    body: &[u8],
    fallback_category: Option<&str>,
) -> Result<Option<ContentItem>, DecodeError> {
    let value: Value = serde_json::from_slice(body)?;
    match &value {
        Value::Null => return Ok(None),
        Value::Object(map) if map.is_empty() => return Ok(None),
        Value::Object(_) => {}
        _ => return Err(DecodeError::NotAnObject),
    }
    decode_item(value, fallback_category).map(Some)
}

/// Validate one record. `fallback_category` fills in a missing category,
/// which detail pages know from their route.
///
/// # Errors
///
/// Returns an error if a required field is missing or a field is malformed.
pub fn decode_item(
    value: Value,
    fallback_category: Option<&str>,
) -> Result<ContentItem, DecodeError> {
    if !value.is_object() {
        return Err(DecodeError::NotAnObject);
    }
    let record: BlogRecord = serde_json::from_value(value)?;

    let id = required(record.id, "_id")?;
    let title = required(record.title, "title")?;
    let category = non_empty(record.category)
        .or_else(|| non_empty(fallback_category.map(ToString::to_string)))
        .ok_or(DecodeError::MissingField("category"))?;

    let image = parse_image("image", record.image)?;
    let avatar = parse_image("authorAvatar", record.author_avatar)?;
    let name = non_empty(record.author);
    let bio = non_empty(record.author_bio);
    let author = if name.is_some() || avatar.is_some() || bio.is_some() {
        Some(Author { name, avatar, bio })
    } else {
        None
    };

    let published_at = match parse_timestamp("date", record.date)? {
        Some(date) => Some(date),
        None => parse_timestamp("createdAt", record.created_at)?,
    };

    Ok(ContentItem {
        id,
        slug: non_empty(record.slug),
        title,
        category,
        subcategory: non_empty(record.subcategory),
        body: record.content.unwrap_or_default(),
        image,
        image_caption: non_empty(record.image_caption),
        author,
        status: ContentStatus::parse(record.status.as_deref()),
        published_at,
        updated_at: parse_timestamp("updatedAt", record.updated_at)?,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn required(value: Option<String>, field: &'static str) -> Result<String, DecodeError> {
    non_empty(value).ok_or(DecodeError::MissingField(field))
}

fn parse_image(field: &'static str, value: Option<String>) -> Result<Option<ImageRef>, DecodeError> {
    let Some(raw) = non_empty(value) else {
        return Ok(None);
    };
    if raw.starts_with("http") {
        let url = Url::parse(&raw).map_err(|e| DecodeError::InvalidField {
            field,
            message: format!("'{raw}' is not a valid URL ({e})"),
        })?;
        Ok(Some(ImageRef::Absolute(url)))
    } else {
        Ok(Some(ImageRef::Relative(raw)))
    }
}

fn parse_timestamp(
    field: &'static str,
    value: Option<String>,
) -> Result<Option<DateTime<Utc>>, DecodeError> {
    let Some(raw) = non_empty(value) else {
        return Ok(None);
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    // Timestamps without an offset are taken as UTC.
    if let Ok(dt) = NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(Some(dt.and_utc()));
    }
    if let Ok(date) = NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(Some(dt.and_utc()));
        }
    }
    Err(DecodeError::InvalidField {
        field,
        message: format!("'{raw}' is not an ISO 8601 timestamp or YYYY-MM-DD date"),
    })
}
