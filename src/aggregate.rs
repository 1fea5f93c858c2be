//! Combine per-source cleaned text into one document.

use chrono::Utc;
use thiserror::Error;

use crate::models::{JobResult, SourceKind};

/// Separator placed between the texts of two contributing sources.
pub const SOURCE_SEPARATOR: &str = "\n\n";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregateError {
    /// Every source came back empty (or whitespace only).
    #[error("no source produced usable text")]
    NoUsableData,
}

/// Join the non-empty texts of `per_source` in [`SourceKind::ALL`] order.
///
/// The order of `per_source` does not matter; the result is always ordered
/// encyclopedia, news, web. Sources missing from `per_source` count as empty.
///
/// # Arguments
///
/// * `per_source` - Cleaned text keyed by the source that produced it
///
/// # Returns
///
/// A [`JobResult`] whose texts are joined with [`SOURCE_SEPARATOR`], listing
/// the contributing sources and the character count of the joined text.
///
/// # Errors
///
/// [`AggregateError::NoUsableData`] when no source has non-blank text.
pub fn aggregate<'a, I>(per_source: I) -> Result<JobResult, AggregateError>
where
    I: IntoIterator<Item = (SourceKind, &'a str)>,
{
    let mut slots: [Option<&str>; 3] = [None; 3];
    for (kind, text) in per_source {
        if !text.is_empty() {
            slots[kind.position() - 1] = Some(text);
        }
    }

    let (contributing_sources, texts): (Vec<SourceKind>, Vec<&str>) = SourceKind::ALL
        .iter()
        .zip(slots)
        .filter_map(|(kind, text)| text.map(|t| (*kind, t)))
        .unzip();

    let combined_text = texts.join(SOURCE_SEPARATOR);
    if combined_text.trim().is_empty() {
        return Err(AggregateError::NoUsableData);
    }

    Ok(JobResult {
        character_count: combined_text.chars().count(),
        combined_text,
        contributing_sources,
        timestamp_utc: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joins_in_fixed_order_regardless_of_input_order() {
        let result = aggregate([
            (SourceKind::WebSearch, "web"),
            (SourceKind::Encyclopedia, "wiki"),
            (SourceKind::NewsSearch, "news"),
        ])
        .unwrap();

        assert_eq!(result.combined_text, "wiki\n\nnews\n\nweb");
        assert_eq!(result.contributing_sources, SourceKind::ALL.to_vec());
        assert_eq!(result.character_count, result.combined_text.len());
    }

    #[test]
    fn test_skips_empty_sources() {
        let result = aggregate([
            (SourceKind::Encyclopedia, ""),
            (SourceKind::NewsSearch, "news"),
            (SourceKind::WebSearch, "web"),
        ])
        .unwrap();

        assert_eq!(result.combined_text, "news\n\nweb");
        assert_eq!(
            result.contributing_sources,
            vec![SourceKind::NewsSearch, SourceKind::WebSearch]
        );
    }

    #[test]
    fn test_all_empty_is_an_error() {
        let err = aggregate([
            (SourceKind::Encyclopedia, ""),
            (SourceKind::NewsSearch, ""),
            (SourceKind::WebSearch, ""),
        ])
        .unwrap_err();
        assert_eq!(err, AggregateError::NoUsableData);
        assert!(aggregate(std::iter::empty()).is_err());
    }

    #[test]
    fn test_whitespace_only_is_an_error() {
        let err = aggregate([(SourceKind::Encyclopedia, "  \n ")]).unwrap_err();
        assert_eq!(err, AggregateError::NoUsableData);
    }

    #[test]
    fn test_character_count_uses_chars() {
        let result = aggregate([(SourceKind::Encyclopedia, "Zürich")]).unwrap();
        assert_eq!(result.character_count, 6);
    }
}
