//! Parsing the structured batch-analysis response.
//!
//! The batch prompt asks for one `Sentiment:`/`Pro:`/`Con:` entry per input
//! review. The service replies in free-form text, so parsing is line-wise and
//! forgiving about everything except the entry count: a response without
//! exactly one sentiment per review is unparseable and the whole batch fails,
//! leaving the fallback decision to the caller.

use crate::gateway::GatewayError;

/// Sentiment classification for a single review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// Deterministic rating-based classification, used as the fallback when
    /// the reasoning service is unavailable: 4-5 positive, 1-2 negative,
    /// 3 neutral.
    pub fn from_rating(rating: u8) -> Self {
        if rating >= 4 {
            SentimentLabel::Positive
        } else if rating <= 2 {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

/// Parsed analysis of one review: its sentiment plus at most one pro and one
/// con ("none" in the response maps to `None`).
#[derive(Debug, Clone)]
pub struct ReviewAnalysis {
    pub sentiment: SentimentLabel,
    pub pro: Option<String>,
    pub con: Option<String>,
}

/// Parse a batch response into one `ReviewAnalysis` per expected review.
///
/// Each `sentiment:` line opens a new entry; `pro:`/`con:` lines attach to
/// the entry most recently opened. Matching is case-insensitive and ignores
/// surrounding chatter, but the entry count must equal `expected`.
pub fn parse_batch_response(
    response: &str,
    expected: usize,
) -> Result<Vec<ReviewAnalysis>, GatewayError> {
    let mut analyses: Vec<ReviewAnalysis> = Vec::new();

    for raw_line in response.lines() {
        let line = raw_line.trim().to_lowercase();

        if let Some(rest) = line.strip_prefix("sentiment:") {
            let sentiment = if rest.contains("positive") {
                SentimentLabel::Positive
            } else if rest.contains("negative") {
                SentimentLabel::Negative
            } else if rest.contains("neutral") {
                SentimentLabel::Neutral
            } else {
                return Err(GatewayError::Unparseable(format!(
                    "unrecognized sentiment line: {raw_line:?}"
                )));
            };
            analyses.push(ReviewAnalysis {
                sentiment,
                pro: None,
                con: None,
            });
        } else if let Some(rest) = line.strip_prefix("pro:") {
            if let Some(entry) = analyses.last_mut() {
                entry.pro = clean_point(rest);
            }
        } else if let Some(rest) = line.strip_prefix("con:") {
            if let Some(entry) = analyses.last_mut() {
                entry.con = clean_point(rest);
            }
        }
    }

    if analyses.len() != expected {
        return Err(GatewayError::Unparseable(format!(
            "expected {expected} entries, found {}",
            analyses.len()
        )));
    }

    Ok(analyses)
}

/// Normalize a pro/con phrase; a bare "none" means absent, but a phrase that
/// merely contains the word is kept.
fn clean_point(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() || text.trim_end_matches(['.', '!']) == "none" {
        None
    } else {
        Some(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_response_positionally() {
        let response = "Review 1:\n\
                        Sentiment: positive\n\
                        Pro: great performance\n\
                        Con: none\n\
                        \n\
                        Review 2:\n\
                        Sentiment: negative\n\
                        Pro: none\n\
                        Con: expensive\n";
        let analyses = parse_batch_response(response, 2).unwrap();

        assert_eq!(analyses.len(), 2);
        assert_eq!(analyses[0].sentiment, SentimentLabel::Positive);
        assert_eq!(analyses[0].pro.as_deref(), Some("great performance"));
        assert_eq!(analyses[0].con, None);
        assert_eq!(analyses[1].sentiment, SentimentLabel::Negative);
        assert_eq!(analyses[1].pro, None);
        assert_eq!(analyses[1].con.as_deref(), Some("expensive"));
    }

    #[test]
    fn parsing_is_case_insensitive_and_skips_chatter() {
        let response = "Here is my analysis:\n\
                        SENTIMENT: Neutral\n\
                        PRO: decent battery\n\
                        CON: mediocre camera\n";
        let analyses = parse_batch_response(response, 1).unwrap();

        assert_eq!(analyses[0].sentiment, SentimentLabel::Neutral);
        assert_eq!(analyses[0].pro.as_deref(), Some("decent battery"));
        assert_eq!(analyses[0].con.as_deref(), Some("mediocre camera"));
    }

    #[test]
    fn bare_none_is_absent_but_phrases_containing_it_are_kept() {
        let response = "Sentiment: positive\n\
                        Pro: nonetheless solid build\n\
                        Con: none.\n\
                        Sentiment: neutral\n\
                        Pro: None\n\
                        Con: none of the ports are USB-C\n";
        let analyses = parse_batch_response(response, 2).unwrap();

        assert_eq!(analyses[0].pro.as_deref(), Some("nonetheless solid build"));
        assert_eq!(analyses[0].con, None);
        assert_eq!(analyses[1].pro, None);
        assert_eq!(
            analyses[1].con.as_deref(),
            Some("none of the ports are usb-c")
        );
    }

    #[test]
    fn entry_count_mismatch_is_unparseable() {
        let response = "Sentiment: positive\nPro: fast\nCon: none\n";
        let err = parse_batch_response(response, 3).unwrap_err();
        assert!(matches!(err, GatewayError::Unparseable(_)));
    }

    #[test]
    fn freeform_junk_is_unparseable() {
        let err = parse_batch_response("I cannot help with that.", 2).unwrap_err();
        assert!(matches!(err, GatewayError::Unparseable(_)));
    }

    #[test]
    fn rating_fallback_bands() {
        assert_eq!(SentimentLabel::from_rating(5), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::from_rating(4), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::from_rating(3), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_rating(2), SentimentLabel::Negative);
        assert_eq!(SentimentLabel::from_rating(1), SentimentLabel::Negative);
    }
}
