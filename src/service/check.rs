use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::{
    app::AppState,
    engine::{
        keywords::{DEFAULT_MAX_LENGTH, DEFAULT_NGRAM, DEFAULT_TOP_K},
        extract_keywords_or_fallback, Fingerprint,
    },
    error::{AppError, AppResult},
    model::ScoreResultOut,
    util::wikipedia::{SearchHit, WikipediaClient},
};

/// A candidate text ready for scoring.
#[derive(Debug)]
pub struct Candidate {
    pub source: String,
    pub title: Option<String>,
    pub text: String,
}

/// Run the full check pipeline over already-extracted text: derive search
/// keywords, find candidate pages, fetch their text, score each against the
/// reference fingerprint, and return the top results by descending score.
pub async fn run(
    state: &AppState,
    text: &str,
    keywords_override: Option<String>,
) -> AppResult<Vec<ScoreResultOut>> {
    if text.trim().is_empty() {
        return Err(AppError::BadRequest("text must not be empty".to_string()));
    }

    let fingerprint = Fingerprint::build(text, state.engine.hash_params(), state.engine.mode)
        .map_err(|err| AppError::BadRequest(err.to_string()))?;
    if fingerprint.is_empty() {
        debug!(
            k = fingerprint.params().k,
            mode = fingerprint.mode().as_str(),
            "reference text shorter than k; every candidate will score 0"
        );
    }

    let keywords = match keywords_override
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
    {
        Some(provided) => provided,
        None => extract_keywords_or_fallback(text, DEFAULT_NGRAM, DEFAULT_TOP_K, DEFAULT_MAX_LENGTH),
    };
    if keywords.is_empty() {
        return Err(AppError::BadRequest(
            "could not derive search keywords from the text".to_string(),
        ));
    }

    debug!(keywords = %keywords, "searching for candidate pages");
    let hits = state.wikipedia.search(&keywords, None).await?;
    if hits.is_empty() {
        info!(keywords = %keywords, "no candidate pages found");
        return Ok(Vec::new());
    }

    let candidates =
        collect_candidates(Arc::clone(&state.wikipedia), hits, state.search_concurrency).await;

    let mut results = rank_candidates(&fingerprint, candidates, Some(&keywords));
    results.truncate(state.engine.top_results);

    info!(
        returned = results.len(),
        top_score = results.first().map(|r| r.score).unwrap_or(0.0),
        "check finished"
    );
    Ok(results)
}

/// Fetch the text of every hit with bounded concurrency. A failed fetch is
/// logged and skipped; it never poisons the other candidates.
async fn collect_candidates(
    client: Arc<WikipediaClient>,
    hits: Vec<SearchHit>,
    concurrency: usize,
) -> Vec<Candidate> {
    let concurrency = concurrency.max(1);
    let mut set = JoinSet::new();
    let mut candidates = Vec::with_capacity(hits.len());

    for hit in hits {
        let client = Arc::clone(&client);
        set.spawn(async move {
            debug!(page_id = hit.page_id, title = %hit.title, "fetching candidate page");
            match client.page_text(hit.page_id, None).await {
                Ok(text) if !text.trim().is_empty() => Some(Candidate {
                    source: hit.url,
                    title: Some(hit.title),
                    text,
                }),
                Ok(_) => {
                    debug!(page_id = hit.page_id, "candidate page had no text");
                    None
                }
                Err(err) => {
                    warn!(error = ?err, page_id = hit.page_id, "failed to fetch candidate page");
                    None
                }
            }
        });

        if set.len() >= concurrency {
            if let Some(Ok(Some(candidate))) = set.join_next().await {
                candidates.push(candidate);
            }
        }
    }

    while let Some(res) = set.join_next().await {
        if let Ok(Some(candidate)) = res {
            candidates.push(candidate);
        }
    }

    candidates
}

/// Score every candidate against the reference fingerprint and sort by
/// descending score. Pure and synchronous; each candidate lands in its own
/// result slot, so callers may stop consuming at any point.
pub fn rank_candidates(
    fingerprint: &Fingerprint,
    candidates: Vec<Candidate>,
    keywords: Option<&str>,
) -> Vec<ScoreResultOut> {
    let mut results: Vec<ScoreResultOut> = candidates
        .into_iter()
        .map(|candidate| ScoreResultOut {
            score: fingerprint.score(&candidate.text),
            source: candidate.source,
            title: candidate.title,
            keywords: keywords.map(str::to_string),
        })
        .collect();

    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{FingerprintMode, HashParams};

    fn candidate(source: &str, text: &str) -> Candidate {
        Candidate {
            source: source.to_string(),
            title: None,
            text: text.to_string(),
        }
    }

    #[test]
    fn ranks_by_descending_coverage() {
        let reference = "the five boxing wizards jump quickly over the lazy dog";
        let fingerprint = Fingerprint::build(
            reference,
            HashParams::new(5, 256, 1_000_003),
            FingerprintMode::Verified,
        )
        .unwrap();

        let results = rank_candidates(
            &fingerprint,
            vec![
                candidate("unrelated", "completely different words about gardening"),
                candidate("verbatim", reference),
                candidate("partial", "boxing wizards jump quickly but nothing else matches here"),
            ],
            Some("boxing wizards"),
        );

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].source, "verbatim");
        assert_eq!(results[0].score, 1.0);
        assert_eq!(results[1].source, "partial");
        assert!(results[1].score > 0.0 && results[1].score < 1.0);
        assert_eq!(results[2].source, "unrelated");
        assert_eq!(results[2].score, 0.0);
        assert!(results
            .iter()
            .all(|r| r.keywords.as_deref() == Some("boxing wizards")));
    }

    #[test]
    fn short_candidates_score_zero_instead_of_failing() {
        let fingerprint = Fingerprint::build(
            "a reasonably long reference text",
            HashParams::default(),
            FingerprintMode::Fast,
        )
        .unwrap();

        let results = rank_candidates(&fingerprint, vec![candidate("tiny", "shrt")], None);
        assert_eq!(results[0].score, 0.0);
        assert!(results[0].keywords.is_none());
    }
}
