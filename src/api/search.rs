use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    app::AppState,
    error::{AppError, AppResult},
    model::{SearchHitOut, SearchQuery, SearchResp},
};

pub async fn search_wikipedia(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<SearchResp>> {
    let SearchQuery { query, language } = query;
    let query = query.trim().to_string();
    if query.is_empty() {
        return Err(AppError::BadRequest(
            "query must not be empty".to_string(),
        ));
    }

    let hits = state.wikipedia.search(&query, language.as_deref()).await?;
    let results = hits
        .into_iter()
        .map(|hit| SearchHitOut {
            title: hit.title,
            page_id: hit.page_id,
            snippet: hit.snippet,
            url: hit.url,
        })
        .collect();

    Ok(Json(SearchResp { results }))
}
