use rocket::http::Status;
use rocket::response::status::Created;
use rocket::serde::json;

use super::*;

/// Fixed size of the highscore window served to clients.
const TOP_WINDOW: i64 = 10;

/// Accepts a score submission and persists it with a server-assigned
/// timestamp. Responds 201 with the stored record. A body that is not a
/// JSON object with `userName` and `score` fields (matched
/// case-insensitively) is rejected with 400 before anything touches the
/// store.
#[post("/scores", format = "json", data = "<submission>")]
pub async fn add_score(
    submission: Result<Json<ScoreSubmission>, json::Error<'_>>,
    database: &State<DatabasePool>,
) -> RequestResult<Created<Json<ScoreRecord>>> {
    let submission = submission.map_err(|error| {
        let reason = match error {
            json::Error::Io(error) => error.to_string(),
            json::Error::Parse(_, error) => error.to_string(),
        };
        RequestError::Validation { reason }
    })?;

    let record = ScoreRecord::new(submission.into_inner());
    insert_score(&record, database.inner()).await?;

    Ok(Created::new("/scores").body(Json(record)))
}

/// Answers the browser's cross-origin pre-flight for score submissions.
/// The CORS headers themselves come from the response fairing; this route
/// only exists so OPTIONS resolves to 200 with no body (and no store write).
#[options("/scores")]
pub fn preflight_scores() {}

/// Fetches the top ten scores, highest first. `since` optionally restricts
/// the window to records stamped at or after the given RFC 3339 instant.
#[get("/scores?<since>", format = "json")]
pub async fn get_scores(
    since: Option<&str>,
    database: &State<DatabasePool>,
) -> RequestResult<Json<Vec<ScoreRecord>>> {
    let since = match since {
        Some(raw) => Some(score::decode_timestamp(raw).map_err(|error| {
            RequestError::Validation {
                reason: format!("invalid since parameter: {}", error),
            }
        })?),
        None => None,
    };

    let scores = query_top_scores(since, TOP_WINDOW, database.inner()).await?;
    Ok(Json(scores))
}

#[get("/livez")]
pub fn live() -> &'static str {
    "Alive"
}

/// Readiness probe: degraded unless the store answers a round-trip.
#[get("/readyz")]
pub async fn ready(database: &State<DatabasePool>) -> (Status, &'static str) {
    match ping(database.inner()).await {
        Ok(()) => (Status::Ok, "Ready"),
        Err(error) => {
            ::log::error!("readiness check failed to reach the score store: {}", error);
            (Status::ServiceUnavailable, "Degraded - store unreachable")
        }
    }
}
