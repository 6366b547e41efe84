use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::core::{MatchOutcome, Matcher, SeniorityLadder};
use crate::error::MatchError;
use crate::models::{
    AssignmentRequest, AssignmentResponse, EligibilityEntry, EligibilityResponse, ErrorResponse,
    HealthResponse,
};
use crate::report::review_rows;
use std::collections::BTreeMap;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub matcher: Matcher,
}

/// Configure all assignment-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/assignments", web::post().to(create_assignment))
        .route("/eligibility", web::post().to(check_eligibility));
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

fn validation_failed(errors: validator::ValidationErrors) -> HttpResponse {
    tracing::info!("Validation failed for assignment request: field_errors={:?}", errors);
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "Validation failed".to_string(),
        message: errors.to_string(),
        status_code: 400,
    })
}

fn match_failed(err: MatchError) -> HttpResponse {
    tracing::warn!(kind = err.kind(), "Matching rejected input: {}", err);
    HttpResponse::UnprocessableEntity().json(ErrorResponse {
        error: err.kind().to_string(),
        message: err.to_string(),
        status_code: 422,
    })
}

fn internal_error(message: String) -> HttpResponse {
    tracing::error!("Matching task failed: {}", message);
    HttpResponse::InternalServerError().json(ErrorResponse {
        error: "Matching failed".to_string(),
        message,
        status_code: 500,
    })
}

/// Run the matching engine
///
/// POST /api/v1/assignments
///
/// Request body:
/// ```json
/// {
///   "sponsors": [{ "id": "A", "level": "Professor", "affiliations": ["X"], "capacity": 2 }],
///   "candidates": [{ "id": "1", "level": "PhD", "affiliations": ["Y"] }],
///   "options": { "maxCandidatesPerSponsor": 2, "restrictTimezone": false, "solver": "optimal" }
/// }
/// ```
async fn create_assignment(
    state: web::Data<AppState>,
    req: web::Json<AssignmentRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }

    let request = req.into_inner();
    let params = request.options.apply(state.matcher.params());
    let include_review = request.options.include_review;

    tracing::info!(
        sponsors = request.sponsors.len(),
        candidates = request.candidates.len(),
        solver = ?params.solver,
        "Received assignment request"
    );

    // The engine is CPU-bound; keep it off the request workers
    let task = tokio::task::spawn_blocking(move || {
        let matcher = Matcher::new(params);
        let outcome = matcher.run(&request.sponsors, &request.candidates);
        (matcher, request, outcome)
    });

    let (matcher, request, outcome) = match task.await {
        Ok(parts) => parts,
        Err(e) => return internal_error(e.to_string()),
    };

    let outcome: MatchOutcome = match outcome {
        Ok(outcome) => outcome,
        Err(err) => return match_failed(err),
    };

    let review = include_review.then(|| {
        let ladder = SeniorityLadder::new(&matcher.params().levels);
        review_rows(&outcome.assignment, &request.sponsors, &request.candidates, &ladder)
    });

    let response = AssignmentResponse {
        run_id: uuid::Uuid::new_v4(),
        generated_at: chrono::Utc::now(),
        solver: outcome.solver,
        total_score: outcome.assignment.total_score(),
        assignments: outcome.assignment.sponsors,
        unassigned: outcome.assignment.unassigned,
        skipped: outcome.skipped,
        review,
    };

    tracing::info!(
        run_id = %response.run_id,
        unassigned = response.unassigned.len(),
        "Returning assignment"
    );

    HttpResponse::Ok().json(response)
}

/// Inspect the exclusion relation without solving
///
/// POST /api/v1/eligibility
async fn check_eligibility(
    state: web::Data<AppState>,
    req: web::Json<AssignmentRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }

    let request = req.into_inner();
    let params = request.options.apply(state.matcher.params());

    // Building the relation is quadratic in the table sizes
    let task = tokio::task::spawn_blocking(move || {
        Matcher::new(params).eligibility(&request.sponsors, &request.candidates)
    });

    let relation = match task.await {
        Ok(Ok(relation)) => relation,
        Ok(Err(err)) => return match_failed(err),
        Err(e) => return internal_error(e.to_string()),
    };

    let mut excluded = BTreeMap::new();
    for s in 0..relation.sponsor_count() {
        let entries = (0..relation.candidate_count())
            .filter(|&c| relation.is_excluded(s, c))
            .map(|c| EligibilityEntry {
                candidate_id: relation.candidate_id(c).to_string(),
                reasons: relation.reasons(s, c),
            })
            .collect();
        excluded.insert(relation.sponsor_id(s).to_string(), entries);
    }

    HttpResponse::Ok().json(EligibilityResponse {
        excluded,
        excluded_pairs: relation.excluded_pair_count(),
    })
}
