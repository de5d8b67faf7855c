//! Router integration tests, driven through tower's `oneshot` without a
//! listener. Requires a Postgres instance. Set DATABASE_TEST_URL or these
//! tests are skipped.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use bandit_core::StatStore;
use bandit_server::routes;
use sqlx::PgPool;
use tower::ServiceExt;

/// Get a router over a test database, or skip if no test DB is available.
async fn test_router(domain: &str) -> Option<Router> {
    let url = std::env::var("DATABASE_TEST_URL").ok()?;
    let pool = PgPool::connect(&url).await.ok()?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bandit_stat (
            domain       TEXT             NOT NULL,
            arm          TEXT             NOT NULL,
            hits         BIGINT           NOT NULL DEFAULT 0,
            reward_sum   DOUBLE PRECISION NOT NULL DEFAULT 0,
            reward_count BIGINT           NOT NULL DEFAULT 0,
            PRIMARY KEY (domain, arm)
        )
        "#,
    )
    .execute(&pool)
    .await
    .ok()?;

    sqlx::query("DELETE FROM bandit_stat WHERE domain = $1")
        .bind(domain)
        .execute(&pool)
        .await
        .ok()?;

    Some(routes::build_router(StatStore::new(pool)))
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_is_ok() {
    let Some(router) = test_router("http_health").await else {
        return;
    };

    let response = router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn post_hits_acknowledges_with_created() {
    let Some(router) = test_router("http_hits").await else {
        return;
    };

    let response = router
        .oneshot(post_json("/hits/http_hits", r#"{"arm": "80C300A59541", "hits": 2}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["message"], "ok");
}

#[tokio::test]
async fn post_reward_acknowledges_with_created() {
    let Some(router) = test_router("http_reward").await else {
        return;
    };

    let response = router
        .oneshot(post_json(
            "/reward/http_reward",
            r#"{"arm": "14CB94CD2226", "reward": 1.0}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn empty_arm_id_is_bad_request() {
    let Some(router) = test_router("http_bad_arm").await else {
        return;
    };

    let response = router
        .oneshot(post_json("/hits/http_bad_arm", r#"{"arm": ""}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn empty_candidate_set_is_no_content() {
    let Some(router) = test_router("http_no_arms").await else {
        return;
    };

    let response = router
        .oneshot(post_json("/stat/list/http_no_arms", "[]"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn stat_list_returns_ranked_arms() {
    let domain = "http_rank";
    let Some(router) = test_router(domain).await else {
        return;
    };

    // Two arms with one trial each; only "rewarded" converts, so it must
    // rank first. "unknown" has no record and must be absent.
    for (uri, body) in [
        (format!("/hits/{domain}"), r#"{"arm": "rewarded"}"#),
        (format!("/hits/{domain}"), r#"{"arm": "ignored"}"#),
        (format!("/reward/{domain}"), r#"{"arm": "rewarded", "reward": 1.0}"#),
    ] {
        let response = router
            .clone()
            .oneshot(post_json(&uri, body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = router
        .oneshot(post_json(
            &format!("/stat/list/{domain}"),
            r#"["rewarded", "ignored", "unknown"]"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let ranked = body_json(response).await;
    let list = ranked.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["arm"], "rewarded");
    assert_eq!(list[1]["arm"], "ignored");
    assert!(list[0]["score"].as_f64().unwrap() > list[1]["score"].as_f64().unwrap());
}
