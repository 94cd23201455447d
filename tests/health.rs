use axum::extract::State;
use refill_shop_api::{
    config::DEFAULT_TIMEZONE, db::create_orm_conn, routes::health::health_check, state::AppState,
};

#[tokio::test]
async fn health_check_reports_database_and_business_clock() -> anyhow::Result<()> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run health check.");
            return Ok(());
        }
    };

    let state = AppState::new(create_orm_conn(&database_url).await?, DEFAULT_TIMEZONE);
    let response = health_check(State(state)).await;
    assert_eq!(response.0.message, "Health check");

    let data = response.0.data.expect("health data");
    assert_eq!(data.status, "ok");
    assert_eq!(data.database, "ok");
    assert_eq!(data.timezone, "Asia/Seoul");
    Ok(())
}
