//! Configuration file to finished report, end to end

use anyhow::Result;
use retrograde_config::ConfigLoader;
use retrograde_loadtest::report::{render_table, write_json};
use retrograde_loadtest::Runner;
use serde_json::{json, Value};
use std::fs;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{any, method, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_yaml_config_drives_run_and_json_report() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/boards/board-under-test/cards$"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"id": "k1", "rank_id": "rank-a"}])),
        )
        .mount(&server)
        .await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .with_priority(10)
        .mount(&server)
        .await;

    let dir = TempDir::new()?;
    let config_path = dir.path().join("retrograde.yaml");
    fs::write(
        &config_path,
        format!(
            r#"
target:
  host: "{}"
  board: board-under-test
  ranks: [rank-a, rank-b]
  weights:
    load_board: 0
    load_ranks: 0
    create_card: 0
users:
  count: 2
  spawn_rate: 50.0
  run_time: 1s
  wait_time_min_ms: 5
  wait_time_max_ms: 10
  seed: 3
http:
  timeout: 5s
logging:
  level: debug
"#,
            server.uri()
        ),
    )?;

    let config = ConfigLoader::new().from_file(&config_path)?;
    assert_eq!(config.users.run_time, Some(Duration::from_secs(1)));
    assert_eq!(config.target.weights.vote_card, 4);

    let report = Runner::new(config)?.run(std::future::pending::<()>()).await?;

    assert!(report.entry("Load Board").is_none());
    assert!(report.entry("Create a Card").is_none());
    assert!(report.entry("Vote on a Card").unwrap().requests > 0);
    assert!(report.entry("Delete a Card").unwrap().requests > 0);

    let received = server.received_requests().await.unwrap_or_default();
    assert!(received.iter().all(|request| request
        .url
        .path()
        .starts_with("/boards/board-under-test")));
    assert!(received
        .iter()
        .any(|request| request.url.path() == "/boards/board-under-test/ranks/rank-a/cards/k1/vote"));

    let table = render_table(&report);
    assert!(table.contains("Vote on a Card"));
    assert!(table.contains("Aggregated"));

    let report_path = dir.path().join("report.json");
    write_json(&report, &report_path)?;
    let written: Value = serde_json::from_str(&fs::read_to_string(&report_path)?)?;
    assert_eq!(written["users"], 2);
    assert_eq!(
        written["aggregated"]["requests"].as_u64(),
        Some(report.aggregated.requests)
    );

    Ok(())
}
