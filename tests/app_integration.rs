use fxc::AppCommand;
use fxc::cli::alerts::AlertAction;
use fxc::cli::favorites::FavoriteAction;
use fxc::core::Pair;
use fxc::core::alerts::{AlertBook, AlertDirection};
use fxc::core::favorites::Favorites;
use fxc::store::disk::DiskStorage;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::info;

// Mock servers for the three HTTP APIs the app talks to
mod test_utils {
    use wiremock::matchers::{method, path, path_regex, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn create_rates_mock_server(base: &str, mock_response: &str) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("/v6/test-key/latest/{base}")))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub async fn create_history_mock_server(from: &str, to: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        let body = format!(
            r#"{{"amount":1.0,"base":"{from}","rates":{{
                "2024-05-01":{{"{to}":83.41}},
                "2024-05-02":{{"{to}":83.52}},
                "2024-05-03":{{"{to}":83.37}}}}}}"#
        );

        Mock::given(method("GET"))
            .and(path_regex(r"^/\d{4}-\d{2}-\d{2}\.\.\d{4}-\d{2}-\d{2}$"))
            .and(query_param("from", from))
            .and(query_param("to", to))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub async fn create_countries_mock_server() -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v3.1/currency/USD"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"[{"name":{"common":"United States"},"currencies":{"USD":{"name":"United States dollar","symbol":"$"}}}]"#,
            ))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v3.1/currency/INR"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"[{"name":{"common":"India"},"currencies":{"INR":{"name":"Indian rupee","symbol":"₹"}}}]"#,
            ))
            .mount(&mock_server)
            .await;

        mock_server
    }
}

fn write_config(dir: &Path, rates_url: &str, history_url: &str, countries_url: &str) -> PathBuf {
    let config_path = dir.join("config.yaml");
    let data_path = dir.join("data");
    let config = format!(
        r#"
providers:
  exchange_rate:
    base_url: "{rates_url}"
    api_key: "test-key"
  frankfurter:
    base_url: "{history_url}"
  rest_countries:
    base_url: "{countries_url}"
defaults:
  from: "USD"
  to: "INR"
  amount: 1
data_path: "{}"
"#,
        data_path.display()
    );
    fs::write(&config_path, config).expect("Failed to write test config");
    config_path
}

#[test_log::test(tokio::test)]
async fn test_convert_with_chart_and_info() {
    let rates_server = test_utils::create_rates_mock_server(
        "USD",
        r#"{"result":"success","base_code":"USD","conversion_rates":{"USD":1,"INR":83.4521}}"#,
    )
    .await;
    let history_server = test_utils::create_history_mock_server("USD", "INR").await;
    let countries_server = test_utils::create_countries_mock_server().await;

    let temp_dir = TempDir::new().unwrap();
    let config_path = write_config(
        temp_dir.path(),
        &rates_server.uri(),
        &history_server.uri(),
        &countries_server.uri(),
    );

    let command = AppCommand::Convert {
        pair: Pair::new("usd", "inr").unwrap(),
        amount: Some("100".to_string()),
        chart: true,
    };
    let result = fxc::run_command(command, config_path.to_str()).await;
    info!(?result, "Convert finished");
    assert!(result.is_ok(), "convert failed: {result:?}");

    let history_requests = history_server.received_requests().await.unwrap();
    assert_eq!(history_requests.len(), 1);
    let country_requests = countries_server.received_requests().await.unwrap();
    assert_eq!(country_requests.len(), 2);
}

#[test_log::test(tokio::test)]
async fn test_convert_reports_api_error_without_failing() {
    let rates_server = test_utils::create_rates_mock_server(
        "USD",
        r#"{"result":"error","error-type":"invalid-key"}"#,
    )
    .await;
    let countries_server = test_utils::create_countries_mock_server().await;

    let temp_dir = TempDir::new().unwrap();
    let config_path = write_config(
        temp_dir.path(),
        &rates_server.uri(),
        "http://127.0.0.1:9",
        &countries_server.uri(),
    );

    let command = AppCommand::Convert {
        pair: Pair::new("USD", "INR").unwrap(),
        amount: None,
        chart: false,
    };
    let result = fxc::run_command(command, config_path.to_str()).await;
    assert!(result.is_ok(), "convert should report, not fail: {result:?}");
}

#[test_log::test(tokio::test)]
async fn test_invalid_amount_skips_fetch() {
    let rates_server = test_utils::create_rates_mock_server(
        "USD",
        r#"{"result":"success","conversion_rates":{"INR":83.0}}"#,
    )
    .await;

    let temp_dir = TempDir::new().unwrap();
    let config_path = write_config(
        temp_dir.path(),
        &rates_server.uri(),
        "http://127.0.0.1:9",
        "http://127.0.0.1:9",
    );

    let command = AppCommand::Convert {
        pair: Pair::new("USD", "INR").unwrap(),
        amount: Some("-5".to_string()),
        chart: false,
    };
    fxc::run_command(command, config_path.to_str()).await.unwrap();

    assert!(rates_server.received_requests().await.unwrap().is_empty());
}

#[test_log::test(tokio::test)]
async fn test_favorites_and_alerts_persist() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = write_config(
        temp_dir.path(),
        "http://127.0.0.1:9",
        "http://127.0.0.1:9",
        "http://127.0.0.1:9",
    );
    let config_path = config_path.to_str();
    let pair = Pair::new("EUR", "GBP").unwrap();

    fxc::run_command(
        AppCommand::Favorites(FavoriteAction::Add(pair.clone())),
        config_path,
    )
    .await
    .unwrap();
    fxc::run_command(
        AppCommand::Alerts(AlertAction::Add {
            pair: pair.clone(),
            direction: AlertDirection::Below,
            target_rate: 0.85,
        }),
        config_path,
    )
    .await
    .unwrap();

    let id = {
        let storage = DiskStorage::open(&temp_dir.path().join("data").join("storage")).unwrap();
        let favorites = Favorites::load(&storage).unwrap();
        assert!(favorites.contains(&pair));
        let book = AlertBook::load(&storage).unwrap();
        assert_eq!(book.len(), 1);
        let alert = book.iter().next().unwrap();
        assert!(alert.is_triggered(&pair, 0.84));
        alert.id
    };

    fxc::run_command(AppCommand::Alerts(AlertAction::Remove(id)), config_path)
        .await
        .unwrap();
    let result =
        fxc::run_command(AppCommand::Alerts(AlertAction::Remove(id)), config_path).await;
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("No alert with id"));
}

#[test_log::test(tokio::test)]
async fn test_missing_config_suggests_setup() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("missing.yaml");

    let result = fxc::run_command(AppCommand::Currencies, missing.to_str()).await;
    let err = result.unwrap_err().to_string();
    assert!(err.contains("fxc setup"), "unexpected error: {err}");
}
