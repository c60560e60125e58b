use mockito::{Matcher, Server};
use serde_json::json;
use spotify_pkce_login as lib;
use lib::api::spotify::SpotifyClient;
use lib::config::Config;
use lib::error::AuthError;

fn config_for(base: &str) -> Config {
    Config {
        client_id: "test_id".into(),
        auth_base: base.to_string(),
        api_base: format!("{}/v1", base),
        ..Config::default()
    }
}

#[test]
fn exchange_sends_verifier_and_basic_client_id() {
    let mut server = Server::new();
    let m = server
        .mock("POST", "/api/token")
        .match_header("authorization", "Basic dGVzdF9pZA==")
        .match_header("content-type", "application/x-www-form-urlencoded")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("grant_type=authorization_code".into()),
            Matcher::Regex("code=CODE1".into()),
            Matcher::Regex("client_id=test_id".into()),
            Matcher::Regex("code_verifier=abc123".into()),
            Matcher::Regex("redirect_uri=http%3A%2F%2Flocalhost%3A8081%2F".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"access_token": "TOK1", "token_type": "Bearer", "expires_in": 3600}).to_string())
        .create();

    let client = SpotifyClient::new(&config_for(&server.url()));
    let rt = tokio::runtime::Runtime::new().expect("rt");
    let grant = rt
        .block_on(client.exchange_code("CODE1", Some("abc123")))
        .expect("exchange");

    assert_eq!(grant.access_token.secret(), "TOK1");
    assert_eq!(grant.token_type, "Bearer");
    assert!(grant.expires_at.is_some());
    m.assert();
}

#[test]
fn missing_verifier_fails_before_any_request() {
    let mut server = Server::new();
    let m = server.mock("POST", "/api/token").expect(0).create();

    let client = SpotifyClient::new(&config_for(&server.url()));
    let rt = tokio::runtime::Runtime::new().expect("rt");
    for verifier in [None, Some("")] {
        let err = rt
            .block_on(client.exchange_code("CODE1", verifier))
            .expect_err("must fail");
        assert!(matches!(
            err.downcast_ref::<AuthError>(),
            Some(AuthError::MissingVerifier)
        ));
    }
    m.assert();
}

#[test]
fn token_endpoint_error_is_not_retried() {
    let mut server = Server::new();
    let m = server
        .mock("POST", "/api/token")
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(json!({"error": "invalid_grant"}).to_string())
        .expect(1)
        .create();

    let client = SpotifyClient::new(&config_for(&server.url()));
    let rt = tokio::runtime::Runtime::new().expect("rt");
    let err = rt
        .block_on(client.exchange_code("CODE1", Some("abc123")))
        .expect_err("must fail");

    match err.downcast_ref::<AuthError>() {
        Some(AuthError::Http { status, body, .. }) => {
            assert_eq!(status.as_u16(), 400);
            assert!(body.contains("invalid_grant"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    m.assert();
}

#[test]
fn token_response_without_access_token_is_a_decode_error() {
    let mut server = Server::new();
    let _m = server
        .mock("POST", "/api/token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"token_type":"Bearer"}"#)
        .create();

    let client = SpotifyClient::new(&config_for(&server.url()));
    let rt = tokio::runtime::Runtime::new().expect("rt");
    let err = rt
        .block_on(client.exchange_code("CODE1", Some("abc123")))
        .expect_err("must fail");
    let typed = err.downcast_ref::<AuthError>();
    assert!(matches!(typed, Some(AuthError::TokenDecode(_))));
    assert_eq!(
        format!("{:#}", err),
        format!(
            "token response did not match schema: {}",
            std::error::Error::source(typed.unwrap()).unwrap()
        )
    );
}
