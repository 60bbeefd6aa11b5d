use chart_overlay_wasm::domain::drawing::KeyValueStorage;
use chart_overlay_wasm::infrastructure::auth::{
    LayeredTokenProvider, StaticTokenSource, StorageTokenSource, TokenProvider,
};
use chart_overlay_wasm::infrastructure::http::{MAX_HISTORY_LIMIT, OverlayHttpClient, clamp_limit};
use chart_overlay_wasm::infrastructure::storage::MemoryStorage;
use chart_overlay_wasm::domain::market_data::{Symbol, Timeframe};

fn provider(inline: Option<&str>, session: &MemoryStorage, local: &MemoryStorage) -> LayeredTokenProvider {
    LayeredTokenProvider::new(vec![
        Box::new(StaticTokenSource(inline.map(str::to_string))),
        Box::new(StorageTokenSource::new("session", Box::new(session.clone()), "auth_token")),
        Box::new(StorageTokenSource::new("local", Box::new(local.clone()), "auth_token")),
    ])
}

#[test]
fn inline_token_beats_stored_ones() {
    let session = MemoryStorage::new().with_entry("auth_token", "from-session");
    let local = MemoryStorage::new().with_entry("auth_token", "from-local");
    assert_eq!(provider(Some("inline"), &session, &local).token().as_deref(), Some("inline"));
}

#[test]
fn session_store_beats_local_store() {
    let session = MemoryStorage::new().with_entry("auth_token", "from-session");
    let local = MemoryStorage::new().with_entry("auth_token", "from-local");
    assert_eq!(provider(None, &session, &local).token().as_deref(), Some("from-session"));
}

#[test]
fn blank_values_fall_through() {
    let session = MemoryStorage::new().with_entry("auth_token", "   ");
    let local = MemoryStorage::new().with_entry("auth_token", " from-local\n");
    assert_eq!(provider(Some(""), &session, &local).token().as_deref(), Some("from-local"));
}

#[test]
fn token_is_read_on_every_query() {
    let session = MemoryStorage::new();
    let local = MemoryStorage::new();
    let tokens = provider(None, &session, &local);
    assert_eq!(tokens.token(), None);

    local.set("auth_token", "later").unwrap();
    assert_eq!(tokens.token().as_deref(), Some("later"));
}

#[test]
fn extra_sources_are_consulted_last() {
    let tokens = LayeredTokenProvider::default()
        .with_source(Box::new(StaticTokenSource(None)))
        .with_source(Box::new(StaticTokenSource(Some("fallback".to_string()))));
    assert_eq!(tokens.token().as_deref(), Some("fallback"));
}

#[test]
fn request_urls_carry_symbol_timeframe_and_limit() {
    let client = OverlayHttpClient::new("https://api.example/");
    assert_eq!(
        client.candles_url(&Symbol::from("eurusd"), Timeframe::H1, 1000),
        "https://api.example/api/markets/EURUSD/candles?tf=H1&limit=1000"
    );
    assert_eq!(
        client.annotations_url(&Symbol::from("EURUSD")),
        "https://api.example/api/markets/EURUSD/annotations"
    );
}

#[test]
fn history_limit_is_clamped() {
    assert_eq!(clamp_limit(0), 1);
    assert_eq!(clamp_limit(250), 250);
    assert_eq!(clamp_limit(1_000_000), MAX_HISTORY_LIMIT);
}
