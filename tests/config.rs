use chart_overlay_wasm::application::OverlayConfig;
use chart_overlay_wasm::domain::chart::Color;
use chart_overlay_wasm::domain::drawing::{DEFAULT_HIT_TOLERANCE_PX, DEFAULT_STORAGE_KEY};
use chart_overlay_wasm::domain::errors::AppError;
use chart_overlay_wasm::domain::market_data::Timeframe;

#[test]
fn empty_document_gives_defaults() {
    let config = OverlayConfig::from_json("{}").unwrap();
    assert_eq!(config, OverlayConfig::default());
    assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
    assert_eq!(config.hit_tolerance_px, DEFAULT_HIT_TOLERANCE_PX);
    assert_eq!(config.history_limit, 1000);
    assert_eq!(config.token_storage_key, "auth_token");
}

#[test]
fn partial_document_overrides_only_what_it_names() {
    let config = OverlayConfig::from_json(
        r##"{
            "api_base_url": "https://api.example",
            "timeframe": "H4",
            "style": {"gold": "#ffcc00", "draft_dash": [2, 2]}
        }"##,
    )
    .unwrap();

    assert_eq!(config.api_base_url, "https://api.example");
    assert_eq!(config.timeframe, Timeframe::H4);
    assert_eq!(config.style.gold, Color::from_hex(0xffcc00));
    assert_eq!(config.style.draft_dash, vec![2.0, 2.0]);
    assert_eq!(config.style.green, OverlayConfig::default().style.green);
    assert_eq!(config.stream_url_template, "/ws/markets/{symbol}/candles");
}

#[test]
fn invalid_documents_are_parse_errors() {
    assert!(matches!(OverlayConfig::from_json("{"), Err(AppError::Parse(_))));
    assert!(matches!(OverlayConfig::from_json(r#"{"timeframe": "M7"}"#), Err(AppError::Parse(_))));
    assert!(matches!(OverlayConfig::from_json(r#"{"style": {"gold": "gold"}}"#), Err(AppError::Parse(_))));
}

#[test]
fn colors_serialize_as_hex_strings() {
    let json = serde_json::to_value(OverlayConfig::default()).unwrap();
    assert_eq!(json["style"]["gold"], "#ffd700");

    let translucent = Color::try_from("#26a69a80".to_string()).unwrap();
    assert_eq!(translucent.to_hex(), 0x26a69a);
    assert!((translucent.a - 128.0 / 255.0).abs() < 1e-6);
    assert_eq!(String::from(translucent), "#26a69a80");
}
