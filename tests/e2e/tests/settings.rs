//! Engine construction from configuration files on disk

use e2e_tests::*;
use engine_config::load_settings;
use pool_state::AmmEngine;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_engine_from_config_file_with_overlay() {
    init_test_logging();
    let dir = tempdir().unwrap();
    let base = dir.path().join("arcswap.toml");
    fs::write(&base, DEPLOYMENT_TOML).unwrap();

    fs::create_dir(dir.path().join("environments")).unwrap();
    fs::write(
        dir.path().join("environments").join("lowfee.toml"),
        "[engine]\nfee_numerator = 1\n",
    )
    .unwrap();

    let base_settings = load_settings(Some(&base), None).unwrap();
    let overlaid = load_settings(Some(&base), Some("lowfee")).unwrap();
    assert_eq!(base_settings.engine.fee_numerator, 3);
    assert_eq!(overlaid.engine.fee_numerator, 1);

    let standard = AmmEngine::from_settings(&base_settings).unwrap();
    let cheap = AmmEngine::from_settings(&overlaid).unwrap();
    let pool = addr(TKA_TKB_POOL);
    let amount = tka().parse_amount("25").unwrap();

    let standard_out = standard.quote_swap(&pool, &tka().address, amount).unwrap();
    let cheap_out = cheap.quote_swap(&pool, &tka().address, amount).unwrap();
    assert!(cheap_out > standard_out);
    assert_eq!(cheap.pool_info(&pool).unwrap().fee_numerator, 1);
}

#[test]
fn test_rendered_settings_rebuild_the_same_engine() {
    let settings = deployment_settings();
    let rendered = settings.to_toml_string().unwrap();

    let dir = tempdir().unwrap();
    let path = dir.path().join("rendered.toml");
    fs::write(&path, rendered).unwrap();

    let reloaded = load_settings(Some(&path), None).unwrap();
    let a = AmmEngine::from_settings(&settings).unwrap();
    let b = AmmEngine::from_settings(&reloaded).unwrap();
    assert_eq!(a.pools(), b.pools());
    assert_eq!(a.bridge_token(), b.bridge_token());
}

#[test]
fn test_snapshot_survives_process_boundary() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("engine.bin");

    let engine = deployed_engine();
    let route = engine.find_route(&usdt().address, &tkb().address).unwrap();
    let mut amount = usdt().parse_amount("250").unwrap();
    for hop in &route.hops {
        amount = engine.execute_swap(&hop.pool, &hop.token_in, amount).unwrap();
    }
    engine
        .provide_liquidity(&addr(TKA_TKB_POOL), &holder(7), 10u128.pow(18), 10u128.pow(18))
        .unwrap();
    fs::write(&path, engine.snapshot().unwrap()).unwrap();

    let restored = AmmEngine::default();
    restored.restore(&fs::read(&path).unwrap()).unwrap();
    assert_eq!(restored.pools(), engine.pools());
    assert_eq!(
        restored.share_balance(&addr(TKA_TKB_POOL), &holder(7)),
        engine.share_balance(&addr(TKA_TKB_POOL), &holder(7))
    );
    assert_eq!(
        restored.find_route(&usdt().address, &tkb().address).map(|r| r.pools()),
        Err(types::AmmError::NoRouteFound {
            from: usdt().address,
            to: tkb().address
        }),
        "a default engine carries no bridge token"
    );
    assert!(restored
        .find_route_via(&usdt().address, &tkb().address, Some(&tka().address))
        .is_ok());
}

#[test]
fn test_bad_configuration_is_reported() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(
        &path,
        DEPLOYMENT_TOML.replace("token_b = \"TKB\"", "token_b = \"TKA\""),
    )
    .unwrap();

    let settings = load_settings(Some(&path), None);
    let engine = settings.and_then(|s| AmmEngine::from_settings(&s));
    assert!(engine.is_err());
}

#[test]
fn test_shipped_configuration_matches_fixture() {
    let shipped = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/arcswap.toml");
    let settings = load_settings(Some(&shipped), Some("dev")).unwrap();
    assert!(settings.logging.level.starts_with("debug"));

    let engine = AmmEngine::from_settings(&settings).unwrap();
    assert_eq!(engine.pools(), deployed_engine().pools());
    assert_eq!(engine.bridge_token(), Some(tka().address));
}
