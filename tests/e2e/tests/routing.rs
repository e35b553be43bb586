//! Route discovery and end-to-end quoting over the deployment pools

use e2e_tests::*;
use pool_state::RouteKind;
use types::{Address, AmmError};

#[test]
fn test_direct_pair_routes_in_one_hop() {
    init_test_logging();
    let engine = deployed_engine();
    let route = engine.find_route(&tkb().address, &tka().address).unwrap();

    assert!(route.is_direct());
    assert_eq!(route.pools(), vec![addr(TKA_TKB_POOL)]);
    assert_eq!(route.hops[0].token_in, tkb().address);
    assert_eq!(route.hops[0].token_out, tka().address);
}

#[test]
fn test_stable_to_token_goes_through_bridge() {
    init_test_logging();
    let engine = deployed_engine();
    let route = engine.find_route(&usdc().address, &tkb().address).unwrap();

    assert_eq!(route.kind, RouteKind::ViaBridge { bridge: tka().address });
    assert_eq!(route.pools(), vec![addr(USDC_TKA_POOL), addr(TKA_TKB_POOL)]);
    assert_eq!(route.hops[0].token_out, tka().address);
    assert_eq!(route.hops[1].token_in, tka().address);

    let between_stables = engine.find_route(&usdc().address, &usdt().address).unwrap();
    assert_eq!(
        between_stables.pools(),
        vec![addr(USDC_TKA_POOL), addr(USDT_TKA_POOL)]
    );
}

#[test]
fn test_direct_pool_beats_bridge() {
    let engine = deployed_engine();
    let direct = Address::from_low_u64(0xD1EC7);
    engine
        .create_pool(direct, "USDC/TKB", usdc().address, tkb().address)
        .unwrap();

    let route = engine.find_route(&usdc().address, &tkb().address).unwrap();
    assert!(route.is_direct());
    assert_eq!(route.pools(), vec![direct]);
}

#[test]
fn test_unroutable_pairs() {
    let engine = deployed_engine();
    let stranger = Address::from_low_u64(0x5757);

    assert_eq!(
        engine.find_route(&stranger, &tka().address),
        Err(AmmError::NoRouteFound {
            from: stranger,
            to: tka().address
        })
    );
    assert_eq!(
        engine.find_route(&tka().address, &tka().address),
        Err(AmmError::IdenticalTokens(tka().address))
    );

    // without a bridge only direct pairs resolve
    assert!(matches!(
        engine.find_route_via(&usdc().address, &tkb().address, None),
        Err(AmmError::NoRouteFound { .. })
    ));
}

#[test]
fn test_route_quote_matches_hop_by_hop_execution() {
    init_test_logging();
    let engine = deployed_engine();
    let amount_in = usdc().parse_amount("100").unwrap();
    let route = engine.find_route(&usdc().address, &tkb().address).unwrap();

    let before = engine.pools();
    let quote = engine.quote_route(&route, amount_in).unwrap();
    assert_eq!(engine.pools(), before, "quoting must not touch reserves");

    assert_eq!(quote.hops.len(), 2);
    assert_eq!(quote.hops[0].amount_in, amount_in);
    assert_eq!(quote.hops[1].amount_in, quote.hops[0].amount_out);
    assert_eq!(quote.amount_out, quote.hops[1].amount_out);

    // settle each hop in order with nothing else trading in between
    let mut amount = amount_in;
    for hop in &route.hops {
        amount = engine.execute_swap(&hop.pool, &hop.token_in, amount).unwrap();
    }
    assert_eq!(amount, quote.amount_out);
}

#[test]
fn test_route_quote_through_empty_pool_fails() {
    let engine = EngineFixture::new()
        .with_seed(USDC_TKA_POOL, 2_000_000, 1_000_000)
        .build();
    let route = engine.find_route(&usdc().address, &tkb().address).unwrap();
    assert_eq!(route.hops.len(), 2);

    assert_eq!(
        engine.quote_route(&route, 10_000),
        Err(AmmError::InsufficientLiquidity)
    );
}

#[test]
fn test_pools_for_token_index() {
    let engine = deployed_engine();
    let mut expected = vec![addr(TKA_TKB_POOL), addr(USDC_TKA_POOL), addr(USDT_TKA_POOL)];
    expected.sort();
    assert_eq!(engine.pools_for_token(&tka().address), expected);
    assert_eq!(engine.pools_for_token(&usdt().address), vec![addr(USDT_TKA_POOL)]);
}
