//! Pool lifecycle: seed, trade, top up, drain

use e2e_tests::*;
use pool_state::{LiquidityManager, Pool, PoolLedger, PoolParams, SwapEngine, LOCK_SINK};
use std::sync::Arc;
use types::AmmError;

#[test]
fn test_first_deposit_locks_minimum_liquidity() {
    init_test_logging();
    let engine = EngineFixture::new().build();
    let pool = addr(TKA_TKB_POOL);

    // isqrt(1000 * 1000) == MINIMUM_LIQUIDITY, nothing left to mint
    assert_eq!(
        engine.add_liquidity(&pool, 1_000, 1_000),
        Err(AmmError::InsufficientInitialLiquidity {
            root: 1_000,
            minimum: 1_000
        })
    );

    let receipt = engine.provide_liquidity(&pool, &holder(1), 10_000, 10_000).unwrap();
    assert_eq!(receipt.shares_minted, 9_000);
    assert_eq!(receipt.shares_locked, 1_000);
    assert_eq!(engine.total_shares(&pool).unwrap(), 10_000);
    assert_eq!(engine.share_balance(&pool, &LOCK_SINK), 1_000);

    validate_share_accounting(&engine).unwrap();
    validate_empty_state(&engine).unwrap();
}

#[test]
fn test_reference_swap_against_thousand_reserves() {
    init_test_logging();
    let engine = EngineFixture::new().build();
    let pool = addr(TKA_TKB_POOL);
    let (tka, tkb) = (tka().address, tkb().address);

    engine.provide_liquidity(&pool, &holder(1), 10_000, 10_000).unwrap();
    engine.withdraw_liquidity(&pool, &holder(1), 9_000).unwrap();
    assert_eq!(engine.get_reserves(&pool).unwrap(), (1_000, 1_000));

    // floor(100 * 997 * 1000 / (1000 * 1000 + 100 * 997)) = 90
    assert_eq!(engine.quote_swap(&pool, &tka, 100).unwrap(), 90);
    assert_eq!(engine.quote_amount_in(&pool, &tka, 90).unwrap(), 100);

    let validator = InvariantValidator::capture(&engine);
    let quote = engine.execute_swap_detailed(&pool, &tka, 100).unwrap();
    assert_eq!(quote.amount_out, 90);
    assert_eq!(quote.token_out, tkb);
    assert_eq!(engine.get_reserves(&pool).unwrap(), (1_100, 910));

    validator.validate_k_non_decreasing(&engine).unwrap();
    validator
        .validate_swap_deltas(&engine, &pool, &tka, 100, 90)
        .unwrap();
}

#[test]
fn test_full_drain_returns_pool_to_empty() {
    init_test_logging();
    let pool = addr(TKA_TKB_POOL);
    let (tka, tkb) = (tka().address, tkb().address);
    let ledger = Arc::new(PoolLedger::new());
    ledger
        .register(Pool::new(pool, "TKA/TKB", tka, tkb, PoolParams::default()).unwrap())
        .unwrap();
    let liquidity = LiquidityManager::new(ledger.clone());
    let swaps = SwapEngine::new(ledger.clone());

    liquidity.add_liquidity(&pool, 10_000, 10_000).unwrap();
    swaps.execute_swap(&pool, &tka, 500).unwrap();
    let reserves = ledger.reserves(&pool).unwrap();
    let supply = ledger.total_shares(&pool).unwrap();

    // the component layer may burn the whole supply, locked minimum included
    let receipt = liquidity.remove_liquidity(&pool, supply).unwrap();
    assert_eq!((receipt.amount_a, receipt.amount_b), reserves);
    assert_eq!(ledger.reserves(&pool).unwrap(), (0, 0));
    assert_eq!(ledger.total_shares(&pool).unwrap(), 0);

    assert_eq!(
        swaps.quote_swap(&pool, &tka, 10).map(|q| q.amount_out),
        Err(AmmError::InsufficientLiquidity)
    );

    // an emptied pool accepts a fresh first deposit
    let receipt = liquidity.add_liquidity(&pool, 4_000, 4_000).unwrap();
    assert_eq!(receipt.shares_minted, 3_000);
    assert_eq!(receipt.shares_locked, 1_000);
}

#[test]
fn test_engine_drain_stops_at_locked_minimum() {
    init_test_logging();
    let engine = EngineFixture::new().with_seed(TKA_TKB_POOL, 10_000, 10_000).build();
    let pool = addr(TKA_TKB_POOL);

    engine.execute_swap(&pool, &tka().address, 500).unwrap();
    let supply = engine.total_shares(&pool).unwrap();
    assert_eq!(engine.unattributed_shares(&pool).unwrap(), supply - 1_000);

    assert_eq!(
        engine.remove_liquidity(&pool, supply),
        Err(AmmError::InsufficientShares {
            requested: supply,
            available: supply - 1_000
        })
    );
    engine.remove_liquidity(&pool, supply - 1_000).unwrap();

    assert_eq!(engine.total_shares(&pool).unwrap(), 1_000);
    let (reserve_a, reserve_b) = engine.get_reserves(&pool).unwrap();
    assert!(reserve_a > 0 && reserve_b > 0);
    validate_share_accounting(&engine).unwrap();
    validate_empty_state(&engine).unwrap();
}

#[test]
fn test_holder_shares_cannot_be_burned_at_pool_level() {
    init_test_logging();
    let engine = EngineFixture::new().build();
    let pool = addr(TKA_TKB_POOL);

    engine.provide_liquidity(&pool, &holder(1), 10_000, 10_000).unwrap();
    let supply = engine.total_shares(&pool).unwrap();
    assert_eq!(
        engine.remove_liquidity(&pool, supply),
        Err(AmmError::InsufficientShares {
            requested: supply,
            available: 0
        })
    );
    assert_eq!(engine.get_reserves(&pool).unwrap(), (10_000, 10_000));

    // a later depositor's liquidity stays theirs
    engine.provide_liquidity(&pool, &holder(2), 100_000, 100_000).unwrap();
    let receipt = engine.withdraw_liquidity(&pool, &holder(1), 9_000).unwrap();
    assert_eq!((receipt.amount_a, receipt.amount_b), (9_000, 9_000));
    assert_eq!(engine.share_balance(&pool, &holder(2)), 100_000);

    validate_share_accounting(&engine).unwrap();
    let held: u128 = engine.holders(&pool).iter().map(|(_, shares)| *shares).sum();
    assert_eq!(held, engine.total_shares(&pool).unwrap());
}

#[test]
fn test_second_depositor_gets_proportional_shares() {
    init_test_logging();
    let engine = EngineFixture::new().build();
    let pool = addr(USDC_TKA_POOL);

    engine.provide_liquidity(&pool, &holder(1), 20_000, 10_000).unwrap();
    let supply = engine.total_shares(&pool).unwrap();

    // unbalanced deposit mints on the smaller leg; the excess is donated
    let receipt = engine.provide_liquidity(&pool, &holder(2), 2_000, 5_000).unwrap();
    assert_eq!(receipt.shares_minted, supply / 10);
    assert_eq!(engine.get_reserves(&pool).unwrap(), (22_000, 15_000));

    assert_eq!(
        engine.optimal_counterpart(&pool, &usdc().address, 2_200).unwrap(),
        1_500
    );
    validate_share_accounting(&engine).unwrap();
}

#[test]
fn test_holder_cannot_withdraw_more_than_owned() {
    let engine = EngineFixture::new().build();
    let pool = addr(TKA_TKB_POOL);
    engine.provide_liquidity(&pool, &holder(1), 10_000, 10_000).unwrap();
    engine.provide_liquidity(&pool, &holder(2), 1_000, 1_000).unwrap();

    assert_eq!(
        engine.withdraw_liquidity(&pool, &holder(2), 1_001),
        Err(AmmError::InsufficientShares {
            requested: 1_001,
            available: 1_000
        })
    );
    assert!(matches!(
        engine.withdraw_liquidity(&pool, &LOCK_SINK, 1),
        Err(AmmError::InsufficientShares { available: 0, .. })
    ));

    let receipt = engine.withdraw_liquidity(&pool, &holder(2), 1_000).unwrap();
    assert_eq!((receipt.amount_a, receipt.amount_b), (1_000, 1_000));
    assert_eq!(engine.share_balance(&pool, &holder(1)), 9_000);
}

#[test]
fn test_rejections_leave_state_untouched() {
    let engine = EngineFixture::new().with_seed(TKA_TKB_POOL, 10_000, 10_000).build();
    let pool = addr(TKA_TKB_POOL);
    let before = engine.pools();

    assert_eq!(engine.execute_swap(&pool, &tka().address, 0), Err(AmmError::ZeroAmount));
    assert!(matches!(
        engine.execute_swap(&pool, &usdc().address, 10),
        Err(AmmError::UnknownToken { .. })
    ));
    assert_eq!(
        engine.execute_swap(&addr(USDT_ADDRESS), &tka().address, 10),
        Err(AmmError::PoolNotFound(addr(USDT_ADDRESS)))
    );
    assert_eq!(engine.add_liquidity(&pool, 0, 10), Err(AmmError::ZeroAmount));
    assert!(engine.remove_liquidity(&pool, 10_001).is_err());

    assert_eq!(engine.pools(), before);
}

#[test]
fn test_deployment_seeds_every_pool() {
    init_test_logging();
    let engine = deployed_engine();
    let stats = engine.stats();
    assert_eq!(stats.total_pools, 3);
    assert_eq!(stats.seeded_pools, 3);
    assert_eq!(stats.total_deposits, 3);

    let one = 10u128.pow(18);
    let info = engine.pool_info(&addr(TKA_TKB_POOL)).unwrap();
    assert_eq!((info.reserve_a, info.reserve_b), (10_000 * one, 10_000 * one));
    assert_eq!(info.total_shares, 10_000 * one);

    let usdc_pool = engine.pool_info(&addr(USDC_TKA_POOL)).unwrap();
    assert_eq!(usdc_pool.reserve_a, 20_000 * 10u128.pow(6));
    assert_eq!(usdc_pool.reserve_b, 10_000 * one);
    validate_empty_state(&engine).unwrap();
}
