//! End-to-end fragmentation-detector scenario: the same mint trades on a
//! CPMM_A pool and a CLMM pool at different effective prices; the detector
//! must emit exactly one opportunity naming the cheaper venue as the buy
//! side and the pricier venue as the sell side, net of both venues' fees.

use venue_arb_engine::cache::CacheRegistry;
use venue_arb_engine::decode::CLMM_PROGRAM;
use venue_arb_engine::detector::{detect_opportunities, DetectorConfig, PairIndex};
use venue_arb_engine::model::{ClmmPool, ConfigRecord, CpmmPool, PoolRecord, TickArray, UpdateSource, Venue, VaultRecord};
use venue_arb_engine::pubkey::Pubkey;
use venue_arb_engine::snapshot::{derive_tick_array_pda, SnapshotRadii};

fn vault(mint: Pubkey, amount: u64) -> VaultRecord {
    VaultRecord { mint, owner_program: Pubkey::ZERO, amount, data_len: 165 }
}

#[test]
fn cheaper_cpmm_and_pricier_clmm_emit_one_opportunity() {
    let registry = CacheRegistry::new();
    let index = PairIndex::new();

    let base_mint = Pubkey::new([1u8; 32]);
    let quote_mint = Pubkey::new([2u8; 32]);

    // CPMM_A: price = 1_000_000_000 / 1_000_000_000_000 = 0.001, fee 30bps.
    let cpmm_pool = Pubkey::new([10u8; 32]);
    let cpmm_base_vault = Pubkey::new([11u8; 32]);
    let cpmm_quote_vault = Pubkey::new([12u8; 32]);
    registry.pools.set(
        cpmm_pool,
        PoolRecord::Cpmm(CpmmPool {
            venue: Venue::CpmmA,
            base_vault: cpmm_base_vault,
            quote_vault: cpmm_quote_vault,
            base_mint,
            quote_mint,
            lp_supply: 0,
            fee_bps: Some(30),
            fee_numerator: 0,
            fee_denominator: 0,
        }),
        1,
        0,
        0,
        UpdateSource::Stream,
        None,
    );
    registry.vaults.set(cpmm_base_vault, vault(base_mint, 1_000_000_000_000), 1, 0, 0, UpdateSource::Stream, None);
    registry.vaults.set(cpmm_quote_vault, vault(quote_mint, 1_000_000_000), 1, 0, 0, UpdateSource::Stream, None);
    index.add(base_mint, quote_mint, Venue::CpmmA, cpmm_pool);

    // CLMM: sqrt_price_x64 encodes price ~= 0.00102, fee 25bps, no
    // initialized ticks nearby so the probe trade never crosses.
    let clmm_pool = Pubkey::new([20u8; 32]);
    let clmm_base_vault = Pubkey::new([21u8; 32]);
    let clmm_quote_vault = Pubkey::new([22u8; 32]);
    let amm_config = Pubkey::new([23u8; 32]);
    let tick_spacing: u16 = 60;
    let mut tick_bitmap = [0u64; 16];
    tick_bitmap[8] |= 1; // bit 512 set: the array covering tick_current=0 exists

    registry.pools.set(
        clmm_pool,
        PoolRecord::Clmm(ClmmPool {
            base_vault: clmm_base_vault,
            quote_vault: clmm_quote_vault,
            base_mint,
            quote_mint,
            amm_config,
            sqrt_price_x64: 589_141_760_749_785_344,
            tick_current: 0,
            tick_spacing,
            liquidity: 1_000_000_000_000_000,
            tick_bitmap,
            bitmap_extension: None,
        }),
        1,
        0,
        0,
        UpdateSource::Stream,
        None,
    );
    registry.vaults.set(clmm_base_vault, vault(base_mint, 1_000_000_000_000), 1, 0, 0, UpdateSource::Stream, None);
    registry.vaults.set(clmm_quote_vault, vault(quote_mint, 1_000_000_000), 1, 0, 0, UpdateSource::Stream, None);
    registry.configs.set(amm_config, ConfigRecord { fee_bps: 25, protocol_fee_bps: 0 }, 1, 0, 0, UpdateSource::Stream, None);

    let tick_array_pda = derive_tick_array_pda(&CLMM_PROGRAM, &clmm_pool, 0);
    registry.tick_arrays.set(
        tick_array_pda,
        (clmm_pool, 0),
        TickArray::virtual_empty(clmm_pool, 0),
        1,
        0,
        0,
        UpdateSource::Stream,
    );
    index.add(base_mint, quote_mint, Venue::Clmm, clmm_pool);

    let config = DetectorConfig { min_spread_bps: 20, probe_amount: 1_000_000, ..DetectorConfig::default() };
    let opportunities = detect_opportunities(&registry, &index, SnapshotRadii::default(), false, &config);

    assert_eq!(opportunities.len(), 1, "expected exactly one fragmentation opportunity");
    let opp = opportunities[0];
    assert_eq!(opp.mint, base_mint);
    assert_eq!(opp.buy.venue, Venue::CpmmA, "cheaper venue (CPMM_A) should be the buy side");
    assert_eq!(opp.sell.venue, Venue::Clmm, "pricier venue (CLMM) should be the sell side");
    assert!(opp.net_spread_bps >= config.min_spread_bps);
    assert!(opp.gross_spread_bps > opp.net_spread_bps, "net spread must be gross minus both venues' fees");
}
