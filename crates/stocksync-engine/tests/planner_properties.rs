//! Property tests for the filter → index → plan pipeline.

use proptest::collection::{hash_set, vec};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use stocksync_engine::{
    build_index, filter_stock, plan, Blacklist, CatalogEntry, Operation, StockRecord, StockSpec,
    SyncSettings,
};

fn spec_strategy() -> impl Strategy<Value = StockSpec> {
    prop_oneof![
        Just(StockSpec::Eu),
        Just(StockSpec::Global),
        Just(StockSpec::Other),
    ]
}

fn record(sku: String, spec: StockSpec, quantity: u32) -> StockRecord {
    StockRecord {
        sku,
        spec,
        price: Decimal::new(1000, 2),
        stock_quantity: quantity,
        model: None,
        color: None,
        category: None,
        ean: None,
        image_url: None,
        description: None,
    }
}

fn entry(id: u64, sku: Option<String>) -> CatalogEntry {
    CatalogEntry { id, sku }
}

/// Distinct SKUs shared between feed and catalog, a blacklist drawn from
/// them, and catalog entries with optional SKUs.
fn scenario() -> impl Strategy<Value = (Vec<StockRecord>, Vec<CatalogEntry>, Blacklist)> {
    hash_set("[A-Z]{1,3}[0-9]{1,2}", 1..24).prop_flat_map(|skus| {
        let skus: Vec<String> = skus.into_iter().collect();
        let n = skus.len();
        (
            Just(skus),
            vec((spec_strategy(), 0u32..50, any::<bool>()), n),
            vec((any::<bool>(), any::<bool>()), n),
            0usize..4,
        )
            .prop_map(|(skus, feed_flags, catalog_flags, blacklisted)| {
                let mut records = Vec::new();
                let mut listing = Vec::new();
                for (i, sku) in skus.iter().enumerate() {
                    let (spec, quantity, in_feed) = feed_flags[i];
                    if in_feed {
                        records.push(record(sku.clone(), spec, quantity));
                    }
                    let (in_catalog, with_sku) = catalog_flags[i];
                    if in_catalog {
                        listing.push(entry(i as u64 + 1, with_sku.then(|| sku.clone())));
                    }
                }
                let blacklist = skus.iter().take(blacklisted).cloned().collect();
                (records, listing, blacklist)
            })
    })
}

fn settings(blacklist: Blacklist) -> SyncSettings {
    SyncSettings {
        blacklist,
        ..SyncSettings::default()
    }
}

proptest! {
    #[test]
    fn prop_blacklisted_sku_never_in_plan((records, listing, blacklist) in scenario()) {
        let settings = settings(blacklist);
        let filtered = filter_stock(records, &settings.blacklist);
        let index = build_index(listing, &settings.blacklist);
        let result = plan(&filtered, &HashSet::new(), &index, &settings);

        for op in &result.operations {
            if let Some(sku) = op.sku() {
                prop_assert!(!settings.blacklist.contains(sku), "{op} touches blacklisted SKU");
            }
        }
    }

    #[test]
    fn prop_each_eligible_sku_gets_one_create_or_update((records, listing, blacklist) in scenario()) {
        let settings = settings(blacklist);
        let filtered = filter_stock(records, &settings.blacklist);
        let index = build_index(listing, &settings.blacklist);
        let result = plan(&filtered, &HashSet::new(), &index, &settings);

        for record in &filtered {
            let creates = result
                .operations
                .iter()
                .filter(|op| matches!(op, Operation::Create(r) if r.sku == record.sku))
                .count();
            let updates: Vec<u64> = result
                .operations
                .iter()
                .filter_map(|op| match op {
                    Operation::UpdateStock { entry_id, sku, .. } if *sku == record.sku => Some(*entry_id),
                    _ => None,
                })
                .collect();

            match index.get(&record.sku) {
                Some(entry) => {
                    prop_assert_eq!(creates, 0);
                    prop_assert_eq!(updates, vec![entry.id]);
                }
                None => {
                    prop_assert_eq!(creates, 1);
                    prop_assert!(updates.is_empty());
                }
            }
        }
    }

    #[test]
    fn prop_ineligible_spec_never_planned((records, listing, blacklist) in scenario()) {
        let settings = settings(blacklist);
        let other: Vec<String> = records
            .iter()
            .filter(|r| r.spec == StockSpec::Other)
            .map(|r| r.sku.clone())
            .collect();
        let filtered = filter_stock(records, &settings.blacklist);
        let index = build_index(listing, &settings.blacklist);
        let result = plan(&filtered, &HashSet::new(), &index, &settings);

        for op in &result.operations {
            if let Operation::Create(r) = op {
                prop_assert!(!other.contains(&r.sku));
            }
            if let Operation::UpdateStock { sku, .. } = op {
                prop_assert!(!other.contains(sku));
            }
        }
    }

    #[test]
    fn prop_each_entry_targeted_at_most_once((records, listing, blacklist) in scenario()) {
        let settings = settings(blacklist);
        let filtered = filter_stock(records, &settings.blacklist);
        let index = build_index(listing, &settings.blacklist);
        let result = plan(&filtered, &HashSet::new(), &index, &settings);

        let mut targets: HashMap<u64, usize> = HashMap::new();
        for id in result.operations.iter().filter_map(Operation::entry_id) {
            *targets.entry(id).or_default() += 1;
        }
        prop_assert!(targets.values().all(|&n| n == 1));
    }

    #[test]
    fn prop_planner_is_idempotent((records, listing, blacklist) in scenario()) {
        let settings = settings(blacklist);
        let filtered = filter_stock(records, &settings.blacklist);
        let index = build_index(listing, &settings.blacklist);

        let first = plan(&filtered, &HashSet::new(), &index, &settings);
        let second = plan(&filtered, &HashSet::new(), &index, &settings);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_skipped_skus_never_zeroed((records, listing, blacklist) in scenario()) {
        let settings = settings(blacklist);
        let skipped: HashSet<String> = listing.iter().filter_map(|e| e.sku.clone()).collect();
        let filtered = filter_stock(records, &settings.blacklist);
        let index = build_index(listing, &settings.blacklist);
        let result = plan(&filtered, &skipped, &index, &settings);

        for op in &result.operations {
            if let Operation::ZeroStock { sku: Some(sku), .. } = op {
                prop_assert!(!skipped.contains(sku), "{op} zeroes a SKU the feed still lists");
            }
        }
    }
}
