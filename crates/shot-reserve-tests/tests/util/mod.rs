use std::collections::HashSet;

use eyre::Result;
use futures::future::join_all;
use shot_reserve_core::{ClaimOutcome, Inventory, Item};
use shot_reserve_tests::{Api, TestCtx};

/// Fires `count` claims for `item` at once, each from its own clone of the
/// API so that they spread over all balancer threads.
#[allow(unused)]
pub async fn claim_concurrently(api: &Api, item: Item, count: usize) -> Result<Vec<ClaimOutcome>> {
    let requests = (0..count).map(|i| {
        let api = api.clone();
        tokio::spawn(async move { api.claim_shot(&format!("Guest {i}"), item).await })
    });
    let mut outcomes = Vec::with_capacity(count);
    for outcome in join_all(requests).await {
        outcomes.push(outcome???);
    }
    Ok(outcomes)
}

/// Checks that accepted outcomes carry distinct codes and returns them.
#[allow(unused)]
pub fn accepted_codes(outcomes: &[ClaimOutcome]) -> HashSet<String> {
    let accepted: Vec<_> = outcomes.iter().filter(|o| o.ok).collect();
    let codes: HashSet<String> = accepted
        .iter()
        .map(|o| {
            o.claim_code
                .clone()
                .expect("An accepted claim must carry a claim code.")
        })
        .collect();
    assert_eq!(
        codes.len(),
        accepted.len(),
        "No two accepted claims may share a claim code."
    );
    codes
}

/// Reads the public inventory and checks it against `expected`.
#[allow(unused)]
pub async fn assert_inventory(ctx: &TestCtx, expected: Inventory) -> Result<()> {
    let inventory = ctx.api.get_inventory().await??;
    assert_eq!(
        inventory, expected,
        "The public inventory must be {expected:?}, got {inventory:?}."
    );
    Ok(())
}
