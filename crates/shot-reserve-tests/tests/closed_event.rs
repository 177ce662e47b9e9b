use eyre::Result;
use shot_reserve_core::{Inventory, Item};
use shot_reserve_tests::TestCtxBuilder;
use util::{assert_inventory, claim_concurrently};

mod util;

#[tokio::test]
#[ntest::timeout(20_000)]
async fn test_closed_event_rejects_every_claim() -> Result<()> {
    let ctx = TestCtxBuilder::new()
        .with_inventory(10, 10)
        .closed()
        .build()
        .await?;

    assert!(!ctx.api.get_settings().await??.is_open);

    let outcomes = claim_concurrently(&ctx.api, Item::Tequila, 20).await?;
    for outcome in &outcomes {
        assert!(!outcome.ok, "No claim may succeed while the event is closed.");
        assert_eq!(outcome.message, "Reservations are closed.");
    }
    assert_inventory(&ctx, Inventory { habu: 10, tequila: 10 }).await?;

    ctx.finish().await;
    Ok(())
}

#[tokio::test]
#[ntest::timeout(20_000)]
async fn test_closing_and_reopening() -> Result<()> {
    let ctx = TestCtxBuilder::new().with_inventory(2, 2).build().await?;

    {
        let admin = ctx.admin().await?;
        assert!(ctx.api.claim_shot("Lina", Item::Habu).await??.ok);

        let settings = admin.set_open(false).await??;
        assert!(!settings.is_open);
        let outcome = ctx.api.claim_shot("Ken", Item::Habu).await??;
        assert_eq!(outcome.message, "Reservations are closed.");

        admin.set_open(true).await??;
        let outcome = ctx.api.claim_shot("Ken", Item::Habu).await??;
        assert_eq!(outcome.claim_code.as_deref(), Some("002"));
    }
    assert_inventory(&ctx, Inventory { habu: 0, tequila: 2 }).await?;

    ctx.finish().await;
    Ok(())
}
