use eyre::Result;
use shot_reserve_core::{ClaimStatus, Inventory, Item};
use shot_reserve_tests::TestCtxBuilder;

mod util;

#[tokio::test] // Every test function needs to be decorated with this attribute
#[ntest::timeout(20_000)] // Test timeout in ms
async fn test_example() -> Result<()> {
    // Create a test context with 5 Habu and 5 Tequila shots
    let ctx = TestCtxBuilder::new().with_inventory(5, 5).build().await?;

    // Claim one shot as a guest
    let outcome = ctx.api.claim_shot("Lina", Item::Habu).await??;
    assert!(outcome.ok, "It must be possible to claim a shot.");
    assert_eq!(outcome.message, "Reserved!");
    assert_eq!(outcome.claim_code.as_deref(), Some("001"));
    util::assert_inventory(&ctx, Inventory { habu: 4, tequila: 5 }).await?;

    // The claim shows up for staff and can be handed out
    {
        let admin = ctx.admin().await?;
        let claims = admin.list_claims().await??;
        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0].name, "Lina");
        assert_eq!(claims[0].status, ClaimStatus::Pending);

        let served = admin
            .set_claim_status(claims[0].id, ClaimStatus::Served)
            .await??;
        assert_eq!(served.status, ClaimStatus::Served);
        admin.sign_out().await??;
    }

    // Finish the test
    ctx.finish().await;
    Ok(())
}
