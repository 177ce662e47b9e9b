use eyre::Result;
use shot_reserve_core::{ClaimStatus, EventSettings, Inventory, Item};
use shot_reserve_tests::{TestCtxBuilder, ADMIN_EMAIL, ADMIN_PASSWORD};
use uuid::Uuid;

mod util;

#[tokio::test]
#[ntest::timeout(20_000)]
async fn test_admin_routes_require_a_session() -> Result<()> {
    let ctx = TestCtxBuilder::new().build().await?;
    let api = &ctx.api;

    for session in [None, Some(Uuid::new_v4())] {
        assert_eq!(api.list_claims(session).await?.unwrap_err().status, 401);
        assert_eq!(api.reset_claims(session).await?.unwrap_err().status, 401);
        assert_eq!(api.get_session(session).await?.unwrap_err().status, 401);
        assert_eq!(
            api.set_claim_status(1, ClaimStatus::Served, session)
                .await?
                .unwrap_err()
                .status,
            401
        );
        assert_eq!(
            api.update_settings(&EventSettings::default(), session)
                .await?
                .unwrap_err()
                .status,
            401
        );
        assert_eq!(
            api.set_inventory_raw("[]", session).await?.unwrap_err().status,
            401
        );
    }

    let err = api.sign_in(ADMIN_EMAIL, "hunter2").await?.unwrap_err();
    assert_eq!(err.status, 401);
    assert_eq!(err.msg, "Invalid login credentials.");
    assert_eq!(api.sign_in("nobody@example.com", ADMIN_PASSWORD).await?.unwrap_err().status, 401);

    // Public routes stay open
    api.get_settings().await??;
    api.get_inventory().await??;

    ctx.finish().await;
    Ok(())
}

#[tokio::test]
#[ntest::timeout(20_000)]
async fn test_sign_in_and_out() -> Result<()> {
    let ctx = TestCtxBuilder::new().build().await?;

    let session = {
        let admin = ctx.admin().await?;
        assert_eq!(admin.email, ADMIN_EMAIL);
        let info = ctx.api.get_session(Some(admin.session_id)).await??;
        assert_eq!(info.email, ADMIN_EMAIL);
        let session = admin.session_id;
        admin.sign_out().await??;
        session
    };
    assert_eq!(
        ctx.api.list_claims(Some(session)).await?.unwrap_err().status,
        401,
        "A signed out session must no longer be accepted."
    );

    ctx.finish().await;
    Ok(())
}

#[tokio::test]
#[ntest::timeout(20_000)]
async fn test_status_transitions() -> Result<()> {
    let ctx = TestCtxBuilder::new().with_inventory(3, 0).build().await?;

    {
        let admin = ctx.admin().await?;
        for name in ["Lina", "Ken"] {
            assert!(ctx.api.claim_shot(name, Item::Habu).await??.ok);
        }
        let claims = admin.list_claims().await??;
        let (first, second) = (claims[0].id, claims[1].id);

        // Pending may go anywhere, Served only to Void, Void nowhere
        assert_eq!(admin.set_claim_status(first, ClaimStatus::Served).await??.status, ClaimStatus::Served);
        assert_eq!(admin.set_claim_status(first, ClaimStatus::Served).await??.status, ClaimStatus::Served);
        assert_eq!(admin.set_claim_status(first, ClaimStatus::Pending).await?.unwrap_err().status, 409);
        assert_eq!(admin.set_claim_status(first, ClaimStatus::Void).await??.status, ClaimStatus::Void);
        assert_eq!(admin.set_claim_status(first, ClaimStatus::Served).await?.unwrap_err().status, 409);

        assert_eq!(admin.set_claim_status(second, ClaimStatus::Void).await??.status, ClaimStatus::Void);
        assert_eq!(admin.set_claim_status(999, ClaimStatus::Void).await?.unwrap_err().status, 404);

        // Voiding never restocks
        util::assert_inventory(&ctx, Inventory { habu: 1, tequila: 0 }).await?;
    }

    ctx.finish().await;
    Ok(())
}

#[tokio::test]
#[ntest::timeout(20_000)]
async fn test_inventory_and_settings_overwrite() -> Result<()> {
    let ctx = TestCtxBuilder::new().build().await?;

    {
        let admin = ctx.admin().await?;
        let inventory = admin.set_inventory(0, 12).await??;
        assert_eq!(inventory, Inventory { habu: 0, tequila: 12 });

        let outcome = ctx.api.claim_shot("Lina", Item::Habu).await??;
        assert_eq!(outcome.message, "Sorry, Habu Snake Liquor is sold out.");

        let err = ctx
            .api
            .set_inventory_raw(r#"[{"item":"habu","remaining":-1}]"#, Some(admin.session_id))
            .await?
            .unwrap_err();
        assert_eq!(err.status, 422, "Negative counts must be rejected as invalid.");
        let err = ctx
            .api
            .set_inventory_raw(r#"[{"item":"mezcal","remaining":1}]"#, Some(admin.session_id))
            .await?
            .unwrap_err();
        assert_eq!(err.status, 400);
        util::assert_inventory(&ctx, Inventory { habu: 0, tequila: 12 }).await?;

        // Items missing from the body keep their count
        ctx.api
            .set_inventory_raw(r#"[{"item":"habu","remaining":4}]"#, Some(admin.session_id))
            .await??;
        util::assert_inventory(&ctx, Inventory { habu: 4, tequila: 12 }).await?;

        let settings = EventSettings {
            event_time: String::from("9:30 PM"),
            location: String::from("Back bar"),
            is_open: true,
        };
        assert_eq!(admin.update_settings(&settings).await??, settings);
        assert_eq!(ctx.api.get_settings().await??, settings);
    }

    let summary = ctx.api.debug().await?;
    assert!(summary.contains("habu: 4"), "unexpected debug summary: {summary}");

    ctx.finish().await;
    Ok(())
}

#[tokio::test]
#[ntest::timeout(20_000)]
async fn test_sessions_expire() -> Result<()> {
    let ctx = TestCtxBuilder::new().with_session_ttl(1).build().await?;

    {
        let admin = ctx.admin().await?;
        admin.list_claims().await??;
        tokio::time::sleep(std::time::Duration::from_millis(1_500)).await;
        assert_eq!(admin.list_claims().await?.unwrap_err().status, 401);
    }

    ctx.finish().await;
    Ok(())
}
