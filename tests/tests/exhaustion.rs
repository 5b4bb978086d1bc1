use pgw::registry::Resource;
use pgw::{RegistryError, Teid};
use pgw_tests::framework::*;

#[async_std::test]
async fn exhaustion() -> anyhow::Result<()> {
    let (pgw, _sink, _logger) = init_with(small_subnet(3)).await?;

    let mut sessions = vec![];
    for ii in 0..3 {
        let session = pgw.create_session("internet", SGW_ADDRESS, Teid(ii))?;
        pgw.create_bearer(&session, Teid(100 + ii))?;
        sessions.push(session);
    }

    let result = pgw.create_session("internet", SGW_ADDRESS, Teid(99));
    assert_eq!(
        result,
        Err(RegistryError::AllocationExhausted {
            resource: Resource::SubscriberAddress {
                apn: "internet".to_string()
            }
        })
    );

    // Nothing changed
    assert_eq!(pgw.registry().session_count(), 3);
    assert_eq!(pgw.registry().bearer_count(), 3);
    for session in sessions.iter() {
        let found = pgw
            .find_session_by_subscriber_address(session.subscriber_address)
            .unwrap();
        assert_eq!(found.cp_teid, session.cp_teid);
        assert_eq!(found.bearers.len(), 1);
    }

    // Unknown APN is reported as such
    assert_eq!(
        pgw.create_session("ims", SGW_ADDRESS, Teid(99)),
        Err(RegistryError::UnknownApn("ims".to_string()))
    );

    pgw.graceful_shutdown().await;
    Ok(())
}
