use pgw::Teid;
use pgw_tests::{Forward, framework::*};

#[async_std::test]
async fn dispatch() -> anyhow::Result<()> {
    let (pgw, sink, _logger) = init().await?;

    // SGW sets up a PDN connection with one bearer
    let session = pgw.create_session("internet", SGW_ADDRESS, Teid(12345))?;
    assert_eq!(session.subscriber_address.octets()[0..3], [192, 168, 1]);
    let bearer = pgw.create_bearer(&session, Teid(54321))?;
    let session = pgw.find_session_by_cp_teid(session.cp_teid).unwrap();
    assert_eq!(session.default_bearer, Some(bearer.dp_teid));

    // Uplink goes to the APN gateway
    pgw.submit_uplink_packet(bearer.dp_teid, b"uplink".to_vec())
        .await?;
    assert_eq!(
        sink.recv_forward().await?,
        Forward::ToApn {
            gateway_address: INTERNET_GATEWAY,
            payload: b"uplink".to_vec()
        }
    );

    // Downlink goes to the SGW on its bearer TEID
    pgw.submit_downlink_packet(session.subscriber_address, b"downlink".to_vec())
        .await?;
    assert_eq!(
        sink.recv_forward().await?,
        Forward::ToPeerGateway {
            peer_gateway_address: SGW_ADDRESS,
            peer_dp_teid: Teid(54321),
            payload: b"downlink".to_vec()
        }
    );

    // Exactly once each
    sink.expect_no_forward().await?;
    pgw.graceful_shutdown().await;
    Ok(())
}
