use pgw::Teid;
use pgw_tests::{Forward, framework::*};
use std::collections::HashSet;

#[async_std::test]
async fn many_sessions() -> anyhow::Result<()> {
    let (pgw, sink, _logger) = init().await?;

    // Sessions from several SGW tasks at once
    let workers: Vec<_> = (0..4u32)
        .map(|worker| {
            let pgw = pgw.clone();
            async_std::task::spawn(async move {
                let mut created = vec![];
                for ii in 0..25 {
                    let session =
                        pgw.create_session("internet", SGW_ADDRESS, Teid(worker * 100 + ii))?;
                    let bearer = pgw.create_bearer(&session, Teid(worker * 100 + ii))?;
                    created.push((session, bearer));
                }
                anyhow::Ok(created)
            })
        })
        .collect();
    let mut all = vec![];
    for worker in workers {
        all.extend(worker.await?);
    }

    let cp_teids: HashSet<_> = all.iter().map(|(s, _)| s.cp_teid).collect();
    let dp_teids: HashSet<_> = all.iter().map(|(_, b)| b.dp_teid).collect();
    let addresses: HashSet<_> = all.iter().map(|(s, _)| s.subscriber_address).collect();
    assert_eq!(cp_teids.len(), 100);
    assert_eq!(dp_teids.len(), 100);
    assert_eq!(addresses.len(), 100);

    // Each subscriber's downlink is tagged with its own SGW TEID
    for (session, bearer) in all.iter() {
        pgw.submit_downlink_packet(session.subscriber_address, vec![0x45])
            .await?;
        let Forward::ToPeerGateway { peer_dp_teid, .. } = sink.recv_forward().await? else {
            anyhow::bail!("Expected downlink forward");
        };
        assert_eq!(peer_dp_teid, bearer.peer_dp_teid);
    }

    pgw.graceful_shutdown().await;
    Ok(())
}
