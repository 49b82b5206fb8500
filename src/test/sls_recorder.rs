use super::support::{Buffers, FakeNet, csv_config, experiment_with, mac};
use crate::error::QdError;
use crate::experiment::{ExperimentConfig, SLS_HEADER};
use crate::sim::SimTime;
use crate::wifi::{
    AntennaId, BeamformingDirection, ChannelAccessPeriod, NodeId, SectorId, SlsCompleted,
    SlsContext, StationRole,
};

fn completed(src: usize, role: StationRole, peer: u64) -> SlsCompleted {
    SlsCompleted {
        ctx: SlsContext {
            src_node: NodeId(src),
            role,
            bssid: mac(1),
        },
        peer: mac(peer),
        access_period: ChannelAccessPeriod::Dti,
        direction: BeamformingDirection::Initiator,
        initiator_txss: true,
        responder_txss: true,
        sector: SectorId(5),
        antenna: AntennaId(2),
    }
}

#[test]
fn row_carries_one_based_ids_and_trace_index() {
    let buffers = Buffers::default();
    let mut exp = experiment_with(csv_config(), 7, &buffers);
    let net = FakeNet {
        trace_index: 42,
        ..FakeNet::default()
    };

    let now = SimTime::from_micros(1_026_800);
    let record = exp
        .on_sls_completed(&completed(3, StationRole::Sta, 8), &net, now)
        .expect("sls");
    assert_eq!(record.peer, NodeId(7));
    assert_eq!(record.to_string(), "4,8,42,5,2,0,1,1026800000");

    let record = exp
        .on_sls_completed(&completed(0, StationRole::Ap, 4), &net, now)
        .expect("sls");
    assert_eq!(record.to_string(), "1,4,42,5,2,1,1,1026800000");

    assert_eq!(
        buffers.sls.lines(),
        vec![
            SLS_HEADER.to_string(),
            "4,8,42,5,2,0,1,1026800000".to_string(),
            "1,4,42,5,2,1,1,1026800000".to_string(),
        ]
    );
}

#[test]
fn header_is_written_even_without_records() {
    let buffers = Buffers::default();
    let _exp = experiment_with(csv_config(), 1, &buffers);
    assert_eq!(buffers.sls.lines(), vec![SLS_HEADER.to_string()]);
    assert_eq!(SLS_HEADER, "SRC_ID,DST_ID,TRACE_IDX,SECTOR_ID,ANTENNA_ID,ROLE,BSS_ID,Timestamp");
}

#[test]
fn unregistered_peer_is_fatal_and_writes_nothing() {
    let buffers = Buffers::default();
    let mut exp = experiment_with(csv_config(), 2, &buffers);
    let net = FakeNet::default();

    let err = exp
        .on_sls_completed(&completed(1, StationRole::Sta, 50), &net, SimTime::ZERO)
        .expect_err("peer not registered");
    assert!(matches!(err, QdError::UnknownAddress(a) if a == mac(50)));
    assert_eq!(buffers.sls.lines().len(), 1);
}

#[test]
fn human_mode_echoes_trained_sector() {
    let buffers = Buffers::default();
    let mut exp = experiment_with(ExperimentConfig::default(), 2, &buffers);
    let net = FakeNet::default();
    exp.on_sls_completed(&completed(2, StationRole::Sta, 1), &net, SimTime::ZERO)
        .expect("sls");
    assert!(buffers
        .console
        .lines()
        .contains(&"DMG STA: 2 Address: 00:00:00:00:00:01 Sector ID: 5 Antenna ID: 2".to_string()));
}
