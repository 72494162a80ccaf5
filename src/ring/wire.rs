//! Conversions between the gRPC messages and the ring's own types. Decoding validates required
//! fields; encoding never fails.

use crate::grpc::{
    proto_message_req, proto_payload, ProtoClean, ProtoElected, ProtoElection, ProtoHeartbeatReq, ProtoLeaveReq,
    ProtoLogEntry, ProtoMessageReq, ProtoPayload, ProtoPersistent, ProtoPropagate,
};
use crate::ring::election::Uid;
use crate::ring::heartbeat::HeartbeatProbe;
use crate::ring::membership::LeaveNotice;
use crate::ring::message_log::{LogEntry, Payload, SeqId};
use crate::ring::peers::NodeAddr;
use crate::ring::ring_api::{PersistentMessage, Propagation, RingMessage};
use bytes::Bytes;

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
#[error("malformed {what}: {problem}")]
pub(crate) struct Malformed {
    what: &'static str,
    problem: &'static str,
}

fn malformed(what: &'static str, problem: &'static str) -> Malformed {
    Malformed { what, problem }
}

fn required_addr(what: &'static str, addr: String) -> Result<NodeAddr, Malformed> {
    NodeAddr::from_wire(addr).ok_or_else(|| malformed(what, "missing host"))
}

pub(crate) fn decode_host(host: String) -> Result<NodeAddr, Malformed> {
    required_addr("host", host)
}

// ------- Payload -------

pub(crate) fn encode_payload(payload: Payload) -> ProtoPayload {
    let kind = match payload {
        Payload::Data(data) => proto_payload::Kind::Data(data.to_vec()),
        Payload::Control(text) => proto_payload::Kind::Control(text),
        Payload::Clean => proto_payload::Kind::Clean(ProtoClean {}),
    };
    ProtoPayload { kind: Some(kind) }
}

pub(crate) fn decode_payload(payload: Option<ProtoPayload>) -> Result<Payload, Malformed> {
    match payload.and_then(|p| p.kind) {
        Some(proto_payload::Kind::Data(data)) => Ok(Payload::Data(Bytes::from(data))),
        Some(proto_payload::Kind::Control(text)) => Ok(Payload::Control(text)),
        Some(proto_payload::Kind::Clean(_)) => Ok(Payload::Clean),
        None => Err(malformed("message", "missing payload")),
    }
}

// ------- Leave -------

pub(crate) fn encode_leave(notice: LeaveNotice) -> ProtoLeaveReq {
    ProtoLeaveReq {
        host: notice.leaving.into_inner(),
        new_host: notice.replacement.map(NodeAddr::into_inner).unwrap_or_default(),
    }
}

pub(crate) fn decode_leave(req: ProtoLeaveReq) -> Result<LeaveNotice, Malformed> {
    Ok(LeaveNotice {
        leaving: required_addr("leave notice", req.host)?,
        replacement: NodeAddr::from_wire(req.new_host),
    })
}

// ------- Messages -------

pub(crate) fn encode_message(message: RingMessage) -> ProtoMessageReq {
    let method = match message {
        RingMessage::Election { candidate } => proto_message_req::Method::Election(ProtoElection {
            candidate: candidate.as_u64(),
        }),
        RingMessage::Elected { leader } => proto_message_req::Method::Elected(ProtoElected {
            leader: leader.as_u64(),
        }),
        RingMessage::Propagate(propagation) => proto_message_req::Method::Propagate(ProtoPropagate {
            origin: propagation.origin.into_inner(),
            message: Some(encode_payload(propagation.payload)),
        }),
        RingMessage::Persistent(persistent) => proto_message_req::Method::Persistent(ProtoPersistent {
            id: persistent.id.as_u64(),
            origin: persistent.origin.as_u64(),
            message: Some(encode_payload(persistent.payload)),
        }),
    };
    ProtoMessageReq { method: Some(method) }
}

pub(crate) fn decode_message(req: ProtoMessageReq) -> Result<RingMessage, Malformed> {
    match req.method {
        Some(proto_message_req::Method::Election(election)) => Ok(RingMessage::Election {
            candidate: Uid::new(election.candidate),
        }),
        Some(proto_message_req::Method::Elected(elected)) => {
            if elected.leader == Uid::NOBODY.as_u64() {
                return Err(malformed("elected", "leader uid 0"));
            }
            Ok(RingMessage::Elected {
                leader: Uid::new(elected.leader),
            })
        }
        Some(proto_message_req::Method::Propagate(propagate)) => Ok(RingMessage::Propagate(Propagation {
            origin: required_addr("propagate", propagate.origin)?,
            payload: decode_payload(propagate.message)?,
        })),
        Some(proto_message_req::Method::Persistent(persistent)) => {
            let payload = decode_payload(persistent.message)?;
            let id = SeqId::new(persistent.id);
            if (id == SeqId::CLEAN) != (payload == Payload::Clean) {
                return Err(malformed("persistent", "id 0 is reserved for clean"));
            }
            Ok(RingMessage::Persistent(PersistentMessage {
                origin: Uid::new(persistent.origin),
                id,
                payload,
            }))
        }
        None => Err(malformed("message", "missing method")),
    }
}

// ------- Log -------

pub(crate) fn encode_log_entry(entry: LogEntry) -> ProtoLogEntry {
    ProtoLogEntry {
        id: entry.id.as_u64(),
        message: Some(encode_payload(entry.payload)),
    }
}

pub(crate) fn decode_log_entry(entry: ProtoLogEntry) -> Result<LogEntry, Malformed> {
    let payload = decode_payload(entry.message)?;
    if entry.id == SeqId::CLEAN.as_u64() || payload == Payload::Clean {
        return Err(malformed("log entry", "clean is never stored"));
    }
    Ok(LogEntry {
        id: SeqId::new(entry.id),
        payload,
    })
}

// ------- Heartbeat -------

pub(crate) fn encode_heartbeat(probe: HeartbeatProbe) -> ProtoHeartbeatReq {
    let host = match probe {
        HeartbeatProbe::Alive => String::new(),
        HeartbeatProbe::Correction { host } => host.into_inner(),
    };
    ProtoHeartbeatReq { host }
}

pub(crate) fn decode_heartbeat(req: ProtoHeartbeatReq) -> HeartbeatProbe {
    match NodeAddr::from_wire(req.host) {
        Some(host) => HeartbeatProbe::Correction { host },
        None => HeartbeatProbe::Alive,
    }
}
