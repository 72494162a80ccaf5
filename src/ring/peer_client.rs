use crate::grpc::grpc_ring_client::GrpcRingClient;
use crate::grpc::{ProtoFetchLogReq, ProtoJoinReq};
use crate::ring::heartbeat::HeartbeatProbe;
use crate::ring::membership::LeaveNotice;
use crate::ring::message_log::LogEntry;
use crate::ring::peers::NodeAddr;
use crate::ring::ring_api::RingMessage;
use crate::ring::transport::{RingTransport, TransportError};
use crate::ring::wire;
use std::future::Future;
use tokio::time::Duration;
use tonic::transport::{Channel, Endpoint};
use tonic::{Code, Status};

/// GrpcTransport reaches other nodes over gRPC. A fresh connection is made per call since the
/// follower changes with membership and a dead peer shouldn't pin a channel.
///
/// A peer that doesn't answer within `peer_timeout`, whether it hangs while connecting or after
/// accepting, is reported as `ConnectionFailed`. That's what the self-heal fallback keys off.
pub(crate) struct GrpcTransport {
    logger: slog::Logger,
    peer_timeout: Duration,
}

impl GrpcTransport {
    pub(crate) fn new(logger: slog::Logger, peer_timeout: Duration) -> Self {
        GrpcTransport { logger, peer_timeout }
    }

    async fn within<O, F>(&self, target: &NodeAddr, rpc: F) -> Result<O, TransportError>
    where
        F: Future<Output = Result<O, TransportError>>,
    {
        match tokio::time::timeout(self.peer_timeout, rpc).await {
            Ok(result) => result,
            Err(_elapsed) => Err(TransportError::ConnectionFailed {
                addr: target.clone(),
                reason: format!("no answer within {:?}", self.peer_timeout),
            }),
        }
    }

    async fn connect(&self, target: &NodeAddr) -> Result<GrpcRingClient<Channel>, TransportError> {
        let endpoint =
            Endpoint::from_shared(target.as_str().to_string()).map_err(|e| TransportError::ConnectionFailed {
                addr: target.clone(),
                reason: format!("invalid address: {}", e),
            })?;

        let channel = endpoint
            .connect()
            .await
            .map_err(|e| TransportError::ConnectionFailed {
                addr: target.clone(),
                reason: e.to_string(),
            })?;

        Ok(GrpcRingClient::new(channel))
    }
}

fn status_error(target: &NodeAddr, status: Status) -> TransportError {
    match status.code() {
        Code::Unavailable => TransportError::ConnectionFailed {
            addr: target.clone(),
            reason: status.message().to_string(),
        },
        // Hyper-level failures (connection reset, closed mid-call) surface as Unknown.
        Code::Unknown => TransportError::ConnectionFailed {
            addr: target.clone(),
            reason: status.message().to_string(),
        },
        Code::DeadlineExceeded => TransportError::Timeout(target.clone()),
        _ => TransportError::Rejected {
            addr: target.clone(),
            reason: format!("{:?}: {}", status.code(), status.message()),
        },
    }
}

impl GrpcTransport {
    async fn join_rpc(&self, target: &NodeAddr, joiner: &NodeAddr) -> Result<NodeAddr, TransportError> {
        let mut client = self.connect(target).await?;
        let rpc_request = ProtoJoinReq {
            host: joiner.as_str().to_string(),
        };

        slog::debug!(self.logger, "ClientWire - {} join {:?}", target, rpc_request);
        let rpc_result = client.join(rpc_request).await;
        slog::debug!(self.logger, "ClientWire - {} join {:?}", target, rpc_result);

        let reply = rpc_result.map_err(|status| status_error(target, status))?.into_inner();
        NodeAddr::from_wire(reply.host).ok_or_else(|| TransportError::MalformedResponse {
            addr: target.clone(),
            reason: "join reply without host".into(),
        })
    }

    async fn leave_rpc(&self, target: &NodeAddr, notice: LeaveNotice) -> Result<(), TransportError> {
        let mut client = self.connect(target).await?;
        let rpc_request = wire::encode_leave(notice);

        slog::debug!(self.logger, "ClientWire - {} leave {:?}", target, rpc_request);
        client
            .leave(rpc_request)
            .await
            .map(|_| ())
            .map_err(|status| status_error(target, status))
    }

    async fn deliver_rpc(&self, target: &NodeAddr, message: RingMessage) -> Result<(), TransportError> {
        let mut client = self.connect(target).await?;
        let rpc_request = wire::encode_message(message);

        slog::debug!(self.logger, "ClientWire - {} deliver {:?}", target, rpc_request);
        client
            .deliver(rpc_request)
            .await
            .map(|_| ())
            .map_err(|status| status_error(target, status))
    }

    async fn fetch_log_rpc(&self, target: &NodeAddr) -> Result<Vec<LogEntry>, TransportError> {
        let mut client = self.connect(target).await?;

        let rpc_result = client.fetch_log(ProtoFetchLogReq {}).await;
        slog::debug!(self.logger, "ClientWire - {} fetch_log {:?}", target, rpc_result);

        let snapshot = rpc_result.map_err(|status| status_error(target, status))?.into_inner();
        snapshot
            .entries
            .into_iter()
            .map(|entry| {
                wire::decode_log_entry(entry).map_err(|e| TransportError::MalformedResponse {
                    addr: target.clone(),
                    reason: e.to_string(),
                })
            })
            .collect()
    }

    async fn heartbeat_rpc(&self, target: &NodeAddr, probe: HeartbeatProbe) -> Result<(), TransportError> {
        let mut client = self.connect(target).await?;
        let rpc_request = wire::encode_heartbeat(probe);

        client
            .heartbeat(rpc_request)
            .await
            .map(|_| ())
            .map_err(|status| status_error(target, status))
    }
}

#[async_trait::async_trait]
impl RingTransport for GrpcTransport {
    async fn join(&self, target: &NodeAddr, joiner: &NodeAddr) -> Result<NodeAddr, TransportError> {
        self.within(target, self.join_rpc(target, joiner)).await
    }

    async fn leave(&self, target: &NodeAddr, notice: LeaveNotice) -> Result<(), TransportError> {
        self.within(target, self.leave_rpc(target, notice)).await
    }

    async fn deliver(&self, target: &NodeAddr, message: RingMessage) -> Result<(), TransportError> {
        self.within(target, self.deliver_rpc(target, message)).await
    }

    async fn fetch_log(&self, target: &NodeAddr) -> Result<Vec<LogEntry>, TransportError> {
        self.within(target, self.fetch_log_rpc(target)).await
    }

    async fn heartbeat(&self, target: &NodeAddr, probe: HeartbeatProbe) -> Result<(), TransportError> {
        self.within(target, self.heartbeat_rpc(target, probe)).await
    }
}
