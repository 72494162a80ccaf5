use crate::actor::{ActorClient, ActorExited, WeakActorClient};
use crate::grpc::grpc_ring_server::{GrpcRing, GrpcRingServer};
use crate::grpc::{
    ProtoAck, ProtoFetchLogReq, ProtoHeartbeatReq, ProtoJoinReq, ProtoJoinResult, ProtoLeaveReq, ProtoLogSnapshot,
    ProtoMessageReq,
};
use crate::ring;
use crate::server::RpcServerShutdownSignal;
use std::net::SocketAddr;
use tonic::transport::Server;
use tonic::{Request, Response, Status};

/// RpcServer is the type that implements the ring gRPC interface. Every request becomes a task on
/// the local node's queue.
pub(crate) struct RpcServer {
    logger: slog::Logger,
    local_node: WeakActorClient,
}

impl RpcServer {
    pub(crate) fn new(logger: slog::Logger, local_node: WeakActorClient) -> Self {
        RpcServer { logger, local_node }
    }

    pub(crate) async fn run(self, socket_addr: SocketAddr, shutdown_signal: RpcServerShutdownSignal) {
        let logger = self.logger.clone();
        slog::info!(logger, "Listening on '{:?}'", socket_addr);

        // TODO: bind before spawning so a taken port fails try_create_ring_node().
        let result = Server::builder()
            .add_service(GrpcRingServer::new(self))
            .serve_with_shutdown(socket_addr, shutdown_signal)
            .await;

        slog::info!(logger, "Server run() has exited: {:?}", result);
    }

    fn node(&self) -> Result<ActorClient, Status> {
        self.local_node.upgrade().map_err(exited_status)
    }

    async fn handle_join(&self, rpc_request: ProtoJoinReq) -> Result<ProtoJoinResult, Status> {
        let joiner = ring::decode_host(rpc_request.host).map_err(malformed_status)?;

        match self.node()?.join(joiner).await {
            Ok(old_follower) => Ok(ProtoJoinResult {
                host: old_follower.into_inner(),
            }),
            Err(e @ ring::JoinError::SelfJoin) => Err(Status::invalid_argument(e.to_string())),
            Err(e @ ring::JoinError::AlreadyFollower { .. }) => Err(Status::already_exists(e.to_string())),
            Err(ring::JoinError::ActorExited) => Err(exited_status(ActorExited)),
        }
    }

    async fn handle_leave(&self, rpc_request: ProtoLeaveReq) -> Result<ProtoAck, Status> {
        let notice = ring::decode_leave(rpc_request).map_err(malformed_status)?;
        self.node()?.leave_notice(notice).await.map_err(exited_status)?;
        Ok(ProtoAck {})
    }

    async fn handle_deliver(&self, rpc_request: ProtoMessageReq) -> Result<ProtoAck, Status> {
        let message = ring::decode_message(rpc_request).map_err(malformed_status)?;
        self.node()?.deliver(message).await.map_err(exited_status)?;
        Ok(ProtoAck {})
    }

    async fn handle_fetch_log(&self, _: ProtoFetchLogReq) -> Result<ProtoLogSnapshot, Status> {
        let entries = self.node()?.fetch_log().await.map_err(exited_status)?;
        Ok(ProtoLogSnapshot {
            entries: entries.into_iter().map(ring::encode_log_entry).collect(),
        })
    }

    async fn handle_heartbeat(&self, rpc_request: ProtoHeartbeatReq) -> Result<ProtoAck, Status> {
        let probe = ring::decode_heartbeat(rpc_request);
        self.node()?.heartbeat(probe).await.map_err(exited_status)?;
        Ok(ProtoAck {})
    }
}

fn malformed_status(e: ring::Malformed) -> Status {
    Status::invalid_argument(e.to_string())
}

fn exited_status(e: ActorExited) -> Status {
    Status::unavailable(e.to_string())
}

#[async_trait::async_trait]
impl GrpcRing for RpcServer {
    async fn join(&self, rpc_request_wrapped: Request<ProtoJoinReq>) -> Result<Response<ProtoJoinResult>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();

        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request);
        let rpc_result = self.handle_join(rpc_request).await;
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_result);

        rpc_result.map(Response::new)
    }

    async fn leave(&self, rpc_request_wrapped: Request<ProtoLeaveReq>) -> Result<Response<ProtoAck>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();

        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request);
        let rpc_result = self.handle_leave(rpc_request).await;
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_result);

        rpc_result.map(Response::new)
    }

    async fn deliver(&self, rpc_request_wrapped: Request<ProtoMessageReq>) -> Result<Response<ProtoAck>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();

        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request);
        let rpc_result = self.handle_deliver(rpc_request).await;
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_result);

        rpc_result.map(Response::new)
    }

    async fn fetch_log(
        &self,
        rpc_request_wrapped: Request<ProtoFetchLogReq>,
    ) -> Result<Response<ProtoLogSnapshot>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();

        let rpc_result = self.handle_fetch_log(rpc_request).await;
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_result);

        rpc_result.map(Response::new)
    }

    // Too chatty for the wire log.
    async fn heartbeat(&self, rpc_request_wrapped: Request<ProtoHeartbeatReq>) -> Result<Response<ProtoAck>, Status> {
        self.handle_heartbeat(rpc_request_wrapped.into_inner())
            .await
            .map(Response::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Task;
    use crate::grpc::proto_message_req;
    use tonic::Code;

    fn server() -> (RpcServer, ActorClient, tokio::sync::mpsc::Receiver<Task>) {
        let (client, rx) = ActorClient::new(10);
        let server = RpcServer::new(slog::Logger::root(slog::Discard, slog::o!()), client.weak());
        (server, client, rx)
    }

    #[tokio::test]
    async fn join_without_host_is_invalid() {
        let (server, _client, _rx) = server();

        let status = server
            .join(Request::new(ProtoJoinReq { host: String::new() }))
            .await
            .unwrap_err();

        assert_eq!(status.code(), Code::InvalidArgument);
    }

    #[tokio::test]
    async fn deliver_without_method_is_invalid() {
        let (server, _client, _rx) = server();

        let status = server
            .deliver(Request::new(ProtoMessageReq { method: None }))
            .await
            .unwrap_err();

        assert_eq!(status.code(), Code::InvalidArgument);
    }

    #[tokio::test]
    async fn deliver_only_enqueues() {
        let (server, _client, mut rx) = server();
        let rpc_request = ProtoMessageReq {
            method: Some(proto_message_req::Method::Election(crate::grpc::ProtoElection { candidate: 7 })),
        };

        server.deliver(Request::new(rpc_request)).await.unwrap();

        match rx.recv().await {
            Some(Task::Deliver(ring::RingMessage::Election { candidate })) => {
                assert_eq!(candidate, ring::Uid::new(7))
            }
            other => panic!("Unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn exited_node_is_unavailable() {
        let (server, client, rx) = server();
        drop(client);
        drop(rx);

        let status = server
            .heartbeat(Request::new(ProtoHeartbeatReq { host: String::new() }))
            .await
            .unwrap_err();

        assert_eq!(status.code(), Code::Unavailable);
    }
}
