#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoAck {}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoJoinReq {
    #[prost(string, tag = "1")]
    pub host: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoJoinResult {
    #[prost(string, tag = "1")]
    pub host: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoLeaveReq {
    #[prost(string, tag = "1")]
    pub host: ::prost::alloc::string::String,
    /// Empty when the leaving node has no follower.
    #[prost(string, tag = "2")]
    pub new_host: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoClean {}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoPayload {
    #[prost(oneof = "proto_payload::Kind", tags = "1, 2, 3")]
    pub kind: ::core::option::Option<proto_payload::Kind>,
}
/// Nested message and enum types in `ProtoPayload`.
pub mod proto_payload {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Kind {
        #[prost(bytes, tag = "1")]
        Data(::prost::alloc::vec::Vec<u8>),
        #[prost(string, tag = "2")]
        Control(::prost::alloc::string::String),
        #[prost(message, tag = "3")]
        Clean(super::ProtoClean),
    }
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoElection {
    #[prost(uint64, tag = "1")]
    pub candidate: u64,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoElected {
    #[prost(uint64, tag = "1")]
    pub leader: u64,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoPropagate {
    #[prost(string, tag = "1")]
    pub origin: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "2")]
    pub message: ::core::option::Option<ProtoPayload>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoPersistent {
    /// 0 for a clean command.
    #[prost(uint64, tag = "1")]
    pub id: u64,
    #[prost(uint64, tag = "2")]
    pub origin: u64,
    #[prost(message, optional, tag = "3")]
    pub message: ::core::option::Option<ProtoPayload>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoMessageReq {
    #[prost(oneof = "proto_message_req::Method", tags = "1, 2, 3, 4")]
    pub method: ::core::option::Option<proto_message_req::Method>,
}
/// Nested message and enum types in `ProtoMessageReq`.
pub mod proto_message_req {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Method {
        #[prost(message, tag = "1")]
        Election(super::ProtoElection),
        #[prost(message, tag = "2")]
        Elected(super::ProtoElected),
        #[prost(message, tag = "3")]
        Propagate(super::ProtoPropagate),
        #[prost(message, tag = "4")]
        Persistent(super::ProtoPersistent),
    }
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoFetchLogReq {}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoLogEntry {
    #[prost(uint64, tag = "1")]
    pub id: u64,
    #[prost(message, optional, tag = "2")]
    pub message: ::core::option::Option<ProtoPayload>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoLogSnapshot {
    #[prost(message, repeated, tag = "1")]
    pub entries: ::prost::alloc::vec::Vec<ProtoLogEntry>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoHeartbeatReq {
    #[prost(string, tag = "1")]
    pub host: ::prost::alloc::string::String,
}
#[doc = r" Generated client implementations."]
pub mod grpc_ring_client {
    #![allow(unused_variables, dead_code, missing_docs)]
    use tonic::codegen::*;
    pub struct GrpcRingClient<T> {
        inner: tonic::client::Grpc<T>,
    }
    impl GrpcRingClient<tonic::transport::Channel> {
        #[doc = r" Attempt to create a new client by connecting to a given endpoint."]
        pub async fn connect<D>(dst: D) -> Result<Self, tonic::transport::Error>
        where
            D: std::convert::TryInto<tonic::transport::Endpoint>,
            D::Error: Into<StdError>,
        {
            let conn = tonic::transport::Endpoint::new(dst)?.connect().await?;
            Ok(Self::new(conn))
        }
    }
    impl<T> GrpcRingClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::BoxBody>,
        T::ResponseBody: Body + HttpBody + Send + 'static,
        T::Error: Into<StdError>,
        <T::ResponseBody as HttpBody>::Error: Into<StdError> + Send,
    {
        pub fn new(inner: T) -> Self {
            let inner = tonic::client::Grpc::new(inner);
            Self { inner }
        }
        pub fn with_interceptor(inner: T, interceptor: impl Into<tonic::Interceptor>) -> Self {
            let inner = tonic::client::Grpc::with_interceptor(inner, interceptor);
            Self { inner }
        }
        #[doc = " Splice the caller in after the callee. Reply carries the callee's old follower."]
        pub async fn join(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoJoinReq>,
        ) -> Result<tonic::Response<super::ProtoJoinResult>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/ring.GrpcRing/Join");
            self.inner.unary(request.into_request(), path, codec).await
        }
        #[doc = " Relay a leave notice around the ring."]
        pub async fn leave(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoLeaveReq>,
        ) -> Result<tonic::Response<super::ProtoAck>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/ring.GrpcRing/Leave");
            self.inner.unary(request.into_request(), path, codec).await
        }
        #[doc = " Election, announcement and log replication traffic."]
        pub async fn deliver(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoMessageReq>,
        ) -> Result<tonic::Response<super::ProtoAck>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/ring.GrpcRing/Deliver");
            self.inner.unary(request.into_request(), path, codec).await
        }
        #[doc = " Read the callee's replicated log."]
        pub async fn fetch_log(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoFetchLogReq>,
        ) -> Result<tonic::Response<super::ProtoLogSnapshot>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/ring.GrpcRing/FetchLog");
            self.inner.unary(request.into_request(), path, codec).await
        }
        #[doc = " Liveness probe (empty host) or panic correction (host set)."]
        pub async fn heartbeat(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoHeartbeatReq>,
        ) -> Result<tonic::Response<super::ProtoAck>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/ring.GrpcRing/Heartbeat");
            self.inner.unary(request.into_request(), path, codec).await
        }
    }
    impl<T: Clone> Clone for GrpcRingClient<T> {
        fn clone(&self) -> Self {
            Self {
                inner: self.inner.clone(),
            }
        }
    }
    impl<T> std::fmt::Debug for GrpcRingClient<T> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "GrpcRingClient {{ ... }}")
        }
    }
}
#[doc = r" Generated server implementations."]
pub mod grpc_ring_server {
    #![allow(unused_variables, dead_code, missing_docs)]
    use tonic::codegen::*;
    #[doc = "Generated trait containing gRPC methods that should be implemented for use with GrpcRingServer."]
    #[async_trait]
    pub trait GrpcRing: Send + Sync + 'static {
        #[doc = " Splice the caller in after the callee. Reply carries the callee's old follower."]
        async fn join(
            &self,
            request: tonic::Request<super::ProtoJoinReq>,
        ) -> Result<tonic::Response<super::ProtoJoinResult>, tonic::Status>;
        #[doc = " Relay a leave notice around the ring."]
        async fn leave(
            &self,
            request: tonic::Request<super::ProtoLeaveReq>,
        ) -> Result<tonic::Response<super::ProtoAck>, tonic::Status>;
        #[doc = " Election, announcement and log replication traffic."]
        async fn deliver(
            &self,
            request: tonic::Request<super::ProtoMessageReq>,
        ) -> Result<tonic::Response<super::ProtoAck>, tonic::Status>;
        #[doc = " Read the callee's replicated log."]
        async fn fetch_log(
            &self,
            request: tonic::Request<super::ProtoFetchLogReq>,
        ) -> Result<tonic::Response<super::ProtoLogSnapshot>, tonic::Status>;
        #[doc = " Liveness probe (empty host) or panic correction (host set)."]
        async fn heartbeat(
            &self,
            request: tonic::Request<super::ProtoHeartbeatReq>,
        ) -> Result<tonic::Response<super::ProtoAck>, tonic::Status>;
    }
    #[derive(Debug)]
    pub struct GrpcRingServer<T: GrpcRing> {
        inner: _Inner<T>,
    }
    struct _Inner<T>(Arc<T>, Option<tonic::Interceptor>);
    impl<T: GrpcRing> GrpcRingServer<T> {
        pub fn new(inner: T) -> Self {
            let inner = Arc::new(inner);
            let inner = _Inner(inner, None);
            Self { inner }
        }
        pub fn with_interceptor(inner: T, interceptor: impl Into<tonic::Interceptor>) -> Self {
            let inner = Arc::new(inner);
            let inner = _Inner(inner, Some(interceptor.into()));
            Self { inner }
        }
    }
    impl<T, B> Service<http::Request<B>> for GrpcRingServer<T>
    where
        T: GrpcRing,
        B: HttpBody + Send + Sync + 'static,
        B::Error: Into<StdError> + Send + 'static,
    {
        type Response = http::Response<tonic::body::BoxBody>;
        type Error = Never;
        type Future = BoxFuture<Self::Response, Self::Error>;
        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }
        fn call(&mut self, req: http::Request<B>) -> Self::Future {
            let inner = self.inner.clone();
            match req.uri().path() {
                "/ring.GrpcRing/Join" => {
                    #[allow(non_camel_case_types)]
                    struct JoinSvc<T: GrpcRing>(pub Arc<T>);
                    impl<T: GrpcRing> tonic::server::UnaryService<super::ProtoJoinReq> for JoinSvc<T> {
                        type Response = super::ProtoJoinResult;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoJoinReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).join(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = JoinSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/ring.GrpcRing/Leave" => {
                    #[allow(non_camel_case_types)]
                    struct LeaveSvc<T: GrpcRing>(pub Arc<T>);
                    impl<T: GrpcRing> tonic::server::UnaryService<super::ProtoLeaveReq> for LeaveSvc<T> {
                        type Response = super::ProtoAck;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoLeaveReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).leave(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = LeaveSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/ring.GrpcRing/Deliver" => {
                    #[allow(non_camel_case_types)]
                    struct DeliverSvc<T: GrpcRing>(pub Arc<T>);
                    impl<T: GrpcRing> tonic::server::UnaryService<super::ProtoMessageReq> for DeliverSvc<T> {
                        type Response = super::ProtoAck;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoMessageReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).deliver(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = DeliverSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/ring.GrpcRing/FetchLog" => {
                    #[allow(non_camel_case_types)]
                    struct FetchLogSvc<T: GrpcRing>(pub Arc<T>);
                    impl<T: GrpcRing> tonic::server::UnaryService<super::ProtoFetchLogReq> for FetchLogSvc<T> {
                        type Response = super::ProtoLogSnapshot;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoFetchLogReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).fetch_log(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = FetchLogSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/ring.GrpcRing/Heartbeat" => {
                    #[allow(non_camel_case_types)]
                    struct HeartbeatSvc<T: GrpcRing>(pub Arc<T>);
                    impl<T: GrpcRing> tonic::server::UnaryService<super::ProtoHeartbeatReq> for HeartbeatSvc<T> {
                        type Response = super::ProtoAck;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoHeartbeatReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).heartbeat(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = HeartbeatSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                _ => Box::pin(async move {
                    Ok(http::Response::builder()
                        .status(200)
                        .header("grpc-status", "12")
                        .header("content-type", "application/grpc")
                        .body(tonic::body::BoxBody::empty())
                        .unwrap())
                }),
            }
        }
    }
    impl<T: GrpcRing> Clone for GrpcRingServer<T> {
        fn clone(&self) -> Self {
            let inner = self.inner.clone();
            Self { inner }
        }
    }
    impl<T: GrpcRing> Clone for _Inner<T> {
        fn clone(&self) -> Self {
            Self(self.0.clone(), self.1.clone())
        }
    }
    impl<T: std::fmt::Debug> std::fmt::Debug for _Inner<T> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{:?}", self.0)
        }
    }
    impl<T: GrpcRing> tonic::transport::NamedService for GrpcRingServer<T> {
        const NAME: &'static str = "ring.GrpcRing";
    }
}
