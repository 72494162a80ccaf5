use ringleader::{NodeEvent, RingNodeConfig, RingOptions};
use slog::Drain;
use std::error::Error;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

const USAGE: &str = "usage: ringleader <port> [join-url]";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let port: u16 = args.next().ok_or(USAGE)?.parse().map_err(|_| USAGE)?;
    let join_target = args.next();

    let advertised_host = std::env::var("RINGLEADER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let advertised_addr = format!("http://{}:{}", advertised_host, port);

    let logger = create_root_logger_for_stdout();
    let config = RingNodeConfig {
        listen_addr: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port)),
        advertised_addr,
        info_logger: logger.clone(),
        options: RingOptions::default(),
    };
    let mut node = ringleader::try_create_ring_node(config).await?;

    if let Some(target) = join_target {
        node.handle.connect(target.as_str()).await?;
    }

    loop {
        tokio::select! {
            event = node.events.next() => match event {
                Some(NodeEvent::Appended(entry)) => slog::info!(logger, "#{} {:?}", entry.id, entry.payload),
                Some(event) => slog::info!(logger, "{:?}", event),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                slog::info!(logger, "Interrupted, leaving ring");
                if let Err(e) = node.handle.leave().await {
                    slog::warn!(logger, "Leave failed: {}", e);
                }
                // Let the notice get around and back.
                let _ = tokio::time::timeout(
                    tokio::time::Duration::from_secs(2),
                    node.state.wait_for(|s| s.follower.is_none()),
                )
                .await;
                break;
            }
        }
    }

    Ok(())
}

fn create_root_logger_for_stdout() -> slog::Logger {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();

    slog::Logger::root(drain, slog::o!())
}
