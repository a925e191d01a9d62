//! Async accept/tick loop.
//!
//! One task owns the [`Console`]. It multiplexes new connections, the
//! service interval and the shutdown signal; all session and snapshot
//! state is touched only from here.

use std::future::Future;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::time::{Instant, MissedTickBehavior};

use crate::console::{AcceptOutcome, Console, TcpConnection};

/// Runs the console on `listener` until `shutdown` resolves, then says
/// goodbye to every session.
///
/// Accept failures are logged and the loop keeps going; they never affect
/// existing sessions.
pub async fn serve(
    listener: TcpListener,
    mut console: Console<TcpConnection>,
    poll_interval: Duration,
    shutdown: impl Future<Output = ()>,
) {
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "console listening");
    }

    loop {
        tokio::select! {
            biased;

            () = &mut shutdown => {
                tracing::info!("shutdown requested");
                break;
            }
            tick = ticker.tick() => {
                console.tick(tick.into_std());
            }
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer)) => {
                        tracing::debug!(%peer, "connection accepted");
                        let conn = TcpConnection::new(stream);
                        let outcome = console.accept(conn, Instant::now().into_std());
                        if outcome == AcceptOutcome::Rejected {
                            tracing::debug!(%peer, "connection turned away");
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "accept failed"),
                }
            }
        }
    }

    console.shutdown();
}
