//! UDP packet receiver
//!
//! Reads datagrams from the sensor socket, validates their size, stamps them with the
//! wall-clock arrival time and pushes them onto the capture queue. Never touches disk.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use contracts::layout::PACKET_SIZE;
use contracts::{CapturedPacket, ReceiverConfig};
use tokio::net::UdpSocket;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::config::IngestionMetrics;
use crate::error::{IngestionError, Result};
use crate::queue::CaptureSender;

/// Bound UDP receiver
pub struct PacketReceiver {
    socket: UdpSocket,
    local_addr: SocketAddr,
    buffer_size: usize,
    metrics: Arc<IngestionMetrics>,
}

impl PacketReceiver {
    /// Bind the capture socket
    ///
    /// # Errors
    /// `Bind` if the address is invalid or already in use.
    #[instrument(name = "receiver_bind", skip(config, metrics), fields(addr = %config.socket_addr()))]
    pub async fn bind(config: &ReceiverConfig, metrics: Arc<IngestionMetrics>) -> Result<Self> {
        let addr = config.socket_addr();
        let socket = UdpSocket::bind(&addr)
            .await
            .map_err(|source| IngestionError::Bind {
                addr: addr.clone(),
                source,
            })?;
        let local_addr = socket.local_addr().map_err(IngestionError::LocalAddr)?;
        info!(local_addr = %local_addr, "capture socket bound");

        Ok(Self {
            socket,
            local_addr,
            buffer_size: config.recv_buffer_size.max(PACKET_SIZE + 1),
            metrics,
        })
    }

    /// Address actually bound (resolves port 0)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Receive until `shutdown` flips to `true` or its sender is dropped
    ///
    /// Consumes the queue sender, so the Persister observes a closed channel once this
    /// returns.
    ///
    /// # Errors
    /// `ChannelClosed` if the Persister went away while capture was still running.
    #[instrument(name = "receiver_run", skip_all, fields(local_addr = %self.local_addr))]
    pub async fn run(self, queue: CaptureSender, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let mut buf = vec![0u8; self.buffer_size];
        info!("receiver started");

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                result = self.socket.recv_from(&mut buf) => match result {
                    Ok((len, peer)) => {
                        self.metrics.record_received();
                        if len != PACKET_SIZE {
                            self.metrics.record_malformed();
                            warn!(len, expected = PACKET_SIZE, peer = %peer, "dropping datagram with unexpected size");
                            continue;
                        }
                        let packet = CapturedPacket::new(wall_clock(), Bytes::copy_from_slice(&buf[..len]));
                        queue.push(packet).await?;
                    }
                    Err(e) => {
                        self.metrics.record_socket_error();
                        warn!(error = %e, "socket receive failed");
                    }
                }
            }
        }

        let snapshot = self.metrics.snapshot();
        debug!(queued = queue.len(), "receiver releasing queue sender");
        info!(
            received = snapshot.packets_received,
            malformed = snapshot.packets_malformed,
            enqueued = snapshot.packets_enqueued,
            dropped = snapshot.packets_dropped,
            "receiver stopped"
        );
        Ok(())
    }
}

/// Seconds since the Unix epoch
fn wall_clock() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
