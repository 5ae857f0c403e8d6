//! The remote listener: prints every frame it receives.

use core::{convert::Infallible, net::SocketAddr};
use std::{io, net::TcpListener};

use crate::network::{
    proto::{FrameError, Payload},
    server::ServerState,
};

fn display(peer_addr: SocketAddr, payload: Result<Payload, FrameError>) -> io::Result<()> {
    match payload {
        Ok(payload) => tracing::info!("{peer_addr}: {payload}"),
        Err(e) => tracing::warn!("{peer_addr}: invalid frame ({e})"),
    }

    Ok(())
}

// NIGHTLY: use !
pub fn start(listener: &TcpListener) -> io::Result<Infallible> {
    tracing::info!("listening on {}", listener.local_addr()?);

    let mut state = display;
    state.start(listener)
}
