use crate::{
    session::{Session, SessionConfig},
    transport::{HidOpener, TransportError},
};
use joycal_core::controller::{ControllerKind, NINTENDO_VENDOR_ID};
use thiserror::Error;

#[derive(Clone, Error, Debug)]
pub enum ConnectionError {
    #[error("no supported controller is connected")]
    NotFound,
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl From<std::io::Error> for ConnectionError {
    fn from(err: std::io::Error) -> Self {
        Self::Transport(err.into())
    }
}

/// Opens the first attached controller, probing Joy-Con (L), Joy-Con (R) and
/// then the Pro Controller.
#[tracing::instrument(target = "connection", skip(opener))]
pub async fn connect<O>(opener: &O) -> Result<(O::Transport, ControllerKind), ConnectionError>
where
    O: HidOpener,
{
    for kind in ControllerKind::PROBE_ORDER {
        tracing::debug!("probing for {}.", kind.name());
        if let Some(transport) = opener.open(NINTENDO_VENDOR_ID, kind.product_id()).await? {
            tracing::info!("connected to {}.", kind.name());
            return Ok((transport, kind));
        }
    }
    tracing::warn!("no supported controller found.");
    Err(ConnectionError::NotFound)
}

pub async fn open_session<O>(
    opener: &O,
    config: SessionConfig,
) -> Result<Session<O::Transport>, ConnectionError>
where
    O: HidOpener,
{
    let (transport, kind) = connect(opener).await?;
    Ok(Session::new(transport, kind, config))
}
