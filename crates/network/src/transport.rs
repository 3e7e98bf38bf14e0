use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::{Framed, LengthDelimitedCodec};
use tracing::{debug, warn};

use crate::message::PeerMessage;
use crate::peer::{PeerEvent, PeerId};
use crate::NetworkError;

/// Length-delimited framing shared by both ends of every peer connection:
/// a u32 length prefix followed by one JSON-encoded message.
fn codec(max_frame_length: usize) -> LengthDelimitedCodec {
    LengthDelimitedCodec::builder()
        .length_field_type::<u32>()
        .max_frame_length(max_frame_length)
        .new_codec()
}

/// Dial a peer's listener.
pub async fn connect(addr: &str) -> Result<TcpStream, NetworkError> {
    Ok(TcpStream::connect(addr).await?)
}

/// Spawn the read and write workers for one connected peer.
///
/// The read worker turns frames into [`PeerEvent::Message`]s. A frame that
/// fails to decode is dropped with a warning while the connection stays up;
/// only a transport-level fault ends the worker, which then emits
/// [`PeerEvent::Disconnected`]. There is no reconnection. The write worker
/// drains `outbound` until the node drops its sending half.
pub fn spawn_peer(
    id: PeerId,
    stream: TcpStream,
    max_frame_length: usize,
    mut outbound: mpsc::Receiver<PeerMessage>,
    events: mpsc::Sender<PeerEvent>,
) {
    let framed = Framed::new(stream, codec(max_frame_length));
    let (mut sink, mut frames) = framed.split();

    tokio::spawn(async move {
        while let Some(message) = outbound.recv().await {
            let bytes = match message.to_bytes() {
                Ok(bytes) => bytes,
                Err(error) => {
                    warn!(peer = %id, %error, "Dropping unencodable outbound message");
                    continue;
                }
            };
            if let Err(error) = sink.send(Bytes::from(bytes)).await {
                debug!(peer = %id, %error, "Write side closed");
                break;
            }
        }
    });

    tokio::spawn(async move {
        loop {
            match frames.next().await {
                Some(Ok(frame)) => match PeerMessage::from_bytes(&frame) {
                    Ok(message) => {
                        let event = PeerEvent::Message { peer: id, message };
                        if events.send(event).await.is_err() {
                            // node loop is gone, nothing left to deliver to
                            return;
                        }
                    }
                    Err(error) => {
                        warn!(peer = %id, %error, "Dropping malformed peer message");
                    }
                },
                Some(Err(error)) => {
                    debug!(peer = %id, %error, "Read side failed");
                    break;
                }
                None => {
                    debug!(peer = %id, "Peer closed the connection");
                    break;
                }
            }
        }
        let _ = events.send(PeerEvent::Disconnected(id)).await;
    });
}
