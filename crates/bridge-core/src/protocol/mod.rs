//! Protocol module containing the realtime hub message types and codec.

pub mod hub;

pub use hub::{
    decode_message, encode_message, handshake_request, parse_handshake_response, HubFrameReader,
    HubMessage, HubProtocolError, RECORD_SEPARATOR,
};
