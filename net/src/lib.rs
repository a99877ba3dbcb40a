//! Reading events from a long-lived streaming HTTP connection.
//!
//! Bytes arrive in arbitrarily sized chunks. A [`ChunkBuffer`] reassembles
//! them into complete JSON records, a [`Decoder`] checks each record for an
//! actor and a body, and a [`Dispatcher`] passes the resulting [`Event`] to a
//! caller supplied [`Handler`]. A [`Connection`] drives the whole pipeline for
//! one session over a [`Transport`].

pub mod buffer;
pub mod connection;
pub mod decode;
pub mod dispatch;
pub mod error;
pub mod transport;

pub use buffer::{ChunkBuffer, CompleteRecord, Records, DEFAULT_MAX_PENDING};
pub use connection::{Connection, State, StopHandle, Summary};
pub use decode::{decode, Decoder, Event, ACTOR_POINTER, BODY_POINTER};
pub use dispatch::{DispatchStats, Dispatcher, Handler};
pub use error::{DecodeError, ReaderError, TransportError};
pub use transport::{ChunkStream, Credentials, Endpoint, HttpTransport, Transport};
