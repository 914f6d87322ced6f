//! # ttproto: schema-driven protobuf codec for transit timetables
//!
//! Encodes and decodes hierarchical timetable data (routes made of stops) in the protocol
//! buffer binary wire format, without generated code: message layouts are described at
//! runtime by [`Schema`]s and values live in [`Record`]s.
//!
//! ## Wire format
//!
//! - A message is a sequence of `(tag, value)` pairs in any order.
//! - Tag: varint of `(field_number << 3) | wire_type`.
//! - Wire type `0`: varint value (`uint32`).
//! - Wire type `2`: varint length, then that many bytes (`string` as UTF-8, nested message).
//! - Repeated message fields write one tag per element. Default values (`0`, `""`, no
//!   elements) are not written.
//!
//! ## Timetable messages
//!
//! ```text
//! message Data {
//!   repeated Route routes = 1;
//!   message Route {
//!     string id = 1;
//!     uint32 days = 2;
//!     uint32 from = 3;
//!     uint32 to = 4;
//!     repeated Stop stops = 5;
//!     message Stop {
//!       uint32 stationId = 1;
//!       uint32 arrival = 2;
//!       uint32 departure = 3;
//!       uint32 platform = 4;
//!     }
//!   }
//! }
//! ```
//!
//! ## Usage
//!
//! ```
//! use ttproto::transit::{route, Data, Route, Stop, TransitSchemas};
//! use ttproto::{decode, encode};
//!
//! let schemas = TransitSchemas::new().unwrap();
//! let data = Data {
//!     routes: vec![Route {
//!         id: "R1".into(),
//!         days: 31,
//!         from: 1,
//!         to: 2,
//!         stops: vec![Stop { station_id: 1, arrival: 800, departure: 805, platform: 3 }],
//!     }],
//! };
//! let record = data.to_record(&schemas).unwrap();
//! let bytes = encode(&record, &schemas.data).unwrap();
//! let back = decode(&bytes, &schemas.data).unwrap();
//! assert_eq!(back.messages(1).unwrap()[0].string(route::ID).unwrap(), "R1");
//! ```

pub mod codec;
pub mod dump;
pub mod frame;
pub mod record;
pub mod schema;
pub mod tag;
pub mod timetable;
pub mod transit;
pub mod value;
pub mod varint;

pub use codec::{decode, encode, CodecError};
pub use frame::{decode_delimited, encode_delimited, StreamDecodeResult};
pub use record::Record;
pub use schema::{FieldDescriptor, FieldDisplay, FieldKind, Schema, SchemaError};
pub use tag::{FieldTag, WireType};
pub use timetable::{OperatingDays, TimetableError};
pub use value::Value;
