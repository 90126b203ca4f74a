//! Field codecs for the poll tape review screen.
//!
//! Each codec converts between the text a reviewer types and the value stored
//! in the document, for one field family:
//!
//! - [`IdentityCodec`]: plain text and numbers-as-text, stored verbatim
//! - [`CalendarDateCodec`]: `YYYY-MM-DD` election dates
//! - [`TimestampCodec`]: one instant shown as separate `MM/DD/YYYY` and
//!   `HH:MM AM/PM` components, each merged back without losing the other
//!
//! # Quick Start
//!
//! ```
//! use polltape_codec::{FieldCodec, Parsed, TimestampCodec, TimestampComponent};
//! use polltape_doc::{Leaf, Node};
//!
//! let stored = Node::text("2024-03-10T14:30:00");
//!
//! let display = TimestampCodec::new(TimestampComponent::Time).format(&stored).unwrap();
//! assert_eq!(display.date, "03/10/2024");
//! assert_eq!(display.time, "02:30 PM");
//!
//! let time = TimestampCodec::new(TimestampComponent::Time);
//! assert_eq!(
//!     time.parse("02:15 PM", Some(&stored)).unwrap(),
//!     Parsed::Replace(Leaf::text("2024-03-10T14:15:00"))
//! );
//! assert_eq!(time.parse("", Some(&stored)).unwrap(), Parsed::Keep);
//! ```

mod calendar;
mod codec;
mod error;
mod timestamp;

pub use calendar::{
    local_noon, local_noon_in, long_date, parse_calendar_date, weekday_name, CalendarDateCodec,
    CalendarDateDisplay,
};
pub use codec::{FieldCodec, IdentityCodec, Parsed};
pub use error::FormatError;
pub use timestamp::{StoredInstant, TimestampCodec, TimestampComponent, TimestampDisplay};
