//! # Events Module
//!
//! Event-driven progress reporting and card detection notifications.
//!
//! ## Design
//! The core library emits events through an [`EventSink`], usually an
//! [`EventSender`] backed by a channel, so any UI (CLI, GUI, web) can
//! subscribe without the core depending on it.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         match event {
//!             Event::Transfer(TransferEvent::Progress(p)) => {
//!                 println!("Copied {}/{} {}", p.completed, p.total, p.current_file)
//!             }
//!             Event::Volume(VolumeEvent::CardDetected(card)) => {
//!                 println!("Card at {} with {} files", card.drive.display(), card.image_count)
//!             }
//!             _ => {}
//!         }
//!     }
//! });
//!
//! TransferEngine::new().transfer(&files, &project, &sender);
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender, EventSink};
pub use types::*;
