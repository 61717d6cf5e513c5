//! Core traits that decouple deskpager from any specific shell or transport
//! mechanism.
//!
//! Every concrete backend (a compositor plugin, the headless daemon, a
//! Unix-socket listener, a test harness, …) implements one of these traits.
//! The [`Desktop`](crate::desktop::Desktop) only depends on these
//! abstractions.

use crate::command::Command;
use std::sync::mpsc;

/// Cursor images the grabs ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    /// The ordinary arrow.
    #[default]
    Arrow,
    /// Shown while a window is being dragged.
    Move,
}

/// The parts of the desktop shell the core needs but does not own: panel
/// chrome, fullscreen state and the cursor image.
///
/// An implementation might drive real panels in a compositor, or it might
/// just log (see the daemon) or record calls (see the tests).
pub trait Shell {
    /// Hide panels and other chrome while the grid overview is shown.
    fn hide_panels(&self);

    /// Undo [`hide_panels`](Shell::hide_panels).
    fn show_panels(&self);

    /// Whether a fullscreen surface currently covers the output.  The
    /// overview does not open on top of one.
    fn in_fullscreen(&self) -> bool;

    /// Change the pointer image.
    fn set_cursor(&self, cursor: Cursor);
}

//  Command Source

/// A source of [`Command`]s.
///
/// Implementations listen on some transport (a Unix socket, a compositor's
/// input stream, an in-memory channel, …) and forward parsed commands into
/// the provided [`mpsc::Sender`].
///
/// # Contract
///
/// * [`run`](CommandSource::run) **blocks** until the source is exhausted or
///   an unrecoverable error occurs.
/// * Each received command must be sent through `sink` exactly once.
/// * Implementations must be [`Send`] so they can run on a dedicated thread.
pub trait CommandSource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start listening and forward every incoming [`Command`] into `sink`.
    ///
    /// This method blocks the calling thread.  To run multiple sources
    /// concurrently, spawn each one on its own thread.
    fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), Self::Error>;
}
