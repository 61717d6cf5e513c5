//! **deskpager**: the animation-and-layout core of a desktop shell.
//!
//! Workspaces are laid out on a `cols × rows` grid derived from their count
//! and slide as one sheet whenever another workspace is selected.  Windows
//! can be dragged across workspaces (dwelling at the left or right output
//! edge switches workspace mid-drag), and a grid overview shrinks every
//! workspace into a cell where windows can be moved between them.
//!
//! # Architecture
//!
//! Everything is single-threaded and driven by two kinds of input: pointer
//! events and per-output frame ticks.  A frame tick is pulled down the
//! ownership chain [`workspace::Workspace`] → [`transform::Transform`] →
//! [`animation::Animation`]; each owner reacts to what its child returns,
//! and [`signal::Signal`]s carry the same events to outside observers.
//!
//! The crate is organised around two core traits:
//!
//! * [`traits::Shell`] abstracts the panels, fullscreen state and cursor
//!   image the core needs from the surrounding shell.
//! * [`traits::CommandSource`] abstracts the transport that delivers
//!   input, so the main loop is not coupled to any specific IPC mechanism.
//!
//! [`desktop::Desktop`] ties everything together; [`ipc`] provides a
//! Unix-socket command source for the headless daemon.

pub mod animation;
pub mod command;
pub mod config;
pub mod curve;
pub mod desktop;
pub mod grab;
pub mod grid;
pub mod ipc;
pub mod output;
pub mod overview;
pub mod pager;
pub mod scene;
pub mod signal;
pub mod traits;
pub mod transform;
pub mod workspace;
