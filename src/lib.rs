// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Client-side synchronization engine for server-driven 3D scenes.
//!
//! A server streams batches of msgpack messages over a websocket; scenelink
//! keeps a local mirror of the scene tree, the control panel and the camera
//! in step with them, and reports user interaction back.
//!
//! # Key entry points
//!
//! - [`engine::SceneClient`] - the client, driven one tick per frame
//! - [`transport::TransportWorker`] - websocket connection on its own thread
//! - [`scene::backend::SceneBackend`] - seam to whatever draws the scene
//! - [`options::ClientOptions`] - runtime configuration (timeouts,
//!   throttles, transfer sizes)
//!
//! # Architecture
//!
//! The [`transport::TransportWorker`] thread decodes inbound frames in
//! parallel but hands batches over strictly in arrival order. Each tick the
//! [`dispatch::MessageDispatcher`] applies queued messages to the stores,
//! pausing at render requests until the frame they ask for has been
//! captured and encoded on the [`dispatch::CaptureEncoder`] thread. The
//! [`scene::mirror::SceneMirror`] then reconciles the scene tree onto the
//! backend, and throttled outbound messages are flushed.

pub mod camera;
pub mod coords;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod gui;
pub mod input;
pub mod options;
pub mod protocol;
pub mod scene;
pub mod transfer;
pub mod transport;
pub mod util;

pub use engine::SceneClient;
pub use error::ClientError;
