//! Flex Designer Simulator Bridge
//!
//! Drives the LINE Flex Message Simulator, a page we do not own, with structural
//! heuristics only:
//! 1. visibility / locator - what is on screen and where
//! 2. discovery - which JSON editor the dialog uses, opening it if needed
//! 3. inject - writing content the way that editor expects
//! 4. apply / orchestrator - pressing the page's own apply control
//!
//! The heuristics run against [`HostPage`]; [`CdpPage`] implements it for a live tab
//! and, with the `fixture` feature, `fixture::FixturePage` for an in-memory document.

pub mod apply;
pub mod bridge;
pub mod browser;
pub mod cdp;
pub mod discovery;
pub mod error;
#[cfg(any(test, feature = "fixture"))]
pub mod fixture;
pub mod inject;
pub mod locator;
pub mod orchestrator;
pub mod page;
pub mod poll;
#[cfg(any(test, feature = "fixture"))]
pub mod selector;
pub mod visibility;

pub use cdp::CdpPage;
pub use discovery::{Editor, EditorHandle};
pub use error::{InjectError, OperationResult, PageError};
pub use orchestrator::apply_to_simulator;
pub use page::{ComputedStyle, DomEvent, HostPage, ModelRef, NodeRef, ViewRef};
pub use poll::Timing;
