//! UiDriver - the seam between the execution engine and the live UI session
//!
//! The engine never talks to a browser directly; it sequences and guards the
//! primitives below. Concrete drivers (CDP, WebDriver, an in-process fake)
//! live in the embedding application. Driver errors distinguish conditions
//! the interaction fallback chain may absorb (timeout, intercepted) from hard
//! failures (element gone, protocol breakage).

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use webpilot_common::action::Locator;
use webpilot_common::report::DiagnosticRef;

/// Opaque handle to one live element, valid until the page mutates it away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(pub u64);

/// Element bounding box in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Geometric center, the point an interaction would land on.
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// How an interaction is delivered. The engine tries these in declared order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionMode {
    /// Trusted input with actionability enforcement in the driver
    Direct,
    /// Same effect routed through the page's native event system
    SyntheticEvent,
    /// Direct DOM dispatch, last resort
    DomDispatch,
}

impl InteractionMode {
    /// The ordered fallback chain.
    pub const CHAIN: [InteractionMode; 3] = [
        InteractionMode::Direct,
        InteractionMode::SyntheticEvent,
        InteractionMode::DomDispatch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionMode::Direct => "direct",
            InteractionMode::SyntheticEvent => "synthetic_event",
            InteractionMode::DomDispatch => "dom_dispatch",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("interaction intercepted by another element")]
    Intercepted,

    #[error("element is no longer attached")]
    Gone,

    #[error("driver protocol error: {0}")]
    Protocol(String),
}

impl DriverError {
    /// Whether the interaction fallback chain may try the next strategy.
    pub fn is_fallback_eligible(&self) -> bool {
        matches!(self, DriverError::Timeout(_) | DriverError::Intercepted)
    }
}

pub type DriverResult<T> = Result<T, DriverError>;

/// Primitive operations against one exclusively-held UI session.
#[async_trait]
pub trait UiDriver: Send {
    async fn navigate(&mut self, url: &str) -> DriverResult<()>;

    /// All live elements the locator currently matches.
    async fn resolve(&mut self, locator: &Locator) -> DriverResult<Vec<NodeHandle>>;

    async fn is_visible(&mut self, node: NodeHandle) -> DriverResult<bool>;

    async fn is_enabled(&mut self, node: NodeHandle) -> DriverResult<bool>;

    /// `None` when the element has no layout box.
    async fn bounding_box(&mut self, node: NodeHandle) -> DriverResult<Option<Rect>>;

    /// Independent point-to-element query: the topmost element at (x, y).
    async fn node_at_point(&mut self, x: f64, y: f64) -> DriverResult<Option<NodeHandle>>;

    async fn is_descendant_of(
        &mut self,
        node: NodeHandle,
        ancestor: NodeHandle,
    ) -> DriverResult<bool>;

    async fn click(
        &mut self,
        node: NodeHandle,
        mode: InteractionMode,
        timeout: Duration,
    ) -> DriverResult<()>;

    async fn fill(
        &mut self,
        node: NodeHandle,
        text: &str,
        mode: InteractionMode,
        timeout: Duration,
    ) -> DriverResult<()>;

    async fn press(
        &mut self,
        node: NodeHandle,
        key: &str,
        mode: InteractionMode,
        timeout: Duration,
    ) -> DriverResult<()>;

    /// In-flight network request count; zero means the transport is idle.
    async fn pending_requests(&mut self) -> DriverResult<usize>;

    /// Capture a diagnostic artifact (visual snapshot / serialized page
    /// state) and return an opaque reference to it.
    async fn capture_state(&mut self, label: &str) -> DriverResult<DiagnosticRef>;
}
