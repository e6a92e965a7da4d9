//! Rotation primitives and the rotation trace.
//!
//! [`rotate_left`] and [`rotate_right`] only relink nodes. They never touch
//! balance factors; keeping those right is the job of the rebalancing code
//! in the tree engine, which knows which case it is repairing.

use std::fmt;
use std::io;

use super::node::Node;

// =============================================================================
// Rotation Events
// =============================================================================

/// Direction of a single rotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RotationDirection {
    /// The right child becomes the subtree root.
    Left,
    /// The left child becomes the subtree root.
    Right,
}

impl fmt::Display for RotationDirection {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Left => "left",
            Self::Right => "right",
        })
    }
}

/// One rotation performed while rebalancing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RotationEvent {
    /// Which way the subtree was rotated.
    pub direction: RotationDirection,
    /// The key of the subtree root before the rotation, as text.
    pub pivot: String,
}

impl fmt::Display for RotationEvent {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = match self.direction {
            RotationDirection::Left => "rotateLeft",
            RotationDirection::Right => "rotateRight",
        };
        write!(formatter, "{direction} around {}", self.pivot)
    }
}

// =============================================================================
// Rotation Sinks
// =============================================================================

/// Receives every rotation a tree performs.
///
/// A sink is injected per tree with
/// [`AvlTree::with_sink`](super::AvlTree::with_sink) or
/// [`AvlTree::set_sink`](super::AvlTree::set_sink). Closures taking a
/// `&RotationEvent` are sinks.
///
/// # Examples
///
/// ```rust
/// use cslib::bst::{AvlTree, RotationEvent};
/// use std::sync::{Arc, Mutex};
///
/// let events = Arc::new(Mutex::new(Vec::new()));
/// let recorder = Arc::clone(&events);
/// let mut tree: AvlTree<()> = AvlTree::with_sink("int", move |event: &RotationEvent| {
///     recorder.lock().unwrap().push(event.to_string());
/// });
///
/// for key in 1..=3 {
///     tree.insert(key);
/// }
/// assert_eq!(*events.lock().unwrap(), vec!["rotateLeft around 1"]);
/// ```
pub trait RotationSink {
    /// Called once per rotation, before the nodes are relinked.
    fn record(&mut self, event: &RotationEvent);
}

impl<F> RotationSink for F
where
    F: FnMut(&RotationEvent),
{
    fn record(&mut self, event: &RotationEvent) {
        self(event);
    }
}

/// Thread-safety a sink needs to be stored in a tree.
///
/// With the `arc` feature the tree is `Send + Sync`, so its sink must be too.
/// Otherwise every type qualifies, and an `Rc<RefCell<_>>` recorder works.
#[cfg(feature = "arc")]
pub trait SinkBound: Send + Sync {}

#[cfg(feature = "arc")]
impl<T: Send + Sync + ?Sized> SinkBound for T {}

/// Thread-safety a sink needs to be stored in a tree.
///
/// With the `arc` feature the tree is `Send + Sync`, so its sink must be too.
/// Otherwise every type qualifies, and an `Rc<RefCell<_>>` recorder works.
#[cfg(not(feature = "arc"))]
pub trait SinkBound {}

#[cfg(not(feature = "arc"))]
impl<T: ?Sized> SinkBound for T {}

#[cfg(feature = "arc")]
pub(crate) type BoxedSink = Box<dyn RotationSink + Send + Sync>;

#[cfg(not(feature = "arc"))]
pub(crate) type BoxedSink = Box<dyn RotationSink>;

/// Forwards rotations to `tracing` at debug level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl RotationSink for TracingSink {
    fn record(&mut self, event: &RotationEvent) {
        tracing::debug!(
            target: "cslib::bst",
            direction = %event.direction,
            pivot = %event.pivot,
            "rotation"
        );
    }
}

/// Writes one line per rotation to an [`io::Write`] implementation, in the
/// `rotateLeft around <key>` format of cslib's debug log.
#[derive(Debug, Default)]
pub struct WriterSink<W> {
    writer: W,
}

impl<W: io::Write> WriterSink<W> {
    /// Wraps `writer`.
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: io::Write> RotationSink for WriterSink<W> {
    fn record(&mut self, event: &RotationEvent) {
        if let Err(error) = writeln!(self.writer, "{event}") {
            tracing::warn!(target: "cslib::bst", %error, "failed to write rotation log");
        }
    }
}

// =============================================================================
// Rotation Primitives
// =============================================================================

/// Makes the right child of `slot` the new subtree root.
///
/// Does nothing when there is no right child.
pub(crate) fn rotate_left<V>(slot: &mut Box<Node<V>>) {
    let Some(mut child) = slot.right.take() else {
        return;
    };
    slot.right = child.left.take();
    std::mem::swap(slot, &mut child);
    slot.left = Some(child);
}

/// Makes the left child of `slot` the new subtree root.
///
/// Does nothing when there is no left child.
pub(crate) fn rotate_right<V>(slot: &mut Box<Node<V>>) {
    let Some(mut child) = slot.left.take() else {
        return;
    };
    slot.left = child.right.take();
    std::mem::swap(slot, &mut child);
    slot.right = Some(child);
}
