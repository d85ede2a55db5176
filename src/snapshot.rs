//! Immutable text snapshots and their lineage.
//!
//! A [`TextSnapshot`] is one version of a (possibly multi-segment) text,
//! together with the word-level bookkeeping that relates it to the root
//! snapshot it was derived from. Snapshots are produced by wrapping raw input
//! or by rewriting another snapshot, and are never changed afterwards except
//! by the memory-release hooks.

use std::any::Any;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FromIterator;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::config::SnapshotContext;
use crate::errors::{PerturbError, PerturbResult};
use crate::index_map::{IndexMap, ModifiedIndices};

/// Name of the segment created from plain string input.
pub const DEFAULT_SEGMENT: &str = "text";

/// Heavy side-metadata attached to a snapshot, such as the transformation
/// that produced it.
pub type Payload = Arc<dyn Any + Send + Sync>;

/// Raw construction input: ordered, named text segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextInput {
    segments: Vec<(String, String)>,
}

impl TextInput {
    /// A single segment named [`DEFAULT_SEGMENT`].
    pub fn single(text: impl Into<String>) -> Self {
        Self {
            segments: vec![(DEFAULT_SEGMENT.to_string(), text.into())],
        }
    }

    pub fn segments(&self) -> &[(String, String)] {
        &self.segments
    }
}

impl From<&str> for TextInput {
    fn from(text: &str) -> Self {
        TextInput::single(text)
    }
}

impl From<String> for TextInput {
    fn from(text: String) -> Self {
        TextInput::single(text)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TextInput {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            segments: iter
                .into_iter()
                .map(|(name, text)| (name.into(), text.into()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<String>> From<Vec<(K, V)>> for TextInput {
    fn from(segments: Vec<(K, V)>) -> Self {
        segments.into_iter().collect()
    }
}

/// Bookkeeping carried from a rewrite into the snapshot it produces.
pub(crate) struct Derivation {
    pub index_map: IndexMap,
    pub modified_indices: ModifiedIndices,
    pub newly_modified_indices: ModifiedIndices,
    pub previous: TextSnapshot,
}

/// One immutable version of a text with its word-level bookkeeping.
///
/// A `TextSnapshot` is a handle: cloning it is cheap and shares the same
/// snapshot, and a rewrite links the snapshot it was called on as its
/// parent.
///
/// ```
/// use layered_perturb::TextSnapshot;
///
/// let root = TextSnapshot::new("The quick fox jumps.").unwrap();
/// let next = root.replace_word_at_index(1, "slow").unwrap();
///
/// assert_eq!(next.text(), "The slow fox jumps.");
/// assert!(next.modified_indices().contains(1));
/// assert!(TextSnapshot::ptr_eq(next.previous().unwrap(), &root));
/// ```
#[derive(Clone)]
pub struct TextSnapshot {
    inner: Arc<SnapshotData>,
}

#[derive(Clone)]
struct SnapshotData {
    segments: Vec<(String, String)>,
    /// Segments joined with '\n'
    text: String,
    words: Vec<String>,
    index_map: IndexMap,
    modified_indices: ModifiedIndices,
    newly_modified_indices: ModifiedIndices,
    previous: Option<TextSnapshot>,
    /// Links between this snapshot and the root
    generation: usize,
    payload: Option<Payload>,
    context: Arc<SnapshotContext>,
}

impl TextSnapshot {
    /// A root snapshot using the default tokenizer and split token.
    pub fn new(input: impl Into<TextInput>) -> PerturbResult<Self> {
        Self::with_context(input, SnapshotContext::shared_default())
    }

    /// A root snapshot using `context` for tokenization and rewrites.
    pub fn with_context(
        input: impl Into<TextInput>,
        context: Arc<SnapshotContext>,
    ) -> PerturbResult<Self> {
        let data = SnapshotData::root(input.into().segments, context)?;
        Ok(Self {
            inner: Arc::new(data),
        })
    }

    pub(crate) fn derived(
        segments: Vec<(String, String)>,
        context: Arc<SnapshotContext>,
        derivation: Derivation,
    ) -> PerturbResult<Self> {
        let mut data = SnapshotData::root(segments, context)?;
        data.index_map = derivation.index_map;
        data.modified_indices = derivation.modified_indices;
        data.newly_modified_indices = derivation.newly_modified_indices;
        data.generation = derivation.previous.generation() + 1;
        data.previous = Some(derivation.previous);
        Ok(Self {
            inner: Arc::new(data),
        })
    }

    /// Whether both handles refer to the same snapshot.
    pub fn ptr_eq(a: &TextSnapshot, b: &TextSnapshot) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// Full text, segments joined by line breaks.
    pub fn text(&self) -> &str {
        &self.inner.text
    }

    pub fn words(&self) -> &[String] {
        &self.inner.words
    }

    pub fn num_words(&self) -> usize {
        self.inner.words.len()
    }

    /// `(name, text)` pairs in input order.
    pub fn segments(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.inner
            .segments
            .iter()
            .map(|(name, text)| (name.as_str(), text.as_str()))
    }

    /// Segment texts in order, as handed to a model tokenizer.
    pub fn tokenizer_input(&self) -> Vec<&str> {
        self.inner
            .segments
            .iter()
            .map(|(_, text)| text.as_str())
            .collect()
    }

    /// Segments joined by the private split token.
    pub(crate) fn joined_for_edit(&self) -> String {
        join_segments(&self.inner.segments, self.inner.context.split_token())
    }

    pub(crate) fn segment_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.inner.segments.iter().map(|(name, _)| name.as_str())
    }

    pub fn context(&self) -> &Arc<SnapshotContext> {
        &self.inner.context
    }

    pub fn index_map(&self) -> &IndexMap {
        &self.inner.index_map
    }

    /// One entry per current word: the root position it came from, or
    /// `None` for inserted words.
    pub fn original_index_map(&self) -> Vec<Option<usize>> {
        self.inner.index_map.current_to_original(self.num_words())
    }

    /// One entry per root word: its current position, or `None` once deleted.
    pub fn original_to_current(&self) -> &[Option<usize>] {
        self.inner.index_map.original_to_current()
    }

    /// Root positions of deleted words.
    pub fn deletion_indices(&self) -> Vec<usize> {
        self.inner.index_map.deletion_indices()
    }

    pub fn modified_indices(&self) -> &ModifiedIndices {
        &self.inner.modified_indices
    }

    /// Positions changed by the rewrite that produced this snapshot.
    pub fn newly_modified_indices(&self) -> &ModifiedIndices {
        &self.inner.newly_modified_indices
    }

    pub fn previous(&self) -> Option<&TextSnapshot> {
        self.inner.previous.as_ref()
    }

    /// Parent, grandparent, ... up to the root.
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors {
            next: self.previous(),
        }
    }

    /// Number of rewrites between the root and this snapshot.
    pub fn generation(&self) -> usize {
        self.inner.generation
    }

    /// The first snapshot of the lineage still linked from this one.
    pub fn root(&self) -> &TextSnapshot {
        self.ancestors().last().unwrap_or(self)
    }

    pub fn is_root(&self) -> bool {
        self.inner.previous.is_none()
    }

    /// Attach side-metadata; it never takes part in equality.
    ///
    /// Other handles to the same snapshot do not see the payload.
    pub fn with_payload(mut self, payload: Payload) -> Self {
        Arc::make_mut(&mut self.inner).payload = Some(payload);
        self
    }

    pub fn payload(&self) -> Option<&Payload> {
        self.inner.payload.as_ref()
    }

    /// The payload downcast to `T`.
    pub fn payload_as<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.payload().and_then(|payload| payload.downcast_ref::<T>())
    }

    /// Drop the payload of this snapshot and of every ancestor reachable
    /// only through it.
    ///
    /// The walk stops at the first snapshot that is also referenced from
    /// elsewhere, since that reference may still need the payload.
    pub fn free_memory(&mut self) {
        let mut current = Arc::get_mut(&mut self.inner);
        while let Some(data) = current {
            data.payload = None;
            current = match data.previous.as_mut() {
                Some(previous) => {
                    let exclusive = Arc::get_mut(&mut previous.inner);
                    if exclusive.is_none() {
                        tracing::trace!("stopping free_memory at a shared ancestor");
                    }
                    exclusive
                }
                None => None,
            };
        }
    }

    /// Unlink this snapshot from its parent, returning the link.
    pub fn detach_previous(&mut self) -> Option<TextSnapshot> {
        self.inner.previous.as_ref()?;
        let data = Arc::make_mut(&mut self.inner);
        data.generation = 0;
        data.previous.take()
    }
}

impl SnapshotData {
    fn root(
        segments: Vec<(String, String)>,
        context: Arc<SnapshotContext>,
    ) -> PerturbResult<Self> {
        let segments = validate_segments(segments, &context)?;
        let text = join_segments(&segments, "\n");
        let words = context.tokenizer().words_from_text(&text);
        Ok(Self {
            index_map: IndexMap::identity(words.len()),
            modified_indices: ModifiedIndices::new(),
            newly_modified_indices: ModifiedIndices::new(),
            previous: None,
            generation: 0,
            payload: None,
            segments,
            text,
            words,
            context,
        })
    }
}

/// Iterator over a snapshot's ancestors, nearest first.
pub struct Ancestors<'a> {
    next: Option<&'a TextSnapshot>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a TextSnapshot;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.previous();
        Some(current)
    }
}

fn join_segments(segments: &[(String, String)], separator: &str) -> String {
    segments
        .iter()
        .map(|(_, text)| text.as_str())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Trim every segment and reject input the rewrite engine could not split
/// back into the same segments.
fn validate_segments(
    segments: Vec<(String, String)>,
    context: &SnapshotContext,
) -> PerturbResult<Vec<(String, String)>> {
    if segments.is_empty() {
        return Err(PerturbError::invalid_input("at least one segment is required"));
    }
    let mut names = HashSet::new();
    for (name, _) in &segments {
        if !names.insert(name.as_str()) {
            return Err(PerturbError::invalid_input(format!(
                "duplicate segment name {:?}",
                name
            )));
        }
    }
    let segments: Vec<(String, String)> = segments
        .into_iter()
        .map(|(name, text)| (name, text.trim().to_string()))
        .collect();

    let split_token = context.split_token();
    let joined = join_segments(&segments, split_token);
    let splits_back = joined
        .split(split_token)
        .eq(segments.iter().map(|(_, text)| text.as_str()));
    if !splits_back {
        return Err(PerturbError::invalid_input(format!(
            "segment text collides with split token {:?}",
            split_token
        )));
    }
    Ok(segments)
}

/// Equal text and equal bookkeeping. Lineage and payload are ignored.
impl PartialEq for TextSnapshot {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = (&*self.inner, &*other.inner);
        a.text == b.text
            && a.index_map == b.index_map
            && a.modified_indices == b.modified_indices
            && a.newly_modified_indices == b.newly_modified_indices
    }
}

impl Eq for TextSnapshot {}

/// Hashes the text only; snapshots with equal text collide.
impl Hash for TextSnapshot {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.text.hash(state);
    }
}

impl fmt::Debug for TextSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextSnapshot")
            .field("text", &self.inner.text)
            .field("generation", &self.inner.generation)
            .field("modified_indices", &self.inner.modified_indices)
            .field("has_payload", &self.inner.payload.is_some())
            .finish()
    }
}

impl fmt::Display for TextSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner.text)
    }
}

impl Serialize for TextSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let segments: Vec<(&str, &str)> = self.segments().collect();
        let mut state = serializer.serialize_struct("TextSnapshot", 6)?;
        state.serialize_field("segments", &segments)?;
        state.serialize_field("words", &self.inner.words)?;
        state.serialize_field("original_to_current", &self.inner.index_map)?;
        state.serialize_field("modified_indices", &self.inner.modified_indices)?;
        state.serialize_field("newly_modified_indices", &self.inner.newly_modified_indices)?;
        state.serialize_field("generation", &self.inner.generation)?;
        state.end()
    }
}

// Unlinks the lineage iteratively so dropping a long chain cannot overflow
// the stack.
impl Drop for SnapshotData {
    fn drop(&mut self) {
        let mut previous = self.previous.take();
        while let Some(snapshot) = previous {
            match Arc::try_unwrap(snapshot.inner) {
                Ok(mut data) => previous = data.previous.take(),
                Err(_) => break,
            }
        }
    }
}
