use std::cell::RefCell;

/// Non-fatal conditions raised while synthesizing node drawables.
///
/// None of these abort rendering; the caller always gets a usable (possibly
/// empty) path or label back and the warning travels through a [`DiagnosticSink`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Warning {
    #[error("unsupported shape {name}")]
    UnsupportedShape { name: String },

    #[error("unsupported number of peripheries {requested} for shape {shape}, using {used}")]
    UnsupportedPeripheries {
        shape: String,
        requested: i64,
        used: u8,
    },

    #[error("replacing font \"{requested}\" by font \"{substituted}\"")]
    FontSubstitution {
        requested: String,
        substituted: String,
    },

    #[error("malformed vertex data for shape {shape}: {detail}")]
    MalformedVertexData { shape: String, detail: String },

    #[error("label {text:?} not rendered: {detail}")]
    LabelNotRendered { text: String, detail: String },
}

/// Fire-and-forget receiver for [`Warning`]s. Must never fail or block.
pub trait DiagnosticSink {
    fn warn(&self, warning: Warning);
}

/// Forwards every warning to `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn warn(&self, warning: Warning) {
        match &warning {
            Warning::UnsupportedShape { name } => {
                tracing::warn!(shape = %name, "{warning}")
            }
            Warning::UnsupportedPeripheries {
                shape, requested, ..
            } => tracing::warn!(shape = %shape, requested, "{warning}"),
            Warning::FontSubstitution {
                requested,
                substituted,
            } => tracing::warn!(requested = %requested, substituted = %substituted, "{warning}"),
            Warning::MalformedVertexData { shape, .. } => {
                tracing::warn!(shape = %shape, "{warning}")
            }
            Warning::LabelNotRendered { text, .. } => tracing::warn!(text = %text, "{warning}"),
        }
    }
}

/// Keeps every warning it receives, in order. Also logs them through `tracing`.
#[derive(Debug, Default)]
pub struct CollectingSink {
    warnings: RefCell<Vec<Warning>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warnings(&self) -> Vec<Warning> {
        self.warnings.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.warnings.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.borrow().is_empty()
    }

    pub fn take(&self) -> Vec<Warning> {
        self.warnings.take()
    }
}

impl DiagnosticSink for CollectingSink {
    fn warn(&self, warning: Warning) {
        TracingSink.warn(warning.clone());
        self.warnings.borrow_mut().push(warning);
    }
}
