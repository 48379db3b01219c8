use serde::Serialize;

/// The two independent delivery paths an event fans out to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    Log,
    Queue,
}

impl SinkKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::Queue => "queue",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkStatus {
    Success,
    Error,
}

/// Result of one writer dispatch, as reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchOutcome {
    pub sink: SinkKind,
    pub status: SinkStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl DispatchOutcome {
    pub fn success(sink: SinkKind) -> Self {
        Self {
            sink,
            status: SinkStatus::Success,
            detail: None,
        }
    }

    pub fn error(sink: SinkKind, detail: impl Into<String>) -> Self {
        Self {
            sink,
            status: SinkStatus::Error,
            detail: Some(detail.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == SinkStatus::Success
    }
}

/// Joint verdict for one submission: success only when every sink succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JointOutcome {
    pub sinks: Vec<DispatchOutcome>,
}

impl JointOutcome {
    pub fn new(sinks: Vec<DispatchOutcome>) -> Self {
        Self { sinks }
    }

    pub fn is_success(&self) -> bool {
        self.sinks.iter().all(DispatchOutcome::is_success)
    }

    /// Details of the failed sinks, for logging and the error response body.
    pub fn failure_details(&self) -> Vec<String> {
        self.sinks
            .iter()
            .filter(|outcome| !outcome.is_success())
            .map(|outcome| {
                format!(
                    "{}: {}",
                    outcome.sink.name(),
                    outcome.detail.as_deref().unwrap_or("unknown error")
                )
            })
            .collect()
    }
}
