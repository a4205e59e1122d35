//! The fixed catalog of meter lifecycle steps.
//!
//! Each step owns one or more keyword regexes. Catalog order matters: a line
//! whose text matches keywords of several steps is attributed to the step that
//! comes first here.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One named phase of the meter's wake / connect / report / sleep cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LifecycleStep {
    MeterWakesUp,
    AttachesToGsmNetwork,
    OpensProtocol,
    AuthenticatesToServer,
    ChecksForJobs,
    FinishesCommand,
    SendsTelemetry,
    DisconnectsFromServer,
    DisconnectsFromGsm,
    DeepSleep,
}

impl LifecycleStep {
    /// Display label used in tables, CSV exports and plots.
    pub fn label(&self) -> &'static str {
        match self {
            LifecycleStep::MeterWakesUp => "Meter Wakes up",
            LifecycleStep::AttachesToGsmNetwork => "Attaches to GSM Network",
            LifecycleStep::OpensProtocol => "Opens Protocol (TCP or MQTT)",
            LifecycleStep::AuthenticatesToServer => "Authenticates to Server",
            LifecycleStep::ChecksForJobs => "Check for Job / Commands",
            LifecycleStep::FinishesCommand => "Meter Finishes Executing Command",
            LifecycleStep::SendsTelemetry => "Send Telemetry Data",
            LifecycleStep::DisconnectsFromServer => "Disconnection from Server",
            LifecycleStep::DisconnectsFromGsm => "Disconnection from GSM Network",
            LifecycleStep::DeepSleep => "Deep Sleep",
        }
    }

    /// Position of the step in [`STEP_CATALOG`].
    pub fn ordinal(&self) -> usize {
        STEP_CATALOG
            .iter()
            .position(|def| def.step == *self)
            .unwrap_or(STEP_CATALOG.len())
    }

    /// Keyword patterns for this step.
    pub fn patterns(&self) -> &'static [&'static str] {
        STEP_CATALOG
            .iter()
            .find(|def| def.step == *self)
            .map(|def| def.patterns)
            .unwrap_or(&[])
    }
}

impl fmt::Display for LifecycleStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A catalog record: a step and the regexes that identify its log lines.
#[derive(Debug, Clone, Copy)]
pub struct StepDefinition {
    pub step: LifecycleStep,
    /// Non-empty; a line belongs to the step when any pattern matches.
    pub patterns: &'static [&'static str],
}

/// Lifecycle steps in attribution order.
pub const STEP_CATALOG: &[StepDefinition] = &[
    StepDefinition {
        step: LifecycleStep::MeterWakesUp,
        patterns: &[r"DEEPSLEEP_RESET"],
    },
    StepDefinition {
        step: LifecycleStep::AttachesToGsmNetwork,
        patterns: &[r"resetModem", r"get network status"],
    },
    StepDefinition {
        step: LifecycleStep::OpensProtocol,
        patterns: &[r"Modem Connect to PPP Server", r"MQTT ACK"],
    },
    StepDefinition {
        step: LifecycleStep::AuthenticatesToServer,
        patterns: &[r"get_cacert"],
    },
    StepDefinition {
        step: LifecycleStep::ChecksForJobs,
        patterns: &[r"handleIncomePublish.*jobs/get/accepted"],
    },
    StepDefinition {
        step: LifecycleStep::FinishesCommand,
        patterns: &[r"AdjustCredit"],
    },
    StepDefinition {
        step: LifecycleStep::SendsTelemetry,
        patterns: &[r"aws_Publish.*successed", r"meter-status"],
    },
    StepDefinition {
        step: LifecycleStep::DisconnectsFromServer,
        patterns: &[r"aws_Disconnect"],
    },
    StepDefinition {
        step: LifecycleStep::DisconnectsFromGsm,
        patterns: &[r"PPP state changed event 5"],
    },
    StepDefinition {
        step: LifecycleStep::DeepSleep,
        patterns: &[r"into low power"],
    },
];

/// All steps in catalog order.
pub fn steps() -> impl Iterator<Item = LifecycleStep> {
    STEP_CATALOG.iter().map(|def| def.step)
}
