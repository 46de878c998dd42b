//! Status and classification vocabularies.
//!
//! Every enum here is stored as a snake_case `TEXT` column guarded by a
//! `CHECK` constraint. The string values must stay in sync with the
//! migrations in `db/migrations`.

use serde::{Deserialize, Serialize};

macro_rules! define_text_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$( $name::$variant ),+];

            /// The database string value.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $val ),+
                }
            }

            /// Parse a database string value.
            pub fn from_str_value(s: &str) -> Result<Self, String> {
                match s {
                    $( $val => Ok($name::$variant), )+
                    _ => Err(format!(
                        "Invalid {} '{s}'. Must be one of: {}",
                        stringify!($name),
                        [$( $val ),+].join(", ")
                    )),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

define_text_enum! {
    /// Project lifecycle status.
    ProjectStatus {
        /// Created by a manager, awaiting approval.
        Pending = "pending",
        Planning = "planning",
        InProgress = "in_progress",
        OnHold = "on_hold",
        Completed = "completed",
        Cancelled = "cancelled",
        Rejected = "rejected",
    }
}

impl ProjectStatus {
    /// Statuses after which the project is no longer tracked for deadlines.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Rejected)
    }
}

define_text_enum! {
    /// Task workflow status.
    TaskStatus {
        Todo = "todo",
        InProgress = "in_progress",
        Review = "review",
        OnHold = "on_hold",
        Completed = "completed",
    }
}

define_text_enum! {
    /// Derived milestone status.
    MilestoneStatus {
        NotStarted = "not_started",
        InProgress = "in_progress",
        Completed = "completed",
        Delayed = "delayed",
        AtRisk = "at_risk",
    }
}

define_text_enum! {
    /// Priority shared by projects, tasks and risk/issue records.
    Priority {
        Low = "low",
        Medium = "medium",
        High = "high",
        Critical = "critical",
    }
}

define_text_enum! {
    /// Whether a `risk_issues` row is a forward-looking risk or a realised issue.
    RiskIssueType {
        Risk = "risk",
        Issue = "issue",
    }
}

define_text_enum! {
    /// Lifecycle of a `risk_issues` row.
    RiskIssueStatus {
        Open = "open",
        InProgress = "in_progress",
        Resolved = "resolved",
        Closed = "closed",
    }
}

impl RiskIssueStatus {
    /// Open rows take part in deadline de-duplication; resolved/closed ones do not.
    pub fn is_open(self) -> bool {
        matches!(self, Self::Open | Self::InProgress)
    }
}

define_text_enum! {
    /// Which deadline condition produced a `risk_issues` row.
    ///
    /// Rows created by people have no source kind.
    RiskSourceKind {
        ProjectDeadlineApproaching = "project_deadline_approaching",
        ProjectDeadlineMissed = "project_deadline_missed",
        TaskDeadlineApproaching = "task_deadline_approaching",
        TaskDeadlineMissed = "task_deadline_missed",
    }
}

impl RiskSourceKind {
    pub fn is_missed(self) -> bool {
        matches!(self, Self::ProjectDeadlineMissed | Self::TaskDeadlineMissed)
    }
}

define_text_enum! {
    /// Review state of a change request.
    ChangeRequestStatus {
        Pending = "pending",
        Approved = "approved",
        Rejected = "rejected",
    }
}
