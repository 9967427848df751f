// src/staging/rules.rs

//! The staging rule table.
//!
//! For every file transaction (Copy, Move, Link, Transfer) the table says,
//! per `(source realm, target realm, file-or-folder)`, whether the backend can
//! stage it directly (`Stage`), whether it has to run as a shell command
//! (`Bash`), or whether it cannot be done at all. Combinations that are not
//! listed are `Unsupported`.
//!
//! The table is immutable and process-wide; lookups need no synchronisation.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use crate::action::{ActionKind, Realm};

/// How a file transaction is carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageMode {
    /// Emit a backend staging directive.
    Stage,
    /// Emit a literal shell command.
    Bash,
    /// No way to perform the action in this realm combination.
    Unsupported,
}

impl fmt::Display for StageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StageMode::Stage => "stage",
            StageMode::Bash => "bash",
            StageMode::Unsupported => "unsupported",
        };
        f.write_str(s)
    }
}

/// Composite lookup key of the rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleKey {
    pub kind: ActionKind,
    pub source: Realm,
    pub target: Realm,
    pub is_folder: bool,
}

/// One listed entry of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageRule {
    pub key: RuleKey,
    pub mode: StageMode,
}

/// Per-kind metadata shared by all rules of that kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindRules {
    pub kind: ActionKind,
    /// Shell command used in `Bash` mode, e.g. `cp`. `None` if the kind has no
    /// shell form.
    pub bash_cmd: Option<&'static str>,
    /// Name of the backend staging action used in `Stage` mode.
    pub backend_action: &'static str,
}

static KIND_RULES: [KindRules; 4] = [
    KindRules {
        kind: ActionKind::Copy,
        bash_cmd: Some("cp"),
        backend_action: "Copy",
    },
    KindRules {
        kind: ActionKind::Transfer,
        bash_cmd: None,
        backend_action: "Transfer",
    },
    KindRules {
        kind: ActionKind::Move,
        bash_cmd: Some("mv"),
        backend_action: "Move",
    },
    KindRules {
        kind: ActionKind::Link,
        bash_cmd: Some("ln -s"),
        backend_action: "Link",
    },
];

type Entry = (ActionKind, bool, Realm, Realm, StageMode);

mod table {
    use super::{ActionKind, Entry, Realm, StageMode};
    use ActionKind::{Copy, Link, Move, Transfer};
    use Realm::{File as FL, Sandbox as SB, Shared as SH, Staging as ST, Worker as WK};
    use StageMode::{Bash, Stage};

    const FILE: bool = false;
    const FOLDER: bool = true;

    #[rustfmt::skip]
    pub(super) const ENTRIES: &[Entry] = &[
        (Copy, FILE, ST, WK, Stage),
        (Copy, FILE, WK, ST, Stage),
        (Copy, FILE, SB, WK, Bash),
        (Copy, FILE, SH, WK, Bash),
        (Copy, FILE, WK, SH, Bash),
        (Copy, FILE, SH, SH, Bash),
        (Copy, FILE, SH, ST, Bash),
        (Copy, FILE, ST, SH, Bash),
        (Copy, FOLDER, ST, WK, Bash),
        (Copy, FOLDER, WK, ST, Bash),
        (Copy, FOLDER, SB, WK, Bash),
        (Copy, FOLDER, SH, WK, Bash),
        (Copy, FOLDER, WK, SH, Bash),
        (Copy, FOLDER, SH, SH, Bash),
        (Copy, FOLDER, SH, ST, Bash),
        (Copy, FOLDER, ST, SH, Bash),

        (Transfer, FILE, FL, WK, Stage),
        (Transfer, FILE, FL, ST, Stage),
        (Transfer, FILE, ST, WK, Stage),
        (Transfer, FILE, ST, FL, Stage),
        (Transfer, FILE, WK, ST, Stage),
        (Transfer, FILE, WK, FL, Stage),

        (Move, FILE, ST, WK, Stage),
        (Move, FILE, WK, ST, Stage),
        (Move, FILE, SB, WK, Bash),
        (Move, FILE, SH, WK, Bash),
        (Move, FILE, WK, SH, Bash),
        (Move, FILE, SH, SH, Bash),
        (Move, FILE, SH, ST, Bash),
        (Move, FILE, ST, SH, Bash),
        (Move, FOLDER, ST, WK, Bash),
        (Move, FOLDER, WK, ST, Bash),
        (Move, FOLDER, SB, WK, Bash),
        (Move, FOLDER, SH, WK, Bash),
        (Move, FOLDER, WK, SH, Bash),
        (Move, FOLDER, SH, SH, Bash),
        (Move, FOLDER, SH, ST, Bash),
        (Move, FOLDER, ST, SH, Bash),

        (Link, FILE, ST, WK, Stage),
        (Link, FILE, SB, WK, Bash),
        (Link, FILE, SH, WK, Bash),
        (Link, FOLDER, ST, WK, Bash),
        (Link, FOLDER, SB, WK, Bash),
        (Link, FOLDER, SH, WK, Bash),
    ];
}

static RULE_INDEX: LazyLock<HashMap<RuleKey, StageMode>> = LazyLock::new(|| {
    all_rules().map(|rule| (rule.key, rule.mode)).collect()
});

/// Look up the mode for a key. Unlisted combinations are `Unsupported`.
pub fn lookup(key: RuleKey) -> StageMode {
    RULE_INDEX
        .get(&key)
        .copied()
        .unwrap_or(StageMode::Unsupported)
}

/// Metadata for a transaction kind; `None` for non-transaction kinds.
pub fn kind_rules(kind: ActionKind) -> Option<&'static KindRules> {
    KIND_RULES.iter().find(|rules| rules.kind == kind)
}

/// Every listed rule, in table order.
pub fn all_rules() -> impl Iterator<Item = StageRule> {
    table::ENTRIES
        .iter()
        .map(|&(kind, is_folder, source, target, mode)| StageRule {
            key: RuleKey {
                kind,
                source,
                target,
                is_folder,
            },
            mode,
        })
}
