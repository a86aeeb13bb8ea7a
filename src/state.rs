use crate::database::model::{OptionSet, QuestionDraft};

/// Only the admin authoring flow needs dialogue memory; quiz takers are
/// tracked through their persisted progress record.
#[derive(Debug, Clone, Default)]
pub enum DialogueState {
    #[default]
    Idle,
    Admin(AdminState),
}

// One variant per field being collected; the per-question scratch rides
// along in the variants, the batch itself in the draft.
#[derive(Debug, Clone)]
pub enum AdminState {
    Menu,
    AwaitingCount,
    AwaitingQuestion {
        draft: AdminDraft,
    },
    AwaitingOptionA {
        draft: AdminDraft,
        question: String,
    },
    AwaitingOptionB {
        draft: AdminDraft,
        question: String,
        a: String,
    },
    AwaitingOptionC {
        draft: AdminDraft,
        question: String,
        a: String,
        b: String,
    },
    AwaitingOptionD {
        draft: AdminDraft,
        question: String,
        a: String,
        b: String,
        c: String,
    },
    AwaitingCorrect {
        draft: AdminDraft,
        question: String,
        options: OptionSet,
    },
}

/// Never persisted; committed to the bank in a single batch or discarded
/// whole.
#[derive(Debug, Clone, Default)]
pub struct AdminDraft {
    pub target: usize,
    pub collected: Vec<QuestionDraft>,
}
