pub mod employee;
pub mod order;
pub mod production;
pub mod quote;

pub use employee::Employee;
pub use order::{NewOrder, OrderRow, OrderSummary};
pub use production::{
    MoveOutcome, MoveRequest, Stage, StagePosition, StageStatus, StageTransition, TransitionRow,
};
pub use quote::{GeneratedOrder, OrderDraft, QuoteItem, QuoteRow, QuoteStatus};
