//! In-process store used by router and service tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;

use super::ProductionStore;
use crate::error::{AppError, AppResult};
use crate::models::order::{order_code, ORDER_CANCELLED, ORDER_OPEN};
use crate::models::quote::round_money;
use crate::models::{
    Employee, GeneratedOrder, MoveOutcome, MoveRequest, NewOrder, OrderDraft, OrderSummary, QuoteItem,
    QuoteRow, QuoteStatus, Stage, StageStatus, StageTransition,
};

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
    pub id: i32,
    pub order_id: i32,
    pub stage: Stage,
    pub status: StageStatus,
}

#[derive(Default)]
struct State {
    orders: Vec<OrderSummary>,
    employees: Vec<Employee>,
    transitions: Vec<StageTransition>,
    quotes: Vec<QuoteRow>,
    quote_items: Vec<(i32, QuoteItem)>,
    events: Vec<RecordedEvent>,
    next_id: i32,
}

impl State {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn insert_order(&mut self, order: &NewOrder, at: DateTime<Utc>, zone: FixedOffset) -> (i32, String) {
        let id = self.next_id();
        let code = order_code(at, zone);
        self.orders.push(OrderSummary {
            id,
            code: code.clone(),
            customer_id: order.customer_id,
            customer_name: String::new(),
            quote_id: order.quote_id,
            status: ORDER_OPEN.to_string(),
            current_stage: Stage::first(),
            current_status: StageStatus::ToDo,
            responsible_id: order.responsible_id,
            responsible_name: None,
            expected_delivery: order.expected_delivery,
            total: order.total,
            created_at: Some(at),
            updated_at: Some(at),
        });
        let transition_id = self.next_id();
        self.transitions.push(StageTransition {
            id: transition_id,
            order_id: id,
            stage: Stage::first(),
            status: StageStatus::ToDo,
            responsible_id: order.responsible_id,
            started_at: Some(at),
            ended_at: None,
            note: String::new(),
            created_at: Some(at),
        });
        (id, code)
    }
}

pub struct MemoryStore {
    zone: FixedOffset,
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new(zone: FixedOffset) -> Self {
        Self {
            zone,
            state: Mutex::new(State::default()),
        }
    }

    /// Seeds an order as-is, without an initial transition.
    pub fn with_order(self, order: OrderSummary) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.next_id = state.next_id.max(order.id);
            state.orders.push(order);
        }
        self
    }

    pub fn with_employee(self, id: i32, name: &str) -> Self {
        self.state.lock().unwrap().employees.push(Employee {
            id,
            name: name.to_string(),
        });
        self
    }

    pub fn with_transition(self, transition: StageTransition) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.next_id = state.next_id.max(transition.id);
            state.transitions.push(transition);
        }
        self
    }

    pub fn with_quote(self, quote: QuoteRow, items: Vec<QuoteItem>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.next_id = state.next_id.max(quote.id);
            let quote_id = quote.id;
            state.quotes.push(quote);
            state.quote_items.extend(items.into_iter().map(|item| (quote_id, item)));
        }
        self
    }

    pub fn transitions(&self) -> Vec<StageTransition> {
        self.state.lock().unwrap().transitions.clone()
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.state.lock().unwrap().events.clone()
    }

    pub fn orders(&self) -> Vec<OrderSummary> {
        self.state.lock().unwrap().orders.clone()
    }

    pub fn quote_status(&self, quote_id: i32) -> Option<String> {
        let state = self.state.lock().unwrap();
        state
            .quotes
            .iter()
            .find(|q| q.id == quote_id)
            .and_then(|q| q.status.clone())
    }
}

#[async_trait]
impl ProductionStore for MemoryStore {
    async fn active_orders(&self) -> AppResult<Vec<OrderSummary>> {
        let state = self.state.lock().unwrap();
        let mut orders: Vec<OrderSummary> = state
            .orders
            .iter()
            .filter(|o| o.status != ORDER_CANCELLED)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(orders)
    }

    async fn order(&self, order_id: i32) -> AppResult<Option<OrderSummary>> {
        let state = self.state.lock().unwrap();
        Ok(state.orders.iter().find(|o| o.id == order_id).cloned())
    }

    async fn employees(&self) -> AppResult<Vec<Employee>> {
        let mut employees = self.state.lock().unwrap().employees.clone();
        employees.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(employees)
    }

    async fn transitions_for(&self, order_ids: &[i32]) -> AppResult<Vec<StageTransition>> {
        let state = self.state.lock().unwrap();
        let mut transitions: Vec<StageTransition> = state
            .transitions
            .iter()
            .filter(|t| order_ids.contains(&t.order_id))
            .cloned()
            .collect();
        transitions.sort_by_key(|t| (t.order_id, t.started_at.or(t.created_at), t.id));
        Ok(transitions)
    }

    async fn move_order(&self, request: &MoveRequest, at: DateTime<Utc>) -> AppResult<MoveOutcome> {
        let mut state = self.state.lock().unwrap();

        let position = state
            .orders
            .iter()
            .find(|o| o.id == request.order_id)
            .map(OrderSummary::position)
            .ok_or_else(|| AppError::NotFound("Pedido não encontrado.".to_string()))?;
        if !request.changes(&position) {
            return Ok(MoveOutcome::Unchanged);
        }

        let mut closed_transitions = 0;
        for transition in state
            .transitions
            .iter_mut()
            .filter(|t| t.order_id == request.order_id && t.is_open())
        {
            let start = transition.started_at.or(transition.created_at).unwrap_or(at);
            transition.ended_at = Some(at.max(start));
            closed_transitions += 1;
        }

        let transition_id = state.next_id();
        state.transitions.push(StageTransition {
            id: transition_id,
            order_id: request.order_id,
            stage: request.stage,
            status: request.status,
            responsible_id: request.responsible_id,
            started_at: Some(at),
            ended_at: None,
            note: request.note.clone(),
            created_at: Some(at),
        });

        let mut customer = None;
        if let Some(order) = state.orders.iter_mut().find(|o| o.id == request.order_id) {
            order.current_stage = request.stage;
            order.current_status = request.status;
            order.responsible_id = request.responsible_id;
            order.updated_at = Some(at);
            customer = order.customer_id;
        }

        let event_id = match customer {
            Some(_) => {
                let id = state.next_id();
                state.events.push(RecordedEvent {
                    id,
                    order_id: request.order_id,
                    stage: request.stage,
                    status: request.status,
                });
                Some(id)
            }
            None => None,
        };

        Ok(MoveOutcome::Moved {
            transition_id,
            closed_transitions,
            event_id,
        })
    }

    async fn set_quote_status(&self, quote_id: i32, status: QuoteStatus, _at: DateTime<Utc>) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        let quote = state
            .quotes
            .iter_mut()
            .find(|q| q.id == quote_id)
            .ok_or_else(|| AppError::NotFound("Orçamento não encontrado.".to_string()))?;
        quote.status = Some(status.as_str().to_string());
        Ok(())
    }

    async fn generate_order_from_quote(
        &self,
        quote_id: i32,
        draft: OrderDraft,
        at: DateTime<Utc>,
    ) -> AppResult<GeneratedOrder> {
        let mut state = self.state.lock().unwrap();

        let quote = state
            .quotes
            .iter()
            .find(|q| q.id == quote_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Orçamento não encontrado.".to_string()))?;
        if quote.status.as_deref().map(str::trim) != Some(QuoteStatus::Approved.as_str()) {
            return Err(AppError::Conflict(
                "Orçamento ainda não está aprovado.".to_string(),
            ));
        }

        if let Some(existing) = state.orders.iter().find(|o| o.quote_id == Some(quote_id)) {
            return Ok(GeneratedOrder {
                order_id: existing.id,
                code: existing.code.clone(),
                created: false,
            });
        }

        let items: Vec<&QuoteItem> = state
            .quote_items
            .iter()
            .filter(|(id, _)| *id == quote_id)
            .map(|(_, item)| item)
            .collect();
        let total = if items.is_empty() {
            quote.estimated_total.unwrap_or_default()
        } else {
            round_money(items.iter().map(|item| item.line_total()).sum::<Decimal>())
        };

        let new_order = NewOrder {
            customer_id: quote.customer_id,
            quote_id: Some(quote.id),
            responsible_id: draft.responsible_id,
            expected_delivery: draft.expected_delivery,
            total,
            notes: draft.notes.trim().to_string(),
        };
        let (order_id, code) = state.insert_order(&new_order, at, self.zone);

        Ok(GeneratedOrder {
            order_id,
            code,
            created: true,
        })
    }
}
