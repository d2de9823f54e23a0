use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;
use sqlx::{Postgres, Transaction};

use super::ProductionStore;
use crate::database::Database;
use crate::error::{AppError, AppResult};
use crate::models::order::{order_code, ORDER_CANCELLED, ORDER_OPEN};
use crate::models::quote::round_money;
use crate::models::{
    Employee, GeneratedOrder, MoveOutcome, MoveRequest, NewOrder, OrderDraft, OrderRow, OrderSummary,
    QuoteItem, QuoteRow, QuoteStatus, Stage, StagePosition, StageStatus, StageTransition,
    TransitionRow,
};

const ORDER_SELECT: &str = r#"
    SELECT
        p.id,
        p.codigo AS code,
        p.cliente_id AS customer_id,
        c.nome AS customer_name,
        p.orcamento_id AS quote_id,
        p.status,
        p.etapa_atual AS current_stage,
        p.status_etapa AS current_status,
        p.responsavel_id AS responsible_id,
        f.nome AS responsible_name,
        p.data_entrega_prevista AS expected_delivery,
        p.total,
        p.created_at,
        p.updated_at
    FROM pedidos p
    LEFT JOIN clientes c ON c.id = p.cliente_id
    LEFT JOIN funcionarios f ON f.id = p.responsavel_id
"#;

#[derive(Clone)]
pub struct PgProductionStore {
    db: Database,
    zone: FixedOffset,
}

impl PgProductionStore {
    pub fn new(db: Database, zone: FixedOffset) -> Self {
        Self { db, zone }
    }

    async fn insert_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: &NewOrder,
        at: DateTime<Utc>,
    ) -> AppResult<(i32, String)> {
        let code = order_code(at, self.zone);

        let order_id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO pedidos (
                codigo, cliente_id, orcamento_id, status, etapa_atual, status_etapa,
                responsavel_id, data_entrega_prevista, total, observacoes, created_at, updated_at
            )
            VALUES ($1, $2, $3, 'Aberto', $4, $5, $6, $7, $8, $9, $10, $10)
            RETURNING id
            "#,
        )
        .bind(&code)
        .bind(order.customer_id)
        .bind(order.quote_id)
        .bind(Stage::first().as_str())
        .bind(StageStatus::ToDo.as_str())
        .bind(order.responsible_id)
        .bind(order.expected_delivery)
        .bind(order.total)
        .bind(&order.notes)
        .bind(at)
        .fetch_one(&mut **tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO producao_etapas (pedido_id, etapa, status, responsavel_id, inicio_em, observacoes, created_at)
            VALUES ($1, $2, $3, $4, $5, '', $5)
            "#,
        )
        .bind(order_id)
        .bind(Stage::first().as_str())
        .bind(StageStatus::ToDo.as_str())
        .bind(order.responsible_id)
        .bind(at)
        .execute(&mut **tx)
        .await?;

        Ok((order_id, code))
    }
}

#[async_trait]
impl ProductionStore for PgProductionStore {
    async fn active_orders(&self) -> AppResult<Vec<OrderSummary>> {
        let sql = format!(
            "{ORDER_SELECT} WHERE COALESCE(p.status, $1) <> $2 ORDER BY p.updated_at DESC NULLS LAST"
        );
        let orders = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(ORDER_OPEN)
            .bind(ORDER_CANCELLED)
            .fetch_all(&self.db)
            .await?
            .into_iter()
            .map(OrderSummary::from)
            .collect();

        Ok(orders)
    }

    async fn order(&self, order_id: i32) -> AppResult<Option<OrderSummary>> {
        let sql = format!("{ORDER_SELECT} WHERE p.id = $1");
        let order = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(order_id)
            .fetch_optional(&self.db)
            .await?
            .map(OrderSummary::from);

        Ok(order)
    }

    async fn employees(&self) -> AppResult<Vec<Employee>> {
        let employees = sqlx::query_as::<_, Employee>(
            "SELECT id, nome AS name FROM funcionarios WHERE COALESCE(ativo, TRUE) ORDER BY nome",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(employees)
    }

    async fn transitions_for(&self, order_ids: &[i32]) -> AppResult<Vec<StageTransition>> {
        if order_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, TransitionRow>(
            r#"
            SELECT
                id,
                pedido_id AS order_id,
                etapa AS stage,
                status,
                responsavel_id AS responsible_id,
                inicio_em AS started_at,
                fim_em AS ended_at,
                observacoes AS note,
                created_at
            FROM producao_etapas
            WHERE pedido_id = ANY($1)
            ORDER BY pedido_id, COALESCE(inicio_em, created_at) ASC NULLS LAST, id
            "#,
        )
        .bind(order_ids)
        .fetch_all(&self.db)
        .await?;

        let transitions = rows
            .into_iter()
            .filter_map(|row| {
                let id = row.id;
                match StageTransition::try_from(row) {
                    Ok(transition) => Some(transition),
                    Err(e) => {
                        log::warn!("skipping stage transition {}: {}", id, e);
                        None
                    }
                }
            })
            .collect();

        Ok(transitions)
    }

    async fn move_order(&self, request: &MoveRequest, at: DateTime<Utc>) -> AppResult<MoveOutcome> {
        let mut tx = self.db.begin().await?;

        let current = sqlx::query_as::<_, (Option<String>, Option<String>)>(
            "SELECT etapa_atual, status_etapa FROM pedidos WHERE id = $1 FOR UPDATE",
        )
        .bind(request.order_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Pedido não encontrado.".to_string()))?;

        let position = match current {
            (Some(stage), Some(status)) => match (stage.parse::<Stage>(), status.parse::<StageStatus>()) {
                (Ok(stage), Ok(status)) => Some(StagePosition { stage, status }),
                _ => None,
            },
            _ => None,
        };
        if let Some(position) = position {
            if !request.changes(&position) {
                tx.rollback().await?;
                return Ok(MoveOutcome::Unchanged);
            }
        }

        sqlx::query(
            r#"
            UPDATE pedidos SET
                etapa_atual = $2, status_etapa = $3, responsavel_id = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(request.order_id)
        .bind(request.stage.as_str())
        .bind(request.status.as_str())
        .bind(request.responsible_id)
        .bind(at)
        .execute(&mut *tx)
        .await?;

        // Close whatever is still open; never before the stay started.
        let closed_transitions = sqlx::query(
            r#"
            UPDATE producao_etapas
            SET fim_em = GREATEST($2, COALESCE(inicio_em, created_at, $2))
            WHERE pedido_id = $1 AND fim_em IS NULL
            "#,
        )
        .bind(request.order_id)
        .bind(at)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let transition_id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO producao_etapas (pedido_id, etapa, status, responsavel_id, inicio_em, observacoes, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $5)
            RETURNING id
            "#,
        )
        .bind(request.order_id)
        .bind(request.stage.as_str())
        .bind(request.status.as_str())
        .bind(request.responsible_id)
        .bind(at)
        .bind(&request.note)
        .fetch_one(&mut *tx)
        .await?;

        let event_id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO producao_eventos (
                pedido_id, cliente_id, cliente_nome, cliente_whatsapp,
                etapa, status, responsavel_id, observacoes, created_at
            )
            SELECT
                p.id,
                p.cliente_id,
                c.nome,
                COALESCE(NULLIF(c.whatsapp, ''), NULLIF(c.telefone, ''), ''),
                $2, $3, $4, $5, $6
            FROM pedidos p
            JOIN clientes c ON c.id = p.cliente_id
            WHERE p.id = $1
            RETURNING id
            "#,
        )
        .bind(request.order_id)
        .bind(request.stage.as_str())
        .bind(request.status.as_str())
        .bind(request.responsible_id)
        .bind(&request.note)
        .bind(at)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(MoveOutcome::Moved {
            transition_id,
            closed_transitions,
            event_id,
        })
    }

    async fn set_quote_status(&self, quote_id: i32, status: QuoteStatus, at: DateTime<Utc>) -> AppResult<()> {
        let updated = sqlx::query("UPDATE orcamentos SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(quote_id)
            .bind(status.as_str())
            .bind(at)
            .execute(&self.db)
            .await?
            .rows_affected();

        if updated == 0 {
            return Err(AppError::NotFound("Orçamento não encontrado.".to_string()));
        }
        Ok(())
    }

    async fn generate_order_from_quote(
        &self,
        quote_id: i32,
        draft: OrderDraft,
        at: DateTime<Utc>,
    ) -> AppResult<GeneratedOrder> {
        let mut tx = self.db.begin().await?;

        let quote = sqlx::query_as::<_, QuoteRow>(
            r#"
            SELECT id, cliente_id AS customer_id, status, total_estimado AS estimated_total
            FROM orcamentos
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(quote_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Orçamento não encontrado.".to_string()))?;

        if quote.status.as_deref().map(str::trim) != Some(QuoteStatus::Approved.as_str()) {
            return Err(AppError::Conflict(
                "Orçamento ainda não está aprovado.".to_string(),
            ));
        }

        let existing = sqlx::query_as::<_, (i32, Option<String>)>(
            "SELECT id, codigo FROM pedidos WHERE orcamento_id = $1 ORDER BY id LIMIT 1",
        )
        .bind(quote_id)
        .fetch_optional(&mut *tx)
        .await?;
        if let Some((order_id, code)) = existing {
            tx.rollback().await?;
            return Ok(GeneratedOrder {
                order_id,
                code: code.unwrap_or_else(|| format!("#{}", order_id)),
                created: false,
            });
        }

        let items = sqlx::query_as::<_, QuoteItem>(
            r#"
            SELECT id, descricao AS description, qtd AS quantity, unidade AS unit,
                   valor_unit AS unit_price, subtotal
            FROM orcamento_itens
            WHERE orcamento_id = $1
            ORDER BY id
            "#,
        )
        .bind(quote_id)
        .fetch_all(&mut *tx)
        .await?;

        let total = if items.is_empty() {
            quote.estimated_total.unwrap_or_default()
        } else {
            round_money(items.iter().map(QuoteItem::line_total).sum::<Decimal>())
        };

        let new_order = NewOrder {
            customer_id: quote.customer_id,
            quote_id: Some(quote.id),
            responsible_id: draft.responsible_id,
            expected_delivery: draft.expected_delivery,
            total,
            notes: draft.notes.trim().to_string(),
        };
        let (order_id, code) = self.insert_order(&mut tx, &new_order, at).await?;

        for item in &items {
            sqlx::query(
                r#"
                INSERT INTO pedido_itens (pedido_id, descricao, qtd, unidade, valor_unit, subtotal)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(order_id)
            .bind(&item.description)
            .bind(item.quantity())
            .bind(item.unit())
            .bind(item.unit_price())
            .bind(round_money(item.line_total()))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        log::info!("order {} generated from quote {}", code, quote_id);

        Ok(GeneratedOrder {
            order_id,
            code,
            created: true,
        })
    }
}
