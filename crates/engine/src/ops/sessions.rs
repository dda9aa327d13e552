//! Session lifecycle: not started -> active -> closed.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue, ColumnTrait, EntityTrait, QueryFilter};

use crate::{
    BalanceSheet, EngineError, LedgerEvent, ResultEngine, Session, StartSessionCmd, sessions,
};

use super::Engine;

impl Engine {
    /// Opens a session, seeding its balances from the declared opening
    /// amounts.
    ///
    /// Fails with [`EngineError::SessionAlreadyActive`] while the operator
    /// already has an open session; there is no implicit takeover.
    pub async fn start_session(&self, cmd: StartSessionCmd) -> ResultEngine<Session> {
        cmd.opening.ensure_non_negative()?;

        let _guard = self.write_guard().await;
        if let Some(active) = self.find_active_model(&cmd.operator_id).await? {
            return Err(EngineError::SessionAlreadyActive(active.id));
        }

        let session = Session::open(cmd.operator_id, cmd.opening, cmd.opened_at);
        sessions::ActiveModel::from(&session)
            .insert(self.database())
            .await?;

        tracing::info!(session_id = %session.id, "session started");
        self.emit(LedgerEvent::SessionStarted {
            session_id: session.id,
        });
        Ok(session)
    }

    /// Closes the operator's active session.
    ///
    /// Balances and history are kept; only the active flag flips, and every
    /// subsequent operation is rejected until a new `start_session`.
    pub async fn close_session(
        &self,
        operator_id: &str,
        closed_at: DateTime<Utc>,
    ) -> ResultEngine<Session> {
        let _guard = self.write_guard().await;
        let model = self
            .find_active_model(operator_id)
            .await?
            .ok_or(EngineError::NoActiveSession)?;

        let update = sessions::ActiveModel {
            id: ActiveValue::Set(model.id.clone()),
            is_active: ActiveValue::Set(false),
            closed_at: ActiveValue::Set(Some(closed_at)),
            ..Default::default()
        };
        let updated = update.update(self.database()).await?;
        let session = Session::try_from(updated)?;

        tracing::info!(session_id = %session.id, "session closed");
        self.emit(LedgerEvent::SessionClosed {
            session_id: session.id,
        });
        Ok(session)
    }

    /// Returns the operator's active session, or
    /// [`EngineError::NoActiveSession`].
    pub async fn active_session(&self, operator_id: &str) -> ResultEngine<Session> {
        let model = self
            .find_active_model(operator_id)
            .await?
            .ok_or(EngineError::NoActiveSession)?;
        Session::try_from(model)
    }

    /// Current balances of the active session.
    pub async fn balances(&self, operator_id: &str) -> ResultEngine<BalanceSheet> {
        Ok(self.active_session(operator_id).await?.balances)
    }

    pub(super) async fn find_active_model(
        &self,
        operator_id: &str,
    ) -> ResultEngine<Option<sessions::Model>> {
        Ok(sessions::Entity::find()
            .filter(sessions::Column::OperatorId.eq(operator_id))
            .filter(sessions::Column::IsActive.eq(true))
            .one(self.database())
            .await?)
    }
}
