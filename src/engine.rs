use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::context::{Context, Mode, NumberSystem};
use crate::errors::*;
use crate::eval::eval_str;
use crate::financial::{self, CalculationType, FinancialParameters};
use crate::history::{HistoryEntry, HistoryFilter, HistoryStore};
use crate::radix;

/// Outcome of a calculation; the same record is kept in the history
pub type CalculationResult = HistoryEntry;

const ERROR_TEXT: &str = "Error";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CalculationRequest {
    pub expression: String,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default)]
    pub number_system: NumberSystem,
    /// Falls back to the configured default session
    #[serde(default)]
    pub session_id: Option<String>,
}

impl CalculationRequest {
    pub fn new(expression: &str, mode: Mode, number_system: NumberSystem) -> Self {
        CalculationRequest {
            expression: expression.to_string(),
            mode,
            number_system,
            session_id: None,
        }
    }

    pub fn in_session(mut self, session_id: &str) -> Self {
        self.session_id = Some(session_id.to_string());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConvertRequest {
    pub value: String,
    pub from_base: String,
    pub to_base: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConvertResponse {
    pub original: String,
    pub converted: String,
    pub from_base: String,
    pub to_base: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FinancialRequest {
    pub calculation_type: String,
    #[serde(default)]
    pub parameters: FinancialParameters,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FinancialResponse {
    pub calculation_type: CalculationType,
    pub result: f64,
    pub formatted_result: String,
    pub parameters: FinancialParameters,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub session_id: String,
    pub history: Vec<HistoryEntry>,
    pub count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClearResponse {
    pub session_id: String,
    pub deleted_count: usize,
}

/// Calculator state shared between requests: settings and the history
/// of every session. Requests take `&self`, so one engine can serve
/// many threads.
pub struct Engine {
    config: EngineConfig,
    history: HistoryStore,
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new(EngineConfig::default())
    }
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Engine {
            config,
            history: HistoryStore::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    fn session_or_default<'a>(&'a self, session_id: Option<&'a str>) -> &'a str {
        match session_id {
            Some(s) if !s.trim().is_empty() => s,
            _ => &self.config.default_session,
        }
    }

    /// Evaluates an expression and records the outcome in the session's
    /// history. A failed evaluation is a normal result with `error` set.
    pub fn calculate(&self, req: &CalculationRequest) -> CalculationResult {
        self.calculate_detailed(req).0
    }

    /// Like `calculate`, also handing back the error of a failed evaluation
    #[tracing::instrument(skip(self, req), fields(mode = %req.mode, number_system = %req.number_system))]
    pub fn calculate_detailed(&self, req: &CalculationRequest) -> (CalculationResult, Option<CalcError>) {
        let session_id = self.session_or_default(req.session_id.as_deref()).to_string();
        debug!(expression = %req.expression, session = %session_id, "calculate");

        let ctx = Context::new(req.mode, req.number_system);
        let (result, formatted_result, failure) = match eval_str(&req.expression, ctx) {
            Ok(v) => (
                v.to_string(),
                v.format(req.number_system, self.config.significant_digits),
                None,
            ),
            Err(e) => {
                info!(kind = %e.kind_name(), "calculation failed: {}", e);
                (ERROR_TEXT.to_string(), ERROR_TEXT.to_string(), Some(e))
            }
        };

        let entry = HistoryEntry {
            calculation_id: Uuid::new_v4(),
            session_id: session_id.clone(),
            expression: req.expression.clone(),
            result,
            formatted_result,
            mode: req.mode,
            number_system: req.number_system,
            timestamp: Utc::now(),
            error: failure.as_ref().map(|e| e.to_string()),
        };
        if entry.is_success() || self.config.record_failures {
            self.history.append(&session_id, entry.clone());
        }
        (entry, failure)
    }

    #[tracing::instrument(skip(self, req), fields(from = %req.from_base, to = %req.to_base))]
    pub fn convert_number(&self, req: &ConvertRequest) -> CalcResult<ConvertResponse> {
        let from = radix::base_from_name(&req.from_base)?;
        let to = radix::base_from_name(&req.to_base)?;
        let converted = radix::convert(&req.value, from, to).map_err(|e| {
            debug!(value = %req.value, "conversion failed: {}", e);
            e
        })?;
        Ok(ConvertResponse {
            original: req.value.clone(),
            converted,
            from_base: req.from_base.clone(),
            to_base: req.to_base.clone(),
        })
    }

    #[tracing::instrument(skip(self, req), fields(calculation_type = %req.calculation_type))]
    pub fn financial(&self, req: &FinancialRequest) -> CalcResult<FinancialResponse> {
        let kind: CalculationType = req.calculation_type.parse()?;
        let result = financial::calculate(kind, &req.parameters).map_err(|e| {
            warn!("financial calculation failed: {}", e);
            e
        })?;
        Ok(FinancialResponse {
            calculation_type: kind,
            result,
            formatted_result: financial::format_money(result, self.config.currency_decimals),
            parameters: req.parameters.clone(),
        })
    }

    /// Most recent entries of a session; `limit` defaults to `history_limit`.
    /// A blank `session_id` means the default session, as in `calculate`.
    #[tracing::instrument(skip(self))]
    pub fn history_list(&self, session_id: &str, limit: Option<usize>) -> HistoryResponse {
        let session_id = self.session_or_default(Some(session_id));
        let limit = limit.unwrap_or(self.config.history_limit);
        let history = self.history.list_limited(session_id, limit);
        HistoryResponse {
            session_id: session_id.to_string(),
            count: history.len(),
            history,
        }
    }

    #[tracing::instrument(skip(self, filter))]
    pub fn history_filtered(&self, session_id: &str, filter: &HistoryFilter) -> HistoryResponse {
        let session_id = self.session_or_default(Some(session_id));
        let history = self.history.filter(session_id, filter);
        HistoryResponse {
            session_id: session_id.to_string(),
            count: history.len(),
            history,
        }
    }

    #[tracing::instrument(skip(self))]
    pub fn clear_history(&self, session_id: &str) -> ClearResponse {
        let session_id = self.session_or_default(Some(session_id));
        let deleted_count = self.history.clear(session_id);
        info!(deleted_count, "history cleared");
        ClearResponse {
            session_id: session_id.to_string(),
            deleted_count,
        }
    }
}
