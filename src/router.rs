//! JSON request dispatch.
//!
//! A request is an object with an `op` tag naming the operation, the other
//! fields are the operation's arguments:
//!
//! ```json
//! {"op": "calculate", "expression": "2**10", "mode": "scientific"}
//! {"op": "convert_number", "value": "255", "from_base": "decimal", "to_base": "hexadecimal"}
//! {"op": "get_history", "session_id": "s1", "limit": 10}
//! ```
//!
//! Every reply is a `Response`; errors never escape as panics or `Err`.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::engine::*;
use crate::errors::CalcError;
use crate::history::HistoryFilter;

pub const SERVICE_NAME: &str = "rclc-engine";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    Calculate(CalculationRequest),
    ConvertNumber(ConvertRequest),
    FinancialCalculation(FinancialRequest),
    GetHistory {
        session_id: String,
        #[serde(default)]
        limit: Option<usize>,
        /// When set, `limit` is ignored in favor of the filter's own
        #[serde(default)]
        filter: Option<HistoryFilter>,
    },
    DeleteHistory {
        session_id: String,
    },
    Health,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HealthReply {
    pub status: String,
    pub service: String,
}

/// Payload of a response
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    Calculation(CalculationResult),
    Conversion(ConvertResponse),
    Financial(FinancialResponse),
    History(HistoryResponse),
    Cleared(ClearResponse),
    Health(HealthReply),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ErrorReply {
    pub kind: String,
    pub message: String,
}

impl From<&CalcError> for ErrorReply {
    fn from(e: &CalcError) -> Self {
        ErrorReply {
            kind: e.kind_name(),
            message: e.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Response {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Reply>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorReply>,
}

impl Response {
    fn ok(data: Reply) -> Self {
        Response {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn failed(e: &CalcError) -> Self {
        Response {
            success: false,
            data: None,
            error: Some(ErrorReply::from(e)),
        }
    }

    fn bad_request(message: String) -> Self {
        Response {
            success: false,
            data: None,
            error: Some(ErrorReply {
                kind: "BadRequest".to_string(),
                message,
            }),
        }
    }

    fn from_result<T>(r: Result<T, CalcError>, wrap: fn(T) -> Reply) -> Self {
        match r {
            Ok(v) => Response::ok(wrap(v)),
            Err(e) => Response::failed(&e),
        }
    }
}

pub fn dispatch(engine: &Engine, req: Request) -> Response {
    match req {
        Request::Calculate(r) => {
            let (result, err) = engine.calculate_detailed(&r);
            Response {
                success: err.is_none(),
                error: err.as_ref().map(ErrorReply::from),
                data: Some(Reply::Calculation(result)),
            }
        }
        Request::ConvertNumber(r) => Response::from_result(engine.convert_number(&r), Reply::Conversion),
        Request::FinancialCalculation(r) => Response::from_result(engine.financial(&r), Reply::Financial),
        Request::GetHistory {
            session_id,
            limit,
            filter,
        } => {
            let history = match filter {
                Some(f) => engine.history_filtered(&session_id, &f),
                None => engine.history_list(&session_id, limit),
            };
            Response::ok(Reply::History(history))
        }
        Request::DeleteHistory { session_id } => Response::ok(Reply::Cleared(engine.clear_history(&session_id))),
        Request::Health => Response::ok(Reply::Health(HealthReply {
            status: "healthy".to_string(),
            service: SERVICE_NAME.to_string(),
        })),
    }
}

/// Parses one JSON request, dispatches it and serializes the response.
/// Malformed input gets a `BadRequest` failure response.
pub fn dispatch_json(engine: &Engine, text: &str) -> String {
    let resp = match serde_json::from_str::<Request>(text) {
        Ok(req) => {
            debug!(?req, "dispatch");
            dispatch(engine, req)
        }
        Err(e) => {
            warn!("malformed request: {}", e);
            Response::bad_request(format!("Malformed request: {}", e))
        }
    };
    serde_json::to_string(&resp).unwrap_or_else(|e| {
        serde_json::json!({
            "success": false,
            "error": {"kind": "BadRequest", "message": e.to_string()},
        })
        .to_string()
    })
}
