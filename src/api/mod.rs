//! HTTP API
//!
//! Transport layer over the core engines. This layer owns exactly three
//! jobs: resolve the pre-authenticated caller from headers, run the role
//! gate, and map typed engine errors onto status codes. It holds no
//! business rules of its own.

mod errors;
mod request;
mod response;
mod server;

pub use errors::{ApiError, ApiResult};
pub use request::{
    BatchInput, CreateTestRequest, EnterRequest, HistoryQuery, ReplaceBatchesRequest,
    RollbackRequest, TransitionRequest,
};
pub use response::{EnterResponse, HistoryResponse, PromoteResponse, TransitionResponse};
pub use server::{ApiServer, AppState, ServerConfig};
