use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerInfo},
    tool, tool_handler, tool_router,
    schemars::JsonSchema,
    ErrorData as McpError, ServerHandler, ServiceExt,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use okr_core::generation::{GenerationOrchestrator, GenerationRequest};
use okr_core::{hierarchy, lifecycle};

use crate::api::AppState;

#[derive(Clone)]
pub struct McpServer {
    state: AppState,
    tool_router: ToolRouter<Self>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetObjectiveRequest {
    #[schemars(description = "The objective ID")]
    pub objective_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateProgressRequest {
    #[schemars(description = "The key result ID to update")]
    pub key_result_id: String,
    #[schemars(description = "The new current value of the key result")]
    pub current_value: f64,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GenerateOkrsRequest {
    #[schemars(description = "Free-form description of the business and its situation")]
    pub context: String,
    #[schemars(description = "Company size, e.g. '10-50 employees'")]
    #[serde(default)]
    pub company_size: String,
    #[schemars(description = "Industry the company operates in")]
    #[serde(default)]
    pub industry: String,
    #[schemars(description = "Planning period, e.g. 'Q3 2026'")]
    #[serde(default)]
    pub time_period: String,
    #[schemars(description = "Save the generated objectives and key results")]
    #[serde(default)]
    pub persist: bool,
}

fn tool_error(e: okr_core::Error) -> McpError {
    match e {
        okr_core::Error::NotFound { .. } | okr_core::Error::Validation(_) => {
            McpError::invalid_params(e.to_string(), None)
        }
        _ => McpError::internal_error(e.to_string(), None),
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

impl McpServer {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            tool_router: Self::tool_router(),
        }
    }

    fn parse_uuid(s: &str) -> Result<Uuid, McpError> {
        Uuid::parse_str(s)
            .map_err(|e| McpError::invalid_params(format!("Invalid UUID: {}", e), None))
    }
}

#[tool_router]
impl McpServer {
    #[tool(description = "Get every objective with its progress and the average progress")]
    async fn get_dashboard(&self) -> Result<CallToolResult, McpError> {
        let dashboard = hierarchy::dashboard(self.state.store.as_ref()).map_err(tool_error)?;
        json_result(&dashboard)
    }

    #[tool(description = "Get an objective with its key results, initiatives and progress")]
    async fn get_objective(
        &self,
        params: Parameters<GetObjectiveRequest>,
    ) -> Result<CallToolResult, McpError> {
        let id = Self::parse_uuid(&params.0.objective_id)?;
        let detail = hierarchy::objective_detail(self.state.store.as_ref(), id).map_err(tool_error)?;
        json_result(&detail)
    }

    #[tool(description = "Record a new current value for a key result")]
    async fn update_key_result_progress(
        &self,
        params: Parameters<UpdateProgressRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let id = Self::parse_uuid(&req.key_result_id)?;
        let updated =
            lifecycle::update_key_result_progress(self.state.store.as_ref(), id, req.current_value)
                .map_err(tool_error)?;
        json_result(&updated)
    }

    #[tool(description = "Draft objectives and key results from a business description")]
    async fn generate_okrs(
        &self,
        params: Parameters<GenerateOkrsRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let request = GenerationRequest {
            context: req.context,
            company_size: req.company_size,
            industry: req.industry,
            time_period: req.time_period,
        };
        let orchestrator = GenerationOrchestrator::new(self.state.generator.clone());

        if req.persist {
            let persisted = orchestrator
                .generate_and_persist(self.state.store.as_ref(), &request)
                .await
                .map_err(tool_error)?;
            json_result(&persisted)
        } else {
            let candidates = orchestrator.generate(&request).await.map_err(tool_error)?;
            json_result(&candidates)
        }
    }
}

#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some("OKR tracker MCP server: inspect objectives, record key result progress, draft OKRs".into()),
            ..Default::default()
        }
    }
}

pub async fn run_stdio_server(state: AppState) -> anyhow::Result<()> {
    use tokio::io::{stdin, stdout};

    tracing::info!("Starting MCP server via stdio");

    let service = McpServer::new(state);
    let server = service.serve((stdin(), stdout())).await?;

    let quit_reason = server.waiting().await?;
    tracing::info!("MCP server stopped: {:?}", quit_reason);

    Ok(())
}
