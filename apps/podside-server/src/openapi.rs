use utoipa::{OpenApi, ToSchema};

use crate::downloads::{DownloadTask, TaskCounts, TaskStatus};
use crate::inventory::HostInventory;

#[allow(dead_code)]
#[derive(ToSchema)]
pub struct HealthOk {
    pub ok: bool,
    pub tasks: TaskCounts,
}

#[allow(dead_code)]
#[derive(ToSchema)]
pub struct TaskAccepted {
    #[schema(example = "task-1700000000000-0")]
    pub task_id: String,
}

#[allow(dead_code)]
#[derive(ToSchema)]
pub struct UnknownTask {
    #[schema(example = "unknown")]
    pub status: String,
}

#[allow(dead_code)]
#[derive(ToSchema)]
pub struct Detail {
    pub detail: String,
}

#[allow(dead_code)]
#[derive(ToSchema)]
pub struct LogTail {
    pub logs: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::meta::healthz,
        crate::api::downloads::download_start,
        crate::api::downloads::download_status,
        crate::api::host::api_status,
        crate::api::host::logs,
    ),
    components(
        schemas(
            HealthOk,
            TaskAccepted,
            UnknownTask,
            Detail,
            LogTail,
            DownloadTask,
            TaskStatus,
            TaskCounts,
            HostInventory,
            crate::api::downloads::DownloadPayload,
        )
    ),
    tags(
        (name = "Meta", description = "Service health"),
        (name = "Downloads", description = "Background model downloads"),
        (name = "Host", description = "Installed nodes, models and logs")
    )
)]
pub struct ApiDoc;
