//! The Batched Graph Writer contract (spec §4.6): one `write_*` method per
//! entity family and per edge family, each taking a slice of already
//! validated records and returning a `WriteOutcome`. Implementations batch
//! internally (UNWIND/MERGE against Neo4j in `adapters/graph-neo4j`); this
//! trait only fixes the boundary, the way the teacher's `GraphStore` trait
//! in `core/src/traits.rs` fixed its own boundary before any Neo4j code
//! existed.

use async_trait::async_trait;
use kgx_core::errors::GraphResult;
use kgx_core::types::WriteOutcome;

use crate::compose::{
    ComposeFile, ComposeNetwork, ComposeService, ComposeVolume, EnvironmentVariable, PortBinding,
    ServiceDependency,
};
use crate::mail::{Attachment, Email, GmailLabel, Thread};
use crate::network::{TailscaleAcl, TailscaleDevice, TailscaleNetwork, UnifiClient, UnifiDevice};

#[async_trait]
pub trait GraphWriter: Send + Sync {
    async fn write_compose_files(&self, records: &[ComposeFile]) -> GraphResult<WriteOutcome>;
    async fn write_compose_services(
        &self,
        records: &[ComposeService],
    ) -> GraphResult<WriteOutcome>;
    async fn write_port_bindings(&self, records: &[PortBinding]) -> GraphResult<WriteOutcome>;
    /// Edge write. Per spec §4.6, rows whose `source_service`/`target_service`
    /// endpoint is not yet in the graph are skipped (counted in
    /// `WriteOutcome::skipped`), never failed.
    async fn write_service_dependencies(
        &self,
        records: &[ServiceDependency],
    ) -> GraphResult<WriteOutcome>;
    async fn write_compose_networks(
        &self,
        records: &[ComposeNetwork],
    ) -> GraphResult<WriteOutcome>;
    async fn write_compose_volumes(&self, records: &[ComposeVolume]) -> GraphResult<WriteOutcome>;
    async fn write_environment_variables(
        &self,
        records: &[EnvironmentVariable],
    ) -> GraphResult<WriteOutcome>;

    async fn write_tailscale_devices(
        &self,
        records: &[TailscaleDevice],
    ) -> GraphResult<WriteOutcome>;
    async fn write_tailscale_networks(
        &self,
        records: &[TailscaleNetwork],
    ) -> GraphResult<WriteOutcome>;
    async fn write_tailscale_acls(&self, records: &[TailscaleAcl]) -> GraphResult<WriteOutcome>;
    async fn write_unifi_devices(&self, records: &[UnifiDevice]) -> GraphResult<WriteOutcome>;
    async fn write_unifi_clients(&self, records: &[UnifiClient]) -> GraphResult<WriteOutcome>;

    async fn write_emails(&self, records: &[Email]) -> GraphResult<WriteOutcome>;
    async fn write_threads(&self, records: &[Thread]) -> GraphResult<WriteOutcome>;
    async fn write_attachments(&self, records: &[Attachment]) -> GraphResult<WriteOutcome>;
    async fn write_gmail_labels(&self, records: &[GmailLabel]) -> GraphResult<WriteOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn _assert_object_safe(_writer: &dyn GraphWriter) {}
}
