use std::sync::Arc;

use remotesim_core::error::{CoreError, Domain, ErrorKind, Result};
use remotesim_core::handle::RawHandle;
use remotesim_core::units::group_vec3s;

use crate::remote::ok_or_server;
use crate::session::Simulator;

/// A named server-side group of scene objects.
///
/// Bulk queries issue one remote call each; members are enumerated by the
/// server, so there is no per-element removed-state tracking here.
pub struct Collection {
    sim: Arc<Simulator>,
    name: String,
    handle: RawHandle,
}

impl Collection {
    /// Resolve the collection handle by name.
    pub fn new(sim: &Arc<Simulator>, name: &str) -> Result<Self> {
        if name.is_empty() {
            return Err(CoreError::warn()
                .domain(Domain::Collection)
                .kind(ErrorKind::InvalidArgument)
                .msg("collection name must not be empty")
                .build());
        }

        let op = "retrieve handle to";
        let client = sim.require_client(op, name)?;
        let handle = ok_or_server(
            sim.api().collection_handle(client, name),
            Domain::Collection,
            op,
            name,
        )?;

        Ok(Self {
            sim: Arc::clone(sim),
            name: name.to_string(),
            handle,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handle(&self) -> RawHandle {
        self.handle
    }

    /// Names of the member objects, in server order.
    pub fn get_names(&self) -> Result<Vec<String>> {
        let op = "retrieve names of";
        let client = self.sim.require_client(op, &self.name)?;
        ok_or_server(
            self.sim.api().collection_names(client, self.handle),
            Domain::Collection,
            op,
            &self.name,
        )
    }

    /// Member positions, one `[x, y, z]` per object, optionally rounded.
    pub fn get_positions(&self, prec: Option<u32>) -> Result<Vec<[f32; 3]>> {
        let op = "retrieve positions of";
        let client = self.sim.require_client(op, &self.name)?;
        let flat = ok_or_server(
            self.sim.api().collection_positions(client, self.handle),
            Domain::Collection,
            op,
            &self.name,
        )?;
        group_vec3s(&flat, prec)
    }

    /// Member orientations as Euler angles about x, y, z of the absolute
    /// frame, each in (-pi, pi], optionally rounded.
    pub fn get_orientations(&self, prec: Option<u32>) -> Result<Vec<[f32; 3]>> {
        let op = "retrieve orientations of";
        let client = self.sim.require_client(op, &self.name)?;
        let flat = ok_or_server(
            self.sim.api().collection_orientations(client, self.handle),
            Domain::Collection,
            op,
            &self.name,
        )?;
        group_vec3s(&flat, prec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::ConnectOptions;
    use crate::testing::ScriptedServer;
    use remotesim_core::error::ErrorKind;

    fn scene() -> (Arc<ScriptedServer>, Arc<Simulator>) {
        let server = Arc::new(ScriptedServer::new());
        let sim = Arc::new(Simulator::new(server.clone(), "127.0.0.1", 19997));
        sim.connect(&ConnectOptions::default()).unwrap();
        (server, sim)
    }

    #[test]
    fn unknown_collection_is_a_server_error() {
        let (_server, sim) = scene();
        let err = Collection::new(&sim, "Ghosts").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Server);
    }

    #[test]
    fn empty_name_is_rejected_locally() {
        let (_server, sim) = scene();
        let err = Collection::new(&sim, "").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
    }

    #[test]
    fn bulk_queries_regroup_flat_payloads() {
        let (server, sim) = scene();
        server.add_object_at("A", [1.2345, 2.3456, 3.4567]);
        server.add_object_at("B", [4.5678, 5.6789, 6.7890]);
        server.add_collection("Landmarks", &["A", "B"]);

        let collection = Collection::new(&sim, "Landmarks").unwrap();
        assert_eq!(collection.name(), "Landmarks");
        assert_eq!(
            collection.get_names().unwrap(),
            vec!["A".to_string(), "B".to_string()]
        );
        assert_eq!(
            collection.get_positions(Some(2)).unwrap(),
            vec![[1.23, 2.35, 3.46], [4.57, 5.68, 6.79]]
        );
        assert_eq!(
            collection.get_orientations(None).unwrap(),
            vec![[0.0, 0.0, 0.0], [0.0, 0.0, 0.0]]
        );
    }

    #[test]
    fn queries_without_connection_fail_up_front() {
        let (server, sim) = scene();
        server.add_collection("Landmarks", &[]);
        let collection = Collection::new(&sim, "Landmarks").unwrap();

        sim.disconnect();
        assert_eq!(
            collection.get_names().unwrap_err().kind,
            ErrorKind::NotConnected
        );
    }
}
