//! Output generation: the network manifest and the textual route table.

pub mod manifest;
pub mod types;

pub use manifest::{build_manifest, render_routes, route_documents};
pub use types::{
    LinkEndpoint, LinkParameters, ManifestGeneral, ManifestInterface, ManifestLink, ManifestNode,
    NetworkManifest, NodeRoutes,
};
